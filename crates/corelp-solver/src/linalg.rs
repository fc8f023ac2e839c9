//! Dense linear algebra used by the simplex engine.
//!
//! A row-major matrix plus an LU factorization with partial pivoting that
//! solves against the matrix and its transpose.

use std::ops::{Index, IndexMut};

/// Pivots smaller than this in magnitude mark the matrix as singular.
const SINGULAR_EPSILON: f64 = 1e-12;

/// Dense row-major matrix of `f64`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    pub fn identity(size: usize) -> Self {
        let mut m = Self::zeros(size, size);
        for i in 0..size {
            m[(i, i)] = 1.0;
        }
        m
    }

    /// Build from nested rows. Returns `None` when the rows are ragged.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Option<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != cols) {
            return None;
        }
        let n_rows = rows.len();
        let data = rows.into_iter().flatten().collect();
        Some(Self {
            rows: n_rows,
            cols,
            data,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn column(&self, j: usize) -> Vec<f64> {
        (0..self.rows).map(|i| self[(i, j)]).collect()
    }

    /// Copy of the columns at `indices`, in that order.
    pub fn select_columns(&self, indices: &[usize]) -> Matrix {
        let mut out = Matrix::zeros(self.rows, indices.len());
        for i in 0..self.rows {
            for (k, &j) in indices.iter().enumerate() {
                out[(i, k)] = self[(i, j)];
            }
        }
        out
    }

    pub fn set_column(&mut self, j: usize, values: &[f64]) {
        for (i, &v) in values.iter().enumerate().take(self.rows) {
            self[(i, j)] = v;
        }
    }

    /// Append one row. The row must have `cols` entries.
    pub fn push_row(&mut self, row: &[f64]) {
        debug_assert_eq!(row.len(), self.cols);
        self.data.extend_from_slice(row);
        self.rows += 1;
    }

    /// Append one column. The column must have `rows` entries.
    pub fn push_column(&mut self, column: &[f64]) {
        debug_assert_eq!(column.len(), self.rows);
        let new_cols = self.cols + 1;
        let mut data = Vec::with_capacity(self.rows * new_cols);
        for i in 0..self.rows {
            data.extend_from_slice(self.row(i));
            data.push(column[i]);
        }
        self.data = data;
        self.cols = new_cols;
    }

    /// `[self | other]`, both with the same row count.
    pub fn hconcat(&self, other: &Matrix) -> Matrix {
        debug_assert_eq!(self.rows, other.rows);
        let mut out = Matrix::zeros(self.rows, self.cols + other.cols);
        for i in 0..self.rows {
            let start = i * out.cols;
            out.data[start..start + self.cols].copy_from_slice(self.row(i));
            out.data[start + self.cols..start + out.cols].copy_from_slice(other.row(i));
        }
        out
    }

    /// `self · x`
    pub fn mul_vec(&self, x: &[f64]) -> Vec<f64> {
        (0..self.rows).map(|i| dot(self.row(i), x)).collect()
    }

    /// `yᵗ · A[:, j]` without materializing the column.
    pub fn column_dot(&self, j: usize, y: &[f64]) -> f64 {
        (0..self.rows).map(|i| self[(i, j)] * y[i]).sum()
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.rows).map(|i| self.row(i).to_vec()).collect()
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        &self.data[i * self.cols + j]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f64 {
        &mut self.data[i * self.cols + j]
    }
}

pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// `PA = LU` of a square matrix, L unit lower triangular.
#[derive(Debug, Clone)]
pub struct LuFactorization {
    size: usize,
    /// L below the diagonal, U on and above it
    lu: Matrix,
    /// Row `k` of the factored matrix is row `perm[k]` of the input
    perm: Vec<usize>,
}

impl LuFactorization {
    /// Factor `a`. Returns `None` if `a` is not square or is singular.
    pub fn new(a: &Matrix) -> Option<Self> {
        if a.rows() != a.cols() {
            return None;
        }
        let size = a.rows();
        let mut lu = a.clone();
        let mut perm: Vec<usize> = (0..size).collect();

        for k in 0..size {
            // First row with the largest magnitude wins
            let mut pivot_row = k;
            for i in (k + 1)..size {
                if lu[(i, k)].abs() > lu[(pivot_row, k)].abs() {
                    pivot_row = i;
                }
            }
            if lu[(pivot_row, k)].abs() < SINGULAR_EPSILON {
                return None;
            }
            if pivot_row != k {
                for j in 0..size {
                    let tmp = lu[(k, j)];
                    lu[(k, j)] = lu[(pivot_row, j)];
                    lu[(pivot_row, j)] = tmp;
                }
                perm.swap(k, pivot_row);
            }

            let pivot = lu[(k, k)];
            for i in (k + 1)..size {
                let factor = lu[(i, k)] / pivot;
                lu[(i, k)] = factor;
                if factor != 0.0 {
                    for j in (k + 1)..size {
                        lu[(i, j)] -= factor * lu[(k, j)];
                    }
                }
            }
        }

        Some(Self { size, lu, perm })
    }

    /// Solve `A·x = b`.
    pub fn solve(&self, b: &[f64]) -> Vec<f64> {
        let n = self.size;
        let mut y: Vec<f64> = self.perm.iter().map(|&p| b[p]).collect();
        for i in 0..n {
            for j in 0..i {
                y[i] -= self.lu[(i, j)] * y[j];
            }
        }
        for i in (0..n).rev() {
            for j in (i + 1)..n {
                y[i] -= self.lu[(i, j)] * y[j];
            }
            y[i] /= self.lu[(i, i)];
        }
        y
    }

    /// Solve `Aᵗ·x = c`.
    pub fn solve_transpose(&self, c: &[f64]) -> Vec<f64> {
        // Aᵗ = Uᵗ Lᵗ P
        let n = self.size;
        let mut z = c.to_vec();
        for i in 0..n {
            for j in 0..i {
                z[i] -= self.lu[(j, i)] * z[j];
            }
            z[i] /= self.lu[(i, i)];
        }
        for i in (0..n).rev() {
            for j in (i + 1)..n {
                z[i] -= self.lu[(j, i)] * z[j];
            }
        }
        let mut x = vec![0.0; n];
        for (k, &p) in self.perm.iter().enumerate() {
            x[p] = z[k];
        }
        x
    }
}
