use clap::{Parser, Subcommand, ValueEnum};
use corelp_solver::{Model, Solution, Solver, SolverConfig, SolverStatus, formulate};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "corelp")]
#[command(about = "Solve linear and integer programs described in JSON", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a model and print the result
    Solve {
        /// The JSON model file
        file: PathBuf,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
        /// Simplex pivot limit per phase
        #[arg(long)]
        max_iterations: Option<usize>,
        /// Reduced-cost tolerance
        #[arg(long)]
        tolerance: Option<f64>,
        /// Emit one diagnostic record per pivot and per branch-and-bound node
        #[arg(long)]
        log: bool,
        /// Like --log, plus the basic solution and duals at every simplex iteration
        #[arg(short, long)]
        verbose: bool,
    },
    /// Check a model file for errors
    Check {
        /// The JSON model file
        file: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Solve {
            file,
            format,
            max_iterations,
            tolerance,
            log,
            verbose,
        } => {
            if log || verbose {
                let level = if verbose { Level::TRACE } else { Level::DEBUG };
                let subscriber = FmtSubscriber::builder()
                    .with_max_level(level)
                    .with_writer(std::io::stderr)
                    .finish();
                if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
                    eprintln!("Failed to set tracing subscriber: {}", e);
                    std::process::exit(1);
                }
            }

            let model = load_model(&file);

            let mut config = SolverConfig::new().with_logging(log || verbose);
            if let Some(max) = max_iterations {
                config = config.with_max_iterations(max);
            }
            if let Some(tol) = tolerance {
                config = config.with_tolerance(tol);
            }

            let solution = match Solver::new(config).solve(&model) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Solver error [{}]: {}", e.code(), e);
                    std::process::exit(1);
                }
            };

            match format {
                Format::Json => match serde_json::to_string_pretty(&solution) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Error writing JSON: {}", e);
                        std::process::exit(1);
                    }
                },
                Format::Text => print_solution(&model, &solution),
            }

            if solution.status != SolverStatus::Optimal {
                std::process::exit(1);
            }
        }
        Commands::Check { file } => {
            let model = load_model(&file);
            match formulate(&model) {
                Ok(formulation) => {
                    println!("✓ {} is valid", file.display());
                    println!("  Variables:   {}", model.num_variables());
                    println!("  Constraints: {}", model.num_constraints());
                    println!(
                        "  Standard form: {} rows × {} columns",
                        formulation.scf.num_rows(),
                        formulation.scf.num_cols()
                    );
                    println!("  Integer: {}", if model.is_integer() { "yes" } else { "no" });
                }
                Err(e) => {
                    eprintln!("Model error: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}

fn load_model(file: &Path) -> Model {
    let source = match std::fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            std::process::exit(1);
        }
    };

    match serde_json::from_str(&source) {
        Ok(model) => model,
        Err(e) => {
            eprintln!("Parse error: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_solution(model: &Model, solution: &Solution) {
    println!("Model: {}", model.name);
    println!();

    match solution.status {
        SolverStatus::Optimal => {
            println!("Status: OPTIMAL");
            println!("Objective: {:.4}", solution.objective_value);
            println!();
            println!("Variables:");
            for (variable, value) in model.variables.iter().zip(&solution.values) {
                println!("  {:20} {:12.4}", variable.name, value);
            }

            if !model.constraints.is_empty() {
                println!();
                println!("Constraints:");
                for (i, constraint) in model.constraints.iter().enumerate() {
                    let slack = solution.slacks.get(i).copied().flatten();
                    let binding = slack.is_none_or(|s| s.abs() < 1e-9);
                    print!("  {:20}", constraint.name);
                    match slack {
                        Some(s) => print!(" slack {:10.4}", s),
                        None => print!(" {:16}", "equality"),
                    }
                    if let Some(dual) = solution.duals.get(i) {
                        print!("  shadow price {:10.4}", dual);
                    }
                    if binding {
                        print!("  (binding)");
                    }
                    println!();
                }
            }

            println!();
            if model.is_integer() {
                println!("Nodes explored: {}", solution.nodes_explored);
            }
            println!("Simplex iterations: {}", solution.iterations);
        }
        SolverStatus::Infeasible => {
            println!("Status: INFEASIBLE");
            println!("No point satisfies every constraint.");
        }
        SolverStatus::Unbounded => {
            println!("Status: UNBOUNDED");
            println!("The objective can be improved without limit.");
        }
        SolverStatus::NotSolved => {
            println!("Status: NOT SOLVED");
        }
    }
}
