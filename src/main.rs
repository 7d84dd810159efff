#![allow(non_snake_case)]
use RustedContours::Utils::log_config::init_logging;
use RustedContours::Utils::task_runner::TaskPlan;
use RustedContours::errors::RenderResult;
use RustedContours::numerical::continuity::CatalogFunction;
use RustedContours::numerical::level_ladder::LevelLadder;
use clap::{Parser, Subcommand};
use log::{LevelFilter, error};
use std::path::PathBuf;
use std::process::ExitCode;
use tabled::{Table, Tabled, settings::Style};

#[derive(Parser)]
#[command(name = "rusted_contours", author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render every section of a task file
    Run {
        /// task document with heatmap/contour/surface/tangent/continuity/output sections
        task: PathBuf,
        /// output directory, overrides the task's `output` section
        #[arg(long)]
        out: Option<PathBuf>,
        /// log at debug level whatever the task says
        #[arg(long)]
        verbose: bool,
    },
    /// Print the 31 contour levels around a basepoint value
    Ladder {
        #[arg(long, allow_hyphen_values = true)]
        f0: f64,
        #[arg(long, default_value_t = 0.01)]
        step: f64,
    },
    /// List the single-variable functions of the continuity view
    Catalog,
}

#[derive(Tabled)]
struct CatalogRow {
    name: String,
    label: &'static str,
    expression: &'static str,
    #[tabled(rename = "view (left, right)")]
    view: String,
}

fn run_task(task: PathBuf, out: Option<PathBuf>, verbose: bool) -> RenderResult<bool> {
    let mut plan = TaskPlan::from_file(&task)?;
    if let Some(out) = out {
        plan.output.directory = out;
    }
    let level = if verbose {
        LevelFilter::Debug
    } else {
        plan.output.log_level
    };
    init_logging(level, plan.output.log_file.as_deref())?;
    let reports = plan.run()?;
    let mut table = Table::new(&reports);
    table.with(Style::modern_rounded());
    println!("{}", table);
    println!("results in {}", plan.output.directory.display());
    Ok(reports.iter().all(|r| !r.status.starts_with("error")))
}

fn print_ladder(f0: f64, step: f64) -> RenderResult<()> {
    let ladder = LevelLadder::new(f0, step)?;
    let mut table = Table::new(ladder.rows());
    table.with(Style::modern_rounded());
    println!("{}", table);
    Ok(())
}

fn print_catalog() {
    let rows: Vec<CatalogRow> = CatalogFunction::all()
        .into_iter()
        .map(|f| {
            let (left, right) = f.metadata().safe_domain_hint;
            CatalogRow {
                name: f.to_string(),
                label: f.label(),
                expression: f.expression(),
                view: format!("({:.4}, {:.4})", left, right),
            }
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::modern_rounded());
    println!("{}", table);
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Run { task, out, verbose } => run_task(task, out, verbose),
        Commands::Ladder { f0, step } => print_ladder(f0, step).map(|_| true),
        Commands::Catalog => {
            print_catalog();
            Ok(true)
        }
    };
    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
