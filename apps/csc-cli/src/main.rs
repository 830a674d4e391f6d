use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use csc_app::{AppResult, ProcessPort, ProcessPortConfig, Workbench};
use csc_core::{Algorithm, CalcMode, CalculationParams, RunMode, TabularRow};
use csc_session::{
    CalculationSessionController, DEFAULT_CALCULATION_TIMEOUT, SessionOptions, SessionState,
    SubmitOutcome,
};
use csc_state::{AppliedSnapshot, FileGateway, MessageDialog, StateSnapshotCodec, load_state};
use tracing::info;

const DEFAULT_SOLVER: &str = "csc-solver";

#[derive(Parser)]
#[command(name = "csc")]
#[command(about = "Chemical equation calculator - drives an external solver", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one calculation (Ctrl-C cancels it)
    Run {
        #[command(flatten)]
        solver: SolverArgs,
        #[command(flatten)]
        form: FormArgs,
        /// Start from the form stored in this snapshot
        #[arg(long)]
        from: Option<PathBuf>,
        /// Seconds to wait for the solver
        #[arg(long, default_value_t = DEFAULT_CALCULATION_TIMEOUT.as_secs())]
        timeout: u64,
        /// Leave the solver running when the timeout expires
        #[arg(long)]
        no_stop_on_timeout: bool,
        /// Write the resulting snapshot here (a directory gets a generated name)
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// Print the form and results stored in a snapshot
    Show {
        /// Snapshot file (.json, .yaml or .yml)
        snapshot: PathBuf,
    },
    /// Export the results stored in a snapshot
    Export {
        /// Snapshot file (.json, .yaml or .yml)
        snapshot: PathBuf,
        /// txt, csv or xlsx
        #[arg(short, long, default_value = "txt")]
        format: String,
        /// Output file or directory (defaults to the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the default form values as JSON
    Defaults,
}

#[derive(Args)]
struct SolverArgs {
    /// Solver executable
    #[arg(long, default_value = DEFAULT_SOLVER)]
    solver: PathBuf,
    /// Extra argument passed to the solver (repeatable)
    #[arg(long = "solver-arg")]
    solver_args: Vec<String>,
}

#[derive(Args)]
struct FormArgs {
    /// Chemical equation, e.g. H2+O2=H2O
    #[arg(short, long)]
    equation: Option<String>,
    /// formula, balance or masses
    #[arg(long)]
    mode: Option<CalcMode>,
    /// auto, inv, gpinv, ppinv or comb
    #[arg(long)]
    algorithm: Option<Algorithm>,
    /// balance, check or force
    #[arg(long)]
    run_mode: Option<RunMode>,
    /// Index of the target compound
    #[arg(long)]
    target_num: Option<u32>,
    /// Target mass in grams
    #[arg(long)]
    target_mass: Option<f64>,
    /// Convert coefficients to integers
    #[arg(long)]
    intify: Option<bool>,
    /// Digits after the decimal point
    #[arg(long)]
    output_precision: Option<u8>,
    /// Float tolerance exponent
    #[arg(long)]
    float_tolerance: Option<u8>,
    /// Combinatorial search limit
    #[arg(long)]
    max_comb: Option<u32>,
}

impl FormArgs {
    fn apply_to(self, mut form: CalculationParams) -> CalculationParams {
        if let Some(equation) = self.equation {
            form.equation = equation;
        }
        if let Some(mode) = self.mode {
            form.mode = mode;
        }
        if let Some(algorithm) = self.algorithm {
            form.algorithm = algorithm;
        }
        if let Some(run_mode) = self.run_mode {
            form.run_mode = run_mode;
        }
        if let Some(target_num) = self.target_num {
            form.target_num = target_num;
        }
        if let Some(target_mass) = self.target_mass {
            form.target_mass = target_mass;
        }
        if let Some(intify) = self.intify {
            form.intify = intify;
        }
        if let Some(output_precision) = self.output_precision {
            form.output_precision = output_precision;
        }
        if let Some(float_tolerance) = self.float_tolerance {
            form.float_tolerance = float_tolerance;
        }
        if let Some(max_comb) = self.max_comb {
            form.max_comb = max_comb;
        }
        form
    }
}

struct ConsoleDialog;

impl MessageDialog for ConsoleDialog {
    fn show_message(&self, title: &str, message: &str, _ok_label: &str) {
        eprintln!("✗ {}: {}", title, message);
    }
}

type CliWorkbench = Workbench<ProcessPort, FileGateway, ConsoleDialog>;

fn workbench(solver: SolverArgs, options: SessionOptions, target: PathBuf) -> CliWorkbench {
    let config = ProcessPortConfig {
        program: solver.solver,
        args: solver.solver_args,
    };
    let controller =
        CalculationSessionController::with_options(Arc::new(ProcessPort::new(config)), options);
    Workbench::new(controller, FileGateway::new(target), ConsoleDialog)
}

/// Load a snapshot and install its session on the workbench.
fn open_snapshot(bench: &CliWorkbench, path: &Path) -> AppResult<AppliedSnapshot> {
    let state = load_state(path)?;
    let applied = StateSnapshotCodec::apply(&state);
    bench.controller().restore(applied.session.clone())?;
    info!(path = %path.display(), "snapshot opened");
    Ok(applied)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> AppResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            solver,
            form,
            from,
            timeout,
            no_stop_on_timeout,
            save,
        } => {
            let options = SessionOptions {
                timeout: Duration::from_secs(timeout),
                stop_on_timeout: !no_stop_on_timeout,
            };
            cmd_run(solver, form, from.as_deref(), options, save).await
        }
        Commands::Show { snapshot } => cmd_show(&snapshot),
        Commands::Export {
            snapshot,
            format,
            output,
        } => cmd_export(&snapshot, &format, output),
        Commands::Defaults => cmd_defaults(),
    }
}

async fn cmd_run(
    solver: SolverArgs,
    form_args: FormArgs,
    from: Option<&Path>,
    options: SessionOptions,
    save: Option<PathBuf>,
) -> AppResult<()> {
    let target = save.clone().unwrap_or_else(|| PathBuf::from("."));
    let bench = workbench(solver, options, target);

    let base = match from {
        Some(path) => open_snapshot(&bench, path)?.form,
        None => CalculationParams::default(),
    };
    let form = form_args.apply_to(base);

    println!("Calculating ({}): {}", form.mode, form.equation);

    let submit = bench.run(form.clone());
    tokio::pin!(submit);
    let outcome = tokio::select! {
        outcome = &mut submit => outcome?,
        _ = tokio::signal::ctrl_c() => {
            println!("Cancelling...");
            bench.controller().request_cancel().await;
            submit.await?
        }
    };

    match outcome {
        SubmitOutcome::Completed(state) => print_session(&state),
        SubmitOutcome::CancelRequested | SubmitOutcome::Discarded => {
            println!("{}", bench.controller().state().status_message());
        }
    }

    if save.is_some() && bench.save_session(&form) {
        println!("✓ Session saved");
    }
    Ok(())
}

fn cmd_show(snapshot: &Path) -> AppResult<()> {
    let applied = StateSnapshotCodec::apply(&load_state(snapshot)?);

    println!("Snapshot: {}", snapshot.display());
    println!("  Equation:         {}", applied.form.equation);
    println!("  Mode:             {}", applied.form.mode);
    println!("  Algorithm:        {}", applied.form.algorithm);
    println!("  Run mode:         {}", applied.form.run_mode);
    println!("  Target compound:  {}", applied.form.target_num);
    println!("  Target mass:      {}", applied.form.target_mass);
    println!("  Intify:           {}", applied.form.intify);
    println!("  Output precision: {}", applied.form.output_precision);
    println!("  Float tolerance:  {}", applied.form.float_tolerance);
    println!("  Max combinations: {}", applied.form.max_comb);
    println!();
    println!("Status: {}", applied.status_message);
    if applied.interrupted {
        println!("  (saved mid-calculation; the calculation was not resumed)");
    }
    println!("{}", applied.results);
    if let Some(result) = applied.session.success() {
        print_table(&result.tabular);
    }
    Ok(())
}

fn cmd_export(snapshot: &Path, format: &str, output: Option<PathBuf>) -> AppResult<()> {
    let target = output.unwrap_or_else(|| PathBuf::from("."));
    let solver = SolverArgs {
        solver: PathBuf::from(DEFAULT_SOLVER),
        solver_args: Vec::new(),
    };
    let bench = workbench(solver, SessionOptions::default(), target);

    let applied = open_snapshot(&bench, snapshot)?;
    if bench.export(&applied.form, format) {
        println!("✓ Exported {} to {}", format, bench.gateway().target().display());
    }
    Ok(())
}

fn cmd_defaults() -> AppResult<()> {
    let defaults = serde_json::to_string_pretty(&CalculationParams::default())
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    println!("{}", defaults);
    Ok(())
}

fn print_session(state: &SessionState) {
    println!("{}", state.status_message());
    if let Some(result) = state.success() {
        println!("{}", result.details);
        print_table(&result.tabular);
    }
}

fn print_table(rows: &[TabularRow]) {
    if rows.is_empty() {
        return;
    }
    println!();
    println!("{:<20} {:>14} {:>14}", "Formula", "Molar Mass", "Mass");
    for row in rows {
        println!("{:<20} {:>14} {:>14}", row.formula, row.molar, row.masses);
    }
}
