use std::{io::Write, process::ExitCode, time::Duration};

use clap::Parser;
use log::{LevelFilter, error};

use nanosmt_rs::{
    error::NanosmtResult,
    solve_cnf_instance,
    solver::{
        SolverExitCode,
        options::{
            ActivityKind, DEFAULT_ACTIVITY_BUMP, DEFAULT_ACTIVITY_DECAY, RESTART_FIRST,
            RestartKind, SolverOptions, VerbosityLevel,
        },
    },
};

/// CDCL solver for DIMACS CNF instances
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Instance in DIMACS CNF format, plain or gzip-compressed
    instance: String,

    /// Activity policy ordering the decisions
    #[arg(long, value_enum, default_value_t = ActivityKind::Constant)]
    activity: ActivityKind,

    /// Decay factor of the vsids activity policy
    #[arg(long, default_value_t = DEFAULT_ACTIVITY_DECAY)]
    decay: f64,

    /// Initial bump of the vsids activity policy
    #[arg(long, default_value_t = DEFAULT_ACTIVITY_BUMP)]
    bump: f64,

    /// Restart policy
    #[arg(long, value_enum, default_value_t = RestartKind::Never)]
    restarts: RestartKind,

    /// Number of conflicts the luby sequence is scaled with
    #[arg(long, default_value_t = RESTART_FIRST)]
    restart_interval: usize,

    /// Give up after this many seconds and report UNKNOWN
    #[arg(long)]
    time_limit: Option<u64>,

    /// Level of the log lines printed as `c` comments
    #[arg(long, default_value_t = LevelFilter::Warn)]
    log_level: LevelFilter,

    /// Print problem and search statistics
    #[arg(short, long)]
    verbose: bool,
}

fn configure_logging(level_filter: LevelFilter) -> NanosmtResult<()> {
    env_logger::Builder::new()
        .format(move |buf, record| {
            write!(buf, "c ")?;
            if record.level() != log::Level::Info {
                write!(buf, "{} ", record.level())?;
            }
            writeln!(buf, "{}", record.args())
        })
        .filter_level(level_filter)
        .target(env_logger::Target::Stdout)
        .try_init()?;
    Ok(())
}

fn run(args: &Args) -> NanosmtResult<SolverExitCode> {
    let level_filter = if args.verbose {
        args.log_level.max(LevelFilter::Info)
    } else {
        args.log_level
    };
    configure_logging(level_filter)?;

    let options = SolverOptions {
        verbosity: if args.verbose {
            VerbosityLevel::All
        } else {
            VerbosityLevel::OnlyResult
        },
        activity: args.activity,
        activity_decay: args.decay,
        activity_bump: args.bump,
        restarts: args.restarts,
        restart_interval: args.restart_interval,
    };
    solve_cnf_instance(
        &args.instance,
        options,
        args.time_limit.map(Duration::from_secs),
    )
}

/// Main
fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(exit_code) => ExitCode::from(exit_code as u8),
        Err(e) => {
            error!("Execution failed, error: {e}");
            eprintln!("{e}");
            ExitCode::from(1)
        }
    }
}
