use std::time::{Duration, Instant};

use log::info;

use crate::{
    error::NanosmtResult,
    helper::{duration_in_seconds, usize_to_f64},
    parsing::parse_cnf,
    solver::{Solver, SolverExitCode, options::SolverOptions, options::VerbosityLevel},
    termination::TimeBudget,
};

pub mod error;
mod helper;
pub mod parsing;
pub mod parsing_types;
pub mod solver;
pub mod termination;
pub mod theory;

/// Log stats on the loaded CNF instance
fn log_problem_stats(solver: &Solver, start_time: Instant, parse_end_time: Instant) {
    info!("============================[ Problem Statistics ]=============================");
    info!("|  Number of variables:  {:>12}", solver.num_variables());
    info!("|  Number of clauses:    {:>12}", solver.num_clauses());
    info!("|  Root facts:           {:>12}", solver.root_facts().len());
    info!(
        "|  Parse time:           {:>12.6}",
        duration_in_seconds(start_time, parse_end_time)
    );
    info!("============================[ Search Statistics ]==============================");
    info!("| Conflicts |        ORIGINAL          |     LEARNED     | Progress |");
    info!("|           |    Free  Clauses Literals |  Clauses Lit/Cl |          |");
    info!("===============================================================================");
}

/// Log stats after finished with solving
fn log_post_solve_stats(solver: &Solver, start_time: Instant, end_time: Instant) {
    let stats = solver.statistics();
    let total_time = duration_in_seconds(start_time, end_time).max(f64::EPSILON);
    let conflicts_per_s = usize_to_f64(stats.num_total_conflicts) / total_time;
    let propagations_per_s = usize_to_f64(stats.num_propagations) / total_time;
    info!("============================[      Summary      ]==============================");
    info!("|  #Restarts:            {:>12}", stats.num_restarts);
    info!(
        "|  #Conflicts:           {:>12} ({conflicts_per_s:>12.3}/sec)",
        stats.num_total_conflicts
    );
    info!("|  #Unit conflicts:      {:>12}", stats.num_unit_conflicts);
    info!("|  #Learned clauses:     {:>12}", stats.num_learned_clauses);
    info!("|  #Decisions:           {:>12}", stats.num_decisions);
    info!(
        "|  #Propagations:        {:>12} ({propagations_per_s:>12.3}/sec)",
        stats.num_propagations
    );
    info!("|  Total time:           {total_time:>12.6}");
    info!("===============================================================================");
}

/// Print result in the DIMACS output format
fn print_result(solver: &Solver, exit_code: SolverExitCode) {
    match exit_code {
        SolverExitCode::Unknown => println!("s UNKNOWN"),
        SolverExitCode::Sat => {
            println!("s SATISFIABLE");
            let literals: Vec<String> = solver
                .model()
                .iter()
                .map(ToString::to_string)
                .collect();
            if literals.is_empty() {
                println!("v 0");
            } else {
                println!("v {} 0", literals.join(" "));
            }
        }
        SolverExitCode::Unsat => println!("s UNSATISFIABLE"),
    }
}

/// Solves a CNF instance in a `.cnf` or `.cnf.gz` file and prints the result
///
/// # Errors
/// If the instance cannot be read or is not valid DIMACS.
pub fn solve_cnf_instance(
    filename: &str,
    options: SolverOptions,
    time_limit: Option<Duration>,
) -> NanosmtResult<SolverExitCode> {
    // Create solver and parse clauses
    let start_time = Instant::now();
    let mut solver = Solver::with_options(options);
    parse_cnf(filename, &mut solver)?;
    if options.verbosity == VerbosityLevel::All {
        log_problem_stats(&solver, start_time, Instant::now());
    }

    // Solve
    let mut termination = time_limit.map(TimeBudget::starting_now);
    let exit_code = solver.solve_until(&mut termination);

    if options.verbosity == VerbosityLevel::All {
        log_post_solve_stats(&solver, start_time, Instant::now());
    }
    print_result(&solver, exit_code);

    // Return unknown (0), sat (10), or unsat (20)
    Ok(exit_code)
}
