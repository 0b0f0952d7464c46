use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use flate2::read::GzDecoder;
use log::debug;
use thiserror::Error;

use crate::{parsing_types::ClauseReceiver, solver::literal::Literal};

/// Errors while reading a DIMACS CNF file
#[derive(Error, Debug)]
pub enum DimacsParseError {
    #[error("Failed to read \"{source_name}\": {error}")]
    Io {
        source_name: String,
        #[source]
        error: std::io::Error,
    },
    #[error("CNF header missing ({source_name}:{line})")]
    MissingHeader { source_name: String, line: usize },
    #[error("CNF header invalid ({source_name}:{line})")]
    InvalidHeader { source_name: String, line: usize },
    #[error("Could not parse literal \"{token}\" ({source_name}:{line})")]
    InvalidLiteral {
        source_name: String,
        line: usize,
        token: String,
    },
    #[error(
        "Literal {literal} exceeds the {num_variables} variables of the header ({source_name}:{line})"
    )]
    VariableOutOfRange {
        source_name: String,
        line: usize,
        literal: i32,
        num_variables: usize,
    },
    #[error("Last clause is not terminated by 0 ({source_name})")]
    UnterminatedClause { source_name: String },
    #[error("Number of clauses in cnf incorrect: expected {expected}, found {found} ({source_name})")]
    ClauseCountMismatch {
        source_name: String,
        expected: usize,
        found: usize,
    },
}

/// Parsing state
#[derive(Default)]
struct ParseState {
    /// Number of variables in header
    num_variables_header: usize,
    /// Number of clauses in header
    num_clauses_header: usize,
    /// Number of parsed clauses
    curr_num_clauses: usize,
    /// Whether already processed the header `p cnf ...`
    processed_header: bool,
    /// Literals of the clause not yet terminated by `0`
    clause: Vec<Literal>,
}

/// Open plain text or gzip-compressed file
fn open_file(filename: &str) -> Result<Box<dyn BufRead>, DimacsParseError> {
    let file = File::open(filename).map_err(|error| DimacsParseError::Io {
        source_name: filename.to_string(),
        error,
    })?;
    match Path::new(filename).extension() {
        Some(x) if x.eq_ignore_ascii_case("gz") => {
            Ok(Box::new(BufReader::new(GzDecoder::new(file))))
        }
        _ => Ok(Box::new(BufReader::new(file))),
    }
}

/// Parse `.cnf` or `.cnf.gz`
///
/// # Errors
/// If the file cannot be read or is not valid DIMACS.
pub fn parse_cnf(
    filename: &str,
    receiver: &mut impl ClauseReceiver,
) -> Result<(), DimacsParseError> {
    let reader = open_file(filename)?;
    parse_dimacs(reader, filename, receiver)
}

/// Parse DIMACS CNF from `reader`; `source_name` only appears in errors
///
/// Stops early, without error, once the receiver reports the clauses
/// infeasible.
///
/// # Errors
/// If reading fails or the input is not valid DIMACS.
pub fn parse_dimacs(
    reader: impl BufRead,
    source_name: &str,
    receiver: &mut impl ClauseReceiver,
) -> Result<(), DimacsParseError> {
    let mut curr_state = ParseState::default();
    for (line_idx, line_res) in reader.lines().enumerate() {
        let line_no = line_idx + 1;
        let line = line_res.map_err(|error| DimacsParseError::Io {
            source_name: source_name.to_string(),
            error,
        })?;
        let line = line.trim();
        match line {
            // Comment or blank
            l if l.is_empty() || l.starts_with('c') => {}
            // End marker of some benchmark sets
            l if l.starts_with('%') => break,
            // Header
            l if l.starts_with('p') && !curr_state.processed_header => {
                let invalid_header = || DimacsParseError::InvalidHeader {
                    source_name: source_name.to_string(),
                    line: line_no,
                };
                let parts: Vec<&str> = l.split_whitespace().collect();
                let ["p", "cnf", num_variables, num_clauses] = parts[..] else {
                    return Err(invalid_header());
                };
                curr_state.num_variables_header =
                    num_variables.parse().map_err(|_| invalid_header())?;
                curr_state.num_clauses_header = num_clauses.parse().map_err(|_| invalid_header())?;
                curr_state.processed_header = true;
                receiver.create_variables(curr_state.num_variables_header);
            }
            // Header missing
            _ if !curr_state.processed_header => {
                return Err(DimacsParseError::MissingHeader {
                    source_name: source_name.to_string(),
                    line: line_no,
                });
            }
            // Clause literals
            l => {
                for token in l.split_whitespace() {
                    let num: i32 = token.parse().map_err(|_| DimacsParseError::InvalidLiteral {
                        source_name: source_name.to_string(),
                        line: line_no,
                        token: token.to_string(),
                    })?;
                    if num == 0 {
                        curr_state.curr_num_clauses += 1;
                        let clause = std::mem::take(&mut curr_state.clause);
                        if let Err(error) = receiver.add_clause(&clause) {
                            debug!("stopped parsing at line {line_no}: {error}");
                            return Ok(());
                        }
                        continue;
                    }
                    let variable = usize::try_from(num.unsigned_abs()).unwrap_or(usize::MAX);
                    if variable > curr_state.num_variables_header {
                        return Err(DimacsParseError::VariableOutOfRange {
                            source_name: source_name.to_string(),
                            line: line_no,
                            literal: num,
                            num_variables: curr_state.num_variables_header,
                        });
                    }
                    curr_state.clause.push(Literal::from_dimacs(num));
                }
            }
        }
    }

    if !curr_state.processed_header {
        return Err(DimacsParseError::MissingHeader {
            source_name: source_name.to_string(),
            line: 0,
        });
    }
    if !curr_state.clause.is_empty() {
        return Err(DimacsParseError::UnterminatedClause {
            source_name: source_name.to_string(),
        });
    }
    if curr_state.curr_num_clauses != curr_state.num_clauses_header {
        return Err(DimacsParseError::ClauseCountMismatch {
            source_name: source_name.to_string(),
            expected: curr_state.num_clauses_header,
            found: curr_state.curr_num_clauses,
        });
    }
    Ok(())
}
