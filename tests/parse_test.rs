use std::{
    io::Write,
    process::{Command, Output},
};

use flate2::{Compression, write::GzEncoder};
use nanosmt_rs::{
    parsing::{DimacsParseError, parse_cnf},
    solver::{Solver, literal::Literal},
};
use tempfile::NamedTempFile;

use crate::common::{SolverMock, lits, pigeonhole, random_3sat, satisfies};

mod common;

const SMALL_SAT: &str = "c small satisfiable instance
p cnf 12 8
1 4 0
1 -3 -8 0
1 8 12 0
2 11 0
-7 -3 9 0
-7 8 -9 0
7 8 -10 0
7 10
-12 0
";

const SMALL_UNSAT: &str = "p cnf 2 4
1 2 0
-1 2 0
1 -2 0
-1 -2 0
";

fn to_dimacs(num_variables: usize, clauses: &[Vec<Literal>]) -> String {
    let mut text = format!("p cnf {num_variables} {}\n", clauses.len());
    for clause in clauses {
        for literal in clause {
            text.push_str(&format!("{literal} "));
        }
        text.push_str("0\n");
    }
    text
}

fn temp_cnf(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".cnf")
        .tempfile()
        .expect("failed to create temp file");
    file.write_all(contents.as_bytes())
        .expect("failed to write temp file");
    file
}

fn temp_cnf_gz(contents: &str) -> NamedTempFile {
    let file = tempfile::Builder::new()
        .suffix(".cnf.gz")
        .tempfile()
        .expect("failed to create temp file");
    let mut encoder = GzEncoder::new(file.reopen().expect("reopen"), Compression::default());
    encoder
        .write_all(contents.as_bytes())
        .expect("failed to compress");
    encoder.finish().expect("failed to finish gzip stream");
    file
}

fn path_of(file: &NamedTempFile) -> &str {
    file.path().to_str().expect("utf-8 temp path")
}

fn run_binary(args: &[&str]) -> Output {
    let exe = env!("CARGO_BIN_EXE_nanosmt");
    Command::new(exe)
        .args(args)
        .output()
        .expect("failed to run main binary")
}

/// Literals of the `v` lines
fn model_of(stdout: &str) -> Vec<Literal> {
    stdout
        .lines()
        .filter_map(|line| line.strip_prefix("v "))
        .flat_map(str::split_whitespace)
        .map(|token| token.parse::<i32>().expect("integer literal"))
        .filter(|&literal| literal != 0)
        .map(Literal::from_dimacs)
        .collect()
}

fn check_small_cnf(file: &NamedTempFile) {
    let mut solver = SolverMock::default();
    parse_cnf(path_of(file), &mut solver).expect("valid instance");
    assert_eq!(solver.num_variables, 12);
    assert_eq!(solver.num_clauses, 8);
    assert_eq!(solver.clauses.len(), 8);
    assert_eq!(solver.clauses.last(), Some(&lits(&[7, 10, -12])));
}

#[test]
fn test_parse_cnf() {
    check_small_cnf(&temp_cnf(SMALL_SAT));
}

#[test]
fn test_parse_cnf_gz() {
    check_small_cnf(&temp_cnf_gz(SMALL_SAT));
}

#[test]
fn test_parse_cnf_file_does_not_exist() {
    let mut solver = SolverMock::default();
    let error = parse_cnf("file_not_existing.cnf", &mut solver).expect_err("missing file");
    assert!(matches!(error, DimacsParseError::Io { .. }));
}

#[test]
fn test_parse_stops_once_infeasible() {
    let file = temp_cnf("p cnf 2 3\n1 0\n-1 0\n2 0\n");
    let mut solver = Solver::new();
    parse_cnf(path_of(&file), &mut solver).expect("early stop is not an error");
    assert!(!solver.solve());
}

#[test]
fn test_parse_generated_instance() {
    let (num_variables, clauses) = pigeonhole(3, 3);
    let file = temp_cnf(&to_dimacs(num_variables, &clauses));
    let mut solver = SolverMock::default();
    parse_cnf(path_of(&file), &mut solver).expect("valid instance");
    assert_eq!(solver.num_variables, num_variables);
    assert_eq!(solver.clauses, clauses);
}

#[test]
fn test_cli_sat() {
    let clauses = random_3sat(20, 60, 3);
    let file = temp_cnf(&to_dimacs(20, &clauses));
    let output = run_binary(&[path_of(&file)]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    match output.status.code() {
        Some(10) => {
            assert!(stdout.contains("s SATISFIABLE\n"));
            assert!(satisfies(&model_of(&stdout), &clauses));
        }
        Some(20) => assert!(stdout.contains("s UNSATISFIABLE\n")),
        code => panic!("unexpected exit code {code:?}"),
    }

    let file = temp_cnf(SMALL_SAT);
    let output = run_binary(&[path_of(&file), "--activity", "vsids", "--restarts", "luby"]);
    assert_eq!(output.status.code(), Some(10));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(model_of(&stdout).len(), 12);
}

#[test]
fn test_cli_unsat() {
    let file = temp_cnf_gz(SMALL_UNSAT);
    let output = run_binary(&[path_of(&file)]);
    assert_eq!(output.status.code(), Some(20));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "s UNSATISFIABLE\n");
}

#[test]
fn test_cli_time_limit() {
    let (num_variables, clauses) = pigeonhole(9, 8);
    let file = temp_cnf(&to_dimacs(num_variables, &clauses));
    let output = run_binary(&[path_of(&file), "--time-limit", "0"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("s UNKNOWN"));
}

#[test]
fn test_cli_verbose_lines_are_comments() {
    let file = temp_cnf(SMALL_SAT);
    let output = run_binary(&[path_of(&file), "--verbose"]);
    assert_eq!(output.status.code(), Some(10));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.lines().any(|line| line.contains("Number of variables")));
    assert!(
        stdout
            .lines()
            .all(|line| line.starts_with("c ") || line.starts_with("s ") || line.starts_with("v "))
    );
}

fn check_parsing_fails(contents: &str, expected_error: &str) {
    let file = temp_cnf(contents);
    let output = run_binary(&[path_of(&file)]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains(expected_error),
        "stderr did not contain \"{expected_error}\"; it contained \"{stderr}\""
    );
}

#[test]
fn test_cli_file_does_not_exist() {
    let output = run_binary(&["file_not_existing.cnf"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to read \"file_not_existing.cnf\""));
}

#[test]
fn test_cli_missing_clause() {
    check_parsing_fails(
        "p cnf 2 3\n1 2 0\n-1 2 0\n",
        "Number of clauses in cnf incorrect: expected 3, found 2",
    );
}

#[test]
fn test_cli_double_minus() {
    check_parsing_fails("p cnf 2 1\n--1 2 0\n", "Could not parse literal \"--1\"");
}

#[test]
fn test_cli_too_many_vars() {
    check_parsing_fails(
        "p cnf 2 1\n1 3 0\n",
        "Literal 3 exceeds the 2 variables of the header",
    );
}

#[test]
fn test_cli_missing_header() {
    check_parsing_fails("1 2 0\n", "CNF header missing");
}
