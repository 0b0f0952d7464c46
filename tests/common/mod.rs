#![allow(dead_code)]

use nanosmt_rs::{
    error::ConstraintOperationError, parsing_types::ClauseReceiver, solver::literal::Literal,
};
use rand::{Rng, SeedableRng, rngs::SmallRng};

/// Mock for solver type
#[derive(Clone, Debug, Default)]
pub struct SolverMock {
    pub num_variables: usize,
    pub num_clauses: usize,
    pub clauses: Vec<Vec<Literal>>,
}

impl ClauseReceiver for SolverMock {
    fn create_variables(&mut self, num_variables: usize) {
        self.num_variables = num_variables;
    }

    fn add_clause(&mut self, literals: &[Literal]) -> Result<(), ConstraintOperationError> {
        self.num_clauses += 1;
        self.clauses.push(Vec::from(literals));
        Ok(())
    }
}

/// Literals from their DIMACS form
pub fn lits(signed: &[i32]) -> Vec<Literal> {
    signed.iter().map(|&l| Literal::from_dimacs(l)).collect()
}

/// Whether some literal of every clause is in `model`
pub fn satisfies(model: &[Literal], clauses: &[Vec<Literal>]) -> bool {
    clauses
        .iter()
        .all(|clause| clause.iter().any(|literal| model.contains(literal)))
}

/// Whether `assignment` (bit `v - 1` is the value of variable `v`) satisfies
/// every clause
fn satisfied_by(assignment: u32, clauses: &[Vec<Literal>]) -> bool {
    clauses.iter().all(|clause| {
        clause
            .iter()
            .any(|literal| ((assignment >> (literal.var() - 1)) & 1 == 1) == literal.polarity())
    })
}

/// Satisfiability by enumeration; for up to 20 variables
pub fn brute_force(num_variables: usize, clauses: &[Vec<Literal>]) -> bool {
    assert!(num_variables <= 20);
    (0..1u32 << num_variables).any(|assignment| satisfied_by(assignment, clauses))
}

/// Whether every model of `clauses` satisfies `implied`
pub fn implies(num_variables: usize, clauses: &[Vec<Literal>], implied: &[Literal]) -> bool {
    assert!(num_variables <= 20);
    (0..1u32 << num_variables)
        .filter(|&assignment| satisfied_by(assignment, clauses))
        .all(|assignment| satisfied_by(assignment, &[implied.to_vec()]))
}

/// Random instance of `num_clauses` clauses over three distinct variables each
pub fn random_3sat(num_variables: usize, num_clauses: usize, seed: u64) -> Vec<Vec<Literal>> {
    assert!(num_variables >= 3);
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..num_clauses)
        .map(|_| {
            let mut clause: Vec<Literal> = Vec::with_capacity(3);
            while clause.len() < 3 {
                let variable = rng.random_range(1..=num_variables);
                if clause.iter().all(|literal| literal.var() != variable) {
                    clause.push(Literal::from_var_with_polarity(variable, rng.random_bool(0.5)));
                }
            }
            clause
        })
        .collect()
}

/// `pigeons` pigeons in `holes` holes, each pigeon in some hole and no hole
/// shared; unsatisfiable iff `pigeons > holes`. Returns the number of
/// variables and the clauses.
pub fn pigeonhole(pigeons: usize, holes: usize) -> (usize, Vec<Vec<Literal>>) {
    let variable = |pigeon: usize, hole: usize| pigeon * holes + hole + 1;
    let mut clauses = Vec::new();
    for pigeon in 0..pigeons {
        clauses.push(
            (0..holes)
                .map(|hole| Literal::from_var_with_polarity(variable(pigeon, hole), true))
                .collect(),
        );
    }
    for hole in 0..holes {
        for first in 0..pigeons {
            for second in first + 1..pigeons {
                clauses.push(vec![
                    Literal::from_var_with_polarity(variable(first, hole), false),
                    Literal::from_var_with_polarity(variable(second, hole), false),
                ]);
            }
        }
    }
    (pigeons * holes, clauses)
}

/// Number of models by enumeration; for up to 20 variables
pub fn count_models(num_variables: usize, clauses: &[Vec<Literal>]) -> usize {
    assert!(num_variables <= 20);
    (0..1u32 << num_variables)
        .filter(|&assignment| satisfied_by(assignment, clauses))
        .count()
}
