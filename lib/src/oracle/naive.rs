//! Entailment checking by truth-table enumeration.
//!
//! Only the atoms occurring in the checked formulas are enumerated, the remaining atoms of the
//! signature cannot change the outcome.
use std::collections::{BTreeSet, HashMap};

use super::{check_bound, Deadline, EntailmentOracle};
use crate::{datatypes::Formula, error::Result};

/// Number of valuations checked between two deadline checks.
const DEADLINE_INTERVAL: usize = 1 << 10;

/// Oracle which enumerates all valuations.
#[derive(Debug)]
pub struct NaiveOracle {
    signature: Vec<String>,
    deadline: Deadline,
}

impl NaiveOracle {
    /// Instantiates the oracle for the given signature.
    pub fn new(signature: &[String], deadline: Deadline) -> Self {
        Self {
            signature: signature.to_vec(),
            deadline,
        }
    }

    /// Returns `true` if some valuation satisfies all `premises` and falsifies `goal` (if given).
    fn find_model(&self, premises: &[&Formula], goal: Option<&Formula>) -> Result<bool> {
        self.deadline.check()?;
        let bound = self
            .signature
            .iter()
            .map(String::as_str)
            .collect::<BTreeSet<_>>();
        let mut atoms = BTreeSet::new();
        for formula in premises.iter().copied().chain(goal) {
            check_bound(formula, &bound)?;
            formula.collect_atoms(&mut atoms);
        }
        let index = atoms
            .iter()
            .enumerate()
            .map(|(idx, atom)| (atom.as_str(), idx))
            .collect::<HashMap<_, _>>();
        log::trace!("enumerating 2^{} valuations", atoms.len());
        for (count, valuation) in ValuationsIterator::new(atoms.len()).enumerate() {
            if count % DEADLINE_INTERVAL == 0 {
                self.deadline.check()?;
            }
            let satisfies_premises = premises
                .iter()
                .all(|formula| evaluate(formula, &index, &valuation));
            if satisfies_premises && goal.map_or(true, |g| !evaluate(g, &index, &valuation)) {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl EntailmentOracle for NaiveOracle {
    fn entails(&self, premises: &[&Formula], goal: &Formula) -> Result<bool> {
        Ok(!self.find_model(premises, Some(goal))?)
    }

    fn is_consistent(&self, premises: &[&Formula]) -> Result<bool> {
        self.find_model(premises, None)
    }

    fn signature(&self) -> &[String] {
        &self.signature
    }

    fn deadline(&self) -> &Deadline {
        &self.deadline
    }
}

/// Truth value of `formula`; a defeasible implication is evaluated as its materialisation.
fn evaluate(formula: &Formula, index: &HashMap<&str, usize>, valuation: &[bool]) -> bool {
    match formula {
        Formula::Atom(name) => index
            .get(name.as_str())
            .map(|&idx| valuation[idx])
            .unwrap_or(false),
        Formula::Not(inner) => !evaluate(inner, index, valuation),
        Formula::And(lhs, rhs) => evaluate(lhs, index, valuation) && evaluate(rhs, index, valuation),
        Formula::Or(lhs, rhs) => evaluate(lhs, index, valuation) || evaluate(rhs, index, valuation),
        Formula::Implies(lhs, rhs) | Formula::Defeasible(lhs, rhs) => {
            !evaluate(lhs, index, valuation) || evaluate(rhs, index, valuation)
        }
        Formula::Iff(lhs, rhs) => evaluate(lhs, index, valuation) == evaluate(rhs, index, valuation),
    }
}

/// Iterates over all two-valued valuations of `n` atoms, starting with every atom false.
#[derive(Debug)]
struct ValuationsIterator {
    current: Option<Vec<bool>>,
    started: bool,
}

impl ValuationsIterator {
    fn new(atoms: usize) -> Self {
        Self {
            current: Some(vec![false; atoms]),
            started: false,
        }
    }
}

impl Iterator for ValuationsIterator {
    type Item = Vec<bool>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.started {
            if let Some(current) = &mut self.current {
                // binary increment, the last atom is the least significant one
                match current.iter().rposition(|value| !value) {
                    Some(at) => {
                        current[at] = true;
                        current[at + 1..].iter_mut().for_each(|value| *value = false);
                    }
                    None => self.current = None,
                }
            }
        } else {
            self.started = true;
        }
        self.current.clone()
    }
}
