//! Entailment checking utilising the biodivine-lib-bdd (see <https://github.com/sybila/biodivine-lib-bdd>) BDD implementation.
use std::collections::BTreeSet;

use biodivine_lib_bdd::{Bdd, BddVariableSet, BddVariableSetBuilder};
use derivative::Derivative;

use super::{check_bound, Deadline, EntailmentOracle};
use crate::{datatypes::Formula, error::Result};

#[derive(Derivative)]
#[derivative(Debug)]
/// Oracle which compiles premises and goal into one shared variable set and decides
/// `premises ⊨ goal` by checking `premises ∧ ¬goal` for unsatisfiability.
pub struct BddOracle {
    signature: Vec<String>,
    #[derivative(Debug = "ignore")]
    varset: BddVariableSet,
    deadline: Deadline,
}

impl BddOracle {
    /// Instantiates the variable set for the given signature.
    pub fn new(signature: &[String], deadline: Deadline) -> Self {
        log::debug!("[Start] instantiating BDD variables");
        let mut builder = BddVariableSetBuilder::new();
        let names = signature.iter().map(String::as_str).collect::<Vec<_>>();
        builder.make_variables(&names);
        let varset = builder.build();
        log::trace!("variables: {:?}", names);
        Self {
            signature: signature.to_vec(),
            varset,
            deadline,
        }
    }

    fn compile(&self, formula: &Formula, bound: &BTreeSet<&str>) -> Result<Bdd> {
        check_bound(formula, bound)?;
        let bdd = self.varset.eval_expression(&formula.to_boolean_expr());
        log::trace!("compiled {} to {} nodes", formula, bdd.size());
        Ok(bdd)
    }

    fn conjunction(&self, premises: &[&Formula], bound: &BTreeSet<&str>) -> Result<Bdd> {
        premises
            .iter()
            .try_fold(self.varset.mk_true(), |acc, formula| {
                self.deadline.check()?;
                let bdd = self.compile(formula, bound)?;
                Ok(acc.and(&bdd))
            })
    }

    fn bound(&self) -> BTreeSet<&str> {
        self.signature.iter().map(String::as_str).collect()
    }
}

impl EntailmentOracle for BddOracle {
    fn entails(&self, premises: &[&Formula], goal: &Formula) -> Result<bool> {
        self.deadline.check()?;
        let bound = self.bound();
        let negated_goal = self.compile(goal, &bound)?.not();
        let premises = self.conjunction(premises, &bound)?;
        Ok(premises.and(&negated_goal).is_false())
    }

    fn is_consistent(&self, premises: &[&Formula]) -> Result<bool> {
        self.deadline.check()?;
        let bound = self.bound();
        Ok(!self.conjunction(premises, &bound)?.is_false())
    }

    fn signature(&self) -> &[String] {
        &self.signature
    }

    fn deadline(&self) -> &Deadline {
        &self.deadline
    }
}
