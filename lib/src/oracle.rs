//! Classical entailment checking.
//!
//! An [EntailmentOracle] decides propositional entailment and consistency over a fixed signature.
//! Defeasible statements handed to an oracle are read as their materialisation.
//! Every formula is checked against the signature the oracle was built for; an unknown atom is
//! reported as [UnboundAtom][Error::UnboundAtom] instead of being treated as false.
//!
//! Two back ends are available:
//!  - [BddOracle]: compiles the formulas into binary decision diagrams (biodivine-lib-bdd)
//!  - [NaiveOracle]: enumerates all valuations of the signature
pub mod biodivine;
pub mod naive;

use std::{
    collections::BTreeSet,
    time::{Duration, Instant},
};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, EnumVariantNames};

use crate::{
    datatypes::Formula,
    error::{Error, Result},
};

pub use self::{biodivine::BddOracle, naive::NaiveOracle};

/// Decides classical entailment over a fixed propositional signature.
pub trait EntailmentOracle: Send + Sync + std::fmt::Debug {
    /// Returns `true` if every model of `premises` is a model of `goal`.
    fn entails(&self, premises: &[&Formula], goal: &Formula) -> Result<bool>;

    /// Returns `true` if `premises` have a model.
    fn is_consistent(&self, premises: &[&Formula]) -> Result<bool>;

    /// The signature the oracle is built for.
    fn signature(&self) -> &[String];

    /// The deadline of the computation the oracle belongs to.
    fn deadline(&self) -> &Deadline;
}

/// Available oracle implementations.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumString,
    EnumVariantNames,
    Display,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum OracleKind {
    /// Binary decision diagrams, see [BddOracle].
    Bdd,
    /// Truth-table enumeration, see [NaiveOracle].
    Naive,
}

impl Default for OracleKind {
    #[cfg(feature = "bdd")]
    fn default() -> Self {
        OracleKind::Bdd
    }

    #[cfg(not(feature = "bdd"))]
    fn default() -> Self {
        OracleKind::Naive
    }
}

impl OracleKind {
    /// Instantiates the oracle for the given signature.
    pub fn build(&self, signature: &[String], deadline: Deadline) -> Box<dyn EntailmentOracle> {
        match self {
            OracleKind::Bdd => Box::new(BddOracle::new(signature, deadline)),
            OracleKind::Naive => Box::new(NaiveOracle::new(signature, deadline)),
        }
    }
}

/// Time budget of a single request.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    start: Instant,
    budget: Option<Duration>,
}

impl Default for Deadline {
    fn default() -> Self {
        Self::unlimited()
    }
}

impl Deadline {
    /// Starts a new budget, `None` means no limit.
    pub fn new(budget: Option<Duration>) -> Self {
        Self {
            start: Instant::now(),
            budget,
        }
    }

    /// A deadline which never expires.
    pub fn unlimited() -> Self {
        Self::new(None)
    }

    /// Time passed since the deadline was started.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// The configured budget.
    pub fn budget(&self) -> Option<Duration> {
        self.budget
    }

    /// Fails with [ComputationTimeout][Error::ComputationTimeout] once the budget is exhausted.
    pub fn check(&self) -> Result<()> {
        match self.budget {
            Some(budget) if self.start.elapsed() > budget => {
                log::debug!("deadline of {budget:?} exceeded");
                Err(Error::ComputationTimeout {
                    budget_ms: budget.as_millis(),
                })
            }
            _ => Ok(()),
        }
    }
}

/// Fails with [UnboundAtom][Error::UnboundAtom] on the first atom of `formula` not in `signature`.
pub(crate) fn check_bound(formula: &Formula, signature: &BTreeSet<&str>) -> Result<()> {
    match formula
        .signature()
        .into_iter()
        .find(|atom| !signature.contains(atom.as_str()))
    {
        Some(atom) => Err(Error::UnboundAtom { atom }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::datatypes::formula::test::arbitrary_classical;
    use quickcheck::{Arbitrary, Gen};
    use quickcheck_macros::quickcheck;
    use test_log::test;

    fn signature() -> Vec<String> {
        ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect()
    }

    fn parse(input: &[&str]) -> Vec<Formula> {
        input.iter().map(|f| f.parse().unwrap()).collect()
    }

    #[derive(Clone, Debug)]
    struct Instance {
        premises: Vec<Formula>,
        goal: Formula,
    }

    impl Arbitrary for Instance {
        fn arbitrary(g: &mut Gen) -> Self {
            let count = usize::arbitrary(g) % 4;
            let premises = (0..count)
                .map(|_| {
                    let depth = usize::arbitrary(g) % 3;
                    arbitrary_classical(g, depth)
                })
                .collect();
            let depth = usize::arbitrary(g) % 3;
            Instance {
                premises,
                goal: arbitrary_classical(g, depth),
            }
        }
    }

    #[quickcheck]
    fn back_ends_agree(instance: Instance) -> bool {
        let bdd = OracleKind::Bdd.build(&signature(), Deadline::unlimited());
        let naive = OracleKind::Naive.build(&signature(), Deadline::unlimited());
        let premises = instance.premises.iter().collect::<Vec<_>>();
        bdd.entails(&premises, &instance.goal) == naive.entails(&premises, &instance.goal)
            && bdd.is_consistent(&premises) == naive.is_consistent(&premises)
    }

    #[test]
    fn entailment() {
        for kind in [OracleKind::Bdd, OracleKind::Naive] {
            let oracle = kind.build(&signature(), Deadline::unlimited());
            let premises = parse(&["a=>b", "b=>c", "a"]);
            let premises = premises.iter().collect::<Vec<_>>();
            assert!(oracle.entails(&premises, &"c".parse().unwrap()).unwrap());
            assert!(!oracle.entails(&premises, &"d".parse().unwrap()).unwrap());
            assert!(oracle.is_consistent(&premises).unwrap());
            // the empty set of premises entails exactly the tautologies
            assert!(oracle.entails(&[], &"a||!a".parse().unwrap()).unwrap());
            assert!(!oracle.entails(&[], &"a".parse().unwrap()).unwrap());
            assert!(oracle.is_consistent(&[]).unwrap());
        }
    }

    #[test]
    fn defeasible_premises_are_materialised() {
        for kind in [OracleKind::Bdd, OracleKind::Naive] {
            let oracle = kind.build(&signature(), Deadline::unlimited());
            let premises = parse(&["a~>b", "a"]);
            let premises = premises.iter().collect::<Vec<_>>();
            assert!(oracle.entails(&premises, &"b".parse().unwrap()).unwrap());
        }
    }

    #[test]
    fn inconsistency() {
        for kind in [OracleKind::Bdd, OracleKind::Naive] {
            let oracle = kind.build(&signature(), Deadline::unlimited());
            let premises = parse(&["a=>b", "a=>!b", "a"]);
            let premises = premises.iter().collect::<Vec<_>>();
            assert!(!oracle.is_consistent(&premises).unwrap());
            assert!(oracle.entails(&premises, &"d".parse().unwrap()).unwrap());
        }
    }

    #[test]
    fn unbound_atoms() {
        for kind in [OracleKind::Bdd, OracleKind::Naive] {
            let oracle = kind.build(&signature(), Deadline::unlimited());
            let premises = parse(&["a"]);
            let premises = premises.iter().collect::<Vec<_>>();
            assert_eq!(
                oracle.entails(&premises, &"z".parse().unwrap()),
                Err(Error::UnboundAtom {
                    atom: "z".to_string()
                })
            );
            let premises = parse(&["a&&y"]);
            let premises = premises.iter().collect::<Vec<_>>();
            assert_eq!(
                oracle.is_consistent(&premises),
                Err(Error::UnboundAtom {
                    atom: "y".to_string()
                })
            );
        }
    }

    #[test]
    fn expired_deadline() {
        let deadline = Deadline::new(Some(Duration::ZERO));
        std::thread::sleep(Duration::from_millis(2));
        for kind in [OracleKind::Bdd, OracleKind::Naive] {
            let oracle = kind.build(&signature(), deadline);
            assert!(matches!(
                oracle.is_consistent(&[]),
                Err(Error::ComputationTimeout { budget_ms: 0 })
            ));
        }
        assert!(Deadline::unlimited().check().is_ok());
    }

    #[test]
    fn kinds() {
        assert_eq!("bdd".parse::<OracleKind>().unwrap(), OracleKind::Bdd);
        assert_eq!("Naive".parse::<OracleKind>().unwrap(), OracleKind::Naive);
        assert_eq!(OracleKind::Naive.to_string(), "naive");
    }
}
