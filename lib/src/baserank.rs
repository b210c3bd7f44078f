//! The BaseRank algorithm, which ranks the statements of a knowledge base by their exceptionality.
//!
//! Starting with `*_0 = K_defeasible`, every step keeps the statements `α~>β` whose antecedent is
//! exceptional, i.e. `K_classical ∪ *_i ⊨ ¬α`. The procedure stops at the first fixpoint `*_n = *_{n+1}`.
//! The finite ranks are `R_i = *_i \ *_{i+1}`, the infinite rank is `K_classical ∪ *_n`.
use std::time::Instant;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    datatypes::{Formula, KnowledgeBase, Rank, RankNumber, Ranking},
    error::{Error, Result},
    oracle::EntailmentOracle,
};

/// Result of the BaseRank computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseRank {
    /// The ranked knowledge base.
    pub knowledge_base: KnowledgeBase,
    /// The atoms of the knowledge base.
    pub signature: Vec<String>,
    /// The ranks `R_0, …, R_{n-1}, R_∞`.
    pub ranking: Ranking,
    /// The exceptionality sequence `*_0, …, *_n`.
    pub sequence: Vec<Rank>,
    /// Maps every defeasible statement to its antecedent.
    pub antecedents: IndexMap<String, String>,
    /// Seconds spent.
    pub time_taken: f64,
    /// The exceptionality checks of every element of the sequence.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<Vec<SequenceElementCheck>>,
}

/// One exceptionality check `K_classical ∪ *_i ⊨ ¬α`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceElementCheck {
    /// The index `i` of the checked element.
    pub element_number: usize,
    /// The negated antecedent `¬α`.
    pub antecedent_negation: Formula,
    /// The checked statement `α~>β`.
    pub formula: Formula,
    /// Whether the antecedent is exceptional.
    pub is_exceptional: bool,
}

/// One element `*_i` of the exceptionality sequence, together with the checks computing `*_{i+1}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceElement {
    /// The index `i`.
    pub element_number: usize,
    /// The statements of `*_i`.
    pub formulas: Vec<Formula>,
    /// The checks done on the statements of `*_i`.
    pub checks: Vec<SequenceElementCheck>,
    /// Whether `*_i` is the fixpoint.
    pub is_last_element: bool,
    /// Whether `*_i` is empty.
    pub is_empty: bool,
}

/// Step-by-step account of a [BaseRank] computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseRankExplanation {
    /// The ranked knowledge base.
    pub knowledge_base: KnowledgeBase,
    /// The exceptionality sequence with all checks.
    pub sequence: Vec<SequenceElement>,
    /// The resulting ranks.
    pub ranks: Ranking,
}

impl BaseRank {
    /// Ranks the knowledge base.
    ///
    /// Fails with [InconsistentClassicalCore][Error::InconsistentClassicalCore] if the classical statements have no model.
    pub fn compute(kb: &KnowledgeBase, oracle: &dyn EntailmentOracle) -> Result<Self> {
        log::info!("[Start] base rank of {} statements", kb.len());
        let start = Instant::now();
        let classical = kb.classical().collect::<Vec<_>>();
        if !oracle.is_consistent(&classical)? {
            log::info!("[Done] base rank: the classical statements are inconsistent");
            return Err(Error::InconsistentClassicalCore {
                statements: classical.iter().map(ToString::to_string).collect(),
            });
        }

        let mut current = kb.defeasible().collect::<Vec<_>>();
        let mut sequence = Vec::new();
        let mut checks = Vec::new();
        let mut finite = Vec::new();
        loop {
            let element_number = sequence.len();
            log::debug!("*_{}: {} statements", element_number, current.len());
            let (element_checks, next) = exceptional(element_number, &classical, &current, oracle)?;
            sequence.push(Rank::new(
                RankNumber::Finite(element_number),
                current.iter().map(|f| (*f).clone()).collect(),
            ));
            checks.push(element_checks);
            // `next` is a subset of `current`, equal lengths mean the fixpoint is reached
            if next.len() == current.len() {
                break;
            }
            finite.push(
                current
                    .iter()
                    .filter(|f| !next.contains(f))
                    .map(|f| (*f).clone())
                    .collect::<Vec<_>>(),
            );
            current = next;
        }

        let infinite = kb
            .iter()
            .filter(|f| !f.is_defeasible() || current.contains(f))
            .cloned()
            .collect();
        let ranking = Ranking::new(finite, infinite);
        let antecedents = kb
            .defeasible()
            .filter_map(|f| f.antecedent().map(|a| (f.to_string(), a.to_string())))
            .collect();
        let time_taken = start.elapsed().as_secs_f64();
        log::info!(
            "[Done] base rank: {} finite ranks in {:.6}s",
            ranking.finite_ranks().len(),
            time_taken
        );
        log::trace!("ranking:\n{}", ranking);
        Ok(Self {
            knowledge_base: kb.clone(),
            signature: kb.signature(),
            ranking,
            sequence,
            antecedents,
            time_taken,
            checks,
        })
    }

    /// Explains the computation, element by element.
    ///
    /// The checks are recomputed with `oracle` if they are not part of the result, e.g. because the
    /// result was read from its wire format.
    pub fn explain(&self, oracle: &dyn EntailmentOracle) -> Result<BaseRankExplanation> {
        log::info!("[Start] base rank explanation");
        let classical = self.knowledge_base.classical().collect::<Vec<_>>();
        let last = self.sequence.len().saturating_sub(1);
        let sequence = self
            .sequence
            .iter()
            .enumerate()
            .map(|(idx, element)| -> Result<SequenceElement> {
                let checks = match self.checks.get(idx) {
                    Some(checks) if checks.len() == element.formulas.len() => checks.clone(),
                    _ => {
                        let current = element.formulas.iter().collect::<Vec<_>>();
                        exceptional(idx, &classical, &current, oracle)?.0
                    }
                };
                Ok(SequenceElement {
                    element_number: idx,
                    formulas: element.formulas.clone(),
                    checks,
                    is_last_element: idx == last,
                    is_empty: element.formulas.is_empty(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        log::info!("[Done] base rank explanation");
        Ok(BaseRankExplanation {
            knowledge_base: self.knowledge_base.clone(),
            sequence,
            ranks: self.ranking.clone(),
        })
    }

    /// The base rank of a statement of the knowledge base.
    pub fn rank_of(&self, formula: &Formula) -> Option<RankNumber> {
        self.ranking.rank_of(formula)
    }
}

/// Checks every statement of `current` for exceptionality and returns the checks together with `*_{i+1}`.
fn exceptional<'a>(
    element_number: usize,
    classical: &[&'a Formula],
    current: &[&'a Formula],
    oracle: &dyn EntailmentOracle,
) -> Result<(Vec<SequenceElementCheck>, Vec<&'a Formula>)> {
    let premises = classical
        .iter()
        .chain(current.iter())
        .copied()
        .collect::<Vec<_>>();
    let mut checks = Vec::with_capacity(current.len());
    let mut next = Vec::new();
    for &formula in current {
        let antecedent_negation = match formula.antecedent() {
            Some(antecedent) => antecedent.negate(),
            None => continue,
        };
        let is_exceptional = oracle.entails(&premises, &antecedent_negation)?;
        log::trace!(
            "*_{}: {} exceptional: {}",
            element_number,
            formula,
            is_exceptional
        );
        if is_exceptional {
            next.push(formula);
        }
        checks.push(SequenceElementCheck {
            element_number,
            antecedent_negation,
            formula: formula.clone(),
            is_exceptional,
        });
    }
    Ok((checks, next))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::oracle::{Deadline, OracleKind};
    use test_log::test;

    fn rank(kb: &[&str]) -> Result<BaseRank> {
        let kb = KnowledgeBase::parse(kb)?;
        let oracle = OracleKind::default().build(&kb.signature(), Deadline::unlimited());
        BaseRank::compute(&kb, oracle.as_ref())
    }

    fn strings(rank: &Rank) -> Vec<String> {
        rank.formulas.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn penguins() {
        let result = rank(&["b=>p", "p~>f", "p~>w", "b~>!f"]).unwrap();
        let finite = result.ranking.finite_ranks();
        assert_eq!(finite.len(), 2);
        assert_eq!(strings(&finite[0]), vec!["p~>f", "p~>w"]);
        assert_eq!(strings(&finite[1]), vec!["b~>!f"]);
        assert_eq!(
            strings(result.ranking.infinite_rank().unwrap()),
            vec!["b=>p"]
        );
        assert_eq!(result.sequence.len(), 3);
        assert!(result.sequence[2].is_empty());
        assert_eq!(result.antecedents.get("b~>!f"), Some(&"b".to_string()));
        assert_eq!(result.antecedents.len(), 3);
        assert_eq!(result.signature, vec!["b", "f", "p", "w"]);
        assert_eq!(
            result.rank_of(&"b~>!f".parse().unwrap()),
            Some(RankNumber::Finite(1))
        );
    }

    #[test]
    fn non_empty_fixpoint() {
        // `a` is exceptional at every step, as the classical core refutes it
        let result = rank(&["!a", "a~>b", "c~>d"]).unwrap();
        assert_eq!(result.ranking.finite_ranks().len(), 1);
        assert_eq!(strings(&result.ranking.finite_ranks()[0]), vec!["c~>d"]);
        assert_eq!(
            strings(result.ranking.infinite_rank().unwrap()),
            vec!["!a", "a~>b"]
        );
        assert_eq!(result.sequence.len(), 2);
        assert!(!result.sequence[1].is_empty());
    }

    #[test]
    fn only_classical() {
        let result = rank(&["a", "a=>b"]).unwrap();
        assert!(result.ranking.finite_ranks().is_empty());
        assert_eq!(result.ranking.infinite_rank().unwrap().formulas.len(), 2);
        assert_eq!(result.sequence.len(), 1);
    }

    #[test]
    fn empty_knowledge_base() {
        let result = rank(&[]).unwrap();
        assert!(result.ranking.finite_ranks().is_empty());
        assert!(result.ranking.infinite_rank().unwrap().is_empty());
    }

    #[test]
    fn inconsistent() {
        assert!(matches!(
            rank(&["a=>b", "a=>!b", "a"]),
            Err(Error::InconsistentClassicalCore { .. })
        ));
    }

    #[test]
    fn explanation() {
        let kb = KnowledgeBase::parse(["b=>p", "p~>f", "p~>w", "b~>!f"]).unwrap();
        let oracle = OracleKind::default().build(&kb.signature(), Deadline::unlimited());
        let result = BaseRank::compute(&kb, oracle.as_ref()).unwrap();
        let explanation = result.explain(oracle.as_ref()).unwrap();
        assert_eq!(explanation.sequence.len(), 3);
        assert_eq!(explanation.sequence[0].checks.len(), 3);
        assert!(explanation.sequence[0].checks[2].is_exceptional);
        assert_eq!(
            explanation.sequence[0].checks[2].antecedent_negation.to_string(),
            "!b"
        );
        assert!(explanation.sequence[2].is_last_element);
        assert!(explanation.sequence[2].is_empty);
        assert!(!explanation.sequence[1].is_last_element);

        // without stored checks the explanation is recomputed identically
        let json = serde_json::to_value(&result).unwrap();
        let mut stripped: BaseRank = serde_json::from_value(json).unwrap();
        stripped.checks.clear();
        assert_eq!(stripped.explain(oracle.as_ref()).unwrap(), explanation);
    }
}
