use super::baserank::*;
use super::closure::*;
use super::datatypes::formula::test::{arbitrary_classical, ArbFormula};
use super::datatypes::*;
use super::error::Error;
use super::justification::*;
use super::oracle::*;
use super::reasoner::*;
use quickcheck::{Arbitrary, Gen, TestResult};
use quickcheck_macros::quickcheck;
use test_log::test;

fn reasoner(kb: &[&str]) -> Reasoner {
    Reasoner::new(KnowledgeBase::parse(kb).unwrap(), ReasonerConfig::default())
}

fn rendered(formulas: &[Formula]) -> Vec<String> {
    formulas.iter().map(ToString::to_string).collect()
}

/// Small knowledge bases over four atoms, mostly defeasible.
#[derive(Clone, Debug)]
struct ArbKnowledgeBase(KnowledgeBase);

impl Arbitrary for ArbKnowledgeBase {
    fn arbitrary(g: &mut Gen) -> Self {
        let len = usize::arbitrary(g) % 7;
        let kb = (0..len)
            .map(|_| {
                if u8::arbitrary(g) % 4 == 0 {
                    arbitrary_classical(g, 1)
                } else {
                    Formula::defeasible(arbitrary_classical(g, 1), arbitrary_classical(g, 1))
                }
            })
            .collect();
        ArbKnowledgeBase(kb)
    }
}

#[test]
fn penguins_snapshot() {
    let reasoner = reasoner(&["b=>p", "p~>f", "p~>w", "b~>!f"]);
    let base_rank = reasoner.base_rank().unwrap();
    assert_eq!(
        base_rank
            .ranking
            .ranks()
            .iter()
            .map(|rank| (rank.rank_number, rendered(&rank.formulas)))
            .collect::<Vec<_>>(),
        vec![
            (RankNumber::Finite(0), vec!["p~>f".to_string(), "p~>w".to_string()]),
            (RankNumber::Finite(1), vec!["b~>!f".to_string()]),
            (RankNumber::Infinite, vec!["b=>p".to_string()]),
        ]
    );
    assert_eq!(base_rank.sequence.len(), 3);
    assert_eq!(base_rank.antecedents.get("b~>!f"), Some(&"b".to_string()));

    let result = reasoner
        .entail(&"b~>f".parse().unwrap(), Algorithm::Rational, &base_rank)
        .unwrap();
    assert!(!result.entailed());
    assert_eq!(result.common().negation.to_string(), "!b");
    assert!(result.common().justification.is_empty());
}

#[test]
fn trivial_entailment() {
    let reasoner = reasoner(&["p~>f"]);
    let base_rank = reasoner.base_rank().unwrap();
    for algorithm in Algorithm::ALL {
        let result = reasoner
            .entail(&"p~>f".parse().unwrap(), algorithm, &base_rank)
            .unwrap();
        assert!(result.entailed(), "{algorithm}");
        assert!(result.common().removed_ranking.is_empty());
        assert_eq!(
            result
                .common()
                .justification
                .iter()
                .map(|set| rendered(set))
                .collect::<Vec<_>>(),
            vec![vec!["p~>f".to_string()]]
        );
    }
}

#[test]
fn inconsistent_classical_core() {
    let reasoner = reasoner(&["a=>b", "a=>!b", "a"]);
    let err = reasoner.base_rank().unwrap_err();
    assert!(matches!(err, Error::InconsistentClassicalCore { .. }));
    assert_eq!(err.code(), "inconsistent_classical_core");
}

#[test]
fn base_rank_wire_round_trip() {
    let base_rank = reasoner(&["b=>p", "p~>f", "p~>w", "b~>!f", "r~>b", "r~>!w"])
        .base_rank()
        .unwrap();
    let json = serde_json::to_value(&base_rank).unwrap();
    assert_eq!(json["ranking"][2]["rankNumber"], 999_999_999);

    let read: BaseRank = serde_json::from_value(json).unwrap();
    assert_eq!(read.knowledge_base, base_rank.knowledge_base);
    assert_eq!(read.signature, base_rank.signature);
    assert_eq!(read.ranking, base_rank.ranking);
    assert_eq!(read.sequence, base_rank.sequence);
    assert_eq!(read.antecedents, base_rank.antecedents);

    // a ranking read from the wire decides like the computed one
    let reasoner = Reasoner::new(read.knowledge_base.clone(), ReasonerConfig::default());
    let query: Formula = "r~>f".parse().unwrap();
    for algorithm in Algorithm::ALL {
        assert_eq!(
            reasoner.entail(&query, algorithm, &read).unwrap().entailed(),
            reasoner.entail(&query, algorithm, &base_rank).unwrap().entailed()
        );
    }
}

#[test]
fn explanation_of_wire_ranking() {
    let reasoner = reasoner(&["b=>p", "p~>f", "b~>!f"]);
    let mut base_rank = reasoner.base_rank().unwrap();
    let expected = reasoner.explain_base_rank(&base_rank).unwrap();
    base_rank.checks.clear();
    let recomputed = reasoner.explain_base_rank(&base_rank).unwrap();
    assert_eq!(expected, recomputed);
    assert!(recomputed.sequence.last().unwrap().is_last_element);
}

#[test]
fn justification_completeness() {
    let deciding = ["a=>b", "b=>c", "a=>c", "d=>c", "a~>e"]
        .into_iter()
        .map(|f| f.parse().unwrap())
        .collect::<Vec<Formula>>();
    let kb = deciding.iter().cloned().collect::<KnowledgeBase>();
    let oracle = OracleKind::default().build(&kb.signature(), Deadline::unlimited());
    let mut sets = JustificationEngine::new(&deciding, oracle.as_ref())
        .justify(&"a=>c".parse().unwrap())
        .unwrap()
        .sets
        .iter()
        .map(|set| rendered(set))
        .collect::<Vec<_>>();
    sets.sort();
    assert_eq!(
        sets,
        vec![
            vec!["a=>b".to_string(), "b=>c".to_string()],
            vec!["a=>c".to_string()],
        ]
    );
}

#[quickcheck]
fn rank_partition(kb: ArbKnowledgeBase) -> TestResult {
    let reasoner = Reasoner::new(kb.0, ReasonerConfig::default());
    let base_rank = match reasoner.base_rank() {
        Ok(base_rank) => base_rank,
        Err(Error::InconsistentClassicalCore { .. }) => return TestResult::discard(),
        Err(err) => return TestResult::error(err.to_string()),
    };
    let ranked = base_rank.ranking.formulas().collect::<Vec<_>>();
    let kb = reasoner.knowledge_base();
    TestResult::from_bool(
        ranked.len() == kb.len()
            && kb.iter().all(|f| ranked.contains(&f))
            && kb
                .classical()
                .all(|f| base_rank.rank_of(f) == Some(RankNumber::Infinite))
            && base_rank
                .ranking
                .finite_ranks()
                .iter()
                .all(|rank| !rank.is_empty()),
    )
}

#[quickcheck]
fn exceptionality_monotone(kb: ArbKnowledgeBase) -> TestResult {
    let defeasible = kb.0.defeasible().count();
    let base_rank = match reasoner_for(kb).base_rank() {
        Ok(base_rank) => base_rank,
        Err(_) => return TestResult::discard(),
    };
    let shrinking = base_rank.sequence.windows(2).all(|pair| {
        pair[1]
            .formulas
            .iter()
            .all(|f| pair[0].formulas.contains(f))
            && pair[1].formulas.len() < pair[0].formulas.len()
    });
    TestResult::from_bool(shrinking && base_rank.sequence.len() <= defeasible + 1)
}

fn reasoner_for(kb: ArbKnowledgeBase) -> Reasoner {
    Reasoner::new(kb.0, ReasonerConfig::default())
}

#[quickcheck]
fn rational_removal_prefix_closed(kb: ArbKnowledgeBase, query: ArbFormula) -> TestResult {
    let query = match query.0 {
        query @ Formula::Defeasible(..) => query,
        classical => Formula::defeasible(classical, Formula::atom("a")),
    };
    let mut kb = kb.0;
    // the query may only use atoms of the knowledge base
    kb.insert("(a||!a)&&(b||!b)&&(c||!c)&&(d||!d)".parse().unwrap());
    let reasoner = Reasoner::new(kb, ReasonerConfig::default());
    let base_rank = match reasoner.base_rank() {
        Ok(base_rank) => base_rank,
        Err(_) => return TestResult::discard(),
    };
    let result = match reasoner.entail(&query, Algorithm::Rational, &base_rank) {
        Ok(result) => result,
        Err(err) => return TestResult::error(err.to_string()),
    };
    let removed = result
        .common()
        .removed_ranking
        .ranks()
        .iter()
        .map(|rank| rank.rank_number)
        .collect::<Vec<_>>();
    TestResult::from_bool(
        removed
            .iter()
            .enumerate()
            .all(|(idx, number)| *number == RankNumber::Finite(idx)),
    )
}

#[quickcheck]
fn justifications_minimal(kb: ArbKnowledgeBase, goal: ArbFormula) -> TestResult {
    let deciding = kb.0.iter().cloned().collect::<Vec<_>>();
    let signature = ["a", "b", "c", "d"].map(String::from);
    let oracle = OracleKind::default().build(&signature, Deadline::unlimited());
    let goal = goal.0.materialize();
    let sets = match JustificationEngine::new(&deciding, oracle.as_ref()).justify(&goal) {
        Ok(justifications) => justifications.sets,
        Err(err) => return TestResult::error(err.to_string()),
    };
    let sound_and_minimal = sets.iter().all(|set| {
        let premises = set.iter().collect::<Vec<_>>();
        oracle.entails(&premises, &goal).unwrap_or(false)
            && (0..premises.len()).all(|skip| {
                let smaller = premises
                    .iter()
                    .enumerate()
                    .filter(|(idx, _)| *idx != skip)
                    .map(|(_, f)| *f)
                    .collect::<Vec<_>>();
                !oracle.entails(&smaller, &goal).unwrap_or(true)
            })
    });
    let all = deciding.iter().collect::<Vec<_>>();
    let complete = sets.is_empty() != oracle.entails(&all, &goal).unwrap_or(false);
    TestResult::from_bool(sound_and_minimal && complete)
}

/// Every minimal subset of `deciding` entailing `goal`, as sorted positions, by trying all subsets.
fn minimal_entailing_subsets(
    deciding: &[Formula],
    goal: &Formula,
    oracle: &dyn EntailmentOracle,
) -> Vec<Vec<usize>> {
    let entailing = (0u32..1 << deciding.len())
        .map(|mask| {
            (0..deciding.len())
                .filter(|pos| mask & (1 << pos) != 0)
                .collect::<Vec<_>>()
        })
        .filter(|subset| {
            let premises = subset.iter().map(|&pos| &deciding[pos]).collect::<Vec<_>>();
            oracle.entails(&premises, goal).unwrap_or(false)
        })
        .collect::<Vec<_>>();
    let mut minimal = entailing
        .iter()
        .filter(|subset| {
            !entailing.iter().any(|other| {
                other.len() < subset.len() && other.iter().all(|pos| subset.contains(pos))
            })
        })
        .cloned()
        .collect::<Vec<_>>();
    minimal.sort();
    minimal
}

#[quickcheck]
fn justifications_complete(kb: ArbKnowledgeBase, goal: ArbFormula) -> TestResult {
    let deciding = kb.0.iter().cloned().collect::<Vec<_>>();
    let signature = ["a", "b", "c", "d"].map(String::from);
    let oracle = OracleKind::default().build(&signature, Deadline::unlimited());
    let goal = goal.0.materialize();
    let sets = match JustificationEngine::new(&deciding, oracle.as_ref()).justify(&goal) {
        Ok(justifications) => justifications.sets,
        Err(err) => return TestResult::error(err.to_string()),
    };
    let mut found = sets
        .iter()
        .map(|set| {
            set.iter()
                .filter_map(|f| deciding.iter().position(|d| d == f))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    found.sort();
    TestResult::from_bool(found == minimal_entailing_subsets(&deciding, &goal, oracle.as_ref()))
}
