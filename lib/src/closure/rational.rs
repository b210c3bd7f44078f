//! Rational closure.
//!
//! The lowest finite rank is removed as long as the remaining ranks entail `¬α`.
//! Whether ranks `R_k, …, R_∞` entail `¬α` is monotone in `k`, so the number of removed ranks can be
//! found by a linear, binary or ternary search; all variants yield the same result.
use std::time::Instant;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, EnumVariantNames};

use super::{
    conclude, ranks_entail, ClosureContext, EntailmentCommon, EntailmentResult, Outcome, Query,
    RankEntailmentCheck,
};
use crate::{
    datatypes::{Formula, Ranking},
    error::Result,
};

/// Strategy to find the number of ranks to remove.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
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
pub enum SearchVariant {
    /// Test the ranks from the lowest upwards.
    #[default]
    Naive,
    /// Bisect the number of removed ranks.
    Binary,
    /// Split the number of removed ranks into thirds.
    Ternary,
}

/// Rational closure result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RationalEntailment {
    /// Shared fields.
    #[serde(flatten)]
    pub common: EntailmentCommon,
    /// The tests done by the search, in the order they were done.
    #[serde(default)]
    pub checks: Vec<RankEntailmentCheck>,
}

/// Explanation of a rational closure result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RationalExplanation {
    /// The query `α~>β`.
    pub query_formula: Formula,
    /// The knowledge base.
    pub knowledge_base: Vec<Formula>,
    /// Whether the query is entailed.
    pub is_entailed: bool,
    /// The tests done, ordered by rank.
    pub checks: Vec<RankEntailmentCheck>,
    /// The BaseRank ranking.
    pub base_ranking: Ranking,
    /// The removed ranks.
    pub removed_ranking: Ranking,
    /// The remaining ranks.
    pub remaining_ranking: Ranking,
    /// The justifications of an entailed query.
    pub justification: Vec<Vec<Formula>>,
}

impl RationalEntailment {
    /// Explains the result.
    pub fn explain(&self) -> RationalExplanation {
        let mut checks = self.checks.clone();
        checks.sort_by_key(|check| check.rank_number);
        checks.dedup();
        RationalExplanation {
            query_formula: self.common.query_formula.clone(),
            knowledge_base: self.common.knowledge_base.iter().cloned().collect(),
            is_entailed: self.common.entailed,
            checks,
            base_ranking: self.common.base_ranking.clone(),
            removed_ranking: self.common.removed_ranking.clone(),
            remaining_ranking: self.common.remaining_ranking.clone(),
            justification: self.common.justification.clone(),
        }
    }
}

/// Decides `query` under rational closure.
pub fn entail(
    ctx: ClosureContext<'_>,
    query: &Formula,
    search: SearchVariant,
) -> Result<EntailmentResult> {
    log::info!("[Start] rational closure of {} ({} search)", query, search);
    let start = Instant::now();
    let query = Query::new(query)?;
    let ranks = ctx.base_rank.ranking.ranks();
    let finite = ctx.base_rank.ranking.finite_ranks().len();

    let mut checks = Vec::new();
    // `true` if the ranks from `k` upwards entail the negated antecedent
    let mut refuted = |k: usize| -> Result<bool> {
        let rank_number = ranks[k].rank_number;
        let entails_negation = ranks_entail(ctx.oracle, &ranks[k..], &query.negation)?;
        log::debug!("R_{}..R_∞ entail {}: {}", rank_number, query.negation, entails_negation);
        checks.push(RankEntailmentCheck {
            rank_number,
            negation: query.negation.clone(),
            entails_negation,
        });
        Ok(entails_negation)
    };
    let removed_count = match search {
        SearchVariant::Naive => {
            let mut k = 0;
            while k < finite && refuted(k)? {
                k += 1;
            }
            k
        }
        SearchVariant::Binary => {
            let (mut lo, mut hi) = (0, finite);
            while lo < hi {
                let mid = lo + (hi - lo) / 2;
                if refuted(mid)? {
                    lo = mid + 1;
                } else {
                    hi = mid;
                }
            }
            lo
        }
        SearchVariant::Ternary => {
            let (mut lo, mut hi) = (0, finite);
            while lo < hi {
                let first = lo + (hi - lo) / 3;
                let second = lo + 2 * (hi - lo) / 3;
                if !refuted(first)? {
                    hi = first;
                } else if second > first && !refuted(second)? {
                    lo = first + 1;
                    hi = second;
                } else {
                    lo = second + 1;
                }
            }
            lo
        }
    };
    log::debug!("removing {} of {} finite ranks", removed_count, finite);

    let outcome = Outcome {
        removed: Ranking::from(ranks[..removed_count].to_vec()),
        remaining: Ranking::from(ranks[removed_count..].to_vec()),
        inspected: removed_count,
    };
    let common = conclude(ctx, &query, outcome, start)?;
    log::info!("[Done] rational closure: entailed {}", common.entailed);
    Ok(EntailmentResult::Rational(RationalEntailment { common, checks }))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::closure::test::{strings, with_context};
    use crate::datatypes::RankNumber;
    use test_log::test;

    const PENGUINS: [&str; 4] = ["b=>p", "p~>f", "p~>w", "b~>!f"];

    #[test]
    fn penguins_do_not_fly() {
        with_context(&PENGUINS, true, |ctx| {
            let result = entail(ctx, &"b~>f".parse().unwrap(), SearchVariant::Naive).unwrap();
            let common = result.common();
            assert!(!common.entailed);
            assert!(common.justification.is_empty());
            assert_eq!(
                strings(&common.removed_ranking),
                vec![(
                    RankNumber::Finite(0),
                    vec!["p~>f".to_string(), "p~>w".to_string()]
                )]
            );
            assert_eq!(
                strings(&common.remaining_ranking),
                vec![
                    (RankNumber::Finite(1), vec!["b~>!f".to_string()]),
                    (RankNumber::Infinite, vec!["b=>p".to_string()])
                ]
            );
            assert_eq!(common.mini_base_ranking, common.base_ranking);
        });
    }

    #[test]
    fn birds_do_not_fly() {
        with_context(&PENGUINS, true, |ctx| {
            let result = entail(ctx, &"b~>!f".parse().unwrap(), SearchVariant::Naive).unwrap();
            let common = result.common();
            assert!(common.entailed);
            assert_eq!(
                common.justification,
                vec![vec!["b~>!f".parse::<Formula>().unwrap()]]
            );
            assert_eq!(
                common
                    .entailment_knowledge_base
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>(),
                vec!["b~>!f", "b=>p"]
            );
        });
    }

    #[test]
    fn typical_penguins() {
        with_context(&PENGUINS, false, |ctx| {
            let result = entail(ctx, &"p~>w".parse().unwrap(), SearchVariant::Naive).unwrap();
            let common = result.common();
            assert!(common.entailed);
            assert!(common.removed_ranking.is_empty());
            // justifications were not requested
            assert!(common.justification.is_empty());
            assert_eq!(common.mini_base_ranking.finite_ranks().len(), 1);
        });
    }

    #[test]
    fn single_statement() {
        with_context(&["p~>f"], true, |ctx| {
            let result = entail(ctx, &"p~>f".parse().unwrap(), SearchVariant::Naive).unwrap();
            let common = result.common();
            assert!(common.entailed);
            assert!(common.removed_ranking.is_empty());
            assert_eq!(
                common.justification,
                vec![vec!["p~>f".parse::<Formula>().unwrap()]]
            );
        });
    }

    #[test]
    fn only_infinite_rank() {
        with_context(&["a=>b"], true, |ctx| {
            let result = entail(ctx, &"a~>b".parse().unwrap(), SearchVariant::Binary).unwrap();
            assert!(result.entailed());
            if let EntailmentResult::Rational(rational) = result {
                assert!(rational.checks.is_empty());
            } else {
                panic!("rational closure returns rational results");
            }
        });
    }

    #[test]
    fn unbound_query() {
        with_context(&PENGUINS, true, |ctx| {
            assert!(matches!(
                entail(ctx, &"b~>z".parse().unwrap(), SearchVariant::Naive),
                Err(crate::error::Error::UnboundAtom { .. })
            ));
        });
    }

    #[test]
    fn search_variants_agree() {
        // a chain of five levels of exceptions
        let kb = [
            "s1=>s0", "s2=>s1", "s3=>s2", "s4=>s3", "s0~>f", "s1~>!f", "s2~>f", "s3~>!f", "s4~>f",
        ];
        with_context(&kb, false, |ctx| {
            assert_eq!(ctx.base_rank.ranking.finite_ranks().len(), 5);
            for query in ["s0~>f", "s1~>f", "s2~>f", "s3~>!f", "s4~>!f", "s4~>s0"] {
                let query: Formula = query.parse().unwrap();
                let results = [SearchVariant::Naive, SearchVariant::Binary, SearchVariant::Ternary]
                    .map(|search| entail(ctx, &query, search).unwrap());
                for result in &results[1..] {
                    assert_eq!(result.common().entailed, results[0].common().entailed);
                    assert_eq!(
                        result.common().removed_ranking,
                        results[0].common().removed_ranking
                    );
                }
            }
            // the removed ranks form a prefix of the ranking
            let result = entail(ctx, &"s3~>f".parse().unwrap(), SearchVariant::Ternary).unwrap();
            let removed = result.common().removed_ranking.ranks().len();
            assert_eq!(removed, 3);
            assert_eq!(
                result.common().remaining_ranking.ranks(),
                &ctx.base_rank.ranking.ranks()[removed..]
            );
            assert!(!result.entailed());
        });
    }

    #[test]
    fn explanation() {
        with_context(&PENGUINS, true, |ctx| {
            let result = entail(ctx, &"b~>f".parse().unwrap(), SearchVariant::Naive).unwrap();
            if let EntailmentResult::Rational(rational) = result {
                let explanation = rational.explain();
                assert_eq!(explanation.checks.len(), 2);
                assert!(explanation.checks[0].entails_negation);
                assert!(!explanation.checks[1].entails_negation);
                assert!(!explanation.is_entailed);
                assert_eq!(explanation.knowledge_base.len(), 4);
            } else {
                panic!("rational closure returns rational results");
            }
        });
    }
}
