//! Basic and minimal relevant closure.
//!
//! Relevance is defined through the justifications of `K ⊨ ¬α`: every minimal subset of the knowledge
//! base which entails the negated antecedent is a reason to give statements up.
//!  - basic relevance: every defeasible statement of a justification is relevant
//!  - minimal relevance: of every justification, only the defeasible statements of lowest base rank are relevant
//!
//! The removal mirrors rational closure, but at rank `R_i` only the relevant statements are removed.
use std::{collections::HashSet, time::Instant};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, EnumVariantNames};

use super::{
    conclude, ranks_entail, ClosureContext, EntailmentCommon, EntailmentResult, Outcome, Query,
    RankEntailmentCheck,
};
use crate::{
    datatypes::{Formula, Rank, RankNumber, Ranking},
    error::Result,
    justification::JustificationEngine,
};

/// Which statements of a justification are relevant.
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
pub enum Relevance {
    /// All defeasible statements.
    Basic,
    /// The defeasible statements of lowest base rank.
    Minimal,
}

/// Relevant closure result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelevantEntailment {
    /// Shared fields.
    #[serde(flatten)]
    pub common: EntailmentCommon,
    /// The base ranking restricted to the relevant statements.
    pub relevant_ranking: Ranking,
    /// The justifications of `K ⊨ ¬α`.
    #[serde(default)]
    pub negation_justifications: Vec<Vec<Formula>>,
    /// The tests whether the remaining statements entail `¬α`.
    #[serde(default)]
    pub checks: Vec<RankEntailmentCheck>,
}

/// Explanation of a relevant closure result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelevantExplanation {
    /// The query `α~>β`.
    pub query_formula: Formula,
    /// The knowledge base.
    pub knowledge_base: Vec<Formula>,
    /// Whether the query is entailed.
    pub is_entailed: bool,
    /// The justifications of `K ⊨ ¬α`.
    pub negation_justifications: Vec<Vec<Formula>>,
    /// The tests whether the remaining statements entail `¬α`.
    pub checks: Vec<RankEntailmentCheck>,
    /// The BaseRank ranking.
    pub base_ranking: Ranking,
    /// The relevant statements.
    pub relevant_ranking: Ranking,
    /// The statements given up.
    pub removed_ranking: Ranking,
    /// The statements left.
    pub remaining_ranking: Ranking,
    /// The justifications of an entailed query.
    pub justification: Vec<Vec<Formula>>,
}

impl RelevantEntailment {
    /// Explains the result.
    pub fn explain(&self) -> RelevantExplanation {
        RelevantExplanation {
            query_formula: self.common.query_formula.clone(),
            knowledge_base: self.common.knowledge_base.iter().cloned().collect(),
            is_entailed: self.common.entailed,
            negation_justifications: self.negation_justifications.clone(),
            checks: self.checks.clone(),
            base_ranking: self.common.base_ranking.clone(),
            relevant_ranking: self.relevant_ranking.clone(),
            removed_ranking: self.common.removed_ranking.clone(),
            remaining_ranking: self.common.remaining_ranking.clone(),
            justification: self.common.justification.clone(),
        }
    }
}

/// Decides `query` under basic or minimal relevant closure.
pub fn entail(
    ctx: ClosureContext<'_>,
    query: &Formula,
    relevance: Relevance,
) -> Result<EntailmentResult> {
    log::info!("[Start] {} relevant closure of {}", relevance, query);
    let start = Instant::now();
    let query = Query::new(query)?;
    let ranking = &ctx.base_rank.ranking;
    let finite = ranking.finite_ranks().len();

    let statements = ctx
        .base_rank
        .knowledge_base
        .iter()
        .cloned()
        .collect::<Vec<_>>();
    let negation_justifications = JustificationEngine::new(&statements, ctx.oracle)
        .justify(&query.negation)?
        .sets;
    let relevant = relevant_statements(&negation_justifications, ranking, relevance);
    log::debug!("{} relevant statements", relevant.len());
    let relevant_ranking = ranking.filter_formulas(|f| relevant.contains(f));

    let mut current = ranking.ranks().to_vec();
    let mut removed = Vec::new();
    let mut checks = Vec::new();
    let mut inspected = 0;
    for idx in 0..finite {
        inspected = idx;
        let entails_negation = ranks_entail(ctx.oracle, &current, &query.negation)?;
        log::debug!(
            "remaining statements at R_{} entail {}: {}",
            current[idx].rank_number,
            query.negation,
            entails_negation
        );
        checks.push(RankEntailmentCheck {
            rank_number: current[idx].rank_number,
            negation: query.negation.clone(),
            entails_negation,
        });
        if !entails_negation {
            break;
        }
        let rank = &mut current[idx];
        let (gone, kept): (Vec<_>, Vec<_>) = rank
            .formulas
            .drain(..)
            .partition(|f| relevant.contains(f));
        rank.formulas = kept;
        if !gone.is_empty() {
            removed.push(Rank::new(rank.rank_number, gone));
        }
    }

    let remaining = current
        .into_iter()
        .filter(|rank| rank.rank_number.is_infinite() || !rank.is_empty())
        .collect::<Vec<_>>();
    let outcome = Outcome {
        removed: Ranking::from(removed),
        remaining: Ranking::from(remaining),
        inspected,
    };
    let common = conclude(ctx, &query, outcome, start)?;
    log::info!("[Done] {} relevant closure: entailed {}", relevance, common.entailed);
    let result = RelevantEntailment {
        common,
        relevant_ranking,
        negation_justifications,
        checks,
    };
    Ok(match relevance {
        Relevance::Basic => EntailmentResult::BasicRelevant(result),
        Relevance::Minimal => EntailmentResult::MinimalRelevant(result),
    })
}

/// The relevant statements according to the justifications of `¬α`.
fn relevant_statements(
    justifications: &[Vec<Formula>],
    ranking: &Ranking,
    relevance: Relevance,
) -> HashSet<Formula> {
    let mut relevant = HashSet::new();
    for justification in justifications {
        let defeasible = justification
            .iter()
            .filter(|f| f.is_defeasible())
            .map(|f| (ranking.rank_of(f).unwrap_or(RankNumber::Infinite), f));
        match relevance {
            Relevance::Basic => relevant.extend(defeasible.map(|(_, f)| f.clone())),
            Relevance::Minimal => {
                let members = defeasible.collect::<Vec<_>>();
                if let Some(lowest) = members.iter().map(|(rank, _)| *rank).min() {
                    relevant.extend(
                        members
                            .into_iter()
                            .filter(|(rank, _)| *rank == lowest)
                            .map(|(_, f)| f.clone()),
                    );
                }
            }
        }
    }
    relevant
}
