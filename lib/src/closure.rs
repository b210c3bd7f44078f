//! Defeasible entailment on top of a [BaseRank] ranking.
//!
//! All closures share the same outline: as long as the remaining statements entail the negation `¬α`
//! of the query antecedent, statements of the lowest remaining rank are given up. The query `α~>β` is
//! entailed if the statements which are left (the deciding knowledge base) entail `α=>β`.
//! The closures differ in what they give up:
//!  - [rational] removes the whole rank
//!  - [lexicographic] keeps a maximal subset of the rank if there is one
//!  - [relevant] removes only the statements which are relevant to `¬α`
pub mod lexicographic;
pub mod rational;
pub mod relevant;

use std::time::Instant;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, EnumVariantNames};

use crate::{
    baserank::BaseRank,
    datatypes::{Formula, KnowledgeBase, Rank, RankNumber, Ranking},
    error::{Error, Result},
    justification::JustificationEngine,
    oracle::EntailmentOracle,
};

pub use self::{
    lexicographic::{LexicographicEntailment, LexicographicExplanation, RankRefinement, SubsetVariant},
    rational::{RationalEntailment, RationalExplanation, SearchVariant},
    relevant::{RelevantEntailment, RelevantExplanation, Relevance},
};

/// The available closure operations, named as in the request paths of the service.
///
/// Results and explanations carry a descriptive `type` tag instead of the short name:
///
/// | short name | `type` tag        |
/// |------------|-------------------|
/// | `rational` | `rational`        |
/// | `lexical`  | `lexicographic`   |
/// | `brelc`    | `basicRelevant`   |
/// | `mrelc`    | `minimalRelevant` |
///
/// [EntailmentResult::algorithm] maps a result back to its short name.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumString,
    EnumVariantNames,
    Display,
    Serialize,
    Deserialize,
)]
pub enum Algorithm {
    /// Rational closure.
    #[strum(serialize = "rational")]
    #[serde(rename = "rational")]
    Rational,
    /// Lexicographic closure.
    #[strum(serialize = "lexical")]
    #[serde(rename = "lexical")]
    Lexicographic,
    /// Basic relevant closure.
    #[strum(serialize = "brelc")]
    #[serde(rename = "brelc")]
    BasicRelevant,
    /// Minimal relevant closure.
    #[strum(serialize = "mrelc")]
    #[serde(rename = "mrelc")]
    MinimalRelevant,
}

impl Algorithm {
    /// All closure operations.
    pub const ALL: [Algorithm; 4] = [
        Algorithm::Rational,
        Algorithm::Lexicographic,
        Algorithm::BasicRelevant,
        Algorithm::MinimalRelevant,
    ];
}

/// Everything a closure operation needs besides the query.
#[derive(Debug, Clone, Copy)]
pub struct ClosureContext<'a> {
    /// The ranking of the knowledge base.
    pub base_rank: &'a BaseRank,
    /// An oracle over the signature of the knowledge base.
    pub oracle: &'a dyn EntailmentOracle,
    /// Whether justifications of an entailed query are computed.
    pub justify: bool,
}

/// The fields all closure results share.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntailmentCommon {
    /// The query `α~>β`.
    pub query_formula: Formula,
    /// The negated antecedent `¬α`.
    pub negation: Formula,
    /// The knowledge base.
    pub knowledge_base: KnowledgeBase,
    /// The deciding knowledge base, i.e. the remaining statements.
    pub entailment_knowledge_base: Vec<Formula>,
    /// The signature of the knowledge base.
    pub signature: Vec<String>,
    /// Whether the query is entailed.
    pub entailed: bool,
    /// The BaseRank ranking.
    pub base_ranking: Ranking,
    /// The part of the base ranking which was inspected.
    pub mini_base_ranking: Ranking,
    /// Seconds spent on the entailment check.
    pub time_taken: f64,
    /// Seconds spent on the justifications.
    pub justification_time: f64,
    /// The statements given up, per rank.
    pub removed_ranking: Ranking,
    /// The statements left, per rank.
    pub remaining_ranking: Ranking,
    /// The justifications of an entailed query.
    pub justification: Vec<Vec<Formula>>,
}

/// Result of a closure operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EntailmentResult {
    /// Result of [rational::entail].
    Rational(RationalEntailment),
    /// Result of [lexicographic::entail].
    Lexicographic(LexicographicEntailment),
    /// Result of [relevant::entail] with [Relevance::Basic].
    BasicRelevant(RelevantEntailment),
    /// Result of [relevant::entail] with [Relevance::Minimal].
    MinimalRelevant(RelevantEntailment),
}

impl EntailmentResult {
    /// The fields shared by all results.
    pub fn common(&self) -> &EntailmentCommon {
        match self {
            EntailmentResult::Rational(result) => &result.common,
            EntailmentResult::Lexicographic(result) => &result.common,
            EntailmentResult::BasicRelevant(result) | EntailmentResult::MinimalRelevant(result) => {
                &result.common
            }
        }
    }

    /// The closure operation which computed the result.
    pub fn algorithm(&self) -> Algorithm {
        match self {
            EntailmentResult::Rational(_) => Algorithm::Rational,
            EntailmentResult::Lexicographic(_) => Algorithm::Lexicographic,
            EntailmentResult::BasicRelevant(_) => Algorithm::BasicRelevant,
            EntailmentResult::MinimalRelevant(_) => Algorithm::MinimalRelevant,
        }
    }

    /// Whether the query is entailed.
    pub fn entailed(&self) -> bool {
        self.common().entailed
    }

    /// Explains how the result came about.
    pub fn explain(&self) -> Explanation {
        match self {
            EntailmentResult::Rational(result) => Explanation::Rational(result.explain()),
            EntailmentResult::Lexicographic(result) => Explanation::Lexicographic(result.explain()),
            EntailmentResult::BasicRelevant(result) => Explanation::BasicRelevant(result.explain()),
            EntailmentResult::MinimalRelevant(result) => {
                Explanation::MinimalRelevant(result.explain())
            }
        }
    }
}

/// Algorithm specific account of an [EntailmentResult].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Explanation {
    /// Explanation of a rational closure result.
    Rational(RationalExplanation),
    /// Explanation of a lexicographic closure result.
    Lexicographic(LexicographicExplanation),
    /// Explanation of a basic relevant closure result.
    BasicRelevant(RelevantExplanation),
    /// Explanation of a minimal relevant closure result.
    MinimalRelevant(RelevantExplanation),
}

/// One test whether the statements left at a rank entail the negated antecedent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankEntailmentCheck {
    /// The lowest rank which was still part of the tested statements.
    pub rank_number: RankNumber,
    /// The negated antecedent `¬α`.
    pub negation: Formula,
    /// Whether the tested statements entail `¬α`.
    pub entails_negation: bool,
}

/// The query in the shapes the closures need.
#[derive(Debug, Clone)]
pub(crate) struct Query {
    pub(crate) formula: Formula,
    pub(crate) negation: Formula,
    pub(crate) materialized: Formula,
}

impl Query {
    /// Fails with [MalformedDefeasibleImplication][Error::MalformedDefeasibleImplication] if the query is classical.
    pub(crate) fn new(query: &Formula) -> Result<Self> {
        match query.antecedent() {
            Some(antecedent) => Ok(Self {
                formula: query.clone(),
                negation: antecedent.negate(),
                materialized: query.materialize(),
            }),
            None => Err(Error::MalformedDefeasibleImplication {
                formula: query.to_string(),
                reason: "a query has to be a defeasible implication".to_string(),
            }),
        }
    }
}

/// The statements given up and kept by a closure operation.
#[derive(Debug)]
pub(crate) struct Outcome {
    pub(crate) removed: Ranking,
    pub(crate) remaining: Ranking,
    /// Position of the highest inspected finite rank in the base ranking.
    pub(crate) inspected: usize,
}

/// Returns `true` if the statements of `ranks` entail `goal`.
pub(crate) fn ranks_entail(
    oracle: &dyn EntailmentOracle,
    ranks: &[Rank],
    goal: &Formula,
) -> Result<bool> {
    let premises = ranks
        .iter()
        .flat_map(|rank| rank.formulas.iter())
        .collect::<Vec<_>>();
    oracle.entails(&premises, goal)
}

/// Decides the query on the remaining statements and computes the justifications if asked to.
pub(crate) fn conclude(
    ctx: ClosureContext<'_>,
    query: &Query,
    outcome: Outcome,
    start: Instant,
) -> Result<EntailmentCommon> {
    let deciding = outcome.remaining.formulas().cloned().collect::<Vec<_>>();
    let entailed = ranks_entail(ctx.oracle, outcome.remaining.ranks(), &query.materialized)?;
    let time_taken = start.elapsed().as_secs_f64();
    log::debug!("{} entailed: {}", query.formula, entailed);
    let (justification, justification_time) = if entailed && ctx.justify {
        let justifications =
            JustificationEngine::new(&deciding, ctx.oracle).justify(&query.materialized)?;
        (justifications.sets, justifications.time_taken)
    } else {
        (Vec::new(), 0.0)
    };
    let base_ranking = ctx.base_rank.ranking.clone();
    // rank numbers of a ranking read from the wire need not be contiguous
    let mini_base_ranking = Ranking::from(
        base_ranking
            .ranks()
            .iter()
            .enumerate()
            .filter(|(pos, rank)| rank.rank_number.is_infinite() || *pos <= outcome.inspected)
            .map(|(_, rank)| rank.clone())
            .collect::<Vec<_>>(),
    );
    Ok(EntailmentCommon {
        query_formula: query.formula.clone(),
        negation: query.negation.clone(),
        knowledge_base: ctx.base_rank.knowledge_base.clone(),
        entailment_knowledge_base: deciding,
        signature: ctx.base_rank.signature.clone(),
        entailed,
        base_ranking,
        mini_base_ranking,
        time_taken,
        justification_time,
        removed_ranking: outcome.removed,
        remaining_ranking: outcome.remaining,
        justification,
    })
}
