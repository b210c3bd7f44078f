//! Per-request orchestration of the reasoning engines.
//!
//! A [Reasoner] holds a knowledge base and a [ReasonerConfig]. Every operation starts its own
//! [Deadline] and builds its own oracle, so a reasoner can be shared between threads.
//! The [BaseRank] of a knowledge base is computed once and then handed to the closure operations,
//! which only read it; [entail_all][Reasoner::entail_all] runs all four closures in parallel on it.
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    baserank::{BaseRank, BaseRankExplanation},
    closure::{
        lexicographic, rational, relevant, Algorithm, ClosureContext, EntailmentResult,
        Explanation, Relevance, SearchVariant, SubsetVariant,
    },
    datatypes::{Formula, KnowledgeBase},
    error::Result,
    justification::{JustificationEngine, Justifications},
    oracle::{Deadline, EntailmentOracle, OracleKind},
};

/// Settings of a [Reasoner].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReasonerConfig {
    /// The oracle implementation.
    pub oracle: OracleKind,
    /// Time budget of a single operation in milliseconds, `None` for no limit.
    pub timeout_ms: Option<u64>,
    /// Whether justifications of entailed queries are computed.
    pub justification: bool,
    /// The search used by rational closure.
    pub search: SearchVariant,
    /// The subset enumeration used by lexicographic closure.
    pub subsets: SubsetVariant,
}

impl Default for ReasonerConfig {
    fn default() -> Self {
        Self {
            oracle: OracleKind::default(),
            timeout_ms: None,
            justification: true,
            search: SearchVariant::default(),
            subsets: SubsetVariant::default(),
        }
    }
}

impl ReasonerConfig {
    /// The time budget as a [Duration].
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// Runs the reasoning engines on one knowledge base.
#[derive(Debug, Clone)]
pub struct Reasoner {
    knowledge_base: KnowledgeBase,
    config: ReasonerConfig,
}

impl Reasoner {
    /// Creates a reasoner.
    pub fn new(knowledge_base: KnowledgeBase, config: ReasonerConfig) -> Self {
        Self {
            knowledge_base,
            config,
        }
    }

    /// The knowledge base.
    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.knowledge_base
    }

    /// The settings.
    pub fn config(&self) -> &ReasonerConfig {
        &self.config
    }

    fn oracle(&self, kb: &KnowledgeBase, deadline: Deadline) -> Box<dyn EntailmentOracle> {
        self.config.oracle.build(&kb.signature(), deadline)
    }

    fn deadline(&self) -> Deadline {
        Deadline::new(self.config.timeout())
    }

    /// Ranks the knowledge base.
    pub fn base_rank(&self) -> Result<BaseRank> {
        let oracle = self.oracle(&self.knowledge_base, self.deadline());
        BaseRank::compute(&self.knowledge_base, oracle.as_ref())
    }

    /// Explains a ranking, see [BaseRank::explain].
    pub fn explain_base_rank(&self, base_rank: &BaseRank) -> Result<BaseRankExplanation> {
        let oracle = self.oracle(&base_rank.knowledge_base, self.deadline());
        base_rank.explain(oracle.as_ref())
    }

    /// Decides `query` with one closure operation on top of `base_rank`.
    pub fn entail(
        &self,
        query: &Formula,
        algorithm: Algorithm,
        base_rank: &BaseRank,
    ) -> Result<EntailmentResult> {
        self.entail_until(query, algorithm, base_rank, self.deadline())
    }

    fn entail_until(
        &self,
        query: &Formula,
        algorithm: Algorithm,
        base_rank: &BaseRank,
        deadline: Deadline,
    ) -> Result<EntailmentResult> {
        let oracle = self.oracle(&base_rank.knowledge_base, deadline);
        let ctx = ClosureContext {
            base_rank,
            oracle: oracle.as_ref(),
            justify: self.config.justification,
        };
        match algorithm {
            Algorithm::Rational => rational::entail(ctx, query, self.config.search),
            Algorithm::Lexicographic => lexicographic::entail(ctx, query, self.config.subsets),
            Algorithm::BasicRelevant => relevant::entail(ctx, query, Relevance::Basic),
            Algorithm::MinimalRelevant => relevant::entail(ctx, query, Relevance::Minimal),
        }
    }

    /// Decides `query` with all closure operations in parallel, sharing `base_rank` and one deadline.
    ///
    /// The results are in the order of [Algorithm::ALL].
    pub fn entail_all(&self, query: &Formula, base_rank: &BaseRank) -> Result<Vec<EntailmentResult>> {
        log::info!("[Start] all closures of {}", query);
        let deadline = self.deadline();
        let results = std::thread::scope(|scope| {
            let handles = Algorithm::ALL.map(|algorithm| {
                scope.spawn(move || self.entail_until(query, algorithm, base_rank, deadline))
            });
            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
                })
                .collect::<Result<Vec<_>>>()
        })?;
        log::info!("[Done] all closures of {}", query);
        Ok(results)
    }

    /// Computes the justifications of `query` on the deciding knowledge base of `result`.
    pub fn justify(&self, result: &EntailmentResult) -> Result<Justifications> {
        let common = result.common();
        let oracle = self.oracle(&common.knowledge_base, self.deadline());
        JustificationEngine::new(&common.entailment_knowledge_base, oracle.as_ref())
            .justify(&common.query_formula)
    }

    /// Explains a closure result.
    pub fn explain(&self, result: &EntailmentResult) -> Explanation {
        result.explain()
    }
}
