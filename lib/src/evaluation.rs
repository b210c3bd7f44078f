//! Benchmarking of the closure operations and their implementation variants.
//!
//! An [EvaluationRequest] consists of independent jobs, either generator settings or imported
//! knowledge bases with their queries. Every job runs on its own worker thread, which builds its own
//! knowledge base and sends its [EvaluationReport] back over a channel.
pub mod generator;

use std::time::Instant;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, EnumVariantNames};

use crate::{
    closure::{Algorithm, SearchVariant, SubsetVariant},
    datatypes::{Formula, KnowledgeBase},
    error::Result,
    oracle::OracleKind,
    reasoner::{Reasoner, ReasonerConfig},
};

pub use generator::{CharacterSet, Complexity, Distribution, GeneratedKnowledgeBase, GeneratorConfig};

/// A closure operation in one of its implementation variants.
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
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum Implementation {
    /// Rational closure, linear search.
    RationalNaive,
    /// Rational closure, binary search.
    RationalBinary,
    /// Rational closure, ternary search.
    RationalTernary,
    /// Lexicographic closure, subsets generated by size.
    LexicalNaive,
    /// Lexicographic closure, subsets taken from the sorted power set.
    LexicalPowerSet,
    /// Basic relevant closure.
    BasicRelevant,
    /// Minimal relevant closure.
    MinimalRelevant,
}

impl Implementation {
    /// All implementations.
    pub const ALL: [Implementation; 7] = [
        Implementation::RationalNaive,
        Implementation::RationalBinary,
        Implementation::RationalTernary,
        Implementation::LexicalNaive,
        Implementation::LexicalPowerSet,
        Implementation::BasicRelevant,
        Implementation::MinimalRelevant,
    ];

    /// The closure operation.
    pub fn algorithm(&self) -> Algorithm {
        match self {
            Implementation::RationalNaive
            | Implementation::RationalBinary
            | Implementation::RationalTernary => Algorithm::Rational,
            Implementation::LexicalNaive | Implementation::LexicalPowerSet => {
                Algorithm::Lexicographic
            }
            Implementation::BasicRelevant => Algorithm::BasicRelevant,
            Implementation::MinimalRelevant => Algorithm::MinimalRelevant,
        }
    }

    /// Name of the variant.
    pub fn variant(&self) -> &'static str {
        match self {
            Implementation::RationalNaive | Implementation::LexicalNaive => "naive",
            Implementation::RationalBinary => "binary",
            Implementation::RationalTernary => "ternary",
            Implementation::LexicalPowerSet => "powerset",
            Implementation::BasicRelevant | Implementation::MinimalRelevant => "default",
        }
    }

    /// Adjusts `config` to select this variant.
    pub fn configure(&self, config: ReasonerConfig) -> ReasonerConfig {
        match self {
            Implementation::RationalNaive => ReasonerConfig {
                search: SearchVariant::Naive,
                ..config
            },
            Implementation::RationalBinary => ReasonerConfig {
                search: SearchVariant::Binary,
                ..config
            },
            Implementation::RationalTernary => ReasonerConfig {
                search: SearchVariant::Ternary,
                ..config
            },
            Implementation::LexicalNaive => ReasonerConfig {
                subsets: SubsetVariant::Naive,
                ..config
            },
            Implementation::LexicalPowerSet => ReasonerConfig {
                subsets: SubsetVariant::PowerSet,
                ..config
            },
            Implementation::BasicRelevant | Implementation::MinimalRelevant => config,
        }
    }
}

/// A knowledge base with its queries, as imported from a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedKnowledgeBase {
    /// The knowledge base.
    pub knowledge_base: KnowledgeBase,
    /// The queries.
    pub queries: Vec<Formula>,
}

/// A benchmark request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EvaluationRequest {
    /// Generator settings, one job each.
    pub generators: Vec<GeneratorConfig>,
    /// Imported knowledge bases, one job each.
    pub knowledge_bases: Vec<ImportedKnowledgeBase>,
    /// The implementations to compare.
    pub algorithms: Vec<Implementation>,
    /// Number of runs per query, the reported time is the average.
    pub repetitions: usize,
    /// The oracle implementation.
    pub oracle: OracleKind,
    /// Time budget of a single entailment check in milliseconds.
    pub timeout_ms: Option<u64>,
}

impl Default for EvaluationRequest {
    fn default() -> Self {
        Self {
            generators: Vec::new(),
            knowledge_bases: Vec::new(),
            algorithms: Implementation::ALL.to_vec(),
            repetitions: 1,
            oracle: OracleKind::default(),
            timeout_ms: None,
        }
    }
}

/// Timing of one implementation on all queries of a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timing {
    /// The closure operation.
    pub algorithm: Algorithm,
    /// The implementation variant.
    pub implementation: Implementation,
    /// Average seconds per query.
    pub times: Vec<f64>,
    /// Average over all queries.
    pub average_time: f64,
    /// Whether the queries are entailed.
    pub entailed: Vec<bool>,
}

/// Result of one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationReport {
    /// Position of the job in the request, generators first.
    pub index: usize,
    /// The generator settings, if the job was generated.
    pub generator: Option<GeneratorConfig>,
    /// The knowledge base.
    pub knowledge_base: KnowledgeBase,
    /// The queries.
    pub queries: Vec<Formula>,
    /// Number of finite ranks.
    pub ranks: usize,
    /// Seconds spent on BaseRank, averaged over the repetitions.
    pub base_rank_time: f64,
    /// One entry per requested implementation.
    pub timings: Vec<Timing>,
}

/// One unit of work.
#[derive(Debug, Clone)]
enum Job {
    Generate(GeneratorConfig),
    Import(ImportedKnowledgeBase),
}

impl EvaluationRequest {
    fn jobs(&self) -> Vec<Job> {
        self.generators
            .iter()
            .copied()
            .map(Job::Generate)
            .chain(self.knowledge_bases.iter().cloned().map(Job::Import))
            .collect()
    }

    fn config(&self) -> ReasonerConfig {
        ReasonerConfig {
            oracle: self.oracle,
            timeout_ms: self.timeout_ms,
            justification: false,
            ..Default::default()
        }
    }

    /// Generates the knowledge bases of all generator settings, without evaluating them.
    pub fn export(&self) -> Vec<GeneratedKnowledgeBase> {
        self.generators.iter().map(GeneratorConfig::generate).collect()
    }

    /// Runs all jobs concurrently; the reports are ordered like the jobs.
    pub fn run(&self) -> Result<Vec<EvaluationReport>> {
        let jobs = self.jobs();
        log::info!("[Start] evaluation of {} jobs", jobs.len());
        let (sender, receiver) = crossbeam_channel::unbounded();
        let mut reports = std::thread::scope(|scope| {
            for (index, job) in jobs.into_iter().enumerate() {
                let sender = sender.clone();
                scope.spawn(move || {
                    let report = self.evaluate(index, job);
                    if sender.send(report).is_err() {
                        log::error!("evaluation job {} could not report back", index);
                    }
                });
            }
            drop(sender);
            receiver.iter().collect::<Result<Vec<_>>>()
        })?;
        reports.sort_by_key(|report| report.index);
        log::info!("[Done] evaluation");
        Ok(reports)
    }

    fn evaluate(&self, index: usize, job: Job) -> Result<EvaluationReport> {
        let (generator, ImportedKnowledgeBase {
            knowledge_base,
            queries,
        }) = match job {
            Job::Generate(config) => {
                let generated = config.generate();
                (
                    Some(config),
                    ImportedKnowledgeBase {
                        knowledge_base: generated.knowledge_base,
                        queries: generated.queries,
                    },
                )
            }
            Job::Import(imported) => (None, imported),
        };
        log::debug!(
            "job {}: {} statements, {} queries",
            index,
            knowledge_base.len(),
            queries.len()
        );
        let repetitions = self.repetitions.max(1);
        let reasoner = Reasoner::new(knowledge_base, self.config());
        let mut base_rank = reasoner.base_rank()?;
        let mut base_rank_time = base_rank.time_taken;
        for _ in 1..repetitions {
            base_rank = reasoner.base_rank()?;
            base_rank_time += base_rank.time_taken;
        }
        base_rank_time /= repetitions as f64;

        let timings = self
            .algorithms
            .iter()
            .map(|implementation| {
                let reasoner = Reasoner::new(
                    reasoner.knowledge_base().clone(),
                    implementation.configure(self.config()),
                );
                let mut times = Vec::with_capacity(queries.len());
                let mut entailed = Vec::with_capacity(queries.len());
                for query in &queries {
                    let mut total = 0.0;
                    let mut last = false;
                    for _ in 0..repetitions {
                        let start = Instant::now();
                        let result = reasoner.entail(query, implementation.algorithm(), &base_rank)?;
                        log::trace!("{} on {} took {:?}", implementation, query, start.elapsed());
                        total += result.common().time_taken;
                        last = result.entailed();
                    }
                    times.push(total / repetitions as f64);
                    entailed.push(last);
                }
                let average_time = if times.is_empty() {
                    0.0
                } else {
                    times.iter().sum::<f64>() / times.len() as f64
                };
                Ok(Timing {
                    algorithm: implementation.algorithm(),
                    implementation: *implementation,
                    times,
                    average_time,
                    entailed,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(EvaluationReport {
            index,
            generator,
            knowledge_base: reasoner.knowledge_base().clone(),
            queries,
            ranks: base_rank.ranking.finite_ranks().len(),
            base_rank_time,
            timings,
        })
    }
}
