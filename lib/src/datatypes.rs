//! Representation of all datatypes shared by the reasoning engines:
//! [formulas][Formula], [knowledge bases][KnowledgeBase] and [rankings][Ranking].
pub mod formula;
pub mod knowledge_base;
pub mod ranking;

pub use formula::Formula;
pub use knowledge_base::KnowledgeBase;
pub use ranking::{Rank, RankNumber, Ranking};
