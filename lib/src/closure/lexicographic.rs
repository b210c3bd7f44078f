//! Lexicographic closure.
//!
//! Instead of removing the lowest remaining rank `R` as a whole, the rank is weakened to a subset
//! `S ⊂ R` of maximal size such that `S` together with the ranks above does not entail `¬α`.
//! Among the subsets of one size, the first one in lexicographic order of the positions of its
//! members in `R` is chosen. Only if no non-empty subset qualifies, `R` is removed entirely and the
//! next rank is considered.
use std::{cmp::Reverse, time::Instant};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, EnumVariantNames};

use super::{
    conclude, ranks_entail, ClosureContext, EntailmentCommon, EntailmentResult, Outcome, Query,
    RankEntailmentCheck,
};
use crate::{
    datatypes::{Formula, Rank, RankNumber, Ranking},
    error::Result,
    oracle::Deadline,
};

/// Strategy to enumerate the candidate subsets of a rank.
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
pub enum SubsetVariant {
    /// Generate the subsets of one size at a time.
    #[default]
    Naive,
    /// Walk the power set level by level, deriving each level from the one above it.
    PowerSet,
}

/// What happened to one rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankRefinement {
    /// The refined rank.
    pub rank_number: RankNumber,
    /// Number of subsets tested.
    pub subsets_checked: usize,
    /// The statements kept.
    pub kept: Vec<Formula>,
    /// The statements given up.
    pub removed: Vec<Formula>,
    /// Whether no statement of the rank could be kept.
    pub entire_rank_removed: bool,
}

/// Lexicographic closure result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LexicographicEntailment {
    /// Shared fields.
    #[serde(flatten)]
    pub common: EntailmentCommon,
    /// The weakened ranks, i.e. the kept subsets.
    pub weakened_ranking: Ranking,
    /// The tests whether the remaining ranks entail `¬α`.
    #[serde(default)]
    pub checks: Vec<RankEntailmentCheck>,
    /// The refinement of every inspected rank.
    #[serde(default)]
    pub refinements: Vec<RankRefinement>,
}

/// Explanation of a lexicographic closure result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LexicographicExplanation {
    /// The query `α~>β`.
    pub query_formula: Formula,
    /// The knowledge base.
    pub knowledge_base: Vec<Formula>,
    /// Whether the query is entailed.
    pub is_entailed: bool,
    /// The tests whether the remaining ranks entail `¬α`.
    pub checks: Vec<RankEntailmentCheck>,
    /// The refinement of every inspected rank.
    pub refinements: Vec<RankRefinement>,
    /// The BaseRank ranking.
    pub base_ranking: Ranking,
    /// The weakened ranks.
    pub weakened_ranking: Ranking,
    /// The statements given up.
    pub removed_ranking: Ranking,
    /// The statements left.
    pub remaining_ranking: Ranking,
    /// The justifications of an entailed query.
    pub justification: Vec<Vec<Formula>>,
}

impl LexicographicEntailment {
    /// Explains the result.
    pub fn explain(&self) -> LexicographicExplanation {
        LexicographicExplanation {
            query_formula: self.common.query_formula.clone(),
            knowledge_base: self.common.knowledge_base.iter().cloned().collect(),
            is_entailed: self.common.entailed,
            checks: self.checks.clone(),
            refinements: self.refinements.clone(),
            base_ranking: self.common.base_ranking.clone(),
            weakened_ranking: self.weakened_ranking.clone(),
            removed_ranking: self.common.removed_ranking.clone(),
            remaining_ranking: self.common.remaining_ranking.clone(),
            justification: self.common.justification.clone(),
        }
    }
}

/// Decides `query` under lexicographic closure.
pub fn entail(
    ctx: ClosureContext<'_>,
    query: &Formula,
    subsets: SubsetVariant,
) -> Result<EntailmentResult> {
    log::info!("[Start] lexicographic closure of {} ({} subsets)", query, subsets);
    let start = Instant::now();
    let query = Query::new(query)?;
    let ranks = ctx.base_rank.ranking.ranks();
    let finite = ctx.base_rank.ranking.finite_ranks().len();

    let mut checks = Vec::new();
    let mut refinements = Vec::new();
    let mut removed = Vec::new();
    let mut weakened = Vec::new();
    let mut remaining = ranks.to_vec();
    let mut inspected = 0;
    for idx in 0..finite {
        inspected = idx;
        let rank = &ranks[idx];
        let entails_negation = ranks_entail(ctx.oracle, &ranks[idx..], &query.negation)?;
        log::debug!(
            "R_{}..R_∞ entail {}: {}",
            rank.rank_number,
            query.negation,
            entails_negation
        );
        checks.push(RankEntailmentCheck {
            rank_number: rank.rank_number,
            negation: query.negation.clone(),
            entails_negation,
        });
        if !entails_negation {
            remaining = ranks[idx..].to_vec();
            break;
        }

        let (kept, subsets_checked) =
            maximal_subset(ctx, &query, &rank.formulas, &ranks[idx + 1..], subsets)?;
        match kept {
            Some(kept) => {
                let (kept, dropped): (Vec<_>, Vec<_>) = rank
                    .formulas
                    .iter()
                    .cloned()
                    .enumerate()
                    .partition(|(pos, _)| kept.contains(pos));
                let kept = kept.into_iter().map(|(_, f)| f).collect::<Vec<_>>();
                let dropped = dropped.into_iter().map(|(_, f)| f).collect::<Vec<_>>();
                log::debug!("R_{} weakened to {} statements", rank.rank_number, kept.len());
                refinements.push(RankRefinement {
                    rank_number: rank.rank_number,
                    subsets_checked,
                    kept: kept.clone(),
                    removed: dropped.clone(),
                    entire_rank_removed: false,
                });
                let weakened_rank = Rank::new(rank.rank_number, kept);
                weakened.push(weakened_rank.clone());
                removed.push(Rank::new(rank.rank_number, dropped));
                remaining = std::iter::once(weakened_rank)
                    .chain(ranks[idx + 1..].iter().cloned())
                    .collect();
                break;
            }
            None => {
                log::debug!("R_{} removed entirely", rank.rank_number);
                refinements.push(RankRefinement {
                    rank_number: rank.rank_number,
                    subsets_checked,
                    kept: Vec::new(),
                    removed: rank.formulas.clone(),
                    entire_rank_removed: true,
                });
                removed.push(rank.clone());
                remaining = ranks[idx + 1..].to_vec();
            }
        }
    }

    let outcome = Outcome {
        removed: Ranking::from(removed),
        remaining: Ranking::from(remaining),
        inspected,
    };
    let common = conclude(ctx, &query, outcome, start)?;
    log::info!("[Done] lexicographic closure: entailed {}", common.entailed);
    Ok(EntailmentResult::Lexicographic(LexicographicEntailment {
        common,
        weakened_ranking: Ranking::from(weakened),
        checks,
        refinements,
    }))
}

/// Finds the first proper, non-empty subset of `rank` (as positions) which does not entail `¬α`
/// together with `upper`; also returns the number of tested subsets.
fn maximal_subset(
    ctx: ClosureContext<'_>,
    query: &Query,
    rank: &[Formula],
    upper: &[Rank],
    variant: SubsetVariant,
) -> Result<(Option<Vec<usize>>, usize)> {
    let upper = upper
        .iter()
        .flat_map(|rank| rank.formulas.iter())
        .collect::<Vec<_>>();
    let mut checked = 0;
    let mut consistent = |subset: &[usize]| -> Result<bool> {
        checked += 1;
        let premises = subset
            .iter()
            .map(|&pos| &rank[pos])
            .chain(upper.iter().copied())
            .collect::<Vec<_>>();
        Ok(!ctx.oracle.entails(&premises, &query.negation)?)
    };
    let found = match variant {
        SubsetVariant::Naive => {
            let mut found = None;
            'sizes: for size in (1..rank.len()).rev() {
                for subset in Combinations::new(rank.len(), size) {
                    if consistent(&subset)? {
                        found = Some(subset);
                        break 'sizes;
                    }
                }
            }
            found
        }
        SubsetVariant::PowerSet => {
            let mut found = None;
            for subset in PowerSet::new(rank.len(), ctx.oracle.deadline()) {
                let subset = subset?;
                if !subset.is_empty() && subset.len() < rank.len() && consistent(&subset)? {
                    found = Some(subset);
                    break;
                }
            }
            found
        }
    };
    Ok((found, checked))
}

/// All subsets of `{0, …, n-1}`, largest first, subsets of equal size in lexicographic order.
///
/// Only one level of the power set is held at a time; the next level is derived once the current one
/// is used up, so a search which stops early never builds the large middle levels.
#[derive(Debug)]
struct PowerSet<'a> {
    level: Vec<Vec<usize>>,
    next: usize,
    deadline: &'a Deadline,
}

impl<'a> PowerSet<'a> {
    fn new(n: usize, deadline: &'a Deadline) -> Self {
        Self {
            level: vec![(0..n).collect()],
            next: 0,
            deadline,
        }
    }

    /// The subsets with one element less than the subsets of the current level.
    fn level_below(&self) -> Result<Vec<Vec<usize>>> {
        let mut below = Vec::new();
        for subset in &self.level {
            self.deadline.check()?;
            for skip in 0..subset.len() {
                below.push(
                    subset
                        .iter()
                        .enumerate()
                        .filter(|(pos, _)| *pos != skip)
                        .map(|(_, &element)| element)
                        .collect::<Vec<_>>(),
                );
            }
        }
        below.sort_unstable();
        below.dedup();
        Ok(below)
    }
}

impl Iterator for PowerSet<'_> {
    type Item = Result<Vec<usize>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(subset) = self.level.get(self.next) {
                self.next += 1;
                return Some(Ok(subset.clone()));
            }
            if self.level.is_empty() {
                return None;
            }
            match self.level_below() {
                Ok(level) => {
                    self.level = level;
                    self.next = 0;
                }
                Err(err) => {
                    self.level.clear();
                    return Some(Err(err));
                }
            }
        }
    }
}

/// The `k`-element subsets of `{0, …, n-1}` in lexicographic order.
#[derive(Debug)]
struct Combinations {
    n: usize,
    current: Option<Vec<usize>>,
    started: bool,
}

impl Combinations {
    fn new(n: usize, k: usize) -> Self {
        Self {
            n,
            current: (k <= n).then(|| (0..k).collect()),
            started: false,
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.started {
            if let Some(current) = &mut self.current {
                let k = current.len();
                // rightmost position which can still be increased
                match (0..k).rev().find(|&idx| current[idx] < self.n - k + idx) {
                    Some(idx) => {
                        current[idx] += 1;
                        for next in idx + 1..k {
                            current[next] = current[next - 1] + 1;
                        }
                    }
                    None => self.current = None,
                }
            }
        } else {
            self.started = true;
        }
        self.current.clone()
    }
}
