//! Computation of all justifications of an entailment by a hitting-set tree.
//!
//! A justification for `D ⊨ φ` is a subset `J ⊆ D` with `J ⊨ φ` such that no proper subset of `J` entails `φ`.
//! Single justifications are found by expanding a candidate set along syntactic relevance, seeded with
//! the atoms of `φ`, followed by a contraction which drops every member that is not needed.
//! The hitting-set tree is explored breadth first. Its nodes are labelled with the statements removed
//! from `D` on the way to the node; a node either reuses a justification disjoint from its label, or
//! computes a new one, or is closed if `D` without the label no longer entails `φ`.
//! Nodes whose label extends the label of a closed node are closed without any oracle call, nodes
//! with an already visited label are not expanded again.
//!
//! Statement sets are represented by [RoaringBitmap]s of positions in `D`.
use std::{
    collections::{BTreeSet, HashSet, VecDeque},
    time::Instant,
};

use roaring::RoaringBitmap;

use crate::{datatypes::Formula, error::Result, oracle::EntailmentOracle};

/// All justifications of an entailment together with the time needed to compute them.
#[derive(Debug, Clone, PartialEq)]
pub struct Justifications {
    /// The justifications in order of discovery, each listing its statements in the order of `D`.
    pub sets: Vec<Vec<Formula>>,
    /// Seconds spent.
    pub time_taken: f64,
}

/// Computes justifications over a fixed set of statements `D`.
#[derive(Debug)]
pub struct JustificationEngine<'a> {
    deciding: &'a [Formula],
    oracle: &'a dyn EntailmentOracle,
    all: RoaringBitmap,
}

impl<'a> JustificationEngine<'a> {
    /// Prepares the engine for the statements `deciding`; defeasible statements are read as their materialisation.
    pub fn new(deciding: &'a [Formula], oracle: &'a dyn EntailmentOracle) -> Self {
        let all = (0..deciding.len() as u32).collect();
        Self {
            deciding,
            oracle,
            all,
        }
    }

    /// Computes every justification of `D ⊨ goal`.
    ///
    /// The result is empty if `D` does not entail `goal` and consists of the empty set alone if `goal` is valid.
    pub fn justify(&self, goal: &Formula) -> Result<Justifications> {
        log::info!("[Start] justification of {} over {} statements", goal, self.deciding.len());
        let start = Instant::now();
        let sets = self
            .hitting_set_tree(&goal.materialize())?
            .iter()
            .map(|set| self.formulas(set))
            .collect::<Vec<_>>();
        let time_taken = start.elapsed().as_secs_f64();
        log::info!(
            "[Done] justification: {} sets in {:.6}s",
            sets.len(),
            time_taken
        );
        Ok(Justifications { sets, time_taken })
    }

    fn hitting_set_tree(&self, goal: &Formula) -> Result<Vec<RoaringBitmap>> {
        if !self.entails(&self.all, goal)? {
            log::debug!("no justification, the statements do not entail {}", goal);
            return Ok(Vec::new());
        }
        if self.oracle.entails(&[], goal)? {
            log::debug!("{} is valid, the empty set is its only justification", goal);
            return Ok(vec![RoaringBitmap::new()]);
        }

        let mut found: Vec<RoaringBitmap> = Vec::new();
        // a statement which is the goal itself justifies it on its own
        if let Some(pos) = self
            .deciding
            .iter()
            .position(|formula| formula.materialize() == *goal)
        {
            log::debug!("{} justifies itself", self.deciding[pos]);
            found.push(std::iter::once(pos as u32).collect());
        }

        let mut closed: Vec<RoaringBitmap> = Vec::new();
        let mut visited: HashSet<Vec<u32>> = HashSet::new();
        let mut queue = VecDeque::from([RoaringBitmap::new()]);
        while let Some(path) = queue.pop_front() {
            self.oracle.deadline().check()?;
            if closed.iter().any(|closed| closed.is_subset(&path)) {
                log::trace!("early termination of {:?}", path);
                continue;
            }
            let justification = match found.iter().find(|set| set.is_disjoint(&path)) {
                Some(reused) => reused.clone(),
                None => {
                    let available = &self.all - &path;
                    if !self.entails(&available, goal)? {
                        log::trace!("closing {:?}", path);
                        closed.push(path);
                        continue;
                    }
                    let justification = self.single_justification(&available, goal)?;
                    log::debug!("found justification {:?}", justification);
                    found.push(justification.clone());
                    justification
                }
            };
            for pos in justification.iter() {
                let mut child = path.clone();
                child.insert(pos);
                if visited.insert(child.iter().collect()) {
                    queue.push_back(child);
                }
            }
        }
        Ok(found)
    }

    /// Finds one justification within `available`, which has to entail `goal`.
    fn single_justification(
        &self,
        available: &RoaringBitmap,
        goal: &Formula,
    ) -> Result<RoaringBitmap> {
        let candidate = self.expand(available, goal)?;
        self.contract(candidate, goal)
    }

    /// Adds the statements of `available` layer by layer along shared atoms until the selection entails `goal`.
    fn expand(&self, available: &RoaringBitmap, goal: &Formula) -> Result<RoaringBitmap> {
        let mut atoms: BTreeSet<String> = goal.signature();
        let mut selected = RoaringBitmap::new();
        loop {
            let layer = available
                .iter()
                .filter(|pos| !selected.contains(*pos))
                .filter(|&pos| self.deciding[pos as usize].shares_atoms(&atoms))
                .collect::<RoaringBitmap>();
            if layer.is_empty() {
                // only unrelated statements are left, they matter through inconsistency alone
                log::trace!("expansion exhausted the relevant statements");
                return Ok(available.clone());
            }
            for pos in layer.iter() {
                self.deciding[pos as usize].collect_atoms(&mut atoms);
            }
            selected |= layer;
            log::trace!("expanded to {:?}", selected);
            if self.entails(&selected, goal)? {
                return Ok(selected);
            }
        }
    }

    /// Removes every statement from `candidate` which is not needed to entail `goal`.
    fn contract(&self, mut candidate: RoaringBitmap, goal: &Formula) -> Result<RoaringBitmap> {
        for pos in candidate.clone().iter() {
            candidate.remove(pos);
            if !self.entails(&candidate, goal)? {
                candidate.insert(pos);
            }
        }
        Ok(candidate)
    }

    fn entails(&self, set: &RoaringBitmap, goal: &Formula) -> Result<bool> {
        let premises = set
            .iter()
            .map(|pos| &self.deciding[pos as usize])
            .collect::<Vec<_>>();
        self.oracle.entails(&premises, goal)
    }

    fn formulas(&self, set: &RoaringBitmap) -> Vec<Formula> {
        set.iter()
            .map(|pos| self.deciding[pos as usize].clone())
            .collect()
    }
}
