//! Knowledge bases: insertion-ordered sets of statements.

use std::collections::BTreeSet;

use indexmap::IndexSet;
use lexical_sort::natural_lexical_cmp;
use serde::{Deserialize, Serialize};

use super::Formula;
use crate::error::Result;

/// A knowledge base `K`.
///
/// Semantically a set: adding a statement twice keeps the first occurrence.
/// The insertion order is kept, as it is used for output and for every deterministic tie-break.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KnowledgeBase {
    statements: IndexSet<Formula>,
}

impl KnowledgeBase {
    /// Creates an empty knowledge base.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses every given statement and collects them into a knowledge base.
    pub fn parse<I, S>(statements: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        statements
            .into_iter()
            .map(|statement| crate::parser::parse_formula(statement.as_ref()))
            .collect::<Result<KnowledgeBase>>()
    }

    /// Adds a statement; returns `false` if it was already present.
    pub fn insert(&mut self, formula: Formula) -> bool {
        self.statements.insert(formula)
    }

    /// Returns `true` if the knowledge base contains the statement.
    pub fn contains(&self, formula: &Formula) -> bool {
        self.statements.contains(formula)
    }

    /// Position of a statement in insertion order.
    pub fn position(&self, formula: &Formula) -> Option<usize> {
        self.statements.get_index_of(formula)
    }

    /// Number of statements.
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Returns `true` if the knowledge base has no statements.
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Iterates over all statements in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Formula> + '_ {
        self.statements.iter()
    }

    /// The classical statements `K_classical`.
    pub fn classical(&self) -> impl Iterator<Item = &Formula> + '_ {
        self.statements.iter().filter(|f| !f.is_defeasible())
    }

    /// The defeasible statements `K_defeasible`.
    pub fn defeasible(&self) -> impl Iterator<Item = &Formula> + '_ {
        self.statements.iter().filter(|f| f.is_defeasible())
    }

    /// The atoms occurring in the knowledge base.
    pub fn atoms(&self) -> BTreeSet<String> {
        let mut atoms = BTreeSet::new();
        self.statements
            .iter()
            .for_each(|formula| formula.collect_atoms(&mut atoms));
        atoms
    }

    /// The signature of the knowledge base in natural (alphanumeric) order.
    pub fn signature(&self) -> Vec<String> {
        let mut names = self.atoms().into_iter().collect::<Vec<_>>();
        names.sort_by(|lhs, rhs| natural_lexical_cmp(lhs, rhs));
        names
    }

    /// The statements rendered as strings, in insertion order.
    pub fn to_strings(&self) -> Vec<String> {
        self.statements.iter().map(ToString::to_string).collect()
    }
}

impl FromIterator<Formula> for KnowledgeBase {
    fn from_iter<T: IntoIterator<Item = Formula>>(iter: T) -> Self {
        Self {
            statements: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a KnowledgeBase {
    type Item = &'a Formula;
    type IntoIter = indexmap::set::Iter<'a, Formula>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.iter()
    }
}
