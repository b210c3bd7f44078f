//! Generator of synthetic knowledge bases with a prescribed number of ranks.
//!
//! The generated knowledge bases are built around a spine of atoms `s_0, …, s_{n-1}`:
//!  - the classical statements `s_{i+1}=>s_i` make every `s_{i+1}` a special case of `s_i`
//!  - the defeasible statements `s_i~>f` (even `i`) and `s_i~>!f` (odd `i`) make `s_{i+1}` an exception to `s_i`
//!
//! A defeasible statement with antecedent `s_i` therefore ends up in rank `R_i`. The remaining statements
//! are fillers `s_i~>φ` where `φ` only mentions fresh atoms, so they never change the ranking.
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, EnumVariantNames};

use crate::datatypes::{Formula, KnowledgeBase};

/// How the statements are distributed over the ranks.
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
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum Distribution {
    /// The same number of statements in every rank.
    #[default]
    Flat,
    /// The higher the rank, the more statements.
    LinearGrowth,
    /// The higher the rank, the fewer statements.
    LinearDecline,
    /// Every filler statement goes to a random rank.
    Random,
}

/// Shape of the consequents of the filler statements.
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
pub enum Complexity {
    /// A single fresh atom.
    #[default]
    Simple,
    /// A conjunction, disjunction or implication of fresh literals.
    Complex,
}

/// Alphabet of the generated atom names.
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
pub enum CharacterSet {
    /// `a`, `b`, …, `z`, `aa`, `ab`, …
    #[default]
    Lowercase,
    /// `A`, `B`, …, `Z`, `AA`, `AB`, …
    Uppercase,
    /// `p0`, `p1`, …
    Numbered,
}

/// Settings of the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratorConfig {
    /// Number of finite ranks.
    pub ranks: usize,
    /// Number of defeasible statements, at least one per rank.
    pub statements: usize,
    /// Distribution of the statements over the ranks.
    pub distribution: Distribution,
    /// Shape of the filler consequents.
    pub complexity: Complexity,
    /// Alphabet of the atom names.
    pub character_set: CharacterSet,
    /// Number of queries to generate.
    pub queries: usize,
    /// Seed of the random number generator.
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            ranks: 3,
            statements: 9,
            distribution: Distribution::default(),
            complexity: Complexity::default(),
            character_set: CharacterSet::default(),
            queries: 3,
            seed: 0,
        }
    }
}

/// A generated knowledge base together with its queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedKnowledgeBase {
    /// The settings it was generated with.
    pub generator: GeneratorConfig,
    /// The knowledge base.
    pub knowledge_base: KnowledgeBase,
    /// The queries.
    pub queries: Vec<Formula>,
}

impl GeneratorConfig {
    /// Generates a knowledge base; the same settings always yield the same knowledge base.
    pub fn generate(&self) -> GeneratedKnowledgeBase {
        log::debug!("[Start] generating {:?}", self);
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut names = AtomNames::new(self.character_set);
        let spine = (0..self.ranks).map(|_| names.next_name()).collect::<Vec<_>>();
        let flies = Formula::Atom(names.next_name());

        let mut kb = KnowledgeBase::new();
        for window in spine.windows(2) {
            kb.insert(Formula::implies(
                Formula::atom(&window[1]),
                Formula::atom(&window[0]),
            ));
        }
        let per_rank = self.fillers_per_rank(&mut rng);
        let mut fresh = Vec::new();
        for (idx, atom) in spine.iter().enumerate() {
            let consequent = if idx % 2 == 0 {
                flies.clone()
            } else {
                flies.negate()
            };
            kb.insert(Formula::defeasible(Formula::atom(atom), consequent));
            for _ in 0..per_rank[idx] {
                let consequent = self.filler(&mut rng, &mut names, &mut fresh);
                kb.insert(Formula::defeasible(Formula::atom(atom), consequent));
            }
        }

        let queries = if spine.is_empty() {
            Vec::new()
        } else {
            (0..self.queries)
                .map(|_| {
                    let antecedent = Formula::atom(&spine[rng.gen_range(0..spine.len())]);
                    let consequent = if fresh.is_empty() || rng.gen_bool(0.5) {
                        flies.clone()
                    } else {
                        Formula::atom(&fresh[rng.gen_range(0..fresh.len())])
                    };
                    let consequent = if rng.gen_bool(0.5) {
                        consequent.negate()
                    } else {
                        consequent
                    };
                    Formula::defeasible(antecedent, consequent)
                })
                .collect()
        };
        log::debug!("[Done] generated {} statements", kb.len());
        GeneratedKnowledgeBase {
            generator: *self,
            knowledge_base: kb,
            queries,
        }
    }

    /// Number of filler statements of every rank.
    fn fillers_per_rank(&self, rng: &mut StdRng) -> Vec<usize> {
        let ranks = self.ranks;
        let fillers = self.statements.saturating_sub(ranks);
        if ranks == 0 {
            return Vec::new();
        }
        let weights: Vec<usize> = match self.distribution {
            Distribution::Flat => vec![1; ranks],
            Distribution::LinearGrowth => (1..=ranks).collect(),
            Distribution::LinearDecline => (1..=ranks).rev().collect(),
            Distribution::Random => {
                let mut result = vec![0; ranks];
                for _ in 0..fillers {
                    result[rng.gen_range(0..ranks)] += 1;
                }
                return result;
            }
        };
        let total: usize = weights.iter().sum();
        let mut result = weights
            .iter()
            .map(|weight| fillers * weight / total)
            .collect::<Vec<_>>();
        let mut order = (0..ranks).collect::<Vec<_>>();
        order.sort_by_key(|&idx| std::cmp::Reverse(weights[idx]));
        let missing = fillers - result.iter().sum::<usize>();
        for &idx in order.iter().cycle().take(missing) {
            result[idx] += 1;
        }
        result
    }

    fn filler(&self, rng: &mut StdRng, names: &mut AtomNames, fresh: &mut Vec<String>) -> Formula {
        let mut literal = |rng: &mut StdRng| {
            let name = names.next_name();
            let atom = Formula::atom(&name);
            fresh.push(name);
            if rng.gen_bool(0.3) {
                atom.negate()
            } else {
                atom
            }
        };
        match self.complexity {
            Complexity::Simple => literal(rng),
            Complexity::Complex => {
                let lhs = literal(rng);
                let rhs = literal(rng);
                match rng.gen_range(0..3) {
                    0 => Formula::and(lhs, rhs),
                    1 => Formula::or(lhs, rhs),
                    _ => Formula::implies(lhs, rhs),
                }
            }
        }
    }
}

/// Endless supply of distinct atom names.
#[derive(Debug)]
struct AtomNames {
    character_set: CharacterSet,
    next: usize,
}

impl AtomNames {
    fn new(character_set: CharacterSet) -> Self {
        Self {
            character_set,
            next: 0,
        }
    }

    fn next_name(&mut self) -> String {
        let idx = self.next;
        self.next += 1;
        let first = match self.character_set {
            CharacterSet::Lowercase => b'a',
            CharacterSet::Uppercase => b'A',
            CharacterSet::Numbered => return format!("p{idx}"),
        };
        // bijective base 26: a, …, z, aa, ab, …
        let mut idx = idx + 1;
        let mut name = Vec::new();
        while idx > 0 {
            idx -= 1;
            name.push(first + (idx % 26) as u8);
            idx /= 26;
        }
        name.reverse();
        String::from_utf8_lossy(&name).into_owned()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        baserank::BaseRank,
        oracle::{Deadline, OracleKind},
    };
    use test_log::test;

    fn finite_ranks(generated: &GeneratedKnowledgeBase) -> Vec<usize> {
        let kb = &generated.knowledge_base;
        let oracle = OracleKind::default().build(&kb.signature(), Deadline::unlimited());
        let base_rank = BaseRank::compute(kb, oracle.as_ref()).unwrap();
        base_rank
            .ranking
            .finite_ranks()
            .iter()
            .map(|rank| rank.formulas.len())
            .collect()
    }

    #[test]
    fn names() {
        let mut names = AtomNames::new(CharacterSet::Lowercase);
        let generated = (0..28).map(|_| names.next_name()).collect::<Vec<_>>();
        assert_eq!(generated[0], "a");
        assert_eq!(generated[25], "z");
        assert_eq!(generated[26], "aa");
        assert_eq!(generated[27], "ab");
        let mut names = AtomNames::new(CharacterSet::Uppercase);
        assert_eq!(names.next_name(), "A");
        let mut names = AtomNames::new(CharacterSet::Numbered);
        names.next_name();
        assert_eq!(names.next_name(), "p1");
    }

    #[test]
    fn distributions() {
        let config = GeneratorConfig {
            ranks: 3,
            statements: 12,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(config.fillers_per_rank(&mut rng), vec![3, 3, 3]);
        let growth = GeneratorConfig {
            distribution: Distribution::LinearGrowth,
            ..config
        };
        assert_eq!(growth.fillers_per_rank(&mut rng), vec![1, 3, 5]);
        let decline = GeneratorConfig {
            distribution: Distribution::LinearDecline,
            ..config
        };
        assert_eq!(decline.fillers_per_rank(&mut rng), vec![5, 3, 1]);
        let random = GeneratorConfig {
            distribution: Distribution::Random,
            ..config
        };
        assert_eq!(random.fillers_per_rank(&mut rng).iter().sum::<usize>(), 9);
    }

    #[test]
    fn exact_number_of_ranks() {
        for (ranks, distribution, complexity) in [
            (1, Distribution::Flat, Complexity::Simple),
            (4, Distribution::LinearGrowth, Complexity::Complex),
            (5, Distribution::Random, Complexity::Simple),
            (3, Distribution::LinearDecline, Complexity::Complex),
        ] {
            let config = GeneratorConfig {
                ranks,
                statements: 3 * ranks,
                distribution,
                complexity,
                seed: 42,
                ..Default::default()
            };
            let generated = config.generate();
            assert_eq!(
                generated.knowledge_base.defeasible().count(),
                3 * ranks,
                "{config:?}"
            );
            let sizes = finite_ranks(&generated);
            assert_eq!(sizes.len(), ranks, "{config:?}");
            assert_eq!(sizes.iter().sum::<usize>(), 3 * ranks);
            assert_eq!(generated.queries.len(), 3);
            assert!(generated.queries.iter().all(Formula::is_defeasible));
        }
    }

    #[test]
    fn deterministic() {
        let config = GeneratorConfig {
            distribution: Distribution::Random,
            complexity: Complexity::Complex,
            seed: 7,
            ..Default::default()
        };
        assert_eq!(config.generate(), config.generate());
    }

    #[test]
    fn no_ranks() {
        let generated = GeneratorConfig {
            ranks: 0,
            ..Default::default()
        }
        .generate();
        assert!(generated.knowledge_base.is_empty());
        assert!(generated.queries.is_empty());
    }
}
