//! Rankings of knowledge bases.

use std::fmt::Display;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use super::Formula;

/// Wire value of the infinite rank.
pub const INFINITE_RANK: u64 = 999_999_999;

/// Index of a rank: a finite level or the infinite rank holding the statements which are never refuted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RankNumber {
    /// Rank `R_i`.
    Finite(usize),
    /// Rank `R_∞`.
    Infinite,
}

impl RankNumber {
    /// Returns `true` for the infinite rank.
    pub fn is_infinite(&self) -> bool {
        matches!(self, RankNumber::Infinite)
    }

    /// The level of a finite rank.
    pub fn finite(&self) -> Option<usize> {
        match self {
            RankNumber::Finite(value) => Some(*value),
            RankNumber::Infinite => None,
        }
    }
}

impl Display for RankNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RankNumber::Finite(value) => write!(f, "{value}"),
            RankNumber::Infinite => write!(f, "∞"),
        }
    }
}

impl Serialize for RankNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RankNumber::Finite(value) => serializer.serialize_u64(*value as u64),
            RankNumber::Infinite => serializer.serialize_u64(INFINITE_RANK),
        }
    }
}

impl<'de> Deserialize<'de> for RankNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = u64::deserialize(deserializer)?;
        if value == INFINITE_RANK {
            Ok(RankNumber::Infinite)
        } else if value > INFINITE_RANK {
            Err(de::Error::custom(format!("rank number {value} out of range")))
        } else {
            usize::try_from(value)
                .map(RankNumber::Finite)
                .map_err(de::Error::custom)
        }
    }
}

/// One rank of a [Ranking].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rank {
    /// Level of the rank.
    pub rank_number: RankNumber,
    /// Statements of the rank in knowledge-base order.
    pub formulas: Vec<Formula>,
}

impl Rank {
    /// Creates a rank.
    pub fn new(rank_number: RankNumber, formulas: Vec<Formula>) -> Self {
        Self {
            rank_number,
            formulas,
        }
    }

    /// The materialisations of the statements of the rank.
    pub fn materialized(&self) -> Vec<Formula> {
        self.formulas.iter().map(Formula::materialize).collect()
    }

    /// Returns `true` if the rank has no statements.
    pub fn is_empty(&self) -> bool {
        self.formulas.is_empty()
    }
}

impl Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "R_{}: {{", self.rank_number)?;
        for (idx, formula) in self.formulas.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{formula}")?;
        }
        write!(f, "}}")
    }
}

/// An ordered sequence of ranks: finite ranks ascending, the infinite rank (if present) last.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Rank>", into = "Vec<Rank>")]
pub struct Ranking {
    ranks: Vec<Rank>,
}

impl From<Vec<Rank>> for Ranking {
    fn from(mut ranks: Vec<Rank>) -> Self {
        ranks.sort_by_key(|rank| rank.rank_number);
        Self { ranks }
    }
}

impl From<Ranking> for Vec<Rank> {
    fn from(ranking: Ranking) -> Self {
        ranking.ranks
    }
}

impl Ranking {
    /// Builds a ranking from the finite levels (in order) and the statements of the infinite rank.
    pub fn new(finite: Vec<Vec<Formula>>, infinite: Vec<Formula>) -> Self {
        let mut ranks = finite
            .into_iter()
            .enumerate()
            .map(|(idx, formulas)| Rank::new(RankNumber::Finite(idx), formulas))
            .collect::<Vec<_>>();
        ranks.push(Rank::new(RankNumber::Infinite, infinite));
        Self { ranks }
    }

    /// All ranks.
    pub fn ranks(&self) -> &[Rank] {
        &self.ranks
    }

    /// The finite ranks.
    pub fn finite_ranks(&self) -> &[Rank] {
        match self.ranks.last() {
            Some(rank) if rank.rank_number.is_infinite() => &self.ranks[..self.ranks.len() - 1],
            _ => &self.ranks,
        }
    }

    /// The infinite rank, if present.
    pub fn infinite_rank(&self) -> Option<&Rank> {
        self.ranks
            .last()
            .filter(|rank| rank.rank_number.is_infinite())
    }

    /// Number of ranks, including the infinite one.
    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    /// Returns `true` if there are no ranks at all.
    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    /// Adds a rank, keeping the order.
    pub fn push(&mut self, rank: Rank) {
        let pos = self
            .ranks
            .partition_point(|other| other.rank_number <= rank.rank_number);
        self.ranks.insert(pos, rank);
    }

    /// The rank with the given number.
    pub fn rank(&self, number: RankNumber) -> Option<&Rank> {
        self.ranks.iter().find(|rank| rank.rank_number == number)
    }

    /// The number of the rank containing `formula`.
    pub fn rank_of(&self, formula: &Formula) -> Option<RankNumber> {
        self.ranks
            .iter()
            .find(|rank| rank.formulas.contains(formula))
            .map(|rank| rank.rank_number)
    }

    /// All statements, from the lowest rank to the infinite one.
    pub fn formulas(&self) -> impl Iterator<Item = &Formula> + '_ {
        self.ranks.iter().flat_map(|rank| rank.formulas.iter())
    }

    /// The materialisations of all statements.
    pub fn materialized(&self) -> Vec<Formula> {
        self.formulas().map(Formula::materialize).collect()
    }

    /// A ranking with only the ranks whose number satisfies `keep`.
    pub fn filter_ranks<F>(&self, keep: F) -> Ranking
    where
        F: Fn(&Rank) -> bool,
    {
        Ranking {
            ranks: self.ranks.iter().filter(|rank| keep(rank)).cloned().collect(),
        }
    }

    /// A ranking with the same ranks but only the statements satisfying `keep`.
    /// Finite ranks which end up empty are dropped, the infinite rank is kept.
    pub fn filter_formulas<F>(&self, keep: F) -> Ranking
    where
        F: Fn(&Formula) -> bool,
    {
        Ranking {
            ranks: self
                .ranks
                .iter()
                .map(|rank| {
                    Rank::new(
                        rank.rank_number,
                        rank.formulas.iter().filter(|f| keep(f)).cloned().collect(),
                    )
                })
                .filter(|rank| rank.rank_number.is_infinite() || !rank.is_empty())
                .collect(),
        }
    }
}

impl Display for Ranking {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for rank in self.ranks.iter().rev() {
            writeln!(f, "{rank}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use test_log::test;

    fn formulas(input: &[&str]) -> Vec<Formula> {
        input.iter().map(|f| f.parse().unwrap()).collect()
    }

    #[test]
    fn rank_number_wire_format() {
        assert_eq!(serde_json::to_string(&RankNumber::Finite(3)).unwrap(), "3");
        assert_eq!(
            serde_json::to_string(&RankNumber::Infinite).unwrap(),
            "999999999"
        );
        assert_eq!(
            serde_json::from_str::<RankNumber>("999999999").unwrap(),
            RankNumber::Infinite
        );
        assert!(serde_json::from_str::<RankNumber>("9999999990").is_err());
        assert!(RankNumber::Finite(100) < RankNumber::Infinite);
    }

    #[test]
    fn ordering() {
        let ranking = Ranking::new(
            vec![formulas(&["p~>f", "p~>w"]), formulas(&["b~>!f"])],
            formulas(&["b=>p"]),
        );
        assert_eq!(ranking.finite_ranks().len(), 2);
        assert_eq!(
            ranking.infinite_rank().unwrap().formulas,
            formulas(&["b=>p"])
        );
        assert_eq!(
            ranking.rank_of(&"b~>!f".parse().unwrap()),
            Some(RankNumber::Finite(1))
        );
        assert_eq!(
            format!("{ranking}"),
            "R_∞: {b=>p}\nR_1: {b~>!f}\nR_0: {p~>f, p~>w}\n"
        );

        // the wire format may list the ranks in display order
        let json = r#"[{"rankNumber":999999999,"formulas":["b=>p"]},{"rankNumber":1,"formulas":["b~>!f"]},{"rankNumber":0,"formulas":["p~>f","p~>w"]}]"#;
        let back: Ranking = serde_json::from_str(json).unwrap();
        assert_eq!(back, ranking);
    }

    #[test]
    fn filtering() {
        let ranking = Ranking::new(
            vec![formulas(&["p~>f", "p~>w"]), formulas(&["b~>!f"])],
            Vec::new(),
        );
        let filtered = ranking.filter_formulas(|f| f.to_string() != "b~>!f");
        assert_eq!(filtered.len(), 2);
        assert!(filtered.infinite_rank().unwrap().is_empty());
        let upper = ranking.filter_ranks(|rank| rank.rank_number > RankNumber::Finite(0));
        assert_eq!(upper.finite_ranks().len(), 1);
    }

    #[test]
    fn push_keeps_order() {
        let mut ranking = Ranking::default();
        ranking.push(Rank::new(RankNumber::Infinite, Vec::new()));
        ranking.push(Rank::new(RankNumber::Finite(2), Vec::new()));
        ranking.push(Rank::new(RankNumber::Finite(0), Vec::new()));
        assert_eq!(
            ranking
                .ranks()
                .iter()
                .map(|r| r.rank_number)
                .collect::<Vec<_>>(),
            vec![
                RankNumber::Finite(0),
                RankNumber::Finite(2),
                RankNumber::Infinite
            ]
        );
    }
}
