//! The propositional formula language with its defeasible extension.
//!
//! A [Formula] is either classical or a single top-level defeasible implication `α~>β`.
//! All transformations (negation, materialisation, rendering) are structural operations on the syntax tree.

use std::{collections::BTreeSet, fmt::Display, str::FromStr};

use biodivine_lib_bdd::boolean_expression::BooleanExpression;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

/// Syntax tree of a formula.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Formula {
    /// A propositional atom.
    Atom(String),
    /// Negation `!φ`.
    Not(Box<Formula>),
    /// Conjunction `φ&&ψ`.
    And(Box<Formula>, Box<Formula>),
    /// Disjunction `φ||ψ`.
    Or(Box<Formula>, Box<Formula>),
    /// Classical implication `φ=>ψ`.
    Implies(Box<Formula>, Box<Formula>),
    /// Biconditional `φ<=>ψ`.
    Iff(Box<Formula>, Box<Formula>),
    /// Defeasible implication `φ~>ψ`, only valid at the top level.
    Defeasible(Box<Formula>, Box<Formula>),
}

/// Binding strength of the connectives, higher binds tighter.
const PREC_DEFEASIBLE: u8 = 0;
const PREC_IFF: u8 = 1;
const PREC_IMPLIES: u8 = 2;
const PREC_OR: u8 = 3;
const PREC_AND: u8 = 4;
const PREC_NOT: u8 = 5;
const PREC_ATOM: u8 = 6;

struct Symbols {
    not: &'static str,
    and: &'static str,
    or: &'static str,
    implies: &'static str,
    iff: &'static str,
    defeasible: &'static str,
    open: &'static str,
    close: &'static str,
}

const ASCII: Symbols = Symbols {
    not: "!",
    and: "&&",
    or: "||",
    implies: "=>",
    iff: "<=>",
    defeasible: "~>",
    open: "(",
    close: ")",
};

const TEX: Symbols = Symbols {
    not: "\\lnot ",
    and: " \\land ",
    or: " \\lor ",
    implies: " \\rightarrow ",
    iff: " \\leftrightarrow ",
    defeasible: " \\twiddle ",
    open: "\\left(",
    close: "\\right)",
};

impl Formula {
    /// Creates an atom.
    pub fn atom(name: &str) -> Self {
        Formula::Atom(name.to_string())
    }

    /// Creates the negation of `formula` without simplifying it, see [negate][Formula::negate] for the simplifying variant.
    #[allow(clippy::should_implement_trait)]
    pub fn not(formula: Formula) -> Self {
        Formula::Not(Box::new(formula))
    }

    /// Creates a conjunction.
    pub fn and(lhs: Formula, rhs: Formula) -> Self {
        Formula::And(Box::new(lhs), Box::new(rhs))
    }

    /// Creates a disjunction.
    pub fn or(lhs: Formula, rhs: Formula) -> Self {
        Formula::Or(Box::new(lhs), Box::new(rhs))
    }

    /// Creates a classical implication.
    pub fn implies(lhs: Formula, rhs: Formula) -> Self {
        Formula::Implies(Box::new(lhs), Box::new(rhs))
    }

    /// Creates a biconditional.
    pub fn iff(lhs: Formula, rhs: Formula) -> Self {
        Formula::Iff(Box::new(lhs), Box::new(rhs))
    }

    /// Creates a defeasible implication.
    pub fn defeasible(antecedent: Formula, consequent: Formula) -> Self {
        Formula::Defeasible(Box::new(antecedent), Box::new(consequent))
    }

    /// Returns the negation of the formula, eliminating a double negation.
    pub fn negate(&self) -> Formula {
        match self {
            Formula::Not(inner) => inner.as_ref().clone(),
            other => Formula::not(other.clone()),
        }
    }

    /// Replaces the top-level `~>` by `=>`; classical formulas are returned unchanged.
    pub fn materialize(&self) -> Formula {
        match self {
            Formula::Defeasible(lhs, rhs) => Formula::Implies(lhs.clone(), rhs.clone()),
            other => other.clone(),
        }
    }

    /// Returns `true` if the formula is a defeasible implication.
    pub fn is_defeasible(&self) -> bool {
        matches!(self, Formula::Defeasible(_, _))
    }

    /// Returns `true` if the formula does not contain `~>`.
    pub fn is_classical(&self) -> bool {
        match self {
            Formula::Atom(_) => true,
            Formula::Not(inner) => inner.is_classical(),
            Formula::And(lhs, rhs)
            | Formula::Or(lhs, rhs)
            | Formula::Implies(lhs, rhs)
            | Formula::Iff(lhs, rhs) => lhs.is_classical() && rhs.is_classical(),
            Formula::Defeasible(_, _) => false,
        }
    }

    /// The antecedent `α` of a defeasible implication `α~>β`.
    pub fn antecedent(&self) -> Option<&Formula> {
        match self {
            Formula::Defeasible(lhs, _) => Some(lhs),
            _ => None,
        }
    }

    /// The consequent `β` of a defeasible implication `α~>β`.
    pub fn consequent(&self) -> Option<&Formula> {
        match self {
            Formula::Defeasible(_, rhs) => Some(rhs),
            _ => None,
        }
    }

    /// The set of atoms occurring in the formula.
    pub fn signature(&self) -> BTreeSet<String> {
        let mut result = BTreeSet::new();
        self.collect_atoms(&mut result);
        result
    }

    pub(crate) fn collect_atoms(&self, atoms: &mut BTreeSet<String>) {
        match self {
            Formula::Atom(name) => {
                atoms.insert(name.clone());
            }
            Formula::Not(inner) => inner.collect_atoms(atoms),
            Formula::And(lhs, rhs)
            | Formula::Or(lhs, rhs)
            | Formula::Implies(lhs, rhs)
            | Formula::Iff(lhs, rhs)
            | Formula::Defeasible(lhs, rhs) => {
                lhs.collect_atoms(atoms);
                rhs.collect_atoms(atoms);
            }
        }
    }

    /// Returns `true` if the formula mentions at least one of the given atoms.
    pub fn shares_atoms(&self, atoms: &BTreeSet<String>) -> bool {
        match self {
            Formula::Atom(name) => atoms.contains(name),
            Formula::Not(inner) => inner.shares_atoms(atoms),
            Formula::And(lhs, rhs)
            | Formula::Or(lhs, rhs)
            | Formula::Implies(lhs, rhs)
            | Formula::Iff(lhs, rhs)
            | Formula::Defeasible(lhs, rhs) => lhs.shares_atoms(atoms) || rhs.shares_atoms(atoms),
        }
    }

    /// Translates the formula into a biodivine [BooleanExpression].
    /// A defeasible implication is read as its materialisation.
    pub fn to_boolean_expr(&self) -> BooleanExpression {
        match self {
            Formula::Atom(name) => BooleanExpression::Variable(name.clone()),
            Formula::Not(inner) => BooleanExpression::Not(Box::new(inner.to_boolean_expr())),
            Formula::And(lhs, rhs) => BooleanExpression::And(
                Box::new(lhs.to_boolean_expr()),
                Box::new(rhs.to_boolean_expr()),
            ),
            Formula::Or(lhs, rhs) => BooleanExpression::Or(
                Box::new(lhs.to_boolean_expr()),
                Box::new(rhs.to_boolean_expr()),
            ),
            Formula::Implies(lhs, rhs) | Formula::Defeasible(lhs, rhs) => BooleanExpression::Imp(
                Box::new(lhs.to_boolean_expr()),
                Box::new(rhs.to_boolean_expr()),
            ),
            Formula::Iff(lhs, rhs) => BooleanExpression::Iff(
                Box::new(lhs.to_boolean_expr()),
                Box::new(rhs.to_boolean_expr()),
            ),
        }
    }

    /// Renders the formula in LaTeX notation.
    pub fn to_tex(&self) -> String {
        let mut result = String::new();
        self.render(&TEX, &mut result);
        result
    }

    fn precedence(&self) -> u8 {
        match self {
            Formula::Atom(_) => PREC_ATOM,
            Formula::Not(_) => PREC_NOT,
            Formula::And(_, _) => PREC_AND,
            Formula::Or(_, _) => PREC_OR,
            Formula::Implies(_, _) => PREC_IMPLIES,
            Formula::Iff(_, _) => PREC_IFF,
            Formula::Defeasible(_, _) => PREC_DEFEASIBLE,
        }
    }

    fn render_operand(&self, min_prec: u8, symbols: &Symbols, out: &mut String) {
        if self.precedence() < min_prec {
            out.push_str(symbols.open);
            self.render(symbols, out);
            out.push_str(symbols.close);
        } else {
            self.render(symbols, out);
        }
    }

    // The binding requirements mirror the parser: `&&`, `||` and `<=>` associate to the left, `=>` to the right.
    fn render(&self, symbols: &Symbols, out: &mut String) {
        let (lhs, rhs, op, lmin, rmin) = match self {
            Formula::Atom(name) => {
                out.push_str(name);
                return;
            }
            Formula::Not(inner) => {
                out.push_str(symbols.not);
                inner.render_operand(PREC_NOT, symbols, out);
                return;
            }
            Formula::And(l, r) => (l, r, symbols.and, PREC_AND, PREC_NOT),
            Formula::Or(l, r) => (l, r, symbols.or, PREC_OR, PREC_AND),
            Formula::Implies(l, r) => (l, r, symbols.implies, PREC_OR, PREC_IMPLIES),
            Formula::Iff(l, r) => (l, r, symbols.iff, PREC_IFF, PREC_IMPLIES),
            Formula::Defeasible(l, r) => (l, r, symbols.defeasible, PREC_IFF, PREC_IFF),
        };
        lhs.render_operand(lmin, symbols, out);
        out.push_str(op);
        rhs.render_operand(rmin, symbols, out);
    }
}

impl Display for Formula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut result = String::new();
        self.render(&ASCII, &mut result);
        write!(f, "{}", result)
    }
}

impl FromStr for Formula {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parser::parse_formula(s)
    }
}

impl Serialize for Formula {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Formula {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}
