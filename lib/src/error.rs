//! Errors reported by the reasoning engine.
//!
//! None of these are recovered internally: a malformed input, an inconsistent classical core or an
//! exhausted time budget must never be mistaken for a legitimate "not entailed" answer.

use thiserror::Error;

/// A specialised [`Result`][std::result::Result] for all reasoning operations.
pub type Result<T> = std::result::Result<T, Error>;

/// All errors the engine reports to its callers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The text is not a formula of the input grammar.
    #[error("malformed formula `{formula}`: {reason}")]
    MalformedFormula {
        /// The offending input.
        formula: String,
        /// What the parser stumbled over.
        reason: String,
    },
    /// The defeasible connective `~>` is misplaced.
    #[error("malformed defeasible implication `{formula}`: {reason}")]
    MalformedDefeasibleImplication {
        /// The offending input.
        formula: String,
        /// Why the placement of `~>` is rejected.
        reason: String,
    },
    /// The classical part of the knowledge base has no model.
    #[error("the classical statements of the knowledge base are inconsistent: {}", .statements.join(", "))]
    InconsistentClassicalCore {
        /// The classical statements, rendered.
        statements: Vec<String>,
    },
    /// A formula mentions an atom which is not part of the signature of the knowledge base.
    #[error("atom `{atom}` does not occur in the signature of the knowledge base")]
    UnboundAtom {
        /// The unknown atom.
        atom: String,
    },
    /// The time budget of the request is exhausted.
    #[error("computation exceeded its time budget of {budget_ms} ms")]
    ComputationTimeout {
        /// The configured budget in milliseconds.
        budget_ms: u128,
    },
    /// Reading input failed.
    #[error("io error: {0}")]
    Io(String),
    /// A document could not be (de-)serialised.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// A stable machine readable code for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Error::MalformedFormula { .. } => "malformed_formula",
            Error::MalformedDefeasibleImplication { .. } => "malformed_defeasible_implication",
            Error::InconsistentClassicalCore { .. } => "inconsistent_classical_core",
            Error::UnboundAtom { .. } => "unbound_atom",
            Error::ComputationTimeout { .. } => "computation_timeout",
            Error::Io(_) => "io",
            Error::Serialization(_) => "serialization",
        }
    }

    /// A short human readable description of the error kind.
    pub fn description(&self) -> &'static str {
        match self {
            Error::MalformedFormula { .. } => "The formula could not be parsed.",
            Error::MalformedDefeasibleImplication { .. } => {
                "A defeasible implication needs a non-empty antecedent and consequent and may only occur once, at the top level."
            }
            Error::InconsistentClassicalCore { .. } => {
                "The classical statements of the knowledge base have no model, no ranking can be computed."
            }
            Error::UnboundAtom { .. } => {
                "The formula uses an atom which does not occur in the knowledge base."
            }
            Error::ComputationTimeout { .. } => {
                "The computation took too long, try a smaller knowledge base."
            }
            Error::Io(_) => "Reading or writing data failed.",
            Error::Serialization(_) => "A document could not be converted from or to JSON.",
        }
    }

    /// Returns `true` if the error is caused by the input rather than by the computation.
    pub fn is_input_error(&self) -> bool {
        !matches!(self, Error::ComputationTimeout { .. } | Error::Io(_))
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
