//! Error taxonomy shared by every component.

use thiserror::Error;

/// Errors surfaced by creators, algorithms, graph operations and analytics.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// A node, gene or algorithm could not be instantiated.
    #[error("cannot construct {what}: {reason}")]
    Construction { what: String, reason: String },

    /// An operation needed at least one solution.
    #[error("population is empty")]
    EmptyPopulation,

    /// The solution carries no genes and cannot be scored.
    #[error("solution cannot be evaluated: {0}")]
    UnevaluableSolution(String),

    /// A GP graph failed structural validation.
    #[error("invalid graph: {0}")]
    InvalidGraph(String),

    /// Analytics methods were called out of sequence.
    #[error("analytics call out of order: {0}")]
    LoggingOrder(String),

    /// A configuration failed `validate()`.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    pub(crate) fn construction(what: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Construction {
            what: what.into(),
            reason: reason.into(),
        }
    }
}

/// Crate-wide result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = Error::construction("node Add", "no blueprint for Number");
        assert_eq!(
            err.to_string(),
            "cannot construct node Add: no blueprint for Number"
        );
        assert_eq!(Error::EmptyPopulation.to_string(), "population is empty");
        assert_eq!(
            Error::LoggingOrder("step before headers".into()).to_string(),
            "analytics call out of order: step before headers"
        );
    }
}
