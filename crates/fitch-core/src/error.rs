use thiserror::Error;

/// Every way a formula, justification, or proof can be rejected.
///
/// Variants map one-to-one onto the error kinds the core is required to
/// distinguish; callers match on the variant rather than the message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FitchError {
    #[error("malformed formula: {message}")]
    ParseErrorFormula { message: String },

    #[error("malformed justification: {message}")]
    ParseErrorJustification { message: String },

    #[error("malformed inference: {message}")]
    ParseErrorInference { message: String },

    #[error("line lacks a justification (expected \"by\")")]
    MissingJustificationKeyword,

    #[error("a premise cannot follow a non-premise line")]
    MisplacedPremise,

    #[error("no assumption is open to discharge")]
    UnopenedAssumptionDischarge,

    #[error("line {line} does not exist or is not visible here")]
    CitedLineOutOfScope { line: usize },

    #[error("cited subproof {start}-{end} is not valid here")]
    CitedSubproofInvalid { start: usize, end: usize },

    #[error("inference \"{inference}\" has not been proved")]
    TheoremNotProved { inference: String },

    #[error("{message}")]
    RuleVerificationFailed { message: String },

    #[error("proof did not reach its goal")]
    GoalNotReached,
}
