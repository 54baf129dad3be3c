pub mod error;
pub mod formula;
pub mod inference;
pub mod justification;
pub mod justification_parser;
pub mod proof;
pub mod unify;

pub use error::FitchError;
pub use formula::Formula;
pub use inference::Inference;
pub use justification::{Justification, ResolvedSubproof, SubproofRange};
pub use justification_parser::{parse_justification, split_formula_and_justification, JUSTIFICATION_KEYWORD};
pub use proof::{Proof, ProofLine};
