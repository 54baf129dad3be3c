use serde::{Deserialize, Serialize};

use crate::error::FitchError;
use crate::formula::Formula;

/// A premise sequence paired with a conclusion. Two inferences are equal
/// iff their premises are pointwise equal and their conclusions are equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inference {
    pub premises: Vec<Formula>,
    pub conclusion: Formula,
}

impl Inference {
    pub fn new(premises: Vec<Formula>, conclusion: Formula) -> Self {
        Inference { premises, conclusion }
    }

    /// `P1, P2, … ⊢ C`, or `⊢ C` with no premises.
    pub fn render(&self) -> String {
        if self.premises.is_empty() {
            format!("⊢ {}", self.conclusion.render())
        } else {
            let premises = self
                .premises
                .iter()
                .map(Formula::render)
                .collect::<Vec<_>>()
                .join(", ");
            format!("{} ⊢ {}", premises, self.conclusion.render())
        }
    }

    /// Parses `P1, P2, … ⊢ C` (or `|-`); the premise list may be empty.
    /// Premises are split with a non-greedy scan: commas are only treated
    /// as separators where they leave every resulting fragment parseable
    /// as a complete formula.
    pub fn parse(input: &str) -> Result<Inference, FitchError> {
        let (premises_part, conclusion_part) = split_on_turnstile(input)?;
        let premises = if premises_part.trim().is_empty() {
            Vec::new()
        } else {
            split_formula_fragments(premises_part)?
                .into_iter()
                .map(|fragment| Formula::parse(&fragment))
                .collect::<Result<Vec<_>, _>>()?
        };
        let conclusion = Formula::parse(conclusion_part.trim()).map_err(|e| match e {
            FitchError::ParseErrorFormula { message } => FitchError::ParseErrorInference { message },
            other => other,
        })?;
        Ok(Inference::new(premises, conclusion))
    }
}

fn split_on_turnstile(input: &str) -> Result<(&str, &str), FitchError> {
    if let Some(idx) = input.find('⊢') {
        Ok((&input[..idx], &input[idx + '⊢'.len_utf8()..]))
    } else if let Some(idx) = input.find("|-") {
        Ok((&input[..idx], &input[idx + 2..]))
    } else {
        Err(FitchError::ParseErrorInference {
            message: "expected a turnstile ('⊢' or '|-') separating premises from the conclusion".into(),
        })
    }
}

/// Greedily splits on commas, then re-merges a fragment leftward into its
/// predecessor whenever it fails to parse as a standalone formula — a
/// formula in this grammar never contains a top-level comma, so this
/// converges on the unique split whenever one exists.
pub(crate) fn split_formula_fragments(input: &str) -> Result<Vec<String>, FitchError> {
    let raw: Vec<&str> = input.split(',').collect();
    let mut fragments: Vec<String> = Vec::new();
    for piece in raw {
        fragments.push(piece.to_string());
        loop {
            let candidate = fragments.last().unwrap().trim().to_string();
            if candidate.is_empty() {
                break;
            }
            if Formula::parse(&candidate).is_ok() {
                break;
            }
            if fragments.len() < 2 {
                break;
            }
            let merged = fragments.pop().unwrap();
            let prev = fragments.pop().unwrap();
            fragments.push(format!("{},{}", prev, merged));
        }
    }
    if fragments.iter().any(|f| f.trim().is_empty()) {
        return Err(FitchError::ParseErrorInference {
            message: "empty premise in inference".into(),
        });
    }
    Ok(fragments.into_iter().map(|f| f.trim().to_string()).collect())
}
