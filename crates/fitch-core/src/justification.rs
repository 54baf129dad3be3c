use serde::{Deserialize, Serialize};

use crate::error::FitchError;
use crate::formula::Formula;
use crate::inference::Inference;
use crate::unify::unify_inference;

/// A closed, previously-discharged subproof `start..=end`, as resolved
/// by the proof state machine for citation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubproofRange {
    pub start: usize,
    pub end: usize,
}

impl SubproofRange {
    pub fn new(start: usize, end: usize) -> Self {
        SubproofRange { start, end }
    }
}

/// The formulas of a cited subproof's opening assumption and final line,
/// resolved by the proof state machine before a rule predicate runs.
#[derive(Debug, Clone)]
pub struct ResolvedSubproof {
    pub assumption: Formula,
    pub conclusion: Formula,
}

/// The justification catalogue (component D). Each non-`Premise`,
/// non-`Assumption` variant names the line numbers/subproof ranges it
/// cites directly in its payload, so a justification parsed with the
/// wrong number of citations for its kind never exists as a value —
/// arity mismatches are rejected earlier, by the justification parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Justification {
    Premise,
    Assumption,
    Reiteration(usize),
    AndIntro(usize, usize),
    AndElim(usize),
    OrIntro(usize),
    OrElim(usize, SubproofRange, SubproofRange),
    ImpIntro(SubproofRange),
    ImpElim(usize, usize),
    NegIntro(SubproofRange),
    NegElim(usize, usize),
    IffIntro(SubproofRange, SubproofRange),
    IffElim(usize, usize),
    DoubleNegElim(usize),
    Apply(Inference, Vec<usize>),
}

impl Justification {
    /// Single line numbers this justification cites, in the order they
    /// should be resolved. Does not include subproof endpoints.
    pub fn cited_lines(&self) -> Vec<usize> {
        match self {
            Justification::Premise | Justification::Assumption => vec![],
            Justification::Reiteration(n) => vec![*n],
            Justification::AndIntro(a, b) => vec![*a, *b],
            Justification::AndElim(n) => vec![*n],
            Justification::OrIntro(n) => vec![*n],
            Justification::OrElim(n, _, _) => vec![*n],
            Justification::ImpIntro(_) => vec![],
            Justification::ImpElim(a, b) => vec![*a, *b],
            Justification::NegIntro(_) => vec![],
            Justification::NegElim(a, b) => vec![*a, *b],
            Justification::IffIntro(_, _) => vec![],
            Justification::IffElim(a, b) => vec![*a, *b],
            Justification::DoubleNegElim(n) => vec![*n],
            Justification::Apply(_, cited) => cited.clone(),
        }
    }

    /// Subproof ranges this justification cites.
    pub fn cited_subproofs(&self) -> Vec<SubproofRange> {
        match self {
            Justification::OrElim(_, s1, s2) => vec![*s1, *s2],
            Justification::ImpIntro(s) => vec![*s],
            Justification::NegIntro(s) => vec![*s],
            Justification::IffIntro(s1, s2) => vec![*s1, *s2],
            _ => vec![],
        }
    }

    /// Verifies the candidate formula against already-resolved citations.
    /// `lines` and `subproofs` must already have been scope-checked by
    /// the proof state machine; this function only checks the rule's
    /// formula-level condition.
    pub fn verify(
        &self,
        candidate: &Formula,
        lines: &[Formula],
        subproofs: &[ResolvedSubproof],
        registry: &[Inference],
    ) -> Result<(), FitchError> {
        match self {
            Justification::Premise | Justification::Assumption => Ok(()),

            Justification::Reiteration(_) => {
                let a = &lines[0];
                verify_eq(a, candidate, "reiterated line must match exactly")
            }

            Justification::AndIntro(_, _) => match candidate {
                Formula::And(x, y) => {
                    verify_eq(x, &lines[0], "first conjunct must match the first cited line")?;
                    verify_eq(y, &lines[1], "second conjunct must match the second cited line")
                }
                _ => fail("conclusion of ∧-introduction must be a conjunction"),
            },

            Justification::AndElim(_) => match &lines[0] {
                Formula::And(x, y) => {
                    if candidate == x.as_ref() || candidate == y.as_ref() {
                        Ok(())
                    } else {
                        fail("conclusion must be one of the cited conjunction's conjuncts")
                    }
                }
                _ => fail("cited line must be a conjunction"),
            },

            Justification::OrIntro(_) => match candidate {
                Formula::Or(x, y) => {
                    if lines[0] == *x.as_ref() || lines[0] == *y.as_ref() {
                        Ok(())
                    } else {
                        fail("cited line must match one of the conclusion's disjuncts")
                    }
                }
                _ => fail("conclusion of ∨-introduction must be a disjunction"),
            },

            Justification::OrElim(_, _, _) => {
                let (x, y) = match &lines[0] {
                    Formula::Or(x, y) => (x.as_ref(), y.as_ref()),
                    _ => return fail("cited line must be a disjunction"),
                };
                let s1 = &subproofs[0];
                let s2 = &subproofs[1];
                verify_eq(&s1.assumption, x, "first subproof must assume the first disjunct")?;
                verify_eq(&s2.assumption, y, "second subproof must assume the second disjunct")?;
                verify_eq(&s1.conclusion, candidate, "first subproof must conclude the target formula")?;
                verify_eq(&s2.conclusion, candidate, "second subproof must conclude the target formula")
            }

            Justification::ImpIntro(_) => {
                let s = &subproofs[0];
                match candidate {
                    Formula::Imp(x, y) => {
                        verify_eq(&s.assumption, x, "subproof assumption must match the antecedent")?;
                        verify_eq(&s.conclusion, y, "subproof conclusion must match the consequent")
                    }
                    _ => fail("conclusion of →-introduction must be a conditional"),
                }
            }

            Justification::ImpElim(_, _) => {
                let a = &lines[0];
                let b = &lines[1];
                if let Formula::Imp(x, y) = a {
                    if b == x.as_ref() && candidate == y.as_ref() {
                        return Ok(());
                    }
                }
                if let Formula::Imp(x, y) = b {
                    if a == x.as_ref() && candidate == y.as_ref() {
                        return Ok(());
                    }
                }
                fail("cited lines do not form a conditional and its antecedent")
            }

            Justification::NegIntro(_) => {
                let s = &subproofs[0];
                if s.conclusion != Formula::Bottom {
                    return fail("subproof must derive a contradiction");
                }
                verify_eq(candidate, &Formula::neg(s.assumption.clone()), "conclusion must be the negated assumption")
            }

            Justification::NegElim(_, _) => {
                let a = &lines[0];
                let b = &lines[1];
                let contradictory = matches!(a, Formula::Neg(inner) if inner.as_ref() == b)
                    || matches!(b, Formula::Neg(inner) if inner.as_ref() == a);
                if !contradictory {
                    return fail("cited lines must be a formula and its negation");
                }
                verify_eq(candidate, &Formula::Bottom, "conclusion of ¬-elimination must be ⊥")
            }

            Justification::IffIntro(_, _) => {
                let s1 = &subproofs[0];
                let s2 = &subproofs[1];
                match candidate {
                    Formula::Iff(x, y) => {
                        verify_eq(&s1.assumption, x, "first subproof must assume the left side")?;
                        verify_eq(&s1.conclusion, y, "first subproof must conclude the right side")?;
                        verify_eq(&s2.assumption, y, "second subproof must assume the right side")?;
                        verify_eq(&s2.conclusion, x, "second subproof must conclude the left side")
                    }
                    _ => fail("conclusion of ↔-introduction must be a biconditional"),
                }
            }

            Justification::IffElim(_, _) => {
                let a = &lines[0];
                let b = &lines[1];
                if let Formula::Iff(x, y) = a {
                    if (b == x.as_ref() && candidate == y.as_ref())
                        || (b == y.as_ref() && candidate == x.as_ref())
                    {
                        return Ok(());
                    }
                }
                if let Formula::Iff(x, y) = b {
                    if (a == x.as_ref() && candidate == y.as_ref())
                        || (a == y.as_ref() && candidate == x.as_ref())
                    {
                        return Ok(());
                    }
                }
                fail("cited lines do not form a biconditional and one of its sides")
            }

            Justification::DoubleNegElim(_) => {
                let doubly_negated = Formula::neg(Formula::neg(candidate.clone()));
                verify_eq(&lines[0], &doubly_negated, "cited line must be the double negation of the conclusion")
            }

            Justification::Apply(theorem, _) => {
                if !registry.contains(theorem) {
                    return Err(FitchError::TheoremNotProved {
                        inference: theorem.render(),
                    });
                }
                let unified = unify_inference(&theorem.premises, lines, &theorem.conclusion, candidate);
                if unified.is_some() {
                    Ok(())
                } else {
                    fail("cited lines and conclusion do not unify with the applied inference")
                }
            }
        }
    }
}

fn verify_eq(a: &Formula, b: &Formula, message: &str) -> Result<(), FitchError> {
    if a == b {
        Ok(())
    } else {
        Err(FitchError::RuleVerificationFailed {
            message: format!("{}: expected {}, found {}", message, a.render(), b.render()),
        })
    }
}

fn fail(message: &str) -> Result<(), FitchError> {
    Err(FitchError::RuleVerificationFailed {
        message: message.to_string(),
    })
}
