use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::FitchError;
use crate::formula::Formula;
use crate::inference::Inference;
use crate::justification::{Justification, ResolvedSubproof, SubproofRange};

/// One admitted line. `line_number` and `depth` are assigned by the
/// state machine at admission time, never supplied by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProofLine {
    pub line_number: usize,
    pub formula: Formula,
    pub justification: Justification,
    pub depth: usize,
}

/// The proof state machine (component G). Every mutating operation is
/// fail-fast: on error nothing is appended and `self` is left exactly as
/// it was before the call, so the caller simply stops using the value —
/// there is no rewind operation because none is ever needed.
#[derive(Debug, Clone)]
pub struct Proof {
    pub goal: Inference,
    pub steps: Vec<ProofLine>,
    pub current_depth: usize,
}

impl Proof {
    pub fn new(goal: Inference) -> Self {
        Proof {
            goal,
            steps: Vec::new(),
            current_depth: 0,
        }
    }

    /// Requires `steps` empty or the last line to be a `Premise`.
    pub fn admit_premise(&mut self, formula: Formula) -> Result<usize, FitchError> {
        if let Some(last) = self.steps.last() {
            if last.justification != Justification::Premise {
                return Err(FitchError::MisplacedPremise);
            }
        }
        Ok(self.push(formula, Justification::Premise, 0))
    }

    /// Opens a new subproof one level deeper than the current one.
    pub fn open_assumption(&mut self, formula: Formula) -> Result<usize, FitchError> {
        self.current_depth += 1;
        Ok(self.push(formula, Justification::Assumption, self.current_depth))
    }

    /// Closes the innermost open subproof.
    pub fn discharge_assumption(&mut self) -> Result<(), FitchError> {
        if self.current_depth == 0 {
            return Err(FitchError::UnopenedAssumptionDischarge);
        }
        self.current_depth -= 1;
        Ok(())
    }

    /// Validates every citation `justification` makes, resolves the
    /// formulas they refer to, runs the rule predicate, and only then
    /// appends the line.
    pub fn admit_step(
        &mut self,
        formula: Formula,
        justification: Justification,
        registry: &[Inference],
    ) -> Result<usize, FitchError> {
        let mut cited_formulas = Vec::with_capacity(justification.cited_lines().len());
        for n in justification.cited_lines() {
            self.check_line_in_scope(n)?;
            cited_formulas.push(self.steps[n - 1].formula.clone());
        }

        let mut resolved_subproofs = Vec::with_capacity(justification.cited_subproofs().len());
        for range in justification.cited_subproofs() {
            self.check_subproof_valid(range)?;
            resolved_subproofs.push(ResolvedSubproof {
                assumption: self.steps[range.start - 1].formula.clone(),
                conclusion: self.steps[range.end - 1].formula.clone(),
            });
        }

        justification.verify(&formula, &cited_formulas, &resolved_subproofs, registry)?;

        let depth = self.current_depth;
        Ok(self.push(formula, justification, depth))
    }

    fn push(&mut self, formula: Formula, justification: Justification, depth: usize) -> usize {
        let line_number = self.steps.len() + 1;
        self.steps.push(ProofLine {
            line_number,
            formula,
            justification,
            depth,
        });
        line_number
    }

    /// `n` must name an admitted line at a depth not deeper than the
    /// current one, and if that depth is nonzero, the subproof
    /// containing `n` must still be open.
    fn check_line_in_scope(&self, n: usize) -> Result<(), FitchError> {
        let out_of_scope = || FitchError::CitedLineOutOfScope { line: n };
        let idx = n.checked_sub(1).ok_or_else(out_of_scope)?;
        let line = self.steps.get(idx).ok_or_else(out_of_scope)?;
        let d_n = line.depth;
        if d_n > self.current_depth {
            return Err(out_of_scope());
        }
        if d_n > 0 {
            for later in &self.steps[idx + 1..] {
                if later.depth < d_n {
                    return Err(out_of_scope());
                }
                if later.depth == d_n && later.justification == Justification::Assumption {
                    return Err(out_of_scope());
                }
            }
        }
        Ok(())
    }

    /// `a..=b` must be an `Assumption`-started, depth-consistent block
    /// that is the subproof just discharged (one level deeper than the
    /// current depth), with no sibling subproof having since reused
    /// either its own slot or its parent's.
    fn check_subproof_valid(&self, range: SubproofRange) -> Result<(), FitchError> {
        let invalid = || FitchError::CitedSubproofInvalid {
            start: range.start,
            end: range.end,
        };
        if range.start == 0 || range.start > range.end {
            return Err(invalid());
        }
        let start_line = self.steps.get(range.start - 1).ok_or_else(invalid)?;
        let end_line = self.steps.get(range.end - 1).ok_or_else(invalid)?;
        if start_line.justification != Justification::Assumption {
            return Err(invalid());
        }
        let depth = start_line.depth;
        if end_line.depth != depth {
            return Err(invalid());
        }
        for line in &self.steps[range.start..range.end] {
            if line.depth < depth {
                return Err(invalid());
            }
        }
        if let Some(next) = self.steps.get(range.end) {
            if next.depth == depth && next.justification != Justification::Assumption {
                return Err(invalid());
            }
        }
        if self.current_depth + 1 != depth {
            return Err(invalid());
        }
        let parent_depth = depth - 1;
        for line in &self.steps[range.end..] {
            if line.depth < parent_depth {
                return Err(invalid());
            }
            if line.depth == parent_depth && line.justification == Justification::Assumption {
                return Err(invalid());
            }
        }
        Ok(())
    }

    /// True iff the last line matches the goal's conclusion and the
    /// opening `Premise` block equals `goal.premises` as a multiset.
    pub fn goal_reached(&self) -> Result<(), FitchError> {
        let last = self.steps.last().ok_or(FitchError::GoalNotReached)?;
        if last.formula != self.goal.conclusion {
            return Err(FitchError::GoalNotReached);
        }
        let mut premises_used = Vec::new();
        for step in &self.steps {
            if step.justification == Justification::Premise {
                premises_used.push(step.formula.clone());
            } else {
                break;
            }
        }
        if multiset_eq(&premises_used, &self.goal.premises) {
            Ok(())
        } else {
            Err(FitchError::GoalNotReached)
        }
    }
}

fn multiset_eq(a: &[Formula], b: &[Formula]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut counts: HashMap<&Formula, usize> = HashMap::new();
    for f in a {
        *counts.entry(f).or_insert(0) += 1;
    }
    for f in b {
        match counts.get_mut(f) {
            Some(c) if *c > 0 => *c -= 1,
            _ => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::justification::SubproofRange;

    fn p(name: &str) -> Formula {
        Formula::prop(name)
    }

    #[test]
    fn premises_then_steps() {
        let mut proof = Proof::new(Inference::new(vec![p("A"), p("B")], p("A")));
        proof.admit_premise(p("A")).unwrap();
        proof.admit_premise(p("B")).unwrap();
        proof
            .admit_step(p("A"), Justification::AndElim(0), &[])
            .unwrap_err(); // line 0 never exists

        let line = proof.admit_step(p("A"), Justification::Reiteration(1), &[]).unwrap();
        assert_eq!(line, 3);
    }

    #[test]
    fn misplaced_premise_is_rejected() {
        let mut proof = Proof::new(Inference::new(vec![p("A")], p("A")));
        proof.admit_premise(p("A")).unwrap();
        proof.admit_step(p("A"), Justification::Reiteration(1), &[]).unwrap();
        assert_eq!(proof.admit_premise(p("B")).unwrap_err(), FitchError::MisplacedPremise);
    }

    #[test]
    fn discharge_without_assumption_is_rejected() {
        let mut proof = Proof::new(Inference::new(vec![], p("A")));
        assert_eq!(
            proof.discharge_assumption().unwrap_err(),
            FitchError::UnopenedAssumptionDischarge
        );
    }

    #[test]
    fn a_implies_a_scenario() {
        // |- A -> A
        let mut proof = Proof::new(Inference::new(vec![], Formula::imp(p("A"), p("A"))));
        proof.open_assumption(p("A")).unwrap(); // line 1, depth 1
        proof.admit_step(p("A"), Justification::Reiteration(1), &[]).unwrap(); // line 2, depth 1
        proof.discharge_assumption().unwrap();
        proof
            .admit_step(
                Formula::imp(p("A"), p("A")),
                Justification::ImpIntro(SubproofRange::new(1, 2)),
                &[],
            )
            .unwrap(); // line 3, depth 0
        assert!(proof.goal_reached().is_ok());
    }

    #[test]
    fn and_commutes_scenario() {
        // A & B |- B & A
        let mut proof = Proof::new(Inference::new(
            vec![Formula::and(p("A"), p("B"))],
            Formula::and(p("B"), p("A")),
        ));
        proof.admit_premise(Formula::and(p("A"), p("B"))).unwrap(); // 1
        proof.admit_step(p("B"), Justification::AndElim(1), &[]).unwrap(); // 2
        proof.admit_step(p("A"), Justification::AndElim(1), &[]).unwrap(); // 3
        proof
            .admit_step(Formula::and(p("B"), p("A")), Justification::AndIntro(2, 3), &[])
            .unwrap(); // 4
        assert!(proof.goal_reached().is_ok());
    }

    #[test]
    fn citing_a_line_inside_a_closed_subproof_is_out_of_scope() {
        let mut proof = Proof::new(Inference::new(vec![], p("A")));
        proof.open_assumption(p("A")).unwrap(); // 1, depth 1
        proof.admit_step(p("A"), Justification::Reiteration(1), &[]).unwrap(); // 2, depth 1
        proof.discharge_assumption().unwrap(); // back to depth 0
        proof.open_assumption(p("B")).unwrap(); // 3, depth 1, sibling subproof
        let err = proof
            .admit_step(p("A"), Justification::Reiteration(1), &[])
            .unwrap_err();
        assert_eq!(err, FitchError::CitedLineOutOfScope { line: 1 });
    }

    #[test]
    fn or_elim_combines_two_sibling_subproofs() {
        // A v A, A -> C |- C
        let mut proof = Proof::new(Inference::new(
            vec![Formula::or(p("A"), p("A")), Formula::imp(p("A"), p("C"))],
            p("C"),
        ));
        proof.admit_premise(Formula::or(p("A"), p("A"))).unwrap(); // 1
        proof.admit_premise(Formula::imp(p("A"), p("C"))).unwrap(); // 2
        proof.open_assumption(p("A")).unwrap(); // 3, depth 1
        proof.admit_step(p("C"), Justification::ImpElim(2, 3), &[]).unwrap(); // 4, depth 1
        proof.discharge_assumption().unwrap();
        proof.open_assumption(p("A")).unwrap(); // 5, depth 1, sibling
        proof.admit_step(p("C"), Justification::ImpElim(2, 5), &[]).unwrap(); // 6, depth 1
        proof.discharge_assumption().unwrap();
        proof
            .admit_step(
                p("C"),
                Justification::OrElim(1, SubproofRange::new(3, 4), SubproofRange::new(5, 6)),
                &[],
            )
            .unwrap();
        assert!(proof.goal_reached().is_ok());
    }

    #[test]
    fn goal_premises_are_compared_as_a_multiset() {
        let mut proof = Proof::new(Inference::new(vec![p("A"), p("A")], p("A")));
        proof.admit_premise(p("A")).unwrap();
        proof.admit_premise(p("A")).unwrap();
        proof.admit_step(p("A"), Justification::Reiteration(1), &[]).unwrap();
        assert!(proof.goal_reached().is_ok());

        let mut proof_wrong_multiplicity = Proof::new(Inference::new(vec![p("A"), p("A")], p("A")));
        proof_wrong_multiplicity.admit_premise(p("A")).unwrap();
        proof_wrong_multiplicity
            .admit_step(p("A"), Justification::Reiteration(1), &[])
            .unwrap();
        assert!(proof_wrong_multiplicity.goal_reached().is_err());
    }

    #[test]
    fn apply_requires_theorem_in_registry() {
        let theorem = Inference::new(vec![p("P")], Formula::or(p("P"), p("P")));
        let mut proof = Proof::new(Inference::new(vec![p("C")], Formula::or(p("C"), p("C"))));
        proof.admit_premise(p("C")).unwrap();
        let err = proof
            .admit_step(
                Formula::or(p("C"), p("C")),
                Justification::Apply(theorem.clone(), vec![1]),
                &[],
            )
            .unwrap_err();
        assert!(matches!(err, FitchError::TheoremNotProved { .. }));

        proof
            .admit_step(
                Formula::or(p("C"), p("C")),
                Justification::Apply(theorem.clone(), vec![1]),
                &[theorem],
            )
            .unwrap();
        assert!(proof.goal_reached().is_ok());
    }
}
