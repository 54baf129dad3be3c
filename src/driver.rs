//! Drives a `.fitch` source file: indentation accounting, `#import`
//! resolution, and line-by-line dispatch into the `Proof` state machine.
//! Grounded in the reference interpreter's `FitchInterpreter`.

use std::fs;
use std::path::{Path, PathBuf};

use fitch_core::{parse_justification, split_formula_and_justification, Formula, Inference, Justification, Proof};

const PROOF_KEYWORD: &str = "proof";
const IMPORT_KEYWORD: &str = "#import";
const COMMENT_SYMBOL: char = '%';
const TAB_INDENTATION_VALUE: usize = 4;

/// A file-and-line-aware wrapper around a core `FitchError` (or a
/// driver-only message such as a malformed import). The core engine
/// itself never knows about file paths or physical line numbers.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("File \"{file}\", line {line}: {message}")]
pub struct DriverError {
    pub file: String,
    pub line: usize,
    pub message: String,
}

impl DriverError {
    fn new(file: &Path, line: usize, message: impl Into<String>) -> Self {
        DriverError {
            file: file.display().to_string(),
            line,
            message: message.into(),
        }
    }
}

/// A proof that reached its goal: the goal itself, plus a rendering of
/// every admitted line for display.
pub struct ProofOutcome {
    pub goal: Inference,
    pub lines: Vec<String>,
}

/// Interprets one or more `.fitch` files, threading a registry of proved
/// inferences across `#import`s and `apply` citations. A single `Driver`
/// is meant to be used for one top-level `check_file` call; state from
/// completed proofs (including imports) accumulates in `registry` as it
/// runs.
#[derive(Default)]
pub struct Driver {
    registry: Vec<Inference>,
}

impl Driver {
    pub fn new() -> Self {
        Driver::default()
    }

    pub fn registry(&self) -> &[Inference] {
        &self.registry
    }

    pub fn check_file(&mut self, path: &Path) -> Result<Vec<ProofOutcome>, DriverError> {
        let content = fs::read_to_string(path)
            .map_err(|e| DriverError::new(path, 0, format!("could not read file: {}", e)))?;
        self.interpret(path, &content)
    }

    fn interpret(&mut self, path: &Path, content: &str) -> Result<Vec<ProofOutcome>, DriverError> {
        let stripped = remove_comments(content);
        let (preamble, proof_blocks) = split_proof_blocks(&stripped);

        let mut line_number = 0usize;
        for raw_line in preamble.lines() {
            line_number += 1;
            let line = raw_line.trim_end();
            if line.is_empty() {
                continue;
            }
            if !line.starts_with(IMPORT_KEYWORD) {
                return Err(DriverError::new(path, line_number, "expected import statement"));
            }
            let imported_name = line[IMPORT_KEYWORD.len()..].trim();
            let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
            let imported_path: PathBuf = base_dir.join(imported_name);
            let imported_content = fs::read_to_string(&imported_path)
                .map_err(|_| DriverError::new(path, line_number, "imported file doesn't exist"))?;
            self.interpret(&imported_path, &imported_content)?;
        }

        let mut outcomes = Vec::with_capacity(proof_blocks.len());
        for (start_line, block) in &proof_blocks {
            outcomes.push(self.interpret_proof(path, block, *start_line)?);
        }
        Ok(outcomes)
    }

    /// `start_line` is the physical line number (within `path`, 1-based)
    /// of `proof_str`'s own first line, so errors raised while checking
    /// this block report the line the user would see by opening the
    /// file, not a count restarted at the top of this block.
    fn interpret_proof(
        &mut self,
        path: &Path,
        proof_str: &str,
        start_line: usize,
    ) -> Result<ProofOutcome, DriverError> {
        let mut lines_iter = proof_str.lines();
        let first_line = lines_iter.next().unwrap_or("");
        let goal_text = first_line[PROOF_KEYWORD.len()..].trim();
        let goal = Inference::parse(goal_text)
            .map_err(|_| DriverError::new(path, start_line, "could not parse proof goal"))?;

        let mut proof = Proof::new(goal);
        let mut previous_indentation = 0usize;
        let mut is_first_line = true;
        let mut line_number = start_line;

        for raw_line in lines_iter {
            line_number += 1;
            let without_number = remove_line_number(raw_line.trim_end());
            if without_number.trim().is_empty() {
                continue;
            }
            let indentation = indentation_value(&without_number);
            let trimmed = without_number.trim();

            let (formula_part, justification_part) = split_formula_and_justification(trimmed)
                .map_err(|e| DriverError::new(path, line_number, e.to_string()))?;

            let formula = Formula::parse(formula_part).map_err(|_| {
                DriverError::new(
                    path,
                    line_number,
                    format!("invalid syntax for line main formula '{}'", formula_part),
                )
            })?;
            let justification = parse_justification(justification_part).map_err(|_| {
                DriverError::new(
                    path,
                    line_number,
                    format!("invalid syntax for justification '{}'", justification_part),
                )
            })?;

            if indentation < previous_indentation && !is_first_line {
                proof
                    .discharge_assumption()
                    .map_err(|_| DriverError::new(path, line_number, "could not discharge assumption"))?;
            }

            match &justification {
                Justification::Premise => {
                    proof
                        .admit_premise(formula)
                        .map_err(|e| DriverError::new(path, line_number, e.to_string()))?;
                }
                Justification::Assumption => {
                    if indentation > previous_indentation {
                        proof
                            .open_assumption(formula)
                            .map_err(|e| DriverError::new(path, line_number, e.to_string()))?;
                    } else if indentation == previous_indentation {
                        proof
                            .discharge_assumption()
                            .map_err(|e| DriverError::new(path, line_number, e.to_string()))?;
                        proof
                            .open_assumption(formula)
                            .map_err(|e| DriverError::new(path, line_number, e.to_string()))?;
                    } else {
                        return Err(DriverError::new(path, line_number, "expected assumption"));
                    }
                }
                _ => {
                    proof
                        .admit_step(formula, justification, &self.registry)
                        .map_err(|e| DriverError::new(path, line_number, e.to_string()))?;
                }
            }

            previous_indentation = indentation;
            is_first_line = false;
        }

        proof
            .goal_reached()
            .map_err(|_| DriverError::new(path, line_number, "proof did not reach goal"))?;

        let lines = proof
            .steps
            .iter()
            .map(|step| {
                format!(
                    "{}{}. {} by {}",
                    "    ".repeat(step.depth),
                    step.line_number,
                    step.formula.render(),
                    render_justification(&step.justification)
                )
            })
            .collect();

        let goal = proof.goal.clone();
        self.registry.push(goal.clone());
        Ok(ProofOutcome { goal, lines })
    }
}

fn remove_comments(code: &str) -> String {
    code.lines()
        .map(|line| match line.find(COMMENT_SYMBOL) {
            Some(idx) => &line[..idx],
            None => line,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn indentation_value(line: &str) -> usize {
    let mut value = 0;
    for ch in line.chars() {
        match ch {
            ' ' => value += 1,
            '\t' => value += TAB_INDENTATION_VALUE,
            _ => break,
        }
    }
    value
}

/// Strips a leading `<digits>.<whitespace>` line-number prefix, if present,
/// wherever the first such run occurs in the line.
fn remove_line_number(line: &str) -> String {
    let chars: Vec<char> = line.chars().collect();
    let mut result = String::with_capacity(line.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i].is_ascii_digit() {
            let mut j = i;
            while j < chars.len() && chars[j].is_ascii_digit() {
                j += 1;
            }
            if j < chars.len() && chars[j] == '.' {
                j += 1;
                while j < chars.len() && chars[j].is_whitespace() {
                    j += 1;
                }
                i = j;
                continue;
            }
            result.extend(&chars[i..j]);
            i = j;
            continue;
        }
        result.push(chars[i]);
        i += 1;
    }
    result
}

/// Splits `content` into the text before the first `proof` block and the
/// list of `proof ...` blocks themselves, each running up to (but not
/// including) the next occurrence of the keyword. Each block is paired
/// with its own physical starting line number (1-based, counted from the
/// top of `content`) so callers can report errors at the line the user
/// would actually see, rather than restarting the count per block.
fn split_proof_blocks(content: &str) -> (&str, Vec<(usize, String)>) {
    let mut starts = Vec::new();
    let mut search_from = 0;
    while let Some(pos) = content[search_from..].find(PROOF_KEYWORD) {
        starts.push(search_from + pos);
        search_from += pos + PROOF_KEYWORD.len();
    }
    if starts.is_empty() {
        return (content, Vec::new());
    }
    let preamble = &content[..starts[0]];
    let blocks = starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(content.len());
            let start_line = content[..start].matches('\n').count() + 1;
            (start_line, content[start..end].to_string())
        })
        .collect();
    (preamble, blocks)
}

fn render_justification(justification: &Justification) -> String {
    fn range(r: fitch_core::SubproofRange) -> String {
        format!("{}-{}", r.start, r.end)
    }
    match justification {
        Justification::Premise => "PR".to_string(),
        Justification::Assumption => "AS".to_string(),
        Justification::Reiteration(n) => format!("R {}", n),
        Justification::AndIntro(a, b) => format!("&I {}, {}", a, b),
        Justification::AndElim(n) => format!("&E {}", n),
        Justification::OrIntro(n) => format!("vI {}", n),
        Justification::OrElim(n, s1, s2) => format!("vE {}, {}, {}", n, range(*s1), range(*s2)),
        Justification::ImpIntro(s) => format!("->I {}", range(*s)),
        Justification::ImpElim(a, b) => format!("->E {}, {}", a, b),
        Justification::NegIntro(s) => format!("~I {}", range(*s)),
        Justification::NegElim(a, b) => format!("~E {}, {}", a, b),
        Justification::IffIntro(s1, s2) => format!("<->I {}, {}", range(*s1), range(*s2)),
        Justification::IffElim(a, b) => format!("<->E {}, {}", a, b),
        Justification::DoubleNegElim(n) => format!("DNE {}", n),
        Justification::Apply(theorem, cited) => {
            let citations = cited
                .iter()
                .map(usize::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            format!("apply {} {}", theorem.render(), citations)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn checks_a_implies_a() {
        let file = write_temp(
            "proof |- A -> A\n    A by AS\n    A by R 1\nA -> A by ->I 1-2\n",
        );
        let mut driver = Driver::new();
        let outcomes = driver.check_file(file.path()).unwrap();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].goal.conclusion, Formula::imp(Formula::prop("A"), Formula::prop("A")));
    }

    #[test]
    fn rejects_missing_justification_keyword() {
        let file = write_temp("proof |- A -> A\n    A\n");
        let mut driver = Driver::new();
        let err = driver.check_file(file.path()).unwrap_err();
        assert!(err.message.contains("justification"));
    }

    #[test]
    fn strips_comments_and_blank_lines() {
        let file = write_temp(
            "% a comment\nproof |- A -> A\n\n    A by AS % assume A\n    A by R 1\nA -> A by ->I 1-2\n",
        );
        let mut driver = Driver::new();
        let outcomes = driver.check_file(file.path()).unwrap();
        assert_eq!(outcomes.len(), 1);
    }

    #[test]
    fn registry_grows_after_a_successful_proof() {
        let file = write_temp("proof |- A -> A\n    A by AS\n    A by R 1\nA -> A by ->I 1-2\n");
        let mut driver = Driver::new();
        driver.check_file(file.path()).unwrap();
        assert_eq!(driver.registry().len(), 1);
    }
}
