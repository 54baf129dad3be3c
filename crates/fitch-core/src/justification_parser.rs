use crate::error::FitchError;
use crate::formula::Formula;
use crate::inference::Inference;
use crate::justification::{Justification, SubproofRange};

#[derive(Debug, Clone, Copy)]
enum CitationToken {
    Line(usize),
    Range(SubproofRange),
}

/// The keyword separating a proof line's formula from its justification.
pub const JUSTIFICATION_KEYWORD: &str = "by";

/// Splits a proof line's body into its formula text and justification
/// text, at the first occurrence of the `by` keyword. Callers such as the
/// driver feed it the trimmed line body and wrap the resulting
/// `MissingJustificationKeyword` error the same way as any other.
pub fn split_formula_and_justification(line: &str) -> Result<(&str, &str), FitchError> {
    match line.find(JUSTIFICATION_KEYWORD) {
        Some(idx) => Ok((line[..idx].trim(), line[idx + JUSTIFICATION_KEYWORD.len()..].trim())),
        None => Err(FitchError::MissingJustificationKeyword),
    }
}

/// Parses one justification phrase (the text after `by`) into a
/// `Justification`. Citation-arity mismatches for a given rule keyword
/// are rejected here, as `ParseErrorJustification`, per the contract
/// that arity is a parse-time concern.
pub fn parse_justification(input: &str) -> Result<Justification, FitchError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(FitchError::ParseErrorJustification {
            message: "empty justification".into(),
        });
    }
    let (keyword, rest) = split_keyword(trimmed);
    match keyword {
        "R" => parse_one_line(rest, Justification::Reiteration),
        "vI" | "∨I" | "|I" => parse_one_line(rest, Justification::OrIntro),
        "vE" | "∨E" | "|E" => parse_or_elim(rest),
        "&I" | "∧I" => parse_two_lines(rest, Justification::AndIntro),
        "&E" | "∧E" => parse_one_line(rest, Justification::AndElim),
        "->I" | "→I" => parse_one_range(rest, Justification::ImpIntro),
        "->E" | "→E" => parse_two_lines(rest, Justification::ImpElim),
        "~I" | "¬I" => parse_one_range(rest, Justification::NegIntro),
        "~E" | "¬E" => parse_two_lines(rest, Justification::NegElim),
        "<->I" | "↔I" => parse_two_ranges(rest, Justification::IffIntro),
        "<->E" | "↔E" => parse_two_lines(rest, Justification::IffElim),
        "DNE" | "~~E" | "¬¬E" => parse_one_line(rest, Justification::DoubleNegElim),
        "PR" | "Pr" | "Premise" => require_empty(rest, Justification::Premise),
        "AS" | "As" | "Assumption" => require_empty(rest, Justification::Assumption),
        "apply" => parse_apply(rest),
        other => Err(FitchError::ParseErrorJustification {
            message: format!("unknown justification keyword '{}'", other),
        }),
    }
}

/// Splits a keyword token (made of letters/symbols) from the citation
/// text that follows it, at the first whitespace or digit.
fn split_keyword(s: &str) -> (&str, &str) {
    match s.char_indices().find(|&(_, c)| c.is_whitespace() || c.is_ascii_digit()) {
        Some((idx, _)) => (&s[..idx], s[idx..].trim_start()),
        None => (s, ""),
    }
}

fn require_empty(rest: &str, justification: Justification) -> Result<Justification, FitchError> {
    if rest.trim().is_empty() {
        Ok(justification)
    } else {
        Err(FitchError::ParseErrorJustification {
            message: format!("unexpected citation '{}' for a rule that cites nothing", rest),
        })
    }
}

fn parse_citation_tokens(rest: &str) -> Result<Vec<CitationToken>, FitchError> {
    if rest.trim().is_empty() {
        return Err(FitchError::ParseErrorJustification {
            message: "expected a citation after the rule keyword".into(),
        });
    }
    rest.split(',')
        .map(|tok| parse_citation_token(tok.trim()))
        .collect()
}

fn parse_citation_token(tok: &str) -> Result<CitationToken, FitchError> {
    if tok.is_empty() {
        return Err(FitchError::ParseErrorJustification {
            message: "empty citation".into(),
        });
    }
    if let Some(idx) = tok.find('-') {
        let start = parse_line_number(&tok[..idx])?;
        let end = parse_line_number(&tok[idx + 1..])?;
        Ok(CitationToken::Range(SubproofRange::new(start, end)))
    } else {
        Ok(CitationToken::Line(parse_line_number(tok)?))
    }
}

fn parse_line_number(s: &str) -> Result<usize, FitchError> {
    s.trim().parse::<usize>().map_err(|_| FitchError::ParseErrorJustification {
        message: format!("expected a line number, found '{}'", s.trim()),
    })
}

fn parse_one_line(
    rest: &str,
    build: impl Fn(usize) -> Justification,
) -> Result<Justification, FitchError> {
    let tokens = parse_citation_tokens(rest)?;
    match tokens.as_slice() {
        [CitationToken::Line(n)] => Ok(build(*n)),
        _ => Err(arity_error(rest, "exactly one line number")),
    }
}

fn parse_two_lines(
    rest: &str,
    build: impl Fn(usize, usize) -> Justification,
) -> Result<Justification, FitchError> {
    let tokens = parse_citation_tokens(rest)?;
    match tokens.as_slice() {
        [CitationToken::Line(a), CitationToken::Line(b)] => Ok(build(*a, *b)),
        _ => Err(arity_error(rest, "exactly two line numbers")),
    }
}

fn parse_one_range(
    rest: &str,
    build: impl Fn(SubproofRange) -> Justification,
) -> Result<Justification, FitchError> {
    let tokens = parse_citation_tokens(rest)?;
    match tokens.as_slice() {
        [CitationToken::Range(r)] => Ok(build(*r)),
        _ => Err(arity_error(rest, "exactly one subproof range")),
    }
}

fn parse_two_ranges(
    rest: &str,
    build: impl Fn(SubproofRange, SubproofRange) -> Justification,
) -> Result<Justification, FitchError> {
    let tokens = parse_citation_tokens(rest)?;
    match tokens.as_slice() {
        [CitationToken::Range(a), CitationToken::Range(b)] => Ok(build(*a, *b)),
        _ => Err(arity_error(rest, "exactly two subproof ranges")),
    }
}

fn parse_or_elim(rest: &str) -> Result<Justification, FitchError> {
    let tokens = parse_citation_tokens(rest)?;
    match tokens.as_slice() {
        [CitationToken::Line(n), CitationToken::Range(s1), CitationToken::Range(s2)] => {
            Ok(Justification::OrElim(*n, *s1, *s2))
        }
        _ => Err(arity_error(rest, "one line number followed by two subproof ranges")),
    }
}

fn arity_error(rest: &str, expected: &str) -> FitchError {
    FitchError::ParseErrorJustification {
        message: format!("expected {}, found '{}'", expected, rest),
    }
}

/// Parses `apply <inference> [n[, m, ...]]`. Since formulas never
/// contain digits, the conclusion ends at the first digit following the
/// turnstile; everything from there on is the comma-separated citation
/// list.
fn parse_apply(rest: &str) -> Result<Justification, FitchError> {
    let (premises_text, after_turnstile) = split_on_turnstile(rest)?;
    let premises = if premises_text.trim().is_empty() {
        Vec::new()
    } else {
        crate::inference::split_formula_fragments(premises_text)?
            .into_iter()
            .map(|fragment| Formula::parse(&fragment))
            .collect::<Result<Vec<_>, _>>()?
    };

    let split_at = after_turnstile
        .char_indices()
        .find(|&(_, c)| c.is_ascii_digit())
        .map(|(idx, _)| idx)
        .unwrap_or(after_turnstile.len());
    let (conclusion_text, citations_text) = after_turnstile.split_at(split_at);

    let conclusion = Formula::parse(conclusion_text.trim()).map_err(|e| match e {
        FitchError::ParseErrorFormula { message } => FitchError::ParseErrorJustification { message },
        other => other,
    })?;

    let cited: Vec<usize> = if citations_text.trim().is_empty() {
        Vec::new()
    } else {
        citations_text
            .split(',')
            .map(|tok| parse_line_number(tok.trim()))
            .collect::<Result<Vec<_>, _>>()?
    };

    let theorem = Inference::new(premises, conclusion);
    if cited.len() != theorem.premises.len() {
        return Err(FitchError::ParseErrorJustification {
            message: format!(
                "applied inference has {} premise(s) but {} line(s) were cited",
                theorem.premises.len(),
                cited.len()
            ),
        });
    }
    Ok(Justification::Apply(theorem, cited))
}

fn split_on_turnstile(input: &str) -> Result<(&str, &str), FitchError> {
    if let Some(idx) = input.find('⊢') {
        Ok((&input[..idx], &input[idx + '⊢'.len_utf8()..]))
    } else if let Some(idx) = input.find("|-") {
        Ok((&input[..idx], &input[idx + 2..]))
    } else {
        Err(FitchError::ParseErrorJustification {
            message: "expected an applied inference with a turnstile ('⊢' or '|-')".into(),
        })
    }
}
