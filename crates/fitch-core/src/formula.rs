use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::FitchError;

/// Hard bound on nesting depth a single formula parse may reach, guarding
/// against pathological or adversarial input rather than any real proof.
const MAX_PARSE_DEPTH: usize = 100;

/// Immutable AST for a propositional formula. Equality is structural
/// (derived `PartialEq`/`Eq`/`Hash`); formulas have no identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum Formula {
    Prop(String),
    Top,
    Bottom,
    Neg(Box<Formula>),
    And(Box<Formula>, Box<Formula>),
    Or(Box<Formula>, Box<Formula>),
    Imp(Box<Formula>, Box<Formula>),
    Iff(Box<Formula>, Box<Formula>),
}

impl Formula {
    pub fn prop(name: impl Into<String>) -> Formula {
        Formula::Prop(name.into())
    }

    pub fn neg(a: Formula) -> Formula {
        Formula::Neg(Box::new(a))
    }

    pub fn and(a: Formula, b: Formula) -> Formula {
        Formula::And(Box::new(a), Box::new(b))
    }

    pub fn or(a: Formula, b: Formula) -> Formula {
        Formula::Or(Box::new(a), Box::new(b))
    }

    pub fn imp(a: Formula, b: Formula) -> Formula {
        Formula::Imp(Box::new(a), Box::new(b))
    }

    pub fn iff(a: Formula, b: Formula) -> Formula {
        Formula::Iff(Box::new(a), Box::new(b))
    }

    /// The union of proposition names occurring anywhere in the formula.
    pub fn propositions(&self) -> BTreeSet<String> {
        let mut set = BTreeSet::new();
        self.collect_propositions(&mut set);
        set
    }

    fn collect_propositions(&self, set: &mut BTreeSet<String>) {
        match self {
            Formula::Prop(name) => {
                set.insert(name.clone());
            }
            Formula::Top | Formula::Bottom => {}
            Formula::Neg(a) => a.collect_propositions(set),
            Formula::And(a, b) | Formula::Or(a, b) | Formula::Imp(a, b) | Formula::Iff(a, b) => {
                a.collect_propositions(set);
                b.collect_propositions(set);
            }
        }
    }

    /// Always parenthesizes a compound, including itself when it is one.
    /// `render`/`render_tex` strip the outermost pair; nested occurrences
    /// keep theirs, so a compound never loses its parentheses except at
    /// the very top of the call.
    fn render_inner(&self) -> String {
        match self {
            Formula::Prop(name) => name.clone(),
            Formula::Top => "⊤".to_string(),
            Formula::Bottom => "⊥".to_string(),
            Formula::Neg(a) => format!("¬{}", a.render_inner()),
            Formula::And(a, b) => format!("({} ∧ {})", a.render_inner(), b.render_inner()),
            Formula::Or(a, b) => format!("({} ∨ {})", a.render_inner(), b.render_inner()),
            Formula::Imp(a, b) => format!("({} → {})", a.render_inner(), b.render_inner()),
            Formula::Iff(a, b) => format!("({} ↔ {})", a.render_inner(), b.render_inner()),
        }
    }

    /// Human-readable rendering. Compound subformulas are parenthesized;
    /// the outermost expression is not.
    pub fn render(&self) -> String {
        strip_outer_parens(self.render_inner(), self.is_compound())
    }

    fn render_tex_inner(&self) -> String {
        match self {
            Formula::Prop(name) => name.clone(),
            Formula::Top => "\\top".to_string(),
            Formula::Bottom => "\\bot".to_string(),
            Formula::Neg(a) => format!("\\lnot {}", a.render_tex_inner()),
            Formula::And(a, b) => format!("({} \\land {})", a.render_tex_inner(), b.render_tex_inner()),
            Formula::Or(a, b) => format!("({} \\lor {})", a.render_tex_inner(), b.render_tex_inner()),
            Formula::Imp(a, b) => format!("({} \\to {})", a.render_tex_inner(), b.render_tex_inner()),
            Formula::Iff(a, b) => format!(
                "({} \\leftrightarrow {})",
                a.render_tex_inner(),
                b.render_tex_inner()
            ),
        }
    }

    /// LaTeX rendering of this formula alone (not a proof document).
    pub fn render_tex(&self) -> String {
        strip_outer_parens(self.render_tex_inner(), self.is_compound())
    }

    fn is_compound(&self) -> bool {
        matches!(
            self,
            Formula::And(..) | Formula::Or(..) | Formula::Imp(..) | Formula::Iff(..)
        )
    }

    /// Parses a complete formula string, rejecting trailing garbage and
    /// any mix of binary operators not disambiguated by parentheses.
    pub fn parse(input: &str) -> Result<Formula, FitchError> {
        let mut parser = FormulaParser::new(input);
        let formula = parser.parse_expr(0)?;
        parser.skip_whitespace();
        if parser.pos != parser.chars.len() {
            return Err(FitchError::ParseErrorFormula {
                message: format!(
                    "unexpected trailing input: '{}'",
                    parser.chars[parser.pos..].iter().collect::<String>()
                ),
            });
        }
        Ok(formula)
    }
}

fn strip_outer_parens(s: String, has_parens: bool) -> String {
    if has_parens {
        s[1..s.len() - 1].to_string()
    } else {
        s
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinOp {
    And,
    Or,
    Imp,
    Iff,
}

/// Literal tokens in priority order: a token earlier in this list is
/// tried first, so multi-character tokens that share a prefix with a
/// shorter one (`<->` vs nothing here, but kept ordered defensively)
/// always win.
const BINOP_TOKENS: &[(&str, BinOp)] = &[
    ("<->", BinOp::Iff),
    ("↔", BinOp::Iff),
    ("->", BinOp::Imp),
    ("→", BinOp::Imp),
    ("&", BinOp::And),
    ("∧", BinOp::And),
    ("∨", BinOp::Or),
    ("|", BinOp::Or),
    ("v", BinOp::Or),
];

const TRUE_LITERALS: &[&str] = &["TRUE", "True", "true", "⊤"];
const FALSE_LITERALS: &[&str] = &["FALSE", "False", "false", "⊥"];

fn build_binop(op: BinOp, left: Formula, right: Formula) -> Formula {
    match op {
        BinOp::And => Formula::and(left, right),
        BinOp::Or => Formula::or(left, right),
        BinOp::Imp => Formula::imp(left, right),
        BinOp::Iff => Formula::iff(left, right),
    }
}

struct FormulaParser {
    chars: Vec<char>,
    pos: usize,
}

impl FormulaParser {
    fn new(input: &str) -> Self {
        FormulaParser {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.chars.len() && self.chars[self.pos].is_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn starts_with(&self, s: &str) -> bool {
        let needle: Vec<char> = s.chars().collect();
        if self.pos + needle.len() > self.chars.len() {
            return false;
        }
        self.chars[self.pos..self.pos + needle.len()] == needle[..]
    }

    fn consume_str(&mut self, s: &str) -> bool {
        if self.starts_with(s) {
            self.pos += s.chars().count();
            true
        } else {
            false
        }
    }

    fn followed_by_ident_char(&self, offset: usize) -> bool {
        self.chars
            .get(self.pos + offset)
            .map_or(false, |c| c.is_alphanumeric())
    }

    fn peek_binop(&self) -> Option<BinOp> {
        BINOP_TOKENS
            .iter()
            .find(|(lit, _)| self.starts_with(lit))
            .map(|(_, op)| *op)
    }

    fn consume_binop(&mut self, op: BinOp) {
        if let Some((lit, _)) = BINOP_TOKENS.iter().find(|(lit, o)| *o == op && self.starts_with(lit)) {
            self.pos += lit.chars().count();
        }
    }

    /// One binary combination of two unaries, or a bare unary. A second
    /// unparenthesized binary operator following the first combination is
    /// rejected as ambiguous; callers that want to chain must nest with
    /// parentheses.
    fn parse_expr(&mut self, depth: usize) -> Result<Formula, FitchError> {
        check_depth(depth)?;
        self.skip_whitespace();
        let left = self.parse_unary(depth)?;
        self.skip_whitespace();
        let Some(op) = self.peek_binop() else {
            return Ok(left);
        };
        self.consume_binop(op);
        self.skip_whitespace();
        let right = self.parse_unary(depth)?;
        let combined = build_binop(op, left, right);
        self.skip_whitespace();
        if self.peek_binop().is_some() {
            return Err(FitchError::ParseErrorFormula {
                message: "ambiguous mix of binary operators; add parentheses to disambiguate".into(),
            });
        }
        Ok(combined)
    }

    fn parse_unary(&mut self, depth: usize) -> Result<Formula, FitchError> {
        check_depth(depth)?;
        self.skip_whitespace();
        if self.consume_str("~") || self.consume_str("¬") {
            let inner = self.parse_unary(depth + 1)?;
            return Ok(Formula::neg(inner));
        }
        self.parse_primary(depth)
    }

    fn parse_primary(&mut self, depth: usize) -> Result<Formula, FitchError> {
        check_depth(depth)?;
        self.skip_whitespace();
        if self.consume_str("(") {
            let inner = self.parse_expr(depth + 1)?;
            self.skip_whitespace();
            if !self.consume_str(")") {
                return Err(FitchError::ParseErrorFormula {
                    message: "expected closing parenthesis".into(),
                });
            }
            return Ok(inner);
        }
        for lit in TRUE_LITERALS {
            if self.starts_with(lit) && !self.followed_by_ident_char(lit.chars().count()) {
                self.pos += lit.chars().count();
                return Ok(Formula::Top);
            }
        }
        for lit in FALSE_LITERALS {
            if self.starts_with(lit) && !self.followed_by_ident_char(lit.chars().count()) {
                self.pos += lit.chars().count();
                return Ok(Formula::Bottom);
            }
        }
        match self.peek() {
            Some(c) if c.is_ascii_uppercase() => {
                self.pos += 1;
                Ok(Formula::Prop(c.to_string()))
            }
            Some(c) => Err(FitchError::ParseErrorFormula {
                message: format!("unexpected character '{}'", c),
            }),
            None => Err(FitchError::ParseErrorFormula {
                message: "unexpected end of input".into(),
            }),
        }
    }
}

fn check_depth(depth: usize) -> Result<(), FitchError> {
    if depth > MAX_PARSE_DEPTH {
        Err(FitchError::ParseErrorFormula {
            message: "formula nested too deeply".into(),
        })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(name: &str) -> Formula {
        Formula::prop(name)
    }

    #[test]
    fn parses_atom() {
        assert_eq!(Formula::parse("A").unwrap(), p("A"));
    }

    #[test]
    fn parses_top_and_bottom() {
        assert_eq!(Formula::parse("⊤").unwrap(), Formula::Top);
        assert_eq!(Formula::parse("True").unwrap(), Formula::Top);
        assert_eq!(Formula::parse("⊥").unwrap(), Formula::Bottom);
        assert_eq!(Formula::parse("False").unwrap(), Formula::Bottom);
    }

    #[test]
    fn rejects_multi_letter_atom() {
        let formula = Formula::parse("AB").unwrap_err();
        assert!(matches!(formula, FitchError::ParseErrorFormula { .. }));
    }

    #[test]
    fn parses_negation() {
        assert_eq!(Formula::parse("~A").unwrap(), Formula::neg(p("A")));
        assert_eq!(Formula::parse("¬¬A").unwrap(), Formula::neg(Formula::neg(p("A"))));
    }

    #[test]
    fn parses_each_binary_connective() {
        assert_eq!(Formula::parse("A & B").unwrap(), Formula::and(p("A"), p("B")));
        assert_eq!(Formula::parse("A ∧ B").unwrap(), Formula::and(p("A"), p("B")));
        assert_eq!(Formula::parse("A v B").unwrap(), Formula::or(p("A"), p("B")));
        assert_eq!(Formula::parse("A | B").unwrap(), Formula::or(p("A"), p("B")));
        assert_eq!(Formula::parse("A -> B").unwrap(), Formula::imp(p("A"), p("B")));
        assert_eq!(Formula::parse("A → B").unwrap(), Formula::imp(p("A"), p("B")));
        assert_eq!(Formula::parse("A <-> B").unwrap(), Formula::iff(p("A"), p("B")));
        assert_eq!(Formula::parse("A ↔ B").unwrap(), Formula::iff(p("A"), p("B")));
    }

    #[test]
    fn rejects_ambiguous_mixed_operators() {
        assert!(Formula::parse("A & B & C").is_err());
        assert!(Formula::parse("A & B -> C").is_err());
    }

    #[test]
    fn accepts_explicit_parens_for_chains() {
        let parsed = Formula::parse("(A & B) & C").unwrap();
        assert_eq!(
            parsed,
            Formula::and(Formula::and(p("A"), p("B")), p("C"))
        );
    }

    #[test]
    fn negation_binds_tighter_than_any_binary_operator() {
        let parsed = Formula::parse("~A & B").unwrap();
        assert_eq!(parsed, Formula::and(Formula::neg(p("A")), p("B")));
    }

    #[test]
    fn propositions_collects_unique_names() {
        let formula = Formula::parse("(A & B) -> A").unwrap();
        let props: Vec<_> = formula.propositions().into_iter().collect();
        assert_eq!(props, vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn render_omits_outer_parens_but_keeps_nested_ones() {
        let formula = Formula::and(p("A"), Formula::or(p("B"), p("C")));
        assert_eq!(formula.render(), "A ∧ (B ∨ C)");
    }

    #[test]
    fn render_of_atom_has_no_parens() {
        assert_eq!(p("A").render(), "A");
    }

    #[test]
    fn render_tex_uses_macros_and_strips_outer_parens() {
        let formula = Formula::imp(p("A"), Formula::neg(p("B")));
        assert_eq!(formula.render_tex(), "A \\to \\lnot B");
    }

    #[test]
    fn parse_is_left_inverse_of_render() {
        let formulas = vec![
            p("A"),
            Formula::neg(p("A")),
            Formula::and(p("A"), p("B")),
            Formula::or(p("A"), Formula::neg(p("B"))),
            Formula::imp(Formula::and(p("A"), p("B")), p("C")),
            Formula::iff(p("A"), Formula::or(p("B"), p("C"))),
            Formula::Top,
            Formula::Bottom,
        ];
        for formula in formulas {
            let rendered = formula.render();
            let reparsed = Formula::parse(&rendered).unwrap();
            assert_eq!(reparsed, formula, "round trip failed for {}", rendered);
        }
    }
}
