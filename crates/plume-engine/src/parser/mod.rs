//! Formula lexer and parser.
//!
//! Parsing compiles the text to an [`Expr`] tree and simultaneously interns
//! every referenced variable name into a fresh [`VariableTable`], including
//! the names synthesized by `sum(...)` aggregate expansion.

use crate::ast::{BinaryOp, Expr, ParseError, Span, UnaryOp};
use crate::functions::math;
use crate::selection::SelectionSource;
use crate::variable::VariableTable;

/// Formula limits enforced by this parser.
///
/// These keep pathological input from consuming excessive CPU/memory or
/// overflowing the stack during parsing/evaluation.
pub const MAX_FORMULA_CHARS: usize = 4_096;
pub const MAX_VARIABLE_NAME_CHARS: usize = 63;
const MAX_NESTED_TERMS: usize = 64;
const MAX_SUM_TERMS: usize = 16_384;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(f64),
    Ident(String),
    LParen,
    RParen,
    Comma,
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Parse a formula into an expression tree plus its discovered variables.
///
/// The returned table contains exactly the distinct variable names the text
/// references, in first-reference order. Selection-dependent `sum(...)` forms
/// are resolved against `selection` at parse time.
pub fn parse(
    text: &str,
    selection: &dyn SelectionSource,
) -> Result<(Expr, VariableTable), ParseError> {
    let char_len = text.chars().count();
    if char_len > MAX_FORMULA_CHARS {
        return Err(ParseError::new(
            format!("Formula exceeds the {MAX_FORMULA_CHARS}-character limit (got {char_len})"),
            Span::new(0, text.len()),
        ));
    }
    if text.trim().is_empty() {
        return Err(ParseError::new("Empty expression", Span::new(0, text.len())));
    }

    let tokens = Lexer::new(text).lex()?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
        vars: VariableTable::new(),
        selection,
    };
    let expr = parser.parse_expr()?;
    parser.expect_eof()?;
    Ok((expr, parser.vars))
}

fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_ident_cont(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

struct Lexer<'a> {
    src: &'a str,
    idx: usize,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, idx: 0 }
    }

    fn peek_char(&self) -> Option<char> {
        self.src[self.idx..].chars().next()
    }

    fn peek_next_is_digit(&self) -> bool {
        let mut iter = self.src[self.idx..].chars();
        iter.next();
        matches!(iter.next(), Some(c) if c.is_ascii_digit())
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.idx += ch.len_utf8();
        Some(ch)
    }

    fn take_digits(&mut self) {
        while matches!(self.peek_char(), Some(c) if c.is_ascii_digit()) {
            self.bump();
        }
    }

    fn lex(mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();
        loop {
            // Space and tab are skippable between any two tokens; anything
            // else (including newline) must form a token.
            while matches!(self.peek_char(), Some(' ' | '\t')) {
                self.bump();
            }

            let start = self.idx;
            let Some(ch) = self.peek_char() else {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    span: Span::new(start, start),
                });
                return Ok(tokens);
            };

            let kind = match ch {
                '0'..='9' => self.lex_number()?,
                '.' if self.peek_next_is_digit() => self.lex_number()?,
                c if is_ident_start(c) => self.lex_ident()?,
                '(' => self.single(TokenKind::LParen),
                ')' => self.single(TokenKind::RParen),
                ',' => self.single(TokenKind::Comma),
                '+' => self.single(TokenKind::Plus),
                '-' => self.single(TokenKind::Minus),
                '*' => self.single(TokenKind::Star),
                '/' => self.single(TokenKind::Slash),
                '^' => self.single(TokenKind::Caret),
                other => {
                    return Err(ParseError::new(
                        format!("Unexpected character '{other}'"),
                        Span::new(start, start + other.len_utf8()),
                    ));
                }
            };
            tokens.push(Token {
                kind,
                span: Span::new(start, self.idx),
            });
        }
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.bump();
        kind
    }

    fn lex_number(&mut self) -> Result<TokenKind, ParseError> {
        let start = self.idx;
        self.take_digits();
        if self.peek_char() == Some('.') {
            self.bump();
            self.take_digits();
        }
        if matches!(self.peek_char(), Some('e' | 'E')) {
            self.bump();
            if self.peek_char() == Some('-') {
                self.bump();
            }
            let digits_start = self.idx;
            self.take_digits();
            if self.idx == digits_start {
                return Err(ParseError::new(
                    "Malformed exponent",
                    Span::new(start, self.idx),
                ));
            }
        }
        let text = &self.src[start..self.idx];
        let value = text
            .parse::<f64>()
            .map_err(|_| ParseError::new("Invalid number", Span::new(start, self.idx)))?;
        Ok(TokenKind::Number(value))
    }

    fn lex_ident(&mut self) -> Result<TokenKind, ParseError> {
        let start = self.idx;
        while matches!(self.peek_char(), Some(c) if is_ident_cont(c)) {
            self.bump();
        }
        let text = &self.src[start..self.idx];
        if text.len() > MAX_VARIABLE_NAME_CHARS {
            return Err(ParseError::new(
                "Variable name too long",
                Span::new(start, self.idx),
            ));
        }
        Ok(TokenKind::Ident(text.to_string()))
    }
}

/// Single-argument function keywords, recognized case-insensitively when the
/// identifier is immediately followed by `(`.
const UNARY_FUNCTIONS: &[(&str, UnaryOp)] = &[
    ("abs", UnaryOp::Abs),
    ("acos", UnaryOp::Acos),
    ("asin", UnaryOp::Asin),
    ("atan", UnaryOp::Atan),
    ("cos", UnaryOp::Cos),
    ("cosh", UnaryOp::Cosh),
    ("exp", UnaryOp::Exp),
    ("fact", UnaryOp::Fact),
    ("inv", UnaryOp::Inv),
    ("ln", UnaryOp::Ln),
    ("log10", UnaryOp::Log10),
    ("log2", UnaryOp::Log2),
    ("sin", UnaryOp::Sin),
    ("sinh", UnaryOp::Sinh),
    ("sqrt", UnaryOp::Sqrt),
    ("tan", UnaryOp::Tan),
    ("tanh", UnaryOp::Tanh),
];

fn unary_function(name: &str) -> Option<UnaryOp> {
    UNARY_FUNCTIONS
        .iter()
        .find(|(keyword, _)| keyword.eq_ignore_ascii_case(name))
        .map(|(_, op)| *op)
}

/// `S` followed by one or more digits: a 1-based selection-group reference.
fn is_group_ref(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some('s' | 'S'))
        && name.len() > 1
        && chars.all(|c| c.is_ascii_digit())
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    vars: VariableTable,
    selection: &'a dyn SelectionSource,
}

impl<'a> Parser<'a> {
    fn peek_kind(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn current_span(&self) -> Span {
        self.tokens[self.pos].span
    }

    fn expect_rparen(&mut self) -> Result<(), ParseError> {
        if matches!(self.peek_kind(), TokenKind::RParen) {
            self.pos += 1;
            Ok(())
        } else {
            Err(ParseError::new("Expected ')'", self.current_span()))
        }
    }

    fn expect_comma(&mut self) -> Result<(), ParseError> {
        if matches!(self.peek_kind(), TokenKind::Comma) {
            self.pos += 1;
            Ok(())
        } else {
            Err(ParseError::new("Expected ','", self.current_span()))
        }
    }

    /// The whole text must be consumed; a partial parse is a syntax error at
    /// the first unconsumed token.
    fn expect_eof(&self) -> Result<(), ParseError> {
        if matches!(self.peek_kind(), TokenKind::Eof) {
            Ok(())
        } else {
            Err(ParseError::new("Unexpected trailing input", self.current_span()))
        }
    }

    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_factor()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.parse_factor()?;
            lhs = binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_factor(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_power()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.parse_power()?;
            lhs = binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_power(&mut self) -> Result<Expr, ParseError> {
        let lhs = self.parse_term()?;
        if matches!(self.peek_kind(), TokenKind::Caret) {
            self.pos += 1;
            let rhs = self.parse_term()?;
            // One level only, never right-associative: in `a^b^c` the second
            // `^` stays unconsumed and surfaces as trailing input.
            return Ok(binary(BinaryOp::Pow, lhs, rhs));
        }
        Ok(lhs)
    }

    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        if self.depth >= MAX_NESTED_TERMS {
            return Err(ParseError::new(
                format!("Expression nesting exceeds the {MAX_NESTED_TERMS}-level limit"),
                self.current_span(),
            ));
        }
        self.depth += 1;
        let out = self.parse_term_inner();
        self.depth -= 1;
        out
    }

    fn parse_term_inner(&mut self) -> Result<Expr, ParseError> {
        let token = self.tokens[self.pos].clone();
        match token.kind {
            TokenKind::Number(value) => {
                self.pos += 1;
                Ok(Expr::Number(value))
            }
            TokenKind::Minus => {
                self.pos += 1;
                let inner = self.parse_term()?;
                Ok(unary(UnaryOp::Neg, inner))
            }
            TokenKind::LParen => {
                self.pos += 1;
                let inner = self.parse_expr()?;
                self.expect_rparen()?;
                Ok(inner)
            }
            TokenKind::Ident(name) => self.parse_ident(name, token.span),
            TokenKind::Eof => Err(ParseError::new("Unexpected end of expression", token.span)),
            _ => Err(ParseError::new(
                "Expected a number, variable, function call or '('",
                token.span,
            )),
        }
    }

    fn parse_ident(&mut self, name: String, span: Span) -> Result<Expr, ParseError> {
        self.pos += 1;

        if name.eq_ignore_ascii_case("pi") {
            return Ok(Expr::Number(math::pi()));
        }

        // A keyword is only a call when its `(` is adjacent, mirroring the
        // original matching of keyword text together with the trailing paren:
        // `sin (x)` and `sin2` are both plain variables.
        if self.lparen_adjacent(span) {
            if let Some(op) = unary_function(&name) {
                self.pos += 1;
                let arg = self.parse_expr()?;
                self.expect_rparen()?;
                return Ok(unary(op, arg));
            }
            if name.eq_ignore_ascii_case("pow") {
                self.pos += 1;
                let base = self.parse_expr()?;
                self.expect_comma()?;
                let exponent = self.parse_expr()?;
                self.expect_rparen()?;
                return Ok(binary(BinaryOp::PowCall, base, exponent));
            }
            if name.eq_ignore_ascii_case("sum") {
                self.pos += 1;
                return self.parse_sum();
            }
        }

        Ok(Expr::Variable(self.vars.intern(&name)))
    }

    fn lparen_adjacent(&self, ident_span: Span) -> bool {
        matches!(self.peek_kind(), TokenKind::LParen)
            && self.tokens[self.pos].span.start == ident_span.end
    }

    /// `sum(prefix, i, j)` / `sum(prefix, S<n>)` / `sum(prefix, S)`.
    ///
    /// Expands at parse time into a left-folded chain of additions over
    /// variables named `prefix` + 1-based facet number, interned like any
    /// other reference. The leading `sum(` has already been consumed.
    fn parse_sum(&mut self) -> Result<Expr, ParseError> {
        let prefix_token = self.tokens[self.pos].clone();
        let TokenKind::Ident(prefix) = prefix_token.kind else {
            return Err(ParseError::new(
                "Expected a variable prefix",
                prefix_token.span,
            ));
        };
        self.pos += 1;
        self.expect_comma()?;

        let spec_token = self.tokens[self.pos].clone();
        let indices: Vec<i64> = match spec_token.kind {
            TokenKind::Number(first) => {
                self.pos += 1;
                self.expect_comma()?;
                let last_token = self.tokens[self.pos].clone();
                let TokenKind::Number(last) = last_token.kind else {
                    return Err(ParseError::new("Expected a number", last_token.span));
                };
                self.pos += 1;

                let first = math::round_to_index(first);
                let last = math::round_to_index(last);
                // The first term is emitted unconditionally: a reversed range
                // (`j < i`) degenerates to the single term `prefix<i>`.
                let mut out = vec![first];
                let mut k = first;
                while k < last {
                    k += 1;
                    out.push(k);
                    if out.len() > MAX_SUM_TERMS {
                        return Err(ParseError::new(
                            format!("Sum expansion exceeds the {MAX_SUM_TERMS}-term limit"),
                            spec_token.span,
                        ));
                    }
                }
                out
            }
            TokenKind::Ident(ref sel) if sel.eq_ignore_ascii_case("s") => {
                self.pos += 1;
                let selected = self.selection.selected_facets();
                if selected.is_empty() {
                    return Err(ParseError::new("No facets selected", spec_token.span));
                }
                selected.into_iter().map(|f| f as i64 + 1).collect()
            }
            TokenKind::Ident(ref sel) if is_group_ref(sel) => {
                self.pos += 1;
                let group: usize = sel[1..]
                    .parse()
                    .map_err(|_| ParseError::new("Invalid selection group", spec_token.span))?;
                if group == 0 || group > self.selection.group_count() {
                    return Err(ParseError::new(
                        "Invalid selection group",
                        spec_token.span,
                    ));
                }
                let members = self.selection.group_members(group - 1);
                if members.is_empty() {
                    return Err(ParseError::new("Empty selection group", spec_token.span));
                }
                let facet_count = self.selection.facet_count();
                for &facet in &members {
                    if facet >= facet_count {
                        return Err(ParseError::new("Invalid facet index", spec_token.span));
                    }
                }
                members.into_iter().map(|f| f as i64 + 1).collect()
            }
            _ => {
                return Err(ParseError::new(
                    "Expected a facet range or selection group",
                    spec_token.span,
                ));
            }
        };
        self.expect_rparen()?;

        let mut expr: Option<Expr> = None;
        for index in indices {
            let name = format!("{prefix}{index}");
            if name.len() > MAX_VARIABLE_NAME_CHARS {
                return Err(ParseError::new(
                    "Variable name too long",
                    prefix_token.span,
                ));
            }
            let term = Expr::Variable(self.vars.intern(&name));
            expr = Some(match expr {
                None => term,
                Some(acc) => binary(BinaryOp::Add, acc, term),
            });
        }
        match expr {
            Some(expr) => Ok(expr),
            // All three forms guarantee at least one term above.
            None => Err(ParseError::new("Empty selection group", spec_token.span)),
        }
    }
}

fn unary(op: UnaryOp, expr: Expr) -> Expr {
    Expr::Unary {
        op,
        expr: Box::new(expr),
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}
