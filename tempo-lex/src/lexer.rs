#![forbid(unsafe_code)]
#![allow(unused_assignments)]

use logos::Logos;
use miette::Diagnostic;
use tempo_ast::{span_between, Span};
use thiserror::Error;

use crate::token::{Token, TokenKind};

#[derive(Debug, Error, Diagnostic)]
#[error("lex error: {message}")]
#[diagnostic(code(tempo::lex))]
#[allow(unused_assignments)]
pub struct LexError {
    pub message: String,
    #[label]
    pub span: Span,
}

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \f\r]+")]
enum RawToken {
    #[token("def")]
    KwDef,
    #[token("if")]
    KwIf,
    #[token("elif")]
    KwElif,
    #[token("else")]
    KwElse,
    #[token("pass")]
    KwPass,
    #[token("and")]
    KwAnd,
    #[token("or")]
    KwOr,
    #[token("not")]
    KwNot,
    #[token("True")]
    KwTrue,
    #[token("False")]
    KwFalse,

    #[token("->")]
    Arrow,

    #[token("==")]
    EqEq,
    #[token("!=")]
    Neq,
    #[token("<=")]
    Le,
    #[token(">=")]
    Ge,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("%")]
    Percent,

    #[token(":")]
    Colon,
    #[token(",")]
    Comma,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,

    #[regex(r"0b[01_]+", |lex| parse_int_prefixed(lex.slice(), 2, 2))]
    #[regex(r"0o[0-7_]+", |lex| parse_int_prefixed(lex.slice(), 8, 2))]
    #[regex(r"0x[0-9a-fA-F_]+", |lex| parse_int_prefixed(lex.slice(), 16, 2))]
    #[regex(r"[0-9][0-9_]*", |lex| parse_int_decimal(lex.slice()))]
    Int(Option<u64>),

    // Single- or double-quoted, with \n, \t, \r, \", \', \\ escapes.
    #[regex(r#""([^"\\]|\\.)*""#, parse_string)]
    #[regex(r#"'([^'\\]|\\.)*'"#, parse_string)]
    String(Option<String>),

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),
}

fn parse_int_decimal(s: &str) -> Option<u64> {
    let digits = strip_underscores(s)?;
    digits.parse::<u64>().ok()
}

fn parse_int_prefixed(s: &str, radix: u32, prefix_len: usize) -> Option<u64> {
    let rest = s.get(prefix_len..)?;
    let digits = strip_underscores(rest)?;
    u64::from_str_radix(&digits, radix).ok()
}

fn strip_underscores(s: &str) -> Option<String> {
    if s.is_empty() {
        return None;
    }
    if s.starts_with('_') || s.ends_with('_') || s.contains("__") {
        return None;
    }
    Some(s.replace('_', ""))
}

fn parse_string(lex: &mut logos::Lexer<RawToken>) -> Option<String> {
    let s = lex.slice();
    let inner = &s[1..s.len().saturating_sub(1)];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '"' => out.push('"'),
            '\'' => out.push('\''),
            '\\' => out.push('\\'),
            _ => return None,
        }
    }

    Some(out)
}

/// Byte offset of the first `#` outside a string literal.
fn comment_start(code: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in code.char_indices() {
        match quote {
            Some(q) => {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == q {
                    quote = None;
                }
            }
            None => match c {
                '#' => return Some(i),
                '"' | '\'' => quote = Some(c),
                _ => {}
            },
        }
    }
    None
}

pub struct Lexer<'a> {
    src: &'a str,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src }
    }

    pub fn lex(&self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        let mut indent_stack: Vec<usize> = vec![0];

        // Absolute byte offset of the current line.
        let mut line_start = 0usize;

        for line in self.src.split_inclusive('\n') {
            let line_len = line.len();
            let line_end = line_start + line_len;

            let content = line.strip_suffix('\n').unwrap_or(line);
            let content = content.strip_suffix('\r').unwrap_or(content);

            let leading_spaces = content
                .as_bytes()
                .iter()
                .take_while(|b| **b == b' ')
                .count();

            let mut code = &content[leading_spaces..];
            if let Some(idx) = comment_start(code) {
                code = &code[..idx];
            }

            // Blank and comment-only lines do not affect indentation.
            if code.trim().is_empty() {
                line_start = line_end;
                continue;
            }

            if content.as_bytes().contains(&b'\t') {
                return Err(LexError {
                    message: "tabs are not allowed; use spaces".to_string(),
                    span: span_between(line_start, line_end),
                });
            }

            let current_indent = *indent_stack.last().unwrap_or(&0);
            if leading_spaces > current_indent {
                indent_stack.push(leading_spaces);
                tokens.push(Token {
                    kind: TokenKind::Indent,
                    span: span_between(line_start, line_start + leading_spaces),
                });
            } else if leading_spaces < current_indent {
                while let Some(&top) = indent_stack.last() {
                    if leading_spaces >= top {
                        break;
                    }
                    indent_stack.pop();
                    tokens.push(Token {
                        kind: TokenKind::Dedent,
                        span: span_between(line_start, line_start + leading_spaces),
                    });
                }
                if indent_stack.last().copied() != Some(leading_spaces) {
                    return Err(LexError {
                        message: "inconsistent indentation".to_string(),
                        span: span_between(line_start, line_end),
                    });
                }
            }

            let mut lex = RawToken::lexer(code);
            while let Some(raw) = lex.next() {
                let span_in_line = lex.span();
                let abs_start = line_start + leading_spaces + span_in_line.start;
                let abs_end = line_start + leading_spaces + span_in_line.end;

                let kind = match raw {
                    Ok(RawToken::KwDef) => TokenKind::KwDef,
                    Ok(RawToken::KwIf) => TokenKind::KwIf,
                    Ok(RawToken::KwElif) => TokenKind::KwElif,
                    Ok(RawToken::KwElse) => TokenKind::KwElse,
                    Ok(RawToken::KwPass) => TokenKind::KwPass,
                    Ok(RawToken::KwAnd) => TokenKind::KwAnd,
                    Ok(RawToken::KwOr) => TokenKind::KwOr,
                    Ok(RawToken::KwNot) => TokenKind::KwNot,
                    Ok(RawToken::KwTrue) => TokenKind::KwTrue,
                    Ok(RawToken::KwFalse) => TokenKind::KwFalse,

                    Ok(RawToken::Arrow) => TokenKind::Arrow,

                    Ok(RawToken::EqEq) => TokenKind::EqEq,
                    Ok(RawToken::Neq) => TokenKind::Neq,
                    Ok(RawToken::Le) => TokenKind::Le,
                    Ok(RawToken::Ge) => TokenKind::Ge,
                    Ok(RawToken::Lt) => TokenKind::Lt,
                    Ok(RawToken::Gt) => TokenKind::Gt,

                    Ok(RawToken::Plus) => TokenKind::Plus,
                    Ok(RawToken::Minus) => TokenKind::Minus,
                    Ok(RawToken::Star) => TokenKind::Star,
                    Ok(RawToken::Percent) => TokenKind::Percent,

                    Ok(RawToken::Colon) => TokenKind::Colon,
                    Ok(RawToken::Comma) => TokenKind::Comma,

                    Ok(RawToken::LParen) => TokenKind::LParen,
                    Ok(RawToken::RParen) => TokenKind::RParen,

                    Ok(RawToken::Ident(s)) => TokenKind::Ident(s),
                    Ok(RawToken::Int(Some(n))) => TokenKind::Int(n),
                    Ok(RawToken::Int(None)) => {
                        return Err(LexError {
                            message: "invalid integer literal".to_string(),
                            span: span_between(abs_start, abs_end),
                        });
                    }
                    Ok(RawToken::String(Some(s))) => TokenKind::String(s),
                    Ok(RawToken::String(None)) => {
                        return Err(LexError {
                            message: "invalid string literal".to_string(),
                            span: span_between(abs_start, abs_end),
                        });
                    }

                    Err(_) => {
                        return Err(LexError {
                            message: "unexpected token".to_string(),
                            span: span_between(abs_start, abs_end),
                        });
                    }
                };

                tokens.push(Token {
                    kind,
                    span: span_between(abs_start, abs_end),
                });
            }

            tokens.push(Token {
                kind: TokenKind::Newline,
                span: span_between(line_end, line_end),
            });

            line_start = line_end;
        }

        while indent_stack.len() > 1 {
            indent_stack.pop();
            tokens.push(Token {
                kind: TokenKind::Dedent,
                span: span_between(self.src.len(), self.src.len()),
            });
        }

        tokens.push(Token {
            kind: TokenKind::Eof,
            span: span_between(self.src.len(), self.src.len()),
        });

        Ok(tokens)
    }
}
