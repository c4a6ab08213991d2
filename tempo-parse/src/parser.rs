#![forbid(unsafe_code)]

use std::mem;

use tempo_ast::build::int;
use tempo_ast::{
    make_block, span_between, BinOp, Command, Expr, Function, Ident, Literal, Program, Span,
    UnaryOp,
};
use tempo_lex::{Token, TokenKind};

use crate::error::ParseError;

pub struct Parser<'a> {
    tokens: &'a [Token],
    idx: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, idx: 0 }
    }

    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut functions = Vec::new();
        loop {
            self.skip_newlines();
            if self.at(TokenKind::Eof) {
                break;
            }
            if !self.at(TokenKind::KwDef) {
                return Err(ParseError {
                    message: "expected the program to consist of function definitions".to_string(),
                    span: self.peek_span().unwrap_or_else(|| span_between(0, 0)),
                });
            }
            functions.push(self.parse_function()?);
        }
        Ok(Program::new(functions))
    }

    fn parse_function(&mut self) -> Result<Function, ParseError> {
        let start = self.expect(TokenKind::KwDef)?;
        let name = self.expect_ident()?;
        self.expect(TokenKind::LParen)?;
        let params = self.parse_params()?;
        self.expect(TokenKind::RParen)?;

        let annotation = if self.at(TokenKind::Arrow) {
            self.next();
            let tok = self.expect_any()?;
            match tok.kind {
                TokenKind::String(text) => crate::parse_annotation(&text),
                _ => {
                    return Err(ParseError {
                        message: "expected a complexity annotation string after `->`".to_string(),
                        span: tok.span,
                    });
                }
            }
        } else {
            int(1)
        };

        self.expect(TokenKind::Colon)?;
        let (body, body_span) = self.parse_block()?;
        let span = join(start.span, body_span);

        let params = params.into_iter().map(|p| p.node).collect();
        Function::new(name.node, params, body, annotation).map_err(|e| ParseError {
            message: e.to_string(),
            span,
        })
    }

    fn parse_params(&mut self) -> Result<Vec<Ident>, ParseError> {
        let mut params: Vec<Ident> = Vec::new();
        if self.at(TokenKind::RParen) {
            return Ok(params);
        }
        loop {
            let name = self.expect_ident()?;
            if params.iter().any(|p| p.node == name.node) {
                return Err(ParseError {
                    message: format!("duplicate parameter `{}`", name.node),
                    span: name.span,
                });
            }
            params.push(name);

            if self.at(TokenKind::Comma) {
                self.next();
                if self.at(TokenKind::RParen) {
                    break;
                }
                continue;
            }
            break;
        }
        Ok(params)
    }

    /// `NEWLINE INDENT stmt+ DEDENT`, folded into one command.
    fn parse_block(&mut self) -> Result<(Command, Span), ParseError> {
        self.expect(TokenKind::Newline)?;
        let indent_tok = self.expect(TokenKind::Indent)?;

        let mut stmts = Vec::new();
        loop {
            self.skip_newlines();
            if self.at(TokenKind::Dedent) {
                let dedent = self.expect_any()?;
                return Ok((make_block(stmts), join(indent_tok.span, dedent.span)));
            }
            if self.at(TokenKind::Eof) {
                return Err(ParseError {
                    message: "unterminated block; expected dedent".to_string(),
                    span: indent_tok.span,
                });
            }
            stmts.push(self.parse_stmt()?);
        }
    }

    fn parse_stmt(&mut self) -> Result<Command, ParseError> {
        match self.peek_kind() {
            Some(TokenKind::KwPass) => {
                self.next();
                self.expect_stmt_terminator()?;
                Ok(Command::Pass)
            }
            Some(TokenKind::KwIf) => {
                self.next();
                self.parse_if_rest()
            }
            Some(TokenKind::Ident(_)) => self.parse_call_stmt(),
            _ => Err(ParseError {
                message: "expected `pass`, `if`, or a function call".to_string(),
                span: self.peek_span().unwrap_or_else(|| span_between(0, 0)),
            }),
        }
    }

    /// Everything after `if` / `elif`.
    fn parse_if_rest(&mut self) -> Result<Command, ParseError> {
        let cond = self.parse_expr()?;
        self.expect(TokenKind::Colon)?;
        let (then_branch, _) = self.parse_block()?;

        self.skip_newlines();
        let else_branch = if self.at(TokenKind::KwElif) {
            self.next();
            self.parse_if_rest()?
        } else if self.at(TokenKind::KwElse) {
            self.next();
            self.expect(TokenKind::Colon)?;
            self.parse_block()?.0
        } else {
            Command::Pass
        };

        Ok(Command::if_(cond, then_branch, else_branch))
    }

    fn parse_call_stmt(&mut self) -> Result<Command, ParseError> {
        let callee = self.expect_ident()?;
        if !self.at(TokenKind::LParen) {
            return Err(ParseError {
                message: format!("`{}` is not a statement; expected a function call", callee.node),
                span: callee.span,
            });
        }
        self.next();
        let args = self.parse_args()?;
        self.expect(TokenKind::RParen)?;
        self.expect_stmt_terminator()?;
        Ok(Command::call(callee.node, args))
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        if self.at(TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr()?);
            if self.at(TokenKind::Comma) {
                self.next();
                if self.at(TokenKind::RParen) {
                    break;
                }
                continue;
            }
            break;
        }
        Ok(args)
    }

    pub fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_or_expr()
    }

    pub fn parse_expr_eof(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_expr()?;
        self.skip_newlines();
        if !self.at(TokenKind::Eof) {
            return Err(ParseError {
                message: "expected end of input".to_string(),
                span: self.peek_span().unwrap_or_else(|| span_between(0, 0)),
            });
        }
        Ok(expr)
    }

    fn parse_or_expr(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and_expr()?;
        while self.at(TokenKind::KwOr) {
            self.next();
            let right = self.parse_and_expr()?;
            left = Expr::binary(BinOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and_expr(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_not_expr()?;
        while self.at(TokenKind::KwAnd) {
            self.next();
            let right = self.parse_not_expr()?;
            left = Expr::binary(BinOp::And, left, right);
        }
        Ok(left)
    }

    fn parse_not_expr(&mut self) -> Result<Expr, ParseError> {
        if self.at(TokenKind::KwNot) {
            self.next();
            let operand = self.parse_not_expr()?;
            return Ok(Expr::unary(UnaryOp::Not, operand));
        }
        self.parse_cmp_expr()
    }

    fn parse_cmp_expr(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_add_expr()?;
        let Some(op) = self.peek_kind().and_then(cmp_op) else {
            return Ok(left);
        };
        self.next();
        let right = self.parse_add_expr()?;

        if self.peek_kind().and_then(cmp_op).is_some() {
            return Err(ParseError {
                message: "chained comparisons are not supported; combine them with `and`".to_string(),
                span: self.peek_span().unwrap_or_else(|| span_between(0, 0)),
            });
        }

        Ok(Expr::binary(op, left, right))
    }

    fn parse_add_expr(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_mul_expr()?;
        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Plus) => BinOp::Add,
                Some(TokenKind::Minus) => BinOp::Sub,
                _ => break,
            };
            self.next();
            let right = self.parse_mul_expr()?;
            left = Expr::binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_mul_expr(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary_expr()?;
        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Star) => BinOp::Mul,
                Some(TokenKind::Percent) => BinOp::Mod,
                _ => break,
            };
            self.next();
            let right = self.parse_unary_expr()?;
            left = Expr::binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_unary_expr(&mut self) -> Result<Expr, ParseError> {
        if self.at(TokenKind::Minus) {
            self.next();
            let operand = self.parse_unary_expr()?;
            return Ok(Expr::unary(UnaryOp::Neg, operand));
        }
        self.parse_primary_expr()
    }

    fn parse_primary_expr(&mut self) -> Result<Expr, ParseError> {
        let tok = self.expect_any()?;
        match tok.kind {
            TokenKind::Ident(name) => {
                if self.at(TokenKind::LParen) {
                    return Err(ParseError {
                        message: format!("calls to `{name}` are statements and cannot appear inside expressions"),
                        span: tok.span,
                    });
                }
                Ok(Expr::Var(name))
            }
            TokenKind::Int(n) => {
                let value = i64::try_from(n).map_err(|_| ParseError {
                    message: format!("integer literal {n} does not fit in a signed 64-bit integer"),
                    span: tok.span,
                })?;
                Ok(Expr::Const(Literal::Int(value)))
            }
            TokenKind::KwTrue => Ok(Expr::Const(Literal::Bool(true))),
            TokenKind::KwFalse => Ok(Expr::Const(Literal::Bool(false))),
            TokenKind::LParen => {
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(expr)
            }
            TokenKind::String(_) => Err(ParseError {
                message: "string values are not supported; literals must be integers or booleans"
                    .to_string(),
                span: tok.span,
            }),
            _ => Err(ParseError {
                message: "expected an expression".to_string(),
                span: tok.span,
            }),
        }
    }

    fn skip_newlines(&mut self) {
        while self.at(TokenKind::Newline) {
            self.next();
        }
    }

    fn expect_stmt_terminator(&mut self) -> Result<(), ParseError> {
        if self.at(TokenKind::Newline) {
            self.next();
            Ok(())
        } else if self.at(TokenKind::Dedent) || self.at(TokenKind::Eof) {
            Ok(())
        } else {
            Err(ParseError {
                message: "expected end of line".to_string(),
                span: self.peek_span().unwrap_or_else(|| span_between(0, 0)),
            })
        }
    }

    fn expect_ident(&mut self) -> Result<Ident, ParseError> {
        let tok = self.expect_any()?;
        match tok.kind {
            TokenKind::Ident(name) => Ok(Ident {
                span: tok.span,
                node: name,
            }),
            _ => Err(ParseError {
                message: "expected identifier".to_string(),
                span: tok.span,
            }),
        }
    }

    fn expect(&mut self, expected: TokenKind) -> Result<Token, ParseError> {
        let tok = self.expect_any()?;
        if mem::discriminant(&tok.kind) == mem::discriminant(&expected) {
            Ok(tok)
        } else {
            Err(ParseError {
                message: format!("expected {expected:?}"),
                span: tok.span,
            })
        }
    }

    fn expect_any(&mut self) -> Result<Token, ParseError> {
        self.next().ok_or_else(|| ParseError {
            message: "unexpected end of input".to_string(),
            span: span_between(0, 0),
        })
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek_kind()
            .is_some_and(|k| mem::discriminant(k) == mem::discriminant(&kind))
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.idx)?.clone();
        self.idx += 1;
        Some(tok)
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.tokens.get(self.idx).map(|t| &t.kind)
    }

    fn peek_span(&self) -> Option<Span> {
        self.tokens.get(self.idx).map(|t| t.span)
    }
}

fn cmp_op(kind: &TokenKind) -> Option<BinOp> {
    match kind {
        TokenKind::EqEq => Some(BinOp::Eq),
        TokenKind::Neq => Some(BinOp::Ne),
        TokenKind::Lt => Some(BinOp::Lt),
        TokenKind::Gt => Some(BinOp::Gt),
        TokenKind::Le => Some(BinOp::Le),
        TokenKind::Ge => Some(BinOp::Ge),
        _ => None,
    }
}

fn join(a: Span, b: Span) -> Span {
    let a0: usize = a.offset();
    let b0: usize = b.offset();
    let b1 = b0 + b.len();
    if b0 >= a0 {
        span_between(a0, b1)
    } else {
        let a1 = a0 + a.len();
        span_between(b0, a1)
    }
}
