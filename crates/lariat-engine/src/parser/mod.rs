//! Chunk parsing: a recursive-descent parser over the generated lexer.
//!
//! The language is deliberately small — literals, globals and locals,
//! function literals, calls, arithmetic, comparison and concatenation —
//! just enough surface to drive the marshalling boundary.

pub mod ast;
pub mod lexer;

use crate::error::SyntaxError;

use ast::{BinOp, Block, Expr, Stmt};
use lexer::{lex, Token};

/// Parse a chunk into its statement list.
pub fn parse_chunk(name: &str, source: &str) -> Result<Block, SyntaxError> {
    let tokens = lex(name, source)?;
    let mut parser = Parser {
        chunk: name.to_string(),
        tokens,
        pos: 0,
    };
    let block = parser.block()?;
    match parser.peek() {
        None => Ok(block),
        Some(_) => Err(parser.unexpected("statement")),
    }
}

struct Parser {
    chunk: String,
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn peek_ahead(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.pos + n).map(|(t, _)| t)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(t, _)| t.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|(_, l)| *l)
            .unwrap_or(1)
    }

    fn error(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError {
            chunk: self.chunk.clone(),
            line: self.line(),
            message: message.into(),
        }
    }

    fn unexpected(&self, while_parsing: &str) -> SyntaxError {
        match self.peek() {
            Some(token) => self.error(format!(
                "unexpected symbol near {} while parsing {}",
                token.describe(),
                while_parsing
            )),
            None => self.error(format!("unexpected end of chunk while parsing {}", while_parsing)),
        }
    }

    fn expect(&mut self, token: Token, what: &str) -> Result<(), SyntaxError> {
        if self.eat(&token) {
            Ok(())
        } else {
            Err(self.unexpected(what))
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<String, SyntaxError> {
        match self.peek() {
            Some(Token::Ident(_)) => match self.next() {
                Some(Token::Ident(name)) => Ok(name),
                _ => Err(self.unexpected(what)),
            },
            _ => Err(self.unexpected(what)),
        }
    }

    /// Statements until end-of-chunk or `end`. A `return` closes the block.
    fn block(&mut self) -> Result<Block, SyntaxError> {
        let mut stmts = Vec::new();
        loop {
            match self.peek() {
                None | Some(Token::End) => return Ok(stmts),
                Some(Token::Semi) => {
                    self.pos += 1;
                }
                Some(Token::Return) => {
                    self.pos += 1;
                    stmts.push(self.return_stmt()?);
                    while self.eat(&Token::Semi) {}
                    return match self.peek() {
                        None | Some(Token::End) => Ok(stmts),
                        Some(_) => Err(self.unexpected("end of block after 'return'")),
                    };
                }
                Some(_) => stmts.push(self.statement()?),
            }
        }
    }

    fn return_stmt(&mut self) -> Result<Stmt, SyntaxError> {
        match self.peek() {
            None | Some(Token::End) | Some(Token::Semi) => Ok(Stmt::Return(Vec::new())),
            Some(_) => {
                let mut exprs = vec![self.expression()?];
                while self.eat(&Token::Comma) {
                    exprs.push(self.expression()?);
                }
                Ok(Stmt::Return(exprs))
            }
        }
    }

    fn statement(&mut self) -> Result<Stmt, SyntaxError> {
        match self.peek() {
            Some(Token::Local) => {
                self.pos += 1;
                let name = self.expect_ident("local declaration")?;
                self.expect(Token::Assign, "local declaration")?;
                let value = self.expression()?;
                Ok(Stmt::Assign {
                    name,
                    value,
                    local: true,
                })
            }
            Some(Token::Function) => {
                self.pos += 1;
                let name = self.expect_ident("function declaration")?;
                let (params, body) = self.function_rest("function declaration")?;
                Ok(Stmt::Assign {
                    name: name.clone(),
                    value: Expr::Function {
                        name: Some(name),
                        params,
                        body,
                    },
                    local: false,
                })
            }
            Some(Token::Ident(_)) if self.peek_ahead(1) == Some(&Token::Assign) => {
                let name = self.expect_ident("assignment")?;
                self.pos += 1; // '='
                let value = self.expression()?;
                Ok(Stmt::Assign {
                    name,
                    value,
                    local: false,
                })
            }
            Some(_) => {
                let expr = self.expression()?;
                if matches!(expr, Expr::Call { .. }) {
                    Ok(Stmt::Expr(expr))
                } else {
                    Err(self.error("syntax error: only calls may stand alone as statements"))
                }
            }
            None => Err(self.unexpected("statement")),
        }
    }

    /// `( params ) block end`, shared by declarations and literals.
    fn function_rest(&mut self, what: &str) -> Result<(Vec<String>, Block), SyntaxError> {
        self.expect(Token::LParen, what)?;
        let mut params = Vec::new();
        if !self.eat(&Token::RParen) {
            loop {
                params.push(self.expect_ident("parameter list")?);
                if self.eat(&Token::Comma) {
                    continue;
                }
                self.expect(Token::RParen, "parameter list")?;
                break;
            }
        }
        let body = self.block()?;
        self.expect(Token::End, what)?;
        Ok((params, body))
    }

    // Precedence, loosest first: comparison, concat (right-assoc),
    // additive, multiplicative, unary minus, call, primary.

    fn expression(&mut self) -> Result<Expr, SyntaxError> {
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Expr, SyntaxError> {
        let mut lhs = self.concat()?;
        loop {
            let op = match self.peek() {
                Some(Token::Eq) => BinOp::Eq,
                Some(Token::Ne) => BinOp::Ne,
                Some(Token::Lt) => BinOp::Lt,
                Some(Token::Le) => BinOp::Le,
                Some(Token::Gt) => BinOp::Gt,
                Some(Token::Ge) => BinOp::Ge,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.concat()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn concat(&mut self) -> Result<Expr, SyntaxError> {
        let lhs = self.additive()?;
        if self.eat(&Token::Concat) {
            let rhs = self.concat()?;
            Ok(Expr::Binary {
                op: BinOp::Concat,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            })
        } else {
            Ok(lhs)
        }
    }

    fn additive(&mut self) -> Result<Expr, SyntaxError> {
        let mut lhs = self.multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.multiplicative()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn multiplicative(&mut self) -> Result<Expr, SyntaxError> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                Some(Token::Percent) => BinOp::Mod,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn unary(&mut self) -> Result<Expr, SyntaxError> {
        if self.eat(&Token::Minus) {
            Ok(Expr::Neg(Box::new(self.unary()?)))
        } else {
            self.call()
        }
    }

    fn call(&mut self) -> Result<Expr, SyntaxError> {
        let mut expr = self.primary()?;
        while self.eat(&Token::LParen) {
            let mut args = Vec::new();
            if !self.eat(&Token::RParen) {
                loop {
                    args.push(self.expression()?);
                    if self.eat(&Token::Comma) {
                        continue;
                    }
                    self.expect(Token::RParen, "argument list")?;
                    break;
                }
            }
            expr = Expr::Call {
                callee: Box::new(expr),
                args,
            };
        }
        Ok(expr)
    }

    fn primary(&mut self) -> Result<Expr, SyntaxError> {
        match self.peek() {
            Some(Token::Nil) => {
                self.pos += 1;
                Ok(Expr::Nil)
            }
            Some(Token::True) => {
                self.pos += 1;
                Ok(Expr::True)
            }
            Some(Token::False) => {
                self.pos += 1;
                Ok(Expr::False)
            }
            Some(Token::Number(n)) => {
                let n = *n;
                self.pos += 1;
                Ok(Expr::Number(n))
            }
            Some(Token::Str(_)) => match self.next() {
                Some(Token::Str(s)) => Ok(Expr::Str(s)),
                _ => Err(self.unexpected("expression")),
            },
            Some(Token::Ident(_)) => match self.next() {
                Some(Token::Ident(name)) => Ok(Expr::Var(name)),
                _ => Err(self.unexpected("expression")),
            },
            Some(Token::Function) => {
                self.pos += 1;
                let (params, body) = self.function_rest("function literal")?;
                Ok(Expr::Function {
                    name: None,
                    params,
                    body,
                })
            }
            Some(Token::LParen) => {
                self.pos += 1;
                let inner = self.expression()?;
                self.expect(Token::RParen, "parenthesised expression")?;
                Ok(inner)
            }
            _ => Err(self.unexpected("expression")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_chunk_returning_function() {
        let block = parse_chunk("test", "return function(a)\n    return a + 100\nend").unwrap();
        assert_eq!(block.len(), 1);
        let Stmt::Return(exprs) = &block[0] else {
            panic!("expected return");
        };
        assert_eq!(exprs.len(), 1);
        let Expr::Function { params, body, .. } = &exprs[0] else {
            panic!("expected function literal");
        };
        assert_eq!(params, &["a".to_string()]);
        assert_eq!(body.len(), 1);
    }

    #[test]
    fn parses_declarations_and_calls() {
        let block = parse_chunk(
            "test",
            "function add(a, b) return a + b end\nresult = add(1, 2)",
        )
        .unwrap();
        assert_eq!(block.len(), 2);
        assert!(matches!(&block[0], Stmt::Assign { local: false, .. }));
        assert!(matches!(
            &block[1],
            Stmt::Assign { name, .. } if name == "result"
        ));
    }

    #[test]
    fn concat_is_right_associative() {
        let block = parse_chunk("test", "return 'a' .. 'b' .. 'c'").unwrap();
        let Stmt::Return(exprs) = &block[0] else {
            panic!("expected return");
        };
        let Expr::Binary { op, rhs, .. } = &exprs[0] else {
            panic!("expected binary");
        };
        assert_eq!(*op, BinOp::Concat);
        assert!(matches!(
            rhs.as_ref(),
            Expr::Binary {
                op: BinOp::Concat,
                ..
            }
        ));
    }

    #[test]
    fn rejects_dangling_operator() {
        let err = parse_chunk("code", "return -;").unwrap_err();
        assert!(err.message.contains("unexpected symbol"));
        assert_eq!(err.chunk, "code");
    }

    #[test]
    fn rejects_statement_after_return() {
        assert!(parse_chunk("test", "return 1\nx = 2").is_err());
    }

    #[test]
    fn rejects_bare_expression_statement() {
        assert!(parse_chunk("test", "1 + 2").is_err());
    }

    #[test]
    fn return_requires_nothing() {
        let block = parse_chunk("test", "return").unwrap();
        assert!(matches!(&block[0], Stmt::Return(exprs) if exprs.is_empty()));
    }
}
