//! Binding-power (Pratt) parser for the expression language
//!
//! Operators bind by numeric power; a higher power means the operator
//! binds its operands more tightly. The infix loop takes any operator
//! whose power is at least the minimum handed down by the caller, which
//! yields the usual precedence without a grammar per level.

use crate::ast::{BinaryOp, Expr, Stmt, UnaryOp};
use crate::lexer::{Lexer, Token};
use ruleflow_domain::{Error, Result, Value};

/// Binding power of the ternary operator (the loosest)
const BP_TERNARY: u8 = 1;

fn infix_binding(token: &Token) -> Option<(BinaryOp, u8)> {
    let (op, bp) = match token {
        Token::OrOr => (BinaryOp::Or, 2),
        Token::AndAnd => (BinaryOp::And, 3),
        Token::Eq => (BinaryOp::Eq, 4),
        Token::NotEq => (BinaryOp::NotEq, 4),
        Token::Lt => (BinaryOp::Lt, 5),
        Token::LtEq => (BinaryOp::LtEq, 5),
        Token::Gt => (BinaryOp::Gt, 5),
        Token::GtEq => (BinaryOp::GtEq, 5),
        Token::Plus => (BinaryOp::Add, 6),
        Token::Minus => (BinaryOp::Sub, 6),
        Token::Star => (BinaryOp::Mul, 7),
        Token::Slash => (BinaryOp::Div, 7),
        Token::Percent => (BinaryOp::Rem, 7),
        _ => return None,
    };
    Some((op, bp))
}

/// Parse a single-expression source
pub fn parse_expression(source: &str) -> Result<Expr> {
    let mut parser = Parser::new(source)?;
    let expr = parser.parse_expr(0)?;
    parser.expect_eof()?;
    Ok(expr)
}

/// Parse a multi-statement script source
pub fn parse_script(source: &str) -> Result<Vec<Stmt>> {
    let mut parser = Parser::new(source)?;
    let stmts = parser.parse_stmts(&Token::Eof)?;
    if stmts.is_empty() {
        return Err(Error::expression(source, "empty script"));
    }
    Ok(stmts)
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Result<Self> {
        let tokens = Lexer::new(source).tokenize()?;
        Ok(Self {
            source,
            tokens,
            pos: 0,
        })
    }

    fn error(&self, message: String) -> Error {
        Error::expression(self.source, message)
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn peek_at(&self, offset: usize) -> &Token {
        self.tokens.get(self.pos + offset).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens.get(self.pos).cloned().unwrap_or(Token::Eof);
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, expected: &Token) -> Result<()> {
        let token = self.advance();
        if &token == expected {
            Ok(())
        } else {
            Err(self.error(format!("expected '{expected}', found '{token}'")))
        }
    }

    fn expect_eof(&self) -> Result<()> {
        match self.peek() {
            Token::Eof => Ok(()),
            token => Err(self.error(format!("unexpected token '{token}'"))),
        }
    }

    fn expect_ident(&mut self) -> Result<String> {
        match self.advance() {
            Token::Ident(name) => Ok(name),
            token => Err(self.error(format!("expected identifier, found '{token}'"))),
        }
    }

    // ---- statements ------------------------------------------------

    fn parse_stmts(&mut self, terminator: &Token) -> Result<Vec<Stmt>> {
        let mut stmts = Vec::new();
        while self.peek() != terminator {
            if self.peek() == &Token::Semicolon {
                self.advance();
                continue;
            }
            stmts.push(self.parse_stmt()?);
        }
        Ok(stmts)
    }

    fn parse_stmt(&mut self) -> Result<Stmt> {
        match self.peek() {
            Token::For => self.parse_for(),
            Token::Ident(_) if self.peek_at(1) == &Token::Assign => {
                let name = self.expect_ident()?;
                self.expect(&Token::Assign)?;
                let value = self.parse_expr(0)?;
                Ok(Stmt::Assign { name, value })
            }
            _ => Ok(Stmt::Expr(self.parse_expr(0)?)),
        }
    }

    fn parse_for(&mut self) -> Result<Stmt> {
        self.expect(&Token::For)?;
        self.expect(&Token::LParen)?;
        let var = self.expect_ident()?;
        self.expect(&Token::Colon)?;
        let iterable = self.parse_expr(0)?;
        self.expect(&Token::RParen)?;
        self.expect(&Token::LBrace)?;
        let body = self.parse_stmts(&Token::RBrace)?;
        self.expect(&Token::RBrace)?;
        Ok(Stmt::For {
            var,
            iterable,
            body,
        })
    }

    // ---- expressions -----------------------------------------------

    fn parse_expr(&mut self, min_bp: u8) -> Result<Expr> {
        let mut lhs = self.parse_unary()?;
        loop {
            match self.peek() {
                Token::Question if BP_TERNARY >= min_bp => {
                    self.advance();
                    let then_branch = self.parse_expr(0)?;
                    self.expect(&Token::Colon)?;
                    // Right-associative: `a ? b : c ? d : e` nests in the
                    // else branch
                    let else_branch = self.parse_expr(BP_TERNARY)?;
                    lhs = Expr::Ternary {
                        condition: Box::new(lhs),
                        then_branch: Box::new(then_branch),
                        else_branch: Box::new(else_branch),
                    };
                }
                token => {
                    let Some((op, bp)) = infix_binding(token) else {
                        break;
                    };
                    if bp < min_bp {
                        break;
                    }
                    self.advance();
                    let rhs = self.parse_expr(bp + 1)?;
                    lhs = Expr::Binary {
                        op,
                        left: Box::new(lhs),
                        right: Box::new(rhs),
                    };
                }
            }
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        match self.peek() {
            Token::Bang => {
                self.advance();
                Ok(Expr::Unary {
                    op: UnaryOp::Not,
                    operand: Box::new(self.parse_unary()?),
                })
            }
            Token::Minus => {
                self.advance();
                Ok(Expr::Unary {
                    op: UnaryOp::Neg,
                    operand: Box::new(self.parse_unary()?),
                })
            }
            _ => self.parse_postfix(),
        }
    }

    fn parse_postfix(&mut self) -> Result<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek() {
                Token::Dot => {
                    self.advance();
                    let name = self.expect_ident()?;
                    if self.peek() == &Token::LParen {
                        let args = self.parse_args()?;
                        expr = Expr::MethodCall {
                            object: Box::new(expr),
                            method: name,
                            args,
                        };
                    } else {
                        expr = Expr::Member {
                            object: Box::new(expr),
                            field: name,
                        };
                    }
                }
                Token::LBracket => {
                    self.advance();
                    let index = self.parse_expr(0)?;
                    self.expect(&Token::RBracket)?;
                    expr = Expr::Index {
                        object: Box::new(expr),
                        index: Box::new(index),
                    };
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>> {
        self.expect(&Token::LParen)?;
        let mut args = Vec::new();
        if self.peek() != &Token::RParen {
            loop {
                args.push(self.parse_expr(0)?);
                if self.peek() == &Token::Comma {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(&Token::RParen)?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        match self.advance() {
            Token::Int(i) => Ok(Expr::Literal(Value::Int(i))),
            Token::Float(f) => Ok(Expr::Literal(Value::Float(f))),
            Token::Str(s) => Ok(Expr::Literal(Value::String(s))),
            Token::True => Ok(Expr::Literal(Value::Bool(true))),
            Token::False => Ok(Expr::Literal(Value::Bool(false))),
            Token::Null => Ok(Expr::Literal(Value::Null)),
            Token::Ident(name) => Ok(Expr::Variable(name)),
            Token::LParen => {
                let expr = self.parse_expr(0)?;
                self.expect(&Token::RParen)?;
                Ok(expr)
            }
            token => Err(self.error(format!("unexpected token '{token}'"))),
        }
    }
}
