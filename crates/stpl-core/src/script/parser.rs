//! Recursive descent parser for one logical code line
//!
//! Operator precedence, lowest first:
//!
//! ```text
//! a if c else b
//! or
//! and
//! not
//! == != < <= > >= in, not in, is, is not   (chained)
//! + -
//! * / // %
//! unary - +
//! **
//! .attr [index] (call)
//! ```

use super::ast::{BinOp, CmpOp, Expr, Header, Line, LineItem, Stmt, Target, UnaryOp};
use super::token::{Sym, Tok, Token};
use crate::config::consts::codegen::PRINTLIST;
use crate::config::consts::limits::{MAX_NESTING_DEPTH, MAX_OPERATOR_CHAIN};
use crate::value::Value;

const RESERVED: [&str; 24] = [
    "and", "as", "break", "class", "continue", "def", "elif", "else", "except", "False",
    "finally", "for", "if", "in", "is", "lambda", "None", "not", "or", "pass", "True", "try",
    "while", "with",
];

/// Parse failure: message plus line offset
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParseError {
    pub line: usize,
    pub message: String,
}

type ParseResult<T> = Result<T, ParseError>;

pub(crate) fn parse_line(tokens: &[Token]) -> ParseResult<Line> {
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let line = parser.line()?;
    if let Some(token) = parser.peek_token() {
        return Err(ParseError {
            line: token.line,
            message: format!("unexpected '{}'", token.tok),
        });
    }
    Ok(line)
}

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    depth: usize,
}

impl<'t> Parser<'t> {
    // Token helpers

    fn peek_token(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn peek(&self) -> Option<&'t Tok> {
        self.peek_token().map(|t| &t.tok)
    }

    fn peek_at(&self, ahead: usize) -> Option<&'t Tok> {
        self.tokens.get(self.pos + ahead).map(|t| &t.tok)
    }

    fn current_line(&self) -> usize {
        self.peek_token()
            .or_else(|| self.tokens.last())
            .map_or(0, |t| t.line)
    }

    fn error<T>(&self, message: impl Into<String>) -> ParseResult<T> {
        Err(ParseError {
            line: self.current_line(),
            message: message.into(),
        })
    }

    fn unexpected<T>(&self, expected: &str) -> ParseResult<T> {
        match self.peek() {
            Some(tok) => self.error(format!("expected {}, found '{}'", expected, tok)),
            None => self.error(format!("expected {}, found end of line", expected)),
        }
    }

    fn at_sym(&self, sym: Sym) -> bool {
        self.peek() == Some(&Tok::Sym(sym))
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Tok::Name(name)) if name == keyword)
    }

    fn eat_sym(&mut self, sym: Sym) -> bool {
        let found = self.at_sym(sym);
        if found {
            self.pos += 1;
        }
        found
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        let found = self.at_keyword(keyword);
        if found {
            self.pos += 1;
        }
        found
    }

    /// Run `parse` one nesting level deeper
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        if self.depth >= MAX_NESTING_DEPTH {
            return self.error("too many nested parentheses");
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Count one more link of a left-nested operator chain
    fn chain_link(&self, links: &mut usize) -> ParseResult<()> {
        *links += 1;
        if *links > MAX_OPERATOR_CHAIN {
            return self.error("operator chain too long");
        }
        Ok(())
    }

    fn expect_sym(&mut self, sym: Sym, expected: &str) -> ParseResult<()> {
        if self.eat_sym(sym) {
            Ok(())
        } else {
            self.unexpected(expected)
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> ParseResult<()> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            self.unexpected(&format!("'{}'", keyword))
        }
    }

    fn identifier(&mut self) -> ParseResult<String> {
        match self.peek() {
            Some(Tok::Name(name)) if !RESERVED.contains(&name.as_str()) => {
                self.pos += 1;
                Ok(name.clone())
            }
            _ => self.unexpected("a name"),
        }
    }

    /// End of line or the start of the next `;` statement
    fn at_statement_end(&self) -> bool {
        self.peek().is_none() || self.at_sym(Sym::Semi)
    }

    // Lines and statements

    fn line(&mut self) -> ParseResult<Line> {
        let keyword = match self.peek() {
            Some(Tok::Name(name)) => name.as_str(),
            _ => "",
        };
        let header = match keyword {
            "if" | "elif" | "while" => {
                self.pos += 1;
                let test = self.expr()?;
                match keyword {
                    "if" => Header::If(test),
                    "elif" => Header::Elif(test),
                    _ => Header::While(test),
                }
            }
            "else" | "try" | "finally" => {
                self.pos += 1;
                match keyword {
                    "else" => Header::Else,
                    "try" => Header::Try,
                    _ => Header::Finally,
                }
            }
            "for" => {
                self.pos += 1;
                let target = self.target_list()?;
                self.expect_keyword("in")?;
                Header::For(target, self.expr_list()?)
            }
            "with" => {
                self.pos += 1;
                let context = self.expr()?;
                let name = if self.eat_keyword("as") {
                    Some(self.identifier()?)
                } else {
                    None
                };
                Header::With(context, name)
            }
            "except" => {
                self.pos += 1;
                let class = match self.peek() {
                    Some(Tok::Name(_)) => Some(self.identifier()?),
                    _ => None,
                };
                let name = if class.is_some() && self.eat_keyword("as") {
                    Some(self.identifier()?)
                } else {
                    None
                };
                Header::Except { class, name }
            }
            "def" | "class" => {
                return self.error(format!("'{}' blocks are not supported in templates", keyword));
            }
            _ => return Ok(Line::Simple(self.simple_statements()?)),
        };

        self.expect_sym(Sym::Colon, "':'")?;
        let inline = if self.peek().is_some() {
            self.simple_statements()?
        } else {
            Vec::new()
        };
        Ok(Line::Compound { header, inline })
    }

    fn simple_statements(&mut self) -> ParseResult<Vec<(LineItem, usize)>> {
        let mut stmts = Vec::new();
        loop {
            let line = self.current_line();
            stmts.push((self.simple_statement()?, line));
            if !self.eat_sym(Sym::Semi) || self.peek().is_none() {
                break;
            }
        }
        Ok(stmts)
    }

    fn simple_statement(&mut self) -> ParseResult<LineItem> {
        if self.at_emission() {
            return self.emission().map(LineItem::Emit);
        }
        self.statement().map(LineItem::Stmt)
    }

    fn statement(&mut self) -> ParseResult<Stmt> {
        if self.eat_keyword("pass") {
            return Ok(Stmt::Pass);
        }
        if self.eat_keyword("break") {
            return Ok(Stmt::Break);
        }
        if self.eat_keyword("continue") {
            return Ok(Stmt::Continue);
        }
        let expr = self.expr_list()?;
        if self.eat_sym(Sym::Assign) {
            let target = self.assign_target(expr)?;
            return Ok(Stmt::Assign(target, self.expr_list()?));
        }

        let aug_op = match self.peek() {
            Some(Tok::Sym(Sym::PlusAssign)) => Some(BinOp::Add),
            Some(Tok::Sym(Sym::MinusAssign)) => Some(BinOp::Sub),
            Some(Tok::Sym(Sym::StarAssign)) => Some(BinOp::Mul),
            Some(Tok::Sym(Sym::SlashAssign)) => Some(BinOp::Div),
            _ => None,
        };
        if let Some(op) = aug_op {
            self.pos += 1;
            let Expr::Name(name) = expr else {
                return self.error("augmented assignment needs a plain name");
            };
            return Ok(Stmt::AugAssign(name, op, self.expr_list()?));
        }

        if !self.at_statement_end() {
            return self.unexpected("end of statement");
        }
        Ok(Stmt::Expr(expr))
    }

    fn assign_target(&self, expr: Expr) -> ParseResult<Target> {
        match expr {
            Expr::Name(name) if !RESERVED.contains(&name.as_str()) => Ok(Target::Name(name)),
            Expr::Tuple(items) | Expr::List(items) => items
                .into_iter()
                .map(|item| self.assign_target(item))
                .collect::<ParseResult<Vec<_>>>()
                .map(Target::Tuple),
            _ => self.error("cannot assign to expression"),
        }
    }

    /// `_printlist((a, b, ...,))`
    fn at_emission(&self) -> bool {
        matches!(self.peek(), Some(Tok::Name(name)) if name == PRINTLIST)
            && self.peek_at(1) == Some(&Tok::Sym(Sym::LParen))
            && self.peek_at(2) == Some(&Tok::Sym(Sym::LParen))
    }

    fn emission(&mut self) -> ParseResult<Vec<(Expr, usize)>> {
        self.pos += 3;
        let mut items = Vec::new();
        while !self.eat_sym(Sym::RParen) {
            let line = self.current_line();
            items.push((self.expr()?, line));
            if !self.eat_sym(Sym::Comma) {
                self.expect_sym(Sym::RParen, "')'")?;
                break;
            }
        }
        self.expect_sym(Sym::RParen, "')'")?;
        Ok(items)
    }

    fn target_list(&mut self) -> ParseResult<Target> {
        let first = self.target()?;
        if !self.at_sym(Sym::Comma) {
            return Ok(first);
        }
        let mut targets = vec![first];
        while self.eat_sym(Sym::Comma) {
            if self.at_keyword("in") || self.at_sym(Sym::RParen) || self.at_sym(Sym::RBracket) {
                break;
            }
            targets.push(self.target()?);
        }
        Ok(Target::Tuple(targets))
    }

    fn target(&mut self) -> ParseResult<Target> {
        if self.eat_sym(Sym::LParen) {
            let inner = self.nested(Self::target_list)?;
            self.expect_sym(Sym::RParen, "')'")?;
            return Ok(inner);
        }
        if self.eat_sym(Sym::LBracket) {
            let inner = self.nested(Self::target_list)?;
            self.expect_sym(Sym::RBracket, "']'")?;
            return Ok(inner);
        }
        Ok(Target::Name(self.identifier()?))
    }

    // Expressions

    fn expr_list(&mut self) -> ParseResult<Expr> {
        let first = self.expr()?;
        if !self.at_sym(Sym::Comma) {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat_sym(Sym::Comma) {
            if self.at_statement_end() || self.at_sym(Sym::Assign) || self.at_sym(Sym::Colon) {
                break;
            }
            items.push(self.expr()?);
        }
        Ok(Expr::Tuple(items))
    }

    fn expr(&mut self) -> ParseResult<Expr> {
        self.nested(Self::conditional)
    }

    fn conditional(&mut self) -> ParseResult<Expr> {
        let then = self.or_expr()?;
        if !self.eat_keyword("if") {
            return Ok(then);
        }
        let cond = self.or_expr()?;
        self.expect_keyword("else")?;
        let otherwise = self.expr()?;
        Ok(Expr::IfElse {
            cond: Box::new(cond),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        })
    }

    fn or_expr(&mut self) -> ParseResult<Expr> {
        let mut left = self.and_expr()?;
        let mut links = 0;
        while self.eat_keyword("or") {
            self.chain_link(&mut links)?;
            left = Expr::Or(Box::new(left), Box::new(self.and_expr()?));
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> ParseResult<Expr> {
        let mut left = self.not_expr()?;
        let mut links = 0;
        while self.eat_keyword("and") {
            self.chain_link(&mut links)?;
            left = Expr::And(Box::new(left), Box::new(self.not_expr()?));
        }
        Ok(left)
    }

    fn not_expr(&mut self) -> ParseResult<Expr> {
        if self.eat_keyword("not") {
            let operand = self.nested(Self::not_expr)?;
            return Ok(Expr::Not(Box::new(operand)));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> ParseResult<Expr> {
        let left = self.arith()?;
        let mut rest = Vec::new();
        while let Some(op) = self.compare_op() {
            rest.push((op, self.arith()?));
        }
        if rest.is_empty() {
            Ok(left)
        } else {
            Ok(Expr::Compare(Box::new(left), rest))
        }
    }

    fn compare_op(&mut self) -> Option<CmpOp> {
        let (op, len) = match self.peek()? {
            Tok::Sym(Sym::EqEq) => (CmpOp::Eq, 1),
            Tok::Sym(Sym::NotEq) => (CmpOp::NotEq, 1),
            Tok::Sym(Sym::Lt) => (CmpOp::Lt, 1),
            Tok::Sym(Sym::Le) => (CmpOp::Le, 1),
            Tok::Sym(Sym::Gt) => (CmpOp::Gt, 1),
            Tok::Sym(Sym::Ge) => (CmpOp::Ge, 1),
            Tok::Name(name) if name == "in" => (CmpOp::In, 1),
            Tok::Name(name) if name == "not" => match self.peek_at(1) {
                Some(Tok::Name(next)) if next == "in" => (CmpOp::NotIn, 2),
                _ => return None,
            },
            Tok::Name(name) if name == "is" => match self.peek_at(1) {
                Some(Tok::Name(next)) if next == "not" => (CmpOp::IsNot, 2),
                _ => (CmpOp::Is, 1),
            },
            _ => return None,
        };
        self.pos += len;
        Some(op)
    }

    fn arith(&mut self) -> ParseResult<Expr> {
        let mut left = self.term()?;
        let mut links = 0;
        loop {
            let op = if self.eat_sym(Sym::Plus) {
                BinOp::Add
            } else if self.eat_sym(Sym::Minus) {
                BinOp::Sub
            } else {
                return Ok(left);
            };
            self.chain_link(&mut links)?;
            left = Expr::Binary(op, Box::new(left), Box::new(self.term()?));
        }
    }

    fn term(&mut self) -> ParseResult<Expr> {
        let mut left = self.factor()?;
        let mut links = 0;
        loop {
            let op = match self.peek() {
                Some(Tok::Sym(Sym::Star)) => BinOp::Mul,
                Some(Tok::Sym(Sym::Slash)) => BinOp::Div,
                Some(Tok::Sym(Sym::DoubleSlash)) => BinOp::FloorDiv,
                Some(Tok::Sym(Sym::Percent)) => BinOp::Mod,
                _ => return Ok(left),
            };
            self.chain_link(&mut links)?;
            self.pos += 1;
            left = Expr::Binary(op, Box::new(left), Box::new(self.factor()?));
        }
    }

    fn factor(&mut self) -> ParseResult<Expr> {
        if self.eat_sym(Sym::Minus) {
            let operand = self.nested(Self::factor)?;
            return Ok(Expr::Unary(UnaryOp::Neg, Box::new(operand)));
        }
        if self.eat_sym(Sym::Plus) {
            let operand = self.nested(Self::factor)?;
            return Ok(Expr::Unary(UnaryOp::Pos, Box::new(operand)));
        }
        self.power()
    }

    fn power(&mut self) -> ParseResult<Expr> {
        let base = self.postfix()?;
        if self.eat_sym(Sym::DoubleStar) {
            let exponent = self.nested(Self::factor)?;
            return Ok(Expr::Binary(BinOp::Pow, Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn postfix(&mut self) -> ParseResult<Expr> {
        let mut expr = self.atom()?;
        let mut links = 0;
        loop {
            if self.at_sym(Sym::Dot) || self.at_sym(Sym::LBracket) || self.at_sym(Sym::LParen) {
                self.chain_link(&mut links)?;
            }
            if self.eat_sym(Sym::Dot) {
                let name = match self.peek() {
                    Some(Tok::Name(name)) => name.clone(),
                    _ => return self.unexpected("an attribute name"),
                };
                self.pos += 1;
                expr = Expr::Attr(Box::new(expr), name);
            } else if self.eat_sym(Sym::LBracket) {
                expr = self.subscript(expr)?;
            } else if self.eat_sym(Sym::LParen) {
                let (args, kwargs) = self.call_args()?;
                expr = Expr::Call {
                    func: Box::new(expr),
                    args,
                    kwargs,
                };
            } else {
                return Ok(expr);
            }
        }
    }

    fn subscript(&mut self, target: Expr) -> ParseResult<Expr> {
        let lower = if self.at_sym(Sym::Colon) {
            None
        } else {
            Some(Box::new(self.expr()?))
        };
        if !self.eat_sym(Sym::Colon) {
            self.expect_sym(Sym::RBracket, "']'")?;
            let Some(index) = lower else {
                return self.error("empty subscript");
            };
            return Ok(Expr::Index(Box::new(target), index));
        }

        let upper = if self.at_sym(Sym::Colon) || self.at_sym(Sym::RBracket) {
            None
        } else {
            Some(Box::new(self.expr()?))
        };
        let step = if self.eat_sym(Sym::Colon) && !self.at_sym(Sym::RBracket) {
            Some(Box::new(self.expr()?))
        } else {
            None
        };
        self.expect_sym(Sym::RBracket, "']'")?;
        Ok(Expr::Slice {
            target: Box::new(target),
            lower,
            upper,
            step,
        })
    }

    fn call_args(&mut self) -> ParseResult<(Vec<Expr>, Vec<(String, Expr)>)> {
        let mut args = Vec::new();
        let mut kwargs = Vec::new();
        while !self.eat_sym(Sym::RParen) {
            let keyword = match (self.peek(), self.peek_at(1)) {
                (Some(Tok::Name(name)), Some(Tok::Sym(Sym::Assign))) => Some(name.clone()),
                _ => None,
            };
            if let Some(name) = keyword {
                self.pos += 2;
                kwargs.push((name, self.expr()?));
            } else if !kwargs.is_empty() {
                return self.error("positional argument follows keyword argument");
            } else {
                args.push(self.expr()?);
            }
            if !self.eat_sym(Sym::Comma) {
                self.expect_sym(Sym::RParen, "')'")?;
                break;
            }
        }
        Ok((args, kwargs))
    }

    fn atom(&mut self) -> ParseResult<Expr> {
        let Some(token) = self.peek_token() else {
            return self.unexpected("an expression");
        };
        match &token.tok {
            Tok::Int(n) => {
                self.pos += 1;
                Ok(Expr::Literal(Value::from(*n)))
            }
            Tok::Float(x) => {
                self.pos += 1;
                Ok(Expr::Literal(Value::from(*x)))
            }
            Tok::Str(_) => {
                let mut text = String::new();
                while let Some(Tok::Str(part)) = self.peek() {
                    text.push_str(part);
                    self.pos += 1;
                }
                Ok(Expr::Literal(Value::String(text)))
            }
            Tok::Name(name) => match name.as_str() {
                "True" => {
                    self.pos += 1;
                    Ok(Expr::Literal(Value::Bool(true)))
                }
                "False" => {
                    self.pos += 1;
                    Ok(Expr::Literal(Value::Bool(false)))
                }
                "None" => {
                    self.pos += 1;
                    Ok(Expr::Literal(Value::Null))
                }
                _ => Ok(Expr::Name(self.identifier()?)),
            },
            Tok::Sym(Sym::LParen) => {
                self.pos += 1;
                if self.eat_sym(Sym::RParen) {
                    return Ok(Expr::Tuple(Vec::new()));
                }
                let first = self.expr()?;
                if self.eat_sym(Sym::RParen) {
                    return Ok(first);
                }
                let items = self.sequence_tail(first, Sym::RParen)?;
                Ok(Expr::Tuple(items))
            }
            Tok::Sym(Sym::LBracket) => {
                self.pos += 1;
                if self.eat_sym(Sym::RBracket) {
                    return Ok(Expr::List(Vec::new()));
                }
                let first = self.expr()?;
                if self.at_keyword("for") {
                    return self.comprehension(first);
                }
                if self.eat_sym(Sym::RBracket) {
                    return Ok(Expr::List(vec![first]));
                }
                let items = self.sequence_tail(first, Sym::RBracket)?;
                Ok(Expr::List(items))
            }
            Tok::Sym(Sym::LBrace) => {
                self.pos += 1;
                let mut pairs = Vec::new();
                while !self.eat_sym(Sym::RBrace) {
                    let key = self.expr()?;
                    self.expect_sym(Sym::Colon, "':'")?;
                    pairs.push((key, self.expr()?));
                    if !self.eat_sym(Sym::Comma) {
                        self.expect_sym(Sym::RBrace, "'}'")?;
                        break;
                    }
                }
                Ok(Expr::Dict(pairs))
            }
            _ => self.unexpected("an expression"),
        }
    }

    /// Remaining `, item` entries of a display up to `close`
    fn sequence_tail(&mut self, first: Expr, close: Sym) -> ParseResult<Vec<Expr>> {
        let mut items = vec![first];
        loop {
            if !self.eat_sym(Sym::Comma) {
                self.expect_sym(close, "closing bracket")?;
                return Ok(items);
            }
            if self.eat_sym(close) {
                return Ok(items);
            }
            items.push(self.expr()?);
        }
    }

    fn comprehension(&mut self, element: Expr) -> ParseResult<Expr> {
        self.expect_keyword("for")?;
        let target = self.target_list()?;
        self.expect_keyword("in")?;
        let iter = self.or_expr()?;
        let mut conds = Vec::new();
        while self.eat_keyword("if") {
            conds.push(self.or_expr()?);
        }
        self.expect_sym(Sym::RBracket, "']'")?;
        Ok(Expr::ListComp {
            element: Box::new(element),
            target,
            iter: Box::new(iter),
            conds,
        })
    }
}
