//! Syntax tree of the template script language

use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Pos,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    NotIn,
    Is,
    IsNot,
}

/// Assignment and loop targets
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    Name(String),
    Tuple(Vec<Target>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    Name(String),
    List(Vec<Expr>),
    Tuple(Vec<Expr>),
    Dict(Vec<(Expr, Expr)>),
    Attr(Box<Expr>, String),
    Index(Box<Expr>, Box<Expr>),
    Slice {
        target: Box<Expr>,
        lower: Option<Box<Expr>>,
        upper: Option<Box<Expr>>,
        step: Option<Box<Expr>>,
    },
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
        kwargs: Vec<(String, Expr)>,
    },
    Unary(UnaryOp, Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Compare(Box<Expr>, Vec<(CmpOp, Expr)>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    IfElse {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    ListComp {
        element: Box<Expr>,
        target: Target,
        iter: Box<Expr>,
        conds: Vec<Expr>,
    },
}

impl Expr {
    /// `name(...)` where `name` is a plain identifier
    pub fn called_name(&self) -> Option<&str> {
        match self {
            Expr::Call { func, .. } => match func.as_ref() {
                Expr::Name(name) => Some(name),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Simple statements
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expr(Expr),
    Assign(Target, Expr),
    AugAssign(String, BinOp, Expr),
    Pass,
    Break,
    Continue,
}

/// Compound statement headers
#[derive(Debug, Clone, PartialEq)]
pub enum Header {
    If(Expr),
    Elif(Expr),
    Else,
    For(Target, Expr),
    While(Expr),
    With(Expr, Option<String>),
    Try,
    Except {
        class: Option<String>,
        name: Option<String>,
    },
    Finally,
}

impl Header {
    /// Headers that continue a preceding clause
    pub fn is_continuation(&self) -> bool {
        matches!(
            self,
            Header::Elif(_) | Header::Else | Header::Except { .. } | Header::Finally
        )
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Header::If(_) => "if",
            Header::Elif(_) => "elif",
            Header::Else => "else",
            Header::For(..) => "for",
            Header::While(_) => "while",
            Header::With(..) => "with",
            Header::Try => "try",
            Header::Except { .. } => "except",
            Header::Finally => "finally",
        }
    }
}

/// One `;`-separated piece of a line
#[derive(Debug, Clone, PartialEq)]
pub enum LineItem {
    Stmt(Stmt),
    /// Items of an emission call, each with its line offset
    Emit(Vec<(Expr, usize)>),
}

/// One parsed logical line
#[derive(Debug, Clone, PartialEq)]
pub enum Line {
    /// `;`-separated simple statements, with line offsets
    Simple(Vec<(LineItem, usize)>),
    /// A header, optionally followed by simple statements on the same line
    Compound {
        header: Header,
        inline: Vec<(LineItem, usize)>,
    },
}
