//! Instruction program built from indented code lines

use super::ast::{Expr, Header, Line, LineItem, Stmt};
use crate::config::consts::codegen::{ESCAPE_FN, STR_FN};
use crate::config::consts::limits::MAX_NESTING_DEPTH;
use crate::error::{Result, StplError};

/// How an emitted expression value is converted to text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    /// `_escape(expr)`
    Escape,
    /// `_str(expr)`
    Str,
    /// Plain text form, no converter
    Verbatim,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    Literal(String),
    Expr {
        expr: Expr,
        conversion: Conversion,
        line: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// Append fragments to the output, in order
    Emit { fragments: Vec<Fragment>, line: usize },
    Exec { stmt: Stmt, line: usize },
    Block(Block),
}

/// A compound statement: its first clause plus any continuations
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub clauses: Vec<Clause>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub header: Header,
    pub body: Vec<Instruction>,
    pub line: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub body: Vec<Instruction>,
}

/// A parsed line with its indentation and template line
pub(crate) struct IndentedLine {
    pub indent: usize,
    pub line: usize,
    pub parsed: Line,
}

pub(crate) fn build(template: &str, lines: Vec<IndentedLine>) -> Result<Program> {
    let mut builder = Builder {
        template,
        lines: lines.into_iter().peekable(),
        loop_depth: 0,
        block_depth: 0,
    };
    let body = builder.body(0)?;
    if let Some(extra) = builder.lines.next() {
        return Err(StplError::generation(
            template,
            extra.line,
            "unexpected dedent",
        ));
    }
    Ok(Program { body })
}

struct Builder<'a> {
    template: &'a str,
    lines: std::iter::Peekable<std::vec::IntoIter<IndentedLine>>,
    loop_depth: usize,
    block_depth: usize,
}

impl Builder<'_> {
    fn body(&mut self, indent: usize) -> Result<Vec<Instruction>> {
        let mut body = Vec::new();
        while let Some(next) = self.lines.peek() {
            if next.indent < indent {
                break;
            }
            if next.indent > indent {
                return Err(StplError::generation(
                    self.template,
                    next.line,
                    "unexpected indent",
                ));
            }
            let Some(current) = self.lines.next() else {
                break;
            };
            match current.parsed {
                Line::Simple(items) => {
                    for (item, offset) in items {
                        body.push(self.instruction(item, current.line + offset)?);
                    }
                }
                Line::Compound { header, inline } => {
                    if header.is_continuation() {
                        return Err(StplError::syntax(
                            self.template,
                            current.line,
                            format!("'{}' without a matching block", header.keyword()),
                        ));
                    }
                    let block = self.block(header, inline, indent, current.line)?;
                    body.push(Instruction::Block(block));
                }
            }
        }
        Ok(body)
    }

    fn block(
        &mut self,
        header: Header,
        inline: Vec<(LineItem, usize)>,
        indent: usize,
        line: usize,
    ) -> Result<Block> {
        let mut clauses = vec![self.clause(header, inline, indent, line)?];
        while let Some(next) = self.lines.peek() {
            let is_continuation = next.indent == indent
                && matches!(&next.parsed, Line::Compound { header, .. } if header.is_continuation());
            if !is_continuation {
                break;
            }
            let Some(IndentedLine {
                line,
                parsed: Line::Compound { header, inline },
                ..
            }) = self.lines.next()
            else {
                break;
            };
            self.check_order(&clauses, &header, line)?;
            clauses.push(self.clause(header, inline, indent, line)?);
        }

        if matches!(clauses[0].header, Header::Try) && clauses.len() == 1 {
            return Err(StplError::syntax(
                self.template,
                clauses[0].line,
                "'try' needs an 'except' or 'finally' clause",
            ));
        }
        Ok(Block { clauses })
    }

    /// Valid sequences: if/elif*/else?, for|while/else?, try/except*/else?/finally?
    fn check_order(&self, clauses: &[Clause], next: &Header, line: usize) -> Result<()> {
        let first = &clauses[0].header;
        let last = &clauses[clauses.len() - 1].header;
        let allowed = match next {
            Header::Elif(_) => {
                matches!(first, Header::If(_)) && !matches!(last, Header::Else)
            }
            Header::Else => match first {
                Header::If(_) | Header::For(..) | Header::While(_) => {
                    !matches!(last, Header::Else)
                }
                Header::Try => matches!(last, Header::Except { .. }),
                _ => false,
            },
            Header::Except { .. } => {
                matches!(first, Header::Try)
                    && matches!(last, Header::Try | Header::Except { class: Some(_), .. })
            }
            Header::Finally => {
                matches!(first, Header::Try) && !matches!(last, Header::Finally)
            }
            _ => false,
        };
        if allowed {
            Ok(())
        } else {
            Err(StplError::syntax(
                self.template,
                line,
                format!(
                    "'{}' cannot follow '{}'",
                    next.keyword(),
                    last.keyword()
                ),
            ))
        }
    }

    fn clause(
        &mut self,
        header: Header,
        inline: Vec<(LineItem, usize)>,
        indent: usize,
        line: usize,
    ) -> Result<Clause> {
        if self.block_depth >= MAX_NESTING_DEPTH {
            return Err(StplError::syntax(
                self.template,
                line,
                "too many nested blocks",
            ));
        }
        self.block_depth += 1;
        let is_loop = matches!(header, Header::For(..) | Header::While(_));
        if is_loop {
            self.loop_depth += 1;
        }

        let mut body = Vec::new();
        for (item, offset) in inline {
            body.push(self.instruction(item, line + offset)?);
        }
        let nested_indent = match self.lines.peek() {
            Some(next) if next.indent > indent => Some(next.indent),
            _ => None,
        };
        if let Some(nested_indent) = nested_indent {
            body.extend(self.body(nested_indent)?);
        }

        if is_loop {
            self.loop_depth -= 1;
        }
        self.block_depth -= 1;
        Ok(Clause { header, body, line })
    }

    fn instruction(&self, item: LineItem, line: usize) -> Result<Instruction> {
        let stmt = match item {
            LineItem::Emit(items) => {
                return Ok(Instruction::Emit {
                    fragments: items
                        .into_iter()
                        .map(|(expr, offset)| fragment(expr, line + offset))
                        .collect(),
                    line,
                })
            }
            LineItem::Stmt(stmt) => stmt,
        };
        match stmt {
            Stmt::Break | Stmt::Continue if self.loop_depth == 0 => Err(StplError::syntax(
                self.template,
                line,
                format!(
                    "'{}' outside loop",
                    if stmt == Stmt::Break { "break" } else { "continue" }
                ),
            )),
            Stmt::Expr(expr) if expr.called_name() == Some("include") => Ok(Instruction::Emit {
                fragments: vec![Fragment::Expr {
                    expr,
                    conversion: Conversion::Verbatim,
                    line,
                }],
                line,
            }),
            stmt => Ok(Instruction::Exec { stmt, line }),
        }
    }
}

/// Classify one emission item
fn fragment(expr: Expr, line: usize) -> Fragment {
    if let Expr::Literal(crate::value::Value::String(text)) = expr {
        return Fragment::Literal(text);
    }

    let conversion = match expr.called_name() {
        Some(ESCAPE_FN) => Conversion::Escape,
        Some(STR_FN) => Conversion::Str,
        _ => Conversion::Verbatim,
    };
    match (conversion, expr) {
        (Conversion::Escape | Conversion::Str, Expr::Call { mut args, kwargs, .. })
            if args.len() == 1 && kwargs.is_empty() =>
        {
            Fragment::Expr {
                expr: args.remove(0),
                conversion,
                line,
            }
        }
        (_, expr) => Fragment::Expr {
            expr,
            conversion: Conversion::Verbatim,
            line,
        },
    }
}
