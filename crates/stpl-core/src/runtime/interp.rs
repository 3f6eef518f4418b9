use std::collections::BTreeMap;

use html_escape::encode_quoted_attribute;
use tracing::warn;

use super::args::Args;
use super::env::{is_helper, Env};
use super::{builtins, methods, ops, IncludeFailure, Resolver};
use crate::config::consts::codegen::ESCAPE_FN;
use crate::error::{Result, RuntimeErrorKind, StplError};
use crate::script::ast::{Expr, Header, Stmt, Target};
use crate::script::{Block, Clause, Conversion, Fragment, Instruction};
use crate::value::Value;

/// How a statement sequence finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Normal,
    Break,
    Continue,
}

/// A failure that is either located at the current line or already located
enum Failure {
    Kind(RuntimeErrorKind),
    Located(StplError),
}

impl From<RuntimeErrorKind> for Failure {
    fn from(kind: RuntimeErrorKind) -> Self {
        Failure::Kind(kind)
    }
}

impl From<IncludeFailure> for Failure {
    fn from(failure: IncludeFailure) -> Self {
        match failure {
            IncludeFailure::Kind(kind) => Failure::Kind(kind),
            IncludeFailure::Child(err) => Failure::Located(err),
        }
    }
}

pub(crate) struct Interpreter<'a> {
    template: &'a str,
    autoescape: bool,
    resolver: &'a dyn Resolver,
    env: Env,
    out: Vec<String>,
    line: usize,
}

impl<'a> Interpreter<'a> {
    pub fn new(
        template: &'a str,
        autoescape: bool,
        resolver: &'a dyn Resolver,
        vars: BTreeMap<String, Value>,
    ) -> Self {
        Self {
            template,
            autoescape,
            resolver,
            env: Env::new(vars),
            out: Vec::new(),
            line: 1,
        }
    }

    pub fn run(&mut self, body: &[Instruction]) -> Result<()> {
        self.exec_body(body).map(|_| ())
    }

    pub fn into_output(self) -> String {
        self.out.concat()
    }

    fn fail(&self, kind: RuntimeErrorKind) -> StplError {
        StplError::Runtime {
            template: self.template.to_string(),
            line: self.line,
            kind,
        }
    }

    fn op<T>(&self, result: std::result::Result<T, RuntimeErrorKind>) -> Result<T> {
        result.map_err(|kind| self.fail(kind))
    }

    fn exec_body(&mut self, body: &[Instruction]) -> Result<Flow> {
        for instruction in body {
            let flow = self.exec(instruction)?;
            if flow != Flow::Normal {
                return Ok(flow);
            }
        }
        Ok(Flow::Normal)
    }

    fn exec(&mut self, instruction: &Instruction) -> Result<Flow> {
        match instruction {
            Instruction::Emit { fragments, line } => {
                self.line = *line;
                self.emit(fragments)?;
                Ok(Flow::Normal)
            }
            Instruction::Exec { stmt, line } => {
                self.line = *line;
                self.exec_stmt(stmt)
            }
            Instruction::Block(block) => self.exec_block(block),
        }
    }

    /// Evaluate every fragment before any of them reaches the output
    fn emit(&mut self, fragments: &[Fragment]) -> Result<()> {
        let mut parts = Vec::with_capacity(fragments.len());
        for fragment in fragments {
            match fragment {
                Fragment::Literal(text) => parts.push(text.clone()),
                Fragment::Expr {
                    expr,
                    conversion,
                    line,
                } => {
                    self.line = *line;
                    let value = self.eval(expr)?;
                    parts.push(self.convert(&value, *conversion));
                }
            }
        }
        self.out.extend(parts);
        Ok(())
    }

    /// `noescape` mode swaps the escaped and raw converters
    fn convert(&self, value: &Value, conversion: Conversion) -> String {
        let escape = match conversion {
            Conversion::Escape => self.autoescape,
            Conversion::Str => !self.autoescape,
            Conversion::Verbatim => false,
        };
        let text = value.to_text();
        if escape {
            encode_quoted_attribute(&text).into_owned()
        } else {
            text
        }
    }

    fn exec_stmt(&mut self, stmt: &Stmt) -> Result<Flow> {
        match stmt {
            Stmt::Expr(expr) => {
                self.eval(expr)?;
            }
            Stmt::Assign(target, expr) => {
                let value = self.eval(expr)?;
                self.bind(target, value)?;
            }
            Stmt::AugAssign(name, op, expr) => {
                let current = match self.env.lookup(name) {
                    Some(value) => value.clone(),
                    None => return Err(self.fail(RuntimeErrorKind::UndefinedVariable(name.clone()))),
                };
                let operand = self.eval(expr)?;
                let value = self.op(ops::binary(*op, &current, &operand))?;
                self.env.assign(name, value);
            }
            Stmt::Pass => {}
            Stmt::Break => return Ok(Flow::Break),
            Stmt::Continue => return Ok(Flow::Continue),
        }
        Ok(Flow::Normal)
    }

    fn bind(&mut self, target: &Target, value: Value) -> Result<()> {
        match target {
            Target::Name(name) => {
                self.env.assign(name, value);
                Ok(())
            }
            Target::Tuple(targets) => {
                let items = self.op(value.iter_values())?;
                if items.len() != targets.len() {
                    let message = if items.len() < targets.len() {
                        format!(
                            "not enough values to unpack (expected {}, got {})",
                            targets.len(),
                            items.len()
                        )
                    } else {
                        format!("too many values to unpack (expected {})", targets.len())
                    };
                    return Err(self.fail(RuntimeErrorKind::Value(message)));
                }
                for (target, item) in targets.iter().zip(items) {
                    self.bind(target, item)?;
                }
                Ok(())
            }
        }
    }

    fn exec_block(&mut self, block: &Block) -> Result<Flow> {
        let Some(first) = block.clauses.first() else {
            return Ok(Flow::Normal);
        };
        self.line = first.line;
        match &first.header {
            Header::If(_) => self.exec_if(&block.clauses),
            Header::For(target, iter) => {
                let items = self.eval(iter)?;
                let items = self.op(items.iter_values())?;
                for item in items {
                    self.line = first.line;
                    self.bind(target, item)?;
                    if self.exec_body(&first.body)? == Flow::Break {
                        return Ok(Flow::Normal);
                    }
                }
                self.exec_else(&block.clauses[1..])
            }
            Header::While(cond) => {
                loop {
                    self.line = first.line;
                    if !self.eval(cond)?.is_truthy() {
                        break;
                    }
                    if self.exec_body(&first.body)? == Flow::Break {
                        return Ok(Flow::Normal);
                    }
                }
                self.exec_else(&block.clauses[1..])
            }
            Header::With(expr, name) => {
                let value = self.eval(expr)?;
                if let Some(name) = name {
                    self.env.assign(name, value);
                }
                self.exec_body(&first.body)
            }
            Header::Try => self.exec_try(block),
            header => Err(StplError::generation(
                self.template,
                first.line,
                format!("'{}' cannot start a block", header.keyword()),
            )),
        }
    }

    fn exec_if(&mut self, clauses: &[Clause]) -> Result<Flow> {
        for clause in clauses {
            self.line = clause.line;
            match &clause.header {
                Header::If(cond) | Header::Elif(cond) => {
                    if self.eval(cond)?.is_truthy() {
                        return self.exec_body(&clause.body);
                    }
                }
                _ => return self.exec_body(&clause.body),
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_else(&mut self, rest: &[Clause]) -> Result<Flow> {
        match rest.first() {
            Some(clause) => self.exec_body(&clause.body),
            None => Ok(Flow::Normal),
        }
    }

    fn exec_try(&mut self, block: &Block) -> Result<Flow> {
        let clauses = &block.clauses;
        let handlers = clauses
            .iter()
            .skip(1)
            .filter(|c| matches!(c.header, Header::Except { .. }));
        let else_clause = clauses.iter().find(|c| c.header == Header::Else);
        let finally_clause = clauses.iter().find(|c| c.header == Header::Finally);

        let mut outcome = match self.exec_body(&clauses[0].body) {
            Ok(flow) => match else_clause {
                Some(clause) if flow == Flow::Normal => self.exec_body(&clause.body),
                _ => Ok(flow),
            },
            Err(err) => {
                let mut handled = None;
                for handler in handlers {
                    if let Header::Except { class, name } = &handler.header {
                        if handles(class.as_deref(), &err) {
                            handled = Some((handler, name));
                            break;
                        }
                    }
                }
                match handled {
                    Some((handler, name)) => {
                        if let Some(name) = name {
                            self.env.assign(name, Value::String(error_message(&err)));
                        }
                        self.exec_body(&handler.body)
                    }
                    None => Err(err),
                }
            }
        };

        if let Some(clause) = finally_clause {
            match self.exec_body(&clause.body) {
                Ok(Flow::Normal) => {}
                Ok(flow) => outcome = Ok(flow),
                Err(err) => outcome = Err(err),
            }
        }
        outcome
    }

    fn eval(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Name(name) => self.lookup(name),
            Expr::List(items) | Expr::Tuple(items) => Ok(Value::List(self.eval_all(items)?)),
            Expr::Dict(pairs) => {
                let mut map = BTreeMap::new();
                for (key, value) in pairs {
                    let key = self.eval(key)?.to_text();
                    let value = self.eval(value)?;
                    map.insert(key, value);
                }
                Ok(Value::Map(map))
            }
            Expr::Attr(obj, name) => {
                let value = self.eval(obj)?;
                self.op(value.get(name).cloned())
            }
            Expr::Index(obj, index) => {
                let value = self.eval(obj)?;
                let index = self.eval(index)?;
                self.op(value.index(&index))
            }
            Expr::Slice {
                target,
                lower,
                upper,
                step,
            } => {
                let target = self.eval(target)?;
                let lower = self.eval_opt(lower.as_deref())?;
                let upper = self.eval_opt(upper.as_deref())?;
                let step = self.eval_opt(step.as_deref())?;
                self.op(ops::slice(
                    &target,
                    lower.as_ref(),
                    upper.as_ref(),
                    step.as_ref(),
                ))
            }
            Expr::Call { func, args, kwargs } => self.call(func, args, kwargs),
            Expr::Unary(op, operand) => {
                let value = self.eval(operand)?;
                self.op(ops::unary(*op, &value))
            }
            Expr::Binary(op, left, right) => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                self.op(ops::binary(*op, &left, &right))
            }
            Expr::Compare(first, rest) => {
                let mut left = self.eval(first)?;
                for (op, right) in rest {
                    let right = self.eval(right)?;
                    if !self.op(ops::compare(*op, &left, &right))? {
                        return Ok(Value::Bool(false));
                    }
                    left = right;
                }
                Ok(Value::Bool(true))
            }
            Expr::And(left, right) => {
                let left = self.eval(left)?;
                if !left.is_truthy() {
                    return Ok(left);
                }
                self.eval(right)
            }
            Expr::Or(left, right) => {
                let left = self.eval(left)?;
                if left.is_truthy() {
                    return Ok(left);
                }
                self.eval(right)
            }
            Expr::Not(operand) => Ok(Value::Bool(!self.eval(operand)?.is_truthy())),
            Expr::IfElse {
                cond,
                then,
                otherwise,
            } => {
                if self.eval(cond)?.is_truthy() {
                    self.eval(then)
                } else {
                    self.eval(otherwise)
                }
            }
            Expr::ListComp {
                element,
                target,
                iter,
                conds,
            } => {
                let items = self.eval(iter)?;
                let items = self.op(items.iter_values())?;
                self.env.push_scope();
                let result = self.comprehension(element, target, items, conds);
                self.env.pop_scope();
                result
            }
        }
    }

    fn eval_all(&mut self, exprs: &[Expr]) -> Result<Vec<Value>> {
        exprs.iter().map(|expr| self.eval(expr)).collect()
    }

    fn eval_opt(&mut self, expr: Option<&Expr>) -> Result<Option<Value>> {
        expr.map(|expr| self.eval(expr)).transpose()
    }

    fn comprehension(
        &mut self,
        element: &Expr,
        target: &Target,
        items: Vec<Value>,
        conds: &[Expr],
    ) -> Result<Value> {
        let mut out = Vec::new();
        'items: for item in items {
            self.bind(target, item)?;
            for cond in conds {
                if !self.eval(cond)?.is_truthy() {
                    continue 'items;
                }
            }
            out.push(self.eval(element)?);
        }
        Ok(Value::List(out))
    }

    fn lookup(&self, name: &str) -> Result<Value> {
        if is_helper(name) || (!self.env.contains(name) && builtins::is_builtin(name)) {
            return Err(self.fail(RuntimeErrorKind::Type(format!(
                "function '{}' can only be called",
                name
            ))));
        }
        match self.env.lookup(name) {
            Some(value) => Ok(value.clone()),
            None => Err(self.fail(RuntimeErrorKind::UndefinedVariable(name.to_string()))),
        }
    }

    fn call(&mut self, func: &Expr, args: &[Expr], kwargs: &[(String, Expr)]) -> Result<Value> {
        let (receiver, function) = match func {
            Expr::Name(name) => (None, name.as_str()),
            Expr::Attr(obj, method) => (Some(self.eval(obj)?), method.as_str()),
            other => {
                let value = self.eval(other)?;
                return Err(self.fail(RuntimeErrorKind::Type(format!(
                    "'{}' object is not callable",
                    value.type_name()
                ))));
            }
        };

        let positional = self.eval_all(args)?;
        let mut keywords = Vec::with_capacity(kwargs.len());
        for (key, expr) in kwargs {
            keywords.push((key.clone(), self.eval(expr)?));
        }
        let args = Args::new(function, positional, keywords);

        if let Some(receiver) = receiver {
            return self.op(methods::call(&receiver, function, args));
        }
        if is_helper(function) {
            return self.call_helper(function, args).map_err(|failure| match failure {
                Failure::Kind(kind) => self.fail(kind),
                Failure::Located(err) => err,
            });
        }
        if let Some(value) = self.env.lookup(function) {
            return Err(self.fail(RuntimeErrorKind::Type(format!(
                "'{}' object is not callable",
                value.type_name()
            ))));
        }
        if builtins::is_builtin(function) {
            return self.op(builtins::call(function, args));
        }
        Err(self.fail(RuntimeErrorKind::UnknownFunction(function.to_string())))
    }

    fn call_helper(&mut self, name: &str, mut args: Args) -> std::result::Result<Value, Failure> {
        match name {
            "_escape" | "_str" => {
                args.expect(1, 1)?;
                let conversion = if name == ESCAPE_FN {
                    Conversion::Escape
                } else {
                    Conversion::Str
                };
                Ok(Value::String(self.convert(&args.positional[0], conversion)))
            }
            "html_escape" => {
                args.expect(1, 1)?;
                let text = args.positional[0].to_text();
                Ok(Value::String(encode_quoted_attribute(&text).into_owned()))
            }
            "get" | "setdefault" => {
                let keyword_default = args.keyword("default");
                args.expect(1, 2)?;
                let key = args.str(0)?.to_string();
                let default = args
                    .get(1)
                    .cloned()
                    .or(keyword_default)
                    .unwrap_or_default();
                match self.env.lookup(&key) {
                    Some(value) => Ok(value.clone()),
                    None => {
                        if name == "setdefault" {
                            self.env.assign(&key, default.clone());
                        }
                        Ok(default)
                    }
                }
            }
            "defined" => {
                args.expect(1, 1)?;
                let key = args.str(0)?;
                Ok(Value::Bool(self.env.contains(key) || is_helper(key)))
            }
            "include" => {
                if args.positional.len() != 1 {
                    return Err(args
                        .bad(format!(
                            "expected a template name and keyword arguments, got {} positional argument(s)",
                            args.positional.len()
                        ))
                        .into());
                }
                let target = args.str(0)?.to_string();
                let vars: BTreeMap<String, Value> = args.into_keywords().into_iter().collect();
                Ok(Value::String(self.resolver.include(&target, vars)?))
            }
            "http_get" | "local_http_get" => {
                args.expect(1, 1)?;
                let location = args.str(0)?;
                let fetched = if name == "http_get" {
                    self.resolver.http_get(location)
                } else {
                    self.resolver.local_http_get(location)
                };
                fetched.map(Value::String).map_err(|err| {
                    warn!(template = %self.template, line = self.line, "{}", err);
                    Failure::Kind(RuntimeErrorKind::Host(err))
                })
            }
            other => Err(RuntimeErrorKind::UnknownFunction(other.to_string()).into()),
        }
    }
}

/// Exception class a failure is reported as inside `try` blocks
fn exception_class(err: &StplError) -> &'static str {
    match err {
        StplError::Runtime { kind, .. } => match kind {
            RuntimeErrorKind::UndefinedVariable(_) | RuntimeErrorKind::UnknownFunction(_) => {
                "NameError"
            }
            RuntimeErrorKind::NotFound(_) => "KeyError",
            RuntimeErrorKind::IndexOutOfRange { .. } => "IndexError",
            RuntimeErrorKind::Type(_) | RuntimeErrorKind::BadArguments { .. } => "TypeError",
            RuntimeErrorKind::UnknownMethod { .. } => "AttributeError",
            RuntimeErrorKind::DivisionByZero => "ZeroDivisionError",
            RuntimeErrorKind::Value(_) => "ValueError",
            RuntimeErrorKind::IncludeDepth(_) => "RecursionError",
            RuntimeErrorKind::Host(_) => "IOError",
        },
        StplError::Syntax { .. } | StplError::Generation { .. } => "SyntaxError",
        StplError::Io(_) => "IOError",
        _ => "Exception",
    }
}

fn handles(class: Option<&str>, err: &StplError) -> bool {
    let actual = exception_class(err);
    match class {
        None | Some("Exception") => true,
        Some("LookupError") => matches!(actual, "KeyError" | "IndexError"),
        Some("OSError") => actual == "IOError",
        // missing map keys read through attribute access
        Some("AttributeError") => matches!(actual, "AttributeError" | "KeyError"),
        Some(class) => class == actual,
    }
}

fn error_message(err: &StplError) -> String {
    match err {
        StplError::Runtime { kind, .. } => kind.to_string(),
        other => other.to_string(),
    }
}
