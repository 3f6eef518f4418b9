//! Operators over [`Value`]

use crate::config::consts::limits::MAX_REPEAT_LEN;
use crate::error::RuntimeErrorKind;
use crate::script::ast::{BinOp, CmpOp, UnaryOp};
use crate::value::{Number, Value};

type OpResult<T> = Result<T, RuntimeErrorKind>;

fn symbol(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        BinOp::FloorDiv => "//",
        BinOp::Mod => "%",
        BinOp::Pow => "**",
    }
}

fn unsupported(op: BinOp, left: &Value, right: &Value) -> RuntimeErrorKind {
    RuntimeErrorKind::Type(format!(
        "unsupported operand type(s) for {}: '{}' and '{}'",
        symbol(op),
        left.type_name(),
        right.type_name()
    ))
}

fn overflow() -> RuntimeErrorKind {
    RuntimeErrorKind::Value("integer overflow".to_string())
}

/// Truncate a float toward zero, failing outside the `i64` range
pub(crate) fn float_to_int(x: f64) -> OpResult<i64> {
    let truncated = x.trunc();
    if truncated >= i64::MIN as f64 && truncated < i64::MAX as f64 {
        Ok(truncated as i64)
    } else {
        Err(overflow())
    }
}

fn too_long() -> RuntimeErrorKind {
    RuntimeErrorKind::Value(format!("result longer than {} items", MAX_REPEAT_LEN))
}

/// Repeat count for `unit` items, capped at [`MAX_REPEAT_LEN`] total
fn repeat_count(unit: usize, times: i64) -> OpResult<usize> {
    let times = usize::try_from(times).unwrap_or(0);
    if unit == 0 {
        return Ok(0);
    }
    match unit.checked_mul(times) {
        Some(len) if len <= MAX_REPEAT_LEN => Ok(times),
        _ => Err(too_long()),
    }
}

pub(crate) fn binary(op: BinOp, left: &Value, right: &Value) -> OpResult<Value> {
    match (op, left, right) {
        (BinOp::Add, Value::String(a), Value::String(b)) => Ok(Value::String(format!("{}{}", a, b))),
        (BinOp::Add, Value::List(a), Value::List(b)) => {
            Ok(Value::List(a.iter().chain(b).cloned().collect()))
        }
        (BinOp::Mul, Value::String(s), Value::Number(Number::Int(n)))
        | (BinOp::Mul, Value::Number(Number::Int(n)), Value::String(s)) => {
            Ok(Value::String(s.repeat(repeat_count(s.len(), *n)?)))
        }
        (BinOp::Mul, Value::List(items), Value::Number(Number::Int(n)))
        | (BinOp::Mul, Value::Number(Number::Int(n)), Value::List(items)) => {
            let times = repeat_count(items.len(), *n)?;
            Ok(Value::List(
                std::iter::repeat(items.iter().cloned())
                    .take(times)
                    .flatten()
                    .collect(),
            ))
        }
        (BinOp::Mod, Value::String(format), args) => percent_format(format, args),
        _ => {
            let (Some(a), Some(b)) = (left.as_number(), right.as_number()) else {
                return Err(unsupported(op, left, right));
            };
            arithmetic(op, a, b).map(Value::Number)
        }
    }
}

fn arithmetic(op: BinOp, a: Number, b: Number) -> OpResult<Number> {
    if let (Number::Int(x), Number::Int(y)) = (a, b) {
        return int_arithmetic(op, x, y);
    }
    let (x, y) = (a.as_f64(), b.as_f64());
    let result = match op {
        BinOp::Add => x + y,
        BinOp::Sub => x - y,
        BinOp::Mul => x * y,
        BinOp::Div | BinOp::FloorDiv | BinOp::Mod if y == 0.0 => {
            return Err(RuntimeErrorKind::DivisionByZero)
        }
        BinOp::Div => x / y,
        BinOp::FloorDiv => (x / y).floor(),
        BinOp::Mod => x - y * (x / y).floor(),
        BinOp::Pow if x == 0.0 && y < 0.0 => return Err(RuntimeErrorKind::DivisionByZero),
        BinOp::Pow => x.powf(y),
    };
    Ok(Number::Float(result))
}

fn int_arithmetic(op: BinOp, x: i64, y: i64) -> OpResult<Number> {
    if y == 0 && matches!(op, BinOp::Div | BinOp::FloorDiv | BinOp::Mod) {
        return Err(RuntimeErrorKind::DivisionByZero);
    }
    let result = match op {
        BinOp::Add => x.checked_add(y),
        BinOp::Sub => x.checked_sub(y),
        BinOp::Mul => x.checked_mul(y),
        BinOp::Div => return Ok(Number::Float(x as f64 / y as f64)),
        BinOp::FloorDiv => x.checked_div(y).map(|q| {
            if (x % y != 0) && ((x < 0) != (y < 0)) {
                q - 1
            } else {
                q
            }
        }),
        BinOp::Mod => x.checked_rem(y).map(|r| {
            if r != 0 && ((r < 0) != (y < 0)) {
                r + y
            } else {
                r
            }
        }),
        BinOp::Pow if y < 0 => {
            if x == 0 {
                return Err(RuntimeErrorKind::DivisionByZero);
            }
            return Ok(Number::Float((x as f64).powf(y as f64)));
        }
        BinOp::Pow => u32::try_from(y).ok().and_then(|exp| x.checked_pow(exp)),
    };
    result.map(Number::Int).ok_or_else(overflow)
}

pub(crate) fn unary(op: UnaryOp, value: &Value) -> OpResult<Value> {
    let Some(number) = value.as_number() else {
        return Err(RuntimeErrorKind::Type(format!(
            "bad operand type for unary {}: '{}'",
            if op == UnaryOp::Neg { "-" } else { "+" },
            value.type_name()
        )));
    };
    let result = match (op, number) {
        (UnaryOp::Pos, n) => n,
        (UnaryOp::Neg, Number::Int(n)) => Number::Int(n.checked_neg().ok_or_else(overflow)?),
        (UnaryOp::Neg, Number::Float(x)) => Number::Float(-x),
    };
    Ok(Value::Number(result))
}

pub(crate) fn compare(op: CmpOp, left: &Value, right: &Value) -> OpResult<bool> {
    use std::cmp::Ordering::{Greater, Less};

    Ok(match op {
        CmpOp::Eq => left.loose_eq(right),
        CmpOp::NotEq => !left.loose_eq(right),
        CmpOp::Lt => left.compare(right)? == Less,
        CmpOp::Le => left.compare(right)? != Greater,
        CmpOp::Gt => left.compare(right)? == Greater,
        CmpOp::Ge => left.compare(right)? != Less,
        CmpOp::In => contains(right, left)?,
        CmpOp::NotIn => !contains(right, left)?,
        CmpOp::Is => identical(left, right),
        CmpOp::IsNot => !identical(left, right),
    })
}

/// `is`: singletons by identity, everything else by type and value
fn identical(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Null | Value::Bool(_), _) | (_, Value::Null | Value::Bool(_)) => false,
        _ => left.type_name() == right.type_name() && left.loose_eq(right),
    }
}

pub(crate) fn contains(container: &Value, item: &Value) -> OpResult<bool> {
    match container {
        Value::String(haystack) => match item {
            Value::String(needle) => Ok(haystack.contains(needle.as_str())),
            other => Err(RuntimeErrorKind::Type(format!(
                "'in <string>' requires string as left operand, not {}",
                other.type_name()
            ))),
        },
        Value::List(items) => Ok(items.iter().any(|x| x.loose_eq(item))),
        Value::Map(map) => Ok(map.contains_key(&item.to_text())),
        other => Err(RuntimeErrorKind::Type(format!(
            "argument of type '{}' is not iterable",
            other.type_name()
        ))),
    }
}

fn slice_bound(value: Option<&Value>) -> OpResult<Option<i64>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v) => match v.as_number() {
            Some(Number::Int(i)) => Ok(Some(i)),
            _ => Err(RuntimeErrorKind::Type(
                "slice indices must be integers or None".to_string(),
            )),
        },
    }
}

/// Positions selected by `[lower:upper:step]` over a sequence of `len`
fn slice_positions(
    len: usize,
    lower: Option<i64>,
    upper: Option<i64>,
    step: i64,
) -> Vec<usize> {
    let n = len as i64;
    let clamp = |bound: i64, low: i64, high: i64| {
        let bound = if bound < 0 { bound + n } else { bound };
        bound.clamp(low, high)
    };

    let mut positions = Vec::new();
    if step > 0 {
        let mut i = lower.map_or(0, |b| clamp(b, 0, n));
        let stop = upper.map_or(n, |b| clamp(b, 0, n));
        while i < stop {
            positions.push(i as usize);
            i += step;
        }
    } else {
        let mut i = lower.map_or(n - 1, |b| clamp(b, -1, n - 1));
        let stop = upper.map_or(-1, |b| clamp(b, -1, n - 1));
        while i > stop {
            positions.push(i as usize);
            i += step;
        }
    }
    positions
}

pub(crate) fn slice(
    target: &Value,
    lower: Option<&Value>,
    upper: Option<&Value>,
    step: Option<&Value>,
) -> OpResult<Value> {
    let step = slice_bound(step)?.unwrap_or(1);
    if step == 0 {
        return Err(RuntimeErrorKind::Value(
            "slice step cannot be zero".to_string(),
        ));
    }
    let (lower, upper) = (slice_bound(lower)?, slice_bound(upper)?);
    match target {
        Value::List(items) => Ok(Value::List(
            slice_positions(items.len(), lower, upper, step)
                .into_iter()
                .map(|i| items[i].clone())
                .collect(),
        )),
        Value::String(s) => {
            let chars: Vec<char> = s.chars().collect();
            Ok(Value::String(
                slice_positions(chars.len(), lower, upper, step)
                    .into_iter()
                    .map(|i| chars[i])
                    .collect(),
            ))
        }
        other => Err(RuntimeErrorKind::Type(format!(
            "'{}' object is not subscriptable",
            other.type_name()
        ))),
    }
}

/// `"%s: %d" % (name, count)`
fn percent_format(format: &str, args: &Value) -> OpResult<Value> {
    let args: Vec<Value> = match args {
        Value::List(items) => items.clone(),
        single => vec![single.clone()],
    };
    let mut args = args.into_iter();
    let mut out = String::with_capacity(format.len());
    let mut chars = format.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let mut left_align = false;
        let mut zero_pad = false;
        while let Some(&flag) = chars.peek() {
            match flag {
                '-' => left_align = true,
                '0' => zero_pad = true,
                _ => break,
            }
            chars.next();
        }
        let mut width = 0usize;
        while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
            width = width.saturating_mul(10).saturating_add(d as usize);
            chars.next();
        }
        if width > MAX_REPEAT_LEN {
            return Err(too_long());
        }
        let mut precision = None;
        if chars.peek() == Some(&'.') {
            chars.next();
            let mut p = 0usize;
            while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
                p = p.saturating_mul(10).saturating_add(d as usize);
                chars.next();
            }
            if p > MAX_REPEAT_LEN {
                return Err(too_long());
            }
            precision = Some(p);
        }

        let conversion = chars.next().ok_or_else(|| {
            RuntimeErrorKind::Value("incomplete format".to_string())
        })?;
        if conversion == '%' {
            out.push('%');
            continue;
        }
        let arg = args.next().ok_or_else(|| {
            RuntimeErrorKind::Type("not enough arguments for format string".to_string())
        })?;
        let numeric = || {
            arg.as_number().ok_or_else(|| {
                RuntimeErrorKind::Type(format!(
                    "%{} format: a number is required, not {}",
                    conversion,
                    arg.type_name()
                ))
            })
        };
        let text = match conversion {
            's' => arg.to_text(),
            'r' => arg.repr(),
            'd' | 'i' => match numeric()? {
                Number::Int(n) => n.to_string(),
                Number::Float(x) => float_to_int(x)?.to_string(),
            },
            'f' => format!("{:.*}", precision.unwrap_or(6), numeric()?.as_f64()),
            'x' => match numeric()? {
                Number::Int(n) => format!("{:x}", n),
                Number::Float(_) => {
                    return Err(RuntimeErrorKind::Type(
                        "%x format: an integer is required".to_string(),
                    ))
                }
            },
            other => {
                return Err(RuntimeErrorKind::Value(format!(
                    "unsupported format character '{}'",
                    other
                )))
            }
        };
        let text = match (conversion, precision) {
            ('s' | 'r', Some(p)) => text.chars().take(p).collect(),
            _ => text,
        };

        let pad = width.saturating_sub(text.chars().count());
        if left_align {
            out.push_str(&text);
            out.push_str(&" ".repeat(pad));
        } else if zero_pad && matches!(conversion, 'd' | 'i' | 'f' | 'x') {
            let (sign, digits) = match text.strip_prefix('-') {
                Some(digits) => ("-", digits),
                None => ("", text.as_str()),
            };
            out.push_str(sign);
            out.push_str(&"0".repeat(pad));
            out.push_str(digits);
        } else {
            out.push_str(&" ".repeat(pad));
            out.push_str(&text);
        }
    }

    if args.next().is_some() {
        return Err(RuntimeErrorKind::Type(
            "not all arguments converted during string formatting".to_string(),
        ));
    }
    Ok(Value::String(out))
}
