//! Builtin functions

use std::cmp::Ordering;

use super::args::Args;
use super::ops;
use crate::config::consts::limits::MAX_RANGE_LEN;
use crate::error::RuntimeErrorKind;
use crate::script::ast::BinOp;
use crate::value::{Number, Value};

type OpResult<T> = Result<T, RuntimeErrorKind>;

const BUILTINS: &[&str] = &[
    "len", "str", "int", "float", "bool", "range", "enumerate", "sorted", "reversed", "min",
    "max", "abs", "sum", "zip", "list", "repr",
];

pub(crate) fn is_builtin(name: &str) -> bool {
    BUILTINS.contains(&name)
}

pub(crate) fn call(name: &str, mut args: Args) -> OpResult<Value> {
    match name {
        "len" => {
            args.expect(1, 1)?;
            len(&args.positional[0]).map(Value::from)
        }
        "str" => {
            args.expect(0, 1)?;
            Ok(Value::String(
                args.get(0).map(Value::to_text).unwrap_or_default(),
            ))
        }
        "repr" => {
            args.expect(1, 1)?;
            Ok(Value::String(args.positional[0].repr()))
        }
        "bool" => {
            args.expect(0, 1)?;
            Ok(Value::Bool(args.get(0).is_some_and(Value::is_truthy)))
        }
        "int" => {
            args.expect(0, 1)?;
            args.get(0).map_or(Ok(Value::from(0)), to_int)
        }
        "float" => {
            args.expect(0, 1)?;
            args.get(0).map_or(Ok(Value::from(0.0)), to_float)
        }
        "abs" => {
            args.expect(1, 1)?;
            match args.positional[0].as_number() {
                Some(Number::Int(n)) => n
                    .checked_abs()
                    .map(Value::from)
                    .ok_or_else(|| RuntimeErrorKind::Value("integer overflow".to_string())),
                Some(Number::Float(x)) => Ok(Value::from(x.abs())),
                None => Err(RuntimeErrorKind::Type(format!(
                    "bad operand type for abs(): '{}'",
                    args.positional[0].type_name()
                ))),
            }
        }
        "range" => range(&args),
        "list" => {
            args.expect(0, 1)?;
            match args.get(0) {
                Some(value) => value.iter_values().map(Value::List),
                None => Ok(Value::List(Vec::new())),
            }
        }
        "reversed" => {
            args.expect(1, 1)?;
            let mut items = args.positional[0].iter_values()?;
            items.reverse();
            Ok(Value::List(items))
        }
        "enumerate" => {
            let start = match args.keyword("start") {
                Some(value) => value.as_number().and_then(|n| match n {
                    Number::Int(i) => Some(i),
                    Number::Float(_) => None,
                }),
                None => Some(0),
            };
            let start = start.ok_or_else(|| args.bad("start must be an integer"))?;
            args.expect(1, 2)?;
            let start = if args.positional.len() == 2 {
                args.int(1)?
            } else {
                start
            };
            let items = args.positional[0].iter_values()?;
            Ok(Value::List(
                items
                    .into_iter()
                    .zip(start..)
                    .map(|(item, i)| Value::List(vec![Value::from(i), item]))
                    .collect(),
            ))
        }
        "sorted" => {
            let reverse = args.keyword("reverse").is_some_and(|v| v.is_truthy());
            args.expect(1, 1)?;
            let mut items = args.positional[0].iter_values()?;
            sort_values(&mut items)?;
            if reverse {
                items.reverse();
            }
            Ok(Value::List(items))
        }
        "min" | "max" => extreme(name, &args),
        "sum" => {
            let start = args.keyword("start");
            args.expect(1, 2)?;
            let mut total = args
                .positional
                .get(1)
                .cloned()
                .or(start)
                .unwrap_or(Value::from(0));
            for item in args.positional[0].iter_values()? {
                total = ops::binary(BinOp::Add, &total, &item)?;
            }
            Ok(total)
        }
        "zip" => {
            args.expect(0, usize::MAX)?;
            let columns = args
                .positional
                .iter()
                .map(Value::iter_values)
                .collect::<OpResult<Vec<_>>>()?;
            let rows = columns.iter().map(Vec::len).min().unwrap_or(0);
            Ok(Value::List(
                (0..rows)
                    .map(|i| Value::List(columns.iter().map(|c| c[i].clone()).collect()))
                    .collect(),
            ))
        }
        other => Err(RuntimeErrorKind::UnknownFunction(other.to_string())),
    }
}

fn len(value: &Value) -> OpResult<usize> {
    match value {
        Value::String(s) => Ok(s.chars().count()),
        Value::List(items) => Ok(items.len()),
        Value::Map(map) => Ok(map.len()),
        other => Err(RuntimeErrorKind::Type(format!(
            "object of type '{}' has no len()",
            other.type_name()
        ))),
    }
}

fn to_int(value: &Value) -> OpResult<Value> {
    match value {
        Value::String(s) => s
            .trim()
            .replace('_', "")
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| {
                RuntimeErrorKind::Value(format!(
                    "invalid literal for int() with base 10: {}",
                    value.repr()
                ))
            }),
        other => match other.as_number() {
            Some(Number::Int(n)) => Ok(Value::from(n)),
            Some(Number::Float(x)) if x.is_finite() => ops::float_to_int(x).map(Value::from),
            Some(Number::Float(x)) => Err(RuntimeErrorKind::Value(format!(
                "cannot convert float {} to integer",
                Number::Float(x)
            ))),
            None => Err(RuntimeErrorKind::Type(format!(
                "int() argument must be a string or a number, not '{}'",
                other.type_name()
            ))),
        },
    }
}

fn to_float(value: &Value) -> OpResult<Value> {
    match value {
        Value::String(s) => s.trim().parse::<f64>().map(Value::from).map_err(|_| {
            RuntimeErrorKind::Value(format!(
                "could not convert string to float: {}",
                value.repr()
            ))
        }),
        other => other
            .as_number()
            .map(|n| Value::from(n.as_f64()))
            .ok_or_else(|| {
                RuntimeErrorKind::Type(format!(
                    "float() argument must be a string or a number, not '{}'",
                    other.type_name()
                ))
            }),
    }
}

fn range(args: &Args) -> OpResult<Value> {
    args.expect(1, 3)?;
    let (start, stop, step) = match args.positional.len() {
        1 => (0, args.int(0)?, 1),
        2 => (args.int(0)?, args.int(1)?, 1),
        _ => (args.int(0)?, args.int(1)?, args.int(2)?),
    };
    if step == 0 {
        return Err(RuntimeErrorKind::Value(
            "range() arg 3 must not be zero".to_string(),
        ));
    }

    let (start, stop, step) = (i128::from(start), i128::from(stop), i128::from(step));
    let len = if step > 0 && start < stop {
        (stop - start + step - 1) / step
    } else if step < 0 && start > stop {
        (start - stop - step - 1) / -step
    } else {
        0
    };
    if len > i128::from(MAX_RANGE_LEN) {
        return Err(RuntimeErrorKind::Value(format!(
            "range() of {} items exceeds the limit of {}",
            len, MAX_RANGE_LEN
        )));
    }
    Ok(Value::List(
        (0..len)
            .map(|i| Value::from((start + i * step) as i64))
            .collect(),
    ))
}

/// Stable sort that reports the first incomparable pair
pub(crate) fn sort_values(items: &mut [Value]) -> OpResult<()> {
    let mut failure = None;
    items.sort_by(|a, b| match a.compare(b) {
        Ok(ordering) => ordering,
        Err(err) => {
            failure.get_or_insert(err);
            Ordering::Equal
        }
    });
    match failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn extreme(name: &str, args: &Args) -> OpResult<Value> {
    args.expect(1, usize::MAX)?;
    let items = if args.positional.len() == 1 {
        args.positional[0].iter_values()?
    } else {
        args.positional.clone()
    };
    let wanted = if name == "min" {
        Ordering::Less
    } else {
        Ordering::Greater
    };

    let mut items = items.into_iter();
    let mut best = items
        .next()
        .ok_or_else(|| RuntimeErrorKind::Value(format!("{}() arg is an empty sequence", name)))?;
    for item in items {
        if item.compare(&best)? == wanted {
            best = item;
        }
    }
    Ok(best)
}
