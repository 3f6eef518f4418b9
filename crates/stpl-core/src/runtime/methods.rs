//! Methods on strings, lists and maps

use super::args::Args;
use crate::error::RuntimeErrorKind;
use crate::value::Value;

type OpResult<T> = Result<T, RuntimeErrorKind>;

pub(crate) fn call(receiver: &Value, method: &str, args: Args) -> OpResult<Value> {
    match receiver {
        Value::String(s) => string_method(s, method, args),
        Value::List(items) => list_method(items, method, args),
        Value::Map(map) => map_method(map, method, args),
        other => Err(unknown(other.type_name(), method)),
    }
}

fn unknown(type_name: &str, method: &str) -> RuntimeErrorKind {
    RuntimeErrorKind::UnknownMethod {
        type_name: type_name.to_string(),
        method: method.to_string(),
    }
}

fn text(t: String) -> OpResult<Value> {
    Ok(Value::String(t))
}

fn string_method(s: &str, method: &str, args: Args) -> OpResult<Value> {
    match method {
        "upper" => {
            args.expect(0, 0)?;
            text(s.to_uppercase())
        }
        "lower" => {
            args.expect(0, 0)?;
            text(s.to_lowercase())
        }
        "title" => {
            args.expect(0, 0)?;
            text(title_case(s))
        }
        "capitalize" => {
            args.expect(0, 0)?;
            let mut chars = s.chars();
            text(match chars.next() {
                Some(first) => {
                    let rest = chars.as_str().to_lowercase();
                    first.to_uppercase().chain(rest.chars()).collect()
                }
                None => String::new(),
            })
        }
        "strip" | "lstrip" | "rstrip" => {
            args.expect(0, 1)?;
            let set: Option<Vec<char>> = match args.get(0) {
                None | Some(Value::Null) => None,
                Some(_) => Some(args.str(0)?.chars().collect()),
            };
            let matches = |c: char| match &set {
                Some(set) => set.contains(&c),
                None => c.is_whitespace(),
            };
            text(match method {
                "strip" => s.trim_matches(matches),
                "lstrip" => s.trim_start_matches(matches),
                _ => s.trim_end_matches(matches),
            }
            .to_string())
        }
        "startswith" | "endswith" => {
            args.expect(1, 1)?;
            let candidates = match &args.positional[0] {
                Value::List(items) => items.clone(),
                single => vec![single.clone()],
            };
            let mut found = false;
            for candidate in &candidates {
                let affix = candidate
                    .as_str()
                    .ok_or_else(|| args.bad("argument must be a string or a list of strings"))?;
                found |= if method == "startswith" {
                    s.starts_with(affix)
                } else {
                    s.ends_with(affix)
                };
            }
            Ok(Value::Bool(found))
        }
        "replace" => {
            args.expect(2, 3)?;
            let (old, new) = (args.str(0)?, args.str(1)?);
            if args.positional.len() == 3 {
                let count = usize::try_from(args.int(2)?).unwrap_or(usize::MAX);
                text(s.replacen(old, new, count))
            } else {
                text(s.replace(old, new))
            }
        }
        "split" => {
            args.expect(0, 2)?;
            let limit = match args.get(1) {
                Some(_) => usize::try_from(args.int(1)?).ok(),
                None => None,
            };
            let parts: Vec<String> = match args.get(0) {
                None | Some(Value::Null) => split_whitespace(s, limit),
                Some(_) => {
                    let sep = args.str(0)?;
                    if sep.is_empty() {
                        return Err(RuntimeErrorKind::Value("empty separator".to_string()));
                    }
                    match limit {
                        Some(limit) => s.splitn(limit + 1, sep).map(str::to_string).collect(),
                        None => s.split(sep).map(str::to_string).collect(),
                    }
                }
            };
            Ok(Value::List(parts.into_iter().map(Value::String).collect()))
        }
        "join" => {
            args.expect(1, 1)?;
            let items = args.positional[0].iter_values()?;
            let mut pieces = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                match item {
                    Value::String(piece) => pieces.push(piece.as_str()),
                    other => {
                        return Err(RuntimeErrorKind::Type(format!(
                            "sequence item {}: expected str instance, {} found",
                            i,
                            other.type_name()
                        )))
                    }
                }
            }
            text(pieces.join(s))
        }
        "find" => {
            args.expect(1, 1)?;
            let needle = args.str(0)?;
            Ok(Value::from(
                s.find(needle)
                    .map_or(-1, |byte| s[..byte].chars().count() as i64),
            ))
        }
        "count" => {
            args.expect(1, 1)?;
            let needle = args.str(0)?;
            Ok(Value::from(if needle.is_empty() {
                s.chars().count() + 1
            } else {
                s.matches(needle).count()
            }))
        }
        _ => Err(unknown("str", method)),
    }
}

fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

fn split_whitespace(s: &str, limit: Option<usize>) -> Vec<String> {
    let Some(limit) = limit else {
        return s.split_whitespace().map(str::to_string).collect();
    };
    let mut parts = Vec::new();
    let mut rest = s.trim_start();
    while !rest.is_empty() {
        if parts.len() == limit {
            parts.push(rest.to_string());
            break;
        }
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        parts.push(rest[..end].to_string());
        rest = rest[end..].trim_start();
    }
    parts
}

fn list_method(items: &[Value], method: &str, args: Args) -> OpResult<Value> {
    match method {
        "index" => {
            args.expect(1, 1)?;
            let wanted = &args.positional[0];
            items
                .iter()
                .position(|item| item.loose_eq(wanted))
                .map(Value::from)
                .ok_or_else(|| {
                    RuntimeErrorKind::Value(format!("{} is not in list", wanted.repr()))
                })
        }
        "count" => {
            args.expect(1, 1)?;
            let wanted = &args.positional[0];
            Ok(Value::from(
                items.iter().filter(|item| item.loose_eq(wanted)).count(),
            ))
        }
        _ => Err(unknown("list", method)),
    }
}

fn map_method(
    map: &std::collections::BTreeMap<String, Value>,
    method: &str,
    mut args: Args,
) -> OpResult<Value> {
    match method {
        "get" => {
            let keyword_default = args.keyword("default");
            args.expect(1, 2)?;
            let key = args.positional[0].to_text();
            let default = args.get(1).cloned().or(keyword_default).unwrap_or_default();
            Ok(map.get(&key).cloned().unwrap_or(default))
        }
        "keys" => {
            args.expect(0, 0)?;
            Ok(Value::List(map.keys().cloned().map(Value::String).collect()))
        }
        "values" => {
            args.expect(0, 0)?;
            Ok(Value::List(map.values().cloned().collect()))
        }
        "items" => {
            args.expect(0, 0)?;
            Ok(Value::List(
                map.iter()
                    .map(|(k, v)| Value::List(vec![Value::String(k.clone()), v.clone()]))
                    .collect(),
            ))
        }
        _ => Err(unknown("dict", method)),
    }
}
