//! Function tables bound into the evaluator

use std::cmp::Ordering;

use serde_json::{Number, Value};

use crate::capability::Builtin;
use crate::error::{ExprError, Result};
use crate::value::{render_text, truthy, type_name};

/// Upper bound on sequences built by `range`.
const MAX_RANGE: i64 = 100_000;

pub(crate) const PURE: &[(&str, Builtin)] = &[
    ("len", len),
    ("str", to_str),
    ("int", to_int),
    ("float", to_float),
    ("bool", to_bool),
    ("abs", abs),
    ("min", min),
    ("max", max),
    ("round", round),
    ("floor", floor),
    ("ceil", ceil),
    ("sum", sum),
    ("upper", upper),
    ("lower", lower),
    ("trim", trim),
    ("join", join),
    ("split", split),
    ("replace", replace),
    ("keys", keys),
    ("values", values),
    ("range", range),
    ("type", type_of),
];

pub(crate) const AMBIENT: &[(&str, Builtin)] = &[
    ("read_file", read_file),
    ("env", env),
    ("path_exists", path_exists),
    ("cwd", cwd),
];

// ============================================================================
// Argument helpers
// ============================================================================

fn arity<'a, const N: usize>(name: &str, args: &'a [Value]) -> Result<&'a [Value; N]> {
    <&[Value; N]>::try_from(args).map_err(|_| {
        ExprError::type_error(format!(
            "{}() takes {} argument{}, got {}",
            name,
            N,
            if N == 1 { "" } else { "s" },
            args.len()
        ))
    })
}

fn expect_str<'a>(name: &str, value: &'a Value) -> Result<&'a str> {
    value.as_str().ok_or_else(|| {
        ExprError::type_error(format!(
            "{}() expects a string, got {}",
            name,
            type_name(value)
        ))
    })
}

fn expect_number(name: &str, value: &Value) -> Result<f64> {
    value.as_f64().ok_or_else(|| {
        ExprError::type_error(format!(
            "{}() expects a number, got {}",
            name,
            type_name(value)
        ))
    })
}

fn expect_int(name: &str, value: &Value) -> Result<i64> {
    value.as_i64().ok_or_else(|| {
        ExprError::type_error(format!(
            "{}() expects an int, got {}",
            name,
            type_name(value)
        ))
    })
}

pub(crate) fn float_value(f: f64) -> Result<Value> {
    Number::from_f64(f)
        .map(Value::Number)
        .ok_or_else(|| ExprError::evaluation(format!("{} is not a finite number", f)))
}

/// Convert a whole float back to an int when it fits.
fn integral(f: f64) -> Result<Value> {
    if f.is_finite() && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Ok(Value::from(f as i64))
    } else {
        Err(ExprError::evaluation(format!("{} does not fit in an int", f)))
    }
}

/// Ordering for `min`, `max` and comparisons: numbers with numbers,
/// strings with strings.
pub(crate) fn compare(left: &Value, right: &Value) -> Result<Ordering> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(a), Some(b)) => Ok(a.cmp(&b)),
            _ => {
                let (a, b) = (a.as_f64().unwrap_or(f64::NAN), b.as_f64().unwrap_or(f64::NAN));
                a.partial_cmp(&b)
                    .ok_or_else(|| ExprError::evaluation("cannot order NaN"))
            }
        },
        (Value::String(a), Value::String(b)) => Ok(a.cmp(b)),
        _ => Err(ExprError::type_error(format!(
            "cannot order {} and {}",
            type_name(left),
            type_name(right)
        ))),
    }
}

/// Items of a single sequence argument, or the arguments themselves.
fn spread<'a>(name: &str, args: &'a [Value]) -> Result<&'a [Value]> {
    let items = match args {
        [Value::Array(items)] => items.as_slice(),
        _ => args,
    };
    if items.is_empty() {
        return Err(ExprError::evaluation(format!(
            "{}() of an empty sequence",
            name
        )));
    }
    Ok(items)
}

// ============================================================================
// Pure functions
// ============================================================================

fn len(args: &[Value]) -> Result<Value> {
    let [value] = arity::<1>("len", args)?;
    let n = match value {
        Value::String(s) => s.chars().count(),
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        other => {
            return Err(ExprError::type_error(format!(
                "len() of {}",
                type_name(other)
            )));
        }
    };
    Ok(Value::from(n))
}

fn to_str(args: &[Value]) -> Result<Value> {
    let [value] = arity::<1>("str", args)?;
    Ok(Value::String(render_text(value)))
}

fn to_int(args: &[Value]) -> Result<Value> {
    let [value] = arity::<1>("int", args)?;
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(Value::from(i)),
            None => integral(n.as_f64().unwrap_or(f64::NAN).trunc()),
        },
        Value::Bool(b) => Ok(Value::from(i64::from(*b))),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| ExprError::evaluation(format!("invalid int literal {:?}", s))),
        other => Err(ExprError::type_error(format!(
            "int() of {}",
            type_name(other)
        ))),
    }
}

fn to_float(args: &[Value]) -> Result<Value> {
    let [value] = arity::<1>("float", args)?;
    let f = match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| ExprError::evaluation(format!("invalid float literal {:?}", s)))?,
        other => {
            return Err(ExprError::type_error(format!(
                "float() of {}",
                type_name(other)
            )));
        }
    };
    float_value(f)
}

fn to_bool(args: &[Value]) -> Result<Value> {
    let [value] = arity::<1>("bool", args)?;
    Ok(Value::Bool(truthy(value)))
}

fn abs(args: &[Value]) -> Result<Value> {
    let [value] = arity::<1>("abs", args)?;
    if let Some(i) = value.as_i64() {
        return i
            .checked_abs()
            .map(Value::from)
            .ok_or_else(|| ExprError::evaluation("integer overflow in abs()"));
    }
    float_value(expect_number("abs", value)?.abs())
}

fn min(args: &[Value]) -> Result<Value> {
    let items = spread("min", args)?;
    let mut best = &items[0];
    for item in &items[1..] {
        if compare(item, best)? == Ordering::Less {
            best = item;
        }
    }
    Ok(best.clone())
}

fn max(args: &[Value]) -> Result<Value> {
    let items = spread("max", args)?;
    let mut best = &items[0];
    for item in &items[1..] {
        if compare(item, best)? == Ordering::Greater {
            best = item;
        }
    }
    Ok(best.clone())
}

fn round(args: &[Value]) -> Result<Value> {
    match args {
        [value] => {
            if value.is_i64() {
                return Ok(value.clone());
            }
            integral(expect_number("round", value)?.round())
        }
        [value, digits] => {
            let digits = expect_int("round", digits)?;
            let digits = i32::try_from(digits)
                .map_err(|_| ExprError::evaluation("round() digits out of range"))?;
            let scale = 10f64.powi(digits);
            float_value((expect_number("round", value)? * scale).round() / scale)
        }
        _ => Err(ExprError::type_error(format!(
            "round() takes 1 or 2 arguments, got {}",
            args.len()
        ))),
    }
}

fn floor(args: &[Value]) -> Result<Value> {
    let [value] = arity::<1>("floor", args)?;
    if value.is_i64() {
        return Ok(value.clone());
    }
    integral(expect_number("floor", value)?.floor())
}

fn ceil(args: &[Value]) -> Result<Value> {
    let [value] = arity::<1>("ceil", args)?;
    if value.is_i64() {
        return Ok(value.clone());
    }
    integral(expect_number("ceil", value)?.ceil())
}

fn sum(args: &[Value]) -> Result<Value> {
    let [value] = arity::<1>("sum", args)?;
    let Value::Array(items) = value else {
        return Err(ExprError::type_error(format!(
            "sum() expects a list, got {}",
            type_name(value)
        )));
    };

    let mut int_total: Option<i64> = Some(0);
    let mut float_total = 0.0;
    for item in items {
        let f = expect_number("sum", item)?;
        float_total += f;
        int_total = match (int_total, item.as_i64()) {
            (Some(total), Some(i)) => Some(
                total
                    .checked_add(i)
                    .ok_or_else(|| ExprError::evaluation("integer overflow in sum()"))?,
            ),
            _ => None,
        };
    }
    match int_total {
        Some(total) => Ok(Value::from(total)),
        None => float_value(float_total),
    }
}

fn upper(args: &[Value]) -> Result<Value> {
    let [value] = arity::<1>("upper", args)?;
    Ok(Value::String(expect_str("upper", value)?.to_uppercase()))
}

fn lower(args: &[Value]) -> Result<Value> {
    let [value] = arity::<1>("lower", args)?;
    Ok(Value::String(expect_str("lower", value)?.to_lowercase()))
}

fn trim(args: &[Value]) -> Result<Value> {
    let [value] = arity::<1>("trim", args)?;
    Ok(Value::String(expect_str("trim", value)?.trim().to_string()))
}

/// `join(list, separator)`
fn join(args: &[Value]) -> Result<Value> {
    let [items, separator] = arity::<2>("join", args)?;
    let separator = expect_str("join", separator)?;
    let Value::Array(items) = items else {
        return Err(ExprError::type_error(format!(
            "join() expects a list, got {}",
            type_name(items)
        )));
    };
    let parts: Vec<String> = items.iter().map(render_text).collect();
    Ok(Value::String(parts.join(separator)))
}

/// `split(text, separator)`
fn split(args: &[Value]) -> Result<Value> {
    let [text, separator] = arity::<2>("split", args)?;
    let text = expect_str("split", text)?;
    let separator = expect_str("split", separator)?;
    if separator.is_empty() {
        return Err(ExprError::evaluation("split() with an empty separator"));
    }
    Ok(Value::Array(
        text.split(separator)
            .map(|part| Value::String(part.to_string()))
            .collect(),
    ))
}

/// `replace(text, from, to)`
fn replace(args: &[Value]) -> Result<Value> {
    let [text, from, to] = arity::<3>("replace", args)?;
    Ok(Value::String(expect_str("replace", text)?.replace(
        expect_str("replace", from)?,
        expect_str("replace", to)?,
    )))
}

fn keys(args: &[Value]) -> Result<Value> {
    let [value] = arity::<1>("keys", args)?;
    match value {
        Value::Object(map) => Ok(Value::Array(
            map.keys().map(|k| Value::String(k.clone())).collect(),
        )),
        other => Err(ExprError::type_error(format!(
            "keys() expects a map, got {}",
            type_name(other)
        ))),
    }
}

fn values(args: &[Value]) -> Result<Value> {
    let [value] = arity::<1>("values", args)?;
    match value {
        Value::Object(map) => Ok(Value::Array(map.values().cloned().collect())),
        other => Err(ExprError::type_error(format!(
            "values() expects a map, got {}",
            type_name(other)
        ))),
    }
}

/// `range(stop)`, `range(start, stop)` or `range(start, stop, step)`
fn range(args: &[Value]) -> Result<Value> {
    let (start, stop, step) = match args {
        [stop] => (0, expect_int("range", stop)?, 1),
        [start, stop] => (expect_int("range", start)?, expect_int("range", stop)?, 1),
        [start, stop, step] => (
            expect_int("range", start)?,
            expect_int("range", stop)?,
            expect_int("range", step)?,
        ),
        _ => {
            return Err(ExprError::type_error(format!(
                "range() takes 1 to 3 arguments, got {}",
                args.len()
            )));
        }
    };
    if step == 0 {
        return Err(ExprError::evaluation("range() step must not be zero"));
    }

    let mut items = Vec::new();
    let mut current = start;
    while (step > 0 && current < stop) || (step < 0 && current > stop) {
        if items.len() as i64 >= MAX_RANGE {
            return Err(ExprError::evaluation(format!(
                "range() longer than {} items",
                MAX_RANGE
            )));
        }
        items.push(Value::from(current));
        current = match current.checked_add(step) {
            Some(next) => next,
            None => break,
        };
    }
    Ok(Value::Array(items))
}

fn type_of(args: &[Value]) -> Result<Value> {
    let [value] = arity::<1>("type", args)?;
    Ok(Value::String(type_name(value).to_string()))
}

// ============================================================================
// Ambient capabilities
// ============================================================================

fn read_file(args: &[Value]) -> Result<Value> {
    let [path] = arity::<1>("read_file", args)?;
    let path = expect_str("read_file", path)?;
    tracing::debug!(path = %path, "Reading file from expression");
    std::fs::read_to_string(path)
        .map(Value::String)
        .map_err(|e| ExprError::evaluation(format!("read_file({:?}): {}", path, e)))
}

/// `env(name)` or `env(name, default)`. A missing variable without a
/// default is null.
fn env(args: &[Value]) -> Result<Value> {
    let (name, default) = match args {
        [name] => (name, Value::Null),
        [name, default] => (name, default.clone()),
        _ => {
            return Err(ExprError::type_error(format!(
                "env() takes 1 or 2 arguments, got {}",
                args.len()
            )));
        }
    };
    let name = expect_str("env", name)?;
    Ok(std::env::var(name).map(Value::String).unwrap_or(default))
}

fn path_exists(args: &[Value]) -> Result<Value> {
    let [path] = arity::<1>("path_exists", args)?;
    let path = expect_str("path_exists", path)?;
    Ok(Value::Bool(std::path::Path::new(path).exists()))
}

fn cwd(args: &[Value]) -> Result<Value> {
    arity::<0>("cwd", args)?;
    std::env::current_dir()
        .map(|dir| Value::String(dir.to_string_lossy().into_owned()))
        .map_err(|e| ExprError::evaluation(format!("cwd(): {}", e)))
}
