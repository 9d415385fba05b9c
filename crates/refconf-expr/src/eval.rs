//! Expression evaluation

use std::cmp::Ordering;

use serde_json::{Map, Value};

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::block::{find_innermost, is_literal_escape};
use crate::builtins::{compare, float_value};
use crate::capability::{Capabilities, Mode};
use crate::error::{ExprError, Result};
use crate::parser::parse_expression;
use crate::value::{render_inline, render_text, truthy, type_name};

/// Largest string or sequence `*` may build.
const MAX_REPEAT_LEN: usize = 1 << 20;

/// Evaluates expressions against a fixed capability table.
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    capabilities: Capabilities,
}

impl Evaluator {
    pub fn new(mode: Mode) -> Self {
        Self {
            capabilities: Capabilities::for_mode(mode),
        }
    }

    pub fn mode(&self) -> Mode {
        self.capabilities.mode()
    }

    /// Parse and evaluate one expression.
    pub fn evaluate(&self, source: &str) -> Result<Value> {
        let expr = parse_expression(source)?;
        self.eval(&expr)
    }

    /// Evaluate every block inside `text`.
    ///
    /// Returns `None` when the text should be kept as it is: it holds no
    /// complete block, or it starts or ends with a space. Otherwise blocks
    /// are evaluated innermost-first, each result replacing its block. A
    /// block that spans the whole remaining text yields its typed value.
    /// When no single block spans the text, the flattened text is itself
    /// evaluated, so `'total = {{ 2 * 3 }}'` becomes `"total = 6"`.
    pub fn evaluate_template(&self, text: &str) -> Result<Option<Value>> {
        if find_innermost(text).is_none() || is_literal_escape(text) {
            return Ok(None);
        }

        let mut current = text.trim().to_string();
        while let Some(block) = find_innermost(&current) {
            let value = self.evaluate(block.inner(&current))?;
            if block.spans(&current) {
                return Ok(Some(value));
            }
            // Splice with grammar syntax inside another block, raw text
            // outside of one.
            let inside_block = is_enclosed(&current, block.start);
            let rendered = if inside_block {
                render_inline(&value)
            } else {
                render_text(&value)
            };
            current.replace_range(block.start..block.end, &rendered);
        }

        tracing::trace!(text = %current, "Evaluating flattened template");
        self.evaluate(&current).map(Some)
    }

    /// Evaluate a parsed expression.
    pub fn eval(&self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::List(items) => items
                .iter()
                .map(|item| self.eval(item))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            Expr::Map(entries) => {
                let mut map = Map::new();
                for (key, value) in entries {
                    let key = match self.eval(key)? {
                        Value::String(s) => s,
                        other @ (Value::Number(_) | Value::Bool(_)) => render_inline(&other),
                        other => {
                            return Err(ExprError::type_error(format!(
                                "map keys must be strings, got {}",
                                type_name(&other)
                            )));
                        }
                    };
                    map.insert(key, self.eval(value)?);
                }
                Ok(Value::Object(map))
            }
            Expr::Name(name) => Err(self.capabilities.unbound_name(name)),
            Expr::Unary { op, operand } => {
                let operand = self.eval(operand)?;
                match op {
                    UnaryOp::Not => Ok(Value::Bool(!truthy(&operand))),
                    UnaryOp::Neg => negate(&operand),
                }
            }
            Expr::Binary { op, left, right } => match op {
                BinaryOp::And => {
                    let left = self.eval(left)?;
                    if !truthy(&left) {
                        return Ok(Value::Bool(false));
                    }
                    Ok(Value::Bool(truthy(&self.eval(right)?)))
                }
                BinaryOp::Or => {
                    let left = self.eval(left)?;
                    if truthy(&left) {
                        return Ok(Value::Bool(true));
                    }
                    Ok(Value::Bool(truthy(&self.eval(right)?)))
                }
                _ => {
                    let left = self.eval(left)?;
                    let right = self.eval(right)?;
                    binary(*op, &left, &right)
                }
            },
            Expr::Conditional {
                condition,
                then,
                otherwise,
            } => {
                if truthy(&self.eval(condition)?) {
                    self.eval(then)
                } else {
                    self.eval(otherwise)
                }
            }
            Expr::Call { function, args } => {
                let function_ref = self.capabilities.function(function)?;
                let args = args
                    .iter()
                    .map(|arg| self.eval(arg))
                    .collect::<Result<Vec<_>>>()?;
                tracing::trace!(function = %function, args = args.len(), "Calling function");
                function_ref(&args)
            }
            Expr::Index { target, index } => {
                let target = self.eval(target)?;
                let index = self.eval(index)?;
                index_value(&target, &index)
            }
            Expr::Member { target, name } => match self.eval(target)? {
                Value::Object(map) => map.get(name).cloned().ok_or_else(|| {
                    ExprError::evaluation(format!("map has no key {:?}", name))
                }),
                other => Err(ExprError::type_error(format!(
                    "cannot read `.{}` of {}",
                    name,
                    type_name(&other)
                ))),
            },
        }
    }
}

/// Whether position `at` lies inside an unclosed `{{` or `exp(` opened
/// earlier in `text`.
fn is_enclosed(text: &str, at: usize) -> bool {
    let before = &text[..at];
    before.contains("{{") || before.contains("exp(")
}

// ============================================================================
// Numbers
// ============================================================================

#[derive(Debug, Clone, Copy)]
enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    fn from_value(value: &Value) -> Option<Self> {
        let Value::Number(n) = value else {
            return None;
        };
        n.as_i64()
            .map(Num::Int)
            .or_else(|| n.as_f64().map(Num::Float))
    }

    fn as_f64(self) -> f64 {
        match self {
            Num::Int(i) => i as f64,
            Num::Float(f) => f,
        }
    }
}

fn overflow(op: BinaryOp) -> ExprError {
    ExprError::evaluation(format!("integer overflow in `{}`", op.symbol()))
}

fn not_arithmetic(op: BinaryOp) -> ExprError {
    ExprError::evaluation(format!("`{}` is not an arithmetic operator", op.symbol()))
}

fn arithmetic(op: BinaryOp, left: Num, right: Num) -> Result<Value> {
    if let (Num::Int(a), Num::Int(b)) = (left, right) {
        let result = match op {
            BinaryOp::Add => a.checked_add(b),
            BinaryOp::Sub => a.checked_sub(b),
            BinaryOp::Mul => a.checked_mul(b),
            BinaryOp::Div => {
                if b == 0 {
                    return Err(ExprError::DivisionByZero);
                }
                if a.checked_rem(b) != Some(0) {
                    return float_value(a as f64 / b as f64);
                }
                a.checked_div(b)
            }
            BinaryOp::FloorDiv => {
                if b == 0 {
                    return Err(ExprError::DivisionByZero);
                }
                // Euclidean division only floors for a positive divisor
                match (a.checked_div_euclid(b), a.checked_rem_euclid(b)) {
                    (Some(q), Some(r)) if b < 0 && r != 0 => q.checked_sub(1),
                    (q, _) => q,
                }
            }
            BinaryOp::Mod => {
                if b == 0 {
                    return Err(ExprError::DivisionByZero);
                }
                a.checked_rem(b).map(|r| if r != 0 && (r < 0) != (b < 0) { r + b } else { r })
            }
            BinaryOp::Pow => {
                if b < 0 {
                    return float_value((a as f64).powf(b as f64));
                }
                u32::try_from(b).ok().and_then(|e| a.checked_pow(e))
            }
            _ => return Err(not_arithmetic(op)),
        };
        return result.map(Value::from).ok_or_else(|| overflow(op));
    }

    let (a, b) = (left.as_f64(), right.as_f64());
    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div | BinaryOp::FloorDiv | BinaryOp::Mod if b == 0.0 => {
            return Err(ExprError::DivisionByZero);
        }
        BinaryOp::Div => a / b,
        BinaryOp::FloorDiv => (a / b).floor(),
        BinaryOp::Mod => a - b * (a / b).floor(),
        BinaryOp::Pow => a.powf(b),
        _ => return Err(not_arithmetic(op)),
    };
    float_value(result)
}

fn negate(value: &Value) -> Result<Value> {
    match Num::from_value(value) {
        Some(Num::Int(i)) => i
            .checked_neg()
            .map(Value::from)
            .ok_or_else(|| ExprError::evaluation("integer overflow in negation")),
        Some(Num::Float(f)) => float_value(-f),
        None => Err(ExprError::type_error(format!(
            "cannot negate {}",
            type_name(value)
        ))),
    }
}

// ============================================================================
// Operators
// ============================================================================

fn repeat<T: Clone>(items: &[T], unit_len: usize, times: i64) -> Result<Vec<T>> {
    let times = usize::try_from(times.max(0)).unwrap_or(0);
    if unit_len.saturating_mul(times) > MAX_REPEAT_LEN {
        return Err(ExprError::evaluation("repetition result is too large"));
    }
    Ok((0..times).flat_map(|_| items.iter().cloned()).collect())
}

fn binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value> {
    match op {
        BinaryOp::Eq => return Ok(Value::Bool(loose_eq(left, right))),
        BinaryOp::Ne => return Ok(Value::Bool(!loose_eq(left, right))),
        BinaryOp::Lt => return Ok(Value::Bool(compare(left, right)? == Ordering::Less)),
        BinaryOp::Le => return Ok(Value::Bool(compare(left, right)? != Ordering::Greater)),
        BinaryOp::Gt => return Ok(Value::Bool(compare(left, right)? == Ordering::Greater)),
        BinaryOp::Ge => return Ok(Value::Bool(compare(left, right)? != Ordering::Less)),
        BinaryOp::In => return contains(right, left).map(Value::Bool),
        _ => {}
    }

    if let (Some(a), Some(b)) = (Num::from_value(left), Num::from_value(right)) {
        return arithmetic(op, a, b);
    }

    match (op, left, right) {
        (BinaryOp::Add, Value::String(a), Value::String(b)) => {
            Ok(Value::String(format!("{}{}", a, b)))
        }
        (BinaryOp::Add, Value::Array(a), Value::Array(b)) => {
            Ok(Value::Array(a.iter().chain(b).cloned().collect()))
        }
        (BinaryOp::Mul, Value::String(s), Value::Number(n))
        | (BinaryOp::Mul, Value::Number(n), Value::String(s)) => {
            let times = n
                .as_i64()
                .ok_or_else(|| ExprError::type_error("can only repeat a string by an int"))?;
            let chars: Vec<char> = s.chars().collect();
            let repeated = repeat(&chars, s.len().max(1), times)?;
            Ok(Value::String(repeated.into_iter().collect()))
        }
        (BinaryOp::Mul, Value::Array(items), Value::Number(n))
        | (BinaryOp::Mul, Value::Number(n), Value::Array(items)) => {
            let times = n
                .as_i64()
                .ok_or_else(|| ExprError::type_error("can only repeat a list by an int"))?;
            Ok(Value::Array(repeat(items, items.len().max(1), times)?))
        }
        _ => Err(ExprError::type_error(format!(
            "unsupported operand types for `{}`: {} and {}",
            op.symbol(),
            type_name(left),
            type_name(right)
        ))),
    }
}

/// Equality where `1 == 1.0`.
fn loose_eq(left: &Value, right: &Value) -> bool {
    match (Num::from_value(left), Num::from_value(right)) {
        (Some(Num::Int(a)), Some(Num::Int(b))) => a == b,
        (Some(a), Some(b)) => a.as_f64() == b.as_f64(),
        _ => match (left, right) {
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| loose_eq(x, y))
            }
            _ => left == right,
        },
    }
}

fn contains(container: &Value, item: &Value) -> Result<bool> {
    match container {
        Value::Array(items) => Ok(items.iter().any(|candidate| loose_eq(candidate, item))),
        Value::String(haystack) => match item {
            Value::String(needle) => Ok(haystack.contains(needle.as_str())),
            other => Err(ExprError::type_error(format!(
                "`in <string>` requires a string, got {}",
                type_name(other)
            ))),
        },
        Value::Object(map) => match item {
            Value::String(key) => Ok(map.contains_key(key)),
            _ => Ok(false),
        },
        other => Err(ExprError::type_error(format!(
            "`in` needs a list, string or map, got {}",
            type_name(other)
        ))),
    }
}

fn resolve_index(index: &Value, len: usize) -> Result<usize> {
    let i = index.as_i64().ok_or_else(|| {
        ExprError::type_error(format!("indices must be ints, got {}", type_name(index)))
    })?;
    let len_i = i64::try_from(len).unwrap_or(i64::MAX);
    let resolved = if i < 0 { i + len_i } else { i };
    if resolved < 0 || resolved >= len_i {
        return Err(ExprError::evaluation(format!("index {} out of range", i)));
    }
    usize::try_from(resolved).map_err(|_| ExprError::evaluation(format!("index {} out of range", i)))
}

fn index_value(target: &Value, index: &Value) -> Result<Value> {
    match target {
        Value::Array(items) => Ok(items[resolve_index(index, items.len())?].clone()),
        Value::String(s) => {
            let chars: Vec<char> = s.chars().collect();
            let c = chars[resolve_index(index, chars.len())?];
            Ok(Value::String(c.to_string()))
        }
        Value::Object(map) => match index {
            Value::String(key) => map
                .get(key)
                .cloned()
                .ok_or_else(|| ExprError::evaluation(format!("map has no key {:?}", key))),
            other => Err(ExprError::type_error(format!(
                "map keys must be strings, got {}",
                type_name(other)
            ))),
        },
        other => Err(ExprError::type_error(format!(
            "{} is not indexable",
            type_name(other)
        ))),
    }
}
