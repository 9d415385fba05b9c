//! Value helpers shared by the evaluator and the substitution engine

use serde_json::Value;

/// Name of a value's type as reported in error messages and by `type()`.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}

/// Truthiness used by `not`, `and`, `or`, `?:` and `bool()`.
///
/// `null`, `false`, zero, and empty strings or containers are false.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Render a value so that the expression grammar reads it back as the same
/// value.
///
/// Strings are quoted, containers use literal syntax. Objects are written
/// with inner spaces (`{ "a": 1 }`) so that nested objects never produce a
/// `}}` sequence that would close an enclosing `{{ }}` block.
pub fn render_inline(value: &Value) -> String {
    let mut out = String::new();
    write_inline(value, &mut out);
    out
}

fn write_inline(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => out.push_str(&Value::String(s.clone()).to_string()),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_inline(item, out);
            }
            out.push(']');
        }
        Value::Object(map) if map.is_empty() => out.push_str("{}"),
        Value::Object(map) => {
            out.push_str("{ ");
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push_str(": ");
                write_inline(item, out);
            }
            out.push_str(" }");
        }
    }
}

/// Render a value for splicing into surrounding text.
///
/// Strings are inserted raw; everything else uses [`render_inline`].
pub fn render_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => render_inline(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_inline_scalars() {
        assert_eq!(render_inline(&json!(null)), "null");
        assert_eq!(render_inline(&json!(true)), "true");
        assert_eq!(render_inline(&json!(10.04)), "10.04");
        assert_eq!(render_inline(&json!("a \"b\"")), r#""a \"b\"""#);
    }

    #[test]
    fn test_render_inline_containers() {
        assert_eq!(render_inline(&json!([1, "a"])), r#"[1, "a"]"#);
        assert_eq!(
            render_inline(&json!({"a": {"b": 1}})),
            r#"{ "a": { "b": 1 } }"#
        );
        assert_eq!(render_inline(&json!({})), "{}");
    }

    #[test]
    fn test_render_text_keeps_strings_raw() {
        assert_eq!(render_text(&json!("John")), "John");
        assert_eq!(render_text(&json!(5)), "5");
    }

    #[test]
    fn test_truthy() {
        assert!(!truthy(&json!(0)));
        assert!(!truthy(&json!(0.0)));
        assert!(!truthy(&json!("")));
        assert!(!truthy(&json!([])));
        assert!(truthy(&json!("x")));
        assert!(truthy(&json!({"a": 1})));
    }

    #[test]
    fn test_type_name() {
        assert_eq!(type_name(&json!(1)), "int");
        assert_eq!(type_name(&json!(1.5)), "float");
        assert_eq!(type_name(&json!([])), "list");
    }
}
