//! Sample documents.
//!
//! Each constant is document text as a user would write it, comments
//! included where they help.

/// Chained references declared out of order.
pub const COMPLEX_REFERENCES: &str = r#"{
    "a": "simple",
    "b": "${a} ${c}",
    "c": "${d}",
    "d": "${a} ${e}",
    "e": "as pie"
}"#;

/// Expressions over references. Resolves to `c = 5`, `d = 50`.
pub const MATH: &str = r#"{
    "a": 10,
    "b": 2,
    "c": "{{ ${a} / ${b} }}",
    "d": "{{ ${c} * ${a} }}"
}"#;

/// A nested block. Resolves to `c = 70`.
pub const NESTED_EXPRESSIONS: &str = r#"{
    "a": 10,
    "b": 20,
    "c": "{{ {{ ${a} * 5 }} + ${b} }}"
}"#;

/// Compound paths into mappings and sequences.
pub const COMPOUND_PATHS: &str = r#"{
    "person": {
        "name": "John",
        "address": { "town": "Dublin" }
    },
    "e": ["a", "b", 2],
    "f": "${e.0}",
    "j": "${person.name}",
    "t": "${person.address.town}"
}"#;

/// Every kind of comment, including markers inside strings.
pub const COMMENTED: &str = r#"/*
 * Service settings
 */
{
    // where the service lives
    "host": "localhost", // trailing comment
    "url": "http://${host}/api", /* inline */
    "note": "/* not a comment */"
}"#;

/// Lists and mappings that hold references and are referenced.
pub const CONTAINERS: &str = r#"{
    "f": [1, 2, "${x}"],
    "g": { "title": "Catch-22", "year": "${year}" },
    "x": 3,
    "year": 1961,
    "h": "${f}",
    "k": "{{ [ ${f}, ${g} ] }}"
}"#;

/// `{"fubar": "${fubar}"}`
pub const SELF_REFERENCE: &str = r#"{"fubar": "${fubar}"}"#;

/// `{"a": "${b}", "b": "${a}"}`
pub const CYCLIC_REFERENCE: &str = r#"{"a": "${b}", "b": "${a}"}"#;

/// A cycle that only shows through containers.
pub const COMPLEX_CYCLE: &str = r#"{
    "a": { "x": "${b.y}" },
    "b": { "y": "${c}" },
    "c": "${a}"
}"#;

/// `{"ping": "${pong}"}`
pub const UNKNOWN_REFERENCE: &str = r#"{"ping": "${pong}"}"#;

/// A document whose expression reads a file. `@PATH@` marks where the
/// file path goes.
pub const READ_FILE_TEMPLATE: &str = r#"{
    "path": "@PATH@",
    "contents": "{{ read_file('${path}') }}"
}"#;

/// Fill [`READ_FILE_TEMPLATE`] with `path`.
pub fn read_file_document(path: &str) -> String {
    READ_FILE_TEMPLATE.replace("@PATH@", path)
}
