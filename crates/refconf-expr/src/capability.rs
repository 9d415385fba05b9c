//! Evaluation modes and the capability table

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::builtins;
use crate::error::{ExprError, Result};

/// A function callable from an expression.
pub type Builtin = fn(&[Value]) -> Result<Value>;

/// Names that reach outside the document (filesystem, environment).
///
/// They are only bound in [`Mode::Unrestricted`]. In restricted mode using
/// any of them fails with [`ExprError::Forbidden`] rather than an unknown
/// name error.
pub const AMBIENT_CAPABILITIES: &[&str] = &["read_file", "env", "path_exists", "cwd"];

/// How much an expression may do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Pure computation only
    #[default]
    Restricted,
    /// Pure computation plus ambient capabilities. Only for trusted
    /// documents.
    Unrestricted,
}

impl FromStr for Mode {
    type Err = ExprError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "restricted" | "sandbox" | "safe" => Ok(Mode::Restricted),
            "unrestricted" | "full" | "trusted" => Ok(Mode::Unrestricted),
            _ => Err(ExprError::InvalidMode {
                mode: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Restricted => write!(f, "restricted"),
            Mode::Unrestricted => write!(f, "unrestricted"),
        }
    }
}

/// The functions an evaluator may call.
#[derive(Clone)]
pub struct Capabilities {
    mode: Mode,
    functions: BTreeMap<&'static str, Builtin>,
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capabilities")
            .field("mode", &self.mode)
            .field("functions", &self.functions.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Capabilities {
    /// The table for `mode`: the pure functions, plus the ambient ones when
    /// unrestricted.
    pub fn for_mode(mode: Mode) -> Self {
        let mut functions: BTreeMap<&'static str, Builtin> =
            builtins::PURE.iter().copied().collect();
        if mode == Mode::Unrestricted {
            functions.extend(builtins::AMBIENT.iter().copied());
        }
        Self { mode, functions }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Look up a callable function.
    ///
    /// # Errors
    ///
    /// `Forbidden` for an ambient name that is not bound, `UnknownFunction`
    /// for anything else that is not bound.
    pub fn function(&self, name: &str) -> Result<Builtin> {
        if let Some(function) = self.functions.get(name) {
            return Ok(*function);
        }
        if AMBIENT_CAPABILITIES.contains(&name) {
            return Err(ExprError::Forbidden {
                capability: name.to_string(),
            });
        }
        Err(ExprError::UnknownFunction {
            name: name.to_string(),
        })
    }

    /// The error for a bare identifier. Expressions have no variables, so
    /// this is always an error.
    pub fn unbound_name(&self, name: &str) -> ExprError {
        if AMBIENT_CAPABILITIES.contains(&name) && !self.functions.contains_key(name) {
            ExprError::Forbidden {
                capability: name.to_string(),
            }
        } else {
            ExprError::UnknownName {
                name: name.to_string(),
            }
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::for_mode(Mode::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_str() {
        assert_eq!("restricted".parse::<Mode>().unwrap(), Mode::Restricted);
        assert_eq!("Unrestricted".parse::<Mode>().unwrap(), Mode::Unrestricted);
        assert_eq!("trusted".parse::<Mode>().unwrap(), Mode::Unrestricted);
        assert!(matches!(
            "open".parse::<Mode>(),
            Err(ExprError::InvalidMode { .. })
        ));
    }

    #[test]
    fn test_mode_display_round_trips() {
        for mode in [Mode::Restricted, Mode::Unrestricted] {
            assert_eq!(mode.to_string().parse::<Mode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_restricted_table_has_no_ambient_names() {
        let caps = Capabilities::for_mode(Mode::Restricted);
        for name in AMBIENT_CAPABILITIES {
            assert!(matches!(
                caps.function(name),
                Err(ExprError::Forbidden { .. })
            ));
        }
        assert!(caps.function("len").is_ok());
    }

    #[test]
    fn test_unrestricted_table_binds_ambient_names() {
        let caps = Capabilities::for_mode(Mode::Unrestricted);
        for name in AMBIENT_CAPABILITIES {
            assert!(caps.function(name).is_ok(), "{name} should be bound");
        }
    }

    #[test]
    fn test_unknown_function() {
        let caps = Capabilities::default();
        assert!(matches!(
            caps.function("eval"),
            Err(ExprError::UnknownFunction { name }) if name == "eval"
        ));
        assert_eq!(
            caps.unbound_name("x"),
            ExprError::UnknownName {
                name: "x".to_string()
            }
        );
    }
}
