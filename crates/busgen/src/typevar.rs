use serde::Serialize;

/// A variable the emitted code either expects from its caller (input) or
/// declares itself (local): a C type and a name, both plain text.
///
/// `suffix` is the structural tail of the name relative to the base name
/// of the generator call that created the record (`"_len"`, `""`, ...).
/// Outer generators rebuild their own names from it instead of stripping
/// prefixes out of `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeVar {
    pub c_type: String,
    pub name: String,
    pub suffix: String,
}

impl TypeVar {
    pub fn new(c_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            c_type: c_type.into(),
            name: name.into(),
            suffix: String::new(),
        }
    }

    /// Record named `{base}{suffix}`, remembering the suffix.
    pub fn suffixed(c_type: impl Into<String>, base: &str, suffix: &str) -> Self {
        Self {
            c_type: c_type.into(),
            name: format!("{base}{suffix}"),
            suffix: suffix.to_string(),
        }
    }
}
