//! Shared naming utilities
//!
//! Identifier transformations used by the emitters and the template filters.

use regex::Regex;
use std::sync::OnceLock;

/// C# reserved keywords that must be escaped with `@` when used as identifiers
const CSHARP_KEYWORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
    "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
    "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
    "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
    "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short",
    "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
    "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "virtual",
    "void", "volatile", "while",
];

fn word_boundary() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:^|_| +)(.)").expect("word boundary pattern is valid"))
}

fn unsafe_class_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[,<>]").expect("class name pattern is valid"))
}

/// Convert an identifier to PascalCase
///
/// Underscores and runs of spaces are word boundaries; the first character
/// after each boundary is upper-cased.
///
/// # Examples
/// ```
/// use schemagen::util::to_pascal_case;
/// assert_eq!(to_pascal_case("zip_code"), "ZipCode");
/// assert_eq!(to_pascal_case("City"), "City");
/// ```
pub fn to_pascal_case(s: &str) -> String {
    word_boundary()
        .replace_all(s, |caps: &regex::Captures<'_>| caps[1].to_uppercase())
        .into_owned()
}

/// Convert an identifier to camelCase
///
/// # Examples
/// ```
/// use schemagen::util::to_camel_case;
/// assert_eq!(to_camel_case("ZipCode"), "zipCode");
/// assert_eq!(to_camel_case("first_name"), "firstName");
/// ```
pub fn to_camel_case(s: &str) -> String {
    let pascal = to_pascal_case(s);
    let mut chars = pascal.chars();
    match chars.next() {
        Some(c) => c.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Convert PascalCase or camelCase to snake_case
///
/// # Examples
/// ```
/// use schemagen::util::to_snake_case;
/// assert_eq!(to_snake_case("DeepCloneSafe"), "deep_clone_safe");
/// ```
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, c) in s.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}

/// Replace characters that cannot appear in a generated class name
///
/// # Examples
/// ```
/// use schemagen::util::safe_class_name;
/// assert_eq!(safe_class_name("Pair<K,V>"), "Pair_K_V_");
/// ```
pub fn safe_class_name(s: &str) -> String {
    unsafe_class_chars().replace_all(s, "_").into_owned()
}

/// Whether `s` is a reserved C# keyword
pub fn is_csharp_keyword(s: &str) -> bool {
    CSHARP_KEYWORDS.contains(&s)
}

/// Escape an identifier with `@` if it collides with a C# keyword
pub fn escape_identifier(s: &str) -> String {
    if is_csharp_keyword(s) {
        format!("@{}", s)
    } else {
        s.to_string()
    }
}

/// camelCase parameter name for a property, escaped for C#
pub fn parameter_name(property: &str) -> String {
    escape_identifier(&to_camel_case(property))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_pascal_case() {
        assert_eq!(to_pascal_case("zip_code"), "ZipCode");
        assert_eq!(to_pascal_case("first name"), "FirstName");
        assert_eq!(to_pascal_case("City"), "City");
        assert_eq!(to_pascal_case(""), "");
    }

    #[test]
    fn test_to_camel_case() {
        assert_eq!(to_camel_case("ZipCode"), "zipCode");
        assert_eq!(to_camel_case("CorrelationId"), "correlationId");
        assert_eq!(to_camel_case("first_name"), "firstName");
        assert_eq!(to_camel_case(""), "");
    }

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("SafeClone"), "safe_clone");
        assert_eq!(to_snake_case("builder"), "builder");
    }

    #[test]
    fn test_safe_class_name() {
        assert_eq!(safe_class_name("Address"), "Address");
        assert_eq!(safe_class_name("Box<T>"), "Box_T_");
    }

    #[test]
    fn test_keyword_escaping() {
        assert_eq!(parameter_name("Class"), "@class");
        assert_eq!(parameter_name("Event"), "@event");
        assert_eq!(parameter_name("Name"), "name");
    }
}
