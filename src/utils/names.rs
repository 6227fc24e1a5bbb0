//! Font-family name normalization

/// The five CSS generic family keywords; these are reserved and must never
/// be quoted.
pub const GENERIC_FAMILIES: [&str; 5] = ["serif", "sans-serif", "cursive", "fantasy", "monospace"];

/// Normalize a user-supplied font family into a CSS-safe token.
///
/// Trims whitespace and strips one layer of surrounding quotes; generic
/// keywords pass through unquoted (case preserved), everything else is
/// wrapped in exactly one pair of double quotes. Idempotent:
/// `fix_name(fix_name(x)) == fix_name(x)`.
pub fn fix_name(font_family: &str) -> String {
    let cleaned = strip_quotes(font_family.trim());
    if cleaned.is_empty() {
        return String::new();
    }
    if GENERIC_FAMILIES.iter().any(|g| g.eq_ignore_ascii_case(cleaned)) {
        return cleaned.to_string();
    }
    format!("\"{cleaned}\"")
}

/// Strip at most one leading and one trailing quote, single or double,
/// matched independently.
fn strip_quotes(name: &str) -> &str {
    let name = name.strip_prefix(['\'', '"']).unwrap_or(name);
    name.strip_suffix(['\'', '"']).unwrap_or(name)
}
