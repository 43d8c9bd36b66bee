//! String literal escaping.

/// Wraps `value` in single quotes, doubling any embedded single quote.
///
/// # Examples
///
/// ```
/// use medalflow_core::validators::quote_string_literal;
///
/// assert_eq!(quote_string_literal("O'Brien"), "'O''Brien'");
/// assert_eq!(quote_string_literal(""), "''");
/// ```
pub fn quote_string_literal(value: &str) -> String {
	let mut quoted = String::with_capacity(value.len() + 2);
	quoted.push('\'');
	for ch in value.chars() {
		if ch == '\'' {
			quoted.push('\'');
		}
		quoted.push(ch);
	}
	quoted.push('\'');
	quoted
}
