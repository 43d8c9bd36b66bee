//! Identifier validation.

use crate::constants::MAX_IDENTIFIER_LENGTH;
use crate::exception::IdentifierError;
use regex::Regex;
use std::sync::LazyLock;

/// Injection fragments rejected even when every character is individually allowed.
static DANGEROUS_IDENTIFIER_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
	[
		r";\s*DROP",
		r";\s*DELETE",
		r";\s*UPDATE",
		r";\s*INSERT",
		r"--",
		r"/\*",
		r"\*/",
		r"UNION\s+SELECT",
		r"OR\s+1\s*=\s*1",
		r"OR\s+'1'\s*=\s*'1'",
	]
	.into_iter()
	.map(|pattern| Regex::new(&format!("(?i){pattern}")).expect("identifier pattern is valid"))
	.collect()
});

fn check_length(identifier: &str, kind: &'static str) -> Result<(), IdentifierError> {
	if identifier.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}

	let length = identifier.chars().count();
	if length > MAX_IDENTIFIER_LENGTH {
		return Err(IdentifierError::TooLong { kind, length });
	}

	Ok(())
}

fn check_characters(
	identifier: &str,
	kind: &'static str,
	allowed: impl Fn(char) -> bool,
) -> Result<(), IdentifierError> {
	let mut chars = identifier.chars();

	if let Some(first) = chars.next()
		&& !(first.is_ascii_alphabetic() || first == '_')
	{
		return Err(IdentifierError::InvalidFirstCharacter {
			kind,
			identifier: identifier.to_string(),
		});
	}

	for ch in chars {
		if !(ch.is_ascii_alphanumeric() || allowed(ch)) {
			return Err(IdentifierError::InvalidCharacter {
				kind,
				identifier: identifier.to_string(),
				character: ch,
			});
		}
	}

	Ok(())
}

/// Validates a schema or object name carried by an operation.
///
/// Accepts 1 to 128 characters. The first must be an ASCII letter or `_`,
/// the rest ASCII alphanumerics or one of `_ $ # @`.
///
/// # Examples
///
/// ```
/// use medalflow_core::validators::validate_object_identifier;
///
/// assert!(validate_object_identifier("raw_customers", "object").is_ok());
/// assert!(validate_object_identifier("tmp#1", "object").is_ok());
/// assert!(validate_object_identifier("9lives", "object").is_err());
/// assert!(validate_object_identifier("a.b", "object").is_err());
/// ```
pub fn validate_object_identifier(
	identifier: &str,
	kind: &'static str,
) -> Result<(), IdentifierError> {
	check_length(identifier, kind)?;
	check_characters(identifier, kind, |ch| matches!(ch, '_' | '$' | '#' | '@'))
}

/// Validates a column name: `^[A-Za-z_][A-Za-z0-9_]*$`, at most 128 characters.
///
/// # Examples
///
/// ```
/// use medalflow_core::validators::validate_column_name;
///
/// assert!(validate_column_name("valid_name").is_ok());
/// assert!(validate_column_name("_name2").is_ok());
/// assert!(validate_column_name("2bad").is_err());
/// assert!(validate_column_name("bad-name").is_err());
/// assert!(validate_column_name("").is_err());
/// ```
pub fn validate_column_name(name: &str) -> Result<(), IdentifierError> {
	check_length(name, "column")?;
	check_characters(name, "column", |ch| ch == '_')
}

/// Safety check applied by query builders right before an identifier is
/// quoted into SQL text.
///
/// Allows ASCII alphanumerics, `_` and `-` after a leading letter or `_`,
/// then rejects known injection fragments such as `--`. Bracket and quote
/// characters fail the character check instead of being stripped.
pub fn validate_sql_identifier(
	identifier: &str,
	kind: &'static str,
) -> Result<(), IdentifierError> {
	check_length(identifier, kind)?;
	check_characters(identifier, kind, |ch| matches!(ch, '_' | '-'))?;

	if DANGEROUS_IDENTIFIER_PATTERNS
		.iter()
		.any(|pattern| pattern.is_match(identifier))
	{
		return Err(IdentifierError::DangerousPattern {
			kind,
			identifier: identifier.to_string(),
		});
	}

	Ok(())
}
