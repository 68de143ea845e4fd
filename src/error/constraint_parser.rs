use std::sync::OnceLock;

use regex::Regex;

/// Utility for turning PostgreSQL constraint violations into (entity, field, value) triples.
///
/// PostgreSQL names constraints `<table>_<column>_key`, `<table>_pkey`,
/// `<table>_<column>_fkey` and `<table>_<column>_check` unless told otherwise,
/// and reports the offending row as `Key (col)=(value)` in the DETAIL line.
pub struct ConstraintParser;

struct RegexPatterns {
    key_value: Regex,
    column_name: Regex,
    relation_name: Regex,
}

impl RegexPatterns {
    fn new() -> Self {
        Self {
            key_value: Regex::new(r"Key \(([^)]+)\)=\(([^)]*)\)").expect("static regex"),
            column_name: Regex::new(r#"column "([^"]+)""#).expect("static regex"),
            relation_name: Regex::new(r#"(?:table|relation) "([^"]+)""#).expect("static regex"),
        }
    }
}

static REGEX_PATTERNS: OnceLock<RegexPatterns> = OnceLock::new();

const CONSTRAINT_SUFFIXES: &[&str] = &["_pkey", "_fkey", "_key", "_check", "_idx"];

impl ConstraintParser {
    fn patterns() -> &'static RegexPatterns {
        REGEX_PATTERNS.get_or_init(RegexPatterns::new)
    }

    /// Parses a unique (or primary key) violation.
    ///
    /// `details` is the DETAIL line, which is where PostgreSQL puts the
    /// `Key (...)=(...)` pair; `message` is searched as a fallback.
    ///
    /// ```
    /// use coursereg::error::ConstraintParser;
    ///
    /// let parsed = ConstraintParser::parse_unique_violation(
    ///     "duplicate key value violates unique constraint \"users_username_key\"",
    ///     Some("Key (username)=(koala) already exists."),
    ///     Some("users_username_key"),
    ///     Some("users"),
    /// );
    /// assert_eq!(
    ///     parsed,
    ///     Some(("users".to_string(), "username".to_string(), "koala".to_string()))
    /// );
    /// ```
    pub fn parse_unique_violation(
        message: &str,
        details: Option<&str>,
        constraint_name: Option<&str>,
        table_name: Option<&str>,
    ) -> Option<(String, String, String)> {
        let key_value = details
            .and_then(Self::extract_key_value)
            .or_else(|| Self::extract_key_value(message));
        let split = constraint_name.and_then(|c| Self::split_constraint_name(c, table_name));

        let entity = table_name
            .map(str::to_string)
            .or_else(|| split.as_ref().map(|(e, _)| e.clone()))
            .or_else(|| Self::extract_relation(message))?;

        match (key_value, split) {
            (Some((field, value)), _) => Some((entity, field, value)),
            (None, Some((_, field))) => Some((entity, field, "duplicate_value".to_string())),
            (None, None) => None,
        }
    }

    /// Parses a foreign key violation into (entity, field, referenced value).
    pub fn parse_foreign_key_violation(
        message: &str,
        details: Option<&str>,
        constraint_name: Option<&str>,
        table_name: Option<&str>,
    ) -> Option<(String, String, String)> {
        let split = constraint_name.and_then(|c| Self::split_constraint_name(c, table_name));
        let key_value = details
            .and_then(Self::extract_key_value)
            .or_else(|| Self::extract_key_value(message));

        match (split, key_value) {
            (Some((entity, field)), Some((_, value))) => Some((entity, field, value)),
            (Some((entity, field)), None) => Some((entity, field, "invalid_reference".to_string())),
            (None, Some((field, value))) => {
                let entity = table_name
                    .map(str::to_string)
                    .or_else(|| Self::extract_relation(message))
                    .unwrap_or_else(|| "resource".to_string());
                Some((entity, field, value))
            }
            (None, None) => None,
        }
    }

    /// Parses a not-null violation into (entity, field).
    pub fn parse_not_null_violation(
        message: &str,
        table_name: Option<&str>,
        column_name: Option<&str>,
    ) -> Option<(String, String)> {
        let field = column_name
            .map(str::to_string)
            .or_else(|| Self::extract_column(message))?;
        let entity = table_name
            .map(str::to_string)
            .or_else(|| Self::extract_relation(message))
            .unwrap_or_else(|| "resource".to_string());
        Some((entity, field))
    }

    /// Splits a constraint name into (table, column).
    ///
    /// With a known table the column is whatever sits between the table prefix
    /// and the suffix, so multi-word tables such as `course_students` work.
    /// Without one the first segment is taken as the table.
    pub fn split_constraint_name(constraint: &str, table_name: Option<&str>) -> Option<(String, String)> {
        let stem = CONSTRAINT_SUFFIXES
            .iter()
            .find_map(|suffix| constraint.strip_suffix(suffix))?;

        if let Some(table) = table_name {
            let rest = stem.strip_prefix(table)?;
            let field = rest.strip_prefix('_').unwrap_or("id");
            return Some((table.to_string(), field.to_string()));
        }

        let (table, field) = stem.split_once('_')?;
        Some((table.to_string(), field.to_string()))
    }

    /// Extracts the `Key (field)=(value)` pair from a message.
    pub fn extract_key_value(message: &str) -> Option<(String, String)> {
        Self::patterns().key_value.captures(message).and_then(|caps| {
            let field = caps.get(1)?.as_str().to_string();
            let value = caps.get(2)?.as_str().to_string();
            Some((field, value))
        })
    }

    fn extract_column(message: &str) -> Option<String> {
        Self::patterns()
            .column_name
            .captures(message)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    fn extract_relation(message: &str) -> Option<String> {
        Self::patterns()
            .relation_name
            .captures(message)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }
}
