//! Declared filter metadata and value parsing.

use serde_json::Value;

/// How a raw filter value from the directive map is turned into a predicate
/// value. Transforms are value-level only; legality of the filter key itself
/// is guaranteed upstream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FilterValueParser {
    /// Pass the raw string through unchanged.
    #[default]
    Raw,
    /// Parse a boolean. `true`/`1`/`yes`/`on` map to `true`,
    /// `false`/`0`/`no`/`off` to `false`; anything else is `false`.
    Boolean,
    /// Parse a signed integer; unparseable input falls back to the raw string.
    Integer,
    /// Split on the delimiter into a list of strings.
    Delimited(char),
}

impl FilterValueParser {
    /// Apply the transform to a raw directive value.
    #[must_use]
    pub fn parse(&self, raw: &str) -> Value {
        match self {
            FilterValueParser::Raw => Value::String(raw.to_string()),
            FilterValueParser::Boolean => {
                let truthy = matches!(
                    raw.to_ascii_lowercase().as_str(),
                    "true" | "1" | "yes" | "on"
                );
                Value::Bool(truthy)
            }
            FilterValueParser::Integer => raw
                .parse::<i64>()
                .map(Value::from)
                .unwrap_or_else(|_| Value::String(raw.to_string())),
            FilterValueParser::Delimited(delim) => Value::Array(
                raw.split(*delim)
                    .map(|part| Value::String(part.trim().to_string()))
                    .collect(),
            ),
        }
    }
}

/// A filter declared on a resource type.
///
/// Declared filters are matched against the request's filter map in
/// **declaration order**, which keeps emitted predicate sequences (and the
/// resulting storage query plans) deterministic across requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterDef {
    /// Key looked up in the request filter map.
    pub key: String,
    /// Backing storage column. Defaults to the key.
    pub column: String,
    /// Value-level transform applied before predicate emission.
    pub parser: FilterValueParser,
    /// Whether a match implies at most one result, collapsing list-shaped
    /// output to object-or-null on collection endpoints.
    pub singular: bool,
}

impl FilterDef {
    /// Declare a filter whose column equals its key.
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            column: key.clone(),
            key,
            parser: FilterValueParser::Raw,
            singular: false,
        }
    }

    /// Override the backing column.
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }

    /// Set the value parser.
    pub fn parser(mut self, parser: FilterValueParser) -> Self {
        self.parser = parser;
        self
    }

    /// Mark the filter singular.
    pub fn singular(mut self) -> Self {
        self.singular = true;
        self
    }
}
