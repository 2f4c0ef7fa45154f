//! JSON decoding and error classification
//!
//! Decodes exactly one JSON value from a buffered body and maps every
//! `serde_json` failure onto a [`ValidationError`] variant.

use std::fmt;

use serde::de::{self, DeserializeOwned, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::error::Category;

use super::ValidationError;

const CITY_FIELD: &str = "City";
const FIELDS: &[&str] = &[CITY_FIELD];

/// Body of a `POST /cloudflare` request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationRequest {
    pub city: String,
}

// Hand-written so that only a JSON object is accepted at the top level
// (the derived impl would also take `["Paris"]`) and unknown keys are rejected.
impl<'de> Deserialize<'de> for LocationRequest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_struct("LocationRequest", FIELDS, LocationVisitor)
    }
}

struct LocationVisitor;

impl<'de> Visitor<'de> for LocationVisitor {
    type Value = LocationRequest;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a JSON object with a \"City\" field")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut city = None;
        while let Some(key) = map.next_key::<String>()? {
            if key != CITY_FIELD {
                return Err(de::Error::unknown_field(&key, FIELDS));
            }
            // Repeated keys: last one wins
            city = Some(map.next_value::<String>()?);
        }
        let city = city.ok_or_else(|| de::Error::missing_field(CITY_FIELD))?;
        Ok(LocationRequest { city })
    }
}

/// Decode a single JSON value of type `T` from `input`.
///
/// Syntax is checked for the whole first value before it is mapped onto
/// `T`, so a malformed or cut-off body is reported as such even when an
/// earlier key or value has the wrong shape. Fails with
/// [`ValidationError::TrailingData`] if anything other than whitespace
/// follows the first value.
pub fn decode_single<T>(input: &[u8]) -> Result<T, ValidationError>
where
    T: DeserializeOwned,
{
    if is_blank(input) {
        return Err(ValidationError::EmptyBody);
    }

    check_syntax(input)?;

    let mut deserializer = serde_json::Deserializer::from_slice(input);
    let value = serde_path_to_error::deserialize(&mut deserializer)
        .map_err(|e| classify(input, e))?;

    if deserializer.end().is_err() {
        return Err(ValidationError::TrailingData);
    }
    Ok(value)
}

/// Scan the first JSON value without interpreting it
fn check_syntax(input: &[u8]) -> Result<(), ValidationError> {
    let mut deserializer = serde_json::Deserializer::from_slice(input);
    let Err(err) = IgnoredAny::deserialize(&mut deserializer) else {
        return Ok(());
    };

    Err(match err.classify() {
        Category::Eof => ValidationError::TruncatedInput,
        Category::Io => ValidationError::Unclassified {
            detail: err.to_string(),
        },
        Category::Syntax | Category::Data => ValidationError::MalformedSyntax {
            offset: byte_offset(input, err.line(), err.column()),
        },
    })
}

/// Map a decode failure onto a validation error kind
fn classify(input: &[u8], err: serde_path_to_error::Error<serde_json::Error>) -> ValidationError {
    let path = err.path().to_string();
    let inner = err.into_inner();
    let offset = byte_offset(input, inner.line(), inner.column());

    match inner.classify() {
        Category::Syntax => ValidationError::MalformedSyntax { offset },
        Category::Eof if is_blank(input) => ValidationError::EmptyBody,
        Category::Eof => ValidationError::TruncatedInput,
        Category::Data => classify_data(&inner, path, offset),
        Category::Io => ValidationError::Unclassified {
            detail: inner.to_string(),
        },
    }
}

fn classify_data(err: &serde_json::Error, path: String, offset: usize) -> ValidationError {
    let message = err.to_string();

    if let Some(field) = quoted_name(&message, "unknown field `", "`, expected") {
        return ValidationError::UnknownField { field };
    }
    if let Some(field) = quoted_name(&message, "missing field `", "`") {
        return ValidationError::MissingField { field };
    }
    if message.starts_with("invalid type")
        || message.starts_with("invalid value")
        || message.starts_with("invalid length")
    {
        // "." is the root: the body was valid JSON but not an object
        let field = if path == "." { String::new() } else { path };
        return ValidationError::TypeMismatch { field, offset };
    }

    ValidationError::Unclassified { detail: message }
}

/// Extract `name` from messages shaped like ``<prefix>name<suffix>...``.
/// Split at the last `suffix` so a name may itself contain backticks.
fn quoted_name(message: &str, prefix: &str, suffix: &str) -> Option<String> {
    let rest = message.strip_prefix(prefix)?;
    rest.rsplit_once(suffix).map(|(name, _)| name.to_string())
}

/// Convert a 1-based line and byte column into an offset from the start of `input`
pub fn byte_offset(input: &[u8], line: usize, column: usize) -> usize {
    let preceding: usize = input
        .split_inclusive(|b| *b == b'\n')
        .take(line.saturating_sub(1))
        .map(<[u8]>::len)
        .sum();
    (preceding + column).min(input.len())
}

const fn is_json_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

fn is_blank(input: &[u8]) -> bool {
    input.iter().copied().all(is_json_whitespace)
}
