//! Typed structured-stream events.
//!
//! Loaders and serializers speak only in these events; turning text into
//! events (and back) is the job of an adapter such as
//! [`YamlReader`](crate::YamlReader) / [`YamlWriter`](crate::YamlWriter).
//!
//! A document is a well-nested sequence of events:
//!
//! ```text
//! MappingStart
//!   Scalar("groups") SequenceStart
//!     MappingStart Scalar("groupname") Scalar("admins") MappingEnd
//!   SequenceEnd
//! MappingEnd
//! ```

use dynsec_core::{Error, Result};
use std::fmt;

/// A scalar token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Scalar {
    /// Text.
    Str(String),
    /// An integer that fits in `i64`.
    Int(i64),
}

impl Scalar {
    /// Text form of the scalar. Integers are rendered in decimal.
    pub fn into_string(self) -> String {
        match self {
            Scalar::Str(s) => s,
            Scalar::Int(i) => i.to_string(),
        }
    }

    /// Integer value, accepting decimal text as well.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Scalar::Int(i) => Some(*i),
            Scalar::Str(s) => s.trim().parse().ok(),
        }
    }

    /// Whether this is the empty string (how a null value arrives).
    pub fn is_empty(&self) -> bool {
        matches!(self, Scalar::Str(s) if s.is_empty())
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Str(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Str(s)
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Scalar::Int(i)
    }
}

/// One structured-stream event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Start of a key/value mapping.
    MappingStart,
    /// End of the innermost mapping.
    MappingEnd,
    /// Start of a sequence.
    SequenceStart,
    /// End of the innermost sequence.
    SequenceEnd,
    /// A scalar value or mapping key.
    Scalar(Scalar),
}

impl Event {
    /// Shorthand for a text scalar event.
    pub fn str(s: impl Into<String>) -> Self {
        Event::Scalar(Scalar::Str(s.into()))
    }

    /// Shorthand for an integer scalar event.
    pub fn int(i: i64) -> Self {
        Event::Scalar(Scalar::Int(i))
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::MappingStart => f.write_str("mapping start"),
            Event::MappingEnd => f.write_str("mapping end"),
            Event::SequenceStart => f.write_str("sequence start"),
            Event::SequenceEnd => f.write_str("sequence end"),
            Event::Scalar(Scalar::Str(s)) => write!(f, "scalar '{s}'"),
            Event::Scalar(Scalar::Int(i)) => write!(f, "scalar {i}"),
        }
    }
}

// ============================================================================
// Reader / writer seams
// ============================================================================

/// Source of events.
pub trait EventReader {
    /// Next event, or `None` once the stream is exhausted.
    fn next_event(&mut self) -> Result<Option<Event>>;
}

impl<I> EventReader for I
where
    I: Iterator<Item = Result<Event>>,
{
    fn next_event(&mut self) -> Result<Option<Event>> {
        self.next().transpose()
    }
}

/// Sink for events.
pub trait EventWriter {
    /// Accepts one event.
    fn emit(&mut self, event: Event) -> Result<()>;
}

impl EventWriter for Vec<Event> {
    fn emit(&mut self, event: Event) -> Result<()> {
        self.push(event);
        Ok(())
    }
}

// ============================================================================
// Reading helpers
// ============================================================================

/// Next event; running out of events here is a stream error.
pub fn require_event<R: EventReader + ?Sized>(reader: &mut R) -> Result<Event> {
    reader
        .next_event()?
        .ok_or_else(|| Error::stream("unexpected end of stream"))
}

/// Consumes one complete value (a scalar, or a balanced mapping/sequence).
pub fn skip_value<R: EventReader + ?Sized>(reader: &mut R) -> Result<()> {
    let mut depth = 0usize;
    loop {
        match require_event(reader)? {
            Event::MappingStart | Event::SequenceStart => depth += 1,
            Event::MappingEnd | Event::SequenceEnd => {
                if depth == 0 {
                    return Err(Error::stream("unbalanced end event while skipping a value"));
                }
                depth -= 1;
            }
            Event::Scalar(_) => {}
        }
        if depth == 0 {
            return Ok(());
        }
    }
}

/// Reads a scalar value as text.
///
/// `what` names the field for error messages.
pub fn read_string<R: EventReader + ?Sized>(reader: &mut R, what: &str) -> Result<String> {
    match require_event(reader)? {
        Event::Scalar(s) => Ok(s.into_string()),
        other => {
            skip_rest(reader, &other)?;
            Err(Error::invalid_record(format!(
                "expected a scalar for '{what}', found {other}"
            )))
        }
    }
}

/// Reads a scalar value as an integer.
pub fn read_integer<R: EventReader + ?Sized>(reader: &mut R, what: &str) -> Result<i64> {
    match require_event(reader)? {
        Event::Scalar(s) => s.as_integer().ok_or_else(|| {
            Error::invalid_record(format!("expected an integer for '{what}', found {s:?}"))
        }),
        other => {
            skip_rest(reader, &other)?;
            Err(Error::invalid_record(format!(
                "expected an integer for '{what}', found {other}"
            )))
        }
    }
}

/// Reads text that is treated as absent when empty.
pub fn read_optional_string<R: EventReader + ?Sized>(
    reader: &mut R,
    what: &str,
) -> Result<Option<String>> {
    let value = read_string(reader, what)?;
    Ok((!value.is_empty()).then_some(value))
}

/// Opens a sequence value.
///
/// Returns `false` for a null value, which stands for an empty sequence.
pub fn begin_sequence<R: EventReader + ?Sized>(reader: &mut R, what: &str) -> Result<bool> {
    match require_event(reader)? {
        Event::SequenceStart => Ok(true),
        Event::Scalar(s) if s.is_empty() => Ok(false),
        other => {
            skip_rest(reader, &other)?;
            Err(Error::invalid_record(format!(
                "expected a sequence for '{what}', found {other}"
            )))
        }
    }
}

/// Next mapping key, or `None` at the end of the mapping.
pub fn next_key<R: EventReader + ?Sized>(reader: &mut R) -> Result<Option<String>> {
    match require_event(reader)? {
        Event::MappingEnd => Ok(None),
        Event::Scalar(s) => Ok(Some(s.into_string())),
        other => Err(Error::invalid_record(format!(
            "expected a mapping key, found {other}"
        ))),
    }
}

/// After reading `first`, consume the rest of its block so the stream stays
/// balanced.
fn skip_rest<R: EventReader + ?Sized>(reader: &mut R, first: &Event) -> Result<()> {
    match first {
        Event::MappingStart | Event::SequenceStart => {
            let mut depth = 1usize;
            while depth > 0 {
                match require_event(reader)? {
                    Event::MappingStart | Event::SequenceStart => depth += 1,
                    Event::MappingEnd | Event::SequenceEnd => depth -= 1,
                    Event::Scalar(_) => {}
                }
            }
            Ok(())
        }
        Event::MappingEnd | Event::SequenceEnd => {
            Err(Error::stream(format!("unexpected {first} where a value was expected")))
        }
        Event::Scalar(_) => Ok(()),
    }
}

// ============================================================================
// Writing helpers
// ============================================================================

/// Emits `key: value` for a text value.
pub fn emit_string_field<W: EventWriter + ?Sized>(
    writer: &mut W,
    key: &str,
    value: &str,
) -> Result<()> {
    writer.emit(Event::str(key))?;
    writer.emit(Event::str(value))
}

/// Emits `key: value` for an integer value.
pub fn emit_integer_field<W: EventWriter + ?Sized>(
    writer: &mut W,
    key: &str,
    value: i64,
) -> Result<()> {
    writer.emit(Event::str(key))?;
    writer.emit(Event::int(value))
}

/// Emits `key: value` only when `value` is present and non-empty.
pub fn emit_optional_field<W: EventWriter + ?Sized>(
    writer: &mut W,
    key: &str,
    value: Option<&str>,
) -> Result<()> {
    match value {
        Some(v) if !v.is_empty() => emit_string_field(writer, key, v),
        _ => Ok(()),
    }
}
