//! YAML adapter for the event boundary.
//!
//! [`YamlReader`] replays YAML text as [`Event`]s; [`YamlWriter`] collects
//! events back into a `serde_yaml::Value` and renders it.
//!
//! Reading takes two passes over the text. The first records the shape of
//! every node (mapping, sequence, null or other scalar); the second walks
//! the same nodes asking for each scalar as a string, which hands back its
//! source text. A plain `0x1F` therefore stays `"0x1F"` instead of becoming
//! `31`. Nulls become the empty string and tags are dropped. Mappings are
//! streamed entry by entry, so a repeated key arrives twice.

use crate::event::{Event, EventWriter, Scalar};
use dynsec_core::{Error, Result};
use serde::de::{self, DeserializeSeed, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde_yaml::{Mapping, Value};
use std::fmt;

// ============================================================================
// Reader
// ============================================================================

/// Replays a YAML document as events.
#[derive(Debug)]
pub struct YamlReader {
    events: std::vec::IntoIter<Event>,
}

impl YamlReader {
    /// Parses `text`; malformed YAML is a stream error.
    pub fn parse(text: &str) -> Result<Self> {
        let mut shapes = Vec::new();
        ShapeSeed {
            shapes: &mut shapes,
        }
        .deserialize(serde_yaml::Deserializer::from_str(text))
        .map_err(|e| Error::stream(format!("Failed to parse YAML: {e}")))?;

        let mut events = Vec::with_capacity(shapes.len() + 2);
        if shapes == [Shape::Null] {
            events.push(Event::str(""));
        } else {
            let mut remaining = shapes.into_iter();
            EventSeed {
                shapes: &mut remaining,
                out: &mut events,
            }
            .deserialize(serde_yaml::Deserializer::from_str(text))
            .map_err(|e| Error::stream(format!("Failed to parse YAML: {e}")))?;
        }

        Ok(Self {
            events: events.into_iter(),
        })
    }
}

impl Iterator for YamlReader {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        self.events.next().map(Ok)
    }
}

/// Node kinds in document order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Shape {
    Null,
    Text,
    Sequence,
    Mapping,
}

/// First pass: records the [`Shape`] of every node.
struct ShapeSeed<'a> {
    shapes: &'a mut Vec<Shape>,
}

impl ShapeSeed<'_> {
    fn scalar<E>(self, shape: Shape) -> std::result::Result<(), E> {
        self.shapes.push(shape);
        Ok(())
    }
}

impl<'de> DeserializeSeed<'de> for ShapeSeed<'_> {
    type Value = ();

    fn deserialize<D>(self, deserializer: D) -> std::result::Result<(), D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }
}

impl<'de> Visitor<'de> for ShapeSeed<'_> {
    type Value = ();

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a YAML node")
    }

    fn visit_bool<E>(self, _v: bool) -> std::result::Result<(), E> {
        self.scalar(Shape::Text)
    }

    fn visit_i64<E>(self, _v: i64) -> std::result::Result<(), E> {
        self.scalar(Shape::Text)
    }

    fn visit_i128<E>(self, _v: i128) -> std::result::Result<(), E> {
        self.scalar(Shape::Text)
    }

    fn visit_u64<E>(self, _v: u64) -> std::result::Result<(), E> {
        self.scalar(Shape::Text)
    }

    fn visit_u128<E>(self, _v: u128) -> std::result::Result<(), E> {
        self.scalar(Shape::Text)
    }

    fn visit_f64<E>(self, _v: f64) -> std::result::Result<(), E> {
        self.scalar(Shape::Text)
    }

    fn visit_str<E>(self, _v: &str) -> std::result::Result<(), E> {
        self.scalar(Shape::Text)
    }

    fn visit_none<E>(self) -> std::result::Result<(), E> {
        self.scalar(Shape::Null)
    }

    fn visit_unit<E>(self) -> std::result::Result<(), E> {
        self.scalar(Shape::Null)
    }

    fn visit_seq<A>(self, mut seq: A) -> std::result::Result<(), A::Error>
    where
        A: SeqAccess<'de>,
    {
        self.shapes.push(Shape::Sequence);
        while seq
            .next_element_seed(ShapeSeed {
                shapes: &mut *self.shapes,
            })?
            .is_some()
        {}
        Ok(())
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<(), A::Error>
    where
        A: MapAccess<'de>,
    {
        self.shapes.push(Shape::Mapping);
        while map
            .next_key_seed(ShapeSeed {
                shapes: &mut *self.shapes,
            })?
            .is_some()
        {
            map.next_value_seed(ShapeSeed {
                shapes: &mut *self.shapes,
            })?;
        }
        Ok(())
    }

    // A locally tagged node (`!name value`) arrives as an enum; the tag is
    // dropped and the node itself recorded.
    fn visit_enum<A>(self, data: A) -> std::result::Result<(), A::Error>
    where
        A: de::EnumAccess<'de>,
    {
        let (_tag, node) = data.variant::<IgnoredAny>()?;
        de::VariantAccess::newtype_variant_seed(node, self)
    }
}

/// Second pass: turns nodes into events, reading scalars as source text.
struct EventSeed<'a> {
    shapes: &'a mut std::vec::IntoIter<Shape>,
    out: &'a mut Vec<Event>,
}

impl EventSeed<'_> {
    fn child(&mut self) -> EventSeed<'_> {
        EventSeed {
            shapes: &mut *self.shapes,
            out: &mut *self.out,
        }
    }
}

impl<'de> DeserializeSeed<'de> for EventSeed<'_> {
    type Value = ();

    fn deserialize<D>(self, deserializer: D) -> std::result::Result<(), D::Error>
    where
        D: Deserializer<'de>,
    {
        match self.shapes.next() {
            Some(Shape::Null) => {
                deserializer.deserialize_ignored_any(IgnoredAny)?;
                self.out.push(Event::str(""));
                Ok(())
            }
            Some(Shape::Text) => deserializer.deserialize_str(self),
            Some(Shape::Sequence) => deserializer.deserialize_seq(self),
            Some(Shape::Mapping) => deserializer.deserialize_map(self),
            None => Err(de::Error::custom("more nodes than on the first pass")),
        }
    }
}

impl<'de> Visitor<'de> for EventSeed<'_> {
    type Value = ();

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a YAML node")
    }

    fn visit_str<E>(self, v: &str) -> std::result::Result<(), E> {
        self.out.push(Event::str(v));
        Ok(())
    }

    fn visit_seq<A>(mut self, mut seq: A) -> std::result::Result<(), A::Error>
    where
        A: SeqAccess<'de>,
    {
        self.out.push(Event::SequenceStart);
        while seq.next_element_seed(self.child())?.is_some() {}
        self.out.push(Event::SequenceEnd);
        Ok(())
    }

    fn visit_map<A>(mut self, mut map: A) -> std::result::Result<(), A::Error>
    where
        A: MapAccess<'de>,
    {
        self.out.push(Event::MappingStart);
        while map.next_key_seed(self.child())?.is_some() {
            map.next_value_seed(self.child())?;
        }
        self.out.push(Event::MappingEnd);
        Ok(())
    }
}

// ============================================================================
// Writer
// ============================================================================

#[derive(Debug)]
enum Frame {
    Sequence(Vec<Value>),
    Mapping { map: Mapping, key: Option<Value> },
}

/// Builds a YAML document from events.
#[derive(Debug, Default)]
pub struct YamlWriter {
    stack: Vec<Frame>,
    root: Option<Value>,
}

impl YamlWriter {
    /// An empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// The finished document. Fails if a mapping or sequence is still open.
    pub fn into_value(self) -> Result<Value> {
        if !self.stack.is_empty() {
            return Err(Error::emit(format!(
                "{} unclosed mapping/sequence at end of document",
                self.stack.len()
            )));
        }
        Ok(self.root.unwrap_or(Value::Null))
    }

    /// The finished document rendered as YAML text.
    pub fn into_string(self) -> Result<String> {
        let value = self.into_value()?;
        serde_yaml::to_string(&value).map_err(|e| Error::emit(format!("Failed to render YAML: {e}")))
    }

    fn push_value(&mut self, value: Value) -> Result<()> {
        match self.stack.last_mut() {
            None => {
                if self.root.is_some() {
                    return Err(Error::emit("more than one top-level value"));
                }
                self.root = Some(value);
            }
            Some(Frame::Sequence(items)) => items.push(value),
            Some(Frame::Mapping { map, key }) => match key.take() {
                Some(k) => {
                    map.insert(k, value);
                }
                None => *key = Some(value),
            },
        }
        Ok(())
    }
}

impl EventWriter for YamlWriter {
    fn emit(&mut self, event: Event) -> Result<()> {
        match event {
            Event::MappingStart => {
                self.stack.push(Frame::Mapping {
                    map: Mapping::new(),
                    key: None,
                });
                Ok(())
            }
            Event::SequenceStart => {
                self.stack.push(Frame::Sequence(Vec::new()));
                Ok(())
            }
            Event::MappingEnd => match self.stack.pop() {
                Some(Frame::Mapping { map, key: None }) => self.push_value(Value::Mapping(map)),
                Some(Frame::Mapping { key: Some(_), .. }) => {
                    Err(Error::emit("mapping closed with a key but no value"))
                }
                _ => Err(Error::emit("mapping end without matching start")),
            },
            Event::SequenceEnd => match self.stack.pop() {
                Some(Frame::Sequence(items)) => self.push_value(Value::Sequence(items)),
                _ => Err(Error::emit("sequence end without matching start")),
            },
            Event::Scalar(Scalar::Str(s)) => self.push_value(Value::String(s)),
            Event::Scalar(Scalar::Int(i)) => self.push_value(Value::Number(i.into())),
        }
    }
}
