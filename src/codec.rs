//! Materialize and serialize IE lists from container definitions at runtime.
//!
//! This interprets the same presence contract the generated `Entropic` impls follow,
//! one sentinel byte per declared field in declaration order:
//!
//! - materialize: read the sentinel, and when it says "present" decode the value with
//!   the [`ValueCodec`] and push an [`IeEntry`] with `Criticality::Ignore`.
//! - serialize: walk the fields with a cursor into the list; an entry at the cursor
//!   whose id matches the field is written as present (sentinel then value), anything
//!   else as absent. Leftover entries fail with [`EntropyError::Internal`].
//!
//! The scheme is lossy: only the masked sentinel bits survive a round trip.

use crate::ast::ContainerDefinition;
use crate::entropy::{EntropyError, EntropySink, EntropySource};
use std::collections::HashMap;
use std::io::{Read, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Criticality {
    Reject,
    #[default]
    Ignore,
    Notify,
}

/// One present IE of a materialized container.
#[derive(Debug, Clone, PartialEq)]
pub struct IeEntry<V> {
    /// Normalized field identifier, the discriminant of the entry value.
    pub id: String,
    pub criticality: Criticality,
    pub value: V,
}

impl<V> IeEntry<V> {
    pub fn new(id: impl Into<String>, value: V) -> Self {
        IeEntry {
            id: id.into(),
            criticality: Criticality::default(),
            value,
        }
    }
}

/// Per-type value codec: how an IE value of a declared type maps to entropy.
pub trait ValueCodec {
    type Value;

    fn decode<R: Read>(
        &self,
        value_type: &str,
        source: &mut EntropySource<R>,
    ) -> Result<Self::Value, EntropyError>;

    fn encode<W: Write>(
        &self,
        value_type: &str,
        value: &Self::Value,
        sink: &mut EntropySink<W>,
    ) -> Result<usize, EntropyError>;
}

/// Every value is a single entropy byte, whatever its declared type.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByteValueCodec;

impl ValueCodec for ByteValueCodec {
    type Value = u8;

    fn decode<R: Read>(&self, _value_type: &str, source: &mut EntropySource<R>) -> Result<u8, EntropyError> {
        source.get_byte()
    }

    fn encode<W: Write>(&self, _value_type: &str, value: &u8, sink: &mut EntropySink<W>) -> Result<usize, EntropyError> {
        sink.put_byte(*value)
    }
}

/// Codec for a single container definition.
pub struct ContainerCodec<'d, C> {
    definition: &'d ContainerDefinition,
    values: C,
}

impl<'d, C: ValueCodec> ContainerCodec<'d, C> {
    pub fn new(definition: &'d ContainerDefinition, values: C) -> Self {
        ContainerCodec { definition, values }
    }

    pub fn definition(&self) -> &ContainerDefinition {
        self.definition
    }

    pub fn materialize<R: Read>(
        &self,
        source: &mut EntropySource<R>,
    ) -> Result<Vec<IeEntry<C::Value>>, EntropyError> {
        let mut ie_list = Vec::new();
        for field in &self.definition.fields {
            let b = source.get_byte()?;
            if field.presence.is_present(b) {
                let value = self.values.decode(&field.value_type, source)?;
                ie_list.push(IeEntry::new(field.identifier.clone(), value));
            }
        }
        Ok(ie_list)
    }

    /// Returns the number of bytes written, sentinels and values together.
    pub fn serialize<W: Write>(
        &self,
        ie_list: &[IeEntry<C::Value>],
        sink: &mut EntropySink<W>,
    ) -> Result<usize, EntropyError> {
        let mut ie_idx = 0;
        let mut length = 0;
        for field in &self.definition.fields {
            match ie_list.get(ie_idx) {
                Some(ie) if ie.id == field.identifier => {
                    ie_idx += 1;
                    length += sink.put_byte(field.presence.present_byte())?;
                    length += self.values.encode(&field.value_type, &ie.value, sink)?;
                }
                _ => length += sink.put_byte(field.presence.absent_byte())?,
            }
        }
        if ie_idx != ie_list.len() {
            return Err(EntropyError::Internal {
                container: self.definition.names().container,
                consumed: ie_idx,
                total: ie_list.len(),
            });
        }
        Ok(length)
    }
}

/// Container codecs keyed by type name.
pub struct Codec<C> {
    definitions: Vec<ContainerDefinition>,
    by_name: HashMap<String, usize>,
    values: C,
}

impl<C: ValueCodec + Clone> Codec<C> {
    /// Later definitions with a name already seen are ignored; the first one wins.
    pub fn new(definitions: Vec<ContainerDefinition>, values: C) -> Self {
        let mut by_name = HashMap::new();
        for (i, d) in definitions.iter().enumerate() {
            by_name.entry(d.type_name.clone()).or_insert(i);
        }
        Codec {
            definitions,
            by_name,
            values,
        }
    }

    pub fn container(&self, type_name: &str) -> Option<ContainerCodec<'_, C>> {
        self.by_name
            .get(type_name)
            .map(|&i| ContainerCodec::new(&self.definitions[i], self.values.clone()))
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.definitions.iter().map(|d| d.type_name.as_str())
    }
}
