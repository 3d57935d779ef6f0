//! Generate `entropic::Entropic` impls for IE containers as Rust source text.
//!
//! The generated code targets the structures produced by the ASN.1 compiler:
//! `<T>ProtocolIEs(Vec<<T>ProtocolIEs_Entry>)` whose entry value enum
//! `<T>ProtocolIEs_EntryValue` has one variant per IE identifier. It uses
//! `entropic::{Source, Sink, EntropyScheme, Error}` which the target module imports.

use crate::ast::{ContainerDefinition, ContainerNames, FieldSpec, Presence};

/// Generate the impls for all containers, in order.
pub fn generate(definitions: &[ContainerDefinition]) -> String {
    let mut output = String::new();
    for def in definitions {
        output.push_str(&generate_container(def));
    }
    output
}

pub fn generate_container(def: &ContainerDefinition) -> String {
    let names = def.names();
    let mut from_entropy = String::new();
    let mut to_entropy = String::new();
    for field in &def.fields {
        from_entropy.push_str(&from_entropy_field(&names, field));
        to_entropy.push_str(&to_entropy_field(&names, field));
    }

    format!(
        r#"
{anchor}{{
    #[inline]
    fn from_entropy_source<'a, I: Iterator<Item = &'a u8>, E: EntropyScheme>(
        source: &mut Source<'a, I, E>,
    ) -> Result<Self, Error> {{
        let mut ie_list = Vec::new();
{from_entropy}
        Ok({container}(ie_list))
    }}

    #[inline]
    fn to_entropy_sink<'a, I: Iterator<Item = &'a mut u8>, E: EntropyScheme>(
        &self,
        sink: &mut Sink<'a, I, E>,
    ) -> Result<usize, Error> {{
        let mut ie_idx = 0;
        let mut length = 0;
{to_entropy}
        if ie_idx != self.0.len() {{
            return Err(entropic::Error::Internal);
        }}

        Ok(length)
    }}
}}
"#,
        anchor = names.anchor(),
        container = names.container,
    )
}

fn presence_comment(presence: Presence) -> &'static str {
    match presence {
        Presence::Mandatory => "1/32 chance of missing",
        Presence::Conditional => "1/4 chance of being present",
        Presence::Optional => "1/16 chance of being present",
    }
}

fn decode_condition(presence: Presence) -> String {
    let mask = presence.mask();
    match presence {
        Presence::Mandatory => format!("(b & {}) != {}", bin(mask), bin(mask)),
        Presence::Conditional | Presence::Optional => format!("(b & {}) == {}", bin(mask), bin(mask)),
    }
}

fn from_entropy_field(names: &ContainerNames, field: &FieldSpec) -> String {
    format!(
        r#"
        let b = source.get_byte()?;
        if {cond} {{ // {comment}
            let ie_value = {entry_value}::{ident}(source.get_entropic()?);
            ie_list.push({entry} {{
                id: ProtocolIE_ID(ie_value.choice_key()),
                criticality: Criticality(Criticality::IGNORE),
                value: ie_value,
            }});
        }}
"#,
        cond = decode_condition(field.presence),
        comment = presence_comment(field.presence),
        entry_value = names.entry_value,
        entry = names.entry,
        ident = field.identifier,
    )
}

fn to_entropy_field(names: &ContainerNames, field: &FieldSpec) -> String {
    format!(
        r#"
        if let Some({entry_value}::{ident}(value)) = self.0.get(ie_idx).map(|ie| &ie.value) {{
            ie_idx += 1;
            length += sink.put_byte({present})?;
            length += sink.put_entropic(value)?;
        }} else {{
            length += sink.put_byte({absent})?;
        }}
"#,
        entry_value = names.entry_value,
        ident = field.identifier,
        present = bin(field.presence.present_byte()),
        absent = bin(field.presence.absent_byte()),
    )
}

/// `0b_0001_1111` style literal.
fn bin(b: u8) -> String {
    format!("0b_{:04b}_{:04b}", b >> 4, b & 0x0F)
}
