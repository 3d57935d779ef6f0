//! Presence scheme tests: materialize/serialize over container definitions, and
//! agreement between the runtime codec and the generated impl text.

use proto_ies_gen::{
    generate_container, scan, ByteValueCodec, Codec, ContainerCodec, ContainerDefinition, Criticality,
    EntropyError, EntropySink, EntropySource, FieldSpec, IeEntry, Presence, ValueCodec,
};
use std::io::{Cursor, Read, Write};

fn x() -> ContainerDefinition {
    ContainerDefinition {
        type_name: "X".to_string(),
        fields: vec![
            FieldSpec::new("M_one", "TA", Presence::Mandatory),
            FieldSpec::new("O_one", "TB", Presence::Optional),
            FieldSpec::new("C_one", "TC", Presence::Conditional),
        ],
    }
}

fn serialize(def: &ContainerDefinition, list: &[IeEntry<u8>]) -> Result<Vec<u8>, EntropyError> {
    let codec = ContainerCodec::new(def, ByteValueCodec);
    let mut sink = EntropySink::new(Vec::new());
    let n = codec.serialize(list, &mut sink)?;
    let bytes = sink.into_inner();
    assert_eq!(n, bytes.len());
    Ok(bytes)
}

#[test]
fn all_absent_materializes_empty_and_serializes_canonical_sentinels() {
    let def = x();
    let codec = ContainerCodec::new(&def, ByteValueCodec);
    let list = codec
        .materialize(&mut EntropySource::from_bytes(&[0b_0001_1111, 0x00, 0x00]))
        .expect("materialize");
    assert!(list.is_empty());
    assert_eq!(serialize(&def, &list).unwrap(), vec![0b_0001_1111, 0b_0000_0000, 0b_0000_0000]);
}

#[test]
fn zero_bytes_keep_the_mandatory_ie() {
    let def = x();
    let codec = ContainerCodec::new(&def, ByteValueCodec);
    // sentinel 0x00 for M_one is "present", so its value byte follows
    let list = codec
        .materialize(&mut EntropySource::from_bytes(&[0x00, 0xAA, 0x00, 0x00]))
        .expect("materialize");
    assert_eq!(list, vec![IeEntry::new("M_one", 0xAA)]);
}

#[test]
fn sentinel_bytes_select_presence() {
    let def = x();
    let codec = ContainerCodec::new(&def, ByteValueCodec);
    let list = codec
        .materialize(&mut EntropySource::from_bytes(&[0b_1110_0000, 1, 0b_0000_1111, 2, 0b_0000_0011, 3]))
        .expect("materialize");
    assert_eq!(
        list,
        vec![IeEntry::new("M_one", 1), IeEntry::new("O_one", 2), IeEntry::new("C_one", 3)]
    );
    assert!(list.iter().all(|ie| ie.criticality == Criticality::Ignore));

    // 0xFF has the low five bits set: the mandatory IE goes missing
    let list = codec
        .materialize(&mut EntropySource::from_bytes(&[0xFF, 0b_0000_1111, 2, 0b_0000_0011, 3]))
        .expect("materialize");
    assert_eq!(list, vec![IeEntry::new("O_one", 2), IeEntry::new("C_one", 3)]);
}

#[test]
fn upper_bits_are_not_preserved() {
    let def = x();
    let codec = ContainerCodec::new(&def, ByteValueCodec);
    let input = [0b_1111_1111, 0b_1010_1111, 7, 0b_0100_0000];
    let list = codec.materialize(&mut EntropySource::from_bytes(&input)).expect("materialize");
    assert_eq!(list, vec![IeEntry::new("O_one", 7)]);
    assert_eq!(serialize(&def, &list).unwrap(), vec![0b_0001_1111, 0b_0000_1111, 7, 0b_0000_0000]);
}

#[test]
fn canonical_stream_round_trips() {
    let def = x();
    let codec = ContainerCodec::new(&def, ByteValueCodec);
    let canonical = vec![0x00, 9, 0x00, 0x03, 8];
    let list = codec.materialize(&mut EntropySource::from_bytes(&canonical)).expect("materialize");
    assert_eq!(serialize(&def, &list).unwrap(), canonical);
}

#[test]
fn unmatched_entry_is_internal_error() {
    let err = serialize(&x(), &[IeEntry::new("Z_other", 1)]).unwrap_err();
    match err {
        EntropyError::Internal { container, consumed, total } => {
            assert_eq!(container, "XProtocolIEs");
            assert_eq!(consumed, 0);
            assert_eq!(total, 1);
        }
        other => panic!("expected Internal, got {:?}", other),
    }
}

#[test]
fn out_of_order_entries_are_internal_error() {
    let list = [IeEntry::new("C_one", 1), IeEntry::new("M_one", 2)];
    assert!(matches!(serialize(&x(), &list), Err(EntropyError::Internal { consumed: 1, total: 2, .. })));
}

#[test]
fn bounded_sink_fills_up() {
    let def = x();
    let codec = ContainerCodec::new(&def, ByteValueCodec);
    let mut buf = [0u8; 2];
    let mut sink = EntropySink::new(Cursor::new(&mut buf[..]));
    assert!(matches!(codec.serialize(&[], &mut sink), Err(EntropyError::SinkFull)));
}

/// Values are two bytes for `TB`, one byte otherwise.
#[derive(Clone)]
struct WidthCodec;

impl ValueCodec for WidthCodec {
    type Value = Vec<u8>;

    fn decode<R: Read>(&self, value_type: &str, source: &mut EntropySource<R>) -> Result<Vec<u8>, EntropyError> {
        let width = if value_type == "TB" { 2 } else { 1 };
        (0..width).map(|_| source.get_byte()).collect()
    }

    fn encode<W: Write>(&self, value_type: &str, value: &Vec<u8>, sink: &mut EntropySink<W>) -> Result<usize, EntropyError> {
        let width = if value_type == "TB" { 2 } else { 1 };
        if value.len() != width {
            return Err(EntropyError::Value(format!("bad width for {}", value_type)));
        }
        let mut n = 0;
        for b in value {
            n += sink.put_byte(*b)?;
        }
        Ok(n)
    }
}

#[test]
fn value_codec_sees_declared_type() {
    let def = x();
    let codec = ContainerCodec::new(&def, WidthCodec);
    let input = [0x1F, 0x0F, 5, 6, 0x03, 7];
    let list = codec.materialize(&mut EntropySource::from_bytes(&input)).expect("materialize");
    assert_eq!(list, vec![IeEntry::new("O_one", vec![5, 6]), IeEntry::new("C_one", vec![7])]);
    let mut sink = EntropySink::new(Vec::new());
    assert_eq!(codec.serialize(&list, &mut sink).unwrap(), 6);
    assert_eq!(sink.into_inner(), input.to_vec());
}

#[test]
fn codec_from_scanned_specification() {
    let spec = r#"
PagingIEs S1AP-PROTOCOL-IES ::= {
	{ ID id-UEIdentityIndexValue	CRITICALITY ignore	TYPE UEIdentityIndexValue	PRESENCE mandatory} |
	{ ID id-CNDomain				CRITICALITY ignore	TYPE CNDomain				PRESENCE mandatory} |
	{ ID id-CSG-IdList				CRITICALITY ignore	TYPE CSG-IdList				PRESENCE optional},
	...
}
"#;
    let scanned = scan(spec).expect("scan");
    let codec = Codec::new(scanned.definitions, ByteValueCodec);
    let paging = codec.container("Paging").expect("Paging");
    let list = paging
        .materialize(&mut EntropySource::from_bytes(&[0x00, 1, 0x1F, 0x0F, 3]))
        .expect("materialize");
    let ids: Vec<&str> = list.iter().map(|ie| ie.id.as_str()).collect();
    assert_eq!(ids, vec!["Id_UEIdentityIndexValue", "Id_CSG_IdList"]);
}

#[test]
fn generated_sentinels_match_runtime_scheme() {
    let out = generate_container(&x());
    for field in &x().fields {
        let p = field.presence;
        let present = format!("length += sink.put_byte(0b_{:04b}_{:04b})?;", p.present_byte() >> 4, p.present_byte() & 0x0F);
        let absent = format!("length += sink.put_byte(0b_{:04b}_{:04b})?;", p.absent_byte() >> 4, p.absent_byte() & 0x0F);
        assert!(out.contains(&present), "{} present sentinel missing", field.identifier);
        assert!(out.contains(&absent), "{} absent sentinel missing", field.identifier);
        assert!(out.contains(&format!("XProtocolIEs_EntryValue::{}(value)", field.identifier)));
    }
}
