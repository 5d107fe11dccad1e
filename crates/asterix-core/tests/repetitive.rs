use std::sync::Arc;
use std::thread;

use asterix_core::{
    BitsField, DataItemFormat, Diagnostics, Encoding, FixedFormat, FormatKind, FormatNode,
    OutputKind, RepetitiveFormat, Severity,
};
use serde_json::{Value, json};

/// I048/250 assembled the way a schema loader does it: empty repetitive
/// node, fixed element attached, then bit fields added one by one.
fn mode_s_mb_data() -> DataItemFormat {
    let mut sink = Diagnostics::new();
    let mut format = DataItemFormat::Repetitive(RepetitiveFormat::new());
    format
        .add_sub_item(DataItemFormat::Fixed(FixedFormat::new(8)))
        .expect("fixed element");
    for field in [
        BitsField::new("MBDATA", 9, 64, Encoding::Hex)
            .unwrap()
            .with_name("Mode S Comm B message data"),
        BitsField::new("BDS1", 5, 8, Encoding::Unsigned)
            .unwrap()
            .with_name("Comm B Data Buffer Store 1 Address"),
        BitsField::new("BDS2", 1, 4, Encoding::Unsigned)
            .unwrap()
            .with_name("Comm B Data Buffer Store 2 Address"),
    ] {
        assert!(format.add_field(field, &mut sink));
    }
    assert!(sink.is_empty());
    format
}

const TWO_REGISTERS: [u8; 17] = [
    0x02, // repetitions
    0xA0, 0x00, 0x17, 0x00, 0x00, 0x00, 0x00, 0x40, // BDS 4,0
    0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x50, // BDS 5,0
];

fn decode(format: &DataItemFormat, kind: OutputKind, data: &[u8], declared_len: usize) -> (String, Diagnostics) {
    let mut out = String::new();
    let mut sink = Diagnostics::new();
    format.decode_text(&mut out, "I048/250", kind, data, declared_len, &mut sink);
    (out, sink)
}

#[test]
fn loader_path_builds_repetitive_format() {
    let format = mode_s_mb_data();
    assert_eq!(format.kind(), FormatKind::Repetitive);
    assert_eq!(format.length(&TWO_REGISTERS, &mut Diagnostics::new()), 17);
}

#[test]
fn json_output_is_an_array_of_registers() {
    let (out, sink) = decode(&mode_s_mb_data(), OutputKind::Json, &TWO_REGISTERS, 17);
    assert!(sink.is_empty());
    let value: Value = serde_json::from_str(&out).expect("valid json");
    assert_eq!(
        value,
        json!([
            {"MBDATA": "A0001700000000", "BDS1": 4, "BDS2": 0},
            {"MBDATA": "80000000000000", "BDS1": 5, "BDS2": 0},
        ])
    );
}

#[test]
fn text_output_lists_registers_in_order() {
    let (out, _) = decode(&mode_s_mb_data(), OutputKind::Out, &TWO_REGISTERS, 17);
    let lines: Vec<_> = out.lines().filter(|line| !line.is_empty()).collect();
    assert_eq!(
        lines,
        vec![
            "I048/250.MBDATA A0001700000000",
            "I048/250.BDS1 4",
            "I048/250.BDS2 0",
            "I048/250.MBDATA 80000000000000",
            "I048/250.BDS1 5",
            "I048/250.BDS2 0",
        ]
    );
}

#[test]
fn excluded_fields_disappear_from_every_register() {
    let mut format = mode_s_mb_data();
    let mut sink = Diagnostics::new();
    assert!(format.exclude_field("BDS2", &mut sink));
    assert!(format.is_field_excluded("BDS2", &mut sink));
    assert!(!format.is_field_excluded("BDS1", &mut sink));

    let (out, _) = decode(&format, OutputKind::Json, &TWO_REGISTERS, 17);
    let value: Value = serde_json::from_str(&out).expect("valid json");
    assert_eq!(value[0].get("BDS2"), None);
    assert_eq!(value[1]["BDS1"], 5);
}

#[test]
fn fully_excluded_item_appends_nothing() {
    let mut format = mode_s_mb_data();
    let mut sink = Diagnostics::new();
    for name in ["MBDATA", "BDS1", "BDS2"] {
        assert!(format.exclude_field(name, &mut sink));
    }

    for kind in OutputKind::ALL {
        let mut out = String::from("{\"I048/010\":{}}");
        let outcome = format.decode_text(&mut out, "I048/250", kind, &TWO_REGISTERS, 17, &mut sink);
        assert!(!outcome.produced, "{kind}");
        assert!(!outcome.aborted, "{kind}");
        assert_eq!(out, "{\"I048/010\":{}}", "{kind}");
    }
    assert!(sink.is_empty());
}

#[test]
fn corrupt_item_does_not_poison_the_sink_for_siblings() {
    let format = mode_s_mb_data();
    let mut sink = Diagnostics::new();
    let mut out = String::new();

    let bad = format.decode_text(&mut out, "I048/250", OutputKind::Json, &TWO_REGISTERS, 16, &mut sink);
    assert!(bad.aborted);
    assert!(out.is_empty());

    let good = format.decode_text(&mut out, "I048/250", OutputKind::Json, &TWO_REGISTERS, 17, &mut sink);
    assert!(good.produced);
    assert!(out.starts_with('['));

    let diagnostics = sink.into_vec();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].severity, Severity::Error);
    assert_eq!(diagnostics[0].code, "ASX-REP-LENGTH");
    assert!(diagnostics[0].message.contains("declared 16 bytes, expected 17"));
}

#[test]
fn describe_lists_element_fields() {
    let format = mode_s_mb_data();
    let mut sink = Diagnostics::new();
    let described = format.describe("I048/250", &mut sink);
    assert_eq!(
        described,
        "I048/250.MBDATA\tMode S Comm B message data\n\
         I048/250.BDS1\tComm B Data Buffer Store 1 Address\n\
         I048/250.BDS2\tComm B Data Buffer Store 2 Address\n"
    );
    assert_eq!(format.describe("I048/250", &mut sink), described);
}

#[test]
fn element_field_outside_record_is_reported() {
    let mut format = mode_s_mb_data();
    let mut sink = Diagnostics::new();
    let field = BitsField::new("SPARE", 60, 72, Encoding::Unsigned).unwrap();
    assert!(!format.add_field(field, &mut sink));
    assert!(sink.contains("ASX-BITS-RANGE"));
}

#[test]
fn shared_format_decodes_concurrently() {
    let format = Arc::new(mode_s_mb_data());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let format = Arc::clone(&format);
            thread::spawn(move || {
                let mut out = String::new();
                let mut sink = Diagnostics::new();
                format.decode_text(&mut out, "", OutputKind::Json, &TWO_REGISTERS, 17, &mut sink);
                (out, sink.is_empty())
            })
        })
        .collect();

    let outputs: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().expect("decoder thread"))
        .collect();
    assert!(outputs.iter().all(|(_, clean)| *clean));
    assert!(outputs.windows(2).all(|pair| pair[0].0 == pair[1].0));
}

#[cfg(feature = "analyzer")]
#[test]
fn analyzer_tree_locates_registers_in_record() {
    use asterix_core::FieldValue;

    let format = mode_s_mb_data();
    let mut sink = Diagnostics::new();
    // The item starts 12 bytes into its record.
    let chain = format
        .export_tree(&TWO_REGISTERS, 17, 12, &mut sink)
        .expect("chain");
    let located: Vec<_> = chain
        .iter()
        .map(|field| (field.id.as_str(), field.offset, field.length))
        .collect();
    assert_eq!(
        located,
        vec![
            ("REP", 12, 1),
            ("MBDATA", 13, 7),
            ("BDS1", 20, 1),
            ("BDS2", 20, 1),
            ("MBDATA", 21, 7),
            ("BDS1", 28, 1),
            ("BDS2", 28, 1),
        ]
    );
    assert_eq!(chain.head().map(|f| f.value.clone()), Some(FieldValue::Unsigned(2)));
}

#[cfg(feature = "analyzer")]
#[test]
fn analyzer_definitions_include_repetition_count() {
    let format = mode_s_mb_data();
    let definitions = format
        .export_definitions(&mut Diagnostics::new())
        .expect("definitions");
    let value = serde_json::to_value(&definitions).expect("definitions json");
    assert_eq!(value[0], json!({"id": "REP", "name": "Repetition count", "encoding": "unsigned"}));
    assert_eq!(value[1]["encoding"], "hex");
    assert_eq!(definitions.len(), 4);
}
