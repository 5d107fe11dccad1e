use std::fs;
use std::path::{Path, PathBuf};

use asterix_core::{
    BitsField, DataItemFormat, Diagnostics, Encoding, FixedFormat, FormatNode, OutputKind,
    RepetitiveFormat,
};
use serde_json::Value;

fn case_dir(case: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("golden")
        .join(case)
}

fn read_fixture(case: &str, name: &str) -> String {
    let path = case_dir(case).join(name);
    fs::read_to_string(&path).unwrap_or_else(|err| panic!("read {}: {err}", path.display()))
}

fn load_input(case: &str) -> Vec<u8> {
    read_fixture(case, "input.hex")
        .split_whitespace()
        .map(|byte| u8::from_str_radix(byte, 16).expect("hex byte"))
        .collect()
}

fn load_json(case: &str, name: &str) -> Value {
    serde_json::from_str(&read_fixture(case, name)).expect("parse expected json")
}

/// CAT034 I034/070 Plot Count Values.
fn i034_070() -> DataItemFormat {
    let element = FixedFormat::new(2)
        .with_field(
            BitsField::new("TYP", 12, 16, Encoding::Unsigned)
                .unwrap()
                .with_name("Type of plot counter")
                .with_meaning(0, "Sum of all plots")
                .with_meaning(1, "PSR only plots")
                .with_meaning(2, "SSR only plots")
                .with_meaning(3, "SSR+PSR plots"),
        )
        .unwrap()
        .with_field(
            BitsField::new("COUNTER", 1, 11, Encoding::Unsigned)
                .unwrap()
                .with_name("Counter value"),
        )
        .unwrap();
    DataItemFormat::Repetitive(RepetitiveFormat::with_element(element))
}

/// CAT048 I048/120 subfield #2, Raw Doppler Speed.
fn i048_120_rds() -> DataItemFormat {
    let element = FixedFormat::new(6)
        .with_field(
            BitsField::new("DOP", 33, 48, Encoding::Signed)
                .unwrap()
                .with_name("Doppler speed")
                .with_scale(1.0)
                .with_unit("m/s"),
        )
        .unwrap()
        .with_field(
            BitsField::new("AMB", 17, 32, Encoding::Unsigned)
                .unwrap()
                .with_name("Ambiguity range")
                .with_unit("m/s"),
        )
        .unwrap()
        .with_field(
            BitsField::new("FRQ", 1, 16, Encoding::Unsigned)
                .unwrap()
                .with_name("Transmitter frequency")
                .with_unit("MHz"),
        )
        .unwrap();
    DataItemFormat::Repetitive(RepetitiveFormat::with_element(element))
}

fn decode(format: &DataItemFormat, header: &str, kind: OutputKind, data: &[u8]) -> String {
    let mut out = String::new();
    let mut sink = Diagnostics::new();
    let outcome = format.decode_text(&mut out, header, kind, data, data.len(), &mut sink);
    assert!(outcome.produced, "{kind} produced nothing");
    assert!(sink.is_empty(), "{kind} diagnostics: {:?}", sink.into_vec());
    out
}

fn run_golden(case: &str, header: &str, format: DataItemFormat) {
    let data = load_input(case);
    assert_eq!(
        format.length(&data, &mut Diagnostics::new()),
        data.len(),
        "length mismatch in {case}"
    );

    for (kind, fixture) in [
        (OutputKind::Text, "expected_text.txt"),
        (OutputKind::Out, "expected_out.txt"),
    ] {
        let actual = decode(&format, header, kind, &data);
        assert_eq!(actual, read_fixture(case, fixture), "golden {kind} mismatch in {case}");
    }

    for (kind, fixture) in [
        (OutputKind::Json, "expected_json.json"),
        (OutputKind::JsonHuman, "expected_jsonh.json"),
        (OutputKind::JsonExtensive, "expected_jsone.json"),
    ] {
        let actual = decode(&format, header, kind, &data);
        let actual: Value = serde_json::from_str(&actual).expect("decoder emits valid json");
        assert_eq!(actual, load_json(case, fixture), "golden {kind} mismatch in {case}");
    }

    #[cfg(feature = "analyzer")]
    check_tree(case, &format, &data);
}

#[cfg(feature = "analyzer")]
fn check_tree(case: &str, format: &DataItemFormat, data: &[u8]) {
    let mut sink = Diagnostics::new();
    let chain = format
        .export_tree(data, data.len(), 0, &mut sink)
        .expect("analyzer chain");
    let actual = serde_json::to_value(chain).expect("serialize chain");
    assert_eq!(actual, load_json(case, "expected_tree.json"), "golden tree mismatch in {case}");
    assert!(sink.is_empty());
}

#[test]
fn golden_i034_070() {
    run_golden("i034_070", "I034/070", i034_070());
}

#[test]
fn golden_i048_120_rds() {
    run_golden("i048_120_rds", "I048/120", i048_120_rds());
}
