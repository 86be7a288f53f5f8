//! Field files through `FileInput`, derivation, and outputs.

#![allow(clippy::unwrap_used)]

use aim_inputs::compute::G;
use aim_inputs::{
    Field, FieldMetadata, InputArgs, LevType, get_input, get_output, read_fields,
};

const LEVELS: [i64; 3] = [500, 850, 1000];

fn write_jsonl(dir: &std::path::Path) -> std::path::PathBuf {
    let mut lines = Vec::new();
    for level in LEVELS {
        for (param, value) in [("q", 0.004), ("t", 273.15), ("gh", 1500.0)] {
            let field = Field::new(
                FieldMetadata::new(param, LevType::Pl)
                    .with_level(level)
                    .with_shape(vec![2, 2]),
                vec![value; 4],
            )
            .unwrap();
            lines.push(serde_json::to_string(&field).unwrap());
        }
    }
    lines.push(String::new());
    let msl = Field::new(FieldMetadata::new("msl", LevType::Sfc), vec![101325.0; 4]).unwrap();
    lines.push(serde_json::to_string(&msl).unwrap());

    let path = dir.join("init.jsonl");
    std::fs::write(&path, lines.join("\n")).unwrap();
    path
}

#[test]
fn test_file_input_end_to_end() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = write_jsonl(dir.path());

    let input = get_input("file", &InputArgs::default().with_file(&path)).unwrap();
    let fields = input.all_fields().unwrap();

    // 9 pl + 1 sfc from the file, tcwv, one r per level
    assert_eq!(fields.len(), 10 + 1 + LEVELS.len());

    let tcwv = &input.fields_sfc().unwrap().sel_param("tcwv").into_vec()[0];
    assert_eq!(tcwv.level(), None);
    assert_eq!(tcwv.metadata.shape, Some(vec![2, 2]));
    // dp over 500 -> 850 -> 1000 hPa is 50000 Pa
    let expected = 0.004 * 50_000.0 / G;
    assert!(tcwv.values.iter().all(|v| (v - expected).abs() < 1e-9));

    let r = input.fields_pl().unwrap().sel_param("r");
    assert_eq!(r.levels(), LEVELS.to_vec());
    assert!(r.iter().flat_map(|f| f.values.iter()).all(|v| (0.0..=100.0).contains(v)));
}

#[test]
fn test_input_to_output_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = write_jsonl(dir.path());
    let out = dir.path().join("derived.json");

    let input = get_input("file", &InputArgs::default().with_file(&path)).unwrap();
    let mut output = get_output("file", Some(out.clone())).unwrap();
    for field in input.all_fields().unwrap() {
        output.write(field).unwrap();
    }
    let summary = output.finish().unwrap();

    let written = read_fields(&out).unwrap();
    assert_eq!(written.len(), summary.fields_written);
    assert_eq!(&written, input.all_fields().unwrap());
}
