use predicates::prelude::*;
use serde_json::Value;
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn collkey() -> Result<assert_cmd::Command, Box<dyn Error>> {
    Ok(assert_cmd::Command::cargo_bin("collkey")?)
}

fn stdout_of(args: &[&str]) -> Result<String, Box<dyn Error>> {
    let output = collkey()?
        .args(args)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    Ok(String::from_utf8(output)?)
}

struct SampleImage {
    _dir: TempDir,
    path: PathBuf,
}

fn export_sample_image(description: &str) -> Result<SampleImage, Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("sample.ckd");
    collkey()?
        .args([
            "export-data",
            "-o",
            path.to_str().unwrap(),
            "--description",
            description,
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote"));
    Ok(SampleImage { _dir: dir, path })
}

#[test]
fn key_prints_hex_key_and_text() -> Result<(), Box<dyn Error>> {
    let stdout = stdout_of(&["key", "ab", "c"])?;
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    let (key, text) = lines[0].split_once('\t').unwrap();
    assert_eq!(text, "ab");
    assert!(key.ends_with(" 00"));
    assert_eq!(key.split(' ').filter(|b| *b == "01").count(), 2);
    Ok(())
}

#[test]
fn key_json_output_parses() -> Result<(), Box<dyn Error>> {
    let stdout = stdout_of(&["key", "x", "--strength", "identical", "--format", "json"])?;
    let value: Value = serde_json::from_str(&stdout)?;
    let entry = &value.as_array().unwrap()[0];
    assert_eq!(entry["text"], "x");
    let key = entry["key"].as_str().unwrap();
    assert_eq!(key.split(' ').filter(|b| *b == "01").count(), 4);
    Ok(())
}

#[test]
fn compare_respects_strength() -> Result<(), Box<dyn Error>> {
    assert_eq!(stdout_of(&["compare", "a", "A"])?.trim(), "<");
    assert_eq!(
        stdout_of(&["compare", "a", "A", "--strength", "primary"])?.trim(),
        "="
    );
    assert_eq!(
        stdout_of(&["compare", "a", "A", "--case-first", "upper"])?.trim(),
        ">"
    );
    Ok(())
}

#[test]
fn compare_shifted_ignores_punctuation() -> Result<(), Box<dyn Error>> {
    assert_eq!(stdout_of(&["compare", "ab", "a-b"])?.trim(), ">");
    assert_eq!(
        stdout_of(&["compare", "ab", "a-b", "--alternate", "shifted"])?.trim(),
        "="
    );
    Ok(())
}

#[test]
fn sort_file_with_backward_secondary() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("words.txt");
    let output = dir.path().join("sorted.txt");
    fs::write(&input, "c\u{f4}te\ncot\u{e9}\ncote\nc\u{f4}t\u{e9}\n")?;

    let forward = stdout_of(&["sort", input.to_str().unwrap()])?;
    assert_eq!(
        forward.lines().collect::<Vec<_>>(),
        ["cote", "cot\u{e9}", "c\u{f4}te", "c\u{f4}t\u{e9}"]
    );

    collkey()?
        .args([
            "sort",
            input.to_str().unwrap(),
            "--backward-secondary",
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .success();
    let backward = fs::read_to_string(&output)?;
    assert_eq!(
        backward.lines().collect::<Vec<_>>(),
        ["cote", "c\u{f4}te", "cot\u{e9}", "c\u{f4}t\u{e9}"]
    );
    Ok(())
}

#[test]
fn sort_stdin_unique_at_primary_strength() -> Result<(), Box<dyn Error>> {
    collkey()?
        .args(["sort", "--unique", "--strength", "primary"])
        .write_stdin("b\nA\na\nB\n")
        .assert()
        .success()
        .stdout("A\nb\n");
    Ok(())
}

#[test]
fn bocsu_encode_then_decode() -> Result<(), Box<dyn Error>> {
    let encoded = stdout_of(&["bocsu", "abc\u{4e00}"])?;
    let decoded = stdout_of(&["bocsu", "--decode", encoded.trim()])?;
    assert_eq!(decoded.trim(), "U+0061 U+0062 U+0063 U+4E00");

    let from_code_points = stdout_of(&["bocsu", "--code-points", "U+0061,U+0062,U+0063,U+4E00"])?;
    assert_eq!(from_code_points, encoded);
    Ok(())
}

#[test]
fn bocsu_rejects_malformed_hex() -> Result<(), Box<dyn Error>> {
    collkey()?
        .args(["bocsu", "--decode", "abc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("InvalidHex"));
    Ok(())
}

#[test]
fn reorder_json_moves_greek_first() -> Result<(), Box<dyn Error>> {
    let stdout = stdout_of(&["reorder", "Grek,Latn", "--format", "json"])?;
    let value: Value = serde_json::from_str(&stdout)?;
    let reordered = |name: &str| -> String {
        value["groups"]
            .as_array()
            .unwrap()
            .iter()
            .find(|g| g["name"] == name)
            .and_then(|g| g["reordered_first"].as_str())
            .unwrap()
            .to_string()
    };
    assert!(reordered("grek") < reordered("latn"));
    assert!(reordered("latn") < reordered("cyrl"));
    Ok(())
}

#[test]
fn reorder_unknown_script_fails() -> Result<(), Box<dyn Error>> {
    collkey()?
        .args(["reorder", "Klingon"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown script or group"));
    Ok(())
}

#[test]
fn inspect_exported_image() -> Result<(), Box<dyn Error>> {
    let image = export_sample_image("cli test data")?;
    let stdout = stdout_of(&["inspect-data", image.path.to_str().unwrap(), "--format", "json"])?;
    let value: Value = serde_json::from_str(&stdout)?;
    assert_eq!(value["description"], "cli test data");
    assert_eq!(value["has_jamo"], true);
    assert!(value["groups"]
        .as_array()
        .unwrap()
        .iter()
        .any(|g| g["name"] == "hani"));

    let table = stdout_of(&["inspect-data", image.path.to_str().unwrap()])?;
    assert!(table.contains("Description:     cli test data"));
    Ok(())
}

#[test]
fn keys_from_image_match_builtin_data() -> Result<(), Box<dyn Error>> {
    let image = export_sample_image("round trip")?;
    let builtin = stdout_of(&["key", "r\u{e9}sum\u{e9}", "\u{ac01}"])?;
    let loaded = stdout_of(&[
        "key",
        "r\u{e9}sum\u{e9}",
        "\u{ac01}",
        "--data",
        image.path.to_str().unwrap(),
    ])?;
    assert_eq!(builtin, loaded);
    Ok(())
}

#[test]
fn corrupted_image_is_rejected() -> Result<(), Box<dyn Error>> {
    let image = export_sample_image("corrupt me")?;
    let mut bytes = fs::read(&image.path)?;
    let middle = bytes.len() / 2;
    bytes[middle] ^= 0x40;
    fs::write(&image.path, &bytes)?;

    collkey()?
        .args(["inspect-data", image.path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ChecksumMismatch"));
    Ok(())
}

#[test]
fn settings_file_applies_and_flags_override() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let settings = dir.path().join("collation.toml");
    fs::write(&settings, "strength = \"primary\"\nreorder = [\"Grek\", \"Latn\"]\n")?;
    let path = settings.to_str().unwrap();

    assert_eq!(
        stdout_of(&["compare", "a", "A", "--settings", path])?.trim(),
        "="
    );
    assert_eq!(
        stdout_of(&["compare", "\u{3b1}", "z", "--settings", path])?.trim(),
        "<"
    );
    assert_eq!(
        stdout_of(&["compare", "a", "A", "--settings", path, "--strength", "tertiary"])?.trim(),
        "<"
    );
    Ok(())
}
