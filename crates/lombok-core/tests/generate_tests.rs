use std::fs;

use anyhow::Result;
use lombok_core::{
    generate_source, scan_package, scan_source, synthesize, LombokError, PackageReport,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const ACCOUNT: &str = include_str!("testdata/account.go");
const ACCOUNT_GOLDEN: &str = include_str!("testdata/account.properties.golden");
const LEGACY: &str = include_str!("testdata/legacy.go");

const MODEL_PATH: &str = "github.com/acme/shop/model";

#[test]
fn test_generate_matches_golden() -> Result<()> {
    let generated = generate_source(MODEL_PATH, ACCOUNT)?;
    assert_eq!(generated.as_deref(), Some(ACCOUNT_GOLDEN));
    Ok(())
}

#[test]
fn test_generated_file_is_stable_under_rescan() -> Result<()> {
    // feeding the generated accessors back in must not change the output
    let dir = TempDir::new()?;
    let source = dir.path().join("account.go");
    let generated = dir.path().join("model.properties.go");
    fs::write(&source, ACCOUNT)?;
    fs::write(&generated, ACCOUNT_GOLDEN)?;

    let pkg = scan_package(MODEL_PATH, &[source, generated])?;
    assert_eq!(synthesize(&pkg).as_deref(), Some(ACCOUNT_GOLDEN));
    Ok(())
}

#[test]
fn test_scan_package_merges_files() -> Result<()> {
    let dir = TempDir::new()?;
    let first = dir.path().join("a.go");
    let second = dir.path().join("b.go");
    fs::write(
        &first,
        "package store\n\ntype Item struct {\n\tsku string `get:\"\"`\n}\n",
    )?;
    fs::write(
        &second,
        "package store\n\nfunc (it *Item) Price() int { return it.price }\n",
    )?;

    let pkg = scan_package("example.com/inventory", &[first, second])?;
    assert_eq!(pkg.name(), "store");
    assert_eq!(pkg.path(), "example.com/inventory");

    let item = pkg.get_type("Item").expect("Item scanned");
    assert_eq!(item.field_names(), &["sku".to_string()]);
    assert_eq!(item.observed_receiver(), Some("it"));

    let text = synthesize(&pkg).expect("sku has a getter");
    assert!(text.starts_with("package store\n"));
    assert!(text.contains("func (it *Item) Sku() string {\n\treturn it.sku\n}"));
    Ok(())
}

#[test]
fn test_syntax_error_names_file() -> Result<()> {
    let dir = TempDir::new()?;
    let good = dir.path().join("good.go");
    let bad = dir.path().join("bad.go");
    fs::write(&good, "package store\n\ntype A struct {\n\tx int `get:\"\"`\n}\n")?;
    fs::write(&bad, "package store\n\nfunc broken( {\n")?;

    let err = scan_package("store", &[good, bad.clone()]).unwrap_err();
    match &err {
        LombokError::Syntax { file, line, .. } => {
            assert_eq!(file, &bad.display().to_string());
            assert!(*line >= 3, "unexpected line {line}");
        }
        other => panic!("expected a syntax error, got {other:?}"),
    }
    Ok(())
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.go");
    let err = scan_package("store", &[missing]).unwrap_err();
    assert!(matches!(err, LombokError::Io { .. }), "{err}");
}

#[test]
fn test_legacy_accessors_report() -> Result<()> {
    let pkg = scan_source(MODEL_PATH, LEGACY)?;
    let report = PackageReport::build(&pkg);

    let entries: Vec<_> = report
        .types
        .iter()
        .flat_map(|typ| {
            typ.suggestions
                .iter()
                .map(move |s| (typ.name.as_str(), s.field.as_str(), s.suggested.as_str()))
        })
        .collect();
    assert_eq!(
        entries,
        vec![
            ("Profile", "name", r#"`prop:"@"`"#),
            ("Profile", "avatar", r#"`get:"Image"`"#),
        ]
    );

    let json = serde_json::to_value(&report)?;
    assert_eq!(json["package"], MODEL_PATH);
    assert_eq!(json["types"][0]["suggestions"][1]["current"], serde_json::Value::Null);
    Ok(())
}

#[test]
fn test_legacy_source_generates_only_tagged_fields() -> Result<()> {
    let generated = generate_source(MODEL_PATH, LEGACY)?.expect("email is tagged");
    assert_eq!(
        generated,
        "package model

// properties for Profile
func (p *Profile) Email() string {
	return p.email
}

func (p *Profile) SetEmail(v string) {
	p.email = v
}
"
    );
    Ok(())
}
