// SPDX-License-Identifier: MIT
//! End-to-end conversions between the binary file and the text directory

use std::path::Path;

use resource_bundle::{
    decode_bundle, encode_bundle, read_binary, read_text, write_binary, write_text, Bundle,
    BundleError, BundleFile, Pair, Section,
};
use tempfile::TempDir;

fn demo_bundle() -> Bundle {
    Bundle::new("Demo.bin")
        .with_file(
            BundleFile::new("Cfg").with_section(
                Section::new("Main")
                    .with_pair("Key1", "Value1")
                    .with_pair("Key1", "Value2")
                    .with_pair("Desc", "Line A\r\nLine B"),
            ),
        )
        .with_file(
            BundleFile::new("a\\b.cfg")
                .with_section(Section::new("Empty"))
                .with_section(
                    Section::new("Other")
                        .with_pair("", "")
                        .with_pair("Unicode", "Grüße 日本 \u{1F600}")
                        .with_pair("Trailing", "x\r\n"),
                ),
        )
        .with_file(BundleFile::new("a/../b.cfg"))
}

fn unpack(bundle: &Bundle, dir: &Path) -> Vec<u8> {
    let binary = dir.join("Demo.bin");
    write_binary(bundle, &binary).unwrap();
    let loaded = read_binary("Demo.bin", &binary).unwrap();
    write_text(&loaded, &dir.join("text")).unwrap();
    std::fs::read(&binary).unwrap()
}

#[test]
fn binary_text_binary_is_byte_stable() {
    let dir = TempDir::new().unwrap();
    let original = unpack(&demo_bundle(), dir.path());

    let reread = read_text(&dir.path().join("text"), "Demo.bin").unwrap();
    assert_eq!(reread, demo_bundle());

    let repacked = dir.path().join("Repacked.bin");
    write_binary(&reread, &repacked).unwrap();
    assert_eq!(std::fs::read(&repacked).unwrap(), original);
}

#[test]
fn duplicate_key_example() {
    let dir = TempDir::new().unwrap();
    unpack(&demo_bundle(), dir.path());

    let text = std::fs::read_to_string(dir.path().join("text").join("Cfg")).unwrap();
    assert_eq!(
        text,
        "[Main]\r\nKey1=Value1\r\nKey1=Value2\r\nDesc||=Line A\r\nDesc||=Line B\r\n"
    );

    let bundle = read_text(&dir.path().join("text"), "Demo.bin").unwrap();
    let main = &bundle.file("Cfg").unwrap().sections[0];
    assert_eq!(
        main.pairs,
        vec![
            Pair::new("Key1", "Value1"),
            Pair::new("Key1", "Value2"),
            Pair::new("Desc", "Line A\r\nLine B"),
        ]
    );
}

#[test]
fn escaped_names_recover_originals() {
    let dir = TempDir::new().unwrap();
    unpack(&demo_bundle(), dir.path());
    let text_dir = dir.path().join("text");

    let mut on_disk: Vec<String> = std::fs::read_dir(&text_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    on_disk.sort();
    assert_eq!(on_disk, vec!["Cfg", "Demo.manifest", "a___b.cfg", "a_b.cfg"]);
    assert!(on_disk.iter().all(|n| !n.contains(['/', '\\']) && !n.contains("..")));

    let names: Vec<String> = read_text(&text_dir, "Demo.bin")
        .unwrap()
        .files
        .into_iter()
        .map(|f| f.name)
        .collect();
    assert_eq!(names, vec!["Cfg", "a\\b.cfg", "a/../b.cfg"]);
}

#[test]
fn hand_edited_text_is_packed() {
    let dir = TempDir::new().unwrap();
    let text_dir = dir.path().join("text");
    std::fs::create_dir(&text_dir).unwrap();
    std::fs::write(text_dir.join("Demo.manifest"), "Demo.bin\n1\nCfg;;Cfg\n").unwrap();
    std::fs::write(
        text_dir.join("Cfg"),
        "\n[Main]\nKey1=Value1\n\nNote||=first\nNote||=second\n[Tail]\n",
    )
    .unwrap();

    let bundle = read_text(&text_dir, "Demo.bin").unwrap();
    let bytes = encode_bundle(&bundle).unwrap();
    let decoded = decode_bundle(&bytes, "Demo.bin").unwrap();

    let sections = &decoded.files[0].sections;
    assert_eq!(sections.len(), 2);
    assert_eq!(
        sections[0].pairs,
        vec![Pair::new("Key1", "Value1"), Pair::new("Note", "first\r\nsecond")]
    );
    assert!(sections[1].pairs.is_empty());
}

#[test]
fn bare_line_feeds_normalize_once() {
    let dir = TempDir::new().unwrap();
    let bundle = Bundle::new("Demo.bin").with_file(
        BundleFile::new("Cfg").with_section(Section::new("Main").with_pair("Desc", "a\nb")),
    );

    write_text(&bundle, dir.path()).unwrap();
    let reread = read_text(dir.path(), "Demo.bin").unwrap();
    assert_eq!(reread.files[0].sections[0].pairs[0].value, "a\r\nb");

    // Stable from here on
    let second = dir.path().join("second");
    write_text(&reread, &second).unwrap();
    assert_eq!(read_text(&second, "Demo.bin").unwrap(), reread);
}

#[test]
fn mixed_line_endings_fail_export() {
    let dir = TempDir::new().unwrap();
    let bundle = Bundle::new("Demo.bin").with_file(
        BundleFile::new("Cfg").with_section(Section::new("Main").with_pair("Bad", "a\rb\nc")),
    );

    let err = write_text(&bundle, dir.path()).unwrap_err();
    assert!(matches!(err, BundleError::Format { .. }));
}

#[test]
fn empty_section_header_fails_import() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("Demo.manifest"), "Demo.bin\n1\nCfg;;Cfg\n").unwrap();

    for header in ["[]", "[   ]"] {
        std::fs::write(dir.path().join("Cfg"), format!("{}\nk=v\n", header)).unwrap();
        let err = read_text(dir.path(), "Demo.bin").unwrap_err();
        assert!(err.is_format(), "{} should be rejected", header);
    }
}

#[test]
fn truncated_binary_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Demo.bin");
    let mut bytes = encode_bundle(&demo_bundle()).unwrap();
    bytes.truncate(bytes.len() / 2);
    std::fs::write(&path, &bytes).unwrap();

    let err = read_binary("Demo.bin", &path).unwrap_err();
    assert!(err.is_format());
}

#[test]
fn colliding_names_fail_before_writing() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");
    let bundle = Bundle::new("Demo.bin")
        .with_file(BundleFile::new("a/b"))
        .with_file(BundleFile::new("a\\b"));

    assert!(write_text(&bundle, &out).is_err());
    assert!(!out.exists());
}

#[test]
fn trailing_semicolon_name_fails_before_writing() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");
    let bundle = Bundle::new("Demo.bin")
        .with_file(BundleFile::new("a").with_section(Section::new("A").with_pair("k", "from_a")))
        .with_file(
            BundleFile::new("a;").with_section(Section::new("B").with_pair("k", "from_a_semi")),
        );

    let err = write_text(&bundle, &out).unwrap_err();
    assert!(err.is_format());
    assert!(!out.exists());
}

#[test]
fn inner_semicolon_name_round_trips() {
    let dir = TempDir::new().unwrap();
    let bundle = Bundle::new("Demo.bin")
        .with_file(BundleFile::new("a").with_section(Section::new("A").with_pair("k", "from_a")))
        .with_file(
            BundleFile::new("a;b").with_section(Section::new("B").with_pair("k", "from_a_b")),
        );

    write_text(&bundle, dir.path()).unwrap();
    assert_eq!(read_text(dir.path(), "Demo.bin").unwrap(), bundle);
}
