//! Integration tests for the prefs-core container codecs.
//!
//! These tests push a document exercising every value kind through the public
//! `encode`/`decode` API in both containers, and check that the two
//! containers agree on the logical tree.

use prefs_core::{
    decode, encode, encode_with, ContainerFormat, EncodeOptions, FormatError, PrefDate, PrefDict,
    PrefValue, PreferenceDocument,
};

/// A document using every value kind, nested at least two levels deep.
fn rich_document() -> PreferenceDocument {
    let mut window = PrefDict::new();
    window.insert("Title", "Main <window> & friends");
    window.insert("Opened", PrefDate::from_unix_seconds(1_300_125_946).unwrap());

    let servers = vec![
        PrefValue::from(PrefDict::from_iter([("Host", "alpha.local"), ("Port", "8080")])),
        PrefValue::from(PrefDict::from_iter([("Host", "beta.local")])),
        PrefValue::from(Vec::<PrefValue>::new()),
    ];

    let mut doc = PreferenceDocument::new();
    doc.insert("LastRun", PrefDate::from_unix_seconds(1_704_164_645).unwrap());
    doc.insert("Name", "demo");
    doc.insert("Empty", "");
    doc.insert("Spaces", "  keep me  ");
    doc.insert("Unicode", "héllo wörld ✓");
    doc.insert("Window", window);
    doc.insert("Servers", servers);
    doc.insert("NoKeys", PrefDict::new());
    doc
}

fn roundtrip(doc: &PreferenceDocument, format: ContainerFormat) -> PreferenceDocument {
    let bytes = encode(doc, format).expect("encode must succeed");
    decode(&bytes, format).expect("decode must succeed")
}

#[test]
fn test_roundtrip_xml_preserves_every_value_kind() {
    let original = rich_document();
    assert_eq!(roundtrip(&original, ContainerFormat::Xml), original);
}

#[test]
fn test_roundtrip_json_preserves_every_value_kind() {
    let original = rich_document();
    assert_eq!(roundtrip(&original, ContainerFormat::Json), original);
}

#[test]
fn test_roundtrip_preserves_key_order() {
    let original = rich_document();
    for format in [ContainerFormat::Xml, ContainerFormat::Json] {
        let decoded = roundtrip(&original, format);
        assert_eq!(
            decoded.dict.keys().collect::<Vec<_>>(),
            original.dict.keys().collect::<Vec<_>>(),
            "{format} must keep document order"
        );
    }
}

#[test]
fn test_xml_and_json_describe_the_same_tree() {
    // Arrange
    let original = rich_document();
    let xml = encode(&original, ContainerFormat::Xml).unwrap();

    // Act: XML -> tree -> JSON -> tree
    let from_xml = decode(&xml, ContainerFormat::Xml).unwrap();
    let json = encode(&from_xml, ContainerFormat::Json).unwrap();
    let from_json = decode(&json, ContainerFormat::Json).unwrap();

    // Assert
    assert_eq!(from_json, original);
}

#[test]
fn test_reencoding_decoded_output_is_byte_identical() {
    for format in [ContainerFormat::Xml, ContainerFormat::Json] {
        let first = encode(&rich_document(), format).unwrap();
        let second = encode(&decode(&first, format).unwrap(), format).unwrap();
        assert_eq!(first, second, "{format} output must be stable");
    }
}

#[test]
fn test_custom_version_survives_both_containers() {
    let mut doc = rich_document();
    doc.version = "1.1".to_string();
    assert_eq!(roundtrip(&doc, ContainerFormat::Xml).version, "1.1");
    assert_eq!(roundtrip(&doc, ContainerFormat::Json).version, "1.1");
}

#[test]
fn test_zero_indent_still_round_trips() {
    let options = EncodeOptions { indent: 0 };
    for format in [ContainerFormat::Xml, ContainerFormat::Json] {
        let bytes = encode_with(&rich_document(), format, &options).unwrap();
        assert_eq!(decode(&bytes, format).unwrap(), rich_document());
    }
}

#[test]
fn test_extreme_dates_round_trip_in_both_containers() {
    // Arrange: first and last second of the four-digit year range
    let mut doc = PreferenceDocument::new();
    doc.insert("Earliest", PrefDate::from_unix_seconds(-62_167_219_200).unwrap());
    doc.insert("Latest", PrefDate::from_unix_seconds(253_402_300_799).unwrap());

    for format in [ContainerFormat::Xml, ContainerFormat::Json] {
        // Act / Assert
        assert_eq!(roundtrip(&doc, format), doc, "{format} round trip");
    }
}

#[test]
fn test_dates_past_year_9999_cannot_be_built() {
    assert!(PrefDate::from_unix_seconds(253_402_300_800).is_none());
    assert!("+10000-01-01T00:00:00Z".parse::<PrefDate>().is_err());
}

#[test]
fn test_dict_shaped_like_a_tagged_date_round_trips() {
    // Arrange
    let mut doc = PreferenceDocument::new();
    doc.insert("Odd", PrefDict::from_iter([("$date", "2024-01-02T03:04:05Z")]));
    doc.insert("$$Escaped", "value");

    for format in [ContainerFormat::Xml, ContainerFormat::Json] {
        // Act
        let decoded = roundtrip(&doc, format);

        // Assert
        assert_eq!(decoded, doc, "{format} round trip");
        assert!(
            decoded.get("Odd").and_then(PrefValue::as_dict).is_some(),
            "{format} must keep Odd a dictionary"
        );
    }
}

#[test]
fn test_truncated_xml_is_a_format_error() {
    let bytes = encode(&rich_document(), ContainerFormat::Xml).unwrap();
    let truncated = &bytes[..bytes.len() / 2];
    assert!(matches!(
        decode(truncated, ContainerFormat::Xml),
        Err(FormatError::Xml { .. })
    ));
}

#[test]
fn test_truncated_json_is_a_format_error() {
    let bytes = encode(&rich_document(), ContainerFormat::Json).unwrap();
    let truncated = &bytes[..bytes.len() / 2];
    assert!(matches!(
        decode(truncated, ContainerFormat::Json),
        Err(FormatError::Json(_))
    ));
}
