//! Codec Tests
//!
//! Tests for dictionary-format encoding and decoding.

use cgpro::protocol::{decode, encode, DictionaryCodec, Serializer, WireValue};
use cgpro::CgpError;

fn scalar(s: &str) -> WireValue {
    WireValue::Scalar(s.to_string())
}

fn translating() -> DictionaryCodec {
    DictionaryCodec::new().with_translation(true)
}

// =============================================================================
// Scalar Encoding Tests
// =============================================================================

#[test]
fn test_encode_empty_string_is_quoted() {
    assert_eq!(encode(&scalar("")), "\"\"");
}

#[test]
fn test_encode_word_is_bare() {
    assert_eq!(encode(&scalar("abc")), "abc");
    assert_eq!(encode(&scalar("Abc_123")), "Abc_123");
}

#[test]
fn test_encode_space_is_quoted() {
    assert_eq!(encode(&scalar("hello world")), "\"hello world\"");
}

#[test]
fn test_encode_punctuation_is_quoted() {
    assert_eq!(encode(&scalar("john@example.com")), "\"john@example.com\"");
}

#[test]
fn test_encode_control_characters_as_decimal_escapes() {
    assert_eq!(encode(&scalar("a\x07b")), "\"a\\007b\"");
    assert_eq!(encode(&scalar("line\nnext")), "\"line\\010next\"");
    assert_eq!(encode(&scalar("del\x7f")), "\"del\\127\"");
}

#[test]
fn test_encode_non_ascii_is_quoted() {
    assert_eq!(encode(&scalar("Jürgen")), "\"Jürgen\"");
}

#[test]
fn test_encode_quote_is_escaped() {
    assert_eq!(encode(&scalar("say \"hi\"")), "\"say \\034hi\\034\"");
    assert_eq!(
        translating().encode(&scalar("say \"hi\"")),
        "\"say \\\"hi\\\"\""
    );
}

#[test]
fn test_encode_trailing_backslash_is_escaped() {
    assert_eq!(encode(&scalar("C:\\dir\\")), "\"C:\\dir\\092\"");
    assert_eq!(translating().encode(&scalar("C:\\dir\\")), "\"C:\\\\dir\\\\\"");
}

#[test]
fn test_encode_raw_mode_keeps_escape_pairs() {
    // Already in wire form, must not be escaped twice
    assert_eq!(encode(&scalar("say \\\"hi\\\"")), "\"say \\\"hi\\\"\"");
    assert_eq!(encode(&scalar("C:\\dir")), "\"C:\\dir\"");
}

#[test]
fn test_encode_translation_mode_escapes_backslashes() {
    let codec = translating();
    assert_eq!(codec.encode(&scalar("C:\\dir")), "\"C:\\\\dir\"");
    assert_eq!(codec.encode(&scalar("a\\\"b")), "\"a\\\\\\\"b\"");
}

#[test]
fn test_encode_translation_mode_keeps_known_sequences() {
    let codec = translating();
    assert_eq!(codec.encode(&scalar("a\\nb")), "\"a\\nb\"");
    assert_eq!(codec.encode(&scalar("a\\eb")), "\"a\\eb\"");
    assert_eq!(codec.encode(&scalar("a\\rb")), "\"a\\rb\"");
    assert_eq!(codec.encode(&scalar("a\\1")), "\"a\\1\"");
}

// =============================================================================
// Structure Encoding Tests
// =============================================================================

#[test]
fn test_encode_list() {
    let value = WireValue::list().push("1").push("two words").push("3");
    assert_eq!(encode(&value), "(1,\"two words\",3)");
}

#[test]
fn test_encode_empty_list() {
    assert_eq!(encode(&WireValue::list()), "()");
}

#[test]
fn test_encode_dictionary() {
    let value = WireValue::dict().with("name", "foo").with("size", "10");
    assert_eq!(encode(&value), "{name=foo;size=10;}");
}

#[test]
fn test_encode_dictionary_quotes_keys() {
    let value = WireValue::dict().with("Real Name", "John Doe");
    assert_eq!(encode(&value), "{\"Real Name\"=\"John Doe\";}");
}

#[test]
fn test_encode_dictionary_with_numeric_first_key_is_list() {
    let value = WireValue::dict().with("0", "a").with("1", "b");
    assert_eq!(encode(&value), "(a,b)");

    // Only the first key decides
    let value = WireValue::dict().with("0", "a").with("name", "b");
    assert_eq!(encode(&value), "(a,b)");
}

#[test]
fn test_encode_dictionary_with_named_first_key_keeps_keys() {
    let value = WireValue::dict().with("name", "a").with("1", "b");
    assert_eq!(encode(&value), "{name=a;1=b;}");
}

#[test]
fn test_encode_empty_dictionary_is_list() {
    assert_eq!(encode(&WireValue::dict()), "()");
}

#[test]
fn test_encode_nested() {
    let value = WireValue::dict()
        .with("Aliases", WireValue::list().push("jd").push("john.doe"))
        .with(
            "Rights",
            WireValue::dict().with("Domain", "yes").with("Mail", "no"),
        );
    assert_eq!(
        encode(&value),
        "{Aliases=(jd,\"john.doe\");Rights={Domain=yes;Mail=no;};}"
    );
}

#[test]
fn test_serialize_none_is_empty() {
    let codec = DictionaryCodec::new();
    assert_eq!(codec.serialize(None), "");
    assert_eq!(codec.serialize(Some(&scalar("x"))), "x");
}

// =============================================================================
// Decoding Tests
// =============================================================================

#[test]
fn test_decode_dictionary() {
    let value = decode("{name=foo;size=10;}").unwrap();
    assert_eq!(
        value,
        WireValue::Dict(vec![
            ("name".to_string(), scalar("foo")),
            ("size".to_string(), scalar("10")),
        ])
    );
}

#[test]
fn test_decode_nested_list() {
    let value = decode("(1,2,(3,4))").unwrap();
    assert_eq!(
        value,
        WireValue::List(vec![
            scalar("1"),
            scalar("2"),
            WireValue::List(vec![scalar("3"), scalar("4")]),
        ])
    );
}

#[test]
fn test_decode_with_whitespace() {
    let value = decode("  { name = foo ;\r\n  list = ( a , b ) ; }  ").unwrap();
    assert_eq!(value.get("name"), Some(&scalar("foo")));
    assert_eq!(
        value.get("list"),
        Some(&WireValue::List(vec![scalar("a"), scalar("b")]))
    );
}

#[test]
fn test_decode_empty_structures() {
    assert_eq!(decode("{}").unwrap(), WireValue::dict());
    assert_eq!(decode("()").unwrap(), WireValue::list());
    assert_eq!(decode("( )").unwrap(), WireValue::list());
}

#[test]
fn test_decode_empty_input() {
    assert_eq!(decode("").unwrap(), scalar(""));
}

#[test]
fn test_decode_duplicate_keys_keep_order() {
    let value = decode("{a=1;b=2;a=3;}").unwrap();
    let keys: Vec<&str> = value
        .as_dict()
        .unwrap()
        .iter()
        .map(|(k, _)| k.as_str())
        .collect();
    assert_eq!(keys, vec!["a", "b", "a"]);
    assert_eq!(value.get("a"), Some(&scalar("1")));
}

#[test]
fn test_decode_bare_token_charset() {
    assert_eq!(decode("john.doe@example.com").unwrap(), scalar("john.doe@example.com"));
    assert_eq!(decode("-1:30#%!_x").unwrap(), scalar("-1:30#%!_x"));
    assert_eq!(decode("Jürgen").unwrap(), scalar("Jürgen"));
}

#[test]
fn test_decode_bare_token_stops_at_other_characters() {
    assert_eq!(decode("abc def").unwrap(), scalar("abc"));
    assert_eq!(decode("abc/def").unwrap(), scalar("abc"));
}

#[test]
fn test_decode_quoted_with_decimal_escapes() {
    assert_eq!(decode("\"a\\007b\"").unwrap(), scalar("a\x07b"));
    assert_eq!(decode("\"x\\013\\010y\"").unwrap(), scalar("x\r\ny"));
}

#[test]
fn test_decode_quoted_escapes_raw_mode() {
    assert_eq!(decode("\"say \\\"hi\\\"\"").unwrap(), scalar("say \\\"hi\\\""));
    assert_eq!(decode("\"a\\\\b\"").unwrap(), scalar("a\\\\b"));
}

#[test]
fn test_decode_quoted_escapes_translation_mode() {
    let codec = translating();
    assert_eq!(codec.decode("\"say \\\"hi\\\"\"").unwrap(), scalar("say \"hi\""));
    assert_eq!(codec.decode("\"a\\\\b\"").unwrap(), scalar("a\\b"));
}

#[test]
fn test_decode_quoted_other_backslash_is_literal() {
    assert_eq!(decode("\"a\\nb\"").unwrap(), scalar("a\\nb"));
    assert_eq!(decode("\"a\\12b\"").unwrap(), scalar("a\\12b"));
}

#[test]
fn test_decode_bracket_block_is_opaque() {
    assert_eq!(decode("[10.0.0.1]").unwrap(), scalar("[10.0.0.1]"));

    let value = decode("{ip=[10.0.0.1];next=x;}").unwrap();
    assert_eq!(value.get("ip"), Some(&scalar("[10.0.0.1]")));
    assert_eq!(value.get("next"), Some(&scalar("x")));
}

#[test]
fn test_decode_quoted_keys() {
    let value = decode("{\"Real Name\"=\"John Doe\";}").unwrap();
    assert_eq!(value.get("Real Name"), Some(&scalar("John Doe")));
}

#[test]
fn test_decode_empty_values() {
    let value = decode("{a=;b=\"\";}").unwrap();
    assert_eq!(value.get("a"), Some(&scalar("")));
    assert_eq!(value.get("b"), Some(&scalar("")));
}

#[test]
fn test_decode_ignores_trailing_text() {
    assert_eq!(decode("(a)\r").unwrap(), WireValue::List(vec![scalar("a")]));
}

// =============================================================================
// Error Handling Tests
// =============================================================================

fn assert_format_error(result: cgpro::Result<WireValue>) -> String {
    match result {
        Err(CgpError::Format { code, message, .. }) => {
            assert_eq!(code, 500);
            message
        }
        other => panic!("Expected format error, got {:?}", other),
    }
}

#[test]
fn test_decode_dictionary_missing_semicolon() {
    let message = assert_format_error(decode("{name=foo}"));
    assert!(message.contains("while reading value"));
}

#[test]
fn test_decode_dictionary_missing_equals() {
    let message = assert_format_error(decode("{name;}"));
    assert!(message.contains("at '='"));
}

#[test]
fn test_decode_list_bad_separator() {
    assert_format_error(decode("(1;2)"));
    assert_format_error(decode("(a b)"));
}

#[test]
fn test_decode_unterminated_structures() {
    assert_format_error(decode("(1,2"));
    assert_format_error(decode("{a=b;"));
    assert_format_error(decode("\"abc"));
    assert_format_error(decode("[abc"));
}

#[test]
fn test_decode_depth_guard() {
    let nested = format!("{}x{}", "(".repeat(10), ")".repeat(10));

    let shallow = DictionaryCodec::new().with_max_depth(5);
    let message = assert_format_error(shallow.decode(&nested));
    assert!(message.contains("nesting"));

    let exact = DictionaryCodec::new().with_max_depth(10);
    assert!(exact.decode(&nested).is_ok());
}

#[test]
fn test_decode_runaway_nesting_is_an_error() {
    let nested = "{a=".repeat(100_000);
    assert_format_error(decode(&nested));
}

// =============================================================================
// Round Trip Tests
// =============================================================================

#[test]
fn test_round_trip_default_codec() {
    let values = vec![
        scalar("plain"),
        scalar(""),
        scalar("with space"),
        scalar("bell\x07tab\tnul\x00"),
        scalar("Grüße"),
        scalar("C:\\dir\\"),
        scalar("say \"hi\""),
        scalar("\""),
        scalar("\\"),
        WireValue::list(),
        WireValue::list().push("a").push(WireValue::list().push("b").push("")),
        WireValue::dict()
            .with("RealName", "John Doe")
            .with("Aliases", WireValue::list().push("jd").push("j.doe"))
            .with(
                "Settings",
                WireValue::dict()
                    .with("MaxAccountSize", "100M")
                    .with("Note", "line1\nline2"),
            ),
    ];

    for value in values {
        let text = encode(&value);
        assert_eq!(decode(&text).unwrap(), value, "round trip of {}", text);
    }
}

#[test]
fn test_round_trip_translation_mode() {
    let codec = translating();
    let values = vec![
        scalar("C:\\dir\\file"),
        scalar("say \"hi\""),
        scalar("a\\\"b"),
        scalar("a\\nb"),
        WireValue::dict().with("Quote", "\"quoted\"").with("Path", "\\\\server\\share"),
    ];

    for value in values {
        let text = codec.encode(&value);
        assert_eq!(codec.decode(&text).unwrap(), value, "round trip of {}", text);
    }
}

#[test]
fn test_round_trip_raw_mode_wire_form() {
    let value = scalar("say \\\"hi\\\" C:\\\\dir");
    let text = encode(&value);
    assert_eq!(decode(&text).unwrap(), value);
}
