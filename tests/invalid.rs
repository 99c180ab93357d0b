use json_path_query as jpq;
use json_path_query::{QueryError, Token};
use pretty_assertions::assert_eq;
use serde_json::json;

// Malformed expressions never fail in the default mode: the bad fragment is
// dropped and whatever survives is evaluated.

#[test]
fn test_invalid_slice_bound_is_dropped() {
    // `x` is not an integer, so the end bound is left unset: `[1:]`.
    let doc = json!({ "a": [0, 1, 2, 3] });
    assert_eq!(
        jpq::query(&doc, "$.a[1:x]", None),
        vec![&json!(1), &json!(2), &json!(3)]
    );
    assert!(matches!(
        jpq::tokenize_strict("$.a[1:x]"),
        Err(QueryError::InvalidSliceBound(_))
    ));
}

#[test]
fn test_unknown_characters_are_skipped() {
    let doc = json!({ "a": { "b": 1 } });
    assert_eq!(jpq::query(&doc, "$.a!.b", None), vec![&json!(1)]);
    assert_eq!(jpq::query(&doc, "  $ . a . b  ", None), vec![&json!(1)]);
    let err = jpq::tokenize_strict("$.a!.b").unwrap_err();
    assert_eq!(err.to_string(), "unexpected character '!' at position 3");
}

#[test]
fn test_unterminated_bracket_takes_the_rest() {
    let doc = json!({ "a": [5, 6] });
    assert_eq!(jpq::query(&doc, "$.a[1", None), vec![&json!(6)]);
    assert_eq!(
        jpq::tokenize("$.a['b"),
        vec![Token::Root, Token::Dot, Token::identifier("a"), Token::identifier("'b")]
    );
    assert!(matches!(
        jpq::tokenize_strict("$.a[1"),
        Err(QueryError::UnterminatedBracket { position: 3 })
    ));
}

#[test]
fn test_unparseable_filter_excludes_every_item() {
    let doc = json!({ "a": [{ "x": 1 }, { "x": 2 }] });
    assert!(jpq::query(&doc, "$.a[?(@.x ==== 1)]", None).is_empty());
    assert!(jpq::query(&doc, "$.a[?(this.constructor)]", None).is_empty());
    assert!(matches!(
        jpq::parse_predicate("@.x ==== 1"),
        Err(QueryError::InvalidFilter(_))
    ));
    // siblings of a failing filter are unaffected
    assert_eq!(jpq::query(&doc, "$.a[?(@.x == 2)].x", None), vec![&json!(2)]);
}

#[test]
fn test_deeply_nested_filter_is_rejected() {
    let doc = json!([{ "a": 1 }]);
    for depth in [5_000, 50_000] {
        let expr = format!("$[?({}@.a == 1{})]", "(".repeat(depth), ")".repeat(depth));
        assert!(jpq::query(&doc, &expr, None).is_empty());
    }
    assert_eq!(jpq::query(&doc, "$[?(((@.a == 1)))].a", None), vec![&json!(1)]);
}

#[test]
fn test_long_filter_chains_are_evaluated() {
    let doc = json!([1, 0]);
    let and_chain = format!("$[?({})]", vec!["@"; 200_000].join("&&"));
    assert_eq!(jpq::query(&doc, &and_chain, None), vec![&json!(1)]);
    let or_chain = format!("$[?({} || @ == 0)]", vec!["@ == 7"; 200_000].join(" || "));
    assert_eq!(jpq::query(&doc, &or_chain, None), vec![&json!(0)]);
}

#[test]
fn test_very_long_filter_literal() {
    let long = "z".repeat(500_000);
    let doc = json!([{ "name": long.clone() }, { "name": "short" }]);
    let expr = format!("$[?(@.name == '{long}')].name");
    assert_eq!(jpq::query(&doc, &expr, None).len(), 1);
    let unterminated = format!("$[?(@.name == '{long})]");
    assert!(jpq::query(&doc, &unterminated, None).is_empty());
}

#[test]
fn test_script_expressions_are_not_evaluated() {
    let doc = json!({ "a": [1, 2, 3] });
    assert_eq!(
        jpq::tokenize("$.a[(@.length-1)]"),
        vec![
            Token::Root,
            Token::Dot,
            Token::identifier("a"),
            Token::Script { expr: "@.length-1".into() }
        ]
    );
    assert_eq!(jpq::query(&doc, "$.a[(@.length-1)]", None), vec![&json!([1, 2, 3])]);
}

#[test]
fn test_empty_and_garbage_expressions() {
    let doc = json!({ "a": 1 });
    // No tokens at all: the root itself is the only result.
    assert_eq!(jpq::query(&doc, "", None), vec![&doc]);
    assert_eq!(jpq::query(&doc, "#%^", None), vec![&doc]);
    assert!(jpq::query(&doc, "$[0]", None).is_empty());
    assert!(jpq::query(&doc, "$[::0]", None).is_empty());
}

#[test]
fn test_invalid_json_text() {
    assert!(matches!(jpq::from_json("{not json", "$"), Err(QueryError::Json(_))));
}
