use dynaform_core::{compile, ValidationMap, Validator, ValidatorKind};

const INPUTS: [&str; 8] = [
    "",
    "v",
    "value",
    "a v b",
    "nothing here",
    "VVV",
    "ünïcödé v",
    "   ",
];

#[test]
fn test_contains_accepts_exactly_inputs_with_argument() {
    for argument in ["v", "abc", "x1"] {
        let validator = compile(&format!(r#"contains(x, "{}")"#, argument), "e");
        for input in INPUTS.iter().copied().chain(["xabcx", "zx1"]) {
            assert_eq!(
                validator.evaluates(input),
                input.contains(argument),
                "contains({:?}) on {:?}",
                argument,
                input
            );
        }
    }
}

#[test]
fn test_not_contains_is_the_negation_of_contains() {
    let contains = compile(r#"contains(x, "v")"#, "e");
    let not_contains = compile(r#"NOT(contains(x, "v"))"#, "e");
    assert!(matches!(not_contains.kind(), ValidatorKind::NotContains(v) if v == "v"));

    for input in INPUTS {
        assert_eq!(not_contains.evaluates(input), !contains.evaluates(input));
    }
}

#[test]
fn test_empty_and_garbage_accept_everything() {
    for source in ["", "garbage(", "contains(", "match(x, \"(\")", "isEmail(x)"] {
        let validator = compile(source, "Some message");
        assert!(validator.is_always_valid(), "{:?}", source);
        assert_eq!(validator.error_message(), "Some message");
        for input in INPUTS {
            assert!(validator.evaluates(input));
        }
    }
}

#[test]
fn test_match_requires_full_match() {
    let validator = compile(r#"match(code, "\d+")"#, "Digits only");
    assert!(validator.evaluates("12345"));
    assert!(!validator.evaluates("12a45"));
    assert!(!validator.evaluates(""));
}

#[test]
fn test_email_and_url() {
    let email = compile("isEmailAddress(mail)", "");
    assert!(email.evaluates("someone@example.org"));
    assert!(!email.evaluates("someone@"));

    let url = compile("isURL(site)", "");
    assert!(url.evaluates("https://www.liferay.com/path?q=1"));
    assert!(!url.evaluates("not a url"));
}

#[test]
fn test_validation_map_from_json() {
    let map: ValidationMap =
        serde_json::from_str(r#"{"expression": "contains(x, \"z\")", "error": 7}"#).unwrap();
    assert_eq!(map.error, "");
    let validator = Validator::from_validation_map(&map);
    assert!(validator.evaluates("pizza"));
    assert!(!validator.evaluates("pasta"));

    let empty: ValidationMap = serde_json::from_str("{}").unwrap();
    assert!(empty.is_empty());
    assert!(Validator::from_validation_map(&empty).is_always_valid());
}
