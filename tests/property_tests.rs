/// Property-based tests using proptest
/// Coercion must never panic and must agree with plain numeric parsing
use proptest::prelude::*;
use serde_json::{json, Value};
use survey_intake_api::normalize::{normalize_survey, to_float, to_int, to_text};

// Property: Coercion should never panic
proptest! {
    #[test]
    fn int_coercion_never_panics(raw in "\\PC*") {
        let _ = to_int(Some(&json!(raw)));
    }

    #[test]
    fn float_coercion_never_panics(raw in "\\PC*") {
        let _ = to_float(Some(&json!(raw)));
    }

    #[test]
    fn normalize_never_panics(key in "[a-zA-Z]{1,24}", raw in "\\PC*", n in any::<f64>()) {
        let mut payload = serde_json::Map::new();
        payload.insert(key.clone(), Value::String(raw));
        payload.insert(format!("{}2", key), json!(n));
        let _ = normalize_survey(&Value::Object(payload));
    }
}

// Property: Numeric strings round-trip
proptest! {
    #[test]
    fn integer_strings_round_trip(n in -1_000_000_000_000i64..1_000_000_000_000i64) {
        prop_assert_eq!(to_int(Some(&json!(n.to_string()))), Some(n));
        prop_assert_eq!(to_int(Some(&json!(n))), Some(n));
    }

    #[test]
    fn float_strings_keep_precision(x in -1.0e12f64..1.0e12f64) {
        prop_assert_eq!(to_float(Some(&json!(x.to_string()))), Some(x));
    }

    #[test]
    fn int_coercion_is_within_half_of_input(x in -1.0e12f64..1.0e12f64) {
        let rounded = to_int(Some(&json!(x))).unwrap();
        prop_assert!((rounded as f64 - x).abs() <= 0.5);
    }

    #[test]
    fn letters_are_never_numbers(raw in "[g-zG-Z]{1,12}") {
        // g-z cannot spell "inf" or "nan", nor any digit or exponent.
        prop_assert_eq!(to_int(Some(&json!(raw.clone()))), None);
        prop_assert_eq!(to_float(Some(&json!(raw))), None);
    }
}

// Property: Text coercion trims and never yields blank text
proptest! {
    #[test]
    fn text_is_trimmed_and_non_empty(raw in "\\PC*") {
        match to_text(Some(&json!(raw.clone()))) {
            Some(text) => {
                prop_assert!(!text.is_empty());
                prop_assert_eq!(text.as_str(), raw.trim());
            }
            None => prop_assert!(raw.trim().is_empty()),
        }
    }
}
