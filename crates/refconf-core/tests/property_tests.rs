use proptest::prelude::*;
use refconf_core::{Config, ConfigOptions};
use serde_json::{Map, Value, json};

/// A chain `k0 -> k1 -> ... -> kn` where each value references the next
/// key and the last one is a literal, plus an expression over the chain's
/// end.
fn chain_entries(len: usize, literal: i64) -> Vec<(String, Value)> {
    let mut entries: Vec<(String, Value)> = (0..len)
        .map(|i| (format!("k{}", i), json!(format!("${{k{}}}", i + 1))))
        .collect();
    entries.push((format!("k{}", len), json!(literal)));
    entries.push((
        "total".to_string(),
        json!(format!("{{{{ ${{k{}}} + 1 }}}}", len)),
    ));
    entries
}

fn document(entries: &[(String, Value)]) -> Value {
    Value::Object(entries.iter().cloned().collect::<Map<String, Value>>())
}

/// The chain in declaration order, and the same entries shuffled.
fn ordered_and_shuffled() -> impl Strategy<Value = (Vec<(String, Value)>, Vec<(String, Value)>)> {
    (1usize..8, -1000i64..1000).prop_flat_map(|(len, literal)| {
        let entries = chain_entries(len, literal);
        (Just(entries.clone()), Just(entries).prop_shuffle())
    })
}

proptest! {
    #[test]
    fn test_declaration_order_does_not_matter((entries, shuffled) in ordered_and_shuffled()) {
        let ordered = Config::from_value(document(&entries), ConfigOptions::default()).unwrap();
        let reordered = Config::from_value(document(&shuffled), ConfigOptions::default()).unwrap();

        for (key, _) in &entries {
            prop_assert_eq!(ordered.get(key), reordered.get(key));
        }
        let literal = entries[entries.len() - 2].1.as_i64().unwrap();
        prop_assert_eq!(&ordered["total"], &json!(literal + 1));
    }

    #[test]
    fn test_resolution_is_idempotent(len in 1usize..8, literal in -1000i64..1000) {
        let config = Config::from_value(
            document(&chain_entries(len, literal)),
            ConfigOptions::default(),
        )
        .unwrap();
        let again = Config::from_value(config.as_value().clone(), ConfigOptions::default()).unwrap();
        prop_assert_eq!(again, config);
    }

    #[test]
    fn test_plain_text_is_untouched(text in "[a-zA-Z0-9 ,.:;!?-]{0,40}") {
        let config = Config::from_value(json!({"text": text.clone()}), ConfigOptions::default()).unwrap();
        prop_assert_eq!(&config["text"], &json!(text));
    }

    #[test]
    fn test_resolved_strings_hold_no_placeholders(len in 1usize..8) {
        let config = Config::from_value(
            document(&chain_entries(len, 7)),
            ConfigOptions::default(),
        )
        .unwrap();
        for (_, value) in config.iter() {
            if let Some(text) = value.as_str() {
                prop_assert!(!text.contains("${"), "resolved string holds a placeholder: {}", text);
            }
        }
    }
}
