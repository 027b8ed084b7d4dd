//! Property tests for locator synthesis, selectors and emission.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use grabar::dom::selector::{escape_ident, quote_value};
use grabar::prelude::*;
use grabar::Locator;
use proptest::prelude::*;

fn class_name() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_:/.-]{1,10}"
}

proptest! {
    #[test]
    fn escaped_class_matches_its_element(a in class_name(), b in class_name()) {
        prop_assume!(a != b);
        let mut doc = Document::new();
        let first = doc.append_element(doc.root(), "p", vec![("class".to_string(), a.clone())]);
        doc.append_element(doc.root(), "p", vec![("class".to_string(), b)]);

        let found = doc.query_selector_all(&format!(".{}", escape_ident(&a))).unwrap();
        prop_assert_eq!(found, vec![first]);
    }

    #[test]
    fn quoted_attribute_value_matches(value in "[ -~]{0,16}") {
        let mut doc = Document::new();
        let node = doc.append_element(
            doc.root(),
            "div",
            vec![("data-testid".to_string(), value.clone())],
        );
        let selector = format!("[data-testid={}]", quote_value(&value));
        prop_assert_eq!(doc.query_selector_all(&selector).unwrap(), vec![node]);
    }

    #[test]
    fn test_attribute_locator_resolves(value in "[ -~]{1,16}") {
        let mut doc = Document::new();
        let body = doc.append_element(doc.root(), "body", Vec::new());
        let node = doc.append_element(body, "button", vec![("data-qa".to_string(), value)]);
        let locator = synthesize(&doc, node).unwrap();
        prop_assert_eq!(locator.kind, LocatorKind::Css);
        prop_assert_eq!(locator.resolve(&doc).unwrap(), vec![node]);
    }

    #[test]
    fn one_block_per_non_navigate_action(
        kinds in proptest::collection::vec(0u8..4, 0..30),
        keys in proptest::collection::vec(proptest::sample::select(SPECIAL_KEYS), 30),
        javascript in any::<bool>(),
    ) {
        let actions: Vec<ActionRecord> = kinds
            .iter()
            .enumerate()
            .map(|(i, kind)| match kind {
                0 => ActionRecord::navigate(format!("https://app.example/{i}")),
                1 => ActionRecord::click(Locator::id(&format!("b{i}"))),
                2 => ActionRecord::input(Locator::name(format!("f{i}")), "text"),
                _ => ActionRecord::new(ActionType::Keydown, Locator::css(".q")).with_value(keys[i]),
            })
            .collect();
        let expected = kinds.iter().filter(|k| **k != 0).count();

        let target = if javascript { ScriptLanguage::JavaScript } else { ScriptLanguage::Python };
        let marker = if javascript { "// Step " } else { "# Step " };
        let script = ScriptEmitter::new(EmitOptions::default().with_target(target).with_header(false))
            .emit(&actions)
            .unwrap();
        prop_assert_eq!(script.block_count, expected);
        prop_assert_eq!(script.text.matches(marker).count(), expected);
    }

    #[test]
    fn only_special_keys_enter_a_session(key in "[A-Za-z0-9]{1,10}") {
        let mut session = RecordingSession::new();
        session.start(None).unwrap();
        let record = ActionRecord::new(ActionType::Keydown, Locator::id("q")).with_value(key.clone());
        let accepted = session.record(record).is_ok();
        prop_assert_eq!(accepted, SPECIAL_KEYS.contains(&key.as_str()));
        prop_assert!(ScriptEmitter::default().emit(session.actions()).is_ok());
    }

    #[test]
    fn parser_never_panics(html in "[<>a-z/=\" !-]{0,64}") {
        let _ = Document::parse(&html);
    }
}
