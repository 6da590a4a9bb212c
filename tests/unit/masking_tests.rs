/*!
 * Tests for masking and unmasking, including property tests
 */

use proptest::prelude::*;

use dialoc::glossary::Glossary;
use dialoc::masking::{find_placeholders, MaskingEngine};

use crate::common;

const TERMS: &[(&str, &str)] = &[
    ("Whiterun", "Location"),
    ("Skyrim", "Location"),
    ("Skyrim Hold", "Location"),
    ("Lydia", "Npc"),
];

#[test]
fn test_mask_shouldPreferLongestTerm() {
    let engine = common::engine(TERMS);
    assert_eq!(engine.mask("Skyrim Hold is cold"), "[Location_t2] is cold");
    assert_eq!(engine.mask("Skyrim is cold"), "[Location_t1] is cold");
}

#[test]
fn test_mask_shouldRespectWordBoundariesAndIgnoreCase() {
    let engine = common::engine(TERMS);
    assert_eq!(engine.mask("Whiterunner"), "Whiterunner");
    assert_eq!(engine.mask("to WHITERUN!"), "to [Location_t0]!");
}

#[test]
fn test_unmask_shouldKeepUnknownPlaceholdersAndBrackets() {
    let engine = common::engine(TERMS);
    assert_eq!(
        engine.unmask("[Npc_t3] met [Npc_zzz] at [Location]"),
        "Lydia met [Npc_zzz] at [Location]"
    );
}

#[test]
fn test_emptyGlossary_shouldLeaveTextUnchanged() {
    let engine = MaskingEngine::build(&Glossary::new()).unwrap();
    assert_eq!(engine.mask("Whiterun"), "Whiterun");
    assert_eq!(engine.unmask("[Location_t0]"), "[Location_t0]");
    assert_eq!(engine.term_count(), 0);
}

#[test]
fn test_rebuild_shouldSwitchGlossaryAndBumpGeneration() {
    let mut engine = common::engine(TERMS);
    engine.rebuild(&common::glossary(&[("Riften", "Location")])).unwrap();

    assert_eq!(engine.generation(), 1);
    assert_eq!(engine.mask("Whiterun and Riften"), "Whiterun and [Location_t0]");
}

/// Lower-case words that never form part of a glossary term
fn filler_word() -> impl Strategy<Value = String> {
    "[a-z]{1,8}".prop_filter("must not be part of a glossary term", |w| {
        !TERMS
            .iter()
            .any(|(term, _)| term.split(' ').any(|part| part.eq_ignore_ascii_case(w)))
    })
}

/// Sentences mixing glossary terms (glossary casing) and filler words
fn sentence() -> impl Strategy<Value = String> {
    let term = proptest::sample::select(TERMS.iter().map(|(t, _)| t.to_string()).collect::<Vec<_>>());
    prop::collection::vec(prop_oneof![filler_word(), term], 0..12).prop_map(|words| words.join(" "))
}

proptest! {
    #[test]
    fn prop_unmask_afterMask_shouldRestoreText(text in sentence()) {
        let engine = common::engine(TERMS);
        prop_assert_eq!(engine.unmask(&engine.mask(&text)), text);
    }

    #[test]
    fn prop_mask_withoutTerms_shouldBeIdentity(words in prop::collection::vec(filler_word(), 0..12)) {
        let engine = common::engine(TERMS);
        let text = words.join(" ");
        prop_assert_eq!(engine.mask(&text), text);
    }

    #[test]
    fn prop_unmask_shouldBeIdempotent(text in ".{0,60}", token in "\\[(Location|Npc)_t[0-9]\\]") {
        let engine = common::engine(TERMS);
        let input = format!("{}{}{}", text, token, text);
        let once = engine.unmask(&input);
        prop_assert_eq!(engine.unmask(&once), once);
    }

    #[test]
    fn prop_mask_withoutBrackets_shouldOnlyProduceKnownPlaceholders(text in "[^\\[]{0,80}") {
        let engine = common::engine(TERMS);
        let masked = engine.mask(&text);
        for token in find_placeholders(&masked) {
            prop_assert_ne!(engine.unmask(token), token);
        }
    }
}
