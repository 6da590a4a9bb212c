/*!
 * Tests for glossary loading
 */

use dialoc::errors::GlossaryError;
use dialoc::glossary::{derive_term_id, Glossary, GlossaryTerm};

use crate::common;

#[test]
fn test_loadJson_withCategorizedLists_shouldDeriveIds() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(dir.path(), "glossary.json", common::SAMPLE_GLOSSARY).unwrap();

    let glossary = Glossary::load_json(&path).unwrap();

    assert_eq!(glossary.len(), 3);
    let whiterun = glossary.get("whiterun").expect("lookup should ignore case");
    assert_eq!(whiterun.category, "Location");
    assert_eq!(whiterun.id, derive_term_id("Whiterun"));
    assert_eq!(glossary.categories().get("Npc"), Some(&1));
}

#[test]
fn test_loadJson_withTermArray_shouldKeepGivenIds() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(
        dir.path(),
        "glossary.json",
        r#"[{"id": "wr1", "term": "Whiterun", "category": "Location"}]"#,
    )
    .unwrap();

    let glossary = Glossary::load_json(&path).unwrap();

    assert_eq!(glossary.terms(), &[GlossaryTerm::new("wr1", "Whiterun", "Location")]);
}

#[test]
fn test_loadJson_withMissingFile_shouldFail() {
    assert!(Glossary::load_json("/no/such/glossary.json").is_err());
}

#[test]
fn test_fromJsonStr_withScalar_shouldBeInvalidFormat() {
    let err = Glossary::from_json_str("42").unwrap_err();
    assert!(matches!(err, GlossaryError::InvalidFormat(_)));
}

#[test]
fn test_fromTerms_withInvalidCategory_shouldFail() {
    let err = Glossary::from_terms(vec![GlossaryTerm::new("a1", "Whiterun", "Hold_Capital")]).unwrap_err();
    assert!(matches!(err, GlossaryError::InvalidCategory(_)));
}

#[test]
fn test_fromTerms_withUppercaseId_shouldFail() {
    let err = Glossary::from_terms(vec![GlossaryTerm::new("A1", "Whiterun", "Location")]).unwrap_err();
    assert!(matches!(err, GlossaryError::InvalidId { .. }));
}

#[test]
fn test_fromJsonStr_withSharedPlaceholder_shouldFail() {
    let err = Glossary::from_json_str(
        r#"[{"id": "a1", "term": "Whiterun", "category": "Location"},
            {"id": "a1", "term": "Riften", "category": "Location"}]"#,
    )
    .unwrap_err();
    assert!(matches!(err, GlossaryError::DuplicateId { ref term, .. } if term == "Riften"));
}

#[test]
fn test_fromTerms_withCaseInsensitiveDuplicate_shouldKeepFirst() {
    let glossary = Glossary::from_terms(vec![
        GlossaryTerm::new("a1", "Whiterun", "Location"),
        GlossaryTerm::new("b2", "WHITERUN", "Npc"),
    ])
    .unwrap();

    assert_eq!(glossary.len(), 1);
    assert_eq!(glossary.get("WhiteRun").map(|t| t.id.as_str()), Some("a1"));
}
