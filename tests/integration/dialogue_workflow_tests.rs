/*!
 * Integration tests for the import, mask, translate, report and export workflow
 */

use anyhow::Result;
use std::sync::Arc;

use dialoc::dialogue_xml;
use dialoc::providers::MockProvider;
use dialoc::validation::AnomalyTag;
use dialoc::Controller;

use crate::common;

#[tokio::test]
async fn test_workflow_withUppercaseProvider_shouldProtectGlossaryTerms() -> Result<()> {
    let dir = common::create_temp_dir()?;
    common::create_test_file(dir.path(), "Strings/Skyrim_english_french.xml", common::SAMPLE_STRINGS)?;
    let glossary = common::create_test_file(dir.path(), "glossary.json", common::SAMPLE_GLOSSARY)?;

    let mut controller = common::test_controller(dir.path(), "uppercase").await?;

    let summary = controller.import(&dir.path().join("Strings")).await?;
    assert_eq!(summary.files, 1);
    assert_eq!(summary.entries, 5);

    assert_eq!(controller.load_glossary(&glossary).await?, 3);
    assert_eq!(controller.mask_all().await?, 5);

    let records = controller.repository().list_dialogues().await?;
    let masked = records[0].masked_source.as_deref().unwrap_or_default();
    assert!(masked.starts_with("Welcome to [Location_"));
    assert!(!masked.contains("Whiterun"));

    let provider = MockProvider::uppercase();
    let stats = controller.translate(Arc::new(provider.clone()), false).await?;

    assert_eq!(stats.unique_texts, 3);
    assert_eq!(provider.request_count(), 3);
    assert_eq!(stats.placeholder_issues, 0);

    let records = controller.repository().list_dialogues().await?;
    let dests: Vec<Option<&str>> = records.iter().map(|r| r.dest.as_deref()).collect();
    assert_eq!(
        dests,
        vec![
            Some("WELCOME TO Whiterun, TRAVELER."),
            Some("WELCOME TO Whiterun, TRAVELER."),
            Some("Lydia IS SWORN TO CARRY YOUR BURDENS IN Skyrim."),
            Some(r#"DLC1 "DAWNGUARD" <ALIAS=PLAYER>"#),
            Some("Adieu."),
        ]
    );

    let report = controller.report(None).await?;
    assert_eq!(report.count(AnomalyTag::Missing), 0);
    assert_eq!(report.count(AnomalyTag::Dlc), 1);
    assert_eq!(report.flagged.len(), 1);

    let output = dir.path().join("out").join("Skyrim_french.xml");
    assert_eq!(controller.export(&output).await?, 5);

    let exported = dialogue_xml::load_file(&output)?;
    assert_eq!(exported.entries[0].key, "000001");
    assert_eq!(exported.entries[0].edid.as_deref(), Some("GuardGreeting"));
    assert_eq!(exported.entries[3].source, r#"DLC1 "Dawnguard" <Alias=Player>"#);
    assert_eq!(exported.entries[3].dest.as_deref(), Some(r#"DLC1 "DAWNGUARD" <ALIAS=PLAYER>"#));

    Ok(())
}

#[tokio::test]
async fn test_translate_withDroppedPlaceholders_shouldCountIssues() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let strings = common::create_test_file(dir.path(), "strings.xml", common::SAMPLE_STRINGS)?;
    let glossary = common::create_test_file(dir.path(), "glossary.json", common::SAMPLE_GLOSSARY)?;

    let mut controller = common::test_controller(dir.path(), "drop-placeholders").await?;
    controller.import(&strings).await?;
    controller.load_glossary(&glossary).await?;

    let stats = controller.translate(Arc::new(MockProvider::drop_placeholders()), false).await?;

    // Both glossary lines lose their terms; the DLC line has none to lose
    assert_eq!(stats.placeholder_issues, 2);
    let record = controller.repository().get_dialogue(1).await?.expect("record 1 should exist");
    assert_eq!(record.dest.as_deref(), Some("Welcome to , traveler."));

    Ok(())
}

#[tokio::test]
async fn test_translate_withFailingProvider_shouldKeepOriginalText() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let strings = common::create_test_file(dir.path(), "strings.xml", common::SAMPLE_STRINGS)?;
    let glossary = common::create_test_file(dir.path(), "glossary.json", common::SAMPLE_GLOSSARY)?;

    let mut controller = common::test_controller(dir.path(), "failing").await?;
    controller.import(&strings).await?;
    controller.load_glossary(&glossary).await?;

    let provider = MockProvider::failing();
    assert!(Controller::check_provider(&provider).await.is_err());

    let stats = controller.translate(Arc::new(provider.clone()), false).await?;

    assert_eq!(stats.fallbacks, 3);
    // retry_count 3 means four attempts per text
    assert_eq!(stats.provider_calls, 12);

    let report = controller.report(Some(AnomalyTag::Same)).await?;
    assert_eq!(report.flagged.len(), 4);
    assert_eq!(report.flagged[0].dest.as_deref(), Some("Welcome to Whiterun, traveler."));

    Ok(())
}

#[tokio::test]
async fn test_translate_withIntermittentProvider_shouldRecoverThroughRetries() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let strings = common::create_test_file(dir.path(), "strings.xml", common::SAMPLE_STRINGS)?;

    let controller = common::test_controller(dir.path(), "intermittent:2").await?;
    controller.import(&strings).await?;

    let stats = controller.translate(Arc::new(MockProvider::intermittent(2)), false).await?;

    assert_eq!(stats.fallbacks, 0);
    assert!(stats.provider_calls > stats.unique_texts);

    let report = controller.report(Some(AnomalyTag::Missing)).await?;
    assert!(report.flagged.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_import_again_shouldKeepExistingTranslations() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let strings = common::create_test_file(dir.path(), "strings.xml", common::SAMPLE_STRINGS)?;

    let controller = common::test_controller(dir.path(), "echo").await?;
    controller.import(&strings).await?;
    controller.translate(Arc::new(MockProvider::prefix("FR ")), false).await?;

    controller.import(&strings).await?;

    let stats = controller.stats().await?;
    assert_eq!(stats.dialogues, 5);
    assert_eq!(stats.translated_dialogues, 5);

    let record = controller.repository().get_dialogue(3).await?.expect("record 3 should exist");
    assert_eq!(record.dest.as_deref(), Some("FR Lydia is sworn to carry your burdens in Skyrim."));

    Ok(())
}

#[tokio::test]
async fn test_import_withChangedSource_shouldTranslateNewText() -> Result<()> {
    let line = |text: &str| {
        format!(
            "<SSTXMLRessources><Content><String sID=\"000001\"><Source>{}</Source></String></Content></SSTXMLRessources>",
            text
        )
    };
    let dir = common::create_temp_dir()?;
    let strings = common::create_test_file(dir.path(), "strings.xml", &line("Hello there."))?;

    let controller = common::test_controller(dir.path(), "echo").await?;
    controller.import(&strings).await?;
    controller.translate(Arc::new(MockProvider::uppercase()), false).await?;

    common::create_test_file(dir.path(), "strings.xml", &line("Goodbye, friend."))?;
    controller.import(&strings).await?;
    let stats = controller.translate(Arc::new(MockProvider::uppercase()), false).await?;

    assert_eq!(stats.unique_texts, 1);
    let record = controller.repository().get_dialogue(1).await?.expect("record 1 should exist");
    assert_eq!(record.source, "Goodbye, friend.");
    assert_eq!(record.dest.as_deref(), Some("GOODBYE, FRIEND."));

    Ok(())
}
