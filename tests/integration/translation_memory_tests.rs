/*!
 * Integration tests for the persisted translation memory
 */

use anyhow::Result;
use std::sync::Arc;

use dialoc::providers::MockProvider;

use crate::common;

#[tokio::test]
async fn test_memory_shouldSurviveNewControllerAndStableGlossaryIds() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let strings = common::create_test_file(dir.path(), "strings.xml", common::SAMPLE_STRINGS)?;
    let glossary = common::create_test_file(dir.path(), "glossary.json", common::SAMPLE_GLOSSARY)?;

    {
        let mut controller = common::test_controller(dir.path(), "uppercase").await?;
        controller.import(&strings).await?;
        controller.load_glossary(&glossary).await?;
        controller.translate(Arc::new(MockProvider::uppercase()), false).await?;
    }

    // Same glossary again: ids derive from the terms, so masked texts match
    let mut controller = common::test_controller(dir.path(), "echo").await?;
    assert_eq!(controller.engine().term_count(), 3);
    controller.load_glossary(&glossary).await?;
    controller.repository().clear_translations().await?;

    let provider = MockProvider::echo();
    let stats = controller.translate(Arc::new(provider.clone()), false).await?;

    // "Farewell." was translated on import, never by a provider
    assert_eq!(stats.memory_hits, 3);
    assert_eq!(provider.request_count(), 1);

    let record = controller.repository().get_dialogue(3).await?.expect("record 3 should exist");
    assert_eq!(record.dest.as_deref(), Some("Lydia IS SWORN TO CARRY YOUR BURDENS IN Skyrim."));

    let db_stats = controller.stats().await?;
    assert_eq!(db_stats.memory_entries, 4);
    assert!(db_stats.memory_hits >= 3);

    Ok(())
}

#[tokio::test]
async fn test_memory_withOtherTargetLanguage_shouldMiss() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let strings = common::create_test_file(dir.path(), "strings.xml", common::SAMPLE_STRINGS)?;

    {
        let controller = common::test_controller(dir.path(), "echo").await?;
        controller.import(&strings).await?;
        controller.translate(Arc::new(MockProvider::prefix("FR ")), true).await?;
    }

    let mut config = common::test_config(dir.path(), "echo");
    config.target_language = "ger".to_string();
    let controller = dialoc::Controller::with_config(config).await?.with_progress(false);

    let provider = MockProvider::prefix("DE ");
    let stats = controller.translate(Arc::new(provider.clone()), true).await?;

    assert_eq!(stats.memory_hits, 0);
    assert_eq!(provider.request_count(), 4);

    let record = controller.repository().get_dialogue(5).await?.expect("record 5 should exist");
    assert_eq!(record.dest.as_deref(), Some("DE Farewell."));

    Ok(())
}
