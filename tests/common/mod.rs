/*!
 * Common test utilities for the dialoc test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use dialoc::app_config::{Config, TranslationProvider};
use dialoc::glossary::{Glossary, GlossaryTerm};
use dialoc::masking::MaskingEngine;
use dialoc::Controller;

/// String table with glossary terms, a duplicate line, a DLC line and a
/// line that is already translated
pub const SAMPLE_STRINGS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<SSTXMLRessources>
  <Params>
    <Addon>Skyrim</Addon>
    <Source>english</Source>
    <Dest>french</Dest>
  </Params>
  <Content>
    <String List="0" sID="000001">
      <EDID>GuardGreeting</EDID>
      <Source>Welcome to Whiterun, traveler.</Source>
    </String>
    <String List="0" sID="000002">
      <EDID>GuardGreeting2</EDID>
      <Source>Welcome to Whiterun, traveler.</Source>
    </String>
    <String List="0" sID="000003">
      <EDID>LydiaIntro</EDID>
      <Source>Lydia is sworn to carry your burdens in Skyrim.</Source>
    </String>
    <String List="0" sID="000004">
      <EDID>DLC1Line</EDID>
      <Source>DLC1 "Dawnguard" &lt;Alias=Player&gt;</Source>
    </String>
    <String List="0" sID="000005">
      <EDID>Done</EDID>
      <Source>Farewell.</Source>
      <Dest>Adieu.</Dest>
    </String>
  </Content>
</SSTXMLRessources>
"#;

pub const SAMPLE_GLOSSARY: &str = r#"{
  "Location": ["Whiterun", "Skyrim"],
  "Npc": ["Lydia"]
}"#;

/// Route `log` output to the test harness; RUST_LOG selects the level
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Configuration using the mock provider and a database inside `dir`
pub fn test_config(dir: &Path, mock_model: &str) -> Config {
    let mut config = Config::default();
    config.database_path = Some(dir.join("dialoc.db"));
    config.translation.provider = TranslationProvider::Mock;
    config.translation.common.retry_delay_ms = 0;
    let mut provider = dialoc::app_config::ProviderConfig::new(TranslationProvider::Mock);
    provider.model = mock_model.to_string();
    config.translation.available_providers.push(provider);
    config
}

/// Controller on a file database inside `dir`, without progress output
pub async fn test_controller(dir: &Path, mock_model: &str) -> Result<Controller> {
    init_logging();
    Ok(Controller::with_config(test_config(dir, mock_model)).await?.with_progress(false))
}

/// Glossary from `(term, category)` pairs with sequential ids
pub fn glossary(terms: &[(&str, &str)]) -> Glossary {
    let terms = terms
        .iter()
        .enumerate()
        .map(|(i, (term, category))| GlossaryTerm::new(format!("t{}", i), *term, *category))
        .collect();
    Glossary::from_terms(terms).expect("test glossary should be valid")
}

/// Masking engine over `glossary(terms)`
pub fn engine(terms: &[(&str, &str)]) -> MaskingEngine {
    MaskingEngine::build(&glossary(terms)).expect("test engine should build")
}
