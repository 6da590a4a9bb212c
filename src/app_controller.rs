use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use walkdir::WalkDir;

use crate::app_config::Config;
use crate::database::{DatabaseConnection, DatabaseStats, DialogueRecord, Repository};
use crate::dialogue_xml::{self, DialogueDocument};
use crate::errors::{AppError, TranslationError};
use crate::glossary::Glossary;
use crate::language_utils;
use crate::masking::MaskingEngine;
use crate::providers::Provider;
use crate::translation::{OrchestratorSettings, TranslationOrchestrator, TranslationStats};
use crate::validation::{AnomalyReport, AnomalyTag};

/// What an import run loaded
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// String table files read successfully
    pub files: usize,
    /// Files that failed to parse or load
    pub failed_files: usize,
    /// Entries inserted or updated
    pub entries: usize,
}

/// Application controller for the dialogue workflow:
/// import, glossary, mask, translate, report, export.
pub struct Controller {
    config: Config,
    repository: Repository,
    engine: MaskingEngine,
    show_progress: bool,
}

impl Controller {
    /// Open the configured database and build the masking engine from the
    /// glossary stored in it
    pub async fn with_config(config: Config) -> Result<Self> {
        let path = config.resolved_database_path()?;
        let repository = Repository::new(DatabaseConnection::new(&path)?);
        Self::with_repository(config, repository).await
    }

    /// Controller over an existing repository
    pub async fn with_repository(config: Config, repository: Repository) -> Result<Self> {
        let glossary = Glossary::from_terms(repository.list_glossary().await?)?;
        let engine = MaskingEngine::build(&glossary)?;
        debug!("Masking engine ready with {} terms", engine.term_count());

        Ok(Self {
            config,
            repository,
            engine,
            show_progress: true,
        })
    }

    /// Enable or disable the terminal progress bar
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    pub fn engine(&self) -> &MaskingEngine {
        &self.engine
    }

    /// Import a string table file, or every `.xml` file below a directory.
    ///
    /// Entries without `sID` or `EDID` are keyed by their file (the file name,
    /// or the path relative to the imported directory) and position.
    pub async fn import(&self, path: &Path) -> Result<ImportSummary> {
        if path.is_file() {
            let origin = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
            let entries = self.import_file(path, &origin).await?;
            return Ok(ImportSummary {
                files: 1,
                failed_files: 0,
                entries,
            });
        }

        if !path.is_dir() {
            return Err(AppError::File(format!("Input path does not exist: {}", path.display())).into());
        }

        let mut summary = ImportSummary::default();
        for entry in WalkDir::new(path).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let file = entry.path();
            if !file.is_file() || !is_xml_file(file) {
                continue;
            }

            let origin = relative_origin(path, file);
            match self.import_file(file, &origin).await {
                Ok(count) => {
                    summary.files += 1;
                    summary.entries += count;
                }
                Err(e) => {
                    error!("Error importing {}: {:#}", file.display(), e);
                    summary.failed_files += 1;
                }
            }
        }

        info!(
            "Imported {} entries from {} files ({} failed)",
            summary.entries, summary.files, summary.failed_files
        );
        Ok(summary)
    }

    async fn import_file(&self, path: &Path, origin: &str) -> Result<usize> {
        let document = dialogue_xml::load_file(path)?;
        let count = self.repository.upsert_dialogues(document.to_new_dialogues(origin)).await?;
        debug!("Upserted {} entries from {}", count, path.display());
        Ok(count)
    }

    /// Replace the glossary and rebuild the masking engine.
    ///
    /// Stored masked texts are cleared; they are recomputed by the next
    /// `mask_all` or `translate`.
    pub async fn load_glossary(&mut self, path: &Path) -> Result<usize> {
        let glossary = Glossary::load_json(path)?;
        let count = self.repository.replace_glossary(&glossary).await?;
        self.engine.rebuild(&glossary)?;

        for (category, terms) in glossary.categories() {
            debug!("Glossary category {}: {} terms", category, terms);
        }
        info!("Loaded {} glossary terms from {}", count, path.display());
        Ok(count)
    }

    /// Mask the source of every stored dialogue line
    pub async fn mask_all(&self) -> Result<usize> {
        let records = self.repository.list_dialogues().await?;
        self.mask_records(&records).await
    }

    async fn mask_records(&self, records: &[DialogueRecord]) -> Result<usize> {
        let updates: Vec<(i64, String)> = records
            .iter()
            .map(|r| (r.id, self.engine.mask(&r.source)))
            .collect();
        let changed = updates
            .iter()
            .zip(records)
            .filter(|((_, masked), r)| masked != &r.source)
            .count();

        let count = self.repository.update_masked_sources(updates).await?;
        info!("Masked {} lines ({} contain glossary terms)", count, changed);
        Ok(count)
    }

    /// Fail fast when the provider cannot be reached
    pub async fn check_provider(provider: &dyn Provider) -> Result<(), TranslationError> {
        provider
            .test_connection()
            .await
            .map_err(|source| TranslationError::Unreachable {
                provider: provider.name().to_string(),
                source,
            })?;
        debug!("Provider {} is reachable", provider.name());
        Ok(())
    }

    /// Translate stored lines through `provider`.
    ///
    /// Only lines without a translation are sent unless `retranslate` is set.
    pub async fn translate(&self, provider: Arc<dyn Provider>, retranslate: bool) -> Result<TranslationStats> {
        let mut records: Vec<DialogueRecord> = self
            .repository
            .list_dialogues()
            .await?
            .into_iter()
            .filter(|r| retranslate || r.dest.as_deref().is_none_or(|d| d.is_empty()))
            .collect();

        if records.is_empty() {
            info!("Nothing to translate");
            return Ok(TranslationStats::default());
        }

        let unmasked: Vec<DialogueRecord> = records.iter().filter(|r| r.masked_source.is_none()).cloned().collect();
        if !unmasked.is_empty() {
            debug!("Masking {} lines before translation", unmasked.len());
            self.mask_records(&unmasked).await?;
            for record in records.iter_mut().filter(|r| r.masked_source.is_none()) {
                record.masked_source = Some(self.engine.mask(&record.source));
            }
        }

        let settings = OrchestratorSettings::from_config(&self.config);
        let source_language = language_utils::normalize_code(&settings.source_language)?;
        let target_language = language_utils::normalize_code(&settings.target_language)?;

        let groups = TranslationOrchestrator::group_by_masked_text(&records);
        let texts: Vec<String> = groups.into_iter().map(|g| g.masked_text).collect();
        let memory = self
            .repository
            .lookup_memory_batch(texts, &source_language, &target_language)
            .await?;

        info!(
            "Translating from {} to {} with {} ({})",
            language_utils::get_language_name(&source_language)?,
            language_utils::get_language_name(&target_language)?,
            provider.name(),
            self.config.translation.get_model()
        );

        let progress_bar = self.progress_bar();
        let bar = progress_bar.clone();
        let orchestrator = TranslationOrchestrator::new(provider, settings);
        let outcome = orchestrator
            .translate(&records, &self.engine, &memory, move |done, total| {
                bar.set_length(total as u64);
                bar.set_position(done as u64);
            })
            .await;
        progress_bar.finish_and_clear();

        let updated = self.repository.update_translations(outcome.translations).await?;
        let stored = self
            .repository
            .store_memory(outcome.new_memory, &source_language, &target_language)
            .await?;
        debug!("Stored {} translation memory entries", stored);

        if outcome.stats.fallbacks > 0 {
            warn!("{} texts kept their original text after failed requests", outcome.stats.fallbacks);
        }
        info!("Updated {} translations", updated);
        Ok(outcome.stats)
    }

    fn progress_bar(&self) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let progress_bar = ProgressBar::new(0);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} texts ({percent}%) {eta}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar
    }

    /// Classify every stored line, optionally keeping only one tag
    pub async fn report(&self, filter: Option<AnomalyTag>) -> Result<AnomalyReport> {
        let records = self.repository.list_dialogues().await?;
        let report = AnomalyReport::build(&records);
        Ok(match filter {
            Some(tag) => report.filter(tag),
            None => report,
        })
    }

    /// Write every stored line to a string table file
    pub async fn export(&self, path: &Path) -> Result<usize> {
        let records = self.repository.list_dialogues().await?;
        let params = vec![
            ("Source".to_string(), language_param(&self.config.source_language)),
            ("Dest".to_string(), language_param(&self.config.target_language)),
        ];
        let document = DialogueDocument::from_records(params, &records);
        dialogue_xml::save_file(path, &document)
            .with_context(|| format!("Failed to export to {}", path.display()))?;
        Ok(document.entries.len())
    }

    /// Row counts and file size of the database
    pub async fn stats(&self) -> Result<DatabaseStats> {
        let connection = self.repository.connection().clone();
        tokio::task::spawn_blocking(move || connection.stats())
            .await
            .context("Statistics task panicked")?
    }
}

fn is_xml_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("xml"))
}

/// Path of `file` below `root`, with `/` separators
fn relative_origin(root: &Path, file: &Path) -> String {
    file.strip_prefix(root)
        .unwrap_or(file)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Lower-case English language name, as string tables name languages
fn language_param(code: &str) -> String {
    language_utils::get_language_name(code)
        .map(|name| name.to_lowercase())
        .unwrap_or_else(|_| code.to_string())
}
