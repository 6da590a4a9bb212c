/*!
 * Translation orchestration over masked dialogue lines.
 *
 * Lines are grouped by masked text so each distinct text costs at most one
 * provider call. Order of operations per group:
 * 1. reuse the translation memory, or call the provider with retries
 * 2. compare placeholders of the masked text and the raw translation
 * 3. unmask the raw translation
 * 4. fan the result out to every line of the group
 *
 * Anomaly classification happens later, on the unmasked result.
 */

use futures::stream::{self, StreamExt};
use log::{debug, info, warn};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;

use super::prompts::PromptTemplate;
use super::retry::RetryPolicy;
use crate::app_config::Config;
use crate::database::models::DialogueRecord;
use crate::masking::MaskingEngine;
use crate::providers::{Provider, TranslationRequest};
use crate::validation::PlaceholderValidator;

/// Records sharing one masked text
#[derive(Debug, Clone, PartialEq)]
pub struct TextGroup {
    /// Text sent to the provider
    pub masked_text: String,
    /// Row ids of every record with this text, in input order
    pub record_ids: Vec<i64>,
}

/// Counters for one translation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TranslationStats {
    /// Distinct masked texts
    pub unique_texts: usize,
    /// Provider requests, retries included
    pub provider_calls: usize,
    /// Texts answered from the translation memory
    pub memory_hits: usize,
    /// Texts left untranslated after the retries ran out
    pub fallbacks: usize,
    /// Texts whose translation lost or gained placeholders
    pub placeholder_issues: usize,
    /// Blank texts that were not sent
    pub skipped_empty: usize,
    /// Prompt tokens reported by the provider
    pub prompt_tokens: u64,
    /// Completion tokens reported by the provider
    pub completion_tokens: u64,
}

impl fmt::Display for TranslationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unique texts: {}, Provider calls: {}, Memory hits: {}, Fallbacks: {}, Placeholder issues: {}, Skipped empty: {}, Tokens: {} in / {} out",
            self.unique_texts,
            self.provider_calls,
            self.memory_hits,
            self.fallbacks,
            self.placeholder_issues,
            self.skipped_empty,
            self.prompt_tokens,
            self.completion_tokens
        )
    }
}

/// Result of a translation run
#[derive(Debug, Clone, Default)]
pub struct TranslationOutcome {
    /// `(record id, unmasked translation)` in group order
    pub translations: Vec<(i64, String)>,
    /// `(masked text, raw translation)` pairs fresh from the provider
    pub new_memory: Vec<(String, String)>,
    /// Run counters
    pub stats: TranslationStats,
}

/// Settings for a translation run
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub source_language: String,
    pub target_language: String,
    /// Rendered system prompt
    pub system_prompt: String,
    pub temperature: f32,
    /// Maximum number of requests in flight
    pub concurrent_requests: usize,
    pub retry: RetryPolicy,
}

impl OrchestratorSettings {
    /// Settings from the application configuration
    pub fn from_config(config: &Config) -> Self {
        let common = &config.translation.common;
        Self {
            source_language: config.source_language.clone(),
            target_language: config.target_language.clone(),
            system_prompt: PromptTemplate::new(&common.system_prompt)
                .render(&config.source_language, &config.target_language),
            temperature: common.temperature,
            concurrent_requests: common.concurrent_requests.max(1),
            retry: RetryPolicy::from_config(common),
        }
    }
}

/// What happened to one group
struct GroupResult {
    index: usize,
    group: TextGroup,
    raw: String,
    fresh: bool,
}

/// Translates dialogue lines through a provider
pub struct TranslationOrchestrator {
    provider: Arc<dyn Provider>,
    settings: OrchestratorSettings,
}

impl TranslationOrchestrator {
    /// Create a new orchestrator
    pub fn new(provider: Arc<dyn Provider>, settings: OrchestratorSettings) -> Self {
        Self { provider, settings }
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    /// Group records by masked text, falling back to the source when a
    /// record was never masked. Groups keep first-seen order.
    pub fn group_by_masked_text(records: &[DialogueRecord]) -> Vec<TextGroup> {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut groups: Vec<TextGroup> = Vec::new();

        for record in records {
            let text = record.text_for_translation();
            match index.get(text) {
                Some(&i) => groups[i].record_ids.push(record.id),
                None => {
                    index.insert(text, groups.len());
                    groups.push(TextGroup {
                        masked_text: text.to_string(),
                        record_ids: vec![record.id],
                    });
                }
            }
        }

        groups
    }

    /// Translate `records`.
    ///
    /// `memory` maps masked texts to raw translations from earlier runs.
    /// `progress_callback` receives `(done, total)` in groups.
    pub async fn translate(
        &self,
        records: &[DialogueRecord],
        engine: &MaskingEngine,
        memory: &HashMap<String, String>,
        progress_callback: impl Fn(usize, usize) + Clone + Send + 'static,
    ) -> TranslationOutcome {
        let groups = Self::group_by_masked_text(records);
        let total = groups.len();
        let stats = Arc::new(Mutex::new(TranslationStats {
            unique_texts: total,
            ..TranslationStats::default()
        }));

        info!(
            "Translating {} records ({} unique texts) with {}",
            records.len(),
            total,
            self.provider.name()
        );

        let concurrency = self.settings.concurrent_requests.max(1);
        let semaphore = Arc::new(Semaphore::new(concurrency));
        let processed = Arc::new(AtomicUsize::new(0));

        let mut results: Vec<GroupResult> = stream::iter(groups.into_iter().enumerate())
            .map(|(index, group)| {
                let semaphore = semaphore.clone();
                let stats = stats.clone();
                let processed = processed.clone();
                let progress_callback = progress_callback.clone();

                async move {
                    let (raw, fresh) = if group.masked_text.trim().is_empty() {
                        stats.lock().skipped_empty += 1;
                        (group.masked_text.clone(), false)
                    } else if let Some(remembered) = memory.get(&group.masked_text) {
                        debug!("Translation memory hit for group {}", index + 1);
                        stats.lock().memory_hits += 1;
                        (remembered.clone(), false)
                    } else {
                        // Only fails once the semaphore is closed, which never happens here
                        let _permit = semaphore.acquire().await.ok();
                        self.request(index, &group.masked_text, &stats).await
                    };

                    let done = processed.fetch_add(1, Ordering::SeqCst) + 1;
                    progress_callback(done, total);

                    GroupResult {
                        index,
                        group,
                        raw,
                        fresh,
                    }
                }
            })
            .buffer_unordered(concurrency)
            .collect()
            .await;

        results.sort_by_key(|r| r.index);

        let mut outcome = TranslationOutcome::default();
        for result in results {
            if result.group.masked_text.trim().is_empty() {
                continue;
            }

            let check = PlaceholderValidator::validate(&result.group.masked_text, &result.raw);
            if let Some(problem) = check.describe() {
                warn!(
                    "Placeholder mismatch in group {} ({} records): {}",
                    result.index + 1,
                    result.group.record_ids.len(),
                    problem
                );
                stats.lock().placeholder_issues += 1;
            }

            let dest = engine.unmask(&result.raw);
            outcome
                .translations
                .extend(result.group.record_ids.iter().map(|id| (*id, dest.clone())));
            if result.fresh {
                outcome.new_memory.push((result.group.masked_text, result.raw));
            }
        }

        outcome.stats = stats.lock().clone();
        info!("Translation finished. {}", outcome.stats);
        outcome
    }

    /// One provider round trip with retries; returns the raw text and
    /// whether it came from the provider
    async fn request(&self, index: usize, masked_text: &str, stats: &Mutex<TranslationStats>) -> (String, bool) {
        let request = TranslationRequest {
            text: masked_text.to_string(),
            system_prompt: self.settings.system_prompt.clone(),
            source_language: self.settings.source_language.clone(),
            target_language: self.settings.target_language.clone(),
            temperature: self.settings.temperature,
        };
        let operation_name = format!("Translate group {}", index + 1);

        let outcome = self
            .settings
            .retry
            .run(&operation_name, None, || {
                let request = request.clone();
                async move { self.provider.complete(request).await.map(Some) }
            })
            .await;

        let mut stats = stats.lock();
        stats.provider_calls += outcome.attempts as usize;
        match outcome.value {
            Some(response) => {
                stats.prompt_tokens += response.prompt_tokens.unwrap_or(0);
                stats.completion_tokens += response.completion_tokens.unwrap_or(0);
                (response.text, true)
            }
            None => {
                stats.fallbacks += 1;
                (masked_text.to_string(), false)
            }
        }
    }
}
