/*!
 * Anomaly report over a set of dialogue records.
 */

use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use super::anomalies::{classify, AnomalySet, AnomalyTag};
use crate::database::models::DialogueRecord;

/// Maximum characters of text shown per line in the text rendering
const PREVIEW_CHARS: usize = 60;

/// A record that carries at least one anomaly tag
#[derive(Debug, Clone, Serialize)]
pub struct FlaggedRecord {
    pub id: i64,
    pub string_key: String,
    pub source: String,
    pub dest: Option<String>,
    pub tags: AnomalySet,
}

/// Per-tag counts plus the flagged records
#[derive(Debug, Clone, Serialize)]
pub struct AnomalyReport {
    /// Number of records examined
    pub total_records: usize,
    /// Number of records carrying each tag
    pub counts: BTreeMap<AnomalyTag, usize>,
    /// Records with at least one tag, in input order
    pub flagged: Vec<FlaggedRecord>,
}

impl AnomalyReport {
    /// Classify every record
    pub fn build<'a>(records: impl IntoIterator<Item = &'a DialogueRecord>) -> Self {
        let mut counts: BTreeMap<AnomalyTag, usize> = AnomalyTag::ALL.iter().map(|t| (*t, 0)).collect();
        let mut flagged = Vec::new();
        let mut total_records = 0;

        for record in records {
            total_records += 1;
            let tags = classify(&record.source, record.dest.as_deref());
            if tags.is_empty() {
                continue;
            }
            for tag in tags.iter() {
                *counts.entry(tag).or_insert(0) += 1;
            }
            flagged.push(FlaggedRecord {
                id: record.id,
                string_key: record.string_key.clone(),
                source: record.source.clone(),
                dest: record.dest.clone(),
                tags,
            });
        }

        Self {
            total_records,
            counts,
            flagged,
        }
    }

    /// Keep only flagged records carrying `tag`; counts are unchanged
    pub fn filter(&self, tag: AnomalyTag) -> Self {
        Self {
            total_records: self.total_records,
            counts: self.counts.clone(),
            flagged: self
                .flagged
                .iter()
                .filter(|r| r.tags.contains(tag))
                .cloned()
                .collect(),
        }
    }

    pub fn count(&self, tag: AnomalyTag) -> usize {
        self.counts.get(&tag).copied().unwrap_or(0)
    }

    /// Records with no tag at all
    pub fn clean_count(&self) -> usize {
        self.total_records - self.flagged.len()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn preview(text: &str) -> String {
    let single_line = text.replace('\n', "\\n");
    if single_line.chars().count() <= PREVIEW_CHARS {
        single_line
    } else {
        format!("{}...", single_line.chars().take(PREVIEW_CHARS).collect::<String>())
    }
}

impl fmt::Display for AnomalyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Records: {}, flagged: {}, clean: {}",
            self.total_records,
            self.flagged.len(),
            self.clean_count()
        )?;
        for (tag, count) in &self.counts {
            writeln!(f, "  {:<12} {}", tag.as_str(), count)?;
        }
        for record in &self.flagged {
            writeln!(
                f,
                "#{} {} [{}] {} => {}",
                record.id,
                record.string_key,
                record.tags,
                preview(&record.source),
                record.dest.as_deref().map(preview).unwrap_or_else(|| "<none>".to_string())
            )?;
        }
        Ok(())
    }
}
