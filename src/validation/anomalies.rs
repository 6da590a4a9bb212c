/*!
 * Heuristic anomaly classification for translated dialogue.
 *
 * Each record is described by its source text and its (possibly missing)
 * translation. The predicates below are independent; `classify` combines
 * them into a tag set. DLC and technical tags look at the source only and
 * can co-occur with any translation-state tag.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// `DLC` followed by digits anywhere in the text
static DLC_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)DLC\d+").expect("Invalid DLC regex"));

/// Characters whose sequence must survive translation
const STRUCTURAL_CHARS: [char; 3] = ['<', '>', '"'];

/// Anomaly category attached to a dialogue record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AnomalyTag {
    /// No translation yet
    Missing,
    /// Translation identical to the source
    Same,
    /// Source belongs to downloadable content
    Dlc,
    /// Source looks like a machine identifier
    Technical,
    /// Tag or quote characters differ between source and translation
    Punctuation,
}

impl AnomalyTag {
    pub const ALL: [AnomalyTag; 5] = [
        AnomalyTag::Missing,
        AnomalyTag::Same,
        AnomalyTag::Dlc,
        AnomalyTag::Technical,
        AnomalyTag::Punctuation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyTag::Missing => "MISSING",
            AnomalyTag::Same => "SAME",
            AnomalyTag::Dlc => "DLC",
            AnomalyTag::Technical => "TECHNICAL",
            AnomalyTag::Punctuation => "PUNCTUATION",
        }
    }
}

impl fmt::Display for AnomalyTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AnomalyTag {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "MISSING" => Ok(AnomalyTag::Missing),
            "SAME" => Ok(AnomalyTag::Same),
            "DLC" => Ok(AnomalyTag::Dlc),
            "TECHNICAL" => Ok(AnomalyTag::Technical),
            "PUNCTUATION" => Ok(AnomalyTag::Punctuation),
            _ => Err(anyhow::anyhow!("Invalid anomaly tag: {}", s)),
        }
    }
}

/// Ordered set of anomaly tags for one record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnomalySet(BTreeSet<AnomalyTag>);

impl AnomalySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tag: AnomalyTag) {
        self.0.insert(tag);
    }

    pub fn contains(&self, tag: AnomalyTag) -> bool {
        self.0.contains(&tag)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = AnomalyTag> + '_ {
        self.0.iter().copied()
    }
}

impl fmt::Display for AnomalySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(|t| t.as_str()).collect();
        write!(f, "{}", names.join(","))
    }
}

impl FromIterator<AnomalyTag> for AnomalySet {
    fn from_iter<I: IntoIterator<Item = AnomalyTag>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// True when there is no translation
pub fn is_missing(dest: Option<&str>) -> bool {
    dest.is_none_or(str::is_empty)
}

/// True when the translation is a non-empty byte-for-byte copy of the source
pub fn is_same(source: &str, dest: Option<&str>) -> bool {
    matches!(dest, Some(d) if !d.is_empty() && d == source)
}

/// True for DLC strings: `DLC<digits>` anywhere (any case) or a literal `DLC` prefix
pub fn is_dlc(text: &str) -> bool {
    text.starts_with("DLC") || DLC_REGEX.is_match(text)
}

/// True for identifier-like text such as `FemaleHeadWoodElfVampire` or `MQ101_Stage2`
pub fn is_technical(text: &str) -> bool {
    if text.contains(' ') {
        return false;
    }

    let uppercase = text.chars().filter(|c| c.is_ascii_uppercase()).count();
    if uppercase == 0 {
        return false;
    }

    let has_digit = text.chars().any(|c| c.is_ascii_digit());
    let has_underscore = text.contains('_');

    has_digit || has_underscore || uppercase > 1
}

/// Keep only `<`, `>` and `"`, in order
fn structural_chars(text: &str) -> impl Iterator<Item = char> + '_ {
    text.chars().filter(|c| STRUCTURAL_CHARS.contains(c))
}

/// True when the tag/quote character sequences of source and translation differ
pub fn is_punctuation_mismatch(source: &str, dest: &str) -> bool {
    if dest.is_empty() {
        return false;
    }
    !structural_chars(source).eq(structural_chars(dest))
}

/// Classify one source/translation pair
pub fn classify(source: &str, dest: Option<&str>) -> AnomalySet {
    let mut tags = AnomalySet::new();

    if is_missing(dest) {
        tags.insert(AnomalyTag::Missing);
    } else if let Some(dest) = dest {
        if is_same(source, Some(dest)) {
            tags.insert(AnomalyTag::Same);
        } else if is_punctuation_mismatch(source, dest) {
            tags.insert(AnomalyTag::Punctuation);
        }
    }

    if is_dlc(source) {
        tags.insert(AnomalyTag::Dlc);
    }
    if is_technical(source) {
        tags.insert(AnomalyTag::Technical);
    }

    tags
}
