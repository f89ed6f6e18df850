//! Heuristic entity extraction.
//!
//! Extraction is gazetteer based: a fixed table maps canonical names to
//! default tags, and an entry is reported when its name occurs anywhere in
//! the text (case-insensitive substring). Names that are substrings of other
//! words are over-counted ("Ryu" inside "Ryuji", "Ball" inside "Basketball").
//! That is an accepted limitation of the heuristic and is not corrected with
//! word-boundary logic.

use std::collections::BTreeSet;

use panelsmith_core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Name of the character emitted when nothing in the gazetteer matches.
pub const FALLBACK_CHARACTER: &str = "Character A";

/// Tags carried by the fallback character.
pub const FALLBACK_CHARACTER_TAGS: [&str; 2] = ["Auto-detected", "Lead"];

/// A named entity found in the source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMention {
    /// Canonical name from the gazetteer.
    pub name: String,
    /// Non-overlapping, case-insensitive occurrences of `name`.
    pub mention_count: usize,
    /// Default tags for this entity.
    pub tags: BTreeSet<String>,
}

/// A character found in the source text.
pub type CharacterMention = EntityMention;
/// A location found in the source text.
pub type LocationMention = EntityMention;
/// A prop found in the source text.
pub type PropMention = EntityMention;

impl EntityMention {
    fn fallback_character() -> Self {
        Self {
            name: FALLBACK_CHARACTER.to_owned(),
            mention_count: 0,
            tags: FALLBACK_CHARACTER_TAGS.iter().map(|t| (*t).to_owned()).collect(),
        }
    }
}

/// Everything one extraction pass found.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Extraction {
    /// Never empty when produced by a [`Gazetteer`].
    pub characters: Vec<CharacterMention>,
    /// May be empty.
    pub locations: Vec<LocationMention>,
    /// May be empty.
    pub props: Vec<PropMention>,
}

/// Turns raw text into entity mentions.
///
/// Implementations must be total: they never fail and never block.
pub trait EntityExtractor: Send + Sync {
    /// Extract characters, locations and props from `text`.
    fn extract(&self, text: &str) -> Extraction;
}

/// One gazetteer row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GazetteerEntry {
    /// Canonical name, matched case-insensitively.
    pub name: String,
    /// Default tags reported with every mention.
    pub tags: Vec<String>,
}

impl GazetteerEntry {
    fn new(name: &str, tags: &[&str]) -> Self {
        Self {
            name: name.to_owned(),
            tags: tags.iter().map(|t| (*t).to_owned()).collect(),
        }
    }
}

/// Fixed lookup table of known entities, in report order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gazetteer {
    /// Known characters.
    pub characters: Vec<GazetteerEntry>,
    /// Known locations.
    #[serde(default)]
    pub locations: Vec<GazetteerEntry>,
    /// Known props.
    #[serde(default)]
    pub props: Vec<GazetteerEntry>,
}

impl Default for Gazetteer {
    fn default() -> Self {
        Self {
            characters: vec![
                GazetteerEntry::new("Kaito", &["Main Character", "Male", "Student"]),
                GazetteerEntry::new("Ryu", &["Rival", "Male", "Athlete"]),
                GazetteerEntry::new("Coach", &["Mentor", "Adult"]),
                GazetteerEntry::new("Hana", &["Supporting", "Female", "Student"]),
                GazetteerEntry::new("Mei", &["Supporting", "Female", "Manager"]),
            ],
            locations: vec![
                GazetteerEntry::new("Court", &["Sports", "Indoor"]),
                GazetteerEntry::new("Gymnasium", &["Sports", "Indoor"]),
                GazetteerEntry::new("School Rooftop", &["School", "Outdoor"]),
                GazetteerEntry::new("Classroom", &["School", "Indoor"]),
                GazetteerEntry::new("Locker Room", &["Sports", "Indoor"]),
                GazetteerEntry::new("Street", &["City", "Outdoor"]),
            ],
            props: vec![
                GazetteerEntry::new("Ball", &["Sports Equipment"]),
                GazetteerEntry::new("Whistle", &["Sports Equipment"]),
                GazetteerEntry::new("Scoreboard", &["Set Dressing"]),
                GazetteerEntry::new("Jersey", &["Costume"]),
                GazetteerEntry::new("Phone", &["Personal Item"]),
            ],
        }
    }
}

impl Gazetteer {
    /// Parses a gazetteer from JSON of the form
    /// `{"characters": [{"name": .., "tags": [..]}], "locations": [..], "props": [..]}`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the JSON is malformed or an entry
    /// has a blank name.
    pub fn from_json(json: &str) -> Result<Self, DomainError> {
        let gazetteer: Self = serde_json::from_str(json)
            .map_err(|e| DomainError::Validation(format!("invalid gazetteer: {e}")))?;
        let blank = gazetteer
            .characters
            .iter()
            .chain(&gazetteer.locations)
            .chain(&gazetteer.props)
            .any(|entry| entry.name.trim().is_empty());
        if blank {
            return Err(DomainError::Validation(
                "gazetteer entries must have a non-blank name".to_owned(),
            ));
        }
        Ok(gazetteer)
    }
}

/// Counts non-overlapping occurrences of `needle` in `haystack`. Both sides
/// are expected to be lowercased already.
fn count_occurrences(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    haystack.matches(needle).count()
}

fn scan(lowered_text: &str, entries: &[GazetteerEntry]) -> Vec<EntityMention> {
    entries
        .iter()
        .filter_map(|entry| {
            let mention_count = count_occurrences(lowered_text, &entry.name.to_lowercase());
            (mention_count > 0).then(|| EntityMention {
                name: entry.name.clone(),
                mention_count,
                tags: entry.tags.iter().cloned().collect(),
            })
        })
        .collect()
}

impl EntityExtractor for Gazetteer {
    fn extract(&self, text: &str) -> Extraction {
        let lowered = text.to_lowercase();
        let mut characters = scan(&lowered, &self.characters);
        if characters.is_empty() {
            characters.push(EntityMention::fallback_character());
        }
        Extraction {
            characters,
            locations: scan(&lowered, &self.locations),
            props: scan(&lowered, &self.props),
        }
    }
}
