//! Breakdown composition: scenes plus entities into a candidate
//! Episode → Page → Panel tree.
//!
//! A [`Breakdown`] is a pure value. It carries no ids; panel and episode ids
//! are issued only when the production context merges it into the store.

use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use panelsmith_core::error::DomainError;
use panelsmith_core::record::PanelType;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::entities::{
    CharacterMention, Extraction, FALLBACK_CHARACTER, LocationMention, PropMention,
};
use super::scenes::Scene;

/// Scenes per candidate episode when the count is left to the composer.
pub const SCENES_PER_EPISODE: usize = 3;
/// Panels per page.
pub const PANELS_PER_PAGE: usize = 2;
/// Location label used when nothing was extracted.
pub const UNKNOWN_LOCATION: &str = "Unknown";
/// Dialogue placed on the first panel of a composed sequence.
pub const OPENING_LINE: &str = "\"This is where it all begins.\"";
/// Dialogue placed on the last panel of a composed sequence.
pub const CLOSING_LINE: &str = "\"This isn't over yet.\"";

/// How many candidate episodes to split the scenes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "HintRepr", into = "HintRepr")]
pub enum EpisodeCountHint {
    /// `ceil(scenes / 3)` episodes of up to three scenes each.
    #[default]
    Auto,
    /// Exactly `min(n, scenes)` contiguous episodes whose sizes differ by at
    /// most one scene; earlier episodes take the extra scenes.
    Fixed(NonZeroUsize),
}

impl EpisodeCountHint {
    /// Returns the number of scenes each candidate episode takes, in order.
    /// The sizes always sum to `scene_count`.
    #[must_use]
    pub fn episode_sizes(self, scene_count: usize) -> Vec<usize> {
        match self {
            Self::Auto => (0..scene_count)
                .step_by(SCENES_PER_EPISODE)
                .map(|start| SCENES_PER_EPISODE.min(scene_count - start))
                .collect(),
            Self::Fixed(episodes) => {
                let count = episodes.get().min(scene_count);
                if count == 0 {
                    return Vec::new();
                }
                let base = scene_count / count;
                let extra = scene_count % count;
                (0..count).map(|i| base + usize::from(i < extra)).collect()
            }
        }
    }
}

impl fmt::Display for EpisodeCountHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Fixed(n) => write!(f, "{n}"),
        }
    }
}

impl FromStr for EpisodeCountHint {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        s.parse::<NonZeroUsize>().map(Self::Fixed).map_err(|_| {
            DomainError::Validation(format!(
                "episode count must be \"auto\" or a positive integer, got {s:?}"
            ))
        })
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum HintRepr {
    Count(usize),
    Word(String),
}

impl TryFrom<HintRepr> for EpisodeCountHint {
    type Error = DomainError;

    fn try_from(repr: HintRepr) -> Result<Self, Self::Error> {
        match repr {
            HintRepr::Count(n) => NonZeroUsize::new(n).map(Self::Fixed).ok_or_else(|| {
                DomainError::Validation("episode count must be positive".to_owned())
            }),
            HintRepr::Word(word) => word.parse(),
        }
    }
}

impl From<EpisodeCountHint> for HintRepr {
    fn from(hint: EpisodeCountHint) -> Self {
        match hint {
            EpisodeCountHint::Auto => Self::Word("auto".to_owned()),
            EpisodeCountHint::Fixed(n) => Self::Count(n.get()),
        }
    }
}

/// A panel that has not been committed yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelDraft {
    /// Display name.
    pub name: String,
    /// Shot type.
    pub panel_type: PanelType,
    /// What the panel shows (the scene text).
    pub description: String,
    /// Spoken line, possibly empty.
    pub dialogue: String,
    /// Characters in frame.
    pub characters: Vec<String>,
    /// Location label.
    pub scene: String,
    /// Props in frame.
    pub props: Vec<String>,
}

/// A page of draft panels, numbered from 1 within its candidate episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftPage {
    /// Page number within the candidate episode.
    pub page_number: u32,
    /// Panels on this page, in order.
    pub panels: Vec<PanelDraft>,
}

/// A candidate episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftEpisode {
    /// Proposed title.
    pub title: String,
    /// Pages in order.
    pub pages: Vec<DraftPage>,
}

impl DraftEpisode {
    /// Iterates the draft panels of this episode in order.
    pub fn panels(&self) -> impl Iterator<Item = &PanelDraft> {
        self.pages.iter().flat_map(|page| page.panels.iter())
    }
}

/// An uncommitted Episode → Page → Panel tree plus everything extracted on
/// the way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakdown {
    /// Candidate episodes in order.
    pub episodes: Vec<DraftEpisode>,
    /// Extracted characters.
    pub characters: Vec<CharacterMention>,
    /// Extracted locations.
    pub locations: Vec<LocationMention>,
    /// Extracted props.
    pub props: Vec<PropMention>,
    /// The segmented scenes.
    pub scenes: Vec<Scene>,
    /// The id the first episode would get if created now.
    pub suggested_next_episode_id: i64,
}

impl Breakdown {
    /// Iterates every draft panel across all episodes and pages, in order.
    pub fn panels(&self) -> impl Iterator<Item = &PanelDraft> {
        self.episodes.iter().flat_map(DraftEpisode::panels)
    }

    /// Total number of draft panels.
    #[must_use]
    pub fn panel_count(&self) -> usize {
        self.panels().count()
    }

    /// Total number of non-empty draft pages.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.episodes
            .iter()
            .flat_map(|e| e.pages.iter())
            .filter(|page| !page.panels.is_empty())
            .count()
    }
}

fn leading_token(name: &str) -> String {
    name.split_whitespace()
        .next()
        .unwrap_or(name)
        .to_lowercase()
}

fn characters_in(lowered_scene: &str, characters: &[CharacterMention]) -> Vec<String> {
    let present: Vec<String> = characters
        .iter()
        .filter(|c| lowered_scene.contains(&c.name.to_lowercase()))
        .map(|c| c.name.clone())
        .collect();
    if !present.is_empty() {
        return present;
    }
    let default = characters
        .first()
        .map_or(FALLBACK_CHARACTER, |c| c.name.as_str());
    vec![default.to_owned()]
}

fn location_for(lowered_scene: &str, locations: &[LocationMention]) -> String {
    locations
        .iter()
        .find(|l| lowered_scene.contains(&leading_token(&l.name)))
        .or_else(|| locations.first())
        .map_or_else(|| UNKNOWN_LOCATION.to_owned(), |l| l.name.clone())
}

fn props_in(lowered_scene: &str, props: &[PropMention]) -> Vec<String> {
    props
        .iter()
        .filter(|p| lowered_scene.contains(&leading_token(&p.name)))
        .map(|p| p.name.clone())
        .collect()
}

fn episode_title(suggested_next_episode_id: i64, index: usize) -> String {
    let offset = i64::try_from(index).unwrap_or(i64::MAX);
    format!(
        "Episode {}",
        suggested_next_episode_id.saturating_add(offset)
    )
}

/// Composes segmented scenes and extracted entities into a [`Breakdown`].
///
/// Scenes are sliced into contiguous chunks, one per candidate episode (see
/// [`EpisodeCountHint`]). Within an episode, a new page starts every
/// [`PANELS_PER_PAGE`] scenes and panel types cycle through
/// [`PanelType::ROTATION`]. The first panel of the whole sequence carries
/// [`OPENING_LINE`], the last carries [`CLOSING_LINE`].
#[must_use]
pub fn compose(
    scenes: Vec<Scene>,
    extraction: Extraction,
    hint: EpisodeCountHint,
    suggested_next_episode_id: i64,
) -> Breakdown {
    let Extraction {
        characters,
        locations,
        props,
    } = extraction;
    let total_scenes = scenes.len();

    let mut episodes = Vec::new();
    let mut position = 0;
    for (episode_index, size) in hint.episode_sizes(total_scenes).into_iter().enumerate() {
        let chunk = &scenes[position..position + size];
        let mut pages: Vec<DraftPage> = Vec::new();
        for (index, scene) in chunk.iter().enumerate() {
            let lowered = scene.text.to_lowercase();
            let dialogue = if position == 0 {
                OPENING_LINE
            } else if position + 1 == total_scenes {
                CLOSING_LINE
            } else {
                ""
            };
            let panel = PanelDraft {
                name: format!("Panel {}", index + 1),
                panel_type: PanelType::ROTATION[index % PanelType::ROTATION.len()],
                description: scene.text.clone(),
                dialogue: dialogue.to_owned(),
                characters: characters_in(&lowered, &characters),
                scene: location_for(&lowered, &locations),
                props: props_in(&lowered, &props),
            };
            debug!(
                episode = episode_index,
                scene = scene.ordinal,
                panel_type = %panel.panel_type,
                characters = panel.characters.len(),
                "composed panel"
            );

            let starts_page = index > 0 && index % PANELS_PER_PAGE == 0;
            match pages.last_mut() {
                Some(page) if !starts_page => page.panels.push(panel),
                _ => pages.push(DraftPage {
                    page_number: u32::try_from(pages.len() + 1).unwrap_or(u32::MAX),
                    panels: vec![panel],
                }),
            }
            position += 1;
        }
        episodes.push(DraftEpisode {
            title: episode_title(suggested_next_episode_id, episode_index),
            pages,
        });
    }

    Breakdown {
        episodes,
        characters,
        locations,
        props,
        scenes,
        suggested_next_episode_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{EntityExtractor, Gazetteer};
    use crate::domain::scenes::segment;

    const COURT_SCRIPT: &str =
        "Kaito walks onto the court. Ryu dunks the ball. Coach watches from the sideline.";

    fn compose_text(text: &str, hint: EpisodeCountHint) -> Breakdown {
        compose(segment(text), Gazetteer::default().extract(text), hint, 1)
    }

    #[test]
    fn test_compose_court_script_yields_one_episode_two_pages() {
        // Act
        let breakdown = compose_text(COURT_SCRIPT, EpisodeCountHint::Auto);

        // Assert
        assert_eq!(breakdown.episodes.len(), 1);
        let episode = &breakdown.episodes[0];
        assert_eq!(episode.title, "Episode 1");
        assert_eq!(episode.pages.len(), 2);
        assert_eq!(episode.pages[0].page_number, 1);
        assert_eq!(episode.pages[0].panels.len(), 2);
        assert_eq!(episode.pages[1].page_number, 2);
        assert_eq!(episode.pages[1].panels.len(), 1);
        assert_eq!(breakdown.panel_count(), 3);
        assert_eq!(breakdown.page_count(), 2);
    }

    #[test]
    fn test_compose_assigns_entities_per_scene() {
        let breakdown = compose_text(COURT_SCRIPT, EpisodeCountHint::Auto);
        let panels: Vec<&PanelDraft> = breakdown.panels().collect();

        assert_eq!(panels[0].characters, vec!["Kaito"]);
        assert_eq!(panels[0].scene, "Court");
        assert!(panels[0].props.is_empty());

        assert_eq!(panels[1].characters, vec!["Ryu"]);
        assert_eq!(panels[1].props, vec!["Ball"]);
        // No location token in this scene, so the first extracted location is used.
        assert_eq!(panels[1].scene, "Court");

        assert_eq!(panels[2].characters, vec!["Coach"]);
        assert_eq!(panels[2].description, "Coach watches from the sideline");
    }

    #[test]
    fn test_compose_cycles_panel_types_and_places_dialogue() {
        let breakdown = compose_text(COURT_SCRIPT, EpisodeCountHint::Auto);
        let panels: Vec<&PanelDraft> = breakdown.panels().collect();

        assert_eq!(panels[0].panel_type, PanelType::Establishing);
        assert_eq!(panels[1].panel_type, PanelType::CloseUp);
        assert_eq!(panels[2].panel_type, PanelType::Action);
        assert_eq!(panels[0].dialogue, OPENING_LINE);
        assert_eq!(panels[1].dialogue, "");
        assert_eq!(panels[2].dialogue, CLOSING_LINE);
    }

    #[test]
    fn test_compose_empty_text_yields_one_episode_with_two_panels() {
        let breakdown = compose_text("", EpisodeCountHint::Auto);

        assert_eq!(breakdown.episodes.len(), 1);
        assert_eq!(breakdown.panel_count(), 2);
        assert_eq!(breakdown.episodes[0].pages.len(), 1);
        for panel in breakdown.panels() {
            assert_eq!(panel.characters, vec![FALLBACK_CHARACTER]);
            assert_eq!(panel.scene, UNKNOWN_LOCATION);
            assert!(panel.props.is_empty());
        }
    }

    #[test]
    fn test_compose_unmatched_scene_defaults_to_first_character() {
        let text = "Kaito stretches by the lockers. The crowd roars in the distance.";

        let breakdown = compose_text(text, EpisodeCountHint::Auto);
        let panels: Vec<&PanelDraft> = breakdown.panels().collect();

        assert_eq!(panels[1].characters, vec!["Kaito"]);
    }

    #[test]
    fn test_compose_auto_splits_six_scenes_into_two_episodes() {
        let text = "Kaito arrives at school early. Hana waves from the classroom. \
                    Ryu blocks the hallway. Coach blows the whistle loudly. \
                    The scoreboard flickers on. Mei checks her phone nervously.";

        let breakdown = compose_text(text, EpisodeCountHint::Auto);

        assert_eq!(breakdown.scenes.len(), 6);
        assert_eq!(breakdown.episodes.len(), 2);
        assert_eq!(breakdown.episodes[0].title, "Episode 1");
        assert_eq!(breakdown.episodes[1].title, "Episode 2");
        for episode in &breakdown.episodes {
            assert_eq!(episode.panels().count(), 3);
            assert_eq!(episode.pages.len(), 2);
            // Panel types restart per episode.
            assert_eq!(episode.pages[0].panels[0].panel_type, PanelType::Establishing);
        }
        let dialogues: Vec<&str> = breakdown.panels().map(|p| p.dialogue.as_str()).collect();
        assert_eq!(dialogues, vec![OPENING_LINE, "", "", "", "", CLOSING_LINE]);
    }

    #[test]
    fn test_compose_fixed_hint_spreads_scenes() {
        let text = "Kaito arrives at school early. Hana waves from the classroom. \
                    Ryu blocks the hallway. Coach blows the whistle loudly. \
                    The scoreboard flickers on. Mei checks her phone nervously.";
        let one = EpisodeCountHint::Fixed(NonZeroUsize::new(1).unwrap());

        let breakdown = compose_text(text, one);

        assert_eq!(breakdown.episodes.len(), 1);
        let episode = &breakdown.episodes[0];
        assert_eq!(episode.pages.len(), 3);
        let page_numbers: Vec<u32> = episode.pages.iter().map(|p| p.page_number).collect();
        assert_eq!(page_numbers, vec![1, 2, 3]);
        assert_eq!(episode.pages[2].panels[1].panel_type, PanelType::Silent);
    }

    #[test]
    fn test_compose_fixed_hint_yields_requested_episode_count() {
        let text = "Kaito arrives at school early. Hana waves from the classroom. \
                    Ryu blocks the hallway. Coach blows the whistle loudly. \
                    The scoreboard flickers on. Mei checks her phone nervously.";

        for requested in 1..=8 {
            let hint = EpisodeCountHint::Fixed(NonZeroUsize::new(requested).unwrap());

            let breakdown = compose_text(text, hint);

            assert_eq!(
                breakdown.episodes.len(),
                requested.min(6),
                "episode_count {requested}"
            );
            assert_eq!(breakdown.panel_count(), 6);
        }
    }

    #[test]
    fn test_compose_fixed_hint_front_loads_extra_scenes() {
        let text = "Kaito arrives at school early. Hana waves from the classroom. \
                    Ryu blocks the hallway. Coach blows the whistle loudly. \
                    The scoreboard flickers on. Mei checks her phone nervously.";
        let four = EpisodeCountHint::Fixed(NonZeroUsize::new(4).unwrap());

        let breakdown = compose_text(text, four);

        let sizes: Vec<usize> = breakdown.episodes.iter().map(|e| e.panels().count()).collect();
        assert_eq!(sizes, vec![2, 2, 1, 1]);
        let descriptions: Vec<&str> = breakdown
            .panels()
            .map(|p| p.description.as_str())
            .collect();
        assert_eq!(descriptions[2], "Ryu blocks the hallway");
        assert_eq!(descriptions[5], "Mei checks her phone nervously");
    }

    #[test]
    fn test_episode_sizes_cover_every_scene() {
        let five = EpisodeCountHint::Fixed(NonZeroUsize::new(5).unwrap());

        assert_eq!(EpisodeCountHint::Auto.episode_sizes(7), vec![3, 3, 1]);
        assert_eq!(five.episode_sizes(6), vec![2, 1, 1, 1, 1]);
        assert_eq!(five.episode_sizes(3), vec![1, 1, 1]);
        assert!(five.episode_sizes(0).is_empty());
    }

    #[test]
    fn test_compose_matches_location_by_leading_word() {
        let text = "Kaito walks onto the court. Later the school rooftop is empty. \
                    The school bell rings loudly.";

        let breakdown = compose_text(text, EpisodeCountHint::Auto);
        let panels: Vec<&PanelDraft> = breakdown.panels().collect();

        assert_eq!(panels[0].scene, "Court");
        assert_eq!(panels[1].scene, "School Rooftop");
        // Only "school" appears here; the first extracted location would be "Court".
        assert_eq!(panels[2].scene, "School Rooftop");
    }

    #[test]
    fn test_compose_matches_prop_by_leading_word() {
        // Arrange
        let gazetteer = Gazetteer::from_json(
            r#"{
                "characters": [{"name": "Ryu", "tags": []}, {"name": "Kaito", "tags": []}],
                "props": [{"name": "Water Bottle", "tags": ["Gear"]}]
            }"#,
        )
        .unwrap();
        let text = "Ryu grabs the water bottle from the bench. Kaito drinks some water slowly.";

        // Act
        let breakdown = compose(
            segment(text),
            gazetteer.extract(text),
            EpisodeCountHint::Auto,
            1,
        );

        // Assert
        let panels: Vec<&PanelDraft> = breakdown.panels().collect();
        assert_eq!(panels[0].props, vec!["Water Bottle"]);
        assert_eq!(panels[1].props, vec!["Water Bottle"]);
    }

    #[test]
    fn test_compose_uses_suggested_episode_id_for_titles() {
        let breakdown = compose(
            segment(COURT_SCRIPT),
            Gazetteer::default().extract(COURT_SCRIPT),
            EpisodeCountHint::Auto,
            42,
        );

        assert_eq!(breakdown.suggested_next_episode_id, 42);
        assert_eq!(breakdown.episodes[0].title, "Episode 42");
    }

    #[test]
    fn test_episode_count_hint_parses() {
        assert_eq!("auto".parse::<EpisodeCountHint>().unwrap(), EpisodeCountHint::Auto);
        assert_eq!(
            "3".parse::<EpisodeCountHint>().unwrap(),
            EpisodeCountHint::Fixed(NonZeroUsize::new(3).unwrap())
        );
        assert!("0".parse::<EpisodeCountHint>().is_err());
        assert!("many".parse::<EpisodeCountHint>().is_err());
    }

    #[test]
    fn test_episode_count_hint_deserializes_word_or_number() {
        let auto: EpisodeCountHint = serde_json::from_str("\"auto\"").unwrap();
        let two: EpisodeCountHint = serde_json::from_str("2").unwrap();

        assert_eq!(auto, EpisodeCountHint::Auto);
        assert_eq!(two, EpisodeCountHint::Fixed(NonZeroUsize::new(2).unwrap()));
        assert!(serde_json::from_str::<EpisodeCountHint>("0").is_err());
    }
}
