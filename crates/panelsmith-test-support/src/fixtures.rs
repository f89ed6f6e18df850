//! Record fixtures for tests.

use panelsmith_core::record::{Episode, EpisodeStatus, Panel, PanelStatus, PanelType};

fn panel(id: i64, page_number: u32) -> Panel {
    Panel {
        id,
        name: format!("Panel {id}"),
        page_number,
        panel_type: PanelType::Establishing,
        description: format!("Existing panel {id}"),
        dialogue: String::new(),
        characters: vec!["Kaito".to_owned()],
        scene: "Court".to_owned(),
        props: Vec::new(),
        status: PanelStatus::Queued,
    }
}

/// A `todo` episode holding one panel per `(panel_id, page_number)` pair.
/// `page_count` is derived from the panels.
#[must_use]
pub fn episode_with_panels(id: i64, panels: &[(i64, u32)]) -> Episode {
    let mut episode = Episode {
        id,
        title: format!("Episode {id}"),
        arc: "Season One".to_owned(),
        status: EpisodeStatus::Todo,
        summary: format!("Summary of episode {id}"),
        page_count: 0,
        panels: panels
            .iter()
            .map(|&(panel_id, page_number)| panel(panel_id, page_number))
            .collect(),
    };
    episode.page_count = episode.distinct_page_count();
    episode
}
