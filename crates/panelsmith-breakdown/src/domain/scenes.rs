//! Scene segmentation.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Fragments shorter than this many characters (after trimming) are noise.
pub const MIN_FRAGMENT_CHARS: usize = 10;
/// Fewest scenes a segmentation ever yields.
pub const MIN_SCENES: usize = 2;
/// Most scenes a segmentation ever yields.
pub const MAX_SCENES: usize = 6;

const FRAGMENT_TERMINATORS: [char; 4] = ['.', '!', '?', '\n'];

/// One ordered fragment of the source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    /// 0-based position within the segmented sequence.
    pub ordinal: usize,
    /// The fragment text, trimmed.
    pub text: String,
    /// Positional tags.
    pub tags: BTreeSet<String>,
}

/// Splits `text` on sentence terminals and newlines, keeping the trimmed
/// fragments that are at least [`MIN_FRAGMENT_CHARS`] long.
#[must_use]
pub fn fragments(text: &str) -> Vec<&str> {
    text.split(FRAGMENT_TERMINATORS)
        .map(str::trim)
        .filter(|fragment| fragment.chars().count() >= MIN_FRAGMENT_CHARS)
        .collect()
}

fn position_tags(ordinal: usize, scene_count: usize) -> BTreeSet<String> {
    let tags: [&str; 2] = if ordinal == 0 {
        ["Opening", "Establishing"]
    } else if ordinal + 1 == scene_count {
        ["Climax", "Emotional"]
    } else {
        ["Development", "Action"]
    };
    tags.iter().map(|t| (*t).to_owned()).collect()
}

/// Splits `text` into between [`MIN_SCENES`] and [`MAX_SCENES`] scenes.
///
/// Surplus fragments past the sixth are dropped. Missing scenes are padded
/// with `"Scene k from script"` placeholders (k is 1-based), so empty input
/// still yields two scenes.
#[must_use]
pub fn segment(text: &str) -> Vec<Scene> {
    let fragments = fragments(text);
    let scene_count = fragments.len().clamp(MIN_SCENES, MAX_SCENES);

    (0..scene_count)
        .map(|ordinal| Scene {
            ordinal,
            text: fragments.get(ordinal).map_or_else(
                || format!("Scene {} from script", ordinal + 1),
                |fragment| (*fragment).to_owned(),
            ),
            tags: position_tags(ordinal, scene_count),
        })
        .collect()
}
