//! Extraction of story and part references from raw message text.

use std::{collections::BTreeSet, sync::LazyLock};

use regex::Regex;

/// Matches story URLs, e.g. `wattpad.com/story/12345`.
static STORY_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"wattpad\.com/story/(\d+)").unwrap());

/// Matches part URLs, e.g. `wattpad.com/12345`.
static PART_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"wattpad\.com/(\d+)").unwrap());

/// The unique story and part ids found in one message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoryRefs {
    pub story_ids: BTreeSet<u64>,
    pub part_ids: BTreeSet<u64>,
}

impl StoryRefs {
    pub fn is_empty(&self) -> bool {
        self.story_ids.is_empty() && self.part_ids.is_empty()
    }
}

/// Scans `text` for story and part URLs and returns the deduplicated id sets.
///
/// The two patterns overlap in shape, and an id may legitimately match both;
/// reconciliation resolves precedence, not extraction.
pub fn extract_refs(text: &str) -> StoryRefs {
    StoryRefs {
        story_ids: capture_ids(&STORY_PATTERN, text),
        part_ids: capture_ids(&PART_PATTERN, text),
    }
}

fn capture_ids(pattern: &Regex, text: &str) -> BTreeSet<u64> {
    pattern.captures_iter(text).filter_map(|c| c[1].parse().ok()).collect()
}
