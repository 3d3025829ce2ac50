//! Reconciliation of raw story/part references into unique resolved stories.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{instrument, warn};

use crate::{base::types::Story, service::wattpad::StoryClient};

use super::extract::StoryRefs;

/// Which reference shape a failed lookup came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    Story,
    Part,
}

/// A reference whose lookup failed. The rest of the batch is unaffected.
#[derive(Debug)]
pub struct FailedRef {
    pub kind: RefKind,
    pub id: u64,
    pub error: crate::base::types::Err,
}

/// The outcome of resolving one message's references.
///
/// `stories` is keyed by canonical story id, so it holds at most one entry per
/// story no matter how many raw references pointed at it.
#[derive(Debug, Default)]
pub struct ResolvedBatch {
    pub stories: BTreeMap<u64, Story>,
    pub failures: Vec<FailedRef>,
}

/// Resolves the extracted reference sets into one story per canonical id.
///
/// Story ids are fetched first, and every fetched story contributes its part
/// ids to a known-parts set. A part id already in that set belongs to a story
/// resolved earlier in the batch and is skipped; otherwise its owning story is
/// fetched and its own part list is merged into the set, so later parts of the
/// same story are not fetched again.
#[instrument(skip_all)]
pub async fn resolve_references(refs: &StoryRefs, client: &StoryClient) -> ResolvedBatch {
    let mut known_parts: BTreeSet<u64> = BTreeSet::new();
    let mut batch = ResolvedBatch::default();

    for &story_id in &refs.story_ids {
        match client.get_story(story_id).await {
            Ok(story) => {
                known_parts.extend(story.parts.iter().map(|p| p.id));
                batch.stories.insert(story.id, story);
            }
            Err(error) => {
                warn!("Story lookup failed for `{story_id}`: {error:#}");
                batch.failures.push(FailedRef { kind: RefKind::Story, id: story_id, error });
            }
        }
    }

    for &part_id in &refs.part_ids {
        if known_parts.contains(&part_id) {
            continue;
        }

        match client.get_story_from_part(part_id).await {
            Ok(story) => {
                known_parts.extend(story.parts.iter().map(|p| p.id));
                batch.stories.insert(story.id, story);
            }
            Err(error) => {
                warn!("Part lookup failed for `{part_id}`: {error:#}");
                batch.failures.push(FailedRef { kind: RefKind::Part, id: part_id, error });
            }
        }
    }

    batch
}
