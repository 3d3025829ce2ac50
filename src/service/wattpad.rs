//! Wattpad v3 API client for story metadata lookups.

use std::{ops::Deref, sync::Arc};

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use serde_with::{DisplayFromStr, serde_as};
use tracing::{debug, instrument};

use crate::base::types::{Res, Story};

/// Identifying header sent with every lookup.
const USER_AGENT: &str = "WPDBot";

/// Root of the Wattpad v3 API.
const API_BASE: &str = "https://www.wattpad.com/api/v3";

/// Field selection for the story endpoint.
///
/// Exactly the fields the card builder consumes; changing this set requires a
/// matching change in the card formatting contract.
const STORY_FIELDS: &str = "id,cover,readCount,voteCount,commentCount,modifyDate,numParts,language(name),user(name),completed,mature,title,parts(id)";

/// Field selection for the story-part endpoint. The owning story's fields are
/// nested one level deeper, under `group`.
const PART_FIELDS: &str = "groupId,group(id,cover,readCount,voteCount,commentCount,modifyDate,numParts,language(name),user(name),completed,mature,title,parts(id))";

// Traits.

/// Generic story metadata client that implementations must provide.
#[async_trait]
pub trait GenericStoryClient {
    /// Look up a story directly by its id.
    async fn get_story(&self, story_id: u64) -> Res<Story>;
    /// Look up a part by its id, resolving it to its owning story.
    async fn get_story_from_part(&self, part_id: u64) -> Res<Story>;
}

// Structs.

/// Story metadata client for the application.
///
/// This is trivially cloneable and can be passed around without the need for
/// `Arc` or `Mutex`.
#[derive(Clone)]
pub struct StoryClient {
    inner: Arc<dyn GenericStoryClient + Send + Sync + 'static>,
}

impl Deref for StoryClient {
    type Target = dyn GenericStoryClient + Send + Sync + 'static;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl StoryClient {
    /// Creates a client backed by the public Wattpad API.
    pub fn wattpad() -> Self {
        Self { inner: Arc::new(HttpStoryClient) }
    }

    /// Creates a client from any [`GenericStoryClient`] implementation.
    pub fn new(inner: Arc<dyn GenericStoryClient + Send + Sync + 'static>) -> Self {
        Self { inner }
    }
}

// Specific implementations.

/// HTTP implementation over the public Wattpad API.
#[derive(Clone)]
pub struct HttpStoryClient;

/// Wire shape of the story-part endpoint response.
#[serde_as]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartLookup {
    #[serde_as(as = "DisplayFromStr")]
    #[allow(dead_code)]
    group_id: u64,
    group: Story,
}

impl HttpStoryClient {
    /// Issues a single GET and decodes the payload into `T`.
    ///
    /// Each lookup gets its own client; no connection or session state is
    /// shared across calls.
    async fn fetch<T: serde::de::DeserializeOwned>(url: &str) -> Res<T> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        let response = client.get(url).send().await?.error_for_status()?;

        let payload = response.json::<T>().await?;

        Ok(payload)
    }
}

#[async_trait]
impl GenericStoryClient for HttpStoryClient {
    #[instrument(skip(self))]
    async fn get_story(&self, story_id: u64) -> Res<Story> {
        debug!("Fetching story {story_id} ...");

        let url = format!("{API_BASE}/stories/{story_id}?fields={STORY_FIELDS}");

        Self::fetch::<Story>(&url).await.with_context(|| format!("Failed to fetch story `{story_id}`"))
    }

    #[instrument(skip(self))]
    async fn get_story_from_part(&self, part_id: u64) -> Res<Story> {
        debug!("Fetching owning story of part {part_id} ...");

        let url = format!("{API_BASE}/story_parts/{part_id}?fields={PART_FIELDS}");

        let lookup = Self::fetch::<PartLookup>(&url).await.with_context(|| format!("Failed to fetch part `{part_id}`"))?;

        Ok(lookup.group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn story_payload_decodes_strictly() {
        let payload = serde_json::json!({
            "id": "555",
            "title": "A Story",
            "cover": "https://img.wattpad.com/cover/555.jpg",
            "readCount": 10, "voteCount": 2, "commentCount": 1,
            "numParts": 3,
            "modifyDate": "2024-01-02T03:04:05Z",
            "completed": false, "mature": true,
            "language": {"name": "English"},
            "user": {"name": "author"},
            "parts": [{"id": 777}, {"id": 778}]
        });

        let story: Story = serde_json::from_value(payload).unwrap();

        assert_eq!(story.id, 555);
        assert_eq!(story.parts.len(), 2);
        assert_eq!(story.parts[0].id, 777);
    }

    #[test]
    fn part_payload_unnests_the_owning_story() {
        let payload = serde_json::json!({
            "groupId": "555",
            "group": {
                "id": "555",
                "title": "A Story",
                "cover": "https://img.wattpad.com/cover/555.jpg",
                "readCount": 10, "voteCount": 2, "commentCount": 1,
                "numParts": 3,
                "modifyDate": "2024-01-02T03:04:05Z",
                "completed": true, "mature": false,
                "language": {"name": "English"},
                "user": {"name": "author"},
                "parts": [{"id": 777}]
            }
        });

        let lookup: PartLookup = serde_json::from_value(payload).unwrap();

        assert_eq!(lookup.group.id, 555);
    }

    #[test]
    fn malformed_payload_is_a_typed_error() {
        let payload = serde_json::json!({ "id": "555", "title": "missing everything else" });

        let result = serde_json::from_value::<Story>(payload);

        assert!(result.is_err());
    }
}
