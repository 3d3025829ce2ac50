//! End-to-end handling of one inbound message.

use tracing::{Instrument, error, info, instrument, warn};

use crate::{
    base::{config::Config, types::Void},
    service::{chat::ChatClient, wattpad::StoryClient},
};

use super::{card::build_story_card, extract::extract_refs, reconcile::resolve_references};

/// Handles one inbound message event.
///
/// Spawns a task so a slow lookup never blocks the event listener; other
/// messages may be processed while this one is suspended on the network.
#[instrument(skip_all)]
pub fn handle_link_event(text: String, channel_id: String, thread_ts: String, config: Config, stories: StoryClient, chat: ChatClient) {
    tokio::spawn(async move {
        // Process the event.
        let result = process_message(&text, &channel_id, &thread_ts, &config, &stories, &chat).in_current_span().await;

        // Log any errors.
        if let Err(err) = &result {
            error!("Error while handling: {}", err);
        }
    });
}

/// Runs the pipeline for one message: extract, resolve, build, dispatch.
///
/// All state lives in locals; nothing is retained across messages.
#[instrument(skip_all)]
pub async fn process_message(text: &str, channel_id: &str, thread_ts: &str, config: &Config, stories: &StoryClient, chat: &ChatClient) -> Void {
    // Absence of references is the normal case, not an error.
    let refs = extract_refs(text);
    if refs.is_empty() {
        return Ok(());
    }

    info!("Found {} story and {} part references.", refs.story_ids.len(), refs.part_ids.len());

    // Resolve each reference to at most one story per canonical id. Failed
    // lookups are logged and produce no card; the user sees only successes.
    let batch = resolve_references(&refs, stories).await;

    if !batch.failures.is_empty() {
        warn!("{} of the references in this message failed to resolve.", batch.failures.len());
    }

    for story in batch.stories.values() {
        let card = build_story_card(story, &config.download_host);

        let sent_ts = match chat.send_card(channel_id, thread_ts, &card).await {
            Ok(ts) => ts,
            Err(err) => {
                // Not retried; the remaining cards still go out.
                error!("Failed to send card for story `{}`: {err:#}", story.id);
                continue;
            }
        };

        for emoji in ["thumbsup", "thumbsdown"] {
            if let Err(err) = chat.react_to_message(channel_id, &sent_ts, emoji).await {
                warn!("Failed to attach `{emoji}` reaction: {err:#}");
            }
        }
    }

    Ok(())
}
