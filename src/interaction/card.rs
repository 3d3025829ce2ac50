//! Response card construction for resolved stories.

use std::fmt::Write;

use crate::base::types::{ActionStyle, CardAction, ResponseCard, Story};

/// Fixed color for story cards, distinct from other card types the bot sends.
pub const STORY_CARD_COLOR: &str = "#E67E22";

/// Builds the response card for one resolved story.
///
/// This is pure and deterministic: identical metadata always yields an
/// identical card. The story's API description is deliberately not surfaced;
/// its formatting varies too much to render well.
pub fn build_story_card(story: &Story, download_host: &str) -> ResponseCard {
    let mut summary = String::new();

    let _ = writeln!(
        summary,
        ":eyes: {} Reads  |  :star: {} Votes  |  :speech_balloon: {} Comments",
        story.read_count, story.vote_count, story.comment_count
    );
    let _ = writeln!(summary, ":bookmark: {} Parts", story.num_parts);
    let _ = writeln!(summary, ":earth_asia: {}", story.language.name);

    let last_updated = date_token(story);
    if story.completed {
        let _ = writeln!(summary, ":white_check_mark: Completed on {last_updated}");
    } else {
        let _ = writeln!(summary, ":construction: Updated on {last_updated}");
    }

    if story.mature {
        let _ = writeln!(summary, ":children_crossing: Mature");
    }

    let _ = writeln!(summary, ":bust_in_silhouette: {}", story.user.name);

    ResponseCard {
        title: story.title.clone(),
        summary,
        image_url: story.cover.clone(),
        color: STORY_CARD_COLOR,
        actions: build_actions(story.id, download_host),
    }
}

/// Renders the last-modified timestamp as Slack's locale-relative date token,
/// with a plain date as the fallback text.
fn date_token(story: &Story) -> String {
    let epoch = story.modify_date.timestamp();
    let fallback = story.modify_date.format("%Y-%m-%d");

    format!("<!date^{epoch}^{{date_short}}|{fallback}>")
}

/// The three link buttons every story card carries, in fixed order.
fn build_actions(story_id: u64, download_host: &str) -> Vec<CardAction> {
    vec![
        CardAction {
            label: "Download".to_string(),
            url: format!("{download_host}/download/{story_id}?bot=true"),
            style: ActionStyle::Default,
        },
        CardAction {
            label: "Download with Images".to_string(),
            url: format!("{download_host}/download/{story_id}?bot=true&download_images=true"),
            style: ActionStyle::Emphasized,
        },
        CardAction {
            label: "Wattpad".to_string(),
            url: format!("https://wattpad.com/story/{story_id}"),
            style: ActionStyle::Default,
        },
    ]
}
