#![cfg(test)]

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use mockall::mock;
use wpd_bot::{
    base::{
        config::{Config, ConfigInner},
        types::{Author, Language, PartRef, Res, ResponseCard, Story, Void},
    },
    interaction::link_event::process_message,
    service::{
        chat::{ChatClient, GenericChatClient},
        wattpad::{GenericStoryClient, StoryClient},
    },
};

// Mocks.

mock! {
    pub Chat {}

    #[async_trait]
    impl GenericChatClient for Chat {
        fn bot_user_id(&self) -> &str;
        async fn start(&self) -> Void;
        async fn send_card(&self, channel_id: &str, thread_ts: &str, card: &ResponseCard) -> Res<String>;
        async fn react_to_message(&self, channel_id: &str, ts: &str, emoji: &str) -> Void;
    }
}

mock! {
    pub Stories {}

    #[async_trait]
    impl GenericStoryClient for Stories {
        async fn get_story(&self, story_id: u64) -> Res<Story>;
        async fn get_story_from_part(&self, part_id: u64) -> Res<Story>;
    }
}

// Helpers.

fn test_config() -> Config {
    Config {
        inner: Arc::new(ConfigInner {
            slack_app_token: "xapp-test".to_string(),
            slack_bot_token: "xoxb-test".to_string(),
            slack_signing_secret: "test_secret".to_string(),
            download_host: "https://wpd.my".to_string(),
        }),
    }
}

fn story(id: u64, part_ids: &[u64]) -> Story {
    Story {
        id,
        title: format!("Story {id}"),
        cover: format!("https://img.wattpad.com/cover/{id}.jpg"),
        read_count: 100,
        vote_count: 10,
        comment_count: 5,
        num_parts: part_ids.len() as u32,
        modify_date: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
        completed: false,
        mature: false,
        language: Language { name: "English".to_string() },
        user: Author { name: "author".to_string() },
        parts: part_ids.iter().map(|&id| PartRef { id }).collect(),
    }
}

async fn run_pipeline(text: &str, stories: MockStories, chat: MockChat) -> Void {
    process_message(
        text,
        "C01TEST",
        "1234567890.123456",
        &test_config(),
        &StoryClient::new(Arc::new(stories)),
        &ChatClient::new(Arc::new(chat)),
    )
    .await
}

// Tests.

#[tokio::test]
async fn plain_text_issues_no_network_calls_and_no_cards() {
    let mut stories = MockStories::new();
    stories.expect_get_story().times(0);
    stories.expect_get_story_from_part().times(0);

    let mut chat = MockChat::new();
    chat.expect_send_card().times(0);
    chat.expect_react_to_message().times(0);

    run_pipeline("hello, nothing to see here: https://example.com/story/5", stories, chat).await.unwrap();
}

#[tokio::test]
async fn duplicate_story_reference_with_covered_part_yields_one_fetch_and_one_card() {
    // The exact scenario: story 555 twice plus part 777, where 777 belongs to 555.
    let mut stories = MockStories::new();
    stories.expect_get_story().times(1).returning(|id| Ok(story(id, &[777, 778])));
    stories.expect_get_story_from_part().times(0);

    let mut chat = MockChat::new();
    chat.expect_send_card()
        .times(1)
        .withf(|channel_id, thread_ts, card| channel_id == "C01TEST" && thread_ts == "1234567890.123456" && card.title == "Story 555")
        .returning(|_, _, _| Ok("1234567890.200000".to_string()));
    chat.expect_react_to_message().times(2).withf(|_, ts, emoji| ts == "1234567890.200000" && (emoji == "thumbsup" || emoji == "thumbsdown")).returning(|_, _, _| Ok(()));

    run_pipeline("wattpad.com/story/555 wattpad.com/777 wattpad.com/story/555", stories, chat).await.unwrap();
}

#[tokio::test]
async fn lone_part_reference_produces_a_card_for_the_owning_story() {
    let mut stories = MockStories::new();
    stories.expect_get_story().times(0);
    stories.expect_get_story_from_part().times(1).returning(|_| Ok(story(900, &[42])));

    let mut chat = MockChat::new();
    chat.expect_send_card().times(1).withf(|_, _, card| card.title == "Story 900").returning(|_, _, _| Ok("ts".to_string()));
    chat.expect_react_to_message().times(2).returning(|_, _, _| Ok(()));

    run_pipeline("https://www.wattpad.com/42", stories, chat).await.unwrap();
}

#[tokio::test]
async fn uncovered_part_triggers_exactly_one_extra_fetch() {
    // Story 1 owns part 10; part 20 belongs to story 2, which is not referenced directly.
    let mut stories = MockStories::new();
    stories.expect_get_story().times(1).returning(|id| Ok(story(id, &[10])));
    stories.expect_get_story_from_part().times(1).returning(|_| Ok(story(2, &[20])));

    let mut chat = MockChat::new();
    chat.expect_send_card().times(2).returning(|_, _, _| Ok("ts".to_string()));
    chat.expect_react_to_message().times(4).returning(|_, _, _| Ok(()));

    run_pipeline("wattpad.com/story/1 wattpad.com/10 wattpad.com/20", stories, chat).await.unwrap();
}

#[tokio::test]
async fn failed_lookup_is_silent_and_does_not_block_other_references() {
    let mut stories = MockStories::new();
    stories.expect_get_story().times(2).returning(|id| {
        if id == 1 {
            Err(anyhow::anyhow!("500 Internal Server Error"))
        } else {
            Ok(story(id, &[]))
        }
    });

    let mut chat = MockChat::new();
    chat.expect_send_card().times(1).withf(|_, _, card| card.title == "Story 2").returning(|_, _, _| Ok("ts".to_string()));
    chat.expect_react_to_message().times(2).returning(|_, _, _| Ok(()));

    run_pipeline("wattpad.com/story/1 wattpad.com/story/2", stories, chat).await.unwrap();
}

#[tokio::test]
async fn failed_dispatch_does_not_block_other_cards() {
    let mut stories = MockStories::new();
    stories.expect_get_story().times(2).returning(|id| Ok(story(id, &[])));

    let send_attempts = Arc::new(AtomicUsize::new(0));
    let attempts = send_attempts.clone();

    let mut chat = MockChat::new();
    chat.expect_send_card().times(2).returning(move |_, _, _| {
        if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
            Err(anyhow::anyhow!("channel_not_found"))
        } else {
            Ok("ts".to_string())
        }
    });
    // Reactions only follow the send that succeeded.
    chat.expect_react_to_message().times(2).returning(|_, _, _| Ok(()));

    run_pipeline("wattpad.com/story/1 wattpad.com/story/2", stories, chat).await.unwrap();

    assert_eq!(send_attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn failed_reaction_does_not_fail_the_run() {
    let mut stories = MockStories::new();
    stories.expect_get_story().times(1).returning(|id| Ok(story(id, &[])));

    let mut chat = MockChat::new();
    chat.expect_send_card().times(1).returning(|_, _, _| Ok("ts".to_string()));
    chat.expect_react_to_message().times(2).returning(|_, _, _| Err(anyhow::anyhow!("already_reacted")));

    run_pipeline("wattpad.com/story/1", stories, chat).await.unwrap();
}
