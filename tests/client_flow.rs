use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;

use rust_social_app::backend::{BackendClient, DevAuth};
use rust_social_app::common::commands::BackendCommand;
use rust_social_app::common::events::BackendEvent;
use rust_social_app::common::types::{
    Comment, MESSAGES_COLLECTION, Message, Session, comments_collection,
};
use rust_social_app::config::{AppConfig, IdentityConfig};
use rust_social_app::store::{MembershipOp, MemoryStore, Query, RealtimeStore, to_fields};

struct Harness {
    store: Arc<MemoryStore>,
    commands: mpsc::Sender<BackendCommand>,
    events: mpsc::Receiver<BackendEvent>,
}

fn identity(name: &str) -> IdentityConfig {
    IdentityConfig {
        display_name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        photo_url: String::new(),
    }
}

fn spawn_client(config: AppConfig) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let auth = Arc::new(DevAuth::new(config.identity.clone()));
    let (cmd_tx, cmd_rx) = mpsc::channel(100);
    let (event_tx, event_rx) = mpsc::channel(100);

    let client = BackendClient::new(store.clone(), auth, event_tx, cmd_rx, &config);
    tokio::spawn(client.run());

    Harness {
        store,
        commands: cmd_tx,
        events: event_rx,
    }
}

async fn next_matching(
    events: &mut mpsc::Receiver<BackendEvent>,
    pred: impl Fn(&BackendEvent) -> bool,
) -> Option<BackendEvent> {
    loop {
        match events.recv().await {
            Some(event) if pred(&event) => return Some(event),
            Some(_) => continue,
            None => return None,
        }
    }
}

async fn wait_for(
    harness: &mut Harness,
    pred: impl Fn(&BackendEvent) -> bool,
) -> BackendEvent {
    timeout(Duration::from_secs(5), next_matching(&mut harness.events, pred))
        .await
        .expect("timed out waiting for backend event")
        .expect("event channel closed")
}

/// Asserts that no event matching `pred` shows up within a grace window.
async fn expect_quiet(harness: &mut Harness, pred: impl Fn(&BackendEvent) -> bool) {
    match timeout(
        Duration::from_millis(300),
        next_matching(&mut harness.events, pred),
    )
    .await
    {
        Err(_) => {}
        Ok(None) => {}
        Ok(Some(event)) => panic!("unexpected event: {event:?}"),
    }
}

async fn sign_in(harness: &mut Harness) -> Session {
    harness.commands.send(BackendCommand::SignIn).await.unwrap();
    match wait_for(harness, |event| {
        matches!(event, BackendEvent::SessionChanged(Some(_)))
    })
    .await
    {
        BackendEvent::SessionChanged(Some(session)) => session,
        _ => unreachable!(),
    }
}

async fn submit_post(harness: &mut Harness, content: &str) {
    harness
        .commands
        .send(BackendCommand::SubmitPost {
            content: content.to_string(),
        })
        .await
        .unwrap();
    wait_for(harness, |event| {
        matches!(event, BackendEvent::PostSubmitted)
    })
    .await;
}

#[tokio::test]
async fn sign_in_open_feed_and_append_post() {
    let mut harness = spawn_client(AppConfig::default());
    let session = sign_in(&mut harness).await;

    harness.commands.send(BackendCommand::OpenFeed).await.unwrap();
    let BackendEvent::FeedSnapshot(posts) = wait_for(&mut harness, |event| {
        matches!(event, BackendEvent::FeedSnapshot(_))
    })
    .await
    else {
        unreachable!()
    };
    assert!(posts.is_empty(), "fresh store must yield an empty snapshot");

    harness
        .commands
        .send(BackendCommand::SubmitPost {
            content: "  hello world  ".to_string(),
        })
        .await
        .unwrap();
    wait_for(&mut harness, |event| {
        matches!(event, BackendEvent::PostSubmitted)
    })
    .await;

    let BackendEvent::FeedSnapshot(posts) = wait_for(&mut harness, |event| {
        matches!(event, BackendEvent::FeedSnapshot(posts) if !posts.is_empty())
    })
    .await
    else {
        unreachable!()
    };
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].content, "hello world");
    assert_eq!(posts[0].user_id, session.uid);
    assert_eq!(posts[0].user_name, session.display_name);
    assert!(posts[0].timestamp > 0, "server must assign the timestamp");
    assert!(posts[0].likes.is_empty());
}

#[tokio::test]
async fn like_toggle_is_confirmed_by_next_snapshot() {
    let mut harness = spawn_client(AppConfig::default());
    let session = sign_in(&mut harness).await;

    harness.commands.send(BackendCommand::OpenFeed).await.unwrap();
    submit_post(&mut harness, "likeable").await;
    let BackendEvent::FeedSnapshot(posts) = wait_for(&mut harness, |event| {
        matches!(event, BackendEvent::FeedSnapshot(posts) if !posts.is_empty())
    })
    .await
    else {
        unreachable!()
    };
    let post_id = posts[0].id.clone();

    harness
        .commands
        .send(BackendCommand::ToggleLike {
            post_id: post_id.clone(),
            op: MembershipOp::Add,
            prior_likes: Vec::new(),
        })
        .await
        .unwrap();

    let BackendEvent::FeedSnapshot(posts) = wait_for(&mut harness, |event| {
        matches!(event, BackendEvent::FeedSnapshot(posts)
            if posts.first().is_some_and(|post| !post.likes.is_empty()))
    })
    .await
    else {
        unreachable!()
    };
    assert_eq!(posts[0].id, post_id);
    assert_eq!(posts[0].likes, vec![session.uid.clone()]);
}

#[tokio::test]
async fn failed_like_rolls_back_to_prior_state() {
    let mut harness = spawn_client(AppConfig::default());
    sign_in(&mut harness).await;

    let prior = vec!["someone-else".to_string()];
    harness
        .commands
        .send(BackendCommand::ToggleLike {
            post_id: "missing-post".to_string(),
            op: MembershipOp::Add,
            prior_likes: prior.clone(),
        })
        .await
        .unwrap();

    let BackendEvent::LikeRolledBack { post_id, likes } = wait_for(&mut harness, |event| {
        matches!(event, BackendEvent::LikeRolledBack { .. })
    })
    .await
    else {
        unreachable!()
    };
    assert_eq!(post_id, "missing-post");
    assert_eq!(likes, prior);
}

#[tokio::test]
async fn blank_input_is_rejected_without_remote_call() {
    let mut harness = spawn_client(AppConfig::default());
    sign_in(&mut harness).await;

    harness.commands.send(BackendCommand::OpenChat).await.unwrap();
    wait_for(&mut harness, |event| {
        matches!(event, BackendEvent::ChatSnapshot(_))
    })
    .await;

    harness
        .commands
        .send(BackendCommand::SubmitMessage {
            text: "   ".to_string(),
        })
        .await
        .unwrap();
    harness
        .commands
        .send(BackendCommand::SubmitMessage {
            text: "hello".to_string(),
        })
        .await
        .unwrap();
    wait_for(&mut harness, |event| {
        matches!(event, BackendEvent::MessageSubmitted)
    })
    .await;

    let stored = harness
        .store
        .fetch_once(Query::new(MESSAGES_COLLECTION))
        .await
        .unwrap();
    assert_eq!(stored.len(), 1, "whitespace submission must not reach the store");
}

#[tokio::test]
async fn chat_window_evicts_oldest_message() {
    let config = AppConfig {
        chat_window: 3,
        ..AppConfig::default()
    };
    let mut harness = spawn_client(config);
    sign_in(&mut harness).await;

    harness.commands.send(BackendCommand::OpenChat).await.unwrap();
    for text in ["m1", "m2", "m3", "m4"] {
        harness
            .commands
            .send(BackendCommand::SubmitMessage {
                text: text.to_string(),
            })
            .await
            .unwrap();
        wait_for(&mut harness, |event| {
            matches!(event, BackendEvent::MessageSubmitted)
        })
        .await;
    }

    let BackendEvent::ChatSnapshot(messages) = wait_for(&mut harness, |event| {
        matches!(event, BackendEvent::ChatSnapshot(messages)
            if messages.len() == 3 && messages[0].text == "m2")
    })
    .await
    else {
        unreachable!()
    };
    let texts: Vec<&str> = messages.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, ["m2", "m3", "m4"], "window keeps the newest, ascending");
}

#[tokio::test]
async fn at_most_one_thread_subscription_is_live() {
    let mut harness = spawn_client(AppConfig::default());
    let session = sign_in(&mut harness).await;

    harness.commands.send(BackendCommand::OpenFeed).await.unwrap();
    submit_post(&mut harness, "first").await;
    submit_post(&mut harness, "second").await;
    let BackendEvent::FeedSnapshot(posts) = wait_for(&mut harness, |event| {
        matches!(event, BackendEvent::FeedSnapshot(posts) if posts.len() == 2)
    })
    .await
    else {
        unreachable!()
    };
    // Feed is newest-first.
    let post_b = posts[0].id.clone();
    let post_a = posts[1].id.clone();

    harness
        .commands
        .send(BackendCommand::ExpandThread {
            post_id: post_a.clone(),
        })
        .await
        .unwrap();
    wait_for(&mut harness, |event| {
        matches!(event, BackendEvent::ThreadSnapshot { post_id, .. } if *post_id == post_a)
    })
    .await;

    harness
        .commands
        .send(BackendCommand::ExpandThread {
            post_id: post_b.clone(),
        })
        .await
        .unwrap();
    wait_for(&mut harness, |event| {
        matches!(event, BackendEvent::ThreadSnapshot { post_id, .. } if *post_id == post_b)
    })
    .await;

    // A's thread was cancelled when B expanded: a new comment under A must
    // not produce a snapshot.
    let comment = Comment::compose(&session, "on a".to_string());
    harness
        .store
        .create(&comments_collection(&post_a), to_fields(&comment).unwrap())
        .await
        .unwrap();
    expect_quiet(&mut harness, |event| {
        matches!(event, BackendEvent::ThreadSnapshot { post_id, .. } if *post_id == post_a)
    })
    .await;

    let comment = Comment::compose(&session, "on b".to_string());
    harness
        .store
        .create(&comments_collection(&post_b), to_fields(&comment).unwrap())
        .await
        .unwrap();
    let BackendEvent::ThreadSnapshot { comments, .. } = wait_for(&mut harness, |event| {
        matches!(event, BackendEvent::ThreadSnapshot { post_id, comments }
            if *post_id == post_b && !comments.is_empty())
    })
    .await
    else {
        unreachable!()
    };
    assert_eq!(comments[0].text, "on b");

    // Collapsing B leaves zero live thread subscriptions.
    harness
        .commands
        .send(BackendCommand::CollapseThread)
        .await
        .unwrap();
    let comment = Comment::compose(&session, "after collapse".to_string());
    harness
        .store
        .create(&comments_collection(&post_b), to_fields(&comment).unwrap())
        .await
        .unwrap();
    expect_quiet(&mut harness, |event| {
        matches!(event, BackendEvent::ThreadSnapshot { .. })
    })
    .await;
}

#[tokio::test]
async fn feed_snapshot_carries_preview_comments() {
    let mut harness = spawn_client(AppConfig::default());
    let session = sign_in(&mut harness).await;

    harness.commands.send(BackendCommand::OpenFeed).await.unwrap();
    submit_post(&mut harness, "with comments").await;
    let BackendEvent::FeedSnapshot(posts) = wait_for(&mut harness, |event| {
        matches!(event, BackendEvent::FeedSnapshot(posts) if !posts.is_empty())
    })
    .await
    else {
        unreachable!()
    };
    let post_id = posts[0].id.clone();

    for text in ["c1", "c2", "c3"] {
        let comment = Comment::compose(&session, text.to_string());
        harness
            .store
            .create(&comments_collection(&post_id), to_fields(&comment).unwrap())
            .await
            .unwrap();
    }

    // Comments alone do not touch the posts collection; the next feed
    // snapshot (here: triggered by a like) re-fetches the previews.
    harness
        .commands
        .send(BackendCommand::ToggleLike {
            post_id: post_id.clone(),
            op: MembershipOp::Add,
            prior_likes: Vec::new(),
        })
        .await
        .unwrap();

    let BackendEvent::FeedSnapshot(posts) = wait_for(&mut harness, |event| {
        matches!(event, BackendEvent::FeedSnapshot(posts)
            if posts.first().is_some_and(|post| !post.likes.is_empty()))
    })
    .await
    else {
        unreachable!()
    };
    let previews: Vec<&str> = posts[0]
        .preview_comments
        .iter()
        .map(|comment| comment.text.as_str())
        .collect();
    assert_eq!(previews, ["c2", "c3"], "two newest, shown oldest first");
}

#[tokio::test]
async fn sign_out_cancels_subscriptions_before_clearing_session() {
    let mut harness = spawn_client(AppConfig::default());
    let session = sign_in(&mut harness).await;

    harness.commands.send(BackendCommand::OpenChat).await.unwrap();
    wait_for(&mut harness, |event| {
        matches!(event, BackendEvent::ChatSnapshot(_))
    })
    .await;

    harness.commands.send(BackendCommand::SignOut).await.unwrap();
    wait_for(&mut harness, |event| {
        matches!(event, BackendEvent::SessionChanged(None))
    })
    .await;

    // The chat subscription is gone; a new message must not surface.
    let message = Message::compose(&session, "after sign-out".to_string());
    harness
        .store
        .create(MESSAGES_COLLECTION, to_fields(&message).unwrap())
        .await
        .unwrap();
    expect_quiet(&mut harness, |event| {
        matches!(event, BackendEvent::ChatSnapshot(_))
    })
    .await;
}

#[tokio::test]
async fn sign_in_failure_is_surfaced() {
    let config = AppConfig {
        identity: identity(""),
        ..AppConfig::default()
    };
    let mut harness = spawn_client(config);

    harness.commands.send(BackendCommand::SignIn).await.unwrap();
    let BackendEvent::SignInFailed(reason) = wait_for(&mut harness, |event| {
        matches!(event, BackendEvent::SignInFailed(_))
    })
    .await
    else {
        unreachable!()
    };
    assert!(reason.contains("display name"));
}

#[tokio::test]
async fn writes_without_a_session_are_rejected() {
    let mut harness = spawn_client(AppConfig::default());

    harness
        .commands
        .send(BackendCommand::SubmitMessage {
            text: "hello".to_string(),
        })
        .await
        .unwrap();
    wait_for(&mut harness, |event| {
        matches!(event, BackendEvent::MessageRejected { .. })
    })
    .await;

    let stored = harness
        .store
        .fetch_once(Query::new(MESSAGES_COLLECTION))
        .await
        .unwrap();
    assert!(stored.is_empty());
}
