use crate::common::types::{
    Comment, LIKES_FIELD, MESSAGES_COLLECTION, Message, POSTS_COLLECTION, Post, Session,
    comments_collection,
};
use crate::store::{MembershipOp, Query, RealtimeStore, StoreError, to_fields};

fn person(uid: &str, name: &str) -> Session {
    Session {
        uid: uid.to_string(),
        display_name: name.to_string(),
        email: format!("{uid}@example.com"),
        photo_url: String::new(),
    }
}

/// Seeds a handful of posts, comments and chat messages from fictitious
/// accounts so the screens are not empty on first launch. Skipped when the
/// feed already has content.
pub async fn seed_demo_data(store: &dyn RealtimeStore) -> Result<(), StoreError> {
    if !store
        .fetch_once(Query::new(POSTS_COLLECTION).limit(1))
        .await?
        .is_empty()
    {
        log::debug!("Feed already has content; skipping demo seed");
        return Ok(());
    }

    let carlos = person("seed-carlos", "Carlos Oliveira");
    let ana = person("seed-ana", "Ana Costa");
    let pedro = person("seed-pedro", "Pedro Santos");
    let mariana = person("seed-mariana", "Mariana Costa");

    let first_post = store
        .create(
            POSTS_COLLECTION,
            to_fields(&Post::compose(
                &carlos,
                "Just wrapped up the new release. Shipping feels good!".to_string(),
            ))?,
        )
        .await?;
    store
        .create(
            POSTS_COLLECTION,
            to_fields(&Post::compose(
                &ana,
                "Anyone going to the tech conference next month?".to_string(),
            ))?,
        )
        .await?;
    store
        .create(
            POSTS_COLLECTION,
            to_fields(&Post::compose(
                &pedro,
                "New office, new coffee machine. Productivity up 200%.".to_string(),
            ))?,
        )
        .await?;

    let comments = comments_collection(&first_post);
    store
        .create(
            &comments,
            to_fields(&Comment::compose(&ana, "Congratulations!".to_string()))?,
        )
        .await?;
    store
        .create(
            &comments,
            to_fields(&Comment::compose(
                &mariana,
                "Well deserved, the demo looked great.".to_string(),
            ))?,
        )
        .await?;

    for liker in [&ana, &pedro, &mariana] {
        store
            .update_membership(
                POSTS_COLLECTION,
                &first_post,
                LIKES_FIELD,
                &liker.uid,
                MembershipOp::Add,
            )
            .await?;
    }

    store
        .create(
            MESSAGES_COLLECTION,
            to_fields(&Message::compose(&mariana, "Hello everyone!".to_string()))?,
        )
        .await?;
    store
        .create(
            MESSAGES_COLLECTION,
            to_fields(&Message::compose(
                &pedro,
                "Hey Mariana, welcome to the room.".to_string(),
            ))?,
        )
        .await?;

    log::info!("Seeded demo content");
    Ok(())
}
