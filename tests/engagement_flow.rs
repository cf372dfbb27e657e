//! End-to-end engagement flows against the in-memory store.

use std::sync::Arc;

use lumo_bot::channels::IncomingMessage;
use lumo_bot::config::BotConfig;
use lumo_bot::dispatch::Dispatcher;
use lumo_bot::engagement::affirmations::FixedAffirmations;
use lumo_bot::engagement::messages;
use lumo_bot::engagement::model::Challenge;
use lumo_bot::store::{LibSqlStore, Store};

struct Harness {
    store: Arc<LibSqlStore>,
    dispatcher: Dispatcher,
}

impl Harness {
    async fn with_catalog(challenges: &[(i64, &str)]) -> Self {
        let store = Arc::new(LibSqlStore::new_memory().await.unwrap());
        for (id, text) in challenges {
            store
                .insert_challenge(&Challenge {
                    id: *id,
                    text: (*text).into(),
                })
                .await
                .unwrap();
        }
        let dispatcher = Dispatcher::new(
            Arc::clone(&store) as Arc<dyn Store>,
            BotConfig::default(),
            Arc::new(FixedAffirmations::default()),
        );
        Self { store, dispatcher }
    }

    async fn send(&self, user: &str, text: &str) -> String {
        let msg = IncomingMessage::new("telegram", user, text).with_user_name("Ana");
        self.dispatcher.handle(&msg).await.unwrap().text
    }

    async fn profile(&self, user: &str) -> lumo_bot::engagement::model::UserProfile {
        self.store.get_profile(user).await.unwrap().expect("profile")
    }
}

#[tokio::test]
async fn first_contact_creates_fresh_profile() {
    let h = Harness::with_catalog(&[]).await;
    h.send("u1", "/start").await;

    let p = h.profile("u1").await;
    assert_eq!(p.points, 0);
    assert!(p.responses.is_empty());
    assert!(!p.awaiting_response);
    assert_eq!(p.current_challenge_id, None);
}

#[tokio::test]
async fn scenario_a_through_d_sequential_challenge_delivery() {
    let h = Harness::with_catalog(&[(1, "A"), (2, "B")]).await;

    // A: fresh user requests a challenge → offered challenge 1, awaiting.
    let reply = h.send("u1", "/reto").await;
    assert!(reply.contains("Reto 1: A"));
    let p = h.profile("u1").await;
    assert!(p.awaiting_response);
    assert_eq!(p.current_challenge_id, Some(1));

    // B: a novel 3-token response is accepted.
    let reply = h.send("u1", "hi there friend").await;
    assert!(reply.contains("Total acumulado: 10"));
    let p = h.profile("u1").await;
    assert_eq!(p.points, 10);
    assert_eq!(p.responses, vec!["hi there friend".to_string()]);
    assert!(!p.awaiting_response);

    // C: the next request offers challenge 2.
    let reply = h.send("u1", "/reto").await;
    assert!(reply.contains("Reto 2: B"));
    assert_eq!(h.profile("u1").await.current_challenge_id, Some(2));

    // D: a third request finds the catalog exhausted; state unchanged.
    let reply = h.send("u1", "/reto").await;
    assert_eq!(reply, messages::CATALOG_EXHAUSTED);
    let p = h.profile("u1").await;
    assert!(p.awaiting_response);
    assert_eq!(p.current_challenge_id, Some(2));
}

#[tokio::test]
async fn scenario_e_typo_gets_suggestion_without_side_effects() {
    let h = Harness::with_catalog(&[(1, "A")]).await;
    h.send("u1", "/start").await;

    let reply = h.send("u1", "/ret").await;
    assert_eq!(reply, messages::command_suggestion("/reto"));

    let p = h.profile("u1").await;
    assert_eq!(p.points, 0);
    assert_eq!(p.current_challenge_id, None);
    assert!(!p.awaiting_response);
}

#[tokio::test]
async fn scenario_f_brief_response_keeps_challenge_open() {
    let h = Harness::with_catalog(&[(1, "A")]).await;
    h.send("u1", "/reto").await;

    let reply = h.send("u1", "ok").await;
    assert_eq!(reply, messages::TOO_BRIEF);

    let p = h.profile("u1").await;
    assert!(p.awaiting_response);
    assert_eq!(p.current_challenge_id, Some(1));
    assert_eq!(p.points, 0);
}

#[tokio::test]
async fn duplicate_law_repeat_response_changes_nothing() {
    let h = Harness::with_catalog(&[(1, "A"), (2, "B")]).await;
    h.send("u1", "/reto").await;
    h.send("u1", "hoy me siento bien").await;
    h.send("u1", "/reto").await;

    let reply = h.send("u1", "hoy me siento bien").await;
    assert_eq!(reply, messages::DUPLICATE);

    let p = h.profile("u1").await;
    assert_eq!(p.points, 10);
    assert_eq!(p.responses.len(), 1);
    assert!(p.awaiting_response);
}

#[tokio::test]
async fn points_track_accepted_responses_ten_to_one() {
    let h = Harness::with_catalog(&[(1, "A"), (2, "B"), (3, "C")]).await;

    let responses = [
        "hoy me siento agradecida",
        "aprendí a pedir ayuda",
        "me perdoné por un error",
    ];
    for text in responses {
        h.send("u1", "/reto").await;
        h.send("u1", text).await;

        let p = h.profile("u1").await;
        assert_eq!(p.points, 10 * p.responses.len() as u32);
    }

    let p = h.profile("u1").await;
    assert_eq!(p.points, 30);
    assert_eq!(p.responses.len(), 3);
}

#[tokio::test]
async fn query_points_is_idempotent_in_both_states() {
    let h = Harness::with_catalog(&[(1, "A")]).await;
    h.send("u1", "/reto").await;
    let before = h.profile("u1").await;

    let reply = h.send("u1", "/puntos").await;
    assert!(reply.contains("0 puntos"));

    let after = h.profile("u1").await;
    assert_eq!(before.points, after.points);
    assert_eq!(before.awaiting_response, after.awaiting_response);
    assert_eq!(before.current_challenge_id, after.current_challenge_id);
    assert_eq!(before.responses, after.responses);
}

#[tokio::test]
async fn cursor_is_monotonic_and_challenges_never_repeat() {
    let h = Harness::with_catalog(&[(2, "A"), (5, "B"), (9, "C")]).await;

    let mut offered = Vec::new();
    let mut last_cursor = 0;
    for _ in 0..3 {
        h.send("u1", "/reto").await;
        let p = h.profile("u1").await;
        let cursor = p.current_challenge_id.unwrap();
        assert!(cursor > last_cursor, "cursor must strictly advance");
        last_cursor = cursor;
        offered.push(cursor);
    }

    assert_eq!(offered, vec![2, 5, 9]);
    assert_eq!(h.send("u1", "/reto").await, messages::CATALOG_EXHAUSTED);
}

#[tokio::test]
async fn requesting_again_abandons_open_challenge_without_reoffering() {
    let h = Harness::with_catalog(&[(1, "A"), (2, "B")]).await;

    h.send("u1", "/reto").await;
    // Unanswered challenge 1 is abandoned; 2 is offered, never 1 again.
    let reply = h.send("u1", "/reto").await;
    assert!(reply.contains("Reto 2"));
    assert_eq!(h.profile("u1").await.current_challenge_id, Some(2));
}

#[tokio::test]
async fn exit_leaves_cursor_as_history() {
    let h = Harness::with_catalog(&[(1, "A"), (2, "B")]).await;

    h.send("u1", "/reto").await;
    let reply = h.send("u1", "/salir").await;
    assert_eq!(reply, messages::EXIT_ACK);

    let p = h.profile("u1").await;
    assert!(!p.awaiting_response);
    assert_eq!(p.current_challenge_id, Some(1));

    // The abandoned challenge is not re-offered after exit.
    let reply = h.send("u1", "/reto").await;
    assert!(reply.contains("Reto 2"));
}

#[tokio::test]
async fn near_command_response_while_awaiting_is_redirected() {
    // Disambiguation runs before the state machine even while awaiting:
    // a near-command "answer" becomes a suggestion, not a submission.
    let h = Harness::with_catalog(&[(1, "A")]).await;
    h.send("u1", "/reto").await;

    let reply = h.send("u1", "reto").await;
    assert_eq!(reply, messages::command_suggestion("/reto"));

    let p = h.profile("u1").await;
    assert!(p.awaiting_response);
    assert_eq!(p.points, 0);
}

#[tokio::test]
async fn users_progress_through_the_same_global_order_independently() {
    let h = Harness::with_catalog(&[(1, "A"), (2, "B")]).await;

    for user in ["ana", "ben"] {
        let msg = IncomingMessage::new("telegram", user, "/reto").with_user_name(user);
        let reply = h.dispatcher.handle(&msg).await.unwrap().text;
        assert!(reply.contains("Reto 1"), "{user} should start at challenge 1");
    }

    // Ana advancing does not move Ben's cursor.
    h.send("ana", "hoy me siento bien").await;
    h.send("ana", "/reto").await;
    assert_eq!(h.profile("ana").await.current_challenge_id, Some(2));
    assert_eq!(h.profile("ben").await.current_challenge_id, Some(1));
}

#[tokio::test]
async fn affirmations_rotate_deterministically_with_fixed_source() {
    let h = Harness::with_catalog(&[(1, "A"), (2, "B")]).await;

    h.send("u1", "/reto").await;
    let first = h.send("u1", "hoy me siento bien").await;
    assert!(first.starts_with(messages::AFFIRMATIONS[0]));

    h.send("u1", "/reto").await;
    let second = h.send("u1", "hoy aprendí algo nuevo").await;
    assert!(second.starts_with(messages::AFFIRMATIONS[1]));
}
