use std::sync::Arc;

use introspect_core::model::{Countdown, Deck, QuestionId, Tick, TimerDuration};
use introspect_core::time::fixed_clock;
use services::{Advance, AnswerOutcome, SessionService};
use storage::state_store::InMemoryStateStore;
use storage::StateStore;

/// Full answer → export → clear → re-import cycle.
#[tokio::test]
async fn export_clear_import_round_trip() {
    let store = InMemoryStateStore::new();
    let mut session =
        SessionService::new(Deck::generate(), Arc::new(store.clone()), fixed_clock());

    let outcome = session.add_answer("test").await.unwrap();
    assert!(matches!(outcome, AnswerOutcome::Recorded(_)));

    let csv_blob = session.export_csv();
    let question_text = session.deck().by_id(QuestionId::new(1)).unwrap().text().to_owned();
    let mut lines = csv_blob.lines();
    assert_eq!(lines.next(), Some("Question ID,Question,Answer,Timestamp"));
    assert_eq!(
        lines.next(),
        Some(format!("1,\"{question_text}\",\"test\",2023-11-14T22:13:20.000Z").as_str())
    );
    assert_eq!(lines.next(), None);

    session.clear_all().await.unwrap();
    assert_eq!(session.total_answers(), 0);
    assert!(store.load().await.unwrap().is_none());

    let summary = session.import_csv(&csv_blob).await.unwrap();
    assert_eq!(summary.imported, 1);
    assert_eq!(summary.duplicates, 0);
    assert_eq!(summary.skipped, 0);

    let restored = &session.answers()[0];
    assert_eq!(restored.question_id(), QuestionId::new(1));
    assert_eq!(restored.text(), "test");
    assert_eq!(restored.timestamp(), "2023-11-14T22:13:20.000Z");
}

/// Quotes in answer text survive a full export/import cycle.
#[tokio::test]
async fn quoted_text_survives_the_round_trip() {
    let store = InMemoryStateStore::new();
    let mut session = SessionService::new(Deck::generate(), Arc::new(store), fixed_clock());

    session.add_answer("He said \"hi\"").await.unwrap();
    let csv_blob = session.export_csv();

    session.clear_all().await.unwrap();
    session.import_csv(&csv_blob).await.unwrap();
    assert_eq!(session.answers()[0].text(), "He said \"hi\"");
}

/// The countdown drives the session the way the view layer wires it: every
/// expiry advances to the next question, and the final expiry completes the
/// session.
#[tokio::test]
async fn countdown_expiry_drives_advance_to_completion() {
    let store = InMemoryStateStore::new();
    let mut session = SessionService::new(Deck::generate(), Arc::new(store), fixed_clock());
    session
        .set_timer_duration(TimerDuration::Secs30)
        .await
        .unwrap();

    let mut completions = 0;
    let mut countdown = Countdown::new(session.timer_duration());
    while !session.is_complete() {
        if countdown.tick() == Tick::Expired {
            match session.advance().await.unwrap() {
                Advance::Moved(_) => countdown.reset(session.timer_duration()),
                Advance::Completed => completions += 1,
                Advance::AlreadyComplete => unreachable!("loop exits on completion"),
            }
        }
    }

    assert_eq!(completions, 1);
    assert_eq!(session.current_index(), 83);
}

/// Resuming mid-deck restores position, answers and timer preference.
#[tokio::test]
async fn reload_resumes_where_the_user_left_off() {
    let store = InMemoryStateStore::new();
    {
        let mut session =
            SessionService::new(Deck::generate(), Arc::new(store.clone()), fixed_clock());
        session.add_answer("first").await.unwrap();
        session.advance().await.unwrap();
        session.add_answer("second").await.unwrap();
        session
            .set_timer_duration(TimerDuration::Secs90)
            .await
            .unwrap();
    }

    let session = SessionService::resume(Deck::generate(), Arc::new(store), fixed_clock())
        .await
        .unwrap();
    assert_eq!(session.current_index(), 1);
    assert_eq!(session.total_answers(), 2);
    assert_eq!(session.timer_duration(), TimerDuration::Secs90);

    let groups = session.grouped_answers();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].answers[0].text(), "first");
    assert_eq!(groups[1].answers[0].text(), "second");
}
