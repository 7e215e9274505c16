use std::sync::Arc;

use introspect_core::csv::{self, ImportedAnswer};
use introspect_core::model::{
    Answer, AnswerId, AppState, Deck, Question, QuestionId, TimerDuration,
};
use introspect_core::time::{Clock, iso_timestamp};
use storage::state_store::StateStore;

use crate::error::SessionError;

//
// ─── OUTCOMES ──────────────────────────────────────────────────────────────────
//

/// Result of submitting or editing answer text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// The text was recorded under this id.
    Recorded(AnswerId),
    /// Empty or whitespace-only text; nothing changed.
    Ignored,
}

/// Result of advancing past the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved to the question at this deck index.
    Moved(usize),
    /// Stepped past the last question; the session just completed.
    Completed,
    /// The session was already complete; nothing changed.
    AlreadyComplete,
}

/// Counts reported after an import, for the view layer to surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportSummary {
    /// Answers appended to the log.
    pub imported: usize,
    /// Rows dropped because an equal answer already existed.
    pub duplicates: usize,
    /// Malformed or empty rows that were skipped.
    pub skipped: usize,
}

/// Progress snapshot for the view layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    /// 0-based index of the current question.
    pub current_index: usize,
    pub total_questions: usize,
    pub total_answers: usize,
    pub is_complete: bool,
}

/// Answers grouped under their deck question, for the review page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerGroup<'a> {
    pub question: &'a Question,
    pub answers: Vec<&'a Answer>,
}

//
// ─── SESSION SERVICE ───────────────────────────────────────────────────────────
//

/// The session state controller.
///
/// Exclusively owns the live `AppState` and drives the deck, codec and
/// persistence slot. Every mutating operation writes the snapshot through to
/// the store before returning; imports batch the save after the merge.
///
/// The view layer owns the per-question `Countdown` and wires its expiry to
/// `advance`.
pub struct SessionService {
    deck: Deck,
    store: Arc<dyn StateStore>,
    clock: Clock,
    state: AppState,
    completed: bool,
}

impl SessionService {
    /// Starts a session with default state, ignoring any persisted slot.
    #[must_use]
    pub fn new(deck: Deck, store: Arc<dyn StateStore>, clock: Clock) -> Self {
        Self {
            deck,
            store,
            clock,
            state: AppState::default(),
            completed: false,
        }
    }

    /// Resumes from the persisted slot.
    ///
    /// An absent or corrupt slot starts a fresh session; a persisted index
    /// out of deck bounds is clamped. Resuming at the last question leaves
    /// the session active — completion only happens through `advance`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the slot cannot be read at all.
    pub async fn resume(
        deck: Deck,
        store: Arc<dyn StateStore>,
        clock: Clock,
    ) -> Result<Self, SessionError> {
        let mut state = store.load().await?.unwrap_or_default();
        state.clamp_index(deck.len());
        Ok(Self {
            deck,
            store,
            clock,
            state,
            completed: false,
        })
    }

    //
    // ─── READS ─────────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.state.current_question_index
    }

    #[must_use]
    pub fn current_question(&self) -> &Question {
        // The index is clamped on resume and never advances past the end.
        let index = self.state.current_question_index.min(self.deck.last_index());
        &self.deck.questions()[index]
    }

    #[must_use]
    pub fn answers(&self) -> &[Answer] {
        &self.state.answers
    }

    /// Answers recorded for one question, in arrival order.
    #[must_use]
    pub fn answers_for(&self, question_id: QuestionId) -> Vec<&Answer> {
        self.state
            .answers
            .iter()
            .filter(|a| a.question_id() == question_id)
            .collect()
    }

    /// Per-question view of the log, in deck order, questions without
    /// answers omitted.
    #[must_use]
    pub fn grouped_answers(&self) -> Vec<AnswerGroup<'_>> {
        self.deck
            .iter()
            .filter_map(|question| {
                let answers = self.answers_for(question.id());
                if answers.is_empty() {
                    None
                } else {
                    Some(AnswerGroup { question, answers })
                }
            })
            .collect()
    }

    #[must_use]
    pub fn total_answers(&self) -> usize {
        self.state.answers.len()
    }

    #[must_use]
    pub fn timer_duration(&self) -> TimerDuration {
        self.state.timer_duration
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            current_index: self.state.current_question_index,
            total_questions: self.deck.len(),
            total_answers: self.state.answers.len(),
            is_complete: self.completed,
        }
    }

    /// Serializes the full answer log to CSV.
    #[must_use]
    pub fn export_csv(&self) -> String {
        csv::encode(&self.state.answers, &self.deck)
    }

    /// Conventional file name for an export taken now.
    #[must_use]
    pub fn export_file_name(&self) -> String {
        csv::export_file_name(self.clock.now())
    }

    //
    // ─── MUTATIONS ─────────────────────────────────────────────────────────────
    //

    /// Appends an answer to the current question.
    ///
    /// Empty or whitespace-only text is a silent no-op (`Ignored`), not a
    /// failure.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the write-through save fails.
    pub async fn add_answer(&mut self, text: &str) -> Result<AnswerOutcome, SessionError> {
        if text.trim().is_empty() {
            return Ok(AnswerOutcome::Ignored);
        }
        let question_id = self.current_question().id();
        let answer = Answer::new(question_id, text, iso_timestamp(self.clock.now()))?;
        let id = answer.id();
        self.state.answers.push(answer);
        self.persist().await?;
        Ok(AnswerOutcome::Recorded(id))
    }

    /// Replaces the text of an existing answer and refreshes its timestamp.
    ///
    /// Empty text is a silent no-op, mirroring `add_answer`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AnswerNotFound` for an unknown id, or
    /// `SessionError::Storage` if the write-through save fails.
    pub async fn edit_answer(
        &mut self,
        id: AnswerId,
        text: &str,
    ) -> Result<AnswerOutcome, SessionError> {
        if text.trim().is_empty() {
            return Ok(AnswerOutcome::Ignored);
        }
        let timestamp = iso_timestamp(self.clock.now());
        let answer = self
            .state
            .answers
            .iter_mut()
            .find(|a| a.id() == id)
            .ok_or(SessionError::AnswerNotFound)?;
        answer.edit(text, timestamp)?;
        self.persist().await?;
        Ok(AnswerOutcome::Recorded(id))
    }

    /// Moves to the next question, clamped at the last deck position.
    ///
    /// Stepping past the end reports `Completed` exactly once; the session
    /// then stays in the terminal state until an import or clear reactivates
    /// it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the write-through save fails.
    pub async fn advance(&mut self) -> Result<Advance, SessionError> {
        if self.completed {
            return Ok(Advance::AlreadyComplete);
        }
        if self.state.current_question_index < self.deck.last_index() {
            self.state.current_question_index += 1;
            self.persist().await?;
            Ok(Advance::Moved(self.state.current_question_index))
        } else {
            self.completed = true;
            Ok(Advance::Completed)
        }
    }

    /// Updates the countdown preference.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the write-through save fails.
    pub async fn set_timer_duration(
        &mut self,
        duration: TimerDuration,
    ) -> Result<(), SessionError> {
        self.state.timer_duration = duration;
        self.persist().await
    }

    /// Decodes CSV text and merges the rows into the log.
    ///
    /// Decoding is permissive: malformed rows are logged and counted, and
    /// the import only fails when no valid row remains — in which case the
    /// state is untouched.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Csv` when the input has no usable rows, or
    /// `SessionError::Storage` if the batched save fails.
    pub async fn import_csv(&mut self, content: &str) -> Result<ImportSummary, SessionError> {
        let report = csv::decode(content)?;
        for (row, line) in &report.skipped {
            tracing::warn!(row, line = line.as_str(), "skipping malformed CSV row");
        }
        let mut summary = self.merge(report.answers);
        summary.skipped += report.skipped.len();
        self.persist().await?;
        Ok(summary)
    }

    /// Merges already-decoded answers into the log.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the batched save fails.
    pub async fn import_answers(
        &mut self,
        answers: Vec<ImportedAnswer>,
    ) -> Result<ImportSummary, SessionError> {
        let summary = self.merge(answers);
        self.persist().await?;
        Ok(summary)
    }

    /// Merge policy: deduplicate per question by exact trimmed-text equality
    /// against the live log, append the rest, then recompute the question
    /// index. Checking against the live log as rows are appended also
    /// collapses duplicates within the batch itself, so re-importing a backup
    /// is a no-op.
    fn merge(&mut self, incoming: Vec<ImportedAnswer>) -> ImportSummary {
        let mut summary = ImportSummary::default();
        for row in incoming {
            if row.text.trim().is_empty() {
                summary.skipped += 1;
                continue;
            }
            let duplicate = self.state.answers.iter().any(|existing| {
                existing.question_id() == row.question_id
                    && existing.text().trim() == row.text.trim()
            });
            if duplicate {
                summary.duplicates += 1;
                continue;
            }
            // Empty text was filtered above, so construction cannot fail.
            if let Ok(answer) = Answer::new(row.question_id, row.text, row.timestamp) {
                self.state.answers.push(answer);
                summary.imported += 1;
            }
        }
        self.recompute_index();
        self.completed = false;
        summary
    }

    /// Moves to the first deck position whose question id exceeds the highest
    /// answered id, or the last position when every question is covered. An
    /// empty log leaves the index where it was.
    fn recompute_index(&mut self) {
        let Some(max_id) = self.state.answers.iter().map(Answer::question_id).max() else {
            return;
        };
        let next = self.deck.iter().position(|q| q.id() > max_id);
        self.state.current_question_index = next.unwrap_or(self.deck.last_index());
    }

    /// Empties the log, resets the index and timer preference, and deletes
    /// the persisted slot.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the slot cannot be removed.
    pub async fn clear_all(&mut self) -> Result<(), SessionError> {
        self.state = AppState::default();
        self.completed = false;
        self.store.clear().await?;
        Ok(())
    }

    async fn persist(&self) -> Result<(), SessionError> {
        self.store.save(&self.state).await?;
        tracing::debug!(
            index = self.state.current_question_index,
            answers = self.state.answers.len(),
            "state persisted"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use introspect_core::time::fixed_clock;
    use storage::state_store::InMemoryStateStore;

    fn service() -> (SessionService, InMemoryStateStore) {
        let store = InMemoryStateStore::new();
        let session = SessionService::new(Deck::generate(), Arc::new(store.clone()), fixed_clock());
        (session, store)
    }

    #[tokio::test]
    async fn add_answer_records_and_persists() {
        let (mut session, store) = service();
        let outcome = session.add_answer("my first memory").await.unwrap();
        assert!(matches!(outcome, AnswerOutcome::Recorded(_)));
        assert_eq!(session.total_answers(), 1);
        assert_eq!(session.answers()[0].question_id(), QuestionId::new(1));
        assert_eq!(
            session.answers()[0].timestamp(),
            "2023-11-14T22:13:20.000Z"
        );

        // Write-through: the slot already holds the answer.
        let persisted = store.load().await.unwrap().unwrap();
        assert_eq!(persisted.answers.len(), 1);
    }

    #[tokio::test]
    async fn empty_answer_is_a_silent_no_op() {
        let (mut session, store) = service();
        assert_eq!(
            session.add_answer("   \n\t").await.unwrap(),
            AnswerOutcome::Ignored
        );
        assert_eq!(session.total_answers(), 0);
        assert!(store.raw().is_none());
    }

    #[tokio::test]
    async fn edit_answer_targets_identity_not_position() {
        let (mut session, _) = service();
        let AnswerOutcome::Recorded(first) = session.add_answer("one").await.unwrap() else {
            panic!("expected recorded outcome");
        };
        session.add_answer("two").await.unwrap();

        session.edit_answer(first, "one, revised").await.unwrap();
        assert_eq!(session.answers()[0].text(), "one, revised");
        assert_eq!(session.answers()[1].text(), "two");
    }

    #[tokio::test]
    async fn edit_refreshes_the_timestamp() {
        let store = InMemoryStateStore::new();
        let mut clock = fixed_clock();
        let mut session =
            SessionService::new(Deck::generate(), Arc::new(store), clock);
        let AnswerOutcome::Recorded(id) = session.add_answer("draft").await.unwrap() else {
            panic!("expected recorded outcome");
        };

        clock.advance(chrono::Duration::seconds(90));
        session.clock = clock;
        session.edit_answer(id, "final").await.unwrap();
        assert_eq!(
            session.answers()[0].timestamp(),
            "2023-11-14T22:14:50.000Z"
        );
    }

    #[tokio::test]
    async fn edit_unknown_id_is_an_error() {
        let (mut session, _) = service();
        session.add_answer("one").await.unwrap();
        let err = session
            .edit_answer(AnswerId::new(), "whatever")
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::AnswerNotFound));
    }

    #[tokio::test]
    async fn edit_with_empty_text_is_ignored() {
        let (mut session, _) = service();
        let AnswerOutcome::Recorded(id) = session.add_answer("keep me").await.unwrap() else {
            panic!("expected recorded outcome");
        };
        assert_eq!(
            session.edit_answer(id, "  ").await.unwrap(),
            AnswerOutcome::Ignored
        );
        assert_eq!(session.answers()[0].text(), "keep me");
    }

    #[tokio::test]
    async fn advance_walks_the_deck_and_completes_once() {
        let (mut session, _) = service();
        assert_eq!(session.advance().await.unwrap(), Advance::Moved(1));

        for _ in 1..83 {
            session.advance().await.unwrap();
        }
        assert_eq!(session.current_index(), 83);
        assert!(!session.is_complete());

        assert_eq!(session.advance().await.unwrap(), Advance::Completed);
        assert!(session.is_complete());
        assert_eq!(session.current_index(), 83);

        assert_eq!(session.advance().await.unwrap(), Advance::AlreadyComplete);
        assert_eq!(session.current_index(), 83);
    }

    #[tokio::test]
    async fn answers_follow_the_current_question() {
        let (mut session, _) = service();
        session.advance().await.unwrap();
        session.add_answer("second question answer").await.unwrap();
        assert_eq!(session.answers()[0].question_id(), QuestionId::new(2));
    }

    #[tokio::test]
    async fn set_timer_duration_persists() {
        let (mut session, store) = service();
        session
            .set_timer_duration(TimerDuration::Secs30)
            .await
            .unwrap();
        assert_eq!(session.timer_duration(), TimerDuration::Secs30);
        let persisted = store.load().await.unwrap().unwrap();
        assert_eq!(persisted.timer_duration, TimerDuration::Secs30);
    }

    #[tokio::test]
    async fn merge_import_deduplicates_and_is_idempotent() {
        let (mut session, _) = service();
        session.add_answer("already here").await.unwrap();
        let csv_blob = session.export_csv();

        let summary = session.import_csv(&csv_blob).await.unwrap();
        assert_eq!(summary.imported, 0);
        assert_eq!(summary.duplicates, 1);
        assert_eq!(session.total_answers(), 1);

        // Importing the same backup twice stays a no-op.
        let summary = session.import_csv(&csv_blob).await.unwrap();
        assert_eq!(summary.imported, 0);
        assert_eq!(summary.duplicates, 1);
        assert_eq!(session.total_answers(), 1);
    }

    #[tokio::test]
    async fn merge_import_appends_new_rows_and_counts_skips() {
        let (mut session, _) = service();
        let blob = "Question ID,Question,Answer,Timestamp\n\
                    5,\"Q\",\"imported\",2023-11-10T10:00:00.000Z\n\
                    garbled row\n\
                    5,\"Q\",\"  imported \",2023-11-10T10:00:00.000Z";
        let summary = session.import_csv(blob).await.unwrap();

        // The second row dedups against the first by trimmed text.
        assert_eq!(summary.imported, 1);
        assert_eq!(summary.duplicates, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(session.total_answers(), 1);
        assert_eq!(session.answers()[0].text(), "imported");
    }

    #[tokio::test]
    async fn import_recomputes_the_question_index() {
        let (mut session, _) = service();
        let blob = "h\n10,\"Q\",\"a\",t\n3,\"Q\",\"b\",t";
        session.import_csv(blob).await.unwrap();
        // Highest answered id is 10; question 11 lives at index 10.
        assert_eq!(session.current_index(), 10);
    }

    #[tokio::test]
    async fn import_covering_the_whole_deck_lands_on_the_last_question() {
        let (mut session, _) = service();
        let blob = "h\n84,\"Q\",\"a\",t";
        session.import_csv(blob).await.unwrap();
        assert_eq!(session.current_index(), 83);
        assert!(!session.is_complete());
    }

    #[tokio::test]
    async fn import_reactivates_a_completed_session() {
        let (mut session, _) = service();
        while session.advance().await.unwrap() != Advance::Completed {}
        assert!(session.is_complete());

        session.import_csv("h\n2,\"Q\",\"a\",t").await.unwrap();
        assert!(!session.is_complete());
        assert_eq!(session.current_index(), 2);
    }

    #[tokio::test]
    async fn failed_import_leaves_state_unchanged() {
        let (mut session, _) = service();
        session.add_answer("precious").await.unwrap();

        let err = session.import_csv("h\nall\ngarbage").await.unwrap_err();
        assert!(matches!(err, SessionError::Csv(_)));
        assert_eq!(session.total_answers(), 1);
        assert_eq!(session.answers()[0].text(), "precious");
    }

    #[tokio::test]
    async fn clear_all_resets_state_and_slot() {
        let (mut session, store) = service();
        session.add_answer("gone soon").await.unwrap();
        session
            .set_timer_duration(TimerDuration::Secs120)
            .await
            .unwrap();

        session.clear_all().await.unwrap();
        assert_eq!(session.total_answers(), 0);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.timer_duration(), TimerDuration::Secs60);
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn grouped_answers_follow_deck_order() {
        let (mut session, _) = service();
        session
            .import_csv("h\n9,\"Q\",\"later\",t\n2,\"Q\",\"earlier\",t\n2,\"Q\",\"earlier again\",t")
            .await
            .unwrap();

        let groups = session.grouped_answers();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].question.id(), QuestionId::new(2));
        assert_eq!(groups[0].answers.len(), 2);
        assert_eq!(groups[1].question.id(), QuestionId::new(9));
    }

    #[tokio::test]
    async fn resume_restores_the_persisted_snapshot() {
        let store = InMemoryStateStore::new();
        {
            let mut session = SessionService::new(
                Deck::generate(),
                Arc::new(store.clone()),
                fixed_clock(),
            );
            session.add_answer("kept across restarts").await.unwrap();
            session.advance().await.unwrap();
        }

        let session = SessionService::resume(
            Deck::generate(),
            Arc::new(store),
            fixed_clock(),
        )
        .await
        .unwrap();
        assert_eq!(session.current_index(), 1);
        assert_eq!(session.total_answers(), 1);
        assert_eq!(session.answers()[0].text(), "kept across restarts");
        assert!(!session.is_complete());
    }

    #[tokio::test]
    async fn resume_clamps_an_out_of_range_index() {
        let store = InMemoryStateStore::new();
        store.set_raw(
            r#"{"currentQuestionIndex":500,"answers":[],"timerDuration":60}"#,
        );
        let session = SessionService::resume(
            Deck::generate(),
            Arc::new(store),
            fixed_clock(),
        )
        .await
        .unwrap();
        assert_eq!(session.current_index(), 83);
    }

    #[tokio::test]
    async fn resume_treats_a_corrupt_slot_as_fresh() {
        let store = InMemoryStateStore::new();
        store.set_raw("{ not json at all");
        let session = SessionService::resume(
            Deck::generate(),
            Arc::new(store),
            fixed_clock(),
        )
        .await
        .unwrap();
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.total_answers(), 0);
    }

    #[test]
    fn export_file_name_uses_the_clock_date() {
        let (session, _) = service();
        assert_eq!(
            session.export_file_name(),
            "introspection_responses_2023-11-14.csv"
        );
    }
}
