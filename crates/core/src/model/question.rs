use crate::model::ids::QuestionId;

//
// ─── AXES ──────────────────────────────────────────────────────────────────────
//

/// The two feelings the questionnaire probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feeling {
    Shame,
    Guilt,
}

impl Feeling {
    /// Canonical generation order.
    pub const ALL: [Feeling; 2] = [Feeling::Shame, Feeling::Guilt];

    /// Display label, as interpolated into the question sentence.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Feeling::Shame => "honte",
            Feeling::Guilt => "culpabilité",
        }
    }
}

/// Life periods, ordered by increasing age.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Period {
    Years0To10,
    Years10To20,
    Years20To30,
    Years30To40,
    Years40To50,
    Years50Plus,
}

impl Period {
    /// Canonical generation order.
    pub const ALL: [Period; 6] = [
        Period::Years0To10,
        Period::Years10To20,
        Period::Years20To30,
        Period::Years30To40,
        Period::Years40To50,
        Period::Years50Plus,
    ];

    /// Display label, as interpolated into the question sentence.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Period::Years0To10 => "0-10 ans",
            Period::Years10To20 => "10-20 ans",
            Period::Years20To30 => "20-30 ans",
            Period::Years30To40 => "30-40 ans",
            Period::Years40To50 => "40-50 ans",
            Period::Years50Plus => "50 ans et plus",
        }
    }
}

/// Life domains covered by the questionnaire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    Spirituality,
    Mental,
    Professional,
    Financial,
    Social,
    FamilyAndCouple,
    Health,
}

impl Domain {
    /// Canonical generation order.
    pub const ALL: [Domain; 7] = [
        Domain::Spirituality,
        Domain::Mental,
        Domain::Professional,
        Domain::Financial,
        Domain::Social,
        Domain::FamilyAndCouple,
        Domain::Health,
    ];

    /// Display label, as interpolated into the question sentence.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Domain::Spirituality => "spiritualité",
            Domain::Mental => "mental/psychologie",
            Domain::Professional => "professionnel",
            Domain::Financial => "financier",
            Domain::Social => "social",
            Domain::FamilyAndCouple => "familial et couple",
            Domain::Health => "santé et physique",
        }
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// One generated introspection prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    feeling: Feeling,
    period: Period,
    domain: Domain,
    text: String,
}

impl Question {
    fn new(id: QuestionId, feeling: Feeling, period: Period, domain: Domain) -> Self {
        let text = format!(
            "Dans quelle situation as-tu ressenti de la {} durant la période {} \
             de ta vie, concernant le domaine {} ?",
            feeling.label(),
            period.label(),
            domain.label()
        );
        Self {
            id,
            feeling,
            period,
            domain,
            text,
        }
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn feeling(&self) -> Feeling {
        self.feeling
    }

    #[must_use]
    pub fn period(&self) -> Period {
        self.period
    }

    #[must_use]
    pub fn domain(&self) -> Domain {
        self.domain
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

//
// ─── DECK ──────────────────────────────────────────────────────────────────────
//

/// The fixed ordered list of generated questions.
///
/// Generation is pure and deterministic: feeling is the outer loop, period the
/// middle, domain the inner, and ids run 1..=84 in that order. Ids are
/// positional, so any change to axis membership or ordering breaks persisted
/// state and old exports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    questions: Vec<Question>,
}

impl Deck {
    /// Generates the full 2 × 6 × 7 deck.
    #[must_use]
    pub fn generate() -> Self {
        let mut questions =
            Vec::with_capacity(Feeling::ALL.len() * Period::ALL.len() * Domain::ALL.len());
        let mut id = 0_u32;
        for feeling in Feeling::ALL {
            for period in Period::ALL {
                for domain in Domain::ALL {
                    id += 1;
                    questions.push(Question::new(QuestionId::new(id), feeling, period, domain));
                }
            }
        }
        Self { questions }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Index of the final question.
    #[must_use]
    pub fn last_index(&self) -> usize {
        self.questions.len().saturating_sub(1)
    }

    /// Question at the given 0-based deck position.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    /// Looks a question up by its stable id.
    #[must_use]
    pub fn by_id(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id() == id)
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Question> {
        self.questions.iter()
    }
}

impl<'a> IntoIterator for &'a Deck {
    type Item = &'a Question;
    type IntoIter = std::slice::Iter<'a, Question>;

    fn into_iter(self) -> Self::IntoIter {
        self.questions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deck_has_84_questions_with_sequential_ids() {
        let deck = Deck::generate();
        assert_eq!(deck.len(), 84);
        for (index, question) in deck.iter().enumerate() {
            assert_eq!(question.id().value(), u32::try_from(index).unwrap() + 1);
        }
    }

    #[test]
    fn deck_is_deterministic_across_runs() {
        assert_eq!(Deck::generate(), Deck::generate());
    }

    #[test]
    fn axis_order_is_feeling_period_domain() {
        let deck = Deck::generate();

        // Domain is the inner loop: question 1 and 8 differ only in period.
        let first = deck.get(0).unwrap();
        assert_eq!(first.feeling(), Feeling::Shame);
        assert_eq!(first.period(), Period::Years0To10);
        assert_eq!(first.domain(), Domain::Spirituality);

        let eighth = deck.get(7).unwrap();
        assert_eq!(eighth.feeling(), Feeling::Shame);
        assert_eq!(eighth.period(), Period::Years10To20);
        assert_eq!(eighth.domain(), Domain::Spirituality);

        // Feeling flips at the halfway mark (6 × 7 = 42 questions per feeling).
        let forty_third = deck.get(42).unwrap();
        assert_eq!(forty_third.feeling(), Feeling::Guilt);
        assert_eq!(forty_third.period(), Period::Years0To10);
        assert_eq!(forty_third.domain(), Domain::Spirituality);

        let last = deck.get(deck.last_index()).unwrap();
        assert_eq!(last.feeling(), Feeling::Guilt);
        assert_eq!(last.period(), Period::Years50Plus);
        assert_eq!(last.domain(), Domain::Health);
    }

    #[test]
    fn question_text_interpolates_all_axes() {
        let deck = Deck::generate();
        let first = deck.get(0).unwrap();
        assert_eq!(
            first.text(),
            "Dans quelle situation as-tu ressenti de la honte durant la période 0-10 ans \
             de ta vie, concernant le domaine spiritualité ?"
        );
    }

    #[test]
    fn by_id_resolves_and_rejects() {
        let deck = Deck::generate();
        assert_eq!(
            deck.by_id(QuestionId::new(84)).map(Question::id),
            Some(QuestionId::new(84))
        );
        assert!(deck.by_id(QuestionId::new(85)).is_none());
        assert!(deck.by_id(QuestionId::new(0)).is_none());
    }
}
