mod answer;
mod ids;
mod question;
mod state;
mod timer;

pub use answer::{Answer, AnswerError};
pub use ids::{AnswerId, ParseIdError, QuestionId};
pub use question::{Deck, Domain, Feeling, Period, Question};
pub use state::AppState;
pub use timer::{Countdown, Tick, TimerDuration, TimerError};
