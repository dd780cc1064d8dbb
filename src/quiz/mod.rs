//! The quiz runner: choosing questions, walking through them and keeping the
//! ones answered wrongly for later.

pub mod missed;
pub mod session;
pub mod setup;
pub mod terminal;

pub use missed::MissedStore;
pub use session::{Advance, Feedback, QuizResult, QuizSession, SessionError};
pub use setup::{build_plan, QuizMode, QuizPlan, QuizSettings, SetupError, TypeFilter};
