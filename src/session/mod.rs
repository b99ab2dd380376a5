// src/session/mod.rs
//
// Client-side model of sitting a test: question palette state, answers,
// and the countdown that auto-submits when time runs out.

pub mod state;
pub mod timer;

pub use state::{
    PaletteStatus, QuestionStatus, SessionError, SessionQuestion, Submission, SubmitReason,
    TestSession, TickOutcome,
};
pub use timer::{AutoSubmit, CountdownHandle, StoreSubmitter, spawn_countdown};
