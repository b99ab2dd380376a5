// src/session/state.rs

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

use crate::models::attempt::AnswerMap;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("the test session is closed")]
    Closed,
    #[error("question index {0} is out of range")]
    QuestionOutOfRange(usize),
    #[error("option {option} does not exist for question {question}")]
    OptionOutOfRange { question: usize, option: i64 },
    #[error("the test has no questions")]
    Empty,
}

/// What the test taker needs to know about one question.
#[derive(Debug, Clone)]
pub struct SessionQuestion {
    pub id: String,
    pub option_count: usize,
}

/// Independent flags of a question. Answered and marked can both be set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QuestionStatus {
    pub visited: bool,
    pub answered: bool,
    pub marked: bool,
}

/// Single colour of a palette cell; `Current` overrides the question's own state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaletteStatus {
    Current,
    MarkedAnswered,
    Marked,
    Answered,
    NotAnswered,
    NotVisited,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitReason {
    Manual,
    TimerExpired,
}

/// Answers handed to the scoring endpoint when a session closes.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub answers: AnswerMap,
    pub reason: SubmitReason,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    Running { remaining: u64 },
    Expired(Submission),
    /// The session is already closed; the tick was ignored.
    Halted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    InProgress,
    Submitted(SubmitReason),
    TornDown,
}

/// State of one student sitting one test.
///
/// Every change goes through a method; once the session is closed
/// (submitted or torn down) mutating methods return `SessionError::Closed`.
#[derive(Debug, Clone)]
pub struct TestSession {
    questions: Vec<SessionQuestion>,
    current: usize,
    answers: AnswerMap,
    marked: HashSet<String>,
    visited: HashSet<String>,
    remaining: u64,
    phase: Phase,
}

impl TestSession {
    /// Starts a session with the first question visited and the clock at
    /// `duration_minutes * 60` seconds.
    pub fn new(questions: Vec<SessionQuestion>, duration_minutes: u64) -> Result<Self, SessionError> {
        let first = questions.first().ok_or(SessionError::Empty)?;
        let visited = HashSet::from([first.id.clone()]);

        Ok(Self {
            questions,
            current: 0,
            answers: AnswerMap::new(),
            marked: HashSet::new(),
            visited,
            remaining: duration_minutes.saturating_mul(60),
            phase: Phase::InProgress,
        })
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.remaining
    }

    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    pub fn is_open(&self) -> bool {
        self.phase == Phase::InProgress
    }

    pub fn submitted_by(&self) -> Option<SubmitReason> {
        match self.phase {
            Phase::Submitted(reason) => Some(reason),
            _ => None,
        }
    }

    fn ensure_open(&self) -> Result<(), SessionError> {
        if self.is_open() {
            Ok(())
        } else {
            Err(SessionError::Closed)
        }
    }

    fn question(&self, index: usize) -> Result<&SessionQuestion, SessionError> {
        self.questions
            .get(index)
            .ok_or(SessionError::QuestionOutOfRange(index))
    }

    fn current_id(&self) -> String {
        self.questions[self.current].id.clone()
    }

    /// Moves the pointer to `index` and marks that question visited.
    pub fn navigate(&mut self, index: usize) -> Result<(), SessionError> {
        self.ensure_open()?;
        let id = self.question(index)?.id.clone();
        self.visited.insert(id);
        self.current = index;
        Ok(())
    }

    /// Advances one question; a no-op on the last one.
    pub fn next(&mut self) -> Result<(), SessionError> {
        self.ensure_open()?;
        if self.current + 1 < self.questions.len() {
            self.navigate(self.current + 1)?;
        }
        Ok(())
    }

    /// Goes back one question; a no-op on the first one.
    pub fn previous(&mut self) -> Result<(), SessionError> {
        self.ensure_open()?;
        if self.current > 0 {
            self.navigate(self.current - 1)?;
        }
        Ok(())
    }

    /// Records (or overwrites) the current question's answer. Does not navigate.
    pub fn select_option(&mut self, option: i64) -> Result<(), SessionError> {
        self.ensure_open()?;
        let question = &self.questions[self.current];
        let valid = usize::try_from(option).is_ok_and(|o| o < question.option_count);
        if !valid {
            return Err(SessionError::OptionOutOfRange {
                question: self.current,
                option,
            });
        }
        self.answers.insert(question.id.clone(), option);
        Ok(())
    }

    pub fn clear_response(&mut self) -> Result<(), SessionError> {
        self.ensure_open()?;
        let id = self.current_id();
        self.answers.remove(&id);
        Ok(())
    }

    /// Toggles the review flag on the current question, then moves on.
    pub fn mark_for_review_and_next(&mut self) -> Result<(), SessionError> {
        self.ensure_open()?;
        let id = self.current_id();
        if !self.marked.remove(&id) {
            self.marked.insert(id);
        }
        self.next()
    }

    /// Commits the current question (dropping any review flag), then moves on.
    pub fn save_and_next(&mut self) -> Result<(), SessionError> {
        self.ensure_open()?;
        let id = self.current_id();
        self.marked.remove(&id);
        self.next()
    }

    pub fn status(&self, index: usize) -> Result<QuestionStatus, SessionError> {
        let id = &self.question(index)?.id;
        Ok(QuestionStatus {
            visited: self.visited.contains(id),
            answered: self.answers.contains_key(id),
            marked: self.marked.contains(id),
        })
    }

    pub fn palette_status(&self, index: usize) -> Result<PaletteStatus, SessionError> {
        let status = self.status(index)?;
        Ok(if index == self.current {
            PaletteStatus::Current
        } else if status.answered && status.marked {
            PaletteStatus::MarkedAnswered
        } else if status.marked {
            PaletteStatus::Marked
        } else if status.answered {
            PaletteStatus::Answered
        } else if status.visited {
            PaletteStatus::NotAnswered
        } else {
            PaletteStatus::NotVisited
        })
    }

    /// One second passes. Reaching zero closes the session and yields the
    /// automatic submission; this happens at most once.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.is_open() {
            return TickOutcome::Halted;
        }

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining > 0 {
            return TickOutcome::Running {
                remaining: self.remaining,
            };
        }

        self.phase = Phase::Submitted(SubmitReason::TimerExpired);
        TickOutcome::Expired(Submission {
            answers: self.answers.clone(),
            reason: SubmitReason::TimerExpired,
        })
    }

    /// Manual submission. Without confirmation nothing changes and `None`
    /// is returned.
    pub fn submit(&mut self, confirmed: bool) -> Result<Option<Submission>, SessionError> {
        self.ensure_open()?;
        if !confirmed {
            return Ok(None);
        }

        self.phase = Phase::Submitted(SubmitReason::Manual);
        Ok(Some(Submission {
            answers: self.answers.clone(),
            reason: SubmitReason::Manual,
        }))
    }

    /// Leaves the test view without submitting. Later ticks are ignored.
    pub fn teardown(&mut self) {
        if self.is_open() {
            self.phase = Phase::TornDown;
        }
    }
}
