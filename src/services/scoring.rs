// src/services/scoring.rs

use serde::Serialize;

use crate::models::{attempt::AnswerMap, test::Question};

/// Marking scheme of a test.
#[derive(Debug, Clone, Copy)]
pub struct Marking {
    pub correct: i64,
    pub incorrect: i64,
}

/// Per-question classification shown in the results view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Correct,
    Incorrect,
    Unattempted,
}

pub fn classify(question: &Question, answers: &AnswerMap) -> Outcome {
    match answers.get(&question.id) {
        None => Outcome::Unattempted,
        Some(selected) if *selected == question.correct_answer => Outcome::Correct,
        Some(_) => Outcome::Incorrect,
    }
}

/// Scores an answer map against a test's questions.
///
/// Unattempted questions contribute nothing, correct ones `marking.correct`,
/// wrong ones `marking.incorrect`. Answers for unknown question ids are ignored.
/// Returns `None` when the total does not fit in an `i64`.
pub fn compute_score(questions: &[Question], answers: &AnswerMap, marking: Marking) -> Option<i64> {
    questions.iter().try_fold(0i64, |total, q| {
        let marks = match classify(q, answers) {
            Outcome::Correct => marking.correct,
            Outcome::Incorrect => marking.incorrect,
            Outcome::Unattempted => 0,
        };
        total.checked_add(marks)
    })
}

/// One row of the results analysis.
#[derive(Debug, Serialize)]
pub struct QuestionAnalysis {
    pub id: String,
    pub number: i64,
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer: i64,
    pub student_answer: Option<i64>,
    pub outcome: Outcome,
}

/// Pairs every question (stored order) with the student's answer.
pub fn analyze(questions: &[Question], answers: &AnswerMap) -> Vec<QuestionAnalysis> {
    questions
        .iter()
        .map(|q| QuestionAnalysis {
            id: q.id.clone(),
            number: q.number,
            text: q.text.clone(),
            options: q.options.clone(),
            correct_answer: q.correct_answer,
            student_answer: answers.get(&q.id).copied(),
            outcome: classify(q, answers),
        })
        .collect()
}
