// src/models/test.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{prelude::FromRow, types::Json};

use crate::{error::AppError, utils::html::clean_html};

/// A question embedded inside a test. It has no lifecycle of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Generated identifier; answer maps are keyed by it.
    pub id: String,
    pub number: i64,
    pub text: String,
    pub options: Vec<String>,
    /// 0-based index into `options`.
    pub correct_answer: i64,
}

/// Represents the 'tests' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Test {
    pub id: i64,
    pub title: String,
    pub correct_marks: i64,
    pub incorrect_marks: i64,
    /// Minutes.
    pub duration: i64,
    pub is_active: bool,
    pub show_results: bool,
    /// Ordered question list, stored as a JSON array.
    pub questions: Json<Vec<Question>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// List entry: test metadata plus the number of questions.
#[derive(Debug, Serialize)]
pub struct TestSummary {
    pub id: i64,
    pub title: String,
    pub correct_marks: i64,
    pub incorrect_marks: i64,
    pub duration: i64,
    pub is_active: bool,
    pub show_results: bool,
    pub question_count: usize,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<&Test> for TestSummary {
    fn from(test: &Test) -> Self {
        Self {
            id: test.id,
            title: test.title.clone(),
            correct_marks: test.correct_marks,
            incorrect_marks: test.incorrect_marks,
            duration: test.duration,
            is_active: test.is_active,
            show_results: test.show_results,
            question_count: test.questions.len(),
            created_at: test.created_at,
        }
    }
}

/// DTO for sending a question to the test taker (excludes the correct answer).
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub id: String,
    pub number: i64,
    pub text: String,
    pub options: Vec<String>,
}

/// The paper a student sits: metadata plus questions sorted by number.
#[derive(Debug, Serialize)]
pub struct TestPaper {
    pub id: i64,
    pub title: String,
    pub correct_marks: i64,
    pub incorrect_marks: i64,
    pub duration: i64,
    pub questions: Vec<PublicQuestion>,
}

impl From<Test> for TestPaper {
    fn from(test: Test) -> Self {
        let mut questions: Vec<PublicQuestion> = test
            .questions
            .0
            .into_iter()
            .map(|q| PublicQuestion {
                id: q.id,
                number: q.number,
                text: q.text,
                options: q.options,
            })
            .collect();
        // Stable sort keeps authoring order for equal numbers.
        questions.sort_by_key(|q| q.number);

        Self {
            id: test.id,
            title: test.title,
            correct_marks: test.correct_marks,
            incorrect_marks: test.incorrect_marks,
            duration: test.duration,
            questions,
        }
    }
}

/// DTO for creating a test.
///
/// `questions` is deliberately untyped: it may be an array of raw question
/// objects, a single object, or a string holding either as JSON.
#[derive(Debug, Deserialize)]
pub struct CreateTestRequest {
    #[serde(default)]
    pub title: Option<String>,
    pub correct_marks: Option<i64>,
    pub incorrect_marks: Option<i64>,
    pub duration: Option<i64>,
    #[serde(default)]
    pub questions: Value,
}

/// DTO for patching a test. Every present field overwrites the stored one.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTestRequest {
    pub title: Option<String>,
    pub correct_marks: Option<i64>,
    pub incorrect_marks: Option<i64>,
    pub duration: Option<i64>,
    pub is_active: Option<bool>,
    pub show_results: Option<bool>,
}

impl UpdateTestRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.correct_marks.is_none()
            && self.incorrect_marks.is_none()
            && self.duration.is_none()
            && self.is_active.is_none()
            && self.show_results.is_none()
    }
}

/// Turns the raw `questions` payload into canonical question records.
///
/// Missing or mistyped fields fall back to: number 0, text "", options [],
/// correct_answer 0. Each question gets a fresh identifier.
pub fn normalize_questions(raw: Value) -> Result<Vec<Question>, AppError> {
    let parsed = match raw {
        Value::String(text) => serde_json::from_str::<Value>(&text)
            .map_err(|_| AppError::BadRequest("Invalid JSON format".to_string()))?,
        other => other,
    };

    let items = match parsed {
        Value::Array(items) => items,
        Value::Null => return Err(AppError::BadRequest("Questions are required".to_string())),
        single => vec![single],
    };

    Ok(items.iter().map(normalize_question).collect())
}

fn normalize_question(raw: &Value) -> Question {
    let number = raw.get("number").and_then(as_integer).unwrap_or(0);

    let text = match raw.get("text") {
        Some(Value::String(s)) => clean_html(s),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };

    let options = match raw.get("options") {
        Some(Value::Array(opts)) => opts
            .iter()
            .map(|opt| match opt {
                Value::String(s) => clean_html(s),
                other => other.to_string(),
            })
            .collect(),
        _ => Vec::new(),
    };

    // Only real JSON numbers count; "1" is not an answer key.
    let correct_answer = match raw.get("correct_answer").or_else(|| raw.get("correctAnswer")) {
        Some(v) if v.is_number() => as_integer(v).unwrap_or(0),
        _ => 0,
    };

    Question {
        id: uuid::Uuid::new_v4().to_string(),
        number,
        text,
        options,
        correct_answer,
    }
}

/// Reads an integer from a JSON number (integral floats included) or a numeric string.
pub fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.is_finite())
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalizes_full_question() {
        let qs = normalize_questions(json!([
            {"number": 1, "text": "2 + 2 = ?", "options": ["3", "4"], "correctAnswer": 1}
        ]))
        .unwrap();

        assert_eq!(qs.len(), 1);
        assert_eq!(qs[0].number, 1);
        assert_eq!(qs[0].text, "2 + 2 = ?");
        assert_eq!(qs[0].options, vec!["3", "4"]);
        assert_eq!(qs[0].correct_answer, 1);
        assert!(!qs[0].id.is_empty());
    }

    #[test]
    fn missing_fields_get_defaults() {
        let qs = normalize_questions(json!([{}])).unwrap();
        assert_eq!(qs[0].number, 0);
        assert_eq!(qs[0].text, "");
        assert!(qs[0].options.is_empty());
        assert_eq!(qs[0].correct_answer, 0);
    }

    #[test]
    fn string_correct_answer_is_ignored() {
        let qs = normalize_questions(json!([{"correct_answer": "2"}])).unwrap();
        assert_eq!(qs[0].correct_answer, 0);
    }

    #[test]
    fn single_object_becomes_one_question() {
        let qs = normalize_questions(json!({"number": 7, "text": "Alone"})).unwrap();
        assert_eq!(qs.len(), 1);
        assert_eq!(qs[0].number, 7);
    }

    #[test]
    fn accepts_raw_json_string() {
        let raw = Value::String(r#"[{"number": 1}, {"number": 2}]"#.to_string());
        let qs = normalize_questions(raw).unwrap();
        assert_eq!(qs.len(), 2);
        assert_ne!(qs[0].id, qs[1].id);
    }

    #[test]
    fn rejects_malformed_json_string() {
        let err = normalize_questions(Value::String("[{oops".to_string())).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg == "Invalid JSON format"));
    }

    #[test]
    fn strips_script_tags_but_keeps_latex() {
        let qs = normalize_questions(json!([
            {"text": "Solve $x^2 = 4$<script>alert(1)</script>"}
        ]))
        .unwrap();
        assert_eq!(qs[0].text, "Solve $x^2 = 4$");
    }

    #[test]
    fn paper_hides_answers_and_sorts_by_number() {
        let now = chrono::Utc::now();
        let test = Test {
            id: 1,
            title: "Mock".to_string(),
            correct_marks: 4,
            incorrect_marks: -1,
            duration: 60,
            is_active: true,
            show_results: false,
            questions: Json(vec![
                Question {
                    id: "b".into(),
                    number: 2,
                    text: "Second".into(),
                    options: vec![],
                    correct_answer: 0,
                },
                Question {
                    id: "a".into(),
                    number: 1,
                    text: "First".into(),
                    options: vec![],
                    correct_answer: 0,
                },
            ]),
            created_at: now,
            updated_at: now,
        };

        let paper = TestPaper::from(test);
        assert_eq!(paper.questions[0].id, "a");
        let as_json = serde_json::to_value(&paper).unwrap();
        assert!(as_json["questions"][0].get("correct_answer").is_none());
    }
}
