//! Negative-marking grader.
//!
//! +1 for a correct answer, −0.5 for a wrong one, 0 for a skipped one. The raw
//! score is left signed; only the percentage is floored at zero.

use crate::model::{AnswerSheet, Question, QuestionReview, ReviewStatus, TestResult, TestSession};

/// Marks awarded for a correct answer.
pub const CORRECT_MARK: f64 = 1.0;
/// Marks awarded for a wrong answer.
pub const WRONG_MARK: f64 = -0.5;
/// Marks awarded for a skipped question.
pub const OMITTED_MARK: f64 = 0.0;

/// Grade one attempt. Pure: the same questions and answers always give the
/// same result.
///
/// A question missing from `answers`, or mapped to `None`, is omitted. A
/// chosen index that is not the correct one (including one past the last
/// option) is wrong.
pub fn grade_session(test_id: &str, questions: &[Question], answers: &AnswerSheet) -> TestResult {
    let mut raw = 0.0;
    let mut review = Vec::with_capacity(questions.len());

    for q in questions {
        let chosen_index = answers.get(&q.id).copied().flatten();
        let status = match chosen_index {
            None => ReviewStatus::Omitted,
            Some(i) if i == q.correct_index => ReviewStatus::Correct,
            Some(_) => ReviewStatus::Wrong,
        };
        raw += marks_for(status);

        review.push(QuestionReview {
            id: q.id.clone(),
            text: q.text.clone(),
            options: q.options.clone(),
            correct_index: q.correct_index,
            chosen_index,
            status,
            explanation: q.explanation.clone(),
            source: q.source.clone(),
            subject: q.subject.clone(),
            topic: q.topic.clone(),
        });
    }

    let total = questions.len().max(1) as f64;
    let percent = (raw / total * 100.0).max(0.0);

    TestResult {
        test_id: test_id.to_string(),
        raw_score: round2(raw),
        percent: round2(percent),
        review,
    }
}

/// Marks contributed by one outcome.
pub fn marks_for(status: ReviewStatus) -> f64 {
    match status {
        ReviewStatus::Correct => CORRECT_MARK,
        ReviewStatus::Wrong => WRONG_MARK,
        ReviewStatus::Omitted => OMITTED_MARK,
    }
}

fn round2(x: f64) -> f64 {
    let rounded = (x * 100.0).round() / 100.0;
    // avoid "-0" in serialized output
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

impl TestSession {
    /// Grade this session against `answers`.
    pub fn grade(&self, answers: &AnswerSheet) -> TestResult {
        grade_session(&self.test_id, &self.questions, answers)
    }
}
