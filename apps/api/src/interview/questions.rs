//! Question list assembly for a new session.

use uuid::Uuid;

use crate::models::interview::{InterviewQuestion, QuestionCategory};
use crate::models::resume::ResumeData;
use crate::provider::InterviewProvider;

/// Fallback questions, used to pad short provider output or to stand in
/// for the whole list when the resume cannot be read.
const DEFAULT_QUESTIONS: &[(&str, QuestionCategory, u8)] = &[
    ("Tell me about yourself and your professional background.", QuestionCategory::General, 1),
    ("What are your key strengths and areas for improvement?", QuestionCategory::General, 2),
    ("Describe a challenging project you worked on and how you approached it.", QuestionCategory::Behavioral, 3),
    ("How do you stay updated with the latest trends and technologies in your field?", QuestionCategory::General, 2),
    ("Where do you see yourself professionally in the next 3-5 years?", QuestionCategory::General, 2),
    ("Tell me about a time when you had to work with a difficult team member.", QuestionCategory::Behavioral, 3),
    ("How do you handle tight deadlines and pressure?", QuestionCategory::Behavioral, 3),
    ("What motivates you in your work?", QuestionCategory::General, 2),
    ("Describe your ideal work environment.", QuestionCategory::General, 1),
    ("Do you have any questions for me about the role or company?", QuestionCategory::General, 1),
];

pub fn default_questions(session_id: Uuid, count: usize) -> Vec<InterviewQuestion> {
    fit_to_count(Vec::new(), session_id, count)
}

/// Truncates to `count`, or pads with `DEFAULT_QUESTIONS[len..count]`.
/// The result is never longer than `count` and may be shorter only when the
/// defaults run out. Positions and identifiers are renumbered either way.
pub fn fit_to_count(
    mut questions: Vec<InterviewQuestion>,
    session_id: Uuid,
    count: usize,
) -> Vec<InterviewQuestion> {
    questions.truncate(count);
    let padding_end = count.min(DEFAULT_QUESTIONS.len());
    let start = questions.len();
    if start < padding_end {
        questions.extend(
            DEFAULT_QUESTIONS[start..padding_end]
                .iter()
                .map(|(text, category, difficulty)| {
                    InterviewQuestion::new(session_id, 0, *text, *category, *difficulty)
                }),
        );
    }

    for (order, q) in questions.iter_mut().enumerate() {
        q.order = order;
        q.question_id = format!("{session_id}_{order}");
    }
    questions
}

pub async fn generate(
    provider: &dyn InterviewProvider,
    resume: &ResumeData,
    session_id: Uuid,
    count: usize,
) -> Vec<InterviewQuestion> {
    let proposed = provider.generate_questions(resume, session_id, count).await;
    fit_to_count(proposed, session_id, count)
}
