//! MockProvider: deterministic, offline heuristics.
//!
//! Used when no API key is configured and as the fallback for every failed
//! AI call. Output depends only on the inputs, so the same answer to the
//! same question always earns the same score and wording.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use super::{InterviewProvider, ProviderKind, SummaryNarrative};
use crate::models::interview::{
    InterviewFeedback, InterviewQuestion, InterviewSession, QuestionCategory,
};
use crate::models::resume::{
    EducationEntry, ExperienceEntry, ProjectEntry, ResumeData, SkillEntry,
};

static RE_EMAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\w.+-]+@[\w-]+\.[\w.-]+").unwrap());

static RE_PHONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(\d{3}\)\s*\d{3}[-.]\d{4}|\d{3}[-.]\d{3}[-.]\d{4}").unwrap());

const PLACEHOLDER_NAME: &str = "John Doe";
const PLACEHOLDER_EMAIL: &str = "john.doe@example.com";
const PLACEHOLDER_PHONE: &str = "555-123-4567";

const BEHAVIORAL_KEYWORDS: &[&str] = &[
    "situation", "task", "action", "result", "learned", "challenge", "team", "problem", "solution",
];
const TECHNICAL_KEYWORDS: &[&str] = &[
    "experience", "project", "technology", "implemented", "developed", "designed",
    "architecture", "solution",
];
const EXPERIENCE_KEYWORDS: &[&str] = &[
    "responsibility", "role", "achievement", "project", "team", "managed", "led", "improved",
];

const MOCK_BEHAVIORAL_QUESTIONS: &[&str] = &[
    "Tell me about a time when you had to overcome a significant challenge at work.",
    "Describe a situation where you had to work with a difficult team member.",
    "How do you handle tight deadlines and pressure?",
    "Give an example of a time when you had to learn a new technology quickly.",
    "Describe a project that you're particularly proud of and your contribution to it.",
];

/// Skills turned into technical questions, at most.
const MAX_SKILL_QUESTIONS: usize = 3;

pub const STAR_RECOMMENDATIONS: [&str; 3] = [
    "Practice using the STAR method (Situation, Task, Action, Result) for behavioral questions.",
    "Prepare specific examples from your experience that highlight your skills and achievements.",
    "Record yourself answering practice questions to improve clarity and confidence.",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct MockProvider;

#[async_trait]
impl InterviewProvider for MockProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Mock
    }

    async fn structure_resume(&self, resume_id: Uuid, raw_text: &str) -> ResumeData {
        mock_resume(resume_id, raw_text)
    }

    async fn generate_questions(
        &self,
        resume: &ResumeData,
        session_id: Uuid,
        count: usize,
    ) -> Vec<InterviewQuestion> {
        mock_questions(resume, session_id, count)
    }

    async fn analyze_response(
        &self,
        question: &InterviewQuestion,
        question_index: usize,
        response_text: &str,
    ) -> InterviewFeedback {
        mock_feedback(question, question_index, response_text)
    }

    async fn summarize(&self, _session: &InterviewSession, average_score: f64) -> SummaryNarrative {
        mock_narrative(average_score)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Resume
// ────────────────────────────────────────────────────────────────────────────

/// Regex-level extraction of contact details; every other section is a
/// fixed sample so downstream question generation has something to use.
pub fn mock_resume(resume_id: Uuid, raw_text: &str) -> ResumeData {
    let name = raw_text
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or(PLACEHOLDER_NAME);
    let email = RE_EMAIL
        .find(raw_text)
        .map_or(PLACEHOLDER_EMAIL, |m| m.as_str());
    let phone = RE_PHONE
        .find(raw_text)
        .map_or(PLACEHOLDER_PHONE, |m| m.as_str());

    ResumeData {
        name: Some(name.to_string()),
        email: Some(email.to_string()),
        phone: Some(phone.to_string()),
        location: Some("New York, NY".into()),
        summary: Some(
            "Experienced software developer with expertise in web development and AI.".into(),
        ),
        education: vec![EducationEntry {
            institution: "University of Technology".into(),
            degree: "Bachelor of Science".into(),
            field_of_study: Some("Computer Science".into()),
            start_date: Some("2015".into()),
            end_date: Some("2019".into()),
            description: None,
        }],
        experience: vec![
            ExperienceEntry {
                company: "Tech Solutions Inc.".into(),
                title: "Senior Software Developer".into(),
                location: Some("New York, NY".into()),
                start_date: Some("2019".into()),
                end_date: Some("Present".into()),
                description: Some(
                    "Developed and maintained web applications using React and Node.js.".into(),
                ),
                highlights: strings(&[
                    "Improved application performance by 40%",
                    "Led a team of 5 developers",
                    "Implemented CI/CD pipeline",
                ]),
            },
            ExperienceEntry {
                company: "Digital Innovations".into(),
                title: "Junior Developer".into(),
                location: Some("Boston, MA".into()),
                start_date: Some("2017".into()),
                end_date: Some("2019".into()),
                description: Some(
                    "Assisted in the development of mobile applications using React Native."
                        .into(),
                ),
                highlights: strings(&[
                    "Developed features for iOS and Android platforms",
                    "Collaborated with design team to implement UI/UX improvements",
                ]),
            },
        ],
        skills: vec![
            skill("JavaScript", "Expert", &["React", "Node.js", "TypeScript"]),
            skill("Python", "Intermediate", &["Django", "Flask", "Data Analysis"]),
            skill("Database", "Advanced", &["MongoDB", "PostgreSQL", "SQL"]),
        ],
        projects: vec![ProjectEntry {
            name: "E-commerce Platform".into(),
            description: Some(
                "Developed a full-stack e-commerce platform with React and Node.js.".into(),
            ),
            highlights: strings(&["Implemented payment processing", "Built responsive UI"]),
            keywords: strings(&["React", "Node.js", "MongoDB"]),
            url: Some("https://github.com/johndoe/ecommerce".into()),
        }],
        languages: strings(&["English", "Spanish"]),
        certifications: strings(&["AWS Certified Developer", "MongoDB Certified Developer"]),
        interests: strings(&["Machine Learning", "Open Source", "Hiking"]),
        links: BTreeMap::from([
            ("github".to_string(), "https://github.com/johndoe".to_string()),
            ("linkedin".to_string(), "https://linkedin.com/in/johndoe".to_string()),
            ("portfolio".to_string(), "https://johndoe.dev".to_string()),
        ]),
        ..ResumeData::default()
    }
    .finalize(resume_id, raw_text)
}

fn skill(name: &str, level: &str, keywords: &[&str]) -> SkillEntry {
    SkillEntry {
        name: name.into(),
        level: Some(level.into()),
        keywords: strings(keywords),
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Questions
// ────────────────────────────────────────────────────────────────────────────

/// Intro, current-role, up to three skill questions, then behavioral ones.
pub fn mock_questions(resume: &ResumeData, session_id: Uuid, count: usize) -> Vec<InterviewQuestion> {
    let latest_job = resume.latest_job_title().unwrap_or("your current role");

    let mut drafts: Vec<(String, QuestionCategory, u8)> = vec![
        (
            "Tell me about yourself and your background in the industry.".into(),
            QuestionCategory::General,
            1,
        ),
        (
            format!("What are your key responsibilities in {latest_job}?"),
            QuestionCategory::Experience,
            2,
        ),
    ];

    drafts.extend(
        resume
            .skills
            .iter()
            .map(|s| s.name.trim())
            .filter(|name| !name.is_empty())
            .take(MAX_SKILL_QUESTIONS)
            .map(|name| {
                (
                    format!("Can you describe a project where you used {name}?"),
                    QuestionCategory::Technical,
                    3,
                )
            }),
    );

    for text in MOCK_BEHAVIORAL_QUESTIONS {
        if drafts.len() >= count {
            break;
        }
        drafts.push((text.to_string(), QuestionCategory::Behavioral, 4));
    }

    drafts
        .into_iter()
        .take(count)
        .enumerate()
        .map(|(order, (text, category, difficulty))| {
            InterviewQuestion::new(session_id, order, text, category, difficulty)
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Feedback
// ────────────────────────────────────────────────────────────────────────────

fn keywords_for(category: QuestionCategory) -> &'static [&'static str] {
    match category {
        QuestionCategory::Behavioral => BEHAVIORAL_KEYWORDS,
        QuestionCategory::Technical => TECHNICAL_KEYWORDS,
        QuestionCategory::Experience => EXPERIENCE_KEYWORDS,
        QuestionCategory::General => &[],
    }
}

/// Keyword/length heuristic:
/// `score = clamp(word_count / 20 + keyword_hits / 2, 1, 10)` (integer division),
/// where hits are case-insensitive substring matches of the category's list.
pub fn mock_feedback(
    question: &InterviewQuestion,
    question_index: usize,
    response_text: &str,
) -> InterviewFeedback {
    let word_count = response_text.split_whitespace().count();
    let lowered = response_text.to_lowercase();
    let keyword_hits = keywords_for(question.category)
        .iter()
        .filter(|k| lowered.contains(*k))
        .count();
    let score = (word_count / 20 + keyword_hits / 2).clamp(1, 10);
    let has_example = lowered.contains("example") || lowered.contains("instance");

    let mut strengths = Vec::new();
    let mut improvements = Vec::new();

    if word_count > 50 {
        strengths.push("You provided a detailed response.");
    } else {
        improvements.push("Consider providing more details in your response.");
    }
    if keyword_hits > 3 {
        strengths.push("You used relevant terminology and concepts.");
    } else {
        improvements.push("Try to incorporate more specific terminology relevant to the question.");
    }
    if has_example {
        strengths.push("You provided concrete examples to support your answer.");
    } else {
        improvements.push("Consider including specific examples to illustrate your points.");
    }
    if strengths.is_empty() {
        strengths.push("You addressed the question directly.");
    }
    if improvements.is_empty() {
        improvements
            .push("Consider structuring your response with a clear beginning, middle, and end.");
    }

    let good = score > 5;
    InterviewFeedback {
        question_index,
        question_id: question.question_id.clone(),
        overall_score: score as f64,
        content_feedback: pick(
            good,
            "Your answer was relevant to the question.",
            "Your answer could be more focused on the question.",
        ),
        tone_feedback: pick(
            good,
            "You demonstrated confidence in your response.",
            "Try to speak with more confidence.",
        ),
        clarity_feedback: pick(
            good,
            "Your response was clear and well-structured.",
            "Your response could be more organized.",
        ),
        strengths: strings(&strengths),
        improvements: strings(&improvements),
        timestamp: Utc::now(),
    }
}

fn pick(cond: bool, yes: &str, no: &str) -> String {
    let text = if cond { yes } else { no };
    text.to_string()
}

/// Neutral feedback; also the source of any field an AI reply leaves out.
pub fn default_feedback(question_index: usize, question_id: &str) -> InterviewFeedback {
    InterviewFeedback {
        question_index,
        question_id: question_id.to_string(),
        overall_score: 5.0,
        content_feedback: "Your answer addressed the question.".into(),
        tone_feedback: "You demonstrated confidence in your response.".into(),
        clarity_feedback: "Your response was clear.".into(),
        strengths: strings(&["You provided a relevant answer."]),
        improvements: strings(&["Consider providing more specific examples to support your points."]),
        timestamp: Utc::now(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Summary
// ────────────────────────────────────────────────────────────────────────────

pub fn mock_narrative(average_score: f64) -> SummaryNarrative {
    let overall_feedback = if average_score >= 8.0 {
        "You performed excellently in this interview. Your responses were clear, relevant, and demonstrated strong experience and skills."
    } else if average_score >= 6.0 {
        "You performed well in this interview. Your responses were generally good, with some areas that could be improved."
    } else if average_score >= 4.0 {
        "Your interview performance was satisfactory. There are several areas where you could improve to make a stronger impression."
    } else {
        "Your interview performance needs significant improvement. Focus on the recommendations to better prepare for future interviews."
    };

    SummaryNarrative {
        overall_feedback: overall_feedback.to_string(),
        recommendations: strings(&STAR_RECOMMENDATIONS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(category: QuestionCategory) -> InterviewQuestion {
        InterviewQuestion::new(Uuid::nil(), 0, "Q?", category, 3)
    }

    /// 60 words, mentions "example", hits "team" and "challenge".
    fn sixty_word_answer() -> String {
        let mut words = vec!["For", "example", "our", "team", "faced", "a", "hard", "challenge"];
        words.extend(std::iter::repeat("word").take(52));
        words.join(" ")
    }

    #[test]
    fn test_detailed_behavioral_answer() {
        let answer = sixty_word_answer();
        assert_eq!(answer.split_whitespace().count(), 60);

        let fb = mock_feedback(&question(QuestionCategory::Behavioral), 0, &answer);
        // 60/20 = 3, 2 hits / 2 = 1
        assert_eq!(fb.overall_score, 4.0);
        assert!(fb.strengths.iter().any(|s| s.contains("detailed response")));
        assert!(fb.strengths.iter().any(|s| s.contains("concrete examples")));
        assert_eq!(
            fb.improvements,
            vec!["Try to incorporate more specific terminology relevant to the question."]
        );
        assert_eq!(fb.content_feedback, "Your answer could be more focused on the question.");
    }

    #[test]
    fn test_short_answer_scores_minimum() {
        let fb = mock_feedback(&question(QuestionCategory::General), 2, "Yes.");
        assert_eq!(fb.overall_score, 1.0);
        assert_eq!(fb.question_index, 2);
        assert_eq!(fb.strengths, vec!["You addressed the question directly."]);
        assert_eq!(fb.improvements.len(), 3);
    }

    #[test]
    fn test_score_is_capped_at_ten() {
        let answer = format!(
            "situation task action result learned challenge team problem solution {}",
            "word ".repeat(300)
        );
        let fb = mock_feedback(&question(QuestionCategory::Behavioral), 0, &answer);
        assert_eq!(fb.overall_score, 10.0);
        assert_eq!(fb.tone_feedback, "You demonstrated confidence in your response.");
        assert!(fb.strengths.iter().any(|s| s.contains("terminology")));
    }

    #[test]
    fn test_keyword_match_is_case_insensitive_substring() {
        // "Projects" contains "project"; "LED" matches "led".
        let answer = "Projects I LED";
        let fb_exp = mock_feedback(&question(QuestionCategory::Experience), 0, answer);
        let fb_gen = mock_feedback(&question(QuestionCategory::General), 0, answer);
        // Both are short, 2 hits / 2 = 1 vs 0 hits → both clamp to 1.
        assert_eq!(fb_exp.overall_score, 1.0);
        assert_eq!(fb_gen.overall_score, 1.0);
    }

    #[test]
    fn test_mock_feedback_is_deterministic() {
        let answer = sixty_word_answer();
        let q = question(QuestionCategory::Technical);
        let a = mock_feedback(&q, 0, &answer);
        let b = mock_feedback(&q, 0, &answer);
        assert_eq!(a.overall_score, b.overall_score);
        assert_eq!(a.strengths, b.strengths);
        assert_eq!(a.improvements, b.improvements);
        assert_eq!(a.content_feedback, b.content_feedback);
    }

    #[test]
    fn test_mock_resume_extracts_contact_details() {
        let text = "\n  Jane Smith  \njane.smith@mail.example.org | (555) 987-6543\nRust engineer";
        let data = mock_resume(Uuid::nil(), text);
        assert_eq!(data.name.as_deref(), Some("Jane Smith"));
        assert_eq!(data.email.as_deref(), Some("jane.smith@mail.example.org"));
        assert_eq!(data.phone.as_deref(), Some("(555) 987-6543"));
        assert_eq!(data.status, "processed");
        assert_eq!(data.raw_text.as_deref(), Some(text));
        assert!(!data.skills.is_empty());
    }

    #[test]
    fn test_mock_resume_placeholders_for_empty_text() {
        let data = mock_resume(Uuid::nil(), "   \n");
        assert_eq!(data.name.as_deref(), Some(PLACEHOLDER_NAME));
        assert_eq!(data.email.as_deref(), Some(PLACEHOLDER_EMAIL));
        assert_eq!(data.phone.as_deref(), Some(PLACEHOLDER_PHONE));
    }

    #[test]
    fn test_mock_questions_follow_resume() {
        let resume = mock_resume(Uuid::nil(), "Jane");
        let session_id = Uuid::new_v4();
        let qs = mock_questions(&resume, session_id, 7);

        assert_eq!(qs.len(), 7);
        assert_eq!(
            qs[1].text,
            "What are your key responsibilities in Senior Software Developer?"
        );
        assert_eq!(qs[2].text, "Can you describe a project where you used JavaScript?");
        assert_eq!(qs[4].category, QuestionCategory::Technical);
        assert_eq!(qs[5].category, QuestionCategory::Behavioral);
        for (i, q) in qs.iter().enumerate() {
            assert_eq!(q.order, i);
            assert_eq!(q.question_id, format!("{session_id}_{i}"));
        }
    }

    #[test]
    fn test_mock_questions_without_experience_or_skills() {
        let qs = mock_questions(&ResumeData::default(), Uuid::nil(), 3);
        assert_eq!(qs.len(), 3);
        assert_eq!(qs[1].text, "What are your key responsibilities in your current role?");
        assert_eq!(qs[2].category, QuestionCategory::Behavioral);
    }

    #[test]
    fn test_mock_questions_never_exceed_count() {
        let resume = mock_resume(Uuid::nil(), "Jane");
        assert_eq!(mock_questions(&resume, Uuid::nil(), 1).len(), 1);
        // 2 + 3 skills + 5 behavioral = 10 available at most.
        assert_eq!(mock_questions(&resume, Uuid::nil(), 20).len(), 10);
    }

    #[test]
    fn test_narrative_bands() {
        assert!(mock_narrative(8.0).overall_feedback.starts_with("You performed excellently"));
        assert!(mock_narrative(6.5).overall_feedback.starts_with("You performed well"));
        assert!(mock_narrative(4.0).overall_feedback.contains("satisfactory"));
        assert!(mock_narrative(0.0).overall_feedback.contains("significant improvement"));
        assert_eq!(mock_narrative(5.0).recommendations.len(), 3);
    }

    #[test]
    fn test_default_feedback_is_neutral() {
        let fb = default_feedback(1, "abc_1");
        assert_eq!(fb.overall_score, 5.0);
        assert_eq!(fb.question_id, "abc_1");
        assert_eq!(fb.strengths, vec!["You provided a relevant answer."]);
    }
}
