// LLM prompt constants for the interview provider.
// Reuses the JSON-only system fragment from llm_client::prompts where the
// task does not need its own persona.

/// Resume structuring. Replace `{resume_text}` before sending.
pub const RESUME_SYSTEM: &str = "You are a resume parsing assistant. \
    Extract structured information from the resume text provided. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object.";

pub const RESUME_PROMPT_TEMPLATE: &str = r#"Parse the following resume and extract structured information.

Return a JSON object with this structure. Use null or [] when the resume does not say:
{
  "name": "Full Name",
  "email": "email@example.com",
  "phone": "Phone number",
  "location": "City, State",
  "summary": "Professional summary",
  "education": [
    {"institution": "University", "degree": "Degree", "field_of_study": "Field",
     "start_date": "Start", "end_date": "End", "description": null}
  ],
  "experience": [
    {"company": "Company", "title": "Job Title", "location": "Location",
     "start_date": "Start", "end_date": "End", "description": "What the role involved",
     "highlights": ["Achievement"]}
  ],
  "skills": [
    {"name": "Skill", "level": "Beginner|Intermediate|Advanced|Expert", "keywords": ["Keyword"]}
  ],
  "projects": [
    {"name": "Project", "description": "Description", "highlights": ["Highlight"],
     "keywords": ["Keyword"], "url": null}
  ],
  "languages": ["Language"],
  "certifications": ["Certification"],
  "interests": ["Interest"],
  "links": {"linkedin": "URL", "github": "URL", "portfolio": "URL"}
}

List experience most recent first.

Resume:
{resume_text}"#;

/// Question generation. Replace `{count}` and `{resume_json}`.
pub const QUESTIONS_SYSTEM: &str = "You are an expert interviewer. \
    Generate relevant interview questions based on the candidate's resume. \
    You MUST respond with valid JSON only.";

pub const QUESTIONS_PROMPT_TEMPLATE: &str = r#"Generate {count} interview questions for a candidate with the following resume.
Include a mix of behavioral, technical, and experience-based questions, ordered from warm-up to hardest.

Return a JSON object with this EXACT schema:
{
  "questions": [
    {"text": "Question text", "type": "behavioral|technical|experience|general", "difficulty": 3}
  ]
}
difficulty is an integer from 1 (easy) to 5 (hard).

Resume:
{resume_json}"#;

/// Response analysis. Replace `{question}`, `{category}`, `{difficulty}`, `{response}`.
pub const FEEDBACK_SYSTEM: &str = "You are an expert interviewer and coach. \
    Analyze the candidate's response to the interview question and provide constructive feedback. \
    You MUST respond with valid JSON only.";

pub const FEEDBACK_PROMPT_TEMPLATE: &str = r#"Analyze the following response to an interview question.
Give feedback on content, tone and clarity, score the response from 1 to 10, and list specific strengths and areas for improvement.

Question: {question}
Question Type: {category}
Difficulty: {difficulty}/5

Response: {response}

Return a JSON object with this EXACT schema:
{
  "score": 7,
  "content_feedback": "Feedback on the content of the response",
  "tone_feedback": "Feedback on the confidence and tone",
  "clarity_feedback": "Feedback on the clarity of the response",
  "strengths": ["Strength"],
  "improvements": ["Area for improvement"]
}"#;

/// Summary narrative. Replace `{average_score}` and `{transcript_json}`.
pub const SUMMARY_SYSTEM: &str = "You are an expert interviewer and coach. \
    Write a concise assessment of a completed mock interview. \
    You MUST respond with valid JSON only.";

pub const SUMMARY_PROMPT_TEMPLATE: &str = r#"Summarize the following mock interview.
The candidate's average score was {average_score} out of 10.

Return a JSON object with this EXACT schema:
{
  "overall_feedback": "Two or three sentences on overall performance",
  "recommendations": ["Specific, actionable recommendation"]
}
Give exactly three recommendations.

Interview (questions, answers and per-answer feedback):
{transcript_json}"#;
