//! services/api/src/adapters/qa_llm.rs
//!
//! This module contains the adapter for the resume Q&A LLM. It implements
//! the `QuestionAnsweringService` port from the `core` crate. Answers are
//! constrained to a fixed resume summary; the model must not bring in
//! outside knowledge.

const SYSTEM_INSTRUCTIONS: &str = r#"You are a helpful AI assistant for Chakradhar Vijayarao's portfolio. Your role is to answer the user's question based *only* on the following information about Chakradhar.
If the question cannot be answered from this information, politely state that you don't have that specific detail. Do not make up information or answer questions outside of this resume context. Keep answers concise and professional.

Chakradhar's Resume Information:
---
{summary}
---"#;

const RESUME_SUMMARY: &str = r#"Versatile Software Engineer and Machine Learning practitioner with proven experience delivering scalable, secure, and user-centric applications using Python, React.js, Node.js, and MySQL. Skilled at optimizing backend performance, implementing secure authentication, and developing AI-powered solutions with measurable outcomes. Strong collaborator with expertise in Agile workflows, continuous learning, and cloud technologies.
Key Skills: Python, Java, JavaScript (ES6+), C++, C, C#, React.js, Node.js, Express.js, Django, Scikit-learn, YOLO, OpenCV, AWS (familiar), Docker (familiar), Git, Linux, CI/CD fundamentals, PySpark, Hadoop, Databricks, Pandas, NumPy, MySQL, PostgreSQL, Oracle, SQL, VS Code, Eclipse, REST APIs, Agile, Unit Testing, API Design, Cross-team Collaboration.
Experience includes:
- NSIC Technical Services Centre (Internship Project Trainee, Apr 2023 - Jun 2023): Constructed a responsive e-commerce platform (React.js, Node.js, MySQL), increasing user engagement by 20%. Implemented OAuth2 and JWT-based authentication, reducing session errors by 25%. Facilitated Android full-stack training.
- Zoho Corporation Private Limited (Summer Internship Project Associate, Mar 2022 - Apr 2022): Streamlined backend performance for a video conferencing application. Integrated WebRTC for 1,000+ real-time users.
Projects include: AI-Powered Smart Detection of Crops and Weeds, Search Engine for Movie Summaries, Facial Recognition Attendance System, Mushroom Classification using Scikit-Learn, Custom Process Scheduler Development.
Education: Master of Science in Computer Science from The University of Texas at Dallas (Expected: May 2025, GPA 3.607/4.0); Bachelor of Engineering in Electronics and Communication Engineering from R.M.K Engineering College (Mar 2023, GPA 9.04/10.0).
Certifications: IBM DevOps and Software Engineering, Microsoft Full-Stack Developer, Meta Back-End Developer, AWS Certified Cloud Practitioner.
Publication: TEXT DETECTION BASED ON DEEP LEARNING, presented at IEEE's International Conference on Intelligent Data Communication and Analytics."#;

/// The reply used when the model returns nothing usable.
pub const FALLBACK_ANSWER: &str =
    "I'm sorry, I couldn't generate a response for that. Could you try rephrasing?";

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use concierge_core::ports::{PortError, PortResult, QuestionAnsweringService};

//=========================================================================================
// The OpenAI Adapter
//=========================================================================================

/// An adapter that implements `QuestionAnsweringService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiQaAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiQaAdapter {
    /// Creates a new `OpenAiQaAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl QuestionAnsweringService for OpenAiQaAdapter {
    /// Answers a user's question from the fixed resume summary.
    async fn answer_question(&self, question: &str) -> PortResult<String> {
        let instructions = SYSTEM_INSTRUCTIONS.replace("{summary}", RESUME_SUMMARY);

        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(instructions)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(question.to_string())
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .max_tokens(400u32)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        let answer = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| FALLBACK_ANSWER.to_string());

        Ok(answer)
    }
}

//=========================================================================================
// The Offline Adapter
//=========================================================================================

/// Stands in when no API key is configured: every question gets a polite
/// pointer at the contact section instead of an AI answer.
#[derive(Clone, Default)]
pub struct OfflineQaAdapter;

#[async_trait]
impl QuestionAnsweringService for OfflineQaAdapter {
    async fn answer_question(&self, _question: &str) -> PortResult<String> {
        Ok("Live Q&A is not available right now. Please reach out through the contact form!"
            .to_string())
    }
}
