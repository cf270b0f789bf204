use std::time::Duration;

use serde::{de::DeserializeOwned, Deserialize};
use serde_json::json;

use super::{ContentGenerator, GenerationError};
use crate::{
    content::{
        GeneratedContent, HangulGroup, LessonRequest, ReadingStyle, StepType, VocabularyItem,
    },
    level::Level,
    path::{Module, Step},
};

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_API_ENDPOINT: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT_MS: u64 = 60_000;

const SYSTEM_PROMPT: &str = "You are a Korean language tutor writing lessons for English \
and Burmese speaking learners. Always answer with a single JSON object and nothing else.";

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub api_endpoint: String,
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

impl LlmConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: env_string("LLM_API_KEY"),
            model: env_string("LLM_MODEL").unwrap_or(defaults.model),
            api_endpoint: normalize_endpoint(
                &env_string("LLM_API_ENDPOINT").unwrap_or(defaults.api_endpoint),
            ),
            timeout: env_string("LLM_TIMEOUT")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.timeout),
        }
    }
}

/// Chat-completions client that asks for JSON-mode answers.
pub struct LlmGenerator {
    config: LlmConfig,
    agent: ureq::Agent,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct VocabularyList {
    items: Vec<VocabularyItem>,
}

#[derive(Deserialize)]
struct ModuleList {
    modules: Vec<ModuleDraft>,
}

#[derive(Deserialize)]
struct ModuleDraft {
    module_title: String,
    #[serde(default)]
    module_description: String,
    steps: Vec<StepDraft>,
}

#[derive(Deserialize)]
struct StepDraft {
    #[serde(rename = "type")]
    step_type: StepType,
    topic: String,
    title: String,
}

impl LlmGenerator {
    pub fn new(config: LlmConfig) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(config.timeout).build();
        Self { config, agent }
    }

    pub fn is_available(&self) -> bool {
        self.config
            .api_key
            .as_deref()
            .is_some_and(|v| !v.trim().is_empty())
    }

    fn complete_json<T: DeserializeOwned>(&self, prompt: &str) -> Result<T, GenerationError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .ok_or(GenerationError::NotConfigured("LLM_API_KEY"))?;

        let url = format!(
            "{}/chat/completions",
            self.config.api_endpoint.trim_end_matches('/')
        );
        let payload = json!({
            "model": self.config.model,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": prompt },
            ],
        });

        tracing::debug!(model = %self.config.model, "sending generation request");
        let response = self
            .agent
            .post(&url)
            .set("Authorization", &format!("Bearer {}", api_key))
            .set("Content-Type", "application/json")
            .send_json(payload)
            .map_err(|e| match e {
                ureq::Error::Status(code, _) => GenerationError::Server { status: code },
                other => GenerationError::Http(Box::new(other)),
            })?;

        let body: ChatResponse = response.into_json()?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(GenerationError::Empty)?;

        Ok(serde_json::from_str(strip_code_fence(&content))?)
    }
}

impl ContentGenerator for LlmGenerator {
    fn generate_lesson(
        &self,
        request: &LessonRequest,
    ) -> Result<GeneratedContent, GenerationError> {
        let prompt = lesson_prompt(request);
        let content = match request {
            LessonRequest::Grammar { .. } => {
                GeneratedContent::Grammar(self.complete_json(&prompt)?)
            }
            LessonRequest::Vocabulary { .. } => {
                let list: VocabularyList = self.complete_json(&prompt)?;
                if list.items.is_empty() {
                    return Err(GenerationError::Empty);
                }
                GeneratedContent::Vocabulary(list.items)
            }
            LessonRequest::Dialogue { .. } => {
                GeneratedContent::Dialogue(self.complete_json(&prompt)?)
            }
            LessonRequest::Reading { .. } => {
                GeneratedContent::Reading(self.complete_json(&prompt)?)
            }
            LessonRequest::Hangul { .. } => GeneratedContent::Hangul(self.complete_json(&prompt)?),
            LessonRequest::PronunciationRule { .. } => {
                GeneratedContent::PronunciationRule(self.complete_json(&prompt)?)
            }
        };
        Ok(content)
    }

    fn generate_modules(
        &self,
        level: Level,
        existing_titles: &[String],
    ) -> Result<Vec<Module>, GenerationError> {
        let list: ModuleList = self.complete_json(&modules_prompt(level, existing_titles))?;

        Ok(list
            .modules
            .into_iter()
            .filter(|m| !m.steps.is_empty())
            .map(|m| Module {
                module_title: m.module_title,
                module_description: m.module_description,
                steps: m
                    .steps
                    .into_iter()
                    .map(|s| Step {
                        step_type: s.step_type,
                        topic: s.topic,
                        title: s.title,
                        level,
                        content: None,
                    })
                    .collect(),
            })
            .collect())
    }
}

const TRANSLATION_SHAPE: &str = r#"{"english": string, "burmese": string}"#;

fn lesson_prompt(request: &LessonRequest) -> String {
    match request {
        LessonRequest::Grammar {
            grammar_point,
            level,
        } => format!(
            "Explain the Korean grammar point \"{grammar_point}\" for a {level} learner. \
             Return {{\"grammar_point\": string, \"form\": string, \"explanation\": {TRANSLATION_SHAPE}, \
             \"examples\": [{{\"korean\": string, \"translation\": {TRANSLATION_SHAPE}}}]}} \
             with 4 examples."
        ),
        LessonRequest::Vocabulary { topic, level } => format!(
            "List 10 Korean vocabulary words about \"{topic}\" for a {level} learner. \
             Return {{\"items\": [{{\"korean\": string, \"romanization\": string, \
             \"meaning\": {TRANSLATION_SHAPE}, \"example\": {{\"korean\": string, \
             \"translation\": {TRANSLATION_SHAPE}}}}}]}}."
        ),
        LessonRequest::Dialogue { topic, level } => format!(
            "Write a short Korean dialogue about \"{topic}\" for a {level} learner, 6 to 10 lines. \
             Return {{\"situation\": string, \"lines\": [{{\"speaker\": string, \"korean\": string, \
             \"translation\": {TRANSLATION_SHAPE}}}]}}."
        ),
        LessonRequest::Reading {
            topic,
            level,
            style,
        } => {
            let kind = match style {
                ReadingStyle::Article => "an informative article",
                ReadingStyle::Practice => "a short reading practice passage",
            };
            format!(
                "Write {kind} in Korean about \"{topic}\" for a {level} learner. \
                 Return {{\"title\": string, \"korean\": string, \"translation\": {TRANSLATION_SHAPE}, \
                 \"questions\": [{{\"question\": string, \"answer\": string}}]}} with 3 questions."
            )
        }
        LessonRequest::Hangul { group, topic } => {
            let letters = match group {
                HangulGroup::Vowels => "vowels",
                HangulGroup::Consonants => "consonants",
                HangulGroup::Batchim => "final consonants (batchim)",
            };
            format!(
                "Teach the Hangul {letters} covered by \"{topic}\" to a complete beginner. \
                 Return {{\"introduction\": {TRANSLATION_SHAPE}, \"letters\": [{{\"letter\": string, \
                 \"romanization\": string, \"sound\": string, \"example_words\": [string]}}]}}."
            )
        }
        LessonRequest::PronunciationRule { rule, level } => format!(
            "Explain the Korean pronunciation rule \"{rule}\" for a {level} learner. \
             Return {{\"rule\": string, \"explanation\": {TRANSLATION_SHAPE}, \
             \"examples\": [{{\"korean\": string, \"translation\": {TRANSLATION_SHAPE}}}]}}."
        ),
    }
}

fn modules_prompt(level: Level, existing_titles: &[String]) -> String {
    let types = StepType::ALL
        .iter()
        .map(|t| t.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let existing = serde_json::to_string(existing_titles).unwrap_or_else(|_| "[]".to_string());

    format!(
        "Design 2 new Korean course modules for a {level} learner who has finished these \
         modules: {existing}. Do not repeat their topics. Each module has 3 steps. \
         Step \"type\" must be one of: {types}. Grammar step titles look like \
         \"Grammar: <point>\". If no new topics remain return {{\"modules\": []}}. \
         Return {{\"modules\": [{{\"module_title\": string, \"module_description\": string, \
         \"steps\": [{{\"type\": string, \"topic\": string, \"title\": string}}]}}]}}."
    )
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn normalize_endpoint(endpoint: &str) -> String {
    let trimmed = endpoint.trim().trim_end_matches('/');
    if trimmed.ends_with("/v1") || trimmed.contains("/v1/") {
        trimmed.to_string()
    } else {
        format!("{trimmed}/v1")
    }
}
