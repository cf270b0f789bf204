use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{level::Level, path::Step};

/// Closed set of lesson kinds a step can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepType {
    Grammar,
    Vocabulary,
    Dialogue,
    Article,
    ReadingPractice,
    HangulVowel,
    HangulConsonant,
    HangulBatchim,
    PronunciationRule,
}

impl StepType {
    pub const ALL: [StepType; 9] = [
        StepType::Grammar,
        StepType::Vocabulary,
        StepType::Dialogue,
        StepType::Article,
        StepType::ReadingPractice,
        StepType::HangulVowel,
        StepType::HangulConsonant,
        StepType::HangulBatchim,
        StepType::PronunciationRule,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StepType::Grammar => "grammar",
            StepType::Vocabulary => "vocabulary",
            StepType::Dialogue => "dialogue",
            StepType::Article => "article",
            StepType::ReadingPractice => "reading_practice",
            StepType::HangulVowel => "hangul_vowel",
            StepType::HangulConsonant => "hangul_consonant",
            StepType::HangulBatchim => "hangul_batchim",
            StepType::PronunciationRule => "pronunciation_rule",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Translation {
    pub english: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub burmese: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExampleSentence {
    pub korean: String,
    pub translation: Translation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrammarLesson {
    pub grammar_point: String,
    pub explanation: Translation,
    pub form: String,
    pub examples: Vec<ExampleSentence>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyItem {
    pub korean: String,
    pub romanization: String,
    pub meaning: Translation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<ExampleSentence>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueLine {
    pub speaker: String,
    pub korean: String,
    pub translation: Translation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueScript {
    pub situation: String,
    pub lines: Vec<DialogueLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComprehensionQuestion {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingPassage {
    pub title: String,
    pub korean: String,
    pub translation: Translation,
    #[serde(default)]
    pub questions: Vec<ComprehensionQuestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HangulLetter {
    pub letter: String,
    pub romanization: String,
    pub sound: String,
    #[serde(default)]
    pub example_words: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HangulLesson {
    pub introduction: Translation,
    pub letters: Vec<HangulLetter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PronunciationLesson {
    pub rule: String,
    pub explanation: Translation,
    pub examples: Vec<ExampleSentence>,
}

/// A lesson body as produced by the content generator. Cached on its step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum GeneratedContent {
    Grammar(GrammarLesson),
    Vocabulary(Vec<VocabularyItem>),
    Dialogue(DialogueScript),
    Reading(ReadingPassage),
    Hangul(HangulLesson),
    PronunciationRule(PronunciationLesson),
}

impl GeneratedContent {
    /// Whether this body is the shape a step of `step_type` expects.
    pub fn fits(&self, step_type: StepType) -> bool {
        matches!(
            (self, step_type),
            (GeneratedContent::Grammar(_), StepType::Grammar)
                | (GeneratedContent::Vocabulary(_), StepType::Vocabulary)
                | (GeneratedContent::Dialogue(_), StepType::Dialogue)
                | (
                    GeneratedContent::Reading(_),
                    StepType::Article | StepType::ReadingPractice
                )
                | (
                    GeneratedContent::Hangul(_),
                    StepType::HangulVowel | StepType::HangulConsonant | StepType::HangulBatchim
                )
                | (GeneratedContent::PronunciationRule(_), StepType::PronunciationRule)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingStyle {
    Article,
    Practice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HangulGroup {
    Vowels,
    Consonants,
    Batchim,
}

/// What to ask the generator for, derived from a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "request", rename_all = "snake_case")]
pub enum LessonRequest {
    Grammar {
        grammar_point: String,
        level: Level,
    },
    Vocabulary {
        topic: String,
        level: Level,
    },
    Dialogue {
        topic: String,
        level: Level,
    },
    Reading {
        topic: String,
        level: Level,
        style: ReadingStyle,
    },
    Hangul {
        group: HangulGroup,
        topic: String,
    },
    PronunciationRule {
        rule: String,
        level: Level,
    },
}

impl LessonRequest {
    pub fn for_step(step: &Step) -> Self {
        let level = step.level;
        match step.step_type {
            StepType::Grammar => LessonRequest::Grammar {
                grammar_point: grammar_point(&step.title),
                level,
            },
            StepType::Vocabulary => LessonRequest::Vocabulary {
                topic: lesson_topic(&step.title, &step.topic),
                level,
            },
            StepType::Dialogue => LessonRequest::Dialogue {
                topic: lesson_topic(&step.title, &step.topic),
                level,
            },
            StepType::Article => LessonRequest::Reading {
                topic: lesson_topic(&step.title, &step.topic),
                level,
                style: ReadingStyle::Article,
            },
            StepType::ReadingPractice => LessonRequest::Reading {
                topic: lesson_topic(&step.title, &step.topic),
                level,
                style: ReadingStyle::Practice,
            },
            StepType::HangulVowel => LessonRequest::Hangul {
                group: HangulGroup::Vowels,
                topic: lesson_topic(&step.title, &step.topic),
            },
            StepType::HangulConsonant => LessonRequest::Hangul {
                group: HangulGroup::Consonants,
                topic: lesson_topic(&step.title, &step.topic),
            },
            StepType::HangulBatchim => LessonRequest::Hangul {
                group: HangulGroup::Batchim,
                topic: lesson_topic(&step.title, &step.topic),
            },
            StepType::PronunciationRule => LessonRequest::PronunciationRule {
                rule: lesson_topic(&step.title, &step.topic),
                level,
            },
        }
    }
}

/// Text after the last colon of a grammar step title, e.g.
/// `"Grammar: -은/는 (Topic Marker)"` gives `"-은/는 (Topic Marker)"`.
pub fn grammar_point(title: &str) -> String {
    let point = title.rsplit_once(':').map_or(title, |(_, suffix)| suffix).trim();
    if point.is_empty() {
        title.trim().to_string()
    } else {
        point.to_string()
    }
}

/// Title with Hangul parentheticals removed, falling back to `raw_topic` when
/// that leaves nothing usable.
pub fn lesson_topic(title: &str, raw_topic: &str) -> String {
    static HANGUL_PARENS: OnceLock<Regex> = OnceLock::new();
    let re = HANGUL_PARENS.get_or_init(|| {
        Regex::new(r"\s*\([^)]*\p{Hangul}[^)]*\)").expect("static regex compiles")
    });

    let derived = re.replace_all(title, "");
    let derived = derived.trim();

    let has_latin = derived.chars().any(|c| c.is_ascii_alphabetic());
    if derived.is_empty() || (contains_hangul(derived) && !has_latin) {
        raw_topic.to_string()
    } else {
        derived.to_string()
    }
}

/// Any character in the Hangul syllable or jamo blocks.
pub fn contains_hangul(s: &str) -> bool {
    s.chars().any(|c| {
        let code = c as u32;
        (0xAC00..=0xD7A3).contains(&code)
            || (0x1100..=0x11FF).contains(&code)
            || (0x3130..=0x318F).contains(&code)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(step_type: StepType, topic: &str, title: &str) -> Step {
        Step {
            step_type,
            topic: topic.to_string(),
            title: title.to_string(),
            level: Level::Beginner,
            content: None,
        }
    }

    #[test]
    fn grammar_point_takes_last_colon_suffix() {
        assert_eq!(grammar_point("Grammar: Topic Marker -은/는"), "Topic Marker -은/는");
        assert_eq!(grammar_point("A: B: -아요/어요"), "-아요/어요");
        assert_eq!(grammar_point("Past Tense"), "Past Tense");
        assert_eq!(grammar_point("Trailing:"), "Trailing:");
    }

    #[test]
    fn topic_strips_hangul_parentheticals() {
        assert_eq!(lesson_topic("Family Members (가족)", "family"), "Family Members");
        assert_eq!(
            lesson_topic("At the Cafe (카페에서) Dialogue", "cafe"),
            "At the Cafe Dialogue"
        );
        assert_eq!(lesson_topic("Numbers (1-10)", "numbers"), "Numbers (1-10)");
    }

    #[test]
    fn topic_falls_back_when_nothing_latin_remains() {
        assert_eq!(lesson_topic("(가족)", "family"), "family");
        assert_eq!(lesson_topic("받침 규칙", "final consonants"), "final consonants");
    }

    #[test]
    fn dispatch_covers_every_step_type() {
        for step_type in StepType::ALL {
            let request =
                LessonRequest::for_step(&step(step_type, "topic", "Title: Point (한글)"));
            match (step_type, &request) {
                (StepType::Grammar, LessonRequest::Grammar { grammar_point, .. }) => {
                    assert_eq!(grammar_point, "Point (한글)")
                }
                (StepType::Vocabulary, LessonRequest::Vocabulary { topic, .. })
                | (StepType::Dialogue, LessonRequest::Dialogue { topic, .. }) => {
                    assert_eq!(topic, "Title: Point")
                }
                (StepType::Article, LessonRequest::Reading { style, .. }) => {
                    assert_eq!(*style, ReadingStyle::Article)
                }
                (StepType::ReadingPractice, LessonRequest::Reading { style, .. }) => {
                    assert_eq!(*style, ReadingStyle::Practice)
                }
                (StepType::HangulVowel, LessonRequest::Hangul { group, .. }) => {
                    assert_eq!(*group, HangulGroup::Vowels)
                }
                (StepType::HangulConsonant, LessonRequest::Hangul { group, .. }) => {
                    assert_eq!(*group, HangulGroup::Consonants)
                }
                (StepType::HangulBatchim, LessonRequest::Hangul { group, .. }) => {
                    assert_eq!(*group, HangulGroup::Batchim)
                }
                (StepType::PronunciationRule, LessonRequest::PronunciationRule { .. }) => {}
                other => panic!("unexpected dispatch {other:?}"),
            }
        }
    }

    #[test]
    fn content_round_trips_with_kind_tag() {
        let content = GeneratedContent::Vocabulary(vec![VocabularyItem {
            korean: "사과".into(),
            romanization: "sagwa".into(),
            meaning: Translation {
                english: "apple".into(),
                burmese: None,
            },
            example: None,
        }]);
        let json = serde_json::to_value(&content).unwrap();
        assert_eq!(json["kind"], "vocabulary");
        let back: GeneratedContent = serde_json::from_value(json).unwrap();
        assert_eq!(back, content);
        assert!(back.fits(StepType::Vocabulary));
        assert!(!back.fits(StepType::Grammar));
    }

    #[test]
    fn detects_hangul() {
        assert!(contains_hangul("안녕"));
        assert!(contains_hangul("ㄱ"));
        assert!(!contains_hangul("hello"));
    }
}
