#![allow(dead_code)]

use std::cell::{Cell, RefCell};

use hanpath::{
    content::{
        DialogueScript, GeneratedContent, GrammarLesson, HangulLesson, LessonRequest,
        PronunciationLesson, ReadingPassage, StepType, Translation, VocabularyItem,
    },
    generator::{ContentGenerator, GenerationError},
    path::{LessonTicket, Module, Step},
    store::MemoryStore,
    LearningPathEngine, Level,
};

/// Generator with canned answers that counts how often it is called.
#[derive(Default)]
pub struct ScriptedGenerator {
    pub lesson_calls: Cell<usize>,
    pub module_calls: Cell<usize>,
    pub fail_lessons: Cell<bool>,
    /// `None` makes module generation fail like a server error
    pub modules: RefCell<Option<Vec<Module>>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the generation a ticket asks for.
    pub fn generate_lesson_for(
        &self,
        ticket: &LessonTicket,
    ) -> Result<GeneratedContent, GenerationError> {
        self.generate_lesson(&ticket.request)
    }

    pub fn with_modules(modules: Vec<Module>) -> Self {
        let generator = Self::default();
        *generator.modules.borrow_mut() = Some(modules);
        generator
    }
}

fn text(english: String) -> Translation {
    Translation {
        english,
        burmese: None,
    }
}

/// Content that fits the request; `n` makes each answer distinguishable.
pub fn sample_content(request: &LessonRequest, n: usize) -> GeneratedContent {
    match request {
        LessonRequest::Grammar { grammar_point, .. } => GeneratedContent::Grammar(GrammarLesson {
            grammar_point: format!("{grammar_point} #{n}"),
            explanation: text(format!("explanation #{n}")),
            form: "V + 요".into(),
            examples: vec![],
        }),
        LessonRequest::Vocabulary { topic, .. } => {
            GeneratedContent::Vocabulary(vec![VocabularyItem {
                korean: "단어".into(),
                romanization: "daneo".into(),
                meaning: text(format!("{topic} #{n}")),
                example: None,
            }])
        }
        LessonRequest::Dialogue { topic, .. } => GeneratedContent::Dialogue(DialogueScript {
            situation: format!("{topic} #{n}"),
            lines: vec![],
        }),
        LessonRequest::Reading { topic, .. } => GeneratedContent::Reading(ReadingPassage {
            title: format!("{topic} #{n}"),
            korean: "안녕하세요".into(),
            translation: text("Hello".into()),
            questions: vec![],
        }),
        LessonRequest::Hangul { topic, .. } => GeneratedContent::Hangul(HangulLesson {
            introduction: text(format!("{topic} #{n}")),
            letters: vec![],
        }),
        LessonRequest::PronunciationRule { rule, .. } => {
            GeneratedContent::PronunciationRule(PronunciationLesson {
                rule: format!("{rule} #{n}"),
                explanation: text("rule".into()),
                examples: vec![],
            })
        }
    }
}

impl ContentGenerator for ScriptedGenerator {
    fn generate_lesson(
        &self,
        request: &LessonRequest,
    ) -> Result<GeneratedContent, GenerationError> {
        let n = self.lesson_calls.get() + 1;
        self.lesson_calls.set(n);
        if self.fail_lessons.get() {
            return Err(GenerationError::Server { status: 503 });
        }
        Ok(sample_content(request, n))
    }

    fn generate_modules(
        &self,
        _level: Level,
        _existing_titles: &[String],
    ) -> Result<Vec<Module>, GenerationError> {
        self.module_calls.set(self.module_calls.get() + 1);
        self.modules
            .borrow()
            .clone()
            .ok_or(GenerationError::Server { status: 500 })
    }
}

pub fn generated_module(title: &str) -> Module {
    Module {
        module_title: title.to_string(),
        module_description: format!("{title} description"),
        steps: vec![
            Step {
                step_type: StepType::Vocabulary,
                topic: title.to_lowercase(),
                title: format!("{title} Words"),
                level: Level::Beginner,
                content: None,
            },
            Step {
                step_type: StepType::Grammar,
                topic: "grammar".into(),
                title: format!("Grammar: {title} pattern"),
                level: Level::Beginner,
                content: None,
            },
        ],
    }
}

/// Engine on a fresh store with its session restored.
pub fn engine() -> (LearningPathEngine<MemoryStore>, MemoryStore) {
    let store = MemoryStore::new();
    let mut engine = LearningPathEngine::new(store.clone()).unwrap();
    engine.restore_session().unwrap();
    (engine, store)
}

/// Completes every remaining module of the active level.
pub fn finish_path(engine: &mut LearningPathEngine<MemoryStore>) {
    use hanpath::path::{Direction, Transition};

    while engine.complete_current_module().unwrap() == Transition::Applied {
        engine.navigate_module(Direction::Next).unwrap();
    }
}
