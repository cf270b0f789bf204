//! Fixed module sequence each level's path is seeded from.

use crate::{
    content::StepType::{self, *},
    level::Level,
    path::{Module, Step},
};

struct StepSeed {
    step_type: StepType,
    topic: &'static str,
    title: &'static str,
}

struct ModuleSeed {
    title: &'static str,
    description: &'static str,
    steps: &'static [StepSeed],
}

const fn s(step_type: StepType, topic: &'static str, title: &'static str) -> StepSeed {
    StepSeed {
        step_type,
        topic,
        title,
    }
}

const BEGINNER: &[ModuleSeed] = &[
    ModuleSeed {
        title: "Hangul Basics: Vowels",
        description: "Read and pronounce the basic and compound vowels.",
        steps: &[
            s(HangulVowel, "basic vowels", "Basic Vowels (기본 모음)"),
            s(HangulVowel, "compound vowels", "Compound Vowels (이중 모음)"),
        ],
    },
    ModuleSeed {
        title: "Hangul Basics: Consonants",
        description: "Plain, aspirated and tense consonants.",
        steps: &[
            s(HangulConsonant, "basic consonants", "Basic Consonants (기본 자음)"),
            s(HangulConsonant, "aspirated and tense consonants", "Aspirated & Tense Consonants (격음과 경음)"),
        ],
    },
    ModuleSeed {
        title: "Final Consonants & Sound Linking",
        description: "How batchim change the sound of a syllable and link into the next.",
        steps: &[
            s(HangulBatchim, "final consonants", "Final Consonants (받침)"),
            s(PronunciationRule, "liaison", "Sound Linking (연음)"),
        ],
    },
    ModuleSeed {
        title: "Greetings & Introductions",
        description: "Say hello, introduce yourself and ask someone's name.",
        steps: &[
            s(Vocabulary, "greetings", "Greeting Words (인사말)"),
            s(Grammar, "copula", "Grammar: N입니다 / N입니까?"),
            s(Dialogue, "self introduction", "Meeting Someone New (자기소개)"),
        ],
    },
    ModuleSeed {
        title: "Topic & Subject Markers",
        description: "The difference between 은/는 and 이/가.",
        steps: &[
            s(Grammar, "topic marker", "Grammar: Topic Marker -은/는"),
            s(Grammar, "subject marker", "Grammar: Subject Marker -이/가"),
            s(ReadingPractice, "describing people", "Reading: My Friend (내 친구)"),
        ],
    },
    ModuleSeed {
        title: "Numbers & Counting",
        description: "Sino-Korean and native Korean numbers with common counters.",
        steps: &[
            s(Vocabulary, "sino-korean numbers", "Sino-Korean Numbers (일, 이, 삼)"),
            s(Vocabulary, "native korean numbers", "Native Korean Numbers (하나, 둘, 셋)"),
            s(Grammar, "counters", "Grammar: Counting with 개, 명, 살"),
        ],
    },
    ModuleSeed {
        title: "Family & People",
        description: "Talk about your family and what you have.",
        steps: &[
            s(Vocabulary, "family", "Family Members (가족)"),
            s(Grammar, "existence", "Grammar: 있어요 / 없어요"),
            s(Dialogue, "family photo", "Looking at a Family Photo (가족 사진)"),
        ],
    },
    ModuleSeed {
        title: "Daily Routine",
        description: "Everyday verbs and the polite present tense.",
        steps: &[
            s(Vocabulary, "daily verbs", "Everyday Verbs (동사)"),
            s(Grammar, "present tense", "Grammar: Polite Present -아요/어요"),
            s(Article, "a day in seoul", "A Day in Seoul (서울의 하루)"),
        ],
    },
    ModuleSeed {
        title: "Food & Ordering",
        description: "Order food and drinks politely.",
        steps: &[
            s(Vocabulary, "food", "Food and Drinks (음식)"),
            s(Grammar, "requests", "Grammar: N 주세요"),
            s(Dialogue, "cafe", "At the Cafe (카페에서)"),
        ],
    },
    ModuleSeed {
        title: "Time & Dates",
        description: "Days of the week, dates, and telling the time.",
        steps: &[
            s(Vocabulary, "days and months", "Days and Months (요일과 달)"),
            s(Grammar, "time marker", "Grammar: Time Marker -에"),
            s(ReadingPractice, "weekly schedule", "Reading: My Week (나의 일주일)"),
        ],
    },
    ModuleSeed {
        title: "Places & Directions",
        description: "Say where you are going and where things happen.",
        steps: &[
            s(Vocabulary, "places", "Places in Town (장소)"),
            s(Grammar, "location markers", "Grammar: -에 가요 / -에서"),
            s(Dialogue, "asking directions", "Asking for Directions (길 묻기)"),
        ],
    },
    ModuleSeed {
        title: "Past Tense & Weekends",
        description: "Describe what you did with the polite past tense.",
        steps: &[
            s(Grammar, "past tense", "Grammar: Past Tense -았/었어요"),
            s(Vocabulary, "hobbies", "Hobbies (취미)"),
            s(Article, "weekend diary", "My Weekend Diary (주말 일기)"),
        ],
    },
];

const INTERMEDIATE: &[ModuleSeed] = &[
    ModuleSeed {
        title: "Future Plans",
        description: "Talk about intentions and plans.",
        steps: &[
            s(Grammar, "future tense", "Grammar: Future -(으)ㄹ 거예요"),
            s(Vocabulary, "travel", "Travel Plans (여행)"),
            s(Dialogue, "vacation plans", "Planning a Vacation (휴가 계획)"),
        ],
    },
    ModuleSeed {
        title: "Connecting Ideas",
        description: "Join clauses with and, but, and so.",
        steps: &[
            s(Grammar, "and", "Grammar: -고"),
            s(Grammar, "but", "Grammar: -지만"),
            s(Grammar, "because", "Grammar: -아서/어서"),
        ],
    },
    ModuleSeed {
        title: "Wants & Abilities",
        description: "Express desire, ability and inability.",
        steps: &[
            s(Grammar, "desire", "Grammar: -고 싶다"),
            s(Grammar, "ability", "Grammar: -(으)ㄹ 수 있다 / 없다"),
            s(ReadingPractice, "hobbies and skills", "Reading: What I Can Do (할 수 있는 것)"),
        ],
    },
    ModuleSeed {
        title: "Health & the Body",
        description: "Describe symptoms and visit a doctor.",
        steps: &[
            s(Vocabulary, "body and health", "Body and Health (몸과 건강)"),
            s(Dialogue, "at the hospital", "At the Clinic (병원에서)"),
            s(PronunciationRule, "nasalization", "Nasalization (비음화)"),
        ],
    },
    ModuleSeed {
        title: "Shopping & Comparisons",
        description: "Compare items and ask about prices.",
        steps: &[
            s(Vocabulary, "shopping", "Shopping Words (쇼핑)"),
            s(Grammar, "comparison", "Grammar: -보다 더"),
            s(Dialogue, "market", "At the Market (시장에서)"),
        ],
    },
    ModuleSeed {
        title: "Honorifics",
        description: "Speak respectfully with subject honorifics.",
        steps: &[
            s(Grammar, "honorific suffix", "Grammar: Honorific -(으)시-"),
            s(Vocabulary, "honorific verbs", "Honorific Verbs (드시다, 주무시다)"),
            s(Article, "korean etiquette", "Korean Etiquette (예절)"),
        ],
    },
    ModuleSeed {
        title: "Experiences",
        description: "Talk about things you have or have not done.",
        steps: &[
            s(Grammar, "experience", "Grammar: -(으)ㄴ 적이 있다"),
            s(Vocabulary, "culture", "Korean Culture (문화)"),
            s(ReadingPractice, "travel story", "Reading: My First Trip to Korea (첫 한국 여행)"),
        ],
    },
    ModuleSeed {
        title: "Giving Reasons & Advice",
        description: "Explain reasons and suggest what someone should do.",
        steps: &[
            s(Grammar, "reason", "Grammar: -(으)니까"),
            s(Grammar, "advice", "Grammar: -는 게 좋겠다"),
            s(Dialogue, "advice from a friend", "Asking a Friend for Advice (조언)"),
        ],
    },
    ModuleSeed {
        title: "Weather & Seasons",
        description: "Describe weather and seasonal activities.",
        steps: &[
            s(Vocabulary, "weather", "Weather and Seasons (날씨와 계절)"),
            s(Grammar, "conjecture", "Grammar: -(으)ㄹ 것 같다"),
            s(Article, "korean seasons", "Four Seasons in Korea (사계절)"),
        ],
    },
    ModuleSeed {
        title: "Work & School Life",
        description: "Describe routines at work and school.",
        steps: &[
            s(Vocabulary, "workplace", "At the Office (회사)"),
            s(Grammar, "while", "Grammar: -(으)면서"),
            s(PronunciationRule, "tensification", "Tensification (경음화)"),
        ],
    },
];

const ADVANCED: &[ModuleSeed] = &[
    ModuleSeed {
        title: "Reported Speech",
        description: "Relay what others said, asked and suggested.",
        steps: &[
            s(Grammar, "indirect quotation", "Grammar: Indirect Quotation -다고 하다"),
            s(Article, "news report", "Reading the News (뉴스)"),
            s(Dialogue, "passing on a message", "Passing On a Message (전달)"),
        ],
    },
    ModuleSeed {
        title: "Formal Writing",
        description: "The written plain style used in essays and reports.",
        steps: &[
            s(Grammar, "plain style", "Grammar: Written Style -ㄴ다/는다"),
            s(ReadingPractice, "opinion essay", "Reading: An Opinion Column (칼럼)"),
            s(Vocabulary, "academic vocabulary", "Academic Vocabulary (학술 어휘)"),
        ],
    },
    ModuleSeed {
        title: "Nuance & Emphasis",
        description: "Soften, stress and hedge statements.",
        steps: &[
            s(Grammar, "emphasis", "Grammar: -잖아요"),
            s(Grammar, "discovery", "Grammar: -네요 / -군요"),
            s(Dialogue, "casual chat", "Catching Up with a Friend (수다)"),
        ],
    },
    ModuleSeed {
        title: "Idioms & Proverbs",
        description: "Common four-character idioms and proverbs.",
        steps: &[
            s(Vocabulary, "idioms", "Four-Character Idioms (사자성어)"),
            s(Vocabulary, "proverbs", "Everyday Proverbs (속담)"),
            s(Article, "origins of proverbs", "Where Proverbs Come From (속담의 유래)"),
        ],
    },
    ModuleSeed {
        title: "Society & Current Affairs",
        description: "Discuss social issues and trends.",
        steps: &[
            s(Vocabulary, "society", "Social Issues (사회 문제)"),
            s(Grammar, "regardless", "Grammar: -든지 / -거나"),
            s(ReadingPractice, "demographics", "Reading: An Aging Society (고령화 사회)"),
        ],
    },
    ModuleSeed {
        title: "Business Korean",
        description: "Meetings, emails and formal requests.",
        steps: &[
            s(Vocabulary, "business", "Business Terms (비즈니스)"),
            s(Grammar, "formal request", "Grammar: -아/어 주시겠습니까?"),
            s(Dialogue, "meeting", "A Team Meeting (회의)"),
        ],
    },
    ModuleSeed {
        title: "Conditionals & Hypotheticals",
        description: "Express conditions, regrets and imagined outcomes.",
        steps: &[
            s(Grammar, "hypothetical", "Grammar: -았/었더라면"),
            s(Grammar, "even if", "Grammar: -더라도"),
            s(ReadingPractice, "what if", "Reading: If I Had Known (알았더라면)"),
        ],
    },
    ModuleSeed {
        title: "Korean History & Culture",
        description: "Key periods and cultural heritage.",
        steps: &[
            s(Vocabulary, "history", "Historical Terms (역사)"),
            s(Article, "hangul creation", "The Creation of Hangul (훈민정음)"),
            s(PronunciationRule, "palatalization", "Palatalization (구개음화)"),
        ],
    },
    ModuleSeed {
        title: "Media & Entertainment",
        description: "Talk about dramas, films and music.",
        steps: &[
            s(Vocabulary, "media", "Media and Entertainment (미디어)"),
            s(Grammar, "retrospection", "Grammar: -더라고요"),
            s(Dialogue, "film review", "Discussing a Film (영화 이야기)"),
        ],
    },
    ModuleSeed {
        title: "Debate & Argument",
        description: "Present opinions and counterarguments.",
        steps: &[
            s(Grammar, "concession", "Grammar: -기는 하지만"),
            s(Vocabulary, "debate", "Debate Expressions (토론)"),
            s(PronunciationRule, "aspiration", "Aspiration (격음화)"),
        ],
    },
];

fn table(level: Level) -> &'static [ModuleSeed] {
    match level {
        Level::Beginner => BEGINNER,
        Level::Intermediate => INTERMEDIATE,
        Level::Advanced => ADVANCED,
    }
}

/// Number of standard modules for `level`; generated modules start here.
pub fn standard_len(level: Level) -> usize {
    table(level).len()
}

pub fn seed_modules(level: Level) -> Vec<Module> {
    table(level)
        .iter()
        .map(|seed| Module {
            module_title: seed.title.to_string(),
            module_description: seed.description.to_string(),
            steps: seed
                .steps
                .iter()
                .map(|step| Step {
                    step_type: step.step_type,
                    topic: step.topic.to_string(),
                    title: step.title.to_string(),
                    level,
                    content: None,
                })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn beginner_has_twelve_modules() {
        assert_eq!(standard_len(Level::Beginner), 12);
        assert_eq!(seed_modules(Level::Beginner).len(), 12);
    }

    #[test]
    fn every_module_has_steps_at_its_level() {
        for level in Level::ALL {
            let modules = seed_modules(level);
            assert!(!modules.is_empty());
            for module in &modules {
                assert!(!module.steps.is_empty(), "{} has no steps", module.module_title);
                assert!(module.steps.iter().all(|s| s.level == level && s.content.is_none()));
            }
        }
    }

    #[test]
    fn module_titles_are_unique_per_level() {
        for level in Level::ALL {
            let modules = seed_modules(level);
            let titles: HashSet<_> = modules.iter().map(|m| m.module_title.as_str()).collect();
            assert_eq!(titles.len(), modules.len());
        }
    }
}
