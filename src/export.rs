use std::collections::BTreeMap;

use anyhow::Context;
use serde::Serialize;

use crate::{
    content::{ExampleSentence, GeneratedContent, StepType, Translation},
    level::Level,
    path::{Module, ModuleStatus},
};

#[derive(Serialize, Debug)]
#[serde(untagged)]
enum Frontmatter<'a> {
    Title(&'a str),
    Slug(&'a str),
    NextSlug(Option<&'a str>),
    Description(&'a str),
    Level(Level),
    Order(usize),
    Status(ModuleStatus),
    Steps(Vec<StepMeta<'a>>),
}

#[derive(Serialize, Debug)]
struct StepMeta<'a> {
    title: &'a str,
    slug: String,
    #[serde(rename = "type")]
    step_type: StepType,
    generated: bool,
}

/// One module rendered as a markdown page.
#[derive(Debug)]
pub struct ModulePage {
    pub slug: String,
    pub body: String,
}

/// Renders every module of a path, in order, linking each page to the next.
pub fn export_path(
    level: Level,
    modules: &[Module],
    cursor: usize,
) -> anyhow::Result<Vec<ModulePage>> {
    let mut slugger = github_slugger::Slugger::default();
    let slugs: Vec<String> = modules
        .iter()
        .map(|m| slugger.slug(&m.module_title))
        .collect();

    modules
        .iter()
        .enumerate()
        .map(|(index, module)| {
            let next_slug = slugs.get(index + 1).map(String::as_str);
            let body = serialize_module(
                level,
                index,
                module,
                &slugs[index],
                ModuleStatus::for_index(index, cursor),
                next_slug,
            )
            .context(format!("failed to serialize module '{}'", module.module_title))?;

            Ok(ModulePage {
                slug: slugs[index].clone(),
                body,
            })
        })
        .collect()
}

pub fn serialize_module(
    level: Level,
    order: usize,
    module: &Module,
    slug: &str,
    status: ModuleStatus,
    next_slug: Option<&str>,
) -> anyhow::Result<String> {
    let mut slugger = github_slugger::Slugger::default();
    let steps: Vec<StepMeta> = module
        .steps
        .iter()
        .map(|step| StepMeta {
            title: step.title.as_str(),
            slug: slugger.slug(&step.title),
            step_type: step.step_type,
            generated: step.content.is_some(),
        })
        .collect();

    let mut page_body = String::with_capacity(800 * module.steps.len());
    for (step, meta) in module.steps.iter().zip(&steps) {
        let content = step
            .content
            .as_ref()
            .map_or_else(|| String::from("_Not generated yet._"), render_content);
        page_body.push_str(&format!("## {} {{#{}}}\n\n{}\n\n", step.title, meta.slug, content));
    }

    let mut fm: BTreeMap<&str, Frontmatter> = BTreeMap::new();
    fm.insert("title", Frontmatter::Title(module.module_title.as_str()));
    fm.insert("slug", Frontmatter::Slug(slug));
    fm.insert("next_slug", Frontmatter::NextSlug(next_slug));
    fm.insert(
        "description",
        Frontmatter::Description(module.module_description.as_str()),
    );
    fm.insert("level", Frontmatter::Level(level));
    fm.insert("order", Frontmatter::Order(order));
    fm.insert("status", Frontmatter::Status(status));
    fm.insert("steps", Frontmatter::Steps(steps));

    Ok(format!(
        r#"---
{}---

{}"#,
        serde_yaml_ng::to_string(&fm)?,
        page_body
    ))
}

fn translation(t: &Translation) -> String {
    match &t.burmese {
        Some(burmese) => format!("{}\n\n{}", t.english, burmese),
        None => t.english.clone(),
    }
}

fn examples(items: &[ExampleSentence]) -> String {
    items
        .iter()
        .map(|e| format!("- {} | {}", e.korean, e.translation.english))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Markdown body for a lesson.
pub fn render_content(content: &GeneratedContent) -> String {
    match content {
        GeneratedContent::Grammar(lesson) => format!(
            "**{}** `{}`\n\n{}\n\n{}",
            lesson.grammar_point,
            lesson.form,
            translation(&lesson.explanation),
            examples(&lesson.examples)
        ),
        GeneratedContent::Vocabulary(items) => {
            let mut table = String::from("| Korean | Romanization | Meaning |\n|---|---|---|\n");
            for item in items {
                table.push_str(&format!(
                    "| {} | {} | {} |\n",
                    item.korean, item.romanization, item.meaning.english
                ));
            }
            table
        }
        GeneratedContent::Dialogue(script) => {
            let lines = script
                .lines
                .iter()
                .map(|l| format!("**{}**: {}  \n_{}_", l.speaker, l.korean, l.translation.english))
                .collect::<Vec<_>>()
                .join("\n\n");
            format!("_{}_\n\n{}", script.situation, lines)
        }
        GeneratedContent::Reading(passage) => {
            let questions = passage
                .questions
                .iter()
                .enumerate()
                .map(|(i, q)| format!("{}. {}", i + 1, q.question))
                .collect::<Vec<_>>()
                .join("\n");
            format!(
                "### {}\n\n{}\n\n{}\n\n{}",
                passage.title,
                passage.korean,
                translation(&passage.translation),
                questions
            )
        }
        GeneratedContent::Hangul(lesson) => {
            let letters = lesson
                .letters
                .iter()
                .map(|l| {
                    format!(
                        "- **{}** ({}) {} {}",
                        l.letter,
                        l.romanization,
                        l.sound,
                        l.example_words.join(", ")
                    )
                })
                .collect::<Vec<_>>()
                .join("\n");
            format!("{}\n\n{}", translation(&lesson.introduction), letters)
        }
        GeneratedContent::PronunciationRule(lesson) => format!(
            "**{}**\n\n{}\n\n{}",
            lesson.rule,
            translation(&lesson.explanation),
            examples(&lesson.examples)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        content::{GrammarLesson, Translation},
        syllabus,
    };

    #[test]
    fn pages_link_to_the_next_module() {
        let modules = syllabus::seed_modules(Level::Beginner);
        let pages = export_path(Level::Beginner, &modules, 1).unwrap();

        assert_eq!(pages.len(), modules.len());
        assert_eq!(pages[0].slug, "hangul-basics-vowels");
        assert!(pages[0].body.starts_with("---\n"));
        assert!(pages[0].body.contains("next_slug: hangul-basics-consonants"));
        assert!(pages[0].body.contains("status: completed"));
        assert!(pages[1].body.contains("status: current"));
        assert!(pages[2].body.contains("status: locked"));
        assert!(pages.last().unwrap().body.contains("next_slug: null"));
    }

    #[test]
    fn generated_steps_render_their_content() {
        let mut modules = syllabus::seed_modules(Level::Beginner);
        modules[3].steps[1].content = Some(GeneratedContent::Grammar(GrammarLesson {
            grammar_point: "N입니다".into(),
            explanation: Translation {
                english: "Formal copula.".into(),
                burmese: None,
            },
            form: "N + 입니다".into(),
            examples: vec![],
        }));

        let pages = export_path(Level::Beginner, &modules, 0).unwrap();
        let body = &pages[3].body;
        assert!(body.contains("Formal copula."));
        assert!(body.contains("generated: true"));
        assert!(body.contains("_Not generated yet._"));
    }
}
