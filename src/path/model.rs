use serde::{Deserialize, Serialize};

use crate::{
    content::{GeneratedContent, StepType},
    level::Level,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    #[serde(rename = "type")]
    pub step_type: StepType,
    pub topic: String,
    pub title: String,
    pub level: Level,
    /// lesson body, absent until the first successful generation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<GeneratedContent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub module_title: String,
    pub module_description: String,
    pub steps: Vec<Step>,
}

/// Position of a step inside a level's module list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRef {
    pub module_index: usize,
    pub step_index: usize,
}

impl StepRef {
    pub fn new(module_index: usize, step_index: usize) -> Self {
        Self {
            module_index,
            step_index,
        }
    }

    pub fn resolve<'a>(&self, modules: &'a [Module]) -> Option<&'a Step> {
        modules.get(self.module_index)?.steps.get(self.step_index)
    }

    pub fn resolve_mut<'a>(&self, modules: &'a mut [Module]) -> Option<&'a mut Step> {
        modules
            .get_mut(self.module_index)?
            .steps
            .get_mut(self.step_index)
    }
}

/// The single step currently open in the path view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpandedStep {
    pub step: StepRef,
    pub content: Option<GeneratedContent>,
    /// a generation for this step is in flight
    pub loading: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleStatus {
    Completed,
    Current,
    Locked,
}

impl ModuleStatus {
    pub fn for_index(index: usize, cursor: usize) -> Self {
        match index.cmp(&cursor) {
            std::cmp::Ordering::Less => ModuleStatus::Completed,
            std::cmp::Ordering::Equal => ModuleStatus::Current,
            std::cmp::Ordering::Greater => ModuleStatus::Locked,
        }
    }
}
