use serde::{Deserialize, Serialize};

use super::StepRef;
use crate::level::Level;

pub(crate) const SESSION_KEY: &str = "learning_path_session";

/// Enough to put the learner back on the screen they left.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub active_path_level: Level,
    pub viewed_module_index: usize,
    #[serde(default)]
    pub expanded_step: Option<StepRef>,
}
