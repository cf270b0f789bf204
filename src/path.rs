mod engine;
mod model;
mod session;

pub use engine::{
    Direction, LearningPathEngine, LessonOutcome, LessonTicket, ModuleTicket, PathError,
    PathSnapshot, SelectOutcome, StepSelection, Transition,
};
pub use model::{ExpandedStep, Module, ModuleStatus, Step, StepRef};
pub use session::SessionRecord;
