pub mod config;
pub mod content;
pub mod export;
pub mod generator;
pub mod level;
pub mod logging;
pub mod path;
pub mod points;
pub mod store;
pub mod syllabus;

pub use level::Level;
pub use path::{LearningPathEngine, Module, Step};
