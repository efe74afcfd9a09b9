//! paperctl - past paper filename classifier and sorter

pub mod error;
pub mod vocab;
pub mod registry;
pub mod patterns;
pub mod normalize;
pub mod fallback;
pub mod classifier;
pub mod naming;
pub mod mover;
pub mod scanner;
pub mod sorter;
pub mod prompt;
pub mod config;
pub mod cli;

// Re-exports for easy access
pub use error::{ClassifyError, Field, FileOpError};
pub use vocab::{Vocabularies, Vocabulary};
pub use registry::{CodeEntry, CodeRegistry, RegistryRecord};
pub use patterns::{PatternBank, PatternId};
pub use classifier::{Classifier, ClassifierOptions, FieldResolver, NormalizedRecord};
pub use naming::{build_path, CanonicalPath};
pub use mover::{FileMover, MoveOutcome, SkipReason, SortOptions};
pub use scanner::{ScanResult, Scanner};
pub use sorter::{SortReport, Sorter};
pub use prompt::PromptResolver;
pub use config::Config;
pub use cli::{Cli, Commands};

pub mod colors {
    use colored::Color;

    pub const SUCCESS: Color = Color::TrueColor { r: 77, g: 255, b: 157 };
    pub const HEADER: Color = Color::TrueColor { r: 157, g: 77, b: 255 };
    pub const PATH: Color = Color::TrueColor { r: 77, g: 195, b: 255 };
    pub const WARNING: Color = Color::TrueColor { r: 255, g: 217, b: 61 };
}

/// Current version of paperctl
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
