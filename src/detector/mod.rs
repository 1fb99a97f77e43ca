//! Detection of Testing Library constructs: import tracking, provenance
//! resolution and name classification

pub mod constants;
pub mod engine;
pub mod imports;
pub mod resolver;
pub mod settings;

pub use engine::{DetectionEngine, DetectionState, QueryVariant, TRACKED_SELECTORS};
pub use imports::{BindingKind, ImportBinding, ImportKind, ImportRecord};
pub use resolver::{resolve_import_of, ImportDetails, Provenance};
pub use settings::{CustomQueries, CustomRenders, Settings, UtilsModule};
