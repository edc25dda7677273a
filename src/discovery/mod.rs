//! Upload candidate discovery and destination naming

mod naming;
mod scanner;

pub use naming::{document_name, FALLBACK_LABEL};
pub use scanner::{discover_files, resolve_roots, SkipReason, SkipRules};
