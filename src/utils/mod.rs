//! Utility modules

pub mod content_type;
pub mod prompt;
