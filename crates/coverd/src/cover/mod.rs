//! Cover entry generation and the shared covers document.
//!
//! The generator is a pure transformation from a handful of parameters to a
//! [`CoverConfigEntry`]; the document module handles the read-merge-write
//! cycle against the shared `covers.yaml` file.

mod document;
mod template;

use std::path::PathBuf;

pub use document::apply_entry;
pub use document::CoverDocument;
pub use document::COVERS_RELATIVE_PATH;
pub use template::generate;
pub use template::normalize_id;
pub use template::CoverConfigEntry;
pub use template::MovementModel;

#[derive(Debug, thiserror::Error)]
pub enum CoverError {
    #[error("Invalid cover parameters: {0}")]
    Validation(String),

    #[error("Failed to access {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse covers document: {0}")]
    Parse(#[from] serde_yaml::Error),
}
