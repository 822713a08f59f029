pub mod artworks;
pub mod loaders;
pub mod pipeline;
pub mod source;

use std::path::PathBuf;

use thiserror::Error;

/// Stage-level failures. Anything here halts the whole load; per-row
/// problems are logged and skipped instead, and never reach this type.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read source file {path}")]
    Source {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Duplicate object_id in the artwork batch, or any other constraint
    /// violation. Identifiers come verbatim from the dataset, so a collision
    /// is bad data, not something to dedupe away.
    #[error("artwork batch insert failed: {0:#}")]
    Integrity(anyhow::Error),
}
