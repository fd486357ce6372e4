use thiserror::Error;

/// Fatal failures of a detection pass.
///
/// Only problems that prevent enumerating the document at all end up here.
/// Anything that goes wrong while evaluating a single signal is downgraded to
/// "not matched" and never surfaces as an error.
#[derive(Debug, Error)]
pub enum DetectError {
    /// The snapshot JSON could not be parsed
    #[error("snapshot parse error ({context}): {source}")]
    SnapshotParse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A node in the snapshot tree violates the snapshot contract
    #[error("malformed node at {path}: {reason}")]
    MalformedNode { path: String, reason: String },

    /// Element nesting exceeds what a pass is willing to walk
    #[error("document nesting exceeds {limit} levels")]
    DocumentTooDeep { limit: usize },

    /// A detection task for one execution context died before returning
    #[error("detection task for frame {frame_id} panicked")]
    TaskPanicked { frame_id: u32 },
}
