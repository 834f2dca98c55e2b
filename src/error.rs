//! Pipeline error taxonomy
//!
//! Every run either returns a complete [`crate::pipeline::PipelineResult`]
//! or exactly one of these errors, tagged with the stage that failed.
//! Artifacts are always released before an error propagates.

use thiserror::Error;

use crate::clients::ClientError;

/// The pipeline stage a failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Script,
    Speech,
    Image,
    Captions,
    Render,
    Publish,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Script => "script",
            Self::Speech => "speech",
            Self::Image => "image",
            Self::Captions => "captions",
            Self::Render => "render",
            Self::Publish => "publish",
        };
        f.write_str(name)
    }
}

/// Terminal failure of one pipeline run.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Rejected before any collaborator was called.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A script, speech, or image collaborator failed.
    #[error("{stage} generation failed: {source}")]
    UpstreamGeneration {
        stage: Stage,
        #[source]
        source: ClientError,
    },

    /// Video composition failed.
    #[error("video rendering failed: {0}")]
    Rendering(#[source] ClientError),

    /// The content store failed after the retry budget was spent.
    #[error("publication failed: {0}")]
    Publication(#[source] ClientError),

    /// A state the orchestrator must never reach.
    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),
}

impl PipelineError {
    /// The stage this error is attributed to, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::UpstreamGeneration { stage, .. } => Some(*stage),
            Self::Rendering(_) => Some(Stage::Render),
            Self::Publication(_) => Some(Stage::Publish),
            Self::InvalidRequest(_) | Self::InvariantViolation(_) => None,
        }
    }
}
