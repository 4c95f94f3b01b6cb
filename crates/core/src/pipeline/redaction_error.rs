use std::path::PathBuf;

use thiserror::Error;

use crate::matching::domain::match_decision::NoMatchReason;
use crate::matching::domain::match_error::MatchError;

/// Failures of a redaction request, as surfaced to the caller.
#[derive(Error, Debug)]
pub enum RedactionError {
    #[error("no face detected in the reference photo for {target}, please supply a clearer reference photo")]
    NoFaceDetected { target: String },

    #[error("could not find a matching face for {target} ({reason:?}), please try again with a clearer photo")]
    NoMatch {
        target: String,
        reason: NoMatchReason,
    },

    #[error("no faces were redacted in the photo, please try again with a clearer photo")]
    NothingRedacted,

    #[error("no redaction targets given")]
    NoTargets,

    #[error(transparent)]
    Match(#[from] MatchError),

    #[error("face detection failed: {0}")]
    Provider(#[source] Box<dyn std::error::Error>),

    #[error("redaction failed: {0}")]
    Redactor(#[source] Box<dyn std::error::Error>),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error>,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error>,
    },
}
