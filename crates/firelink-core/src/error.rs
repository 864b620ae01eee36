use thiserror::Error;

use crate::model::ApiMode;
use crate::unified::HandoffPhase;

/// Top-level error type for the `firelink-core` crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Backend error outside a handoff (construction, commands).
    #[error(transparent)]
    Api(#[from] firelink_api::Error),

    /// A read-mode handoff failed partway through.
    ///
    /// The committed read mode is unchanged; [`HandoffPhase`] says how
    /// far the switch got before failing. The façade has already
    /// attempted to restart the previously active backend.
    #[error("read-mode handoff {from}=>{to} failed during {phase:?}: {source}")]
    Handoff {
        from: ApiMode,
        to: ApiMode,
        phase: HandoffPhase,
        #[source]
        source: firelink_api::Error,
    },

    /// Record serialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
