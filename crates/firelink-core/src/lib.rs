//! Unified local/cloud fireplace façade.
//!
//! This crate owns the domain records and the façade that fronts the
//! two backend clients from `firelink-api`:
//!
//! - **[`UnifiedFireplace`]** — central façade for one fireplace. Built
//!   only through async builders that activate the configured read
//!   backend; thereafter callers read [`data()`](UnifiedFireplace::data),
//!   send commands through
//!   [`control_api()`](UnifiedFireplace::control_api), and may switch
//!   either mode at runtime. A read-mode switch runs the polling
//!   handoff (stop-old → seed-new → start-new → commit) and reports
//!   failures with the phase they hit via [`HandoffPhase`].
//!
//! - **[`CommonFireplaceData`]** — the serializable identity/credential
//!   record a façade owns; enough to construct both backends.
//!
//! - **[`UserData`]** — account-level record with one fireplace record
//!   per registered device; feeds the batch builder
//!   [`UnifiedFireplace::from_user_data`].
//!
//! - **[`ApiMode`]** — independent read/control backend selectors.

pub mod error;
pub mod model;
pub mod unified;

pub use error::CoreError;
pub use model::{ApiMode, CommonFireplaceData, UserData};
pub use unified::{HandoffPhase, UnifiedFireplace};

// Re-export the backend surface so most consumers only depend on core.
pub use firelink_api::{
    CloudApi, CloudCookies, Error as ApiError, FireplaceApi, FireplaceCommand, FireplacePollData,
    LocalApi, TransportConfig,
};
