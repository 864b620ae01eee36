//! Async client for IntelliFire-style fireplace modules.
//!
//! A fireplace module is reachable over two independent surfaces:
//!
//! - **Local** — the module's embedded HTTP server on the LAN
//!   ([`LocalApi`]): unauthenticated status polls plus challenge/response
//!   signed control commands.
//! - **Cloud** — the vendor service ([`CloudApi`]): cookie-authenticated
//!   status polls, long-polls, and control commands.
//!
//! Both backends implement the same capability set, [`FireplaceApi`]
//! (snapshot access, background polling lifecycle, snapshot overwrite,
//! control commands), so higher layers can hold either behind
//! `Arc<dyn FireplaceApi>` and swap between them at runtime.
//!
//! This crate is transport and protocol only. The unified façade that
//! routes between the two backends lives in `firelink-core`.

pub mod api;
pub mod cloud;
pub mod command;
pub mod error;
pub mod local;
pub mod poll;
pub mod transport;

mod poller;

pub use api::FireplaceApi;
pub use cloud::{CloudApi, CloudCookies};
pub use command::FireplaceCommand;
pub use error::Error;
pub use local::LocalApi;
pub use poll::{ErrorCode, FireplacePollData};
pub use transport::{TlsMode, TransportConfig};
