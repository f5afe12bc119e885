//! Data models for the site.
//!
//! These models match the frontend TypeScript interfaces (camelCase on the wire)
//! and are the normalized form of the gateway records.

mod project;
mod quote_request;
mod session;
mod settings;

pub use project::*;
pub use quote_request::*;
pub use session::*;
pub use settings::*;
