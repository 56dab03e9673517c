//! Helpers for preparing and sending notification emails from batch jobs.
//!
//! The crate splits the work in two: [`compose`] turns an [`EmailMessage`]
//! (subject, text body, HTML body, inline images keyed by content id) into a
//! self-contained MIME document, and [`Emitter`] writes documents to disk and
//! hands a written file to the host's mail transfer agent.
//!
//! Logging goes through the `log` facade; the hosting application owns logger
//! initialization. No network I/O happens here.

pub mod compose;
pub mod email;
pub mod emit;
pub mod error;

pub use compose::{compose, Composed, SkippedImage};
pub use email::{EmailMessage, InlineImage};
pub use emit::Emitter;
pub use error::Error;
