//! Batch validation of recorded report submissions.
//!
//! Loads a form schema document, then checks a JSON-lines stream of
//! submissions against one of its forms and writes a report.

pub mod config;
pub mod error;
pub mod run;

pub use run::{run, Outcome, Summary};
