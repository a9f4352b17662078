//! Core domain logic for The Whistle.
//!
//! Pure, dependency-light code shared by every front end: the rule-string
//! form validator and the form schema registry. Nothing in this crate does
//! I/O or keeps global state.

pub mod error;
pub mod validation;
