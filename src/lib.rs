//! pollbox - polls and forms with local persistence
//!
//! Polls collect single-choice votes; forms collect typed answers to an
//! ordered list of questions. All state lives in owned stores that are
//! snapshotted to a key-value blob store.

pub mod app;
pub mod config;
pub mod persistence;
pub mod state;
