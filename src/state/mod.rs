//! Application state module

mod form_store;
mod forms;
mod models;
mod poll_store;
mod theme;
mod workspace;

pub use form_store::*;
pub use forms::*;
pub use models::*;
pub use poll_store::*;
pub use theme::*;
pub use workspace::*;
