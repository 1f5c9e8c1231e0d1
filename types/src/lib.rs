//! Core domain types for Settle.
//!
//! Pure types with no IO and no async: the rejection [`Error`], the
//! error-join utility, the settlement [`State`] and [`PromiseId`].

mod error;
mod ids;
mod state;

pub use error::{Error, JoinedError, join, join_with};
pub use ids::PromiseId;
pub use state::State;
