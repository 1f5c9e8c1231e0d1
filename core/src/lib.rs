//! Asynchronous settlements and their combinators.
//!
//! A [`Promise`] is settled exactly once, by whichever of its resolve or
//! reject callbacks runs first, and can be awaited by any number of tasks.
//! Sequential combinators ([`then`], [`catch`]) build on the settlement core;
//! aggregate combinators ([`all`], [`race`], [`any`]) build on those.
//!
//! Every promise created with [`Promise::new`] runs its work on its own tokio
//! task. A panic inside that work is turned into a rejection and never
//! reaches the caller of [`Promise::wait`].

mod chain;
mod combinators;
mod promise;

pub use chain::{catch, then};
pub use combinators::{all, any, race};
pub use promise::{Promise, Reject, Resolve};
pub use settle_types::{Error, JoinedError, PromiseId, State, join, join_with};
