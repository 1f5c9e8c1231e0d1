//! Settlement core.
//!
//! A [`Promise`] is a shared handle onto one settlement. The state lives in a
//! `watch` channel: the tri-state value is the state machine, and the channel
//! is the broadcast that releases every waiter when it leaves `Pending`.
//! Flipping the state and waking waiters is one `send_if_modified` call, so
//! the transition happens-before every `wait()` that observes it.

use std::fmt;
use std::future::{Future, IntoFuture};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tokio::sync::watch;

use settle_types::{Error, PromiseId, State};

/// Callback that resolves the settlement it was handed out for.
pub type Resolve<T> = Arc<dyn Fn(T) + Send + Sync>;

/// Callback that rejects the settlement it was handed out for.
pub type Reject = Arc<dyn Fn(Error) + Send + Sync>;

struct Shared<T> {
    id: PromiseId,
    state: watch::Sender<State<T>>,
}

impl<T> Shared<T> {
    /// Apply `next` if still pending. Returns whether this call won.
    fn try_settle(&self, next: State<T>) -> bool {
        self.state.send_if_modified(|state| {
            if state.is_settled() {
                return false;
            }
            *state = next;
            true
        })
    }

    fn settle(&self, next: State<T>) -> bool {
        let label = next.label();
        let won = self.try_settle(next);
        if won {
            tracing::debug!(promise = %self.id, state = label, "Promise settled");
        } else {
            tracing::trace!(promise = %self.id, state = label, "Ignoring settle of settled promise");
        }
        won
    }
}

/// Write side shared by the resolve/reject callbacks of one settlement.
///
/// Dropping the last one while still pending rejects with
/// [`Error::Abandoned`], so waiters never hang on work that gave up its
/// callbacks.
struct Settler<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Settler<T> {
    fn settle(&self, next: State<T>) -> bool {
        self.shared.settle(next)
    }
}

impl<T> Drop for Settler<T> {
    fn drop(&mut self) {
        if self.shared.try_settle(State::Rejected(Error::Abandoned)) {
            tracing::debug!(promise = %self.shared.id, "Promise abandoned by its work");
        }
    }
}

/// Eventual outcome of one asynchronous unit of work.
///
/// Cloning is cheap and every clone observes the same settlement.
pub struct Promise<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for Promise<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> fmt::Debug for Promise<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise")
            .field("id", &self.shared.id)
            .field("state", &self.shared.state.borrow().label())
            .finish()
    }
}

impl<T> Promise<T> {
    fn with_state(state: State<T>) -> Self {
        Self {
            shared: Arc::new(Shared {
                id: PromiseId::next(),
                state: watch::Sender::new(state),
            }),
        }
    }

    /// A promise that is already resolved. No task is spawned.
    pub fn resolved(value: T) -> Self {
        Self::with_state(State::Resolved(value))
    }

    /// A promise that is already rejected. No task is spawned.
    pub fn rejected(error: impl Into<Error>) -> Self {
        Self::with_state(State::Rejected(error.into()))
    }

    #[must_use]
    pub fn id(&self) -> PromiseId {
        self.shared.id
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.shared.state.borrow().is_pending()
    }
}

impl<T> Promise<T>
where
    T: Send + Sync + 'static,
{
    /// Spawn `work` on the current tokio runtime and return its pending promise.
    ///
    /// `work` receives the resolve and reject callbacks. The first call to
    /// either settles the promise; later calls are ignored. The callbacks may
    /// be cloned and moved to other tasks or threads.
    ///
    /// A panic while building or running the work future rejects the promise
    /// with [`Error::Panicked`] unless it already settled.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn new<F, Fut>(work: F) -> Self
    where
        F: FnOnce(Resolve<T>, Reject) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let promise = Self::with_state(State::Pending);
        let id = promise.id();
        let settler = Arc::new(Settler {
            shared: Arc::clone(&promise.shared),
        });

        let resolve: Resolve<T> = {
            let settler = Arc::clone(&settler);
            Arc::new(move |value| {
                settler.settle(State::Resolved(value));
            })
        };
        let reject: Reject = {
            let settler = Arc::clone(&settler);
            Arc::new(move |error| {
                settler.settle(State::Rejected(error));
            })
        };

        tokio::spawn(async move {
            let run = AssertUnwindSafe(async move { work(resolve, reject).await });
            if let Err(payload) = run.catch_unwind().await {
                let error = Error::from_panic(payload.as_ref());
                if settler.settle(State::Rejected(error.clone())) {
                    tracing::warn!(promise = %id, %error, "Work panicked; promise rejected");
                } else {
                    tracing::debug!(promise = %id, %error, "Discarding panic from settled promise");
                }
            }
        });

        promise
    }
}

impl<T> Promise<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Wait until the promise settles and return its outcome.
    ///
    /// Every caller, on any task and any number of times, gets the same
    /// outcome. Returns immediately once settled.
    pub async fn wait(&self) -> Result<T, Error> {
        if let Some(outcome) = self.peek() {
            return outcome;
        }

        let mut rx = self.shared.state.subscribe();
        match rx.wait_for(State::is_settled).await {
            Ok(state) => state.cloned_outcome().unwrap_or(Err(Error::Abandoned)),
            // The sender lives in `shared`, which `self` keeps alive.
            Err(_closed) => Err(Error::Abandoned),
        }
    }

    /// The outcome if already settled, without waiting.
    #[must_use]
    pub fn peek(&self) -> Option<Result<T, Error>> {
        self.shared.state.borrow().cloned_outcome()
    }
}

impl<T> IntoFuture for Promise<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Output = Result<T, Error>;
    type IntoFuture = BoxFuture<'static, Result<T, Error>>;

    fn into_future(self) -> Self::IntoFuture {
        async move { self.wait().await }.boxed()
    }
}
