//! Rejection payloads.
//!
//! Every settlement rejects with the same [`Error`] type. It is cheap to clone
//! because any number of waiters observe the identical rejection.

use std::any::Any;
use std::error::Error as StdError;
use std::fmt;
use std::iter;
use std::slice;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

/// Reason a settlement was rejected.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Plain textual error.
    #[error("{0}")]
    Message(Arc<str>),
    /// Any foreign error, shared so the rejection stays clonable.
    #[error(transparent)]
    Source(Arc<dyn StdError + Send + Sync + 'static>),
    /// The work (or a combinator callback) panicked. Holds the rendered payload.
    #[error("work panicked: {0}")]
    Panicked(Arc<str>),
    /// Every resolve/reject callback was dropped while the settlement was pending.
    #[error("promise abandoned before settling")]
    Abandoned,
    /// A timer settlement won the race.
    #[error("timed out after {0:?}")]
    TimedOut(Duration),
    /// Several errors folded into one.
    #[error(transparent)]
    Joined(JoinedError),
}

impl Error {
    pub fn msg(message: impl fmt::Display) -> Self {
        Self::Message(message.to_string().into())
    }

    pub fn new<E>(source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Source(Arc::new(source))
    }

    /// Render a panic payload caught at a task boundary.
    ///
    /// `panic!` payloads are `&'static str` or `String`; anything else is
    /// reported without its contents.
    #[must_use]
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message: Arc<str> = if let Some(s) = payload.downcast_ref::<&'static str>() {
            Arc::from(*s)
        } else if let Some(s) = payload.downcast_ref::<String>() {
            Arc::from(s.as_str())
        } else {
            Arc::from("non-string panic payload")
        };
        Self::Panicked(message)
    }

    /// Join errors into one, in the order supplied.
    ///
    /// Nested joins are flattened so [`JoinedError::iter`] yields leaf errors.
    /// Returns `None` when `errors` is empty; use [`Error::join_with`] when
    /// there is always at least one error.
    pub fn join<I>(errors: I) -> Option<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        let mut errors = errors.into_iter();
        let first = errors.next()?;
        Some(Self::join_with(first, errors))
    }

    /// Join `first` and then `rest` into one error, flattening nested joins.
    pub fn join_with<I>(first: Self, rest: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        let mut flat = Vec::new();
        for error in iter::once(first).chain(rest) {
            match error {
                Self::Joined(joined) => flat.extend(joined.iter().cloned()),
                other => flat.push(other),
            }
        }
        Self::Joined(JoinedError {
            errors: flat.into(),
        })
    }

    /// Constituents of a joined error; a single-element slice otherwise.
    #[must_use]
    pub fn constituents(&self) -> &[Self] {
        match self {
            Self::Joined(joined) => joined.errors(),
            other => slice::from_ref(other),
        }
    }
}

impl From<&str> for Error {
    fn from(message: &str) -> Self {
        Self::Message(message.into())
    }
}

impl From<String> for Error {
    fn from(message: String) -> Self {
        Self::Message(message.into())
    }
}

/// Several errors rendered as one, newline-separated.
#[derive(Debug, Clone)]
pub struct JoinedError {
    errors: Arc<[Error]>,
}

impl JoinedError {
    #[must_use]
    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    pub fn iter(&self) -> slice::Iter<'_, Error> {
        self.errors.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Always false: every joined error holds at least one constituent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for JoinedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl StdError for JoinedError {}

impl<'a> IntoIterator for &'a JoinedError {
    type Item = &'a Error;
    type IntoIter = slice::Iter<'a, Error>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Join errors into one, in the order supplied. See [`Error::join`].
pub fn join<I>(errors: I) -> Option<Error>
where
    I: IntoIterator<Item = Error>,
{
    Error::join(errors)
}

/// Join `first` and then `rest` into one error. See [`Error::join_with`].
pub fn join_with<I>(first: Error, rest: I) -> Error
where
    I: IntoIterator<Item = Error>,
{
    Error::join_with(first, rest)
}
