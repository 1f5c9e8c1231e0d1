//! Settlement state machine.

use crate::Error;

/// Where a settlement is in its lifecycle.
///
/// `Pending` is the only non-terminal state. A settlement leaves it at most
/// once, and the terminal payload never changes afterwards.
#[derive(Debug, Clone, Default)]
pub enum State<T> {
    #[default]
    Pending,
    Resolved(T),
    Rejected(Error),
}

impl<T> State<T> {
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    #[must_use]
    pub const fn is_settled(&self) -> bool {
        !self.is_pending()
    }

    /// Borrow the terminal outcome, if any.
    #[must_use]
    pub fn outcome(&self) -> Option<Result<&T, &Error>> {
        match self {
            Self::Pending => None,
            Self::Resolved(value) => Some(Ok(value)),
            Self::Rejected(error) => Some(Err(error)),
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Resolved(_) => "resolved",
            Self::Rejected(_) => "rejected",
        }
    }
}

impl<T: Clone> State<T> {
    /// Clone the terminal outcome out of the state, if any.
    #[must_use]
    pub fn cloned_outcome(&self) -> Option<Result<T, Error>> {
        self.outcome().map(|outcome| outcome.cloned().map_err(Clone::clone))
    }
}

impl<T> From<Result<T, Error>> for State<T> {
    fn from(outcome: Result<T, Error>) -> Self {
        match outcome {
            Ok(value) => Self::Resolved(value),
            Err(error) => Self::Rejected(error),
        }
    }
}
