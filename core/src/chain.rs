//! Sequential combinators: `then` and `catch`.
//!
//! Both build a fresh promise with [`Promise::new`] whose work waits on the
//! source, so a panicking callback is contained like any other work.

use settle_types::Error;

use crate::Promise;

/// Map the value of `source` once it resolves.
///
/// A rejection passes through unchanged and `map` is never called.
pub fn then<T, U, F>(source: &Promise<T>, map: F) -> Promise<U>
where
    T: Clone + Send + Sync + 'static,
    U: Send + Sync + 'static,
    F: FnOnce(T) -> U + Send + 'static,
{
    let source = source.clone();
    Promise::new(move |resolve, reject| async move {
        match source.wait().await {
            Ok(value) => resolve(map(value)),
            Err(error) => reject(error),
        }
    })
}

/// Transform the error of `source` once it rejects.
///
/// The result is still a rejection; `catch` never recovers a failure into a
/// success. A resolved value passes through unchanged and `recover` is never
/// called.
pub fn catch<T, F>(source: &Promise<T>, recover: F) -> Promise<T>
where
    T: Clone + Send + Sync + 'static,
    F: FnOnce(Error) -> Error + Send + 'static,
{
    let source = source.clone();
    Promise::new(move |resolve, reject| async move {
        match source.wait().await {
            Ok(value) => resolve(value),
            Err(error) => reject(recover(error)),
        }
    })
}

impl<T> Promise<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Method form of [`then`].
    pub fn then<U, F>(&self, map: F) -> Promise<U>
    where
        U: Send + Sync + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        then(self, map)
    }

    /// Method form of [`catch`].
    pub fn catch<F>(&self, recover: F) -> Self
    where
        F: FnOnce(Error) -> Error + Send + 'static,
    {
        catch(self, recover)
    }
}
