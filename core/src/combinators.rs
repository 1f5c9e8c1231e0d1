//! Aggregate combinators: `all`, `race` and `any`.
//!
//! Each aggregate is a [`Promise::new`] fan-in. Its work attaches two taps to
//! every input, a `then` that publishes the value and a `catch` that
//! publishes the error, both tagged with the input's index. The fan-in loop
//! then applies the combinator's policy to whatever arrives first.
//!
//! Taps publish on unbounded channels, so a send never waits. Once the fan-in
//! has decided it drops the receivers and late taps' sends simply fail; a
//! losing input can never leave a tap blocked.

use std::iter;
use std::time::Duration;

use tokio::select;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::sleep;

use settle_types::Error;

use crate::Promise;

/// Outcome of one input, tagged with the input's position.
struct Tagged<V> {
    index: usize,
    value: V,
}

struct Taps<T> {
    values: UnboundedReceiver<Tagged<T>>,
    errors: UnboundedReceiver<Tagged<Error>>,
}

/// Attach a value tap and an error tap to every input.
fn fan_out<T>(inputs: &[Promise<T>]) -> Taps<T>
where
    T: Clone + Send + Sync + 'static,
{
    let (value_tx, values) = mpsc::unbounded_channel();
    let (error_tx, errors) = mpsc::unbounded_channel();
    for (index, input) in inputs.iter().enumerate() {
        tap(index, input, value_tx.clone(), error_tx.clone());
    }
    Taps { values, errors }
}

fn tap<T>(
    index: usize,
    input: &Promise<T>,
    values: UnboundedSender<Tagged<T>>,
    errors: UnboundedSender<Tagged<Error>>,
) where
    T: Clone + Send + Sync + 'static,
{
    let input_id = input.id();
    input.then(move |value| {
        if values.send(Tagged { index, value }).is_err() {
            tracing::trace!(input = %input_id, index, "Fan-in finished; dropping late value");
        }
    });
    input.catch(move |error| {
        let tagged = Tagged {
            index,
            value: error.clone(),
        };
        if errors.send(tagged).is_err() {
            tracing::trace!(input = %input_id, index, "Fan-in finished; dropping late error");
        }
        error
    });
}

/// Resolve with every input's value, in input order.
///
/// Rejects as soon as any input rejects, with that input's error; the first
/// failure in completion order wins, not the lowest index. Inputs still
/// running are not waited for.
///
/// Returns `None` for an empty input list.
pub fn all<T, I>(inputs: I) -> Option<Promise<Vec<T>>>
where
    T: Clone + Send + Sync + 'static,
    I: IntoIterator<Item = Promise<T>>,
{
    let inputs: Vec<Promise<T>> = inputs.into_iter().collect();
    if inputs.is_empty() {
        return None;
    }

    Some(Promise::new(move |resolve, reject| async move {
        let total = inputs.len();
        let Taps {
            mut values,
            mut errors,
        } = fan_out(&inputs);
        let mut slots: Vec<Option<T>> = iter::repeat_with(|| None).take(total).collect();
        let mut filled = 0;

        loop {
            select! {
                Some(Tagged { index, value }) = values.recv() => {
                    if slots[index].replace(value).is_none() {
                        filled += 1;
                    }
                    if filled == total {
                        tracing::debug!(inputs = total, "all: every input resolved");
                        resolve(slots.into_iter().flatten().collect());
                        return;
                    }
                }
                Some(Tagged { index, value: error }) = errors.recv() => {
                    tracing::debug!(index, %error, "all: input rejected");
                    reject(error);
                    return;
                }
                else => return,
            }
        }
    }))
}

/// Mirror whichever input settles first, resolved or rejected.
///
/// Ties between inputs that are ready at the same time go to whichever
/// branch the runtime picks.
///
/// Returns `None` for an empty input list.
pub fn race<T, I>(inputs: I) -> Option<Promise<T>>
where
    T: Clone + Send + Sync + 'static,
    I: IntoIterator<Item = Promise<T>>,
{
    let inputs: Vec<Promise<T>> = inputs.into_iter().collect();
    if inputs.is_empty() {
        return None;
    }
    Some(race_non_empty(inputs))
}

fn race_non_empty<T>(inputs: Vec<Promise<T>>) -> Promise<T>
where
    T: Clone + Send + Sync + 'static,
{
    Promise::new(move |resolve, reject| async move {
        let Taps {
            mut values,
            mut errors,
        } = fan_out(&inputs);

        select! {
            Some(Tagged { index, value }) = values.recv() => {
                tracing::debug!(index, "race: input resolved first");
                resolve(value);
            }
            Some(Tagged { index, value: error }) = errors.recv() => {
                tracing::debug!(index, %error, "race: input rejected first");
                reject(error);
            }
            else => {}
        }
    })
}

/// Resolve with the first input to succeed.
///
/// Rejects only when every input has rejected, with all of their errors
/// joined in input order.
///
/// Returns `None` for an empty input list.
pub fn any<T, I>(inputs: I) -> Option<Promise<T>>
where
    T: Clone + Send + Sync + 'static,
    I: IntoIterator<Item = Promise<T>>,
{
    let inputs: Vec<Promise<T>> = inputs.into_iter().collect();
    if inputs.is_empty() {
        return None;
    }

    Some(Promise::new(move |resolve, reject| async move {
        let total = inputs.len();
        let Taps {
            mut values,
            mut errors,
        } = fan_out(&inputs);
        let mut failures: Vec<Option<Error>> = vec![None; total];
        let mut failed = 0;

        loop {
            select! {
                Some(Tagged { index, value }) = values.recv() => {
                    tracing::debug!(index, "any: input resolved");
                    resolve(value);
                    return;
                }
                Some(Tagged { index, value: error }) = errors.recv() => {
                    if failures[index].replace(error.clone()).is_none() {
                        failed += 1;
                    }
                    if failed == total {
                        tracing::debug!(inputs = total, "any: every input rejected");
                        let mut ordered = failures.into_iter().flatten();
                        // `failed == total >= 1`, so the first slot is filled.
                        let Some(first) = ordered.next() else {
                            reject(error);
                            return;
                        };
                        reject(Error::join_with(first, ordered));
                        return;
                    }
                }
                else => return,
            }
        }
    }))
}

impl<T> Promise<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Race this promise against a timer.
    ///
    /// The returned promise rejects with [`Error::TimedOut`] if `self` has not
    /// settled within `after`. The work behind `self` keeps running either way.
    pub fn timeout(&self, after: Duration) -> Self {
        let timer = Promise::new(move |_resolve, reject| async move {
            sleep(after).await;
            reject(Error::TimedOut(after));
        });
        race_non_empty(vec![self.clone(), timer])
    }
}
