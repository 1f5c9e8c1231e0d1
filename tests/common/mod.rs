//! Shared test utilities and fixtures

#![allow(dead_code)]

use std::time::Duration;

use settle_core::{Error, Promise};
use tokio::runtime::Handle;
use tokio::time::sleep;

/// A promise that resolves with `value` after `millis`.
pub fn settle_after<T>(millis: u64, value: T) -> Promise<T>
where
    T: Clone + Send + Sync + 'static,
{
    Promise::new(move |resolve, _reject| async move {
        sleep(Duration::from_millis(millis)).await;
        resolve(value);
    })
}

/// A promise that rejects with `message` after `millis`.
pub fn reject_after<T>(millis: u64, message: &'static str) -> Promise<T>
where
    T: Clone + Send + Sync + 'static,
{
    Promise::new(move |_resolve, reject| async move {
        sleep(Duration::from_millis(millis)).await;
        reject(Error::msg(message));
    })
}

/// Render a joined error's constituents as strings.
pub fn messages(error: &Error) -> Vec<String> {
    error.constituents().iter().map(ToString::to_string).collect()
}

/// Tasks still alive on the current runtime.
pub fn alive_tasks() -> usize {
    Handle::current().metrics().num_alive_tasks()
}

/// Let every ready task run to completion. Under paused time the clock only
/// advances once the runtime is idle.
pub async fn settle_runtime() {
    sleep(Duration::from_millis(1)).await;
}
