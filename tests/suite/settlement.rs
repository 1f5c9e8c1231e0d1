//! Settlement core, constructors and sequential combinators.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use settle_core::{Error, Promise, catch, then};
use settle_types::join_with;
use tokio::task::JoinSet;
use tokio::time::timeout;

#[tokio::test]
async fn resolved_wait_does_not_block() {
    let promise = Promise::resolved(String::from("v"));
    let outcome = timeout(Duration::ZERO, promise.wait()).await;
    assert_eq!(outcome.unwrap().unwrap(), "v");
}

#[tokio::test]
async fn rejected_wait_does_not_block() {
    let promise = Promise::<String>::rejected(Error::msg("e"));
    let outcome = timeout(Duration::ZERO, promise.wait()).await;
    assert_eq!(outcome.unwrap().unwrap_err().to_string(), "e");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_writers_on_many_threads_settle_once() {
    let promise = Promise::new(|resolve, reject| async move {
        let mut handles = Vec::new();
        for i in 0..8_u32 {
            let resolve = Arc::clone(&resolve);
            let reject = Arc::clone(&reject);
            handles.push(thread::spawn(move || {
                for round in 0..100_u32 {
                    if (i + round) % 3 == 0 {
                        reject(Error::msg(format!("thread {i} round {round}")));
                    } else {
                        resolve(i * 1000 + round);
                    }
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
    });

    let first = promise.wait().await.map_err(|e| e.to_string());
    let mut observers = JoinSet::new();
    for _ in 0..32 {
        let promise = promise.clone();
        observers.spawn(async move { promise.wait().await.map_err(|e| e.to_string()) });
    }
    while let Some(observed) = observers.join_next().await {
        assert_eq!(observed.unwrap(), first);
    }
    assert_eq!(promise.wait().await.map_err(|e| e.to_string()), first);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn panicking_work_is_contained() {
    let promise = Promise::<u8>::new(|_resolve, _reject| async move {
        let empty: Vec<u8> = Vec::new();
        let _ = empty.first().copied().unwrap_or_else(|| panic!("no first element"));
    });
    let err = promise.wait().await.unwrap_err();
    assert!(matches!(err, Error::Panicked(_)));
    assert_eq!(err.to_string(), "work panicked: no first element");
}

#[tokio::test]
async fn then_adds_two() {
    let promise = then(&Promise::resolved(1), |x| x + 2);
    assert_eq!(promise.wait().await.unwrap(), 3);
}

#[tokio::test]
async fn catch_joins_errors_with_newline() {
    let promise = catch(&Promise::<i32>::rejected("error1"), |e| {
        join_with(e, [Error::msg("error2")])
    });
    let err = promise.wait().await.unwrap_err();
    assert_eq!(err.to_string(), "error1\nerror2");
    assert_eq!(crate::common::messages(&err), ["error1", "error2"]);
}

#[tokio::test]
async fn chains_of_then_and_catch_compose() {
    let promise = Promise::resolved(10)
        .then(|x| x * 2)
        .catch(|e| e)
        .then(|x| format!("value={x}"));
    assert_eq!(promise.await.unwrap(), "value=20");

    let failed = Promise::<i32>::rejected("root cause")
        .then(|x| x * 2)
        .catch(|e| join_with(Error::msg("while doubling"), [e]));
    assert_eq!(
        failed.await.unwrap_err().to_string(),
        "while doubling\nroot cause"
    );
}

#[tokio::test]
async fn abandoned_work_rejects_instead_of_hanging() {
    let promise = Promise::<u8>::new(|resolve, reject| async move {
        drop(resolve);
        drop(reject);
    });
    let outcome = timeout(Duration::from_secs(5), promise.wait()).await;
    assert!(matches!(outcome, Ok(Err(Error::Abandoned))));
}
