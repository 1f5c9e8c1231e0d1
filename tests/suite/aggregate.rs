//! Aggregate combinators and timeouts.

use std::time::Duration;

use settle_core::{Error, Promise, all, any, race};
use tokio::time::sleep;

use crate::common::{alive_tasks, messages, reject_after, settle_after, settle_runtime};

#[tokio::test]
async fn all_of_resolved_preserves_order() {
    let promise = all([
        Promise::resolved("a"),
        Promise::resolved("b"),
        Promise::resolved("c"),
    ])
    .unwrap();
    assert_eq!(promise.wait().await.unwrap(), ["a", "b", "c"]);
}

#[tokio::test(start_paused = true)]
async fn all_restores_input_order_from_reverse_completion() {
    let inputs: Vec<Promise<u64>> = (0..20).map(|i| settle_after(200 - i * 10, i)).collect();
    let promise = all(inputs).unwrap();
    assert_eq!(promise.wait().await.unwrap(), (0..20).collect::<Vec<u64>>());
}

#[tokio::test]
async fn all_with_a_rejection_rejects() {
    let promise = all([
        Promise::resolved(String::from("a")),
        Promise::rejected("error1"),
        Promise::rejected("error2"),
    ])
    .unwrap();
    assert!(promise.wait().await.is_err());
}

#[tokio::test(start_paused = true)]
async fn race_prefers_fast_over_slow() {
    let promise = race([settle_after(100, "fast"), settle_after(300, "slow")]).unwrap();
    assert_eq!(promise.wait().await.unwrap(), "fast");
}

#[tokio::test(start_paused = true)]
async fn race_outcome_is_fixed_after_losers_settle() {
    let slow = settle_after(300, "slow");
    let promise = race([settle_after(100, "fast"), slow.clone()]).unwrap();
    assert_eq!(promise.wait().await.unwrap(), "fast");

    assert_eq!(slow.wait().await.unwrap(), "slow");
    sleep(Duration::from_millis(10)).await;
    assert_eq!(promise.wait().await.unwrap(), "fast");
}

#[tokio::test(start_paused = true)]
async fn race_taps_finish_once_losers_settle() {
    let baseline = alive_tasks();

    let fast = settle_after(100, "fast");
    let slow = settle_after(300, "slow");
    let promise = race([fast.clone(), slow.clone()]).unwrap();
    assert_eq!(promise.wait().await.unwrap(), "fast");
    assert!(alive_tasks() > baseline);

    fast.wait().await.unwrap();
    slow.wait().await.unwrap();
    settle_runtime().await;
    assert_eq!(alive_tasks(), baseline);
}

#[tokio::test(start_paused = true)]
async fn all_taps_finish_after_early_rejection() {
    let baseline = alive_tasks();

    let first = settle_after(100, "a");
    let failing = reject_after::<&str>(10, "boom");
    let last = settle_after(300, "c");
    let promise = all([first.clone(), failing, last.clone()]).unwrap();
    assert_eq!(promise.wait().await.unwrap_err().to_string(), "boom");

    first.wait().await.unwrap();
    last.wait().await.unwrap();
    settle_runtime().await;
    assert_eq!(alive_tasks(), baseline);
}

#[tokio::test(start_paused = true)]
async fn any_ignores_failures_when_one_succeeds() {
    let promise = any([
        settle_after(250, "fast"),
        settle_after(500, "slow"),
        Promise::rejected("error"),
    ])
    .unwrap();
    assert_eq!(promise.wait().await.unwrap(), "fast");
}

#[tokio::test(start_paused = true)]
async fn any_of_only_failures_joins_all_of_them() {
    let promise = any([
        reject_after::<String>(30, "error1"),
        reject_after(10, "error2"),
        Promise::rejected("error3"),
    ])
    .unwrap();
    let err = promise.wait().await.unwrap_err();
    assert_eq!(messages(&err), ["error1", "error2", "error3"]);
}

#[tokio::test]
async fn empty_inputs_have_no_promise() {
    let empty: Vec<Promise<()>> = Vec::new();
    assert!(all(empty.clone()).is_none());
    assert!(race(empty.clone()).is_none());
    assert!(any(empty).is_none());
}

#[tokio::test(start_paused = true)]
async fn timeout_is_a_race_against_a_timer() {
    let err = settle_after(1_000, 1).timeout(Duration::from_millis(250)).await.unwrap_err();
    assert!(matches!(err, Error::TimedOut(_)));
    assert_eq!(err.to_string(), "timed out after 250ms");
}

#[tokio::test(start_paused = true)]
async fn aggregate_results_feed_further_chains() {
    let first = any([reject_after::<u32>(5, "nope"), settle_after(20, 7)]).unwrap();
    let second = race([settle_after(15, 3), settle_after(50, 100)]).unwrap();
    let total = all([first, second]).unwrap().then(|xs| xs.iter().sum::<u32>());
    assert_eq!(total.await.unwrap(), 10);
}
