//! Demo scenarios, one per promise operation.

use std::fmt;
use std::time::Duration;

use anyhow::{Result, bail};
use tokio::time::sleep;

use settle_config::DemoConfig;
use settle_core::{Error, Promise, all, any, catch, join_with, race, then};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    New,
    Then,
    Catch,
    All,
    Race,
    Any,
    Timeout,
}

impl Scenario {
    pub const ALL: [Scenario; 7] = [
        Scenario::New,
        Scenario::Then,
        Scenario::Catch,
        Scenario::All,
        Scenario::Race,
        Scenario::Any,
        Scenario::Timeout,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Scenario::New => "new",
            Scenario::Then => "then",
            Scenario::Catch => "catch",
            Scenario::All => "all",
            Scenario::Race => "race",
            Scenario::Any => "any",
            Scenario::Timeout => "timeout",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|scenario| scenario.name() == name)
    }

    pub async fn run(self, demo: &DemoConfig) -> Result<String, Error> {
        match self {
            Scenario::New => {
                Promise::new(|resolve, _reject| async move {
                    resolve(String::from("hello"));
                })
                .await
            }
            Scenario::Then => {
                let greeting = Promise::new(|resolve, _reject| async move {
                    resolve(String::from("hello "));
                });
                then(&greeting, |s| s + "world").await
            }
            Scenario::Catch => {
                let failing = Promise::<String>::new(|_resolve, reject| async move {
                    reject(Error::msg("error1"));
                });
                catch(&failing, |err| join_with(err, [Error::msg("error2")]))
                .await
            }
            Scenario::All => {
                let letters = [
                    settle_after(demo.slow(), "a"),
                    settle_after(demo.fast(), "b"),
                    Promise::resolved("c"),
                ];
                let joined = all(letters).map(|p| p.then(|values| values.join(", ")));
                unwrap_aggregate(joined).await.map(|s| format!("[{s}]"))
            }
            Scenario::Race => {
                let contenders = [
                    settle_after(demo.fast(), String::from("fast")),
                    settle_after(demo.slow(), String::from("slow")),
                ];
                unwrap_aggregate(race(contenders)).await
            }
            Scenario::Any => {
                let contenders = [
                    settle_after(demo.fast(), String::from("fast")),
                    settle_after(demo.slow(), String::from("slow")),
                    Promise::rejected("error"),
                ];
                unwrap_aggregate(any(contenders)).await
            }
            Scenario::Timeout => {
                settle_after(demo.slow(), String::from("slow"))
                    .timeout(demo.fast())
                    .await
            }
        }
    }
}

fn settle_after<T>(delay: Duration, value: T) -> Promise<T>
where
    T: Clone + Send + Sync + 'static,
{
    Promise::new(move |resolve, _reject| async move {
        sleep(delay).await;
        resolve(value);
    })
}

/// Aggregates over non-empty inputs always produce a promise.
async fn unwrap_aggregate<T>(promise: Option<Promise<T>>) -> Result<T, Error>
where
    T: Clone + Send + Sync + 'static,
{
    match promise {
        Some(promise) => promise.wait().await,
        None => Err(Error::msg("no inputs")),
    }
}

/// Resolve scenario names; no names selects every scenario.
pub fn select(names: &[String]) -> Result<Vec<Scenario>> {
    if names.is_empty() {
        return Ok(Scenario::ALL.to_vec());
    }

    let mut selected = Vec::with_capacity(names.len());
    for name in names {
        let Some(scenario) = Scenario::from_name(name) else {
            let known: Vec<&str> = Scenario::ALL.iter().map(|s| s.name()).collect();
            bail!("unknown scenario '{name}' (expected one of: {})", known.join(", "));
        };
        selected.push(scenario);
    }
    Ok(selected)
}

pub struct Report {
    pub scenario: Scenario,
    pub outcome: Result<String, Error>,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Ok(value) => write!(f, "{}: {value}", self.scenario.name()),
            Err(error) => {
                let rendered = error.to_string().replace('\n', " | ");
                write!(f, "{}: error: {rendered}", self.scenario.name())
            }
        }
    }
}

pub async fn run_all(scenarios: &[Scenario], demo: &DemoConfig) -> Vec<Report> {
    let mut reports = Vec::with_capacity(scenarios.len());
    for &scenario in scenarios {
        tracing::debug!(scenario = scenario.name(), "Running scenario");
        let outcome = scenario.run(demo).await;
        reports.push(Report { scenario, outcome });
    }
    reports
}
