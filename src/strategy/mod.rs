//! Execution strategies for transfer runs.
//!
//! A run is a set of independent units (one collection on export, one file on
//! import). The strategy decides how units are fanned out and how much of a
//! unit is held in memory:
//!
//! - `Concurrent`: one tokio task per unit, unit contents materialized before
//!   the single write/insert call
//! - `SequentialPipelined`: units strictly in enumeration order, records
//!   streamed lazily within a unit, one bulk call per unit
//! - `ImperativeStreaming`: units in order, every record written/inserted
//!   individually as it is produced
//!
//! There is no cancellation or timeout facility; a run proceeds to
//! completion or failure.

use std::{fmt, future::Future, io, str::FromStr};

use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tracing::warn;

use crate::error::{ImexError, Result};

/// The three interchangeable execution policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Worker-parallel: one task per unit, results awaited collectively.
    Concurrent,

    /// Single-threaded, lazily streaming within each unit.
    SequentialPipelined,

    /// Single-threaded, single-record store/file calls.
    ImperativeStreaming,
}

/// Per-unit batching behavior implied by a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Batching {
    /// Build the unit's full record set in memory, then one write/insert call.
    Materialized,

    /// Stream records lazily, one bulk write/insert call per unit.
    Pipelined,

    /// One write/insert call per record, nothing materialized.
    PerRecord,
}

impl Strategy {
    /// All strategies, in benchmark order.
    pub const ALL: [Strategy; 3] = [
        Strategy::Concurrent,
        Strategy::SequentialPipelined,
        Strategy::ImperativeStreaming,
    ];

    /// Batching behavior a unit handler should apply under this strategy.
    pub fn batching(self) -> Batching {
        match self {
            Strategy::Concurrent => Batching::Materialized,
            Strategy::SequentialPipelined => Batching::Pipelined,
            Strategy::ImperativeStreaming => Batching::PerRecord,
        }
    }

    /// Run one handler over every unit according to this strategy.
    ///
    /// Under `Concurrent`, every unit is spawned as its own task and all
    /// tasks are awaited before returning; a failed unit does not cancel its
    /// siblings, and the first failure is returned once every task has
    /// finished. The sequential strategies process units in the given order
    /// and fail fast on the first error.
    pub async fn run_units<U, F, Fut>(self, units: Vec<U>, handler: F) -> Result<()>
    where
        U: Send + 'static,
        F: Fn(U) -> Fut + Clone + Send + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        match self {
            Strategy::Concurrent => {
                let mut tasks = JoinSet::new();
                for unit in units {
                    let handler = handler.clone();
                    tasks.spawn(async move { handler(unit).await });
                }

                let mut first_error: Option<ImexError> = None;
                while let Some(joined) = tasks.join_next().await {
                    match joined {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => {
                            warn!("Unit failed: {}", e);
                            first_error.get_or_insert(e);
                        }
                        Err(e) => {
                            warn!("Unit task panicked: {}", e);
                            first_error.get_or_insert(ImexError::Io(io::Error::other(e)));
                        }
                    }
                }

                match first_error {
                    Some(e) => Err(e),
                    None => Ok(()),
                }
            }
            Strategy::SequentialPipelined | Strategy::ImperativeStreaming => {
                for unit in units {
                    handler(unit).await?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::Concurrent => "concurrent",
            Strategy::SequentialPipelined => "sequential-pipelined",
            Strategy::ImperativeStreaming => "imperative-streaming",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "concurrent" => Ok(Strategy::Concurrent),
            "sequential-pipelined" => Ok(Strategy::SequentialPipelined),
            "imperative-streaming" => Ok(Strategy::ImperativeStreaming),
            other => Err(format!(
                "unknown strategy '{}' (expected concurrent, sequential-pipelined or imperative-streaming)",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn test_sequential_preserves_unit_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();

        Strategy::SequentialPipelined
            .run_units(vec![1, 2, 3, 4], move |n| {
                let seen = seen_clone.clone();
                async move {
                    seen.lock().unwrap().push(n);
                    Ok(())
                }
            })
            .await
            .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_sequential_fails_fast() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();

        let result = Strategy::ImperativeStreaming
            .run_units(vec![1, 2, 3], move |n| {
                let seen = seen_clone.clone();
                async move {
                    if n == 2 {
                        return Err(ImexError::Precondition("boom".to_string()));
                    }
                    seen.lock().unwrap().push(n);
                    Ok(())
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(*seen.lock().unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn test_concurrent_runs_all_units_despite_failure() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();

        let result = Strategy::Concurrent
            .run_units(vec![1, 2, 3, 4], move |n| {
                let seen = seen_clone.clone();
                async move {
                    if n == 2 {
                        return Err(ImexError::Precondition("boom".to_string()));
                    }
                    seen.lock().unwrap().push(n);
                    Ok(())
                }
            })
            .await;

        // The failure is reported, but every sibling still ran.
        assert!(result.is_err());
        let mut seen = seen.lock().unwrap().clone();
        seen.sort();
        assert_eq!(seen, vec![1, 3, 4]);
    }

    #[tokio::test]
    async fn test_concurrent_empty_unit_set() {
        let result = Strategy::Concurrent
            .run_units(Vec::<u32>::new(), |_| async { Ok(()) })
            .await;
        assert!(result.is_ok());
    }

    #[test]
    fn test_batching_per_strategy() {
        assert_eq!(Strategy::Concurrent.batching(), Batching::Materialized);
        assert_eq!(
            Strategy::SequentialPipelined.batching(),
            Batching::Pipelined
        );
        assert_eq!(
            Strategy::ImperativeStreaming.batching(),
            Batching::PerRecord
        );
    }

    #[test]
    fn test_parse_round_trip() {
        for strategy in Strategy::ALL {
            assert_eq!(strategy.to_string().parse::<Strategy>(), Ok(strategy));
        }
        assert!("fastest".parse::<Strategy>().is_err());
    }
}
