//! Post-search notifications for analytics and observability.
//!
//! Listeners run after the result is computed. A listener that errors or
//! panics is logged and skipped; it cannot change the result.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// Fired once per completed search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPerformed {
    /// The term as the caller sent it.
    pub term: String,
    /// Matching records across all sites, before windowing.
    pub total: usize,
    /// Page the search was issued from, if known.
    pub referer: Option<String>,
}

/// Receives [`SearchPerformed`] events.
///
/// Called synchronously on the searching task, so implementations should
/// hand work off (a channel send, a spawned task) rather than block.
pub trait SearchListener: Send + Sync {
    fn search_performed(&self, event: &SearchPerformed) -> Result<(), SearchError>;
}

/// Deliver `event` to every listener, isolating failures.
pub(crate) fn notify(listeners: &[Arc<dyn SearchListener>], event: &SearchPerformed) {
    for listener in listeners {
        match catch_unwind(AssertUnwindSafe(|| listener.search_performed(event))) {
            Ok(Ok(())) => {}
            Ok(Err(err)) => tracing::warn!(error = %err, "search listener failed"),
            Err(_) => tracing::warn!("search listener panicked"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<SearchPerformed>>,
    }

    impl SearchListener for Recorder {
        fn search_performed(&self, event: &SearchPerformed) -> Result<(), SearchError> {
            self.seen
                .lock()
                .map_err(|e| SearchError::Source(e.to_string()))?
                .push(event.clone());
            Ok(())
        }
    }

    struct Failing;

    impl SearchListener for Failing {
        fn search_performed(&self, _event: &SearchPerformed) -> Result<(), SearchError> {
            Err(SearchError::Source("sink offline".into()))
        }
    }

    struct Panicking;

    impl SearchListener for Panicking {
        fn search_performed(&self, _event: &SearchPerformed) -> Result<(), SearchError> {
            panic!("listener bug");
        }
    }

    fn event() -> SearchPerformed {
        SearchPerformed {
            term: "jazz".into(),
            total: 3,
            referer: Some("https://extrachill.com/".into()),
        }
    }

    #[test]
    fn every_listener_receives_event() {
        let a = Arc::new(Recorder::default());
        let b = Arc::new(Recorder::default());
        let listeners: Vec<Arc<dyn SearchListener>> = vec![a.clone(), b.clone()];
        notify(&listeners, &event());
        assert_eq!(a.seen.lock().expect("lock").len(), 1);
        assert_eq!(b.seen.lock().expect("lock")[0], event());
    }

    #[test]
    fn failing_and_panicking_listeners_do_not_stop_delivery() {
        let recorder = Arc::new(Recorder::default());
        let listeners: Vec<Arc<dyn SearchListener>> =
            vec![Arc::new(Failing), Arc::new(Panicking), recorder.clone()];
        notify(&listeners, &event());
        assert_eq!(recorder.seen.lock().expect("lock").len(), 1);
    }
}
