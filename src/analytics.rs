//! Search analytics: one event per completed search, sent over a channel.

use extrachill_search::{SearchError, SearchListener, SearchPerformed};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Event type recorded for searches.
pub const SEARCH_EVENT: &str = "search";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchEventData {
    pub search_term: String,
    pub result_count: usize,
}

/// One analytics record, as the analytics sink stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub event_type: String,
    pub event_data: SearchEventData,
    #[serde(default)]
    pub source_url: Option<String>,
}

/// Forwards completed searches to a bounded channel.
///
/// Blank terms are not recorded. A full queue is reported as a listener
/// failure; a closed receiver is ignored.
#[derive(Debug, Clone)]
pub struct AnalyticsRecorder {
    tx: mpsc::Sender<AnalyticsEvent>,
}

impl AnalyticsRecorder {
    /// Create a recorder and the receiver its events arrive on.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<AnalyticsEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

impl SearchListener for AnalyticsRecorder {
    fn search_performed(&self, event: &SearchPerformed) -> Result<(), SearchError> {
        let term = event.term.trim();
        if term.is_empty() {
            return Ok(());
        }
        let record = AnalyticsEvent {
            event_type: SEARCH_EVENT.to_owned(),
            event_data: SearchEventData {
                search_term: term.to_owned(),
                result_count: event.total,
            },
            source_url: event.referer.clone(),
        };
        match self.tx.try_send(record) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(SearchError::Source("analytics queue full".into())),
            Err(TrySendError::Closed(_)) => {
                tracing::debug!("analytics receiver closed; event dropped");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn performed(term: &str, total: usize) -> SearchPerformed {
        SearchPerformed {
            term: term.into(),
            total,
            referer: Some("https://extrachill.com/search".into()),
        }
    }

    #[test]
    fn records_search_with_count_and_source() {
        let (recorder, mut rx) = AnalyticsRecorder::channel(4);
        recorder.search_performed(&performed(" jazz ", 12)).expect("send");
        let event = rx.try_recv().expect("event");
        assert_eq!(event.event_type, "search");
        assert_eq!(event.event_data.search_term, "jazz");
        assert_eq!(event.event_data.result_count, 12);
        assert_eq!(event.source_url.as_deref(), Some("https://extrachill.com/search"));
    }

    #[test]
    fn blank_terms_not_recorded() {
        let (recorder, mut rx) = AnalyticsRecorder::channel(4);
        recorder.search_performed(&performed("   ", 3)).expect("skip");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn full_queue_reported_closed_receiver_ignored() {
        let (recorder, rx) = AnalyticsRecorder::channel(1);
        recorder.search_performed(&performed("a", 1)).expect("first fits");
        assert!(recorder.search_performed(&performed("b", 1)).is_err());

        drop(rx);
        assert!(recorder.search_performed(&performed("c", 1)).is_ok());
    }

    #[test]
    fn event_serializes_in_sink_shape() {
        let event = AnalyticsEvent {
            event_type: SEARCH_EVENT.into(),
            event_data: SearchEventData {
                search_term: "jazz".into(),
                result_count: 2,
            },
            source_url: None,
        };
        let json = serde_json::to_value(&event).expect("serialize");
        assert_eq!(json["event_data"]["search_term"], "jazz");
        assert_eq!(json["event_type"], "search");
    }
}
