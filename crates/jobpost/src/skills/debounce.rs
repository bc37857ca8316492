//! Quiescence-based debouncing for skill searches.
//!
//! Each [`schedule`](SearchDebouncer::schedule) aborts the previous timer, so
//! only the last query typed within the window reaches the server. Outcomes
//! come back over a channel tagged with their [`SearchTicket`]; deciding
//! whether an outcome is still current is left to the picker.

use std::future::{poll_fn, Future};
use std::pin::Pin;
use std::sync::Arc;
use std::task::Poll;
use std::time::Duration;

use log::{debug, warn};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::Instrument;

use super::SearchTicket;
use crate::api::{ApiError, JobsApi, Skill};

pub const DEFAULT_WINDOW: Duration = Duration::from_millis(300);

#[derive(Debug)]
pub struct SkillSearchOutcome {
    pub ticket: SearchTicket,
    pub result: Result<Vec<Skill>, ApiError>,
}

pub struct SearchDebouncer {
    api: Arc<dyn JobsApi>,
    window: Duration,
    pending: Option<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<SkillSearchOutcome>,
    rx: mpsc::UnboundedReceiver<SkillSearchOutcome>,
}

impl SearchDebouncer {
    pub fn new(api: Arc<dyn JobsApi>, window: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            api,
            window,
            pending: None,
            tx,
            rx,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Restarts the quiet period for `ticket`. Must be called inside a tokio
    /// runtime.
    pub fn schedule(&mut self, ticket: SearchTicket) {
        self.cancel();

        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        let deadline = tokio::time::Instant::now() + self.window;
        let span = tracing::info_span!(
            "skill_search",
            generation = ticket.generation,
            query_len = ticket.query.chars().count()
        );

        self.pending = Some(tokio::spawn(
            async move {
                tokio::time::sleep_until(deadline).await;
                debug!("Searching skills for '{}'", ticket.query);
                let result = api.search_skills(&ticket.query, &ticket.category_id).await;
                // The receiver lives as long as the debouncer; a send failure
                // only means it was dropped mid-flight.
                let _ = tx.send(SkillSearchOutcome { ticket, result });
            }
            .instrument(span),
        ));
    }

    /// Drops the pending timer or in-flight request, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn try_next(&mut self) -> Option<SkillSearchOutcome> {
        self.rx.try_recv().ok()
    }

    /// Waits for the next outcome. Resolves to `None` when nothing is
    /// scheduled, or when the search task ended without sending one.
    pub async fn next(&mut self) -> Option<SkillSearchOutcome> {
        poll_fn(|cx| {
            if let Poll::Ready(outcome) = self.rx.poll_recv(cx) {
                return Poll::Ready(outcome);
            }
            let Some(handle) = self.pending.as_mut() else {
                return Poll::Ready(None);
            };
            match Pin::new(handle).poll(cx) {
                Poll::Pending => Poll::Pending,
                Poll::Ready(joined) => {
                    self.pending = None;
                    if let Err(e) = joined {
                        warn!("Skill search task ended early: {}", e);
                    }
                    // A task that sent right before finishing.
                    Poll::Ready(self.rx.try_recv().ok())
                }
            }
        })
        .await
    }
}

impl Drop for SearchDebouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
