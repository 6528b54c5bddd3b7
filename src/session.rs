// Search session ownership. The session is an immutable value object
// (criteria + result status) replaced wholesale on every new search; the
// owner enforces last-request-wins and aborts the superseded in-flight
// request instead of letting a stale response land.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use futures::future::{AbortHandle, Abortable};
use tracing::{debug, info};

use crate::client::FlightApi;
use crate::model::{FlightOffer, SearchCriteria};

#[derive(Debug, Clone, PartialEq)]
pub enum SessionStatus {
    /// Request issued, response not yet in.
    Pending,
    Ready {
        offers: Vec<FlightOffer>,
        /// Raw objects dropped during normalization, for the
        /// "N offers skipped" diagnostic.
        skipped: usize,
    },
    Failed {
        message: String,
    },
}

/// Snapshot of one search: what was asked and where it stands. Never
/// mutated; the owner swaps in a new value on every transition.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSession {
    pub criteria: SearchCriteria,
    pub status: SessionStatus,
}

/// The single component allowed to replace the current session. Holds at
/// most one in-flight request; a new search aborts the previous one and
/// stale responses are discarded by generation check.
pub struct SessionOwner {
    api: Arc<dyn FlightApi>,
    generation: AtomicU64,
    // The generation that produced the stored session lives under the same
    // lock as the session itself, so the staleness check and the write are
    // one atomic step.
    current: Mutex<(u64, Option<SearchSession>)>,
    in_flight: Mutex<Option<AbortHandle>>,
}

impl SessionOwner {
    pub fn new(api: Arc<dyn FlightApi>) -> Self {
        Self {
            api,
            generation: AtomicU64::new(0),
            current: Mutex::new((0, None)),
            in_flight: Mutex::new(None),
        }
    }

    /// Snapshot of the current session, if any search has been issued.
    pub fn session(&self) -> Option<SearchSession> {
        self.current.lock().expect("session lock poisoned").1.clone()
    }

    /// Abort any in-flight request and drop the session (user navigated
    /// away or reset the form).
    pub fn clear(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(handle) = self.in_flight.lock().expect("abort lock poisoned").take() {
            handle.abort();
        }
        *self.current.lock().expect("session lock poisoned") = (generation, None);
    }

    /// Run a search. Supersedes and aborts any request still in flight;
    /// if this search is itself superseded before its response arrives,
    /// the response is discarded and the newer session wins.
    ///
    /// Returns the current session snapshot after this search settles,
    /// which may belong to a newer search.
    pub async fn search(&self, criteria: SearchCriteria) -> SearchSession {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let (abort_handle, abort_registration) = AbortHandle::new_pair();
        if let Some(previous) = self
            .in_flight
            .lock()
            .expect("abort lock poisoned")
            .replace(abort_handle)
        {
            debug!("aborting superseded in-flight search");
            previous.abort();
        }

        let pending = SearchSession {
            criteria: criteria.clone(),
            status: SessionStatus::Pending,
        };
        self.install(generation, pending.clone());

        let request = Abortable::new(self.api.search_flights(&criteria), abort_registration);
        match request.await {
            Ok(Ok(batch)) => {
                info!(offers = batch.offers.len(), skipped = batch.skipped, "search completed");
                self.install(
                    generation,
                    SearchSession {
                        criteria,
                        status: SessionStatus::Ready {
                            offers: batch.offers,
                            skipped: batch.skipped,
                        },
                    },
                );
            }
            Ok(Err(err)) => {
                self.install(
                    generation,
                    SearchSession {
                        criteria,
                        status: SessionStatus::Failed {
                            message: err.to_string(),
                        },
                    },
                );
            }
            Err(_aborted) => {
                debug!("search aborted by a newer request");
            }
        }

        self.session().unwrap_or(pending)
    }

    // Only a generation at least as new as the stored one may replace the
    // session; a stale writer that raced past its response cannot overwrite
    // a newer search's state.
    fn install(&self, generation: u64, session: SearchSession) {
        let mut current = self.current.lock().expect("session lock poisoned");
        if generation < current.0 {
            debug!("discarding stale search result");
            return;
        }
        *current = (generation, Some(session));
    }
}
