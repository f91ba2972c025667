//! Analyzer page: input, the analyze action, and the state it renders from

use crate::grid::{Grid, Position};
use crate::notify::{
    Notification, Notifier, MSG_ANALYSIS_DONE, MSG_ANALYSIS_FAILED, MSG_EMPTY_URL,
};
use crate::provider::AnalysisProvider;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// How a single analysis invocation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisOutcome {
    /// Input was empty, nothing was sent
    Rejected,
    Succeeded,
    Failed,
}

/// Everything the page renders from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageState {
    /// Contents of the link input
    pub url: String,
    /// True while a request is outstanding
    pub is_analyzing: bool,
    /// Winning positions from the last resolved analysis
    pub positions: Vec<Position>,
    /// Summary shown under the grid
    pub result_text: String,
    /// Outcome of the last analysis that reached the service
    pub last_outcome: Option<AnalysisOutcome>,
}

impl PageState {
    pub fn grid(&self) -> Grid {
        Grid::from_positions(&self.positions)
    }

    /// The grid and result card are only shown once something was found
    pub fn has_results(&self) -> bool {
        !self.positions.is_empty()
    }
}

#[derive(Debug, Default)]
struct Inner {
    url: String,
    positions: Vec<Position>,
    result_text: String,
    last_outcome: Option<AnalysisOutcome>,
}

/// Decrements the in-flight counter on every exit path
struct BusyGuard<'a>(&'a AtomicUsize);

impl<'a> BusyGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// The analyzer page.
///
/// State is only changed by [`AnalyzerPage::analyze`] (and the input mirror
/// [`AnalyzerPage::set_url`]). Concurrent invocations are neither serialized
/// nor cancelled: whichever response resolves last overwrites the results.
pub struct AnalyzerPage {
    provider: Arc<dyn AnalysisProvider>,
    notifier: Arc<dyn Notifier>,
    state: Mutex<Inner>,
    in_flight: AtomicUsize,
}

impl AnalyzerPage {
    pub fn new(provider: Arc<dyn AnalysisProvider>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            provider,
            notifier,
            state: Mutex::new(Inner::default()),
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn provider(&self) -> &Arc<dyn AnalysisProvider> {
        &self.provider
    }

    /// Mirror of the input field
    pub fn set_url(&self, url: impl Into<String>) {
        self.lock().url = url.into();
    }

    pub fn is_analyzing(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub fn snapshot(&self) -> PageState {
        let inner = self.lock();
        PageState {
            url: inner.url.clone(),
            is_analyzing: self.is_analyzing(),
            positions: inner.positions.clone(),
            result_text: inner.result_text.clone(),
            last_outcome: inner.last_outcome,
        }
    }

    pub fn grid(&self) -> Grid {
        Grid::from_positions(&self.lock().positions)
    }

    /// Analyze whatever is currently in the input field
    pub async fn analyze_current(&self) -> AnalysisOutcome {
        let url = self.lock().url.clone();
        self.analyze(&url).await
    }

    /// Run one analysis invocation.
    ///
    /// Never returns an error: failures are reported through the notifier
    /// and leave the page idle with an empty grid.
    pub async fn analyze(&self, url: &str) -> AnalysisOutcome {
        self.set_url(url);

        if url.trim().is_empty() {
            debug!("Rejected empty url");
            self.notifier.notify(Notification::error(MSG_EMPTY_URL));
            return AnalysisOutcome::Rejected;
        }

        let _busy = BusyGuard::enter(&self.in_flight);
        {
            let mut inner = self.lock();
            inner.positions.clear();
            inner.result_text.clear();
        }

        info!(
            provider = self.provider.name(),
            endpoint = self.provider.endpoint(),
            url,
            "Requesting analysis"
        );

        match self.provider.analyze(url).await {
            Ok(result) => {
                let summary = result.summary();
                info!(positions = result.positions.len(), "Analysis succeeded");
                {
                    let mut inner = self.lock();
                    inner.positions = result.positions;
                    inner.result_text = summary;
                    inner.last_outcome = Some(AnalysisOutcome::Succeeded);
                }
                self.notifier.notify(Notification::success(MSG_ANALYSIS_DONE));
                AnalysisOutcome::Succeeded
            }
            Err(e) => {
                warn!(error = %e, "Analysis failed");
                {
                    let mut inner = self.lock();
                    inner.positions.clear();
                    inner.result_text.clear();
                    inner.last_outcome = Some(AnalysisOutcome::Failed);
                }
                self.notifier.notify(Notification::error(MSG_ANALYSIS_FAILED));
                AnalysisOutcome::Failed
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
