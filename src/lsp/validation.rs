//! Debounced background validation.
//!
//! Each open document cycles through Idle → Scheduled → Validating →
//! Idle. Scheduling cancels and replaces any pending timer for the
//! document, so a burst of edits collapses into one formatter run. The
//! document text is captured at schedule time: if the document changes
//! again, the superseding schedule carries the newer text and a higher
//! sequence number.
//!
//! # Ordering
//!
//! Validations run concurrently with new edits, so a slow run against
//! stale content can finish after a faster run against fresher content.
//! Every request is tagged with a per-document monotonically increasing
//! sequence number, and a completion whose sequence is not above the
//! highest already applied is discarded. Superseded formatter processes
//! are not killed; debouncing bounds how many can be in flight.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::task::AbortHandle;
use tower_lsp_server::Client;
use tower_lsp_server::ls_types::{Diagnostic, Uri};
use url::Url;

use crate::error::FormatError;
use crate::formatter::{FormatOutcome, FormatRequest, invoke, parse_stderr};

use super::diagnostics::{DiagnosticsStore, into_diagnostics};

const LOG_TARGET: &str = "seisho::validation";

/// Everything a scheduled validation needs, captured when it is scheduled.
pub(crate) struct ValidationContext {
    /// Document URI used for internal state keys
    pub(crate) uri: Url,
    /// The same URI in LSP form, for publishing
    pub(crate) lsp_uri: Uri,
    /// Document text snapshot
    pub(crate) text: String,
    /// Directory the formatter runs in (the document's parent, if local)
    pub(crate) working_dir: Option<PathBuf>,
    pub(crate) command: String,
    pub(crate) args: Vec<String>,
    pub(crate) client: Client,
    pub(crate) store: Arc<DiagnosticsStore>,
}

/// Per-document scheduling state.
///
/// At most one pending timer exists per document; a new schedule aborts
/// the previous one before it fires.
#[derive(Default)]
struct DocumentValidation {
    timer: Option<AbortHandle>,
    next_seq: u64,
    last_applied: u64,
}

/// Debounce timers and sequence bookkeeping for all open documents.
///
/// State is created when a document is first tracked (didOpen) and torn
/// down at close; a result arriving for an untracked document is a no-op.
#[derive(Default)]
pub(crate) struct ValidationScheduler {
    documents: DashMap<Url, DocumentValidation>,
}

impl ValidationScheduler {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Start tracking a document (didOpen).
    pub(crate) fn track(&self, uri: Url) {
        self.documents.entry(uri).or_default();
    }

    /// Stop tracking a document (didClose): cancel any pending timer and
    /// drop the state so a later-arriving in-flight result cannot apply.
    pub(crate) fn discard(&self, uri: &Url) {
        if let Some((_, state)) = self.documents.remove(uri)
            && let Some(timer) = state.timer
        {
            timer.abort();
            log::trace!(target: LOG_TARGET, "cancelled timer for closed {uri}");
        }
    }

    /// Cancel every pending timer (server shutdown).
    pub(crate) fn cancel_all(&self) {
        for mut entry in self.documents.iter_mut() {
            if let Some(timer) = entry.timer.take() {
                timer.abort();
            }
        }
        log::debug!(target: LOG_TARGET, "cancelled all pending timers");
    }

    /// Schedule a validation for a document after `delay`.
    ///
    /// Replaces any pending timer for the document. The request is issued
    /// with the next sequence number immediately, so even if an older
    /// validation is still in flight, its eventual result cannot override
    /// this one.
    pub(crate) fn schedule(self: Arc<Self>, ctx: ValidationContext, delay: Duration) {
        let uri = ctx.uri.clone();
        let scheduler = Arc::clone(&self);
        let issued = self.issue_and_arm(&uri, |seq| {
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                log::debug!(
                    target: LOG_TARGET,
                    "debounce expired for {} (seq {seq})",
                    ctx.uri
                );
                scheduler.run(ctx, seq).await;
            })
            .abort_handle()
        });
        if issued.is_none() {
            log::trace!(target: LOG_TARGET, "not tracking {uri}, skipping validation");
        }
    }

    /// Cancel the pending timer, hand out the next sequence number, and
    /// store the replacement timer from `arm`, all under one map guard:
    /// concurrent schedules for the same document serialize here, so the
    /// stored handle is always the latest armed timer and the replaced one
    /// is aborted, never orphaned. Returns None for untracked (closed)
    /// documents without calling `arm`.
    fn issue_and_arm(&self, uri: &Url, arm: impl FnOnce(u64) -> AbortHandle) -> Option<u64> {
        let mut state = self.documents.get_mut(uri)?;
        if let Some(timer) = state.timer.take() {
            timer.abort();
            log::trace!(target: LOG_TARGET, "replaced pending timer for {uri}");
        }
        state.next_seq += 1;
        let seq = state.next_seq;
        state.timer = Some(arm(seq));
        Some(seq)
    }

    /// Record a completion. Returns true when the result may be applied:
    /// the document is still tracked and no newer result has been applied.
    fn try_apply(&self, uri: &Url, seq: u64) -> bool {
        match self.documents.get_mut(uri) {
            Some(mut state) if seq > state.last_applied => {
                state.last_applied = seq;
                true
            }
            Some(_) => false,
            None => false,
        }
    }

    /// Run the formatter and publish the resulting diagnostic state.
    async fn run(self: Arc<Self>, ctx: ValidationContext, seq: u64) {
        let request = FormatRequest::new(ctx.text).with_working_dir(ctx.working_dir);
        // Background mode: stdout is discarded, only stderr and the exit
        // code matter.
        let outcome = invoke(&request, &ctx.command, &ctx.args).await;
        let diagnostics = diagnostics_for_outcome(&ctx.uri, outcome);

        if !self.try_apply(&ctx.uri, seq) {
            log::trace!(
                target: LOG_TARGET,
                "discarding superseded result for {} (seq {seq})",
                ctx.uri
            );
            return;
        }

        log::debug!(
            target: LOG_TARGET,
            "publishing {} diagnostics for {} (seq {seq})",
            diagnostics.len(),
            ctx.uri
        );
        ctx.store.set(&ctx.uri, diagnostics.clone());
        ctx.client
            .publish_diagnostics(ctx.lsp_uri, diagnostics, None)
            .await;
    }

    #[cfg(test)]
    fn has_pending_timer(&self, uri: &Url) -> bool {
        self.documents
            .get(uri)
            .and_then(|state| state.timer.as_ref().map(|t| !t.is_finished()))
            .unwrap_or(false)
    }
}

/// Map a formatter outcome to the diagnostic state to publish.
///
/// Exit 0 clears, positional errors replace, everything else clears:
/// unknown-shape stderr is unrenderable noise and a spawn failure must
/// not become a popup per keystroke. Both still reset any previously
/// published errors rather than leaving them stale.
pub(crate) fn diagnostics_for_outcome(
    uri: &Url,
    outcome: Result<FormatOutcome, FormatError>,
) -> Vec<Diagnostic> {
    match outcome {
        Ok(FormatOutcome::Formatted(_)) => Vec::new(),
        Ok(FormatOutcome::Failed { stderr, exit_code }) => {
            let errors = parse_stderr(&stderr);
            if errors.is_empty() {
                log::debug!(
                    target: LOG_TARGET,
                    "unparseable formatter stderr for {uri} (status {exit_code})"
                );
                Vec::new()
            } else {
                into_diagnostics(errors)
            }
        }
        Err(err) => {
            log::warn!(
                target: LOG_TARGET,
                "background validation for {uri} failed: {err}"
            );
            Vec::new()
        }
    }
}
