//! Fetch orchestration.
//!
//! [`Orchestrator`] owns the item list, the loading flag and the error
//! message for one [`Source`]. It is the only writer of that state; views
//! read snapshots through [`Orchestrator::snapshot`] or a watch channel from
//! [`Orchestrator::subscribe`].
//!
//! ```text
//! Idle | Loaded | Failed --refresh--> Loading --ok------> Loaded
//!                                        |------error---> Failed
//!                                        '------cancel--> previous resting state
//! ```
//!
//! Each fetch runs on its own task with a [`CancellationToken`]. A fetch only
//! applies its result if it is still the current in-flight fetch when it
//! completes, so a superseded or timed-out response never overwrites newer
//! state.

mod policy;

pub use policy::{BusyPolicy, RefreshPolicy, DEFAULT_DEADLINE, DEFAULT_DEBOUNCE};

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::app::NewsumError;
use crate::client::Source;
use crate::domain::{FetchState, Phase};

/// Result of one trigger, as seen by the caller that issued it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Loaded { count: usize },
    Failed { message: String },
    /// Superseded or aborted; state was left alone.
    Cancelled,
    /// A fetch was already in flight; no request was made.
    AlreadyLoading,
    /// The deadline passed first. State is `Failed`.
    TimedOut,
    /// A newer debounced trigger replaced this one.
    Debounced,
}

struct InFlight {
    id: u64,
    cancel: CancellationToken,
    /// Where a cancelled fetch returns to
    resume: Phase,
}

struct Ticket {
    id: u64,
    cancel: CancellationToken,
}

struct Control<T> {
    phase: Phase,
    items: Arc<[T]>,
    in_flight: Option<InFlight>,
    next_id: u64,
    pending_debounce: Option<(u64, CancellationToken)>,
}

impl<T> Control<T> {
    fn resting_phase(&self) -> Phase {
        match &self.phase {
            Phase::Idle => Phase::Idle,
            Phase::Loaded => Phase::Loaded,
            // A cancelled retry after a failure shows whatever is on screen
            Phase::Failed(_) | Phase::Loading => {
                if self.items.is_empty() {
                    Phase::Idle
                } else {
                    Phase::Loaded
                }
            }
        }
    }

    fn take_current(&mut self, id: u64) -> Option<InFlight> {
        match self.in_flight.take() {
            Some(flight) if flight.id == id => Some(flight),
            other => {
                self.in_flight = other;
                None
            }
        }
    }

    fn bump(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

struct Inner<S: Source> {
    source: S,
    policy: RefreshPolicy,
    control: Mutex<Control<S::Item>>,
    state_tx: watch::Sender<FetchState<S::Item>>,
}

impl<S: Source> Inner<S> {
    /// Publish while holding the lock so observers see transitions in order.
    fn publish(&self, control: &Control<S::Item>) {
        self.state_tx.send_replace(FetchState::project(
            control.items.clone(),
            control.phase.clone(),
        ));
    }

    fn begin(&self) -> Option<Ticket> {
        let mut control = self.control.lock();

        let resume = match control.in_flight.take() {
            None => control.resting_phase(),
            Some(current) => match self.policy.on_busy {
                BusyPolicy::Coalesce => {
                    debug!(in_flight = current.id, "Already loading; ignoring duplicate request");
                    control.in_flight = Some(current);
                    return None;
                }
                BusyPolicy::Supersede => {
                    info!(superseded = current.id, "Superseding in-flight fetch");
                    current.cancel.cancel();
                    current.resume
                }
            },
        };

        let id = control.bump();
        let cancel = CancellationToken::new();
        control.in_flight = Some(InFlight {
            id,
            cancel: cancel.clone(),
            resume,
        });
        control.phase = Phase::Loading;
        self.publish(&control);

        debug!(id, "Fetch started");
        Some(Ticket { id, cancel })
    }

    fn finish(&self, id: u64, result: crate::app::Result<Vec<S::Item>>) -> RefreshOutcome {
        let mut control = self.control.lock();

        let Some(flight) = control.take_current(id) else {
            debug!(id, "Discarding result of a fetch that is no longer current");
            return RefreshOutcome::Cancelled;
        };

        let outcome = match result {
            Ok(items) => {
                let count = items.len();
                if items.is_empty() && self.policy.keep_on_empty && !control.items.is_empty() {
                    info!("Server returned no items; keeping the previous list");
                } else {
                    control.items = Arc::from(items);
                }
                control.phase = Phase::Loaded;
                info!(id, count, "Fetch complete");
                RefreshOutcome::Loaded { count }
            }
            Err(e) if e.is_cancellation() => {
                info!(id, "Fetch cancelled; preserving existing items");
                control.phase = flight.resume;
                RefreshOutcome::Cancelled
            }
            Err(e) => {
                let message = self.fail(&mut control, &e);
                RefreshOutcome::Failed { message }
            }
        };

        self.publish(&control);
        outcome
    }

    fn fail(&self, control: &mut Control<S::Item>, e: &NewsumError) -> String {
        match e {
            NewsumError::Decoding(detail) => {
                error!(%detail, "Could not decode the server response; the payload format may have changed");
            }
            other => warn!(error = %other, "Refresh failed"),
        }

        if self.policy.clear_on_error {
            control.items = Arc::from(Vec::new());
        }

        let message = e.user_message();
        control.phase = Phase::Failed(message.clone());
        message
    }

    /// Turn the current fetch into a timeout failure. Returns false if the
    /// fetch already finished or was replaced.
    fn expire(&self, id: u64, limit: Duration) -> bool {
        let mut control = self.control.lock();
        let Some(flight) = control.take_current(id) else {
            return false;
        };

        flight.cancel.cancel();
        self.fail(&mut control, &NewsumError::TimedOut(limit));
        self.publish(&control);
        true
    }

    fn cancel(&self) -> bool {
        let mut control = self.control.lock();

        if let Some((_, pending)) = control.pending_debounce.take() {
            pending.cancel();
        }

        let Some(flight) = control.in_flight.take() else {
            return false;
        };

        info!(id = flight.id, "Cancelling in-flight fetch");
        flight.cancel.cancel();
        control.phase = flight.resume;
        self.publish(&control);
        true
    }

    fn arm_debounce(&self) -> (u64, CancellationToken) {
        let mut control = self.control.lock();
        let id = control.bump();
        let token = CancellationToken::new();

        if let Some((previous, pending)) = control.pending_debounce.replace((id, token.clone())) {
            debug!(previous, "Replacing pending debounced refresh");
            pending.cancel();
        }

        (id, token)
    }

    fn disarm_debounce(&self, id: u64) {
        let mut control = self.control.lock();
        if matches!(control.pending_debounce, Some((pending, _)) if pending == id) {
            control.pending_debounce = None;
        }
    }
}

pub struct Orchestrator<S: Source> {
    inner: Arc<Inner<S>>,
}

impl<S: Source> Clone for Orchestrator<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S: Source> Orchestrator<S> {
    pub fn new(source: S, policy: RefreshPolicy) -> Self {
        let control = Control {
            phase: Phase::Idle,
            items: Arc::from(Vec::new()),
            in_flight: None,
            next_id: 0,
            pending_debounce: None,
        };
        let (state_tx, _) = watch::channel(FetchState::new());

        Self {
            inner: Arc::new(Inner {
                source,
                policy,
                control: Mutex::new(control),
                state_tx,
            }),
        }
    }

    pub fn policy(&self) -> &RefreshPolicy {
        &self.inner.policy
    }

    pub fn snapshot(&self) -> FetchState<S::Item> {
        self.inner.state_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState<S::Item>> {
        self.inner.state_tx.subscribe()
    }

    /// Fetch now, unless a fetch is already running and the busy policy
    /// says to coalesce.
    pub async fn refresh(&self) -> RefreshOutcome {
        let Some(ticket) = self.inner.begin() else {
            return RefreshOutcome::AlreadyLoading;
        };
        let id = ticket.id;
        let joined = self.spawn_fetch(ticket).await;
        self.settle(id, joined)
    }

    /// Like [`refresh`](Self::refresh) but gives up after `limit`. Giving up
    /// is a user-visible failure, unlike an ordinary cancellation.
    pub async fn refresh_with_timeout(&self, limit: Duration) -> RefreshOutcome {
        let Some(ticket) = self.inner.begin() else {
            return RefreshOutcome::AlreadyLoading;
        };
        let id = ticket.id;
        let mut handle = self.spawn_fetch(ticket);

        match tokio::time::timeout(limit, &mut handle).await {
            Ok(joined) => self.settle(id, joined),
            Err(_) => {
                if self.inner.expire(id, limit) {
                    warn!(id, ?limit, "Fetch timed out");
                    RefreshOutcome::TimedOut
                } else {
                    // Finished or replaced right at the deadline
                    let joined = handle.await;
                    self.settle(id, joined)
                }
            }
        }
    }

    /// [`refresh_with_timeout`](Self::refresh_with_timeout) with the policy
    /// deadline.
    pub async fn refresh_with_deadline(&self) -> RefreshOutcome {
        self.refresh_with_timeout(self.inner.policy.deadline).await
    }

    /// Schedule a refresh after the quiet interval. A newer call replaces
    /// any pending one, whose handle then resolves to
    /// [`RefreshOutcome::Debounced`].
    pub fn debounced_refresh(&self) -> JoinHandle<RefreshOutcome> {
        let (id, token) = self.inner.arm_debounce();
        let quiet = self.inner.policy.debounce;
        let this = self.clone();

        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => return RefreshOutcome::Debounced,
                _ = tokio::time::sleep(quiet) => {}
            }

            this.inner.disarm_debounce(id);
            this.refresh().await
        })
    }

    /// Abort the in-flight fetch and any pending debounced trigger. State
    /// returns to where it was before the fetch, without an error. Returns
    /// whether a fetch was running.
    pub fn cancel(&self) -> bool {
        self.inner.cancel()
    }

    fn spawn_fetch(&self, ticket: Ticket) -> JoinHandle<RefreshOutcome> {
        let inner = self.inner.clone();

        tokio::spawn(async move {
            let result = tokio::select! {
                biased;
                _ = ticket.cancel.cancelled() => Err(NewsumError::Cancelled),
                result = inner.source.load(&ticket.cancel) => result,
            };
            inner.finish(ticket.id, result)
        })
    }

    fn settle(&self, id: u64, joined: Result<RefreshOutcome, JoinError>) -> RefreshOutcome {
        match joined {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(id, error = %e, "Fetch task failed");
                self.inner
                    .finish(id, Err(NewsumError::Other(format!("fetch task failed: {}", e))))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::*;
    use crate::client::HeadlineClient;
    use crate::domain::Headline;
    use async_trait::async_trait;

    fn orchestrator(
        fetcher: Arc<ScriptedFetcher>,
        policy: RefreshPolicy,
    ) -> Orchestrator<HeadlineClient> {
        Orchestrator::new(headline_client(fetcher), policy)
    }

    async fn loaded_with_one(
        fetcher: &Arc<ScriptedFetcher>,
        policy: RefreshPolicy,
    ) -> Orchestrator<HeadlineClient> {
        fetcher.ok(ONE_HEADLINE);
        let orch = orchestrator(fetcher.clone(), policy);
        assert_eq!(orch.refresh().await, RefreshOutcome::Loaded { count: 1 });
        orch
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_success() {
        let fetcher = ScriptedFetcher::new();
        fetcher.ok(TWO_HEADLINES);
        let orch = orchestrator(fetcher.clone(), RefreshPolicy::default());

        assert_eq!(orch.snapshot().phase, Phase::Idle);
        assert_eq!(orch.refresh().await, RefreshOutcome::Loaded { count: 2 });

        let state = orch.snapshot();
        assert_eq!(state.phase, Phase::Loaded);
        assert!(!state.is_loading);
        assert_eq!(state.error_message, None);
        assert_eq!(state.items.len(), 2);
        assert_eq!(state.items[0].title, "B");
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loading_flag_while_in_flight() {
        let fetcher = ScriptedFetcher::new();
        fetcher.ok_after(ONE_HEADLINE, Duration::from_secs(1));
        let orch = orchestrator(fetcher, RefreshPolicy::default());

        let background = orch.clone();
        let task = tokio::spawn(async move { background.refresh().await });
        tokio::time::sleep(Duration::from_millis(10)).await;

        let state = orch.snapshot();
        assert!(state.is_loading);
        assert_eq!(state.phase, Phase::Loading);

        assert_eq!(task.await.unwrap(), RefreshOutcome::Loaded { count: 1 });
        assert!(!orch.snapshot().is_loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_refresh_makes_one_call() {
        let fetcher = ScriptedFetcher::new();
        fetcher.ok_after(ONE_HEADLINE, Duration::from_millis(100));
        fetcher.ok(TWO_HEADLINES);
        let orch = orchestrator(fetcher.clone(), RefreshPolicy::default());

        let (first, second) = tokio::join!(orch.refresh(), orch.refresh());

        assert_eq!(first, RefreshOutcome::Loaded { count: 1 });
        assert_eq!(second, RefreshOutcome::AlreadyLoading);
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_of_refreshes_shares_one_fetch() {
        let fetcher = ScriptedFetcher::new();
        fetcher.ok_after(TWO_HEADLINES, Duration::from_millis(100));
        let orch = orchestrator(fetcher.clone(), RefreshPolicy::default());

        let outcomes = futures::future::join_all((0..5).map(|_| orch.refresh())).await;

        let loaded = outcomes
            .iter()
            .filter(|o| **o == RefreshOutcome::Loaded { count: 2 })
            .count();
        let coalesced = outcomes
            .iter()
            .filter(|o| **o == RefreshOutcome::AlreadyLoading)
            .count();
        assert_eq!((loaded, coalesced), (1, 4));
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_200_preserves_items_and_sets_error() {
        let fetcher = ScriptedFetcher::new();
        let orch = loaded_with_one(&fetcher, RefreshPolicy::default()).await;

        fetcher.push(Reply::Status(500, "oops"), Duration::ZERO);
        let outcome = orch.refresh().await;
        assert!(matches!(outcome, RefreshOutcome::Failed { .. }));

        let state = orch.snapshot();
        assert_eq!(state.items.len(), 1);
        assert_eq!(state.items[0].title, "A");
        assert!(!state.is_loading);
        assert!(state.error_message.as_deref().is_some_and(|m| !m.is_empty()));
        assert!(matches!(state.phase, Phase::Failed(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_on_error_policy() {
        let fetcher = ScriptedFetcher::new();
        let policy = RefreshPolicy {
            clear_on_error: true,
            ..RefreshPolicy::default()
        };
        let orch = loaded_with_one(&fetcher, policy).await;

        fetcher.push(Reply::Unreachable, Duration::ZERO);
        orch.refresh().await;

        let state = orch.snapshot();
        assert!(state.items.is_empty());
        assert!(state.is_blank_failure());
    }

    #[tokio::test(start_paused = true)]
    async fn test_decoding_failure_is_user_visible() {
        let fetcher = ScriptedFetcher::new();
        fetcher.ok(r#"{"not":"an array"}"#);
        let orch = orchestrator(fetcher, RefreshPolicy::default());

        let outcome = orch.refresh().await;
        assert_eq!(
            outcome,
            RefreshOutcome::Failed {
                message: "Failed to process data from the server.".into()
            }
        );
        assert!(orch.snapshot().is_blank_failure());
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_after_failure_clears_error() {
        let fetcher = ScriptedFetcher::new();
        fetcher.push(Reply::Status(503, ""), Duration::ZERO);
        fetcher.ok(ONE_HEADLINE);
        let orch = orchestrator(fetcher, RefreshPolicy::default());

        orch.refresh().await;
        assert!(orch.snapshot().error_message.is_some());

        orch.refresh().await;
        let state = orch.snapshot();
        assert_eq!(state.error_message, None);
        assert_eq!(state.phase, Phase::Loaded);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_result_replaces_by_default() {
        let fetcher = ScriptedFetcher::new();
        let orch = loaded_with_one(&fetcher, RefreshPolicy::default()).await;

        fetcher.ok("[]");
        assert_eq!(orch.refresh().await, RefreshOutcome::Loaded { count: 0 });

        let state = orch.snapshot();
        assert!(state.items.is_empty());
        assert_eq!(state.phase, Phase::Loaded);
        assert_eq!(state.error_message, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_keep_on_empty_policy() {
        let fetcher = ScriptedFetcher::new();
        let policy = RefreshPolicy {
            keep_on_empty: true,
            ..RefreshPolicy::default()
        };
        let orch = loaded_with_one(&fetcher, policy).await;

        fetcher.ok("[]");
        assert_eq!(orch.refresh().await, RefreshOutcome::Loaded { count: 0 });
        assert_eq!(orch.snapshot().items.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_fails_and_ignores_late_response() {
        let fetcher = ScriptedFetcher::new();
        let orch = loaded_with_one(&fetcher, RefreshPolicy::default()).await;

        fetcher.ok_after(TWO_HEADLINES, Duration::from_secs(30));
        let outcome = orch.refresh_with_timeout(Duration::from_secs(10)).await;
        assert_eq!(outcome, RefreshOutcome::TimedOut);

        let state = orch.snapshot();
        assert!(!state.is_loading);
        assert!(state
            .error_message
            .as_deref()
            .is_some_and(|m| m.contains("timed out")));
        assert_eq!(state.items.len(), 1);

        tokio::time::sleep(Duration::from_secs(60)).await;

        let later = orch.snapshot();
        assert_eq!(later.phase, state.phase);
        assert_eq!(later.items.len(), 1);
        assert_eq!(later.items[0].title, "A");
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_within_deadline() {
        let fetcher = ScriptedFetcher::new();
        fetcher.ok_after(ONE_HEADLINE, Duration::from_secs(2));
        let orch = orchestrator(fetcher, RefreshPolicy::default());

        assert_eq!(
            orch.refresh_with_deadline().await,
            RefreshOutcome::Loaded { count: 1 }
        );
    }

    #[tokio::test]
    async fn test_deadline_longer_than_connect_timeout_is_honoured() {
        use crate::fetcher::http_fetcher::HttpFetcher;
        use crate::fetcher::Endpoint;
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/summary/headlines"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(ONE_HEADLINE)
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let endpoint = Endpoint::new(&format!("{}/api", server.uri())).unwrap();
        let fetcher = HttpFetcher::with_connect_timeout(Duration::from_millis(200)).unwrap();
        let client = HeadlineClient::new(Arc::new(fetcher), &endpoint).unwrap();
        let orch = Orchestrator::new(client, RefreshPolicy::default());

        let outcome = orch.refresh_with_timeout(Duration::from_secs(2)).await;
        assert_eq!(outcome, RefreshOutcome::TimedOut);
        assert_eq!(
            orch.snapshot().error_message.as_deref(),
            Some("The request timed out. Please try again.")
        );
    }

    /// Ignores its cancellation token entirely.
    struct StubbornSource {
        delay: Duration,
    }

    #[async_trait]
    impl Source for StubbornSource {
        type Item = Headline;

        async fn load(&self, _cancel: &CancellationToken) -> crate::app::Result<Vec<Headline>> {
            tokio::time::sleep(self.delay).await;
            crate::decoder::Decoder::new().decode_headlines(TWO_HEADLINES.as_bytes())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_with_source_that_ignores_cancellation() {
        let orch = Orchestrator::new(
            StubbornSource {
                delay: Duration::from_secs(30),
            },
            RefreshPolicy::default(),
        );

        let outcome = orch.refresh_with_timeout(Duration::from_secs(1)).await;
        assert_eq!(outcome, RefreshOutcome::TimedOut);

        tokio::time::sleep(Duration::from_secs(60)).await;
        let state = orch.snapshot();
        assert!(state.items.is_empty());
        assert!(matches!(state.phase, Phase::Failed(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_reverts_without_error() {
        let fetcher = ScriptedFetcher::new();
        let orch = loaded_with_one(&fetcher, RefreshPolicy::default()).await;

        fetcher.ok_after(TWO_HEADLINES, Duration::from_secs(5));
        let background = orch.clone();
        let task = tokio::spawn(async move { background.refresh().await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(orch.snapshot().is_loading);

        assert!(orch.cancel());
        assert_eq!(task.await.unwrap(), RefreshOutcome::Cancelled);

        let state = orch.snapshot();
        assert_eq!(state.phase, Phase::Loaded);
        assert_eq!(state.error_message, None);
        assert_eq!(state.items.len(), 1);
        assert!(!orch.cancel());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_after_failure_returns_to_idle() {
        let fetcher = ScriptedFetcher::new();
        fetcher.push(Reply::Status(500, ""), Duration::ZERO);
        fetcher.ok_after(ONE_HEADLINE, Duration::from_secs(5));
        let orch = orchestrator(fetcher, RefreshPolicy::default());
        orch.refresh().await;

        let background = orch.clone();
        let task = tokio::spawn(async move { background.refresh().await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        orch.cancel();
        task.await.unwrap();

        let state = orch.snapshot();
        assert_eq!(state.phase, Phase::Idle);
        assert_eq!(state.error_message, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_supersede_policy_discards_older_response() {
        let fetcher = ScriptedFetcher::new();
        fetcher.ok_after(ONE_HEADLINE, Duration::from_secs(5));
        fetcher.ok_after(TWO_HEADLINES, Duration::from_millis(10));
        let policy = RefreshPolicy {
            on_busy: BusyPolicy::Supersede,
            ..RefreshPolicy::default()
        };
        let orch = orchestrator(fetcher.clone(), policy);

        let background = orch.clone();
        let first = tokio::spawn(async move { background.refresh().await });
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(orch.refresh().await, RefreshOutcome::Loaded { count: 2 });
        assert_eq!(first.await.unwrap(), RefreshOutcome::Cancelled);
        assert_eq!(fetcher.calls(), 2);

        tokio::time::sleep(Duration::from_secs(10)).await;
        let state = orch.snapshot();
        assert_eq!(state.items.len(), 2);
        assert_eq!(state.phase, Phase::Loaded);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_coalesces_rapid_triggers() {
        let fetcher = ScriptedFetcher::new();
        fetcher.ok(ONE_HEADLINE);
        let orch = orchestrator(fetcher.clone(), RefreshPolicy::default());

        let first = orch.debounced_refresh();
        let second = orch.debounced_refresh();
        let third = orch.debounced_refresh();

        assert_eq!(first.await.unwrap(), RefreshOutcome::Debounced);
        assert_eq!(second.await.unwrap(), RefreshOutcome::Debounced);
        assert_eq!(third.await.unwrap(), RefreshOutcome::Loaded { count: 1 });
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_waits_for_quiet_interval() {
        let fetcher = ScriptedFetcher::new();
        fetcher.ok(ONE_HEADLINE);
        let orch = orchestrator(fetcher.clone(), RefreshPolicy::default());

        let handle = orch.debounced_refresh();
        tokio::time::sleep(Duration::from_millis(499)).await;
        assert_eq!(fetcher.calls(), 0);
        assert_eq!(orch.snapshot().phase, Phase::Idle);

        assert_eq!(handle.await.unwrap(), RefreshOutcome::Loaded { count: 1 });
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_trigger_inside_window_restarts_it() {
        let fetcher = ScriptedFetcher::new();
        fetcher.ok(ONE_HEADLINE);
        let orch = orchestrator(fetcher.clone(), RefreshPolicy::default());

        let early = orch.debounced_refresh();
        tokio::time::sleep(Duration::from_millis(300)).await;
        let late = orch.debounced_refresh();
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(early.await.unwrap(), RefreshOutcome::Debounced);
        assert_eq!(fetcher.calls(), 0);
        assert_eq!(late.await.unwrap(), RefreshOutcome::Loaded { count: 1 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending_debounce() {
        let fetcher = ScriptedFetcher::new();
        let orch = orchestrator(fetcher.clone(), RefreshPolicy::default());

        let pending = orch.debounced_refresh();
        assert!(!orch.cancel());
        assert_eq!(pending.await.unwrap(), RefreshOutcome::Debounced);
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_transitions() {
        let fetcher = ScriptedFetcher::new();
        fetcher.ok_after(ONE_HEADLINE, Duration::from_millis(50));
        let orch = orchestrator(fetcher, RefreshPolicy::default());
        let mut rx = orch.subscribe();

        let background = orch.clone();
        let task = tokio::spawn(async move { background.refresh().await });

        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_loading);

        rx.changed().await.unwrap();
        let state = rx.borrow_and_update().clone();
        assert!(!state.is_loading);
        assert_eq!(state.items.len(), 1);

        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_snapshots_are_not_affected_by_later_fetches() {
        let fetcher = ScriptedFetcher::new();
        let orch = loaded_with_one(&fetcher, RefreshPolicy::default()).await;
        let before = orch.snapshot();

        fetcher.ok(TWO_HEADLINES);
        orch.refresh().await;

        assert_eq!(before.items.len(), 1);
        assert_eq!(orch.snapshot().items.len(), 2);
    }
}
