//! The capture → analyze → review → commit workflow.
//!
//! ```text
//! Idle ──capture──▶ Capturing ──▶ Analyzing ──ok──▶ Reviewing ──confirm──▶ Committed ──▶ Idle
//!                                     │                 │
//!                                     └──error──▶ Idle  └──cancel──▶ Idle
//! ```
//!
//! At most one workflow is active. The provisional entry lives only here
//! until it is confirmed, so aggregates never include it.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

use crate::clock::Clock;
use crate::gateway::{AnalysisGateway, GatewayError};
use crate::models::FoodEntry;
use crate::storage::KeyValueStore;
use crate::store::{EntryStore, PersistenceError};

/// Raw photo bytes as picked by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl CapturedImage {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    /// `data:` URI used as the entry's preview image.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }
}

/// Observable workflow phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Capturing,
    Analyzing,
    Reviewing,
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("An analysis is already in progress")]
    ConcurrentAnalysis,

    #[error("A meal is waiting to be saved or discarded")]
    ReviewPending,

    #[error("There is no analyzed meal to save")]
    NothingToReview,

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl SessionError {
    /// Only analysis failures are meant for the user; the rest are logged.
    pub fn is_user_visible(&self) -> bool {
        matches!(self, SessionError::Gateway(_))
    }
}

#[derive(Debug)]
enum State {
    Idle,
    Capturing,
    Analyzing { preview: String },
    Reviewing { entry: FoodEntry },
}

impl State {
    fn phase(&self) -> SessionPhase {
        match self {
            State::Idle => SessionPhase::Idle,
            State::Capturing => SessionPhase::Capturing,
            State::Analyzing { .. } => SessionPhase::Analyzing,
            State::Reviewing { .. } => SessionPhase::Reviewing,
        }
    }
}

/// Drives one capture workflow at a time against a gateway and a store.
///
/// The state lock is never held across an await, so the controller can be
/// shared between tasks behind an `Arc`.
pub struct SessionController<G, S> {
    gateway: G,
    store: Arc<EntryStore<S>>,
    clock: Arc<dyn Clock>,
    state: Mutex<State>,
}

impl<G, S> SessionController<G, S>
where
    G: AnalysisGateway,
    S: KeyValueStore,
{
    pub fn new(gateway: G, store: Arc<EntryStore<S>>, clock: Arc<dyn Clock>) -> Self {
        Self {
            gateway,
            store,
            clock,
            state: Mutex::new(State::Idle),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn phase(&self) -> SessionPhase {
        self.lock().phase()
    }

    /// The analyzed entry awaiting confirmation, if any.
    pub fn pending(&self) -> Option<FoodEntry> {
        match &*self.lock() {
            State::Reviewing { entry } => Some(entry.clone()),
            _ => None,
        }
    }

    /// Preview image of the photo being analyzed or reviewed.
    pub fn preview(&self) -> Option<String> {
        match &*self.lock() {
            State::Analyzing { preview } => Some(preview.clone()),
            State::Reviewing { entry } => entry.image_url.clone(),
            _ => None,
        }
    }

    pub fn store(&self) -> &Arc<EntryStore<S>> {
        &self.store
    }

    /// Sends the photo for analysis and holds the result for review.
    ///
    /// The entry's id and timestamp are assigned when the analysis
    /// succeeds. On failure the session goes back to idle and the gateway
    /// error is returned unchanged.
    pub async fn capture(&self, image: CapturedImage) -> Result<FoodEntry, SessionError> {
        let preview = {
            let mut state = self.lock();
            match *state {
                State::Capturing | State::Analyzing { .. } => {
                    tracing::debug!("Rejecting capture: analysis in progress");
                    return Err(SessionError::ConcurrentAnalysis);
                }
                State::Reviewing { .. } => return Err(SessionError::ReviewPending),
                State::Idle => {}
            }
            *state = State::Capturing;
            let preview = image.data_url();
            *state = State::Analyzing {
                preview: preview.clone(),
            };
            preview
        };

        let in_flight = InFlight {
            state: &self.state,
            done: false,
        };
        let result = self.gateway.analyze(&image.bytes, &image.mime_type).await;
        in_flight.finish();

        let mut state = self.lock();
        match result {
            Ok(food) => {
                let entry = FoodEntry::new(food, self.clock.now_millis()).with_image_url(preview);
                tracing::info!("Analyzed '{}' ({} kcal)", entry.name(), entry.nutrients().calories);
                *state = State::Reviewing {
                    entry: entry.clone(),
                };
                Ok(entry)
            }
            Err(e) => {
                tracing::warn!("Analysis failed: {}", e);
                *state = State::Idle;
                Err(SessionError::Gateway(e))
            }
        }
    }

    /// Commits the reviewed entry to the store.
    ///
    /// The session is idle afterwards even if persisting failed; in that
    /// case the entry is kept in memory and the error is returned.
    pub fn confirm(&self) -> Result<FoodEntry, SessionError> {
        let mut state = self.lock();
        let entry = match std::mem::replace(&mut *state, State::Idle) {
            State::Reviewing { entry } => entry,
            other => {
                *state = other;
                return Err(SessionError::NothingToReview);
            }
        };

        tracing::info!("Committing entry {}", entry.id);
        self.store.append(entry.clone())?;
        Ok(entry)
    }

    /// Discards the reviewed entry. Returns false when nothing was pending.
    pub fn cancel(&self) -> bool {
        let mut state = self.lock();
        match *state {
            State::Reviewing { .. } => {
                tracing::debug!("Discarding reviewed entry");
                *state = State::Idle;
                true
            }
            _ => false,
        }
    }
}

/// Resets the session to idle if the analyze future is dropped mid-flight.
struct InFlight<'a> {
    state: &'a Mutex<State>,
    done: bool,
}

impl InFlight<'_> {
    fn finish(mut self) {
        self.done = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.done {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if matches!(*state, State::Analyzing { .. }) {
                tracing::debug!("Analysis abandoned, returning to idle");
                *state = State::Idle;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::stats_for_today;
    use crate::clock::FixedClock;
    use crate::models::{FoodAnalysis, MacroNutrients};
    use crate::storage::MemoryStore;
    use crate::store::tests::ReadOnlyStore;
    use async_trait::async_trait;
    use chrono::{FixedOffset, TimeZone};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;

    struct FakeGateway {
        result: Result<FoodAnalysis, GatewayError>,
        calls: AtomicUsize,
    }

    impl FakeGateway {
        fn ok(food: FoodAnalysis) -> Self {
            Self {
                result: Ok(food),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(error: GatewayError) -> Self {
            Self {
                result: Err(error),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl AnalysisGateway for FakeGateway {
        async fn analyze(&self, _image: &[u8], _mime: &str) -> Result<FoodAnalysis, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    /// Holds every call until released.
    struct GatedGateway {
        release: Arc<Notify>,
    }

    #[async_trait]
    impl AnalysisGateway for GatedGateway {
        async fn analyze(&self, _image: &[u8], _mime: &str) -> Result<FoodAnalysis, GatewayError> {
            self.release.notified().await;
            Ok(lunch())
        }
    }

    /// Never answers.
    struct StalledGateway;

    #[async_trait]
    impl AnalysisGateway for StalledGateway {
        async fn analyze(&self, _image: &[u8], _mime: &str) -> Result<FoodAnalysis, GatewayError> {
            std::future::pending().await
        }
    }

    fn lunch() -> FoodAnalysis {
        FoodAnalysis::new("Frango grelhado", MacroNutrients::new(500, 30, 40, 20), "Equilibrado")
    }

    fn clock() -> Arc<FixedClock> {
        let offset = FixedOffset::west_opt(3 * 3600).unwrap();
        Arc::new(FixedClock::at(
            offset.with_ymd_and_hms(2025, 3, 10, 12, 30, 0).unwrap(),
        ))
    }

    fn photo() -> CapturedImage {
        CapturedImage::new(vec![0x89, b'P', b'N', b'G'], "image/png")
    }

    fn controller<G: AnalysisGateway>(gateway: G) -> SessionController<G, MemoryStore> {
        let store = Arc::new(EntryStore::open(MemoryStore::new()));
        SessionController::new(gateway, store, clock())
    }

    #[test]
    fn test_data_url() {
        let image = CapturedImage::new(b"hi".to_vec(), "image/jpeg");
        assert_eq!(image.data_url(), "data:image/jpeg;base64,aGk=");
    }

    #[tokio::test]
    async fn test_capture_moves_to_reviewing() {
        let session = controller(FakeGateway::ok(lunch()));
        assert_eq!(session.phase(), SessionPhase::Idle);

        let entry = session.capture(photo()).await.unwrap();

        assert_eq!(session.phase(), SessionPhase::Reviewing);
        assert_eq!(entry.food, lunch());
        assert_eq!(entry.timestamp, clock().now_millis());
        assert_eq!(entry.image_url, Some(photo().data_url()));
        assert_eq!(session.pending(), Some(entry.clone()));
        assert_eq!(session.preview(), entry.image_url);
        // Not committed yet
        assert!(session.store().is_empty());
        assert!(stats_for_today(&session.store().snapshot(), clock().as_ref()).entries.is_empty());
    }

    #[tokio::test]
    async fn test_confirm_commits_at_head() {
        let session = controller(FakeGateway::ok(lunch()));
        session.capture(photo()).await.unwrap();
        let first = session.confirm().unwrap();
        session.capture(photo()).await.unwrap();
        let second = session.confirm().unwrap();

        assert_eq!(session.phase(), SessionPhase::Idle);
        assert!(session.pending().is_none());
        let snapshot = session.store().snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].id, second.id);
        assert_eq!(snapshot[1].id, first.id);

        let today = stats_for_today(&snapshot, clock().as_ref());
        assert_eq!(today.total_calories, 1000);
    }

    #[tokio::test]
    async fn test_gateway_failure_returns_to_idle() {
        let session = controller(FakeGateway::failing(GatewayError::MissingCredential));
        let before = session.store().len();

        let err = session.capture(photo()).await.unwrap_err();

        assert_eq!(session.phase(), SessionPhase::Idle);
        assert!(session.pending().is_none());
        assert!(session.preview().is_none());
        assert_eq!(session.store().len(), before);
        assert!(err.is_user_visible());
        assert_eq!(err.to_string(), GatewayError::MissingCredential.to_string());
    }

    #[tokio::test]
    async fn test_cancel_leaves_store_untouched() {
        let session = controller(FakeGateway::ok(lunch()));
        let before = session.store().len();

        session.capture(photo()).await.unwrap();
        assert!(session.cancel());

        assert_eq!(session.phase(), SessionPhase::Idle);
        assert_eq!(session.store().len(), before);
        assert!(!session.cancel());
    }

    #[tokio::test]
    async fn test_confirm_without_review() {
        let session = controller(FakeGateway::ok(lunch()));
        assert!(matches!(session.confirm(), Err(SessionError::NothingToReview)));
        assert_eq!(session.phase(), SessionPhase::Idle);
    }

    #[tokio::test]
    async fn test_capture_while_reviewing_rejected() {
        let session = controller(FakeGateway::ok(lunch()));
        session.capture(photo()).await.unwrap();

        let err = session.capture(photo()).await.unwrap_err();

        assert!(matches!(err, SessionError::ReviewPending));
        assert_eq!(session.gateway.calls.load(Ordering::SeqCst), 1);
        assert_eq!(session.phase(), SessionPhase::Reviewing);
    }

    #[tokio::test]
    async fn test_concurrent_capture_rejected() {
        let release = Arc::new(Notify::new());
        let session = Arc::new(controller(GatedGateway {
            release: Arc::clone(&release),
        }));

        let first = {
            let session = Arc::clone(&session);
            tokio::spawn(async move { session.capture(photo()).await })
        };
        while session.phase() != SessionPhase::Analyzing {
            tokio::task::yield_now().await;
        }
        assert!(session.preview().is_some());

        let second = session.capture(photo()).await;
        assert!(matches!(second, Err(SessionError::ConcurrentAnalysis)));
        assert!(!second.unwrap_err().is_user_visible());
        // Cancel is not available mid-analysis
        assert!(!session.cancel());

        release.notify_one();
        let entry = first.await.unwrap().unwrap();
        assert_eq!(session.phase(), SessionPhase::Reviewing);
        assert_eq!(session.pending().unwrap().id, entry.id);
    }

    #[tokio::test]
    async fn test_dropped_analysis_returns_to_idle() {
        let session = controller(StalledGateway);

        let result = tokio::time::timeout(Duration::from_millis(20), session.capture(photo())).await;

        assert!(result.is_err());
        assert_eq!(session.phase(), SessionPhase::Idle);
    }

    #[tokio::test]
    async fn test_persistence_failure_keeps_entry_in_memory() {
        let store = Arc::new(EntryStore::open(ReadOnlyStore::default()));
        let session = SessionController::new(FakeGateway::ok(lunch()), store, clock());
        session.capture(photo()).await.unwrap();

        let err = session.confirm().unwrap_err();

        assert!(matches!(err, SessionError::Persistence(_)));
        assert!(!err.is_user_visible());
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert_eq!(session.store().len(), 1);
    }
}
