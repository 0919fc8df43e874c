//! Today's food diary.
//!
//! The [`DiaryAggregator`] mirrors the server's diary for the current local
//! date. Writes never touch the local entry set: every successful
//! [`DiaryAggregator::log_meal`] is followed by a full refetch, so totals
//! always reflect what the server recorded.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{Local, NaiveDate};
use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use crate::api::{ApiClient, ApiError};
use crate::credential::Credential;
use crate::models::{DailyTotals, FoodItem, LoggedMealEntry, MealType};
use crate::session::{SessionManager, SessionState};

/// Errors from diary operations.
#[derive(Debug, Error)]
pub enum DiaryError {
    /// Called without an active session; nothing was sent
    #[error("You must be logged in to log a meal.")]
    NotAuthenticated,

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Entries of one meal type, in display order.
#[derive(Debug, Clone, PartialEq)]
pub struct MealGroup {
    pub meal_type: MealType,
    pub entries: Vec<LoggedMealEntry>,
}

/// Holds today's diary entries and derives totals from them.
pub struct DiaryAggregator {
    api: ApiClient,
    session: watch::Receiver<SessionState>,
    entries: RwLock<Vec<LoggedMealEntry>>,
    /// Epoch of the fetch currently in flight, if any.
    loading: watch::Sender<Option<u64>>,
    /// Bumped by every fetch start and every clear. A fetch applies its
    /// result only if the epoch is still the one it started with.
    epoch: AtomicU64,
    writes: Mutex<()>,
}

impl DiaryAggregator {
    pub fn new(session: &SessionManager) -> Self {
        let (loading, _) = watch::channel(None);
        Self {
            api: session.api().clone(),
            session: session.subscribe(),
            entries: RwLock::new(Vec::new()),
            loading,
            epoch: AtomicU64::new(0),
            writes: Mutex::new(()),
        }
    }

    /// True while a fetch is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading.borrow().is_some()
    }

    /// Observe the loading flag.
    pub fn subscribe_loading(&self) -> watch::Receiver<Option<u64>> {
        self.loading.subscribe()
    }

    /// Copy of the current entry set.
    pub fn entries(&self) -> Vec<LoggedMealEntry> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Sum of every entry currently held. Zero for an empty diary.
    ///
    /// Safe to call mid-fetch: the entry set is swapped whole, so this is
    /// always the last complete set.
    pub fn todays_totals(&self) -> DailyTotals {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|entry| entry.food.nutrients())
            .sum()
    }

    /// Entries grouped by meal type; every meal type is present.
    pub fn by_meal_type(&self) -> Vec<MealGroup> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);

        MealType::ALL
            .iter()
            .map(|&meal_type| MealGroup {
                meal_type,
                entries: entries
                    .iter()
                    .filter(|e| e.meal_type == meal_type)
                    .cloned()
                    .collect(),
            })
            .collect()
    }

    /// Replaces the entry set with the server's diary for today.
    ///
    /// On error the previous entries are kept. The loading flag is cleared
    /// on every exit path.
    pub async fn fetch_diary(&self, credential: &Credential) -> Result<(), DiaryError> {
        self.fetch_for_date(credential, today()).await
    }

    async fn fetch_for_date(
        &self,
        credential: &Credential,
        date: NaiveDate,
    ) -> Result<(), DiaryError> {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let _loading = LoadingGuard::start(&self.loading, epoch);

        match self.api.diary(credential, date).await {
            Ok(entries) => {
                if self.epoch.load(Ordering::SeqCst) == epoch {
                    tracing::debug!(%date, count = entries.len(), "Diary fetched");
                    *self.entries.write().unwrap_or_else(PoisonError::into_inner) = entries;
                } else {
                    tracing::debug!(%date, "Discarding superseded diary fetch");
                }
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, %date, "Failed to fetch diary");
                Err(e.into())
            }
        }
    }

    /// Logs one serving of `food` under `meal_type`, then refetches.
    ///
    /// Fails with [`DiaryError::NotAuthenticated`] before any request when
    /// there is no session. Writes are serialized: a second call waits until
    /// the first one's refetch has finished. A failed refetch is logged and
    /// does not fail the write.
    pub async fn log_meal(&self, food: &FoodItem, meal_type: MealType) -> Result<(), DiaryError> {
        let credential = self
            .session
            .borrow()
            .credential
            .clone()
            .ok_or(DiaryError::NotAuthenticated)?;

        let _write = self.writes.lock().await;

        self.api.log_meal(&credential, &food.id, meal_type).await?;
        tracing::info!(food = %food.name, %meal_type, "Meal logged");

        let still_current = self.session.borrow().credential.as_ref() == Some(&credential);
        if still_current {
            // Already logged inside fetch_diary
            let _ = self.fetch_diary(&credential).await;
        }

        Ok(())
    }

    /// Drops all entries and the loading flag. Any fetch in flight is
    /// discarded when it completes.
    pub fn clear(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.loading.send_if_modified(|current| current.take().is_some());
    }

    /// Keeps the diary in step with the session.
    ///
    /// Waits for session initialization, then fetches once for every distinct
    /// resolved credential and clears as soon as the credential goes away.
    /// Runs until the session manager is dropped.
    pub async fn follow_session(self: Arc<Self>) {
        let mut session = self.session.clone();
        let mut fetched_for: Option<Credential> = None;

        loop {
            let state = session.borrow_and_update().clone();

            if !state.initializing {
                match (&state.credential, &state.profile) {
                    (None, _) => {
                        fetched_for = None;
                        self.clear();
                    }
                    (Some(credential), Some(_)) if fetched_for.as_ref() != Some(credential) => {
                        fetched_for = Some(credential.clone());
                        let diary = Arc::clone(&self);
                        let credential = credential.clone();
                        tokio::spawn(async move {
                            let _ = diary.fetch_diary(&credential).await;
                        });
                    }
                    _ => {}
                }
            }

            if session.changed().await.is_err() {
                break;
            }
        }
    }

    /// Spawns [`Self::follow_session`] on the current runtime.
    pub fn spawn_session_follower(self: &Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(Arc::clone(self).follow_session())
    }
}

/// The device's current local date.
fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Sets the loading flag for one fetch and clears it on drop, unless a newer
/// fetch or a clear has taken over the flag.
struct LoadingGuard<'a> {
    loading: &'a watch::Sender<Option<u64>>,
    epoch: u64,
}

impl<'a> LoadingGuard<'a> {
    fn start(loading: &'a watch::Sender<Option<u64>>, epoch: u64) -> Self {
        loading.send_replace(Some(epoch));
        Self { loading, epoch }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let epoch = self.epoch;
        self.loading.send_if_modified(|current| {
            if *current == Some(epoch) {
                *current = None;
                true
            } else {
                false
            }
        });
    }
}
