use std::{collections::HashMap, sync::Arc};

use teloxide::types::UserId;
use tokio::sync::Mutex;

use crate::flow::TripDraft;

/// Where a user's dialogue currently stands. One variant at a time per
/// user: starting a new flow replaces whatever was in progress.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) enum Session {
    #[default]
    Idle,
    CreatingTrip(TripDraft),
    AwaitingNewRate {
        trip_id: i32,
    },
    PendingExpense {
        amount_to: f64,
        amount_from: f64,
    },
}

/// In-process session map. Lost on restart; confirmations arriving after
/// that are answered with a data-expired message rather than replayed.
#[derive(Clone, Default)]
pub(crate) struct SessionStore {
    inner: Arc<Mutex<HashMap<UserId, Session>>>,
}

impl SessionStore {
    pub(crate) async fn get(&self, user_id: UserId) -> Session {
        let guard = self.inner.lock().await;
        guard.get(&user_id).cloned().unwrap_or_default()
    }

    pub(crate) async fn set(&self, user_id: UserId, session: Session) {
        let mut guard = self.inner.lock().await;
        guard.insert(user_id, session);
    }

    pub(crate) async fn clear(&self, user_id: UserId) {
        let mut guard = self.inner.lock().await;
        guard.remove(&user_id);
    }
}
