//! Ranking service: the monthly visit leaderboard.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use futures_util::future::try_join_all;
use serde_json::Value;

use crate::domain::ranking::{VisitTally, tally_visits};
use crate::domain::user::{ANONYMOUS_DISPLAY_NAME, profile_path};
use crate::domain::{MarkKind, MonthWindow, RankingEntry, UserId, UserProfile};
use crate::error::MeshimapError;
use crate::store::{DocumentStore, Snapshot};

/// Computes the top visitors of the current calendar month.
///
/// Every call scans the `visited` records of all users inside the month
/// window; nothing is cached or pre-aggregated.
#[derive(Debug, Clone)]
pub struct RankingService {
    store: Arc<dyn DocumentStore>,
    limit: usize,
    calendar: FixedOffset,
}

impl RankingService {
    /// Creates a service returning at most `limit` users, with month
    /// boundaries taken in the `calendar` offset.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, limit: usize, calendar: FixedOffset) -> Self {
        Self {
            store,
            limit,
            calendar,
        }
    }

    /// Returns the month window the ranking covers at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`MeshimapError::Internal`] if the window cannot be built.
    pub fn window_at(&self, now: DateTime<Utc>) -> Result<MonthWindow, MeshimapError> {
        MonthWindow::containing(now, self.calendar)
    }

    /// Ranking for the current month.
    pub async fn monthly_ranking(&self) -> Vec<RankingEntry> {
        self.monthly_ranking_at(Utc::now()).await
    }

    /// Ranking for the month containing `now`.
    ///
    /// Failures anywhere in the scan or the name lookups are logged and
    /// yield an empty ranking; partial results are never returned.
    pub async fn monthly_ranking_at(&self, now: DateTime<Utc>) -> Vec<RankingEntry> {
        match self.try_monthly_ranking_at(now).await {
            Ok(entries) => entries,
            Err(err) => {
                tracing::error!(error = %err, "monthly ranking failed");
                Vec::new()
            }
        }
    }

    /// Fallible core of [`RankingService::monthly_ranking_at`].
    ///
    /// # Errors
    ///
    /// Returns the first store error encountered.
    pub async fn try_monthly_ranking_at(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<RankingEntry>, MeshimapError> {
        let window = self.window_at(now)?;
        let visits = self
            .store
            .query_group_range(
                MarkKind::Visited.collection(),
                MarkKind::Visited.timestamp_field(),
                window.start,
                window.end,
            )
            .await?;

        let scanned = visits.len();
        let tallies = tally_visits(visits.iter().filter_map(visit_row), self.limit);

        let entries = try_join_all(
            tallies
                .into_iter()
                .enumerate()
                .map(|(i, tally)| self.resolve(i.saturating_add(1), tally)),
        )
        .await?;

        tracing::debug!(
            start = %window.start,
            end = %window.end,
            scanned,
            ranked = entries.len(),
            "monthly ranking computed"
        );
        Ok(entries)
    }

    async fn resolve(&self, rank: usize, tally: VisitTally) -> Result<RankingEntry, MeshimapError> {
        let display_name = match self.store.get(&profile_path(&tally.user_id)?).await? {
            Some(doc) => doc
                .decode::<UserProfile>()
                .map(|profile| profile.shown_name().to_string())
                .unwrap_or_else(|_| ANONYMOUS_DISPLAY_NAME.to_string()),
            None => ANONYMOUS_DISPLAY_NAME.to_string(),
        };
        Ok(RankingEntry {
            rank,
            user_id: tally.user_id,
            display_name,
            count: tally.count,
            shops: tally.shops,
        })
    }
}

/// Owner and shop name of one visit record. The owner is the user
/// document holding the `visited` collection.
fn visit_row(doc: &Snapshot) -> Option<(UserId, String)> {
    let owner = doc.path.parent_document()?;
    let name = doc
        .fields
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    Some((UserId::new(owner.id()), name))
}
