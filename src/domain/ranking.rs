//! Monthly visit ranking: calendar window and aggregation.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, FixedOffset, TimeZone, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::UserId;
use crate::error::MeshimapError;

/// Inclusive time range covering one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct MonthWindow {
    /// First instant of the month (00:00:00.000 local).
    pub start: DateTime<Utc>,
    /// Last millisecond of the month (23:59:59.999 local on its last day).
    pub end: DateTime<Utc>,
}

impl MonthWindow {
    /// Returns the month containing `now` in the calendar of `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`MeshimapError::Internal`] if the month boundaries fall
    /// outside chrono's representable range.
    pub fn containing(now: DateTime<Utc>, offset: FixedOffset) -> Result<Self, MeshimapError> {
        let local = now.with_timezone(&offset);
        let (year, month) = (local.year(), local.month());
        let (next_year, next_month) = if month == 12 {
            (year.saturating_add(1), 1)
        } else {
            (year, month.saturating_add(1))
        };

        let first = offset
            .with_ymd_and_hms(year, month, 1, 0, 0, 0)
            .single()
            .ok_or_else(|| MeshimapError::Internal(format!("no month start for {year}-{month}")))?;
        let next_first = offset
            .with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0)
            .single()
            .ok_or_else(|| {
                MeshimapError::Internal(format!("no month start for {next_year}-{next_month}"))
            })?;

        Ok(Self {
            start: first.with_timezone(&Utc),
            end: (next_first - Duration::milliseconds(1)).with_timezone(&Utc),
        })
    }

    /// Returns `true` if `ts` falls inside the window (bounds included).
    #[must_use]
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start && ts <= self.end
    }
}

/// One user's visits inside the window, before name resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitTally {
    /// Who visited.
    pub user_id: UserId,
    /// Number of visit records.
    pub count: usize,
    /// Visited shop names in scan order.
    pub shops: Vec<String>,
}

/// Groups `(user, shop name)` visit rows by user, sorts by count
/// descending and keeps the first `limit`.
///
/// Users with equal counts stay in the order their first row appeared;
/// there is no secondary sort key.
#[must_use]
pub fn tally_visits<I>(rows: I, limit: usize) -> Vec<VisitTally>
where
    I: IntoIterator<Item = (UserId, String)>,
{
    let mut tallies: Vec<VisitTally> = Vec::new();
    let mut index: HashMap<UserId, usize> = HashMap::new();

    for (user_id, shop) in rows {
        if let Some(tally) = index.get(&user_id).and_then(|&i| tallies.get_mut(i)) {
            tally.count = tally.count.saturating_add(1);
            tally.shops.push(shop);
            continue;
        }
        index.insert(user_id.clone(), tallies.len());
        tallies.push(VisitTally {
            user_id,
            count: 1,
            shops: vec![shop],
        });
    }

    // `sort_by` is stable, which is what keeps ties in scan order.
    tallies.sort_by(|a, b| b.count.cmp(&a.count));
    tallies.truncate(limit);
    tallies
}

/// A ranked user as shown on the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RankingEntry {
    /// 1-based position.
    pub rank: usize,
    /// Ranked user.
    pub user_id: UserId,
    /// Display name or the anonymous placeholder.
    pub display_name: String,
    /// Visits this month.
    pub count: usize,
    /// Names of the visited shops.
    pub shops: Vec<String>,
}
