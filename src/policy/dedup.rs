//! Repair sweep for attendance rows that share a `(user, date)`.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::error::StoreResult;
use crate::model::attendance::AttendanceKey;
use crate::store::AttendanceStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DedupReport {
    /// `(user, date)` pairs that had more than one row.
    pub groups: usize,
    pub removed: u64,
}

/// Ids to delete: everything but the earliest-created row of each group,
/// ties going to the lowest id.
pub fn plan_removals(rows: &[AttendanceKey]) -> (usize, Vec<u64>) {
    let mut groups: BTreeMap<(u64, NaiveDate), Vec<&AttendanceKey>> = BTreeMap::new();
    for row in rows {
        groups.entry((row.user_id, row.date)).or_default().push(row);
    }

    let mut doomed = Vec::new();
    let mut duplicated = 0;
    for mut group in groups.into_values() {
        if group.len() < 2 {
            continue;
        }
        duplicated += 1;
        group.sort_by_key(|k| (k.created_at, k.id));
        doomed.extend(group.iter().skip(1).map(|k| k.id));
    }

    (duplicated, doomed)
}

pub async fn dedupe_attendance(store: &dyn AttendanceStore) -> StoreResult<DedupReport> {
    let rows = store.find_duplicate_attendance().await?;
    let (groups, doomed) = plan_removals(&rows);

    if doomed.is_empty() {
        info!("No duplicate attendance records found");
        return Ok(DedupReport::default());
    }

    let removed = store.delete_attendance(&doomed).await?;
    info!(groups, removed, "Removed duplicate attendance records");
    Ok(DedupReport { groups, removed })
}
