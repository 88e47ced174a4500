// Date filters and per-entity aggregations over a `Dataset`.
//
// All queries return fresh vectors; nothing borrows mutably from the dataset.
// Functions taking an entity position are crate-private; callers outside the
// crate go through `Dataset::entity_index` via the `&str` wrappers.
use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::types::DailyRecord;
use chrono::NaiveDate;

impl Dataset {
    /// Records dated in `year`, in source order.
    pub fn records_in_year(&self, year: i32) -> Vec<&DailyRecord> {
        self.year_indices(year)
            .iter()
            .map(|&i| &self.records()[i])
            .collect()
    }

    /// Records dated in `month` (1..=12) of `year`, in source order.
    pub fn records_in_month(&self, year: i32, month: u32) -> Result<Vec<&DailyRecord>> {
        if !(1..=12).contains(&month) {
            return Err(Error::UnknownMonth(month));
        }
        Ok(self
            .records_in_year(year)
            .into_iter()
            .filter(|r| r.month() == month)
            .collect())
    }

    /// `entity`'s daily values in `year`, in source order.
    pub fn entity_values(&self, entity: &str, year: i32) -> Result<Vec<i64>> {
        let idx = self.entity_index(entity)?;
        self.require_year(year)?;
        Ok(values_for(idx, &self.records_in_year(year)))
    }

    /// `entity`'s total for each calendar month of `year`.
    pub fn entity_monthly_totals(&self, entity: &str, year: i32) -> Result<[i64; 12]> {
        let idx = self.entity_index(entity)?;
        self.require_year(year)?;
        Ok(self.monthly_totals(idx, year))
    }

    /// `entity`'s total for each available year, ascending by year.
    pub fn entity_yearly_totals(&self, entity: &str) -> Result<Vec<(i32, i64)>> {
        Ok(self.yearly_totals(self.entity_index(entity)?))
    }

    pub(crate) fn yearly_totals(&self, entity: usize) -> Vec<(i32, i64)> {
        self.available_years()
            .into_iter()
            .map(|y| (y, values_for(entity, &self.records_in_year(y)).iter().sum()))
            .collect()
    }

    /// `entity`'s total for each calendar month of `year`; months without
    /// records contribute 0.
    pub(crate) fn monthly_totals(&self, entity: usize, year: i32) -> [i64; 12] {
        let mut totals = [0i64; 12];
        for r in self.records_in_year(year) {
            totals[(r.month() - 1) as usize] += r.value(entity);
        }
        totals
    }
}

/// Map records to one entity's daily values, preserving order.
pub(crate) fn values_for(entity: usize, records: &[&DailyRecord]) -> Vec<i64> {
    records.iter().map(|r| r.value(entity)).collect()
}

/// Group total for each record, preserving order.
pub fn daily_totals(records: &[&DailyRecord]) -> Vec<i64> {
    records.iter().map(|r| daily_total(r)).collect()
}

/// Sum of every entity's value for one day.
pub fn daily_total(record: &DailyRecord) -> i64 {
    record.values.iter().map(|&v| i64::from(v)).sum()
}

/// Per-entity sums over a set of records, in entity order.
pub fn entity_totals(entity_count: usize, records: &[&DailyRecord]) -> Vec<i64> {
    let mut totals = vec![0i64; entity_count];
    for r in records {
        for (t, &v) in totals.iter_mut().zip(&r.values) {
            *t += i64::from(v);
        }
    }
    totals
}

/// 1-based descending rank of `values[entity]` among `values`.
///
/// Equivalent to a stable descending sort: an entity is outranked by every
/// larger value and by equal values at a lower index, so the ranks over all
/// entities always form a permutation of `1..=values.len()`.
pub(crate) fn rank_in(entity: usize, values: &[i64]) -> usize {
    let own = values[entity];
    let ahead = values
        .iter()
        .enumerate()
        .filter(|&(i, &v)| v > own || (v == own && i < entity))
        .count();
    ahead + 1
}

/// Rank of `entity` among all entities on one day.
pub(crate) fn rank_of(entity: usize, record: &DailyRecord) -> usize {
    let values: Vec<i64> = record.values.iter().map(|&v| i64::from(v)).collect();
    rank_in(entity, &values)
}

/// `true` when `values[entity]` is strictly greater than every other value.
pub(crate) fn is_strict_max(entity: usize, values: &[i64]) -> bool {
    let own = values[entity];
    values.iter().enumerate().all(|(i, &v)| i == entity || v < own)
}

/// `true` when `values[entity]` is strictly smaller than every other value.
pub(crate) fn is_strict_min(entity: usize, values: &[i64]) -> bool {
    let own = values[entity];
    values.iter().enumerate().all(|(i, &v)| i == entity || v > own)
}

pub fn days_in_year(year: i32) -> i64 {
    match (
        NaiveDate::from_ymd_opt(year, 1, 1),
        NaiveDate::from_ymd_opt(year + 1, 1, 1),
    ) {
        (Some(start), Some(end)) => (end - start).num_days(),
        _ => 365,
    }
}
