//! The immutable in-memory dataset every report reads from.

use crate::config::RowPolicy;
use crate::error::{Error, Result};
use crate::types::{DailyRecord, LoadReport, RawRow, SkippedRow};
use crate::util::{parse_count_safe, parse_date_safe};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashSet};
use tracing::{info, warn};

/// Daily records in source order plus the tracked entity list.
///
/// Built once and never mutated. Records are also indexed by year so the
/// per-year queries do not rescan the whole series.
#[derive(Debug, Clone)]
pub struct Dataset {
    entities: Vec<String>,
    records: Vec<DailyRecord>,
    by_year: BTreeMap<i32, Vec<usize>>,
}

impl Dataset {
    /// Assemble a dataset from already validated records.
    ///
    /// Every record must carry exactly one value per entity.
    pub fn new(entities: Vec<String>, records: Vec<DailyRecord>) -> Result<Self> {
        if let Some(bad) = records.iter().find(|r| r.values.len() != entities.len()) {
            return Err(Error::InconsistentRecord {
                date: bad.date.to_string(),
                found: bad.values.len(),
                expected: entities.len(),
            });
        }
        let mut by_year: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
        for (idx, r) in records.iter().enumerate() {
            by_year.entry(r.year()).or_default().push(idx);
        }
        Ok(Self { entities, records, by_year })
    }

    pub fn entities(&self) -> &[String] {
        &self.entities
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn records(&self) -> &[DailyRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct years present in the data, ascending.
    pub fn available_years(&self) -> Vec<i32> {
        self.by_year.keys().copied().collect()
    }

    pub(crate) fn year_indices(&self, year: i32) -> &[usize] {
        self.by_year.get(&year).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Resolve an entity id to its column position.
    pub fn entity_index(&self, name: &str) -> Result<usize> {
        self.entities
            .iter()
            .position(|e| e == name)
            .ok_or_else(|| Error::UnknownEntity {
                name: name.to_string(),
                known: self.entities.join(", "),
            })
    }

    /// Fail fast on a year the data has no records for.
    pub fn require_year(&self, year: i32) -> Result<()> {
        if self.by_year.contains_key(&year) {
            Ok(())
        } else {
            Err(Error::UnknownYear(year))
        }
    }
}

/// Turn parsed CSV rows into a `Dataset`.
///
/// Rows are `date, <entity 1>, .., <entity n>` in the order of `entities`;
/// extra trailing fields are ignored. A row is malformed when it is short,
/// has an unparsable date or count, or repeats a date. A row of empty cells
/// is malformed like any other. Malformed rows are
/// skipped and listed in the `LoadReport` under `RowPolicy::Skip`, and end
/// the load under `RowPolicy::Abort`.
pub fn build_dataset(
    rows: &[RawRow],
    entities: &[String],
    policy: RowPolicy,
) -> Result<(Dataset, LoadReport)> {
    let mut report = LoadReport::default();
    let mut records: Vec<DailyRecord> = Vec::with_capacity(rows.len());
    let mut seen: HashSet<NaiveDate> = HashSet::new();

    for row in rows {
        report.total_rows += 1;
        match parse_row(row, entities.len(), &seen) {
            Ok(record) => {
                seen.insert(record.date);
                records.push(record);
            }
            Err(reason) => match policy {
                RowPolicy::Abort => {
                    return Err(Error::MalformedRow { line: row.line, reason });
                }
                RowPolicy::Skip => {
                    warn!(line = row.line, %reason, "skipping malformed row");
                    report.skipped.push(SkippedRow { line: row.line, reason });
                }
            },
        }
    }

    report.loaded_rows = records.len();
    report.skipped_rows = report.skipped.len();
    let dataset = Dataset::new(entities.to_vec(), records)?;
    info!(
        loaded = report.loaded_rows,
        skipped = report.skipped_rows,
        years = dataset.by_year.len(),
        "dataset built"
    );
    Ok((dataset, report))
}

fn parse_row(
    row: &RawRow,
    entity_count: usize,
    seen: &HashSet<NaiveDate>,
) -> std::result::Result<DailyRecord, String> {
    let needed = entity_count + 1;
    if row.fields.len() < needed {
        return Err(format!("expected {} columns, found {}", needed, row.fields.len()));
    }
    let raw_date = row.fields[0].as_str();
    let date = parse_date_safe(Some(raw_date))
        .ok_or_else(|| format!("invalid date '{}'", raw_date.trim()))?;
    if seen.contains(&date) {
        return Err(format!("duplicate date {}", date));
    }
    let values = row.fields[1..needed]
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            parse_count_safe(Some(cell))
                .ok_or_else(|| format!("column {}: invalid count '{}'", i + 1, cell.trim()))
        })
        .collect::<std::result::Result<Vec<u32>, String>>()?;
    Ok(DailyRecord { date, values })
}
