use crate::config::DashboardConfig;
use crate::dataset::{build_dataset, Dataset};
use crate::error::{Error, Result};
use crate::types::{LoadReport, RawRow};
use csv::{ReaderBuilder, StringRecord};
use std::io::Read;
use std::path::Path;
use tracing::info;

pub fn load_dataset(config: &DashboardConfig) -> Result<(Dataset, LoadReport)> {
    load_from_path(&config.data_path, config)
}

pub fn load_from_path(path: &Path, config: &DashboardConfig) -> Result<(Dataset, LoadReport)> {
    info!(path = %path.display(), "loading dataset");
    let file = std::fs::File::open(path)?;
    load_from_reader(file, config)
}

/// Read `date,<entity..>` CSV text into a dataset.
///
/// The header must name the configured entities in order. Records are
/// read flexibly so that short rows reach `build_dataset` and are handled
/// by the configured row policy instead of failing the whole read.
pub fn load_from_reader<R: Read>(
    reader: R,
    config: &DashboardConfig,
) -> Result<(Dataset, LoadReport)> {
    config.validate()?;
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let header = rdr.headers()?.clone();
    check_header(&header, &config.entities)?;

    let mut rows: Vec<RawRow> = Vec::new();
    for result in rdr.records() {
        let record = result?;
        // Header is line 1.
        let line = record.position().map_or(rows.len() + 2, |p| p.line() as usize);
        rows.push(RawRow::new(line, record.iter()));
    }

    build_dataset(&rows, &config.entities, config.row_policy)
}

fn check_header(header: &StringRecord, entities: &[String]) -> Result<()> {
    let found = |i: usize| header.get(i).unwrap_or("").to_string();
    if !found(0).eq_ignore_ascii_case("date") {
        return Err(Error::HeaderMismatch {
            position: 0,
            expected: "date".to_string(),
            found: found(0),
        });
    }
    for (i, entity) in entities.iter().enumerate() {
        let position = i + 1;
        if found(position) != *entity {
            return Err(Error::HeaderMismatch {
                position,
                expected: entity.clone(),
                found: found(position),
            });
        }
    }
    Ok(())
}
