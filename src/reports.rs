use crate::dataset::Dataset;
use crate::error::Result;
use crate::queries::{
    daily_total, daily_totals, days_in_year, entity_totals, is_strict_max, is_strict_min,
    rank_in, rank_of, values_for,
};
use crate::stats::{
    longest_run, max, mean, median, min, mode, percent, ratio, relative_std_dev, std_dev,
};
use crate::types::{
    BandCount, DailyRecord, EntityTotal, FavoriteDay, HighConsumptionStreak, HistoricalMaximum,
    IndividualConsumption, Insights, MonthRank, MonthlyStats, MonthlyTrends, OverallConsumption,
    Overview, RelativeRankings, Streaks, SubsetStats, TopDay, TopDays, WeekdayPattern,
    WeekdayTotal, YearChange, YearRow, YearTotal, YearlyTrend,
};
use chrono::Datelike;
use tracing::debug;

/// Consumption bands as `(label, lowest, highest)`; `None` is open-ended.
/// Zero is deliberately outside every band.
pub const CONSUMPTION_BANDS: [(&str, u32, Option<u32>); 4] = [
    ("10+", 10, None),
    ("6-9", 6, Some(9)),
    ("3-5", 3, Some(5)),
    ("1-2", 1, Some(2)),
];

pub const HIGH_CONSUMPTION_THRESHOLD: u32 = 10;

pub const TOP_DAYS: usize = 3;

pub const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

fn select<'a>(
    ds: &'a Dataset,
    entity: &str,
    year: i32,
) -> Result<(usize, Vec<&'a DailyRecord>)> {
    let idx = ds.entity_index(entity)?;
    ds.require_year(year)?;
    Ok((idx, ds.records_in_year(year)))
}

fn subset_stats(values: &[i64]) -> SubsetStats {
    let m = mean(values);
    let sd = std_dev(values);
    SubsetStats {
        days: values.len(),
        total: values.iter().sum(),
        max: max(values),
        mean: m,
        median: median(values),
        std_dev: sd,
        std_dev_pct: relative_std_dev(sd, m),
    }
}

fn count_where(values: &[i64], pred: impl Fn(i64) -> bool) -> usize {
    values.iter().filter(|&&v| pred(v)).count()
}

pub fn individual_consumption(
    ds: &Dataset,
    entity: &str,
    year: i32,
) -> Result<IndividualConsumption> {
    let (idx, records) = select(ds, entity, year)?;
    let values = values_for(idx, &records);
    let drinking: Vec<i64> = values.iter().copied().filter(|&v| v > 0).collect();

    let bands = CONSUMPTION_BANDS
        .iter()
        .map(|&(label, lo, hi)| {
            let days = count_where(&values, |v| {
                v >= i64::from(lo) && hi.map_or(true, |h| v <= i64::from(h))
            });
            BandCount { label, days, pct: percent(days as f64, values.len() as f64) }
        })
        .collect();

    Ok(IndividualConsumption {
        entity: entity.to_string(),
        year,
        all_days: subset_stats(&values),
        drinking_days: subset_stats(&drinking),
        bands,
    })
}

pub fn overall_consumption(ds: &Dataset, year: i32) -> Result<OverallConsumption> {
    ds.require_year(year)?;
    let records = ds.records_in_year(year);
    let totals = daily_totals(&records);
    let heads = ds.entity_count() as f64;
    let per_capita = |v: Option<f64>| v.and_then(|x| ratio(x, heads));

    let total: i64 = totals.iter().sum();
    let daily_mean = mean(&totals);
    let mode_value = mode(&totals);
    let mode_days = mode_value.map_or(0, |m| count_where(&totals, |t| t == m));
    let med = median(&totals);
    let sd = std_dev(&totals);

    Ok(OverallConsumption {
        year,
        days: totals.len(),
        entity_count: ds.entity_count(),
        total,
        total_per_capita: per_capita(Some(total as f64)),
        max_day: max(&totals),
        min_day: min(&totals),
        daily_mean,
        daily_mean_per_capita: per_capita(daily_mean),
        mode: mode_value,
        mode_per_capita: per_capita(mode_value.map(|m| m as f64)),
        mode_days,
        median: med,
        median_per_capita: per_capita(med),
        std_dev: sd,
        std_dev_pct: relative_std_dev(sd, daily_mean),
    })
}

pub fn yearly_trend(ds: &Dataset, entity: &str) -> Result<YearlyTrend> {
    let idx = ds.entity_index(entity)?;
    let totals: Vec<YearTotal> = ds
        .yearly_totals(idx)
        .into_iter()
        .map(|(year, total)| YearTotal { year, total })
        .collect();

    let changes = totals
        .windows(2)
        .map(|w| {
            let change = w[1].total - w[0].total;
            YearChange {
                year: w[1].year,
                previous_total: w[0].total,
                total: w[1].total,
                change,
                change_pct: percent(change as f64, w[0].total as f64),
            }
        })
        .collect();

    let values: Vec<i64> = totals.iter().map(|t| t.total).collect();
    let m = mean(&values);
    let sd = std_dev(&values);
    Ok(YearlyTrend {
        entity: entity.to_string(),
        totals,
        changes,
        mean: m,
        median: median(&values),
        std_dev: sd,
        std_dev_pct: relative_std_dev(sd, m),
    })
}

pub fn monthly_stats(ds: &Dataset, entity: &str, year: i32) -> Result<MonthlyStats> {
    let (idx, _) = select(ds, entity, year)?;
    let monthly_totals = ds.monthly_totals(idx, year).to_vec();
    let m = mean(&monthly_totals);
    let sd = std_dev(&monthly_totals);
    Ok(MonthlyStats {
        entity: entity.to_string(),
        year,
        max: max(&monthly_totals),
        min: min(&monthly_totals),
        mean: m,
        median: median(&monthly_totals),
        std_dev: sd,
        std_dev_pct: relative_std_dev(sd, m),
        monthly_totals,
    })
}

pub fn streaks(ds: &Dataset, entity: &str, year: i32) -> Result<Streaks> {
    let (idx, records) = select(ds, entity, year)?;
    let values = values_for(idx, &records);
    let diffs: Vec<i64> = values.windows(2).map(|w| w[1] - w[0]).collect();
    let drinking: Vec<bool> = values.iter().map(|&v| v > 0).collect();
    let dry: Vec<bool> = drinking.iter().map(|&d| !d).collect();
    let modal_value = mode(&values);

    Ok(Streaks {
        entity: entity.to_string(),
        year,
        increases: count_where(&diffs, |d| d > 0),
        decreases: count_where(&diffs, |d| d < 0),
        unchanged: count_where(&diffs, |d| d == 0),
        diff_mean: mean(&diffs),
        diff_median: median(&diffs),
        diff_mode: mode(&diffs),
        longest_drinking_streak: longest_run(&drinking),
        longest_dry_streak: longest_run(&dry),
        drinking_days: drinking.iter().filter(|&&d| d).count(),
        dry_days: dry.iter().filter(|&&d| d).count(),
        modal_value,
        modal_value_days: modal_value.map_or(0, |m| count_where(&values, |v| v == m)),
    })
}

pub fn relative_rankings(ds: &Dataset, entity: &str, year: i32) -> Result<RelativeRankings> {
    let (idx, records) = select(ds, entity, year)?;
    let totals = entity_totals(ds.entity_count(), &records);
    let year_total: i64 = totals.iter().sum();

    let daily_ranks: Vec<i64> = records.iter().map(|r| rank_of(idx, r) as i64).collect();
    let (mut days_top, mut days_bottom) = (0usize, 0usize);
    for r in &records {
        let day: Vec<i64> = r.values.iter().map(|&v| i64::from(v)).collect();
        if is_strict_max(idx, &day) {
            days_top += 1;
        }
        if is_strict_min(idx, &day) {
            days_bottom += 1;
        }
    }

    Ok(RelativeRankings {
        entity: entity.to_string(),
        year,
        share_pct: percent(totals[idx] as f64, year_total as f64),
        annual_rank: rank_in(idx, &totals),
        rank_mean: mean(&daily_ranks),
        rank_median: median(&daily_ranks),
        rank_mode: mode(&daily_ranks),
        days_top,
        days_bottom,
    })
}

pub fn weekday_pattern(ds: &Dataset, entity: &str, year: i32) -> Result<WeekdayPattern> {
    let (idx, records) = select(ds, entity, year)?;
    let mut sums = [0i64; 7];
    let mut counts = [0usize; 7];
    for r in &records {
        let day = r.date.weekday().num_days_from_sunday() as usize;
        sums[day] += r.value(idx);
        counts[day] += 1;
    }
    let entity_total: i64 = sums.iter().sum();

    let weekdays: Vec<WeekdayTotal> = (0..7)
        .map(|d| WeekdayTotal {
            number: d as u32,
            name: WEEKDAY_NAMES[d],
            total: sums[d],
            days: counts[d],
        })
        .collect();

    let mut favorite: Option<&WeekdayTotal> = None;
    for w in weekdays.iter().filter(|w| w.days > 0) {
        if favorite.map_or(true, |f| w.total > f.total) {
            favorite = Some(w);
        }
    }
    let favorite = favorite.map(|w| FavoriteDay {
        number: w.number,
        name: w.name,
        total: w.total,
        mean: ratio(w.total as f64, w.days as f64),
        share_pct: percent(w.total as f64, entity_total as f64),
    });

    Ok(WeekdayPattern { entity: entity.to_string(), year, weekdays, favorite })
}

pub fn monthly_trends(ds: &Dataset, entity: &str, year: i32) -> Result<MonthlyTrends> {
    let (idx, records) = select(ds, entity, year)?;
    let n = ds.entity_count();

    let mut months: Vec<MonthRank> = Vec::new();
    for month in 1..=12u32 {
        let month_records = ds.records_in_month(year, month)?;
        if month_records.is_empty() {
            continue;
        }
        let totals = entity_totals(n, &month_records);
        months.push(MonthRank { month, rank: rank_in(idx, &totals), total: totals[idx] });
    }

    let ranks: Vec<i64> = months.iter().map(|m| m.rank as i64).collect();

    let mut strongest: Option<&MonthRank> = None;
    for m in &months {
        if strongest.map_or(true, |s| m.total > s.total) {
            strongest = Some(m);
        }
    }
    let strongest_month = strongest.map(|m| m.month);
    let (strongest_daily_mean, strongest_drinking_mean) = match strongest_month {
        Some(month) => {
            let vals = values_for(idx, &ds.records_in_month(year, month)?);
            let drinking: Vec<i64> = vals.iter().copied().filter(|&v| v > 0).collect();
            (mean(&vals), mean(&drinking))
        }
        None => (None, None),
    };

    let drinking_days = values_for(idx, &records).iter().filter(|&&v| v > 0).count() as f64;
    let dry_days = days_in_year(year) as f64 - drinking_days;

    Ok(MonthlyTrends {
        entity: entity.to_string(),
        year,
        months_first: months.iter().filter(|m| m.rank == 1).count(),
        months_last: months.iter().filter(|m| m.rank == n).count(),
        rank_mean: mean(&ranks),
        rank_mode: mode(&ranks),
        rank_median: median(&ranks),
        rank_std_dev: std_dev(&ranks),
        strongest_month,
        strongest_daily_mean,
        strongest_drinking_mean,
        avg_dry_days_per_month: dry_days / 12.0,
        avg_drinking_days_per_month: drinking_days / 12.0,
        months,
    })
}

pub fn high_consumption_streak(
    ds: &Dataset,
    entity: &str,
    year: i32,
) -> Result<HighConsumptionStreak> {
    let (idx, records) = select(ds, entity, year)?;
    let high: Vec<bool> = records
        .iter()
        .map(|r| r.values[idx] >= HIGH_CONSUMPTION_THRESHOLD)
        .collect();
    Ok(HighConsumptionStreak {
        entity: entity.to_string(),
        year,
        threshold: HIGH_CONSUMPTION_THRESHOLD,
        longest_streak: longest_run(&high),
    })
}

pub fn historical_maximum(ds: &Dataset, entity: &str) -> Result<HistoricalMaximum> {
    let idx = ds.entity_index(entity)?;
    let mut best: Option<(i32, i64)> = None;
    for (year, total) in ds.yearly_totals(idx) {
        // Earliest year wins ties.
        if best.map_or(true, |(_, b)| total > b) {
            best = Some((year, total));
        }
    }
    Ok(HistoricalMaximum {
        entity: entity.to_string(),
        max_annual_total: best.map(|(_, t)| t),
        year: best.map(|(y, _)| y),
    })
}

pub fn top_days(ds: &Dataset, year: i32) -> Result<TopDays> {
    ds.require_year(year)?;
    let mut days: Vec<TopDay> = ds
        .records_in_year(year)
        .into_iter()
        .map(|r| TopDay { date: r.date, total: daily_total(r) })
        .collect();
    // Stable: equal totals keep source order.
    days.sort_by(|a, b| b.total.cmp(&a.total));
    days.truncate(TOP_DAYS);
    Ok(TopDays { year, days })
}

/// Whole-dataset summary: per-year table, all-time entity totals and
/// group totals per calendar month.
pub fn overview(ds: &Dataset) -> Overview {
    let n = ds.entity_count();
    let years = ds
        .available_years()
        .into_iter()
        .map(|year| {
            let totals = entity_totals(n, &ds.records_in_year(year));
            let total = totals.iter().sum();
            YearRow { year, entity_totals: totals, total }
        })
        .collect();

    let all: Vec<&DailyRecord> = ds.records().iter().collect();
    let all_time = ds
        .entities()
        .iter()
        .zip(entity_totals(n, &all))
        .map(|(e, total)| EntityTotal { entity: e.clone(), total })
        .collect();

    let mut month_totals = vec![0i64; 12];
    for r in &all {
        month_totals[(r.month() - 1) as usize] += daily_total(r);
    }

    Overview { entities: ds.entities().to_vec(), years, entity_totals: all_time, month_totals }
}

/// Every per-selection report for one entity and year. Either all of them
/// succeed or the first error is returned.
pub fn insights(ds: &Dataset, entity: &str, year: i32) -> Result<Insights> {
    debug!(entity, year, "computing insights");
    ds.entity_index(entity)?;
    ds.require_year(year)?;
    Ok(Insights {
        entity: entity.to_string(),
        year,
        individual: individual_consumption(ds, entity, year)?,
        overall: overall_consumption(ds, year)?,
        yearly_trend: yearly_trend(ds, entity)?,
        monthly_stats: monthly_stats(ds, entity, year)?,
        streaks: streaks(ds, entity, year)?,
        relative_rankings: relative_rankings(ds, entity, year)?,
        weekday_pattern: weekday_pattern(ds, entity, year)?,
        monthly_trends: monthly_trends(ds, entity, year)?,
        high_consumption: high_consumption_streak(ds, entity, year)?,
        historical_maximum: historical_maximum(ds, entity)?,
        top_days: top_days(ds, year)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RowPolicy;
    use crate::dataset::build_dataset;
    use crate::error::Error;
    use crate::types::RawRow;

    const EPS: f64 = 1e-9;

    fn dataset(entities: &[&str], lines: &[&str]) -> Dataset {
        let rows: Vec<RawRow> = lines
            .iter()
            .enumerate()
            .map(|(i, l)| RawRow::new(i + 2, l.split(',')))
            .collect();
        let entities: Vec<String> = entities.iter().map(|e| e.to_string()).collect();
        build_dataset(&rows, &entities, RowPolicy::Abort).unwrap().0
    }

    fn close(a: Option<f64>, b: f64) -> bool {
        a.map_or(false, |a| (a - b).abs() < EPS)
    }

    fn finite_or_none(v: Option<f64>) -> bool {
        v.map_or(true, f64::is_finite)
    }

    fn three_days() -> Dataset {
        dataset(&["A", "B"], &["2024-01-01,5,3", "2024-01-02,0,2", "2024-01-03,7,1"])
    }

    #[test]
    fn individual_consumption_small_scenario() {
        let r = individual_consumption(&three_days(), "A", 2024).unwrap();
        assert_eq!(r.all_days.total, 12);
        assert_eq!(r.all_days.max, Some(7));
        assert!(close(r.all_days.mean, 4.0));
        assert!(close(r.all_days.median, 5.0));
        assert_eq!(r.drinking_days.days, 2);
        assert!(close(r.drinking_days.mean, 6.0));
        assert!(close(r.drinking_days.median, 6.0));
        assert!(close(r.drinking_days.std_dev, 1.0));

        let band = |label: &str| r.bands.iter().find(|b| b.label == label).unwrap().days;
        assert_eq!(band("10+"), 0);
        assert_eq!(band("6-9"), 1);
        assert_eq!(band("3-5"), 1);
        assert_eq!(band("1-2"), 0);
        assert!(close(r.bands[2].pct, 100.0 / 3.0));
    }

    #[test]
    fn all_zero_entity_reports_sentinels() {
        let ds = dataset(
            &["A", "B"],
            &["2024-01-01,0,3", "2024-01-02,0,2", "2024-01-03,0,0"],
        );
        let r = individual_consumption(&ds, "A", 2024).unwrap();
        assert_eq!(r.all_days.total, 0);
        assert_eq!(r.all_days.std_dev_pct, None);
        assert_eq!(r.drinking_days.days, 0);
        assert_eq!(r.drinking_days.mean, None);
        assert_eq!(r.drinking_days.median, None);
        assert_eq!(r.drinking_days.std_dev, None);
        assert!(r.bands.iter().all(|b| b.days == 0));
        assert_eq!(high_consumption_streak(&ds, "A", 2024).unwrap().longest_streak, 0);

        let all = insights(&ds, "A", 2024).unwrap();
        let floats = [
            all.individual.all_days.mean,
            all.individual.all_days.std_dev_pct,
            all.relative_rankings.share_pct,
            all.relative_rankings.rank_mean,
            all.weekday_pattern.favorite.as_ref().and_then(|f| f.share_pct),
            all.weekday_pattern.favorite.as_ref().and_then(|f| f.mean),
            all.monthly_stats.std_dev_pct,
            all.monthly_trends.strongest_drinking_mean,
            all.yearly_trend.std_dev_pct,
            all.streaks.diff_mean,
        ];
        assert!(floats.iter().all(|v| finite_or_none(*v)));
        assert_eq!(all.relative_rankings.share_pct, Some(0.0));
        assert_eq!(all.monthly_trends.strongest_drinking_mean, None);
        assert_eq!(all.monthly_stats.std_dev_pct, None);
    }

    #[test]
    fn overall_consumption_uses_group_totals() {
        let ds = dataset(
            &["A", "B"],
            &["2024-01-01,5,3", "2024-01-02,0,2", "2024-01-03,7,1", "2024-01-04,1,1"],
        );
        let r = overall_consumption(&ds, 2024).unwrap();
        // daily totals: 8, 2, 8, 2
        assert_eq!(r.total, 20);
        assert!(close(r.total_per_capita, 10.0));
        assert_eq!(r.max_day, Some(8));
        assert_eq!(r.min_day, Some(2));
        assert!(close(r.daily_mean, 5.0));
        assert!(close(r.daily_mean_per_capita, 2.5));
        assert_eq!(r.mode, Some(2));
        assert_eq!(r.mode_days, 2);
        assert!(close(r.median, 5.0));
        assert!(close(r.std_dev, 3.0));
        assert!(close(r.std_dev_pct, 60.0));
        assert_eq!(overall_consumption(&ds, 2020).unwrap_err(), Error::UnknownYear(2020));
    }

    #[test]
    fn yearly_trend_changes() {
        let ds = dataset(
            &["A", "B"],
            &["2022-05-01,100,0", "2023-05-01,150,0", "2024-05-01,90,0"],
        );
        let r = yearly_trend(&ds, "A").unwrap();
        assert_eq!(r.changes.len(), 2);
        assert_eq!(r.changes[0].year, 2023);
        assert_eq!(r.changes[0].change, 50);
        assert!(close(r.changes[0].change_pct, 50.0));
        assert_eq!(r.changes[1].change, -60);
        assert!(close(r.changes[1].change_pct, -40.0));
        assert!(close(r.median, 100.0));

        let zero = yearly_trend(&ds, "B").unwrap();
        assert_eq!(zero.changes[0].change_pct, None);
        assert_eq!(zero.std_dev_pct, None);
    }

    #[test]
    fn monthly_stats_count_empty_months_as_zero() {
        let ds = dataset(&["A"], &["2024-01-10,6", "2024-03-01,6"]);
        let r = monthly_stats(&ds, "A", 2024).unwrap();
        assert_eq!(r.monthly_totals.len(), 12);
        assert_eq!(r.monthly_totals.iter().sum::<i64>(), 12);
        assert_eq!(r.max, Some(6));
        assert_eq!(r.min, Some(0));
        assert!(close(r.mean, 1.0));
        assert!(close(r.median, 0.0));
    }

    #[test]
    fn streaks_report() {
        let ds = dataset(
            &["A", "B"],
            &[
                "2024-01-01,2,0",
                "2024-01-02,3,0",
                "2024-01-03,3,0",
                "2024-01-04,0,0",
                "2024-01-05,0,0",
                "2024-01-06,0,0",
                "2024-01-07,1,0",
            ],
        );
        let r = streaks(&ds, "A", 2024).unwrap();
        // diffs: +1, 0, -3, 0, 0, +1
        assert_eq!((r.increases, r.decreases, r.unchanged), (2, 1, 3));
        assert!(close(r.diff_mean, -1.0 / 6.0));
        assert!(close(r.diff_median, 0.0));
        assert_eq!(r.diff_mode, Some(0));
        assert_eq!(r.longest_drinking_streak, 3);
        assert_eq!(r.longest_dry_streak, 3);
        assert_eq!(r.drinking_days, 4);
        assert_eq!(r.dry_days, 3);
        assert_eq!(r.modal_value, Some(0));
        assert_eq!(r.modal_value_days, 3);
    }

    #[test]
    fn single_day_streaks_have_no_differences() {
        let ds = dataset(&["A"], &["2024-01-01,4"]);
        let r = streaks(&ds, "A", 2024).unwrap();
        assert_eq!(r.diff_mean, None);
        assert_eq!(r.diff_mode, None);
        assert_eq!(r.longest_drinking_streak, 1);
    }

    #[test]
    fn relative_rankings_report() {
        let ds = dataset(
            &["A", "B", "C"],
            &["2024-01-01,5,5,1", "2024-01-02,0,2,1", "2024-01-03,9,1,0"],
        );
        let r = relative_rankings(&ds, "A", 2024).unwrap();
        // totals A=14, B=8, C=2
        assert!(close(r.share_pct, 14.0 / 24.0 * 100.0));
        assert_eq!(r.annual_rank, 1);
        // daily ranks: 1 (tie, earlier index), 3, 1
        assert!(close(r.rank_mean, 5.0 / 3.0));
        assert!(close(r.rank_median, 1.0));
        assert_eq!(r.rank_mode, Some(1));
        assert_eq!(r.days_top, 1);
        assert_eq!(r.days_bottom, 1);

        let b = relative_rankings(&ds, "B", 2024).unwrap();
        assert_eq!(b.annual_rank, 2);
        assert_eq!(b.days_top, 1);
        assert_eq!(b.days_bottom, 0);
    }

    #[test]
    fn weekday_pattern_picks_first_highest_day() {
        // 2024-01-05 is a Friday, 2024-01-06 a Saturday, 2024-01-12 a Friday.
        let ds = dataset(
            &["A"],
            &["2024-01-05,4", "2024-01-06,8", "2024-01-12,4", "2024-01-07,0"],
        );
        let r = weekday_pattern(&ds, "A", 2024).unwrap();
        assert_eq!(r.weekdays.len(), 7);
        assert_eq!(r.weekdays[5].name, "Friday");
        assert_eq!(r.weekdays[5].total, 8);
        assert_eq!(r.weekdays[5].days, 2);
        let fav = r.favorite.unwrap();
        assert_eq!(fav.name, "Friday");
        assert_eq!(fav.number, 5);
        assert!(close(fav.mean, 4.0));
        assert!(close(fav.share_pct, 50.0));
    }

    #[test]
    fn monthly_trends_report() {
        let ds = dataset(
            &["A", "B"],
            &[
                "2023-01-01,9,9",
                "2023-01-02,1,0",
                "2023-02-01,0,4",
                "2023-02-02,2,0",
                "2023-04-01,3,3",
            ],
        );
        let r = monthly_trends(&ds, "A", 2023).unwrap();
        // Jan: A=10 B=9 -> 1; Feb: A=2 B=4 -> 2; Apr: 3,3 -> 1 (tie to A)
        let ranks: Vec<(u32, usize)> = r.months.iter().map(|m| (m.month, m.rank)).collect();
        assert_eq!(ranks, vec![(1, 1), (2, 2), (4, 1)]);
        assert_eq!(r.months_first, 2);
        assert_eq!(r.months_last, 1);
        assert!(close(r.rank_mean, 4.0 / 3.0));
        assert_eq!(r.rank_mode, Some(1));
        assert_eq!(r.strongest_month, Some(1));
        assert!(close(r.strongest_daily_mean, 5.0));
        assert!(close(r.strongest_drinking_mean, 5.0));
        // 4 drinking days in a 365-day year
        assert!((r.avg_drinking_days_per_month - 4.0 / 12.0).abs() < EPS);
        assert!((r.avg_dry_days_per_month - 361.0 / 12.0).abs() < EPS);
    }

    #[test]
    fn monthly_trends_use_leap_year_length() {
        let ds = dataset(&["A"], &["2024-06-01,1"]);
        let r = monthly_trends(&ds, "A", 2024).unwrap();
        assert!((r.avg_dry_days_per_month - 365.0 / 12.0).abs() < EPS);
    }

    #[test]
    fn high_consumption_streak_counts_double_digits() {
        let ds = dataset(
            &["A"],
            &["2024-01-01,10", "2024-01-02,12", "2024-01-03,9", "2024-01-04,11"],
        );
        let r = high_consumption_streak(&ds, "A", 2024).unwrap();
        assert_eq!(r.threshold, 10);
        assert_eq!(r.longest_streak, 2);
    }

    #[test]
    fn historical_maximum_prefers_earliest_year_on_tie() {
        let ds = dataset(&["A"], &["2022-01-01,5", "2023-01-01,8", "2024-01-01,8"]);
        let r = historical_maximum(&ds, "A").unwrap();
        assert_eq!(r.max_annual_total, Some(8));
        assert_eq!(r.year, Some(2023));
    }

    #[test]
    fn top_days_are_stable_on_ties() {
        let ds = dataset(
            &["A", "B"],
            &[
                "2024-01-01,1,1",
                "2024-01-02,3,3",
                "2024-01-03,5,0",
                "2024-01-04,4,2",
                "2023-12-31,50,50",
            ],
        );
        let r = top_days(&ds, 2024).unwrap();
        let got: Vec<(String, i64)> =
            r.days.iter().map(|d| (d.date.to_string(), d.total)).collect();
        assert_eq!(
            got,
            vec![
                ("2024-01-02".to_string(), 6),
                ("2024-01-04".to_string(), 6),
                ("2024-01-03".to_string(), 5),
            ]
        );
    }

    #[test]
    fn overview_totals_agree() {
        let ds = dataset(
            &["A", "B"],
            &["2023-03-01,1,2", "2024-03-05,3,4", "2024-07-01,5,0"],
        );
        let o = overview(&ds);
        assert_eq!(o.years.len(), 2);
        assert_eq!(o.years[1].entity_totals, vec![8, 4]);
        assert_eq!(o.years[1].total, 12);
        assert_eq!(o.entity_totals[0].total, 9);
        assert_eq!(o.month_totals[2], 10);
        assert_eq!(o.month_totals[6], 5);
        let by_year: i64 = o.years.iter().map(|y| y.total).sum();
        let by_entity: i64 = o.entity_totals.iter().map(|e| e.total).sum();
        assert_eq!(by_year, by_entity);
        assert_eq!(by_year, o.month_totals.iter().sum::<i64>());
    }

    #[test]
    fn unknown_selection_is_rejected() {
        let ds = three_days();
        assert!(matches!(
            insights(&ds, "Z", 2024),
            Err(Error::UnknownEntity { .. })
        ));
        assert_eq!(insights(&ds, "A", 1999).unwrap_err(), Error::UnknownYear(1999));
        assert!(matches!(historical_maximum(&ds, "Q"), Err(Error::UnknownEntity { .. })));
    }
}
