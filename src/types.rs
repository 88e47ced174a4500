use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// One CSV data record before validation, with its 1-based source line.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub line: usize,
    pub fields: Vec<String>,
}

impl RawRow {
    pub fn new<I, S>(line: usize, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { line, fields: fields.into_iter().map(Into::into).collect() }
    }
}

/// One day of data. `values[i]` belongs to the dataset's i-th entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub values: Vec<u32>,
}

impl DailyRecord {
    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn month(&self) -> u32 {
        self.date.month()
    }

    pub(crate) fn value(&self, entity: usize) -> i64 {
        i64::from(self.values[entity])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRow {
    pub line: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub skipped_rows: usize,
    pub skipped: Vec<SkippedRow>,
}

/// Descriptive stats over one subset of an entity's days.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubsetStats {
    pub days: usize,
    pub total: i64,
    pub max: Option<i64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub std_dev: Option<f64>,
    pub std_dev_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandCount {
    pub label: &'static str,
    pub days: usize,
    pub pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndividualConsumption {
    pub entity: String,
    pub year: i32,
    pub all_days: SubsetStats,
    pub drinking_days: SubsetStats,
    pub bands: Vec<BandCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallConsumption {
    pub year: i32,
    pub days: usize,
    pub entity_count: usize,
    pub total: i64,
    pub total_per_capita: Option<f64>,
    pub max_day: Option<i64>,
    pub min_day: Option<i64>,
    pub daily_mean: Option<f64>,
    pub daily_mean_per_capita: Option<f64>,
    pub mode: Option<i64>,
    pub mode_per_capita: Option<f64>,
    pub mode_days: usize,
    pub median: Option<f64>,
    pub median_per_capita: Option<f64>,
    pub std_dev: Option<f64>,
    pub std_dev_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearTotal {
    pub year: i32,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearChange {
    pub year: i32,
    pub previous_total: i64,
    pub total: i64,
    pub change: i64,
    pub change_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyTrend {
    pub entity: String,
    pub totals: Vec<YearTotal>,
    pub changes: Vec<YearChange>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub std_dev: Option<f64>,
    pub std_dev_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyStats {
    pub entity: String,
    pub year: i32,
    pub monthly_totals: Vec<i64>,
    pub max: Option<i64>,
    pub min: Option<i64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub std_dev: Option<f64>,
    pub std_dev_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Streaks {
    pub entity: String,
    pub year: i32,
    pub increases: usize,
    pub decreases: usize,
    pub unchanged: usize,
    pub diff_mean: Option<f64>,
    pub diff_median: Option<f64>,
    pub diff_mode: Option<i64>,
    pub longest_drinking_streak: usize,
    pub longest_dry_streak: usize,
    pub drinking_days: usize,
    pub dry_days: usize,
    pub modal_value: Option<i64>,
    pub modal_value_days: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelativeRankings {
    pub entity: String,
    pub year: i32,
    pub share_pct: Option<f64>,
    pub annual_rank: usize,
    pub rank_mean: Option<f64>,
    pub rank_median: Option<f64>,
    pub rank_mode: Option<i64>,
    pub days_top: usize,
    pub days_bottom: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdayTotal {
    /// 0 = Sunday .. 6 = Saturday.
    pub number: u32,
    pub name: &'static str,
    pub total: i64,
    pub days: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FavoriteDay {
    pub number: u32,
    pub name: &'static str,
    pub total: i64,
    pub mean: Option<f64>,
    pub share_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdayPattern {
    pub entity: String,
    pub year: i32,
    pub weekdays: Vec<WeekdayTotal>,
    pub favorite: Option<FavoriteDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthRank {
    pub month: u32,
    pub rank: usize,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTrends {
    pub entity: String,
    pub year: i32,
    pub months: Vec<MonthRank>,
    pub months_first: usize,
    pub months_last: usize,
    pub rank_mean: Option<f64>,
    pub rank_mode: Option<i64>,
    pub rank_median: Option<f64>,
    pub rank_std_dev: Option<f64>,
    pub strongest_month: Option<u32>,
    pub strongest_daily_mean: Option<f64>,
    pub strongest_drinking_mean: Option<f64>,
    pub avg_dry_days_per_month: f64,
    pub avg_drinking_days_per_month: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighConsumptionStreak {
    pub entity: String,
    pub year: i32,
    pub threshold: u32,
    pub longest_streak: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoricalMaximum {
    pub entity: String,
    pub max_annual_total: Option<i64>,
    pub year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopDay {
    pub date: NaiveDate,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopDays {
    pub year: i32,
    pub days: Vec<TopDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearRow {
    pub year: i32,
    pub entity_totals: Vec<i64>,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityTotal {
    pub entity: String,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub entities: Vec<String>,
    pub years: Vec<YearRow>,
    pub entity_totals: Vec<EntityTotal>,
    /// Group totals per calendar month (index 0 = January) over all years.
    pub month_totals: Vec<i64>,
}

/// Every per-selection report, computed together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insights {
    pub entity: String,
    pub year: i32,
    pub individual: IndividualConsumption,
    pub overall: OverallConsumption,
    pub yearly_trend: YearlyTrend,
    pub monthly_stats: MonthlyStats,
    pub streaks: Streaks,
    pub relative_rankings: RelativeRankings,
    pub weekday_pattern: WeekdayPattern,
    pub monthly_trends: MonthlyTrends,
    pub high_consumption: HighConsumptionStreak,
    pub historical_maximum: HistoricalMaximum,
    pub top_days: TopDays,
}
