// Console and file presentation of computed reports.
//
// Reports stay numeric until they reach this module; rounding, thousands
// separators and the `n/a` placeholder are applied here only.
use crate::error::Result;
use crate::types::{
    HighConsumptionStreak, HistoricalMaximum, IndividualConsumption, Insights, MonthlyStats,
    MonthlyTrends, OverallConsumption, Overview, RelativeRankings, Streaks, TopDays,
    WeekdayPattern, YearlyTrend,
};
use crate::util::{
    format_int, format_number, format_opt, format_opt_int, format_pct, format_signed,
    NOT_APPLICABLE,
};
use serde::Serialize;
use std::path::Path;
use tabled::{builder::Builder, settings::Style, Table, Tabled};

#[derive(Debug, Clone, PartialEq, Tabled)]
pub struct ReportLine {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Share")]
    pub share: String,
}

impl ReportLine {
    fn new(metric: impl Into<String>, value: impl Into<String>) -> Self {
        Self { metric: metric.into(), value: value.into(), share: String::new() }
    }

    fn with_share(mut self, pct: Option<f64>) -> Self {
        self.share = format_pct(pct);
        self
    }
}

/// A report that can be shown as a two-column metric table.
pub trait ReportView {
    fn title(&self) -> String;
    fn lines(&self) -> Vec<ReportLine>;
}

impl ReportView for IndividualConsumption {
    fn title(&self) -> String {
        format!("Individual consumption: {} in {}", self.entity, self.year)
    }

    fn lines(&self) -> Vec<ReportLine> {
        let a = &self.all_days;
        let d = &self.drinking_days;
        let mut out = vec![
            ReportLine::new("Total", format_int(a.total)),
            ReportLine::new("Max in a day", format_opt_int(a.max)),
            ReportLine::new("Mean", format_opt(a.mean)),
            ReportLine::new("Median", format_opt(a.median)),
            ReportLine::new("Std dev", format_opt(a.std_dev)).with_share(a.std_dev_pct),
            ReportLine::new("Drinking days", format_int(d.days)),
            ReportLine::new("Mean while drinking", format_opt(d.mean)),
            ReportLine::new("Median while drinking", format_opt(d.median)),
            ReportLine::new("Std dev while drinking", format_opt(d.std_dev))
                .with_share(d.std_dev_pct),
        ];
        for band in &self.bands {
            out.push(
                ReportLine::new(format!("Days with {}", band.label), format_int(band.days))
                    .with_share(band.pct),
            );
        }
        out
    }
}

impl ReportView for OverallConsumption {
    fn title(&self) -> String {
        format!("Overall consumption in {}", self.year)
    }

    fn lines(&self) -> Vec<ReportLine> {
        let per_head = |v: Option<f64>| format!("{} per head", format_opt(v));
        vec![
            ReportLine::new(
                "Annual total",
                format!("{} ({})", format_int(self.total), per_head(self.total_per_capita)),
            ),
            ReportLine::new("Max in a day", format_opt_int(self.max_day)),
            ReportLine::new("Min in a day", format_opt_int(self.min_day)),
            ReportLine::new(
                "Daily mean",
                format!("{} ({})", format_opt(self.daily_mean), per_head(self.daily_mean_per_capita)),
            ),
            ReportLine::new(
                "Mode",
                format!("{} ({})", format_opt_int(self.mode), per_head(self.mode_per_capita)),
            ),
            ReportLine::new("Days at the mode", format_int(self.mode_days)),
            ReportLine::new(
                "Median",
                format!("{} ({})", format_opt(self.median), per_head(self.median_per_capita)),
            ),
            ReportLine::new("Std dev", format_opt(self.std_dev)).with_share(self.std_dev_pct),
        ]
    }
}

impl ReportView for YearlyTrend {
    fn title(&self) -> String {
        format!("Yearly trend: {}", self.entity)
    }

    fn lines(&self) -> Vec<ReportLine> {
        let mut out: Vec<ReportLine> = self
            .totals
            .iter()
            .map(|t| ReportLine::new(format!("{} total", t.year), format_int(t.total)))
            .collect();
        for c in &self.changes {
            out.push(
                ReportLine::new(format!("{} change", c.year), format_signed(c.change))
                    .with_share(c.change_pct),
            );
        }
        out.push(ReportLine::new("Mean", format_opt(self.mean)));
        out.push(ReportLine::new("Median", format_opt(self.median)));
        out.push(ReportLine::new("Std dev", format_opt(self.std_dev)).with_share(self.std_dev_pct));
        out
    }
}

impl ReportView for MonthlyStats {
    fn title(&self) -> String {
        format!("Monthly stats: {} in {}", self.entity, self.year)
    }

    fn lines(&self) -> Vec<ReportLine> {
        vec![
            ReportLine::new("Max", format_opt_int(self.max)),
            ReportLine::new("Min", format_opt_int(self.min)),
            ReportLine::new("Mean", format_opt(self.mean)),
            ReportLine::new("Median", format_opt(self.median)),
            ReportLine::new("Std dev", format_opt(self.std_dev)).with_share(self.std_dev_pct),
        ]
    }
}

impl ReportView for Streaks {
    fn title(&self) -> String {
        format!("Streaks: {} in {}", self.entity, self.year)
    }

    fn lines(&self) -> Vec<ReportLine> {
        vec![
            ReportLine::new("Days above previous", format_int(self.increases)),
            ReportLine::new("Days below previous", format_int(self.decreases)),
            ReportLine::new("Days equal to previous", format_int(self.unchanged)),
            ReportLine::new("Mean difference", format_opt(self.diff_mean)),
            ReportLine::new("Median difference", format_opt(self.diff_median)),
            ReportLine::new("Mode difference", format_opt_int(self.diff_mode)),
            ReportLine::new("Longest drinking streak", format_int(self.longest_drinking_streak)),
            ReportLine::new("Longest dry streak", format_int(self.longest_dry_streak)),
            ReportLine::new("Drinking days", format_int(self.drinking_days)),
            ReportLine::new("Dry days", format_int(self.dry_days)),
            ReportLine::new("Modal amount", format_opt_int(self.modal_value)),
            ReportLine::new("Days at modal amount", format_int(self.modal_value_days)),
        ]
    }
}

impl ReportView for RelativeRankings {
    fn title(&self) -> String {
        format!("Relative rankings: {} in {}", self.entity, self.year)
    }

    fn lines(&self) -> Vec<ReportLine> {
        vec![
            ReportLine::new("Share of group total", format_pct(self.share_pct)),
            ReportLine::new("Annual position", format_int(self.annual_rank)),
            ReportLine::new("Mean daily position", format_opt(self.rank_mean)),
            ReportLine::new("Median daily position", format_opt(self.rank_median)),
            ReportLine::new("Modal daily position", format_opt_int(self.rank_mode)),
            ReportLine::new("Days drinking the most", format_int(self.days_top)),
            ReportLine::new("Days drinking the least", format_int(self.days_bottom)),
        ]
    }
}

impl ReportView for WeekdayPattern {
    fn title(&self) -> String {
        format!("Weekdays: {} in {}", self.entity, self.year)
    }

    fn lines(&self) -> Vec<ReportLine> {
        match &self.favorite {
            Some(f) => vec![
                ReportLine::new("Favorite day", f.name),
                ReportLine::new("Total on that day", format_int(f.total)),
                ReportLine::new("Mean on that day", format_opt(f.mean)),
                ReportLine::new("Share of annual total", format_pct(f.share_pct)),
            ],
            None => vec![ReportLine::new("Favorite day", NOT_APPLICABLE)],
        }
    }
}

impl ReportView for MonthlyTrends {
    fn title(&self) -> String {
        format!("Monthly trends: {} in {}", self.entity, self.year)
    }

    fn lines(&self) -> Vec<ReportLine> {
        vec![
            ReportLine::new("Months drinking the most", format_int(self.months_first)),
            ReportLine::new("Months drinking the least", format_int(self.months_last)),
            ReportLine::new("Mean monthly position", format_opt(self.rank_mean)),
            ReportLine::new("Modal monthly position", format_opt_int(self.rank_mode)),
            ReportLine::new("Median monthly position", format_opt(self.rank_median)),
            ReportLine::new("Position std dev", format_opt(self.rank_std_dev)),
            ReportLine::new(
                "Strongest month",
                self.strongest_month
                    .map(|m| format!("{:02}", m))
                    .unwrap_or_else(|| NOT_APPLICABLE.to_string()),
            ),
            ReportLine::new("Daily mean in strongest month", format_opt(self.strongest_daily_mean)),
            ReportLine::new(
                "Daily mean without zeros in strongest month",
                format_opt(self.strongest_drinking_mean),
            ),
            ReportLine::new(
                "Mean dry days per month",
                format_number(self.avg_dry_days_per_month, 2),
            ),
            ReportLine::new(
                "Mean drinking days per month",
                format_number(self.avg_drinking_days_per_month, 2),
            ),
        ]
    }
}

impl ReportView for HighConsumptionStreak {
    fn title(&self) -> String {
        format!("High consumption: {} in {}", self.entity, self.year)
    }

    fn lines(&self) -> Vec<ReportLine> {
        vec![ReportLine::new(
            format!("Longest streak at {}+", self.threshold),
            format_int(self.longest_streak),
        )]
    }
}

impl ReportView for HistoricalMaximum {
    fn title(&self) -> String {
        format!("Historical maximum: {}", self.entity)
    }

    fn lines(&self) -> Vec<ReportLine> {
        let year = self.year.map(|y| y.to_string()).unwrap_or_else(|| NOT_APPLICABLE.to_string());
        vec![
            ReportLine::new("Best annual total", format_opt_int(self.max_annual_total)),
            ReportLine::new("Reached in", year),
        ]
    }
}

impl ReportView for TopDays {
    fn title(&self) -> String {
        format!("Top days in {}", self.year)
    }

    fn lines(&self) -> Vec<ReportLine> {
        self.days
            .iter()
            .map(|d| ReportLine::new(d.date.to_string(), format_int(d.total)))
            .collect()
    }
}

pub fn report_table(report: &dyn ReportView) -> String {
    Table::new(report.lines()).with(Style::markdown()).to_string()
}

pub fn preview_report(report: &dyn ReportView) {
    println!("{}\n", report.title());
    let lines = report.lines();
    if lines.is_empty() {
        println!("(no rows)\n");
        return;
    }
    println!("{}\n", report_table(report));
}

pub fn preview_insights(all: &Insights) {
    let reports: [&dyn ReportView; 11] = [
        &all.individual,
        &all.overall,
        &all.yearly_trend,
        &all.monthly_stats,
        &all.streaks,
        &all.relative_rankings,
        &all.weekday_pattern,
        &all.monthly_trends,
        &all.high_consumption,
        &all.historical_maximum,
        &all.top_days,
    ];
    for r in reports {
        preview_report(r);
    }
}

/// Per-year table: one row per year, one column per entity, plus totals.
pub fn overview_table(overview: &Overview) -> String {
    let mut builder = Builder::default();
    let mut header = vec!["Year".to_string()];
    header.extend(overview.entities.iter().cloned());
    header.push("Total".to_string());
    builder.push_record(header);
    for row in &overview.years {
        let mut cells = vec![row.year.to_string()];
        cells.extend(row.entity_totals.iter().map(|t| format_int(*t)));
        cells.push(format_int(row.total));
        builder.push_record(cells);
    }
    let mut all_time = vec!["All".to_string()];
    all_time.extend(overview.entity_totals.iter().map(|e| format_int(e.total)));
    all_time.push(format_int(overview.entity_totals.iter().map(|e| e.total).sum::<i64>()));
    builder.push_record(all_time);
    builder.build().with(Style::markdown()).to_string()
}

pub fn preview_overview(overview: &Overview) {
    println!("Overview\n");
    println!("{}\n", overview_table(overview));
    let months: Vec<String> = overview
        .month_totals
        .iter()
        .enumerate()
        .map(|(i, t)| format!("{:02}: {}", i + 1, format_int(*t)))
        .collect();
    println!("Group totals by month: {}\n", months.join(", "));
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn write_overview_csv(path: &Path, overview: &Overview) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    let mut header = vec!["year".to_string()];
    header.extend(overview.entities.iter().cloned());
    header.push("total".to_string());
    wtr.write_record(&header)?;
    for row in &overview.years {
        let mut cells = vec![row.year.to_string()];
        cells.extend(row.entity_totals.iter().map(|t| t.to_string()));
        cells.push(row.total.to_string());
        wtr.write_record(&cells)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BandCount, SubsetStats, TopDay, YearRow, EntityTotal};
    use chrono::NaiveDate;

    fn empty_subset() -> SubsetStats {
        SubsetStats {
            days: 0,
            total: 0,
            max: None,
            mean: None,
            median: None,
            std_dev: None,
            std_dev_pct: None,
        }
    }

    #[test]
    fn undefined_statistics_render_as_not_applicable() {
        let r = IndividualConsumption {
            entity: "A".into(),
            year: 2024,
            all_days: empty_subset(),
            drinking_days: empty_subset(),
            bands: vec![BandCount { label: "10+", days: 0, pct: None }],
        };
        let lines = r.lines();
        let mean = lines.iter().find(|l| l.metric == "Mean while drinking").unwrap();
        assert_eq!(mean.value, "n/a");
        let band = lines.iter().find(|l| l.metric == "Days with 10+").unwrap();
        assert_eq!(band.share, "n/a");
        let table = report_table(&r);
        assert!(!table.contains("NaN"));
        assert!(!table.contains("inf"));
    }

    #[test]
    fn top_days_lines_keep_order() {
        let r = TopDays {
            year: 2024,
            days: vec![
                TopDay { date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), total: 1200 },
                TopDay { date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), total: 9 },
            ],
        };
        let lines = r.lines();
        assert_eq!(lines[0].metric, "2024-03-01");
        assert_eq!(lines[0].value, "1,200");
        assert_eq!(lines[1].metric, "2024-01-01");
    }

    fn sample_overview() -> Overview {
        Overview {
            entities: vec!["A".into(), "B".into()],
            years: vec![YearRow { year: 2024, entity_totals: vec![3, 4], total: 7 }],
            entity_totals: vec![
                EntityTotal { entity: "A".into(), total: 3 },
                EntityTotal { entity: "B".into(), total: 4 },
            ],
            month_totals: vec![7, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        }
    }

    #[test]
    fn overview_table_has_entity_columns() {
        let table = overview_table(&sample_overview());
        assert!(table.contains("Year"));
        assert!(table.contains("Total"));
        assert!(table.contains("2024"));
        assert!(table.contains("All"));
    }

    #[test]
    fn writes_json_and_csv() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("overview.csv");
        write_overview_csv(&csv_path, &sample_overview()).unwrap();
        let text = std::fs::read_to_string(&csv_path).unwrap();
        assert_eq!(text, "year,A,B,total\n2024,3,4,7\n");

        let json_path = dir.path().join("overview.json");
        write_json(&json_path, &sample_overview()).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(value["years"][0]["total"], 7);
    }
}
