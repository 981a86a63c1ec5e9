//! Calendar-month window math for the activity-trend endpoints.

use {
    chrono::NaiveDate,
    serde::Deserialize,
};

use crate::models::TrendPoint;

/// A calendar month as `[start, end]` (first and last day, inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Review count for one `(year, month)` bucket, as produced by the
/// `$group` stage.
#[derive(Debug, Clone, Deserialize)]
pub struct MonthCount {
    #[serde(rename = "_id")]
    pub month: MonthKey,
    pub count: i64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

/// The `count` trailing calendar months, current month first.
pub fn trailing_month_windows(today: NaiveDate, count: usize) -> Vec<MonthWindow> {
    use chrono::Datelike;

    (0..count)
        .filter_map(|back| {
            let (year, month) = shift_back(today.year(), today.month(), back as i32);
            let start = NaiveDate::from_ymd_opt(year, month, 1)?;
            let end = NaiveDate::from_ymd_opt(year, month, days_in_month(year, month))?;
            Some(MonthWindow { start, end })
        })
        .collect()
}

/// Cumulative activity: for each window (current month first) the number of
/// reviews written in or before that month. Counts never increase while
/// walking back in time.
pub fn cumulative_counts(windows: &[MonthWindow], grouped: &[MonthCount]) -> Vec<TrendPoint> {
    use chrono::Datelike;

    windows
        .iter()
        .map(|window| {
            let count = grouped
                .iter()
                .filter(|g| {
                    (g.month.year, g.month.month) <= (window.end.year(), window.end.month())
                })
                .map(|g| g.count)
                .sum();
            TrendPoint {
                date: window.end,
                count,
            }
        })
        .collect()
}

fn shift_back(year: i32, month: u32, back: i32) -> (i32, u32) {
    // Zero-based month arithmetic, then back to one-based.
    let total = year * 12 + month as i32 - 1 - back;
    (total.div_euclid(12), (total.rem_euclid(12) + 1) as u32)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ => {
            if (year % 4 == 0 && year % 100 != 0) || year % 400 == 0 {
                29
            } else {
                28
            }
        },
    }
}
