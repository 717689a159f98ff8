// Cumulative trend series and the flat-rate month-end projection for the
// temporal chart.
use chrono::{Datelike, NaiveDate};

use crate::types::DailyCount;
use crate::util::mean;

/// Fixed daily targets for the dashed goal lines.
pub const DAILY_CONTACT_TARGET: f64 = 580.0;
pub const DAILY_REGISTRATION_TARGET: f64 = 11.0;

/// Daily values averaged for the projection rate.
pub const PROJECTION_WINDOW: usize = 20;

/// Running prefix sum: one cumulative figure per input day.
pub fn cumulative(values: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    let mut total = 0.0;
    for v in values {
        total += v;
        out.push(total);
    }
    out
}

/// Mean of the last `window` values (fewer if the series is shorter; 0 when
/// empty).
pub fn trailing_mean(values: &[f64], window: usize) -> f64 {
    let start = values.len().saturating_sub(window);
    mean(&values[start..])
}

/// Calendar days left in `date`'s month, excluding `date` itself and
/// including the last day of the month.
pub fn days_left_in_month(date: NaiveDate) -> u32 {
    let (year, month) = (date.year(), date.month());
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .unwrap();
    let days_in_month = first_of_next.pred_opt().unwrap().day();
    days_in_month - date.day()
}

/// Chart-ready cumulative series: historical prefix sums extended by
/// `horizon` projected points, plus the cumulated target lines over the full
/// length.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ProjectionSeries {
    pub labels: Vec<String>,
    pub contacts: Vec<f64>,
    pub registrations: Vec<f64>,
    pub contact_target: Vec<f64>,
    pub registration_target: Vec<f64>,
    /// Index where projected points begin in every series.
    pub history_len: usize,
}

/// Extend the cumulative series with a flat-rate projection: each synthetic
/// point adds the trailing 20-day mean, estimated once and not re-fitted per
/// step.
pub fn project(daily: &[DailyCount], horizon: usize) -> ProjectionSeries {
    let contacts_daily: Vec<f64> = daily.iter().map(|d| d.contacts).collect();
    let registrations_daily: Vec<f64> = daily.iter().map(|d| d.registrations).collect();

    let contact_rate = trailing_mean(&contacts_daily, PROJECTION_WINDOW);
    let registration_rate = trailing_mean(&registrations_daily, PROJECTION_WINDOW);

    let mut contacts = cumulative(&contacts_daily);
    let mut registrations = cumulative(&registrations_daily);
    let mut last_contacts = contacts.last().copied().unwrap_or(0.0);
    let mut last_registrations = registrations.last().copied().unwrap_or(0.0);
    for _ in 0..horizon {
        last_contacts += contact_rate;
        last_registrations += registration_rate;
        contacts.push(last_contacts);
        registrations.push(last_registrations);
    }

    let mut labels: Vec<String> = daily.iter().map(|d| d.date.clone()).collect();
    labels.extend((1..=horizon).map(|i| format!("Proj+{i}")));

    let total_len = labels.len();
    let target_line = |per_day: f64| cumulative(&vec![per_day; total_len]);

    ProjectionSeries {
        contacts,
        registrations,
        contact_target: target_line(DAILY_CONTACT_TARGET),
        registration_target: target_line(DAILY_REGISTRATION_TARGET),
        labels,
        history_len: daily.len(),
    }
}
