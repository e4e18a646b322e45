// src/sim/schedule.rs
// Purchase schedule generation

use chrono::{Datelike, Duration, NaiveDate};

use crate::sim::types::Cadence;

/// Generate the ordered sequence of purchase attempt dates.
///
/// Daily steps one calendar day, weekly seven. Monthly anchors on the
/// day-of-month of `start` and clamps to the last day of shorter months;
/// the clamp is not sticky - the anchor is re-derived from `start` every
/// step, so a 31st recovers after a 30-day month.
///
/// `start > end` yields an empty schedule.
pub fn generate_schedule(start: NaiveDate, end: NaiveDate, cadence: Cadence) -> Vec<NaiveDate> {
    let mut dates = Vec::new();

    match cadence {
        Cadence::Daily | Cadence::Weekly => {
            let step = match cadence {
                Cadence::Daily => Duration::days(1),
                _ => Duration::days(7),
            };
            let mut d = start;
            while d <= end {
                dates.push(d);
                d += step;
            }
        }
        Cadence::Monthly => {
            let anchor_day = start.day();
            let mut months = 0u32;
            loop {
                let d = month_offset(start, anchor_day, months);
                if d > end {
                    break;
                }
                dates.push(d);
                months += 1;
            }
        }
    }

    dates
}

/// The anchor day `months` calendar months after `start`, clamped to the
/// target month's length.
fn month_offset(start: NaiveDate, anchor_day: u32, months: u32) -> NaiveDate {
    let total = start.year() * 12 + start.month0() as i32 + months as i32;
    let year = total.div_euclid(12);
    let month = total.rem_euclid(12) as u32 + 1;
    let day = anchor_day.min(days_in_month(year, month));
    // Valid by construction: day is within the month's length
    NaiveDate::from_ymd_opt(year, month, day).expect("clamped day is always valid")
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .expect("first of month is always valid")
        .pred_opt()
        .expect("first of month always has a predecessor")
        .day()
}
