// src/sim/sentiment.rs
// Hold-last sentiment resolution

use chrono::NaiveDate;

use crate::data::SentimentSeries;

/// A sentiment value effective on a requested date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSentiment {
    /// The date the value was actually recorded on
    pub date: NaiveDate,
    pub value: u8,
    pub label: String,
    /// True when this is a held-last value rather than an exact hit
    pub held: bool,
}

/// Resolve the sentiment effective on `date`.
///
/// Exact entries are returned verbatim; otherwise the most recent earlier
/// entry is held ("hold-last"). `None` means the series has not started yet.
pub fn resolve(date: NaiveDate, series: &SentimentSeries) -> Option<ResolvedSentiment> {
    if let Some(entry) = series.entry(date) {
        return Some(ResolvedSentiment {
            date,
            value: entry.value,
            label: entry.label.clone(),
            held: false,
        });
    }

    series
        .last_before(date)
        .map(|(source_date, entry)| ResolvedSentiment {
            date: source_date,
            value: entry.value,
            label: entry.label.clone(),
            held: true,
        })
}
