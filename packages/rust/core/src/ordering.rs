//! Presentation ordering and date helpers.

use std::cmp::Reverse;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;

use camara_shared::{Approval, Author, Poll, Procedure};

/// Timestamp layouts served by the open-data API, most common first.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// Parse a remote timestamp. Offsets are dropped, keeping wall-clock time.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// `dd/mm/yyyy`, or `None` when the input does not parse.
pub fn format_date_br(raw: &str) -> Option<String> {
    parse_timestamp(raw).map(|dt| dt.format("%d/%m/%Y").to_string())
}

/// Authors by ascending signature order; ties keep input order.
pub fn sort_authors(authors: &mut [Author]) {
    authors.sort_by_key(|a| a.signature_order);
}

/// Newest first; missing or unparseable timestamps last, in input order.
pub fn sort_procedures_desc(procedures: &mut [Procedure]) {
    sort_desc_by(procedures, |p| p.timestamp.as_deref());
}

/// Newest first by registration time (falling back to the poll date).
pub fn sort_polls_desc(polls: &mut [Poll]) {
    sort_desc_by(polls, Poll::timestamp);
}

fn sort_desc_by<T>(items: &mut [T], timestamp: fn(&T) -> Option<&str>) {
    // sort_by_cached_key is stable, so equal keys keep their input order.
    items.sort_by_cached_key(|item| {
        let parsed = timestamp(item).and_then(parse_timestamp);
        (parsed.is_none(), Reverse(parsed))
    });
}

// ---------------------------------------------------------------------------
// Poll summary
// ---------------------------------------------------------------------------

/// Outcome counts over a proposition's polls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PollSummary {
    pub total: usize,
    pub approved: usize,
    pub rejected: usize,
    pub not_applicable: usize,
}

impl PollSummary {
    pub fn from_polls(polls: &[Poll]) -> Self {
        polls.iter().fold(Self::default(), |mut acc, poll| {
            acc.total += 1;
            match poll.approval {
                Approval::Approved => acc.approved += 1,
                Approval::Rejected => acc.rejected += 1,
                Approval::NotApplicable => acc.not_applicable += 1,
            }
            acc
        })
    }
}
