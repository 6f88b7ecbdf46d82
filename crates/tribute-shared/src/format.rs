//! Presentation helpers shared by the memorial pages.
//!
//! Dates are rendered the way the Indonesian locale prints them
//! (`17 Agustus 1945`), in a caller-supplied UTC offset.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Timelike, Utc};

use crate::constants::MAX_SLUG_LEN;
use crate::models::Story;

const MONTHS_ID: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

/// `17 Agustus 1945`
pub fn format_long_date(date: NaiveDate) -> String {
    format!(
        "{} {} {}",
        date.day(),
        MONTHS_ID[date.month0() as usize],
        date.year()
    )
}

/// `12 Januari 2024 pukul 14.05`, in the given offset.
pub fn format_timestamp(ts: DateTime<Utc>, offset: FixedOffset) -> String {
    let local = ts.with_timezone(&offset);
    format!(
        "{} pukul {:02}.{:02}",
        format_long_date(local.date_naive()),
        local.hour(),
        local.minute()
    )
}

/// Date shown on a story card: the story date when the author gave one,
/// otherwise the day it was posted.
pub fn story_display_date(story: &Story, offset: FixedOffset) -> String {
    match story.story_date {
        Some(date) => format_long_date(date),
        None => format_long_date(story.created_at.with_timezone(&offset).date_naive()),
    }
}

/// `1950 - 2020`, `1950 - Sekarang` for the living, `None` without a birth
/// date.
pub fn format_lifespan(birth: Option<NaiveDate>, death: Option<NaiveDate>) -> Option<String> {
    match (birth, death) {
        (Some(b), Some(d)) => Some(format!("{} - {}", b.year(), d.year())),
        (Some(b), None) => Some(format!("{} - Sekarang", b.year())),
        _ => None,
    }
}

/// Up to two uppercase initials, used as avatar fallback.
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect()
}

/// Derive a memorial slug from a display name.
///
/// Lowercases, drops everything outside `[a-z0-9]` and whitespace, joins
/// words with `-` and caps the result at [`MAX_SLUG_LEN`] characters.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.trim().to_lowercase().chars() {
        if c.is_whitespace() {
            pending_dash = true;
        } else if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        }
    }

    slug.truncate(MAX_SLUG_LEN);
    slug
}
