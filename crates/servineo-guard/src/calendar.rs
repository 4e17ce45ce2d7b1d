// SPDX-FileCopyrightText: 2026 Servineo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local-time helpers: estimated response date and display formats.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Offset, Utc, Weekday};

/// Business days between registration and the promised answer.
pub const RESPONSE_BUSINESS_DAYS: u32 = 2;

/// Descriptions longer than this are shortened in messages.
pub const DESCRIPTION_PREVIEW_CHARS: usize = 20;

/// Fixed offset for `hours` east of UTC; out-of-range values fall back to UTC.
pub fn local_offset(hours: i32) -> FixedOffset {
    FixedOffset::east_opt(hours * 3600).unwrap_or_else(|| Utc.fix())
}

/// Date by which the requester can expect an answer.
///
/// Walks forward from `registered` one day at a time until
/// [`RESPONSE_BUSINESS_DAYS`] working days have been counted. Sundays never
/// count; Saturdays count only when the requester works Saturdays.
pub fn estimated_response_date(registered: NaiveDate, work_on_saturday: bool) -> NaiveDate {
    let mut date = registered;
    let mut counted = 0;
    while counted < RESPONSE_BUSINESS_DAYS {
        date += Duration::days(1);
        match date.weekday() {
            Weekday::Sun => {}
            Weekday::Sat if !work_on_saturday => {}
            _ => counted += 1,
        }
    }
    date
}

/// `dd/mm/yyyy HH:MM` in the given offset.
pub fn format_timestamp(at: DateTime<Utc>, offset: FixedOffset) -> String {
    at.with_timezone(&offset).format("%d/%m/%Y %H:%M").to_string()
}

/// `dd/mm/yyyy`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Short description for message bodies.
pub fn description_preview(description: &str) -> String {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return "(sin descripción)".to_string();
    }
    if trimmed.chars().count() <= DESCRIPTION_PREVIEW_CHARS {
        return trimmed.to_string();
    }
    let head: String = trimmed.chars().take(DESCRIPTION_PREVIEW_CHARS).collect();
    format!("{head}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn midweek_registration_adds_two_days() {
        // Monday 13 Oct 2025 -> Wednesday 15 Oct.
        assert_eq!(estimated_response_date(date(2025, 10, 13), false), date(2025, 10, 15));
    }

    #[test]
    fn weekend_is_skipped() {
        // Thursday 16 Oct -> Friday 17, skip Sat 18 and Sun 19 -> Monday 20.
        assert_eq!(estimated_response_date(date(2025, 10, 16), false), date(2025, 10, 20));
    }

    #[test]
    fn saturday_counts_for_saturday_workers() {
        // Thursday 16 Oct -> Friday 17, Saturday 18.
        assert_eq!(estimated_response_date(date(2025, 10, 16), true), date(2025, 10, 18));
        // Friday 17 Oct -> Saturday 18, skip Sunday -> Monday 20.
        assert_eq!(estimated_response_date(date(2025, 10, 17), true), date(2025, 10, 20));
    }

    #[test]
    fn sunday_registration() {
        // Sunday 19 Oct -> Monday 20, Tuesday 21.
        assert_eq!(estimated_response_date(date(2025, 10, 19), false), date(2025, 10, 21));
    }

    #[test]
    fn timestamp_uses_local_offset() {
        let at = Utc.with_ymd_and_hms(2025, 10, 14, 2, 5, 0).unwrap();
        assert_eq!(format_timestamp(at, local_offset(-4)), "13/10/2025 22:05");
        assert_eq!(format_timestamp(at, local_offset(0)), "14/10/2025 02:05");
    }

    #[test]
    fn out_of_range_offset_falls_back_to_utc() {
        assert_eq!(local_offset(99).local_minus_utc(), 0);
    }

    #[test]
    fn preview_truncates_by_characters() {
        assert_eq!(description_preview("Pantalla rota"), "Pantalla rota");
        assert_eq!(
            description_preview("Necesito reparar la pantalla de mi laptop"),
            "Necesito reparar la ..."
        );
        assert_eq!(description_preview("ñññññññññññññññññññññ"), "ññññññññññññññññññññ...");
        assert_eq!(description_preview("   "), "(sin descripción)");
    }

    #[test]
    fn date_format() {
        assert_eq!(format_date(date(2025, 1, 7)), "07/01/2025");
    }
}
