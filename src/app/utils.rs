// src/app/utils.rs
use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime};
use itertools::Itertools;

use super::types::{ItemKind, Movie, Task, TripDetails};

pub(crate) fn normalize_title(s: &str) -> String {
    let mut normalized = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\'' | '’' | '‘' | '`' => {
                // "Schindler's" matches "Schindlers"
            }
            '&' => normalized.push_str(" and "),
            ch if ch.is_alphanumeric() => normalized.extend(ch.to_lowercase()),
            _ => normalized.push(' '),
        }
    }
    normalized.split_whitespace().join(" ")
}

pub(crate) fn ordinal_suffix(d: u32) -> &'static str {
    if (11..=13).contains(&(d % 100)) {
        return "th";
    }
    match d % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

/// "Saturday 1st Mar"
pub(crate) fn format_day_label(day: NaiveDate) -> String {
    let d = day.day();
    format!("{} {}{}", day.format("%A"), d, ordinal_suffix(d)) + &day.format(" %b").to_string()
}

/// Calendar day of an ISO date or datetime; `None` when unparseable.
pub(crate) fn parse_day(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
}

pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Human countdown to the trip relative to `today`.
pub(crate) fn countdown_label(trip: &TripDetails, today: NaiveDate) -> Option<String> {
    let start = trip.start_date.as_deref().and_then(parse_day)?;
    let end = trip.end_date.as_deref().and_then(parse_day).unwrap_or(start);
    let days = (start - today).num_days();
    let label = if days > 1 {
        format!("{days} days to go")
    } else if days == 1 {
        "Tomorrow!".to_string()
    } else if today <= end {
        let n = (today - start).num_days() + 1;
        let total = (end - start).num_days() + 1;
        format!("Day {n} of {total}")
    } else {
        "Trip finished".to_string()
    };
    Some(label)
}

/// Inclusive number of days the trip spans.
pub(crate) fn trip_length_days(trip: &TripDetails) -> Option<i64> {
    let start = trip.start_date.as_deref().and_then(parse_day)?;
    let end = trip.end_date.as_deref().and_then(parse_day)?;
    (end >= start).then(|| (end - start).num_days() + 1)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct AgendaEntry {
    pub day: NaiveDate,
    pub kind: ItemKind,
    pub id: String,
    pub title: String,
    pub done: bool,
}

/// Dated movies and tasks grouped by calendar day, earliest first.
/// Within a day movies come before tasks, each in list order.
pub(crate) fn build_agenda(movies: &[Movie], tasks: &[Task]) -> Vec<(NaiveDate, Vec<AgendaEntry>)> {
    let movie_entries = movies.iter().filter_map(|m| {
        let day = m.watch_date.as_deref().and_then(parse_day)?;
        Some(AgendaEntry {
            day,
            kind: ItemKind::Movies,
            id: m.id.clone(),
            title: m.title.clone(),
            done: m.watched,
        })
    });
    let task_entries = tasks.iter().filter_map(|t| {
        let day = t.due_date.as_deref().and_then(parse_day)?;
        Some(AgendaEntry {
            day,
            kind: ItemKind::Tasks,
            id: t.id.clone(),
            title: t.title.clone(),
            done: t.completed,
        })
    });

    movie_entries
        .chain(task_entries)
        .sorted_by_key(|e| e.day)
        .chunk_by(|e| e.day)
        .into_iter()
        .map(|(day, group)| (day, group.collect()))
        .collect()
}

pub(crate) fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn ordinals() {
        assert_eq!(ordinal_suffix(1), "st");
        assert_eq!(ordinal_suffix(2), "nd");
        assert_eq!(ordinal_suffix(3), "rd");
        assert_eq!(ordinal_suffix(11), "th");
        assert_eq!(ordinal_suffix(22), "nd");
    }

    #[test]
    fn day_label_reads_naturally() {
        assert_eq!(format_day_label(d("2025-03-01")), "Saturday 1st Mar");
        assert_eq!(format_day_label(d("2025-03-13")), "Thursday 13th Mar");
    }

    #[test]
    fn parse_day_accepts_dates_and_datetimes() {
        assert_eq!(parse_day("2025-03-01"), Some(d("2025-03-01")));
        assert_eq!(parse_day("2025-03-01T18:30:00"), Some(d("2025-03-01")));
        assert_eq!(parse_day("2025-03-01T18:30:00Z"), Some(d("2025-03-01")));
        assert_eq!(parse_day("next week"), None);
    }

    #[test]
    fn countdown_phases() {
        let trip = TripDetails {
            start_date: Some("2025-03-10".into()),
            end_date: Some("2025-03-14".into()),
            ..Default::default()
        };
        assert_eq!(countdown_label(&trip, d("2025-03-01")).unwrap(), "9 days to go");
        assert_eq!(countdown_label(&trip, d("2025-03-09")).unwrap(), "Tomorrow!");
        assert_eq!(countdown_label(&trip, d("2025-03-12")).unwrap(), "Day 3 of 5");
        assert_eq!(countdown_label(&trip, d("2025-03-20")).unwrap(), "Trip finished");
        assert_eq!(countdown_label(&TripDetails::default(), d("2025-03-01")), None);
        assert_eq!(trip_length_days(&trip), Some(5));
    }

    #[test]
    fn agenda_groups_by_day() {
        let movies = vec![
            Movie {
                id: "m1".into(),
                title: "Moana".into(),
                watch_date: Some("2025-03-02".into()),
                ..Default::default()
            },
            Movie {
                id: "m2".into(),
                title: "Undated".into(),
                ..Default::default()
            },
        ];
        let tasks = vec![
            Task {
                id: "t1".into(),
                title: "Pack".into(),
                due_date: Some("2025-03-01".into()),
                ..Default::default()
            },
            Task {
                id: "t2".into(),
                title: "Dinner".into(),
                due_date: Some("2025-03-02T19:00:00".into()),
                completed: true,
                ..Default::default()
            },
        ];
        let agenda = build_agenda(&movies, &tasks);
        assert_eq!(agenda.len(), 2);
        assert_eq!(agenda[0].0, d("2025-03-01"));
        assert_eq!(agenda[0].1[0].title, "Pack");
        let second: Vec<&str> = agenda[1].1.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(second, vec!["Moana", "Dinner"]);
        assert!(agenda[1].1[1].done);
    }

    #[test]
    fn titles_normalize_for_comparison() {
        assert_eq!(normalize_title("Lilo & Stitch"), "lilo and stitch");
        assert_eq!(normalize_title("  Schindler's   List!"), "schindlers list");
    }

    #[test]
    fn truncation_marks_cut() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("abcdefghij", 5), "abcd…");
    }
}
