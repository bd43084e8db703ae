// src/app/filters.rs
use std::cmp::Ordering;
use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::types::{ItemKind, Movie, TagRef, Task};

/// Uniform view over the kind-specific fields the filters read.
/// Movies map to notes/watched/watch_date, tasks to description/completed/due_date.
pub trait Filterable {
    fn title(&self) -> &str;
    fn free_text(&self) -> Option<&str>;
    fn tags(&self) -> &[TagRef];
    fn status_flag(&self) -> bool;
    fn date_field(&self) -> Option<&str>;
}

impl Filterable for Movie {
    fn title(&self) -> &str {
        &self.title
    }
    fn free_text(&self) -> Option<&str> {
        self.notes.as_deref()
    }
    fn tags(&self) -> &[TagRef] {
        &self.tags
    }
    fn status_flag(&self) -> bool {
        self.watched
    }
    fn date_field(&self) -> Option<&str> {
        self.watch_date.as_deref()
    }
}

impl Filterable for Task {
    fn title(&self) -> &str {
        &self.title
    }
    fn free_text(&self) -> Option<&str> {
        self.description.as_deref()
    }
    fn tags(&self) -> &[TagRef] {
        &self.tags
    }
    fn status_flag(&self) -> bool {
        self.completed
    }
    fn date_field(&self) -> Option<&str> {
        self.due_date.as_deref()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    /// watched / completed
    Done,
    /// unwatched / pending
    Open,
}

impl StatusFilter {
    pub const ALL: [Self; 3] = [Self::All, Self::Done, Self::Open];

    pub const fn label(self, kind: ItemKind) -> &'static str {
        match self {
            Self::All => "All",
            Self::Done => kind.done_label(),
            Self::Open => kind.open_label(),
        }
    }

    const fn accepts(self, flag: bool) -> bool {
        match self {
            Self::All => true,
            Self::Done => flag,
            Self::Open => !flag,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DateSort {
    #[default]
    None,
    Asc,
    Desc,
}

impl DateSort {
    pub const ALL: [Self; 3] = [Self::None, Self::Asc, Self::Desc];

    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "Unsorted",
            Self::Asc => "Earliest first",
            Self::Desc => "Latest first",
        }
    }
}

/// Per-view filter state. Lives as long as the view, never persisted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub search_term: String,
    pub selected_tag_ids: BTreeSet<String>,
    pub status: StatusFilter,
    pub date_sort: DateSort,
}

impl FilterCriteria {
    /// Reset every field at once so no frame ever sees a half-cleared state.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_default(&self) -> bool {
        self.search_term.trim().is_empty()
            && self.selected_tag_ids.is_empty()
            && self.status == StatusFilter::All
            && self.date_sort == DateSort::None
    }

    pub fn toggle_tag(&mut self, id: &str) {
        if !self.selected_tag_ids.remove(id) {
            self.selected_tag_ids.insert(id.to_string());
        }
    }
}

/// Parse an ISO date or datetime into a unix timestamp (seconds).
/// Anything unparseable counts as "no date".
pub fn parse_date_key(raw: &str) -> Option<i64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp());
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc().timestamp());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp())
}

fn matches_text<T: Filterable>(item: &T, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    item.title().to_lowercase().contains(needle)
        || item
            .free_text()
            .unwrap_or_default()
            .to_lowercase()
            .contains(needle)
}

fn matches_tags<T: Filterable>(item: &T, selected: &BTreeSet<String>) -> bool {
    selected.is_empty() || item.tags().iter().any(|t| selected.contains(&t.id))
}

/// Undated entries go last in both directions; dated ones compare by timestamp.
fn compare_dates(a: Option<i64>, b: Option<i64>, sort: DateSort) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => match sort {
            DateSort::Desc => y.cmp(&x),
            _ => x.cmp(&y),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Indices of `items` that pass text → tag → status filters, in display order.
pub fn filtered_indices<T: Filterable>(items: &[T], criteria: &FilterCriteria) -> Vec<usize> {
    // whitespace-only means no text filter; otherwise the term is matched as typed
    let needle = if criteria.search_term.trim().is_empty() {
        String::new()
    } else {
        criteria.search_term.to_lowercase()
    };

    let mut out: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| matches_text(*item, &needle))
        .filter(|(_, item)| matches_tags(*item, &criteria.selected_tag_ids))
        .filter(|(_, item)| criteria.status.accepts(item.status_flag()))
        .map(|(i, _)| i)
        .collect();

    if criteria.date_sort != DateSort::None {
        let mut keyed: Vec<(usize, Option<i64>)> = out
            .iter()
            .map(|&i| (i, items[i].date_field().and_then(parse_date_key)))
            .collect();
        // sort_by is stable, so undated rows keep their input order
        keyed.sort_by(|a, b| compare_dates(a.1, b.1, criteria.date_sort));
        out = keyed.into_iter().map(|(i, _)| i).collect();
    }

    out
}

pub fn apply<'a, T: Filterable>(items: &'a [T], criteria: &FilterCriteria) -> Vec<&'a T> {
    filtered_indices(items, criteria)
        .into_iter()
        .map(|i| &items[i])
        .collect()
}

/// All tag refs used by `items`, deduplicated by id and sorted by label.
pub fn collect_tags<T: Filterable>(items: &[T]) -> Vec<TagRef> {
    let mut seen = BTreeSet::new();
    let mut out: Vec<TagRef> = items
        .iter()
        .flat_map(|item| item.tags().iter())
        .filter(|t| seen.insert(t.id.clone()))
        .cloned()
        .collect();
    out.sort_by_key(|t| t.label().to_lowercase());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(id: &str) -> TagRef {
        TagRef {
            id: id.into(),
            name: id.to_uppercase(),
            icon: None,
            parent_name: None,
        }
    }

    fn movie(title: &str, date: Option<&str>, watched: bool) -> Movie {
        Movie {
            id: title.to_lowercase(),
            title: title.into(),
            watch_date: date.map(str::to_string),
            watched,
            ..Default::default()
        }
    }

    fn titles(items: &[&Movie]) -> Vec<String> {
        items.iter().map(|m| m.title.clone()).collect()
    }

    #[test]
    fn default_criteria_is_identity() {
        let items = vec![
            movie("Moana", Some("2024-05-01"), false),
            movie("Frozen", None, true),
            movie("Encanto", Some("2024-04-01"), false),
        ];
        let out = apply(&items, &FilterCriteria::default());
        assert_eq!(titles(&out), vec!["Moana", "Frozen", "Encanto"]);
    }

    #[test]
    fn text_matches_title_or_notes_case_insensitively() {
        let mut with_notes = movie("Up", None, false);
        with_notes.notes = Some("Watch with the KIDS".into());
        let items = vec![movie("Cars", None, false), with_notes, movie("Kidnapped", None, false)];

        let criteria = FilterCriteria {
            search_term: "kId".into(),
            ..Default::default()
        };
        assert_eq!(titles(&apply(&items, &criteria)), vec!["Up", "Kidnapped"]);

        let blank = FilterCriteria {
            search_term: "   ".into(),
            ..Default::default()
        };
        assert_eq!(apply(&items, &blank).len(), 3);
    }

    #[test]
    fn search_term_is_not_trimmed_before_matching() {
        let items = vec![movie("Up", None, false), movie("Cars 2", None, false)];

        let leading = FilterCriteria {
            search_term: " up".into(),
            ..Default::default()
        };
        assert!(apply(&items, &leading).is_empty());

        let inner = FilterCriteria {
            search_term: "s 2".into(),
            ..Default::default()
        };
        assert_eq!(titles(&apply(&items, &inner)), vec!["Cars 2"]);
    }

    #[test]
    fn task_text_filter_reads_description() {
        let items = vec![
            Task {
                id: "1".into(),
                title: "Pack".into(),
                description: Some("Sunscreen and ponchos".into()),
                ..Default::default()
            },
            Task {
                id: "2".into(),
                title: "Book dinner".into(),
                ..Default::default()
            },
        ];
        let criteria = FilterCriteria {
            search_term: "PONCHO".into(),
            ..Default::default()
        };
        assert_eq!(filtered_indices(&items, &criteria), vec![0]);
    }

    #[test]
    fn task_status_and_due_date_sort() {
        let task = |id: &str, due: Option<&str>, completed: bool| Task {
            id: id.into(),
            title: id.into(),
            due_date: due.map(str::to_string),
            completed,
            ..Default::default()
        };
        let items = vec![
            task("tickets", Some("2024-06-10"), true),
            task("snacks", None, false),
            task("passport", Some("2024-05-01"), false),
            task("charger", None, true),
        ];

        let done = FilterCriteria {
            status: StatusFilter::Done,
            ..Default::default()
        };
        assert_eq!(filtered_indices(&items, &done), vec![0, 3]);

        let open = FilterCriteria {
            status: StatusFilter::Open,
            ..Default::default()
        };
        assert_eq!(filtered_indices(&items, &open), vec![1, 2]);

        let asc = FilterCriteria {
            date_sort: DateSort::Asc,
            ..Default::default()
        };
        assert_eq!(filtered_indices(&items, &asc), vec![2, 0, 1, 3]);
    }

    #[test]
    fn tag_filter_uses_or_semantics() {
        let mut a = movie("A", None, false);
        a.tags = vec![tag("t1")];
        let mut b = movie("B", None, false);
        b.tags = vec![tag("t2")];
        let c = movie("C", None, false);
        let items = vec![a, b, c];

        let mut criteria = FilterCriteria::default();
        criteria.toggle_tag("t1");
        assert_eq!(titles(&apply(&items, &criteria)), vec!["A"]);

        criteria.toggle_tag("t2");
        assert_eq!(titles(&apply(&items, &criteria)), vec!["A", "B"]);

        criteria.selected_tag_ids.clear();
        assert_eq!(apply(&items, &criteria).len(), 3);
    }

    #[test]
    fn status_filter_is_exclusive() {
        let items = vec![
            movie("Seen", None, true),
            movie("Unseen", None, false),
            movie("Also seen", None, true),
        ];
        let mut criteria = FilterCriteria::default();

        criteria.status = StatusFilter::Done;
        assert_eq!(titles(&apply(&items, &criteria)), vec!["Seen", "Also seen"]);

        criteria.status = StatusFilter::Open;
        assert_eq!(titles(&apply(&items, &criteria)), vec!["Unseen"]);

        criteria.status = StatusFilter::All;
        assert_eq!(apply(&items, &criteria).len(), 3);
    }

    #[test]
    fn ascending_sort_puts_undated_last() {
        let items = vec![
            movie("Moana", Some("2024-05-01"), false),
            movie("Frozen", None, true),
            movie("Encanto", Some("2024-04-01"), false),
        ];
        let criteria = FilterCriteria {
            date_sort: DateSort::Asc,
            ..Default::default()
        };
        assert_eq!(
            titles(&apply(&items, &criteria)),
            vec!["Encanto", "Moana", "Frozen"]
        );
    }

    #[test]
    fn descending_sort_still_puts_undated_last_in_input_order() {
        let items = vec![
            movie("No date 1", None, false),
            movie("Early", Some("2024-01-01"), false),
            movie("Garbage", Some("next tuesday"), false),
            movie("Late", Some("2024-06-01T18:30:00Z"), false),
            movie("No date 2", Some(""), false),
        ];
        let criteria = FilterCriteria {
            date_sort: DateSort::Desc,
            ..Default::default()
        };
        assert_eq!(
            titles(&apply(&items, &criteria)),
            vec!["Late", "Early", "No date 1", "Garbage", "No date 2"]
        );
    }

    #[test]
    fn equal_dates_keep_input_order() {
        let items = vec![
            movie("First", Some("2024-03-03"), false),
            movie("Second", Some("2024-03-03"), false),
        ];
        let criteria = FilterCriteria {
            date_sort: DateSort::Desc,
            ..Default::default()
        };
        assert_eq!(titles(&apply(&items, &criteria)), vec!["First", "Second"]);
    }

    #[test]
    fn parse_date_key_accepts_common_iso_shapes() {
        let day = parse_date_key("2024-05-01").unwrap();
        assert_eq!(parse_date_key("2024-05-01T00:00:00"), Some(day));
        assert_eq!(parse_date_key("2024-05-01T00:00:00+00:00"), Some(day));
        assert_eq!(parse_date_key("2024-05-01 00:00:00"), Some(day));
        assert_eq!(parse_date_key("05/01/2024"), None);
        assert_eq!(parse_date_key("2024-13-45"), None);
    }

    #[test]
    fn clear_resets_everything() {
        let mut criteria = FilterCriteria {
            search_term: "moana".into(),
            status: StatusFilter::Open,
            date_sort: DateSort::Asc,
            ..Default::default()
        };
        criteria.toggle_tag("t1");
        assert!(!criteria.is_default());

        criteria.clear();
        assert!(criteria.is_default());
        assert_eq!(criteria, FilterCriteria::default());
    }

    #[test]
    fn status_labels_follow_kind() {
        assert_eq!(StatusFilter::Done.label(ItemKind::Movies), "Watched");
        assert_eq!(StatusFilter::Open.label(ItemKind::Tasks), "Pending");
    }

    #[test]
    fn collect_tags_dedupes_by_id() {
        let mut a = movie("A", None, false);
        a.tags = vec![tag("b"), tag("a")];
        let mut b = movie("B", None, false);
        b.tags = vec![tag("a")];
        let ids: Vec<String> = collect_tags(&[a, b]).into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
