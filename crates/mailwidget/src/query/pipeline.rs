//! Derivation pipeline: filter → search → sort → paginate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::params::{Filter, ListParams, SortDir, SortKey};
use crate::models::{MailId, MailRecord};

/// Row information for displaying a mail in the list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MailSummary {
    pub id: MailId,
    pub sender: String,
    pub subject: String,
    /// Preview or description, if any
    pub preview: Option<String>,
    pub received_at: Option<DateTime<Utc>>,
    pub seen: bool,
    pub attachment_count: usize,
}

impl From<&MailRecord> for MailSummary {
    fn from(record: &MailRecord) -> Self {
        Self {
            id: record.id.clone(),
            sender: record.sender.clone(),
            subject: record.subject.clone(),
            preview: record.preview_text().map(str::to_string),
            received_at: record.received_at,
            seen: record.seen,
            attachment_count: record.attachment_count(),
        }
    }
}

/// Per-filter counts shown on the filter buttons
///
/// Always computed over the whole collection, so they do not move when the
/// active filter or the search query changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeCounts {
    pub all: usize,
    pub unread: usize,
    pub attachments: usize,
}

impl BadgeCounts {
    pub fn from_records(records: &[MailRecord]) -> Self {
        records.iter().fold(Self::default(), |mut acc, r| {
            acc.all += 1;
            acc.unread += usize::from(Filter::Unread.matches(r));
            acc.attachments += usize::from(Filter::Attachments.matches(r));
            acc
        })
    }

    pub fn get(&self, filter: Filter) -> usize {
        match filter {
            Filter::All => self.all,
            Filter::Unread => self.unread,
            Filter::Attachments => self.attachments,
        }
    }
}

/// Output of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedPage {
    /// Rows of the effective page
    pub rows: Vec<MailSummary>,
    /// Records left after filter and search
    pub filtered_count: usize,
    /// At least 1, even for an empty result
    pub total_pages: usize,
    /// Requested page clamped into `1..=total_pages`
    pub page: usize,
    pub page_size: usize,
    pub badges: BadgeCounts,
}

impl DerivedPage {
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// `max(1, ceil(count / page_size))`
pub fn total_pages(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size.max(1)).max(1)
}

/// Records that survive the filter and search stages, sorted.
///
/// Exposed separately so callers can count or page through the full result
/// without building row summaries.
pub fn filter_and_sort<'a>(records: &'a [MailRecord], params: &ListParams) -> Vec<&'a MailRecord> {
    let needle = params.search_query.to_lowercase();
    let mut matched: Vec<&MailRecord> = records
        .iter()
        .filter(|r| params.filter.matches(r))
        .filter(|r| needle.is_empty() || matches_search(r, &needle))
        .collect();

    // Stable in both directions: equal keys keep their filtered order
    matched.sort_by(|a, b| {
        let ord = compare(a, b, params.sort_by);
        match params.sort_dir {
            SortDir::Asc => ord,
            SortDir::Desc => ord.reverse(),
        }
    });
    matched
}

/// Run the whole pipeline.
///
/// Pure and total: any page number, including 0 or one past the end, yields a
/// valid page.
pub fn derive_page(records: &[MailRecord], params: &ListParams) -> DerivedPage {
    let matched = filter_and_sort(records, params);
    let page_size = params.page_size.max(1);
    let filtered_count = matched.len();
    let total_pages = total_pages(filtered_count, page_size);
    let page = params.page.clamp(1, total_pages);

    let start = ((page - 1) * page_size).min(filtered_count);
    let end = (start + page_size).min(filtered_count);
    let rows = matched[start..end]
        .iter()
        .map(|r| MailSummary::from(*r))
        .collect();

    DerivedPage {
        rows,
        filtered_count,
        total_pages,
        page,
        page_size,
        badges: BadgeCounts::from_records(records),
    }
}

/// Case-insensitive substring match on sender, subject and preview.
/// `needle` must already be lowercase.
fn matches_search(record: &MailRecord, needle: &str) -> bool {
    let contains = |field: &str| field.to_lowercase().contains(needle);
    contains(&record.sender)
        || contains(&record.subject)
        || record.preview_text().is_some_and(contains)
}

fn compare(a: &MailRecord, b: &MailRecord, key: SortKey) -> Ordering {
    match key {
        SortKey::Sender => cmp_ignore_case(&a.sender, &b.sender),
        SortKey::Subject => cmp_ignore_case(&a.subject, &b.subject),
        SortKey::Date => a.received_millis().cmp(&b.received_millis()),
    }
}

fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mail(id: &str, sender: &str, subject: &str, millis: i64) -> MailRecord {
        MailRecord::builder(id)
            .sender(sender)
            .subject(subject)
            .received_millis(millis)
            .build()
    }

    fn numbered(count: usize) -> Vec<MailRecord> {
        (0..count)
            .map(|i| {
                MailRecord::builder(format!("m{}", i))
                    .sender(format!("user{}@example.com", i % 4))
                    .subject(format!("Subject {}", i % 3))
                    .received_millis(1_000 + i as i64)
                    .seen(i % 2 == 0)
                    .attachments(if i % 5 == 0 { vec!["a.pdf".into()] } else { vec![] })
                    .build()
            })
            .collect()
    }

    fn ids(page: &DerivedPage) -> Vec<&str> {
        page.rows.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_total_pages_formula() {
        assert_eq!(total_pages(0, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(25, 10), 3);
        assert_eq!(total_pages(3, 0), 3);
    }

    #[test]
    fn test_page_bounds_hold_for_all_combinations() {
        let records = numbered(37);
        for filter in Filter::ALL {
            for query in ["", "user1", "SUBJECT 2", "nothing"] {
                for sort_by in [SortKey::Sender, SortKey::Subject, SortKey::Date] {
                    for sort_dir in [SortDir::Asc, SortDir::Desc] {
                        for page_size in [1, 5, 10, 50] {
                            for page in 0..6 {
                                let params = ListParams {
                                    search_query: query.to_string(),
                                    filter,
                                    sort_by,
                                    sort_dir,
                                    page,
                                    page_size,
                                };
                                let derived = derive_page(&records, &params);
                                assert!(derived.rows.len() <= page_size);
                                assert_eq!(
                                    derived.total_pages,
                                    total_pages(derived.filtered_count, page_size)
                                );
                                assert!(derived.page >= 1 && derived.page <= derived.total_pages);
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_third_page_of_twenty_five() {
        let records = numbered(25);
        let params = ListParams {
            sort_dir: SortDir::Asc,
            page: 3,
            ..ListParams::default()
        };
        let derived = derive_page(&records, &params);
        assert_eq!(derived.rows.len(), 5);
        assert_eq!(ids(&derived), vec!["m20", "m21", "m22", "m23", "m24"]);
        assert!(!derived.has_next());
        assert!(derived.has_prev());
    }

    #[test]
    fn test_page_past_end_is_clamped() {
        let records = numbered(12);
        let params = ListParams {
            page: 9,
            ..ListParams::default()
        };
        let derived = derive_page(&records, &params);
        assert_eq!(derived.page, 2);
        assert_eq!(derived.rows.len(), 2);
    }

    #[test]
    fn test_empty_collection() {
        let derived = derive_page(&[], &ListParams::default());
        assert!(derived.rows.is_empty());
        assert_eq!(derived.total_pages, 1);
        assert_eq!(derived.page, 1);
        assert_eq!(derived.badges, BadgeCounts::default());
    }

    #[test]
    fn test_idempotent() {
        let records = numbered(30);
        let params = ListParams {
            search_query: "user2".to_string(),
            sort_by: SortKey::Subject,
            ..ListParams::default()
        };
        assert_eq!(derive_page(&records, &params), derive_page(&records, &params));
    }

    #[test]
    fn test_sort_is_stable_in_both_directions() {
        let records = vec![
            mail("1", "bob", "same", 5),
            mail("2", "alice", "same", 5),
            mail("3", "carol", "same", 5),
            mail("4", "dave", "other", 1),
        ];

        for sort_dir in [SortDir::Asc, SortDir::Desc] {
            let params = ListParams {
                sort_by: SortKey::Subject,
                sort_dir,
                ..ListParams::default()
            };
            let derived = derive_page(&records, &params);
            let same: Vec<&str> = derived
                .rows
                .iter()
                .filter(|r| r.subject == "same")
                .map(|r| r.id.as_str())
                .collect();
            assert_eq!(same, vec!["1", "2", "3"]);
        }
    }

    #[test]
    fn test_string_sort_ignores_case() {
        let records = vec![
            mail("1", "bob", "", 0),
            mail("2", "Alice", "", 0),
            mail("3", "alan", "", 0),
        ];
        let params = ListParams {
            sort_by: SortKey::Sender,
            sort_dir: SortDir::Asc,
            ..ListParams::default()
        };
        assert_eq!(ids(&derive_page(&records, &params)), vec!["3", "2", "1"]);
    }

    #[test]
    fn test_missing_date_sorts_as_zero() {
        let records = vec![
            mail("dated", "a", "", 10),
            MailRecord::builder("undated").sender("b").build(),
        ];
        let params = ListParams {
            sort_dir: SortDir::Asc,
            ..ListParams::default()
        };
        assert_eq!(ids(&derive_page(&records, &params)), vec!["undated", "dated"]);
    }

    #[test]
    fn test_search_matches_preview_case_insensitively() {
        let records = vec![
            MailRecord::builder("1").sender("a@x").subject("Hi").preview("Quarterly NUMBERS").build(),
            MailRecord::builder("2").sender("b@x").subject("Lunch").description("numbers inside").build(),
            MailRecord::builder("3").sender("c@x").subject("Other").build(),
        ];
        let params = ListParams {
            search_query: "Numbers".to_string(),
            ..ListParams::default()
        };
        let derived = derive_page(&records, &params);
        assert_eq!(derived.filtered_count, 2);
    }

    #[test]
    fn test_filters() {
        let records = numbered(20);
        let unread = derive_page(
            &records,
            &ListParams {
                filter: Filter::Unread,
                page_size: 100,
                ..ListParams::default()
            },
        );
        assert!(unread.rows.iter().all(|r| !r.seen));
        assert_eq!(unread.filtered_count, 10);

        let attach = derive_page(
            &records,
            &ListParams {
                filter: Filter::Attachments,
                page_size: 100,
                ..ListParams::default()
            },
        );
        assert_eq!(attach.filtered_count, 4);
        assert!(attach.rows.iter().all(|r| r.attachment_count > 0));
    }

    #[test]
    fn test_badges_ignore_filter_and_search() {
        let records = numbered(20);
        let baseline = derive_page(&records, &ListParams::default()).badges;
        assert_eq!(baseline, BadgeCounts { all: 20, unread: 10, attachments: 4 });

        for filter in Filter::ALL {
            let params = ListParams {
                filter,
                search_query: "user3".to_string(),
                ..ListParams::default()
            };
            assert_eq!(derive_page(&records, &params).badges, baseline);
        }
    }
}
