//! Read-only views over a ticket list
//!
//! Every function takes any iterator of `&Ticket` and returns a new
//! `Vec<&Ticket>`, so filters chain by feeding one result into the next.
//! Filters are independent predicates: the order they are applied in does
//! not change the result set.

use chrono::{NaiveDate, TimeZone};
use serde::Serialize;

use crate::{Error, Result, Status, Ticket};

/// Status filter: everything, or one status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(Status),
}

impl std::str::FromStr for StatusFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(StatusFilter::All)
        } else {
            Ok(StatusFilter::Only(s.parse()?))
        }
    }
}

/// Assignee filter
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AssigneeFilter {
    #[default]
    All,
    /// Tickets nobody has picked up
    Unassigned,
    /// Exact technician name
    Named(String),
}

impl AssigneeFilter {
    /// `"all"` (or empty) → All, `"none"` → Unassigned, anything else → Named
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            AssigneeFilter::All
        } else if s.eq_ignore_ascii_case("none") {
            AssigneeFilter::Unassigned
        } else {
            AssigneeFilter::Named(s.to_string())
        }
    }

    fn matches(&self, ticket: &Ticket) -> bool {
        match self {
            AssigneeFilter::All => true,
            AssigneeFilter::Unassigned => !ticket.is_assigned(),
            AssigneeFilter::Named(name) => ticket.assigned_to == *name,
        }
    }
}

pub fn filter_by_status<'a>(
    tickets: impl IntoIterator<Item = &'a Ticket>,
    filter: StatusFilter,
) -> Vec<&'a Ticket> {
    tickets
        .into_iter()
        .filter(|t| match filter {
            StatusFilter::All => true,
            StatusFilter::Only(status) => t.status == status,
        })
        .collect()
}

pub fn filter_by_assignee<'a>(
    tickets: impl IntoIterator<Item = &'a Ticket>,
    filter: &AssigneeFilter,
) -> Vec<&'a Ticket> {
    tickets.into_iter().filter(|t| filter.matches(t)).collect()
}

/// Keep tickets created between `from` and `to`, both days inclusive
///
/// Days are calendar days in `tz`: `from` starts at 00:00:00, `to` ends at
/// 23:59:59.999. Either bound may be omitted.
pub fn filter_by_date_range<'a, Tz: TimeZone>(
    tickets: impl IntoIterator<Item = &'a Ticket>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    tz: &Tz,
) -> Vec<&'a Ticket> {
    tickets
        .into_iter()
        .filter(|t| {
            let day = t.created_at.with_timezone(tz).date_naive();
            from.is_none_or(|from| day >= from) && to.is_none_or(|to| day <= to)
        })
        .collect()
}

/// Case-insensitive search over name and id, substring search over phone
///
/// An empty query matches everything. The query is used as typed, so
/// surrounding whitespace is part of the needle.
pub fn search_text<'a>(
    tickets: impl IntoIterator<Item = &'a Ticket>,
    query: &str,
) -> Vec<&'a Ticket> {
    let needle = query.to_lowercase();
    tickets
        .into_iter()
        .filter(|t| {
            needle.is_empty()
                || t.name.to_lowercase().contains(&needle)
                || t.phone.contains(&needle)
                || t.id.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Waiting first, then In Progress, then Completed; newest first inside each group
pub fn sort_for_technician_view<'a>(
    tickets: impl IntoIterator<Item = &'a Ticket>,
) -> Vec<&'a Ticket> {
    let mut sorted: Vec<_> = tickets.into_iter().collect();
    sorted.sort_by(|a, b| {
        a.status
            .priority()
            .cmp(&b.status.priority())
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
    sorted
}

/// Newest first
pub fn sort_for_admin_view<'a>(tickets: impl IntoIterator<Item = &'a Ticket>) -> Vec<&'a Ticket> {
    let mut sorted: Vec<_> = tickets.into_iter().collect();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sorted
}

/// Dashboard counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Statistics {
    pub total: usize,
    pub waiting_count: usize,
    pub in_progress_count: usize,
    pub completed_count: usize,
    /// Sum of fees over completed tickets
    pub total_revenue: u64,
}

pub fn compute_statistics<'a>(tickets: impl IntoIterator<Item = &'a Ticket>) -> Statistics {
    tickets
        .into_iter()
        .fold(Statistics::default(), |mut stats, t| {
            stats.total += 1;
            match t.status {
                Status::Waiting => stats.waiting_count += 1,
                Status::InProgress => stats.in_progress_count += 1,
                Status::Completed => {
                    stats.completed_count += 1;
                    stats.total_revenue = stats.total_revenue.saturating_add(t.fee);
                }
            }
            stats
        })
}

/// Technician worklist: status and assignee filters, worklist order
pub fn technician_view<'a>(
    tickets: impl IntoIterator<Item = &'a Ticket>,
    status: StatusFilter,
    assignee: &AssigneeFilter,
) -> Vec<&'a Ticket> {
    let filtered = filter_by_assignee(filter_by_status(tickets, status), assignee);
    sort_for_technician_view(filtered)
}

/// Admin table filters
#[derive(Debug, Clone, Default)]
pub struct AdminQuery {
    pub search: String,
    pub status: StatusFilter,
    pub assignee: AssigneeFilter,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Admin table: search, status, assignee and date filters, newest first
pub fn admin_view<'a, Tz: TimeZone>(
    tickets: impl IntoIterator<Item = &'a Ticket>,
    query: &AdminQuery,
    tz: &Tz,
) -> Vec<&'a Ticket> {
    let filtered = search_text(tickets, &query.search);
    let filtered = filter_by_status(filtered, query.status);
    let filtered = filter_by_assignee(filtered, &query.assignee);
    let filtered = filter_by_date_range(filtered, query.from, query.to, tz);
    sort_for_admin_view(filtered)
}

/// Parse a `YYYY-MM-DD` date argument
pub fn parse_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .map_err(|_| Error::InvalidDate(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset, Utc};

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn ticket(id: &str, status: Status, created: &str) -> Ticket {
        let mut t = Ticket::new(id.into(), format!("Khách {id}"), "0909000000".into());
        t.status = status;
        t.created_at = at(created);
        t
    }

    fn ids(tickets: &[&Ticket]) -> Vec<String> {
        tickets.iter().map(|t| t.id.clone()).collect()
    }

    #[test]
    fn test_statistics() {
        let mut done_a = ticket("d1", Status::Completed, "2024-01-01T00:00:00Z");
        done_a.fee = 100000;
        let mut done_b = ticket("d2", Status::Completed, "2024-01-01T00:00:00Z");
        done_b.fee = 50000;
        let mut started = ticket("p1", Status::InProgress, "2024-01-01T00:00:00Z");
        started.fee = 999;
        let tickets = vec![
            ticket("w1", Status::Waiting, "2024-01-01T00:00:00Z"),
            ticket("w2", Status::Waiting, "2024-01-01T00:00:00Z"),
            started,
            done_a,
            done_b,
        ];

        let stats = compute_statistics(&tickets);
        assert_eq!(
            stats,
            Statistics {
                total: 5,
                waiting_count: 2,
                in_progress_count: 1,
                completed_count: 2,
                total_revenue: 150000,
            }
        );
        assert_eq!(
            stats.waiting_count + stats.in_progress_count + stats.completed_count,
            stats.total
        );
        assert_eq!(compute_statistics(std::iter::empty()), Statistics::default());
    }

    #[test]
    fn test_technician_sort() {
        let tickets = vec![
            ticket("c", Status::Completed, "2024-01-05T00:00:00Z"),
            ticket("w-old", Status::Waiting, "2024-01-01T00:00:00Z"),
            ticket("p", Status::InProgress, "2024-01-04T00:00:00Z"),
            ticket("w-new", Status::Waiting, "2024-01-03T00:00:00Z"),
        ];
        let sorted = sort_for_technician_view(&tickets);
        assert_eq!(ids(&sorted), vec!["w-new", "w-old", "p", "c"]);
    }

    #[test]
    fn test_sorts_are_stable() {
        let tickets = vec![
            ticket("a", Status::Waiting, "2024-01-01T00:00:00Z"),
            ticket("b", Status::Waiting, "2024-01-01T00:00:00Z"),
            ticket("c", Status::Waiting, "2024-01-01T00:00:00Z"),
        ];
        assert_eq!(ids(&sort_for_technician_view(&tickets)), vec!["a", "b", "c"]);
        assert_eq!(ids(&sort_for_admin_view(&tickets)), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_admin_sort() {
        let tickets = vec![
            ticket("mid", Status::Completed, "2024-01-02T00:00:00Z"),
            ticket("old", Status::Waiting, "2024-01-01T00:00:00Z"),
            ticket("new", Status::InProgress, "2024-01-03T00:00:00Z"),
        ];
        assert_eq!(ids(&sort_for_admin_view(&tickets)), vec!["new", "mid", "old"]);
    }

    #[test]
    fn test_date_range_single_day() {
        let tickets = vec![
            ticket("before", Status::Waiting, "2024-01-01T23:59:59.999Z"),
            ticket("start", Status::Waiting, "2024-01-02T00:00:00Z"),
            ticket("end", Status::Waiting, "2024-01-02T23:59:59.999Z"),
            ticket("after", Status::Waiting, "2024-01-03T00:00:00Z"),
        ];
        let day = parse_date("2024-01-02").unwrap();
        let kept = filter_by_date_range(&tickets, Some(day), Some(day), &Utc);
        assert_eq!(ids(&kept), vec!["start", "end"]);
    }

    #[test]
    fn test_date_range_open_ends() {
        let tickets = vec![
            ticket("a", Status::Waiting, "2024-01-01T10:00:00Z"),
            ticket("b", Status::Waiting, "2024-01-05T10:00:00Z"),
        ];
        let d = parse_date("2024-01-03").unwrap();
        assert_eq!(ids(&filter_by_date_range(&tickets, Some(d), None, &Utc)), vec!["b"]);
        assert_eq!(ids(&filter_by_date_range(&tickets, None, Some(d), &Utc)), vec!["a"]);
        assert_eq!(filter_by_date_range(&tickets, None, None, &Utc).len(), 2);
    }

    #[test]
    fn test_date_range_uses_time_zone() {
        // 2024-01-01 20:00 UTC is already 2024-01-02 in UTC+7
        let tickets = vec![ticket("late", Status::Waiting, "2024-01-01T20:00:00Z")];
        let day = parse_date("2024-01-02").unwrap();
        let ict = FixedOffset::east_opt(7 * 3600).unwrap();

        assert_eq!(filter_by_date_range(&tickets, Some(day), Some(day), &ict).len(), 1);
        assert!(filter_by_date_range(&tickets, Some(day), Some(day), &Utc).is_empty());
    }

    #[test]
    fn test_search_text() {
        let mut minh = ticket("t-171-abc", Status::Waiting, "2024-01-01T00:00:00Z");
        minh.name = "Anh Minh".into();
        minh.phone = "0909123456".into();
        let mut hoa = ticket("t-172-XYZ", Status::Waiting, "2024-01-01T00:00:00Z");
        hoa.name = "Chị Hoa".into();
        hoa.phone = "0912345678".into();
        let tickets = vec![minh, hoa];

        assert_eq!(ids(&search_text(&tickets, "minh")), vec!["t-171-abc"]);
        assert_eq!(ids(&search_text(&tickets, "CHỊ")), vec!["t-172-XYZ"]);
        assert_eq!(ids(&search_text(&tickets, "12345")), vec!["t-171-abc", "t-172-XYZ"]);
        assert_eq!(ids(&search_text(&tickets, "xyz")), vec!["t-172-XYZ"]);
        assert_eq!(search_text(&tickets, "").len(), 2);
        assert!(search_text(&tickets, "nobody").is_empty());

        assert!(search_text(&tickets, "0909 ").is_empty());
        assert_eq!(ids(&search_text(&tickets, "anh m")), vec!["t-171-abc"]);
    }

    #[test]
    fn test_status_and_assignee_filters() {
        let mut a = ticket("a", Status::Waiting, "2024-01-01T00:00:00Z");
        a.assigned_to = "Quang".into();
        let b = ticket("b", Status::Waiting, "2024-01-01T00:00:00Z");
        let mut c = ticket("c", Status::Completed, "2024-01-01T00:00:00Z");
        c.assigned_to = "Hiếu".into();
        let tickets = vec![a, b, c];

        let waiting = filter_by_status(&tickets, StatusFilter::Only(Status::Waiting));
        assert_eq!(ids(&waiting), vec!["a", "b"]);
        assert_eq!(filter_by_status(&tickets, StatusFilter::All).len(), 3);

        let quang = filter_by_assignee(&tickets, &AssigneeFilter::Named("Quang".into()));
        assert_eq!(ids(&quang), vec!["a"]);
        let nobody = filter_by_assignee(&tickets, &AssigneeFilter::Unassigned);
        assert_eq!(ids(&nobody), vec!["b"]);
        assert_eq!(filter_by_assignee(&tickets, &AssigneeFilter::All).len(), 3);
    }

    #[test]
    fn test_filters_commute() {
        let mut tickets = Vec::new();
        for (i, status) in [Status::Waiting, Status::InProgress, Status::Completed]
            .into_iter()
            .cycle()
            .take(9)
            .enumerate()
        {
            let mut t = ticket(&format!("t{i}"), status, "2024-01-01T00:00:00Z");
            t.assigned_to = if i % 2 == 0 { "Quang".into() } else { String::new() };
            tickets.push(t);
        }
        let status = StatusFilter::Only(Status::InProgress);
        let assignee = AssigneeFilter::Named("Quang".into());

        let one = filter_by_assignee(filter_by_status(&tickets, status), &assignee);
        let two = filter_by_status(filter_by_assignee(&tickets, &assignee), status);
        assert_eq!(ids(&one), ids(&two));
        assert_eq!(ids(&one), vec!["t4"]);
    }

    #[test]
    fn test_filter_parsing() {
        assert_eq!("all".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!(
            "In Progress".parse::<StatusFilter>().unwrap(),
            StatusFilter::Only(Status::InProgress)
        );
        assert!("bogus".parse::<StatusFilter>().is_err());

        assert_eq!(AssigneeFilter::parse("ALL"), AssigneeFilter::All);
        assert_eq!(AssigneeFilter::parse(""), AssigneeFilter::All);
        assert_eq!(AssigneeFilter::parse("none"), AssigneeFilter::Unassigned);
        assert_eq!(AssigneeFilter::parse(" An "), AssigneeFilter::Named("An".into()));

        assert!(matches!(parse_date("02/01/2024"), Err(Error::InvalidDate(_))));
    }

    #[test]
    fn test_technician_view() {
        let mut mine_old = ticket("mine-old", Status::Waiting, "2024-01-01T00:00:00Z");
        mine_old.assigned_to = "An".into();
        let mut mine_new = ticket("mine-new", Status::Waiting, "2024-01-02T00:00:00Z");
        mine_new.assigned_to = "An".into();
        let mut mine_done = ticket("mine-done", Status::Completed, "2024-01-03T00:00:00Z");
        mine_done.assigned_to = "An".into();
        let other = ticket("other", Status::Waiting, "2024-01-04T00:00:00Z");
        let tickets = vec![mine_done, mine_old, other, mine_new];

        let view = technician_view(&tickets, StatusFilter::All, &AssigneeFilter::parse("An"));
        assert_eq!(ids(&view), vec!["mine-new", "mine-old", "mine-done"]);
    }

    #[test]
    fn test_admin_view() {
        let mut a = ticket("t-1-a", Status::Completed, "2024-01-02T08:00:00Z");
        a.name = "Anh Minh".into();
        a.assigned_to = "Quang".into();
        let mut b = ticket("t-1-b", Status::Completed, "2024-01-02T18:00:00Z");
        b.name = "Anh Minh".into();
        b.assigned_to = "Quang".into();
        let mut c = ticket("t-1-c", Status::Completed, "2024-01-05T08:00:00Z");
        c.name = "Anh Minh".into();
        c.assigned_to = "Quang".into();
        let mut d = ticket("t-1-d", Status::Waiting, "2024-01-02T09:00:00Z");
        d.name = "Anh Minh".into();
        let tickets = vec![a, b, c, d];

        let query = AdminQuery {
            search: "minh".into(),
            status: StatusFilter::Only(Status::Completed),
            assignee: AssigneeFilter::Named("Quang".into()),
            from: Some(parse_date("2024-01-01").unwrap()),
            to: Some(parse_date("2024-01-02").unwrap()),
        };
        assert_eq!(ids(&admin_view(&tickets, &query, &Utc)), vec!["t-1-b", "t-1-a"]);
        assert_eq!(admin_view(&tickets, &AdminQuery::default(), &Utc).len(), 4);
    }
}
