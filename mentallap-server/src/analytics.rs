//! In-memory aggregation for dashboards
//!
//! Everything here is a pure function of rows already loaded from the
//! database plus an explicit "now", so the numbers are testable without one.
//! Money stays in integer cents until it is formatted for display.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use crate::db::{
    Analysis, AnalyticsCounts, Article, AthleteActivity, BookingDetail, DashboardCounts,
    JournalEntry, WorkshopRevenue,
};
use crate::models::{AnalysisStatus, ArticleSection, BookingStatus};

const TOP_TAGS: usize = 5;
const MOOD_TREND_LEN: usize = 14;

/// Midnight UTC on the first day of `now`'s month.
pub fn month_start(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now)
}

pub fn week_ago(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(7)
}

/// `1234567` cents → `"12345.67"`.
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

/// Registrations × price over workshops starting at or after `since`
/// (every workshop when `since` is `None`).
pub fn revenue_cents(rows: &[WorkshopRevenue], since: Option<DateTime<Utc>>) -> i64 {
    rows.iter()
        .filter(|w| since.map_or(true, |s| w.starts_at >= s))
        .map(|w| w.price_cents.saturating_mul(w.registrations))
        .fold(0i64, i64::saturating_add)
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn average(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| round1(sum / n as f64))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoodPoint {
    pub date: NaiveDate,
    pub mood: i16,
}

/// Journal overview for one athlete
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JournalSummary {
    /// Every entry the athlete has, not only the ones summarized
    pub total_entries: i64,
    pub this_week: usize,
    pub streak: u32,
    pub top_tags: Vec<TagCount>,
    pub avg_mood: Option<f64>,
    pub avg_sleep: Option<f64>,
    pub avg_rpe: Option<f64>,
    pub mood_trend: Vec<MoodPoint>,
}

/// Consecutive days with at least one entry, ending today or yesterday.
pub fn streak(dates: &HashSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut day = if dates.contains(&today) {
        today
    } else {
        match today.pred_opt() {
            Some(yesterday) if dates.contains(&yesterday) => yesterday,
            _ => return 0,
        }
    };

    let mut count = 0;
    while dates.contains(&day) {
        count += 1;
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }
    count
}

/// Most frequent tags, ties broken alphabetically.
pub fn top_tags<'a>(tags: impl Iterator<Item = &'a str>, limit: usize) -> Vec<TagCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for tag in tags {
        *counts.entry(tag).or_default() += 1;
    }
    let mut ranked: Vec<TagCount> = counts
        .into_iter()
        .map(|(tag, count)| TagCount {
            tag: tag.to_owned(),
            count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));
    ranked.truncate(limit);
    ranked
}

/// Summary over `entries` (the most recent window); `total_entries` is the
/// athlete's full count.
pub fn journal_summary(
    entries: &[JournalEntry],
    total_entries: i64,
    today: NaiveDate,
) -> JournalSummary {
    let week_start = today - Duration::days(6);
    let dates: HashSet<NaiveDate> = entries.iter().map(|e| e.date).collect();

    let mut chronological: Vec<&JournalEntry> = entries.iter().collect();
    chronological.sort_by_key(|e| (e.date, e.created_at));
    let skip = chronological.len().saturating_sub(MOOD_TREND_LEN);
    let mood_trend = chronological[skip..]
        .iter()
        .map(|e| MoodPoint {
            date: e.date,
            mood: e.mood,
        })
        .collect();

    JournalSummary {
        total_entries,
        this_week: entries
            .iter()
            .filter(|e| e.date >= week_start && e.date <= today)
            .count(),
        streak: streak(&dates, today),
        top_tags: top_tags(
            entries.iter().flat_map(|e| e.tags.iter().map(String::as_str)),
            TOP_TAGS,
        ),
        avg_mood: average(entries.iter().map(|e| f64::from(e.mood))),
        avg_sleep: average(entries.iter().map(|e| e.sleep_hours)),
        avg_rpe: average(entries.iter().map(|e| f64::from(e.rpe))),
        mood_trend,
    }
}

/// Header numbers for the athlete management page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AthleteSummary {
    pub total: usize,
    pub active_this_week: usize,
    pub new_this_month: usize,
    pub avg_journal_entries: i64,
}

/// Journaled within the last seven days.
pub fn is_active(athlete: &AthleteActivity, now: DateTime<Utc>) -> bool {
    athlete
        .last_journal_at
        .is_some_and(|last| last >= week_ago(now))
}

pub fn athlete_summary(athletes: &[AthleteActivity], now: DateTime<Utc>) -> AthleteSummary {
    let total = athletes.len();
    let entries: i64 = athletes.iter().map(|a| a.journal_entries).sum();
    let month = month_start(now);

    AthleteSummary {
        total,
        active_this_week: athletes.iter().filter(|a| is_active(a, now)).count(),
        new_this_month: athletes.iter().filter(|a| a.created_at >= month).count(),
        avg_journal_entries: if total == 0 {
            0
        } else {
            (entries as f64 / total as f64).round() as i64
        },
    }
}

/// Admin bookings page numbers
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BookingOverview {
    pub total: usize,
    pub requested: usize,
    pub confirmed: usize,
    pub completed: usize,
    pub completed_this_month: usize,
}

pub fn booking_overview(bookings: &[BookingDetail], now: DateTime<Utc>) -> BookingOverview {
    let month = month_start(now);
    let mut overview = BookingOverview {
        total: bookings.len(),
        ..Default::default()
    };
    for booking in bookings {
        match booking.status() {
            Ok(BookingStatus::Requested) => overview.requested += 1,
            Ok(BookingStatus::Confirmed) => overview.confirmed += 1,
            Ok(BookingStatus::Completed) => {
                overview.completed += 1;
                if booking.updated_at >= month {
                    overview.completed_this_month += 1;
                }
            }
            Err(e) => tracing::warn!(booking_id = %booking.id, error = %e, "skipping booking"),
        }
    }
    overview
}

/// Admin form-analysis queue numbers
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisOverview {
    pub total: usize,
    pub pending: usize,
    pub in_review: usize,
    pub completed_today: usize,
}

pub fn analysis_overview(analyses: &[Analysis], today: NaiveDate) -> AnalysisOverview {
    let mut overview = AnalysisOverview {
        total: analyses.len(),
        ..Default::default()
    };
    for analysis in analyses {
        let Ok(status) = analysis.status() else {
            continue;
        };
        if status.is_pending() {
            overview.pending += 1;
        }
        match status {
            AnalysisStatus::InReview => overview.in_review += 1,
            AnalysisStatus::Complete if analysis.updated_at.date_naive() == today => {
                overview.completed_today += 1
            }
            _ => {}
        }
    }
    overview
}

/// Admin content page numbers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentOverview {
    pub total: usize,
    pub published: usize,
    pub drafts: usize,
    pub published_this_month: usize,
    /// Article count per section, keyed by section name
    pub by_section: BTreeMap<&'static str, usize>,
}

pub fn content_overview(articles: &[Article], now: DateTime<Utc>) -> ContentOverview {
    let month = month_start(now);
    let mut by_section: BTreeMap<&'static str, usize> = ArticleSection::ALL
        .iter()
        .map(|s| (s.as_str(), 0))
        .collect();
    for article in articles {
        if let Ok(section) = ArticleSection::parse(&article.section) {
            *by_section.entry(section.as_str()).or_default() += 1;
        }
    }
    let published = articles.iter().filter(|a| a.is_published()).count();

    ContentOverview {
        total: articles.len(),
        published,
        drafts: articles.len() - published,
        published_this_month: articles
            .iter()
            .filter(|a| a.published_at.is_some_and(|p| p >= month))
            .count(),
        by_section,
    }
}

/// `/api/admin/stats` body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminStats {
    pub total_athletes: i64,
    pub pending_analyses: i64,
    pub upcoming_workshops: i64,
    pub recent_bookings: i64,
    pub active_journals: i64,
    /// Revenue from workshops starting this month, in dollars
    pub total_revenue: String,
}

pub fn admin_stats(
    counts: &DashboardCounts,
    revenue: &[WorkshopRevenue],
    now: DateTime<Utc>,
) -> AdminStats {
    AdminStats {
        total_athletes: counts.total_athletes,
        pending_analyses: counts.pending_analyses,
        upcoming_workshops: counts.upcoming_workshops,
        recent_bookings: counts.recent_bookings,
        active_journals: counts.active_journals,
        total_revenue: format_cents(revenue_cents(revenue, Some(month_start(now)))),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserStats {
    pub total: i64,
    pub athletes: i64,
    pub admins: i64,
    pub coaches: i64,
    pub new_this_month: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JournalStats {
    pub total: i64,
    pub this_week: i64,
    pub avg_mood: Option<f64>,
    pub avg_sleep: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkshopStats {
    pub total: i64,
    pub upcoming: i64,
    pub registrations: i64,
    pub revenue_total: String,
    pub revenue_this_month: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountStats {
    pub total: i64,
    pub pending: i64,
    pub completed: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentStats {
    pub articles: i64,
    pub published: i64,
}

/// `/api/admin/analytics` body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsReport {
    pub users: UserStats,
    pub journal: JournalStats,
    pub workshops: WorkshopStats,
    pub content: ContentStats,
    pub analyses: CountStats,
    pub bookings: CountStats,
}

pub fn analytics_report(
    c: &AnalyticsCounts,
    revenue: &[WorkshopRevenue],
    now: DateTime<Utc>,
) -> AnalyticsReport {
    AnalyticsReport {
        users: UserStats {
            total: c.users_total,
            athletes: c.users_athletes,
            admins: c.users_admins,
            coaches: c.users_coaches,
            new_this_month: c.users_new_this_month,
        },
        journal: JournalStats {
            total: c.journal_total,
            this_week: c.journal_this_week,
            avg_mood: c.journal_avg_mood.map(round1),
            avg_sleep: c.journal_avg_sleep.map(round1),
        },
        workshops: WorkshopStats {
            total: c.workshops_total,
            upcoming: c.workshops_upcoming,
            registrations: c.registrations_total,
            revenue_total: format_cents(revenue_cents(revenue, None)),
            revenue_this_month: format_cents(revenue_cents(revenue, Some(month_start(now)))),
        },
        content: ContentStats {
            articles: c.articles_total,
            published: c.articles_published,
        },
        analyses: CountStats {
            total: c.analyses_total,
            pending: c.analyses_pending,
            completed: c.analyses_completed,
        },
        bookings: CountStats {
            total: c.bookings_total,
            pending: c.bookings_pending,
            completed: c.bookings_completed,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn at(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, 12, 0, 0).unwrap()
    }

    fn entry(d: u32, mood: i16, tags: &[&str]) -> JournalEntry {
        JournalEntry {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            date: day(d),
            mood,
            sleep_hours: 8.0,
            rpe: 6,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            notes: None,
            created_at: at(d),
            updated_at: at(d),
        }
    }

    #[test]
    fn month_start_is_first_midnight() {
        assert_eq!(
            month_start(Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap()),
            Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn cents_formatting() {
        assert_eq!(format_cents(0), "0.00");
        assert_eq!(format_cents(4900), "49.00");
        assert_eq!(format_cents(123_456), "1234.56");
        assert_eq!(format_cents(5), "0.05");
        assert_eq!(format_cents(-250), "-2.50");
    }

    #[test]
    fn revenue_counts_only_workshops_since() {
        let rows = vec![
            WorkshopRevenue {
                workshop_id: Uuid::new_v4(),
                starts_at: at(2),
                price_cents: 4900,
                registrations: 3,
            },
            WorkshopRevenue {
                workshop_id: Uuid::new_v4(),
                starts_at: at(20),
                price_cents: 2999,
                registrations: 10,
            },
        ];
        assert_eq!(revenue_cents(&rows, None), 3 * 4900 + 10 * 2999);
        assert_eq!(revenue_cents(&rows, Some(at(10))), 29_990);
        assert_eq!(format_cents(revenue_cents(&rows, Some(at(10)))), "299.90");
    }

    #[test]
    fn streak_ending_yesterday_counts() {
        let dates: HashSet<_> = [day(23), day(24), day(25)].into_iter().collect();
        assert_eq!(streak(&dates, day(25)), 3);
        assert_eq!(streak(&dates, day(26)), 3);
        assert_eq!(streak(&dates, day(27)), 0);
    }

    #[test]
    fn streak_stops_at_gap() {
        let dates: HashSet<_> = [day(20), day(22), day(23)].into_iter().collect();
        assert_eq!(streak(&dates, day(23)), 2);
    }

    #[test]
    fn top_tags_break_ties_alphabetically() {
        let tags = ["training", "recovery", "training", "competition", "recovery", "focus"];
        let top = top_tags(tags.into_iter(), 3);
        assert_eq!(
            top,
            vec![
                TagCount { tag: "recovery".into(), count: 2 },
                TagCount { tag: "training".into(), count: 2 },
                TagCount { tag: "competition".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn summary_of_recent_entries() {
        let entries = vec![
            entry(26, 4, &["training"]),
            entry(25, 5, &["competition", "training"]),
            entry(24, 3, &["recovery"]),
            entry(10, 2, &[]),
        ];
        let summary = journal_summary(&entries, 4, day(26));

        assert_eq!(summary.total_entries, 4);
        assert_eq!(summary.this_week, 3);
        assert_eq!(summary.streak, 3);
        assert_eq!(summary.top_tags[0], TagCount { tag: "training".into(), count: 2 });
        assert_eq!(summary.avg_mood, Some(3.5));
        assert_eq!(summary.avg_sleep, Some(8.0));
        assert_eq!(
            summary.mood_trend.iter().map(|p| p.mood).collect::<Vec<_>>(),
            vec![2, 3, 5, 4]
        );
    }

    #[test]
    fn mood_trend_keeps_latest_fourteen() {
        let entries: Vec<_> = (1..=20).map(|d| entry(d, 3, &[])).collect();
        let summary = journal_summary(&entries, 20, day(20));
        assert_eq!(summary.mood_trend.len(), MOOD_TREND_LEN);
        assert_eq!(summary.mood_trend[0].date, day(7));
        assert_eq!(summary.mood_trend[13].date, day(20));
    }

    #[test]
    fn empty_summary() {
        let summary = journal_summary(&[], 0, day(1));
        assert_eq!(summary.total_entries, 0);
        assert_eq!(summary.streak, 0);
        assert_eq!(summary.avg_mood, None);
        assert!(summary.top_tags.is_empty());
    }

    #[test]
    fn total_is_not_capped_by_the_window() {
        let window = vec![entry(26, 4, &[]), entry(25, 2, &[])];
        let summary = journal_summary(&window, 500, day(26));
        assert_eq!(summary.total_entries, 500);
        assert_eq!(summary.avg_mood, Some(3.0));
    }

    #[test]
    fn athlete_activity_summary() {
        let athlete = |created: u32, entries: i64, last: Option<u32>| AthleteActivity {
            id: Uuid::new_v4(),
            name: "A".into(),
            email: "a@example.com".into(),
            sport: None,
            created_at: at(created),
            journal_entries: entries,
            analyses: 0,
            bookings: 0,
            registrations: 0,
            last_journal_at: last.map(at),
        };
        let now = Utc.with_ymd_and_hms(2024, 2, 3, 12, 0, 0).unwrap();
        let athletes = vec![
            athlete(2, 5, None),
            athlete(30, 4, Some(31)),
            athlete(3, 0, Some(10)),
        ];
        let summary = athlete_summary(&athletes, now);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.active_this_week, 1);
        assert_eq!(summary.new_this_month, 0);
        assert_eq!(summary.avg_journal_entries, 3);
        assert_eq!(athlete_summary(&[], now).avg_journal_entries, 0);
    }

    #[test]
    fn admin_stats_formats_monthly_revenue() {
        let counts = DashboardCounts {
            total_athletes: 12,
            ..Default::default()
        };
        let rows = vec![
            WorkshopRevenue {
                workshop_id: Uuid::new_v4(),
                starts_at: Utc.with_ymd_and_hms(2023, 12, 20, 18, 0, 0).unwrap(),
                price_cents: 10_000,
                registrations: 5,
            },
            WorkshopRevenue {
                workshop_id: Uuid::new_v4(),
                starts_at: at(15),
                price_cents: 4900,
                registrations: 2,
            },
        ];
        let stats = admin_stats(&counts, &rows, at(10));
        assert_eq!(stats.total_athletes, 12);
        assert_eq!(stats.total_revenue, "98.00");

        let report = analytics_report(&AnalyticsCounts::default(), &rows, at(10));
        assert_eq!(report.workshops.revenue_total, "598.00");
        assert_eq!(report.workshops.revenue_this_month, "98.00");
    }
}
