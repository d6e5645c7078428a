//! Server-rendered HTML
//!
//! Plain string templates. Every value that came from a user or the database
//! goes through [`escape`] before it reaches markup.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use crate::analytics::{
    AdminStats, AnalysisOverview, AnalyticsReport, AthleteSummary, BookingOverview,
    ContentOverview, JournalSummary,
};
use crate::db::{
    Analysis, Article, AthleteActivity, BookingDetail, JournalEntry, RegistrationDetail, User,
    WorkshopWithCount, WorkshopWithRegistrants,
};
use crate::models::{ArticleSection, Role, SessionType, TrackEvent};

/// Escape text for HTML element content and quoted attributes.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn when(t: DateTime<Utc>) -> String {
    t.format("%b %-d, %Y %H:%M UTC").to_string()
}

fn nav(user: Option<&User>) -> String {
    let mut links = String::from(
        "<a href=\"/\">Home</a> <a href=\"/workshops\">Workshops</a> \
         <a href=\"/library\">Library</a> <a href=\"/recruiting-tips\">Recruiting</a> \
         <a href=\"/sessions\">Sessions</a> <a href=\"/contact\">Contact</a>",
    );
    match user {
        Some(u) => {
            links.push_str(" <a href=\"/dashboard\">Dashboard</a>");
            if u.role() == Role::Admin {
                links.push_str(" <a href=\"/admin/analytics\">Admin</a>");
            }
            let _ = write!(
                links,
                " <form method=\"post\" action=\"/auth/signout\" style=\"display:inline\">\
                 <span>{}</span> <button type=\"submit\">Sign out</button></form>",
                escape(&u.name)
            );
        }
        None => links.push_str(
            " <a href=\"/auth/signin\">Sign in</a> <a href=\"/auth/signup\">Sign up</a>",
        ),
    }
    format!("<nav>{links}</nav>")
}

/// Wrap a page body in the site layout.
pub fn layout(title: &str, user: Option<&User>, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
         <title>{title} | The Mental Lap</title></head>\
         <body>{nav}<main>{body}</main>\
         <footer><p>The Mental Lap - Elite Mental Performance Coaching</p></footer>\
         </body></html>",
        title = escape(title),
        nav = nav(user),
    )
}

fn stat(label: &str, value: impl std::fmt::Display) -> String {
    format!(
        "<div class=\"stat\"><h3>{}</h3><p>{}</p></div>",
        escape(label),
        escape(&value.to_string())
    )
}

fn opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_owned(), |v| format!("{v:.1}"))
}

pub fn home(user: Option<&User>) -> String {
    layout(
        "Home",
        user,
        "<h1>The Mental Lap</h1>\
         <p>Mental performance coaching, hurdle technique and recruiting guidance for track athletes.</p>\
         <ul><li><a href=\"/workshops\">Upcoming workshops</a></li>\
         <li><a href=\"/sessions\">Book a 1:1 session</a></li>\
         <li><a href=\"/library\">Mental skills library</a></li>\
         <li><a href=\"/recruiting-tips\">Recruiting tips</a></li></ul>",
    )
}

fn workshop_card(w: &WorkshopWithCount, signed_in: bool) -> String {
    let ws = &w.workshop;
    let left = ws.seats_left(w.registration_count);
    let action = if !signed_in {
        "<a href=\"/auth/signin\">Sign in to register</a>".to_owned()
    } else if left == 0 {
        "<p>Workshop is full</p>".to_owned()
    } else {
        format!(
            "<form method=\"post\" action=\"/api/workshops/{}/register\">\
             <button type=\"submit\">Register</button></form>",
            ws.id
        )
    };
    format!(
        "<article class=\"workshop\"><h2>{title}</h2><p>{summary}</p>\
         <p>{starts} · {duration} min · {location}</p>\
         <p>${price} · {count}/{capacity} registered · {left} seats left</p>{action}</article>",
        title = escape(&ws.title),
        summary = escape(&ws.summary),
        starts = when(ws.starts_at),
        duration = ws.duration_min,
        location = escape(&ws.location),
        price = crate::analytics::format_cents(ws.price_cents),
        count = w.registration_count,
        capacity = ws.capacity,
    )
}

pub fn workshops(
    user: Option<&User>,
    upcoming: &[WorkshopWithCount],
    past: &[WorkshopWithCount],
) -> String {
    let mut body = String::from("<h1>Workshops</h1><h2>Upcoming</h2>");
    if upcoming.is_empty() {
        body.push_str("<p>No upcoming workshops. Check back soon.</p>");
    }
    for w in upcoming {
        body.push_str(&workshop_card(w, user.is_some()));
    }
    if !past.is_empty() {
        body.push_str("<h2>Past workshops</h2><ul>");
        for w in past {
            let _ = write!(
                body,
                "<li>{} ({})</li>",
                escape(&w.workshop.title),
                when(w.workshop.starts_at)
            );
        }
        body.push_str("</ul>");
    }
    layout("Workshops", user, &body)
}

pub fn articles(user: Option<&User>, section: ArticleSection, items: &[Article]) -> String {
    let (title, base) = match section {
        ArticleSection::Library => ("Mental Skills Library", "/library"),
        ArticleSection::Recruiting => ("Recruiting Tips", "/recruiting-tips"),
    };
    let mut body = format!("<h1>{title}</h1>");
    if items.is_empty() {
        body.push_str("<p>No articles published yet.</p>");
    }
    for a in items {
        let _ = write!(
            body,
            "<article><h2><a href=\"{base}/{slug}\">{title}</a></h2><p>{excerpt}</p>\
             <p><small>By {author}{date}</small></p></article>",
            slug = escape(&a.slug),
            title = escape(&a.title),
            excerpt = escape(&a.excerpt),
            author = escape(&a.author_name),
            date = a
                .published_at
                .map(|p| format!(" · {}", p.format("%b %-d, %Y")))
                .unwrap_or_default(),
        );
    }
    layout(title, user, &body)
}

pub fn article(user: Option<&User>, a: &Article) -> String {
    let body = format!(
        "<article><h1>{}</h1><p><em>{}</em></p><p><small>By {}</small></p>\
         <div style=\"white-space: pre-wrap;\">{}</div></article>",
        escape(&a.title),
        escape(&a.excerpt),
        escape(&a.author_name),
        escape(&a.content),
    );
    layout(&a.title, user, &body)
}

pub fn sessions(user: Option<&User>, coaches: &[User], calendly_url: Option<&str>) -> String {
    let mut body = String::from("<h1>1:1 Sessions</h1><h2>Session types</h2><ul>");
    for t in SessionType::ALL {
        let _ = write!(
            body,
            "<li><strong>{}</strong> ({} min): {}</li>",
            t.title(),
            t.duration_min(),
            t.description()
        );
    }
    body.push_str("</ul><h2>Coaches</h2>");
    if coaches.is_empty() {
        body.push_str("<p>No coaches available right now.</p>");
    }
    for c in coaches {
        let _ = write!(
            body,
            "<section><h3>{}</h3><p>{}</p><p>{}</p></section>",
            escape(&c.name),
            escape(c.sport.as_deref().unwrap_or("")),
            escape(c.bio.as_deref().unwrap_or("")),
        );
    }
    if let Some(url) = calendly_url {
        let _ = write!(
            body,
            "<p><a href=\"{}\">Pick a time on our calendar</a></p>",
            escape(url)
        );
    }
    if user.is_some() && !coaches.is_empty() {
        body.push_str("<h2>Request a session</h2><form method=\"post\" action=\"/api/bookings\">");
        body.push_str("<select name=\"coach_id\">");
        for c in coaches {
            let _ = write!(body, "<option value=\"{}\">{}</option>", c.id, escape(&c.name));
        }
        body.push_str("</select><select name=\"session_type\">");
        for t in SessionType::ALL {
            let _ = write!(body, "<option value=\"{}\">{}</option>", t.as_str(), t.title());
        }
        body.push_str(
            "</select><textarea name=\"message\"></textarea>\
             <button type=\"submit\">Request</button></form>",
        );
    }
    layout("Sessions", user, &body)
}

pub fn contact(user: Option<&User>) -> String {
    layout(
        "Contact",
        user,
        "<h1>Contact us</h1>\
         <form id=\"contact\" method=\"post\" action=\"/api/contact\">\
         <select name=\"type\"><option value=\"general\">General Inquiry</option>\
         <option value=\"partnership\">Partnership Inquiry</option></select>\
         <input name=\"name\" placeholder=\"Name\" required>\
         <input name=\"email\" type=\"email\" placeholder=\"Email\" required>\
         <input name=\"subject\" placeholder=\"Subject\">\
         <textarea name=\"message\" required></textarea>\
         <button type=\"submit\">Send</button></form>",
    )
}

fn auth_form(title: &str, action: &str, extra: &str, error: Option<&str>, alt: &str) -> String {
    let error = error
        .map(|e| format!("<p class=\"error\" role=\"alert\">{}</p>", escape(e)))
        .unwrap_or_default();
    layout(
        title,
        None,
        &format!(
            "<h1>{title}</h1>{error}<form method=\"post\" action=\"{action}\">{extra}\
             <input name=\"email\" type=\"email\" placeholder=\"Email\" required>\
             <input name=\"password\" type=\"password\" placeholder=\"Password\" required>\
             <button type=\"submit\">{title}</button></form>{alt}",
            title = escape(title),
        ),
    )
}

pub fn sign_in(error: Option<&str>) -> String {
    auth_form(
        "Sign in",
        "/auth/signin",
        "",
        error,
        "<p>No account? <a href=\"/auth/signup\">Sign up</a></p>",
    )
}

pub fn sign_up(error: Option<&str>) -> String {
    auth_form(
        "Sign up",
        "/auth/signup",
        "<input name=\"name\" placeholder=\"Full name\" required>\
         <select name=\"role\"><option value=\"athlete\">Athlete</option>\
         <option value=\"coach\">Coach</option></select>",
        error,
        "<p>Already have an account? <a href=\"/auth/signin\">Sign in</a></p>",
    )
}

fn journal_summary_block(summary: &JournalSummary) -> String {
    let tags = summary
        .top_tags
        .iter()
        .map(|t| format!("{} ({})", escape(&t.tag), t.count))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "<section class=\"stats\">{}{}{}{}{}</section><p>Top tags: {}</p>",
        stat("Entries this week", summary.this_week),
        stat("Current streak", format!("{} days", summary.streak)),
        stat("Avg mood", opt(summary.avg_mood)),
        stat("Avg sleep", opt(summary.avg_sleep)),
        stat("Avg RPE", opt(summary.avg_rpe)),
        if tags.is_empty() { "-".to_owned() } else { tags },
    )
}

pub fn athlete_dashboard(
    user: &User,
    summary: &JournalSummary,
    registrations: &[RegistrationDetail],
    bookings: &[BookingDetail],
    analyses: &[Analysis],
) -> String {
    let mut body = format!("<h1>Welcome back, {}</h1>", escape(&user.name));
    body.push_str(&journal_summary_block(summary));

    body.push_str("<h2>My workshops</h2><ul>");
    for r in registrations {
        let _ = write!(
            body,
            "<li>{} · {} · {}</li>",
            escape(&r.workshop_title),
            when(r.starts_at),
            escape(&r.location)
        );
    }
    body.push_str("</ul><h2>My sessions</h2><ul>");
    for b in bookings {
        let _ = write!(
            body,
            "<li>{} with {} · {}{}</li>",
            escape(&b.session_type),
            escape(&b.coach_name),
            escape(&b.status),
            b.external_link
                .as_deref()
                .map(|l| format!(" · <a href=\"{}\">Join</a>", escape(l)))
                .unwrap_or_default(),
        );
    }
    body.push_str("</ul><h2>My form analyses</h2><ul>");
    for a in analyses {
        let _ = write!(
            body,
            "<li>{} · {} · {} comments</li>",
            event_label(&a.event),
            escape(&a.status),
            a.comment_count
        );
    }
    body.push_str("</ul>");
    layout("Dashboard", Some(user), &body)
}

pub fn coach_dashboard(user: &User, bookings: &[BookingDetail], queue: &[Analysis]) -> String {
    let mut body = format!("<h1>Coach dashboard</h1><p>Signed in as {}</p>", escape(&user.name));
    body.push_str("<h2>Session requests</h2>");
    body.push_str(&bookings_table(bookings));
    body.push_str("<h2>Form analysis queue</h2>");
    body.push_str(&analyses_table(queue));
    layout("Dashboard", Some(user), &body)
}

pub fn admin_dashboard(user: &User, stats: &AdminStats) -> String {
    let body = format!(
        "<h1>Admin dashboard</h1><section class=\"stats\">{}{}{}{}{}{}</section>\
         <ul><li><a href=\"/admin/analytics\">Analytics</a></li>\
         <li><a href=\"/admin/athletes\">Athletes</a></li>\
         <li><a href=\"/admin/bookings\">Bookings</a></li>\
         <li><a href=\"/admin/content\">Content</a></li>\
         <li><a href=\"/admin/form-analysis\">Form analysis</a></li>\
         <li><a href=\"/admin/workshops\">Workshops</a></li></ul>",
        stat("Total athletes", stats.total_athletes),
        stat("Pending analyses", stats.pending_analyses),
        stat("Upcoming workshops", stats.upcoming_workshops),
        stat("Bookings (7 days)", stats.recent_bookings),
        stat("Journal entries (7 days)", stats.active_journals),
        stat("Revenue this month", format!("${}", stats.total_revenue)),
    );
    layout("Admin", Some(user), &body)
}

pub fn journal(user: &User, entries: &[JournalEntry], summary: &JournalSummary) -> String {
    let mut body = String::from("<h1>Training journal</h1>");
    body.push_str(&journal_summary_block(summary));
    body.push_str(
        "<h2>New entry</h2><form id=\"journal\" method=\"post\" action=\"/api/journal\">\
         <input name=\"date\" type=\"date\">\
         <input name=\"mood\" type=\"number\" min=\"1\" max=\"5\" required>\
         <input name=\"sleep_hours\" type=\"number\" min=\"0\" max=\"24\" step=\"0.5\" required>\
         <input name=\"rpe\" type=\"number\" min=\"1\" max=\"10\" required>\
         <input name=\"tags\" placeholder=\"training, recovery\">\
         <textarea name=\"notes\"></textarea><button type=\"submit\">Save</button></form>",
    );
    body.push_str(
        "<h2>Entries</h2><table><tr><th>Date</th><th>Mood</th><th>Sleep</th>\
         <th>RPE</th><th>Tags</th><th>Notes</th></tr>",
    );
    for e in entries {
        let _ = write!(
            body,
            "<tr><td>{}</td><td>{}</td><td>{:.1}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            e.date,
            e.mood,
            e.sleep_hours,
            e.rpe,
            escape(&e.tags.join(", ")),
            escape(e.notes.as_deref().unwrap_or("")),
        );
    }
    body.push_str("</table>");
    layout("Journal", Some(user), &body)
}

fn event_label(raw: &str) -> String {
    TrackEvent::parse(raw)
        .map(|e| e.label().to_owned())
        .unwrap_or_else(|_| escape(raw))
}

fn analyses_table(analyses: &[Analysis]) -> String {
    let mut out = String::from(
        "<table><tr><th>Athlete</th><th>Event</th><th>Video</th><th>Status</th>\
         <th>Comments</th><th>Submitted</th></tr>",
    );
    for a in analyses {
        let _ = write!(
            out,
            "<tr><td>{}</td><td>{}</td><td><a href=\"{}\">video</a></td><td>{}</td>\
             <td>{}</td><td>{}</td></tr>",
            escape(&a.athlete_name),
            event_label(&a.event),
            escape(&a.video_url),
            escape(&a.status),
            a.comment_count,
            when(a.created_at),
        );
    }
    out.push_str("</table>");
    out
}

pub fn form_analysis(user: &User, analyses: &[Analysis]) -> String {
    let mut body = String::from(
        "<h1>Form analysis</h1><h2>Submit a video</h2>\
         <form id=\"form-analysis\" method=\"post\" action=\"/api/analyses\"><select name=\"event\">",
    );
    for e in TrackEvent::ALL {
        let _ = write!(body, "<option value=\"{}\">{}</option>", e.as_str(), e.label());
    }
    body.push_str(
        "</select><input name=\"video_url\" type=\"url\" required>\
         <textarea name=\"notes\"></textarea><button type=\"submit\">Submit</button></form>\
         <h2>Submissions</h2>",
    );
    body.push_str(&analyses_table(analyses));
    layout("Form analysis", Some(user), &body)
}

pub fn admin_analytics(user: &User, report: &AnalyticsReport) -> String {
    let body = format!(
        "<h1>Analytics</h1>\
         <h2>Users</h2><section class=\"stats\">{}{}{}{}{}</section>\
         <h2>Journal</h2><section class=\"stats\">{}{}{}{}</section>\
         <h2>Workshops</h2><section class=\"stats\">{}{}{}{}{}</section>\
         <h2>Content</h2><section class=\"stats\">{}{}</section>\
         <h2>Form analyses</h2><section class=\"stats\">{}{}{}</section>\
         <h2>Bookings</h2><section class=\"stats\">{}{}{}</section>",
        stat("Total", report.users.total),
        stat("Athletes", report.users.athletes),
        stat("Coaches", report.users.coaches),
        stat("Admins", report.users.admins),
        stat("New this month", report.users.new_this_month),
        stat("Entries", report.journal.total),
        stat("This week", report.journal.this_week),
        stat("Avg mood", opt(report.journal.avg_mood)),
        stat("Avg sleep", opt(report.journal.avg_sleep)),
        stat("Total", report.workshops.total),
        stat("Upcoming", report.workshops.upcoming),
        stat("Registrations", report.workshops.registrations),
        stat("Revenue", format!("${}", report.workshops.revenue_total)),
        stat("Revenue this month", format!("${}", report.workshops.revenue_this_month)),
        stat("Articles", report.content.articles),
        stat("Published", report.content.published),
        stat("Total", report.analyses.total),
        stat("Pending", report.analyses.pending),
        stat("Completed", report.analyses.completed),
        stat("Total", report.bookings.total),
        stat("Pending", report.bookings.pending),
        stat("Completed", report.bookings.completed),
    );
    layout("Analytics", Some(user), &body)
}

pub fn admin_athletes(
    user: &User,
    athletes: &[AthleteActivity],
    summary: &AthleteSummary,
    now: DateTime<Utc>,
) -> String {
    let mut body = format!(
        "<h1>Athlete management</h1><section class=\"stats\">{}{}{}{}</section>",
        stat("Total athletes", summary.total),
        stat("Active this week", summary.active_this_week),
        stat("New this month", summary.new_this_month),
        stat("Avg. journal entries", summary.avg_journal_entries),
    );
    body.push_str(
        "<table><tr><th>Name</th><th>Email</th><th>Sport</th><th>Journal</th>\
         <th>Analyses</th><th>Bookings</th><th>Workshops</th><th>Status</th></tr>",
    );
    for a in athletes {
        let _ = write!(
            body,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
             <td>{}</td><td>{}</td></tr>",
            escape(&a.name),
            escape(&a.email),
            escape(a.sport.as_deref().unwrap_or("")),
            a.journal_entries,
            a.analyses,
            a.bookings,
            a.registrations,
            if crate::analytics::is_active(a, now) { "Active" } else { "Inactive" },
        );
    }
    body.push_str("</table>");
    layout("Athletes", Some(user), &body)
}

fn bookings_table(bookings: &[BookingDetail]) -> String {
    let mut out = String::from(
        "<table><tr><th>Athlete</th><th>Coach</th><th>Type</th><th>Scheduled</th>\
         <th>Status</th><th>Link</th></tr>",
    );
    for b in bookings {
        let _ = write!(
            out,
            "<tr><td>{} ({})</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&b.athlete_name),
            escape(&b.athlete_email),
            escape(&b.coach_name),
            escape(&b.session_type),
            b.scheduled_at.map(when).unwrap_or_else(|| "TBD".to_owned()),
            escape(&b.status),
            b.external_link
                .as_deref()
                .map(|l| format!("<a href=\"{}\">link</a>", escape(l)))
                .unwrap_or_default(),
        );
    }
    out.push_str("</table>");
    out
}

pub fn admin_bookings(user: &User, bookings: &[BookingDetail], overview: &BookingOverview) -> String {
    let mut body = format!(
        "<h1>Bookings</h1><section class=\"stats\">{}{}{}{}{}</section>",
        stat("Total", overview.total),
        stat("Requested", overview.requested),
        stat("Confirmed", overview.confirmed),
        stat("Completed", overview.completed),
        stat("Completed this month", overview.completed_this_month),
    );
    body.push_str(&bookings_table(bookings));
    layout("Bookings", Some(user), &body)
}

pub fn admin_content(user: &User, articles: &[Article], overview: &ContentOverview) -> String {
    let mut body = format!(
        "<h1>Content</h1><section class=\"stats\">{}{}{}{}</section>",
        stat("Articles", overview.total),
        stat("Published", overview.published),
        stat("Drafts", overview.drafts),
        stat("Published this month", overview.published_this_month),
    );
    body.push_str("<ul>");
    for (section, count) in &overview.by_section {
        let _ = write!(body, "<li>{section}: {count}</li>");
    }
    body.push_str(
        "</ul><table><tr><th>Title</th><th>Section</th><th>Author</th><th>Status</th></tr>",
    );
    for a in articles {
        let _ = write!(
            body,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&a.title),
            escape(&a.section),
            escape(&a.author_name),
            if a.is_published() { "Published" } else { "Draft" },
        );
    }
    body.push_str("</table>");
    layout("Content", Some(user), &body)
}

pub fn admin_form_analysis(user: &User, analyses: &[Analysis], overview: &AnalysisOverview) -> String {
    let mut body = format!(
        "<h1>Form analysis review</h1><section class=\"stats\">{}{}{}{}</section>",
        stat("Pending", overview.pending),
        stat("In review", overview.in_review),
        stat("Completed today", overview.completed_today),
        stat("Total", overview.total),
    );
    body.push_str(&analyses_table(analyses));
    layout("Form analysis review", Some(user), &body)
}

pub fn admin_workshops(user: &User, workshops: &[WorkshopWithRegistrants]) -> String {
    let mut body = String::from("<h1>Workshop management</h1>");
    for w in workshops {
        let ws = &w.workshop;
        let emails = w
            .registrants
            .iter()
            .map(|r| escape(&r.email))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = write!(
            body,
            "<section><h2>{}</h2><p>{} · {}/{} registered · ${}</p><p>{}</p></section>",
            escape(&ws.title),
            when(ws.starts_at),
            w.registrants.len(),
            ws.capacity,
            crate::analytics::format_cents(ws.price_cents),
            emails,
        );
    }
    layout("Workshops", Some(user), &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn user(role: &str) -> User {
        User {
            id: Uuid::new_v4(),
            email: "coach@thementallap.com".into(),
            name: "Sarah <Coach>".into(),
            role: role.into(),
            sport: None,
            bio: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape(r#"<script>alert("x") & 'y'</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#39;y&#39;&lt;/script&gt;"
        );
    }

    #[test]
    fn layout_escapes_user_name_and_shows_admin_link() {
        let admin = user("admin");
        let html = layout("Test", Some(&admin), "<p>ok</p>");
        assert!(html.contains("Sarah &lt;Coach&gt;"));
        assert!(html.contains("/admin/analytics"));

        let athlete = user("athlete");
        assert!(!layout("Test", Some(&athlete), "").contains("/admin/analytics"));
        assert!(layout("Test", None, "").contains("/auth/signin"));
    }

    #[test]
    fn sign_in_shows_error() {
        let html = sign_in(Some("Invalid email or password"));
        assert!(html.contains("role=\"alert\""));
        assert!(html.contains("Invalid email or password"));
    }
}
