//! Demo data and account maintenance
//!
//! `seed` is idempotent: accounts are matched by email, workshops and
//! articles by slug, and per-athlete demo history is only written for
//! athletes the run created.

use std::collections::HashSet;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::auth::{hash_password, AuthError};
use crate::db::{
    AnalysisRepo, ArticleRepo, DbError, JournalRepo, NewUser, User, UserRepo, WorkshopRepo,
};
use crate::models::{
    AnalysisStatus, ArticleDraft, Email, JournalDraft, Password, Role, TrackEvent,
    ValidationError, WorkshopDraft, WorkshopFields,
};

/// Password given to every demo account
pub const DEMO_PASSWORD: &str = "password123";

/// Seed error type
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("invalid seed data: {0}")]
    Validation(#[from] ValidationError),
}

/// What a seed run inserted
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeedReport {
    pub users: usize,
    pub journal_entries: usize,
    pub workshops: usize,
    pub articles: usize,
    pub analyses: usize,
}

struct DemoUser {
    email: &'static str,
    name: &'static str,
    role: Role,
    sport: Option<&'static str>,
    bio: Option<&'static str>,
}

const SKYLA: &str = "skyla@thementallap.com";
const BIRGEN: &str = "birgen@thementallap.com";
const ADMIN: &str = "admin@thementallap.com";
const ALEX: &str = "alex.runner@example.com";
const JORDAN: &str = "jordan.sprinter@example.com";

const TRACK: Option<&str> = Some("Track & Field");

const USERS: &[DemoUser] = &[
    DemoUser {
        email: SKYLA,
        name: "Skyla Wilson",
        role: Role::Coach,
        sport: TRACK,
        bio: Some(
            "NCAA East Prelim qualifier and First-Team All-Ivy hurdler/sprinter from UPenn. \
             Program record holder in 60H (8.29), 100H (13.45), 200m (23.54), and 400H (58.26). \
             I believe in finding your rhythm and trusting the process. My approach combines \
             technical precision with mental preparation, helping athletes unlock their \
             potential through confidence and consistency.",
        ),
    },
    DemoUser {
        email: BIRGEN,
        name: "Birgen Nelson",
        role: Role::Coach,
        sport: TRACK,
        bio: Some(
            "Mental Performance Coach and former Student Senate Co-President at Gustavus. \
             I specialize in building resilience, time management, and sprint/hurdle technical \
             analysis. My coaching philosophy centers on developing small habits that create \
             lasting change and competitive excellence.",
        ),
    },
    DemoUser {
        email: ADMIN,
        name: "Admin User",
        role: Role::Admin,
        sport: None,
        bio: None,
    },
    DemoUser {
        email: ALEX,
        name: "Alex Runner",
        role: Role::Athlete,
        sport: TRACK,
        bio: None,
    },
    DemoUser {
        email: JORDAN,
        name: "Jordan Sprinter",
        role: Role::Athlete,
        sport: TRACK,
        bio: None,
    },
];

/// Days before today that demo journal entries are dated
const JOURNAL_DAYS_AGO: [i64; 6] = [12, 10, 7, 5, 3, 1];

struct DemoWorkshop {
    title: &'static str,
    summary: &'static str,
    content: &'static str,
    days_ahead: i64,
    hour: u32,
    duration_min: i64,
    capacity: i64,
    price_cents: i64,
}

const WORKSHOPS: &[DemoWorkshop] = &[
    DemoWorkshop {
        title: "Mental Preparation for Championship Season",
        summary: "Learn proven techniques to peak mentally when it matters most.",
        content: "Join Skyla and Birgen for an intensive workshop on championship mindset, \
                  visualization techniques, and managing competition nerves.",
        days_ahead: 14,
        hour: 18,
        duration_min: 90,
        capacity: 30,
        price_cents: 4500,
    },
    DemoWorkshop {
        title: "Hurdle Rhythm and Technical Development",
        summary: "Master the technical aspects of hurdle rhythm and race execution.",
        content: "Deep dive into hurdle mechanics, rhythm patterns, and race strategy with \
                  NCAA record holder Skyla Wilson.",
        days_ahead: 21,
        hour: 17,
        duration_min: 120,
        capacity: 20,
        price_cents: 6500,
    },
    DemoWorkshop {
        title: "College Recruiting 101",
        summary: "Navigate the recruiting process from an athlete's perspective.",
        content: "Everything you need to know about contacting coaches, official visits, and \
                  finding the right academic and athletic fit.",
        days_ahead: 30,
        hour: 19,
        duration_min: 60,
        capacity: 50,
        price_cents: 2500,
    },
];

const WORKSHOP_LOCATION: &str = "Online via Zoom";

struct DemoArticle {
    section: &'static str,
    title: &'static str,
    excerpt: &'static str,
    content: &'static str,
    author: &'static str,
}

const ARTICLES: &[DemoArticle] = &[
    DemoArticle {
        section: "recruiting",
        title: "How to Write Your First Email to a College Coach",
        excerpt: "Learn the essential elements of a compelling introductory email that gets coaches' attention.",
        content: "# How to Write Your First Email to a College Coach\n\nYour first email sets the tone...",
        author: BIRGEN,
    },
    DemoArticle {
        section: "recruiting",
        title: "Creating a Standout Highlight Reel",
        excerpt: "Tips for showcasing your athletic abilities effectively in video format.",
        content: "# Creating a Standout Highlight Reel\n\nYour highlight reel is often the first...",
        author: SKYLA,
    },
    DemoArticle {
        section: "recruiting",
        title: "Understanding Academic Fit in College Selection",
        excerpt: "Balance athletic opportunities with academic goals for long-term success.",
        content: "# Understanding Academic Fit\n\nWhile athletics may open doors...",
        author: BIRGEN,
    },
    DemoArticle {
        section: "recruiting",
        title: "Official vs Unofficial Visits: What to Know",
        excerpt: "Navigate campus visits strategically to make the best impression.",
        content: "# Official vs Unofficial Visits\n\nCampus visits are crucial...",
        author: SKYLA,
    },
    DemoArticle {
        section: "recruiting",
        title: "Timeline for Each Recruiting Class Year",
        excerpt: "When to start reaching out and key deadlines by graduation year.",
        content: "# Recruiting Timeline by Class Year\n\n## Freshman Year\n\nFocus on development...",
        author: BIRGEN,
    },
    DemoArticle {
        section: "library",
        title: "Box Breathing for Pre-Competition Calm",
        excerpt: "A simple breathing technique to manage nerves and enhance focus.",
        content: "# Box Breathing Technique\n\nUsed by Navy SEALs and elite athletes...",
        author: SKYLA,
    },
    DemoArticle {
        section: "library",
        title: "Building Your Pre-Meet Routine",
        excerpt: "Create consistency and confidence through structured preparation.",
        content: "# Building Your Pre-Meet Routine\n\nConsistency breeds confidence...",
        author: BIRGEN,
    },
    DemoArticle {
        section: "library",
        title: "Reframing Negative Self-Talk",
        excerpt: "Transform limiting beliefs into empowering thoughts.",
        content: "# Reframing Negative Self-Talk\n\nYour internal dialogue shapes performance...",
        author: SKYLA,
    },
    DemoArticle {
        section: "library",
        title: "Visualization for Technical Events",
        excerpt: "Use mental rehearsal to perfect complex movement patterns.",
        content: "# Visualization for Technical Events\n\nFor hurdles, jumps, and throws...",
        author: SKYLA,
    },
    DemoArticle {
        section: "library",
        title: "Confidence Through Preparation",
        excerpt: "Build unshakeable confidence by controlling what you can control.",
        content: "# Confidence Through Preparation\n\nTrue confidence comes from knowing...",
        author: BIRGEN,
    },
];

struct DemoAnalysis {
    athlete: &'static str,
    coach: &'static str,
    event: TrackEvent,
    video_url: &'static str,
    notes: &'static str,
    status: AnalysisStatus,
    comments: &'static [(f64, &'static str)],
}

const ANALYSES: &[DemoAnalysis] = &[
    DemoAnalysis {
        athlete: ALEX,
        coach: SKYLA,
        event: TrackEvent::Hurdles100,
        video_url: "https://thementallap.com/uploads/sample-hurdle-video-1.mp4",
        notes: "Working on trail leg mechanics and maintaining rhythm through hurdles 5-7.",
        status: AnalysisStatus::InReview,
        comments: &[
            (3.5, "Great lead leg attack! Notice how you maintain forward lean through takeoff."),
            (7.2, "Trail leg could come through higher here. Focus on driving the knee to your armpit."),
        ],
    },
    DemoAnalysis {
        athlete: JORDAN,
        coach: BIRGEN,
        event: TrackEvent::Sprint,
        video_url: "https://thementallap.com/uploads/sample-sprint-video-1.mp4",
        notes: "Block start and acceleration phase work.",
        status: AnalysisStatus::Complete,
        comments: &[
            (0.5, "Solid set position. Make sure your shoulders are slightly ahead of your hands."),
            (2.0, "Excellent drive phase! You maintain good angles through the first 20m."),
        ],
    },
];

/// Journal values for the `i`th demo entry: mood 3-5, sleep 7-9h, RPE 4-7.
fn journal_values(i: usize) -> (i64, f64, i64) {
    let mood = 3 + (i % 3) as i64;
    let sleep = 7.0 + (i % 5) as f64 * 0.5;
    let rpe = 4 + (i % 4) as i64;
    (mood, sleep, rpe)
}

fn workshop_start(today: NaiveDate, w: &DemoWorkshop) -> Option<DateTime<Utc>> {
    let day = today + Duration::days(w.days_ahead);
    let naive = day.and_hms_opt(w.hour, 0, 0)?;
    Utc.from_local_datetime(&naive).single()
}

/// Insert the demo dataset; safe to run repeatedly.
pub async fn seed(pool: &PgPool, now: DateTime<Utc>) -> Result<SeedReport, SeedError> {
    let mut report = SeedReport::default();
    let today = now.date_naive();
    let password_hash = hash_password(&Password::new(DEMO_PASSWORD)?)?;

    let users = UserRepo::new(pool);
    let mut by_email: Vec<(&'static str, User, bool)> = Vec::with_capacity(USERS.len());
    for demo in USERS {
        let email = Email::new(demo.email)?;
        let (user, created) = users
            .ensure(NewUser {
                email: &email,
                password_hash: &password_hash,
                name: demo.name,
                role: demo.role,
                sport: demo.sport,
                bio: demo.bio,
            })
            .await?;
        if created {
            report.users += 1;
        }
        by_email.push((demo.email, user, created));
    }
    let find = |email: &str| by_email.iter().find(|(e, _, _)| *e == email);

    let journal = JournalRepo::new(pool);
    for (_, athlete, created) in by_email.iter().filter(|(_, u, _)| u.role() == Role::Athlete) {
        if !created {
            continue;
        }
        for (i, days_ago) in JOURNAL_DAYS_AGO.iter().enumerate() {
            let (mood, sleep, rpe) = journal_values(i);
            let draft = JournalDraft::new(
                Some(today - Duration::days(*days_ago)),
                Some(mood),
                Some(sleep),
                Some(rpe),
                vec!["training".into(), "competition prep".into()],
                Some("Felt good during practice. Working on maintaining form at higher speeds."),
                today,
            )?;
            journal.create(athlete.id, &draft).await?;
            report.journal_entries += 1;
        }
    }

    let workshops = WorkshopRepo::new(pool);
    let existing: HashSet<String> = workshops
        .list_with_counts()
        .await?
        .into_iter()
        .map(|w| w.workshop.slug)
        .collect();
    for demo in WORKSHOPS {
        let draft = WorkshopDraft::new(WorkshopFields {
            title: Some(demo.title),
            summary: Some(demo.summary),
            content: Some(demo.content),
            starts_at: workshop_start(today, demo),
            duration_min: Some(demo.duration_min),
            capacity: Some(demo.capacity),
            location: Some(WORKSHOP_LOCATION),
            price_cents: Some(demo.price_cents),
        })?;
        if existing.contains(draft.base_slug()?.as_str()) {
            continue;
        }
        workshops.create(&draft).await?;
        report.workshops += 1;
    }

    let articles = ArticleRepo::new(pool);
    let existing: HashSet<String> = articles
        .list_all()
        .await?
        .into_iter()
        .map(|a| a.slug)
        .collect();
    for demo in ARTICLES {
        let draft = ArticleDraft::new(
            Some(demo.section),
            Some(demo.title),
            Some(demo.excerpt),
            Some(demo.content),
            true,
        )?;
        if existing.contains(draft.base_slug()?.as_str()) {
            continue;
        }
        let Some((_, author, _)) = find(demo.author) else {
            continue;
        };
        articles.create(author.id, &draft).await?;
        report.articles += 1;
    }

    let analyses = AnalysisRepo::new(pool);
    for demo in ANALYSES {
        let (Some((_, athlete, true)), Some((_, coach, _))) = (find(demo.athlete), find(demo.coach))
        else {
            continue;
        };
        let analysis = analyses
            .create(athlete.id, demo.event, demo.video_url, Some(demo.notes))
            .await?;
        for (at, text) in demo.comments {
            analyses.add_comment(analysis.id, coach.id, *at, text).await?;
        }
        analyses.set_status(analysis.id, demo.status).await?;
        report.analyses += 1;
    }

    tracing::info!(
        users = report.users,
        journal_entries = report.journal_entries,
        workshops = report.workshops,
        articles = report.articles,
        analyses = report.analyses,
        "seed complete"
    );
    Ok(report)
}

/// Set every account's password, then make sure the staff logins exist.
///
/// Returns the number of existing accounts that were updated.
pub async fn reset_passwords(pool: &PgPool, password: &str) -> Result<usize, SeedError> {
    let password_hash = hash_password(&Password::new(password)?)?;
    let users = UserRepo::new(pool);

    let all = users.list_all().await?;
    for user in &all {
        users.set_password_hash(user.id, &password_hash).await?;
        tracing::debug!(email = %user.email, role = %user.role, "password reset");
    }

    for demo in USERS.iter().filter(|u| matches!(u.email, BIRGEN | ADMIN)) {
        let email = Email::new(demo.email)?;
        let (_, created) = users
            .ensure(NewUser {
                email: &email,
                password_hash: &password_hash,
                name: demo.name,
                role: demo.role,
                sport: demo.sport,
                bio: demo.bio,
            })
            .await?;
        if created {
            tracing::info!(email = %email, "missing staff account created");
        }
    }

    tracing::info!(count = all.len(), "passwords reset");
    Ok(all.len())
}

/// Change an account's role by email.
pub async fn set_role(pool: &PgPool, email: &str, role: &str) -> Result<User, SeedError> {
    let email = Email::new(email)?;
    let role = Role::parse(role)?;
    let user = UserRepo::new(pool).set_role(&email, role).await?;
    tracing::info!(user_id = %user.id, %role, "role updated");
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_journal_values_are_valid() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 26).unwrap();
        for i in 0..JOURNAL_DAYS_AGO.len() {
            let (mood, sleep, rpe) = journal_values(i);
            assert!(JournalDraft::new(None, Some(mood), Some(sleep), Some(rpe), vec![], None, today).is_ok());
        }
    }

    #[test]
    fn demo_content_validates() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 26).unwrap();
        for w in WORKSHOPS {
            let starts = workshop_start(today, w).unwrap();
            assert!(starts.date_naive() > today);
            assert!(WorkshopDraft::new(WorkshopFields {
                title: Some(w.title),
                summary: Some(w.summary),
                content: Some(w.content),
                starts_at: Some(starts),
                duration_min: Some(w.duration_min),
                capacity: Some(w.capacity),
                location: Some(WORKSHOP_LOCATION),
                price_cents: Some(w.price_cents),
            })
            .is_ok());
        }
        for a in ARTICLES {
            let draft = ArticleDraft::new(Some(a.section), Some(a.title), Some(a.excerpt), Some(a.content), true)
                .unwrap();
            assert!(USERS.iter().any(|u| u.email == a.author && u.role == Role::Coach));
            assert!(!draft.base_slug().unwrap().as_str().is_empty());
        }
    }

    #[test]
    fn demo_slugs_are_unique() {
        let slugs: HashSet<String> = ARTICLES
            .iter()
            .map(|a| crate::models::Slug::from_title(a.title).unwrap().as_str().to_owned())
            .collect();
        assert_eq!(slugs.len(), ARTICLES.len());
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn seed_is_idempotent() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.unwrap();
        crate::db::migrate(&pool).await.unwrap();

        seed(&pool, Utc::now()).await.unwrap();
        let again = seed(&pool, Utc::now()).await.unwrap();
        assert_eq!(again, SeedReport::default());
    }
}
