//! Repository implementations for database access
//!
//! Each repository follows these patterns:
//! - Uses JOINs or grouped subqueries for list operations (no N+1)
//! - Handles conflicts via ON CONFLICT or conditional writes (no check-then-insert)
//! - Uses transactions for multi-step operations

pub mod analyses;
pub mod articles;
pub mod bookings;
pub mod contact;
pub mod journal;
pub mod registrations;
pub mod sessions;
pub mod stats;
pub mod users;
pub mod workshops;

pub use super::error::DbError;

pub use analyses::{Analysis, AnalysisRepo, AnalysisWithComments, Comment};
pub use articles::{Article, ArticleRepo};
pub use bookings::{BookingDetail, BookingRepo, NewBooking};
pub use contact::{ContactMessage, ContactRepo, NewContactMessage};
pub use journal::{JournalEntry, JournalRepo, SUMMARY_WINDOW};
pub use registrations::{RegistrationDetail, RegistrationRepo};
pub use sessions::SessionRepo;
pub use stats::{AnalyticsCounts, AthleteActivity, DashboardCounts, StatsRepo, WorkshopRevenue};
pub use users::{NewUser, User, UserCredentials, UserRepo};
pub use workshops::{Registrant, Workshop, WorkshopRepo, WorkshopWithCount, WorkshopWithRegistrants};
