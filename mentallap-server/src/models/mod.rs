//! Domain models with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod account;
pub mod article;
pub mod enums;
pub mod journal;
pub mod pagination;
pub mod slug;
pub mod validation;
pub mod workshop;

pub use account::{Email, Password, PersonName};
pub use article::ArticleDraft;
pub use enums::{
    AnalysisStatus, ArticleSection, BookingStatus, ContactKind, Role, SessionType, TrackEvent,
};
pub use journal::{JournalDraft, Mood, Rpe, SleepHours, Tags};
pub use pagination::{Paginated, Pagination, PaginationParams};
pub use slug::Slug;
pub use validation::ValidationError;
pub use workshop::{WorkshopDraft, WorkshopFields};
