//! Text-backed enumerations stored as TEXT columns with CHECK constraints.

use serde::{Deserialize, Serialize};

use super::ValidationError;

macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $text)] $variant),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            /// Parse from user input (case-insensitive, trimmed).
            pub fn parse(s: &str) -> Result<Self, ValidationError> {
                match s.trim().to_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    "" => Err(ValidationError::Empty { field: $field }),
                    _ => Err(ValidationError::InvalidVariant {
                        field: $field,
                        value: s.to_owned(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }
    };
}

text_enum! {
    /// Account role carried by every user and checked by route guards.
    Role, "role" {
        Admin => "admin",
        Athlete => "athlete",
        Coach => "coach",
    }
}

impl Role {
    /// Coaches and admins review analyses and manage bookings.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Coach)
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Athlete
    }
}

text_enum! {
    /// 1:1 coaching session lifecycle.
    BookingStatus, "status" {
        Requested => "requested",
        Confirmed => "confirmed",
        Completed => "completed",
    }
}

impl BookingStatus {
    /// Bookings only move forward one step at a time.
    pub fn can_advance_to(&self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Requested, BookingStatus::Confirmed)
                | (BookingStatus::Confirmed, BookingStatus::Completed)
        )
    }
}

text_enum! {
    /// Kind of 1:1 session offered by the coaches.
    SessionType, "session type" {
        Mental => "mental",
        Form => "form",
        Recruiting => "recruiting",
    }
}

impl SessionType {
    pub fn title(&self) -> &'static str {
        match self {
            SessionType::Mental => "Mental Performance",
            SessionType::Form => "Track Hurdles Form Review",
            SessionType::Recruiting => "Recruiting Consultation",
        }
    }

    pub fn duration_min(&self) -> u32 {
        match self {
            SessionType::Mental => 45,
            SessionType::Form => 30,
            SessionType::Recruiting => 60,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SessionType::Mental => "Work on confidence, focus, and competition mindset",
            SessionType::Form => "Technical analysis and personalized drills",
            SessionType::Recruiting => "Navigate the college recruiting process",
        }
    }
}

text_enum! {
    /// Form analysis review lifecycle.
    AnalysisStatus, "status" {
        Submitted => "submitted",
        InReview => "in_review",
        Complete => "complete",
    }
}

impl AnalysisStatus {
    /// Submitted and in-review analyses still need coach attention.
    pub fn is_pending(&self) -> bool {
        matches!(self, AnalysisStatus::Submitted | AnalysisStatus::InReview)
    }
}

text_enum! {
    /// Event filmed in a form analysis video.
    TrackEvent, "event" {
        Hurdles60 => "hurdles_60",
        Hurdles100 => "hurdles_100",
        Hurdles110 => "hurdles_110",
        Hurdles400 => "hurdles_400",
        Sprint => "sprint",
        Relay => "relay",
    }
}

impl TrackEvent {
    pub fn label(&self) -> &'static str {
        match self {
            TrackEvent::Hurdles60 => "60m Hurdles",
            TrackEvent::Hurdles100 => "100m Hurdles",
            TrackEvent::Hurdles110 => "110m Hurdles",
            TrackEvent::Hurdles400 => "400m Hurdles",
            TrackEvent::Sprint => "Sprint (60m-400m)",
            TrackEvent::Relay => "Relay",
        }
    }
}

text_enum! {
    /// Site section an article is published under.
    ArticleSection, "section" {
        Library => "library",
        Recruiting => "recruiting",
    }
}

text_enum! {
    /// Contact form inquiry type; selects the notification recipient.
    ContactKind, "type" {
        General => "general",
        Partnership => "partnership",
    }
}

impl Default for ContactKind {
    fn default() -> Self {
        ContactKind::General
    }
}

impl ContactKind {
    pub fn label(&self) -> &'static str {
        match self {
            ContactKind::General => "General Inquiry",
            ContactKind::Partnership => "Partnership Inquiry",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(Role::parse("Admin").unwrap(), Role::Admin);
        assert_eq!(AnalysisStatus::parse(" in_review ").unwrap(), AnalysisStatus::InReview);
        assert_eq!("hurdles_110".parse::<TrackEvent>().unwrap(), TrackEvent::Hurdles110);
    }

    #[test]
    fn rejects_unknown_and_empty() {
        assert!(matches!(
            Role::parse("superuser").unwrap_err(),
            ValidationError::InvalidVariant { field: "role", .. }
        ));
        assert!(matches!(
            SessionType::parse("").unwrap_err(),
            ValidationError::Empty { .. }
        ));
    }

    #[test]
    fn serde_uses_stored_text() {
        let json = serde_json::to_string(&TrackEvent::Hurdles400).unwrap();
        assert_eq!(json, "\"hurdles_400\"");
        let status: AnalysisStatus = serde_json::from_str("\"in_review\"").unwrap();
        assert_eq!(status, AnalysisStatus::InReview);
    }

    #[test]
    fn booking_advances_one_step_forward() {
        use BookingStatus::*;
        assert!(Requested.can_advance_to(Confirmed));
        assert!(Confirmed.can_advance_to(Completed));
        assert!(!Requested.can_advance_to(Completed));
        assert!(!Completed.can_advance_to(Requested));
        assert!(!Confirmed.can_advance_to(Confirmed));
    }

    #[test]
    fn staff_roles() {
        assert!(Role::Admin.is_staff());
        assert!(Role::Coach.is_staff());
        assert!(!Role::Athlete.is_staff());
        assert_eq!(Role::default(), Role::Athlete);
    }

    #[test]
    fn pending_analysis_statuses() {
        assert!(AnalysisStatus::Submitted.is_pending());
        assert!(AnalysisStatus::InReview.is_pending());
        assert!(!AnalysisStatus::Complete.is_pending());
    }
}
