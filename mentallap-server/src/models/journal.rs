//! Journal entry fields: mood, sleep, RPE, tags

use chrono::NaiveDate;

use super::validation::optional_text;
use super::ValidationError;

const MAX_TAGS: usize = 16;
const MAX_TAG_LEN: usize = 32;
const MAX_NOTES_LEN: usize = 10_000;

/// Mood on a 1-5 scale (rendered as five faces)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mood(i16);

impl Mood {
    pub fn new(v: i64) -> Result<Self, ValidationError> {
        if !(1..=5).contains(&v) {
            return Err(ValidationError::OutOfRange {
                field: "mood",
                min: 1.0,
                max: 5.0,
            });
        }
        Ok(Self(v as i16))
    }

    pub fn get(&self) -> i16 {
        self.0
    }
}

/// Rate of perceived exertion, 1-10
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rpe(i16);

impl Rpe {
    pub fn new(v: i64) -> Result<Self, ValidationError> {
        if !(1..=10).contains(&v) {
            return Err(ValidationError::OutOfRange {
                field: "rpe",
                min: 1.0,
                max: 10.0,
            });
        }
        Ok(Self(v as i16))
    }

    pub fn get(&self) -> i16 {
        self.0
    }
}

/// Hours slept the night before, 0-24
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SleepHours(f64);

impl SleepHours {
    pub fn new(v: f64) -> Result<Self, ValidationError> {
        if !v.is_finite() || !(0.0..=24.0).contains(&v) {
            return Err(ValidationError::OutOfRange {
                field: "sleep_hours",
                min: 0.0,
                max: 24.0,
            });
        }
        Ok(Self(v))
    }

    pub fn get(&self) -> f64 {
        self.0
    }
}

/// Normalized tag list: trimmed, lowercased, deduplicated, order kept
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tags(Vec<String>);

impl Tags {
    /// Build from a list of raw tags.
    pub fn new<I, S>(raw: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tags: Vec<String> = Vec::new();
        for tag in raw {
            let tag = tag.as_ref().trim().to_lowercase();
            if tag.is_empty() || tags.contains(&tag) {
                continue;
            }
            if tag.chars().count() > MAX_TAG_LEN {
                return Err(ValidationError::TooLong {
                    field: "tag",
                    max: MAX_TAG_LEN,
                });
            }
            tags.push(tag);
        }
        if tags.len() > MAX_TAGS {
            return Err(ValidationError::OutOfRange {
                field: "tags",
                min: 0.0,
                max: MAX_TAGS as f64,
            });
        }
        Ok(Self(tags))
    }

    /// Parse the comma separated form field ("training, competition, recovery").
    pub fn parse_csv(s: &str) -> Result<Self, ValidationError> {
        Self::new(s.split(','))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

/// Validated journal entry payload, used for both create and update
#[derive(Debug, Clone)]
pub struct JournalDraft {
    pub date: NaiveDate,
    pub mood: Mood,
    pub sleep_hours: SleepHours,
    pub rpe: Rpe,
    pub tags: Tags,
    pub notes: Option<String>,
}

impl JournalDraft {
    pub fn new(
        date: Option<NaiveDate>,
        mood: Option<i64>,
        sleep_hours: Option<f64>,
        rpe: Option<i64>,
        tags: Vec<String>,
        notes: Option<&str>,
        today: NaiveDate,
    ) -> Result<Self, ValidationError> {
        let date = date.unwrap_or(today);
        if date > today {
            return Err(ValidationError::InvalidFormat {
                field: "date",
                reason: "cannot be in the future",
            });
        }

        Ok(Self {
            date,
            mood: Mood::new(mood.ok_or(ValidationError::Empty { field: "mood" })?)?,
            sleep_hours: SleepHours::new(
                sleep_hours.ok_or(ValidationError::Empty { field: "sleep_hours" })?,
            )?,
            rpe: Rpe::new(rpe.ok_or(ValidationError::Empty { field: "rpe" })?)?,
            tags: Tags::new(tags)?,
            notes: optional_text("notes", notes, MAX_NOTES_LEN)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 26).unwrap()
    }

    #[test]
    fn ranges() {
        assert!(Mood::new(1).is_ok());
        assert!(Mood::new(5).is_ok());
        assert!(Mood::new(0).is_err());
        assert!(Mood::new(6).is_err());
        assert!(Rpe::new(10).is_ok());
        assert!(Rpe::new(11).is_err());
        assert!(SleepHours::new(7.5).is_ok());
        assert!(SleepHours::new(-0.5).is_err());
        assert!(SleepHours::new(f64::NAN).is_err());
    }

    #[test]
    fn tags_are_normalized() {
        let tags = Tags::parse_csv(" Training, competition prep ,, training ,Recovery").unwrap();
        assert_eq!(
            tags.as_slice(),
            &["training", "competition prep", "recovery"]
        );
    }

    #[test]
    fn too_many_tags() {
        let raw: Vec<String> = (0..17).map(|i| format!("t{}", i)).collect();
        assert!(matches!(
            Tags::new(raw).unwrap_err(),
            ValidationError::OutOfRange { field: "tags", .. }
        ));
    }

    #[test]
    fn draft_defaults_date_to_today() {
        let draft = JournalDraft::new(None, Some(4), Some(8.0), Some(6), vec![], None, today()).unwrap();
        assert_eq!(draft.date, today());
        assert_eq!(draft.mood.get(), 4);
        assert!(draft.notes.is_none());
    }

    #[test]
    fn draft_requires_metrics() {
        let err = JournalDraft::new(None, None, Some(8.0), Some(6), vec![], None, today()).unwrap_err();
        assert_eq!(err, ValidationError::Empty { field: "mood" });
    }

    #[test]
    fn draft_rejects_future_date() {
        let tomorrow = today().succ_opt().unwrap();
        let err = JournalDraft::new(Some(tomorrow), Some(3), Some(7.0), Some(5), vec![], None, today())
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { field: "date", .. }));
    }
}
