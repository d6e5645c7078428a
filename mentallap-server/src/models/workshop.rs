//! Workshop create/update payload validation

use chrono::{DateTime, Utc};

use super::validation::{optional_text, required_text};
use super::{Slug, ValidationError};

const MAX_TITLE_LEN: usize = 200;
const MAX_SUMMARY_LEN: usize = 500;
const MAX_CONTENT_LEN: usize = 20_000;
const MAX_LOCATION_LEN: usize = 200;
const MAX_DURATION_MIN: i64 = 24 * 60;
const MAX_CAPACITY: i64 = 10_000;
const MAX_PRICE_CENTS: i64 = 10_000_000;

/// Raw workshop fields as submitted by the admin form
#[derive(Debug, Clone, Default)]
pub struct WorkshopFields<'a> {
    pub title: Option<&'a str>,
    pub summary: Option<&'a str>,
    pub content: Option<&'a str>,
    pub starts_at: Option<DateTime<Utc>>,
    pub duration_min: Option<i64>,
    pub capacity: Option<i64>,
    pub location: Option<&'a str>,
    pub price_cents: Option<i64>,
}

/// Validated workshop payload
#[derive(Debug, Clone, PartialEq)]
pub struct WorkshopDraft {
    pub title: String,
    pub summary: String,
    pub content: String,
    pub starts_at: DateTime<Utc>,
    pub duration_min: i32,
    pub capacity: i32,
    pub location: String,
    pub price_cents: i64,
}

impl WorkshopDraft {
    /// Title, summary, start time, duration, capacity and location are
    /// required; content defaults to empty and price to free.
    pub fn new(fields: WorkshopFields<'_>) -> Result<Self, ValidationError> {
        let title = required_text("title", fields.title, MAX_TITLE_LEN)?;
        let summary = required_text("summary", fields.summary, MAX_SUMMARY_LEN)?;
        let content = optional_text("content", fields.content, MAX_CONTENT_LEN)?.unwrap_or_default();
        let starts_at = fields
            .starts_at
            .ok_or(ValidationError::Empty { field: "starts_at" })?;
        let duration_min = positive("duration_min", fields.duration_min, MAX_DURATION_MIN)?;
        let capacity = positive("capacity", fields.capacity, MAX_CAPACITY)?;
        let location = required_text("location", fields.location, MAX_LOCATION_LEN)?;

        let price_cents = fields.price_cents.unwrap_or(0);
        if !(0..=MAX_PRICE_CENTS).contains(&price_cents) {
            return Err(ValidationError::OutOfRange {
                field: "price_cents",
                min: 0.0,
                max: MAX_PRICE_CENTS as f64,
            });
        }

        // Fail early on titles that cannot produce a slug
        Slug::from_title(&title)?;

        Ok(Self {
            title,
            summary,
            content,
            starts_at,
            duration_min: duration_min as i32,
            capacity: capacity as i32,
            location,
            price_cents,
        })
    }

    pub fn base_slug(&self) -> Result<Slug, ValidationError> {
        Slug::from_title(&self.title)
    }
}

fn positive(field: &'static str, value: Option<i64>, max: i64) -> Result<i64, ValidationError> {
    let value = value.ok_or(ValidationError::Empty { field })?;
    if !(1..=max).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field,
            min: 1.0,
            max: max as f64,
        });
    }
    Ok(value)
}
