//! URL slugs for workshops and articles
//!
//! Slug format: lowercase alphanumeric words joined by single hyphens

use once_cell::sync::Lazy;
use regex::Regex;

use super::ValidationError;

/// Maximum length for slugs (before any uniqueness suffix)
const MAX_SLUG_LEN: usize = 80;

/// Matches DB constraint: ^[a-z0-9]+(-[a-z0-9]+)*$
static SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("invalid slug regex"));

static STRIP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9\s-]").expect("invalid strip regex"));

static SPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("invalid space regex"));

static DASHES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").expect("invalid dash regex"));

/// Validated slug
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Slug(String);

impl Slug {
    /// Validate an existing slug.
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        if s.is_empty() {
            return Err(ValidationError::Empty { field: "slug" });
        }
        if s.len() > MAX_SLUG_LEN + 8 {
            return Err(ValidationError::TooLong {
                field: "slug",
                max: MAX_SLUG_LEN + 8,
            });
        }
        if !SLUG_RE.is_match(s) {
            return Err(ValidationError::InvalidFormat {
                field: "slug",
                reason: "must be lowercase alphanumeric words separated by single hyphens",
            });
        }
        Ok(Self(s.to_owned()))
    }

    /// Derive a slug from a human title.
    ///
    /// # Example
    /// ```
    /// use mentallap_server::models::Slug;
    ///
    /// let slug = Slug::from_title("Hurdle Rhythm & Technical Development!").unwrap();
    /// assert_eq!(slug.as_str(), "hurdle-rhythm-technical-development");
    /// ```
    pub fn from_title(title: &str) -> Result<Self, ValidationError> {
        let lowered = title.to_lowercase();
        let stripped = STRIP_RE.replace_all(&lowered, "");
        let hyphenated = SPACE_RE.replace_all(stripped.trim(), "-");
        let collapsed = DASHES_RE.replace_all(&hyphenated, "-");

        let mut slug: String = collapsed.trim_matches('-').chars().take(MAX_SLUG_LEN).collect();
        while slug.ends_with('-') {
            slug.pop();
        }

        if slug.is_empty() {
            return Err(ValidationError::InvalidFormat {
                field: "title",
                reason: "must contain at least one letter or digit",
            });
        }

        Ok(Self(slug))
    }

    /// Append a numeric suffix: `base-1`, `base-2`, ...
    pub fn with_suffix(&self, n: u32) -> Self {
        Self(format!("{}-{}", self.0, n))
    }

    /// First of `base`, `base-1`, `base-2`, ... not present in `taken`.
    pub fn first_free(&self, taken: &[String]) -> Self {
        if !taken.iter().any(|t| t == &self.0) {
            return self.clone();
        }
        let mut n = 1;
        loop {
            let candidate = self.with_suffix(n);
            if !taken.iter().any(|t| t == candidate.as_str()) {
                return candidate;
            }
            n += 1;
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Slug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
