//! Article create/update payload validation

use super::validation::required_text;
use super::{ArticleSection, Slug, ValidationError};

const MAX_TITLE_LEN: usize = 200;
const MAX_EXCERPT_LEN: usize = 500;
const MAX_CONTENT_LEN: usize = 100_000;

/// Validated article payload
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleDraft {
    pub section: ArticleSection,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub publish: bool,
}

impl ArticleDraft {
    pub fn new(
        section: Option<&str>,
        title: Option<&str>,
        excerpt: Option<&str>,
        content: Option<&str>,
        publish: bool,
    ) -> Result<Self, ValidationError> {
        let section = ArticleSection::parse(section.unwrap_or_default())?;
        let title = required_text("title", title, MAX_TITLE_LEN)?;
        let excerpt = required_text("excerpt", excerpt, MAX_EXCERPT_LEN)?;
        let content = required_text("content", content, MAX_CONTENT_LEN)?;
        Slug::from_title(&title)?;

        Ok(Self {
            section,
            title,
            excerpt,
            content,
            publish,
        })
    }

    pub fn base_slug(&self) -> Result<Slug, ValidationError> {
        Slug::from_title(&self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_article() {
        let draft = ArticleDraft::new(
            Some("library"),
            Some("Box Breathing for Pre-Competition Calm"),
            Some("A simple breathing technique."),
            Some("# Box Breathing"),
            true,
        )
        .unwrap();
        assert_eq!(draft.section, ArticleSection::Library);
        assert_eq!(
            draft.base_slug().unwrap().as_str(),
            "box-breathing-for-pre-competition-calm"
        );
    }

    #[test]
    fn section_required() {
        let err = ArticleDraft::new(None, Some("T"), Some("E"), Some("C"), false).unwrap_err();
        assert_eq!(err, ValidationError::Empty { field: "section" });
    }

    #[test]
    fn unknown_section() {
        let err = ArticleDraft::new(Some("news"), Some("T"), Some("E"), Some("C"), false).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidVariant { field: "section", .. }));
    }
}
