use serde::{Deserialize, Serialize};

/// Placeholder stored when a record's heading carries no usable anchor.
pub const NO_LINK: &str = "No link available";

/// Placeholder stored when a record has no date element.
pub const UNKNOWN_DATE: &str = "Unknown";

/// One author as listed on a publication, with a link to their profile page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRef {
    pub name: String,
    pub profile_link: String,
}

/// A single publication scraped from the listing page.
///
/// `link` is either absolute or [`NO_LINK`]; `date` is free-form text or
/// [`UNKNOWN_DATE`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationRecord {
    pub title: String,
    pub link: String,
    pub authors: Vec<AuthorRef>,
    pub date: String,
}

/// A search hit read back from the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub title: String,
    pub link: String,
    pub date: String,
    pub authors: Vec<AuthorRef>,
    pub score: f32,
}

impl ResultRecord {
    /// Drops the relevance score, leaving the fields that were indexed.
    pub fn into_publication(self) -> PublicationRecord {
        PublicationRecord {
            title: self.title,
            link: self.link,
            authors: self.authors,
            date: self.date,
        }
    }
}
