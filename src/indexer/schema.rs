use tantivy::TantivyError;
use tantivy::schema::*;

/// Defines the Tantivy schema for the publication index.
///
/// Four fields, all stored so a hit can be rendered without going back to
/// the crawl.
pub struct PublicationSchema {
    pub title: Field,
    pub link: Field,
    pub date: Field,
    pub authors: Field,
}

impl PublicationSchema {
    pub fn build() -> (Schema, Self) {
        let mut schema_builder = Schema::builder();

        // Title: tokenized for full-text search and stored for display.
        let title = schema_builder.add_text_field("title", TEXT | STORED);

        // Link: a single un-tokenized identifier.
        let link = schema_builder.add_text_field("link", STRING | STORED);

        // Date: free-form text as scraped, e.g. "1 Mar 2023".
        let date = schema_builder.add_text_field("date", TEXT | STORED);

        // Authors: the JSON-encoded author list as one string. Tokenizing it
        // makes names searchable; the stored copy is decoded at query time.
        let authors = schema_builder.add_text_field("authors", TEXT | STORED);

        let schema = schema_builder.build();
        let fields = Self {
            title,
            link,
            date,
            authors,
        };

        (schema, fields)
    }

    /// Looks the fields up by name in a schema read back from disk.
    pub fn resolve(schema: &Schema) -> Result<Self, TantivyError> {
        Ok(Self {
            title: schema.get_field("title")?,
            link: schema.get_field("link")?,
            date: schema.get_field("date")?,
            authors: schema.get_field("authors")?,
        })
    }
}
