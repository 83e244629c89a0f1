//! Crawls a publication listing, indexes it with tantivy and searches it.
//!
//! The pipeline runs in one direction: [`crawler`] renders the listing page
//! and extracts [`record::PublicationRecord`]s, [`indexer`] rebuilds the
//! on-disk index from them, and [`searcher`] answers queries later against
//! whatever generation is current.

pub mod config;
pub mod crawler;
pub mod indexer;
pub mod pipeline;
pub mod record;
pub mod searcher;

pub use config::Config;
pub use crawler::datascraper::Extractor;
pub use crawler::{FetchMode, Fetcher, crawl};
pub use indexer::{Generation, Indexer, build_index};
pub use record::{AuthorRef, PublicationRecord, ResultRecord};
pub use searcher::{SearchOutcome, Searcher};
