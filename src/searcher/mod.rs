use std::path::{Path, PathBuf};
use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, Query, QueryParser, QueryParserError};
use tantivy::schema::*;
use tantivy::{DocAddress, Index, IndexReader, ReloadPolicy, Score, TantivyDocument, TantivyError};
use thiserror::Error;
use tracing::{debug, error};

use crate::config::{IndexConfig, SearchConfig};
use crate::indexer::schema::PublicationSchema;
use crate::indexer::store::{self, StoreError};
use crate::record::{AuthorRef, ResultRecord};

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("no index has been built in '{0}'")]
    IndexMissing(PathBuf),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("invalid query for field '{field}': {source}")]
    QueryParsing {
        field: &'static str,
        #[source]
        source: QueryParserError,
    },

    #[error("stored field '{0}' missing from document")]
    FieldMissing(&'static str),

    #[error("stored authors are not valid JSON: {0}")]
    AuthorsDecode(#[from] serde_json::Error),

    #[error("tantivy error: {0}")]
    Tantivy(#[from] TantivyError),
}

/// What a search produced.
///
/// Keeps "nothing matched" apart from "the index could not be searched".
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Hits(Vec<ResultRecord>),
    NoMatches,
    EngineUnavailable(String),
}

impl SearchOutcome {
    pub fn records(&self) -> &[ResultRecord] {
        match self {
            SearchOutcome::Hits(records) => records,
            _ => &[],
        }
    }

    /// Collapses both empty variants into an empty list.
    pub fn into_records(self) -> Vec<ResultRecord> {
        match self {
            SearchOutcome::Hits(records) => records,
            _ => Vec::new(),
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self, SearchOutcome::EngineUnavailable(_))
    }
}

/// Answers queries against whichever index generation is current on disk.
///
/// Holds no index handle; every call opens the store afresh.
#[derive(Debug, Clone)]
pub struct Searcher {
    store: PathBuf,
    limit: usize,
}

impl Searcher {
    pub fn new(index: &IndexConfig, search: &SearchConfig) -> Self {
        Self::open(&index.dir, search.limit)
    }

    pub fn open(store: impl AsRef<Path>, limit: usize) -> Self {
        Self {
            store: store.as_ref().to_path_buf(),
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Runs `query_text` and never fails; errors are logged and reported as
    /// [`SearchOutcome::EngineUnavailable`].
    pub fn search(&self, query_text: &str) -> SearchOutcome {
        match self.try_search(query_text) {
            Ok(records) if records.is_empty() => SearchOutcome::NoMatches,
            Ok(records) => SearchOutcome::Hits(records),
            Err(e) => {
                error!(query = %query_text, error = %e, "Search error");
                SearchOutcome::EngineUnavailable(e.to_string())
            }
        }
    }

    /// A blank query lists documents in index order. Anything else is parsed
    /// separately against `title` and `authors`, and a document matching
    /// either parse is a hit.
    pub fn try_search(&self, query_text: &str) -> Result<Vec<ResultRecord>, SearchError> {
        let generation = store::current_generation(&self.store)?
            .ok_or_else(|| SearchError::IndexMissing(self.store.clone()))?;
        let index = Index::open_in_dir(store::generation_dir(&self.store, generation))?;
        let fields = PublicationSchema::resolve(&index.schema())?;

        let reader: IndexReader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;
        let searcher = reader.searcher();

        let hits = if query_text.trim().is_empty() {
            first_documents(&searcher, self.limit)
        } else {
            let query = field_or_query(&index, &fields, query_text)?;
            searcher.search(&query, &TopDocs::with_limit(self.limit))?
        };
        debug!(
            "Query {:?} matched {} documents in generation {}",
            query_text,
            hits.len(),
            generation
        );

        let mut records = Vec::with_capacity(hits.len());
        for (score, doc_address) in hits {
            let retrieved_doc: TantivyDocument = searcher.doc(doc_address)?;
            records.push(to_result_record(&retrieved_doc, &fields, score)?);
        }
        Ok(records)
    }
}

fn field_or_query(
    index: &Index,
    fields: &PublicationSchema,
    query_text: &str,
) -> Result<BooleanQuery, SearchError> {
    let parse = |field: Field, name: &'static str| -> Result<Box<dyn Query>, SearchError> {
        let mut parser = QueryParser::for_index(index, vec![field]);
        parser.set_conjunction_by_default();
        parser
            .parse_query(query_text)
            .map_err(|source| SearchError::QueryParsing { field: name, source })
    };

    let title_query = parse(fields.title, "title")?;
    let authors_query = parse(fields.authors, "authors")?;
    Ok(BooleanQuery::union(vec![title_query, authors_query]))
}

/// Up to `limit` live documents in index order, all scored equally.
fn first_documents(searcher: &tantivy::Searcher, limit: usize) -> Vec<(Score, DocAddress)> {
    let mut hits = Vec::with_capacity(limit);
    for (segment_ord, segment) in searcher.segment_readers().iter().enumerate() {
        for doc_id in 0..segment.max_doc() {
            if hits.len() >= limit {
                return hits;
            }
            if segment.is_deleted(doc_id) {
                continue;
            }
            hits.push((1.0, DocAddress::new(segment_ord as u32, doc_id)));
        }
    }
    hits
}

fn to_result_record(
    doc: &TantivyDocument,
    fields: &PublicationSchema,
    score: Score,
) -> Result<ResultRecord, SearchError> {
    let get_text = |field: Field, name: &'static str| {
        doc.get_first(field)
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or(SearchError::FieldMissing(name))
    };

    let authors_json = get_text(fields.authors, "authors")?;
    let authors: Vec<AuthorRef> = serde_json::from_str(&authors_json)?;

    Ok(ResultRecord {
        title: get_text(fields.title, "title")?,
        link: get_text(fields.link, "link")?,
        date: get_text(fields.date, "date")?,
        authors,
        score,
    })
}
