use std::path::{Path, PathBuf};
use tantivy::{Index, IndexWriter, TantivyError, doc};
use thiserror::Error;
use tracing::{debug, info};

pub mod schema;
pub mod store;

use self::schema::PublicationSchema;
use self::store::StoreError;
use crate::config::IndexConfig;
use crate::record::PublicationRecord;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to encode authors of \"{title}\": {source}")]
    Authors {
        title: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("tantivy error: {0}")]
    Tantivy(#[from] TantivyError),
}

/// A committed and published index generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub number: u64,
    pub path: PathBuf,
    pub documents: usize,
}

/// Rebuilds the publication index from scratch on every run.
#[derive(Debug, Clone)]
pub struct Indexer {
    store: PathBuf,
    writer_memory: usize,
}

impl Indexer {
    pub fn new(config: &IndexConfig) -> Self {
        Self {
            store: config.dir.clone(),
            writer_memory: config.writer_memory_bytes,
        }
    }

    pub fn store(&self) -> &Path {
        &self.store
    }

    /// Writes `records` into a fresh generation, commits it once, publishes
    /// it and removes the generations it replaced.
    pub fn build_index(&self, records: &[PublicationRecord]) -> Result<Generation, IndexError> {
        let (number, path) = store::prepare_generation(&self.store)?;
        info!(
            "Indexing {} records into generation {} at '{}'",
            records.len(),
            number,
            path.display()
        );

        let (schema, fields) = PublicationSchema::build();
        let index = Index::create_in_dir(&path, schema)?;

        // One thread writes one segment, which keeps documents in input order.
        let mut index_writer: IndexWriter = index.writer_with_num_threads(1, self.writer_memory)?;

        for record in records {
            let authors = serde_json::to_string(&record.authors).map_err(|source| IndexError::Authors {
                title: record.title.clone(),
                source,
            })?;

            index_writer.add_document(doc!(
                fields.title => record.title.clone(),
                fields.link => record.link.clone(),
                fields.date => record.date.clone(),
                fields.authors => authors
            ))?;
        }

        index_writer.commit()?;
        index_writer.wait_merging_threads()?;
        debug!("Generation {} committed", number);

        store::publish(&self.store, number)?;
        let removed = store::prune(&self.store, number)?;
        info!(
            "Published generation {} ({} documents, {} stale generations removed)",
            number,
            records.len(),
            removed
        );

        Ok(Generation {
            number,
            path,
            documents: records.len(),
        })
    }
}

/// Builds a fresh index for `records` in `store` with the default writer budget.
pub fn build_index(records: &[PublicationRecord], store: impl Into<PathBuf>) -> Result<Generation, IndexError> {
    let config = IndexConfig {
        dir: store.into(),
        ..IndexConfig::default()
    };
    Indexer::new(&config).build_index(records)
}
