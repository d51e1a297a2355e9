use crate::Report;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use futures::{Stream, StreamExt};
use std::pin::pin;
use tomes_catalog::{Database, Registry, Store, Thresholds};
use tomes_extract::error::ErrorKind as ValidationErrorKind;
use tomes_extract::{DEFAULT_CATEGORY, RawRecord, validate};
use tracing::instrument;

/// Validates raw records and ingests them into a catalog.
///
/// A run never aborts because of a single record: invalid records are
/// counted as rejected and titles already in the catalog as duplicates.
/// Only a catalog failure ends a run early, with an error.
///
/// Both run methods take `&mut self`, so a pipeline value runs one batch at
/// a time. Share it behind a mutex if several tasks need to feed the same
/// catalog.
#[derive(Debug, Clone)]
pub struct Pipeline {
    registry: Registry,
    store: Store,
    default_category: String,
    thresholds: Thresholds,
}

impl Pipeline {
    pub fn new(db: &Database) -> Self {
        Self {
            registry: db.registry(),
            store: db.store(),
            default_category: DEFAULT_CATEGORY.to_string(),
            thresholds: Thresholds::default(),
        }
    }

    /// Category given to records without one.
    pub fn with_default_category(mut self, category: impl Into<String>) -> Self {
        self.default_category = category.into();
        self
    }

    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Ingest a batch of records, in order.
    pub async fn run<I>(&mut self, records: I) -> Result<Report>
    where
        I: IntoIterator<Item = RawRecord>,
    {
        self.run_stream(futures::stream::iter(records)).await
    }

    /// Ingest every record the stream yields, in order.
    ///
    /// Once the stream is exhausted the categories are compacted, exactly
    /// once, and the indicators are computed over the whole catalog.
    #[instrument(skip_all)]
    pub async fn run_stream<S>(&mut self, records: S) -> Result<Report>
    where
        S: Stream<Item = RawRecord>,
    {
        let mut records = pin!(records);
        let mut report = Report::default();
        let mut index: u64 = 0;
        while let Some(raw) = records.next().await {
            index += 1;
            let book = match validate(&raw, &self.default_category) {
                Ok(book) => book,
                Err(err) => {
                    let kind: &ValidationErrorKind = &err;
                    tracing::warn!(record = index, field = kind.field().unwrap_or("-"), error = %kind, "rejected record");
                    report.rejected += 1;
                    continue;
                },
            };
            if self.store.put(&book).await.or_raise(|| ErrorKind::Catalog)? {
                report.inserted += 1;
            } else {
                tracing::debug!(record = index, title = %book.title, "duplicate title");
                report.duplicates += 1;
            }
        }

        self.registry.compact().await.or_raise(|| ErrorKind::Catalog)?;
        report.indicators = self.store.indicators(&self.thresholds).await.or_raise(|| ErrorKind::Catalog)?;
        tracing::info!(
            inserted = report.inserted,
            duplicates = report.duplicates,
            rejected = report.rejected,
            "ingestion complete"
        );
        Ok(report)
    }
}
