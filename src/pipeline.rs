//! Loading one or more sources into a [`Dataset`].

use tracing::info;

use crate::aggregate::Aggregator;
use crate::error::IngestError;
use crate::fetch::{HttpClient, read_source};
use crate::ingest::{ParsedSheet, SpreadsheetIngestor};
use crate::model::Dataset;
use crate::parser::parse_grid;

/// Reads and ingests a single source.
#[tracing::instrument(skip(client, ingestor))]
pub async fn load_sheet<C: HttpClient + ?Sized>(
    client: &C,
    ingestor: &SpreadsheetIngestor,
    source: &str,
) -> Result<ParsedSheet, IngestError> {
    let bytes = read_source(client, source).await?;
    let grid = parse_grid(source, &bytes)?;
    ingestor.ingest(&grid)
}

/// Loads `sources` into one dataset.
///
/// One source gives a plain class dataset. Several are aggregated strictly
/// in order: a source is only read once the previous one has been parsed and
/// validated, and any failure discards the whole batch.
#[tracing::instrument(skip(client, ingestor), fields(count = sources.len()))]
pub async fn load_dataset<C: HttpClient + ?Sized>(
    client: &C,
    ingestor: &SpreadsheetIngestor,
    sources: &[String],
) -> Result<Dataset, IngestError> {
    match sources {
        [] => Err(IngestError::EmptyInput),
        [single] => Ok(load_sheet(client, ingestor, single).await?.into_dataset()),
        _ => {
            let mut aggregator = Aggregator::new(ingestor);
            for source in sources {
                let bytes = read_source(client, source).await?;
                let grid = parse_grid(source, &bytes)?;
                aggregator = aggregator.add(display_name(source), &grid)?;
            }
            info!(files = aggregator.files(), "All sources merged");
            aggregator.finish().ok_or(IngestError::EmptyInput)
        }
    }
}

/// The file name part of a path or URL, for error messages.
pub fn display_name(source: &str) -> &str {
    source
        .trim_end_matches('/')
        .rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or(source)
}
