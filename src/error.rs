use thiserror::Error;

/// Failures that abort an ingestion. Nothing partial is ever returned.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("the spreadsheet is empty")]
    EmptyInput,

    #[error("no student rows found after the header row (row {})", .header_row + 1)]
    InsufficientData { header_row: usize },

    #[error("unsupported layout: the header row has only {cells} cell(s), at least 3 expected")]
    UnsupportedHeader { cells: usize },

    #[error(
        "file '{file}' does not match the first file: {field} is '{found}' but expected '{expected}'"
    )]
    MetadataMismatch {
        file: String,
        field: &'static str,
        expected: String,
        found: String,
    },

    #[error("could not read '{source_name}': {io}")]
    ReadFailure {
        source_name: String,
        #[source]
        io: std::io::Error,
    },

    #[error("could not decode '{source_name}' as a spreadsheet: {reason}")]
    UnreadableSheet { source_name: String, reason: String },
}
