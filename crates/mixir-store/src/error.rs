//! Store error type and classification of gateway failures.

use mixir_sheets::GatewayError;
use thiserror::Error;

/// Error returned by every [`SheetStore`](crate::SheetStore) operation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A file or tab could not be resolved, or the remote API rejected the
    /// request as invalid.
    #[error("spreadsheet or tab could not be resolved")]
    InvalidSpreadsheetId {
        #[source]
        source: Option<GatewayError>,
    },

    #[error("sub-group '{name}' not found")]
    SheetNotFound { name: String },

    #[error("sub-group '{name}' already exists")]
    SheetNameExists { name: String },

    #[error("student '{student_id}' not found")]
    StudentNotFound { student_id: String },

    #[error("cannot share with '{email}'")]
    InvalidEmail {
        email: String,
        #[source]
        source: GatewayError,
    },

    /// Network, authentication, rate limit, 5xx or undecodable response.
    #[error("upstream call failed ({})", .0.code())]
    UpstreamTransportFailure(#[source] GatewayError),

    #[error("root folder '{name}' not found")]
    FolderNotFound { name: String },

    /// `row` is the absolute row index in the tab, header included.
    #[error("row {row} is corrupt: {reason}")]
    CorruptRow { row: usize, reason: String },

    /// The tab exists but has no header row.
    #[error("sub-group '{name}' was added as sheet {sheet_id} but its header row was not written")]
    IncompleteSubgroup {
        name: String,
        sheet_id: i64,
        #[source]
        source: GatewayError,
    },

    /// Another writer shifted the rows between lookup and write.
    #[error("student '{student_id}' is no longer at row {row}")]
    RowMoved { student_id: String, row: usize },
}

impl StoreError {
    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidSpreadsheetId { .. } => "invalid_spreadsheet_id",
            Self::SheetNotFound { .. } => "sheet_not_found",
            Self::SheetNameExists { .. } => "sheet_name_exists",
            Self::StudentNotFound { .. } => "student_not_found",
            Self::InvalidEmail { .. } => "invalid_email",
            Self::UpstreamTransportFailure(_) => "upstream_transport_failure",
            Self::FolderNotFound { .. } => "folder_not_found",
            Self::CorruptRow { .. } => "corrupt_row",
            Self::IncompleteSubgroup { .. } => "incomplete_subgroup",
            Self::RowMoved { .. } => "row_moved",
        }
    }

    pub(crate) fn invalid_id(source: GatewayError) -> Self {
        Self::InvalidSpreadsheetId {
            source: Some(source),
        }
    }
}

/// Client-class failures (400/404) mean the identifiers were wrong; anything
/// else is the transport's fault.
impl From<GatewayError> for StoreError {
    fn from(err: GatewayError) -> Self {
        if err.code().is_client_error() {
            Self::invalid_id(err)
        } else {
            Self::UpstreamTransportFailure(err)
        }
    }
}

/// A specialized Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Renders an error with its whole source chain, `outer: inner: ...`.
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}
