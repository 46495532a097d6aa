//! Credential adapter and typed gateway over Google Drive and Sheets.
//!
//! - [`credentials`]: stored credential to per-call request credentials
//! - [`TabularGateway`]: object-safe trait the roster store talks to
//! - [`Request`]: typed `batchUpdate` requests
//! - [`google`]: the reqwest implementation, OAuth and discovery
//!
//! ```text
//! StoredCredential ──to_request_credentials──▶ RequestCredentials
//!                                                     │
//!                        ┌────────────────────────────┘
//!                        ▼
//!               dyn TabularGateway ──▶ GoogleGateway ──▶ Drive v3 / Sheets v4
//! ```

pub mod a1;
pub mod credentials;
pub mod error;
pub mod gateway;
pub mod google;
pub mod requests;

pub use credentials::{RequestCredentials, StoredCredential, to_request_credentials};
pub use error::{GatewayError, GatewayErrorCode, GatewayResult};
pub use gateway::{
    BatchUpdateResponse, BoxFuture, DriveFile, FOLDER_MIME_TYPE, FileQuery, Permission,
    PermissionRole, SPREADSHEET_MIME_TYPE, Sheet, SheetProperties, Spreadsheet,
    SpreadsheetProperties, TabularGateway, ValueRange,
};
pub use requests::Request;
