//! Roster entity store: groups, sub-groups and students on Drive and Sheets
//!
//! A group is a spreadsheet file inside a fixed-name folder, a sub-group is a
//! tab of that spreadsheet and a student is a row of that tab.

pub mod config;
pub mod error;
pub mod locks;
pub mod principal;
pub mod rows;
mod store;

#[cfg(test)]
mod testing;

pub use config::StoreConfig;
pub use error::{StoreError, StoreResult, error_chain};
pub use locks::TabLocks;
pub use principal::{FixedPrincipal, PrincipalError, PrincipalResolver, UserRecord};
pub use store::SheetStore;
