//! Core types: roster model, naming conventions, tracing

pub mod model;
pub mod naming;
pub mod tracing;

pub use model::{
    Gender, GroupInfo, GroupSummary, MemberFields, ParseGenderError, Student, Subgroup,
};
pub use naming::{HEADER_LABELS, Naming};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
