#![warn(clippy::uninlined_format_args)]

pub mod parser;
pub mod repository;

pub use parser::{DEFAULT_GROUP, LedgerFileParser};
pub use repository::InMemoryGroupRepository;
