#![warn(clippy::uninlined_format_args)]

pub mod debt_presenter;
pub mod error_presenter;
pub mod text_table;

pub use debt_presenter::{DebtPresenter, DebtView};
pub use error_presenter::{format_parse_error, format_query_error};
