pub mod parse;
pub mod types;

pub use parse::{parse_markup_file, parse_table, SECONDARY_COLUMN_INDEX};
pub use types::Table;
