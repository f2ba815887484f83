pub mod browser;
pub mod clean;
pub mod config;
pub mod error;
pub mod extract;
pub mod navigate;
pub mod pipeline;
pub mod retry;
pub mod table;

pub use config::Config;
pub use error::{ParseError, PipelineError};
pub use table::Table;
