//! File input and output.
//!
//! Input format is chosen by extension (`.csv` or `.json`, case-insensitive);
//! output format by an explicit [`OutputFormat`](crate::types::OutputFormat).

mod reader;
mod writer;

pub use reader::read_table;
pub use writer::{to_json_rows, write_table};
