mod parse;

pub use parse::{run_parse, OutputFormat, ParseOptions, CSV_COLUMNS};
