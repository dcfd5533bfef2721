//! Convenience prelude for embedding tikhar.

pub use crate::commands::{run_parse, OutputFormat, ParseOptions};
pub use crate::error::{Result, TikharError};
pub use crate::record::{extract_records, VideoRecord};
pub use crate::scan::{scan_capture, CaptureLog, PayloadScanner};
