//! Tikhar library crate.
//!
//! Extracts structured TikTok video metadata from HAR captures produced
//! by browser developer tools and writes it as JSON or CSV. The pipeline
//! is one linear pass: [`crate::scan`] pulls candidate JSON payloads out
//! of the capture, [`crate::record`] projects them into flat video
//! records, and [`crate::commands`] ties argument handling and output
//! serialization together.

pub mod commands;
pub mod error;
pub mod prelude;
pub mod record;
pub mod scan;
