//! Line-oriented scanner over browser HAR captures.
//!
//! This is deliberately not a HAR parser. TikTok feed responses arrive
//! inside `content.text` fields of a capture whose serialization layout is
//! fixed by the exporting browser, so a positional line scan is enough to
//! pull out candidate payloads without decoding the (large) surrounding
//! JSON document. The positional assumptions live entirely behind
//! [`PayloadScanner::next_candidate_payload`]; record extraction never
//! sees them.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use chrono::Local;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

/// Response status code TikTok uses for feed-data payloads. Decoded
/// objects with any other code (ads, unrelated API calls) are discarded.
const FEED_STATUS_CODE: i64 = 203;

/// Timestamp format used for both capture metadata and record times.
pub(crate) const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Browser that produced the capture, as recorded in the HAR header.
#[derive(Debug, Default, Serialize)]
pub struct BrowserInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Top-level metadata for one run: when the parse happened, which browser
/// made the capture, and when the capture session started.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureLog {
    pub parse_date_time: String,
    pub browser: BrowserInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scrape_date_time: Option<String>,
}

impl CaptureLog {
    fn new() -> Self {
        Self {
            parse_date_time: Local::now().format(TIME_FORMAT).to_string(),
            browser: BrowserInfo::default(),
            scrape_date_time: None,
        }
    }
}

/// Scans capture lines for embedded JSON payload candidates, collecting
/// log metadata along the way.
pub struct PayloadScanner<R> {
    lines: Lines<R>,
    log: CaptureLog,
}

impl<R: BufRead> PayloadScanner<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            log: CaptureLog::new(),
        }
    }

    /// Advance to the next candidate payload string, already unquoted and
    /// unescaped but not yet decoded. Returns `None` at end of input.
    pub fn next_candidate_payload(&mut self) -> Result<Option<String>> {
        while let Some(line) = self.next_line()? {
            let trimmed = line.trim_start();
            if trimmed.starts_with("\"browser\"") {
                self.read_browser()?;
            } else if trimmed.starts_with("\"startedDateTime\"")
                && self.log.scrape_date_time.is_none()
            {
                if let Some(value) = field_value(&line) {
                    self.log.scrape_date_time = Some(normalize_timestamp(value));
                }
            } else if trimmed.starts_with("\"content\"") {
                if let Some(raw) = self.read_content_payload()? {
                    return Ok(Some(raw));
                }
            }
        }
        Ok(None)
    }

    /// Consume the scanner, yielding the metadata gathered so far.
    pub fn into_log(self) -> CaptureLog {
        self.log
    }

    fn next_line(&mut self) -> Result<Option<String>> {
        match self.lines.next() {
            Some(line) => Ok(Some(line?)),
            None => Ok(None),
        }
    }

    // A `"browser": {` line is followed by its name and version fields,
    // one per line, in that order.
    fn read_browser(&mut self) -> Result<()> {
        if let Some(line) = self.next_line()? {
            self.log.browser.name = field_value(&line).map(|v| unquote(v).to_string());
        }
        if let Some(line) = self.next_line()? {
            self.log.browser.version = field_value(&line).map(|v| unquote(v).to_string());
        }
        Ok(())
    }

    // A `"content": {` block lays out mimeType, size, text on successive
    // lines. Only JSON-typed bodies are candidates; anything else makes
    // the scan fall through and keep looking.
    fn read_content_payload(&mut self) -> Result<Option<String>> {
        let Some(mime_line) = self.next_line()? else {
            return Ok(None);
        };
        let is_json = field_value(&mime_line)
            .map(|v| v.starts_with("\"application/json"))
            .unwrap_or(false);
        if !is_json {
            return Ok(None);
        }
        // Skip the size field between mimeType and text.
        if self.next_line()?.is_none() {
            return Ok(None);
        }
        let Some(text_line) = self.next_line()? else {
            return Ok(None);
        };
        let Some(value) = field_value(&text_line) else {
            return Ok(None);
        };
        Ok(Some(unescape(unquote(value))))
    }
}

/// Everything after the first colon, trimmed. Payload bodies contain
/// colons of their own, so only the first one separates key from value.
fn field_value(line: &str) -> Option<&str> {
    line.splitn(2, ':').nth(1).map(str::trim)
}

/// Strip a trailing comma and wrapping quotes from a serialized value.
fn unquote(value: &str) -> &str {
    let value = value.strip_suffix(',').unwrap_or(value);
    let value = value.strip_prefix('"').unwrap_or(value);
    value.strip_suffix('"').unwrap_or(value)
}

/// Reverse the string-escaping applied to an embedded JSON body.
fn unescape(raw: &str) -> String {
    raw.replace("\\\"", "\"").replace("\\\\", "\\")
}

/// Unquote a `startedDateTime` value and drop fractional seconds.
fn normalize_timestamp(value: &str) -> String {
    let value = unquote(value);
    match value.split_once('.') {
        Some((head, _)) => head.to_string(),
        None => value.to_string(),
    }
}

/// Decode one candidate payload, keeping it only if it carries the feed
/// status sentinel. Malformed or partial fragments are expected in
/// captures and yield `None` rather than an error.
pub fn decode_feed_batch(raw: &str) -> Option<Value> {
    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(_) => return None, // skip and continue
    };
    match value.get("status_code").and_then(Value::as_i64) {
        Some(FEED_STATUS_CODE) => Some(value),
        _ => None,
    }
}

/// Scan a capture file end to end, returning its log metadata and every
/// decoded feed batch in file order.
pub fn scan_capture(path: &Path) -> Result<(CaptureLog, Vec<Value>)> {
    let file = File::open(path)?;
    let mut scanner = PayloadScanner::new(BufReader::new(file));
    let mut batches = Vec::new();
    while let Some(raw) = scanner.next_candidate_payload()? {
        if let Some(batch) = decode_feed_batch(&raw) {
            batches.push(batch);
        }
    }
    Ok((scanner.into_log(), batches))
}
