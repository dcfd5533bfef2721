use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{Result, TikharError};
use crate::record::{extract_records, VideoRecord};
use crate::scan::{scan_capture, CaptureLog};

/// Column order for CSV output. Author fields are flattened with an
/// `author` prefix; list fields are space-joined.
pub const CSV_COLUMNS: &[&str] = &[
    "id",
    "desc",
    "tags",
    "time",
    "duration",
    "authorId",
    "authorName",
    "authorSignature",
    "authorIsVerified",
    "url",
    "authorFollowerCount",
    "authorVideoCount",
    "soundName",
    "diggCount",
    "commentCount",
    "playCount",
    "stickerText",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Csv,
}

impl OutputFormat {
    /// Resolve a `--type` argument. Unrecognized values warn and fall
    /// back to JSON rather than aborting.
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            None | Some("json") => OutputFormat::Json,
            Some("csv") => OutputFormat::Csv,
            Some(other) => {
                eprintln!("Warning: unrecognized output type '{other}', defaulting to json");
                OutputFormat::Json
            }
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

/// Options for one parse run.
pub struct ParseOptions {
    pub output: Option<PathBuf>,
    pub format: OutputFormat,
}

/// Scan a capture, extract its video records, and write them in the
/// selected format. Returns the number of records written.
pub fn run_parse(input: &Path, options: &ParseOptions) -> Result<usize> {
    if !input.exists() {
        return Err(TikharError::InvalidArgs(format!(
            "input file not found: {}",
            input.display()
        )));
    }
    if input.extension().and_then(|s| s.to_str()) != Some("har") {
        return Err(TikharError::InvalidArgs(
            "input file must be of type .har".to_string(),
        ));
    }

    let output_path = match &options.output {
        Some(p) => p.clone(),
        None => input.with_extension(options.format.extension()),
    };

    let (log, batches) = scan_capture(input)?;
    let records = extract_records(&batches)?;

    let writer = BufWriter::new(File::create(&output_path)?);
    match options.format {
        OutputFormat::Json => write_json(writer, &log, &records)?,
        OutputFormat::Csv => write_csv(writer, &records)?,
    }

    println!("Successfully parsed {} TikToks.", records.len());
    Ok(records.len())
}

#[derive(Serialize)]
struct Document<'a> {
    log: &'a CaptureLog,
    items: &'a [VideoRecord],
}

fn write_json(mut out: impl Write, log: &CaptureLog, items: &[VideoRecord]) -> Result<()> {
    let doc = Document { log, items };
    serde_json::to_writer_pretty(&mut out, &doc)?;
    out.write_all(b"\n")?;
    Ok(())
}

fn write_csv(out: impl Write, items: &[VideoRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(CSV_COLUMNS)?;
    for item in items {
        writer.write_record(&flatten_record(item))?;
    }
    writer.flush()?;
    Ok(())
}

// Nested author fields become authorId, authorName, ... in column order.
fn flatten_record(item: &VideoRecord) -> Vec<String> {
    vec![
        item.id.clone(),
        item.desc.clone(),
        item.tags.join(" "),
        item.time.clone(),
        item.duration.to_string(),
        item.author.id.clone(),
        item.author.name.clone(),
        item.author.signature.clone(),
        item.author.is_verified.to_string(),
        item.url.clone(),
        item.author.follower_count.to_string(),
        item.author.video_count.to_string(),
        item.sound_name.clone(),
        item.digg_count.to_string(),
        item.comment_count.to_string(),
        item.play_count.to_string(),
        item.sticker_text.join(" "),
    ]
}
