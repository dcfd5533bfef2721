use std::path::PathBuf;
use std::process;

use clap::Parser;

use tikhar::commands::{run_parse, OutputFormat, ParseOptions};

#[derive(Parser)]
#[command(name = "tikhar")]
#[command(about = "Extract TikTok video metadata from HAR captures into JSON or CSV")]
#[command(version)]
struct Cli {
    /// Source .har file captured with browser developer tools
    input_file: PathBuf,

    /// Destination file (default: input path with the output format's extension)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Output format: json (default) or csv
    #[arg(short = 't', long = "type")]
    output_type: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let options = ParseOptions {
        output: cli.out,
        format: OutputFormat::from_arg(cli.output_type.as_deref()),
    };

    if let Err(e) = run_parse(&cli.input_file, &options) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
