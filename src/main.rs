// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Command-line interface for chat2doc.
//!
//! This binary provides the `chat2doc` command for converting ChatGPT
//! conversation exports from JSON to Markdown and PDF.

use chat2doc::{markdown, parser, pdf};
use lexopt::prelude::*;
use snafu::{OptionExt, ensure, prelude::*};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Where to write the rendered output.
#[derive(Clone)]
enum OutputTarget {
    /// Write each file to the specified directory.
    Directory(PathBuf),
    /// Write to stdout.
    Stdout,
}

/// Which backends to run for each input file.
#[derive(Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Markdown,
    Pdf,
    All,
}

impl OutputFormat {
    fn includes_markdown(self) -> bool {
        matches!(self, Self::Markdown | Self::All)
    }

    fn includes_pdf(self) -> bool {
        matches!(self, Self::Pdf | Self::All)
    }
}

#[allow(clippy::struct_excessive_bools)]
struct Cli {
    input: Vec<PathBuf>,
    output: OutputTarget,
    format: OutputFormat,
    show_timestamps: bool,
    heading_offset: u8,
    quiet: bool,
    dry_run: bool,
    force: bool,
}

#[derive(Debug, Snafu)]
enum Error {
    #[snafu(display("failed to parse arguments: {source}"))]
    ParseArgs { source: lexopt::Error },

    #[snafu(display("at least one input file or directory is required"))]
    NoInputFiles,

    #[snafu(display("writing to stdout requires --format md"))]
    StdoutRequiresMarkdown,

    #[snafu(display("cannot output multiple files to stdout"))]
    MultipleFilesToStdout,

    #[snafu(display("failed to create output directory: {source}"))]
    CreateOutputDir { source: std::io::Error },

    #[snafu(display("failed to read {}: {source}", path.display()))]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("failed to parse {}: {source}", path.display()))]
    ParseFile {
        path: PathBuf,
        source: parser::ParseError,
    },

    #[snafu(display("invalid input filename: no file stem"))]
    InvalidFilename,

    #[snafu(display("failed to render {}: {source}", path.display()))]
    RenderPdf {
        path: PathBuf,
        source: pdf::DocumentError,
    },

    #[snafu(display("failed to write {}: {source}", path.display()))]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn print_help() {
    println!(
        "\
{name} {version}
Convert ChatGPT conversation exports to Markdown and PDF

Usage: {name} [OPTIONS] -o <OUTPUT> <INPUT>...

Arguments:
  <INPUT>...  Input JSON files or directories containing exports

Options:
  -o, --output <OUTPUT>     Output directory (or - for stdout with --format md)
      --format <FORMAT>     Output formats: md, pdf, or all (default: all)
      --heading-offset <N>  Shift Markdown heading levels by N (0-5, default: 0)

Metadata display (use --show-* or --hide-*):
      --show-timestamps     Include message timestamps in Markdown (default: off)
      --hide-timestamps     Hide message timestamps

Other options:
  -q, --quiet               Suppress progress messages
  -n, --dry-run             Show what would be processed without writing
  -f, --force               Overwrite existing output files
  -h, --help                Print help
  -V, --version             Print version",
        name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
    );
}

fn parse_args() -> Result<Cli, lexopt::Error> {
    // Show help if no arguments provided
    if std::env::args().len() == 1 {
        print_help();
        std::process::exit(0);
    }

    let mut input = Vec::new();
    let mut output: Option<OutputTarget> = None;
    let mut format = OutputFormat::All;
    let mut show_timestamps = false;
    let mut heading_offset: u8 = 0;
    let mut quiet = false;
    let mut dry_run = false;
    let mut force = false;

    let mut parser = lexopt::Parser::from_env();
    while let Some(arg) = parser.next()? {
        match arg {
            Short('o') | Long("output") => {
                let val: PathBuf = parser.value()?.parse()?;
                output = Some(if val == Path::new("-") {
                    OutputTarget::Stdout
                } else {
                    OutputTarget::Directory(val)
                });
            }
            Long("format") => {
                let val: String = parser.value()?.parse()?;
                format = match val.as_str() {
                    "md" | "markdown" => OutputFormat::Markdown,
                    "pdf" => OutputFormat::Pdf,
                    "all" | "both" => OutputFormat::All,
                    _ => return Err("format must be one of: md, pdf, all".into()),
                };
            }
            // Show/hide flags - last one wins
            Long("show-timestamps") => show_timestamps = true,
            Long("hide-timestamps") => show_timestamps = false,
            Long("heading-offset") => {
                let val: u8 = parser
                    .value()?
                    .parse()
                    .map_err(|_| "heading-offset must be a number 0-5")?;
                if val > 5 {
                    return Err("heading-offset must be 0-5".into());
                }
                heading_offset = val;
            }
            Short('q') | Long("quiet") => quiet = true,
            Short('n') | Long("dry-run") => dry_run = true,
            Short('f') | Long("force") => force = true,
            Short('h') | Long("help") => {
                print_help();
                std::process::exit(0);
            }
            Short('V') | Long("version") => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            Value(val) => input.push(val.parse()?),
            _ => return Err(arg.unexpected()),
        }
    }

    Ok(Cli {
        input,
        output: output.ok_or("missing required option: --output")?,
        format,
        show_timestamps,
        heading_offset,
        quiet,
        dry_run,
        force,
    })
}

fn main() -> Result<(), Error> {
    let cli = parse_args().context(ParseArgsSnafu)?;

    ensure!(!cli.input.is_empty(), NoInputFilesSnafu);

    // Collect all input files first
    let files = collect_input_files(&cli.input);

    match &cli.output {
        OutputTarget::Stdout => {
            ensure!(
                cli.format == OutputFormat::Markdown,
                StdoutRequiresMarkdownSnafu
            );
            ensure!(files.len() == 1, MultipleFilesToStdoutSnafu);
            process_to_stdout(&files[0], &cli)?;
        }
        OutputTarget::Directory(dir) => {
            if !cli.dry_run {
                std::fs::create_dir_all(dir).context(CreateOutputDirSnafu)?;
            }
            for file in &files {
                process_file(file, dir, &cli)?;
            }
        }
    }

    Ok(())
}

/// Collects all JSON files from the given inputs (files and directories).
fn collect_input_files(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input)
                .into_iter()
                .filter_map(Result::ok)
                .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
            {
                files.push(entry.path().to_path_buf());
            }
        } else {
            files.push(input.clone());
        }
    }
    files
}

/// Creates render options from CLI arguments.
#[allow(clippy::missing_const_for_fn)]
fn make_render_options(cli: &Cli) -> markdown::RenderOptions {
    markdown::RenderOptions {
        show_timestamps: cli.show_timestamps,
        heading_offset: cli.heading_offset,
    }
}

/// Reads and parses one export file, reporting any skipped entries.
fn load_conversation(input: &Path) -> Result<parser::Conversation, Error> {
    let json = std::fs::read_to_string(input).context(ReadFileSnafu { path: input })?;
    let conversation = parser::parse_conversation(&json).context(ParseFileSnafu { path: input })?;

    for skipped in &conversation.skipped {
        eprintln!(
            "Skipping malformed message {} in {}: {}",
            skipped.id,
            input.display(),
            skipped.reason
        );
    }

    Ok(conversation)
}

/// Processes a single file and outputs its Markdown to stdout.
fn process_to_stdout(input: &Path, cli: &Cli) -> Result<(), Error> {
    if cli.dry_run {
        eprintln!("Would output {}", input.display());
        return Ok(());
    }

    let conversation = load_conversation(input)?;
    let text = markdown::render_conversation(&conversation, &make_render_options(cli));

    print!("{text}");
    Ok(())
}

/// Processes a single file and writes the selected formats to the output
/// directory.
fn process_file(input: &Path, out_dir: &Path, cli: &Cli) -> Result<(), Error> {
    let stem = input.file_stem().context(InvalidFilenameSnafu)?;
    let stem = stem.to_string_lossy();

    let md_path = cli
        .format
        .includes_markdown()
        .then(|| out_dir.join(format!("{stem}.md")));
    let pdf_path = cli
        .format
        .includes_pdf()
        .then(|| out_dir.join(format!("{stem}.pdf")));

    // Handle dry-run mode
    if cli.dry_run {
        for path in [&md_path, &pdf_path].into_iter().flatten() {
            eprintln!("Would write {}", path.display());
        }
        return Ok(());
    }

    let conversation = load_conversation(input)?;

    if let Some(path) = md_path {
        if path.exists() && !cli.force {
            eprintln!(
                "Skipping {} (already exists, use --force to overwrite)",
                path.display()
            );
        } else {
            let text = markdown::render_conversation(&conversation, &make_render_options(cli));
            std::fs::write(&path, &text).context(WriteFileSnafu { path: &path })?;
            if !cli.quiet {
                eprintln!("Wrote {}", path.display());
            }
        }
    }

    if let Some(path) = pdf_path {
        if path.exists() && !cli.force {
            eprintln!(
                "Skipping {} (already exists, use --force to overwrite)",
                path.display()
            );
        } else {
            let bytes = pdf::render_document(&conversation, &pdf::DocumentOptions::default())
                .context(RenderPdfSnafu { path: &path })?;
            std::fs::write(&path, &bytes).context(WriteFileSnafu { path: &path })?;
            if !cli.quiet {
                eprintln!("Wrote {}", path.display());
            }
        }
    }

    Ok(())
}
