//! word2pdf CLI tool
//!
//! Convert Word documents to PDF, optionally merging them and stamping page
//! numbers. `shell` keeps a selection across commands for interactive use.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use glob::glob;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;

use word2pdf::convert::office::{DEFAULT_PROGRAM, PROGRAM_ENV};
use word2pdf::convert::{absolute, OfficeEngine, WordEngine};
use word2pdf::pdf::{extract_metadata, StampOptions};
use word2pdf::selection::{display_name, is_word_document, AddReport, Selection, MAX_SELECTION};
use word2pdf::workflow::{convert_single, merge_selection, Level, Notice, Outcome, WorkflowOptions};

/// word2pdf - Convert Word documents to PDF, merge them and number pages
#[derive(Parser)]
#[command(name = "word2pdf")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Convert one document
    word2pdf convert report.docx -o report.pdf

    # Convert and merge up to five documents, numbering the pages
    word2pdf merge -o reports.pdf --page-numbers report1.docx report2.docx

    # Pick files interactively
    word2pdf shell --page-numbers")]
struct Cli {
    /// Office executable used for conversion
    #[arg(long, global = true, env = PROGRAM_ENV, default_value = DEFAULT_PROGRAM)]
    office: PathBuf,

    /// Log each conversion step
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a single Word document to PDF
    Convert {
        /// Input Word document. Supports glob patterns, but must match exactly one file
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Output PDF file path (".pdf" is added when there is no extension)
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        numbering: NumberingArgs,

        /// Open the output file after creation
        #[arg(long)]
        open: bool,
    },

    /// Convert two to five Word documents and merge them into one PDF
    Merge {
        /// Input Word documents (in order). Supports glob patterns like "*.docx"
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Output PDF file path (".pdf" is added when there is no extension)
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        numbering: NumberingArgs,

        /// Open the output file after creation
        #[arg(long)]
        open: bool,
    },

    /// Show information about a PDF file
    Info {
        /// PDF file to inspect
        input: PathBuf,
    },

    /// Build a selection interactively and run conversions from a prompt
    Shell {
        #[command(flatten)]
        numbering: NumberingArgs,
    },
}

#[derive(Args, Clone)]
struct NumberingArgs {
    /// Stamp page numbers onto the output
    #[arg(long)]
    page_numbers: bool,

    /// Page number font size in points
    #[arg(long, default_value_t = 12.0)]
    font_size: f32,

    /// Page number baseline above the bottom edge, in points
    #[arg(long, default_value_t = 30.0)]
    baseline: f32,
}

impl NumberingArgs {
    fn workflow_options(&self) -> WorkflowOptions {
        WorkflowOptions {
            page_numbers: self.page_numbers,
            stamp: StampOptions {
                font_size: self.font_size,
                baseline: self.baseline,
            },
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let engine = OfficeEngine::new(cli.office);

    let result = match cli.command {
        Commands::Convert { inputs, output, numbering, open } => {
            cmd_convert(&engine, inputs, output, numbering, open)
        }
        Commands::Merge { inputs, output, numbering, open } => {
            cmd_merge(&engine, inputs, output, numbering, open)
        }
        Commands::Info { input } => {
            cmd_info(input)
        }
        Commands::Shell { numbering } => {
            cmd_shell(&engine, numbering)
        }
    };

    if let Err(e) = result {
        match e.downcast_ref::<word2pdf::Error>() {
            Some(err) => eprintln!("{}", Notice::from_error(err)),
            None => eprintln!("Error: {:#}", e),
        }
        process::exit(1);
    }
}

/// Expand glob patterns in input paths
///
/// Argument order is kept; matches of a single pattern come back sorted.
fn expand_globs(patterns: Vec<String>) -> anyhow::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for pattern in patterns {
        if pattern.contains('*') || pattern.contains('?') || pattern.contains('[') {
            let mut matched: Vec<PathBuf> = Vec::new();
            for entry in glob(&pattern).with_context(|| format!("Invalid glob pattern: {}", pattern))? {
                match entry {
                    Ok(path) => matched.push(path),
                    Err(e) => eprintln!("Warning: glob error for {}: {}", pattern, e),
                }
            }
            if matched.is_empty() {
                anyhow::bail!("No files matched pattern: {}", pattern);
            }
            matched.sort();
            paths.extend(matched);
        } else {
            paths.push(PathBuf::from(pattern));
        }
    }

    Ok(paths)
}

/// Add Word documents to the selection, skipping anything else
fn select_documents(selection: &mut Selection, candidates: Vec<PathBuf>) -> word2pdf::Result<AddReport> {
    let mut documents = Vec::with_capacity(candidates.len());

    for path in candidates {
        if is_word_document(&path) {
            documents.push(absolute(&path)?);
        } else {
            eprintln!("{}", Notice::warning(format!("Skipping {}: not a Word document", path.display())));
        }
    }

    selection.add(documents)
}

/// Open a file with the system default application
fn open_file(path: &Path) -> anyhow::Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(path)
            .spawn()?;
    }
    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(path)
            .spawn()?;
    }
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", &path.display().to_string()])
            .spawn()?;
    }
    Ok(())
}

/// Print the notice for a finished workflow and open the result if asked
fn finish(outcome: Outcome, open: bool) -> anyhow::Result<()> {
    if let Some(notice) = Notice::from_outcome(&outcome) {
        println!("{}", notice);
    }

    match outcome {
        Outcome::Converted { destination, .. } | Outcome::Merged { destination, .. } if open => {
            open_file(&destination)
        }
        _ => Ok(()),
    }
}

/// Convert one Word document
fn cmd_convert(
    engine: &dyn WordEngine,
    inputs: Vec<String>,
    output: PathBuf,
    numbering: NumberingArgs,
    open: bool,
) -> anyhow::Result<()> {
    let mut selection = Selection::new();
    select_documents(&mut selection, expand_globs(inputs)?)?;

    let outcome = convert_single(engine, &selection, Some(&output), &numbering.workflow_options())?;
    finish(outcome, open)
}

/// Convert several Word documents and merge the results
fn cmd_merge(
    engine: &dyn WordEngine,
    inputs: Vec<String>,
    output: PathBuf,
    numbering: NumberingArgs,
    open: bool,
) -> anyhow::Result<()> {
    let mut selection = Selection::new();
    select_documents(&mut selection, expand_globs(inputs)?)?;

    eprintln!("Converting {} documents...", selection.len());

    let outcome = merge_selection(engine, &selection, Some(&output), &numbering.workflow_options())?;
    finish(outcome, open)
}

/// Show information about a PDF
fn cmd_info(input: PathBuf) -> anyhow::Result<()> {
    let metadata = extract_metadata(&input)?;

    println!("File: {}", input.display());
    println!("Pages: {}", metadata.page_count);

    if let Some(title) = metadata.title {
        println!("Title: {}", title);
    }
    if let Some(author) = metadata.author {
        println!("Author: {}", author);
    }
    if let Some(producer) = metadata.producer {
        println!("Producer: {}", producer);
    }

    Ok(())
}

const SHELL_HELP: &str = "Commands:
    add <files...>      add Word documents to the selection (globs allowed)
    list                show the selection
    clear               empty the selection
    numbers [on|off]    toggle page numbering
    convert [output]    convert the single selected document
    merge [output]      convert and merge all selected documents
    help                show this help
    quit                leave the shell";

/// Interactive selection and conversion
fn cmd_shell(engine: &dyn WordEngine, numbering: NumberingArgs) -> anyhow::Result<()> {
    let mut options = numbering.workflow_options();
    let mut selection = Selection::new();
    let stdin = io::stdin();
    let mut input = stdin.lock();

    println!("{}", SHELL_HELP);

    loop {
        print!("word2pdf> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }

        let words = split_args(&line);
        let Some((command, args)) = words.split_first() else {
            continue;
        };

        match command.as_str() {
            "add" => {
                let added = expand_globs(args.to_vec())
                    .map_err(|e| Notice { level: Level::Error, message: e.to_string() })
                    .and_then(|paths| {
                        select_documents(&mut selection, paths).map_err(|e| Notice::from_error(&e))
                    });
                match added {
                    Ok(report) => println!(
                        "Added {} ({} already selected), {}/{} selected",
                        report.added, report.skipped, selection.len(), MAX_SELECTION
                    ),
                    Err(notice) => eprintln!("{}", notice),
                }
            }
            "list" => {
                if selection.is_empty() {
                    println!("No files selected");
                }
                for (i, path) in selection.iter().enumerate() {
                    println!("{}. {}", i + 1, display_name(path));
                }
                println!("Page numbers: {}", if options.page_numbers { "on" } else { "off" });
            }
            "clear" => {
                selection.clear();
                println!("Selection cleared");
            }
            "numbers" => {
                match args.first().map(String::as_str) {
                    Some("on") => options.page_numbers = true,
                    Some("off") => options.page_numbers = false,
                    None => options.page_numbers = !options.page_numbers,
                    Some(other) => {
                        eprintln!("{}", Notice::warning(format!("Expected on or off, got {}", other)));
                        continue;
                    }
                }
                println!("Page numbers: {}", if options.page_numbers { "on" } else { "off" });
            }
            "convert" | "merge" => {
                let destination = match args {
                    [] => prompt_destination(&mut input)?,
                    _ => Some(PathBuf::from(args.join(" "))),
                };
                let result = if command == "convert" {
                    convert_single(engine, &selection, destination.as_deref(), &options)
                } else {
                    merge_selection(engine, &selection, destination.as_deref(), &options)
                };
                match Notice::from_result(&result) {
                    Some(notice) if notice.level == Level::Info => println!("{}", notice),
                    Some(notice) => eprintln!("{}", notice),
                    None => println!("Cancelled"),
                }
            }
            "help" => println!("{}", SHELL_HELP),
            "quit" | "exit" => break,
            other => eprintln!("{}", Notice::warning(format!("Unknown command: {} (try help)", other))),
        }
    }

    Ok(())
}

/// Ask for the output path; an empty answer cancels
fn prompt_destination(input: &mut impl BufRead) -> io::Result<Option<PathBuf>> {
    print!("Save PDF as: ");
    io::stdout().flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    let answer = line.trim();

    Ok((!answer.is_empty()).then(|| PathBuf::from(answer)))
}

/// Split a shell line on whitespace, honouring double quotes
fn split_args(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut in_word = false;

    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                in_word = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if in_word {
        words.push(current);
    }

    words
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_args_quotes() {
        assert_eq!(
            split_args("add \"my report.docx\" b.docx\n"),
            vec!["add", "my report.docx", "b.docx"]
        );
        assert_eq!(split_args("merge \"\""), vec!["merge", ""]);
        assert!(split_args("   \n").is_empty());
    }

    #[test]
    fn test_expand_globs_keeps_literal_order() {
        let paths = expand_globs(vec!["b.docx".to_string(), "a.docx".to_string()]).unwrap();
        assert_eq!(paths, vec![PathBuf::from("b.docx"), PathBuf::from("a.docx")]);
    }

    #[test]
    fn test_select_documents_skips_other_files() {
        let mut selection = Selection::new();
        let report = select_documents(
            &mut selection,
            vec![PathBuf::from("a.docx"), PathBuf::from("b.pdf"), PathBuf::from("c.DOC")],
        )
        .unwrap();

        assert_eq!(report.added, 2);
        assert!(selection.iter().all(|p| p.is_absolute()));
    }

    #[test]
    fn test_prompt_destination_empty_cancels() {
        let mut input = io::Cursor::new(b"\n".to_vec());
        assert!(prompt_destination(&mut input).unwrap().is_none());

        let mut input = io::Cursor::new(b"out.pdf\n".to_vec());
        assert_eq!(prompt_destination(&mut input).unwrap(), Some(PathBuf::from("out.pdf")));
    }
}
