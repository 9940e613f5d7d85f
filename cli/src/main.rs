//! htd2md CLI - HTD Word template to Markdown converter

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use htd2md::batch::{self, BatchOptions};
use htd2md::{ConvertOptions, DocumentSource, DocxReader, Htd2md};

#[derive(Parser)]
#[command(name = "htd2md")]
#[command(version)]
#[command(
    about = "Converts test cases according to the HTD template from Word to Markdown files",
    long_about = None
)]
struct Cli {
    /// Word file or folder to convert
    #[arg(value_name = "PATH")]
    path: Option<PathBuf>,

    /// Folder the output is written to
    #[arg(value_name = "DESTINATION")]
    destination: Option<PathBuf>,

    #[command(flatten)]
    flags: ConvertFlags,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Args, Clone, Copy, Default)]
struct ConvertFlags {
    /// Write each Word file's output into a folder named after the file
    #[arg(short = 'f', long)]
    create_folder: bool,

    /// Recurse into sub folders
    #[arg(short, long)]
    recurse: bool,

    /// Rename graphics with file ending ".emf" to ".png"
    #[arg(short = 'e', long)]
    no_emf: bool,

    /// Also write the document model as _index.json
    #[arg(long)]
    json: bool,

    /// Convert one file at a time
    #[arg(long)]
    sequential: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a Word file or a folder of Word files
    Convert {
        /// Word file or folder to convert
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Folder the output is written to
        #[arg(value_name = "DESTINATION")]
        destination: PathBuf,

        #[command(flatten)]
        flags: ConvertFlags,
    },

    /// Show the detected template and the documents it produces
    Info {
        /// Word file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

impl ConvertFlags {
    fn batch_options(self) -> BatchOptions {
        BatchOptions::new()
            .with_create_folder(self.create_folder)
            .with_recurse(self.recurse)
            .with_parallel(!self.sequential)
            .with_json(self.json)
            .with_convert_options(ConvertOptions::new().with_force_png(self.no_emf))
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Convert {
            path,
            destination,
            flags,
        }) => cmd_convert(&path, &destination, flags),
        Some(Commands::Info { input }) => cmd_info(&input),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => match (cli.path, cli.destination) {
            (Some(path), Some(destination)) => cmd_convert(&path, &destination, cli.flags),
            _ => {
                println!("{}", "Usage: htd2md <PATH> <DESTINATION>".yellow());
                println!("       htd2md --help for more information");
                Ok(())
            }
        },
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_convert(
    path: &Path,
    destination: &Path,
    flags: ConvertFlags,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = flags.batch_options();
    let inputs = batch::collect_inputs(path, destination, options.recurse)?;

    log::info!("Conversion started for {}", path.display());

    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let report = batch::run_inputs(&inputs, &options, |file| {
        pb.set_message(
            file.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        );
        pb.inc(1);
    });
    pb.finish_and_clear();

    log::info!(
        "Conversion completed. Output files written to {}",
        destination.display()
    );

    println!("{}", "Converted:".green().bold());
    for converted in &report.converted {
        println!(
            "  {} {} ({}, {} documents)",
            "├─".dimmed(),
            converted.file.display(),
            converted.kind,
            converted.written.len()
        );
    }
    println!(
        "  {} {} documents, {} attachments",
        "└─".dimmed(),
        report.documents_written(),
        report.attachments_written()
    );

    if !report.is_success() {
        println!("{}", "Skipped:".yellow().bold());
        for (file, reason) in &report.failed {
            println!("  {} {}: {}", "-".dimmed(), file.display(), reason);
        }
    }

    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let source = DocxReader::open(input)?;
    let result = Htd2md::new().convert_source(&source)?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Template".bold(), result.kind());
    println!("{}: {}", "Paragraphs".bold(), source.paragraphs().len());
    println!("{}: {}", "Tables".bold(), source.tables().len());

    println!();
    println!("{}", "Produced Documents".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let documents = result.documents();
    for (id, doc) in documents.iter() {
        let dir = documents.output_dir(id, Path::new("."), false);
        println!(
            "{} {} {}",
            doc.title.bold(),
            format!("[{}]", dir.display()).dimmed(),
            format!("{} attachments", doc.attachments().len()).dimmed()
        );
        for section in &doc.sections {
            println!("  {} {}", "├─".dimmed(), section.heading);
        }
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "htd2md".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("HTD Word template to Markdown converter");
    println!();
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_positional_form() {
        let cli = Cli::try_parse_from(["htd2md", "in.docx", "out", "-f", "-e", "--json"]).unwrap();
        assert_eq!(cli.path, Some(PathBuf::from("in.docx")));
        assert_eq!(cli.destination, Some(PathBuf::from("out")));

        let options = cli.flags.batch_options();
        assert!(options.create_folder);
        assert!(options.write_json);
        assert!(options.parallel);
        assert!(options.convert.parse.force_png);
    }

    #[test]
    fn test_convert_subcommand() {
        let cli =
            Cli::try_parse_from(["htd2md", "convert", "docs", "site", "-r", "--sequential"]).unwrap();
        match cli.command {
            Some(Commands::Convert { flags, .. }) => {
                let options = flags.batch_options();
                assert!(options.recurse);
                assert!(!options.parallel);
            }
            _ => panic!("expected convert subcommand"),
        }
    }

    #[test]
    fn test_convert_empty_folder() {
        let tmp = tempfile::TempDir::new().unwrap();
        let out = tmp.path().join("out");
        cmd_convert(tmp.path(), &out, ConvertFlags::default()).unwrap();
        assert!(!out.exists());
    }
}
