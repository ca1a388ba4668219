//! bookpress - book export CLI

use std::fs::File;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;

use bookpress::{
    Book, ExportOrchestrator, FsFileStore, MemoryBookStore, OwnerAuthorizer, RenderTarget,
};

#[derive(Parser)]
#[command(name = "bookpress")]
#[command(version, about = "Book export engine", long_about = None)]
#[command(after_help = "EXAMPLES:
    bookpress book.json book.docx   Export a book to DOCX
    bookpress book.json book.pdf    Export a book to PDF
    bookpress -i book.json          Show book metadata")]
struct Cli {
    /// Input book file (JSON)
    #[arg(value_name = "INPUT")]
    input: String,

    /// Output file (.docx or .pdf)
    #[arg(value_name = "OUTPUT", required_unless_present = "info")]
    output: Option<String>,

    /// Directory holding uploaded images (defaults to the input's directory)
    #[arg(short, long)]
    storage: Option<String>,

    /// Show book metadata without exporting
    #[arg(short, long)]
    info: bool,

    /// Suppress output messages
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.info {
        match show_info(&cli.input) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("error: {e}");
                ExitCode::FAILURE
            }
        }
    } else {
        let output = cli.output.expect("output required");
        match export(&cli.input, &output, cli.storage.as_deref(), cli.quiet) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("error: {e}");
                ExitCode::FAILURE
            }
        }
    }
}

fn load_book(path: &str) -> Result<Book, String> {
    let data = std::fs::read_to_string(path).map_err(|e| format!("{path}: {e}"))?;
    serde_json::from_str(&data).map_err(|e| format!("{path}: {e}"))
}

fn show_info(path: &str) -> Result<(), String> {
    let book = load_book(path)?;

    println!("File: {path}");
    println!("Title: {}", book.title);
    if let Some(ref subtitle) = book.subtitle {
        println!("Subtitle: {subtitle}");
    }
    println!("Author: {}", book.author);
    println!("Status: {:?}", book.status);
    if let Some(ref cover) = book.cover_image {
        println!("Cover: {cover}");
    }
    println!("Chapters: {}", book.chapters.len());
    for chapter in &book.chapters {
        println!("  - {}", chapter.title);
    }

    Ok(())
}

fn export(input: &str, output: &str, storage: Option<&str>, quiet: bool) -> Result<(), String> {
    let target = match Path::new(output).extension().and_then(|e| e.to_str()) {
        Some("docx") => RenderTarget::WordDocument,
        Some("pdf") => RenderTarget::Pdf,
        _ => return Err(format!("unsupported output format: {output}")),
    };

    let book = load_book(input)?;
    let book_id = book.id.clone();
    let identity = book.owner.clone();

    let storage_root = storage
        .map(Path::new)
        .map(Path::to_path_buf)
        .or_else(|| Path::new(input).parent().map(Path::to_path_buf))
        .unwrap_or_default();

    let mut books = MemoryBookStore::new();
    books.insert(book);
    let files = FsFileStore::new(storage_root);

    let orchestrator = ExportOrchestrator::new(&books, &files, &OwnerAuthorizer);
    let mut sink = File::create(output).map_err(|e| format!("{output}: {e}"))?;
    let export = orchestrator
        .export_to(&book_id, &identity, target, &mut sink)
        .map_err(|e| e.to_string())?;

    if !quiet {
        println!("Exported {output} ({} bytes)", export.bytes_written);
    }
    Ok(())
}
