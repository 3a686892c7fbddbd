use anyhow::Result;
use book_compose::{Book, expand_pages};
use book_render::{export_page_images, render_document, write_manuscript};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bookgen", about = "Assemble an illustrated early-reader book PDF", version)]
struct Cli {
    /// Path to the YAML config that describes the book
    #[arg(long, default_value = "content/pages.yaml")]
    config: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let book = Book::load(&cli.config)?;
    let pages = expand_pages(&book)?;
    let (bytes, report) = render_document(&book, &pages)?;
    std::fs::write(&book.output_pdf, &bytes)?;
    println!("Created {}", book.output_pdf.display());

    if let Some(manuscript) = &book.manuscript {
        write_manuscript(
            &manuscript.path,
            manuscript.format,
            &book.title,
            &report.manuscript,
        )?;
        println!("Manuscript → {}", manuscript.path.display());
    }

    if let Some(output) = &book.image_output {
        // The PDF is already written; a failed export is only a warning.
        match export_page_images(&bytes, output) {
            Ok(count) => println!(
                "Exported {} page images → {}",
                count,
                output.folder.display()
            ),
            Err(e) => log::warn!("page image export failed: {e}"),
        }
    }

    println!("Summary:");
    println!("  Pages: {}", report.total_pages);
    println!("  Pages with art: {}", report.pages_with_art);
    println!("  Estimated words: {}", report.word_count);
    if !report.missing_images.is_empty() {
        println!("  Missing images:");
        for missing in &report.missing_images {
            println!(
                "    page {} ({}): {}",
                missing.page_number,
                missing.slug,
                missing.path.display()
            );
        }
    }

    Ok(())
}
