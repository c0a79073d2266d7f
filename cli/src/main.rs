//! docmap CLI - document outline extraction and section ranking

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use docmap::collection::{Collection, CollectionConfig, OUTPUT_FILE};
use docmap::render::{inspection_to_text, to_json};
use docmap::{
    AnalysisOptions, AutoRunSource, CollectionProcessor, Docmap, DocumentAnalyzer, EmbeddingRanker,
    HashingEmbedder, JsonFormat, PageSelection, ParseOptions, RankOptions,
};

#[derive(Parser)]
#[command(name = "docmap")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Extract PDF outlines and rank sections for a persona", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract title and H1-H3 outline, one JSON file per input
    Outline {
        /// Input PDFs or JSON run dumps
        #[arg(value_name = "FILES", required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        output: PathBuf,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Process files one at a time
        #[arg(long)]
        sequential: bool,

        /// Prefer the title stored in the document information dictionary
        #[arg(long)]
        metadata_title: bool,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,
    },

    /// Rank the sections of a document collection for its persona
    Rank {
        /// Collection directory
        #[arg(value_name = "COLLECTION_DIR")]
        dir: PathBuf,

        /// Collection config (defaults to <DIR>/challenge1b_input.json)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Output file (defaults to <DIR>/challenge1b_output.json)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Number of sections to select
        #[arg(long, default_value = "5")]
        top_k: usize,

        /// Maximum selected sections per document
        #[arg(long, default_value = "2")]
        per_doc_cap: usize,

        /// Embedding timeout in milliseconds
        #[arg(long, default_value = "10000", env = "DOCMAP_EMBED_TIMEOUT_MS")]
        timeout_ms: u64,

        /// Rank with keyword and content-type signals only
        #[arg(long)]
        no_embed: bool,

        /// Process documents one at a time
        #[arg(long)]
        sequential: bool,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show the font profile and per-candidate heading scores
    Inspect {
        /// Input PDF or JSON run dump
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print the inspection as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Outline {
            inputs,
            output,
            compact,
            sequential,
            metadata_title,
            pages,
        } => cmd_outline(
            &inputs,
            &output,
            json_format(compact),
            sequential,
            metadata_title,
            pages.as_deref(),
        ),
        Commands::Rank {
            dir,
            config,
            output,
            top_k,
            per_doc_cap,
            timeout_ms,
            no_embed,
            sequential,
            compact,
        } => {
            let mut options = RankOptions::new()
                .with_top_k(top_k)
                .with_per_document_cap(per_doc_cap)
                .with_embedding_timeout(Duration::from_millis(timeout_ms))
                .with_parallel(!sequential);
            if no_embed {
                options = options.without_embeddings();
            }
            cmd_rank(
                &dir,
                config.as_deref(),
                output.as_deref(),
                options,
                json_format(compact),
            )
        }
        Commands::Inspect { input, json } => cmd_inspect(&input, json),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn json_format(compact: bool) -> JsonFormat {
    if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    }
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn cmd_outline(
    inputs: &[PathBuf],
    output_dir: &Path,
    format: JsonFormat,
    sequential: bool,
    metadata_title: bool,
    pages: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let page_selection = match pages {
        Some(p) => PageSelection::parse(p).ok_or_else(|| format!("Invalid page range: {}", p))?,
        None => PageSelection::All,
    };

    fs::create_dir_all(output_dir)?;

    // Lenient: a bad page should not cost the whole document its outline
    let parse_options = ParseOptions::new().lenient().with_pages(page_selection);
    let analysis_options = AnalysisOptions::new().prefer_metadata_title(metadata_title);
    let processor = CollectionProcessor::new(
        Arc::new(AutoRunSource::new(parse_options)),
        DocumentAnalyzer::new(analysis_options),
    )
    .with_parallel(!sequential);

    let documents: Vec<(String, PathBuf)> = inputs
        .iter()
        .map(|p| (file_name(p), p.clone()))
        .collect();

    let pb = spinner(&format!("Analyzing {} documents...", documents.len()));
    let reports = processor.analyze_paths(&documents);
    pb.finish_and_clear();

    let mut failed = 0;
    for ((_, input), report) in documents.iter().zip(&reports) {
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        let path = output_dir.join(format!("{}.json", stem));
        let result = report.outline_result();
        log::debug!("Writing {}", path.display());
        fs::write(&path, to_json(&result, format)?)?;

        if let Some(error) = &result.error {
            failed += 1;
            println!("{} {} ({})", "✗".red(), report.id, error.dimmed());
        } else {
            println!(
                "{} {} → {} ({} headings)",
                "✓".green(),
                report.id,
                path.display(),
                result.outline.len()
            );
        }
    }

    println!(
        "\n{} {} processed, {} failed",
        "Done!".green().bold(),
        reports.len(),
        failed
    );
    Ok(())
}

fn cmd_rank(
    dir: &Path,
    config: Option<&Path>,
    output: Option<&Path>,
    options: RankOptions,
    format: JsonFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let collection = match config {
        Some(path) => Collection::new(dir, CollectionConfig::from_path(path)?),
        None => Collection::open(dir)?,
    };

    let processor = CollectionProcessor::new(Arc::new(AutoRunSource::default()), DocumentAnalyzer::default())
        .with_parallel(options.parallel);
    let ranker = EmbeddingRanker::new(Arc::new(HashingEmbedder::default()), options);

    let pb = spinner(&format!(
        "Ranking {} documents...",
        collection.config().documents.len()
    ));
    let run = processor.run(&collection, &ranker)?;
    pb.finish_and_clear();

    for report in &run.reports {
        if let Err(error) = &report.outcome {
            println!("{} {} ({})", "✗".red(), report.id, error.dimmed());
        }
    }

    println!("{}", "Top sections".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for section in &run.result.extracted_sections {
        println!(
            "{:>2}. {} {}",
            section.importance_rank,
            section.section_title.bold(),
            format!("({}, p{})", section.document, section.page_number).dimmed()
        );
    }
    if !run.ranking.embeddings_used {
        println!("{}", "Embeddings unavailable; ranked by keywords and content type".yellow());
    }

    let output_path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| dir.join(OUTPUT_FILE));
    log::debug!("Writing ranking result to {}", output_path.display());
    fs::write(&output_path, to_json(&run.result, format)?)?;
    println!("\n{} {}", "Saved to".green(), output_path.display());
    Ok(())
}

fn cmd_inspect(input: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let doc = Docmap::new().lenient().open(input)?;
    let inspection = doc.inspect();

    if json {
        println!("{}", to_json(&inspection, JsonFormat::Pretty)?);
        return Ok(());
    }

    println!("{}", "Document Inspection".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Pages".bold(), doc.runs().page_count);
    println!("{}: {}", "Runs".bold(), doc.runs().runs.len());
    if let Some(title) = &doc.runs().metadata_title {
        println!("{}: {}", "Info title".bold(), title);
    }
    println!();
    print!("{}", inspection_to_text(&inspection));
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "docmap".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Document outline extraction and persona-driven section ranking");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/docmap".dimmed());
    println!("License: MIT");
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
