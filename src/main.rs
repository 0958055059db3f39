use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use pdf_equivalence::prelude::*;

#[derive(Parser)]
#[command(name = "pdf_equivalence")]
#[command(version, about = "Compare PDF documents facet by facet and validate their links", long_about = None)]
struct Cli {
    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compare two PDF files
    Compare {
        left: PathBuf,
        right: PathBuf,

        /// Facet to compare; repeat for several (default: all)
        #[arg(short, long = "facet", value_enum)]
        facets: Vec<FacetArg>,

        #[command(flatten)]
        compat: CompatArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Check every http(s) link annotation in a PDF
    CheckLinks {
        pdf: PathBuf,

        /// Maximum concurrent requests
        #[arg(short, long, default_value_t = 8)]
        workers: usize,

        /// Total request timeout in seconds
        #[arg(long, default_value_t = 10)]
        timeout: u64,

        /// Connect timeout in seconds
        #[arg(long, default_value_t = 5)]
        connect_timeout: u64,

        /// Ignore HTTP_PROXY / HTTPS_PROXY
        #[arg(long)]
        no_proxy: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Report the first page each comma-separated phrase appears on
    FindPhrases { pdf: PathBuf, phrases: String },

    /// Compare every PDF under two directories, matched by relative path
    CompareDirs {
        left_dir: PathBuf,
        right_dir: PathBuf,

        /// Scan directories recursively
        #[arg(short, long)]
        recursive: bool,

        /// Number of parallel worker threads (default: number of CPUs)
        #[arg(short, long)]
        workers: Option<usize>,

        /// Run in batch mode (no progress bar)
        #[arg(long)]
        batch: bool,

        #[command(flatten)]
        compat: CompatArgs,

        /// Output report filename
        #[arg(short, long, default_value = "comparison_report.txt")]
        output: PathBuf,
    },
}

#[derive(Args)]
struct CompatArgs {
    /// Report right-only metadata keys, treat two missing outlines as equal
    /// and flag differing line counts
    #[arg(long)]
    strict: bool,
}

impl CompatArgs {
    fn options(&self) -> CompareOptions {
        if self.strict {
            CompareOptions::strict()
        } else {
            CompareOptions::default()
        }
    }
}

#[derive(Args)]
struct OutputArgs {
    /// Emit JSON instead of text
    #[arg(long)]
    json: bool,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum FacetArg {
    Text,
    Metadata,
    Bookmarks,
    Links,
    Pages,
}

impl From<FacetArg> for Facet {
    fn from(arg: FacetArg) -> Self {
        match arg {
            FacetArg::Text => Facet::TextContent,
            FacetArg::Metadata => Facet::Metadata,
            FacetArg::Bookmarks => Facet::Bookmarks,
            FacetArg::Links => Facet::LinkStructure,
            FacetArg::Pages => Facet::PageProperties,
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "pdf_equivalence=debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Compare {
            left,
            right,
            facets,
            compat,
            output,
        } => run_compare(&left, &right, &facets, &compat.options(), &output),
        Command::CheckLinks {
            pdf,
            workers,
            timeout,
            connect_timeout,
            no_proxy,
            output,
        } => {
            let options = LinkCheckOptions {
                workers: workers.max(1),
                connect_timeout: Duration::from_secs(connect_timeout),
                request_timeout: Duration::from_secs(timeout),
                use_system_proxy: !no_proxy,
                ..LinkCheckOptions::default()
            };
            run_check_links(&pdf, &options, &output)
        }
        Command::FindPhrases { pdf, phrases } => {
            let report = search_phrases_in_pdf(&pdf, &phrases)
                .with_context(|| format!("Failed to search {}", pdf.display()))?;
            render_phrase_report(&mut io::stdout().lock(), &report)?;
            Ok(exit_code(report.all_found()))
        }
        Command::CompareDirs {
            left_dir,
            right_dir,
            recursive,
            workers,
            batch,
            compat,
            output,
        } => run_compare_dirs(
            &left_dir,
            &right_dir,
            recursive,
            workers,
            batch,
            &compat.options(),
            &output,
        ),
    }
}

fn run_compare(
    left: &Path,
    right: &Path,
    facets: &[FacetArg],
    options: &CompareOptions,
    output: &OutputArgs,
) -> Result<ExitCode> {
    let facets: Vec<Facet> = if facets.is_empty() {
        Facet::ALL.to_vec()
    } else {
        facets.iter().copied().map(Facet::from).collect()
    };

    let report = compare_files(left, right, &facets, options).context("Failed to open documents")?;

    match (&output.output, output.json) {
        (Some(path), true) => write_json(path, &report)?,
        (Some(path), false) => write_comparison_report(path, left, right, &report)?,
        (None, true) => println!("{}", serde_json::to_string_pretty(&report)?),
        (None, false) => render_comparison_report(&mut io::stdout().lock(), left, right, &report)?,
    }
    if let Some(path) = &output.output {
        println!("Report saved to: {:?}", path);
    }

    Ok(exit_code(report.overall_equal()))
}

fn run_check_links(pdf: &Path, options: &LinkCheckOptions, output: &OutputArgs) -> Result<ExitCode> {
    info!(workers = options.workers, "checking links in {}", pdf.display());
    let report = check_links(pdf, options).with_context(|| format!("Failed to check {}", pdf.display()))?;

    match (&output.output, output.json) {
        (Some(path), true) => write_json(path, &report)?,
        (Some(path), false) => write_link_report(path, pdf, &report)?,
        (None, true) => println!("{}", serde_json::to_string_pretty(&report)?),
        (None, false) => render_link_report(&mut io::stdout().lock(), pdf, &report)?,
    }
    if let Some(path) = &output.output {
        println!("Report saved to: {:?}", path);
    }

    Ok(exit_code(report.all_reachable()))
}

fn run_compare_dirs(
    left_dir: &Path,
    right_dir: &Path,
    recursive: bool,
    workers: Option<usize>,
    batch: bool,
    options: &CompareOptions,
    output: &Path,
) -> Result<ExitCode> {
    // Set up graceful shutdown handler
    let shutdown_requested = Arc::new(AtomicBool::new(false));
    let shutdown_flag = shutdown_requested.clone();
    ctrlc::set_handler(move || {
        eprintln!("\nShutdown requested. Finishing pairs in progress...");
        shutdown_flag.store(true, Ordering::SeqCst);
    })
    .context("Error setting Ctrl-C handler")?;

    if let Some(workers) = workers {
        rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build_global()
            .context("Failed to build thread pool")?;
    }

    let pairing = pair_documents(left_dir, right_dir, recursive)?;
    let total_pairs = pairing.pairs.len();

    println!("PDF Equivalence (directory mode)");
    println!("Using {} worker thread(s)", rayon::current_num_threads());
    println!(
        "Found {} pair(s), {} only in left, {} only in right\n",
        total_pairs,
        pairing.left_only.len(),
        pairing.right_only.len()
    );

    let progress = if batch {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(total_pairs as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .context("Invalid progress template")?
                .progress_chars("#>-"),
        );
        pb
    };

    let shutdown_check = shutdown_requested.clone();
    let results: Vec<PairComparison> = pairing
        .pairs
        .par_iter()
        .progress_with(progress.clone())
        .filter_map(|pair| {
            if shutdown_check.load(Ordering::SeqCst) {
                return None;
            }
            debug!(pair = %pair.relative.display(), "comparing pair");
            Some(compare_pair(pair, &Facet::ALL, options))
        })
        .collect();

    let was_interrupted = shutdown_requested.load(Ordering::SeqCst);
    if was_interrupted {
        progress.finish_and_clear();
        eprintln!("Graceful shutdown complete");
        eprintln!("Compared {}/{} pairs", results.len(), total_pairs);
    } else {
        progress.finish_with_message("Comparison complete!");
    }

    let equal_count = results.iter().filter(|r| r.is_equal()).count();
    println!("==================================================");
    println!("COMPARISON COMPLETE");
    println!("==================================================");
    println!("Equivalent pairs: {}", equal_count);
    println!("Non-equivalent pairs: {}", results.len() - equal_count);
    println!();

    let output_file = if was_interrupted {
        PathBuf::from(format!("{}.partial", output.display()))
    } else {
        output.to_path_buf()
    };
    write_batch_report(&output_file, &results, &pairing, was_interrupted)?;
    println!("Detailed report saved to: {:?}", output_file);
    io::stdout().flush()?;

    let all_equal = !was_interrupted
        && equal_count == results.len()
        && pairing.left_only.is_empty()
        && pairing.right_only.is_empty();
    Ok(exit_code(all_equal))
}
