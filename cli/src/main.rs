//! slidepdf CLI - turn presentation slides into a PDF

mod fetch;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use slidepdf::{
    detect_image_from_path, extract_slide_urls, output_filename, slides, ColorMode,
    ConvertOptions, ImageConverter, ImageInfo, Metadata, PageSize,
};

use crate::fetch::HttpFetcher;

#[derive(Parser)]
#[command(name = "slidepdf")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Turn presentation slides into a single PDF", long_about = None)]
struct Cli {
    /// Presentation page URL
    #[arg(value_name = "URL")]
    url: Option<String>,

    /// Output PDF file (derived from the first slide name if not specified)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Resolution used to size pages
    #[arg(long, env = "SLIDEPDF_DPI", default_value = "72")]
    dpi: f64,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Download every slide of a presentation page into one PDF
    #[command(alias = "dl")]
    Download {
        /// Presentation page URL
        #[arg(value_name = "URL")]
        url: String,

        /// Output PDF file (derived from the first slide name if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Resolution used to size pages
        #[arg(long, env = "SLIDEPDF_DPI", default_value = "72")]
        dpi: f64,

        /// Download slides concurrently (page order is preserved)
        #[arg(long)]
        parallel: bool,

        #[command(flatten)]
        meta: MetadataArgs,
    },

    /// Convert local image files into one PDF, one page per file
    Images {
        /// Image files, in page order
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /// Output PDF file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Resolution used to size pages
        #[arg(long, env = "SLIDEPDF_DPI", default_value = "96")]
        dpi: f64,

        /// Color mode for every image (L, RGB, CMYK, CMYK;I)
        #[arg(long, value_name = "MODE")]
        color: Option<String>,

        #[command(flatten)]
        meta: MetadataArgs,
    },

    /// Show format, dimensions and page size of image files
    Probe {
        /// Image files
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /// Resolution used to size pages
        #[arg(long, env = "SLIDEPDF_DPI", default_value = "96")]
        dpi: f64,

        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

#[derive(Args, Default)]
struct MetadataArgs {
    /// Document title
    #[arg(long)]
    title: Option<String>,

    /// Document author
    #[arg(long)]
    author: Option<String>,

    /// Document subject
    #[arg(long)]
    subject: Option<String>,

    /// Keyword (repeatable)
    #[arg(long = "keyword", value_name = "WORD")]
    keywords: Vec<String>,

    /// Omit creation and modification dates
    #[arg(long)]
    no_dates: bool,
}

impl From<MetadataArgs> for Metadata {
    fn from(args: MetadataArgs) -> Self {
        Metadata {
            title: args.title,
            author: args.author,
            subject: args.subject,
            keywords: args.keywords,
            creator: Some("slidepdf".to_string()),
            producer: Some(format!("slidepdf {}", env!("CARGO_PKG_VERSION"))),
            no_dates: args.no_dates,
            ..Default::default()
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Download {
            url,
            output,
            dpi,
            parallel,
            meta,
        }) => cmd_download(&url, output.as_deref(), dpi, parallel, meta),
        Some(Commands::Images {
            files,
            output,
            dpi,
            color,
            meta,
        }) => cmd_images(&files, &output, dpi, color.as_deref(), meta),
        Some(Commands::Probe { files, dpi, json }) => cmd_probe(&files, dpi, json),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: download if a URL is provided
            if let Some(url) = cli.url {
                cmd_download(&url, cli.output.as_deref(), cli.dpi, false, MetadataArgs::default())
            } else {
                println!("{}", "Usage: slidepdf <URL> [-o FILE]".yellow());
                println!("       slidepdf --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

fn cmd_download(
    url: &str,
    output: Option<&Path>,
    dpi: f64,
    parallel: bool,
    meta: MetadataArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let fetcher = HttpFetcher::new()?;

    println!("{}", "Downloading HTML content...".cyan());
    let html = fetcher.get_text(url)?;
    let urls = extract_slide_urls(&html);
    let Some(first) = urls.first() else {
        return Err(slidepdf::Error::NoSlides.into());
    };

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(output_filename(first)));
    println!("{} {}", "Output file:".green(), output.display());

    let options = ConvertOptions::new()
        .with_dpi(dpi)
        .with_metadata(meta.into());
    let mut converter = ImageConverter::new(options);

    let pb = progress_bar(urls.len());
    if parallel {
        pb.set_message("Downloading slides...");
        let images = slides::fetch_ordered(&urls, &fetcher, true)?;
        for data in images {
            converter.add_image_bytes(data)?;
            pb.inc(1);
        }
    } else {
        for (index, slide_url) in urls.iter().enumerate() {
            pb.set_message(format!("Downloading page {}", index + 1));
            let temp = fetcher.download_to_temp(slide_url)?;
            converter.add_image_file(temp.path())?;
            pb.inc(1);
        }
    }
    pb.finish_with_message("Done!");

    converter.write(&output)?;
    println!(
        "{} {} pages saved to {}",
        "Done!".green().bold(),
        converter.page_count(),
        output.display()
    );

    Ok(())
}

fn cmd_images(
    files: &[PathBuf],
    output: &Path,
    dpi: f64,
    color: Option<&str>,
    meta: MetadataArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut options = ConvertOptions::new()
        .with_dpi(dpi)
        .with_metadata(meta.into());
    if let Some(mode) = color {
        options = options.with_color_mode(ColorMode::from(mode));
    }

    let mut converter = ImageConverter::new(options);
    let pb = progress_bar(files.len());
    for file in files {
        pb.set_message(file.display().to_string());
        if converter.add_image_file(file)?.is_none() {
            pb.println(format!("{} {}", "Skipped".yellow(), file.display()));
        }
        pb.inc(1);
    }
    pb.finish_with_message("Done!");

    converter.write(output)?;
    println!(
        "{} {} pages saved to {}",
        "Done!".green().bold(),
        converter.page_count(),
        output.display()
    );

    Ok(())
}

#[derive(Serialize)]
struct ProbeReport {
    file: String,
    #[serde(flatten)]
    info: Option<ImageInfo>,
    page_size: Option<PageSize>,
}

fn cmd_probe(files: &[PathBuf], dpi: f64, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let options = ConvertOptions::new().with_dpi(dpi);
    let converter = ImageConverter::new(options);

    let mut reports = Vec::with_capacity(files.len());
    for file in files {
        let info = detect_image_from_path(file)?;
        reports.push(ProbeReport {
            file: file.display().to_string(),
            page_size: info.as_ref().map(|i| converter.page_size(i)),
            info,
        });
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    for report in &reports {
        match (&report.info, &report.page_size) {
            (Some(info), Some(size)) => println!(
                "{}: {} {}x{}px {} -> {:.4}x{:.4}pt",
                report.file.bold(),
                info.format,
                info.width,
                info.height,
                info.color_mode()
                    .map_or_else(|| "?".to_string(), |m| m.to_string()),
                size.width,
                size.height
            ),
            _ => println!("{}: {}", report.file.bold(), "unknown dimensions".red()),
        }
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "slidepdf".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Presentation slides to PDF");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/slidepdf".dimmed());
    println!("License: MIT");
}
