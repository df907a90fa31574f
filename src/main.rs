//! websift command-line interface.
//!
//! Reads HTML from stdin, files or directories, runs the extraction
//! pipeline and writes the result to stdout or an output directory.
//! Remote discovery flags are part of the CLI contract but require a
//! downloader component that this build does not ship; the affected
//! inputs are reported as per-URL errors.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Context;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use clap::{ArgAction, Parser};
use md5::{Digest, Md5};
use rayon::prelude::*;
use serde::Deserialize;
use tracing::debug;
use walkdir::WalkDir;

use websift::{extract, ExtractionOptions, Focus, OutputFormat};

const MAX_FILES_PER_DIRECTORY: usize = 1000;

/// Extract the main text content of web pages.
#[derive(Parser, Debug)]
#[command(name = "websift", version, about = "Turn HTML documents into clean article text")]
#[allow(clippy::struct_excessive_bools)]
struct Args {
    /// Read input from a file containing HTML (or a list of URLs with --list)
    #[arg(short = 'i', long = "input-file", value_name = "FILE")]
    input_file: Option<PathBuf>,

    /// Process every file under a directory
    #[arg(long = "input-dir", value_name = "DIR")]
    input_dir: Option<PathBuf>,

    /// Fetch and process a single URL (requires a downloader)
    #[arg(short = 'u', long = "URL", value_name = "URL")]
    url: Option<String>,

    /// Number of worker threads for directory processing
    #[arg(long, value_name = "N", default_value_t = 1)]
    parallel: usize,

    /// File with URLs to reject, one per line
    #[arg(short = 'b', long, value_name = "FILE")]
    blacklist: Option<PathBuf>,

    /// List discovered inputs instead of processing them
    #[arg(long)]
    list: bool,

    /// Write outputs to this directory instead of stdout
    #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Keep a copy of raw inputs in this directory
    #[arg(long = "backup-dir", value_name = "DIR")]
    backup_dir: Option<PathBuf>,

    /// Mirror the input directory layout in the output directory
    #[arg(long = "keep-dirs")]
    keep_dirs: bool,

    /// Discover pages through a feed (requires a downloader)
    #[arg(long, value_name = "URL")]
    feed: Option<String>,

    /// Discover pages through a sitemap (requires a downloader)
    #[arg(long, value_name = "URL")]
    sitemap: Option<String>,

    /// Crawl a site for pages (requires a downloader)
    #[arg(long, value_name = "URL")]
    crawl: Option<String>,

    /// Explore a site: sitemap first, then crawl (requires a downloader)
    #[arg(long, value_name = "URL")]
    explore: Option<String>,

    /// Probe a host for extractable content (requires a downloader)
    #[arg(long, value_name = "URL")]
    probe: Option<String>,

    /// Use archived versions of the requested pages
    #[arg(long)]
    archived: bool,

    /// Only process URLs containing this substring (repeatable)
    #[arg(long = "url-filter", value_name = "PATTERN")]
    url_filter: Vec<String>,

    /// Skip the fallback cascade
    #[arg(short = 'f', long)]
    fast: bool,

    /// Preserve inline text formatting
    #[arg(long)]
    formatting: bool,

    /// Keep link targets
    #[arg(long)]
    links: bool,

    /// Keep image references
    #[arg(long)]
    images: bool,

    /// Skip comment extraction
    #[arg(long = "no-comments")]
    no_comments: bool,

    /// Skip tables
    #[arg(long = "no-tables")]
    no_tables: bool,

    /// Reject documents without date, title and URL
    #[arg(long = "only-with-metadata")]
    only_with_metadata: bool,

    /// Attach metadata to the output
    #[arg(long = "with-metadata")]
    with_metadata: bool,

    /// Reject documents not in this language (ISO 639-1)
    #[arg(long = "target-language", value_name = "LANG")]
    target_language: Option<String>,

    /// Drop repeated text segments
    #[arg(long)]
    deduplicate: bool,

    /// Load defaults from a TOML profile
    #[arg(long = "config-file", value_name = "FILE")]
    config_file: Option<PathBuf>,

    /// Favor precision (fewer false positives)
    #[arg(long)]
    precision: bool,

    /// Favor recall (fewer missed paragraphs)
    #[arg(long)]
    recall: bool,

    /// Output format: csv, html, json, markdown, txt, xml, xmltei
    #[arg(long = "output-format", value_name = "FORMAT")]
    output_format: Option<String>,

    /// Shorthand for --output-format csv
    #[arg(long)]
    csv: bool,
    /// Shorthand for --output-format html
    #[arg(long)]
    html: bool,
    /// Shorthand for --output-format json
    #[arg(long)]
    json: bool,
    /// Shorthand for --output-format markdown
    #[arg(long)]
    markdown: bool,
    /// Shorthand for --output-format txt
    #[arg(long)]
    txt: bool,
    /// Shorthand for --output-format xml
    #[arg(long)]
    xml: bool,
    /// Shorthand for --output-format xmltei
    #[arg(long)]
    xmltei: bool,

    /// Check that TEI output only uses the allowed vocabulary
    #[arg(long = "validate-tei")]
    validate_tei: bool,

    /// Increase log verbosity (-v, -vv)
    #[arg(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,
}

/// TOML profile mirroring the extraction flags.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigProfile {
    fast: Option<bool>,
    formatting: Option<bool>,
    links: Option<bool>,
    images: Option<bool>,
    comments: Option<bool>,
    tables: Option<bool>,
    deduplicate: Option<bool>,
    with_metadata: Option<bool>,
    only_with_metadata: Option<bool>,
    target_language: Option<String>,
    output_format: Option<String>,
    min_extracted_size: Option<usize>,
    min_output_size: Option<usize>,
    max_file_size: Option<usize>,
    min_file_size: Option<usize>,
}

fn chosen_format(args: &Args) -> anyhow::Result<OutputFormat> {
    if let Some(name) = &args.output_format {
        return Ok(OutputFormat::from_str(name)?);
    }
    let shorthands = [
        (args.csv, OutputFormat::Csv),
        (args.html, OutputFormat::Html),
        (args.json, OutputFormat::Json),
        (args.markdown, OutputFormat::Markdown),
        (args.txt, OutputFormat::Txt),
        (args.xml, OutputFormat::Xml),
        (args.xmltei, OutputFormat::XmlTei),
    ];
    Ok(shorthands
        .into_iter()
        .find_map(|(set, format)| set.then_some(format))
        .unwrap_or(OutputFormat::Txt))
}

fn build_options(args: &Args) -> anyhow::Result<ExtractionOptions> {
    let mut options = ExtractionOptions::default();

    if let Some(path) = &args.config_file {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        let profile: ConfigProfile =
            toml::from_str(&raw).with_context(|| format!("invalid config file {}", path.display()))?;
        apply_profile(&mut options, &profile)?;
    }

    // Flags override the profile.
    options.focus = if args.recall {
        Focus::Recall
    } else if args.precision {
        Focus::Precision
    } else {
        options.focus
    };
    options.fast |= args.fast;
    options.include_formatting |= args.formatting;
    options.include_links |= args.links;
    options.include_images |= args.images;
    if args.no_comments {
        options.include_comments = false;
    }
    if args.no_tables {
        options.include_tables = false;
    }
    options.deduplicate |= args.deduplicate;
    options.with_metadata |= args.with_metadata;
    options.only_with_metadata |= args.only_with_metadata;
    if args.target_language.is_some() {
        options.target_language.clone_from(&args.target_language);
    }
    options.output_format = chosen_format(args)?;

    if let Some(path) = &args.blacklist {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("cannot read blacklist {}", path.display()))?;
        options
            .url_blacklist
            .extend(raw.lines().map(str::trim).filter(|l| !l.is_empty()).map(String::from));
    }

    Ok(options.normalized())
}

fn apply_profile(options: &mut ExtractionOptions, profile: &ConfigProfile) -> anyhow::Result<()> {
    if let Some(v) = profile.fast {
        options.fast = v;
    }
    if let Some(v) = profile.formatting {
        options.include_formatting = v;
    }
    if let Some(v) = profile.links {
        options.include_links = v;
    }
    if let Some(v) = profile.images {
        options.include_images = v;
    }
    if let Some(v) = profile.comments {
        options.include_comments = v;
    }
    if let Some(v) = profile.tables {
        options.include_tables = v;
    }
    if let Some(v) = profile.deduplicate {
        options.deduplicate = v;
    }
    if let Some(v) = profile.with_metadata {
        options.with_metadata = v;
    }
    if let Some(v) = profile.only_with_metadata {
        options.only_with_metadata = v;
    }
    if profile.target_language.is_some() {
        options.target_language.clone_from(&profile.target_language);
    }
    if let Some(name) = &profile.output_format {
        options.output_format = OutputFormat::from_str(name)?;
    }
    if let Some(v) = profile.min_extracted_size {
        options.min_extracted_size = v;
    }
    if let Some(v) = profile.min_output_size {
        options.min_output_size = v;
    }
    if let Some(v) = profile.max_file_size {
        options.max_file_size = v;
    }
    if let Some(v) = profile.min_file_size {
        options.min_file_size = v;
    }
    Ok(())
}

/// Content-addressed file name: the first 12 base64url characters of the
/// MD5 of the tag-stripped result.
fn output_file_name(result: &str, format: OutputFormat) -> String {
    let stripped: String = result.chars().filter(|c| *c != '<' && *c != '>').collect();
    let digest = Md5::digest(stripped.as_bytes());
    let encoded = URL_SAFE_NO_PAD.encode(digest);
    format!("{}.{}", &encoded[..12], format.extension())
}

/// Past `MAX_FILES_PER_DIRECTORY` outputs, spill into numbered
/// subdirectories.
fn output_path(base: &Path, name: &str, count: usize) -> PathBuf {
    if count < MAX_FILES_PER_DIRECTORY {
        base.join(name)
    } else {
        base.join(format!("{}", count / MAX_FILES_PER_DIRECTORY)).join(name)
    }
}

struct Shell {
    options: ExtractionOptions,
    output_dir: Option<PathBuf>,
    backup_dir: Option<PathBuf>,
    keep_dirs: bool,
    validate_tei: bool,
    written: AtomicUsize,
    processed: AtomicUsize,
    failed: AtomicUsize,
}

impl Shell {
    fn record_error(&self, source: &str, message: &str) {
        eprintln!("ERROR: {source}: {message}");
        self.failed.fetch_add(1, Ordering::Relaxed);
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    fn process_bytes(&self, source: &str, bytes: &[u8], relative: Option<&Path>) {
        self.processed.fetch_add(1, Ordering::Relaxed);

        if let (Some(backup), Some(relative)) = (&self.backup_dir, relative) {
            let target = backup.join(relative);
            if let Some(parent) = target.parent() {
                let _ = fs::create_dir_all(parent);
            }
            let _ = fs::write(&target, bytes);
        }

        let Some(result) = extract(bytes, &self.options) else {
            eprintln!("ERROR: {source}: no content extracted");
            self.failed.fetch_add(1, Ordering::Relaxed);
            return;
        };

        if self.validate_tei && self.options.output_format == OutputFormat::XmlTei {
            if let Err(message) = validate_tei_output(&result) {
                eprintln!("ERROR: {source}: {message}");
                self.failed.fetch_add(1, Ordering::Relaxed);
                return;
            }
        }

        match &self.output_dir {
            None => println!("{result}"),
            Some(dir) => {
                let path = if self.keep_dirs {
                    let relative = relative.map_or_else(
                        || PathBuf::from(output_file_name(&result, self.options.output_format)),
                        Path::to_path_buf,
                    );
                    dir.join(relative)
                        .with_extension(self.options.output_format.extension())
                } else {
                    let count = self.written.fetch_add(1, Ordering::Relaxed);
                    let name = output_file_name(&result, self.options.output_format);
                    output_path(dir, &name, count)
                };
                if let Some(parent) = path.parent() {
                    if let Err(err) = fs::create_dir_all(parent) {
                        self.record_error(source, &format!("cannot create {}: {err}", parent.display()));
                        return;
                    }
                }
                if let Err(err) = fs::write(&path, &result) {
                    eprintln!("ERROR: {source}: cannot write {}: {err}", path.display());
                    self.failed.fetch_add(1, Ordering::Relaxed);
                } else {
                    debug!(path = %path.display(), "output written");
                }
            }
        }
    }
}

/// Closed-vocabulary check over a TEI body.
fn validate_tei_output(tei: &str) -> Result<(), String> {
    let Some(start) = tei.find("<text>") else {
        return Err("TEI output has no <text> element".to_string());
    };
    let body = &tei[start..];
    let tag_pattern = regex::Regex::new(r"</?([a-zA-Z]+)").map_err(|e| e.to_string())?;
    for capture in tag_pattern.captures_iter(body) {
        let name = &capture[1];
        if name != "text" && !websift::output::tei::TEI_BODY_TAGS.contains(&name) {
            return Err(format!("tag <{name}> outside the TEI vocabulary"));
        }
    }
    Ok(())
}

fn collect_input_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .collect()
}

fn url_passes_filters(url: &str, filters: &[String]) -> bool {
    filters.is_empty() || filters.iter().any(|f| url.contains(f))
}

fn main() {
    let args = Args::parse();

    let level = match args.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(io::stderr)
        .init();

    let options = match build_options(&args) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("ERROR: {err}");
            eprintln!("Usage: websift [OPTIONS]  (see --help)");
            std::process::exit(2);
        }
    };

    let shell = Shell {
        options,
        output_dir: args.output_dir.clone(),
        backup_dir: args.backup_dir.clone(),
        keep_dirs: args.keep_dirs,
        validate_tei: args.validate_tei,
        written: AtomicUsize::new(0),
        processed: AtomicUsize::new(0),
        failed: AtomicUsize::new(0),
    };

    // Remote inputs need the downloader collaborator.
    for (flag, value) in [
        ("--URL", &args.url),
        ("--feed", &args.feed),
        ("--sitemap", &args.sitemap),
        ("--crawl", &args.crawl),
        ("--explore", &args.explore),
        ("--probe", &args.probe),
    ] {
        if let Some(target) = value {
            if !url_passes_filters(target, &args.url_filter) {
                continue;
            }
            shell.record_error(target, &format!("{flag} requires a downloader, none available"));
        }
    }

    if let Some(dir) = &args.input_dir {
        let files = collect_input_files(dir);
        if args.list {
            for file in &files {
                println!("{}", file.display());
            }
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(args.parallel.max(1))
                .build();
            match pool {
                Ok(pool) => pool.install(|| {
                    files.par_iter().for_each(|file| match fs::read(file) {
                        Ok(bytes) => {
                            let relative = file.strip_prefix(dir).unwrap_or(file);
                            shell.process_bytes(
                                &file.display().to_string(),
                                &bytes,
                                Some(relative),
                            );
                        }
                        Err(err) => {
                            shell.record_error(&file.display().to_string(), &err.to_string());
                        }
                    });
                }),
                Err(err) => {
                    eprintln!("ERROR: thread pool: {err}");
                    std::process::exit(2);
                }
            }
        }
    } else if let Some(file) = &args.input_file {
        match fs::read(file) {
            Ok(bytes) => {
                let relative = file.file_name().map(Path::new);
                shell.process_bytes(&file.display().to_string(), &bytes, relative);
            }
            Err(err) => shell.record_error(&file.display().to_string(), &err.to_string()),
        }
    } else if args.url.is_none()
        && args.feed.is_none()
        && args.sitemap.is_none()
        && args.crawl.is_none()
        && args.explore.is_none()
        && args.probe.is_none()
    {
        // Default: read one document from stdin.
        let mut buffer = Vec::new();
        match io::stdin().read_to_end(&mut buffer) {
            Ok(_) => shell.process_bytes("stdin", &buffer, None),
            Err(err) => shell.record_error("stdin", &err.to_string()),
        }
    }

    let processed = shell.processed.load(Ordering::Relaxed);
    let failed = shell.failed.load(Ordering::Relaxed);
    if failed == 0 || processed == 0 {
        std::process::exit(0);
    }
    #[allow(clippy::cast_precision_loss)]
    let failure_rate = failed as f64 / processed as f64;
    if failure_rate > 0.99 {
        std::process::exit(126);
    }
    std::process::exit(1);
}
