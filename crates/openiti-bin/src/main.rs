//! openiti-meta CLI
//!
//! Collects the metadata of an OpenITI corpus checkout into the master table
//! and its companion JSON/YAML/CSV artifacts.
//!
//! Settings come from an optional YAML config file; flags override it.

use std::path::PathBuf;

use clap::Parser;
use openiti_core::output::summary;
use openiti_core::{aggregate, ArtifactWriter, Layout, MetadataConfig, PhysicalFileSystem, Resources};

#[derive(Parser)]
#[command(name = "openiti-meta")]
#[command(author, version, about = "Aggregate the metadata of an OpenITI corpus", long_about = None)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Corpus root (overrides corpus_path)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output folder (overrides output.output_path)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Sidecars and texts lie directly in the corpus root
    #[arg(long, conflicts_with = "release")]
    flat: bool,

    /// Release layout: {author}/{book}/ without 25-year repositories
    #[arg(long)]
    release: bool,

    /// Add the char_length column
    #[arg(long)]
    char_length: bool,

    /// Separate Arabic-script and transliterated columns
    #[arg(long)]
    split_ar_lat: bool,

    /// Recount every text, even when its sidecar has a length
    #[arg(long)]
    recount: bool,

    /// Folder name to skip (repeatable)
    #[arg(long)]
    exclude: Vec<String>,

    /// Source-library tags file (`id\ttag;tag`)
    #[arg(long)]
    tags: Option<PathBuf>,

    /// Gazetteer of known place authority codes
    #[arg(long)]
    gazetteer: Option<PathBuf>,

    /// Folder of manuscript and location sidecars
    #[arg(long)]
    manuscripts: Option<PathBuf>,

    /// Exported tracker issues (JSON array)
    #[arg(long)]
    issues: Option<PathBuf>,

    /// Prefix replacing the corpus path in the url column
    #[arg(long)]
    files_url: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Print the effective configuration as YAML and exit
    #[arg(long)]
    dump_config: bool,
}

impl Cli {
    fn apply(self, config: &mut MetadataConfig) {
        if let Some(input) = self.input {
            config.corpus_path = input;
        }
        if let Some(output) = self.output {
            config.output.output_path = output;
        }
        if self.flat {
            config.layout = Layout::Flat;
        } else if self.release {
            config.layout = Layout::Release;
        }
        config.incl_char_length |= self.char_length;
        config.split_ar_lat |= self.split_ar_lat;
        config.recount |= self.recount;
        config.exclude.extend(self.exclude);
        if self.tags.is_some() {
            config.tags_path = self.tags;
        }
        if self.gazetteer.is_some() {
            config.gazetteer_path = self.gazetteer;
        }
        if self.manuscripts.is_some() {
            config.manuscripts_path = self.manuscripts;
        }
        if self.issues.is_some() {
            config.issues_path = self.issues;
        }
        if self.files_url.is_some() {
            config.output.output_files_path = self.files_url;
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let mut config = match &cli.config {
        Some(path) => MetadataConfig::load(path)?,
        None => MetadataConfig::default(),
    };
    let dump_config = cli.dump_config;
    cli.apply(&mut config);

    if dump_config {
        print!("{}", config.to_yaml()?);
        return Ok(());
    }
    config.validate()?;

    let fs = PhysicalFileSystem;
    let resources = Resources::load(&config, &fs)?;
    let agg = aggregate(&config, &fs, &resources);
    let written = ArtifactWriter::new(&config, &fs).write_all(&agg, &resources.issues)?;

    for (id, files) in &agg.report.duplicate_ids {
        println!("DUPLICATE ID: {} ({})", id, files.join(", "));
    }
    for resolution in &agg.report.ambiguous {
        println!(
            "AMBIGUOUS PRIMARY: {} ({})",
            resolution.group,
            resolution.primaries.join(", ")
        );
    }
    for (label, count) in summary(&agg) {
        println!("{:>24}: {}", label, count);
    }
    println!("{} diagnostics, {} files written", agg.report.diagnostics.len(), written.len());
    Ok(())
}
