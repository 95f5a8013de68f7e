//! zipignore-cli - Command-line interface for zipignore
//!
//! Packs directories into ZIP archives while honouring `.gitignore`-style
//! rules, extracts and lists archives, and shows which rules apply where.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use zipignore_core::archive::{self, ExtractOptions, PackOptions};
use zipignore_core::{Config, IgnoreSources};

mod output;

/// zipignore - ZIP archives that respect your ignore files
#[derive(Parser)]
#[command(name = "zipignore")]
#[command(author, version, about = "Create ZIP archives that honour .gitignore-style rules", long_about = None)]
struct Cli {
    /// Enable verbose output for debugging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Where ignore rules come from, shared by `create` and `rules`
#[derive(Args, Debug, Clone, Default)]
struct IgnoreArgs {
    /// Additional ignore files to use
    #[arg(short = 'i', long = "ignore-file", value_name = "FILE", num_args = 1..)]
    ignore_files: Vec<PathBuf>,

    /// Additional ignore patterns
    #[arg(short = 'p', long = "pattern", value_name = "PATTERN", num_args = 1..)]
    patterns: Vec<String>,

    /// Also load files in the source directory whose names match this glob
    #[arg(long, value_name = "GLOB")]
    ignore_pattern: Option<String>,

    /// Skip automatic loading of other .*ignore files
    #[arg(long)]
    no_auto_ignore: bool,

    /// Match rules with a leading '/' only at the source root
    #[arg(long)]
    strict_anchoring: bool,
}

impl IgnoreArgs {
    /// Layer command-line sources over the configured ones
    fn sources(&self, config: &Config) -> IgnoreSources {
        let mut sources = IgnoreSources::from_config(&config.ignore);
        sources.ignore_files = self.ignore_files.clone();
        sources.patterns.extend(self.patterns.iter().cloned());
        sources.ignore_pattern = self.ignore_pattern.clone();
        if self.no_auto_ignore {
            sources.auto_ignore = false;
        }
        if self.strict_anchoring {
            sources.strict_anchoring = true;
        }
        sources
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create a ZIP archive from a directory
    Create {
        /// Directory to archive
        source: PathBuf,

        /// ZIP file to write
        output: PathBuf,

        /// Compression level (0-9, 0 stores without compression)
        #[arg(short = 'c', long = "compression", value_name = "LEVEL",
              value_parser = clap::value_parser!(u32).range(0..=9))]
        compression: Option<u32>,

        #[command(flatten)]
        ignore: IgnoreArgs,

        /// Print the files that would be archived without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Extract a ZIP archive
    Extract {
        /// ZIP file to extract
        input: PathBuf,

        /// Output directory
        output: PathBuf,

        /// Overwrite existing files
        #[arg(short, long)]
        force: bool,
    },

    /// List the contents of a ZIP archive
    List {
        /// ZIP file to list
        input: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the ignore rules that apply to a directory
    Rules {
        /// Directory to inspect
        #[arg(default_value = ".")]
        directory: PathBuf,

        #[command(flatten)]
        ignore: IgnoreArgs,
    },

    /// Show or initialize configuration
    Config {
        /// Show current configuration
        #[arg(long, conflicts_with_all = ["path", "init"])]
        show: bool,

        /// Show configuration file path
        #[arg(long, conflicts_with_all = ["show", "init"])]
        path: bool,

        /// Write a default configuration file if none exists
        #[arg(long, conflicts_with_all = ["show", "path"])]
        init: bool,
    },
}

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let result = run();

    match result {
        Ok(_) => process::exit(0),
        Err(e) => {
            error!("{:#}", e);

            let exit_code = map_error_to_exit_code(&e);
            process::exit(exit_code);
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Create {
            source,
            output,
            compression,
            ignore,
            dry_run,
        } => {
            let config = Config::load()?;
            let options = PackOptions {
                compression_level: compression.unwrap_or(config.archive.compression_level),
                sources: ignore.sources(&config),
                ..PackOptions::from_config(&config)
            };

            if dry_run {
                let files = archive::collect_files(&source, Some(&output), &options)?;
                for file in &files {
                    println!("{}", file.relative_path);
                }
                println!("{} files would be archived", files.len());
            } else {
                let report = archive::pack(&source, &output, &options)?;
                info!(
                    "ZIP created successfully: {} ({} files, {} bytes)",
                    output.display(),
                    report.files,
                    report.bytes
                );
            }
        }

        Commands::Extract {
            input,
            output,
            force,
        } => {
            let config = Config::load()?;
            let options = ExtractOptions {
                overwrite: force || ExtractOptions::from_config(&config).overwrite,
            };

            let report = archive::extract(&input, &output, &options)?;
            info!(
                "ZIP extracted successfully to: {} ({} files, {} skipped)",
                output.display(),
                report.extracted,
                report.skipped_existing + report.skipped_unsafe
            );
        }

        Commands::List { input, json } => {
            let entries = archive::list(&input)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                print!("{}", output::format_listing(&input, &entries)?);
            }
        }

        Commands::Rules { directory, ignore } => {
            if !directory.is_dir() {
                return Err(zipignore_core::Error::NotFound(format!(
                    "Directory does not exist: {}",
                    directory.display()
                ))
                .into());
            }

            let config = Config::load()?;
            let resolver = ignore.sources(&config).build_resolver(&directory)?;
            print!("{}", output::format_rules(&directory, resolver.rules())?);
        }

        Commands::Config { show, path, init } => {
            if show {
                let config = Config::load()?;
                let rendered = toml::to_string_pretty(&config)
                    .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
                print!("{}", rendered);
            } else if path {
                println!("{}", Config::config_path()?.display());
            } else if init {
                let (config_path, created) = Config::init()?;
                if created {
                    println!("Created {}", config_path.display());
                } else {
                    println!("Configuration already exists at {}", config_path.display());
                }
            } else {
                eprintln!("Please specify --show, --path, or --init");
            }
        }
    }

    Ok(())
}

/// Map errors to exit codes:
/// - 0: Success
/// - 1: General or configuration error
/// - 2: IO error or missing input
/// - 3: Invalid path or unsafe archive entry
/// - 4: ZIP format error
fn map_error_to_exit_code(err: &anyhow::Error) -> i32 {
    use zipignore_core::Error;

    if let Some(core_err) = err.downcast_ref::<Error>() {
        match core_err {
            Error::Io(_) => 2,
            Error::Walk { .. } => 2,
            Error::NotFound(_) => 2,
            Error::InvalidPath(_) => 3,
            Error::SecurityError(_) => 3,
            Error::Zip(_) => 4,
            Error::Config(_) => 1,
        }
    } else if err.is::<std::io::Error>() {
        2
    } else {
        1
    }
}
