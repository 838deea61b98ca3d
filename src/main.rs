use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use dialoguer::Confirm;
use imagepro::Settings;
use imagepro::core::duplicate::{DuplicateFinder, DuplicateGroup, QUARANTINE_DIR, moved_count};
use imagepro::core::hash::{HashAlgorithm, HashSettings, MAX_HASH_SIZE, MIN_HASH_SIZE};
use imagepro::core::scanner::list_images;
use imagepro::core::split::{SplitRatios, split_dataset, split_dataset_with_rng};
use imagepro::progress::{CancellationToken, ProgressEvent, ProgressObserver};
use indicatif::{ProgressBar, ProgressStyle};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(
    name = "imagepro",
    version,
    about = "Find duplicate images and split image folders into train/val/test sets"
)]
struct Cli {
    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Count the supported images in a folder
    Stats {
        /// Folder to inspect
        #[arg(short, long, value_name = "DIR")]
        path: PathBuf,
    },

    /// Move perceptual duplicates into `<dir>/Duplicate`
    Duplicates {
        /// Folder to scan (not recursive)
        #[arg(short, long, value_name = "DIR")]
        path: PathBuf,
        /// Do not ask for confirmation before moving files
        #[arg(short, long)]
        yes: bool,
        /// Hash algorithm (default: saved setting)
        #[arg(long, value_enum)]
        algorithm: Option<AlgorithmArg>,
        /// Hash grid size in bits per side (default: saved setting)
        #[arg(long, value_parser = clap::value_parser!(u32).range(MIN_HASH_SIZE as i64..=MAX_HASH_SIZE as i64))]
        hash_size: Option<u32>,
    },

    /// Copy a random train/val/test split into `<dir>/images`
    Split {
        /// Folder holding the images (not recursive)
        #[arg(short, long, value_name = "DIR")]
        path: PathBuf,
        #[command(flatten)]
        ratios: RatioArgs,
        /// Seed for a reproducible split
        #[arg(long)]
        seed: Option<u64>,
        /// Remember the percentages used as the new defaults
        #[arg(long)]
        save_defaults: bool,
    },

    /// Show or change the saved defaults
    Settings {
        #[command(subcommand)]
        command: SettingsCmd,
    },
}

#[derive(Subcommand, Debug)]
enum SettingsCmd {
    /// Print the current settings and where they live
    Show,

    /// Update saved defaults
    Set {
        #[command(flatten)]
        ratios: RatioArgs,
        #[arg(long, value_enum)]
        algorithm: Option<AlgorithmArg>,
        #[arg(long, value_parser = clap::value_parser!(u32).range(MIN_HASH_SIZE as i64..=MAX_HASH_SIZE as i64))]
        hash_size: Option<u32>,
    },

    /// Restore the built-in defaults
    Reset,
}

#[derive(clap::Args, Debug)]
struct RatioArgs {
    /// Train percentage (default: saved setting)
    #[arg(long, value_name = "PCT")]
    train: Option<f64>,
    /// Validation percentage (default: saved setting)
    #[arg(long, value_name = "PCT")]
    val: Option<f64>,
    /// Test percentage (default: saved setting)
    #[arg(long, value_name = "PCT")]
    test: Option<f64>,
}

impl RatioArgs {
    fn over(&self, saved: SplitRatios) -> SplitRatios {
        SplitRatios::new(
            self.train.unwrap_or(saved.train),
            self.val.unwrap_or(saved.val),
            self.test.unwrap_or(saved.test),
        )
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum AlgorithmArg {
    Perceptual,
    Mean,
    Gradient,
    DoubleGradient,
    Blockhash,
}

impl From<AlgorithmArg> for HashAlgorithm {
    fn from(arg: AlgorithmArg) -> Self {
        match arg {
            AlgorithmArg::Perceptual => HashAlgorithm::Perceptual,
            AlgorithmArg::Mean => HashAlgorithm::Mean,
            AlgorithmArg::Gradient => HashAlgorithm::Gradient,
            AlgorithmArg::DoubleGradient => HashAlgorithm::DoubleGradient,
            AlgorithmArg::Blockhash => HashAlgorithm::Blockhash,
        }
    }
}

/// Prints split log lines as they arrive.
struct ConsoleLog;

impl ProgressObserver for ConsoleLog {
    fn on_log(&self, message: &str) {
        println!("   {}", message);
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Only the commands that write settings need a resolvable location.
    let settings_path = Settings::default_path();
    let settings = Settings::load_or_default(settings_path.as_deref().ok());

    match cli.command {
        Commands::Stats { path } => {
            let images = list_images(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            println!("📁 Found {} images in {}", images.len(), path.display());
        }

        Commands::Duplicates {
            path,
            yes,
            algorithm,
            hash_size,
        } => {
            let hash = HashSettings {
                algorithm: algorithm.map(Into::into).unwrap_or(settings.hash.algorithm),
                hash_size: hash_size.unwrap_or(settings.hash.hash_size),
            };

            println!("▶ Scanning for duplicates in: {}", path.display());
            if !yes {
                let proceed = Confirm::new()
                    .with_prompt(format!(
                        "Duplicates will be moved into {}. Continue?",
                        path.join(QUARANTINE_DIR).display()
                    ))
                    .default(false)
                    .interact()
                    .context("Failed to read confirmation")?;
                if !proceed {
                    println!("Operation cancelled.");
                    return Ok(());
                }
            }

            let (groups, stopped) = benchmark(&format!("{} hashing", hash.algorithm), || {
                run_duplicate_scan(&path, hash)
            })?;
            if stopped {
                println!("⏹ Stopped by user; results cover the files checked so far.");
            }
            print_groups(&path, &groups);
        }

        Commands::Split {
            path,
            ratios,
            seed,
            save_defaults,
        } => {
            let ratios = ratios.over(settings.split);
            ratios.validate().context("Invalid split percentages")?;

            println!(
                "⚡ Splitting {} into {}/{}/{}",
                path.display(),
                ratios.train,
                ratios.val,
                ratios.test
            );
            let report = match seed {
                Some(seed) => {
                    split_dataset_with_rng(&path, &ratios, &mut StdRng::seed_from_u64(seed), &ConsoleLog)
                }
                None => split_dataset(&path, &ratios, &ConsoleLog),
            }
            .with_context(|| format!("Failed to split {}", path.display()))?;

            if save_defaults {
                let updated = Settings {
                    split: ratios,
                    ..settings
                };
                updated.save_to(&settings_path?)?;
            }

            println!(
                "✅ Dataset split complete. Report written to {}",
                report.report_path.display()
            );
        }

        Commands::Settings { command } => {
            let settings_path = settings_path?;
            match command {
                SettingsCmd::Show => {
                    println!("🗂️  Settings ({}):", settings_path.display());
                    println!("{}", serde_json::to_string_pretty(&settings)?);
                }

                SettingsCmd::Set {
                    ratios,
                    algorithm,
                    hash_size,
                } => {
                    let split = ratios.over(settings.split);
                    split.validate().context("Invalid split percentages")?;
                    let updated = Settings {
                        split,
                        hash: HashSettings {
                            algorithm: algorithm.map(Into::into).unwrap_or(settings.hash.algorithm),
                            hash_size: hash_size.unwrap_or(settings.hash.hash_size),
                        },
                    };
                    updated.save_to(&settings_path)?;
                    println!("✅ Saved settings to {}", settings_path.display());
                }

                SettingsCmd::Reset => {
                    Settings::default().save_to(&settings_path)?;
                    println!("🧹 Restored default settings in {}", settings_path.display());
                }
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

/// Hash on a worker thread while this thread draws the progress bar.
/// Returns the groups and whether Ctrl-C cut the scan short.
fn run_duplicate_scan(dir: &Path, hash: HashSettings) -> Result<(Vec<DuplicateGroup>, bool)> {
    let cancel = CancellationToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || handler_token.cancel())
        .context("Failed to install Ctrl-C handler")?;

    let (tx, rx) = mpsc::channel::<ProgressEvent>();
    let worker_dir = dir.to_path_buf();
    let worker_token = cancel.clone();
    let worker = thread::spawn(move || {
        DuplicateFinder::new(hash).find_duplicates(&worker_dir, &tx, &worker_token)
    });

    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );
    // The channel closes when the worker drops its sender.
    for event in rx {
        match event {
            ProgressEvent::Progress {
                current,
                total,
                message,
            } => {
                bar.set_length(total as u64);
                bar.set_position(current as u64);
                bar.set_message(message);
            }
            ProgressEvent::Log(line) => bar.println(line),
        }
    }
    bar.finish_and_clear();

    let groups = worker
        .join()
        .map_err(|_| anyhow!("Duplicate scan thread panicked"))?
        .with_context(|| format!("Duplicate scan of {} failed", dir.display()))?;
    Ok((groups, cancel.is_cancelled()))
}

fn print_groups(dir: &Path, groups: &[DuplicateGroup]) {
    if groups.is_empty() {
        println!("No duplicates found.");
        return;
    }

    let dup_dir = dir.join(QUARANTINE_DIR);
    println!("Found {} duplicate group(s):", groups.len());
    for (i, group) in groups.iter().enumerate() {
        println!("\n✨ Group {}:", i + 1);
        println!("   🏆 Keeping → {}", group.original().display());
        for dup in group.redundant() {
            let name = dup.file_name().map(PathBuf::from).unwrap_or_default();
            println!("   📦 Moved {} → {}", dup.display(), dup_dir.join(name).display());
        }
    }
    println!(
        "\n✅ Moved {} file(s) into {}",
        moved_count(groups),
        dup_dir.display()
    );
}

/// Run `f()`, log how long it took (with `label`), and return its result.
fn benchmark<T, F: FnOnce() -> T>(label: &str, f: F) -> T {
    let start = Instant::now();
    let result = f();
    log::info!("⏱ {} took {:.2?}", label, start.elapsed());
    result
}
