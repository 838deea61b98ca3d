use crate::core::report::{REPORT_FILE, SplitReport, SubsetCounts};
use crate::core::scanner::{ScanError, list_images};
use crate::progress::ProgressObserver;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, FileTimes};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Folder, inside the split directory, that holds one folder per subset.
pub const IMAGES_DIR: &str = "images";

/// Allowed distance of the percentage sum from 100.
pub const RATIO_TOLERANCE: f64 = 0.01;

#[derive(Debug, Error)]
pub enum SplitError {
    #[error("Dataset split failed: {0}")]
    Scan(#[from] ScanError),

    #[error("Failed to create directory {path:?}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("Failed to copy {from:?} → {to:?}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },

    #[error("Failed to count images after split: {0}")]
    Recount(ScanError),

    #[error("Failed to write split report {path:?}: {source}")]
    WriteReport { path: PathBuf, source: io::Error },
}

#[derive(Debug, Error, PartialEq)]
pub enum RatioError {
    #[error("{subset} percentage must be between 0 and 100, got {value}")]
    OutOfRange { subset: &'static str, value: f64 },

    #[error("Percentages must add up to 100, got {sum}")]
    BadSum { sum: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subset {
    Train,
    Val,
    Test,
}

impl Subset {
    pub const ALL: [Subset; 3] = [Subset::Train, Subset::Val, Subset::Test];

    pub fn dir_name(self) -> &'static str {
        match self {
            Subset::Train => "train",
            Subset::Val => "val",
            Subset::Test => "test",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Subset::Train => "Train",
            Subset::Val => "Validation",
            Subset::Test => "Test",
        }
    }
}

/// Train/val/test shares in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitRatios {
    pub train: f64,
    pub val: f64,
    pub test: f64,
}

impl Default for SplitRatios {
    fn default() -> Self {
        Self {
            train: 70.0,
            val: 15.0,
            test: 15.0,
        }
    }
}

impl SplitRatios {
    pub fn new(train: f64, val: f64, test: f64) -> Self {
        Self { train, val, test }
    }

    pub fn get(&self, subset: Subset) -> f64 {
        match subset {
            Subset::Train => self.train,
            Subset::Val => self.val,
            Subset::Test => self.test,
        }
    }

    /// Check that each share is within [0, 100] and that they add up to 100.
    ///
    /// The splitter itself trusts its input; front ends call this first.
    pub fn validate(&self) -> Result<(), RatioError> {
        for subset in Subset::ALL {
            let value = self.get(subset);
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                return Err(RatioError::OutOfRange {
                    subset: subset.dir_name(),
                    value,
                });
            }
        }

        let sum = self.train + self.val + self.test;
        if (sum - 100.0).abs() > RATIO_TOLERANCE {
            return Err(RatioError::BadSum { sum });
        }
        Ok(())
    }
}

/// Number of files a percentage claims out of `total`, truncated.
fn share(total: usize, pct: f64) -> usize {
    (total as f64 * pct / 100.0) as usize
}

/// Three disjoint slices of one shuffled file list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitAssignment {
    pub train: Vec<PathBuf>,
    pub val: Vec<PathBuf>,
    pub test: Vec<PathBuf>,
}

impl SplitAssignment {
    /// Shuffle `files` and cut them into train, val and test.
    ///
    /// Train and val sizes are truncated, so test takes whatever is left.
    pub fn assign<R: Rng + ?Sized>(mut files: Vec<PathBuf>, ratios: &SplitRatios, rng: &mut R) -> Self {
        files.shuffle(rng);

        let total = files.len();
        let train_count = share(total, ratios.train).min(total);
        let val_count = share(total, ratios.val).min(total - train_count);

        let test = files.split_off(train_count + val_count);
        let val = files.split_off(train_count);
        Self {
            train: files,
            val,
            test,
        }
    }

    pub fn get(&self, subset: Subset) -> &[PathBuf] {
        match subset {
            Subset::Train => &self.train,
            Subset::Val => &self.val,
            Subset::Test => &self.test,
        }
    }

    pub fn counts(&self) -> SubsetCounts {
        SubsetCounts {
            train: self.train.len(),
            val: self.val.len(),
            test: self.test.len(),
        }
    }
}

/// Split the images in `dir` into `dir/images/{train,val,test}` using the
/// thread-local RNG. See [`split_dataset_with_rng`].
pub fn split_dataset(
    dir: &Path,
    ratios: &SplitRatios,
    observer: &dyn ProgressObserver,
) -> Result<SplitReport, SplitError> {
    split_dataset_with_rng(dir, ratios, &mut rand::thread_rng(), observer)
}

/// Copy a random partition of the images in `dir` into one folder per subset
/// and write `split_log.txt` next to them.
///
/// Source files are left untouched. Files already present in the subset
/// folders are overwritten when names collide and otherwise kept, which is
/// why the report carries a recount from disk.
pub fn split_dataset_with_rng<R: Rng + ?Sized>(
    dir: &Path,
    ratios: &SplitRatios,
    rng: &mut R,
    observer: &dyn ProgressObserver,
) -> Result<SplitReport, SplitError> {
    let files = list_images(dir)?;
    let total = files.len();
    let assignment = SplitAssignment::assign(files, ratios, rng);
    log::info!(
        "Splitting {} images from {} into {:?}",
        total,
        dir.display(),
        assignment.counts()
    );

    let images_root = dir.join(IMAGES_DIR);
    for subset in Subset::ALL {
        let dest_dir = images_root.join(subset.dir_name());
        fs::create_dir_all(&dest_dir).map_err(|source| SplitError::CreateDir {
            path: dest_dir.clone(),
            source,
        })?;

        let files = assignment.get(subset);
        for src in files {
            let Some(file_name) = src.file_name() else {
                continue;
            };
            let dest = dest_dir.join(file_name);
            copy_with_metadata(src, &dest).map_err(|source| SplitError::Copy {
                from: src.clone(),
                to: dest.clone(),
                source,
            })?;
        }

        observer.on_log(&format!(
            "✓ {}: {} files",
            subset.dir_name().to_uppercase(),
            files.len()
        ));
    }

    let mut on_disk = SubsetCounts::default();
    for subset in Subset::ALL {
        let count = list_images(&images_root.join(subset.dir_name()))
            .map_err(SplitError::Recount)?
            .len();
        on_disk.set(subset, count);
    }

    let report = SplitReport {
        assigned: assignment.counts(),
        on_disk,
        report_path: dir.join(REPORT_FILE),
    };
    report.write().map_err(|source| SplitError::WriteReport {
        path: report.report_path.clone(),
        source,
    })?;

    Ok(report)
}

/// `fs::copy` carries permissions; timestamps are restored on a best-effort basis.
fn copy_with_metadata(src: &Path, dest: &Path) -> io::Result<()> {
    fs::copy(src, dest)?;

    let metadata = fs::metadata(src)?;
    let mut times = FileTimes::new();
    if let Ok(modified) = metadata.modified() {
        times = times.set_modified(modified);
    }
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }
    if let Err(e) = File::options()
        .write(true)
        .open(dest)
        .and_then(|f| f.set_times(times))
    {
        log::warn!("Could not preserve timestamps on {}: {}", dest.display(), e);
    }
    Ok(())
}
