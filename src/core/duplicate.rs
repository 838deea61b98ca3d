use crate::core::hash::{HashSettings, PerceptualHasher};
use crate::core::scanner::{ScanError, list_images};
use crate::progress::{CancellationToken, ProgressObserver};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the folder, inside the scanned directory, that receives redundant copies.
pub const QUARANTINE_DIR: &str = "Duplicate";

#[derive(Debug, Error)]
pub enum DuplicateError {
    #[error("Duplicate scan failed: {0}")]
    Scan(#[from] ScanError),

    #[error("Failed to create quarantine directory {path:?}: {source}")]
    CreateQuarantine {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to move {from:?} → {to:?}: {source}")]
    Relocate {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
}

/// A scanned image and its hash, if it could be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub path: PathBuf,
    pub hash: Option<String>,
}

/// Images sharing one hash. The first entry is the one kept in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    pub hash: String,
    pub images: Vec<PathBuf>,
}

impl DuplicateGroup {
    pub fn original(&self) -> &Path {
        &self.images[0]
    }

    pub fn redundant(&self) -> &[PathBuf] {
        &self.images[1..]
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Number of files a set of groups sends to quarantine.
pub fn moved_count(groups: &[DuplicateGroup]) -> usize {
    groups.iter().map(|g| g.redundant().len()).sum()
}

pub struct DuplicateFinder {
    hasher: PerceptualHasher,
}

impl DuplicateFinder {
    pub fn new(settings: HashSettings) -> Self {
        Self {
            hasher: PerceptualHasher::new(settings),
        }
    }

    /// Hash every image in `dir`, group identical hashes and move all but the
    /// first image of each group into `dir/Duplicate`.
    ///
    /// Cancellation stops the scan before the next file; the files hashed so
    /// far are still grouped and relocated.
    pub fn find_duplicates(
        &self,
        dir: &Path,
        observer: &dyn ProgressObserver,
        cancel: &CancellationToken,
    ) -> Result<Vec<DuplicateGroup>, DuplicateError> {
        let files = self.hash_images(dir, observer, cancel)?;
        let groups = group_by_hash(&files);

        if !groups.is_empty() {
            relocate(dir, &groups)?;
        }

        log::info!(
            "Found {} duplicate group(s) in {}",
            groups.len(),
            dir.display()
        );
        Ok(groups)
    }

    fn hash_images(
        &self,
        dir: &Path,
        observer: &dyn ProgressObserver,
        cancel: &CancellationToken,
    ) -> Result<Vec<ImageFile>, DuplicateError> {
        let paths = list_images(dir)?;
        let total = paths.len();
        let mut files = Vec::with_capacity(total);

        for (idx, path) in paths.into_iter().enumerate() {
            if cancel.is_cancelled() {
                log::info!("Scan cancelled after {} of {} files", idx, total);
                break;
            }

            let hash = match self.hasher.hash_file(&path) {
                Ok(hash) => Some(hash),
                Err(e) => {
                    log::debug!("Skipping {}: {}", path.display(), e);
                    None
                }
            };
            files.push(ImageFile { path, hash });

            let current = idx + 1;
            observer.on_progress(
                current,
                total,
                &format!("Checked {}/{} files", current, total),
            );
        }

        Ok(files)
    }
}

impl Default for DuplicateFinder {
    fn default() -> Self {
        Self::new(HashSettings::default())
    }
}

/// [`DuplicateFinder::find_duplicates`] with the default hash settings.
pub fn find_duplicates(
    dir: &Path,
    observer: &dyn ProgressObserver,
    cancel: &CancellationToken,
) -> Result<Vec<DuplicateGroup>, DuplicateError> {
    DuplicateFinder::default().find_duplicates(dir, observer, cancel)
}

/// Group files by hash, keeping discovery order both across and within groups.
/// Files without a hash and single-member groups are dropped.
pub fn group_by_hash(files: &[ImageFile]) -> Vec<DuplicateGroup> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<DuplicateGroup> = Vec::new();

    for file in files {
        let Some(hash) = file.hash.as_deref() else {
            continue;
        };
        match index.get(hash) {
            Some(&i) => groups[i].images.push(file.path.clone()),
            None => {
                index.insert(hash, groups.len());
                groups.push(DuplicateGroup {
                    hash: hash.to_string(),
                    images: vec![file.path.clone()],
                });
            }
        }
    }

    groups.retain(|g| g.len() > 1);
    groups
}

fn relocate(dir: &Path, groups: &[DuplicateGroup]) -> Result<(), DuplicateError> {
    let dup_dir = dir.join(QUARANTINE_DIR);
    fs::create_dir_all(&dup_dir).map_err(|source| DuplicateError::CreateQuarantine {
        path: dup_dir.clone(),
        source,
    })?;

    let mut moved: HashSet<&Path> = HashSet::new();
    for group in groups {
        for dup in group.redundant() {
            if !moved.insert(dup.as_path()) {
                continue;
            }
            let Some(file_name) = dup.file_name() else {
                continue;
            };
            let dest = dup_dir.join(file_name);
            fs::rename(dup, &dest).map_err(|source| DuplicateError::Relocate {
                from: dup.clone(),
                to: dest.clone(),
                source,
            })?;
            log::debug!("Moved {} → {}", dup.display(), dest.display());
        }
    }

    Ok(())
}
