//! Duplicate image detection and dataset splitting.
//!
//! The two operations live in [`core`]: [`core::duplicate`] groups images by
//! perceptual hash and quarantines the redundant copies, [`core::split`]
//! partitions a folder into train/val/test subsets. Both report through a
//! [`progress::ProgressObserver`] so any front end can render them.

pub mod config;
pub mod core;
pub mod progress;

pub use crate::config::{ConfigError, Settings};
pub use crate::core::duplicate::{DuplicateError, DuplicateFinder, DuplicateGroup, find_duplicates};
pub use crate::core::hash::{HashAlgorithm, HashSettings, PerceptualHasher};
pub use crate::core::scanner::{ScanError, list_images};
pub use crate::core::split::{SplitError, SplitRatios, split_dataset, split_dataset_with_rng};
pub use crate::progress::{CancellationToken, NoopObserver, ProgressEvent, ProgressObserver};
