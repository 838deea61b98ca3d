use image::ImageReader;
use image_hasher::{HashAlg, Hasher, HasherConfig};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HashError {
    #[error("Failed to open {path:?}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to decode {path:?}: {source}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HashAlgorithm {
    /// Median over the low DCT frequencies (pHash).
    #[default]
    Perceptual,
    Mean,
    Gradient,
    DoubleGradient,
    Blockhash,
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HashAlgorithm::Perceptual => "perceptual",
            HashAlgorithm::Mean => "mean",
            HashAlgorithm::Gradient => "gradient",
            HashAlgorithm::DoubleGradient => "double-gradient",
            HashAlgorithm::Blockhash => "blockhash",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashSettings {
    pub algorithm: HashAlgorithm,
    /// Side length of the square hash grid, in bits.
    pub hash_size: u32,
}

impl Default for HashSettings {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::Perceptual,
            hash_size: 8,
        }
    }
}

/// Bounds applied to [`HashSettings::hash_size`], matching the CLI flag.
pub const MIN_HASH_SIZE: u32 = 2;
pub const MAX_HASH_SIZE: u32 = 64;

/// Decodes images and turns them into comparable hash strings.
pub struct PerceptualHasher {
    hasher: Hasher,
}

impl PerceptualHasher {
    pub fn new(settings: HashSettings) -> Self {
        // Settings files are hand-editable, so the size is clamped here too.
        let size = settings.hash_size.clamp(MIN_HASH_SIZE, MAX_HASH_SIZE);
        let config = HasherConfig::new().hash_size(size, size);
        let config = match settings.algorithm {
            HashAlgorithm::Perceptual => config.hash_alg(HashAlg::Median).preproc_dct(),
            HashAlgorithm::Mean => config.hash_alg(HashAlg::Mean),
            HashAlgorithm::Gradient => config.hash_alg(HashAlg::Gradient),
            HashAlgorithm::DoubleGradient => config.hash_alg(HashAlg::DoubleGradient),
            HashAlgorithm::Blockhash => config.hash_alg(HashAlg::Blockhash),
        };

        Self {
            hasher: config.to_hasher(),
        }
    }

    /// Decode the image at `path` and return its hash as base64.
    ///
    /// The format is sniffed from the file contents, so a mislabelled
    /// extension still decodes.
    pub fn hash_file(&self, path: &Path) -> Result<String, HashError> {
        let open_err = |source| HashError::Open {
            path: path.to_path_buf(),
            source,
        };
        let img = ImageReader::open(path)
            .map_err(open_err)?
            .with_guessed_format()
            .map_err(open_err)?
            .decode()
            .map_err(|source| HashError::Decode {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(self.hasher.hash_image(&img).to_base64())
    }
}

impl Default for PerceptualHasher {
    fn default() -> Self {
        Self::new(HashSettings::default())
    }
}
