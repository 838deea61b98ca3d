use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Extensions accepted by both the duplicate finder and the splitter.
pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "bmp", "gif", "tiff"];

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Invalid path: {path}")]
    InvalidPath { path: String },

    #[error("Failed to read directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// True when `path` carries one of [`SUPPORTED_EXTENSIONS`], ignoring case.
pub fn is_supported_image(path: &Path) -> bool {
    match path.extension() {
        Some(extension) => {
            let ext = extension.to_string_lossy().to_lowercase();
            SUPPORTED_EXTENSIONS.contains(&ext.as_str())
        }
        None => false,
    }
}

/// List the supported images directly inside `dir`, sorted by file name.
///
/// Subdirectories are not descended into, so `Duplicate/` and `images/`
/// never feed back into a scan.
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
    if !dir.exists() {
        return Err(ScanError::InvalidPath {
            path: dir.to_string_lossy().to_string(),
        });
    }
    if !dir.is_dir() {
        return Err(ScanError::InvalidPath {
            path: format!("{} is not a directory", dir.to_string_lossy()),
        });
    }

    let mut images = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && is_supported_image(path) {
            images.push(path.to_path_buf());
        }
    }

    log::debug!("Found {} images in {}", images.len(), dir.display());
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_extension_filter_is_case_insensitive() {
        assert!(is_supported_image(Path::new("a.JPG")));
        assert!(is_supported_image(Path::new("b.Tiff")));
        assert!(is_supported_image(Path::new("c.jpeg")));
        assert!(!is_supported_image(Path::new("d.webp")));
        assert!(!is_supported_image(Path::new("e.txt")));
        assert!(!is_supported_image(Path::new("no_extension")));
        assert!(!is_supported_image(Path::new("png")));
    }

    #[test]
    fn test_lists_only_top_level_images_in_name_order() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("c.png"), b"x").unwrap();
        fs::write(root.join("a.JPG"), b"x").unwrap();
        fs::write(root.join("b.bmp"), b"x").unwrap();
        fs::write(root.join("notes.txt"), b"x").unwrap();
        fs::create_dir(root.join("Duplicate")).unwrap();
        fs::write(root.join("Duplicate").join("d.png"), b"x").unwrap();
        // A directory that looks like an image is not a file.
        fs::create_dir(root.join("folder.png")).unwrap();

        let images = list_images(root).unwrap();
        let names: Vec<_> = images
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();

        assert_eq!(names, vec!["a.JPG", "b.bmp", "c.png"]);
    }

    #[test]
    fn test_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        assert!(list_images(temp_dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_missing_directory_is_invalid_path() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope");
        assert!(matches!(
            list_images(&missing),
            Err(ScanError::InvalidPath { .. })
        ));
    }

    #[test]
    fn test_file_is_not_a_directory() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("a.png");
        fs::write(&file, b"x").unwrap();

        match list_images(&file) {
            Err(ScanError::InvalidPath { path }) => assert!(path.contains("is not a directory")),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
