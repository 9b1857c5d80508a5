//! Output file naming with auto-increment.
//!
//! Saved files sit next to their source and follow one pattern:
//!
//! - `photo.jpg` → `photo_cropped.jpg`
//! - then `photo_cropped_1.jpg`, `photo_cropped_2.jpg`, …
//!
//! [`OutputName`] yields the candidates in order; the save path walks them
//! until one can be created without clobbering an existing file.

use std::path::{Path, PathBuf};

/// Candidate names for an output derived from `source`.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputName {
    dir: PathBuf,
    stem: String,
    suffix: String,
    /// Extension including the dot, or empty.
    ext: String,
}

impl OutputName {
    pub fn new(source: &Path, suffix: &str) -> Self {
        let dir = source
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let ext = source
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        Self {
            dir,
            stem,
            suffix: suffix.to_string(),
            ext,
        }
    }

    /// Replace the extension (a source of unknown type is written as PNG).
    pub fn with_extension(mut self, ext: &str) -> Self {
        self.ext = if ext.is_empty() {
            String::new()
        } else {
            format!(".{}", ext.trim_start_matches('.'))
        };
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The `n`th candidate: 0 is the bare name, then `_1`, `_2`, ….
    pub fn candidate(&self, n: u32) -> PathBuf {
        let name = if n == 0 {
            format!("{}{}{}", self.stem, self.suffix, self.ext)
        } else {
            format!("{}{}_{n}{}", self.stem, self.suffix, self.ext)
        };
        self.dir.join(name)
    }

    pub fn candidates(&self) -> impl Iterator<Item = PathBuf> + '_ {
        (0..).map(|n| self.candidate(n))
    }
}

/// File name portion for status messages.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_candidate_has_bare_suffix() {
        let name = OutputName::new(Path::new("/photos/dawn.jpg"), "_cropped");
        assert_eq!(name.candidate(0), PathBuf::from("/photos/dawn_cropped.jpg"));
    }

    #[test]
    fn later_candidates_are_numbered() {
        let name = OutputName::new(Path::new("/photos/dawn.jpg"), "_cropped");
        let got: Vec<PathBuf> = name.candidates().take(3).collect();
        assert_eq!(
            got,
            vec![
                PathBuf::from("/photos/dawn_cropped.jpg"),
                PathBuf::from("/photos/dawn_cropped_1.jpg"),
                PathBuf::from("/photos/dawn_cropped_2.jpg"),
            ]
        );
    }

    #[test]
    fn extension_can_be_replaced() {
        let name = OutputName::new(Path::new("shot.tiff"), "_collage").with_extension("png");
        assert_eq!(name.candidate(0), PathBuf::from("shot_collage.png"));
    }

    #[test]
    fn missing_extension_stays_empty() {
        let name = OutputName::new(Path::new("dir/raw"), "_cropped");
        assert_eq!(name.candidate(1), PathBuf::from("dir/raw_cropped_1"));
    }

    #[test]
    fn display_name_is_file_name() {
        assert_eq!(display_name(Path::new("/x/y/z_cropped.jpg")), "z_cropped.jpg");
    }
}
