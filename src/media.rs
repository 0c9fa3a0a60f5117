//! Lookup of locally stored clue media.
//!
//! Media lives at `{media_root}/{id}/{round}-{column}-{row}.{ext}`, where
//! `round` is the 0-based round index and the extension is free.

use crate::models::{MatchId, Position};
use itertools::Itertools;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct MediaIndex {
    root: PathBuf,
}

impl MediaIndex {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Find the media file for a clue, if one exists.
    ///
    /// When several files share the stem, the lexically first path wins.
    pub fn find(&self, id: &MatchId, round: usize, position: Position) -> Option<PathBuf> {
        let dir = self.root.join(id.as_str());
        let stem = format!("{}-{}-{}", round, position.column, position.row);
        let entries = std::fs::read_dir(&dir).ok()?;

        let found = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| path.file_stem().and_then(|s| s.to_str()) == Some(stem.as_str()))
            .sorted()
            .next();

        if let Some(path) = &found {
            debug!(%id, round, path = %path.display(), "Found clue media");
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_matches_stem_with_any_extension() {
        let dir = tempfile::TempDir::new().unwrap();
        let game_dir = dir.path().join("4242");
        std::fs::create_dir_all(&game_dir).unwrap();
        std::fs::write(game_dir.join("1-2-3.webp"), b"img").unwrap();
        std::fs::write(game_dir.join("0-2-3.png"), b"img").unwrap();

        let index = MediaIndex::new(dir.path());
        let id = MatchId::new("4242");
        assert_eq!(
            index.find(&id, 1, Position::new(2, 3)),
            Some(game_dir.join("1-2-3.webp"))
        );
        assert_eq!(
            index.find(&id, 0, Position::new(2, 3)),
            Some(game_dir.join("0-2-3.png"))
        );
        assert_eq!(index.find(&id, 1, Position::new(0, 0)), None);
    }

    #[test]
    fn test_find_without_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let index = MediaIndex::new(dir.path());
        assert_eq!(index.find(&MatchId::new("1"), 0, Position::new(0, 0)), None);
    }

    #[test]
    fn test_find_ignores_similar_stems() {
        let dir = tempfile::TempDir::new().unwrap();
        let game_dir = dir.path().join("7");
        std::fs::create_dir_all(&game_dir).unwrap();
        std::fs::write(game_dir.join("0-1-10.png"), b"img").unwrap();
        std::fs::write(game_dir.join("x0-1-1.png"), b"img").unwrap();

        let index = MediaIndex::new(dir.path());
        assert_eq!(index.find(&MatchId::new("7"), 0, Position::new(1, 1)), None);
    }
}
