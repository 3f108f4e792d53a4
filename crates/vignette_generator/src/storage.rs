//! Artifact persistence.
//!
//! Every run writes into a fresh date/topic-partitioned directory:
//! `{base}/{year}/{mm-month}/{date}_{slug}/` holding `slides/`,
//! `caption.txt`, `meta.json`, and `carousel_data.json`.

use chrono::{Datelike, Local};
use std::path::{Path, PathBuf};
use vignette_core::CarouselArtifact;
use vignette_error::{StorageError, VignetteResult};

use crate::slug::slugify;

const MONTH_NAMES: [&str; 12] = [
    "january", "february", "march", "april", "may", "june", "july",
    "august", "september", "october", "november", "december",
];

/// Create the output directory for one run.
///
/// # Errors
///
/// Fails if the directory tree cannot be created.
pub fn create_output_dir(base: &Path, topic: &str) -> VignetteResult<PathBuf> {
    let now = Local::now();
    let year = now.year().to_string();
    let month = format!("{:02}-{}", now.month(), MONTH_NAMES[now.month0() as usize]);
    let date = now.format("%Y-%m-%d");
    let dir = base
        .join(year)
        .join(month)
        .join(format!("{date}_{}", slugify(topic)));
    std::fs::create_dir_all(&dir).map_err(|e| {
        StorageError::new(format!("Failed to create {}: {e}", dir.display()))
    })?;
    Ok(dir)
}

/// Write one rendered slide PNG, returning its path.
///
/// Slides are numbered from one: `slides/slide_01.png`.
///
/// # Errors
///
/// Fails if the slides directory or the file cannot be written.
pub fn persist_slide(output_dir: &Path, index: usize, png: &[u8]) -> VignetteResult<PathBuf> {
    let slides_dir = output_dir.join("slides");
    std::fs::create_dir_all(&slides_dir).map_err(|e| {
        StorageError::new(format!("Failed to create {}: {e}", slides_dir.display()))
    })?;
    let path = slides_dir.join(format!("slide_{:02}.png", index + 1));
    std::fs::write(&path, png)
        .map_err(|e| StorageError::new(format!("Failed to write {}: {e}", path.display())))?;
    Ok(path)
}

/// Write the caption, metadata, and canonical carousel record.
///
/// # Errors
///
/// Fails if any of the three files cannot be serialized or written.
#[tracing::instrument(skip(artifact), fields(output_dir = %artifact.meta().output_dir().display()))]
pub fn persist_artifact(artifact: &CarouselArtifact) -> VignetteResult<()> {
    let output_dir = artifact.meta().output_dir();

    let caption_path = output_dir.join("caption.txt");
    std::fs::write(&caption_path, artifact.caption()).map_err(|e| {
        StorageError::new(format!("Failed to write {}: {e}", caption_path.display()))
    })?;

    let meta_path = output_dir.join("meta.json");
    let meta_json = serde_json::to_string_pretty(artifact.meta())
        .map_err(|e| StorageError::new(format!("Failed to encode metadata: {e}")))?;
    std::fs::write(&meta_path, meta_json).map_err(|e| {
        StorageError::new(format!("Failed to write {}: {e}", meta_path.display()))
    })?;

    let data_path = output_dir.join("carousel_data.json");
    let data_json = serde_json::to_string_pretty(artifact)
        .map_err(|e| StorageError::new(format!("Failed to encode carousel data: {e}")))?;
    std::fs::write(&data_path, data_json).map_err(|e| {
        StorageError::new(format!("Failed to write {}: {e}", data_path.display()))
    })?;

    tracing::info!(caption = %caption_path.display(), "Carousel artifact persisted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vignette_core::{ArtifactMeta, Slide};

    #[test]
    fn output_dir_is_date_partitioned() {
        let base = tempfile::tempdir().unwrap();
        let dir = create_output_dir(base.path(), "Toddler Bedtime Battles").unwrap();
        assert!(dir.is_dir());

        let rel = dir.strip_prefix(base.path()).unwrap();
        let parts: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].len(), 4, "year directory");
        let (num, name) = parts[1].split_once('-').unwrap();
        assert_eq!(num.len(), 2);
        assert!(MONTH_NAMES.contains(&name));
        assert!(parts[2].ends_with("_toddler-bedtime-battles"));
    }

    #[test]
    fn slides_are_numbered_from_one() {
        let base = tempfile::tempdir().unwrap();
        let path = persist_slide(base.path(), 0, b"png bytes").unwrap();
        assert!(path.ends_with("slides/slide_01.png"));
        let path = persist_slide(base.path(), 6, b"png bytes").unwrap();
        assert!(path.ends_with("slides/slide_07.png"));
        assert_eq!(std::fs::read(&path).unwrap(), b"png bytes");
    }

    #[test]
    fn artifact_files_round_trip() {
        let base = tempfile::tempdir().unwrap();
        let meta = ArtifactMeta::new(
            "dreamtime",
            "toddler sleep",
            "habit_list",
            5,
            "viral",
            base.path().to_path_buf(),
        );
        let artifact = CarouselArtifact::new(
            vec![Slide::new("the hook"), Slide::new("tip 1: rest")],
            vec![base.path().join("slides/slide_01.png")],
            "a caption\n\n#tag".to_string(),
            vec!["scene one".to_string()],
            meta,
        );
        persist_artifact(&artifact).unwrap();

        assert_eq!(
            std::fs::read_to_string(base.path().join("caption.txt")).unwrap(),
            "a caption\n\n#tag"
        );
        let data = std::fs::read_to_string(base.path().join("carousel_data.json")).unwrap();
        let parsed: CarouselArtifact = serde_json::from_str(&data).unwrap();
        assert_eq!(&parsed, &artifact);

        let meta = std::fs::read_to_string(base.path().join("meta.json")).unwrap();
        assert!(meta.contains("\"account\": \"dreamtime\""));
        assert!(meta.contains("\"hook_strategy\": \"viral\""));
    }
}
