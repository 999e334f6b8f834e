//! Writes render artifacts to disk for the display shell.
//!
//! The three files always come from the same cycle: each is staged as
//! `<name>.tmp` first and only moved into place once every write has
//! succeeded.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use borehole_map_render_models::RenderOutput;

use crate::RenderError;
use crate::map::to_feature_collection;

/// File name of the `GeoJSON` point map.
pub const MAP_FILE_NAME: &str = "map.geojson";
/// File name of the histogram JSON.
pub const DISTRIBUTION_FILE_NAME: &str = "distribution.json";
/// File name of the full render output (map config, legend, stats).
pub const RENDER_FILE_NAME: &str = "render.json";

const ARTIFACT_FILE_NAMES: [&str; 3] = [MAP_FILE_NAME, DISTRIBUTION_FILE_NAME, RENDER_FILE_NAME];

/// Paths of the files written by [`write_artifacts`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    /// `GeoJSON` point map.
    pub map: PathBuf,
    /// Histogram JSON.
    pub distribution: PathBuf,
    /// Full render output JSON.
    pub render: PathBuf,
}

/// Serializes `output` into `dir`, creating it if needed.
///
/// Nothing is serialized to disk until every artifact has been encoded.
/// If any file fails to stage or move into place, the files already placed
/// by this call are removed, so `dir` never holds a map from one cycle next
/// to a histogram from another.
///
/// # Errors
///
/// Returns [`RenderError`] if serialization or any file operation fails.
pub fn write_artifacts(output: &RenderOutput, dir: &Path) -> Result<ArtifactPaths, RenderError> {
    let collection = to_feature_collection(&output.map_view, &output.parameter);
    let contents = [
        serde_json::to_string(&collection)?,
        serde_json::to_string_pretty(&output.distribution_view)?,
        serde_json::to_string_pretty(output)?,
    ];

    std::fs::create_dir_all(dir)?;

    let mut staged = Vec::with_capacity(contents.len());
    for (name, json) in ARTIFACT_FILE_NAMES.iter().zip(&contents) {
        let tmp = staging_path(dir, name);
        if let Err(e) = std::fs::write(&tmp, json) {
            staged.push(tmp);
            discard(&staged);
            return Err(e.into());
        }
        staged.push(tmp);
    }

    let mut placed = Vec::with_capacity(staged.len());
    for (name, tmp) in ARTIFACT_FILE_NAMES.iter().zip(&staged) {
        let target = dir.join(name);
        if let Err(e) = std::fs::rename(tmp, &target) {
            log::error!("Failed to place {}: {e}", target.display());
            discard(&placed);
            discard(&staged[placed.len()..]);
            return Err(e.into());
        }
        placed.push(target);
    }

    log::info!(
        "Wrote {} features to {}",
        collection.features.len(),
        dir.join(MAP_FILE_NAME).display()
    );

    Ok(ArtifactPaths {
        map: dir.join(MAP_FILE_NAME),
        distribution: dir.join(DISTRIBUTION_FILE_NAME),
        render: dir.join(RENDER_FILE_NAME),
    })
}

/// Removes any artifacts left in `dir` by an earlier cycle.
///
/// Called when a cycle fails so the display shell doesn't keep showing the
/// previous parameter. Missing files are fine.
///
/// # Errors
///
/// Returns [`RenderError::Io`] if an existing artifact can't be removed.
pub fn clear_artifacts(dir: &Path) -> Result<(), RenderError> {
    for name in ARTIFACT_FILE_NAMES {
        match std::fs::remove_file(dir.join(name)) {
            Err(e) if e.kind() != ErrorKind::NotFound => return Err(e.into()),
            _ => {}
        }
    }
    Ok(())
}

fn staging_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.tmp"))
}

fn discard(paths: &[PathBuf]) {
    for path in paths {
        if let Err(e) = std::fs::remove_file(path)
            && e.kind() != ErrorKind::NotFound
        {
            log::warn!("Failed to remove {}: {e}", path.display());
        }
    }
}
