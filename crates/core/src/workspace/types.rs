//! Workspace identity and layout.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Opaque, collision-free job identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(Uuid);

impl JobId {
    /// Generates a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Directory name used for both the input and output trees.
    pub fn dir_name(&self) -> String {
        format!("job_{}", self.0)
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for JobId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A provisioned job workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    pub job_id: JobId,
    /// Transient input tree: `inputs/job_<id>/`.
    pub input_dir: PathBuf,
    /// Sheet images: `inputs/job_<id>/images/`.
    pub images_dir: PathBuf,
    /// Persistent output tree: `outputs/job_<id>/`.
    pub output_dir: PathBuf,
}

impl Workspace {
    pub(crate) fn layout(job_id: JobId, inputs_root: &Path, outputs_root: &Path) -> Self {
        let dir_name = job_id.dir_name();
        let input_dir = inputs_root.join(&dir_name);
        Self {
            job_id,
            images_dir: input_dir.join("images"),
            input_dir,
            output_dir: outputs_root.join(&dir_name),
        }
    }

    pub fn template_path(&self) -> PathBuf {
        self.input_dir.join("template.json")
    }

    pub fn config_path(&self) -> PathBuf {
        self.input_dir.join("config.json")
    }

    pub fn marker_path(&self) -> PathBuf {
        self.input_dir.join("marker.jpg")
    }

    /// Destination of the sheet image for `roll`.
    ///
    /// ASCII letters, digits and `-` are kept; every other byte of the roll
    /// is written as `_xx` (lowercase hex). Distinct rolls therefore map to
    /// distinct files, and a roll can never escape the images directory.
    pub fn sheet_path(&self, roll: &str) -> PathBuf {
        let mut safe_roll = String::with_capacity(roll.len());
        for byte in roll.bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'-' {
                safe_roll.push(byte as char);
            } else {
                safe_roll.push_str(&format!("_{:02x}", byte));
            }
        }
        self.images_dir.join(format!("sheet_{}.jpg", safe_roll))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workspace() -> Workspace {
        Workspace::layout(
            JobId::new(),
            Path::new("/srv/inputs"),
            Path::new("/srv/outputs"),
        )
    }

    #[test]
    fn test_job_ids_are_unique() {
        let a = JobId::new();
        let b = JobId::new();
        assert_ne!(a, b);
        assert_ne!(a.dir_name(), b.dir_name());
    }

    #[test]
    fn test_dir_name_format() {
        let id = JobId::from(Uuid::nil());
        assert_eq!(
            id.dir_name(),
            "job_00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_layout() {
        let ws = workspace();
        let dir_name = ws.job_id.dir_name();
        assert_eq!(ws.input_dir, Path::new("/srv/inputs").join(&dir_name));
        assert_eq!(ws.images_dir, ws.input_dir.join("images"));
        assert_eq!(ws.output_dir, Path::new("/srv/outputs").join(&dir_name));
        assert_eq!(ws.template_path(), ws.input_dir.join("template.json"));
        assert_eq!(ws.config_path(), ws.input_dir.join("config.json"));
        assert_eq!(ws.marker_path(), ws.input_dir.join("marker.jpg"));
    }

    #[test]
    fn test_sheet_path_uses_roll() {
        let ws = workspace();
        assert_eq!(ws.sheet_path("A1"), ws.images_dir.join("sheet_A1.jpg"));
        assert_eq!(
            ws.sheet_path("2024-07_b"),
            ws.images_dir.join("sheet_2024-07_5fb.jpg")
        );
    }

    #[test]
    fn test_distinct_rolls_get_distinct_sheet_files() {
        let ws = workspace();
        let rolls = ["A.1", "A 1", "A_1", "A_2e1", "अ१", "आ१", "A1"];
        let paths: std::collections::HashSet<PathBuf> =
            rolls.iter().map(|roll| ws.sheet_path(roll)).collect();
        assert_eq!(paths.len(), rolls.len());
        assert_eq!(ws.sheet_path("A.1"), ws.images_dir.join("sheet_A_2e1.jpg"));
        assert_eq!(ws.sheet_path("A_1"), ws.images_dir.join("sheet_A_5f1.jpg"));
    }

    #[test]
    fn test_sheet_path_cannot_escape_images_dir() {
        let ws = workspace();
        let path = ws.sheet_path("../../etc/passwd");
        assert_eq!(path.parent().unwrap(), ws.images_dir);
        assert_eq!(
            path.file_name().unwrap(),
            "sheet__2e_2e_2f_2e_2e_2fetc_2fpasswd.jpg"
        );
    }
}
