use serde::{Deserialize, Serialize};
use std::fmt;

/// Work unit identity: the project number plus its (run, clone, generation)
/// trajectory coordinates.
///
/// Two telemetry sources describe the same unit exactly when their tuples
/// are equal. The all-zero tuple means "project unknown" — a unit that never
/// printed its project line, or an empty queue position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub project_id: u32,
    pub run: u32,
    pub clone: u32,
    pub generation: u32,
}

impl ProjectInfo {
    pub fn new(project_id: u32, run: u32, clone: u32, generation: u32) -> Self {
        Self {
            project_id,
            run,
            clone,
            generation,
        }
    }

    /// True for the all-zero tuple.
    pub fn is_unknown(&self) -> bool {
        self.project_id == 0 && self.run == 0 && self.clone == 0 && self.generation == 0
    }

    /// Compact tag form used by unitinfo snapshots: `P2683R2C8G24`.
    pub fn tag(&self) -> String {
        format!("P{}R{}C{}G{}", self.project_id, self.run, self.clone, self.generation)
    }
}

impl fmt::Display for ProjectInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Project: {} (Run {}, Clone {}, Gen {})",
            self.project_id, self.run, self.clone, self.generation
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unknown() {
        assert!(ProjectInfo::default().is_unknown());
        assert!(!ProjectInfo::new(2669, 13, 159, 153).is_unknown());
    }

    #[test]
    fn test_tag_format() {
        let project = ProjectInfo::new(2683, 2, 8, 24);
        assert_eq!(project.tag(), "P2683R2C8G24");
    }

    #[test]
    fn test_display_matches_log_form() {
        let project = ProjectInfo::new(2669, 13, 159, 153);
        assert_eq!(
            project.to_string(),
            "Project: 2669 (Run 13, Clone 159, Gen 153)"
        );
    }
}
