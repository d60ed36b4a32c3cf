//! The `fahtrace.toml` roster: named clients with fixed paths, for people
//! monitoring more than one machine over network shares.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use fahtrace_log::LogDialect;

/// One monitored client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientEntry {
    /// Display name, e.g. `"den-quad"`.
    pub name: String,
    /// Data directory holding FAHlog.txt. Relative paths resolve against
    /// the roster file's directory.
    pub path: PathBuf,
    /// Force a grammar instead of sniffing it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialect: Option<LogDialect>,
}

/// The roster file contents:
///
/// ```toml
/// [[client]]
/// name = "den-quad"
/// path = "clients/den"
/// dialect = "legacy"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    #[serde(default, rename = "client")]
    pub clients: Vec<ClientEntry>,
}

impl Roster {
    /// Load a roster, resolving relative client paths against the roster
    /// file's directory. A missing file is an empty roster.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let mut roster: Roster = toml::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;

        let base = path.parent().unwrap_or(Path::new("."));
        for client in &mut roster.clients {
            if client.path.is_relative() {
                client.path = base.join(&client.path);
            }
        }
        Ok(roster)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_roster_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let roster = Roster::load_from(&dir.path().join("fahtrace.toml")).unwrap();
        assert!(roster.clients.is_empty());
    }

    #[test]
    fn test_roster_parses_and_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fahtrace.toml");
        std::fs::write(
            &path,
            r#"
[[client]]
name = "den-quad"
path = "clients/den"
dialect = "legacy"

[[client]]
name = "gpu-rig"
path = "/srv/fah/gpu"
"#,
        )
        .unwrap();

        let roster = Roster::load_from(&path).unwrap();
        assert_eq!(roster.clients.len(), 2);
        assert_eq!(roster.clients[0].name, "den-quad");
        assert_eq!(roster.clients[0].path, dir.path().join("clients/den"));
        assert_eq!(roster.clients[0].dialect, Some(LogDialect::Legacy));
        assert_eq!(roster.clients[1].path, PathBuf::from("/srv/fah/gpu"));
        assert_eq!(roster.clients[1].dialect, None);
    }

    #[test]
    fn test_garbage_roster_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fahtrace.toml");
        std::fs::write(&path, "[[client]\nname=").unwrap();
        assert!(Roster::load_from(&path).is_err());
    }
}
