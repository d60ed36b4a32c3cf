//! A temporary client data directory holding the three telemetry files.

use std::path::Path;

use tempfile::TempDir;

/// One throwaway directory a test can treat as a client's data directory.
/// Files not written simply do not exist, the way a real partial client
/// directory looks.
#[derive(Debug)]
pub struct ClientDirFixture {
    dir: TempDir,
}

impl ClientDirFixture {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn with_log(self, text: &str) -> anyhow::Result<Self> {
        std::fs::write(self.path().join("FAHlog.txt"), text)?;
        Ok(self)
    }

    pub fn with_queue(self, image: &[u8]) -> anyhow::Result<Self> {
        std::fs::write(self.path().join("queue.dat"), image)?;
        Ok(self)
    }

    pub fn with_unitinfo(self, text: &str) -> anyhow::Result<Self> {
        std::fs::write(self.path().join("unitinfo.txt"), text)?;
        Ok(self)
    }
}

/// Compose a unitinfo.txt body. Times are the yearless
/// `<month-name> d HH:mm:ss` form the client writes.
pub fn unitinfo_text(name: &str, tag: &str, download: &str, due: &str, progress: u32) -> String {
    format!(
        "Current Work Unit\n\
         -----------------\n\
         Name: {name}\n\
         Tag: {tag}\n\
         Download time: {download}\n\
         Due time: {due}\n\
         Progress: {progress}%  [____________________]\n"
    )
}
