/* 📖 # Why touch the hosts file at all?

`--url api.example.test` lets clients use a realistic hostname instead of
localhost. The server maps the name to 127.0.0.1 by appending a line to the
system hosts file at startup and removes that line again on shutdown. Editing
the hosts file usually needs administrator rights; failures are reported to
the caller, which decides whether they are fatal.
*/

use std::path::{Path, PathBuf};

use jsonmock_base::{FilePath, JsonMockResult, PalHandle, RealPal, ResultExt};
use tracing::{debug, info, instrument};

/// Address fake hostnames resolve to.
pub const LOCALHOST: &str = "127.0.0.1";

/// System hosts file of the current platform.
pub fn default_hosts_path() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from(r"C:\Windows\System32\drivers\etc\hosts")
    } else {
        PathBuf::from("/etc/hosts")
    }
}

/// One `address<TAB>hostname` line in a hosts file.
#[derive(Debug, Clone)]
pub struct HostAlias {
    pal: PalHandle,
    file: FilePath,
    address: String,
    hostname: String,
}

impl HostAlias {
    /// Alias for `hostname` in `file`, resolving to [`LOCALHOST`].
    pub fn new(pal: PalHandle, file: FilePath, hostname: impl Into<String>) -> Self {
        Self {
            pal,
            file,
            address: LOCALHOST.to_string(),
            hostname: hostname.into(),
        }
    }

    /// Alias stored in the hosts file at an absolute `path`.
    pub fn for_hosts_file(path: &Path, hostname: impl Into<String>) -> JsonMockResult<Self> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| jsonmock_base::err!("Invalid hosts file path: {}", path.display()))?;
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let pal = PalHandle::new(RealPal::new(dir.to_path_buf()));
        Ok(Self::new(pal, FilePath::from(file_name), hostname))
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// The line this alias adds to the hosts file.
    pub fn entry(&self) -> String {
        format!("{}\t{}", self.address, self.hostname)
    }

    /// Append the alias to the hosts file.
    #[instrument(skip(self), fields(file = %self.file, hostname = %self.hostname))]
    pub fn add(&self) -> JsonMockResult<()> {
        let content = self.read_hosts()?;
        let updated = with_entry(&content, &self.entry());
        self.pal
            .write_file(&self.file, updated.as_bytes())
            .with_context(|| format!("Failed to add host alias {}", self.hostname))?;
        info!("added host alias");
        Ok(())
    }

    /// Remove the alias from the hosts file. Does nothing if it is absent.
    #[instrument(skip(self), fields(file = %self.file, hostname = %self.hostname))]
    pub fn remove(&self) -> JsonMockResult<()> {
        let content = self.read_hosts()?;
        let Some(updated) = without_entry(&content, &self.entry()) else {
            debug!("host alias not present");
            return Ok(());
        };
        self.pal
            .write_file(&self.file, updated.as_bytes())
            .with_context(|| format!("Failed to remove host alias {}", self.hostname))?;
        info!("removed host alias");
        Ok(())
    }

    fn read_hosts(&self) -> JsonMockResult<String> {
        if !self.pal.file_exists(&self.file)? {
            return Ok(String::new());
        }
        self.pal
            .read_file_to_string(&self.file)
            .with_context(|| format!("Failed to read hosts file {}", self.file))
    }
}

fn with_entry(content: &str, entry: &str) -> String {
    format!("{}\n{}\n", content, entry)
}

/// `content` without `entry` lines and the blank line before each of them,
/// or None when no line matches.
fn without_entry(content: &str, entry: &str) -> Option<String> {
    let mut kept: Vec<&str> = Vec::new();
    let mut removed = false;
    for line in content.split('\n') {
        if line.trim_end_matches('\r') == entry {
            if kept.last().is_some_and(|prev| prev.trim_end_matches('\r').is_empty()) {
                kept.pop();
            }
            removed = true;
            continue;
        }
        kept.push(line);
    }
    removed.then(|| kept.join("\n"))
}
