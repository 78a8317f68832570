//! LibreOffice (`soffice`) as the conversion engine
//!
//! Each session gets its own throwaway user profile so it never attaches to
//! an office instance the user already has open, and so the process it
//! starts is the only one it has to stop.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use log::{debug, warn};
use tempfile::TempDir;
use crate::convert::{EngineSession, SaveFormat, WordEngine};
use crate::error::{Error, Result};

/// Program name looked up on `PATH` when no explicit path is configured
pub const DEFAULT_PROGRAM: &str = "soffice";

/// Environment variable that overrides the office program
pub const PROGRAM_ENV: &str = "WORD2PDF_OFFICE";

/// LibreOffice, driven headless from the command line
#[derive(Debug, Clone)]
pub struct OfficeEngine {
    program: PathBuf,
}

impl OfficeEngine {
    /// Use the office executable at `program`
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into() }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Default for OfficeEngine {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl WordEngine for OfficeEngine {
    fn name(&self) -> &str {
        "LibreOffice"
    }

    fn launch(&self) -> Result<Box<dyn EngineSession>> {
        let profile = tempfile::Builder::new().prefix("word2pdf-profile-").tempdir()?;
        debug!("Office profile at {}", profile.path().display());

        Ok(Box::new(OfficeSession {
            program: self.program.clone(),
            profile,
            document: None,
            child: None,
        }))
    }
}

struct OfficeSession {
    program: PathBuf,
    profile: TempDir,
    document: Option<PathBuf>,
    child: Option<Child>,
}

impl EngineSession for OfficeSession {
    fn open(&mut self, document: &Path) -> Result<()> {
        if !document.is_file() {
            return Err(Error::Engine(format!("cannot open {}", document.display())));
        }
        self.document = Some(document.to_path_buf());
        Ok(())
    }

    fn save_as(&mut self, destination: &Path, format: SaveFormat) -> Result<()> {
        let document = self.document.clone()
            .ok_or_else(|| Error::Engine("no document is open".to_string()))?;

        let scratch = tempfile::Builder::new().prefix("word2pdf-out-").tempdir()?;
        let stderr_path = scratch.path().join("stderr.log");

        let child = Command::new(&self.program)
            .arg(format!("-env:UserInstallation={}", file_url(self.profile.path())))
            .args(["--headless", "--invisible", "--nologo", "--norestore"])
            .arg("--convert-to")
            .arg(format.filter())
            .arg("--outdir")
            .arg(scratch.path())
            .arg(&document)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::from(File::create(&stderr_path)?))
            .spawn()
            .map_err(|e| Error::Engine(format!("failed to start {}: {}", self.program.display(), e)))?;

        // Park the child on the session so quit() can kill it if waiting fails
        let status = self.child.insert(child).wait()?;
        self.child = None;

        let produced = produced_file(scratch.path(), &document, format);

        if !status.success() || !produced.is_file() {
            let stderr = fs::read_to_string(&stderr_path).unwrap_or_default();
            return Err(Error::Engine(format!(
                "{} exited with {}: {}",
                self.program.display(),
                status,
                stderr.trim()
            )));
        }

        move_file(&produced, destination)
    }

    fn close(&mut self) -> Result<()> {
        self.document = None;
        Ok(())
    }

    fn quit(&mut self) -> Result<()> {
        if let Some(mut child) = self.child.take() {
            warn!("Killing office process {}", child.id());
            child.kill()?;
            child.wait()?;
        }
        Ok(())
    }
}

/// Where `soffice --convert-to` writes its output for `document`
fn produced_file(outdir: &Path, document: &Path, format: SaveFormat) -> PathBuf {
    let mut name = document.file_stem().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(format.filter());
    outdir.join(name)
}

/// Rename, falling back to copy-and-delete across filesystems
fn move_file(from: &Path, to: &Path) -> Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to)?;
    fs::remove_file(from)?;
    Ok(())
}

/// `file://` URL for an absolute local path, as LibreOffice expects
fn file_url(path: &Path) -> String {
    let path = path.to_string_lossy().replace('\\', "/");
    let mut encoded = String::with_capacity(path.len());
    for byte in path.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' | b'/' | b':' => {
                encoded.push(char::from(byte))
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }

    if encoded.starts_with('/') {
        format!("file://{}", encoded)
    } else {
        format!("file:///{}", encoded)
    }
}
