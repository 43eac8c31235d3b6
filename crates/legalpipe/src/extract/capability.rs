//! External-tool capability providers.
//!
//! The pipeline treats `pdftotext`, `pdftoppm`, `tesseract`, and `sips`/
//! `convert` as black-box binaries reachable on `PATH`. Each is wrapped
//! behind a trait so the orchestrator can probe availability once at
//! startup, downgrade gracefully when a binary is missing, and so tests can
//! substitute a fake without invoking a subprocess.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use tracing::warn;

/// Result of a single capability invocation: either the raw stdout bytes, or
/// a reason it could not be produced. Never propagates as a [`crate::error::PipelineError`];
/// callers absorb this into a degraded page record.
pub type CapabilityResult<T> = std::result::Result<T, CapabilityFailure>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityFailure {
    Unavailable,
    Timeout,
    NonZeroExit { code: Option<i32>, stderr: String },
    Io(String),
}

impl std::fmt::Display for CapabilityFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable => write!(f, "capability binary not found on PATH"),
            Self::Timeout => write!(f, "invocation exceeded its timeout"),
            Self::NonZeroExit { code, stderr } => {
                write!(f, "exited with {code:?}: {stderr}")
            }
            Self::Io(message) => write!(f, "I/O error: {message}"),
        }
    }
}

/// `pdftotext -f N -l N -raw <pdf> -`
pub trait TextCapability: Send + Sync {
    fn is_available(&self) -> bool;
    fn extract_page(&self, pdf: &Path, page: u32, timeout: Duration) -> CapabilityResult<String>;
    fn extract_document(&self, pdf: &Path, timeout: Duration) -> CapabilityResult<String>;
    /// Page count via `pdfinfo`, poppler-utils' companion to `pdftotext`.
    /// Falls back to form-feed counting in the caller when unavailable.
    fn page_count(&self, pdf: &Path, timeout: Duration) -> CapabilityResult<u32>;
}

/// `pdftoppm -r {300|400} -f N -l N -png <pdf> <prefix>`
pub trait RasterCapability: Send + Sync {
    fn is_available(&self) -> bool;
    fn rasterize_page(&self, pdf: &Path, page: u32, dpi: u32, timeout: Duration) -> CapabilityResult<PathBuf>;
}

/// `tesseract <png> stdout -l por --psm {3|6} --oem 1 -c thresholding_method=1`
pub trait OcrCapability: Send + Sync {
    fn is_available(&self) -> bool;
    fn recognize(&self, image: &Path, psm: u8, timeout: Duration) -> CapabilityResult<String>;
}

/// `sips --rotate <deg> <img>` in place, or `convert <img> -rotate <deg> <out>`.
pub trait RotateCapability: Send + Sync {
    fn is_available(&self) -> bool;
    fn rotate(&self, image: &Path, degrees: u16, timeout: Duration) -> CapabilityResult<PathBuf>;
}

/// Bundles the four capabilities the pipeline needs, probed once at startup.
pub struct Capabilities {
    pub text: Box<dyn TextCapability>,
    pub raster: Box<dyn RasterCapability>,
    pub ocr: Box<dyn OcrCapability>,
    pub rotate: Box<dyn RotateCapability>,
}

impl Capabilities {
    /// Subprocess-backed capabilities, probing `PATH` via `which` for each binary.
    pub fn discover() -> Self {
        Self {
            text: Box::new(PdftotextCapability::new()),
            raster: Box::new(PdftoppmCapability::new()),
            ocr: Box::new(TesseractCapability::new()),
            rotate: Box::new(ImageRotateCapability::new()),
        }
    }

    /// Human-readable list of capabilities that are not available, for the
    /// startup downgrade log and the report's `limitations[]`.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.text.is_available() {
            missing.push("pdftotext");
        }
        if !self.raster.is_available() {
            missing.push("pdftoppm");
        }
        if !self.ocr.is_available() {
            missing.push("tesseract");
        }
        if !self.rotate.is_available() {
            missing.push("sips/convert");
        }
        missing
    }
}

fn run_with_timeout(mut command: Command, timeout: Duration) -> CapabilityResult<Vec<u8>> {
    let mut child = command
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .spawn()
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CapabilityFailure::Unavailable,
            _ => CapabilityFailure::Io(e.to_string()),
        })?;

    let start = std::time::Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                let mut stdout = Vec::new();
                if let Some(mut out) = child.stdout.take() {
                    use std::io::Read;
                    let _ = out.read_to_end(&mut stdout);
                }
                if status.success() {
                    return Ok(stdout);
                }
                let mut stderr = String::new();
                if let Some(mut err) = child.stderr.take() {
                    use std::io::Read;
                    let _ = err.read_to_string(&mut stderr);
                }
                return Err(CapabilityFailure::NonZeroExit {
                    code: status.code(),
                    stderr,
                });
            }
            Ok(None) => {
                if start.elapsed() >= timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(CapabilityFailure::Timeout);
                }
                std::thread::sleep(Duration::from_millis(25));
            }
            Err(e) => return Err(CapabilityFailure::Io(e.to_string())),
        }
    }
}

pub struct PdftotextCapability {
    available: bool,
    pdfinfo_available: bool,
}

impl PdftotextCapability {
    pub fn new() -> Self {
        Self {
            available: which::which("pdftotext").is_ok(),
            pdfinfo_available: which::which("pdfinfo").is_ok(),
        }
    }
}

impl Default for PdftotextCapability {
    fn default() -> Self {
        Self::new()
    }
}

impl TextCapability for PdftotextCapability {
    fn is_available(&self) -> bool {
        self.available
    }

    fn extract_page(&self, pdf: &Path, page: u32, timeout: Duration) -> CapabilityResult<String> {
        if !self.available {
            return Err(CapabilityFailure::Unavailable);
        }
        let mut command = Command::new("pdftotext");
        command
            .arg("-f")
            .arg(page.to_string())
            .arg("-l")
            .arg(page.to_string())
            .arg("-raw")
            .arg(pdf)
            .arg("-");
        let bytes = run_with_timeout(command, timeout)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn extract_document(&self, pdf: &Path, timeout: Duration) -> CapabilityResult<String> {
        if !self.available {
            return Err(CapabilityFailure::Unavailable);
        }
        let mut command = Command::new("pdftotext");
        command.arg("-raw").arg(pdf).arg("-");
        let bytes = run_with_timeout(command, timeout)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn page_count(&self, pdf: &Path, timeout: Duration) -> CapabilityResult<u32> {
        if !self.pdfinfo_available {
            return Err(CapabilityFailure::Unavailable);
        }
        let mut command = Command::new("pdfinfo");
        command.arg(pdf);
        let bytes = run_with_timeout(command, timeout)?;
        let text = String::from_utf8_lossy(&bytes);
        text.lines()
            .find_map(|line| line.strip_prefix("Pages:"))
            .and_then(|rest| rest.trim().parse::<u32>().ok())
            .ok_or_else(|| CapabilityFailure::Io("pdfinfo output had no Pages: line".to_string()))
    }
}

pub struct PdftoppmCapability {
    available: bool,
}

impl PdftoppmCapability {
    pub fn new() -> Self {
        Self {
            available: which::which("pdftoppm").is_ok(),
        }
    }
}

impl Default for PdftoppmCapability {
    fn default() -> Self {
        Self::new()
    }
}

impl RasterCapability for PdftoppmCapability {
    fn is_available(&self) -> bool {
        self.available
    }

    fn rasterize_page(&self, pdf: &Path, page: u32, dpi: u32, timeout: Duration) -> CapabilityResult<PathBuf> {
        if !self.available {
            return Err(CapabilityFailure::Unavailable);
        }
        let dir = tempfile::tempdir().map_err(|e| CapabilityFailure::Io(e.to_string()))?;
        let prefix = dir.path().join("page");
        let mut command = Command::new("pdftoppm");
        command
            .arg("-r")
            .arg(dpi.to_string())
            .arg("-f")
            .arg(page.to_string())
            .arg("-l")
            .arg(page.to_string())
            .arg("-png")
            .arg(pdf)
            .arg(&prefix);
        run_with_timeout(command, timeout)?;

        let produced = std::fs::read_dir(dir.path())
            .map_err(|e| CapabilityFailure::Io(e.to_string()))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .find(|path| path.extension().and_then(|e| e.to_str()) == Some("png"))
            .ok_or_else(|| CapabilityFailure::Io("pdftoppm produced no page image".to_string()))?;

        // Persist the image past the tempdir's drop by leaking the directory
        // handle into the keep path; callers are responsible for cleanup.
        let kept = dir.into_path().join(produced.file_name().expect("has a filename"));
        std::fs::rename(&produced, &kept).map_err(|e| CapabilityFailure::Io(e.to_string()))?;
        Ok(kept)
    }
}

pub struct TesseractCapability {
    available: bool,
}

impl TesseractCapability {
    pub fn new() -> Self {
        Self {
            available: which::which("tesseract").is_ok(),
        }
    }
}

impl Default for TesseractCapability {
    fn default() -> Self {
        Self::new()
    }
}

impl OcrCapability for TesseractCapability {
    fn is_available(&self) -> bool {
        self.available
    }

    fn recognize(&self, image: &Path, psm: u8, timeout: Duration) -> CapabilityResult<String> {
        if !self.available {
            return Err(CapabilityFailure::Unavailable);
        }
        let mut command = Command::new("tesseract");
        command
            .env("OMP_NUM_THREADS", "1")
            .arg(image)
            .arg("stdout")
            .arg("-l")
            .arg("por")
            .arg("--psm")
            .arg(psm.to_string())
            .arg("--oem")
            .arg("1")
            .arg("-c")
            .arg("thresholding_method=1");
        let bytes = run_with_timeout(command, timeout)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

pub struct ImageRotateCapability {
    sips_available: bool,
    convert_available: bool,
}

impl ImageRotateCapability {
    pub fn new() -> Self {
        Self {
            sips_available: which::which("sips").is_ok(),
            convert_available: which::which("convert").is_ok(),
        }
    }
}

impl Default for ImageRotateCapability {
    fn default() -> Self {
        Self::new()
    }
}

impl RotateCapability for ImageRotateCapability {
    fn is_available(&self) -> bool {
        self.sips_available || self.convert_available
    }

    fn rotate(&self, image: &Path, degrees: u16, timeout: Duration) -> CapabilityResult<PathBuf> {
        if self.sips_available {
            let mut command = Command::new("sips");
            command.arg("--rotate").arg(degrees.to_string()).arg(image);
            run_with_timeout(command, timeout)?;
            return Ok(image.to_path_buf());
        }
        if self.convert_available {
            let out = image.with_extension(format!("rot{degrees}.png"));
            let mut command = Command::new("convert");
            command.arg(image).arg("-rotate").arg(degrees.to_string()).arg(&out);
            run_with_timeout(command, timeout)?;
            return Ok(out);
        }
        warn!("no rotation capability available");
        Err(CapabilityFailure::Unavailable)
    }
}
