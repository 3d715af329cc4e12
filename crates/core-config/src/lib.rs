//! Configuration loading and parsing.
//!
//! Parses `undoline.toml` (or an override path provided by the binary):
//!
//! ```toml
//! [print]
//! placeholder = "."
//!
//! [input]
//! skip_malformed = false
//!
//! [log]
//! enabled = true
//! directory = "."
//! file = "undoline.log"
//! ```
//!
//! Every field is optional. A missing file yields defaults; an unparsable
//! file also yields defaults after a `warn` on target `config`. Unknown
//! fields are ignored so older binaries accept newer files.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

pub const CONFIG_FILE_NAME: &str = "undoline.toml";

#[derive(Debug, Deserialize, Clone)]
pub struct PrintConfig {
    #[serde(default = "PrintConfig::default_placeholder")]
    pub placeholder: String,
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            placeholder: Self::default_placeholder(),
        }
    }
}

impl PrintConfig {
    fn default_placeholder() -> String {
        ".".to_string()
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct InputConfig {
    /// Log and skip malformed directives instead of aborting the run.
    #[serde(default)]
    pub skip_malformed: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    #[serde(default = "LogConfig::default_enabled")]
    pub enabled: bool,
    #[serde(default = "LogConfig::default_directory")]
    pub directory: PathBuf,
    #[serde(default = "LogConfig::default_file")]
    pub file: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            directory: Self::default_directory(),
            file: Self::default_file(),
        }
    }
}

impl LogConfig {
    const fn default_enabled() -> bool {
        true
    }
    fn default_directory() -> PathBuf {
        PathBuf::from(".")
    }
    fn default_file() -> String {
        "undoline.log".to_string()
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub print: PrintConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub file: ConfigFile,    // parsed (or default) data
    pub source: Option<PathBuf>,
}

/// Config path: `undoline.toml` in the working directory, else the
/// platform config directory.
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("undoline").join(CONFIG_FILE_NAME);
    }
    local
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            info!(target: "config", path = %path.display(), "config_loaded");
            Ok(Config {
                raw: Some(content),
                file,
                source: Some(path),
            })
        }
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed_using_defaults");
            Ok(Config::default())
        }
    }
}

impl Config {
    /// Placeholder printed for out-of-range lines. A placeholder containing
    /// a line break would desynchronize output, so it falls back to the
    /// default.
    pub fn placeholder(&self) -> &str {
        let raw = self.file.print.placeholder.as_str();
        if raw.contains(['\n', '\r']) {
            info!(target: "config", raw, "placeholder_rejected_using_default");
            return ".";
        }
        raw
    }

    /// Full path of the log file.
    pub fn log_path(&self) -> PathBuf {
        self.file.log.directory.join(&self.file.log.file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex, MutexGuard};
    use tracing::Level;
    use tracing::subscriber::with_default;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone)]
    struct BufferWriter {
        inner: Arc<Mutex<Vec<u8>>>,
    }

    impl BufferWriter {
        fn new() -> (Self, Arc<Mutex<Vec<u8>>>) {
            let buf = Arc::new(Mutex::new(Vec::new()));
            (Self { inner: buf.clone() }, buf)
        }
    }

    struct LockedWriter<'a> {
        guard: MutexGuard<'a, Vec<u8>>,
    }

    impl<'a> Write for LockedWriter<'a> {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.guard.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for BufferWriter {
        type Writer = LockedWriter<'a>;

        fn make_writer(&'a self) -> Self::Writer {
            LockedWriter {
                guard: self.inner.lock().expect("log buffer poisoned"),
            }
        }
    }

    fn capture_logs<F: FnOnce()>(f: F) -> String {
        let (writer, buffer) = BufferWriter::new();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::INFO)
            .with_target(true)
            .with_ansi(false)
            .without_time()
            .with_writer(writer)
            .finish();
        with_default(subscriber, f);
        String::from_utf8(buffer.lock().unwrap().clone()).unwrap()
    }

    #[test]
    fn default_config_when_missing_file() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_hopefully__.toml"))).unwrap();
        assert_eq!(cfg.placeholder(), ".");
        assert!(!cfg.file.input.skip_malformed);
        assert!(cfg.file.log.enabled);
        assert_eq!(cfg.log_path(), PathBuf::from(".").join("undoline.log"));
        assert!(cfg.source.is_none());
    }

    #[test]
    fn parses_all_sections() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            "[print]\nplaceholder = \"~\"\n[input]\nskip_malformed = true\n[log]\nenabled = false\ndirectory = \"/tmp/ul\"\nfile = \"run.log\"\n",
        )
        .unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.placeholder(), "~");
        assert!(cfg.file.input.skip_malformed);
        assert!(!cfg.file.log.enabled);
        assert_eq!(cfg.log_path(), PathBuf::from("/tmp/ul/run.log"));
        assert_eq!(cfg.source.as_deref(), Some(tmp.path()));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[input]\nskip_malformed = true\nunknown = 3\n").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert!(cfg.file.input.skip_malformed);
        assert_eq!(cfg.placeholder(), ".");
        assert_eq!(cfg.file.log.file, "undoline.log");
    }

    #[test]
    fn parse_error_falls_back_and_warns() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[print\nplaceholder = 1\n").unwrap();
        let mut cfg = None;
        let logs = capture_logs(|| {
            cfg = Some(load_from(Some(tmp.path().to_path_buf())).unwrap());
        });
        let cfg = cfg.unwrap();
        assert!(cfg.raw.is_none());
        assert_eq!(cfg.placeholder(), ".");
        assert!(logs.contains("WARN config:"));
        assert!(logs.contains("config_parse_failed_using_defaults"));
    }

    #[test]
    fn multiline_placeholder_rejected_with_log() {
        let mut cfg = Config::default();
        cfg.file.print.placeholder = "a\nb".to_string();
        let mut placeholder = String::new();
        let logs = capture_logs(|| {
            placeholder = cfg.placeholder().to_string();
        });
        assert_eq!(placeholder, ".");
        assert!(logs.contains("INFO config:"));
        assert!(logs.contains("placeholder_rejected_using_default"));
    }
}
