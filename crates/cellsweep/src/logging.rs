use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_FILE: &str = "cellsweep.log";

/// Maximum log file size before rotation (5 MB)
const MAX_LOG_SIZE: u64 = 5 * 1024 * 1024;
/// Size to keep after rotation (1 MB of most recent logs)
const KEEP_SIZE: u64 = 1024 * 1024;

/// `~/.cellsweep`, or `./.cellsweep` without a home directory
pub fn default_log_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".cellsweep")
}

/// Keep only the most recent KEEP_SIZE bytes once the log outgrows
/// MAX_LOG_SIZE.
pub(crate) fn rotate_log_if_needed(log_path: &Path) -> io::Result<()> {
    if !log_path.exists() {
        return Ok(());
    }

    let metadata = fs::metadata(log_path)?;
    if metadata.len() <= MAX_LOG_SIZE {
        return Ok(());
    }

    let mut file = File::open(log_path)?;
    let start_pos = metadata.len().saturating_sub(KEEP_SIZE);
    file.seek(SeekFrom::Start(start_pos))?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)?;
    drop(file);

    // Skip to the first newline to avoid partial lines
    let skip = buffer
        .iter()
        .position(|&b| b == b'\n')
        .map(|i| i + 1)
        .unwrap_or(0);

    let mut file = File::create(log_path)?;
    file.write_all(b"--- Log rotated (older entries removed) ---\n")?;
    file.write_all(&buffer[skip..])?;
    Ok(())
}

/// Hands out writers to the shared log file
#[derive(Clone)]
struct LogWriterFactory {
    file: Arc<Mutex<File>>,
}

struct LogWriter {
    file: Arc<Mutex<File>>,
}

impl LogWriter {
    fn lock(&self) -> io::Result<std::sync::MutexGuard<'_, File>> {
        self.file
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))
    }
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.lock()?.flush()
    }
}

impl<'a> MakeWriter<'a> for LogWriterFactory {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriter {
            file: self.file.clone(),
        }
    }
}

/// Initialize logging to stderr and, with a `log_dir`, to
/// `{log_dir}/cellsweep.log`.
///
/// Stdout is left to the planned jobs. Both outputs are filtered by `level`
/// unless `RUST_LOG` is set. Once the file passes 5 MB it is cut down to its
/// last 1 MB.
pub fn init_logging(log_dir: Option<&Path>, level: &str) -> color_eyre::Result<()> {
    let file_layer = match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            let log_path = dir.join(LOG_FILE);
            if let Err(e) = rotate_log_if_needed(&log_path) {
                eprintln!("Warning: Failed to rotate log file: {e}");
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)?;
            let writer_factory = LogWriterFactory {
                file: Arc::new(Mutex::new(file)),
            };
            Some(
                fmt::layer()
                    .with_writer(writer_factory)
                    .with_ansi(false)
                    .with_target(true)
                    .with_thread_ids(false),
            )
        }
        None => None,
    };

    let default_filter = format!("cellsweep={level},cellsweep_core={level}");
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .with(file_layer)
        .init();

    tracing::debug!(
        log_dir = ?log_dir.map(Path::display),
        "cellsweep logging initialized"
    );
    Ok(())
}
