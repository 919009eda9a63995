use anyhow::{Context, Result, bail};
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

pub const LOG_FILE_NAME: &str = "development.log";
const LOG_LEVEL_ENV: &str = "LOG_LEVEL";
const DEFAULT_LOG_LEVEL: &str = "debug";
const TAIL_LINES: usize = 10;
const TAIL_CHUNK: usize = 4096;
const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub fn log_path(config_dir: &Path) -> PathBuf {
    config_dir.join(LOG_FILE_NAME)
}

/// Install a file subscriber writing to `<config_dir>/development.log`.
///
/// The returned guard must outlive all logging; dropping it flushes the
/// background writer. Returns `Ok(None)` if a global subscriber is already set.
pub fn init_file_logging(config_dir: &Path) -> Result<Option<WorkerGuard>, InitError> {
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(LOG_FILE_NAME)
        .build(config_dir)?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_env(LOG_LEVEL_ENV)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .is_ok();

    Ok(installed.then_some(guard))
}

/// Print the end of the debug log and follow it until interrupted.
pub fn tail_logs(config_dir: &Path) -> Result<()> {
    let path = log_path(config_dir);
    if !path.exists() {
        bail!(
            "Log file does not exist at '{}'. Run `lazygit --debug` first to create the log file",
            path.display()
        );
    }

    println!("Tailing log file {}\n", path.display());

    let mut file = File::open(&path)
        .with_context(|| format!("Failed to open log file '{}'", path.display()))?;
    let start = tail_offset(&mut file, TAIL_LINES, TAIL_CHUNK)
        .with_context(|| format!("Failed to read log file '{}'", path.display()))?;

    follow(file, start, io::stdout().lock(), POLL_INTERVAL, || false)?;
    Ok(())
}

/// Byte offset at which the last `n` lines of `reader` begin.
///
/// Reads backwards from the end in `chunk`-sized blocks, so only the tail of
/// the file is read.
fn tail_offset<R: Read + Seek>(reader: &mut R, n: usize, chunk: usize) -> io::Result<u64> {
    let len = reader.seek(SeekFrom::End(0))?;
    let mut buf = vec![0; chunk.max(1)];
    let mut end = len;
    let mut newlines = 0;

    while end > 0 {
        let start = end.saturating_sub(buf.len() as u64);
        let block = &mut buf[..(end - start) as usize];
        reader.seek(SeekFrom::Start(start))?;
        reader.read_exact(block)?;

        for (i, byte) in block.iter().enumerate().rev() {
            let pos = start + i as u64;
            // A trailing newline terminates the last line rather than starting a new one
            if *byte != b'\n' || pos + 1 == len {
                continue;
            }
            newlines += 1;
            if newlines == n {
                return Ok(pos + 1);
            }
        }
        end = start;
    }
    Ok(0)
}

/// Copy bytes appended to `reader` after `start` into `out`, polling every
/// `poll`. A file that shrinks is treated as truncated and re-read from the top.
/// `stop` is checked after each poll.
fn follow<R, W>(
    mut reader: R,
    start: u64,
    mut out: W,
    poll: Duration,
    mut stop: impl FnMut() -> bool,
) -> io::Result<()>
where
    R: Read + Seek,
    W: Write,
{
    let mut pos = start;
    loop {
        let len = reader.seek(SeekFrom::End(0))?;
        if len < pos {
            pos = 0;
        }
        if len > pos {
            reader.seek(SeekFrom::Start(pos))?;
            let mut chunk = Vec::new();
            (&mut reader).take(len - pos).read_to_end(&mut chunk)?;
            out.write_all(&chunk)?;
            out.flush()?;
            pos = len;
        }
        if stop() {
            return Ok(());
        }
        thread::sleep(poll);
    }
}
