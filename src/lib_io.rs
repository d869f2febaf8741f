#![deny(warnings)]
#![warn(clippy::pedantic)]

use anyhow::{bail, Context, Result as AnyResult};
use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::Path;
use std::time::Duration;
use tempfile::NamedTempFile;

use crate::lib_cpu::{spin_cpu, DutyCycle};

const CHUNK_FILL: u8 = 0x31;

/// Writes `chunks` chunks of `chunk_bytes` to `file`, flushing after each
/// chunk so every burst reaches the OS before the next begins.
pub fn write_chunked(file: &File, chunk_bytes: usize, chunks: usize) -> AnyResult<()> {
    let chunk = vec![CHUNK_FILL; chunk_bytes];
    let mut writer = BufWriter::new(file);
    for _ in 0..chunks {
        writer.write_all(&chunk).context("write chunk")?;
        writer.flush().context("flush chunk")?;
    }
    Ok(())
}

/// Sleeps `total / 2`, writes `chunks * chunk_bytes` to a scoped scratch file
/// in `dir`, then sleeps the remaining `total / 2`. The file is deleted on
/// every exit path.
pub fn write_burst(dir: &Path, chunk_bytes: usize, chunks: usize, total: Duration) -> AnyResult<()> {
    let half = total / 2;
    std::thread::sleep(half);
    let file = NamedTempFile::new_in(dir).context("create scratch file")?;
    write_chunked(file.as_file(), chunk_bytes, chunks)?;
    std::thread::sleep(half);
    file.close().context("remove scratch file")?;
    Ok(())
}

/// `rounds` times: rewrite the full scratch file, then spin one core at full
/// duty for `total / rounds`. Alternates I/O and CPU bursts so a monitor must
/// attribute each correctly.
pub fn write_mixed_cpu(
    dir: &Path,
    chunk_bytes: usize,
    chunks: usize,
    rounds: u32,
    total: Duration,
) -> AnyResult<()> {
    if rounds == 0 {
        bail!("rounds must be > 0");
    }
    let spin = total / rounds;
    let file = NamedTempFile::new_in(dir).context("create scratch file")?;
    for _ in 0..rounds {
        let mut f = file.as_file();
        f.seek(SeekFrom::Start(0)).context("rewind scratch file")?;
        f.set_len(0).context("truncate scratch file")?;
        write_chunked(file.as_file(), chunk_bytes, chunks)?;
        spin_cpu(spin, DutyCycle::Full);
    }
    file.close().context("remove scratch file")?;
    Ok(())
}
