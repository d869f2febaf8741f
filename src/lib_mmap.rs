#![deny(warnings)]
#![warn(clippy::pedantic)]

use anyhow::{bail, Context, Result as AnyResult};
use memmap2::Mmap;
use std::hint::black_box;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tempfile::NamedTempFile;

const WRITE_CHUNK: usize = 64 * 1024 * 1024;
const PAGE: usize = 4096;

/// Access discipline applied to the mapped file.
#[derive(Clone, Copy, Debug)]
pub enum TouchPattern {
    /// Map but never touch a page; resident size should barely move even
    /// though virtual size grows by the file size.
    None,
    /// Touch the mapping in `step_bytes` increments with equal pauses so the
    /// page faults draw a resident staircase.
    Staircase { step_bytes: usize },
    /// Touch every page up front, then hold.
    Full,
}

/// Creates a uniquely-named temporary file of `bytes` under `dir`, maps it
/// read-only, and applies `touch` over roughly `total` wall-clock time.
///
/// The mapping and the file are scoped: unmap and deletion happen on every
/// exit path, error returns included.
pub fn mmap_file(dir: &Path, bytes: usize, touch: TouchPattern, total: Duration) -> AnyResult<()> {
    if bytes == 0 {
        bail!("mapping size must be > 0");
    }
    let mut file = NamedTempFile::new_in(dir).context("create mapping file")?;
    write_filler(&mut file, bytes)?;
    let map = map_readonly(file.as_file())?;
    match touch {
        TouchPattern::None => std::thread::sleep(total),
        TouchPattern::Staircase { step_bytes } => {
            let step_bytes = step_bytes.max(PAGE);
            let steps = bytes.div_ceil(step_bytes);
            let pause = total / u32::try_from(steps).unwrap_or(u32::MAX).max(1);
            for i in 0..steps {
                touch_range(&map, i * step_bytes, step_bytes);
                std::thread::sleep(pause);
            }
        }
        TouchPattern::Full => {
            touch_range(&map, 0, bytes);
            std::thread::sleep(total);
        }
    }
    drop(map);
    file.close().context("remove mapping file")?;
    Ok(())
}

fn write_filler(file: &mut NamedTempFile, bytes: usize) -> AnyResult<()> {
    let chunk = vec![crate::lib_mem::FILL_BYTE; WRITE_CHUNK.min(bytes)];
    let mut remaining = bytes;
    while remaining > 0 {
        let n = remaining.min(chunk.len());
        file.write_all(&chunk[..n]).context("fill mapping file")?;
        remaining -= n;
    }
    file.flush().context("flush mapping file")?;
    Ok(())
}

#[allow(unsafe_code)]
fn map_readonly(file: &std::fs::File) -> AnyResult<Mmap> {
    // SAFETY: the file is exclusively owned by the caller and is neither
    // truncated nor written for the lifetime of the read-only mapping.
    let map = unsafe { Mmap::map(file) }.context("map file")?;
    Ok(map)
}

/// Reads one byte per page across the range, forcing the pages resident.
fn touch_range(map: &Mmap, start: usize, len: usize) {
    let end = start.saturating_add(len).min(map.len());
    let mut sum = 0_u64;
    let mut i = start.min(map.len());
    while i < end {
        sum = sum.wrapping_add(u64::from(map[i]));
        i += PAGE;
    }
    black_box(sum);
}
