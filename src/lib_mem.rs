#![deny(warnings)]
#![warn(clippy::pedantic)]

use anyhow::{Context, Result as AnyResult};
use memmap2::MmapMut;
use std::time::Duration;

/// Byte written when a pattern fills its buffers.
pub const FILL_BYTE: u8 = 0x61;

/// Whether an allocation pattern writes its buffer or leaves it uncommitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Touch {
    /// Reserve only; resident size may stay low under lazy commit.
    None,
    /// Write every byte, forcing full resident-set growth.
    Fill,
}

/// Allocates one contiguous buffer of `bytes`, holds it for `hold`, then
/// releases it on return.
pub fn hold_flat(bytes: usize, hold: Duration, touch: Touch) -> AnyResult<()> {
    let mut buf: Vec<u8> = Vec::new();
    buf.try_reserve_exact(bytes).context("allocate flat buffer")?;
    if touch == Touch::Fill {
        buf.resize(bytes, FILL_BYTE);
    }
    std::thread::sleep(hold);
    drop(buf);
    Ok(())
}

/// Allocates `chunks` equal filled chunks sequentially, sleeping
/// `total / (chunks + 1)` after each one and once more at the end, then
/// releases everything together.
pub fn staircase(chunks: u32, chunk_bytes: usize, total: Duration) -> AnyResult<()> {
    let pause = total / (chunks + 1);
    let mut held: Vec<Vec<u8>> = Vec::with_capacity(chunks as usize);
    for _ in 0..chunks {
        let mut chunk: Vec<u8> = Vec::new();
        chunk
            .try_reserve_exact(chunk_bytes)
            .context("allocate staircase chunk")?;
        chunk.resize(chunk_bytes, FILL_BYTE);
        held.push(chunk);
        std::thread::sleep(pause);
    }
    std::thread::sleep(pause);
    drop(held);
    Ok(())
}

/// Fixed-size anonymous mapping taken directly from the kernel, bypassing the
/// heap allocator so the spike is immediately visible to a monitor once
/// zeroed. Unmapped on drop on every exit path.
pub struct RawBlock {
    map: MmapMut,
}

impl RawBlock {
    pub fn allocate(len: usize) -> AnyResult<Self> {
        let map = MmapMut::map_anon(len).context("map anonymous block")?;
        Ok(Self { map })
    }

    /// Writes every byte, faulting each page into the resident set.
    pub fn zero(&mut self) {
        self.map.fill(0);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Sleeps `total / 2`, raises a zeroed `bytes`-sized spike for `hold`, frees
/// it, then sleeps the remaining `total / 2`.
pub fn spike(bytes: usize, total: Duration, hold: Duration) -> AnyResult<()> {
    let half = total / 2;
    std::thread::sleep(half);
    let mut block = RawBlock::allocate(bytes)?;
    block.zero();
    std::thread::sleep(hold);
    drop(block);
    std::thread::sleep(half);
    Ok(())
}
