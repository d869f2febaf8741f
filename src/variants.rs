#![deny(warnings)]
#![warn(clippy::pedantic)]

use std::time::Duration;

use crate::domain::{Pipeline, ResourceBudget, Stage, Variant};
use crate::lib_cpu::{spin_cpu, spin_cpu_percentage, DutyCycle};
use crate::lib_io;
use crate::lib_mem::{self, Touch};
use crate::lib_mmap::{self, TouchPattern};
use crate::parallel::run_concurrently;

const MB: usize = 1_000_000;
const GB: usize = 1_000_000_000;

const STAIRCASE_CHUNKS: u32 = 16;
const STAIRCASE_CHUNK_BYTES: usize = 512 * MB;
const SPIKE_HOLD: Duration = Duration::from_secs(10);
const MMAP_FILE_BYTES: usize = 2 * GB;
const MMAP_STEP_BYTES: usize = 256 * MB;
const IO_CHUNK_BYTES: usize = GB;
const IO_CHUNKS: usize = 8;
const IO_MIXED_ROUNDS: u32 = 10;

/// The monitor-validation pipeline: CPU stage, then memory stage, then I/O
/// stage, each fanning out into independently-budgeted load variants.
#[must_use]
pub fn monitor_pipeline() -> Pipeline {
    Pipeline {
        stages: vec![cpu_stage(), memory_stage(), io_stage()],
    }
}

fn cpu_stage() -> Stage {
    Stage {
        name: "cpu",
        variants: vec![
            // One core, 100% utilized.
            Variant::new("cpu_1core", ResourceBudget::cores(1.0), |step| {
                spin_cpu(step, DutyCycle::Full);
                Ok(())
            }),
            // Two cores, each 100% utilized.
            Variant::new("cpu_2cores", ResourceBudget::cores(2.0), |step| {
                run_concurrently(
                    || {
                        spin_cpu(step, DutyCycle::Full);
                        Ok(())
                    },
                    2,
                )
            }),
            // One core, 50% utilized.
            Variant::new("cpu_1core_halfload", ResourceBudget::cores(2.0), |step| {
                spin_cpu(step, DutyCycle::Half);
                Ok(())
            }),
            // Two cores, each 50% utilized.
            Variant::new("cpu_2cores_halfload", ResourceBudget::cores(2.0), |step| {
                run_concurrently(
                    || {
                        spin_cpu(step, DutyCycle::Half);
                        Ok(())
                    },
                    2,
                )
            }),
            // Eight cores, each 100% utilized.
            Variant::new("cpu_8cores", ResourceBudget::cores(8.0), |step| {
                run_concurrently(
                    || {
                        spin_cpu(step, DutyCycle::Full);
                        Ok(())
                    },
                    8,
                )
            }),
            // Eight spinning cores but only four requested; the over-commit
            // is the test condition.
            Variant::new(
                "cpu_8cores_underprovisioned",
                ResourceBudget::cores(4.0),
                |step| {
                    run_concurrently(
                        || {
                            spin_cpu(step, DutyCycle::Full);
                            Ok(())
                        },
                        8,
                    )
                },
            ),
            // One core paced per-second at 25%.
            Variant::new("cpu_1core_25pct", ResourceBudget::cores(1.0), |step| {
                spin_cpu_percentage(step.as_secs(), 25);
                Ok(())
            }),
        ],
    }
}

fn memory_stage() -> Stage {
    Stage {
        name: "memory",
        variants: vec![
            // Allocate 2GB, fill it, and sit on it.
            Variant::new("mem_flat_2gb", ResourceBudget::memory(3000), |step| {
                lib_mem::hold_flat(2 * GB, step, Touch::Fill)
            }),
            // Allocate 8GB, fill it, and sit on it.
            Variant::new("mem_flat_8gb", ResourceBudget::memory(10_000), |step| {
                lib_mem::hold_flat(8 * GB, step, Touch::Fill)
            }),
            // Reserve 8GB without touching it; resident size should stay low.
            Variant::new(
                "mem_flat_8gb_untouched",
                ResourceBudget::memory(10_000),
                |step| lib_mem::hold_flat(8 * GB, step, Touch::None),
            ),
            // Allocate 8GB in 0.5GB increments.
            Variant::new("mem_staircase_8gb", ResourceBudget::memory(10_000), |step| {
                lib_mem::staircase(STAIRCASE_CHUNKS, STAIRCASE_CHUNK_BYTES, step)
            }),
            // Spike a 2GB allocation for 10 seconds.
            Variant::new("mem_spike_2gb", ResourceBudget::memory(3000), |step| {
                lib_mem::spike(2 * GB, step, SPIKE_HOLD)
            }),
            // Map a 2GB file and never touch it.
            Variant::new("mem_mmap_untouched", ResourceBudget::memory(500), |step| {
                lib_mmap::mmap_file(
                    &std::env::temp_dir(),
                    MMAP_FILE_BYTES,
                    TouchPattern::None,
                    step,
                )
            }),
            // Touch the mapped file in 256MB increments.
            Variant::new("mem_mmap_staircase", ResourceBudget::memory(3000), |step| {
                lib_mmap::mmap_file(
                    &std::env::temp_dir(),
                    MMAP_FILE_BYTES,
                    TouchPattern::Staircase {
                        step_bytes: MMAP_STEP_BYTES,
                    },
                    step,
                )
            }),
            // Touch the whole mapped file at once.
            Variant::new("mem_mmap_touch_all", ResourceBudget::memory(3000), |step| {
                lib_mmap::mmap_file(
                    &std::env::temp_dir(),
                    MMAP_FILE_BYTES,
                    TouchPattern::Full,
                    step,
                )
            }),
        ],
    }
}

fn io_stage() -> Stage {
    Stage {
        name: "io",
        variants: vec![
            // Wait, write 8GB to a file, and wait.
            Variant::new("io_write_8gb", ResourceBudget::memory(2000), |step| {
                lib_io::write_burst(&std::env::temp_dir(), IO_CHUNK_BYTES, IO_CHUNKS, step)
            }),
            // Ten times: write 8GB, then spin one core.
            Variant::new(
                "io_write_8gb_mixed_cpu",
                ResourceBudget::memory(2000),
                |step| {
                    lib_io::write_mixed_cpu(
                        &std::env::temp_dir(),
                        IO_CHUNK_BYTES,
                        IO_CHUNKS,
                        IO_MIXED_ROUNDS,
                        step,
                    )
                },
            ),
        ],
    }
}
