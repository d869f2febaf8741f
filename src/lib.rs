#![deny(unsafe_code)]
#![deny(warnings)]
#![warn(clippy::pedantic)]

pub mod domain;
pub mod lib_cpu;
pub mod lib_io;
pub mod lib_mem;
pub mod lib_mmap;
pub mod memwatch;
pub mod parallel;
pub mod runner;
pub mod variants;

pub use domain::{BudgetEntry, CoreRequest, Pipeline, ResourceBudget, Stage, Variant};
pub use lib_cpu::{spin_cpu, spin_cpu_percentage, DutyCycle};
pub use memwatch::MemoryReporter;
pub use parallel::run_concurrently;
pub use runner::{PipelineRunner, RunReport, RunState, VariantOutcome};
pub use variants::monitor_pipeline;
