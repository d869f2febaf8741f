#![deny(warnings)]
#![warn(clippy::pedantic)]

use anyhow::{bail, Result as AnyResult};
use chrono::Utc;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use crate::domain::Pipeline;

/// Explicit pipeline state: stages run strictly in sequence, and a stage is
/// joined only once every variant launched in it has terminated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    StageRunning(usize),
    StageJoined(usize),
    Ended,
}

/// What one variant execution did: wall-clock window plus the failure, if any.
#[derive(Clone, Debug, Serialize)]
pub struct VariantOutcome {
    pub stage: &'static str,
    pub variant: &'static str,
    pub started_ts_millis: i64,
    pub ended_ts_millis: i64,
    pub error: Option<String>,
}

/// Shared record of variant outcomes, written as variants terminate.
#[derive(Clone, Default)]
pub struct RunLedger {
    inner: Arc<Mutex<Vec<VariantOutcome>>>,
}

impl RunLedger {
    fn record(&self, outcome: VariantOutcome) {
        self.inner.lock().push(outcome);
    }

    #[must_use]
    pub fn outcomes(&self) -> Vec<VariantOutcome> {
        self.inner.lock().clone()
    }
}

pub struct PipelineRunner {
    pipeline: Pipeline,
    step: Duration,
    state: RunState,
    ledger: RunLedger,
}

impl PipelineRunner {
    pub fn new(pipeline: Pipeline, step: Duration) -> AnyResult<Self> {
        if step.is_zero() {
            bail!("step duration must be > 0");
        }
        pipeline.validate()?;
        Ok(Self {
            pipeline,
            step,
            state: RunState::NotStarted,
            ledger: RunLedger::default(),
        })
    }

    #[must_use]
    pub fn state(&self) -> RunState {
        self.state
    }

    #[must_use]
    pub fn ledger(&self) -> RunLedger {
        self.ledger.clone()
    }

    /// Runs every stage in order. Each stage fans its variants out onto
    /// blocking workers and joins the full set before advancing; a variant
    /// failure is recorded but never blocks siblings or later stages.
    pub async fn run(mut self) -> RunReport {
        let stages = self.pipeline.stages.clone();
        for (idx, stage) in stages.iter().enumerate() {
            self.state = RunState::StageRunning(idx);
            info!(stage = stage.name, variants = stage.variants.len(), "stage fan-out");
            let mut handles = Vec::with_capacity(stage.variants.len());
            for variant in &stage.variants {
                let pattern = variant.pattern();
                let step = self.step;
                let stage_name = stage.name;
                let name = variant.name;
                let ledger = self.ledger.clone();
                handles.push((
                    name,
                    tokio::task::spawn_blocking(move || {
                        let started = Utc::now().timestamp_millis();
                        info!(stage = stage_name, variant = name, "variant start");
                        let result = pattern(step);
                        let ended = Utc::now().timestamp_millis();
                        let error = result.err().map(|e| format!("{e:#}"));
                        match &error {
                            Some(reason) => {
                                error!(stage = stage_name, variant = name, error = %reason, "variant failed");
                            }
                            None => info!(stage = stage_name, variant = name, "variant done"),
                        }
                        ledger.record(VariantOutcome {
                            stage: stage_name,
                            variant: name,
                            started_ts_millis: started,
                            ended_ts_millis: ended,
                            error,
                        });
                    }),
                ));
            }
            // Barrier join: wait for the whole fan-out set, failures included.
            for (name, handle) in handles {
                if let Err(e) = handle.await {
                    let now = Utc::now().timestamp_millis();
                    error!(stage = stage.name, variant = name, error = %e, "variant panicked");
                    self.ledger.record(VariantOutcome {
                        stage: stage.name,
                        variant: name,
                        started_ts_millis: now,
                        ended_ts_millis: now,
                        error: Some(format!("variant panicked: {e}")),
                    });
                }
            }
            self.state = RunState::StageJoined(idx);
            info!(stage = stage.name, "stage joined");
        }
        self.state = RunState::Ended;
        info!("pipeline ended");
        RunReport {
            outcomes: self.ledger.outcomes(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct RunReport {
    pub outcomes: Vec<VariantOutcome>,
}

impl RunReport {
    /// True only when every variant completed without error.
    #[must_use]
    pub fn success(&self) -> bool {
        self.outcomes.iter().all(|o| o.error.is_none())
    }

    #[must_use]
    pub fn failed(&self) -> Vec<&VariantOutcome> {
        self.outcomes.iter().filter(|o| o.error.is_some()).collect()
    }
}
