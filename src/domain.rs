#![deny(warnings)]
#![warn(clippy::pedantic)]

use anyhow::{bail, Result as AnyResult};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// A load scenario body: side effects only, invoked once per pipeline run
/// with the run's step duration.
pub type PatternFn = Arc<dyn Fn(Duration) -> AnyResult<()> + Send + Sync>;

/// Declared core count for a variant. `Unspecified` defers to the host
/// scheduler's default.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CoreRequest {
    Unspecified,
    Cores(f64),
}

impl CoreRequest {
    #[must_use]
    pub fn count(self) -> Option<f64> {
        match self {
            Self::Unspecified => None,
            Self::Cores(n) => Some(n),
        }
    }
}

/// Pure placement metadata for the external scheduler. Never self-enforced:
/// an underprovisioned variant deliberately requests fewer cores than it
/// saturates.
#[derive(Clone, Copy, Debug)]
pub struct ResourceBudget {
    pub cores: CoreRequest,
    pub memory_mb: Option<u32>,
}

impl ResourceBudget {
    #[must_use]
    pub fn cores(n: f64) -> Self {
        Self {
            cores: CoreRequest::Cores(n),
            memory_mb: None,
        }
    }

    #[must_use]
    pub fn memory(mb: u32) -> Self {
        Self {
            cores: CoreRequest::Unspecified,
            memory_mb: Some(mb),
        }
    }

    #[must_use]
    pub fn unspecified() -> Self {
        Self {
            cores: CoreRequest::Unspecified,
            memory_mb: None,
        }
    }
}

/// One concrete load scenario with its declared budget.
#[derive(Clone)]
pub struct Variant {
    pub name: &'static str,
    pub budget: ResourceBudget,
    pattern: PatternFn,
}

impl Variant {
    pub fn new<F>(name: &'static str, budget: ResourceBudget, pattern: F) -> Self
    where
        F: Fn(Duration) -> AnyResult<()> + Send + Sync + 'static,
    {
        Self {
            name,
            budget,
            pattern: Arc::new(pattern),
        }
    }

    #[must_use]
    pub fn pattern(&self) -> PatternFn {
        Arc::clone(&self.pattern)
    }

    pub fn execute(&self, step: Duration) -> AnyResult<()> {
        (self.pattern)(step)
    }
}

/// A barrier grouping: every variant must terminate before the pipeline
/// advances past the stage.
#[derive(Clone)]
pub struct Stage {
    pub name: &'static str,
    pub variants: Vec<Variant>,
}

/// Ordered stages; strict sequencing at stage boundaries, no ordering among
/// a stage's variants.
#[derive(Clone)]
pub struct Pipeline {
    pub stages: Vec<Stage>,
}

impl Pipeline {
    pub fn validate(&self) -> AnyResult<()> {
        if self.stages.is_empty() {
            bail!("pipeline has no stages");
        }
        let mut seen = HashSet::new();
        for stage in &self.stages {
            if stage.name.trim().is_empty() {
                bail!("stage name is empty");
            }
            if stage.variants.is_empty() {
                bail!(format!("stage {} has no variants", stage.name));
            }
            for variant in &stage.variants {
                if variant.name.trim().is_empty() {
                    bail!(format!("stage {} has an unnamed variant", stage.name));
                }
                if !seen.insert(variant.name) {
                    bail!(format!("duplicate variant name: {}", variant.name));
                }
            }
        }
        Ok(())
    }

    /// Static per-variant placement metadata, in stage order, for the
    /// external orchestration layer.
    #[must_use]
    pub fn budget_manifest(&self) -> Vec<BudgetEntry> {
        self.stages
            .iter()
            .flat_map(|stage| {
                stage.variants.iter().map(|variant| BudgetEntry {
                    stage: stage.name,
                    variant: variant.name,
                    cores: variant.budget.cores.count(),
                    memory_mb: variant.budget.memory_mb,
                })
            })
            .collect()
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct BudgetEntry {
    pub stage: &'static str,
    pub variant: &'static str,
    pub cores: Option<f64>,
    pub memory_mb: Option<u32>,
}
