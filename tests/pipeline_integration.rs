#![deny(warnings)]
#![warn(clippy::pedantic)]

use std::time::{Duration, Instant};

use loadbench::{
    spin_cpu, DutyCycle, Pipeline, PipelineRunner, ResourceBudget, RunState, Stage, Variant,
};

fn fixed_spin(name: &'static str, millis: u64) -> Variant {
    Variant::new(name, ResourceBudget::unspecified(), move |_| {
        spin_cpu(Duration::from_millis(millis), DutyCycle::Full);
        Ok(())
    })
}

#[test]
fn runner_starts_in_not_started() {
    let pipeline = Pipeline {
        stages: vec![Stage {
            name: "one",
            variants: vec![fixed_spin("solo", 1)],
        }],
    };
    let runner = PipelineRunner::new(pipeline, Duration::from_secs(1)).expect("runner");
    assert_eq!(runner.state(), RunState::NotStarted);
}

#[test]
fn zero_step_duration_is_rejected() {
    let pipeline = Pipeline {
        stages: vec![Stage {
            name: "one",
            variants: vec![fixed_spin("solo", 1)],
        }],
    };
    assert!(PipelineRunner::new(pipeline, Duration::ZERO).is_err());
}

#[tokio::test(flavor = "multi_thread")]
async fn intra_stage_parallel_inter_stage_sequential() {
    // 500ms stage, then two 300ms variants fanned out: roughly 800ms total,
    // not the 1100ms a serialized run would take.
    let pipeline = Pipeline {
        stages: vec![
            Stage {
                name: "one",
                variants: vec![fixed_spin("solo", 500)],
            },
            Stage {
                name: "two",
                variants: vec![fixed_spin("left", 300), fixed_spin("right", 300)],
            },
        ],
    };
    let runner = PipelineRunner::new(pipeline, Duration::from_secs(1)).expect("runner");
    let start = Instant::now();
    let report = runner.run().await;
    let elapsed = start.elapsed();
    assert!(report.success());
    assert!(elapsed >= Duration::from_millis(800), "took {elapsed:?}");
    assert!(elapsed < Duration::from_millis(1100), "took {elapsed:?}");

    // Barrier join: every stage-one end precedes every stage-two start.
    let one_end = report
        .outcomes
        .iter()
        .filter(|o| o.stage == "one")
        .map(|o| o.ended_ts_millis)
        .max()
        .expect("stage one ran");
    let two_start = report
        .outcomes
        .iter()
        .filter(|o| o.stage == "two")
        .map(|o| o.started_ts_millis)
        .min()
        .expect("stage two ran");
    assert!(one_end <= two_start, "stage two started before stage one joined");
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_variant_never_blocks_siblings_or_later_stages() {
    let pipeline = Pipeline {
        stages: vec![
            Stage {
                name: "one",
                variants: vec![
                    Variant::new("bad", ResourceBudget::unspecified(), |_| {
                        anyhow::bail!("allocation refused")
                    }),
                    fixed_spin("good", 200),
                ],
            },
            Stage {
                name: "two",
                variants: vec![fixed_spin("after", 100)],
            },
        ],
    };
    let runner = PipelineRunner::new(pipeline, Duration::from_secs(1)).expect("runner");
    let report = runner.run().await;
    assert!(!report.success());
    assert_eq!(report.failed().len(), 1);
    let good = report
        .outcomes
        .iter()
        .find(|o| o.variant == "good")
        .expect("sibling completed");
    assert!(good.error.is_none());
    assert!(
        report.outcomes.iter().any(|o| o.variant == "after"),
        "later stage did not run"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn panicking_variant_is_recorded_as_failed() {
    let pipeline = Pipeline {
        stages: vec![Stage {
            name: "one",
            variants: vec![
                Variant::new("panics", ResourceBudget::unspecified(), |_| {
                    panic!("boom")
                }),
                fixed_spin("steady", 100),
            ],
        }],
    };
    let runner = PipelineRunner::new(pipeline, Duration::from_secs(1)).expect("runner");
    let report = runner.run().await;
    assert!(!report.success());
    let panicked = report
        .outcomes
        .iter()
        .find(|o| o.variant == "panics")
        .expect("recorded");
    assert!(panicked.error.is_some());
    let steady = report
        .outcomes
        .iter()
        .find(|o| o.variant == "steady")
        .expect("sibling completed");
    assert!(steady.error.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn report_serializes_outcomes() {
    let pipeline = Pipeline {
        stages: vec![Stage {
            name: "one",
            variants: vec![fixed_spin("solo", 10)],
        }],
    };
    let runner = PipelineRunner::new(pipeline, Duration::from_secs(1)).expect("runner");
    let report = runner.run().await;
    let json = serde_json::to_string(&report).expect("serialize");
    assert!(json.contains("solo"));
}
