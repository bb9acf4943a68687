//! Property-based tests for scheduler totality
//!
//! Whatever the probes do, a tier returns one record per probe and the
//! record status matches the probe's behaviour.

use collector::{Config, FnProbe, Probe, Scheduler, ScheduledProbe};
use evidence_core::{ProbeDescriptor, ProbeError, ProbeErrorKind, Target, Tier};
use proptest::prelude::*;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
enum Behaviour {
    Object,
    Null,
    Scalar,
    Raise,
    SelfReported,
    Panic,
}

impl Behaviour {
    fn expected(self) -> Option<ProbeErrorKind> {
        match self {
            Behaviour::Object => None,
            Behaviour::Null | Behaviour::Scalar => Some(ProbeErrorKind::InvalidResult),
            Behaviour::Raise | Behaviour::SelfReported | Behaviour::Panic => {
                Some(ProbeErrorKind::Exception)
            }
        }
    }

    fn probe(self) -> Arc<dyn Probe> {
        Arc::new(FnProbe::new(move |_| async move {
            match self {
                Behaviour::Object => Ok(json!({ "has_https": true, "status_code": 200 })),
                Behaviour::Null => Ok(Value::Null),
                Behaviour::Scalar => Ok(json!(42)),
                Behaviour::Raise => Err(ProbeError::exception("raised")),
                Behaviour::SelfReported => Ok(json!({ "error": "captcha" })),
                Behaviour::Panic => panic!("probe bug"),
            }
        }))
    }
}

fn behaviour_strategy() -> impl Strategy<Value = Behaviour> {
    prop_oneof![
        Just(Behaviour::Object),
        Just(Behaviour::Null),
        Just(Behaviour::Scalar),
        Just(Behaviour::Raise),
        Just(Behaviour::SelfReported),
        Just(Behaviour::Panic),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Property: every probe yields exactly one record, classified by behaviour
    #[test]
    fn prop_tier_is_total(
        behaviours in prop::collection::vec(behaviour_strategy(), 0..12),
        workers in 1usize..5,
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let scheduler = Scheduler::new(Config {
                max_workers: workers,
                inter_tier_delay_ms: 0,
                ..Config::default()
            });
            let probes: Vec<ScheduledProbe> = behaviours
                .iter()
                .enumerate()
                .map(|(i, b)| ScheduledProbe {
                    descriptor: ProbeDescriptor::new(
                        format!("probe_{}", i),
                        Tier::High,
                        Duration::from_secs(5),
                    ),
                    probe: b.probe(),
                })
                .collect();

            let records = scheduler
                .execute_tier(&probes, &Target::from_domain("acme.com"), "high")
                .await;

            prop_assert_eq!(records.len(), behaviours.len());
            for (i, b) in behaviours.iter().enumerate() {
                let record = &records[&format!("probe_{}", i)];
                prop_assert_eq!(record.error().map(|e| e.kind), b.expected());
                prop_assert_eq!(record.payload().is_some(), b.expected().is_none());
            }
            Ok(())
        })?;
    }
}
