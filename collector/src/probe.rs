//! Probe contract and closure adapters

use async_trait::async_trait;
use evidence_core::{ProbeError, Target};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// What a probe returns: a JSON object on success
pub type ProbeResult = std::result::Result<Value, ProbeError>;

/// A pluggable evidence source
///
/// Implementations should return a JSON object. `null`, non-object values
/// and objects carrying a non-null `"error"` field are recorded as failures
/// by the scheduler.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Gather evidence about the target
    async fn run(&self, target: &Target) -> ProbeResult;
}

/// Probe backed by an async closure
pub struct FnProbe<F> {
    f: F,
}

impl<F, Fut> FnProbe<F>
where
    F: Fn(Target) -> Fut + Send + Sync,
    Fut: Future<Output = ProbeResult> + Send,
{
    /// Wrap an async closure
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> Probe for FnProbe<F>
where
    F: Fn(Target) -> Fut + Send + Sync,
    Fut: Future<Output = ProbeResult> + Send,
{
    async fn run(&self, target: &Target) -> ProbeResult {
        (self.f)(target.clone()).await
    }
}

impl<F> fmt::Debug for FnProbe<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnProbe").finish_non_exhaustive()
    }
}

/// Probe backed by a synchronous closure, run on the blocking pool
///
/// A blocking probe that outlives its timeout keeps its thread until it
/// returns; only its result is dropped.
pub struct BlockingProbe<F> {
    f: Arc<F>,
}

impl<F> BlockingProbe<F>
where
    F: Fn(&Target) -> ProbeResult + Send + Sync + 'static,
{
    /// Wrap a blocking closure
    pub fn new(f: F) -> Self {
        Self { f: Arc::new(f) }
    }
}

#[async_trait]
impl<F> Probe for BlockingProbe<F>
where
    F: Fn(&Target) -> ProbeResult + Send + Sync + 'static,
{
    async fn run(&self, target: &Target) -> ProbeResult {
        let f = Arc::clone(&self.f);
        let target = target.clone();
        tokio::task::spawn_blocking(move || f(&target))
            .await
            .unwrap_or_else(|e| Err(ProbeError::exception(crate::scheduler::join_error_message(e))))
    }
}

impl<F> fmt::Debug for BlockingProbe<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockingProbe").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_fn_probe_sees_target() {
        let probe = FnProbe::new(|target: Target| async move {
            Ok(json!({ "domain": target.domain }))
        });
        let out = probe.run(&Target::from_domain("acme.com")).await.unwrap();
        assert_eq!(out["domain"], "acme.com");
    }

    #[tokio::test]
    async fn test_blocking_probe_panic_is_exception() {
        let probe = BlockingProbe::new(|_: &Target| -> ProbeResult { panic!("parser exploded") });
        let err = probe.run(&Target::from_domain("acme.com")).await.unwrap_err();
        assert_eq!(err.kind, evidence_core::ProbeErrorKind::Exception);
        assert!(err.message.contains("parser exploded"));
    }
}
