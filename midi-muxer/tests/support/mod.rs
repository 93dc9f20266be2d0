use integration_test_utils::{MockDevice, MockSource, MockSourceBehavior};
use midi_muxer::{Device, LifecyclePolicy, Router, RouterConfig, Source};
use std::sync::Arc;
use std::time::Duration;

pub(crate) const FORWARD_WAIT: Duration = Duration::from_secs(2);
pub(crate) const SILENCE_WAIT: Duration = Duration::from_millis(200);

pub(crate) fn as_device(device: &Arc<MockDevice>) -> Arc<dyn Device> {
    device.clone()
}

pub(crate) fn make_router(name: &str, sources: &[Arc<MockSource>]) -> Router {
    make_router_with_policy(name, LifecyclePolicy::FailFast, sources)
}

pub(crate) fn make_router_with_policy(
    name: &str,
    lifecycle_policy: LifecyclePolicy,
    sources: &[Arc<MockSource>],
) -> Router {
    let sources = sources
        .iter()
        .map(|source| source.clone() as Arc<dyn Source>)
        .collect();
    Router::with_config(
        RouterConfig::new(name).with_lifecycle_policy(lifecycle_policy),
        sources,
    )
}

#[allow(dead_code)]
pub(crate) fn failing_source(name: &str, behavior: MockSourceBehavior) -> Arc<MockSource> {
    MockSource::with_behavior(name, Vec::new(), behavior)
}

pub(crate) async fn wait_until(condition: impl Fn() -> bool) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
