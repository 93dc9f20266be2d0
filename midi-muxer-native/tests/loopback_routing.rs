use integration_test_utils::init_logging;
use midi_muxer::{
    with_filter, with_transformer, AftertouchToPitchBend, ChannelFilter, Device, Router, Source,
};
use midi_muxer_native::{LoopbackBackend, NativeSource, NativeSourceConfig, PortBackend};
use std::sync::Arc;
use std::time::{Duration, Instant};

const WAIT: Duration = Duration::from_secs(2);

fn loopback_router(backend: &LoopbackBackend) -> Router {
    let port_backend: Arc<dyn PortBackend> = Arc::new(backend.clone());
    let source: Arc<dyn Source> = Arc::new(NativeSource::new(
        "loopback",
        port_backend,
        NativeSourceConfig::default(),
    ));
    Router::new("loopback-router", vec![source])
}

fn device_named(devices: Vec<Arc<dyn Device>>, name: &str) -> Arc<dyn Device> {
    devices
        .into_iter()
        .find(|device| device.name() == name)
        .expect("device should be enumerated")
}

fn wait_until(condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + WAIT;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    condition()
}

#[tokio::test(flavor = "multi_thread")]
async fn injected_bytes_are_filtered_transformed_and_written() {
    init_logging();
    let backend = LoopbackBackend::new()
        .with_input("keys")
        .with_output("synth");
    let monitor = backend.monitor("synth").expect("output port exists");
    let router = loopback_router(&backend);
    router.start().await.expect("loopback source starts");

    let keys = device_named(router.inputs(), "keys");
    let synth = device_named(router.outputs(), "synth");
    router
        .add_route(
            keys,
            synth,
            vec![
                with_filter(ChannelFilter::new(1)),
                with_transformer(AftertouchToPitchBend),
            ],
        )
        .await
        .expect("route registers");
    assert_eq!(backend.input_connections("keys"), 1);

    // Channel 2 is filtered out; channel 1 aftertouch becomes a pitch bend.
    assert_eq!(backend.inject("keys", &[0xA1, 60, 10]), 1);
    assert_eq!(backend.inject("keys", &[0xA0, 60, 10]), 1);
    assert_eq!(backend.inject("keys", &[0xF8]), 1);

    assert_eq!(monitor.recv_timeout(WAIT), Ok(vec![0xE0, 0, 60]));
    assert_eq!(monitor.recv_timeout(WAIT), Ok(vec![0xF8]));

    router.stop().await.expect("loopback source stops");
    assert_eq!(backend.input_connections("keys"), 0);
    assert!(wait_until(|| router.active_dispatch_workers() == 0));
}

#[tokio::test(flavor = "multi_thread")]
async fn unavailable_input_rolls_back_and_retries() {
    init_logging();
    let backend = LoopbackBackend::new()
        .with_input("keys")
        .with_output("synth");
    backend.set_unavailable("keys", true);
    let router = loopback_router(&backend);
    router.start().await.expect("loopback source starts");

    let keys = device_named(router.inputs(), "keys");
    let synth = device_named(router.outputs(), "synth");
    let err = router
        .add_route(keys.clone(), synth.clone(), Vec::new())
        .await
        .expect_err("connect should fail");
    assert!(err.to_string().contains("keys"));
    assert_eq!(router.route_count(&keys).await, 0);
    assert_eq!(router.dispatch_workers_spawned(), 0);

    backend.set_unavailable("keys", false);
    router
        .add_route(keys.clone(), synth, Vec::new())
        .await
        .expect("retry connects");
    assert_eq!(router.route_count(&keys).await, 1);
    assert_eq!(router.dispatch_workers_spawned(), 1);

    router.stop().await.expect("loopback source stops");
}

#[tokio::test(flavor = "multi_thread")]
async fn restart_enumerates_fresh_devices() {
    init_logging();
    let backend = LoopbackBackend::new()
        .with_input("keys")
        .with_output("synth");
    let monitor = backend.monitor("synth").expect("output port exists");
    let router = loopback_router(&backend);

    router.start().await.expect("first start");
    let first_keys = device_named(router.inputs(), "keys");
    router
        .add_route(
            first_keys.clone(),
            device_named(router.outputs(), "synth"),
            Vec::new(),
        )
        .await
        .expect("route registers");
    router.stop().await.expect("first stop");
    assert_eq!(router.route_count(&first_keys).await, 0);

    router.start().await.expect("second start");
    let keys = device_named(router.inputs(), "keys");
    assert!(!Arc::ptr_eq(&first_keys, &keys));
    router
        .add_route(keys.clone(), device_named(router.outputs(), "synth"), Vec::new())
        .await
        .expect("fresh device routes");
    assert_eq!(router.route_count(&keys).await, 1);
    assert_eq!(router.route_count(&first_keys).await, 0);
    assert_eq!(router.dispatch_workers_spawned(), 2);

    assert_eq!(backend.inject("keys", &[0x90, 64, 1]), 1);
    assert_eq!(monitor.recv_timeout(WAIT), Ok(vec![0x90, 64, 1]));
    router.stop().await.expect("second stop");
}
