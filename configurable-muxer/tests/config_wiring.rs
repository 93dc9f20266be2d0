use configurable_muxer::{apply_routes, Config, MuxerError};
use integration_test_utils::init_logging;
use midi_muxer::{Router, Source};
use midi_muxer_native::{LoopbackBackend, NativeSource, PortBackend};
use std::sync::Arc;
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(2);

const SPLIT_CONFIG: &str = r#"{
  router: { name: "split" },
  routes: [
    {
      input: "keystation",
      output: "Synth",
      filters: [{ type: "channel", channel: 1 }],
      transformers: [{ type: "aftertouch_to_pitch_bend" }],
    },
    {
      input: "keystation",
      output: "drum",
      filters: [
        { type: "channel", channel: 10 },
        { type: "note", note: 35, condition: "greater_than" },
      ],
    },
  ],
}"#;

fn router_over(backend: &LoopbackBackend, config: &Config) -> Router {
    let port_backend: Arc<dyn PortBackend> = Arc::new(backend.clone());
    let source: Arc<dyn Source> = Arc::new(NativeSource::new(
        config.client_name.as_str(),
        port_backend,
        config.source.clone(),
    ));
    Router::with_config(config.router.clone(), vec![source])
}

#[tokio::test(flavor = "multi_thread")]
async fn configured_routes_split_keyboard_by_channel() {
    init_logging();
    let config = Config::from_json5(SPLIT_CONFIG).expect("config parses");
    config.validate().expect("config validates");

    let backend = LoopbackBackend::new()
        .with_input("USB Keystation 49")
        .with_output("Synth")
        .with_output("Drum Machine");
    let synth = backend.monitor("Synth").expect("port exists");
    let drums = backend.monitor("Drum Machine").expect("port exists");

    let router = router_over(&backend, &config);
    router.start().await.expect("loopback source starts");
    assert_eq!(apply_routes(&router, &config.routes).await.expect("routes apply"), 2);
    assert_eq!(router.dispatch_workers_spawned(), 1);

    backend.inject("USB Keystation 49", &[0xD0, 80, 0]);
    backend.inject("USB Keystation 49", &[0x99, 30, 100]);
    backend.inject("USB Keystation 49", &[0x99, 36, 100]);

    assert_eq!(synth.recv_timeout(WAIT), Ok(vec![0xE0, 0, 80]));
    assert_eq!(drums.recv_timeout(WAIT), Ok(vec![0x99, 36, 100]));
    assert!(drums.recv_timeout(Duration::from_millis(200)).is_err());
    assert!(synth.try_recv().is_err());

    router.stop().await.expect("loopback source stops");
}

#[tokio::test(flavor = "multi_thread")]
async fn unresolved_name_registers_nothing() {
    init_logging();
    let config = Config::from_json5(
        r#"{ routes: [
            { input: "keys", output: "synth" },
            { input: "keys", output: "piano" },
        ] }"#,
    )
    .expect("config parses");

    let backend = LoopbackBackend::new().with_input("keys").with_output("synth");
    let router = router_over(&backend, &config);
    router.start().await.expect("loopback source starts");

    let err = apply_routes(&router, &config.routes)
        .await
        .expect_err("piano is not a port");
    assert!(matches!(err, MuxerError::UnknownDevice { .. }));
    assert_eq!(router.dispatch_workers_spawned(), 0);
    assert_eq!(backend.input_connections("keys"), 0);

    router.stop().await.expect("loopback source stops");
}
