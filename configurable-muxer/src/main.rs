/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

use clap::Parser;
use configurable_muxer::{apply_routes, port_listing, Config, MuxerError, DEFAULT_CLIENT_NAME};
use midi_muxer::{Router, Source};
use midi_muxer_native::{MidirBackend, NativeSource, PortBackend};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about)]
struct MuxerArgs {
    #[arg(short, long, value_name = "FILE", required_unless_present = "list_devices")]
    config: Option<PathBuf>,
    /// Print the available MIDI ports and exit.
    #[arg(long)]
    list_devices: bool,
}

#[tokio::main]
async fn main() -> Result<(), MuxerError> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();

    let args = MuxerArgs::parse();

    if args.list_devices {
        print!("{}", port_listing(&MidirBackend::new(DEFAULT_CLIENT_NAME))?);
        return Ok(());
    }

    let Some(path) = args.config else {
        return Err(MuxerError::Invalid {
            reason: "missing --config".to_string(),
        });
    };
    let config = Config::load(&path)?;
    info!(
        config = %path.display(),
        routes = config.routes.len(),
        "Started configurable-muxer"
    );

    let backend: Arc<dyn PortBackend> = Arc::new(MidirBackend::new(config.client_name.as_str()));
    let source: Arc<dyn Source> = Arc::new(NativeSource::new(
        config.client_name.as_str(),
        backend,
        config.source.clone(),
    ));
    let router = Router::with_config(config.router.clone(), vec![source]);

    router.start().await?;
    if let Err(err) = apply_routes(&router, &config.routes).await {
        if let Err(stop_err) = router.stop().await {
            warn!(err = %stop_err, "router stop after failed wiring also failed");
        }
        return Err(err);
    }

    info!("routing; press Ctrl-C to stop");
    tokio::signal::ctrl_c().await.map_err(MuxerError::Signal)?;

    info!("shutting down");
    router.stop().await?;
    Ok(())
}
