pub mod config;
pub mod controller;
pub mod drive;
pub mod state;

use crate::config::{DriveSettings, PortLayout, ReaderSettings};
use crate::controller::{discover, select_controller, EvdevSource, EventReader, ReaderExit};
use crate::drive::{ev3, ActuationHandle};
use crate::state::SharedIntent;
use color_eyre::{eyre::eyre, Result};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    info!("Finding controller...");
    let (device, profile) =
        select_controller(discover()).map_err(|e| eyre!("Failed to select controller: {}", e))?;
    let source = EvdevSource::open(device)?;

    let intent = SharedIntent::new();

    // Motors are detected on the actuation thread and stay there
    let layout = PortLayout::default();
    let mut actuation = ActuationHandle::spawn(
        move || ev3::detect(&layout),
        intent.clone(),
        Some(DriveSettings::default()),
    )
    .await
    .map_err(|e| eyre!("Failed to start motors: {}", e))?;

    info!("Ready to drive!!");
    let reader = EventReader::new(
        source,
        intent.clone(),
        profile,
        Some(ReaderSettings::default()),
    );

    let outcome = tokio::select! {
        result = reader.run() => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, stopping");
            Ok(ReaderExit::Cancelled)
        }
    };

    // Motors are stopped before the process exits, whatever ended the reader
    let ticks = actuation.shutdown().await?;
    info!("Drove for {} actuation ticks", ticks);

    match outcome {
        Ok(exit) => {
            info!("Event Reader finished: {:?}", exit);
            Ok(())
        }
        Err(e) => {
            error!("Lost the controller: {}", e);
            Err(eyre!("Controller read failed: {}", e))
        }
    }
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}
