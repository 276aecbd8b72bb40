use color_eyre::{eyre::eyre, Result};
use nunchuk_keys::config::{Config, Output};
use nunchuk_keys::controller::{InputSampler, Nunchuk, PollLoop, SamplerSettings};
use nunchuk_keys::mapping::{EventDriver, KeyEmitter, LogKeyEmitter, VirtualKeyboard};
use std::path::PathBuf;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

// Single execution context: the poll loop is the only task
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    setup()?;

    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = Config::load_or_default(config_path.as_deref())
        .await
        .map_err(|e| eyre!("Failed to load configuration: {}", e))?;

    setup_logging_env(config.debug);
    match &config_path {
        Some(path) => info!("Loaded configuration from {}", path.display()),
        None => info!(
            "Loaded configuration (default location: {:?})",
            Config::default_path()
        ),
    }
    info!("Nunchuk config: {:?}", config);

    // Created before detection so a missing /dev/uinput fails right away
    let emitter: Box<dyn KeyEmitter> = match config.output {
        Output::Uinput => Box::new(
            VirtualKeyboard::create(&config.bindings)
                .map_err(|e| eyre!("Failed to set up keyboard output: {}", e))?,
        ),
        Output::Log => {
            info!("Dry run, key actions are only logged");
            Box::new(LogKeyEmitter::default())
        }
    };

    let nunchuk = Nunchuk::new(config.peripheral.i2c_bus, config.peripheral.address);
    let sampler = InputSampler::create(Box::new(nunchuk), SamplerSettings::from(&config));

    info!("Looking for nunchuk...");
    let sampler = sampler.wait_for_peripheral().await;
    info!("Nunchuk found!");

    let driver = EventDriver::new(config.bindings.clone(), config.debug);
    let mut poll_loop = PollLoop::new(sampler, driver, emitter, config.poll_interval);

    // A read failure ends this run; the supervisor restarts detection from scratch
    match poll_loop.run().await {
        Ok(never) => match never {},
        Err(e) => {
            error!("Error reading nunchuk, exiting for restart: {}", e);
            Err(e.into())
        }
    }
}

fn setup() -> Result<()> {
    set_env_defaults();
    color_eyre::install()?;
    Ok(())
}

fn set_env_defaults() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
}

fn setup_logging_env(debug: bool) {
    let level = if debug { Level::DEBUG } else { Level::INFO };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .compact()
        .init();
}
