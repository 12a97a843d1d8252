use anyhow::Context;
use tagwatch_hardware::traits::Transport;
use tagwatch_hardware::{Reader, StdoutSink, SystemClock, announce};
use tagwatch_presence::PresenceCache;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::config::ReaderConfig;

/// Poll the reader until Ctrl-C.
#[cfg(feature = "hardware-serial")]
pub async fn run(config: ReaderConfig) -> anyhow::Result<()> {
    use tagwatch_hardware::{AnyTransport, SerialTransport};

    let link = SerialTransport::open(config.serial_settings())
        .with_context(|| format!("opening reader on {}", config.port))?;
    info!(port = %config.port, baud = config.baud_rate, "reader connected");

    poll_loop(AnyTransport::Serial(link), &config).await
}

#[cfg(not(feature = "hardware-serial"))]
pub async fn run(_config: ReaderConfig) -> anyhow::Result<()> {
    anyhow::bail!("serial support not compiled in; rebuild with the `hardware-serial` feature")
}

#[cfg_attr(not(feature = "hardware-serial"), allow(dead_code))]
async fn poll_loop<T: Transport>(link: T, config: &ReaderConfig) -> anyhow::Result<()> {
    let mut reader = Reader::new(link, SystemClock::new())
        .with_request(config.request())
        .with_response_timeout(config.response_timeout());
    let mut cache: PresenceCache = PresenceCache::new(config.expiry());
    let mut anonymizer = config.build_anonymizer();
    let mut sink = StdoutSink::new();

    let mut ticker = tokio::time::interval(config.poll_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = &mut shutdown => {
                result.context("listening for Ctrl-C")?;
                info!("shutting down");
                break;
            }
            _ = ticker.tick() => {
                // Failed cycles are logged by the reader; the next tick retries.
                if let Ok(report) = reader.poll(&mut cache).await {
                    debug!(?report, cached = cache.len(), "cycle complete");
                }
                announce(&mut cache, &mut anonymizer, &mut sink, config.announce_delay())
                    .await
                    .context("announcing tags")?;
            }
        }
    }

    let snapshot: Vec<_> = cache.records().collect();
    match serde_json::to_string(&snapshot) {
        Ok(json) => debug!(cached = snapshot.len(), snapshot = %json, "final cache"),
        Err(err) => warn!(error = %err, "cannot render cache snapshot"),
    }
    Ok(())
}

/// Print the inventory request frame in hex.
pub fn request(config: &ReaderConfig) {
    let frame = config.request().encode();
    let hex: Vec<String> = frame.iter().map(|b| format!("{b:02X}")).collect();
    println!("{}", hex.join(" "));
}

/// Print the effective configuration.
pub fn check_config(config: &ReaderConfig) -> anyhow::Result<()> {
    config.validate()?;
    print!("{}", config.to_toml()?);
    Ok(())
}
