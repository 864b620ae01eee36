//! Connect to a fireplace over the local API, print the current status
//! snapshot, then hand reads over to the cloud backend.
//!
//! Expects identity and credentials in the environment:
//!
//! ```sh
//! export FIRELINK_IP=192.168.1.80
//! export FIRELINK_API_KEY=<hex api key>
//! export FIRELINK_SERIAL=<serial>
//! export FIRELINK_AUTH_COOKIE=<auth cookie>
//! export FIRELINK_USER_ID=<user id>
//! export FIRELINK_WEB_CLIENT_ID=<web client id>
//! cargo run --example status_dump
//! ```

use std::error::Error;
use std::time::Duration;

use firelink_core::{ApiMode, UnifiedFireplace};

fn env(name: &str) -> Result<String, Box<dyn Error>> {
    std::env::var(name).map_err(|_| format!("missing environment variable {name}").into())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,firelink_api=debug".into()),
        )
        .init();

    let mut fireplace = UnifiedFireplace::from_direct(
        &env("FIRELINK_IP")?,
        &env("FIRELINK_API_KEY")?,
        &env("FIRELINK_SERIAL")?,
        &env("FIRELINK_AUTH_COOKIE")?,
        &env("FIRELINK_USER_ID")?,
        &env("FIRELINK_WEB_CLIENT_ID")?,
        ApiMode::Local,
        ApiMode::Local,
    )
    .await?;

    // Give the local poller a moment to pull the first snapshot.
    tokio::time::sleep(Duration::from_secs(2)).await;

    let data = fireplace.data();
    println!("fireplace {} ({})", data.name, data.serial);
    println!("  power:      {}", if data.is_on { "on" } else { "off" });
    println!("  flame:      {}/4", data.flameheight);
    println!("  fan:        {}/3", data.fanspeed);
    println!("  temp:       {:.1} °F", data.temperature_f());
    println!("  setpoint:   {:.1} °F", data.thermostat_setpoint_f());
    if data.has_errors() {
        println!("  errors:     {}", data.error_codes_string());
    }

    // Hand polling over to the cloud backend and read once more.
    fireplace.set_read_mode(ApiMode::Cloud).await?;
    tokio::time::sleep(Duration::from_secs(2)).await;
    println!(
        "cloud snapshot after handoff: power={} flame={}",
        fireplace.data().is_on,
        fireplace.data().flameheight
    );

    println!("record: {}", fireplace.dump_fireplace_data_json()?);
    Ok(())
}
