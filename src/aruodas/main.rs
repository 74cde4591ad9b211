mod scrape;

use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::Parser;

/// Watch an aruodas-style ad listing and raise a local alert for new ads.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Listing page to poll.
    #[arg(env = "ADS_URL")]
    url: String,

    /// Seconds between polls.
    #[arg(
        short = 't',
        long,
        env = "UPDATE_TIME",
        default_value_t = 60,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    update_time: u64,

    /// Output volume while an alert sound plays, 0 to 1.
    #[arg(short = 'v', long, env = "NOTIFICATION_VOL", default_value_t = 0.7)]
    notification_vol: f32,

    /// Directory scanned (recursively) for alert sounds.
    #[arg(long, env = "SOUNDS_DIR", default_value = "sounds")]
    sounds_dir: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    pretty_env_logger::init_timed();

    let args = Args::parse();
    anyhow::ensure!(
        (0.0..=1.0).contains(&args.notification_vol),
        "notification volume must lie in [0, 1], got {}",
        args.notification_vol
    );

    let sounds = Arc::new(awatch::audio::SoundBank::discover(&args.sounds_dir));
    if sounds.is_empty() {
        tracing::warn!(
            target: "main",
            "no sounds under {}, alerts will be text-only",
            args.sounds_dir.display()
        );
    } else {
        tracing::info!(target: "main", "{} sounds loaded", sounds.len());
    }

    let poller = scrape::Poller {
        client: awatch::scrape::browser_client()?,
        extractor: scrape::Extractor::new(),
        tracker: awatch::delta::DeltaTracker::new(),
        sounds,
        url: args.url,
        interval: Duration::from_secs(args.update_time),
        volume: args.notification_vol,
    };

    tracing::info!(target: "main", "running aruodas watcher, polling every {}s ...", args.update_time);
    tokio::spawn(poller.into_future());

    tokio::signal::ctrl_c().await?;
    tracing::info!(target: "main", "interrupt received, exiting");
    // The poll task is abandoned in place, mid-sleep or mid-fetch.
    std::process::exit(0)
}
