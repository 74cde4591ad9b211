use std::sync::Arc;

use compact_str::CompactString;

use crate::audio::{NotificationError, SoundBank};

const RULER_WIDTH: usize = 80;

fn format_notification(stamp: &str, links: &[CompactString]) -> String {
    use core::fmt::Write;

    let mut out = String::new();
    let _ = writeln!(out, "\x1b[92m[{stamp}]\x1b[36m New ads!\x1b[0m");
    for link in links {
        let _ = writeln!(out, "\u{2022} {link}");
    }
    let _ = write!(out, "\x1b[31;1m{}\x1b[0m", "─".repeat(RULER_WIDTH));
    out
}

/// Announces one batch of new ads: the console block first, then the audio
/// cue on the blocking pool. Callers only pass non-empty batches.
pub async fn announce(
    batch: &[CompactString],
    sounds: Arc<SoundBank>,
    volume: f32,
) -> Result<(), NotificationError> {
    let stamp = chrono::Local::now().format("%H:%M:%S").to_string();
    println!("{}", format_notification(&stamp, batch));

    tokio::task::spawn_blocking(move || sounds.play_random(volume)).await?
}
