use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use rand::Rng;
use rodio::{Decoder, OutputStream, Sink};

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("sound bank is empty")]
    NoSounds,
    #[error("audio device unavailable: {0}")]
    Stream(#[from] rodio::StreamError),
    #[error("audio sink failed: {0}")]
    Play(#[from] rodio::PlayError),
    #[error("sound asset is corrupt: {0}")]
    Decode(#[from] rodio::decoder::DecoderError),
    #[error("sound asset unreadable: {0}")]
    Io(#[from] std::io::Error),
    #[error("audio task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Output-volume seam of the audio side-channel.
pub trait Mixer {
    fn volume(&self) -> f32;
    fn set_volume(&self, volume: f32);
}

impl Mixer for Sink {
    fn volume(&self) -> f32 {
        Sink::volume(self)
    }

    fn set_volume(&self, volume: f32) {
        Sink::set_volume(self, volume);
    }
}

/// Scoped volume override. The prior level is reinstated on drop, so playback
/// bailing out early cannot leave the volume pinned.
struct VolumeOverride<'a, M: Mixer> {
    mixer: &'a M,
    previous: f32,
}

impl<'a, M: Mixer> VolumeOverride<'a, M> {
    fn set(mixer: &'a M, volume: f32) -> Self {
        let previous = mixer.volume();
        mixer.set_volume(volume);
        Self { mixer, previous }
    }
}

impl<M: Mixer> Drop for VolumeOverride<'_, M> {
    fn drop(&mut self) {
        self.mixer.set_volume(self.previous);
    }
}

fn play_at<M: Mixer>(
    mixer: &M,
    volume: f32,
    playback: impl FnOnce() -> Result<(), NotificationError>,
) -> Result<(), NotificationError> {
    let _restore = VolumeOverride::set(mixer, volume);
    playback()
}

/// Fixed pool of notification sounds, one of which is drawn at random per
/// alert.
#[derive(Debug, Default)]
pub struct SoundBank {
    paths: Vec<PathBuf>,
}

impl SoundBank {
    /// Every file under `dir`, recursively. A missing or unreadable directory
    /// yields an empty bank, degrading alerts to text only.
    #[must_use]
    pub fn discover(dir: &Path) -> Self {
        fn walk(dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
            for entry in std::fs::read_dir(dir)? {
                let path = entry?.path();
                if path.is_dir() {
                    walk(&path, out)?;
                } else {
                    out.push(path);
                }
            }
            Ok(())
        }

        let mut paths = Vec::new();
        if let Err(e) = walk(dir, &mut paths) {
            tracing::warn!(target: "sounds", "scanning {} failed: {e}", dir.display());
        }
        Self { paths }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Plays one randomly chosen cue at `volume`, then puts the output volume
    /// back where it was, playback error or not. Blocking; call from async
    /// code via the blocking pool.
    pub fn play_random(&self, volume: f32) -> Result<(), NotificationError> {
        if self.paths.is_empty() {
            return Err(NotificationError::NoSounds);
        }
        let path = &self.paths[rand::rng().random_range(0..self.paths.len())];

        let (_stream, handle) = OutputStream::try_default()?;
        let sink = Sink::try_new(&handle)?;
        play_at(&sink, volume, || {
            let source = Decoder::new(BufReader::new(File::open(path)?))?;
            sink.append(source);
            sink.sleep_until_end();
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;

    struct FakeMixer {
        level: Cell<f32>,
        trace: RefCell<Vec<f32>>,
    }

    impl FakeMixer {
        fn at(level: f32) -> Self {
            Self {
                level: Cell::new(level),
                trace: RefCell::new(Vec::new()),
            }
        }
    }

    impl Mixer for FakeMixer {
        fn volume(&self) -> f32 {
            self.level.get()
        }

        fn set_volume(&self, volume: f32) {
            self.level.set(volume);
            self.trace.borrow_mut().push(volume);
        }
    }

    #[test]
    fn override_applies_during_playback() {
        let mixer = FakeMixer::at(0.25);
        play_at(&mixer, 0.7, || {
            assert!((mixer.volume() - 0.7).abs() < f32::EPSILON);
            Ok(())
        })
        .unwrap();
        assert!((mixer.volume() - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn volume_survives_playback_failure() {
        let mixer = FakeMixer::at(0.4);
        let res = play_at(&mixer, 1.0, || Err(NotificationError::NoSounds));
        assert!(res.is_err());
        assert!((mixer.volume() - 0.4).abs() < f32::EPSILON);
        assert_eq!(*mixer.trace.borrow(), vec![1.0, 0.4]);
    }

    #[test]
    fn empty_bank_reports_no_sounds() {
        let bank = SoundBank::default();
        assert!(matches!(
            bank.play_random(0.5),
            Err(NotificationError::NoSounds)
        ));
    }
}
