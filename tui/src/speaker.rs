//! Alert Playback
//!
//! Two [`AlertPlayer`]s:
//! - `SpeakerPlayer` (feature `speaker`, on by default): plays the decoded
//!   alert through the default output device. Every call mixes in a fresh
//!   copy of the samples, so overlapping alerts play independently.
//! - [`BellPlayer`]: rings the terminal bell. Used only when the binary is
//!   built with `--no-default-features`.
//!
//! Failing to open the output device is a startup error; failing to play a
//! single alert is only logged.

use std::io::{self, Write};
use std::sync::Arc;

use beeper_core::{AlertPlayer, AlertSound, AudioError};
use tracing::{debug, info};

/// Keeps the audio device open; drop it only at exit
pub struct AudioOutput {
    #[cfg(feature = "speaker")]
    _stream: rodio::OutputStream,
}

/// Terminal bell
#[derive(Debug, Default, Clone, Copy)]
pub struct BellPlayer;

impl AlertPlayer for BellPlayer {
    fn play(&self) {
        let mut out = io::stdout().lock();
        if let Err(e) = out.write_all(b"\x07").and_then(|()| out.flush()) {
            debug!(error = %e, "Failed to ring terminal bell");
        }
    }
}

#[cfg(feature = "speaker")]
pub use device::SpeakerPlayer;

#[cfg(feature = "speaker")]
mod device {
    use beeper_core::{AlertPlayer, AlertSound, AudioError};
    use rodio::buffer::SamplesBuffer;
    use rodio::{OutputStream, OutputStreamHandle, Source};
    use tracing::warn;

    /// Default audio device
    pub struct SpeakerPlayer {
        handle: OutputStreamHandle,
        sound: AlertSound,
    }

    impl SpeakerPlayer {
        /// Open the default output device
        pub fn open(sound: AlertSound) -> Result<(OutputStream, Self), AudioError> {
            let (stream, handle) =
                OutputStream::try_default().map_err(|e| AudioError::Device(e.to_string()))?;
            Ok((stream, Self { handle, sound }))
        }
    }

    impl AlertPlayer for SpeakerPlayer {
        fn play(&self) {
            let buffer = SamplesBuffer::new(
                self.sound.channels(),
                self.sound.sample_rate(),
                self.sound.samples().to_vec(),
            );
            if let Err(e) = self.handle.play_raw(buffer.convert_samples()) {
                warn!(error = %e, "Failed to play alert");
            }
        }
    }
}

/// Open the configured playback path for `sound`
#[cfg(feature = "speaker")]
pub fn open_player(sound: AlertSound) -> Result<(AudioOutput, Arc<dyn AlertPlayer>), AudioError> {
    info!(
        channels = sound.channels(),
        sample_rate = sound.sample_rate(),
        "Opening default audio device"
    );
    let (stream, player) = SpeakerPlayer::open(sound)?;
    Ok((AudioOutput { _stream: stream }, Arc::new(player)))
}

/// Open the configured playback path for `sound`
#[cfg(not(feature = "speaker"))]
pub fn open_player(sound: AlertSound) -> Result<(AudioOutput, Arc<dyn AlertPlayer>), AudioError> {
    info!(
        duration_ms = sound.duration().as_millis() as u64,
        "Built without audio device support, alerts use the terminal bell"
    );
    Ok((AudioOutput {}, Arc::new(BellPlayer)))
}
