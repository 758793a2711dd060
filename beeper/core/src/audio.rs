//! Alert Sound
//!
//! The alert is a small WAV file decoded once at startup into 16-bit PCM.
//! Playback itself belongs to the surface; the core only needs something
//! that implements [`AlertPlayer`].

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use hound::{SampleFormat, WavReader};
use thiserror::Error;

/// Default alert asset, resolved relative to the working directory
pub const DEFAULT_SOUND_PATH: &str = "thread_notification.wav";

/// Errors loading or playing the alert
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("failed to open sound asset {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    #[error("failed to decode sound asset: {0}")]
    Decode(#[from] hound::Error),

    #[error("sound asset {0:?} contains no samples")]
    Empty(PathBuf),

    #[error("audio device error: {0}")]
    Device(String),
}

/// Plays the alert once, without waiting for it to finish.
///
/// Implementations must tolerate overlapping calls.
pub trait AlertPlayer: Send + Sync {
    fn play(&self);
}

/// Decoded alert, shared by every playback
#[derive(Debug, Clone)]
pub struct AlertSound {
    channels: u16,
    sample_rate: u32,
    samples: Arc<[i16]>,
}

impl AlertSound {
    /// Decode the WAV file at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AudioError> {
        let path = path.as_ref();
        let reader = WavReader::open(path).map_err(|source| AudioError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let sound = Self::decode(reader)?;
        if sound.samples.is_empty() {
            return Err(AudioError::Empty(path.to_path_buf()));
        }

        tracing::info!(
            path = ?path,
            channels = sound.channels,
            sample_rate = sound.sample_rate,
            duration_ms = sound.duration().as_millis() as u64,
            "Loaded alert sound"
        );
        Ok(sound)
    }

    /// Decode any WAV stream into interleaved i16 samples
    pub fn decode<R: std::io::Read>(reader: WavReader<R>) -> Result<Self, AudioError> {
        let spec = reader.spec();

        let samples: Vec<i16> = match spec.sample_format {
            SampleFormat::Float => reader
                .into_samples::<f32>()
                .map(|s| s.map(|v| (v.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16))
                .collect::<Result<_, _>>()?,
            SampleFormat::Int => {
                let bits = u32::from(spec.bits_per_sample);
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|v| scale_to_i16(v, bits)))
                    .collect::<Result<_, _>>()?
            }
        };

        Ok(Self {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            samples: samples.into(),
        })
    }

    /// Wrap already-decoded interleaved samples
    pub fn from_samples(channels: u16, sample_rate: u32, samples: Vec<i16>) -> Self {
        Self {
            channels,
            sample_rate,
            samples: samples.into(),
        }
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Interleaved samples
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Cheap handle to the shared sample buffer
    pub fn shared_samples(&self) -> Arc<[i16]> {
        Arc::clone(&self.samples)
    }

    pub fn duration(&self) -> Duration {
        let frames = self.samples.len() as u64 / u64::from(self.channels.max(1));
        Duration::from_micros(frames * 1_000_000 / u64::from(self.sample_rate.max(1)))
    }
}

fn scale_to_i16(sample: i32, bits: u32) -> i16 {
    if bits > 16 {
        (sample >> (bits - 16)) as i16
    } else {
        (sample << (16 - bits)) as i16
    }
}
