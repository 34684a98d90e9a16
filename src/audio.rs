use std::io::Cursor;
use std::time::Duration;

use rodio::{Decoder, OutputStream, Sink, Source};

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("failed to decode music track: {0}")]
    Decode(#[from] rodio::decoder::DecoderError),
    #[error("failed to start playback: {0}")]
    Play(#[from] rodio::PlayError),
}

/// Background music looping forever on rodio's output thread.
pub struct MusicPlayer {
    // Dropping either stops playback.
    _stream: OutputStream,
    _sink: Sink,
}

impl MusicPlayer {
    /// Decode `track`, loop its first `loop_len`, and start playing.
    /// Returns `Ok(None)` when there is no audio device; a track that cannot
    /// be decoded is an error.
    pub fn start(track: Vec<u8>, volume: f32, loop_len: Duration) -> Result<Option<Self>, AudioError> {
        let source = Decoder::new(Cursor::new(track))?;
        log::info!(
            "Music: {} Hz, {} channel(s), looping {:.1}s",
            source.sample_rate(),
            source.channels(),
            loop_len.as_secs_f64(),
        );

        let (stream, handle) = match OutputStream::try_default() {
            Ok(out) => out,
            Err(e) => {
                log::warn!("No audio output device, running silent: {e}");
                return Ok(None);
            }
        };

        let sink = Sink::try_new(&handle)?;
        sink.set_volume(volume);
        sink.append(source.take_duration(loop_len).repeat_infinite());
        sink.play();

        Ok(Some(Self {
            _stream: stream,
            _sink: sink,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_track_fails_to_decode() {
        let err = MusicPlayer::start(b"not an mp3 at all".to_vec(), 1.0, Duration::from_secs(8))
            .err()
            .unwrap();
        assert!(matches!(err, AudioError::Decode(_)));
    }
}
