//! Audible alert via the default output device.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use acalert_core::matcher::Alert;
use acalert_core::types::NotifyError;

use super::{Delivery, Notifier};

pub struct SoundNotifier {
    mp3: Option<PathBuf>,
    wav: Option<PathBuf>,
}

impl SoundNotifier {
    pub fn new(mp3: Option<&str>, wav: Option<&str>) -> Self {
        SoundNotifier {
            mp3: mp3.map(PathBuf::from),
            wav: wav.map(PathBuf::from),
        }
    }

    /// The file to play: MP3 if it exists, else WAV if it exists.
    pub fn pick_file(&self) -> Option<PathBuf> {
        [&self.mp3, &self.wav]
            .into_iter()
            .flatten()
            .find(|p| p.is_file())
            .cloned()
    }

    fn configured_names(&self) -> String {
        let names: Vec<String> = [&self.mp3, &self.wav]
            .into_iter()
            .flatten()
            .map(|p| p.display().to_string())
            .collect();
        if names.is_empty() {
            "none configured".into()
        } else {
            names.join(" or ")
        }
    }
}

/// Decode and play `path` to the end. Blocks the calling thread.
fn play_blocking(path: &Path) -> Result<(), NotifyError> {
    let file = File::open(path)
        .map_err(|e| NotifyError::Sound(format!("{}: {e}", path.display())))?;

    let mut stream = rodio::OutputStreamBuilder::open_default_stream()
        .map_err(|e| NotifyError::Sound(e.to_string()))?;
    stream.log_on_drop(false);

    let source = rodio::Decoder::new(BufReader::new(file))
        .map_err(|e| NotifyError::Sound(format!("{}: {e}", path.display())))?;

    let sink = rodio::Sink::connect_new(stream.mixer());
    sink.append(source);
    sink.sleep_until_end();
    Ok(())
}

#[async_trait]
impl Notifier for SoundNotifier {
    fn name(&self) -> &'static str {
        "sound"
    }

    async fn notify(&self, _alert: &Alert) -> Result<Delivery, NotifyError> {
        let Some(path) = self.pick_file() else {
            return Ok(Delivery::Skipped(format!(
                "no sound file found ({})",
                self.configured_names()
            )));
        };

        tokio::task::spawn_blocking(move || play_blocking(&path))
            .await
            .map_err(|e| NotifyError::Sound(e.to_string()))??;

        Ok(Delivery::Sent)
    }
}
