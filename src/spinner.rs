//! A terminal spinner shown while waiting on the inference endpoint.

use std::io::Write;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;

const FRAMES: &[&str] = &["🙂", "😀", "😃", "😄", "😁", "😆", "😅", "😂", "🤣", "😊"];

const INTERVAL: Duration = Duration::from_millis(120);

/// Runs in a background task and writes to stderr, so stdout stays clean.
/// Dropping a spinner without [`Spinner::stop`] also ends it, because the
/// task exits once its cancel channel closes.
pub struct Spinner {
    handle: JoinHandle<()>,
    cancel: tokio::sync::watch::Sender<bool>,
}

impl Spinner {
    /// Start a spinner with the given message, e.g. `"generating"`.
    pub fn start(message: &str) -> Self {
        let (cancel_tx, mut cancel_rx) = tokio::sync::watch::channel(false);
        let message = message.to_string();

        let handle = tokio::spawn(async move {
            let started = Instant::now();
            let mut ticks = tokio::time::interval(INTERVAL);
            for frame in FRAMES.iter().cycle() {
                tokio::select! {
                    _ = ticks.tick() => {}
                    _ = cancel_rx.changed() => break,
                }
                // \x1b[2K clears the line
                eprint!("\x1b[2K\r{}", frame_line(frame, &message, started.elapsed()));
                let _ = std::io::stderr().flush();
            }
            eprint!("\x1b[2K\r");
            let _ = std::io::stderr().flush();
        });

        Self {
            handle,
            cancel: cancel_tx,
        }
    }

    /// Stop the spinner and clear its line.
    pub async fn stop(self) {
        let _ = self.cancel.send(true);
        let _ = self.handle.await;
    }
}

/// Cold models can take a while, so the elapsed time shows after a second.
fn frame_line(frame: &str, message: &str, elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs == 0 {
        format!("{frame} {message}")
    } else {
        format!("{frame} {message} ({secs}s)")
    }
}
