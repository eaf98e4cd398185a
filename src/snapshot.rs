//! Async one-shot capture facade
//!
//! The capture engine is synchronous and not `Send`, so async callers talk
//! to it through a dedicated worker thread: commands go over an mpsc channel
//! and results come back over oneshots.

use std::sync::mpsc::{self, Sender};
use std::thread;

use tokio::sync::oneshot;

use crate::capture::CaptureEngine;
use crate::error::{Error, Result};
use crate::ScreenshotOptions;

enum Command {
    Capture(String, oneshot::Sender<Result<Vec<u8>>>),
    Close(oneshot::Sender<()>),
}

/// An async handle that captures pages with a fixed configuration.
///
/// Each capture runs in its own scoped browser session on the worker thread;
/// the session is torn down before the result is reported, success or not.
#[derive(Clone)]
pub struct Snapshotter {
    cmd_tx: Sender<Command>,
}

impl Snapshotter {
    /// Spawn the worker thread that will own the browser sessions.
    pub fn new(options: ScreenshotOptions) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();

        thread::spawn(move || {
            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    Command::Capture(html, resp) => {
                        let res = CaptureEngine::new(options.clone()).and_then(|engine| {
                            let out = engine.capture(&html);
                            let _ = engine.close();
                            out
                        });
                        let _ = resp.send(res);
                    }
                    Command::Close(resp) => {
                        let _ = resp.send(());
                        break;
                    }
                }
            }
        });

        Self { cmd_tx }
    }

    /// Capture the given HTML page as PNG bytes.
    pub async fn capture(&self, html: &str) -> Result<Vec<u8>> {
        let (tx, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(Command::Capture(html.to_string(), tx));
        rx.await
            .map_err(|e| Error::Capture(format!("Capture worker canceled: {}", e)))?
    }

    /// Shut the worker thread down.
    pub async fn close(self) {
        let (tx, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(Command::Close(tx));
        let _ = rx.await;
    }
}

/// Convenience: one page, one capture, one browser session.
pub async fn capture_page(html: &str, options: &ScreenshotOptions) -> Result<Vec<u8>> {
    let snapshotter = Snapshotter::new(options.clone());
    let result = snapshotter.capture(html).await;
    snapshotter.close().await;
    result
}
