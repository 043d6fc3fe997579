//! Input sources for the interactive session
//!
//! Stdin lines and OS shutdown signals are merged into one channel so the
//! session loop has a single place to wait.

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;

/// Something the session loop must react to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// A line typed on stdin
    Line(String),
    /// Ctrl-C or SIGTERM
    Interrupt,
    /// Stdin reached end of file
    Closed,
}

/// Merged stdin and signal receiver
pub struct InputHandler {
    receiver: mpsc::Receiver<InputEvent>,
}

impl InputHandler {
    /// Start reading stdin and listening for shutdown signals.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new() -> Result<Self, std::io::Error> {
        let (tx, rx) = mpsc::channel(16);

        let tx_stdin = tx.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if tx_stdin.send(InputEvent::Line(line)).await.is_err() {
                            return;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        debug!(error = %e, "stdin read failed");
                        break;
                    }
                }
            }
            let _ = tx_stdin.send(InputEvent::Closed).await;
        });

        let tx_int = tx.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                debug!("received interrupt");
                let _ = tx_int.send(InputEvent::Interrupt).await;
            }
        });

        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};

            let mut sigterm = signal(SignalKind::terminate())?;
            tokio::spawn(async move {
                sigterm.recv().await;
                debug!("received SIGTERM");
                let _ = tx.send(InputEvent::Interrupt).await;
            });
        }

        Ok(Self { receiver: rx })
    }

    /// Wait for the next event
    pub async fn recv(&mut self) -> Option<InputEvent> {
        self.receiver.recv().await
    }
}
