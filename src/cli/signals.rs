//! Host signals for the recording loop
//!
//! The terminal stands in for the page host: Enter stops, SIGHUP/SIGTSTP
//! (terminal closed or suspended) count as the host being hidden.
//! Once the recording phase is over, SIGTSTP suspends the process again.

use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use nix::sys::signal::{raise, Signal};
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Signals delivered to the recording loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostSignal {
    /// User pressed Enter
    Stop,
    /// Terminal hung up or was suspended
    Hidden,
    /// Ctrl+C: discard the recording
    Cancel,
    /// SIGTERM
    Shutdown,
}

/// What a SIGTSTP means at this point of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SuspendAction {
    /// Deliver `Hidden` to the recording loop
    Forward,
    /// Stop the process like the default handler would
    Suspend,
}

fn suspend_action(recording: bool) -> SuspendAction {
    if recording {
        SuspendAction::Forward
    } else {
        SuspendAction::Suspend
    }
}

/// Listens for OS signals and Enter on stdin
pub struct HostSignalHandler {
    receiver: mpsc::Receiver<HostSignal>,
    recording: Arc<AtomicBool>,
}

impl HostSignalHandler {
    /// Start listening. Must be called from within a tokio runtime.
    pub fn new() -> Result<Self, std::io::Error> {
        let (tx, rx) = mpsc::channel(10);
        let recording = Arc::new(AtomicBool::new(true));

        for (kind, host_signal) in [
            (SignalKind::interrupt(), HostSignal::Cancel),
            (SignalKind::terminate(), HostSignal::Shutdown),
            (SignalKind::hangup(), HostSignal::Hidden),
        ] {
            let mut stream = signal(kind)?;
            let tx = tx.clone();
            tokio::spawn(async move {
                while stream.recv().await.is_some() {
                    debug!(signal = ?host_signal, "Signal received");
                    if tx.send(host_signal).await.is_err() {
                        break;
                    }
                }
            });
        }

        // The tokio handler stays installed for the whole process, so after
        // recording the suspend has to be raised by hand
        let mut suspend = signal(SignalKind::from_raw(Signal::SIGTSTP as i32))?;
        let suspend_tx = tx.clone();
        let suspend_recording = recording.clone();
        tokio::spawn(async move {
            while suspend.recv().await.is_some() {
                match suspend_action(suspend_recording.load(Ordering::SeqCst)) {
                    SuspendAction::Forward => {
                        debug!("SIGTSTP while recording");
                        if suspend_tx.send(HostSignal::Hidden).await.is_err() {
                            break;
                        }
                    }
                    SuspendAction::Suspend => {
                        if let Err(e) = raise(Signal::SIGSTOP) {
                            warn!(error = %e, "Failed to suspend");
                        }
                    }
                }
            }
        });

        // Stdin is read on a detached thread; tokio stdin would hold up runtime shutdown
        thread::Builder::new()
            .name("stdin-stop".to_string())
            .spawn(move || {
                let stdin = std::io::stdin();
                // EOF (e.g. stdin redirected from /dev/null) never stops a recording
                for line in stdin.lock().lines() {
                    if line.is_err() || tx.blocking_send(HostSignal::Stop).is_err() {
                        break;
                    }
                }
            })?;

        Ok(Self {
            receiver: rx,
            recording,
        })
    }

    /// Wait for the next signal
    pub async fn recv(&mut self) -> Option<HostSignal> {
        self.receiver.recv().await
    }

    /// Leave the recording phase: Ctrl+Z suspends instead of stopping
    pub fn end_recording(&self) {
        self.recording.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_signal_equality() {
        assert_eq!(HostSignal::Stop, HostSignal::Stop);
        assert_ne!(HostSignal::Hidden, HostSignal::Cancel);
    }

    #[test]
    fn suspend_is_forwarded_only_while_recording() {
        assert_eq!(suspend_action(true), SuspendAction::Forward);
        assert_eq!(suspend_action(false), SuspendAction::Suspend);
    }
}
