use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use tokio_util::sync::CancellationToken;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Cancels the run when 'q' or Ctrl-C is pressed.
///
/// Holds the terminal in raw mode until dropped.
pub struct KeyListener {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl KeyListener {
    pub fn start(cancel: CancellationToken) -> Option<Self> {
        if let Err(e) = enable_raw_mode() {
            tracing::debug!(error = %e, "keyboard input unavailable");
            return None;
        }

        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = stop.clone();
        let handle = thread::spawn(move || {
            while !stop_flag.load(Ordering::Relaxed) {
                if !matches!(event::poll(POLL_INTERVAL), Ok(true)) {
                    continue;
                }
                if let Ok(Event::Key(key_event)) = event::read() {
                    let is_q = key_event.code == KeyCode::Char('q');
                    let is_ctrl_c = key_event.code == KeyCode::Char('c')
                        && key_event.modifiers.contains(KeyModifiers::CONTROL);

                    if (is_q || is_ctrl_c) && key_event.kind == KeyEventKind::Press {
                        revmap_common::warn!("stopping: in-flight work will finish");
                        cancel.cancel();
                        break;
                    }
                }
            }
        });

        Some(Self {
            stop,
            handle: Some(handle),
        })
    }
}

impl Drop for KeyListener {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        let _ = disable_raw_mode();
    }
}
