use std::io::Write;
use std::sync::OnceLock;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

const TIP_DURATION: Duration = Duration::from_secs(2);
const MESSAGE_READ_TIME: Duration = Duration::from_secs(3);
const MIN_TIP_VISIBILITY: Duration = Duration::from_millis(750);
const TIPS: &[&str] = &[
    "Press 'q' to stop launching new lookups",
    "Ctrl-C keeps everything saved so far",
];

pub struct SpinnerHandle {
    pub spinner: ProgressBar,
    tx: Sender<String>,
}

impl SpinnerHandle {
    pub fn send_to_queue(&self, message: String) {
        let _ = self.tx.send(message);
    }

    pub fn println(&self, msg: &str) {
        // Raw mode (the key listener) turns '\n' into a bare line feed.
        let msg = msg.replace('\n', "\r\n");
        if self.is_finished() || self.spinner.is_hidden() {
            let mut out = std::io::stdout().lock();
            let _ = writeln!(out, "\r{msg}\r");
            let _ = out.flush();
        } else {
            self.spinner.println(format!("\r{msg}\r"));
        }
    }

    pub fn finish_and_clear(&self) {
        self.spinner.finish_and_clear();
    }

    pub fn is_finished(&self) -> bool {
        self.spinner.is_finished()
    }
}

static SPINNER: OnceLock<SpinnerHandle> = OnceLock::new();

pub fn get_spinner() -> &'static SpinnerHandle {
    SPINNER.get_or_init(init_spinner)
}

fn init_spinner() -> SpinnerHandle {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&[
            "▁▁▁▁▁",
            "▁▂▂▂▁",
            "▁▄▂▄▁",
            "▂▄▆▄▂",
            "▄▆█▆▄",
            "▂▄▆▄▂",
            "▁▄▂▄▁",
            "▁▂▂▂▁",
        ]);

    pb.set_style(style);
    pb.enable_steady_tick(Duration::from_millis(100));

    let (tx, rx) = mpsc::channel::<String>();
    let pb_clone = pb.clone();

    thread::spawn(move || {
        let mut tip_index = 0;
        let mut next_tip_time = Instant::now() + MESSAGE_READ_TIME;
        let mut is_showing_tip = false;
        let mut last_tip_time = Instant::now();

        loop {
            if pb_clone.is_finished() {
                break;
            }

            let wait_time = next_tip_time.saturating_duration_since(Instant::now());

            match rx.recv_timeout(wait_time) {
                Ok(mut msg) => {
                    if is_showing_tip {
                        let elapsed = last_tip_time.elapsed();
                        if elapsed < MIN_TIP_VISIBILITY {
                            thread::sleep(MIN_TIP_VISIBILITY - elapsed);
                        }
                        is_showing_tip = false;
                    }
                    while let Ok(newer_msg) = rx.try_recv() {
                        msg = newer_msg;
                    }
                    pb_clone.set_message(msg);
                    next_tip_time = Instant::now() + MESSAGE_READ_TIME;
                }
                Err(RecvTimeoutError::Timeout) => {
                    let tip = TIPS[tip_index % TIPS.len()];
                    pb_clone.set_message(format!("{}", tip.italic().white()));

                    tip_index += 1;
                    is_showing_tip = true;
                    last_tip_time = Instant::now();
                    next_tip_time = Instant::now() + TIP_DURATION;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    });

    SpinnerHandle { spinner: pb, tx }
}

pub fn report_search_progress(index: usize, total: usize, query: &str) {
    get_spinner().send_to_queue(format!(
        "Searching {} {}",
        format!("[{}/{}]", index + 1, total).green().bold(),
        query
    ));
}

pub fn report_lookup_progress(done: usize, total: usize, new_domains: usize) {
    get_spinner().send_to_queue(format!(
        "Reversed {} of {} addresses, {} new domains so far...",
        done.to_string().green().bold(),
        total,
        new_domains.to_string().green().bold()
    ));
}

/// Routes log output above the spinner line.
pub struct SpinnerWriter;

impl Write for SpinnerWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let msg = String::from_utf8_lossy(buf);
        get_spinner().println(msg.trim_end());
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
