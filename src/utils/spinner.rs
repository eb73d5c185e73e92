use colored::*;
use rand::seq::IndexedRandom;
use std::io::{self, Write};
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tokio::time::interval;

const SPINNER_CHARS: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

const WAITING_PHRASES: &[&str] = &[
    "Waiting for the handshake",
    "Tuning in",
    "Dropping the needle",
    "Cueing up",
    "Warming up the turntable",
    "Listening for the callback",
    "Checking the setlist",
    "Soundchecking",
];

pub struct Spinner {
    start_time: Instant,
    current_phrase: String,
}

impl Spinner {
    pub fn new() -> Self {
        let phrase = WAITING_PHRASES
            .choose(&mut rand::rng())
            .unwrap_or(&"Waiting")
            .to_string();

        Self {
            start_time: Instant::now(),
            current_phrase: phrase,
        }
    }

    /// Spins until `rx` resolves or `timeout` elapses. Returns `None` on
    /// timeout or when the sender is dropped.
    pub async fn wait_for<T>(&mut self, mut rx: oneshot::Receiver<T>, timeout: Duration) -> Option<T> {
        let mut ticker = interval(Duration::from_millis(100));
        let mut spinner_index = 0;

        let result = loop {
            tokio::select! {
                received = &mut rx => break received.ok(),
                _ = ticker.tick() => {
                    if self.start_time.elapsed() >= timeout {
                        break None;
                    }
                    self.display_spinner(spinner_index);
                    spinner_index = (spinner_index + 1) % SPINNER_CHARS.len();
                }
            }
        };

        self.clear_line();
        result
    }

    fn display_spinner(&self, spinner_index: usize) {
        let seconds = self.start_time.elapsed().as_secs();

        let spinner_char = SPINNER_CHARS[spinner_index];
        let display = format!(
            "\r{} {}... ({}s)",
            spinner_char.to_string().bright_green(),
            self.current_phrase.bright_green(),
            seconds
        );

        print!("{display}");
        let _ = io::stdout().flush();
    }

    fn clear_line(&self) {
        print!("\r{}\r", " ".repeat(80));
        let _ = io::stdout().flush();
    }
}

impl Default for Spinner {
    fn default() -> Self {
        Self::new()
    }
}
