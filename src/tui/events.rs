use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CEvent, KeyEvent, KeyEventKind};
use log::debug;

#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Terminal input plus a tick, delivered over one channel.
///
/// The tick rate can change while running (countdown granularity switch).
/// Dropping the handler stops and joins the reader thread, so input typed
/// afterwards stays queued for the next handler.
pub struct EventHandler {
    rx: mpsc::Receiver<Event>,
    tick_ms: Arc<AtomicU64>,
    stop: Arc<AtomicBool>,
    reader: Option<JoinHandle<()>>,
}

// Upper bound on a single poll, and so on shutdown latency.
const MAX_POLL: Duration = Duration::from_millis(100);

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        let tick_ms = Arc::new(AtomicU64::new(millis(tick_rate)));
        let stop = Arc::new(AtomicBool::new(false));

        let thread_tick = Arc::clone(&tick_ms);
        let thread_stop = Arc::clone(&stop);
        let reader = thread::spawn(move || {
            let mut last_tick = Instant::now();
            while !thread_stop.load(Ordering::Relaxed) {
                let tick_rate = Duration::from_millis(thread_tick.load(Ordering::Relaxed));
                let timeout = tick_rate
                    .checked_sub(last_tick.elapsed())
                    .unwrap_or(Duration::ZERO)
                    .min(MAX_POLL);

                let ready = match event::poll(timeout) {
                    Ok(ready) => ready,
                    Err(_) => {
                        // No terminal attached: keep ticking without input.
                        thread::sleep(timeout);
                        false
                    }
                };

                // Leave pending input for whoever reads the terminal next.
                if ready && !thread_stop.load(Ordering::Relaxed) {
                    let forwarded = match event::read() {
                        Ok(CEvent::Key(key)) if key.kind == KeyEventKind::Press => Some(Event::Key(key)),
                        Ok(CEvent::Resize(..)) => Some(Event::Resize),
                        Ok(_) => None,
                        Err(e) => {
                            debug!("terminal event stream closed: {}", e);
                            break;
                        }
                    };
                    if let Some(ev) = forwarded {
                        if tx.send(ev).is_err() {
                            break;
                        }
                    }
                }

                if last_tick.elapsed() >= tick_rate {
                    if tx.send(Event::Tick).is_err() {
                        break;
                    }
                    last_tick = Instant::now();
                }
            }
        });

        Self {
            rx,
            tick_ms,
            stop,
            reader: Some(reader),
        }
    }

    pub fn set_tick_rate(&self, tick_rate: Duration) {
        self.tick_ms.store(millis(tick_rate), Ordering::Relaxed);
    }

    pub fn next(&self) -> Result<Event, mpsc::RecvError> {
        self.rx.recv()
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(reader) = self.reader.take() {
            if reader.join().is_err() {
                debug!("event reader thread panicked");
            }
        }
    }
}

impl Drop for EventHandler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX).max(1)
}
