//! The polling loop: one thread drives `tox_iterate` until a stop flag is
//! observed, forwarding events to the host over a channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{mpsc, Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use crate::event::Event;
use crate::tox::Tox;

/// Handle shared between the polling thread and the host. Lock it to call
/// operations between iterations.
pub type ToxHandle = Arc<Mutex<Tox>>;

/// A running polling loop around a [`Tox`] instance.
///
/// Each loop iteration locks the handle, runs one `iterate`, forwards the
/// drained events, unlocks, and sleeps for the library-recommended interval.
/// There is no backpressure: if the host stops draining [`Session::events`],
/// events queue up in the channel.
pub struct Session {
    tox: ToxHandle,
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
    events: Receiver<Event>,
}

impl Session {
    /// Take ownership of the instance and start the polling thread.
    pub fn spawn(tox: Tox) -> Self {
        let tox = Arc::new(Mutex::new(tox));
        let stop = Arc::new(AtomicBool::new(false));
        let (tx, events) = mpsc::channel();
        let thread = thread::Builder::new()
            .name("tox-iterate".into())
            .spawn({
                let tox = Arc::clone(&tox);
                let stop = Arc::clone(&stop);
                move || run(&tox, &stop, &tx)
            })
            .expect("spawn tox-iterate thread");
        Self {
            tox,
            stop,
            thread: Some(thread),
            events,
        }
    }

    /// Events drained from the library, in iteration order.
    pub fn events(&self) -> &Receiver<Event> {
        &self.events
    }

    /// Clone the shared handle for calling operations between iterations.
    pub fn handle(&self) -> ToxHandle {
        Arc::clone(&self.tox)
    }

    /// Stop the loop, join the thread, and hand the instance back. Returns
    /// `None` if the host still holds a clone of the handle.
    pub fn stop(mut self) -> Option<Tox> {
        self.shutdown();
        let tox = Arc::clone(&self.tox);
        drop(self);
        Arc::try_unwrap(tox)
            .ok()
            .map(|m| m.into_inner().unwrap_or_else(PoisonError::into_inner))
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::warn!("tox-iterate thread panicked");
            }
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run(tox: &Mutex<Tox>, stop: &AtomicBool, tx: &Sender<Event>) {
    while !stop.load(Ordering::Acquire) {
        let interval = {
            let mut tox = tox.lock().unwrap_or_else(PoisonError::into_inner);
            for event in tox.iterate() {
                // A dropped receiver just means the host no longer listens;
                // the library still needs driving.
                let _ = tx.send(event);
            }
            tox.iteration_interval()
        };
        thread::sleep(interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NewError;
    use crate::options::Options;

    fn tox() -> Option<Tox> {
        match Tox::new(&Options::default()) {
            Ok(tox) => Some(tox),
            Err(NewError::Load(e)) => {
                eprintln!("skipping: {e}");
                None
            }
            Err(e) => panic!("tox_new failed: {e}"),
        }
    }

    #[test]
    fn spawn_iterates_and_stop_returns_instance() {
        let Some(tox) = tox() else { return };
        let key = tox.public_key();
        let session = Session::spawn(tox);
        // Host can use the instance between iterations.
        {
            let handle = session.handle();
            let mut tox = handle.lock().unwrap();
            tox.set_name("looped").unwrap();
        }
        thread::sleep(std::time::Duration::from_millis(100));
        let tox = session.stop().expect("no outstanding handle clones");
        assert_eq!(tox.public_key(), key);
        assert_eq!(tox.name(), "looped");
    }

    #[test]
    fn stop_with_live_handle_returns_none() {
        let Some(tox) = tox() else { return };
        let session = Session::spawn(tox);
        let handle = session.handle();
        assert!(session.stop().is_none());
        drop(handle);
    }

    #[test]
    fn drop_joins_the_thread() {
        let Some(tox) = tox() else { return };
        drop(Session::spawn(tox));
    }
}
