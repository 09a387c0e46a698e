// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Cooperative stop signalling for the monitoring worker

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct SignalState {
    stop_requested: bool,
    finished: bool,
}

/// Shared between the engine and its worker thread
#[derive(Debug, Default)]
pub struct MonitorSignal {
    state: Mutex<SignalState>,
    condvar: Condvar,
}

impl MonitorSignal {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn request_stop(&self) {
        self.state.lock().stop_requested = true;
        self.condvar.notify_all();
    }

    pub fn is_stop_requested(&self) -> bool {
        self.state.lock().stop_requested
    }

    pub fn is_finished(&self) -> bool {
        self.state.lock().finished
    }

    /// Sleep for `timeout` unless stop is requested first.
    /// Returns true when the worker should exit.
    pub fn wait_for_stop(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        while !state.stop_requested {
            if self.condvar.wait_until(&mut state, deadline).timed_out() {
                break;
            }
        }
        state.stop_requested
    }

    /// Wait up to `timeout` for the worker to report that it has exited
    pub fn wait_for_finish(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        while !state.finished {
            if self.condvar.wait_until(&mut state, deadline).timed_out() {
                break;
            }
        }
        state.finished
    }

    /// Marks the worker finished when dropped, including during unwinding
    pub fn finish_guard(self: &Arc<Self>) -> FinishGuard {
        FinishGuard {
            signal: Arc::clone(self),
        }
    }
}

pub struct FinishGuard {
    signal: Arc<MonitorSignal>,
}

impl Drop for FinishGuard {
    fn drop(&mut self) {
        self.signal.state.lock().finished = true;
        self.signal.condvar.notify_all();
    }
}

/// A monitoring worker, running or still winding down after a stop request
pub struct MonitorHandle {
    signal: Arc<MonitorSignal>,
    thread: Option<JoinHandle<()>>,
}

impl MonitorHandle {
    pub fn new(signal: Arc<MonitorSignal>, thread: JoinHandle<()>) -> Self {
        Self {
            signal,
            thread: Some(thread),
        }
    }

    pub fn signal(&self) -> Arc<MonitorSignal> {
        Arc::clone(&self.signal)
    }

    /// Whether the worker thread has not yet exited
    pub fn is_running(&self) -> bool {
        !self.signal.is_finished()
    }

    pub fn is_stop_requested(&self) -> bool {
        self.signal.is_stop_requested()
    }

    /// Signal stop without waiting
    pub fn request_stop(&self) {
        self.signal.request_stop();
    }

    /// Join the worker thread. Only call once the worker reported finished.
    pub fn join(mut self) {
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("Monitoring worker panicked during shutdown");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_wait_for_stop_times_out() {
        let signal = MonitorSignal::new();
        let started = Instant::now();
        assert!(!signal.wait_for_stop(Duration::from_millis(30)));
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_request_stop_wakes_waiter() {
        let signal = MonitorSignal::new();
        let waiter = {
            let signal = Arc::clone(&signal);
            thread::spawn(move || signal.wait_for_stop(Duration::from_secs(30)))
        };

        thread::sleep(Duration::from_millis(20));
        let started = Instant::now();
        signal.request_stop();
        assert!(waiter.join().unwrap());
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_cooperative_worker_finishes_after_stop() {
        let signal = MonitorSignal::new();
        let thread = {
            let signal = Arc::clone(&signal);
            thread::spawn(move || {
                let _guard = signal.finish_guard();
                while !signal.wait_for_stop(Duration::from_secs(30)) {}
            })
        };

        let handle = MonitorHandle::new(signal, thread);
        assert!(handle.is_running());

        handle.request_stop();
        assert!(handle.signal().wait_for_finish(Duration::from_secs(5)));
        assert!(!handle.is_running());
        handle.join();
    }

    #[test]
    fn test_finish_wait_is_bounded_for_busy_worker() {
        let signal = MonitorSignal::new();
        let thread = {
            let signal = Arc::clone(&signal);
            thread::spawn(move || {
                let _guard = signal.finish_guard();
                thread::sleep(Duration::from_millis(500));
            })
        };

        let handle = MonitorHandle::new(signal, thread);
        handle.request_stop();

        let started = Instant::now();
        assert!(!handle.signal().wait_for_finish(Duration::from_millis(50)));
        assert!(started.elapsed() < Duration::from_millis(400));
        assert!(handle.is_running());
        assert!(handle.is_stop_requested());

        assert!(handle.signal().wait_for_finish(Duration::from_secs(5)));
        handle.join();
    }
}
