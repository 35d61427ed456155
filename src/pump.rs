//! Display refresh pump: a worker thread that emits ticks while started.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

/// Schedules display refreshes for the controller.
///
/// Every `start` opens a new generation; ticks carry the generation they were
/// scheduled under so the receiver can drop ticks that outlived a `cancel`.
pub trait Refresh {
    fn start(&mut self);
    fn cancel(&mut self);
    fn is_active(&self) -> bool;
    fn generation(&self) -> u64;
}

enum PumpOp {
    Start { generation: u64 },
    Stop,
    Quit,
}

pub struct Pump {
    ctl: Sender<PumpOp>,
    generation: u64,
    running: bool,
    worker: Option<JoinHandle<()>>,
}

impl Pump {
    /// Spawns the pump thread. `on_tick` runs on that thread and returns false
    /// once nobody is listening, which ends the thread.
    pub fn spawn<F>(interval: Duration, on_tick: F) -> std::io::Result<Self>
    where
        F: FnMut(u64) -> bool + Send + 'static,
    {
        let (ctl, rx) = mpsc::channel();
        let worker = std::thread::Builder::new()
            .name("refresh-pump".into())
            .spawn(move || pump_thread(&rx, interval, on_tick))?;
        Ok(Self {
            ctl,
            generation: 0,
            running: false,
            worker: Some(worker),
        })
    }
}

impl Refresh for Pump {
    fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.generation += 1;
        if self.ctl.send(PumpOp::Start { generation: self.generation }).is_err() {
            log::warn!("Refresh pump is gone; display will not update");
        }
    }

    fn cancel(&mut self) {
        if self.running {
            self.running = false;
            self.ctl.send(PumpOp::Stop).ok();
        }
    }

    fn is_active(&self) -> bool {
        self.running
    }

    fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for Pump {
    fn drop(&mut self) {
        self.ctl.send(PumpOp::Quit).ok();
        if let Some(worker) = self.worker.take() {
            worker.join().ok();
        }
    }
}

fn pump_thread<F>(rx: &Receiver<PumpOp>, interval: Duration, mut on_tick: F)
where
    F: FnMut(u64) -> bool,
{
    let mut active: Option<u64> = None;

    loop {
        let op = match active {
            Some(generation) => match rx.recv_timeout(interval) {
                Ok(op) => op,
                Err(RecvTimeoutError::Timeout) => {
                    if !on_tick(generation) {
                        break;
                    }
                    continue;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            },
            None => match rx.recv() {
                Ok(op) => op,
                Err(_) => break,
            },
        };

        match op {
            PumpOp::Start { generation } => active = Some(generation),
            PumpOp::Stop => active = None,
            PumpOp::Quit => break,
        }
    }
}

/// Refresh scheduler that only records calls.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingRefresh {
    pub active: bool,
    pub generation: u64,
    pub starts: usize,
    pub cancels: usize,
}

#[cfg(test)]
impl Refresh for RecordingRefresh {
    fn start(&mut self) {
        if !self.active {
            self.active = true;
            self.generation += 1;
            self.starts += 1;
        }
    }

    fn cancel(&mut self) {
        if self.active {
            self.active = false;
            self.cancels += 1;
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn generation(&self) -> u64 {
        self.generation
    }
}
