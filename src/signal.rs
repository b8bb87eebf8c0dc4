//! SIGINT handling for the read-eval loop.
//!
//! The loop is `Idle` until it reaches its restart point for the first time and
//! `Armed` from then on. An interrupt is only acted upon while armed: it wakes the
//! pending line read, which then reports [`crate::reader::ReadOutcome::Interrupted`]
//! and the loop starts over from the top.

use crate::reader::Event;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::Sender;
use tracing::debug;

/// Whether an interrupt is currently honored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// No restart point yet; interrupts are ignored.
    Idle,
    /// Restart point established; interrupts abort the current read.
    Armed,
}

/// Number of interrupts acted upon so far.
///
/// A line source takes a snapshot when it starts reading; input that arrived
/// before a later interrupt belongs to an abandoned line.
#[derive(Debug, Clone, Default)]
pub struct InterruptCount(Arc<AtomicU64>);

impl InterruptCount {
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Shared handle between the read-eval loop and the signal handler.
///
/// Clones share the same flag and wake the same reader.
#[derive(Debug, Clone)]
pub struct Interrupter {
    armed: Arc<AtomicBool>,
    count: InterruptCount,
    wake: Sender<Event>,
}

impl Interrupter {
    pub(crate) fn new(wake: Sender<Event>) -> Self {
        Self {
            armed: Arc::new(AtomicBool::new(false)),
            count: InterruptCount::default(),
            wake,
        }
    }

    /// Interrupts acted upon, shared with the line source.
    pub fn count(&self) -> &InterruptCount {
        &self.count
    }

    /// Marks the restart point as valid.
    pub fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }

    pub fn state(&self) -> LoopState {
        if self.armed.load(Ordering::SeqCst) {
            LoopState::Armed
        } else {
            LoopState::Idle
        }
    }

    /// Delivers one interrupt. Returns whether it was acted upon.
    pub fn interrupt(&self) -> bool {
        if self.state() == LoopState::Idle {
            debug!("interrupt ignored before the loop is armed");
            return false;
        }
        debug!("interrupt delivered to the loop");
        self.count.bump();
        // The reader may already be gone at exit; nothing is waiting then.
        self.wake.send(Event::Interrupt).is_ok()
    }

    /// Routes SIGINT to [`Interrupter::interrupt`] for the rest of the process.
    ///
    /// Can only be done once per process.
    pub fn install_handler(&self) -> Result<()> {
        let interrupter = self.clone();
        ctrlc::set_handler(move || {
            interrupter.interrupt();
        })
        .context("failed to install SIGINT handler")
    }
}
