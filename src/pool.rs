//! Bounded worker pool.
//!
//! Tasks are submitted in order from the calling thread. Before each
//! submission the caller takes a permit from [`Throttle`]; while `capacity`
//! permits are out the caller blocks until a worker hands one back. Workers
//! run on a rayon pool sized `min(capacity, tasks)` and record their outcome
//! before releasing the permit. The scope join at the end is the drain: `run`
//! returns only once every submitted task has completed.
//!
//! A failing task never stops the batch. The first failure observed is kept
//! for reporting only.

use crate::constants::WORKER_THREAD_PREFIX;
use crate::error::{Result, ShrinkError};
use std::num::NonZeroUsize;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// The result of running one task.
#[derive(Debug)]
pub struct TaskOutcome<T, O, E> {
    pub task: T,
    pub result: std::result::Result<O, E>,
}

impl<T, O, E> TaskOutcome<T, O, E> {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Aggregate of a finished run. Outcomes are kept in completion order.
#[derive(Debug)]
pub struct BatchOutcome<T, O, E> {
    pub total_submitted: usize,
    pub completed: usize,
    /// Highest number of tasks that were in flight at the same time.
    pub peak_in_flight: usize,
    pub outcomes: Vec<TaskOutcome<T, O, E>>,
    first_error: Option<usize>,
}

impl<T, O, E> Default for BatchOutcome<T, O, E> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T, O, E> BatchOutcome<T, O, E> {
    fn empty() -> Self {
        Self {
            total_submitted: 0,
            completed: 0,
            peak_in_flight: 0,
            outcomes: Vec::new(),
            first_error: None,
        }
    }

    pub fn is_drained(&self) -> bool {
        self.completed == self.total_submitted
    }

    /// The earliest completed task that failed.
    pub fn first_error(&self) -> Option<&TaskOutcome<T, O, E>> {
        self.first_error.map(|index| &self.outcomes[index])
    }

    pub fn failures(&self) -> impl Iterator<Item = &TaskOutcome<T, O, E>> {
        self.outcomes.iter().filter(|outcome| !outcome.is_ok())
    }

    pub fn successes(&self) -> impl Iterator<Item = &TaskOutcome<T, O, E>> {
        self.outcomes.iter().filter(|outcome| outcome.is_ok())
    }

    pub fn failed_count(&self) -> usize {
        self.failures().count()
    }
}

#[derive(Debug)]
struct Ledger<T, O, E> {
    in_flight: usize,
    submitted: usize,
    peak_in_flight: usize,
    outcome: BatchOutcome<T, O, E>,
}

/// Permit counter plus the shared bookkeeping every worker writes into.
struct Throttle<T, O, E> {
    capacity: usize,
    ledger: Mutex<Ledger<T, O, E>>,
    slot_freed: Condvar,
}

/// Held by a running task; gives the slot back on drop, including when the
/// handler panics.
struct Permit<'a, T, O, E> {
    throttle: &'a Throttle<T, O, E>,
}

impl<T, O, E> Throttle<T, O, E> {
    fn new(capacity: usize, expected: usize) -> Self {
        let mut outcome = BatchOutcome::empty();
        outcome.outcomes.reserve(expected);
        Self {
            capacity,
            ledger: Mutex::new(Ledger {
                in_flight: 0,
                submitted: 0,
                peak_in_flight: 0,
                outcome,
            }),
            slot_freed: Condvar::new(),
        }
    }

    // a panicking handler never holds the lock, so a poisoned ledger is
    // still consistent
    fn lock(&self) -> MutexGuard<'_, Ledger<T, O, E>> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn acquire(&self) -> Permit<'_, T, O, E> {
        let mut ledger = self.lock();
        while ledger.in_flight >= self.capacity {
            ledger = self
                .slot_freed
                .wait(ledger)
                .unwrap_or_else(PoisonError::into_inner);
        }
        ledger.in_flight += 1;
        ledger.submitted += 1;
        ledger.peak_in_flight = ledger.peak_in_flight.max(ledger.in_flight);
        Permit { throttle: self }
    }

    fn record(&self, outcome: TaskOutcome<T, O, E>) {
        let mut ledger = self.lock();
        let batch = &mut ledger.outcome;
        if !outcome.is_ok() && batch.first_error.is_none() {
            batch.first_error = Some(batch.outcomes.len());
        }
        batch.outcomes.push(outcome);
        batch.completed += 1;
    }

    fn release(&self) {
        let mut ledger = self.lock();
        debug_assert!(ledger.in_flight > 0, "permit released twice");
        ledger.in_flight -= 1;
        drop(ledger);
        self.slot_freed.notify_one();
    }

    fn into_outcome(self) -> BatchOutcome<T, O, E> {
        let ledger = self
            .ledger
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        let mut outcome = ledger.outcome;
        outcome.total_submitted = ledger.submitted;
        outcome.peak_in_flight = ledger.peak_in_flight;
        outcome
    }
}

impl<T, O, E> Drop for Permit<'_, T, O, E> {
    fn drop(&mut self) {
        self.throttle.release();
    }
}

/// Runs tasks with at most `capacity` of them in flight.
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    capacity: NonZeroUsize,
}

impl WorkerPool {
    /// A capacity of zero is a configuration error.
    pub fn new(capacity: usize) -> Result<Self> {
        NonZeroUsize::new(capacity)
            .map(|capacity| Self { capacity })
            .ok_or(ShrinkError::InvalidWorkerCount(0))
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Runs `handler` once for every task and waits for all of them.
    ///
    /// Only failing to start the worker threads is an error; task failures
    /// are carried in the returned outcomes.
    pub fn run<T, O, E, F>(&self, tasks: Vec<T>, handler: F) -> Result<BatchOutcome<T, O, E>>
    where
        T: Send,
        O: Send,
        E: Send,
        F: Fn(&T) -> std::result::Result<O, E> + Sync,
    {
        let total = tasks.len();
        if total == 0 {
            return Ok(BatchOutcome::empty());
        }

        let threads = self.capacity().min(total);
        let workers = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|index| format!("{}-{}", WORKER_THREAD_PREFIX, index))
            .build()?;

        let throttle = Throttle::new(self.capacity(), total);
        let handler = &handler;
        let throttle_ref = &throttle;

        workers.in_place_scope(|scope| {
            for task in tasks {
                let permit = throttle_ref.acquire();
                scope.spawn(move |_| {
                    let result = handler(&task);
                    throttle_ref.record(TaskOutcome { task, result });
                    drop(permit);
                });
            }
        });

        let outcome = throttle.into_outcome();
        debug_assert!(outcome.is_drained());
        Ok(outcome)
    }
}
