//! Deferred work queue with microtask and macrotask lanes.
//!
//! DESIGN
//! ======
//! Handlers that must run "after the current mutation batch" enqueue a task
//! instead of relying on timer ordering. `drain` always takes the oldest
//! microtask first and only falls back to the macrotask lane when the
//! microtask lane is empty, so a macrotask observes every microtask queued
//! before it, including ones queued by earlier macrotasks.

use std::collections::VecDeque;

use tracing::warn;

/// Upper bound on tasks run by a single `drain`, guarding against tasks that
/// keep re-queueing themselves.
const MAX_TASKS_PER_DRAIN: usize = 10_000;

pub type Task<T> = Box<dyn FnOnce(&mut T) + Send + Sync>;

pub struct TaskQueue<T> {
    micro: VecDeque<Task<T>>,
    macro_lane: VecDeque<Task<T>>,
}

impl<T> TaskQueue<T> {
    #[must_use]
    pub fn new() -> Self {
        Self { micro: VecDeque::new(), macro_lane: VecDeque::new() }
    }

    /// Run before any pending macrotask.
    pub fn queue_microtask(&mut self, task: impl FnOnce(&mut T) + Send + Sync + 'static) {
        self.micro.push_back(Box::new(task));
    }

    /// Run once every microtask queued so far has run.
    pub fn queue_macrotask(&mut self, task: impl FnOnce(&mut T) + Send + Sync + 'static) {
        self.macro_lane.push_back(Box::new(task));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.micro.len() + self.macro_lane.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.micro.is_empty() && self.macro_lane.is_empty()
    }

    fn next(&mut self) -> Option<Task<T>> {
        self.micro
            .pop_front()
            .or_else(|| self.macro_lane.pop_front())
    }
}

impl<T> Default for TaskQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Anything that owns a queue of tasks over itself.
pub trait HasTaskQueue: Sized {
    fn task_queue(&mut self) -> &mut TaskQueue<Self>;
}

/// Run queued tasks until both lanes are empty. Returns the number run.
pub fn drain<T: HasTaskQueue>(target: &mut T) -> usize {
    let mut ran = 0;
    while let Some(task) = target.task_queue().next() {
        task(target);
        ran += 1;
        if ran >= MAX_TASKS_PER_DRAIN {
            warn!(ran, remaining = target.task_queue().len(), "tasks: drain limit reached");
            break;
        }
    }
    ran
}

#[cfg(test)]
#[path = "tasks_test.rs"]
mod tests;
