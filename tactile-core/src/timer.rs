//! Deferred task scheduling.
//!
//! The toolkit has a single logical thread: asynchronous behavior (the
//! momentary button's delayed reset) is modeled as explicit tasks in a
//! [`TimerQueue`] that the host pumps with its own clock. Every schedule
//! returns a cancellable [`TimerHandle`].

use crate::widget::WidgetId;

/// What a due timer should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTask {
    /// Reset a momentary button element back to zero.
    MomentaryReset {
        /// The owning widget.
        widget: WidgetId,
        /// The element index inside the widget.
        index: usize,
    },
}

impl TimerTask {
    /// The widget this task targets.
    #[must_use]
    pub fn widget(&self) -> WidgetId {
        match self {
            Self::MomentaryReset { widget, .. } => *widget,
        }
    }
}

/// Handle for cancelling a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerHandle(u64);

#[derive(Debug)]
struct Scheduled {
    id: u64,
    due_ms: u64,
    task: TimerTask,
}

/// A deadline-ordered queue of deferred tasks.
#[derive(Debug, Default)]
pub struct TimerQueue {
    next_id: u64,
    tasks: Vec<Scheduled>,
}

impl TimerQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `task` to fire at `due_ms` on the host clock.
    pub fn schedule(&mut self, due_ms: u64, task: TimerTask) -> TimerHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.tasks.push(Scheduled { id, due_ms, task });
        TimerHandle(id)
    }

    /// Cancel a scheduled task. Returns `true` if it was still pending.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != handle.0);
        self.tasks.len() != before
    }

    /// Number of pending tasks.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Remove and return every task due at or before `now_ms`, in
    /// deadline order.
    pub fn drain_due(&mut self, now_ms: u64) -> Vec<TimerTask> {
        let mut due: Vec<Scheduled> = Vec::new();
        let mut i = 0;
        while i < self.tasks.len() {
            if self.tasks[i].due_ms <= now_ms {
                due.push(self.tasks.swap_remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by_key(|t| (t.due_ms, t.id));
        due.into_iter().map(|t| t.task).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(widget: WidgetId, index: usize) -> TimerTask {
        TimerTask::MomentaryReset { widget, index }
    }

    #[test]
    fn drains_only_due_tasks_in_deadline_order() {
        let mut queue = TimerQueue::new();
        let w = WidgetId::new();
        queue.schedule(150, task(w, 1));
        queue.schedule(50, task(w, 0));
        queue.schedule(300, task(w, 2));

        let due = queue.drain_due(200);
        assert_eq!(due, vec![task(w, 0), task(w, 1)]);
        assert_eq!(queue.pending(), 1);

        let rest = queue.drain_due(1000);
        assert_eq!(rest, vec![task(w, 2)]);
    }

    #[test]
    fn cancel_removes_pending_task() {
        let mut queue = TimerQueue::new();
        let w = WidgetId::new();
        let handle = queue.schedule(50, task(w, 0));
        assert!(queue.cancel(handle));
        assert!(!queue.cancel(handle));
        assert!(queue.drain_due(100).is_empty());
    }
}
