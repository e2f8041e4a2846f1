use crate::scheduler::Scheduler;

/// Identifies one started frame task. Handles are never reused.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(pub(crate) u64);

/// Returned by a task body to keep running or to drop out of the schedule.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TaskControl {
    Continue,
    Finish,
}

/// Start/cancel bookkeeping for an owner that runs a single repeating task.
///
/// Holding the handle is what keeps the task alive; cancelling clears it.
#[derive(Debug, Clone)]
pub struct RepeatingTask<K> {
    kind: K,
    priority: i32,
    handle: Option<TaskHandle>,
}

impl<K: Copy> RepeatingTask<K> {
    pub fn new(kind: K) -> Self {
        Self::with_priority(kind, 0)
    }

    /// Smaller priorities run earlier within a frame.
    pub fn with_priority(kind: K, priority: i32) -> Self {
        Self {
            kind,
            priority,
            handle: None,
        }
    }

    pub fn kind(&self) -> K {
        self.kind
    }

    pub fn handle(&self) -> Option<TaskHandle> {
        self.handle
    }

    /// Starts the task unless it is already scheduled.
    pub fn start(&mut self, scheduler: &mut Scheduler<K>) -> TaskHandle {
        if let Some(handle) = self.handle {
            if scheduler.is_active(handle) {
                return handle;
            }
        }
        let handle = scheduler.start_with_priority(self.kind, self.priority);
        self.handle = Some(handle);
        handle
    }

    /// Returns `true` if a scheduled task was cancelled.
    pub fn cancel(&mut self, scheduler: &mut Scheduler<K>) -> bool {
        match self.handle.take() {
            Some(handle) => scheduler.cancel(handle),
            None => false,
        }
    }

    pub fn is_running(&self, scheduler: &Scheduler<K>) -> bool {
        self.handle.is_some_and(|h| scheduler.is_active(h))
    }
}

#[cfg(test)]
mod tests {
    use super::RepeatingTask;
    use crate::scheduler::Scheduler;

    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    enum Kind {
        Sync,
    }

    #[test]
    fn start_is_idempotent() {
        let mut sched = Scheduler::new();
        let mut task = RepeatingTask::new(Kind::Sync);
        let a = task.start(&mut sched);
        let b = task.start(&mut sched);
        assert_eq!(a, b);
        assert_eq!(sched.task_count(), 1);
    }

    #[test]
    fn cancel_clears_handle() {
        let mut sched = Scheduler::new();
        let mut task = RepeatingTask::new(Kind::Sync);
        task.start(&mut sched);
        assert!(task.is_running(&sched));
        assert!(task.cancel(&mut sched));
        assert!(!task.is_running(&sched));
        assert!(task.handle().is_none());
        assert!(!task.cancel(&mut sched));
    }

    #[test]
    fn restart_after_cancel_gets_fresh_handle() {
        let mut sched = Scheduler::new();
        let mut task = RepeatingTask::new(Kind::Sync);
        let a = task.start(&mut sched);
        task.cancel(&mut sched);
        let b = task.start(&mut sched);
        assert_ne!(a, b);
        assert_eq!(task.kind(), Kind::Sync);
    }
}
