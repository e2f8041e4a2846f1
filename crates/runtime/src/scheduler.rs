use crate::event_bus::EventBus;
use crate::frame::Frame;
use crate::task::{TaskControl, TaskHandle};

#[derive(Debug, Clone)]
struct ScheduledTask<K> {
    handle: TaskHandle,
    kind: K,
    priority: i32,
    order: u64,
}

/// Cooperative per-frame task list.
///
/// Every started task runs once per [`Scheduler::run_frame`] until it is
/// cancelled or its body returns [`TaskControl::Finish`]. Ordering is
/// deterministic: `(priority, insertion_order)`.
#[derive(Debug)]
pub struct Scheduler<K> {
    next_order: u64,
    tasks: Vec<ScheduledTask<K>>,
}

impl<K> Default for Scheduler<K> {
    fn default() -> Self {
        Self {
            next_order: 0,
            tasks: Vec::new(),
        }
    }
}

impl<K: Copy> Scheduler<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, kind: K) -> TaskHandle {
        self.start_with_priority(kind, 0)
    }

    pub fn start_with_priority(&mut self, kind: K, priority: i32) -> TaskHandle {
        let order = self.next_order;
        self.next_order = self.next_order.wrapping_add(1);
        let handle = TaskHandle(order);
        self.tasks.push(ScheduledTask {
            handle,
            kind,
            priority,
            order,
        });
        self.tasks
            .sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.order.cmp(&b.order)));
        handle
    }

    /// Returns `true` if the task was scheduled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.handle != handle);
        self.tasks.len() != before
    }

    pub fn is_active(&self, handle: TaskHandle) -> bool {
        self.tasks.iter().any(|t| t.handle == handle)
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Kinds of the scheduled tasks in run order.
    pub fn kinds(&self) -> Vec<K> {
        self.tasks.iter().map(|t| t.kind).collect()
    }

    /// Run every scheduled task once, in order, for `frame`.
    ///
    /// Returns the number of task bodies invoked.
    pub fn run_frame<F>(&mut self, frame: Frame, bus: &mut EventBus, mut run: F) -> usize
    where
        F: FnMut(K, Frame, &mut EventBus) -> TaskControl,
    {
        let mut finished = Vec::new();
        for task in &self.tasks {
            if run(task.kind, frame, bus) == TaskControl::Finish {
                finished.push(task.handle);
            }
        }
        let ran = self.tasks.len();
        self.tasks.retain(|t| !finished.contains(&t.handle));
        ran
    }
}

#[cfg(test)]
mod tests {
    use super::Scheduler;
    use crate::event_bus::EventBus;
    use crate::frame::Frame;
    use crate::task::TaskControl;

    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    enum Kind {
        A,
        B,
    }

    fn record(kind: Kind, frame: Frame, bus: &mut EventBus) -> TaskControl {
        bus.emit(frame, "task", format!("{kind:?}"));
        TaskControl::Continue
    }

    fn messages(bus: &EventBus) -> Vec<&str> {
        bus.events().iter().map(|e| e.message.as_str()).collect()
    }

    #[test]
    fn runs_tasks_in_insertion_order() {
        let mut sched = Scheduler::new();
        sched.start(Kind::B);
        sched.start(Kind::A);

        let mut bus = EventBus::new();
        sched.run_frame(Frame::new(0, 1.0), &mut bus, record);
        assert_eq!(messages(&bus), vec!["B", "A"]);
    }

    #[test]
    fn runs_lower_priority_value_first() {
        let mut sched = Scheduler::new();
        sched.start_with_priority(Kind::A, 10);
        sched.start_with_priority(Kind::B, -1);

        let mut bus = EventBus::new();
        sched.run_frame(Frame::new(0, 1.0), &mut bus, record);
        assert_eq!(messages(&bus), vec!["B", "A"]);
        assert_eq!(sched.kinds(), vec![Kind::B, Kind::A]);
    }

    #[test]
    fn cancelled_tasks_stop_running() {
        let mut sched = Scheduler::new();
        let a = sched.start(Kind::A);
        sched.start(Kind::B);
        assert!(sched.cancel(a));
        assert!(!sched.cancel(a));

        let mut bus = EventBus::new();
        let ran = sched.run_frame(Frame::new(0, 1.0), &mut bus, record);
        assert_eq!(ran, 1);
        assert_eq!(messages(&bus), vec!["B"]);
    }

    #[test]
    fn finished_tasks_are_dropped_after_the_frame() {
        let mut sched = Scheduler::new();
        let a = sched.start(Kind::A);
        sched.start(Kind::B);

        let mut bus = EventBus::new();
        sched.run_frame(Frame::new(0, 1.0), &mut bus, |kind, frame, bus| {
            record(kind, frame, bus);
            if kind == Kind::A {
                TaskControl::Finish
            } else {
                TaskControl::Continue
            }
        });
        assert!(!sched.is_active(a));
        assert_eq!(sched.task_count(), 1);

        sched.run_frame(Frame::new(1, 1.0), &mut bus, record);
        assert_eq!(messages(&bus), vec!["A", "B", "B"]);
    }
}
