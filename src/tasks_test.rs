use super::*;

#[derive(Default)]
struct Log {
    seen: Vec<&'static str>,
    queue: TaskQueue<Log>,
}

impl HasTaskQueue for Log {
    fn task_queue(&mut self) -> &mut TaskQueue<Self> {
        &mut self.queue
    }
}

#[test]
fn empty_queue_drains_nothing() {
    let mut log = Log::default();
    assert!(log.queue.is_empty());
    assert_eq!(drain(&mut log), 0);
}

#[test]
fn microtasks_run_before_macrotasks() {
    let mut log = Log::default();
    log.queue.queue_macrotask(|l: &mut Log| l.seen.push("macro"));
    log.queue.queue_microtask(|l: &mut Log| l.seen.push("micro"));
    assert_eq!(log.queue.len(), 2);

    assert_eq!(drain(&mut log), 2);
    assert_eq!(log.seen, ["micro", "macro"]);
    assert!(log.queue.is_empty());
}

#[test]
fn each_lane_is_fifo() {
    let mut log = Log::default();
    log.queue.queue_microtask(|l: &mut Log| l.seen.push("m1"));
    log.queue.queue_microtask(|l: &mut Log| l.seen.push("m2"));
    log.queue.queue_macrotask(|l: &mut Log| l.seen.push("M1"));
    log.queue.queue_macrotask(|l: &mut Log| l.seen.push("M2"));
    drain(&mut log);
    assert_eq!(log.seen, ["m1", "m2", "M1", "M2"]);
}

#[test]
fn microtask_queued_by_macrotask_runs_before_next_macrotask() {
    let mut log = Log::default();
    log.queue.queue_macrotask(|l: &mut Log| {
        l.seen.push("M1");
        l.queue.queue_microtask(|l: &mut Log| l.seen.push("m-from-M1"));
    });
    log.queue.queue_macrotask(|l: &mut Log| l.seen.push("M2"));
    assert_eq!(drain(&mut log), 3);
    assert_eq!(log.seen, ["M1", "m-from-M1", "M2"]);
}

fn requeue(l: &mut Log) {
    l.queue.queue_microtask(requeue);
}

#[test]
fn drain_stops_at_limit_for_self_requeueing_task() {
    let mut log = Log::default();
    log.queue.queue_microtask(requeue);
    assert_eq!(drain(&mut log), MAX_TASKS_PER_DRAIN);
    assert_eq!(log.queue.len(), 1);
}
