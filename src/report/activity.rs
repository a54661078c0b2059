use std::cmp::Ordering;

use crate::models::Task;

/// Order tasks by most recent activity first
///
/// Tasks without any segment go to the bottom. The sort is stable, so tasks
/// with equal activity (including the idle ones) keep their input order.
pub fn sort_tasks_by_activity<'a, I>(tasks: I) -> Vec<&'a Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut sorted: Vec<&Task> = tasks.into_iter().collect();
    sorted.sort_by(|a, b| compare_activity(a, b));
    sorted
}

fn compare_activity(a: &Task, b: &Task) -> Ordering {
    match (a.last_activity(), b.last_activity()) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
