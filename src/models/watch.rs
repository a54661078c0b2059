use std::sync::{Arc, RwLock};

use chrono::{DateTime, TimeZone};
use log::debug;
use uuid::Uuid;

use super::category::Category;
use super::segment::{Segment, Timestamp};
use super::task::Task;
use crate::report::activity::sort_tasks_by_activity;
use crate::report::tagset::{group_by_tagset, TagsetSummary};
use crate::report::weekly::{weekly_summary, WeeklySummary};
use crate::store::{StoreError, TaskStore};

/// Watch guarded by a single lock for callers that share it across threads
pub type SharedWatch = Arc<RwLock<Watch>>;

/// Root collection of tasks
///
/// Tasks stay in insertion order. Reporting derives its own order without
/// touching this sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Watch {
    tasks: Vec<Task>,
}

impl Watch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    /// Load every task from `store`
    pub fn load_from(store: &dyn TaskStore) -> Result<Self, StoreError> {
        let tasks = store.load()?;
        debug!("Loaded {} tasks", tasks.len());
        Ok(Self::from_tasks(tasks))
    }

    /// Persist every task to `store`
    ///
    /// The in-memory collection is untouched whatever the outcome.
    pub fn save_to(&self, store: &dyn TaskStore) -> Result<(), StoreError> {
        store.save(&self.tasks)
    }

    pub fn into_shared(self) -> SharedWatch {
        Arc::new(RwLock::new(self))
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Append a new task with no segments; `None` category means work
    pub fn add_task(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        tags: Vec<String>,
        category: Option<Category>,
    ) -> &mut Task {
        let index = self.tasks.len();
        self.tasks
            .push(Task::new(name, description, tags, category.unwrap_or_default()));
        &mut self.tasks[index]
    }

    pub fn task(&self, index: usize) -> Option<&Task> {
        self.tasks.get(index)
    }

    pub fn task_mut(&mut self, index: usize) -> Option<&mut Task> {
        self.tasks.get_mut(index)
    }

    pub fn find(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn find_mut(&mut self, id: Uuid) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// Position of the task with `id` in insertion order
    pub fn task_index(&self, id: Uuid) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    pub fn remove_task(&mut self, index: usize) -> Option<Task> {
        if index < self.tasks.len() {
            Some(self.tasks.remove(index))
        } else {
            None
        }
    }

    pub fn tasks_by_category(&self, category: Category) -> Vec<&Task> {
        sort_tasks_by_activity(self.tasks.iter().filter(|t| t.category() == category))
    }

    pub fn tasks_sorted_by_activity(&self) -> Vec<&Task> {
        sort_tasks_by_activity(&self.tasks)
    }

    pub fn tasks_sorted_by_activity_with_filter(&self, filter: Option<Category>) -> Vec<&Task> {
        match filter {
            None => self.tasks_sorted_by_activity(),
            Some(category) => self.tasks_by_category(category),
        }
    }

    pub fn summary_by_tagset(
        &self,
        start: Option<Timestamp>,
        finish: Option<Timestamp>,
    ) -> Vec<TagsetSummary<'_>> {
        group_by_tagset(&self.tasks, start, finish)
    }

    pub fn weekly_summary_by_tagset<Tz: TimeZone>(
        &self,
        week_starts: &[DateTime<Tz>],
    ) -> Vec<WeeklySummary<'_, Tz>> {
        weekly_summary(&self.tasks, week_starts)
    }

    /// Weekly summary for reports that list tasks under each tagset
    ///
    /// Groups always carry their tasks, so this is the same aggregation as
    /// `weekly_summary_by_tagset`; only the formatting differs.
    pub fn weekly_summary_by_tagset_with_tasks<Tz: TimeZone>(
        &self,
        week_starts: &[DateTime<Tz>],
    ) -> Vec<WeeklySummary<'_, Tz>> {
        weekly_summary(&self.tasks, week_starts)
    }

    /// Earliest segment start and latest segment activity across all tasks
    ///
    /// An open segment contributes its start to "latest", never the current
    /// time. `None` when there are no segments.
    pub fn earliest_and_latest_segment_times(&self) -> Option<(Timestamp, Timestamp)> {
        let segments = self.tasks.iter().flat_map(|t| t.segments.iter());

        segments.fold(None, |bounds, segment: &Segment| {
            let activity = segment.activity();
            Some(match bounds {
                None => (segment.create, activity),
                Some((earliest, latest)) => (earliest.min(segment.create), latest.max(activity)),
            })
        })
    }
}
