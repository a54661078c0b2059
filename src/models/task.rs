use chrono::{Duration, Utc};
use uuid::Uuid;

use super::category::Category;
use super::segment::{Segment, Timestamp};

/// Trackable unit of work owning its segments
///
/// Segments are kept in insertion order, which is the order they were
/// created in; nothing re-sorts them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub category: Category,
    pub segments: Vec<Segment>,
}

impl Task {
    /// Create a new task with no segments
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        tags: Vec<String>,
        category: Category,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            tags,
            category,
            segments: Vec::new(),
        }
    }

    /// Open a new segment now
    ///
    /// Does not check for an already open segment; preventing a double start
    /// is up to the caller.
    pub fn add_segment(&mut self, note: impl Into<String>) {
        self.add_segment_at(note, Utc::now());
    }

    /// Open a new segment starting at `at`
    pub fn add_segment_at(&mut self, note: impl Into<String>, at: Timestamp) {
        self.segments.push(Segment::open(at, note));
    }

    /// Record a segment that already finished
    pub fn add_closed_segment(&mut self, create: Timestamp, finish: Timestamp, note: impl Into<String>) {
        self.segments.push(Segment::closed(create, finish, note));
    }

    /// Close every open segment now, returning how many were closed
    pub fn close_segment(&mut self) -> usize {
        self.close_segment_at(Utc::now())
    }

    /// Close every open segment at `at`, returning how many were closed
    pub fn close_segment_at(&mut self, at: Timestamp) -> usize {
        let mut closed = 0;
        for segment in self.segments.iter_mut().filter(|s| !s.is_closed()) {
            segment.finish = Some(at);
            closed += 1;
        }
        closed
    }

    pub fn has_unclosed_segment(&self) -> bool {
        self.segments.iter().any(|s| !s.is_closed())
    }

    pub fn is_active(&self) -> bool {
        self.has_unclosed_segment()
    }

    /// Last segment by insertion order
    pub fn last_segment(&self) -> Option<&Segment> {
        self.segments.last()
    }

    /// Finish of the last segment, or its start while it is still open
    pub fn last_activity(&self) -> Option<Timestamp> {
        self.last_segment().map(Segment::activity)
    }

    pub fn closed_segments_duration(&self) -> Duration {
        self.segments
            .iter()
            .filter_map(Segment::duration)
            .fold(Duration::zero(), |acc, d| acc + d)
    }

    /// Running time of the last segment if it is open
    ///
    /// Only the last segment is inspected, unlike `close_segment` which
    /// closes every open segment.
    pub fn current_segment_duration(&self) -> Duration {
        self.current_segment_duration_at(Utc::now())
    }

    pub fn current_segment_duration_at(&self, now: Timestamp) -> Duration {
        match self.last_segment() {
            Some(segment) if !segment.is_closed() => now - segment.create,
            _ => Duration::zero(),
        }
    }

    /// Sum of closed segments finishing inside `(start, finish]`
    pub fn filtered_closed_segments_duration(
        &self,
        start: Option<Timestamp>,
        finish: Option<Timestamp>,
    ) -> Duration {
        self.segments
            .iter()
            .filter(|s| s.is_in_range(start, finish))
            .filter_map(Segment::duration)
            .fold(Duration::zero(), |acc, d| acc + d)
    }

    pub fn has_segments_in_range(&self, start: Option<Timestamp>, finish: Option<Timestamp>) -> bool {
        self.segments.iter().any(|s| s.is_in_range(start, finish))
    }

    /// Closed time finishing after `week_start`, with no upper bound
    pub fn this_week_duration(&self, week_start: Timestamp) -> Duration {
        self.filtered_closed_segments_duration(Some(week_start), None)
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn set_category(&mut self, category: Category) {
        self.category = category;
    }
}
