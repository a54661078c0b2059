use chrono::{DateTime, Duration, Utc};

/// Point in time used throughout the model
pub type Timestamp = DateTime<Utc>;

/// One span of work on a task
///
/// `finish` is `None` while the segment is still open. A segment is closed
/// exactly once and never reopened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub create: Timestamp,
    pub finish: Option<Timestamp>,
    pub note: String,
}

impl Segment {
    /// Create an open segment starting at `create`
    pub fn open(create: Timestamp, note: impl Into<String>) -> Self {
        Self {
            create,
            finish: None,
            note: note.into(),
        }
    }

    /// Create a segment that is already closed
    pub fn closed(create: Timestamp, finish: Timestamp, note: impl Into<String>) -> Self {
        Self {
            create,
            finish: Some(finish),
            note: note.into(),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.finish.is_some()
    }

    /// Check whether a closed segment finished inside `(start, finish]`
    ///
    /// Open segments are never in range. The lower bound is exclusive and the
    /// upper bound inclusive, so contiguous windows `[a, b)`, `[b, c)` assign a
    /// segment finishing exactly at `b` to the earlier window only.
    pub fn is_in_range(&self, start: Option<Timestamp>, finish: Option<Timestamp>) -> bool {
        let Some(end) = self.finish else {
            return false;
        };

        if let Some(start) = start {
            if end <= start {
                return false;
            }
        }

        if let Some(finish) = finish {
            if end > finish {
                return false;
            }
        }

        true
    }

    /// Length of a closed segment, `None` while open
    pub fn duration(&self) -> Option<Duration> {
        self.finish.map(|end| end - self.create)
    }

    /// Elapsed time of an open segment measured against `now`
    pub fn elapsed(&self, now: Timestamp) -> Duration {
        match self.finish {
            Some(end) => end - self.create,
            None => now - self.create,
        }
    }

    /// Timestamp that represents the latest activity on this segment
    pub fn activity(&self) -> Timestamp {
        self.finish.unwrap_or(self.create)
    }
}
