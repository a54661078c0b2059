use chrono::{DateTime, Datelike, Local, TimeZone, Utc};

use crate::models::Task;
use crate::report::tagset::{group_by_tagset, TagsetSummary};
use crate::utils::date::{shift_days, start_of_day};

/// Tagset groups for one week bucket
#[derive(Debug, Clone)]
pub struct WeeklySummary<'a, Tz: TimeZone = Utc> {
    pub week_start: DateTime<Tz>,
    pub tagsets: Vec<TagsetSummary<'a>>,
}

/// Monday 00:00 of the week containing `t`, in `t`'s own zone
pub fn week_start<Tz: TimeZone>(t: &DateTime<Tz>) -> DateTime<Tz> {
    let days_back = i64::from(t.weekday().num_days_from_monday());
    let monday = t.date_naive() - chrono::Duration::days(days_back);
    start_of_day(&t.timezone(), monday)
}

/// Start of the current local week
pub fn current_week_start() -> DateTime<Local> {
    week_start(&Local::now())
}

/// End of the bucket beginning at `week_start`
pub fn week_end<Tz: TimeZone>(week_start: &DateTime<Tz>) -> DateTime<Tz> {
    shift_days(week_start, 7)
}

/// Every week start from the week of `earliest` through the week of `latest`
///
/// Ascending; a single entry when both fall in the same week, empty when
/// `earliest` is after `latest`.
pub fn week_starts<Tz: TimeZone>(earliest: &DateTime<Tz>, latest: &DateTime<Tz>) -> Vec<DateTime<Tz>> {
    let last = week_start(latest);
    let mut current = week_start(earliest);
    let mut starts = Vec::new();

    while current <= last {
        let next = week_end(&current);
        starts.push(current);
        current = next;
    }

    starts
}

/// Group tasks by tagset for each week bucket
///
/// Each bucket uses the same `(week_start, week_end]` window rule as segment
/// filtering. Weeks without any matching segment are left out.
pub fn weekly_summary<'a, I, Tz>(tasks: I, week_starts: &[DateTime<Tz>]) -> Vec<WeeklySummary<'a, Tz>>
where
    I: IntoIterator<Item = &'a Task>,
    Tz: TimeZone,
{
    let tasks: Vec<&'a Task> = tasks.into_iter().collect();

    week_starts
        .iter()
        .filter_map(|start| {
            let end = week_end(start);
            let tagsets = group_by_tagset(
                tasks.iter().copied(),
                Some(start.with_timezone(&Utc)),
                Some(end.with_timezone(&Utc)),
            );

            if tagsets.is_empty() {
                None
            } else {
                Some(WeeklySummary {
                    week_start: start.clone(),
                    tagsets,
                })
            }
        })
        .collect()
}
