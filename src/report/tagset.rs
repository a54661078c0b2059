use std::collections::BTreeMap;

use chrono::Duration;

use crate::models::{Task, Timestamp};

/// Key used for tasks whose tag list is empty
pub const NO_TAGS: &str = "(no tags)";

/// Tasks sharing one tag combination and their summed time
#[derive(Debug, Clone)]
pub struct TagsetSummary<'a> {
    pub tagset: String,
    pub tasks: Vec<&'a Task>,
    pub duration: Duration,
}

/// Build the grouping key for a tag list
///
/// Tags are sorted and joined with `", "`. Duplicates are kept, so
/// `["a", "a"]` and `["a"]` are different groups.
pub fn tagset_key(tags: &[String]) -> String {
    let mut sorted = tags.to_vec();
    sorted.sort();

    let key = sorted.join(", ");
    if key.is_empty() {
        NO_TAGS.to_string()
    } else {
        key
    }
}

/// Group tasks by tagset and sum their closed time inside `(start, finish]`
///
/// With a bound present, tasks without a segment in range are skipped. With
/// no bounds every task is included, even one with no closed time. Groups
/// are ordered by total duration, largest first; equal totals fall back to
/// the tagset key.
pub fn group_by_tagset<'a, I>(
    tasks: I,
    start: Option<Timestamp>,
    finish: Option<Timestamp>,
) -> Vec<TagsetSummary<'a>>
where
    I: IntoIterator<Item = &'a Task>,
{
    let filtered = start.is_some() || finish.is_some();
    let mut groups: BTreeMap<String, TagsetSummary<'a>> = BTreeMap::new();

    for task in tasks {
        if filtered && !task.has_segments_in_range(start, finish) {
            continue;
        }

        let key = tagset_key(&task.tags);
        let group = groups.entry(key.clone()).or_insert_with(|| TagsetSummary {
            tagset: key,
            tasks: Vec::new(),
            duration: Duration::zero(),
        });

        group.tasks.push(task);
        group.duration = group.duration + task.filtered_closed_segments_duration(start, finish);
    }

    let mut summaries: Vec<TagsetSummary<'a>> = groups.into_values().collect();
    summaries.sort_by(|a, b| b.duration.cmp(&a.duration));
    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use chrono::{TimeZone, Utc};

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn at(h: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2024, 1, 15, h, 0, 0).unwrap()
    }

    fn task_with(name: &str, tag_list: &[&str], hours: &[(u32, u32)]) -> Task {
        let mut task = Task::new(name, "", tags(tag_list), Category::Work);
        for (from, to) in hours {
            task.add_closed_segment(at(*from), at(*to), "");
        }
        task
    }

    #[test]
    fn test_tagset_key_sorts() {
        assert_eq!(tagset_key(&tags(&["b", "a"])), "a, b");
        assert_eq!(tagset_key(&tags(&["a", "b"])), tagset_key(&tags(&["b", "a"])));
    }

    #[test]
    fn test_tagset_key_empty() {
        assert_eq!(tagset_key(&[]), NO_TAGS);
        assert_eq!(tagset_key(&Vec::new()), "(no tags)");
    }

    #[test]
    fn test_tagset_key_keeps_duplicates() {
        assert_eq!(tagset_key(&tags(&["a", "a"])), "a, a");
        assert_ne!(tagset_key(&tags(&["a", "a"])), tagset_key(&tags(&["a"])));
    }

    #[test]
    fn test_single_task_group() {
        let tasks = vec![task_with("t", &["b", "a"], &[(10, 12)])];
        let summary = group_by_tagset(&tasks, None, None);

        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].tagset, "a, b");
        assert_eq!(summary[0].duration, Duration::hours(2));
    }

    #[test]
    fn test_tasks_with_same_tags_share_group() {
        let tasks = vec![
            task_with("one", &["work"], &[(11, 13)]),
            task_with("two", &["work"], &[(16, 17)]),
        ];
        let summary = group_by_tagset(&tasks, None, None);

        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].duration, Duration::hours(3));
        let names: Vec<&str> = summary[0].tasks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["one", "two"]);
    }

    #[test]
    fn test_groups_sorted_by_duration_desc() {
        let tasks = vec![
            task_with("small", &["x"], &[(9, 10)]),
            task_with("big", &["y"], &[(9, 14)]),
            task_with("mid", &[], &[(9, 12)]),
        ];
        let summary = group_by_tagset(&tasks, None, None);
        let keys: Vec<&str> = summary.iter().map(|s| s.tagset.as_str()).collect();
        assert_eq!(keys, vec!["y", NO_TAGS, "x"]);
    }

    #[test]
    fn test_unfiltered_includes_tasks_without_time() {
        let tasks = vec![task_with("idle", &["idle"], &[])];
        let summary = group_by_tagset(&tasks, None, None);
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].duration, Duration::zero());
        assert_eq!(summary[0].tasks.len(), 1);
    }

    #[test]
    fn test_filter_skips_tasks_outside_range() {
        let tasks = vec![
            task_with("early", &["a"], &[(8, 9)]),
            task_with("late", &["b"], &[(12, 14)]),
            task_with("idle", &["c"], &[]),
        ];
        let summary = group_by_tagset(&tasks, Some(at(10)), None);
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].tagset, "b");
        assert_eq!(summary[0].duration, Duration::hours(2));
    }

    #[test]
    fn test_filter_sums_only_segments_in_range() {
        let tasks = vec![task_with("mixed", &["a"], &[(8, 9), (12, 14)])];
        let summary = group_by_tagset(&tasks, None, Some(at(10)));
        assert_eq!(summary[0].duration, Duration::hours(1));
    }
}
