// SPDX-License-Identifier: Apache-2.0

//! Derived aggregate view over the sanitized record set. Computed fresh on
//! every run; exists only as input to chart and table rendering.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use joblens_model::JobRecord;

use crate::classify::ErrorPatternTable;

/// Monday-first weekday labels, the order every weekday axis uses.
pub const DAY_LABELS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

const MESSAGE_KEY_LEN: usize = 100;
const MESSAGE_EXAMPLE_LEN: usize = 4000;

/// One distinct normalized error message within a tool, with an example of
/// the full diagnostic text it was extracted from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageGroup {
    pub key: String,
    pub count: u64,
    pub example: String,
}

/// Per-tool detail backing one tool page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolDetail {
    pub total: u64,
    pub exit_codes: BTreeMap<String, u64>,
    pub destinations: BTreeMap<String, u64>,
    pub affected_users: u64,
    /// Distinct messages, most frequent first.
    pub messages: Vec<MessageGroup>,
}

#[derive(Debug, Clone, Default)]
pub struct AggregateView {
    pub total: u64,
    pub date_min: Option<NaiveDate>,
    pub date_max: Option<NaiveDate>,
    pub tool_counts: BTreeMap<String, u64>,
    pub exit_code_counts: BTreeMap<String, u64>,
    pub destination_counts: BTreeMap<String, u64>,
    pub daily_counts: BTreeMap<NaiveDate, u64>,
    pub dow_counts: [u64; 7],
    pub hour_dow: [[u64; 24]; 7],
    pub user_counts: BTreeMap<String, u64>,
    pub anonymous: u64,
    /// (category label, count), most frequent first, empty categories kept.
    pub pattern_counts: Vec<(String, u64)>,
    pub spike_days: Vec<(NaiveDate, u64)>,
    pub exit_zero_count: u64,
    pub exit_zero_tools: Vec<(String, u64)>,
    pub tools: BTreeMap<String, ToolDetail>,
}

impl AggregateView {
    #[must_use]
    pub fn distinct_tools(&self) -> usize {
        self.tool_counts.len()
    }

    #[must_use]
    pub fn distinct_users(&self) -> usize {
        self.user_counts.len()
    }

    #[must_use]
    pub fn peak_day(&self) -> u64 {
        self.daily_counts.values().copied().max().unwrap_or(0)
    }

    /// Tools by descending count, name-ordered within ties.
    #[must_use]
    pub fn tools_by_count(&self) -> Vec<(&str, u64)> {
        sorted_desc(&self.tool_counts)
    }

    #[must_use]
    pub fn users_by_count(&self) -> Vec<(&str, u64)> {
        sorted_desc(&self.user_counts)
    }

    #[must_use]
    pub fn exit_codes_by_count(&self) -> Vec<(&str, u64)> {
        sorted_desc(&self.exit_code_counts)
    }

    #[must_use]
    pub fn destinations_by_count(&self) -> Vec<(&str, u64)> {
        sorted_desc(&self.destination_counts)
    }
}

fn sorted_desc(map: &BTreeMap<String, u64>) -> Vec<(&str, u64)> {
    let mut rows: Vec<(&str, u64)> = map.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    rows
}

/// Timestamps carry fractional seconds and no timezone.
fn parse_create_time(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok()
}

/// First meaningful line of a diagnostic text, used to group equivalent
/// failures: skips blanks, separator rows, backslash-bearing lines, and
/// fragments too short to identify anything.
#[must_use]
pub fn normalize_message(stderr: &str) -> Option<String> {
    for line in stderr.trim().lines() {
        let line = line.trim();
        if line.is_empty()
            || line.contains("====")
            || line.contains("____")
            || line.contains('\\')
            || line.len() <= 5
        {
            continue;
        }
        return Some(line.chars().take(MESSAGE_KEY_LEN).collect());
    }
    None
}

pub fn aggregate_records(records: &[JobRecord], patterns: &ErrorPatternTable) -> AggregateView {
    let mut view = AggregateView {
        total: records.len() as u64,
        ..AggregateView::default()
    };

    let mut pattern_counts: BTreeMap<&str, u64> = BTreeMap::new();
    for label in patterns.labels() {
        pattern_counts.insert(label, 0);
    }
    let mut exit_zero_tools: BTreeMap<String, u64> = BTreeMap::new();
    let mut tool_messages: BTreeMap<String, Vec<MessageGroup>> = BTreeMap::new();
    let mut tool_users: BTreeMap<String, std::collections::BTreeSet<String>> = BTreeMap::new();

    for record in records {
        let tool = record.tool_name();
        *view.tool_counts.entry(tool.clone()).or_default() += 1;

        let exit_key = record
            .exit_code
            .map_or_else(|| "None".to_string(), |code| code.to_string());
        *view.exit_code_counts.entry(exit_key.clone()).or_default() += 1;

        let destination = record
            .destination_id
            .clone()
            .unwrap_or_else(|| "None".to_string());
        *view.destination_counts.entry(destination.clone()).or_default() += 1;

        if let Some(ts) = parse_create_time(&record.create_time) {
            let date = ts.date();
            *view.daily_counts.entry(date).or_default() += 1;
            let dow = date.weekday().num_days_from_monday() as usize;
            view.dow_counts[dow] += 1;
            view.hour_dow[dow][ts.hour() as usize] += 1;
        }

        match record.user_key() {
            Some(user) => {
                *view.user_counts.entry(user.clone()).or_default() += 1;
                tool_users.entry(tool.clone()).or_default().insert(user);
            }
            None => view.anonymous += 1,
        }

        if let Some(stderr) = record.tool_stderr.as_deref() {
            for label in patterns.matches(stderr) {
                *pattern_counts.entry(label).or_default() += 1;
            }
        }

        if record.is_exit_zero_anomaly() {
            view.exit_zero_count += 1;
            *exit_zero_tools.entry(tool.clone()).or_default() += 1;
        }

        let detail = view.tools.entry(tool.clone()).or_default();
        detail.total += 1;
        *detail.exit_codes.entry(exit_key).or_default() += 1;
        *detail.destinations.entry(destination).or_default() += 1;

        if let Some(stderr) = record.tool_stderr.as_deref() {
            if let Some(key) = normalize_message(stderr) {
                let groups = tool_messages.entry(tool).or_default();
                match groups.iter_mut().find(|g| g.key == key) {
                    Some(group) => group.count += 1,
                    None => groups.push(MessageGroup {
                        key,
                        count: 1,
                        example: stderr.trim().chars().take(MESSAGE_EXAMPLE_LEN).collect(),
                    }),
                }
            }
        }
    }

    for (tool, mut groups) in tool_messages {
        groups.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
        if let Some(detail) = view.tools.get_mut(&tool) {
            detail.messages = groups;
        }
    }
    for (tool, users) in tool_users {
        if let Some(detail) = view.tools.get_mut(&tool) {
            detail.affected_users = users.len() as u64;
        }
    }

    view.date_min = view.daily_counts.keys().next().copied();
    view.date_max = view.daily_counts.keys().next_back().copied();
    view.spike_days = spike_days(&view.daily_counts);

    let mut patterns_sorted: Vec<(String, u64)> = pattern_counts
        .into_iter()
        .map(|(label, count)| (label.to_string(), count))
        .collect();
    patterns_sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    view.pattern_counts = patterns_sorted;

    let mut zero_tools: Vec<(String, u64)> = exit_zero_tools.into_iter().collect();
    zero_tools.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    zero_tools.truncate(5);
    view.exit_zero_tools = zero_tools;

    view
}

/// Days whose count exceeds mean + 2 standard deviations of the daily series.
fn spike_days(daily: &BTreeMap<NaiveDate, u64>) -> Vec<(NaiveDate, u64)> {
    if daily.len() < 2 {
        return Vec::new();
    }
    let n = daily.len() as f64;
    let mean = daily.values().map(|&c| c as f64).sum::<f64>() / n;
    let variance = daily
        .values()
        .map(|&c| {
            let d = c as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / (n - 1.0);
    let threshold = mean + 2.0 * variance.sqrt();
    daily
        .iter()
        .filter(|(_, &count)| count as f64 > threshold)
        .map(|(&date, &count)| (date, count))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{ErrorPatternTable, PatternSpec, DEFAULT_ERROR_PATTERNS};
    use serde_json::json;

    fn table() -> ErrorPatternTable {
        let specs: Vec<PatternSpec> = DEFAULT_ERROR_PATTERNS
            .iter()
            .map(|(label, pattern)| PatternSpec::new(*label, *pattern))
            .collect();
        ErrorPatternTable::compile(&specs).expect("table")
    }

    fn record(id: i64, tool_id: &str, extra: serde_json::Value) -> JobRecord {
        let mut value = json!({
            "id": id,
            "tool_id": tool_id,
            "create_time": "2031-03-14T09:26:53.589793",
            "state": "error"
        });
        value
            .as_object_mut()
            .expect("object")
            .extend(extra.as_object().expect("extra").clone());
        serde_json::from_value(value).expect("record")
    }

    #[test]
    fn tool_counts_group_by_short_name() {
        let records = vec![
            record(1, "T1", json!({})),
            record(2, "T1", json!({})),
            record(3, "T2", json!({})),
        ];
        let view = aggregate_records(&records, &table());
        assert_eq!(view.total, 3);
        assert_eq!(view.tool_counts.get("T1"), Some(&2));
        assert_eq!(view.tool_counts.get("T2"), Some(&1));
        assert_eq!(view.tools_by_count()[0], ("T1", 2));
    }

    #[test]
    fn exit_zero_anomaly_is_flagged_and_still_counted() {
        let records = vec![
            record(1, "T1", json!({"exit_code": 0})),
            record(2, "T1", json!({"exit_code": 1})),
        ];
        let view = aggregate_records(&records, &table());
        assert_eq!(view.exit_zero_count, 1);
        assert_eq!(view.exit_zero_tools, vec![("T1".to_string(), 1)]);
        // Anomalous records stay in every standard aggregate.
        assert_eq!(view.total, 2);
        assert_eq!(view.tool_counts.get("T1"), Some(&2));
        assert_eq!(view.exit_code_counts.get("0"), Some(&1));
    }

    #[test]
    fn null_exit_code_and_destination_key_as_none() {
        let records = vec![record(1, "T1", json!({}))];
        let view = aggregate_records(&records, &table());
        assert_eq!(view.exit_code_counts.get("None"), Some(&1));
        assert_eq!(view.destination_counts.get("None"), Some(&1));
    }

    #[test]
    fn temporal_counts_decompose_create_time() {
        // 2031-03-14 is a Friday.
        let records = vec![record(1, "T1", json!({}))];
        let view = aggregate_records(&records, &table());
        let date = NaiveDate::from_ymd_opt(2031, 3, 14).expect("date");
        assert_eq!(view.daily_counts.get(&date), Some(&1));
        assert_eq!(view.dow_counts[4], 1);
        assert_eq!(view.hour_dow[4][9], 1);
        assert_eq!(view.date_min, Some(date));
        assert_eq!(view.date_max, Some(date));
    }

    #[test]
    fn pattern_counts_cover_all_categories_and_sort_by_count() {
        let records = vec![
            record(1, "T1", json!({"tool_stderr": "Killed"})),
            record(2, "T1", json!({"tool_stderr": "Killed by signal 9"})),
            record(3, "T1", json!({"tool_stderr": "Permission denied"})),
        ];
        let view = aggregate_records(&records, &table());
        assert_eq!(view.pattern_counts.len(), DEFAULT_ERROR_PATTERNS.len());
        assert_eq!(view.pattern_counts[0], ("Process Killed".to_string(), 2));
        assert_eq!(view.pattern_counts[1], ("Permission".to_string(), 1));
    }

    #[test]
    fn messages_group_by_first_meaningful_line_with_example() {
        let stderr_a = "==== job output ====\nOut of memory: killed\ndetails follow";
        let stderr_b = "Out of memory: killed";
        let records = vec![
            record(1, "T1", json!({"tool_stderr": stderr_a})),
            record(2, "T1", json!({"tool_stderr": stderr_b})),
        ];
        let view = aggregate_records(&records, &table());
        let detail = view.tools.get("T1").expect("tool detail");
        assert_eq!(detail.messages.len(), 1);
        assert_eq!(detail.messages[0].key, "Out of memory: killed");
        assert_eq!(detail.messages[0].count, 2);
        assert!(detail.messages[0].example.contains("details follow"));
    }

    #[test]
    fn normalize_message_skips_separators_and_short_lines() {
        assert_eq!(normalize_message("====\n__\nok\nreal failure line"), Some("real failure line".to_string()));
        assert_eq!(normalize_message("C:\\path\\only"), None);
        assert_eq!(normalize_message(""), None);
    }

    #[test]
    fn anonymous_records_are_counted_separately_from_users() {
        let records = vec![
            record(1, "T1", json!({"user_id": "aabbccdd00112233"})),
            record(2, "T1", json!({"user_id": "aabbccdd00112233"})),
            record(3, "T1", json!({})),
        ];
        let view = aggregate_records(&records, &table());
        assert_eq!(view.distinct_users(), 1);
        assert_eq!(view.anonymous, 1);
        assert_eq!(view.users_by_count()[0].1, 2);
        assert_eq!(view.tools.get("T1").expect("detail").affected_users, 1);
    }

    #[test]
    fn spike_days_use_two_sigma_threshold() {
        let mut daily = BTreeMap::new();
        for day in 1..=10 {
            daily.insert(NaiveDate::from_ymd_opt(2031, 1, day).expect("date"), 10);
        }
        daily.insert(NaiveDate::from_ymd_opt(2031, 1, 11).expect("date"), 500);
        let spikes = spike_days(&daily);
        assert_eq!(spikes.len(), 1);
        assert_eq!(spikes[0].1, 500);
    }
}
