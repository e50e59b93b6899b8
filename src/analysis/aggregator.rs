//! Event aggregation.
//!
//! This module folds decoded log events into running counters, session sets
//! and per-day buckets. Each file is scanned into its own partial state which
//! is then merged into the run total, so a file that fails halfway leaves no
//! trace in the result.

use super::classifier::classify;
use super::decoder::decode_line;
use super::resolver::ActorResolver;
use crate::models::{Category, Event};
use crate::scanner::LogFile;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use tracing::{debug, trace, warn};

/// Per-tool invocation counts that remember first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolCounts {
    entries: Vec<(String, u64)>,
    index: HashMap<String, usize>,
}

impl ToolCounts {
    /// Add `count` invocations of `name`.
    pub fn add(&mut self, name: &str, count: u64) {
        match self.index.get(name) {
            Some(&i) => self.entries[i].1 += count,
            None => {
                self.index.insert(name.to_string(), self.entries.len());
                self.entries.push((name.to_string(), count));
            }
        }
    }

    /// Iterate in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(name, count)| (name.as_str(), *count))
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    /// Number of distinct tool names.
    pub fn distinct(&self) -> usize {
        self.entries.len()
    }
}

/// Activity attributed to one actor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActorActivity {
    pub sessions: HashSet<String>,
    pub tools: u64,
    pub messages: u64,
}

impl ActorActivity {
    /// An actor is active once it has a tool call or a message.
    pub fn is_active(&self) -> bool {
        self.tools > 0 || self.messages > 0
    }
}

/// Activity on one calendar day.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayBucket {
    pub sessions: HashSet<String>,
    pub tools: u64,
    pub messages: u64,
}

/// Running totals for a run, or for a single file before merging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateState {
    /// Invocations per tool name.
    pub tool_counts: ToolCounts,
    /// Distinct session ids.
    pub session_ids: HashSet<String>,
    /// Invocations per category.
    pub categories: BTreeMap<Category, u64>,
    /// Activity per resolved actor.
    pub actors: BTreeMap<String, ActorActivity>,
    /// Activity per day key.
    pub days: BTreeMap<String, DayBucket>,
    pub skill_calls: u64,
    pub subagent_calls: u64,
    pub mcp_calls: u64,
    /// User-typed plain-text messages.
    pub messages: u64,
    pub files_scanned: usize,
    pub files_skipped: usize,
    pub lines_skipped: u64,
}

impl AggregateState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event into the totals. `actor` is `None` for unattributed
    /// files.
    pub fn record(&mut self, event: &Event, actor: Option<&str>) {
        let day = event.day_key();

        if let Some(sid) = event.session_id() {
            self.session_ids.insert(sid.to_string());
            if let Some(day) = day {
                self.day_mut(day).sessions.insert(sid.to_string());
            }
            if let Some(actor) = actor {
                self.actor_mut(actor).sessions.insert(sid.to_string());
            }
        }

        if event.is_user_text() {
            self.messages += 1;
            if let Some(day) = day {
                self.day_mut(day).messages += 1;
            }
            if let Some(actor) = actor {
                self.actor_mut(actor).messages += 1;
            }
        }

        for name in event.tool_names() {
            self.tool_counts.add(name, 1);
            if let Some(day) = day {
                self.day_mut(day).tools += 1;
            }
            if let Some(actor) = actor {
                self.actor_mut(actor).tools += 1;
            }

            let category = classify(name);
            *self.categories.entry(category).or_insert(0) += 1;
            match category {
                Category::Mcp => self.mcp_calls += 1,
                Category::Subagent => self.subagent_calls += 1,
                Category::Skill => self.skill_calls += 1,
                _ => {}
            }
        }
    }

    /// Read a log file line by line and fold every decodable line.
    ///
    /// Lines are read as raw bytes so an invalid UTF-8 line is skipped
    /// without abandoning the rest of the file.
    pub fn scan_file(&mut self, path: &Path, actor: Option<&str>) -> io::Result<()> {
        let mut reader = BufReader::new(File::open(path)?);
        let mut line = Vec::new();
        let mut line_no = 0u64;

        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line)? == 0 {
                break;
            }
            line_no += 1;

            match decode_line(&line) {
                Some(event) => self.record(&event, actor),
                None => {
                    trace!("Skipping undecodable line {} in {}", line_no, path.display());
                    self.lines_skipped += 1;
                }
            }
        }

        self.files_scanned += 1;
        Ok(())
    }

    /// Fold another partial state into this one.
    ///
    /// Tool names already present keep their position; new names are
    /// appended in the other state's order.
    pub fn merge(&mut self, other: AggregateState) {
        for (name, count) in other.tool_counts.iter() {
            self.tool_counts.add(name, count);
        }
        self.session_ids.extend(other.session_ids);

        for (category, count) in other.categories {
            *self.categories.entry(category).or_insert(0) += count;
        }
        for (name, activity) in other.actors {
            let entry = self.actors.entry(name).or_default();
            entry.sessions.extend(activity.sessions);
            entry.tools += activity.tools;
            entry.messages += activity.messages;
        }
        for (day, bucket) in other.days {
            let entry = self.days.entry(day).or_default();
            entry.sessions.extend(bucket.sessions);
            entry.tools += bucket.tools;
            entry.messages += bucket.messages;
        }

        self.skill_calls += other.skill_calls;
        self.subagent_calls += other.subagent_calls;
        self.mcp_calls += other.mcp_calls;
        self.messages += other.messages;
        self.files_scanned += other.files_scanned;
        self.files_skipped += other.files_skipped;
        self.lines_skipped += other.lines_skipped;
    }

    fn day_mut(&mut self, day: &str) -> &mut DayBucket {
        self.days.entry(day.to_string()).or_default()
    }

    fn actor_mut(&mut self, actor: &str) -> &mut ActorActivity {
        self.actors.entry(actor.to_string()).or_default()
    }
}

/// Drives a full run over the discovered log files.
pub struct Aggregator {
    resolver: ActorResolver,
    show_progress: bool,
}

impl Aggregator {
    pub fn new(resolver: ActorResolver, show_progress: bool) -> Self {
        Self {
            resolver,
            show_progress,
        }
    }

    pub fn resolver(&self) -> &ActorResolver {
        &self.resolver
    }

    /// Scan every file and return the merged totals. Unreadable files are
    /// logged and skipped.
    pub fn run(&self, files: &[LogFile]) -> AggregateState {
        let mut state = AggregateState::new();
        let progress = self.progress_bar(files.len());

        for file in files {
            let actor = self.resolver.resolve(&file.dir_name);
            let mut partial = AggregateState::new();

            match partial.scan_file(&file.path, actor) {
                Ok(()) => {
                    debug!(
                        "Scanned {} ({}, {} lines skipped)",
                        file.path.display(),
                        actor.unwrap_or("unattributed"),
                        partial.lines_skipped
                    );
                    state.merge(partial);
                }
                Err(e) => {
                    warn!("Skipping unreadable log {}: {}", file.path.display(), e);
                    state.files_skipped += 1;
                }
            }

            if let Some(ref pb) = progress {
                pb.inc(1);
            }
        }

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        state
    }

    fn progress_bar(&self, len: usize) -> Option<ProgressBar> {
        if !self.show_progress || len == 0 {
            return None;
        }

        let pb = ProgressBar::new(len as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} logs")
            .map(|s| s.progress_chars("#>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        Some(pb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn event(json: &str) -> Event {
        serde_json::from_str(json).unwrap()
    }

    fn tool_event(sid: &str, ts: &str, names: &[&str]) -> Event {
        let blocks: Vec<String> = names
            .iter()
            .map(|n| format!(r#"{{"type":"tool_use","name":"{}"}}"#, n))
            .collect();
        event(&format!(
            r#"{{"sessionId":"{}","timestamp":"{}","message":{{"role":"assistant","content":[{}]}}}}"#,
            sid,
            ts,
            blocks.join(",")
        ))
    }

    fn user_event(sid: &str, ts: &str) -> Event {
        event(&format!(
            r#"{{"sessionId":"{}","timestamp":"{}","message":{{"role":"user","content":"hello"}}}}"#,
            sid, ts
        ))
    }

    fn write_log(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
        fs::create_dir_all(dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, lines.join("\n")).unwrap();
        path
    }

    #[test]
    fn test_record_user_message() {
        let mut state = AggregateState::new();
        state.record(&user_event("s1", "2025-03-01T09:00:00Z"), Some("ソウ"));

        assert_eq!(state.messages, 1);
        assert_eq!(state.days["2025-03-01"].messages, 1);
        assert_eq!(state.actors["ソウ"].messages, 1);
        assert!(state.actors["ソウ"].is_active());
        assert_eq!(state.tool_counts.distinct(), 0);
    }

    #[test]
    fn test_record_tools_and_categories() {
        let mut state = AggregateState::new();
        state.record(
            &tool_event("s1", "2025-03-01T09:00:00Z", &["Bash", "UnknownTool", "mcp__a__b", "Task", "Skill"]),
            None,
        );

        assert_eq!(state.tool_counts.total(), 5);
        assert_eq!(state.categories[&Category::Bash], 1);
        assert_eq!(state.categories[&Category::Other], 1);
        assert_eq!(state.categories[&Category::Mcp], 1);
        assert_eq!(state.mcp_calls, 1);
        assert_eq!(state.subagent_calls, 1);
        assert_eq!(state.skill_calls, 1);
        assert!(!state.categories.contains_key(&Category::Web));
        assert_eq!(state.days["2025-03-01"].tools, 5);
        assert!(state.actors.is_empty());
    }

    #[test]
    fn test_daily_sessions_are_sets() {
        let mut state = AggregateState::new();
        state.record(&user_event("a", "2025-03-01T09:00:00Z"), None);
        state.record(&user_event("b", "2025-03-01T10:00:00Z"), None);
        state.record(&user_event("b", "2025-03-01T11:00:00Z"), None);
        state.record(&user_event("b", "2025-03-02T11:00:00Z"), None);

        assert_eq!(state.days["2025-03-01"].sessions.len(), 2);
        assert_eq!(state.days["2025-03-02"].sessions.len(), 1);
        assert_eq!(state.session_ids.len(), 2);
    }

    #[test]
    fn test_missing_fields_contribute_nothing() {
        let mut state = AggregateState::new();
        state.record(&event("{}"), Some("ソウ"));
        state.record(&event(r#"{"timestamp":"2025"}"#), Some("ソウ"));
        state.record(&event(r#"{"message":{"content":"no role"}}"#), Some("ソウ"));
        state.record(&event(r#"{"message":{"role":"user"}}"#), Some("ソウ"));

        assert_eq!(state.messages, 0);
        assert!(state.session_ids.is_empty());
        assert!(state.days.is_empty());
        assert!(state.actors.is_empty());
    }

    #[test]
    fn test_short_timestamp_counts_globally_only() {
        let mut state = AggregateState::new();
        state.record(&tool_event("s1", "bad", &["Read"]), None);

        assert_eq!(state.tool_counts.iter().collect::<Vec<_>>(), vec![("Read", 1)]);
        assert_eq!(state.session_ids.len(), 1);
        assert!(state.days.is_empty());
    }

    #[test]
    fn test_tool_counts_keep_first_seen_order() {
        let mut counts = ToolCounts::default();
        counts.add("Read", 1);
        counts.add("Bash", 1);
        counts.add("Read", 2);

        let order: Vec<_> = counts.iter().collect();
        assert_eq!(order, vec![("Read", 3), ("Bash", 1)]);
        assert_eq!(counts.distinct(), 2);
        assert_eq!(counts.total(), 4);
    }

    #[test]
    fn test_merge_sums_and_unions() {
        let mut a = AggregateState::new();
        a.record(&tool_event("s1", "2025-03-01T00:00:00Z", &["Read"]), Some("リン"));
        let mut b = AggregateState::new();
        b.record(&tool_event("s1", "2025-03-01T00:00:00Z", &["Read", "Bash"]), Some("リン"));
        b.record(&user_event("s2", "2025-03-02T00:00:00Z"), None);

        a.merge(b);

        assert_eq!(a.tool_counts.iter().collect::<Vec<_>>(), vec![("Read", 2), ("Bash", 1)]);
        assert_eq!(a.session_ids.len(), 2);
        assert_eq!(a.days["2025-03-01"].sessions.len(), 1);
        assert_eq!(a.days["2025-03-01"].tools, 3);
        assert_eq!(a.actors["リン"].tools, 3);
        assert_eq!(a.actors["リン"].sessions.len(), 1);
        assert_eq!(a.messages, 1);
        assert_eq!(a.categories[&Category::FileOps], 2);
    }

    #[test]
    fn test_scan_file_skips_malformed_lines() {
        let temp = TempDir::new().unwrap();
        let path = write_log(
            temp.path(),
            "log.jsonl",
            &[
                r#"{"sessionId":"s1","timestamp":"2025-03-01T00:00:00Z","message":{"role":"user","content":"hi"}}"#,
                "{broken",
                "",
                r#"{"sessionId":"s1","message":{"content":[{"type":"tool_use","name":"Bash"}]}}"#,
            ],
        );

        let mut state = AggregateState::new();
        state.scan_file(&path, Some("ユキ")).unwrap();

        assert_eq!(state.messages, 1);
        assert_eq!(state.tool_counts.iter().collect::<Vec<_>>(), vec![("Bash", 1)]);
        assert_eq!(state.lines_skipped, 2);
        assert_eq!(state.files_scanned, 1);
        assert_eq!(state.actors["ユキ"].tools, 1);
    }

    #[test]
    fn test_scan_file_survives_invalid_utf8_line() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("log.jsonl");
        let mut bytes = b"{\"sessionId\":\"\xff\"}\n".to_vec();
        bytes.extend_from_slice(b"{\"sessionId\":\"ok\"}\n");
        fs::write(&path, bytes).unwrap();

        let mut state = AggregateState::new();
        state.scan_file(&path, None).unwrap();

        assert_eq!(state.lines_skipped, 1);
        assert!(state.session_ids.contains("ok"));
    }

    #[test]
    fn test_run_skips_missing_files() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("-home-my-ai-team-web-team");
        let good = write_log(
            &dir,
            "a.jsonl",
            &[r#"{"sessionId":"s1","message":{"role":"user","content":"hi"}}"#],
        );

        let files = vec![
            LogFile {
                path: dir.join("gone.jsonl"),
                dir_name: "-home-my-ai-team-web-team".to_string(),
                size: 0,
            },
            LogFile {
                path: good,
                dir_name: "-home-my-ai-team-web-team".to_string(),
                size: 0,
            },
        ];

        let aggregator = Aggregator::new(ActorResolver::new(Config::default().actors), false);
        let state = aggregator.run(&files);

        assert_eq!(state.files_skipped, 1);
        assert_eq!(state.files_scanned, 1);
        assert_eq!(state.messages, 1);
        assert_eq!(state.actors["ソウ"].messages, 1);
        assert!(!state.actors.contains_key("ナギ"));
    }
}
