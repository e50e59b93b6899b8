//! Data models for the metrics aggregator.
//!
//! This module contains the records decoded from session logs, the tool
//! categories, and the report document produced at the end of a run.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Prefix that marks a tool as a remote MCP server call.
pub const MCP_PREFIX: &str = "mcp__";

/// Number of leading timestamp characters that form a day key (`YYYY-MM-DD`).
pub const DAY_KEY_LEN: usize = 10;

/// A single decoded session log record.
///
/// Every field is optional. A field holding an unexpected JSON type decodes
/// as `None` instead of failing the whole record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Event {
    /// Opaque session identifier.
    #[serde(deserialize_with = "lenient")]
    pub session_id: Option<String>,
    /// ISO-8601 timestamp of the record.
    #[serde(deserialize_with = "lenient")]
    pub timestamp: Option<String>,
    /// The conversation message carried by the record.
    #[serde(deserialize_with = "lenient")]
    pub message: Option<EventMessage>,
}

/// The `message` object of a log record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EventMessage {
    /// Author role, e.g. `user` or `assistant`.
    #[serde(deserialize_with = "lenient")]
    pub role: Option<String>,
    /// Message body.
    #[serde(deserialize_with = "lenient")]
    pub content: Option<MessageContent>,
}

/// Message body: either plain text or an ordered list of typed blocks.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

/// One block of a structured message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentBlock {
    /// A tool invocation.
    ToolUse { name: String },
    /// Text, tool results, images, and anything else.
    Other,
}

impl<'de> Deserialize<'de> for ContentBlock {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;

        if value.get("type").and_then(Value::as_str) != Some("tool_use") {
            return Ok(ContentBlock::Other);
        }

        let name = value
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Ok(ContentBlock::ToolUse { name })
    }
}

/// Decode a field, mapping any type mismatch to `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

impl Event {
    /// Returns the session id, treating an empty string as absent.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref().filter(|id| !id.is_empty())
    }

    /// Returns the `YYYY-MM-DD` bucket key, or `None` if the timestamp is
    /// missing or too short.
    pub fn day_key(&self) -> Option<&str> {
        let ts = self.timestamp.as_deref()?;

        match ts.char_indices().nth(DAY_KEY_LEN) {
            Some((end, _)) => Some(&ts[..end]),
            None if ts.chars().count() == DAY_KEY_LEN => Some(ts),
            None => None,
        }
    }

    /// Whether this record is a plain-text message typed by the user.
    pub fn is_user_text(&self) -> bool {
        match &self.message {
            Some(msg) => {
                msg.role.as_deref() == Some("user")
                    && matches!(msg.content, Some(MessageContent::Text(_)))
            }
            None => false,
        }
    }

    /// Iterates over the names of all tool invocations in this record.
    pub fn tool_names(&self) -> impl Iterator<Item = &str> {
        let content = self.message.as_ref().and_then(|m| m.content.as_ref());
        let blocks: &[ContentBlock] = match content {
            Some(MessageContent::Blocks(blocks)) => blocks,
            _ => &[],
        };

        blocks.iter().filter_map(|block| match block {
            ContentBlock::ToolUse { name } => Some(name.as_str()),
            ContentBlock::Other => None,
        })
    }
}

/// Category of a tool invocation.
///
/// Declaration order is the order categories appear in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Category {
    #[serde(rename = "MCP")]
    Mcp,
    Subagent,
    Skill,
    FileOps,
    Bash,
    Web,
    Other,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Mcp => write!(f, "MCP"),
            Category::Subagent => write!(f, "Subagent"),
            Category::Skill => write!(f, "Skill"),
            Category::FileOps => write!(f, "FileOps"),
            Category::Bash => write!(f, "Bash"),
            Category::Web => write!(f, "Web"),
            Category::Other => write!(f, "Other"),
        }
    }
}

/// Headline numbers of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub skill_calls: u64,
    pub subagent_calls: u64,
    pub mcp_calls: u64,
    pub messages: u64,
    pub active_employees: usize,
    pub total_employees: usize,
    pub sessions: usize,
    pub total_tool_calls: u64,
}

/// A tool name with its invocation count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolCount {
    pub name: String,
    pub count: u64,
}

/// Activity for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyTrend {
    pub date: String,
    pub sessions: usize,
    pub tools: u64,
    pub messages: u64,
}

/// The metrics document written at the end of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Scalar totals.
    pub summary: Summary,
    /// Tool calls per category; only categories that occurred.
    pub tool_breakdown: BTreeMap<Category, u64>,
    /// Most used tools, highest count first.
    pub top_tools: Vec<ToolCount>,
    /// Most used MCP tools with the `mcp__` prefix removed.
    pub top_mcp_tools: Vec<ToolCount>,
    /// Most recent days of activity, oldest first.
    pub daily_trend: Vec<DailyTrend>,
    /// Actors with at least one tool call or message, sorted.
    pub active_employee_names: Vec<String>,
    /// When the report was built.
    pub generated_at: DateTime<Utc>,
}
