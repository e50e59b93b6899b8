//! Report construction from aggregated totals.

use crate::analysis::AggregateState;
use crate::models::{DailyTrend, Report, Summary, ToolCount, MCP_PREFIX};
use chrono::Utc;
use std::cmp::Reverse;

/// Sizes of the ranked and windowed report sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportSettings {
    pub trend_days: usize,
    pub top_tools: usize,
    pub top_mcp_tools: usize,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            trend_days: 14,
            top_tools: 15,
            top_mcp_tools: 10,
        }
    }
}

impl From<&crate::config::ReportConfig> for ReportSettings {
    fn from(config: &crate::config::ReportConfig) -> Self {
        Self {
            trend_days: config.trend_days,
            top_tools: config.top_tools,
            top_mcp_tools: config.top_mcp_tools,
        }
    }
}

/// Build the final report. `total_actors` is the size of the actor table.
pub fn build_report(
    state: &AggregateState,
    settings: &ReportSettings,
    total_actors: usize,
) -> Report {
    let active_names = active_actor_names(state);

    let summary = Summary {
        skill_calls: state.skill_calls,
        subagent_calls: state.subagent_calls,
        mcp_calls: state.mcp_calls,
        messages: state.messages,
        active_employees: active_names.len(),
        total_employees: total_actors,
        sessions: state.session_ids.len(),
        total_tool_calls: state.tool_counts.total(),
    };

    Report {
        summary,
        tool_breakdown: state.categories.clone(),
        top_tools: top_tools(state, settings.top_tools),
        top_mcp_tools: top_mcp_tools(state, settings.top_mcp_tools),
        daily_trend: daily_trend(state, settings.trend_days),
        active_employee_names: active_names,
        generated_at: Utc::now(),
    }
}

/// Names of actors with any tool call or message, sorted.
fn active_actor_names(state: &AggregateState) -> Vec<String> {
    // BTreeMap iteration is already sorted by name.
    state
        .actors
        .iter()
        .filter(|(_, activity)| activity.is_active())
        .map(|(name, _)| name.clone())
        .collect()
}

/// The last `days` days with any activity, oldest first.
fn daily_trend(state: &AggregateState, days: usize) -> Vec<DailyTrend> {
    let skip = state.days.len().saturating_sub(days);

    state
        .days
        .iter()
        .skip(skip)
        .map(|(date, bucket)| DailyTrend {
            date: date.clone(),
            sessions: bucket.sessions.len(),
            tools: bucket.tools,
            messages: bucket.messages,
        })
        .collect()
}

/// Highest-count tools; ties keep first-seen order.
fn top_tools(state: &AggregateState, n: usize) -> Vec<ToolCount> {
    ranked(
        state
            .tool_counts
            .iter()
            .map(|(name, count)| ToolCount {
                name: name.to_string(),
                count,
            })
            .collect(),
        n,
    )
}

/// Highest-count MCP tools with the prefix stripped.
fn top_mcp_tools(state: &AggregateState, n: usize) -> Vec<ToolCount> {
    ranked(
        state
            .tool_counts
            .iter()
            .filter_map(|(name, count)| {
                name.strip_prefix(MCP_PREFIX).map(|short| ToolCount {
                    name: short.to_string(),
                    count,
                })
            })
            .collect(),
        n,
    )
}

fn ranked(mut tools: Vec<ToolCount>, n: usize) -> Vec<ToolCount> {
    // sort_by_key is stable
    tools.sort_by_key(|t| Reverse(t.count));
    tools.truncate(n);
    tools
}
