//! Tool invocation classification.

use crate::models::{Category, MCP_PREFIX};

/// Tool that delegates work to a subagent.
pub const SUBAGENT_TOOL: &str = "Task";

/// Tool that runs a reusable skill.
pub const SKILL_TOOL: &str = "Skill";

/// Tool that runs a shell command.
pub const BASH_TOOL: &str = "Bash";

/// File manipulation tools.
pub const FILE_TOOLS: &[&str] = &["Read", "Write", "Edit", "Glob", "Grep"];

/// Web access tools.
pub const WEB_TOOLS: &[&str] = &["WebSearch", "WebFetch"];

/// Assign a tool name to exactly one category. The first matching rule wins.
pub fn classify(name: &str) -> Category {
    if name.starts_with(MCP_PREFIX) {
        Category::Mcp
    } else if name == SUBAGENT_TOOL {
        Category::Subagent
    } else if name == SKILL_TOOL {
        Category::Skill
    } else if FILE_TOOLS.contains(&name) {
        Category::FileOps
    } else if name == BASH_TOOL {
        Category::Bash
    } else if WEB_TOOLS.contains(&name) {
        Category::Web
    } else {
        Category::Other
    }
}
