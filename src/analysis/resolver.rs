//! Attribution of log directories to actors.

use crate::config::ActorConfig;
use std::collections::BTreeSet;

/// Maps a log source directory name to an actor.
#[derive(Debug, Clone)]
pub struct ActorResolver {
    actors: Vec<ActorConfig>,
}

impl ActorResolver {
    /// Create a resolver over an ordered actor table.
    pub fn new(actors: Vec<ActorConfig>) -> Self {
        Self { actors }
    }

    /// Returns the first actor, in table order, whose keyword occurs in
    /// `dir_name`. `None` means the directory is unattributed.
    ///
    /// Several actors may share a keyword; only the first one declared is
    /// ever returned for it.
    pub fn resolve(&self, dir_name: &str) -> Option<&str> {
        self.actors
            .iter()
            .find(|actor| dir_name.contains(actor.keyword.as_str()))
            .map(|actor| actor.name.as_str())
    }

    /// Number of distinct actor names in the table.
    pub fn total_actors(&self) -> usize {
        self.actors
            .iter()
            .map(|actor| actor.name.as_str())
            .collect::<BTreeSet<_>>()
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn default_resolver() -> ActorResolver {
        ActorResolver::new(Config::default().actors)
    }

    #[test]
    fn test_resolve_by_substring() {
        let resolver = default_resolver();
        assert_eq!(
            resolver.resolve("-Users-me-my-ai-team-secretary"),
            Some("ミナミ")
        );
        assert_eq!(
            resolver.resolve("-Users-me-my-ai-team-executive-COO"),
            Some("リン")
        );
    }

    #[test]
    fn test_shared_keyword_resolves_to_first_declared() {
        let resolver = default_resolver();
        assert_eq!(resolver.resolve("-home-my-ai-team-web-team"), Some("ソウ"));
        assert_eq!(resolver.resolve("-home-my-ai-team-coach"), Some("タクミ"));
    }

    #[test]
    fn test_unattributed_directory() {
        let resolver = default_resolver();
        assert_eq!(resolver.resolve("-home-my-ai-team-misc"), None);
    }

    #[test]
    fn test_table_order_breaks_overlaps() {
        // "hr" also occurs inside "-home-...-threads"
        let resolver = ActorResolver::new(vec![
            ActorConfig::new("First", "hr"),
            ActorConfig::new("Second", "threads"),
        ]);
        assert_eq!(resolver.resolve("-home-threads"), Some("First"));

        let reversed = ActorResolver::new(vec![
            ActorConfig::new("Second", "threads"),
            ActorConfig::new("First", "hr"),
        ]);
        assert_eq!(reversed.resolve("-home-threads"), Some("Second"));
    }

    #[test]
    fn test_total_actors_counts_distinct_names() {
        assert_eq!(default_resolver().total_actors(), 19);

        let resolver = ActorResolver::new(vec![
            ActorConfig::new("A", "x"),
            ActorConfig::new("A", "y"),
            ActorConfig::new("B", "x"),
        ]);
        assert_eq!(resolver.total_actors(), 2);
    }
}
