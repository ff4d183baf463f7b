//! Actor identity resolution.
//!
//! Stage changes and cell edits are attributed to an actor id supplied by
//! the hosting environment. Resolution precedence: `--actor` flag, then the
//! `PURSUIT_ACTOR` environment variable, then a fallback for ad-hoc use.

const FALLBACK_ACTOR: &str = "anonymous";

/// Resolve the acting identity for this invocation.
pub fn resolve_actor(flag: Option<&str>) -> String {
    if let Some(actor) = flag {
        return actor.to_string();
    }
    match std::env::var("PURSUIT_ACTOR") {
        Ok(actor) if !actor.trim().is_empty() => actor,
        _ => FALLBACK_ACTOR.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::resolve_actor;

    #[test]
    fn flag_wins_over_everything() {
        assert_eq!(resolve_actor(Some("imani")), "imani");
    }

    #[test]
    fn fallback_when_nothing_is_set() {
        // Env vars are process-global; only assert the flag-less path yields
        // a non-empty identity.
        assert!(!resolve_actor(None).is_empty());
    }
}
