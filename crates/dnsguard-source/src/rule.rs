use std::sync::OnceLock;

use regex::Regex;

/// Extracts the hostnames out of a Traefik-style router rule, e.g.
/// ``Host(`a.example`) || Host(`b.example`)``. Only the `Host(...)`
/// matcher is understood; any other matcher in the rule (`PathPrefix`,
/// `Headers`, ...) is ignored rather than rejected, since a router can
/// combine matchers and we only care about the hostnames it claims.
///
/// Returns an empty vec (never an error) when the rule contains no `Host`
/// matcher — callers log and skip the offending router themselves, keeping
/// one bad rule from discarding the rest of the poll.
pub fn hosts_from_rule(rule: &str) -> Vec<String> {
    host_regex()
        .captures_iter(rule)
        .map(|caps| caps[1].trim().to_ascii_lowercase())
        .filter(|h| !h.is_empty())
        .collect()
}

fn host_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"Host\(\s*[`"']([^`"']+)[`"']\s*\)"#).expect("valid regex"))
}
