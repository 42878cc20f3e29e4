//! Deterministic resource names and identifier parsing

use uuid::Uuid;

/// Lowercase, turn underscores into hyphens, strip leading/trailing hyphens
pub fn normalize_name(raw: &str) -> String {
    raw.to_lowercase()
        .replace('_', "-")
        .trim_matches('-')
        .to_string()
}

/// `{scope}-{type}-{login}` normalized. One credential per tuple.
pub fn credential_name(scope: &str, source_code_type: &str, login_name: &str) -> String {
    normalize_name(&format!("{scope}-{source_code_type}-{login_name}"))
}

/// Split `namespace:name`. Without a colon the whole string is the name.
pub fn parse_ref(id: &str) -> (&str, &str) {
    match id.split_once(':') {
        Some((namespace, name)) => (namespace, name),
        None => ("", id),
    }
}

/// Project name out of a `cluster:project` project ID
pub fn project_name(project_id: &str) -> &str {
    parse_ref(project_id).1
}

/// Fresh unique name for a synced repository; unrelated to the remote repo
pub fn repository_name() -> String {
    format!("repo-{}", Uuid::new_v4().simple())
}
