pub mod sqlite_event_repo;
pub mod sqlite_senior_repo;
pub mod sqlite_guest_repo;
pub mod sqlite_user_repo;
pub mod sqlite_auth_repo;
pub mod sqlite_audit_repo;

pub mod postgres_event_repo;
pub mod postgres_senior_repo;
pub mod postgres_guest_repo;
pub mod postgres_user_repo;
pub mod postgres_auth_repo;
pub mod postgres_audit_repo;

/// Substring pattern for `LIKE ... ESCAPE '\'`. Wildcards in the term match literally.
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.to_lowercase().chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}
