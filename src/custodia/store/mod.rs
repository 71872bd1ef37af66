//! Database helpers for the user directory and the permanent token store.
//!
//! Both stores are external, presumed-consistent Postgres tables accessed
//! through plain queries; no in-process locking is layered on top.

pub mod tokens;
pub mod users;

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}
