use crate::application::repos::RepoError;

// SQLSTATE classes: 22 data exception, 23 integrity constraint violation,
// 57014 query_canceled (statement_timeout).
pub fn map_sqlx_error(err: sqlx::Error) -> RepoError {
    match err {
        sqlx::Error::PoolTimedOut => RepoError::Timeout,
        sqlx::Error::Database(db) if db.code().as_deref() == Some("57014") => RepoError::Timeout,
        sqlx::Error::Database(db)
            if db
                .code()
                .as_deref()
                .is_some_and(|code| code.starts_with("23")) =>
        {
            RepoError::Integrity {
                message: match db.constraint() {
                    Some(constraint) => format!("{} ({constraint})", db.message()),
                    None => db.message().to_string(),
                },
            }
        }
        sqlx::Error::Database(db)
            if db
                .code()
                .as_deref()
                .is_some_and(|code| code.starts_with("22")) =>
        {
            RepoError::InvalidInput {
                message: db.message().to_string(),
            }
        }
        other => RepoError::from_persistence(other),
    }
}
