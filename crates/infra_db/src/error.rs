//! SQLx error mapping
//!
//! Translates driver errors into the store-level `StoreError` taxonomy so
//! domain services never see raw database errors. PostgreSQL error codes:
//! <https://www.postgresql.org/docs/current/errcodes-appendix.html>

use domain_ledger::StoreError;

/// Maps a SQLx error onto the `StoreError` taxonomy
pub fn map_sqlx_error(error: sqlx::Error) -> StoreError {
    match &error {
        sqlx::Error::RowNotFound => StoreError::NotFound("record not found".to_string()),
        sqlx::Error::PoolTimedOut => {
            StoreError::Connection("connection pool exhausted".to_string())
        }
        sqlx::Error::Io(_) | sqlx::Error::Tls(_) => StoreError::Connection(error.to_string()),
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            StoreError::Serialization(error.to_string())
        }
        sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
            Some("23505") => StoreError::Duplicate(db_err.message().to_string()),
            Some("23503") | Some("23514") => StoreError::Constraint(db_err.message().to_string()),
            _ => StoreError::Query(db_err.message().to_string()),
        },
        _ => StoreError::Query(error.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let mapped = map_sqlx_error(sqlx::Error::RowNotFound);
        assert!(mapped.is_not_found());
    }

    #[test]
    fn test_pool_timeout_maps_to_connection() {
        let mapped = map_sqlx_error(sqlx::Error::PoolTimedOut);
        assert!(matches!(mapped, StoreError::Connection(_)));
    }
}
