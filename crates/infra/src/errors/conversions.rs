//! Conversions from external infrastructure errors into domain errors.

use dulynoted_domain::DulyNotedError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub DulyNotedError);

impl From<InfraError> for DulyNotedError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<DulyNotedError> for InfraError {
    fn from(value: DulyNotedError) -> Self {
        InfraError(value)
    }
}

trait IntoDulyNotedError {
    fn into_dulynoted(self) -> DulyNotedError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → DulyNotedError */
/* -------------------------------------------------------------------------- */

impl IntoDulyNotedError for SqlError {
    fn into_dulynoted(self) -> DulyNotedError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match err.code {
                    ErrorCode::DatabaseBusy => DulyNotedError::Storage("database is busy".into()),
                    ErrorCode::DatabaseLocked => {
                        DulyNotedError::Storage("database is locked".into())
                    }
                    ErrorCode::ReadOnly => {
                        DulyNotedError::Storage("database is read-only".into())
                    }
                    ErrorCode::CannotOpen => {
                        DulyNotedError::Storage(format!("unable to open database: {message}"))
                    }
                    _ => DulyNotedError::Storage(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::FromSqlConversionFailure(_, _, cause) => {
                DulyNotedError::Storage(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                DulyNotedError::Storage(format!("invalid column type: {ty}"))
            }
            RE::Utf8Error(_) => {
                DulyNotedError::Storage("invalid UTF-8 returned from sqlite".into())
            }
            RE::InvalidPath(path) => DulyNotedError::Storage(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            other => DulyNotedError::Storage(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_dulynoted())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → DulyNotedError */
/* -------------------------------------------------------------------------- */

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(DulyNotedError::Storage(format!("connection pool error: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → DulyNotedError */
/* -------------------------------------------------------------------------- */

impl IntoDulyNotedError for HttpError {
    fn into_dulynoted(self) -> DulyNotedError {
        if self.is_timeout() {
            return DulyNotedError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return DulyNotedError::Network("HTTP connection failure".into());
        }

        if self.is_decode() {
            return DulyNotedError::InvalidInput(format!("unreadable HTTP response: {self}"));
        }

        if let Some(status) = self.status() {
            return DulyNotedError::Network(format!(
                "HTTP {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("unknown status")
            ));
        }

        DulyNotedError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_dulynoted())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json / toml → DulyNotedError */
/* -------------------------------------------------------------------------- */

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(DulyNotedError::InvalidInput(format!("invalid JSON: {value}")))
    }
}

impl From<toml::de::Error> for InfraError {
    fn from(value: toml::de::Error) -> Self {
        InfraError(DulyNotedError::Configuration(format!("Invalid TOML format: {value}")))
    }
}

/// Shorthand for `map_err(|e| DulyNotedError::from(InfraError::from(e)))`
pub(crate) fn to_domain<E>(err: E) -> DulyNotedError
where
    InfraError: From<E>,
{
    InfraError::from(err).into()
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
