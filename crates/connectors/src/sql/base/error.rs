use std::string::FromUtf8Error;
use thiserror::Error;

/// All errors coming from the database/query layer.
#[derive(Debug, Error)]
pub enum DbError {
    /// Any MySQL driver or server error.
    #[error("MySQL error: {0}")]
    MySqlError(#[from] mysql_async::Error),

    /// UTF-8 decoding failed on some byte data.
    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] FromUtf8Error),

    /// A value of this shape has no SQL parameter representation.
    #[error("Unsupported parameter of kind '{0}'")]
    UnsupportedParam(&'static str),

    /// A table or column name that cannot be quoted.
    #[error("Invalid identifier: '{0}'")]
    InvalidIdentifier(String),

    /// The statement handle was prepared by a different kind of transaction.
    #[error("Statement was not prepared by this adapter")]
    ForeignStatement,

    /// A result row was missing a column we rely on.
    #[error("Missing column '{0}' in result row")]
    MissingColumn(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Errors happening during adapter or connection setup.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// The driver refused the connection options.
    #[error("MySQL connector creation failed: {0}")]
    MySql(#[from] mysql_async::Error),

    /// The connection URL could not be parsed.
    #[error("Invalid connection URL: {0}")]
    InvalidUrl(#[from] mysql_async::UrlError),
}
