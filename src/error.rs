//! Unified error type.

/// The error type returned by auxi's fallible setup and serving operations.
///
/// Application-level errors (404, 422, etc.) are expressed as HTTP
/// [`Response`](crate::Response) values carrying an
/// [`ErrorResponse`](crate::ErrorResponse), not as `Error`s. This type surfaces
/// infrastructure failures: bad configuration, binding to a port, accepting a
/// connection.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid socket address `{addr}`: {source}")]
    Addr {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("invalid route `{pattern}`: {source}")]
    Route {
        pattern: String,
        #[source]
        source: matchit::InsertError,
    },

    #[error("logging: {0}")]
    Logging(String),
}
