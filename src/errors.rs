use std::fmt;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Json(serde_json::Error),
    Base64(base64::DecodeError),
    Url(url::ParseError),
    Join(tokio::task::JoinError),
    Config(String),
    MalformedToken(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "io error: {err}"),
            Error::Json(err) => write!(f, "json error: {err}"),
            Error::Base64(err) => write!(f, "base64 error: {err}"),
            Error::Url(err) => write!(f, "invalid url: {err}"),
            Error::Join(err) => write!(f, "watch task failed: {err}"),
            Error::Config(msg) => write!(f, "config error: {msg}"),
            Error::MalformedToken(msg) => write!(f, "malformed token: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Json(err) => Some(err),
            Error::Base64(err) => Some(err),
            Error::Url(err) => Some(err),
            Error::Join(err) => Some(err),
            Error::Config(_) | Error::MalformedToken(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Error::Base64(err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::Url(err)
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error::Join(err)
    }
}
