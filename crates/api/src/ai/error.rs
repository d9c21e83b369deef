use core::fmt::{self, Display};
use hyper::StatusCode;

pub enum Error {
    /// The request never completed.
    Fetch(hyper_util::client::legacy::Error),
    Http(hyper::http::Error),
    Body(hyper::Error),
    /// The provider replied with a non-success status.
    Status(StatusCode),
    /// The reply was not the JSON we asked for.
    Json(serde_json::Error),
    /// The reply parsed but failed validation.
    Data,
}

impl From<hyper_util::client::legacy::Error> for Error {
    fn from(err: hyper_util::client::legacy::Error) -> Self {
        Self::Fetch(err)
    }
}

impl From<hyper::http::Error> for Error {
    fn from(err: hyper::http::Error) -> Self {
        Self::Http(err)
    }
}

impl From<hyper::Error> for Error {
    fn from(err: hyper::Error) -> Self {
        Self::Body(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch(err) => write!(f, "request failed: {err}"),
            Self::Http(err) => write!(f, "cannot construct request: {err}"),
            Self::Body(err) => write!(f, "cannot read reply: {err}"),
            Self::Status(code) => write!(f, "provider returned {code}"),
            Self::Json(err) => write!(f, "malformed reply: {err}"),
            Self::Data => f.write_str("reply failed validation"),
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;
