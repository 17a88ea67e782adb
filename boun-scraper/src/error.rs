///! Error types for the scraping pipeline

use thiserror::Error;

/// Failure to obtain a department listing page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("unexpected content type '{content_type}' from {url}")]
    ContentType { url: String, content_type: String },

    #[error("failed to read body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unsupported charset '{charset}' from {url}")]
    Charset { url: String, charset: String },

    #[error("body from {url} is not valid {charset}")]
    Decode { url: String, charset: String },
}

/// The listing page does not have the shape the extractor relies on
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructureError {
    #[error("course schedule table not found")]
    TableMissing,

    #[error("course table has no header row (tr.schtitle)")]
    HeaderMissing,

    #[error("course table header lacks column '{0}'")]
    ColumnMissing(&'static str),

    #[error("registration site reported an error: {0}")]
    ErrorPage(String),
}

/// A numeric cell that could not be parsed; always recovered with a default
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot parse {field} from '{raw}'")]
pub struct FieldParseError {
    pub field: &'static str,
    pub raw: String,
}

/// Configuration file problems
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("unknown department code '{0}'")]
    UnknownDepartment(String),
}

/// Why a single department page produced no sections
#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Structure(#[from] StructureError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_messages() {
        let e = FetchError::Status { url: "u".into(), status: 503 };
        assert_eq!(e.to_string(), "HTTP 503 from u");
        let e = FetchError::Decode { url: "u".into(), charset: "UTF-8".into() };
        assert_eq!(e.to_string(), "body from u is not valid UTF-8");
    }

    #[test]
    fn test_messages() {
        let e = FieldParseError { field: "credits", raw: "x".into() };
        assert_eq!(e.to_string(), "cannot parse credits from 'x'");
        let e = PageError::from(StructureError::ColumnMissing("Days"));
        assert_eq!(e.to_string(), "course table header lacks column 'Days'");
    }
}
