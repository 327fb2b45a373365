use thiserror::Error;

/// Failure reaching the listing page.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
}

/// Failure posting a message to the channel.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("request to channel {channel} failed: {source}")]
    Request {
        channel: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("channel {channel} rejected message with HTTP {status}: {body}")]
    Rejected {
        channel: String,
        status: u16,
        body: String,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("missing required setting `{key}` (env {env})")]
    Missing {
        key: &'static str,
        env: &'static str,
    },
    #[error("`{key}` must be a positive whole number, got {value:?}")]
    NotPositive { key: &'static str, value: String },
    #[error("`dmsguild.base_url` is not a valid URL: {0}")]
    BaseUrl(#[from] url::ParseError),
}

/// A listing entry whose title line does not have the expected shape.
/// Always handled by skipping the entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseAnomaly {
    #[error("entry has no text")]
    Empty,
    #[error("no `Date Added:` marker in {0:?}")]
    MissingDateMarker(String),
    #[error("nothing follows `Added:` in {0:?}")]
    MissingDate(String),
    #[error("malformed date token {0:?}")]
    MalformedDate(String),
}

/// Errors that end a tick early. The scheduler keeps running.
#[derive(Debug, Error)]
pub enum TickError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}
