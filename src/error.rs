use thiserror::Error;

/// Failure taxonomy for a collection run. All variants abort the run that
/// raised them; there is no partial-result recovery.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// A listing or detail page request failed, or came back with a
    /// non-success status.
    #[error("request for {url} failed")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The fetched document is missing a structural element the site is
    /// expected to carry. Usually means the site layout changed.
    #[error("unexpected page structure at {url}: no {what}")]
    Parse { url: String, what: &'static str },

    /// A field's text does not have the expected lexical shape.
    #[error("malformed {field} value: {value:?}")]
    Format { field: &'static str, value: String },
}
