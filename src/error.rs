use derive_more::{Display, Error};

#[derive(Debug, Display, Error)]
pub enum ApiError {
    #[display("{marketplace} API responded with {status}: {body}")]
    Status {
        marketplace: String,
        status: u16,
        body: String,
    },
}

/// Failure classes reported by the binaries; each has a static log tag.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    #[display("Request timed out")]
    Timeout,
    #[display("Connection error")]
    Connection,
    #[display("Sync failed")]
    Other,
}

impl FailureKind {
    pub fn classify(err: &anyhow::Error) -> Self {
        for cause in err.chain() {
            let reqwest_err = match cause.downcast_ref::<reqwest_middleware::Error>() {
                Some(reqwest_middleware::Error::Reqwest(err)) => Some(err),
                _ => cause.downcast_ref::<reqwest::Error>(),
            };
            if let Some(err) = reqwest_err {
                if err.is_timeout() {
                    return Self::Timeout;
                }
                if err.is_connect() {
                    return Self::Connection;
                }
            }
        }
        Self::Other
    }
}
