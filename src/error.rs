use thiserror::Error;

/// Everything that can end a scrape.
///
/// None of these are retried internally; the whole `fetch_all` call fails as a unit.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Username or password is empty")]
    MissingCredential,
    #[error("The identity provider did not answer with the expected SAML form")]
    InvalidSsoResponse,
    #[error("The identity provider rejected the username or password")]
    InvalidCredentials,
    #[error("The server returned a page without the expected form")]
    UnknownPortalResponse,
    #[error("The server returned an empty page; session cookies were not retained")]
    CookiesDisabled,
    #[error("Failed to parse a portal page: {0:#}")]
    MalformedPortalPage(anyhow::Error),
    #[error("Request failed: {0:#}")]
    Network(anyhow::Error),
}

impl ScrapeError {
    /// Stable machine-readable code of this error.
    pub fn kind(&self) -> &'static str {
        use ScrapeError::*;
        match self {
            MissingCredential => "MISSING_CREDENTIAL",
            InvalidSsoResponse => "INVALID_SSO_RESPONSE",
            InvalidCredentials => "INVALID_CREDENTIALS",
            UnknownPortalResponse => "UNKNOWN_PORTAL_RESPONSE",
            CookiesDisabled => "COOKIES_DISABLED",
            MalformedPortalPage(_) => "MALFORMED_PORTAL_PAGE",
            Network(_) => "NETWORK_ERROR",
        }
    }
}

pub type Result<T, E = ScrapeError> = std::result::Result<T, E>;
