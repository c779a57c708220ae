use anyhow::Context;
use log::{debug, trace};
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::Serialize;
use url::Url;

use crate::{
    config::ScrapeOptions,
    error::{Result, ScrapeError},
    transport::{Method, Redirect, Request, Response, Transport},
};

/// A logged-in (or logging-in) conversation with the portal.
///
/// Every request borrows the session mutably, so page loads happen strictly one after another.
pub struct Session<T> {
    transport: T,
    options: ScrapeOptions,
}

impl<T: Transport> Session<T> {
    pub fn new(transport: T, options: ScrapeOptions) -> Self {
        Self { transport, options }
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    pub async fn get(&mut self, url: &str, mut headers: HeaderMap) -> Result<Response> {
        let url = parse_url(url)?;
        self.insert_user_agent(&mut headers)?;
        let request = Request::builder()
            .method(Method::Get)
            .url(url)
            .headers(headers)
            .build();
        self.send(request).await
    }

    /// Posts `form` url-encoded; sequence fields become repeated keys.
    pub async fn post_form<F: Serialize + ?Sized>(
        &mut self,
        url: &str,
        form: &F,
        redirect: Redirect,
    ) -> Result<Response> {
        let url = parse_url(url)?;
        let body = serde_html_form::to_string(form)
            .context("Failed to encode a form body")
            .map_err(ScrapeError::Network)?;
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        self.insert_user_agent(&mut headers)?;
        let request = Request::builder()
            .method(Method::Post)
            .url(url)
            .headers(headers)
            .body(body)
            .redirect(redirect)
            .build();
        self.send(request).await
    }

    /// Waits for the configured pacing delay.
    pub async fn pause(&self) {
        let pacing = self.options.pacing();
        if !pacing.is_zero() {
            tokio::time::sleep(pacing).await;
        }
    }

    fn insert_user_agent(&self, headers: &mut HeaderMap) -> Result<()> {
        let value = HeaderValue::from_str(&self.options.user_agent)
            .context("Invalid user agent")
            .map_err(ScrapeError::Network)?;
        headers.insert(header::USER_AGENT, value);
        Ok(())
    }

    async fn send(&mut self, request: Request) -> Result<Response> {
        debug!("{} {}", request.method, request.url);
        let description = format!("{} {}", request.method, request.url);
        let response = self
            .transport
            .send(request)
            .await
            .with_context(|| format!("While requesting {description}"))
            .map_err(ScrapeError::Network)?;
        debug!("{} {}", response.status, response.url);
        trace!("{}", response.body);
        Ok(response)
    }
}

fn parse_url(url: &str) -> Result<Url> {
    Url::parse(url)
        .with_context(|| format!("Invalid url: {url}"))
        .map_err(ScrapeError::Network)
}

#[cfg(test)]
mod tests {
    use reqwest::header::{self, HeaderMap};

    use crate::{
        config::ScrapeOptions,
        transport::{mock::ScriptedTransport, Method, Redirect},
    };

    use super::Session;

    #[tokio::test]
    async fn form_post() {
        let transport = ScriptedTransport::new(["ok"]);
        let mut session = Session::new(transport, ScrapeOptions::builder().pacing_ms(0).build());
        let response = session
            .post_form(
                "https://www.lehrbetrieb.ethz.ch/myStudies/studWillkommen.do",
                &[("stundenplan", "Stundenplan"), ("a b", "c&d")],
                Redirect::Manual,
            )
            .await
            .unwrap();
        assert_eq!(response.body, "ok");

        let transport = session.into_transport();
        let request = &transport.requests[0];
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.redirect, Redirect::Manual);
        assert_eq!(
            request.body.as_deref(),
            Some("stundenplan=Stundenplan&a+b=c%26d")
        );
        assert!(request.headers[header::USER_AGENT]
            .to_str()
            .unwrap()
            .contains("eth-summary-of-credits"));
    }

    #[tokio::test]
    async fn exhausted_transport_is_a_network_error() {
        let mut session = Session::new(ScriptedTransport::default(), ScrapeOptions::default());
        let error = session
            .get("https://www.lehrbetrieb.ethz.ch/", HeaderMap::new())
            .await
            .unwrap_err();
        assert_eq!(error.kind(), "NETWORK_ERROR");
    }
}
