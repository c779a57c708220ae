use std::sync::Arc;

use log::trace;
use reqwest::{
    cookie::Jar,
    header::HeaderMap,
    redirect, Client,
};
use typed_builder::TypedBuilder;
use url::Url;

#[derive(Clone, Copy, PartialEq, Eq, Debug, strum::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Redirect {
    #[default]
    Follow,
    /// Stop at the first response, even if it is a redirect.
    Manual,
}

#[derive(Clone, Debug, TypedBuilder)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    #[builder(default)]
    pub headers: HeaderMap,
    #[builder(default, setter(strip_option))]
    pub body: Option<String>,
    #[builder(default)]
    pub redirect: Redirect,
}

#[derive(Clone, Debug)]
pub struct Response {
    pub status: u16,
    /// Final URL, after any followed redirects.
    pub url: Url,
    pub body: String,
}

/// Something that can carry one HTTP exchange, keeping cookies between calls.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn send(&mut self, request: Request) -> anyhow::Result<Response>;
}

impl<T: Transport> Transport for &mut T {
    async fn send(&mut self, request: Request) -> anyhow::Result<Response> {
        (**self).send(request).await
    }
}

/// Two clients sharing one cookie jar: one follows redirects, one does not.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    follow: Client,
    manual: Client,
}

impl ReqwestTransport {
    pub fn new() -> reqwest::Result<Self> {
        let jar = Arc::new(Jar::default());
        let builder = || {
            Client::builder()
                .cookie_provider(jar.clone())
                .connection_verbose(true)
        };
        Ok(Self {
            follow: builder().build()?,
            manual: builder().redirect(redirect::Policy::none()).build()?,
        })
    }
}

impl Transport for ReqwestTransport {
    async fn send(&mut self, request: Request) -> anyhow::Result<Response> {
        let client = match request.redirect {
            Redirect::Follow => &self.follow,
            Redirect::Manual => &self.manual,
        };
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        };
        let mut builder = client
            .request(method, request.url.as_str())
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }
        let response = builder.send().await?;
        let status = response.status().as_u16();
        let url = Url::parse(response.url().as_str())?;
        let body = response.text().await?;
        trace!("{} {status}: {} bytes", url, body.len());
        Ok(Response { status, url, body })
    }
}
