//! The Shibboleth single sign-on handshake that ends on the myStudies home page.

use derive_more::{Display, From};
use getset::Getters;
use log::{debug, info, warn};
use reqwest::header::{self, HeaderMap, HeaderValue};
use scraper::Html;
use serde::Serialize;
use url::Url;

use crate::{
    config::urls,
    credentials::Credentials,
    error::{Result, ScrapeError},
    parser::{
        form::{form_action, form_inputs, input_value, ConsentBody},
        portal,
    },
    progress::{notify, Progress},
    session::Session,
    transport::{Redirect, Transport},
};

/// Value of the `immatrikulationIndex` radio button selecting one enrollment.
#[derive(Clone, PartialEq, Eq, Debug, From, Display, Serialize)]
#[serde(transparent)]
pub struct EnrollmentId(String);

impl From<&str> for EnrollmentId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// The first portal page after a successful login.
#[derive(Debug, Getters)]
#[getset(get = "pub")]
pub struct PortalHome {
    enrollments: Vec<EnrollmentId>,
    html: String,
}

#[derive(Debug, Serialize)]
struct SamlForm<'a> {
    #[serde(rename = "SAMLRequest")]
    saml_request: &'a str,
    #[serde(rename = "RelayState")]
    relay_state: &'a str,
}

#[derive(Debug, Serialize)]
struct LoginForm<'a> {
    j_username: &'a str,
    j_password: &'a str,
    donotcache: &'static str,
    #[serde(rename = "_shib_idp_revokeConsent")]
    revoke_consent: &'static str,
    form_flavour: &'static str,
    #[serde(rename = "_eventId_proceed")]
    proceed: &'static str,
    #[serde(rename = "_charset_")]
    charset: &'static str,
    #[serde(rename = ":formstart")]
    form_start: &'static str,
    #[serde(rename = ":formid")]
    form_id: &'static str,
}

impl<'a> LoginForm<'a> {
    fn new(credentials: &'a Credentials) -> Self {
        Self {
            j_username: credentials.username.as_str(),
            j_password: credentials.password.as_str(),
            donotcache: "1",
            revoke_consent: "true",
            form_flavour: "eth_form",
            proceed: "",
            charset: "UTF-8",
            form_start: "/content/main/de/jcr:content/par/start",
            form_id: "_content_main_de_jcr_content_par_start",
        }
    }
}

const LOGIN_FAILED: [&str; 2] = ["Authentication failed", "Anmeldung ist fehlgeschlagen"];

/// Logs in and returns the portal home page.
pub async fn authenticate<T, F>(
    session: &mut Session<T>,
    credentials: &Credentials,
    progress: &mut F,
) -> Result<PortalHome>
where
    T: Transport,
    F: FnMut(Progress),
{
    if !credentials.is_complete() {
        return Err(ScrapeError::MissingCredential);
    }

    notify(progress, Progress::ContactIdp);
    let mut headers = HeaderMap::new();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("max-age="));
    let response = session.get(urls::SSO_ENTRY, headers).await?;
    let (saml_request, relay_state) = {
        let html = Html::parse_document(&response.body);
        let fields = (
            input_value(&html, "SAMLRequest"),
            input_value(&html, "RelayState"),
        );
        match fields {
            (Some(saml_request), Some(relay_state)) => (saml_request, relay_state),
            _ => return Err(ScrapeError::InvalidSsoResponse),
        }
    };

    notify(progress, Progress::Connected);
    let form = SamlForm {
        saml_request: &saml_request,
        relay_state: &relay_state,
    };
    let response = session
        .post_form(urls::IDP_SSO_POST, &form, Redirect::Follow)
        .await?;
    let login_action = regex!(r#"action="([^"]*)""#)
        .captures(&response.body)
        .map(|c| c[1].to_owned())
        .ok_or(ScrapeError::InvalidSsoResponse)?;
    let login_url = resolve(urls::IDP_ORIGIN, &login_action).ok_or(ScrapeError::InvalidSsoResponse)?;

    notify(progress, Progress::LoggingIn);
    let response = session
        .post_form(&login_url, &LoginForm::new(credentials), Redirect::Manual)
        .await?;
    if LOGIN_FAILED.iter().any(|s| response.body.contains(s)) {
        return Err(ScrapeError::InvalidCredentials);
    }
    notify(progress, Progress::LoggedIn);

    let consent = ConsentBody::parse(&Html::parse_document(&response.body)).map_err(|e| {
        debug!("No consent form: {e:#}");
        ScrapeError::UnknownPortalResponse
    })?;
    let consent_url =
        resolve(urls::IDP_ORIGIN, consent.action()).ok_or(ScrapeError::UnknownPortalResponse)?;
    let response = session
        .post_form(&consent_url, &consent.accept(), Redirect::Manual)
        .await?;

    let (assertion_url, assertion) = {
        let html = Html::parse_document(&response.body);
        let assertion = form_inputs(&html);
        notify(progress, Progress::LoadingModules);
        let action = form_action(&html).ok_or(ScrapeError::UnknownPortalResponse)?;
        let url = resolve(response.url.as_str(), &action).ok_or(ScrapeError::UnknownPortalResponse)?;
        (url, assertion)
    };
    let response = session
        .post_form(&assertion_url, &assertion, Redirect::Manual)
        .await?;
    if response.body.trim().is_empty() {
        return Err(ScrapeError::CookiesDisabled);
    }

    let portal_url = {
        let action = form_action(&Html::parse_document(&response.body))
            .ok_or(ScrapeError::UnknownPortalResponse)?;
        resolve(urls::PORTAL_ORIGIN, &action).ok_or(ScrapeError::UnknownPortalResponse)?
    };
    let response = session
        .post_form(&portal_url, &[("javaScriptEnabled", "true")], Redirect::Follow)
        .await?;
    let enrollments = portal::enrollments(&portal::parse_home(&response.body));
    if enrollments.is_empty() {
        warn!("The portal lists no enrollment");
    }
    info!("Logged in; {} enrollment(s)", enrollments.len());
    Ok(PortalHome {
        enrollments,
        html: response.body,
    })
}

/// Resolves a possibly relative form action against `base`.
fn resolve(base: &str, action: &str) -> Option<String> {
    Some(Url::parse(base).ok()?.join(action).ok()?.into())
}
