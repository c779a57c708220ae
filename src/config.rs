use std::{fmt::Debug, path::PathBuf, time::Duration};

use anyhow::Context;
use chrono_tz::Tz;
use serde::Deserialize;
use typed_builder::TypedBuilder;

/// Timezone the portal prints its dates in.
pub const TIMEZONE: Tz = chrono_tz::Europe::Zurich;

/// The identity provider only accepts WebKit-like agents.
pub const USER_AGENT: &str =
    "Mozilla WebKit/537.36 (KHTML, like Gecko) eth-summary-of-credits 1.0";

pub mod urls {
    pub const SSO_ENTRY: &str = "https://www.lehrbetrieb.ethz.ch/Shibboleth.sso/LoginETHZ?target=https%3A%2F%2Fwww.lehrbetrieb.ethz.ch%2FmyStudies%2Flogin.do%3Flang%3Dde&javaScriptEnabled=true";
    pub const IDP_ORIGIN: &str = "https://aai-logon.ethz.ch/";
    pub const IDP_SSO_POST: &str = "https://aai-logon.ethz.ch/idp/profile/SAML2/POST/SSO";
    pub const PORTAL_ORIGIN: &str = "https://www.lehrbetrieb.ethz.ch/";

    pub const SELECT_ENROLLMENT: &str =
        "https://www.lehrbetrieb.ethz.ch/myStudies/studImmatrikulationPre.do";
    pub const SCHEDULE: &str = "https://www.lehrbetrieb.ethz.ch/myStudies/studWillkommen.do";
    pub const TIMETABLE: &str = "https://www.lehrbetrieb.ethz.ch/myStudies/belegungenPre.do";
    pub const GRADES: &str =
        "https://www.lehrbetrieb.ethz.ch/myStudies/studLeistungsueberblickPre.do";
    pub const PROJECTS: &str =
        "https://www.lehrbetrieb.ethz.ch/myStudies/arbeitenAngemeldetPre.do";
    pub const EXAMS: &str = "https://www.lehrbetrieb.ethz.ch/myStudies/pruefungsplanPre.do";
}

/// Tunables of a scrape, optionally read from a TOML file.
#[derive(Clone, Debug, TypedBuilder, Deserialize)]
#[serde(default)]
pub struct ScrapeOptions {
    /// Pause, in milliseconds, between page loads that would otherwise hit the portal back to back.
    #[builder(default = 1000)]
    pub pacing_ms: u64,
    #[builder(default = USER_AGENT.to_owned(), setter(into))]
    pub user_agent: String,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ScrapeOptions {
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }

    pub fn load<P: Into<PathBuf> + Debug>(path: P) -> anyhow::Result<Self> {
        let path = path.into();
        let text = fs_err::read_to_string(&path)?;
        toml::from_str(&text)
            .with_context(|| format!("While trying to parse {path:?} as scrape options"))
    }
}
