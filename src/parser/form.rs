//! Helpers for the HTML forms the single sign-on flow passes around.

use anyhow::Context;
use getset::Getters;
use indexmap::IndexMap;
use scraper::Html;

/// Value of the first `input` with the given name.
pub fn input_value(html: &Html, name: &str) -> Option<String> {
    html.select(selector!("input"))
        .find(|input| input.value().attr("name") == Some(name))
        .and_then(|input| input.value().attr("value"))
        .map(str::to_owned)
}

/// `action` attribute of the first form on the page.
pub fn form_action(html: &Html) -> Option<String> {
    html.select(selector!("form"))
        .next()?
        .value()
        .attr("action")
        .map(str::to_owned)
}

/// All named inputs of the page's forms; a repeated name keeps the last value.
///
/// A name whose last input carries no `value` attribute is left out.
pub fn form_inputs(html: &Html) -> IndexMap<String, String> {
    html.select(selector!("form input"))
        .filter_map(|input| {
            let name = input.value().attr("name")?;
            Some((name, input.value().attr("value")))
        })
        .collect::<IndexMap<_, _>>()
        .into_iter()
        .filter_map(|(name, value)| Some((name.to_owned(), value?.to_owned())))
        .collect()
}

/// The attribute release consent form of the identity provider, ready to be accepted.
#[derive(Debug, Getters)]
#[getset(get = "pub")]
pub struct ConsentBody {
    action: String,
    /// Field values in document order; names that occur more than once keep every value.
    fields: IndexMap<String, Vec<String>>,
}

impl ConsentBody {
    const REJECT_EVENT: &'static str = "_eventId_AttributeReleaseRejected";
    const PROCEED_EVENT: &'static str = "_eventId_proceed";
    const REMEMBER_CONSENT: &'static str = "_shib_idp_rememberConsent";

    pub fn parse(html: &Html) -> anyhow::Result<Self> {
        let action = form_action(html).context("Consent form not found")?;
        let mut fields = IndexMap::<_, Vec<_>>::new();
        for input in html.select(selector!("form input")) {
            let (Some(name), Some(value)) = (input.value().attr("name"), input.value().attr("value"))
            else {
                continue;
            };
            if name == Self::REJECT_EVENT || value == Self::REMEMBER_CONSENT {
                continue;
            }
            fields
                .entry(name.to_owned())
                .or_default()
                .push(value.to_owned());
        }
        Ok(Self { action, fields })
    }

    /// Flattens the fields into form pairs, accepting the consent.
    ///
    /// Multi-valued fields become repeated `name=value` entries without index suffixes.
    pub fn accept(mut self) -> Vec<(String, String)> {
        self.fields
            .insert(Self::PROCEED_EVENT.to_owned(), vec![String::new()]);
        self.fields
            .into_iter()
            .flat_map(|(name, values)| values.into_iter().map(move |v| (name.clone(), v)))
            .collect()
    }
}
