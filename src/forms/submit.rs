//! Form submission shaping
//!
//! The fill engine keeps empty names and values; this is where they are
//! dropped before the suggestions go on the wire.

use crate::client::CrawlClient;
use crate::forms::discover::DiscoveredForm;
use crate::forms::fill::SuggestionMap;
use crate::{ClientError, FormfillError, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, Request};
use url::Url;

/// Encodes suggestions as `application/x-www-form-urlencoded`
///
/// Pairs are sorted by name so the output is stable. Entries with an empty
/// name or an empty value are skipped.
///
/// # Example
///
/// ```
/// use sumi_formfill::forms::{encode_suggestions, SuggestionMap};
///
/// let mut data = SuggestionMap::new();
/// data.insert("color".to_string(), "#a52a2a".to_string());
/// data.insert("".to_string(), "submit".to_string());
/// data.insert("age".to_string(), "51".to_string());
/// assert_eq!(encode_suggestions(&data), "age=51&color=%23a52a2a");
/// ```
pub fn encode_suggestions(suggestions: &SuggestionMap) -> String {
    let mut pairs: Vec<(&str, &str)> = suggestions
        .iter()
        .filter(|(name, value)| !name.is_empty() && !value.is_empty())
        .map(|(name, value)| (name.as_str(), value.as_str()))
        .collect();
    pairs.sort_unstable();

    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

/// Builds the submission request for a form through the crawl client
///
/// The action is resolved against `base_url`. `POST` forms carry the encoded
/// suggestions as a urlencoded body; every other method is sent as a `GET`
/// whose query string is replaced by the suggestions.
///
/// # Returns
///
/// * `Ok(Request)` - Ready to be wrapped in a [`crate::client::CrawlRequest`]
/// * `Err(FormfillError)` - The action could not be resolved or the request could not be built
pub fn build_submission(
    client: &CrawlClient,
    form: &DiscoveredForm,
    base_url: &Url,
    suggestions: &SuggestionMap,
) -> Result<Request> {
    let mut target = base_url.join(&form.action)?;
    let encoded = encode_suggestions(suggestions);

    let builder = if form.method == "POST" {
        client
            .request(Method::POST, target.clone())
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(encoded)
    } else {
        target.set_query((!encoded.is_empty()).then_some(encoded.as_str()));
        client.request(Method::GET, target.clone())
    };

    builder.build().map_err(|source| {
        FormfillError::Client(ClientError::Http {
            url: target.to_string(),
            source,
        })
    })
}
