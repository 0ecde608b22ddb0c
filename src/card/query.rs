//! Query-string contract of the server rendering endpoint.
//!
//! Decoding never fails: absent or malformed parameters resolve through
//! [`crate::card::defaults`]. Encoding produces a stable, ordered query that decodes back to
//! an equivalent model.

use std::collections::HashMap;

use crate::{
    card::{
        defaults::{self, Param},
        model::{Batch, CardModel, LogoRef, TagSet},
    },
    foundation::error::{CardError, CardResult},
};

/// Decode a transient [`CardModel`] from a raw query string (with or without leading `?`).
#[tracing::instrument(level = "debug")]
pub fn parse_query(qs: &str) -> CardModel {
    let qs = qs.strip_prefix('?').unwrap_or(qs);

    let mut raw = HashMap::<Param, String>::new();
    for (k, v) in url::form_urlencoded::parse(qs.as_bytes()) {
        let Some(param) = Param::from_key(&k) else {
            continue;
        };
        // First occurrence wins, like `URLSearchParams.get`.
        raw.entry(param).or_insert_with(|| v.into_owned());
    }

    let value = |p: Param| scalar(&raw, p);
    let or_fallback = |p: Param| value(p).or(p.fallback()).unwrap_or_default();

    let batch_raw = or_fallback(Param::Batch);
    let batch = Batch::parse(batch_raw).unwrap_or_else(|| {
        tracing::debug!(batch = batch_raw, "unknown batch, using default");
        Batch::parse(Param::Batch.fallback().unwrap_or_default()).unwrap_or_default()
    });

    // A present-but-empty `tags=` explicitly asks for no tag row.
    let tags = match raw.get(&Param::Tags) {
        Some(v) => TagSet::from_delimited(v),
        None => TagSet::from_delimited(Param::Tags.fallback().unwrap_or_default()),
    };

    let mut model = CardModel::new(
        or_fallback(Param::Company).trim(),
        or_fallback(Param::Url).trim(),
        batch,
    )
    .with_jobs(defaults::coerce_jobs(value(Param::Jobs).or(Param::Jobs.fallback())))
    .with_tags(tags);

    if let Some(d) = value(Param::Description) {
        model = model.with_description(d);
    }
    if let Some(logo) = value(Param::Logo).and_then(accept_logo_url) {
        model = model.with_logo(LogoRef::Url(logo));
    }
    model
}

/// Empty values count as absent for scalar options.
fn scalar(raw: &HashMap<Param, String>, p: Param) -> Option<&str> {
    raw.get(&p)
        .map(String::as_str)
        .filter(|v| !v.trim().is_empty())
}

/// Only `http`, `https` and `data` URLs are fetchable logo references.
fn accept_logo_url(raw: &str) -> Option<String> {
    match url::Url::parse(raw.trim()) {
        Ok(u) if matches!(u.scheme(), "http" | "https" | "data") => Some(u.to_string()),
        Ok(u) => {
            tracing::debug!(scheme = u.scheme(), "ignoring logo with unsupported scheme");
            None
        }
        Err(e) => {
            tracing::debug!(error = %e, "ignoring unparsable logo url");
            None
        }
    }
}

/// Encode `model` as a query string in fixed parameter order.
///
/// Byte logos have no URL form and are omitted; the server then renders the placeholder.
pub fn to_query_string(model: &CardModel) -> String {
    let mut ser = url::form_urlencoded::Serializer::new(String::new());
    for p in Param::ALL {
        match p {
            Param::Company => {
                ser.append_pair(p.key(), model.company());
            }
            Param::Logo => {
                if let Some(LogoRef::Url(u)) = model.logo() {
                    ser.append_pair(p.key(), u);
                }
            }
            Param::Batch => {
                ser.append_pair(p.key(), model.batch().as_str());
            }
            Param::Jobs => {
                ser.append_pair(p.key(), &model.jobs().to_string());
            }
            Param::Url => {
                ser.append_pair(p.key(), model.url());
            }
            Param::Tags => {
                ser.append_pair(p.key(), &model.tags().to_delimited());
            }
            Param::Description => {
                if let Some(d) = model.description() {
                    ser.append_pair(p.key(), d);
                }
            }
        }
    }
    ser.finish()
}

/// Shareable link to the server endpoint at `endpoint` (e.g. `https://host/api/og`).
pub fn share_url(endpoint: &str, model: &CardModel) -> CardResult<String> {
    let mut u = url::Url::parse(endpoint)
        .map_err(|e| CardError::validation(format!("invalid endpoint '{endpoint}': {e}")))?;
    u.set_query(Some(&to_query_string(model)));
    Ok(u.to_string())
}

#[cfg(test)]
#[path = "../../tests/unit/card/query.rs"]
mod tests;
