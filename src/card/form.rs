//! Boundary with the interactive form collector.
//!
//! [`CardForm`] accumulates user input one field at a time. [`CardForm::submit`] is the only
//! way to obtain a [`CardModel`] for the live-render path, and it refuses incomplete forms.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;

use crate::{
    card::{
        defaults::{self, MAX_DESCRIPTION_CHARS},
        model::{Batch, CardModel, LogoRef, TagSet},
    },
    foundation::error::{CardError, CardResult},
};

/// In-progress form state.
#[derive(Clone, Debug)]
pub struct CardForm {
    company: String,
    description: String,
    jobs: u32,
    url: String,
    batch: Option<Batch>,
    tags: TagSet,
    logo: Option<LogoRef>,
}

impl Default for CardForm {
    fn default() -> Self {
        Self {
            company: String::new(),
            description: String::new(),
            jobs: defaults::DEFAULT_JOBS,
            url: String::new(),
            batch: None,
            tags: TagSet::new(),
            logo: None,
        }
    }
}

impl CardForm {
    /// Empty form.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the company name.
    pub fn set_company(&mut self, value: &str) {
        self.company = value.to_string();
    }

    /// Replace the description; input beyond the maximum length is dropped.
    pub fn set_description(&mut self, value: &str) {
        self.description = defaults::truncate_chars(value, MAX_DESCRIPTION_CHARS).to_string();
    }

    /// Replace the jobs count from raw text input; blank or invalid input resets to the default.
    pub fn set_jobs_input(&mut self, value: &str) {
        self.jobs = defaults::coerce_jobs(Some(value));
    }

    /// Replace the website URL.
    pub fn set_url(&mut self, value: &str) {
        self.url = value.to_string();
    }

    /// Select a batch from the known set.
    pub fn select_batch(&mut self, value: &str) -> CardResult<()> {
        self.batch = Some(value.parse()?);
        Ok(())
    }

    /// Commit a typed tag (on Enter or `,`). Duplicates and blanks are ignored.
    pub fn commit_tag(&mut self, value: &str) -> bool {
        self.tags.insert(value)
    }

    /// Remove the tag at `idx`.
    pub fn remove_tag(&mut self, idx: usize) -> Option<String> {
        self.tags.remove(idx)
    }

    /// Choose the logo.
    pub fn set_logo(&mut self, logo: LogoRef) {
        self.logo = Some(logo);
    }

    /// Current jobs value.
    pub fn jobs(&self) -> u32 {
        self.jobs
    }

    /// Current tags.
    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    /// Validate required fields and produce the finalized model.
    pub fn submit(&self) -> CardResult<CardModel> {
        let company = self.company.trim();
        if company.is_empty() {
            return Err(CardError::validation("company name is required"));
        }
        let url = self.url.trim();
        if url.is_empty() {
            return Err(CardError::validation("url is required"));
        }
        let batch = self
            .batch
            .ok_or_else(|| CardError::validation("batch is required"))?;
        let logo = self
            .logo
            .clone()
            .ok_or_else(|| CardError::validation("a logo image is required"))?;

        Ok(CardModel::new(company, url, batch)
            .with_logo(logo)
            .with_description(&self.description)
            .with_jobs(self.jobs)
            .with_tags(self.tags.clone()))
    }
}

/// Serialized form answers, as accepted by the `export` command.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FormInput {
    /// Company name.
    pub company: String,
    /// Optional description.
    pub description: String,
    /// Raw jobs input.
    pub jobs: Option<String>,
    /// Website URL.
    pub url: String,
    /// Batch label.
    pub batch: String,
    /// Tags in the order they were typed.
    pub tags: Vec<String>,
    /// Logo image file, relative to the input document.
    pub logo_path: Option<PathBuf>,
}

impl FormInput {
    /// Parse answers from a JSON document.
    pub fn from_json(text: &str) -> CardResult<Self> {
        serde_json::from_str(text).map_err(|e| CardError::serde(format!("form input: {e}")))
    }

    /// Replay the answers into a [`CardForm`], reading the logo relative to `base_dir`.
    pub fn into_form(self, base_dir: &std::path::Path) -> CardResult<CardForm> {
        let mut form = CardForm::new();
        form.set_company(&self.company);
        form.set_description(&self.description);
        if let Some(jobs) = &self.jobs {
            form.set_jobs_input(jobs);
        }
        form.set_url(&self.url);
        if !self.batch.trim().is_empty() {
            form.select_batch(&self.batch)?;
        }
        for tag in &self.tags {
            form.commit_tag(tag);
        }
        if let Some(rel) = &self.logo_path {
            let path = base_dir.join(rel);
            let bytes = std::fs::read(&path)
                .with_context(|| format!("read logo from '{}'", path.display()))?;
            form.set_logo(LogoRef::Bytes(Arc::new(bytes)));
        }
        Ok(form)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/card/form.rs"]
mod tests;
