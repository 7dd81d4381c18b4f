//! In-memory catalog of already-fetched templates

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::{mapref::entry::Entry, DashMap};
use serde::{Deserialize, Serialize};

use super::types::{MessageTemplate, TemplateError, TemplateResult, TemplateStatus};

/// Catalog key: templates are unique per name and language
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TemplateKey {
    pub name: String,
    pub language: String,
}

impl TemplateKey {
    pub fn new(name: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            language: language.into(),
        }
    }

    fn of(template: &MessageTemplate) -> Self {
        Self::new(template.name.clone(), template.language.clone())
    }
}

impl std::fmt::Display for TemplateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.language)
    }
}

/// A catalog entry
#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    pub template: MessageTemplate,
    pub loaded_at: DateTime<Utc>,
}

/// Short summary of a template for selection lists
#[derive(Debug, Clone, Serialize)]
pub struct TemplateOption {
    pub name: String,
    pub language: String,
    pub category: String,
    pub status: TemplateStatus,
    pub description: String,
}

impl From<&MessageTemplate> for TemplateOption {
    fn from(template: &MessageTemplate) -> Self {
        let category = template.category.as_str();
        TemplateOption {
            name: template.name.clone(),
            language: template.language.clone(),
            category: category.to_string(),
            status: template.status,
            description: format!("{} - {}", template.language, category),
        }
    }
}

/// Outcome of loading a listing response
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadSummary {
    pub loaded: usize,
    /// Entries that did not parse or did not fit in the catalog
    pub skipped: usize,
}

/// In-memory template catalog
pub struct TemplateCatalog {
    templates: DashMap<TemplateKey, CatalogEntry>,
    /// Keys held or reserved; only changed under the key's shard lock
    size: AtomicUsize,
    max_templates: usize,
}

impl Default for TemplateCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TEMPLATES)
    }
}

/// Default catalog capacity
pub const DEFAULT_MAX_TEMPLATES: usize = 10_000;

impl TemplateCatalog {
    /// Create a new catalog holding at most `max_templates` templates
    pub fn new(max_templates: usize) -> Self {
        Self {
            templates: DashMap::new(),
            size: AtomicUsize::new(0),
            max_templates,
        }
    }

    /// Insert or replace a template
    pub fn upsert(&self, template: MessageTemplate) -> TemplateResult<CatalogEntry> {
        let entry = CatalogEntry {
            loaded_at: Utc::now(),
            template,
        };

        match self.templates.entry(TemplateKey::of(&entry.template)) {
            Entry::Occupied(mut occupied) => {
                occupied.insert(entry.clone());
            }
            Entry::Vacant(vacant) => {
                self.reserve()?;
                vacant.insert(entry.clone());
            }
        }

        Ok(entry)
    }

    /// Claim room for one new key
    fn reserve(&self) -> TemplateResult<()> {
        self.size
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |size| {
                (size < self.max_templates).then_some(size + 1)
            })
            .map(|_| ())
            .map_err(|_| TemplateError::CatalogFull(self.max_templates))
    }

    /// Load every template of a listing response.
    ///
    /// Accepts `{"data": {"data": [...]}}` as well as `{"data": [...]}`.
    /// Entries that do not parse as templates, and new templates arriving
    /// once the catalog is full, are skipped.
    pub fn load_listing(&self, listing: &serde_json::Value) -> TemplateResult<LoadSummary> {
        let entries = listing_entries(listing)?;
        let mut summary = LoadSummary::default();

        for entry in entries {
            let loaded = MessageTemplate::from_value(entry.clone())
                .and_then(|template| self.upsert(template));
            match loaded {
                Ok(_) => summary.loaded += 1,
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping template listing entry");
                    summary.skipped += 1;
                }
            }
        }

        tracing::info!(
            loaded = summary.loaded,
            skipped = summary.skipped,
            total = self.count(),
            "Template listing loaded"
        );

        Ok(summary)
    }

    /// Get a template by name and language
    pub fn get(&self, name: &str, language: &str) -> TemplateResult<MessageTemplate> {
        let key = TemplateKey::new(name, language);
        self.templates
            .get(&key)
            .map(|entry| entry.template.clone())
            .ok_or_else(|| TemplateError::NotFound(key.to_string()))
    }

    /// List all templates sorted by name, then language
    pub fn list(&self) -> Vec<MessageTemplate> {
        let mut entries: Vec<(TemplateKey, MessageTemplate)> = self
            .templates
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().template.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries.into_iter().map(|(_, template)| template).collect()
    }

    /// Selection-list summaries in [`list`](Self::list) order
    pub fn options(&self) -> Vec<TemplateOption> {
        self.list().iter().map(TemplateOption::from).collect()
    }

    /// Remove a template
    pub fn remove(&self, name: &str, language: &str) -> TemplateResult<()> {
        let key = TemplateKey::new(name, language);
        match self.templates.remove(&key) {
            Some(_) => {
                self.size.fetch_sub(1, Ordering::AcqRel);
                Ok(())
            }
            None => Err(TemplateError::NotFound(key.to_string())),
        }
    }

    /// Check if a template exists
    pub fn exists(&self, name: &str, language: &str) -> bool {
        self.templates.contains_key(&TemplateKey::new(name, language))
    }

    /// Get the number of templates
    pub fn count(&self) -> usize {
        self.templates.len()
    }
}

fn listing_entries(listing: &serde_json::Value) -> TemplateResult<&Vec<serde_json::Value>> {
    let data = listing
        .get("data")
        .ok_or_else(|| TemplateError::InvalidListing("missing `data` field".to_string()))?;

    match data {
        serde_json::Value::Array(entries) => Ok(entries),
        serde_json::Value::Object(_) => match data.get("data") {
            Some(serde_json::Value::Array(entries)) => Ok(entries),
            _ => Err(TemplateError::InvalidListing(
                "`data.data` must be an array".to_string(),
            )),
        },
        _ => Err(TemplateError::InvalidListing(
            "`data` must be an array or an object".to_string(),
        )),
    }
}

/// Create an Arc-wrapped template catalog
pub fn create_template_catalog(max_templates: usize) -> Arc<TemplateCatalog> {
    Arc::new(TemplateCatalog::new(max_templates))
}
