//! Corpus registration records
//!
//! Declarative descriptions of the corpora the search platform exposes:
//! identifier, titles, searchable word and structure attributes, and the
//! licensing/provenance block shown on corpus info pages. The schema is
//! fixed by the host platform; these records carry no behavior beyond
//! construction, (de)serialization and registry validation.

use crate::error::MurreError;
use anyhow::{Context, Result};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

fn id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new("^[a-z0-9_]+$").unwrap())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    Url,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayType {
    Hidden,
}

/// Display options for url-typed attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlOpts {
    #[serde(default)]
    pub new_window: bool,
    #[serde(default)]
    pub hide_url: bool,
    #[serde(default)]
    pub in_link_section: bool,
}

/// One searchable attribute as the host platform displays it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeConfig {
    pub label: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub attr_type: Option<AttributeType>,
    #[serde(rename = "displayType", default, skip_serializing_if = "Option::is_none")]
    pub display_type: Option<DisplayType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_opts: Option<UrlOpts>,
}

impl AttributeConfig {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            attr_type: None,
            display_type: None,
            url_opts: None,
        }
    }

    /// An attribute present in the data but not shown in attribute lists.
    pub fn hidden(label: impl Into<String>) -> Self {
        Self {
            display_type: Some(DisplayType::Hidden),
            ..Self::new(label)
        }
    }

    /// An attribute rendered as a link.
    pub fn url(label: impl Into<String>, opts: UrlOpts) -> Self {
        Self {
            attr_type: Some(AttributeType::Url),
            url_opts: Some(opts),
            ..Self::new(label)
        }
    }
}

/// Word-attribute presets shared across corpora.
pub mod attrs {
    use super::AttributeConfig;

    pub fn baseform() -> AttributeConfig {
        AttributeConfig::new("baseform")
    }

    pub fn pos() -> AttributeConfig {
        AttributeConfig::new("pos")
    }

    pub fn msd() -> AttributeConfig {
        AttributeConfig::new("msd")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenceInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl LicenceInfo {
    pub fn cc_by() -> Self {
        Self {
            name: "CC BY".to_string(),
            url: Some("https://creativecommons.org/licenses/by/4.0/".to_string()),
        }
    }

    pub fn cc_by_sa_30() -> Self {
        Self {
            name: "CC BY-SA 3.0".to_string(),
            url: Some("https://creativecommons.org/licenses/by-sa/3.0/".to_string()),
        }
    }

    pub fn cc_by_nd() -> Self {
        Self {
            name: "CC BY-ND".to_string(),
            url: Some("https://creativecommons.org/licenses/by-nd/4.0/".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IprHolder {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Provenance and licensing block of a corpus or corpus folder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_urn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub licence: Option<LicenceInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iprholder: Option<IprHolder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cite_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infopage_url: Option<String>,
}

/// Registration record of a single corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusConfig {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub within: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, AttributeConfig>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub struct_attributes: BTreeMap<String, AttributeConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<CorpusInfo>,
}

impl CorpusConfig {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            context: None,
            within: None,
            attributes: BTreeMap::new(),
            struct_attributes: BTreeMap::new(),
            info: None,
        }
    }
}

/// A named grouping of registered corpora.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusFolder {
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contents: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<CorpusInfo>,
}

/// All corpora registered with the platform, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct CorpusRegistry {
    corpora: BTreeMap<String, CorpusConfig>,
    folders: BTreeMap<String, CorpusFolder>,
}

impl CorpusRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one corpus. Ids are lowercase `[a-z0-9_]+` and unique.
    pub fn register(&mut self, config: CorpusConfig) -> Result<(), MurreError> {
        if !id_pattern().is_match(&config.id) {
            return Err(MurreError::InvalidCorpus(format!(
                "corpus id '{}' must match [a-z0-9_]+",
                config.id
            )));
        }
        if self.corpora.contains_key(&config.id) {
            return Err(MurreError::InvalidCorpus(format!(
                "corpus id '{}' is already registered",
                config.id
            )));
        }

        tracing::debug!(id = %config.id, title = %config.title, "registered corpus");
        self.corpora.insert(config.id.clone(), config);
        Ok(())
    }

    /// Register a folder; every member corpus must already be registered.
    pub fn register_folder(
        &mut self,
        name: impl Into<String>,
        folder: CorpusFolder,
    ) -> Result<(), MurreError> {
        let name = name.into();
        for member in &folder.contents {
            if !self.corpora.contains_key(member) {
                return Err(MurreError::InvalidCorpus(format!(
                    "folder '{}' lists unregistered corpus '{}'",
                    name, member
                )));
            }
        }
        self.folders.insert(name, folder);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&CorpusConfig> {
        self.corpora.get(id)
    }

    pub fn folder(&self, name: &str) -> Option<&CorpusFolder> {
        self.folders.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CorpusConfig> {
        self.corpora.values()
    }

    pub fn folders(&self) -> impl Iterator<Item = (&String, &CorpusFolder)> {
        self.folders.iter()
    }

    pub fn len(&self) -> usize {
        self.corpora.len()
    }

    pub fn is_empty(&self) -> bool {
        self.corpora.is_empty()
    }

    /// Load every `*.json` file in a directory as one corpus record.
    ///
    /// Registration goes through [`CorpusRegistry::register`], so a corrupt
    /// or duplicate record fails the whole load rather than being skipped.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut registry = Self::new();

        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read corpus config directory {:?}", dir))?;

        for entry in entries {
            let path = entry?.path();
            if path.extension().map(|e| e != "json").unwrap_or(true) {
                continue;
            }

            let data = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read corpus config {:?}", path))?;
            let config: CorpusConfig = serde_json::from_str(&data)
                .with_context(|| format!("Failed to parse corpus config {:?}", path))?;
            registry
                .register(config)
                .with_context(|| format!("Failed to register corpus config {:?}", path))?;
        }

        tracing::info!(corpora = registry.len(), "loaded corpus registry");
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn sample_config(id: &str) -> CorpusConfig {
        let mut config = CorpusConfig::new(id, "Test corpus", "A corpus for tests");
        config.context = Some("1 sentence".to_string());
        config.within = Some("sentence".to_string());
        config.attributes.insert("lemma".to_string(), attrs::baseform());
        config.attributes.insert("pos".to_string(), attrs::pos());
        config.attributes.insert("msd".to_string(), attrs::msd());
        config
            .struct_attributes
            .insert("paragraph_id".to_string(), AttributeConfig::hidden("paragraph_id"));
        config
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = CorpusRegistry::new();
        registry.register(sample_config("la_murre")).unwrap();

        assert_eq!(registry.len(), 1);
        let config = registry.get("la_murre").unwrap();
        assert_eq!(config.title, "Test corpus");
        assert!(config.attributes.contains_key("lemma"));
    }

    #[test]
    fn test_register_rejects_bad_ids() {
        let mut registry = CorpusRegistry::new();
        for bad in ["", "La_Murre", "la murre", "la-murre"] {
            let err = registry.register(sample_config(bad)).unwrap_err();
            assert!(matches!(err, MurreError::InvalidCorpus(_)));
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut registry = CorpusRegistry::new();
        registry.register(sample_config("la_murre")).unwrap();
        let err = registry.register(sample_config("la_murre")).unwrap_err();
        assert!(matches!(err, MurreError::InvalidCorpus(_)));
    }

    #[test]
    fn test_folder_members_must_exist() {
        let mut registry = CorpusRegistry::new();
        registry.register(sample_config("la_murre")).unwrap();

        let folder = CorpusFolder {
            title: "Dialect corpora".to_string(),
            description: "Dialect corpora of the archive".to_string(),
            contents: vec!["la_murre".to_string(), "missing".to_string()],
            info: None,
        };
        let err = registry.register_folder("dialects", folder).unwrap_err();
        assert!(matches!(err, MurreError::InvalidCorpus(_)));

        let folder = CorpusFolder {
            title: "Dialect corpora".to_string(),
            description: "Dialect corpora of the archive".to_string(),
            contents: vec!["la_murre".to_string()],
            info: Some(CorpusInfo {
                licence: Some(LicenceInfo::cc_by()),
                ..CorpusInfo::default()
            }),
        };
        registry.register_folder("dialects", folder).unwrap();
        assert!(registry.folder("dialects").is_some());
    }

    #[test]
    fn test_attribute_config_platform_field_names() {
        let json = r#"{
            "label": "oracc_url",
            "type": "url",
            "url_opts": { "new_window": true }
        }"#;
        let attr: AttributeConfig = serde_json::from_str(json).unwrap();
        assert_eq!(attr.attr_type, Some(AttributeType::Url));
        assert!(attr.url_opts.as_ref().unwrap().new_window);
        assert!(!attr.url_opts.as_ref().unwrap().hide_url);

        let hidden: AttributeConfig =
            serde_json::from_str(r#"{ "label": "paragraph_id", "displayType": "hidden" }"#)
                .unwrap();
        assert_eq!(hidden.display_type, Some(DisplayType::Hidden));

        // plain attributes serialize without the optional fields
        let plain = serde_json::to_value(attrs::baseform()).unwrap();
        assert_eq!(plain, serde_json::json!({ "label": "baseform" }));
    }

    #[test]
    fn test_load_dir() {
        let dir = tempfile::tempdir().unwrap();

        let config = sample_config("oracc_adsd");
        fs::write(
            dir.path().join("oracc_adsd.json"),
            serde_json::to_string_pretty(&config).unwrap(),
        )
        .unwrap();

        let mut second = sample_config("oracc_ario");
        second.info = Some(CorpusInfo {
            urn: Some("urn:nbn:fi:lb-2019060602".to_string()),
            licence: Some(LicenceInfo::cc_by_sa_30()),
            iprholder: Some(IprHolder {
                name: "Open Annotated Corpus Project".to_string(),
                url: None,
            }),
            ..CorpusInfo::default()
        });
        fs::write(
            dir.path().join("oracc_ario.json"),
            serde_json::to_string_pretty(&second).unwrap(),
        )
        .unwrap();

        // non-config files are ignored
        fs::write(dir.path().join("notes.txt"), "not a config").unwrap();

        let registry = CorpusRegistry::load_dir(dir.path()).unwrap();
        assert_eq!(registry.len(), 2);
        let info = registry.get("oracc_ario").unwrap().info.as_ref().unwrap();
        assert_eq!(info.licence.as_ref().unwrap().name, "CC BY-SA 3.0");
    }
}
