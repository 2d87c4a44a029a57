//! Brand configuration: built-in KonexPro defaults plus optional JSON overrides.
//!
//! The deployer works with a single immutable [`BrandConfig`]. Fields left out
//! of a JSON file fall back to the KonexPro defaults, so an override file only
//! needs the values that differ.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use strum::IntoEnumIterator;

use crate::types::Feature;

/// Brand values injected into RapidPro
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BrandConfig {
    pub name: String,
    pub description: String,
    /// Hostnames the brand answers on (`BRAND["hosts"]`)
    pub hosts: Vec<String>,
    /// Public domain, also the base of the CSRF trusted origins
    pub domain: String,
    /// Sender for notification emails
    pub support_email: String,
    /// Canonical footer credit line (may contain inline HTML)
    pub credits: String,
    pub features: Vec<Feature>,
    /// Template expressions repaired when written as `{ { expr } }`
    pub template_tags: Vec<String>,
}

impl Default for BrandConfig {
    fn default() -> Self {
        Self {
            name: "KonexPro".to_string(),
            description: "Pa kite yon mesaj san repons".to_string(),
            hosts: ["lrn2.org", "localhost", "127.0.0.1", "box.lan", "*"]
                .iter()
                .map(|h| h.to_string())
                .collect(),
            domain: "lrn2.org".to_string(),
            support_email: "support@lrn2.org".to_string(),
            credits: "Copyright © 2025 KonexPro. All rights reserved. <br> Powered by RapidPro"
                .to_string(),
            features: Feature::iter().collect(),
            template_tags: vec!["active_org.id".to_string()],
        }
    }
}

impl BrandConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read brand configuration from {:?}", path.as_ref()))?;

        let config: Self =
            serde_json::from_str(&content).context("Failed to parse brand configuration JSON")?;

        Ok(config)
    }

    /// Load from `path` when given, otherwise use the built-in brand.
    /// The result is validated either way.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let single_line = [
            ("Brand name", &self.name),
            ("Description", &self.description),
            ("Domain", &self.domain),
            ("Support email", &self.support_email),
            ("Credits", &self.credits),
        ];
        for (label, value) in single_line {
            if value.contains(['\n', '\r']) {
                anyhow::bail!("{} must be a single line", label);
            }
        }

        if self.name.trim().is_empty() {
            anyhow::bail!("Brand name must be specified");
        }

        let domain = self.domain.trim();
        if domain.is_empty() {
            anyhow::bail!("Domain must be specified");
        }
        if domain.contains(char::is_whitespace) || domain.contains('/') {
            anyhow::bail!("Domain must be a bare hostname, got {:?}", self.domain);
        }

        match self.support_email.split_once('@') {
            Some((local, host)) if !local.is_empty() && !host.is_empty() => {}
            _ => anyhow::bail!("Support email {:?} is not an address", self.support_email),
        }

        if self.hosts.is_empty() {
            anyhow::bail!("At least one host must be listed");
        }
        if self.hosts.iter().any(|h| h.trim().is_empty()) {
            anyhow::bail!("Hosts cannot contain empty entries");
        }

        if self.credits.trim().is_empty() {
            anyhow::bail!("Footer credits must be specified");
        }

        if self.template_tags.iter().any(|t| t.trim().is_empty()) {
            anyhow::bail!("Template tags cannot contain empty entries");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_is_konexpro() {
        let config = BrandConfig::default();
        assert_eq!(config.name, "KonexPro");
        assert_eq!(config.domain, "lrn2.org");
        assert_eq!(config.hosts.len(), 5);
        assert_eq!(config.features.len(), 14);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, r#"{{"name": "Lakay", "domain": "lakay.ht"}}"#).unwrap();
        temp_file.flush().unwrap();

        let loaded = BrandConfig::load_from_file(temp_file.path()).unwrap();
        assert_eq!(loaded.name, "Lakay");
        assert_eq!(loaded.domain, "lakay.ht");
        assert_eq!(loaded.support_email, "support@lrn2.org");
        assert_eq!(loaded.features, BrandConfig::default().features);
    }

    #[test]
    fn test_feature_subset_loaded() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, r#"{{"features": ["flows", "msgs"]}}"#).unwrap();
        temp_file.flush().unwrap();

        let loaded = BrandConfig::load_from_file(temp_file.path()).unwrap();
        assert_eq!(loaded.features, vec![Feature::Flows, Feature::Msgs]);
        assert_eq!(loaded.name, "KonexPro");
    }

    #[test]
    fn test_unknown_feature_rejected() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, r#"{{"features": ["flows", "billing"]}}"#).unwrap();
        temp_file.flush().unwrap();

        assert!(BrandConfig::load_from_file(temp_file.path()).is_err());
    }

    #[test]
    fn test_missing_file_errors() {
        let result = BrandConfig::load_from_file("/nonexistent/brand.json");
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let bad_email = BrandConfig {
            support_email: "support".to_string(),
            ..Default::default()
        };
        assert!(bad_email.validate().is_err());

        let no_hosts = BrandConfig {
            hosts: vec![],
            ..Default::default()
        };
        assert!(no_hosts.validate().is_err());

        let multiline = BrandConfig {
            description: "line one\nline two".to_string(),
            ..Default::default()
        };
        assert!(multiline.validate().is_err());

        let url_domain = BrandConfig {
            domain: "https://lrn2.org".to_string(),
            ..Default::default()
        };
        assert!(url_domain.validate().is_err());
    }

    #[test]
    fn test_load_or_default_without_path() {
        let config = BrandConfig::load_or_default(None).unwrap();
        assert_eq!(config, BrandConfig::default());
    }
}
