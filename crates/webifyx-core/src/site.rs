//! Site records: the unit exchanged with storage.

use crate::element::Element;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Site-wide style settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStyles {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_color: Option<String>,
}

/// The editable content of a site.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteContent {
    /// Top-level elements in document order.
    #[serde(default)]
    pub elements: Vec<Element>,
    #[serde(default)]
    pub global_styles: GlobalStyles,
}

/// A site as stored by the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub id: String,
    pub name: String,
    pub subdomain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_domain: Option<String>,
    #[serde(default)]
    pub content: SiteContent,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_url: Option<String>,
    #[serde(default)]
    pub user_id: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
    /// Bumped by storage on every accepted save.
    #[serde(default)]
    pub version: u64,
}

impl Site {
    /// Create an empty, unpublished site.
    pub fn new(id: impl Into<String>, name: impl Into<String>, subdomain: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            subdomain: subdomain.into(),
            custom_domain: None,
            content: SiteContent::default(),
            is_published: false,
            published_url: None,
            user_id: String::new(),
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    /// Replace the element list.
    pub fn with_elements(mut self, elements: Vec<Element>) -> Self {
        self.content.elements = elements;
        self
    }

    /// Serialize the site to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a site from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementKind;

    #[test]
    fn test_site_json_uses_camel_case() {
        let mut site = Site::new("site-1", "My Portfolio", "portfolio.webifyx.com")
            .with_elements(vec![Element::with_id("text-1", ElementKind::Text)]);
        site.content.global_styles.primary_color = Some("#3b82f6".to_string());

        let json: serde_json::Value = serde_json::from_str(&site.to_json().unwrap()).unwrap();
        assert_eq!(json["isPublished"], false);
        assert_eq!(json["content"]["globalStyles"]["primaryColor"], "#3b82f6");
        assert_eq!(json["content"]["elements"][0]["id"], "text-1");
        assert!(json.get("customDomain").is_none());
    }

    #[test]
    fn test_site_from_minimal_json() {
        let site = Site::from_json(
            r#"{ "id": "site-2", "name": "Blog", "subdomain": "blog.webifyx.com" }"#,
        )
        .unwrap();
        assert!(site.content.elements.is_empty());
        assert_eq!(site.version, 0);
        assert!(!site.is_published);
    }
}
