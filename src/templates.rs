use chrono::Utc;

use crate::config::TemplateConfig;
use crate::feed::{rfc3339_local, AttributeValue, FeatureRecord, FeatureTemplates, TemplateError};
use crate::util::build_service_url;

/// Templates rendered straight from feature attributes.
///
/// - title: the configured `title_attribute`, else the feature id
/// - link: a GetFeature URL selecting the feature by id
/// - description: one `name: value` line per attribute
/// - pubDate: the configured `pub_date_attribute`, dates rendered as
///   RFC3339 in the local zone
/// - enclosure: the text of the configured `enclosure_attribute`
#[derive(Debug, Clone)]
pub struct AttributeTemplates {
    config: TemplateConfig,
    base_url: String,
}

impl AttributeTemplates {
    pub fn new(config: TemplateConfig, base_url: &str) -> Self {
        Self {
            config,
            base_url: base_url.to_string(),
        }
    }

    fn required<'f>(feature: &'f FeatureRecord, name: &str) -> Result<&'f AttributeValue, TemplateError> {
        feature
            .attribute(name)
            .ok_or_else(|| TemplateError::MissingAttribute(name.to_string()))
    }
}

impl FeatureTemplates for AttributeTemplates {
    fn title(&self, feature: &FeatureRecord) -> Result<String, TemplateError> {
        match &self.config.title_attribute {
            Some(name) => Ok(Self::required(feature, name)?.to_string()),
            None => Ok(feature.id.clone()),
        }
    }

    fn link(&self, feature: &FeatureRecord) -> Result<String, TemplateError> {
        let url = build_service_url(
            &self.base_url,
            "wfs",
            &[("request", "GetFeature"), ("featureid", feature.id.as_str())],
        )
        .map_err(|e| TemplateError::Render(format!("Cannot build link for {}: {e}", feature.id)))?;
        Ok(url.into())
    }

    fn description(&self, feature: &FeatureRecord) -> Result<String, TemplateError> {
        if feature.attributes.is_empty() {
            return Ok(feature.id.clone());
        }
        let lines: Vec<String> = feature
            .attributes
            .iter()
            .map(|(name, value)| format!("{name}: {value}"))
            .collect();
        Ok(lines.join("\n"))
    }

    fn pub_date(&self, feature: &FeatureRecord) -> Result<String, TemplateError> {
        let Some(name) = &self.config.pub_date_attribute else {
            return Ok(String::new());
        };
        Ok(match feature.attribute(name) {
            Some(AttributeValue::Date(date)) => rfc3339_local(date.with_timezone(&Utc)),
            Some(other) => other.to_string(),
            None => String::new(),
        })
    }

    fn enclosure_block(&self, feature: &FeatureRecord) -> Result<String, TemplateError> {
        let Some(name) = &self.config.enclosure_attribute else {
            return Ok(String::new());
        };
        Ok(feature.attribute(name).map(ToString::to_string).unwrap_or_default())
    }
}
