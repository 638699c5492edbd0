//! Exported clipper template JSON files
//!
//! A clipper template bundles several template strings (note name, folder path,
//! note body, context and one per property). Each is checked on its own.

use super::processor::FileProcessorError;
use crate::log_error;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClipperTemplate {
    pub schema_version: Option<String>,
    pub name: String,
    pub behavior: Option<String>,
    pub note_name_format: Option<String>,
    pub path: Option<String>,
    pub note_content_format: Option<String>,
    pub properties: Vec<ClipperProperty>,
    pub context: Option<String>,
    pub triggers: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipperProperty {
    pub name: String,
    pub value: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// One template string taken from a clipper template, labelled with where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateField {
    pub field: String,
    pub source: String,
}

impl ClipperTemplate {
    /// Parse clipper template JSON; `path` is only used in the error
    pub fn from_json(json: &str, path: &Path) -> Result<Self, FileProcessorError> {
        serde_json::from_str(json).map_err(|e| {
            let error = FileProcessorError::InvalidTemplateFile {
                path: path.display().to_string(),
                message: e.to_string(),
            };
            log_error!(error.error_code(), "Clipper template JSON could not be parsed",
                "file" => path.display(),
                "line" => e.line(),
                "column" => e.column());
            error
        })
    }

    /// Every template-bearing field in document order; absent fields are skipped
    pub fn template_fields(&self) -> Vec<TemplateField> {
        let mut fields = Vec::new();

        let named = [
            ("noteNameFormat", &self.note_name_format),
            ("path", &self.path),
            ("noteContentFormat", &self.note_content_format),
            ("context", &self.context),
        ];
        for (field, value) in named {
            if let Some(source) = value {
                fields.push(TemplateField {
                    field: field.to_string(),
                    source: source.clone(),
                });
            }
        }

        for property in &self.properties {
            fields.push(TemplateField {
                field: format!("properties.{}", property.name),
                source: property.value.clone(),
            });
        }

        fields
    }

    /// Property names, which templates may reference like variables
    pub fn property_names(&self) -> Vec<String> {
        self.properties
            .iter()
            .map(|p| p.name.trim())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const EXPORTED: &str = r###"{
        "schemaVersion": "0.1.0",
        "name": "Recipe",
        "behavior": "create",
        "noteContentFormat": "## Ingredients\n{{schema:Recipe:recipeIngredient|list}}",
        "properties": [
            {"name": "title", "value": "{{title}}", "type": "text"},
            {"name": "rating", "value": "", "type": "number"}
        ],
        "triggers": ["schema:Recipe"],
        "noteNameFormat": "{{title|safe_name}}",
        "path": "Recipes"
    }"###;

    #[test]
    fn test_parse_exported_template() {
        let template = ClipperTemplate::from_json(EXPORTED, Path::new("recipe.json")).unwrap();

        assert_eq!(template.name, "Recipe");
        assert_eq!(template.behavior.as_deref(), Some("create"));
        assert_eq!(template.triggers, vec!["schema:Recipe"]);
        assert_eq!(template.properties[1].kind.as_deref(), Some("number"));
        assert!(template.context.is_none());
    }

    #[test]
    fn test_template_fields_order_and_labels() {
        let template = ClipperTemplate::from_json(EXPORTED, Path::new("recipe.json")).unwrap();
        let labels: Vec<_> = template
            .template_fields()
            .into_iter()
            .map(|f| f.field)
            .collect();

        assert_eq!(
            labels,
            vec![
                "noteNameFormat",
                "path",
                "noteContentFormat",
                "properties.title",
                "properties.rating"
            ]
        );
    }

    #[test]
    fn test_property_names() {
        let template = ClipperTemplate::from_json(EXPORTED, Path::new("recipe.json")).unwrap();
        assert_eq!(template.property_names(), vec!["title", "rating"]);
    }

    #[test]
    fn test_invalid_json() {
        let err = ClipperTemplate::from_json("{\"name\": ", Path::new("broken.json")).unwrap_err();
        assert_matches!(err, FileProcessorError::InvalidTemplateFile { ref path, .. } if path == "broken.json");
        assert_eq!(err.error_code().as_str(), "E014");
    }

    #[test]
    fn test_missing_fields_default() {
        let template = ClipperTemplate::from_json("{}", Path::new("empty.json")).unwrap();
        assert!(template.template_fields().is_empty());
        assert!(template.property_names().is_empty());
    }
}
