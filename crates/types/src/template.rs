//! Materialized stack template
//!
//! Only the two top-level sections the reconciler cares about are modelled.
//! Resources are kept as raw JSON values so a single malformed resource
//! cannot make the whole template unreadable; callers decode the parts they
//! need per resource.
//!
//! YAML bodies may use the short-form intrinsic tags (`!Sub`, `!Ref`,
//! `!GetAtt`, ...). They are rewritten to their long form before the body
//! is read, so both spellings look the same to callers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_yml::value::TaggedValue;
use serde_yml::{Mapping, Value as YamlValue};

/// Parsed template document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Template {
    #[serde(default)]
    pub parameters: Map<String, Value>,
    #[serde(default)]
    pub resources: Map<String, Value>,
}

/// Borrowed view of one entry of the `Resources` section
#[derive(Debug, Clone, Copy)]
pub struct Resource<'a> {
    pub logical_id: &'a str,
    pub resource_type: Option<&'a str>,
    pub properties: Option<&'a Value>,
}

impl Template {
    /// Parse a template body.
    ///
    /// JSON is tried first, then YAML. An empty body or a body that is
    /// neither yields `None`; an unreadable template is never an error.
    #[must_use]
    pub fn parse(body: &str) -> Option<Self> {
        if body.trim().is_empty() {
            return None;
        }

        serde_json::from_str(body)
            .ok()
            .or_else(|| Self::from_yaml(body))
    }

    fn from_yaml(body: &str) -> Option<Self> {
        let document: YamlValue = serde_yml::from_str(body).ok()?;
        let document = serde_json::to_value(long_form(document)).ok()?;
        serde_json::from_value(document).ok()
    }

    /// Whether the template declares a parameter with this name
    #[must_use]
    pub fn has_parameter(&self, name: &str) -> bool {
        self.parameters.contains_key(name)
    }

    /// Iterate the resources section
    pub fn resources(&self) -> impl Iterator<Item = Resource<'_>> {
        self.resources.iter().map(|(logical_id, value)| Resource {
            logical_id,
            resource_type: value.get("Type").and_then(Value::as_str),
            properties: value.get("Properties"),
        })
    }
}

/// Rewrite short-form intrinsic tags into their long-form mappings.
///
/// `!Ref` and `!Condition` keep their bare name; every other tag becomes
/// `Fn::<Name>`. A dotted `!GetAtt` string is split into its
/// `[resource, attribute]` pair.
fn long_form(value: YamlValue) -> YamlValue {
    match value {
        YamlValue::Tagged(tagged) => {
            let TaggedValue { tag, value } = *tagged;
            let tag = tag.to_string();
            let name = tag.trim_start_matches('!');
            let key = match name {
                "Ref" | "Condition" => name.to_string(),
                _ => format!("Fn::{name}"),
            };
            let argument = match (name, long_form(value)) {
                ("GetAtt", YamlValue::String(path)) => match path.split_once('.') {
                    Some((resource, attribute)) => YamlValue::Sequence(vec![
                        YamlValue::String(resource.to_string()),
                        YamlValue::String(attribute.to_string()),
                    ]),
                    None => YamlValue::String(path),
                },
                (_, argument) => argument,
            };
            let mut mapping = Mapping::new();
            mapping.insert(YamlValue::String(key), argument);
            YamlValue::Mapping(mapping)
        }
        YamlValue::Sequence(items) => {
            YamlValue::Sequence(items.into_iter().map(long_form).collect())
        }
        YamlValue::Mapping(entries) => YamlValue::Mapping(
            entries
                .into_iter()
                .map(|(key, value)| (key, long_form(value)))
                .collect(),
        ),
        other => other,
    }
}
