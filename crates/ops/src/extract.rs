//! Reference extraction from materialized templates
//!
//! Extraction is best-effort per resource: a tracked resource whose code
//! location is missing or malformed contributes nothing and is reported
//! as skipped, it never fails the template.

use serde::Deserialize;
use serde_json::Value;
use stackgc_types::{AccountContext, AssetReference, Resource, Template};

/// A resource kind that ships a bundle through the staging bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedKind {
    pub resource_type: &'static str,
    /// Property holding the `S3Bucket`/`S3Key` pair
    pub location_property: &'static str,
}

pub const TRACKED_KINDS: &[TrackedKind] = &[
    TrackedKind {
        resource_type: "AWS::Lambda::Function",
        location_property: "Code",
    },
    TrackedKind {
        resource_type: "AWS::Lambda::LayerVersion",
        location_property: "Content",
    },
];

/// Placeholder token and the context value it stands for
struct Placeholder {
    token: &'static str,
    resolve: fn(&AccountContext) -> &str,
}

fn account_id(ctx: &AccountContext) -> &str {
    &ctx.account_id
}

fn region(ctx: &AccountContext) -> &str {
    &ctx.region
}

const PLACEHOLDERS: &[Placeholder] = &[
    Placeholder {
        token: "${AWS::AccountId}",
        resolve: account_id,
    },
    Placeholder {
        token: "${AWS::Region}",
        resolve: region,
    },
];

#[derive(Debug, Deserialize)]
struct CodeLocation {
    #[serde(rename = "S3Bucket")]
    bucket: BucketRef,
    #[serde(rename = "S3Key")]
    key: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BucketRef {
    Literal(String),
    Sub {
        #[serde(rename = "Fn::Sub")]
        sub: SubExpression,
    },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SubExpression {
    Template(String),
    /// `[template, { variable: value }]`; the variables are not evaluated
    WithVariables(String, Value),
}

impl BucketRef {
    fn template(&self) -> &str {
        match self {
            Self::Literal(name)
            | Self::Sub {
                sub: SubExpression::Template(name) | SubExpression::WithVariables(name, _),
            } => name,
        }
    }
}

/// A tracked resource that yielded no reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedResource {
    pub logical_id: String,
    pub resource_type: String,
}

/// References found in one template
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub references: Vec<AssetReference>,
    pub skipped: Vec<SkippedResource>,
}

/// Replace every recognized placeholder token in `template`
#[must_use]
pub fn resolve_placeholders(template: &str, ctx: &AccountContext) -> String {
    PLACEHOLDERS
        .iter()
        .fold(template.to_string(), |resolved, placeholder| {
            resolved.replace(placeholder.token, (placeholder.resolve)(ctx))
        })
}

fn reference_for(
    resource: &Resource<'_>,
    kind: &TrackedKind,
    ctx: &AccountContext,
) -> Option<AssetReference> {
    let location = resource.properties?.get(kind.location_property)?;
    let location = CodeLocation::deserialize(location).ok()?;
    let bucket = resolve_placeholders(location.bucket.template(), ctx);
    Some(AssetReference::new(bucket, location.key))
}

/// Collect the asset references declared by `template`.
///
/// Bucket names have their placeholders resolved against `ctx`; object
/// keys are taken verbatim.
#[must_use]
pub fn extract_references(template: &Template, ctx: &AccountContext) -> Extraction {
    let mut extraction = Extraction::default();

    for resource in template.resources() {
        let Some(kind) = TRACKED_KINDS
            .iter()
            .find(|kind| resource.resource_type == Some(kind.resource_type))
        else {
            continue;
        };

        match reference_for(&resource, kind, ctx) {
            Some(reference) => extraction.references.push(reference),
            None => extraction.skipped.push(SkippedResource {
                logical_id: resource.logical_id.to_string(),
                resource_type: kind.resource_type.to_string(),
            }),
        }
    }

    extraction
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> AccountContext {
        AccountContext::new("123456789012", "us-east-1")
    }

    fn template(resources: Value) -> Template {
        serde_json::from_value(json!({ "Resources": resources })).unwrap()
    }

    #[test]
    fn resolves_account_and_region() {
        assert_eq!(
            resolve_placeholders("cdk-${AWS::AccountId}-assets-${AWS::Region}", &ctx()),
            "cdk-123456789012-assets-us-east-1"
        );
    }

    #[test]
    fn replaces_every_occurrence() {
        assert_eq!(
            resolve_placeholders("${AWS::Region}/${AWS::Region}", &ctx()),
            "us-east-1/us-east-1"
        );
        assert_eq!(
            resolve_placeholders("${AWS::Partition}-x", &ctx()),
            "${AWS::Partition}-x"
        );
    }

    #[test]
    fn reads_literal_and_sub_buckets() {
        let template = template(json!({
            "A": { "Type": "AWS::Lambda::Function", "Properties": { "Code": {
                "S3Bucket": "literal-bucket", "S3Key": "a.zip" } } },
            "B": { "Type": "AWS::Lambda::Function", "Properties": { "Code": {
                "S3Bucket": { "Fn::Sub": "cdk-${AWS::AccountId}-assets-${AWS::Region}" },
                "S3Key": "b.zip" } } },
            "C": { "Type": "AWS::Lambda::LayerVersion", "Properties": { "Content": {
                "S3Bucket": { "Fn::Sub": ["cdk-${AWS::AccountId}-${Suffix}", { "Suffix": "x" }] },
                "S3Key": "c.zip" } } }
        }));

        let mut extraction = extract_references(&template, &ctx());
        extraction.references.sort();
        assert_eq!(
            extraction.references,
            vec![
                AssetReference::new("cdk-123456789012-${Suffix}", "c.zip"),
                AssetReference::new("cdk-123456789012-assets-us-east-1", "b.zip"),
                AssetReference::new("literal-bucket", "a.zip"),
            ]
        );
        assert!(extraction.skipped.is_empty());
    }

    #[test]
    fn keys_are_taken_verbatim() {
        let template = template(json!({
            "A": { "Type": "AWS::Lambda::Function", "Properties": { "Code": {
                "S3Bucket": "b", "S3Key": "${AWS::Region}.zip" } } }
        }));
        let extraction = extract_references(&template, &ctx());
        assert_eq!(extraction.references[0].key, "${AWS::Region}.zip");
    }

    #[test]
    fn malformed_locations_are_skipped_not_fatal() {
        let template = template(json!({
            "Inline": { "Type": "AWS::Lambda::Function", "Properties": { "Code": { "ZipFile": "exports.handler = 1" } } },
            "NoProps": { "Type": "AWS::Lambda::Function" },
            "RefBucket": { "Type": "AWS::Lambda::Function", "Properties": { "Code": {
                "S3Bucket": { "Ref": "Bucket" }, "S3Key": "r.zip" } } },
            "NumericKey": { "Type": "AWS::Lambda::Function", "Properties": { "Code": {
                "S3Bucket": "b", "S3Key": 7 } } },
            "Good": { "Type": "AWS::Lambda::Function", "Properties": { "Code": {
                "S3Bucket": "b", "S3Key": "good.zip" } } },
            "Queue": { "Type": "AWS::SQS::Queue", "Properties": { "Code": {
                "S3Bucket": "b", "S3Key": "untracked.zip" } } }
        }));

        let extraction = extract_references(&template, &ctx());
        assert_eq!(extraction.references, vec![AssetReference::new("b", "good.zip")]);
        let mut skipped: Vec<&str> = extraction
            .skipped
            .iter()
            .map(|s| s.logical_id.as_str())
            .collect();
        skipped.sort_unstable();
        assert_eq!(skipped, vec!["Inline", "NoProps", "NumericKey", "RefBucket"]);
    }

    #[test]
    fn yaml_short_form_buckets_resolve() {
        let body = "\
Parameters:
  BootstrapVersion:
    Type: AWS::SSM::Parameter::Value<String>
Resources:
  Topic:
    Type: AWS::SNS::Topic
    Properties:
      TopicName: !Ref AWS::StackName
  Fn:
    Type: AWS::Lambda::Function
    Properties:
      Code:
        S3Bucket: !Sub cdk-${AWS::AccountId}-assets-${AWS::Region}
        S3Key: a.zip
";
        let template = Template::parse(body).unwrap();
        let extraction = extract_references(&template, &ctx());
        assert_eq!(
            extraction.references,
            vec![AssetReference::new("cdk-123456789012-assets-us-east-1", "a.zip")]
        );
        assert!(extraction.skipped.is_empty());
    }
}
