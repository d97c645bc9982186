//! Decoding of multi-document YAML manifests into a closed set of kinds.

use core::error::Error;

use error_stack::Report;
use error_stack::ResultExt;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::ConfigMap;
use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::api::core::v1::Service;
use serde::Deserialize;

#[derive(Debug, derive_more::Display)]
pub enum ManifestError {
    #[display("Failed to parse manifest document {index}")]
    Parse { index: usize },
    #[display("Document {index} has no kind")]
    MissingKind { index: usize },
}

impl Error for ManifestError {}

/// A decoded manifest object.
#[derive(Debug, Clone)]
pub enum ManifestObject {
    Deployment(Box<Deployment>),
    ConfigMap(Box<ConfigMap>),
    Service(Box<Service>),
    Pod(Box<Pod>),
    /// Any kind outside the supported set, kept undecoded
    Unsupported {
        api_version: Option<String>,
        kind: String,
        name: Option<String>,
    },
}

impl ManifestObject {
    pub fn kind(&self) -> &str {
        match self {
            Self::Deployment(_) => "Deployment",
            Self::ConfigMap(_) => "ConfigMap",
            Self::Service(_) => "Service",
            Self::Pod(_) => "Pod",
            Self::Unsupported { kind, .. } => kind,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Deployment(o) => o.metadata.name.as_deref(),
            Self::ConfigMap(o) => o.metadata.name.as_deref(),
            Self::Service(o) => o.metadata.name.as_deref(),
            Self::Pod(o) => o.metadata.name.as_deref(),
            Self::Unsupported { name, .. } => name.as_deref(),
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported { .. })
    }
}

/// Decodes every non-empty document of `yaml`, in stream order.
pub fn decode_manifests(yaml: &str) -> Result<Vec<ManifestObject>, Report<ManifestError>> {
    let mut objects = Vec::new();
    for (index, document) in serde_yaml::Deserializer::from_str(yaml).enumerate() {
        let value = serde_yaml::Value::deserialize(document)
            .change_context(ManifestError::Parse { index })?;
        if value.is_null() {
            continue;
        }
        objects.push(decode_document(index, value)?);
    }
    Ok(objects)
}

fn decode_document(
    index: usize,
    value: serde_yaml::Value,
) -> Result<ManifestObject, Report<ManifestError>> {
    let Some(kind) = value.get("kind").and_then(|k| k.as_str()).map(str::to_string) else {
        return Err(Report::new(ManifestError::MissingKind { index }));
    };

    let parse = || ManifestError::Parse { index };
    let object = match kind.as_str() {
        "Deployment" => ManifestObject::Deployment(Box::new(
            serde_yaml::from_value(value).change_context_lazy(parse)?,
        )),
        "ConfigMap" => ManifestObject::ConfigMap(Box::new(
            serde_yaml::from_value(value).change_context_lazy(parse)?,
        )),
        "Service" => ManifestObject::Service(Box::new(
            serde_yaml::from_value(value).change_context_lazy(parse)?,
        )),
        "Pod" => ManifestObject::Pod(Box::new(
            serde_yaml::from_value(value).change_context_lazy(parse)?,
        )),
        _ => ManifestObject::Unsupported {
            api_version: value
                .get("apiVersion")
                .and_then(|v| v.as_str())
                .map(str::to_string),
            name: value
                .get("metadata")
                .and_then(|m| m.get("name"))
                .and_then(|n| n.as_str())
                .map(str::to_string),
            kind,
        },
    };
    Ok(object)
}
