//! Operator bundle documents touched during promotion: the
//! ClusterServiceVersion (CSV) and the bundle `metadata/annotations.yaml`.
//!
//! Only the fields the promotion edits are typed. Everything else is carried
//! through `extra` so a load/write cycle does not drop content.

use serde::{Deserialize, Serialize};
use serde_yml::Mapping;
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Error, Result};
use crate::utils::io;

pub const SINGLE_NAMESPACE: &str = "SingleNamespace";

pub fn manifest_file_name(addon_name: &str) -> String {
    format!("{}.clusterserviceversion.yaml", addon_name)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterServiceVersion {
    #[serde(rename = "apiVersion", default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub metadata: ObjectMeta,
    pub spec: CsvSpec,
    #[serde(flatten)]
    pub extra: Mapping,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectMeta {
    pub name: String,
    #[serde(flatten)]
    pub extra: Mapping,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replaces: Option<String>,
    #[serde(rename = "installModes", default)]
    pub install_modes: Vec<InstallMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install: Option<InstallStrategy>,
    #[serde(flatten)]
    pub extra: Mapping,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallMode {
    #[serde(rename = "type")]
    pub mode_type: String,
    pub supported: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallStrategy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<StrategyDetails>,
    #[serde(flatten)]
    pub extra: Mapping,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyDetails {
    #[serde(default)]
    pub deployments: Vec<DeploymentSpec>,
    #[serde(flatten)]
    pub extra: Mapping,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentSpec {
    pub name: String,
    #[serde(default)]
    pub spec: DeploymentBody,
    #[serde(flatten)]
    pub extra: Mapping,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeploymentBody {
    #[serde(default)]
    pub template: PodTemplate,
    #[serde(flatten)]
    pub extra: Mapping,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PodTemplate {
    #[serde(default)]
    pub spec: PodSpec,
    #[serde(flatten)]
    pub extra: Mapping,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PodSpec {
    #[serde(default)]
    pub containers: Vec<Container>,
    #[serde(flatten)]
    pub extra: Mapping,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Container {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<EnvVar>,
    #[serde(flatten)]
    pub extra: Mapping,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvVar {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(rename = "valueFrom", default, skip_serializing_if = "Option::is_none")]
    pub value_from: Option<EnvVarSource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvVarSource {
    #[serde(rename = "fieldRef", default, skip_serializing_if = "Option::is_none")]
    pub field_ref: Option<FieldSelector>,
    #[serde(flatten)]
    pub extra: Mapping,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSelector {
    #[serde(rename = "fieldPath")]
    pub field_path: String,
}

impl EnvVar {
    pub fn literal(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            value_from: None,
        }
    }

    pub fn field_ref(name: impl Into<String>, field_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            value_from: Some(EnvVarSource {
                field_ref: Some(FieldSelector {
                    field_path: field_path.into(),
                }),
                extra: Mapping::new(),
            }),
        }
    }
}

/// Replace the entry with the same name in place, or append.
pub fn add_or_update_env(env: &mut Vec<EnvVar>, var: EnvVar) {
    match env.iter_mut().find(|existing| existing.name == var.name) {
        Some(existing) => *existing = var,
        None => env.push(var),
    }
}

impl ClusterServiceVersion {
    pub fn load(path: &Path) -> Result<Self> {
        io::load_yaml(path)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        io::write_yaml(self, path)
    }

    pub fn deployments_mut(&mut self) -> Option<&mut Vec<DeploymentSpec>> {
        self.spec
            .install
            .as_mut()
            .and_then(|install| install.spec.as_mut())
            .map(|details| &mut details.deployments)
    }

    /// First deployment with the given name.
    pub fn find_deployment_mut(&mut self, name: &str) -> Option<&mut DeploymentSpec> {
        self.deployments_mut()?
            .iter_mut()
            .find(|deployment| deployment.name == name)
    }

    /// Mark an install mode as supported. The mode entry must already exist.
    pub fn enable_install_mode(&mut self, mode_type: &str) -> Result<()> {
        let mode = self
            .spec
            .install_modes
            .iter_mut()
            .find(|mode| mode.mode_type == mode_type)
            .ok_or_else(|| Error::install_mode_not_found(mode_type, &self.metadata.name))?;
        mode.supported = true;
        Ok(())
    }
}

impl DeploymentSpec {
    /// First container with the given name.
    pub fn find_container_mut(&mut self, name: &str) -> Option<&mut Container> {
        self.spec
            .template
            .spec
            .containers
            .iter_mut()
            .find(|container| container.name == name)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataAnnotations {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
    #[serde(flatten)]
    pub extra: Mapping,
}

impl MetadataAnnotations {
    pub fn load(path: &Path) -> Result<Self> {
        io::load_yaml(path)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        io::write_yaml(self, path)
    }
}
