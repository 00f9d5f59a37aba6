//! Addon catalog: the declarative list of addons, their bundle sources and
//! release channels.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::{Error, Result};
use crate::utils::io;
use crate::version::Version;

/// Env vars that are sourced from a pod field instead of a literal value.
pub const FIELD_REF_ENV_VARS: [&str; 2] = ["WATCH_NAMESPACE", "POD_NAME"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddonCatalog {
    #[serde(default)]
    pub addons: Vec<AddonConfig>,
    #[serde(skip)]
    pub source: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddonConfig {
    pub name: String,
    pub bundle: BundleSource,
    #[serde(default)]
    pub channels: Vec<ReleaseChannel>,
    #[serde(default, rename = "override", skip_serializing_if = "Option::is_none")]
    pub deployment_override: Option<DeploymentOverride>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleSource {
    pub repo: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_prefix: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseChannel {
    pub name: String,
    pub directory: String,
    #[serde(default)]
    pub environment: String,
    #[serde(default)]
    pub allow_pre_release: bool,
}

impl ReleaseChannel {
    /// Directory in the target repo holding one sub-directory per bundle version.
    pub fn bundles_directory(&self) -> String {
        format!("addons/{}/main", self.directory)
    }

    /// Destination of one promoted bundle, e.g. `addons/foo/main/1.2.3/`.
    pub fn bundle_path(&self, version: &Version) -> String {
        format!("{}/{}/", self.bundles_directory(), version.base())
    }

    pub fn stage_image_set_directory(&self) -> String {
        format!("addons/{}/addonimagesets/stage", self.directory)
    }

    pub fn image_set_name(&self, version: &Version) -> String {
        format!("{}.v{}", self.directory, version)
    }

    pub fn image_set_path(&self, version: &Version) -> String {
        format!(
            "addons/{}/addonimagesets/{}/{}.yaml",
            self.directory,
            self.environment,
            self.image_set_name(version)
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentOverride {
    pub deployment: DeploymentTarget,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentTarget {
    pub name: String,
    pub container: ContainerTarget,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerTarget {
    pub name: String,
    #[serde(default)]
    pub env_vars: Vec<EnvVarOverride>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvVarOverride {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,
    #[serde(default, rename = "valueFrom", skip_serializing_if = "Option::is_none")]
    pub value_from: Option<OverrideValueSource>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverrideValueSource {
    #[serde(rename = "fieldRef")]
    pub field_ref: OverrideFieldRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverrideFieldRef {
    #[serde(rename = "fieldPath")]
    pub field_path: String,
}

/// Resolved value of an override env var.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvValue {
    Literal(String),
    FieldRef(String),
}

impl EnvVarOverride {
    pub fn requires_field_ref(&self) -> bool {
        FIELD_REF_ENV_VARS.contains(&self.name.as_str())
    }

    pub fn resolved_value(&self) -> EnvValue {
        if self.requires_field_ref() {
            let path = self
                .value_from
                .as_ref()
                .map(|v| v.field_ref.field_path.clone())
                .unwrap_or_default();
            EnvValue::FieldRef(path)
        } else {
            EnvValue::Literal(self.value.clone())
        }
    }
}

/// Load and validate a catalog file.
pub fn load(path: &Path) -> Result<AddonCatalog> {
    let content = io::read_file(path, "read addons config")?;
    let mut catalog = parse(&content, &path.display().to_string())?;
    catalog.source = path.display().to_string();
    log_status!("catalog", "Loaded {} addon(s) from {}", catalog.addons.len(), catalog.source);
    Ok(catalog)
}

pub fn parse(content: &str, source: &str) -> Result<AddonCatalog> {
    let mut catalog: AddonCatalog =
        serde_yml::from_str(content).map_err(|e| Error::config_invalid_yaml(source, e))?;
    catalog.source = source.to_string();
    validate(&catalog)?;
    Ok(catalog)
}

fn validate(catalog: &AddonCatalog) -> Result<()> {
    for addon in &catalog.addons {
        let mut directories = HashSet::new();
        for channel in &addon.channels {
            if channel.directory.trim().is_empty() {
                return Err(Error::config_invalid_value(
                    format!("addons.{}.channels.{}.directory", addon.name, channel.name),
                    None,
                    "channel directory must not be empty",
                ));
            }
            if !directories.insert(channel.directory.as_str()) {
                return Err(Error::config_invalid_value(
                    format!("addons.{}.channels.{}.directory", addon.name, channel.name),
                    Some(channel.directory.clone()),
                    format!(
                        "directory '{}' is shared by more than one channel of addon {}",
                        channel.directory, addon.name
                    ),
                ));
            }
        }

        if let Some(ov) = &addon.deployment_override {
            for env in &ov.deployment.container.env_vars {
                validate_env_override(&addon.name, env)?;
            }
        }
    }
    Ok(())
}

fn validate_env_override(addon: &str, env: &EnvVarOverride) -> Result<()> {
    let key = format!("addons.{}.override.env_vars.{}", addon, env.name);
    let field_path = env
        .value_from
        .as_ref()
        .map(|v| v.field_ref.field_path.as_str());

    match (env.requires_field_ref(), field_path) {
        (true, Some(path)) if !path.is_empty() => Ok(()),
        (true, _) => Err(Error::config_invalid_value(
            key,
            None,
            format!("{} must set valueFrom.fieldRef.fieldPath", env.name),
        )),
        (false, Some(path)) => Err(Error::config_invalid_value(
            key,
            Some(path.to_string()),
            format!(
                "only {} may use a field reference",
                FIELD_REF_ENV_VARS.join(" and ")
            ),
        )),
        (false, None) => Ok(()),
    }
}

impl AddonCatalog {
    pub fn find_addon(&self, name: &str) -> Option<&AddonConfig> {
        self.addons.iter().find(|a| a.name == name)
    }
}

impl AddonConfig {
    pub fn find_channel(&self, name: &str) -> Option<&ReleaseChannel> {
        self.channels.iter().find(|c| c.name == name)
    }

    pub fn tag_prefix(&self) -> Option<&str> {
        self.bundle.tag_prefix.as_deref()
    }
}

/// Resolve an addon and one of its channels by exact name. First match wins.
pub fn resolve<'a>(
    catalog: &'a AddonCatalog,
    addon_name: &str,
    channel_name: &str,
) -> Result<(&'a AddonConfig, &'a ReleaseChannel)> {
    let addon = catalog
        .find_addon(addon_name)
        .ok_or_else(|| Error::addon_not_found(addon_name, &catalog.source))?;

    let channel = addon.find_channel(channel_name).ok_or_else(|| {
        Error::channel_not_found(
            addon_name,
            channel_name,
            addon.channels.iter().map(|c| c.name.clone()).collect(),
        )
    })?;

    Ok((addon, channel))
}
