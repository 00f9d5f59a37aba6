//! Identity rewrite for addons that ship an internal edge variant.
//!
//! On the edge channel these addons are published under a separate
//! `<addon>-internal` package, so the CSV name, its `replaces` predecessor and
//! the bundle package/channel annotations are renamed on the way in.

use crate::error::{Error, Result};
use crate::manifest::{ClusterServiceVersion, MetadataAnnotations};

const VERSION_MARKER: &str = ".v";

/// (addon, channel) pairs that get the internal identity.
const INTERNAL_VARIANTS: &[(&str, &str)] = &[("managed-api-service", "edge")];

const REWRITTEN_ANNOTATIONS: [&str; 3] = [
    "operators.operatorframework.io.bundle.package.v1",
    "operators.operatorframework.io.bundle.channels.v1",
    "operators.operatorframework.io.bundle.channel.default.v1",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityRewrite {
    pub addon: String,
    pub internal_name: String,
    pub channel: String,
}

/// Look up the identity rewrite for an addon on a channel, if any.
pub fn rule_for(addon_name: &str, channel_name: &str) -> Option<IdentityRewrite> {
    INTERNAL_VARIANTS
        .iter()
        .find(|(addon, channel)| *addon == addon_name && *channel == channel_name)
        .map(|(addon, channel)| IdentityRewrite {
            addon: addon.to_string(),
            internal_name: format!("{}-internal", addon),
            channel: channel.to_string(),
        })
}

/// Rebuild `<anything>.v<suffix>` as `<internal_name>.v<suffix>`.
///
/// The suffix is the text between the first and second `.v` markers.
pub fn rewrite_identity(field: &str, value: &str, internal_name: &str) -> Result<String> {
    let suffix = value
        .split(VERSION_MARKER)
        .nth(1)
        .ok_or_else(|| Error::malformed_identity(field, value))?;
    Ok(format!("{}{}{}", internal_name, VERSION_MARKER, suffix))
}

impl IdentityRewrite {
    pub fn apply(
        &self,
        csv: &mut ClusterServiceVersion,
        annotations: &mut MetadataAnnotations,
    ) -> Result<()> {
        csv.metadata.name = rewrite_identity("metadata.name", &csv.metadata.name, &self.internal_name)?;

        let replaces = csv.spec.replaces.as_deref().unwrap_or_default();
        csv.spec.replaces = Some(rewrite_identity("spec.replaces", replaces, &self.internal_name)?);

        for key in REWRITTEN_ANNOTATIONS {
            if let Some(value) = annotations.annotations.get_mut(key) {
                if *value == self.addon {
                    *value = self.internal_name.clone();
                }
                if *value == "stable" {
                    *value = self.channel.clone();
                }
            }
        }

        log_status!(
            "transform",
            "Rewrote identity to {} ({})",
            csv.metadata.name,
            self.internal_name
        );
        Ok(())
    }
}
