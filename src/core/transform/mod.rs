//! Release-state transform engine.
//!
//! Given a resolved addon/channel and a version, computes and applies the
//! file-tree mutation in the target repository that registers the release in
//! that channel. Channels form a closed set:
//!
//! - `stage` / `edge` promote the full operator bundle (see `bundle_promotion`)
//! - `stable` promotes the latest staged image set (see `image_set_promotion`)

mod bundle_promotion;
mod identity;
mod image_set_promotion;
mod overrides;

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::catalog::{AddonConfig, ReleaseChannel};
use crate::error::{Error, Result};
use crate::version::Version;

pub use identity::{rewrite_identity, rule_for, IdentityRewrite};
pub use overrides::apply_override;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Promotion {
    Stage,
    Edge,
    Stable,
}

impl Promotion {
    pub fn from_channel_name(name: &str) -> Result<Self> {
        match name {
            "stage" => Ok(Promotion::Stage),
            "edge" => Ok(Promotion::Edge),
            "stable" => Ok(Promotion::Stable),
            other => Err(Error::unsupported_channel(other)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Promotion::Stage => "stage",
            Promotion::Edge => "edge",
            Promotion::Stable => "stable",
        }
    }

    /// Whether this promotion copies bundle sources from the addon repo.
    pub fn needs_bundle_sources(&self) -> bool {
        match self {
            Promotion::Stage | Promotion::Edge => true,
            Promotion::Stable => false,
        }
    }
}

/// What the transform left in the target tree for the assembler to stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum StagedChange {
    /// A bundle directory, staged with a glob over its contents.
    Directory(String),
    /// A single file, staged explicitly.
    File(String),
}

impl StagedChange {
    pub fn path(&self) -> &str {
        match self {
            StagedChange::Directory(path) | StagedChange::File(path) => path,
        }
    }

    /// Pathspec handed to `git add`.
    pub fn pathspec(&self) -> String {
        match self {
            StagedChange::Directory(dir) => format!("{}/*", dir.trim_end_matches('/')),
            StagedChange::File(file) => file.clone(),
        }
    }
}

pub struct TransformContext<'a> {
    pub addon: &'a AddonConfig,
    pub channel: &'a ReleaseChannel,
    pub version: &'a Version,
    /// Checkout of the addon's bundle repo at the release tag. Unused for stable.
    pub bundle_root: Option<&'a Path>,
    /// Root of the target repository working tree.
    pub target_root: &'a Path,
}

impl TransformContext<'_> {
    fn target_path(&self, relative: &str) -> PathBuf {
        self.target_root.join(relative)
    }
}

/// The change a promotion will stage, computed without touching any tree.
pub fn planned_change(channel: &ReleaseChannel, version: &Version) -> Result<StagedChange> {
    Ok(match Promotion::from_channel_name(&channel.name)? {
        Promotion::Stage | Promotion::Edge => {
            StagedChange::Directory(channel.bundle_path(version))
        }
        Promotion::Stable => StagedChange::File(channel.image_set_path(version)),
    })
}

/// Apply the promotion for the context's channel to the target tree.
pub fn transform(ctx: &TransformContext) -> Result<StagedChange> {
    let promotion = Promotion::from_channel_name(&ctx.channel.name)?;
    log_status!(
        "transform",
        "Promoting {} {} to {}",
        ctx.addon.name,
        ctx.version,
        promotion.as_str()
    );

    match promotion {
        Promotion::Stage | Promotion::Edge => bundle_promotion::promote(ctx, promotion),
        Promotion::Stable => image_set_promotion::promote(ctx),
    }
}
