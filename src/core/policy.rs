//! Release policy gate.

use crate::catalog::ReleaseChannel;
use crate::error::{Error, Result};
use crate::version::Version;

/// Reject pre-release versions on channels that don't accept them.
pub fn check_allowed(version: &Version, channel: &ReleaseChannel) -> Result<()> {
    if version.is_pre_release() && !channel.allow_pre_release {
        return Err(Error::pre_release_not_allowed(
            version.to_string(),
            &channel.name,
        ));
    }
    Ok(())
}
