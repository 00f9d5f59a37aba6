use crate::catalog::{DeploymentOverride, EnvValue};
use crate::manifest::{add_or_update_env, ClusterServiceVersion, EnvVar};

/// Replace the env of the override's container with the override's env vars.
///
/// The container's own env vars are dropped; the addon's deployment config
/// sets them instead. A missing deployment or container leaves the manifest
/// untouched. Returns whether a container was rewritten.
pub fn apply_override(csv: &mut ClusterServiceVersion, ov: &DeploymentOverride) -> bool {
    let target = &ov.deployment;

    let Some(deployment) = csv.find_deployment_mut(&target.name) else {
        log_status!("transform", "Deployment {} not found, skipping env override", target.name);
        return false;
    };
    let Some(container) = deployment.find_container_mut(&target.container.name) else {
        log_status!(
            "transform",
            "Container {} not found in {}, skipping env override",
            target.container.name,
            target.name
        );
        return false;
    };

    let mut env = Vec::with_capacity(target.container.env_vars.len());
    for var in &target.container.env_vars {
        let entry = match var.resolved_value() {
            EnvValue::FieldRef(path) => EnvVar::field_ref(&var.name, path),
            EnvValue::Literal(value) => EnvVar::literal(&var.name, value),
        };
        add_or_update_env(&mut env, entry);
    }
    container.env = env;
    true
}
