//! Top-level stack assembly and output aggregation.
//!
//! Build order is the dependency order from the overview: leaf resources
//! first, then the sibling subsystems, then the composite backend, and
//! finally the named outputs the external reporting step consumes.

use latchkey_compose::{Manifest, Scope};
use latchkey_core::DeployConfig;
use tracing::info;

use crate::backend::CompositeBackend;
use crate::error::BackendResult;
use crate::leaf::LeafResources;
use crate::siblings::Siblings;

/// Compose the full deployment and freeze it into a manifest.
pub fn synthesize(config: &DeployConfig) -> BackendResult<Manifest> {
    let mut scope = Scope::new(&config.deployment.name);

    let leaf = LeafResources::provision(&mut scope, config)?;
    let siblings = Siblings::provision(&mut scope)?;
    let backend = CompositeBackend::new(&mut scope, config, &leaf, &siblings)?;
    aggregate_outputs(&mut scope, &leaf, &siblings, &backend)?;

    info!(deployment = %config.deployment.name, "stack composed");
    Ok(scope.synth())
}

/// The fixed output set: URLs, function names, log groups, role ARNs,
/// and the sibling state-machine ARNs.
fn aggregate_outputs(
    scope: &mut Scope,
    leaf: &LeafResources,
    siblings: &Siblings,
    backend: &CompositeBackend,
) -> BackendResult<()> {
    scope.set_output("ApiUrl", &backend.api_url())?;
    scope.set_output("WebhookUrl", &backend.webhook_url())?;
    scope.set_output("TableName", &leaf.table.name)?;
    scope.set_output("EventSource", &leaf.channel.source_tag)?;

    for unit in backend.units() {
        let title = pascal_case(&unit.key);
        scope.set_output(&format!("{title}FunctionName"), &unit.name)?;
        scope.set_output(&format!("{title}LogGroup"), &unit.log_group())?;
        scope.set_output(&format!("{title}RoleArn"), &unit.role_arn().render())?;
    }

    scope.set_output(
        "RequestMachineArn",
        &siblings.access_handler.request_machine_arn().render(),
    )?;
    scope.set_output(
        "ApprovalMachineArn",
        &siblings.access_handler.approval_machine_arn().render(),
    )?;
    scope.set_output(
        "GrantMachineArn",
        &siblings.granter.grant_machine_arn().render(),
    )?;
    scope.set_output(
        "RevokeMachineArn",
        &siblings.granter.revoke_machine_arn().render(),
    )?;
    Ok(())
}

fn pascal_case(key: &str) -> String {
    key.split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}
