use std::collections::BTreeMap;
use std::net::IpAddr;

use api_types::ConfigArtifact;
use api_types::HOSTSFILE_KEY;
use error_stack::Report;

use super::types::BringUpError;
use super::validation::ensure_dns_label;

/// Renders worker addresses as a hosts file, one address per line.
///
/// Line order follows `addresses` exactly; consumers index hosts by line.
pub fn render_hostsfile(addresses: &[IpAddr]) -> String {
    addresses
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Wraps the rendered hosts file as a named config artifact.
///
/// The `hostsfile` key is always present, with an empty value when there are
/// no addresses.
pub fn build_hosts_config(
    name: &str,
    namespace: &str,
    labels: &BTreeMap<String, String>,
    addresses: &[IpAddr],
) -> Result<ConfigArtifact, Report<BringUpError>> {
    ensure_dns_label("config name", name)?;
    ensure_dns_label("namespace", namespace)?;

    Ok(ConfigArtifact {
        name: name.to_string(),
        namespace: namespace.to_string(),
        labels: labels.clone(),
        data: BTreeMap::from([(HOSTSFILE_KEY.to_string(), render_hostsfile(addresses))]),
    })
}
