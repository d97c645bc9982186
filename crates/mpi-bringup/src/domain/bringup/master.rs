use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use api_types::ConfigArtifact;
use api_types::ConfigVolume;
use api_types::WorkloadSpec;
use api_types::HOSTSFILE_KEY;

/// Replaced with the in-container path of the hosts file.
pub const HOSTSFILE_PLACEHOLDER: &str = "{hostsfile}";
/// Replaced with the expected worker count.
pub const REPLICAS_PLACEHOLDER: &str = "{replicas}";
/// Replaced with the launching host's IPv4 address.
pub const LOCAL_IP_PLACEHOLDER: &str = "{local_ip}";

/// File mode of the projected hosts file.
pub const HOSTSFILE_MODE: i32 = 0o777;

const HOSTSFILE_VOLUME: &str = "hostsfile";

/// Master workload waiting for the hosts config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterTemplate {
    /// Master workload, command and args may contain placeholders
    pub workload: WorkloadSpec,
    /// Name of the hosts config artifact to create and mount
    pub config_name: String,
    /// Labels of the hosts config artifact
    pub config_labels: BTreeMap<String, String>,
    /// Directory the hosts file is mounted into
    pub mount_dir: String,
}

impl MasterTemplate {
    pub fn hostsfile_path(&self) -> String {
        format!("{}/{}", self.mount_dir.trim_end_matches('/'), HOSTSFILE_KEY)
    }

    /// Whether rendering needs the local address.
    pub fn needs_local_address(&self) -> bool {
        self.workload
            .command
            .iter()
            .chain(&self.workload.args)
            .any(|arg| arg.contains(LOCAL_IP_PLACEHOLDER))
    }

    /// Produces the submittable master workload mounting `hosts_config`.
    ///
    /// `{local_ip}` is left untouched when `local_ip` is `None`.
    pub fn render(
        &self,
        hosts_config: &ConfigArtifact,
        replicas: usize,
        local_ip: Option<Ipv4Addr>,
    ) -> WorkloadSpec {
        let hostsfile_path = self.hostsfile_path();
        let replicas = replicas.to_string();
        let local_ip = local_ip.map(|ip| ip.to_string());
        let substitute = |arg: &String| {
            let arg = arg
                .replace(HOSTSFILE_PLACEHOLDER, &hostsfile_path)
                .replace(REPLICAS_PLACEHOLDER, &replicas);
            match &local_ip {
                Some(ip) => arg.replace(LOCAL_IP_PLACEHOLDER, ip),
                None => arg,
            }
        };

        let mut workload = self.workload.clone();
        workload.command = self.workload.command.iter().map(substitute).collect();
        workload.args = self.workload.args.iter().map(substitute).collect();
        workload.volumes.push(ConfigVolume {
            name: HOSTSFILE_VOLUME.to_string(),
            config_name: hosts_config.name.clone(),
            key: HOSTSFILE_KEY.to_string(),
            mode: HOSTSFILE_MODE,
            mount_path: hostsfile_path,
        });
        workload
    }
}
