use std::collections::BTreeMap;
use std::path::Path;

use api_types::LabelSelector;
use api_types::WorkloadSpec;
use error_stack::Report;
use serde::Deserialize;
use serde::Serialize;

use crate::domain::bringup::validation::ensure_dns_label;
use crate::domain::bringup::validation::ensure_not_empty;
use crate::domain::bringup::BringUpError;
use crate::domain::bringup::MasterTemplate;
use crate::domain::bringup::PollConfig;

pub const DEFAULT_LABEL_KEY: &str = "qcloud-app";
pub const DEFAULT_NAMESPACE: &str = "default";
pub const DEFAULT_WORKER_NAME: &str = "vasp";
pub const DEFAULT_WORKER_IMAGE: &str = "ccr.ccs.tencentyun.com/xtalpi/vasp:std-ssh";
pub const DEFAULT_MASTER_NAME: &str = "vasp-master";
pub const DEFAULT_MASTER_IMAGE: &str = "ccr.ccs.tencentyun.com/xtalpi/vasp:std";
pub const DEFAULT_CONFIG_NAME: &str = "vasp-config";

/// Settings of one bring-up, as read from the optional YAML config file.
///
/// Missing fields fall back to the defaults of the VASP deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BringUpConfig {
    pub namespace: String,
    /// Label key whose value is the workload name, used for selection
    pub label_key: String,
    pub worker_name: String,
    pub worker_image: String,
    /// Port the workers expose to the master, `None` for no port
    pub worker_ssh_port: Option<u16>,
    /// Worker replicas to request and wait for
    pub replica_count: u32,
    pub master_name: String,
    pub master_image: String,
    pub master_replicas: u32,
    pub master_command: Vec<String>,
    /// May contain `{hostsfile}`, `{replicas}` and `{local_ip}`
    pub master_args: Vec<String>,
    /// Name of the hosts config artifact
    pub config_name: String,
    pub mount_dir: String,
    pub poll: PollConfig,
}

impl Default for BringUpConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            label_key: DEFAULT_LABEL_KEY.to_string(),
            worker_name: DEFAULT_WORKER_NAME.to_string(),
            worker_image: DEFAULT_WORKER_IMAGE.to_string(),
            worker_ssh_port: Some(22),
            replica_count: 2,
            master_name: DEFAULT_MASTER_NAME.to_string(),
            master_image: DEFAULT_MASTER_IMAGE.to_string(),
            master_replicas: 1,
            master_command: vec!["/usr/vasp/bin/mpirun".to_string()],
            master_args: [
                "-np",
                "{replicas}",
                "-f",
                "{hostsfile}",
                "-localhost",
                "{local_ip}",
                "/usr/vasp/bin/vasp",
            ]
            .iter()
            .map(|arg| arg.to_string())
            .collect(),
            config_name: DEFAULT_CONFIG_NAME.to_string(),
            mount_dir: "/mnt".to_string(),
            poll: PollConfig::default(),
        }
    }
}

impl BringUpConfig {
    /// load bring-up settings from a YAML file
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        tracing::info!("Loading bring-up configuration from {:?}", path);
        let yaml_content = tokio::fs::read_to_string(path).await?;
        Self::from_yaml(&yaml_content)
    }

    pub fn from_yaml(yaml: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn validate(&self) -> Result<(), Report<BringUpError>> {
        ensure_dns_label("namespace", &self.namespace)?;
        ensure_not_empty("labelKey", &self.label_key)?;
        ensure_dns_label("workerName", &self.worker_name)?;
        ensure_not_empty("workerImage", &self.worker_image)?;
        ensure_dns_label("masterName", &self.master_name)?;
        ensure_not_empty("masterImage", &self.master_image)?;
        ensure_dns_label("configName", &self.config_name)?;
        if self.worker_name == self.master_name {
            return Err(Report::new(BringUpError::validation(
                "masterName",
                "must differ from workerName so master pods are not counted as workers",
            )));
        }
        if self.replica_count == 0 || i32::try_from(self.replica_count).is_err() {
            return Err(Report::new(BringUpError::validation(
                "replicaCount",
                format!("{} is out of range", self.replica_count),
            )));
        }
        if self.master_replicas == 0 || i32::try_from(self.master_replicas).is_err() {
            return Err(Report::new(BringUpError::validation(
                "masterReplicas",
                format!("{} is out of range", self.master_replicas),
            )));
        }
        if self.poll.max_rounds == 0 {
            return Err(Report::new(BringUpError::validation(
                "poll.maxRounds",
                "must be at least 1",
            )));
        }
        if !self.mount_dir.starts_with('/') {
            return Err(Report::new(BringUpError::validation(
                "mountDir",
                format!("`{}` is not an absolute path", self.mount_dir),
            )));
        }
        Ok(())
    }

    pub fn expected_count(&self) -> usize {
        self.replica_count as usize
    }

    pub fn worker_spec(&self) -> WorkloadSpec {
        WorkloadSpec {
            name: self.worker_name.clone(),
            namespace: self.namespace.clone(),
            labels: LabelSelector::single(&self.label_key, &self.worker_name),
            replicas: self.replica_count,
            image: self.worker_image.clone(),
            command: Vec::new(),
            args: Vec::new(),
            ports: self
                .worker_ssh_port
                .map(|port| vec![("sshd".to_string(), port)])
                .unwrap_or_default(),
            volumes: Vec::new(),
        }
    }

    pub fn master_template(&self) -> MasterTemplate {
        MasterTemplate {
            workload: WorkloadSpec {
                name: self.master_name.clone(),
                namespace: self.namespace.clone(),
                labels: LabelSelector::single(&self.label_key, &self.master_name),
                replicas: self.master_replicas,
                image: self.master_image.clone(),
                command: self.master_command.clone(),
                args: self.master_args.clone(),
                ports: Vec::new(),
                volumes: Vec::new(),
            },
            config_name: self.config_name.clone(),
            config_labels: BTreeMap::from([(self.label_key.clone(), self.master_name.clone())]),
            mount_dir: self.mount_dir.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;

    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(BringUpConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = BringUpConfig::from_yaml(
            r#"
namespace: hpc
replicaCount: 4
workerImage: registry.local/vasp:ssh
poll:
  maxRounds: 20
"#,
        )
        .unwrap();

        assert_eq!(config.namespace, "hpc");
        assert_eq!(config.replica_count, 4);
        assert_eq!(config.worker_image, "registry.local/vasp:ssh");
        assert_eq!(config.poll.max_rounds, 20);
        assert_eq!(config.poll.round_delay_ms, 3000);
        assert_eq!(config.master_image, DEFAULT_MASTER_IMAGE);
        assert_eq!(config.label_key, DEFAULT_LABEL_KEY);
    }

    #[test]
    fn worker_and_master_select_separately() {
        let config = BringUpConfig::default();

        let worker = config.worker_spec();
        let master = config.master_template();

        assert_eq!(worker.labels.to_string(), "qcloud-app=vasp");
        assert_eq!(master.workload.labels.to_string(), "qcloud-app=vasp-master");
        assert_eq!(worker.ports, vec![("sshd".to_string(), 22)]);
        assert_eq!(master.config_name, "vasp-config");
        assert_eq!(master.hostsfile_path(), "/mnt/hostsfile");
        assert!(master.needs_local_address());
    }

    #[test]
    fn rejects_shared_worker_and_master_name() {
        let config = BringUpConfig {
            master_name: DEFAULT_WORKER_NAME.to_string(),
            ..Default::default()
        };

        let err = config.validate().unwrap_err();
        assert!(matches!(
            err.current_context(),
            BringUpError::Validation { field, .. } if field == "masterName"
        ));
    }

    #[test]
    fn rejects_zero_replicas_and_rounds() {
        let zero_replicas = BringUpConfig {
            replica_count: 0,
            ..Default::default()
        };
        assert!(zero_replicas.validate().is_err());

        let mut zero_rounds = BringUpConfig::default();
        zero_rounds.poll.max_rounds = 0;
        assert!(zero_rounds.validate().is_err());
    }

    #[test]
    fn rejects_empty_image() {
        let config = BringUpConfig {
            worker_image: String::new(),
            ..Default::default()
        };

        let err = config.validate().unwrap_err();
        assert!(matches!(
            err.current_context(),
            BringUpError::Validation { field, .. } if field == "workerImage"
        ));
    }

    #[test]
    fn unknown_fields_are_ignored_but_bad_types_fail() {
        assert!(BringUpConfig::from_yaml("replicaCount: many").is_err());
        assert!(BringUpConfig::from_yaml("somethingElse: 1").is_ok());
    }
}
