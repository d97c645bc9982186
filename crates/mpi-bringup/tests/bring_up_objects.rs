//! Objects produced for a default bring-up, checked through the public API.

use std::net::IpAddr;
use std::net::Ipv4Addr;

use api_types::HOSTSFILE_KEY;
use mpi_bringup::bringup::build_hosts_config;
use mpi_bringup::bringup::BringUpError;
use mpi_bringup::config::BringUpConfig;
use mpi_bringup::k8s::convert::config_map_for;
use mpi_bringup::k8s::convert::deployment_for;
use mpi_bringup::manifest::decode_manifests;
use mpi_bringup::manifest::ManifestObject;
use similar_asserts::assert_eq;

fn discovered() -> Vec<IpAddr> {
    ["10.0.0.5", "10.0.0.6"]
        .iter()
        .map(|ip| ip.parse().unwrap())
        .collect()
}

#[test]
fn hosts_file_lines_follow_discovery_order() {
    let config = BringUpConfig::default();
    let master = config.master_template();
    let addresses = discovered();

    let artifact = build_hosts_config(
        &master.config_name,
        &config.namespace,
        &master.config_labels,
        &addresses,
    )
    .unwrap();

    let lines: Vec<IpAddr> = artifact
        .hostsfile()
        .unwrap()
        .lines()
        .map(|l| l.parse().unwrap())
        .collect();
    assert_eq!(lines, addresses);

    let config_map = config_map_for(&artifact);
    assert_eq!(
        config_map.data.unwrap().get(HOSTSFILE_KEY).map(String::as_str),
        Some("10.0.0.5\n10.0.0.6")
    );
}

#[test]
fn master_deployment_reads_hosts_config() {
    let config = BringUpConfig::default();
    let master = config.master_template();
    let artifact = build_hosts_config(
        &master.config_name,
        &config.namespace,
        &master.config_labels,
        &discovered(),
    )
    .unwrap();

    let spec = master.render(&artifact, config.expected_count(), Some(Ipv4Addr::new(192, 168, 3, 1)));
    let deployment = deployment_for(&spec);

    let pod_spec = deployment.spec.unwrap().template.spec.unwrap();
    let container = &pod_spec.containers[0];
    assert_eq!(
        container.args.clone().unwrap(),
        vec![
            "-np",
            "2",
            "-f",
            "/mnt/hostsfile",
            "-localhost",
            "192.168.3.1",
            "/usr/vasp/bin/vasp"
        ]
    );
    let volume = &pod_spec.volumes.unwrap()[0];
    assert_eq!(
        volume.config_map.as_ref().unwrap().name.as_deref(),
        Some("vasp-config")
    );
    assert_eq!(
        container.volume_mounts.as_ref().unwrap()[0].name,
        volume.name
    );
}

#[test]
fn worker_deployment_round_trips_through_manifest_decoding() {
    let worker = deployment_for(&BringUpConfig::default().worker_spec());
    let yaml = serde_yaml::to_string(&worker).unwrap();

    let objects = decode_manifests(&yaml).unwrap();

    assert_eq!(objects.len(), 1);
    let ManifestObject::Deployment(decoded) = &objects[0] else {
        panic!("expected a deployment, got {}", objects[0].kind());
    };
    assert_eq!(decoded.metadata.name.as_deref(), Some("vasp"));
    assert_eq!(decoded.spec.as_ref().unwrap().replicas, Some(2));
}

#[test]
fn invalid_artifact_name_is_rejected() {
    let err = build_hosts_config("Hosts_File", "default", &Default::default(), &discovered())
        .unwrap_err();

    assert!(matches!(
        err.current_context(),
        BringUpError::Validation { .. }
    ));
}

#[test]
fn partial_config_file_drives_object_names() {
    let config = BringUpConfig::from_yaml(
        r#"
namespace: hpc
workerName: lammps
masterName: lammps-master
configName: lammps-hosts
replicaCount: 3
mountDir: /etc/mpi/
"#,
    )
    .unwrap();
    config.validate().unwrap();

    let worker = deployment_for(&config.worker_spec());
    assert_eq!(worker.metadata.name.as_deref(), Some("lammps"));
    assert_eq!(worker.metadata.namespace.as_deref(), Some("hpc"));
    assert_eq!(worker.spec.unwrap().replicas, Some(3));

    let master = config.master_template();
    assert_eq!(master.hostsfile_path(), "/etc/mpi/hostsfile");
    let artifact = build_hosts_config(
        &master.config_name,
        &config.namespace,
        &master.config_labels,
        &discovered(),
    )
    .unwrap();
    let spec = master.render(&artifact, config.expected_count(), Some(Ipv4Addr::new(10, 1, 0, 1)));
    assert_eq!(spec.volumes[0].config_name, "lammps-hosts");
    assert_eq!(spec.args[..4].to_vec(), vec!["-np", "3", "-f", "/etc/mpi/hostsfile"]);
}
