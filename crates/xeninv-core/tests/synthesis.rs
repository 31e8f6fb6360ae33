use std::collections::BTreeMap;

use serde_json::{Value, json};

use xeninv_core::compose::KeyedGroup;
use xeninv_core::{Config, CoreError, Record, Snapshot, synthesize};

fn record(value: Value) -> Record {
    value.as_object().unwrap().clone()
}

fn sample_snapshot() -> Snapshot {
    let mut snapshot = Snapshot::default();

    snapshot.pools.insert(
        "p1".to_string(),
        record(json!({ "name_label": "Pool A" })),
    );

    snapshot.hosts.insert(
        "h1".to_string(),
        record(json!({
            "name_label": "Host1",
            "hostname": "h1.local",
            "memory_total": 2048,
            "cpu_count": 4,
            "tags": ["lab"]
        })),
    );

    snapshot.vms.insert(
        "u1".to_string(),
        record(json!({
            "name_label": "vm1",
            "power_state": "Running",
            "memory_static_max": 1024,
            "VCPUs_max": 2,
            "networks": { "0": "eth0" }
        })),
    );
    snapshot.vms.insert(
        "u2".to_string(),
        record(json!({
            "name_label": "vm2",
            "power_state": "Halted",
            "memory_static_max": 512,
            "VCPUs_max": 1,
            "networks": {}
        })),
    );

    snapshot
}

#[test]
fn pool_groups_are_reserved_without_members() {
    let graph = synthesize(&sample_snapshot(), &Config::default()).unwrap();

    let pool_group = graph.group("xo_pool_pool_a").unwrap();
    assert!(pool_group.hosts.is_empty());
    assert!(graph.entry("p1").is_none());
}

#[test]
fn host_entries_join_xo_hosts_and_reserve_label_group() {
    let graph = synthesize(&sample_snapshot(), &Config::default()).unwrap();

    assert!(graph.is_member("xo_hosts", "h1"));
    // The per-host label group exists but the entry is not wired into it.
    let label_group = graph.group("xo_host_host1").unwrap();
    assert!(label_group.hosts.is_empty());

    let vars = &graph.entry("h1").unwrap().vars;
    assert_eq!(vars["uuid"], json!("h1"));
    assert_eq!(vars["hostname"], json!("h1.local"));
    assert_eq!(vars["memory"], json!(2048));
    assert_eq!(vars["cpus"], json!(4));
    assert_eq!(vars["tags"], json!(["lab"]));
}

#[test]
fn host_key_uses_label_when_uuid_mode_is_off() {
    let config = Config {
        use_host_uuid: false,
        ..Config::default()
    };
    let graph = synthesize(&sample_snapshot(), &config).unwrap();

    assert!(graph.entry("Host1").is_some());
    assert!(graph.entry("h1").is_none());
    assert!(graph.is_member("xo_hosts", "Host1"));
}

#[test]
fn vm_entries_split_on_network_presence() {
    let graph = synthesize(&sample_snapshot(), &Config::default()).unwrap();

    assert!(graph.is_member("with_ip", "u1"));
    assert!(!graph.is_member("without_ip", "u1"));
    assert!(graph.is_member("without_ip", "u2"));

    let vars = &graph.entry("u1").unwrap().vars;
    assert_eq!(vars["power_state"], json!("running"));
    assert_eq!(vars["name_label"], json!("vm1"));
    assert_eq!(vars["memory"], json!(1024));
    assert_eq!(vars["cpus"], json!(2));
    assert_eq!(vars["tags"], json!([]));
}

#[test]
fn vm_key_uses_label_when_uuid_mode_is_off() {
    let config = Config {
        use_vm_uuid: false,
        ..Config::default()
    };
    let graph = synthesize(&sample_snapshot(), &config).unwrap();

    assert!(graph.entry("vm1").is_some());
    assert!(graph.entry("u1").is_none());
    assert_eq!(graph.entry("vm1").unwrap().vars["uuid"], json!("u1"));
}

#[test]
fn power_state_groups_stay_empty() {
    // The power_state variable is tracked but membership is not wired up.
    let graph = synthesize(&sample_snapshot(), &Config::default()).unwrap();

    assert!(graph.group("running").unwrap().hosts.is_empty());
    assert!(graph.group("halted").unwrap().hosts.is_empty());
}

#[test]
fn missing_name_label_fails_the_run() {
    let mut snapshot = sample_snapshot();
    snapshot.hosts.insert(
        "h2".to_string(),
        record(json!({ "hostname": "h2.local", "memory_total": 1, "cpu_count": 1 })),
    );

    let err = synthesize(&snapshot, &Config::default()).unwrap_err();
    match err {
        CoreError::MissingAttribute { attribute, object } => {
            assert_eq!(attribute, "name_label");
            assert_eq!(object, "host");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn label_collisions_keep_the_last_record() {
    let mut snapshot = Snapshot::default();
    snapshot.hosts.insert(
        "h1".to_string(),
        record(json!({
            "name_label": "Shared",
            "hostname": "first.local",
            "memory_total": 1,
            "cpu_count": 1
        })),
    );
    snapshot.hosts.insert(
        "h2".to_string(),
        record(json!({
            "name_label": "Shared",
            "hostname": "second.local",
            "memory_total": 2,
            "cpu_count": 2
        })),
    );

    let config = Config {
        use_host_uuid: false,
        ..Config::default()
    };
    let graph = synthesize(&snapshot, &config).unwrap();

    assert_eq!(graph.entries.len(), 1);
    let vars = &graph.entry("Shared").unwrap().vars;
    // Record maps iterate in key order, so h2 writes last.
    assert_eq!(vars["hostname"], json!("second.local"));
    assert_eq!(vars["uuid"], json!("h2"));
}

#[test]
fn composition_runs_after_native_variables() {
    let config = Config {
        composition: xeninv_core::ComposeConfig {
            groups: BTreeMap::from([(
                "active".to_string(),
                "power_state == 'running'".to_string(),
            )]),
            keyed_groups: vec![KeyedGroup {
                key: "power_state".to_string(),
                prefix: "state".to_string(),
                separator: "_".to_string(),
            }],
            compose: BTreeMap::from([("display".to_string(), "name_label".to_string())]),
            strict: false,
        },
        ..Config::default()
    };
    let graph = synthesize(&sample_snapshot(), &config).unwrap();

    assert!(graph.is_member("active", "u1"));
    assert!(!graph.is_member("active", "u2"));
    assert!(graph.is_member("state_running", "u1"));
    assert!(graph.is_member("state_halted", "u2"));
    assert_eq!(graph.entry("u1").unwrap().vars["display"], json!("vm1"));
}

#[test]
fn strict_composition_failure_aborts_the_run() {
    let config = Config {
        composition: xeninv_core::ComposeConfig {
            groups: BTreeMap::from([("broken".to_string(), "no_such_var".to_string())]),
            strict: true,
            ..Default::default()
        },
        ..Config::default()
    };

    let err = synthesize(&sample_snapshot(), &config).unwrap_err();
    assert!(matches!(err, CoreError::Composition(_)));
}
