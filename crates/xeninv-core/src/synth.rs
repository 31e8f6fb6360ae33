//! Inventory synthesis from a XenServer API snapshot

use serde_json::Value;
use tracing::{debug, instrument};

use crate::compose::apply_composition;
use crate::config::Config;
use crate::error::CoreError;
use crate::graph::InventoryGraph;
use crate::naming::{clean_group_name, select_key};
use crate::record::{RecordMap, Snapshot, is_truthy, require, require_str};

/// Group holding every host entry
pub const HOST_GROUP: &str = "xo_hosts";
/// Group reserved for pool-level entries
pub const POOL_GROUP: &str = "xo_pools";

/// VM power states as reported by the XenServer API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerState {
    Running,
    Halted,
    Suspended,
    Paused,
}

impl PowerState {
    /// All power states, in group pre-creation order
    pub const ALL: [PowerState; 4] = [
        PowerState::Running,
        PowerState::Halted,
        PowerState::Suspended,
        PowerState::Paused,
    ];

    /// Lower-cased group name for this state
    #[must_use]
    pub fn group_name(self) -> &'static str {
        match self {
            PowerState::Running => "running",
            PowerState::Halted => "halted",
            PowerState::Suspended => "suspended",
            PowerState::Paused => "paused",
        }
    }
}

/// Build the inventory graph from one API snapshot.
///
/// Creates the base and per-object groups, the host and VM entries with
/// their native variables, then applies user-defined composition rules on
/// top. Power-state groups are pre-created but never populated, and pool
/// groups carry no members; both match the upstream source's behavior.
///
/// # Errors
/// Returns `CoreError::MissingAttribute` when a record lacks a required
/// field, or `CoreError::Composition` when a composition expression fails
/// under strict mode. No partial inventory is produced on error.
#[instrument(skip_all)]
pub fn synthesize(snapshot: &Snapshot, config: &Config) -> Result<InventoryGraph, CoreError> {
    let mut graph = InventoryGraph::new();

    graph.add_group(HOST_GROUP);
    graph.add_group(POOL_GROUP);
    for state in PowerState::ALL {
        graph.add_group(state.group_name());
    }

    add_pools(&mut graph, &snapshot.pools)?;
    add_hosts(&mut graph, &snapshot.hosts, config)?;
    add_vms(&mut graph, &snapshot.vms, config)?;

    // Composition runs last so user expressions can see native variables.
    let keys: Vec<String> = graph.entries.keys().cloned().collect();
    for key in keys {
        apply_composition(&mut graph, &config.composition, &key)?;
    }

    debug!(
        groups = graph.groups.len(),
        entries = graph.entries.len(),
        "synthesis completed"
    );

    Ok(graph)
}

/// Reserve one group per pool; pools never become entries.
fn add_pools(graph: &mut InventoryGraph, pools: &RecordMap) -> Result<(), CoreError> {
    for pool in pools.values() {
        let name_label = require_str(pool, "pool", "name_label")?;
        graph.add_group(format!("xo_pool_{}", clean_group_name(name_label)));
    }
    Ok(())
}

fn add_hosts(graph: &mut InventoryGraph, hosts: &RecordMap, config: &Config) -> Result<(), CoreError> {
    for (uuid, host) in hosts {
        let name_label = require_str(host, "host", "name_label")?;
        let entry_name = select_key(config.use_host_uuid, uuid, name_label);

        graph.add_group(format!("xo_host_{}", clean_group_name(name_label)));
        graph.add_host(entry_name);
        graph.add_child(HOST_GROUP, entry_name);

        graph.set_variable(entry_name, "uuid", Value::String(uuid.clone()));
        graph.set_variable(entry_name, "hostname", require(host, "host", "hostname")?.clone());
        graph.set_variable(entry_name, "memory", require(host, "host", "memory_total")?.clone());
        graph.set_variable(entry_name, "cpus", require(host, "host", "cpu_count")?.clone());
        graph.set_variable(
            entry_name,
            "tags",
            host.get("tags").cloned().unwrap_or_else(|| Value::Array(Vec::new())),
        );
    }
    Ok(())
}

fn add_vms(graph: &mut InventoryGraph, vms: &RecordMap, config: &Config) -> Result<(), CoreError> {
    for (uuid, vm) in vms {
        let name_label = require_str(vm, "VM", "name_label")?;
        let entry_name = select_key(config.use_vm_uuid, uuid, name_label);
        let group = if is_truthy(vm.get("networks")) {
            "with_ip"
        } else {
            "without_ip"
        };

        graph.add_host(entry_name);
        graph.add_group(group);
        graph.add_child(group, entry_name);

        graph.set_variable(entry_name, "uuid", Value::String(uuid.clone()));
        graph.set_variable(
            entry_name,
            "power_state",
            Value::String(require_str(vm, "VM", "power_state")?.to_lowercase()),
        );
        graph.set_variable(entry_name, "name_label", Value::String(name_label.to_string()));
        graph.set_variable(entry_name, "memory", require(vm, "VM", "memory_static_max")?.clone());
        graph.set_variable(entry_name, "cpus", require(vm, "VM", "VCPUs_max")?.clone());
        graph.set_variable(
            entry_name,
            "tags",
            vm.get("tags").cloned().unwrap_or_else(|| Value::Array(Vec::new())),
        );
    }
    Ok(())
}
