//! Node table maintained by the transport.
//!
//! The decoder only ever reads the table, through [`NodeLookup`]. The
//! transport side owns a [`NodeDb`] and updates it as node announcements
//! arrive; readers take one [`NodeSnapshot`] per envelope so a single
//! normalization never observes a half-applied update.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

/// A mesh participant known to the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Node number.
    pub num: u32,
    /// Published textual identifier, e.g. `!a1b2c3d4`.
    pub id: String,
    /// Full display name.
    pub long_name: Option<String>,
    /// Short display name.
    pub short_name: Option<String>,
}

impl NodeRecord {
    /// Create a record without display names.
    pub fn new(num: u32, id: impl Into<String>) -> Self {
        Self {
            num,
            id: id.into(),
            long_name: None,
            short_name: None,
        }
    }

    /// Attach display names.
    pub fn with_names(mut self, long_name: impl Into<String>, short_name: impl Into<String>) -> Self {
        self.long_name = Some(long_name.into());
        self.short_name = Some(short_name.into());
        self
    }
}

/// Read-only access to node records by node number.
pub trait NodeLookup {
    /// Record for `num`, if the node is known.
    fn lookup(&self, num: u32) -> Option<&NodeRecord>;
}

impl NodeLookup for HashMap<u32, NodeRecord> {
    fn lookup(&self, num: u32) -> Option<&NodeRecord> {
        self.get(&num)
    }
}

/// A channel configured on the local device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelInfo {
    /// Channel slot index.
    pub index: u32,
    /// Role name (`PRIMARY`, `SECONDARY`, `DISABLED`).
    pub role: String,
    /// Channel name, empty for the default channel.
    pub name: String,
    /// Pre-shared key, base64.
    pub psk: String,
}

impl ChannelInfo {
    /// Whether the slot is in use.
    pub fn is_enabled(&self) -> bool {
        self.role != "DISABLED"
    }
}

#[derive(Debug, Default)]
struct NodeState {
    nodes: HashMap<u32, NodeRecord>,
    local_id: Option<String>,
    channels: Vec<ChannelInfo>,
}

/// Shared node table, local node identity and channel list.
#[derive(Debug, Default)]
pub struct NodeDb {
    state: RwLock<NodeState>,
}

impl NodeDb {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, NodeState> {
        // A panicked writer leaves a complete map behind; keep serving it.
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, NodeState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Insert or replace a node record.
    pub fn upsert(&self, record: NodeRecord) {
        debug!(num = record.num, id = %record.id, "Node record updated");
        self.write().nodes.insert(record.num, record);
    }

    /// Set the identifier of the node the transport is attached to.
    pub fn set_local_id(&self, id: impl Into<String>) {
        let id = id.into();
        info!(local_id = %id, "Local board id set");
        self.write().local_id = Some(id);
    }

    /// Record a channel. Disabled slots are ignored.
    pub fn add_channel(&self, channel: ChannelInfo) -> bool {
        if !channel.is_enabled() {
            debug!(index = channel.index, "Ignoring disabled channel");
            return false;
        }
        info!(
            index = channel.index,
            role = %channel.role,
            name = %channel.name,
            "Channel configured"
        );
        let mut state = self.write();
        state.channels.retain(|c| c.index != channel.index);
        state.channels.push(channel);
        state.channels.sort_by_key(|c| c.index);
        true
    }

    /// Enabled channels, ordered by index.
    pub fn channels(&self) -> Vec<ChannelInfo> {
        self.read().channels.clone()
    }

    /// Number of known nodes.
    pub fn len(&self) -> usize {
        self.read().nodes.len()
    }

    /// Whether no node is known yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consistent read view, held for the duration of one normalization.
    pub fn snapshot(&self) -> NodeSnapshot<'_> {
        NodeSnapshot { guard: self.read() }
    }
}

/// Read guard over a [`NodeDb`].
pub struct NodeSnapshot<'a> {
    guard: RwLockReadGuard<'a, NodeState>,
}

impl NodeSnapshot<'_> {
    /// Identifier of the local node, once the transport announced it.
    pub fn local_id(&self) -> Option<&str> {
        self.guard.local_id.as_deref()
    }
}

impl NodeLookup for NodeSnapshot<'_> {
    fn lookup(&self, num: u32) -> Option<&NodeRecord> {
        self.guard.nodes.get(&num)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(index: u32, role: &str) -> ChannelInfo {
        ChannelInfo {
            index,
            role: role.into(),
            name: format!("ch{index}"),
            psk: "AQ==".into(),
        }
    }

    #[test]
    fn upsert_replaces_existing_record() {
        let db = NodeDb::new();
        db.upsert(NodeRecord::new(7, "!00000007"));
        db.upsert(NodeRecord::new(7, "!00000007").with_names("Seven", "SVN"));

        assert_eq!(db.len(), 1);
        let snapshot = db.snapshot();
        let record = snapshot.lookup(7).unwrap();
        assert_eq!(record.short_name.as_deref(), Some("SVN"));
        assert!(snapshot.lookup(8).is_none());
    }

    #[test]
    fn snapshot_exposes_local_id() {
        let db = NodeDb::new();
        assert!(db.snapshot().local_id().is_none());
        db.set_local_id("!deadbeef");
        assert_eq!(db.snapshot().local_id(), Some("!deadbeef"));
    }

    #[test]
    fn disabled_channels_are_skipped() {
        let db = NodeDb::new();
        assert!(db.add_channel(channel(1, "SECONDARY")));
        assert!(!db.add_channel(channel(2, "DISABLED")));
        assert!(db.add_channel(channel(0, "PRIMARY")));

        let indexes: Vec<u32> = db.channels().iter().map(|c| c.index).collect();
        assert_eq!(indexes, vec![0, 1]);
    }

    #[test]
    fn hashmap_is_a_lookup() {
        let mut nodes = HashMap::new();
        nodes.insert(3, NodeRecord::new(3, "!custom"));
        assert_eq!(nodes.lookup(3).map(|r| r.id.as_str()), Some("!custom"));
        assert!(nodes.lookup(4).is_none());
    }
}
