//! Node number to textual identifier resolution.

use crate::node::NodeLookup;

/// Prefix of textual node identifiers.
pub const NODE_ID_PREFIX: char = '!';

/// Identifier used for a node the table does not know: the prefix followed
/// by eight lowercase, zero-padded hex digits.
pub fn fallback_node_id(num: u32) -> String {
    format!("{NODE_ID_PREFIX}{num:08x}")
}

/// Resolve a node number to its published identifier, falling back to
/// [`fallback_node_id`]. Never fails.
pub fn resolve(num: u32, nodes: &dyn NodeLookup) -> String {
    match nodes.lookup(num) {
        Some(record) => record.id.clone(),
        None => fallback_node_id(num),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeRecord;
    use proptest::prelude::*;
    use std::collections::HashMap;

    #[test]
    fn known_node_uses_published_id() {
        let mut nodes = HashMap::new();
        nodes.insert(0x1234, NodeRecord::new(0x1234, "!cafe1234"));
        assert_eq!(resolve(0x1234, &nodes), "!cafe1234");
    }

    #[test]
    fn unknown_node_uses_padded_hex() {
        let nodes: HashMap<u32, NodeRecord> = HashMap::new();
        assert_eq!(resolve(1, &nodes), "!00000001");
        assert_eq!(resolve(0xDEADBEEF, &nodes), "!deadbeef");
        assert_eq!(resolve(u32::MAX, &nodes), "!ffffffff");
    }

    proptest! {
        #[test]
        fn fallback_is_fixed_width_and_deterministic(num in any::<u32>()) {
            let nodes: HashMap<u32, NodeRecord> = HashMap::new();
            let first = resolve(num, &nodes);
            let second = resolve(num, &nodes);

            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first.len(), 9);
            prop_assert!(first.starts_with(NODE_ID_PREFIX));
            prop_assert!(first[1..].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
            prop_assert_eq!(u32::from_str_radix(&first[1..], 16).unwrap(), num);
        }
    }
}
