//! The node registry a host loads at start-up.

use std::collections::HashMap;
use std::sync::Arc;

use crate::linkup::{LinkupNode, LINKUP_NODE};
use crate::ExecutableNode;

/// Maps `node_type` strings to boxed `ExecutableNode` implementations.
pub type NodeRegistry = HashMap<String, Arc<dyn ExecutableNode>>;

/// Every node this crate ships, keyed by node type.
pub fn builtin_registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();
    registry.insert(LINKUP_NODE.to_string(), Arc::new(LinkupNode::new()) as Arc<dyn ExecutableNode>);
    registry
}
