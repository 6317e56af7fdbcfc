// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource nodes and their declarative specifications

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::domain::invariants::validate_resource_name;
use crate::domain::{ResourceKind, ValidationError};

/// Attribute key under which a node reference is recorded
pub const REF_KEY: &str = "ref";

/// Validated node identifier
///
/// Names are path-like (`BackendApp/Repository`) and unique per graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodeId(String);

impl NodeId {
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        validate_resource_name(&name)?;
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Scope prefix (everything before the last `/`)
    pub fn scope(&self) -> Option<&str> {
        self.0.rsplit_once('/').map(|(scope, _)| scope)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for NodeId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NodeId> for String {
    fn from(value: NodeId) -> Self {
        value.0
    }
}

/// Declaration of a node before it enters a graph
///
/// Dependencies are always explicit. Referencing another node from an
/// attribute ([`NodeSpec::with_ref`]) records the reference *and* the
/// dependency edge, so nothing has to be inferred later.
///
/// # Examples
///
/// ```rust
/// use genai_infra::domain::ResourceKind;
/// use genai_infra::graph::NodeSpec;
///
/// let cluster = NodeSpec::new("Containers/Cluster", ResourceKind::ComputeCluster)
///     .attr("cluster_name", "genai-demo-cluster")
///     .with_ref("vpc", "Networking/Vpc");
///
/// assert_eq!(cluster.dependencies(), ["Networking/Vpc".to_string()]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSpec {
    pub(crate) name: String,
    pub(crate) kind: ResourceKind,
    pub(crate) attributes: BTreeMap<String, Value>,
    pub(crate) depends_on: Vec<String>,
}

impl NodeSpec {
    pub fn new(name: impl Into<String>, kind: ResourceKind) -> Self {
        Self {
            name: name.into(),
            kind,
            attributes: BTreeMap::new(),
            depends_on: Vec::new(),
        }
    }

    /// Set a configuration attribute
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Set an attribute that references another node, recording the edge
    pub fn with_ref(self, key: impl Into<String>, target: impl Into<String>) -> Self {
        let target = target.into();
        let mut reference = serde_json::Map::new();
        reference.insert(REF_KEY.to_string(), Value::String(target.clone()));
        self.attr(key, Value::Object(reference)).depends_on(target)
    }

    /// Declare an ordering dependency
    pub fn depends_on(mut self, target: impl Into<String>) -> Self {
        let target = target.into();
        if !self.depends_on.contains(&target) {
            self.depends_on.push(target);
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn dependencies(&self) -> &[String] {
        &self.depends_on
    }
}

/// A named declarative resource inside a graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceNode {
    pub id: NodeId,
    pub kind: ResourceKind,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub attributes: BTreeMap<String, Value>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub dependencies: Vec<NodeId>,
}

impl ResourceNode {
    pub fn name(&self) -> &str {
        self.id.as_str()
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Node referenced by an attribute set through [`NodeSpec::with_ref`]
    pub fn reference(&self, key: &str) -> Option<&str> {
        self.attributes.get(key)?.get(REF_KEY)?.as_str()
    }

    pub fn depends_on(&self, other: &str) -> bool {
        self.dependencies.iter().any(|dep| dep.as_str() == other)
    }
}
