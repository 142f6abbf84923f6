use indexmap::IndexMap;

use crate::data::Data;

/// Type tag an option value is checked against.
///
/// Scalars compare by exact kind. [`OptionKind::Sequence`] and
/// [`OptionKind::Mapping`] accept any sequence or mapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub enum OptionKind {
    Str,
    Bool,
    Int,
    Float,
    Sequence,
    Mapping,
    ConfigFile,
}

impl OptionKind {
    /// Returns the kind of a plain data value, `None` for null or omitted nodes.
    pub fn of(data: &Data) -> Option<Self> {
        match data {
            Data::Null | Data::Omitted => None,
            Data::Bool(_) => Some(Self::Bool),
            Data::Int(_) => Some(Self::Int),
            Data::Float(_) => Some(Self::Float),
            Data::String(_) => Some(Self::Str),
            Data::Sequence(_) => Some(Self::Sequence),
            Data::Mapping(_) => Some(Self::Mapping),
        }
    }
}

/// Definition of a single option slot.
///
/// ```
/// use kubragen::option::{OptionDef, OptionKind};
///
/// let def = OptionDef::new([OptionKind::Str]).required().default_value("traefik2");
/// assert!(def.is_required());
/// assert!(def.accepts(OptionKind::Str));
/// assert!(!def.accepts(OptionKind::Int));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OptionDef {
    required: bool,
    default_value: Option<Data>,
    allowed_types: Vec<OptionKind>,
}

impl OptionDef {
    /// An optional slot accepting the given kinds. An empty list accepts anything.
    pub fn new(allowed_types: impl IntoIterator<Item = OptionKind>) -> Self {
        Self {
            allowed_types: allowed_types.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, default_value: impl Into<Data>) -> Self {
        self.default_value = Some(default_value.into());
        self
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn get_default(&self) -> Option<&Data> {
        self.default_value.as_ref()
    }

    pub fn allowed_types(&self) -> &[OptionKind] {
        &self.allowed_types
    }

    pub fn accepts(&self, kind: OptionKind) -> bool {
        self.allowed_types.is_empty() || self.allowed_types.contains(&kind)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SchemaNode {
    Leaf(OptionDef),
    Tree(OptionSchema),
}

/// A tree of option definitions, addressed by dotted paths.
///
/// Every node is either a nested tree or a leaf, so a leaf path can never
/// also be the prefix of another path.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OptionSchema {
    nodes: IndexMap<String, SchemaNode>,
}

impl OptionSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the leaf `name`.
    pub fn leaf(mut self, name: impl Into<String>, def: OptionDef) -> Self {
        self.nodes.insert(name.into(), SchemaNode::Leaf(def));
        self
    }

    /// Adds (or replaces) the subtree `name`.
    pub fn tree(mut self, name: impl Into<String>, tree: Self) -> Self {
        self.nodes.insert(name.into(), SchemaNode::Tree(tree));
        self
    }

    /// Looks up the node at a dotted path.
    pub fn node(&self, path: &str) -> Option<&SchemaNode> {
        let mut segments = path.split('.');
        let mut node = self.nodes.get(segments.next()?)?;
        for segment in segments {
            node = match node {
                SchemaNode::Tree(tree) => tree.nodes.get(segment)?,
                SchemaNode::Leaf(_) => return None,
            };
        }
        Some(node)
    }

    /// Looks up the leaf definition at a dotted path.
    pub fn lookup(&self, path: &str) -> Option<&OptionDef> {
        match self.node(path)? {
            SchemaNode::Leaf(def) => Some(def),
            SchemaNode::Tree(_) => None,
        }
    }

    /// All leaf paths, in definition order.
    pub fn leaf_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        self.collect_leaf_paths("", &mut paths);
        paths
    }

    fn collect_leaf_paths(&self, prefix: &str, paths: &mut Vec<String>) {
        for (name, node) in &self.nodes {
            let path = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{prefix}.{name}")
            };
            match node {
                SchemaNode::Leaf(_) => paths.push(path),
                SchemaNode::Tree(tree) => tree.collect_leaf_paths(&path, paths),
            }
        }
    }
}
