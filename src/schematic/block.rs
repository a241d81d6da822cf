//! Block identity, state equivalence, and name resolution

use std::collections::HashMap;
use std::fmt;

use crate::core::error::Error;
use crate::core::types::Result;

/// Role a block plays within a clustered-growth family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClusterRole {
    /// Cap variants carry directional sub-state that is irrelevant for
    /// comparison: any cap of the family satisfies any other.
    Cap,
    /// Stem variants of a family are always interchangeable.
    Stem,
}

/// Clustered-growth family membership
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cluster {
    pub family: String,
    pub role: ClusterRole,
}

/// Attributes resolved through the catalog when a key is built
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BlockAttrs {
    pub air: bool,
    pub fluid: bool,
    pub cluster: Option<Cluster>,
}

/// Identifier for a block type plus its comparison-relevant state.
///
/// Equality and hashing are structural (name + sorted state properties +
/// attributes), which is what storage and map keys need. Comparison for
/// "would a builder consider these interchangeable" is [`BlockKey::matches`],
/// which layers the cluster cap/stem rule on top.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlockKey {
    name: String,
    props: Vec<(String, String)>,
    attrs: BlockAttrs,
}

impl BlockKey {
    pub fn new(name: String, mut props: Vec<(String, String)>, attrs: BlockAttrs) -> Self {
        props.sort();
        Self { name, props, attrs }
    }

    /// Namespaced block name, e.g. `core:stone`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sorted state properties
    pub fn props(&self) -> &[(String, String)] {
        &self.props
    }

    pub fn attrs(&self) -> &BlockAttrs {
        &self.attrs
    }

    pub fn is_air(&self) -> bool {
        self.attrs.air
    }

    /// Whether this block is something a builder actually places
    /// (not air and not a fluid)
    pub fn is_placeable(&self) -> bool {
        !self.attrs.air && !self.attrs.fluid
    }

    /// Block-type comparison ignoring state properties
    pub fn same_type(&self, other: &BlockKey) -> bool {
        self.name == other.name
    }

    /// Comparison-equality between an expected and an observed block.
    ///
    /// Exact name+state equality, except: cluster caps of the same family
    /// match regardless of sub-state, and stems of the same family always
    /// match each other.
    pub fn matches(&self, other: &BlockKey) -> bool {
        if self.name == other.name && self.props == other.props {
            return true;
        }
        match (&self.attrs.cluster, &other.attrs.cluster) {
            (Some(a), Some(b)) => a.role == b.role && a.family == b.family,
            _ => false,
        }
    }
}

impl fmt::Display for BlockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.props.is_empty() {
            write!(f, "[")?;
            for (i, (k, v)) in self.props.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{}={}", k, v)?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}

/// Per-name traits the catalog can attach
#[derive(Debug, Clone, Default)]
struct CatalogEntry {
    fluid: bool,
    cluster: Option<Cluster>,
}

/// Name-to-key resolver with namespace defaulting.
///
/// The catalog is injected wherever block names must be interpreted, so
/// the comparison and tally logic can be exercised against a small fake
/// registry instead of a live game client.
#[derive(Debug, Clone)]
pub struct BlockCatalog {
    default_namespace: String,
    entries: HashMap<String, CatalogEntry>,
}

impl BlockCatalog {
    pub fn new(default_namespace: impl Into<String>) -> Self {
        Self {
            default_namespace: default_namespace.into(),
            entries: HashMap::new(),
        }
    }

    /// Mark a block name as a non-placeable fluid
    pub fn register_fluid(&mut self, name: &str) {
        let name = self.qualify(name);
        self.entries.entry(name).or_default().fluid = true;
    }

    /// Mark a block name as a cap or stem variant of a clustered family
    pub fn register_cluster(&mut self, name: &str, family: &str, role: ClusterRole) {
        let name = self.qualify(name);
        self.entries.entry(name).or_default().cluster = Some(Cluster {
            family: family.to_string(),
            role,
        });
    }

    /// The air key for this catalog's namespace. Unloaded world reads and
    /// empty schematic cells resolve to this.
    pub fn air(&self) -> BlockKey {
        BlockKey::new(
            format!("{}:air", self.default_namespace),
            Vec::new(),
            BlockAttrs { air: true, ..Default::default() },
        )
    }

    /// Resolve user input into a key: lowercased, spaces mapped to
    /// underscores, namespace defaulted. Unknown names resolve with
    /// default attributes.
    pub fn resolve(&self, input: &str) -> BlockKey {
        let name = self.qualify(&input.trim().to_lowercase().replace(' ', "_"));
        let attrs = self.classify(&name);
        BlockKey::new(name, Vec::new(), attrs)
    }

    /// Build a key from a palette state string like `vine[facing=north]`
    pub fn key_from_state(&self, state: &str) -> Result<BlockKey> {
        let (name, props) = parse_state(state)?;
        let name = self.qualify(name);
        let attrs = self.classify(&name);
        Ok(BlockKey::new(name, props, attrs))
    }

    fn qualify(&self, name: &str) -> String {
        if name.contains(':') {
            name.to_string()
        } else {
            format!("{}:{}", self.default_namespace, name)
        }
    }

    fn classify(&self, qualified: &str) -> BlockAttrs {
        let air = qualified
            .split(':')
            .next_back()
            .is_some_and(|path| path == "air");
        let entry = self.entries.get(qualified);
        BlockAttrs {
            air,
            fluid: entry.is_some_and(|e| e.fluid),
            cluster: entry.and_then(|e| e.cluster.clone()),
        }
    }
}

impl Default for BlockCatalog {
    fn default() -> Self {
        Self::new("core")
    }
}

/// Split `name[prop=value,...]` into the name and its sorted properties
fn parse_state(state: &str) -> Result<(&str, Vec<(String, String)>)> {
    let state = state.trim();
    let Some(open) = state.find('[') else {
        if state.is_empty() {
            return Err(Error::Decode("empty block state string".to_string()));
        }
        return Ok((state, Vec::new()));
    };

    let name = &state[..open];
    let rest = &state[open + 1..];
    let Some(body) = rest.strip_suffix(']') else {
        return Err(Error::Decode(format!("unterminated block state: {state}")));
    };
    if name.is_empty() {
        return Err(Error::Decode(format!("missing block name in state: {state}")));
    }

    let mut props = Vec::new();
    for pair in body.split(',').filter(|p| !p.is_empty()) {
        let Some((k, v)) = pair.split_once('=') else {
            return Err(Error::Decode(format!("malformed property `{pair}` in state: {state}")));
        };
        props.push((k.trim().to_string(), v.trim().to_string()));
    }
    Ok((name, props))
}
