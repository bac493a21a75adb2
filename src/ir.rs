use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GraphError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeKind {
    Objective,
    Outcome,
}

impl NodeKind {
    pub fn from_is_objective(is_objective: bool) -> Self {
        if is_objective {
            Self::Objective
        } else {
            Self::Outcome
        }
    }

    pub fn is_objective(self) -> bool {
        self == Self::Objective
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "objective" | "obj" => Some(Self::Objective),
            "outcome" | "out" => Some(Self::Outcome),
            _ => None,
        }
    }

    /// Short tag used in log lines.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Objective => "OBJ",
            Self::Outcome => "OUT",
        }
    }
}

/// Node identity. Ids are only unique within a kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey {
    pub kind: NodeKind,
    pub id: String,
}

impl NodeKey {
    pub fn new(kind: NodeKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    pub fn objective(id: impl Into<String>) -> Self {
        Self::new(NodeKind::Objective, id)
    }

    pub fn outcome(id: impl Into<String>) -> Self {
        Self::new(NodeKind::Outcome, id)
    }

    pub fn is_objective(&self) -> bool {
        self.kind.is_objective()
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.kind {
            NodeKind::Objective => "objective",
            NodeKind::Outcome => "outcome",
        };
        write!(f, "{prefix}:{}", self.id)
    }
}

impl FromStr for NodeKey {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s
            .split_once(':')
            .ok_or_else(|| GraphError::InvalidNodeKey(s.to_string()))?;
        let kind = NodeKind::from_token(kind.trim().to_ascii_lowercase().as_str())
            .ok_or_else(|| GraphError::InvalidNodeKey(s.to_string()))?;
        let id = id.trim();
        if id.is_empty() {
            return Err(GraphError::InvalidNodeKey(s.to_string()));
        }
        Ok(Self::new(kind, id))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ObjectiveRecord {
    pub id: String,
    pub unique_name: String,
    pub display_name: String,
    pub type_name: String,
    pub hidden: bool,
    pub outcome_count: usize,
    pub layer: usize,
    pub row: usize,
    pub faction_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OutcomeRecord {
    pub id: String,
    pub unique_name: String,
    pub type_name: String,
    pub used_by_count: usize,
    pub layer: usize,
    pub row: usize,
}

/// Directed edge of the model graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRecord {
    pub from_id: String,
    pub from_is_objective: bool,
    pub to_id: String,
    pub to_is_objective: bool,
}

impl LinkRecord {
    pub fn new(from: &NodeKey, to: &NodeKey) -> Self {
        Self {
            from_id: from.id.clone(),
            from_is_objective: from.is_objective(),
            to_id: to.id.clone(),
            to_is_objective: to.is_objective(),
        }
    }

    pub fn from_key(&self) -> NodeKey {
        NodeKey::new(NodeKind::from_is_objective(self.from_is_objective), &self.from_id)
    }

    pub fn to_key(&self) -> NodeKey {
        NodeKey::new(NodeKind::from_is_objective(self.to_is_objective), &self.to_id)
    }

    pub fn starts_at(&self, key: &NodeKey) -> bool {
        self.from_is_objective == key.is_objective() && self.from_id == key.id
    }

    pub fn ends_at(&self, key: &NodeKey) -> bool {
        self.to_is_objective == key.is_objective() && self.to_id == key.id
    }

    pub fn touches(&self, key: &NodeKey) -> bool {
        self.starts_at(key) || self.ends_at(key)
    }
}

/// Unit of input and output for a full rebuild.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraphSnapshot {
    pub objectives: Vec<ObjectiveRecord>,
    pub outcomes: Vec<OutcomeRecord>,
    pub links: Vec<LinkRecord>,
}

impl GraphSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(input: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn to_json_pretty(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn ensure_objective(&mut self, id: &str) -> &mut ObjectiveRecord {
        let idx = match self.objectives.iter().position(|o| o.id == id) {
            Some(idx) => idx,
            None => {
                self.objectives.push(ObjectiveRecord {
                    id: id.to_string(),
                    unique_name: id.to_string(),
                    ..Default::default()
                });
                self.objectives.len() - 1
            }
        };
        &mut self.objectives[idx]
    }

    pub fn ensure_outcome(&mut self, id: &str) -> &mut OutcomeRecord {
        let idx = match self.outcomes.iter().position(|o| o.id == id) {
            Some(idx) => idx,
            None => {
                self.outcomes.push(OutcomeRecord {
                    id: id.to_string(),
                    unique_name: id.to_string(),
                    ..Default::default()
                });
                self.outcomes.len() - 1
            }
        };
        &mut self.outcomes[idx]
    }

    pub fn push_link(&mut self, from: &NodeKey, to: &NodeKey) {
        self.links.push(LinkRecord::new(from, to));
    }

    pub fn contains(&self, key: &NodeKey) -> bool {
        match key.kind {
            NodeKind::Objective => self.objectives.iter().any(|o| o.id == key.id),
            NodeKind::Outcome => self.outcomes.iter().any(|o| o.id == key.id),
        }
    }

    pub fn has_link(&self, from: &NodeKey, to: &NodeKey) -> bool {
        self.links.iter().any(|l| l.starts_at(from) && l.ends_at(to))
    }

    /// Kind-erased records, objectives first, in snapshot order.
    pub fn node_records(&self) -> Vec<NodeRecord> {
        let mut out = Vec::with_capacity(self.objectives.len() + self.outcomes.len());
        out.extend(self.objectives.iter().map(NodeRecord::from_objective));
        out.extend(self.outcomes.iter().map(NodeRecord::from_outcome));
        out
    }

    pub fn node(&self, key: &NodeKey) -> Option<NodeRecord> {
        match key.kind {
            NodeKind::Objective => self
                .objectives
                .iter()
                .find(|o| o.id == key.id)
                .map(NodeRecord::from_objective),
            NodeKind::Outcome => self
                .outcomes
                .iter()
                .find(|o| o.id == key.id)
                .map(NodeRecord::from_outcome),
        }
    }
}

/// A placed node, independent of its kind.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    pub key: NodeKey,
    pub layer: usize,
    pub row: usize,
    pub title: String,
    pub subtitle: String,
    pub hidden: bool,
    pub unattached: bool,
    pub faction: Option<String>,
}

impl NodeRecord {
    pub fn from_objective(o: &ObjectiveRecord) -> Self {
        let subtitle = if o.display_name.is_empty() {
            o.unique_name.clone()
        } else {
            format!("{} [{}]", o.display_name, o.unique_name)
        };
        let faction = o
            .faction_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);
        Self {
            key: NodeKey::objective(&o.id),
            layer: o.layer,
            row: o.row,
            title: o.type_name.clone(),
            subtitle,
            hidden: o.hidden,
            unattached: false,
            faction,
        }
    }

    pub fn from_outcome(o: &OutcomeRecord) -> Self {
        Self {
            key: NodeKey::outcome(&o.id),
            layer: o.layer,
            row: o.row,
            title: o.type_name.clone(),
            subtitle: o.unique_name.clone(),
            hidden: false,
            unattached: o.used_by_count == 0,
            faction: None,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.key.kind
    }
}
