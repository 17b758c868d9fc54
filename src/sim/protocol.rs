//! Messages crossing the worker boundary.
//!
//! Both directions are JSON objects tagged by `type`:
//!
//! ```json
//! {"type": "init", "nodes": [{"id": "1", "classification": "main"}], "edges": [], "params": {}}
//! {"type": "updateParams", "params": {"repulsion": 350}}
//! {"type": "positions", "positions": [{"id": "1", "x": 12.5, "y": -3.0}]}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use super::{EdgeSpec, NodePosition, NodeSpec, SimParams, SimParamsPatch};
use crate::graph::NoteGraph;

const INBOUND_KINDS: [&str; 5] = ["init", "start", "stop", "updateParams", "updateNodes"];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Inbound {
    /// Replaces the node set and starts ticking.
    Init {
        #[serde(default)]
        nodes: Vec<NodeSpec>,
        #[serde(default)]
        edges: Vec<EdgeSpec>,
        #[serde(default)]
        params: SimParams,
    },
    Start,
    Stop,
    UpdateParams {
        #[serde(default)]
        params: SimParamsPatch,
    },
    /// Classification changes for nodes already in the simulation.
    UpdateNodes {
        #[serde(default)]
        nodes: Vec<NodeSpec>,
    },
}

impl Inbound {
    /// `init` message carrying a copy of the indexed graph.
    pub fn from_graph(graph: &NoteGraph, params: SimParams) -> Self {
        let nodes = graph
            .nodes
            .iter()
            .map(|node| NodeSpec {
                id: node.id.clone(),
                classification: node.classification,
            })
            .collect();
        let edges = graph
            .edges
            .iter()
            .map(|edge| EdgeSpec {
                from: edge.from.clone(),
                to: edge.to.clone(),
            })
            .collect();

        Self::Init {
            nodes,
            edges,
            params,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Init { .. } => "init",
            Self::Start => "start",
            Self::Stop => "stop",
            Self::UpdateParams { .. } => "updateParams",
            Self::UpdateNodes { .. } => "updateNodes",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Outbound {
    Positions { positions: Vec<NodePosition> },
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("message is not valid JSON")]
    InvalidJson(#[source] serde_json::Error),
    #[error("message has no `type` field")]
    MissingType,
    #[error("unknown message type `{0}`")]
    UnknownType(String),
    #[error("malformed `{kind}` message")]
    Malformed {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Decodes one inbound message.
///
/// A malformed `init` decodes to an empty initialisation so the worker idles
/// instead of keeping a stale layout.
pub fn decode_inbound(raw: &str) -> Result<Inbound, ProtocolError> {
    let value = serde_json::from_str::<Value>(raw).map_err(ProtocolError::InvalidJson)?;
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or(ProtocolError::MissingType)?
        .to_owned();

    if !INBOUND_KINDS.contains(&kind.as_str()) {
        return Err(ProtocolError::UnknownType(kind));
    }

    match serde_json::from_value::<Inbound>(value) {
        Ok(message) => Ok(message),
        Err(error) if kind == "init" => {
            warn!(%error, "malformed init payload, initialising an empty graph");
            Ok(Inbound::Init {
                nodes: Vec::new(),
                edges: Vec::new(),
                params: SimParams::default(),
            })
        }
        Err(source) => Err(ProtocolError::Malformed { kind, source }),
    }
}

pub fn encode_outbound(message: &Outbound) -> serde_json::Result<String> {
    serde_json::to_string(message)
}
