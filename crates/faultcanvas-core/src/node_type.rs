use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Closed set of logic elements a tree node can be. Leaf types terminate a
/// branch; logic gates fan out; the NOT gate is the unary special case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeType {
    AndGate,
    OrGate,
    AtLeastGate,
    NotGate,
    BasicEvent,
    HouseEvent,
    TransferGate,
}

impl NodeType {
    pub const ALL: [NodeType; 7] = [
        NodeType::AndGate,
        NodeType::OrGate,
        NodeType::AtLeastGate,
        NodeType::NotGate,
        NodeType::BasicEvent,
        NodeType::HouseEvent,
        NodeType::TransferGate,
    ];

    /// Basic/house/transfer events terminate a branch and never have
    /// children.
    pub fn is_leaf(self) -> bool {
        matches!(
            self,
            NodeType::BasicEvent | NodeType::HouseEvent | NodeType::TransferGate
        )
    }

    /// And/Or/AtLeast gates; these require at least two children once
    /// committed. Excludes the unary NOT gate.
    pub fn is_logic_gate(self) -> bool {
        matches!(
            self,
            NodeType::AndGate | NodeType::OrGate | NodeType::AtLeastGate
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            NodeType::AndGate => "AND Gate",
            NodeType::OrGate => "OR Gate",
            NodeType::AtLeastGate => "At Least Gate",
            NodeType::NotGate => "NOT Gate",
            NodeType::BasicEvent => "Basic Event",
            NodeType::HouseEvent => "House Event",
            NodeType::TransferGate => "Transfer Gate",
        }
    }

    /// Wire name, identical to the serde representation.
    pub fn wire_name(self) -> &'static str {
        match self {
            NodeType::AndGate => "andGate",
            NodeType::OrGate => "orGate",
            NodeType::AtLeastGate => "atLeastGate",
            NodeType::NotGate => "notGate",
            NodeType::BasicEvent => "basicEvent",
            NodeType::HouseEvent => "houseEvent",
            NodeType::TransferGate => "transferGate",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown node type: {0}")]
pub struct NodeTypeParseError(pub String);

impl FromStr for NodeType {
    type Err = NodeTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "andGate" | "and-gate" | "and" => Ok(NodeType::AndGate),
            "orGate" | "or-gate" | "or" => Ok(NodeType::OrGate),
            "atLeastGate" | "at-least-gate" | "atleast" => Ok(NodeType::AtLeastGate),
            "notGate" | "not-gate" | "not" => Ok(NodeType::NotGate),
            "basicEvent" | "basic-event" | "basic" => Ok(NodeType::BasicEvent),
            "houseEvent" | "house-event" | "house" => Ok(NodeType::HouseEvent),
            "transferGate" | "transfer-gate" | "transfer" => Ok(NodeType::TransferGate),
            other => Err(NodeTypeParseError(other.to_owned())),
        }
    }
}

/// The structurally identical tree diagram variants the editor serves.
/// The original system shipped one near-duplicate editor per variant;
/// here the variant is only a document attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TreeKind {
    #[default]
    FaultTree,
    HeatBalanceFaultTree,
    MasterLogicDiagram,
}

impl fmt::Display for TreeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TreeKind::FaultTree => "faultTree",
            TreeKind::HeatBalanceFaultTree => "heatBalanceFaultTree",
            TreeKind::MasterLogicDiagram => "masterLogicDiagram",
        };
        f.write_str(name)
    }
}

impl FromStr for TreeKind {
    type Err = NodeTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "faultTree" | "fault-tree" => Ok(TreeKind::FaultTree),
            "heatBalanceFaultTree" | "heat-balance-fault-tree" => {
                Ok(TreeKind::HeatBalanceFaultTree)
            }
            "masterLogicDiagram" | "master-logic-diagram" => Ok(TreeKind::MasterLogicDiagram),
            other => Err(NodeTypeParseError(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_is_a_partition() {
        for node_type in NodeType::ALL {
            let special = node_type == NodeType::NotGate;
            assert_eq!(
                node_type.is_leaf() as u8 + node_type.is_logic_gate() as u8 + special as u8,
                1,
                "{node_type} must be exactly one of leaf/logic/NOT"
            );
        }
    }

    #[test]
    fn serde_names_are_camel_case() {
        let json = serde_json::to_string(&NodeType::AtLeastGate).unwrap();
        assert_eq!(json, r#""atLeastGate""#);
        let parsed: NodeType = serde_json::from_str(r#""houseEvent""#).unwrap();
        assert_eq!(parsed, NodeType::HouseEvent);
    }

    #[test]
    fn from_str_accepts_wire_and_kebab_names() {
        for node_type in NodeType::ALL {
            assert_eq!(node_type.wire_name().parse::<NodeType>(), Ok(node_type));
        }
        assert_eq!("not-gate".parse::<NodeType>(), Ok(NodeType::NotGate));
        assert!("gate".parse::<NodeType>().is_err());
    }
}
