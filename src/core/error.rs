use thiserror::Error;

use crate::core::types::NodeId;
use crate::factions::archetype::FactionArchetype;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("no archetype config registered for {0:?}")]
    MissingArchetypeConfig(FactionArchetype),

    #[error("no behavior tree registered for {0:?}")]
    MissingBehaviorTree(FactionArchetype),

    #[error("invalid config for {archetype:?}: {reason}")]
    InvalidConfig {
        archetype: FactionArchetype,
        reason: String,
    },

    #[error("behavior tree node {0:?} is reachable from itself")]
    CyclicBehaviorTree(NodeId),

    #[error("behavior tree references unknown node {0:?}")]
    UnknownNode(NodeId),

    #[error("spatial query unavailable: {0}")]
    SpatialUnavailable(String),

    #[error("invalid engine config: {0}")]
    InvalidEngineConfig(String),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
