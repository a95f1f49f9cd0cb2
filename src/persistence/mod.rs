//! Persistence module
//!
//! Scene save/load functionality using serde and JSON.

pub mod scene;

pub use scene::{
    load_from_file, save_to_file, ConnectionData, GroupData, ImportReport, NodeData,
    ParameterData, PersistedValue, Scene, SceneError, SCENE_VERSION,
};
