//! Release orchestration: version rules, manifest fan-out, publish planning
//!
//! The flow a release run takes:
//! - `version`: validate the requested version against the core manifest
//! - `manifest`: rewrite versions and cross-references across the tree
//! - `package` + `graph` + `plan`: derive the dependency-ordered publish plan
//! - `publish`: invoke the registry commands
//! - `orchestrator`: the state machine tying the steps together
//!
//! ## Safety
//! - Validation and cycle detection run before any file is touched
//! - Publishing is strictly sequential, dependencies first
//! - Tags use force semantics so a corrective re-run replaces a prior tag

pub mod graph;
pub mod manifest;
pub mod orchestrator;
pub mod package;
pub mod plan;
pub mod publish;
pub mod version;
