//! Score a recorded cricket technique against a reference one from body
//! landmarks extracted per video frame.
//!
//! The library is pure: it takes already-extracted [`PoseSequence`]s and never
//! decodes video, runs a detector or touches the filesystem.

pub mod body_part;
pub mod compare;
pub mod config;
pub mod error;
pub mod joints;
pub mod pose;

pub use crate::body_part::{aggregate, Aggregator, BodyPartMap, PartDeviation, PartReport};
pub use crate::compare::{Comparator, ComparisonResult, Issue, JointDeviation};
pub use crate::config::Config;
pub use crate::error::Error;
pub use crate::joints::{ImportantJoints, JointTable};
pub use crate::pose::{Frame, JointKind, Landmark, PoseSequence};
