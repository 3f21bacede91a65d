use crate::{
    body_part::{Aggregator, BodyPartMap, DEFAULT_REPORTING_THRESHOLD},
    compare::{Comparator, DEFAULT_PER_JOINT_THRESHOLD},
    error::Error,
    joints::{ImportantJoints, JointTable},
};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Scoring settings, usually read from a TOML file.
///
/// ```toml
/// per_joint_threshold = 0.08
/// reporting_threshold = 0.04
/// include_feet = true
///
/// [body_parts]
/// elbow = [13, 14]
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_per_joint_threshold")]
    pub per_joint_threshold: f32,
    #[serde(default = "default_reporting_threshold")]
    pub reporting_threshold: f32,
    #[serde(default)]
    pub include_feet: bool,
    /// Replaces the default cricket joint subset when set.
    #[serde(default)]
    pub important_joints: Option<Vec<usize>>,
    /// Added to, or replacing entries of, the default body part map.
    #[serde(default)]
    pub body_parts: BTreeMap<String, Vec<usize>>,
}

fn default_per_joint_threshold() -> f32 {
    DEFAULT_PER_JOINT_THRESHOLD
}

fn default_reporting_threshold() -> f32 {
    DEFAULT_REPORTING_THRESHOLD
}

impl Default for Config {
    fn default() -> Self {
        Self {
            per_joint_threshold: default_per_joint_threshold(),
            reporting_threshold: default_reporting_threshold(),
            include_feet: false,
            important_joints: None,
            body_parts: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self, Error> {
        toml::from_str(content).map_err(Error::ParseConfig)
    }

    pub fn important_joints(&self) -> Result<ImportantJoints, Error> {
        let joints = match &self.important_joints {
            Some(joints) => ImportantJoints::new(joints.iter().copied()),
            None => ImportantJoints::cricket()?,
        };
        if self.include_feet {
            joints.with_feet()
        } else {
            Ok(joints)
        }
    }

    pub fn body_part_map(&self) -> Result<BodyPartMap, Error> {
        let mut map = BodyPartMap::cricket()?;
        for (part, joints) in &self.body_parts {
            map.insert(part.as_str(), joints.clone());
        }
        Ok(map)
    }

    pub fn comparator(&self) -> Result<Comparator, Error> {
        Comparator::new(
            JointTable::mediapipe()?,
            self.important_joints()?,
            self.per_joint_threshold,
        )
    }

    pub fn aggregator(&self) -> Result<Aggregator, Error> {
        Aggregator::new(self.body_part_map()?, self.reporting_threshold)
    }
}
