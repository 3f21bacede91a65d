use crate::{
    error::Error,
    joints::{ImportantJoints, JointTable},
    pose::{Frame, PoseSequence},
};
use num_traits::ToPrimitive;
use serde::Serialize;
use std::fmt;
use tracing::{debug, trace};

pub const DEFAULT_PER_JOINT_THRESHOLD: f32 = 0.05;

/// Distance between the user's and the reference landmark for one joint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct JointDeviation {
    pub joint: usize,
    pub deviation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Issue {
    /// A joint at or above the per-joint threshold in one frame.
    Deviation {
        frame_index: usize,
        joint_index: usize,
        joint_name: String,
        deviation: f64,
    },
    /// No comparison could be made at all.
    Diagnostic { message: String },
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deviation {
                frame_index,
                joint_name,
                deviation,
                ..
            } => write!(
                f,
                "{} needs adjustment in frame {} (deviation {:.3})",
                joint_name,
                frame_index + 1,
                deviation
            ),
            Self::Diagnostic { message } => f.write_str(message),
        }
    }
}

/// Outcome of one comparison. `final_score` is percent similarity: 100 means
/// every important joint of every compared frame was within threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub final_score: f64,
    pub issues: Vec<Issue>,
    pub frame_scores: Vec<f64>,
}

impl ComparisonResult {
    fn no_pose(message: String) -> Self {
        Self {
            final_score: 0.0,
            issues: vec![Issue::Diagnostic { message }],
            frame_scores: vec![],
        }
    }

    pub fn frames_compared(&self) -> usize {
        self.frame_scores.len()
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Deviation issues grouped by frame, in frame order. Diagnostics are skipped.
    pub fn issues_by_frame(&self) -> Vec<(usize, Vec<&Issue>)> {
        let mut grouped: Vec<(usize, Vec<&Issue>)> = vec![];
        for issue in &self.issues {
            if let Issue::Deviation { frame_index, .. } = *issue {
                match grouped.last_mut() {
                    Some((last, issues)) if *last == frame_index => {
                        issues.push(issue);
                        continue;
                    }
                    _ => {}
                }
                grouped.push((frame_index, vec![issue]));
            }
        }
        grouped
    }
}

/// Scores a user's pose sequence against a reference one.
///
/// Frames are paired positionally and only the first `min(user, ideal)` frames
/// are scored; trailing frames of the longer sequence are ignored. Each
/// important joint under `per_joint_threshold` earns one point, so a frame
/// scores `passed / important * 100` and the final score is the mean frame
/// score.
#[derive(Debug, Clone)]
pub struct Comparator {
    joint_table: JointTable,
    important_joints: ImportantJoints,
    per_joint_threshold: f32,
}

pub(crate) fn validate_threshold(threshold: f32) -> Result<f32, Error> {
    if threshold.is_finite() && threshold > 0.0 {
        Ok(threshold)
    } else {
        Err(Error::InvalidThreshold(threshold))
    }
}

impl Comparator {
    pub fn new(
        joint_table: JointTable,
        important_joints: ImportantJoints,
        per_joint_threshold: f32,
    ) -> Result<Self, Error> {
        if important_joints.is_empty() {
            return Err(Error::EmptyImportantJoints);
        }
        Ok(Self {
            joint_table,
            important_joints,
            per_joint_threshold: validate_threshold(per_joint_threshold)?,
        })
    }

    /// BlazePose layout, cricket joint subset, default threshold.
    pub fn mediapipe() -> Result<Self, Error> {
        Self::new(
            JointTable::mediapipe()?,
            ImportantJoints::cricket()?,
            DEFAULT_PER_JOINT_THRESHOLD,
        )
    }

    pub fn joint_table(&self) -> &JointTable {
        &self.joint_table
    }

    pub fn important_joints(&self) -> &ImportantJoints {
        &self.important_joints
    }

    pub fn per_joint_threshold(&self) -> f32 {
        self.per_joint_threshold
    }

    pub fn compare(
        &self,
        user: &PoseSequence,
        ideal: &PoseSequence,
    ) -> Result<ComparisonResult, Error> {
        if let Some(message) = no_pose_message(user, ideal) {
            debug!(
                user_frames = user.len(),
                ideal_frames = ideal.len(),
                "skipping comparison"
            );
            return Ok(ComparisonResult::no_pose(message));
        }

        let frame_count = user.len().min(ideal.len());
        let important = self
            .important_joints
            .len()
            .to_f64()
            .ok_or(Error::ConvertToF64)?;

        let mut issues = vec![];
        let mut frame_scores = Vec::with_capacity(frame_count);

        for (frame_index, (user_frame, ideal_frame)) in
            user.frames().iter().zip(ideal.frames()).enumerate()
        {
            let deviations = self
                .deviations(user_frame, ideal_frame)
                .map_err(|e| e.in_frame(frame_index))?;

            let mut passed = 0_usize;
            for JointDeviation { joint, deviation } in deviations {
                if deviation < f64::from(self.per_joint_threshold) {
                    passed += 1;
                } else {
                    issues.push(Issue::Deviation {
                        frame_index,
                        joint_index: joint,
                        joint_name: self.joint_table.name(joint).into_owned(),
                        deviation,
                    });
                }
            }

            let frame_score = passed.to_f64().ok_or(Error::ConvertToF64)? / important * 100.0;
            trace!(
                frame_index = frame_index,
                passed = passed,
                frame_score = frame_score,
                "scored frame"
            );
            frame_scores.push(frame_score);
        }

        let mean = frame_scores.iter().sum::<f64>()
            / frame_count.to_f64().ok_or(Error::ConvertToF64)?;
        let final_score = mean.max(0.0).min(100.0);

        debug!(
            frames = frame_count,
            user_frames = user.len(),
            ideal_frames = ideal.len(),
            issues = issues.len(),
            final_score = final_score,
            "compared pose sequences"
        );

        Ok(ComparisonResult {
            final_score,
            issues,
            frame_scores,
        })
    }

    /// Per important joint distances for one pair of frames, in joint order.
    pub fn joint_deviations(
        &self,
        user: &Frame,
        ideal: &Frame,
    ) -> Result<Vec<JointDeviation>, Error> {
        self.deviations(user, ideal).map_err(|e| e.in_frame(0))
    }

    fn deviations(&self, user: &Frame, ideal: &Frame) -> Result<Vec<JointDeviation>, FrameError> {
        self.important_joints
            .iter()
            .map(|joint| {
                let a = user.get(joint).ok_or(FrameError::Missing("user", joint))?;
                let b = ideal.get(joint).ok_or(FrameError::Missing("ideal", joint))?;
                let deviation = a
                    .distance(b)
                    .map_err(|_| FrameError::Dims(joint, a.dims(), b.dims()))?;
                if !deviation.is_finite() {
                    return Err(FrameError::NonFinite(joint));
                }
                Ok(JointDeviation { joint, deviation })
            })
            .collect()
    }
}

/// A per-joint failure that has not yet been tagged with its frame.
enum FrameError {
    Missing(&'static str, usize),
    Dims(usize, usize, usize),
    NonFinite(usize),
}

impl FrameError {
    fn in_frame(self, frame: usize) -> Error {
        match self {
            Self::Missing(side, joint) => Error::MissingJoint { side, frame, joint },
            Self::Dims(joint, user, ideal) => Error::FrameDimensionalityMismatch {
                frame,
                joint,
                user,
                ideal,
            },
            Self::NonFinite(joint) => Error::NonFiniteDistance { frame, joint },
        }
    }
}

fn no_pose_message(user: &PoseSequence, ideal: &PoseSequence) -> Option<String> {
    let side = match (user.is_empty(), ideal.is_empty()) {
        (false, false) => return None,
        (true, false) => "user video",
        (false, true) => "reference video",
        (true, true) => "user or reference video",
    };
    Some(format!("no pose detected in {}", side))
}
