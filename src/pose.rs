use crate::error::Error;
use num_traits::{FromPrimitive, ToPrimitive};
use ordered_float::NotNan;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

/// BlazePose landmark layout, in the order the detector emits them.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, num_derive::FromPrimitive, num_derive::ToPrimitive,
)]
pub enum JointKind {
    Nose,
    LeftEyeInner,
    LeftEye,
    LeftEyeOuter,
    RightEyeInner,
    RightEye,
    RightEyeOuter,
    LeftEar,
    RightEar,
    MouthLeft,
    MouthRight,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftPinky,
    RightPinky,
    LeftIndex,
    RightIndex,
    LeftThumb,
    RightThumb,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
    LeftHeel,
    RightHeel,
    LeftFootIndex,
    RightFootIndex,
}

pub const NUM_JOINTS: usize = 33;

impl JointKind {
    pub fn idx(self) -> Result<usize, Error> {
        self.to_usize().ok_or(Error::JointVariantToUSize(self))
    }

    pub fn from_idx(idx: usize) -> Result<Self, Error> {
        Self::from_usize(idx).ok_or(Error::ConvertUSizeToJointKind(idx))
    }

    pub fn name(self) -> &'static str {
        use JointKind::*;

        match self {
            Nose => "Nose",
            LeftEyeInner => "Left Eye Inner",
            LeftEye => "Left Eye",
            LeftEyeOuter => "Left Eye Outer",
            RightEyeInner => "Right Eye Inner",
            RightEye => "Right Eye",
            RightEyeOuter => "Right Eye Outer",
            LeftEar => "Left Ear",
            RightEar => "Right Ear",
            MouthLeft => "Mouth Left",
            MouthRight => "Mouth Right",
            LeftShoulder => "Left Shoulder",
            RightShoulder => "Right Shoulder",
            LeftElbow => "Left Elbow",
            RightElbow => "Right Elbow",
            LeftWrist => "Left Wrist",
            RightWrist => "Right Wrist",
            LeftPinky => "Left Pinky",
            RightPinky => "Right Pinky",
            LeftIndex => "Left Index",
            RightIndex => "Right Index",
            LeftThumb => "Left Thumb",
            RightThumb => "Right Thumb",
            LeftHip => "Left Hip",
            RightHip => "Right Hip",
            LeftKnee => "Left Knee",
            RightKnee => "Right Knee",
            LeftAnkle => "Left Ankle",
            RightAnkle => "Right Ankle",
            LeftHeel => "Left Heel",
            RightHeel => "Right Heel",
            LeftFootIndex => "Left Foot Index",
            RightFootIndex => "Right Foot Index",
        }
    }
}

fn not_nan(value: f32) -> Result<f32, Error> {
    Ok(NotNan::new(value)
        .map_err(|e| Error::ConstructNotNan(e, value))?
        .into_inner())
}

/// A normalized joint coordinate. `z` is present only for 3D detectors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f32>", into = "Vec<f32>")]
pub struct Landmark {
    x: f32,
    y: f32,
    z: Option<f32>,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Result<Self, Error> {
        Ok(Self {
            x: not_nan(x)?,
            y: not_nan(y)?,
            z: None,
        })
    }

    pub fn new_3d(x: f32, y: f32, z: f32) -> Result<Self, Error> {
        Ok(Self {
            x: not_nan(x)?,
            y: not_nan(y)?,
            z: Some(not_nan(z)?),
        })
    }

    #[inline]
    pub fn x(self) -> f32 {
        self.x
    }

    #[inline]
    pub fn y(self) -> f32 {
        self.y
    }

    #[inline]
    pub fn z(self) -> Option<f32> {
        self.z
    }

    /// Number of coordinate components, 2 or 3.
    pub fn dims(self) -> usize {
        if self.z.is_some() {
            3
        } else {
            2
        }
    }

    /// Euclidean distance to `other`. Both landmarks must share dimensionality.
    ///
    /// Computed in f64, so any pair of finite landmarks has a finite distance.
    pub fn distance(self, other: Self) -> Result<f64, Error> {
        let dz = match (self.z, other.z) {
            (Some(a), Some(b)) => f64::from(a) - f64::from(b),
            (None, None) => 0.0,
            _ => return Err(Error::DimensionalityMismatch(self.dims(), other.dims())),
        };
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        Ok(dx.hypot(dy).hypot(dz))
    }
}

impl TryFrom<Vec<f32>> for Landmark {
    type Error = Error;

    fn try_from(coords: Vec<f32>) -> Result<Self, Self::Error> {
        match coords.as_slice() {
            &[x, y] => Self::new(x, y),
            &[x, y, z] => Self::new_3d(x, y, z),
            other => Err(Error::LandmarkArity(other.len())),
        }
    }
}

impl From<Landmark> for Vec<f32> {
    fn from(landmark: Landmark) -> Self {
        let mut coords = vec![landmark.x, landmark.y];
        coords.extend(landmark.z);
        coords
    }
}

/// Landmarks of one detected body, indexed by joint index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Frame {
    landmarks: Vec<Landmark>,
}

impl Frame {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks }
    }

    pub fn get(&self, joint: usize) -> Option<Landmark> {
        self.landmarks.get(joint).copied()
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }
}

/// Frames of one video in playback order. Frames without a detected body are
/// absent rather than present and empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoseSequence {
    frames: Vec<Frame>,
}

impl PoseSequence {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self { frames }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn first(&self) -> Option<&Frame> {
        self.frames.first()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }
}

impl From<Frame> for PoseSequence {
    fn from(frame: Frame) -> Self {
        Self::new(vec![frame])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod joint_kind_tests {
        use super::{JointKind, NUM_JOINTS};

        #[test]
        fn index_round_trip_covers_layout() {
            for idx in 0..NUM_JOINTS {
                assert_eq!(JointKind::from_idx(idx).unwrap().idx().unwrap(), idx);
            }
            assert!(JointKind::from_idx(NUM_JOINTS).is_err());
        }

        #[test]
        fn elbow_indices() {
            assert_eq!(JointKind::LeftElbow.idx().unwrap(), 13);
            assert_eq!(JointKind::RightElbow.idx().unwrap(), 14);
            assert_eq!(JointKind::RightFootIndex.idx().unwrap(), 32);
            assert_eq!(JointKind::LeftElbow.name(), "Left Elbow");
        }
    }

    mod landmark_tests {
        use super::Landmark;
        use assert_approx_eq::assert_approx_eq;
        use std::convert::TryFrom;

        #[test]
        fn rejects_nan() {
            assert!(Landmark::new(f32::NAN, 0.5).is_err());
            assert!(Landmark::new_3d(0.5, 0.5, f32::NAN).is_err());
        }

        #[test]
        fn planar_distance() {
            let a = Landmark::new(0.5, 0.5).unwrap();
            let b = Landmark::new(0.5, 0.6).unwrap();
            assert_approx_eq!(a.distance(b).unwrap(), 0.1);
            assert_approx_eq!(b.distance(a).unwrap(), 0.1);
        }

        #[test]
        fn spatial_distance() {
            let a = Landmark::new_3d(0.0, 0.0, 0.0).unwrap();
            let b = Landmark::new_3d(0.3, 0.0, 0.4).unwrap();
            assert_approx_eq!(a.distance(b).unwrap(), 0.5);
        }

        #[test]
        fn extreme_finite_coordinates() {
            let a = Landmark::new_3d(f32::MAX, -f32::MAX, f32::MAX).unwrap();
            let b = Landmark::new_3d(-f32::MAX, f32::MAX, -f32::MAX).unwrap();
            let distance = a.distance(b).unwrap();
            assert!(distance.is_finite());
            assert!(distance > f64::from(f32::MAX));
        }

        #[test]
        fn mixed_dims_is_an_error() {
            let a = Landmark::new(0.0, 0.0).unwrap();
            let b = Landmark::new_3d(0.0, 0.0, 0.0).unwrap();
            assert!(a.distance(b).is_err());
        }

        #[test]
        fn from_coordinate_list() {
            assert_eq!(Landmark::try_from(vec![0.1, 0.2]).unwrap().dims(), 2);
            assert_eq!(Landmark::try_from(vec![0.1, 0.2, 0.3]).unwrap().dims(), 3);
            assert!(Landmark::try_from(vec![0.1]).is_err());
            assert!(Landmark::try_from(vec![0.1, 0.2, 0.3, 0.4]).is_err());
        }
    }

    mod sequence_tests {
        use super::PoseSequence;

        #[test]
        fn parses_extractor_output() {
            let json = "[[[0.5, 0.5, -0.1], [0.4, 0.6, 0.0]], [[0.5, 0.5, -0.1]]]";
            let sequence: PoseSequence = serde_json::from_str(json).unwrap();
            assert_eq!(sequence.len(), 2);
            assert_eq!(sequence.frames()[0].len(), 2);
            assert_eq!(sequence.first().unwrap().get(1).unwrap().y(), 0.6);
        }

        #[test]
        fn empty_sequence() {
            let sequence: PoseSequence = serde_json::from_str("[]").unwrap();
            assert!(sequence.is_empty());
            assert!(sequence.first().is_none());
        }

        #[test]
        fn rejects_bad_arity() {
            assert!(serde_json::from_str::<PoseSequence>("[[[0.5]]]").is_err());
        }
    }
}
