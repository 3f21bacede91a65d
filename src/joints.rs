use crate::{
    error::Error,
    pose::{JointKind, NUM_JOINTS},
};
use std::{borrow::Cow, collections::BTreeMap};

/// Joint index to display name lookup, injected into the comparator so that
/// other detector layouts can be scored.
#[derive(Debug, Clone, PartialEq)]
pub struct JointTable {
    names: BTreeMap<usize, String>,
}

impl JointTable {
    pub fn new(names: BTreeMap<usize, String>) -> Self {
        Self { names }
    }

    /// The 33-landmark BlazePose layout.
    pub fn mediapipe() -> Result<Self, Error> {
        let names = (0..NUM_JOINTS)
            .map(|idx| JointKind::from_idx(idx).map(|kind| (idx, kind.name().to_owned())))
            .collect::<Result<BTreeMap<_, _>, Error>>()?;
        Ok(Self { names })
    }

    pub fn name(&self, joint: usize) -> Cow<'_, str> {
        match self.names.get(&joint) {
            Some(name) => Cow::Borrowed(name.as_str()),
            None => Cow::Owned(format!("Joint {}", joint)),
        }
    }
}

/// Insertion-ordered set of joint indices that take part in scoring.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportantJoints {
    joints: Vec<usize>,
}

impl ImportantJoints {
    pub fn new<I>(joints: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        let mut set = Self::default();
        joints.into_iter().for_each(|joint| set.insert(joint));
        set
    }

    pub fn from_kinds(kinds: &[JointKind]) -> Result<Self, Error> {
        let indices = kinds
            .iter()
            .map(|kind| kind.idx())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(indices))
    }

    /// Nose, shoulders, elbows, wrists, hips, knees and ankles.
    pub fn cricket() -> Result<Self, Error> {
        use JointKind::*;

        Self::from_kinds(&[
            Nose,
            LeftShoulder,
            RightShoulder,
            LeftElbow,
            RightElbow,
            LeftWrist,
            RightWrist,
            LeftHip,
            RightHip,
            LeftKnee,
            RightKnee,
            LeftAnkle,
            RightAnkle,
        ])
    }

    pub fn with_feet(mut self) -> Result<Self, Error> {
        self.insert(JointKind::LeftFootIndex.idx()?);
        self.insert(JointKind::RightFootIndex.idx()?);
        Ok(self)
    }

    pub fn insert(&mut self, joint: usize) {
        if !self.joints.contains(&joint) {
            self.joints.push(joint);
        }
    }

    pub fn contains(&self, joint: usize) -> bool {
        self.joints.contains(&joint)
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.joints.iter().copied()
    }
}
