use crate::{
    compare::{validate_threshold, Comparator, JointDeviation},
    error::Error,
    pose::{JointKind::*, PoseSequence},
};
use num_traits::ToPrimitive;
use ordered_float::OrderedFloat;
use serde::Serialize;
use std::{cmp::Reverse, collections::BTreeMap};
use tracing::debug;

pub const DEFAULT_REPORTING_THRESHOLD: f32 = 0.04;

/// Named groups of joint indices. A joint may belong to several parts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BodyPartMap {
    parts: Vec<(String, Vec<usize>)>,
}

impl BodyPartMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cricket() -> Result<Self, Error> {
        let mut map = Self::new();
        let parts = vec![
            ("head", vec![Nose]),
            ("shoulder", vec![LeftShoulder, RightShoulder]),
            ("elbow", vec![LeftElbow, RightElbow]),
            ("wrist", vec![LeftWrist, RightWrist]),
            ("hip", vec![LeftHip, RightHip]),
            ("knee", vec![LeftKnee, RightKnee]),
            ("ankle", vec![LeftAnkle, RightAnkle]),
            ("foot", vec![LeftFootIndex, RightFootIndex]),
            ("back", vec![LeftShoulder, RightShoulder, LeftHip, RightHip]),
        ];
        for (part, kinds) in parts {
            let joints = kinds
                .iter()
                .map(|kind| kind.idx())
                .collect::<Result<Vec<_>, _>>()?;
            map.insert(part, joints);
        }
        Ok(map)
    }

    /// Add a part, replacing any existing part of the same name.
    pub fn insert<S>(&mut self, part: S, joints: Vec<usize>)
    where
        S: Into<String>,
    {
        let part = part.into();
        match self.parts.iter_mut().find(|(name, _)| *name == part) {
            Some((_, existing)) => *existing = joints,
            None => self.parts.push((part, joints)),
        }
    }

    pub fn joints(&self, part: &str) -> Option<&[usize]> {
        self.parts
            .iter()
            .find(|(name, _)| name == part)
            .map(|(_, joints)| joints.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[usize])> + '_ {
        self.parts
            .iter()
            .map(|(name, joints)| (name.as_str(), joints.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

/// Mean deviation per body part for a single pose pair. Parts with no joint
/// present in `deviations` are left out.
pub fn aggregate(
    deviations: &[JointDeviation],
    part_map: &BodyPartMap,
) -> Result<BTreeMap<String, f64>, Error> {
    let mut means = BTreeMap::new();
    for (part, joints) in part_map.iter() {
        let (sum, count) = deviations
            .iter()
            .filter(|d| joints.contains(&d.joint))
            .fold((0.0_f64, 0_usize), |(sum, count), d| {
                (sum + d.deviation, count + 1)
            });
        if count == 0 {
            continue;
        }
        let mean = sum / count.to_f64().ok_or(Error::ConvertToF64)?;
        means.insert(part.to_owned(), mean);
    }
    Ok(means)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartDeviation {
    pub part: String,
    pub mean_deviation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartReport {
    pub parts: BTreeMap<String, f64>,
    /// Parts above the reporting threshold, largest deviation first.
    pub flagged: Vec<PartDeviation>,
}

impl PartReport {
    pub fn is_clean(&self) -> bool {
        self.flagged.is_empty()
    }
}

/// Coarse, single-frame feedback by body part.
#[derive(Debug, Clone)]
pub struct Aggregator {
    part_map: BodyPartMap,
    reporting_threshold: f32,
}

impl Aggregator {
    pub fn new(part_map: BodyPartMap, reporting_threshold: f32) -> Result<Self, Error> {
        Ok(Self {
            part_map,
            reporting_threshold: validate_threshold(reporting_threshold)?,
        })
    }

    pub fn cricket() -> Result<Self, Error> {
        Self::new(BodyPartMap::cricket()?, DEFAULT_REPORTING_THRESHOLD)
    }

    pub fn part_map(&self) -> &BodyPartMap {
        &self.part_map
    }

    pub fn reporting_threshold(&self) -> f32 {
        self.reporting_threshold
    }

    /// Mean deviation of every part found in `deviations`, and the parts
    /// above the reporting threshold.
    pub fn report(&self, deviations: &[JointDeviation]) -> Result<PartReport, Error> {
        let parts = aggregate(deviations, &self.part_map)?;
        let threshold = f64::from(self.reporting_threshold);
        let mut flagged = parts
            .iter()
            .filter(|&(_, &mean)| mean > threshold)
            .map(|(part, &mean_deviation)| PartDeviation {
                part: part.clone(),
                mean_deviation,
            })
            .collect::<Vec<_>>();
        flagged.sort_by_key(|p| Reverse(OrderedFloat(p.mean_deviation)));
        Ok(PartReport { parts, flagged })
    }

    /// Compare the first detected frame of each sequence. Returns `None` when
    /// either sequence has no frame.
    pub fn compare_static(
        &self,
        comparator: &Comparator,
        user: &PoseSequence,
        ideal: &PoseSequence,
    ) -> Result<Option<PartReport>, Error> {
        let (user_frame, ideal_frame) = match (user.first(), ideal.first()) {
            (Some(u), Some(i)) => (u, i),
            _ => return Ok(None),
        };
        let deviations = comparator.joint_deviations(user_frame, ideal_frame)?;
        let report = self.report(&deviations)?;
        debug!(
            parts = report.parts.len(),
            flagged = report.flagged.len(),
            "compared first frames by body part"
        );
        Ok(Some(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn dev(joint: usize, deviation: f64) -> JointDeviation {
        JointDeviation { joint, deviation }
    }

    mod body_part_map_tests {
        use super::BodyPartMap;

        #[test]
        fn cricket_layout() {
            let map = BodyPartMap::cricket().unwrap();
            assert_eq!(map.joints("elbow"), Some(&[13, 14][..]));
            assert_eq!(map.joints("back"), Some(&[11, 12, 23, 24][..]));
            assert_eq!(map.joints("head"), Some(&[0][..]));
            assert_eq!(map.joints("tail"), None);
            assert_eq!(map.len(), 9);
        }

        #[test]
        fn insert_replaces() {
            let mut map = BodyPartMap::cricket().unwrap();
            map.insert("elbow", vec![13]);
            assert_eq!(map.joints("elbow"), Some(&[13][..]));
            assert_eq!(map.len(), 9);
        }
    }

    mod aggregate_tests {
        use super::*;

        #[test]
        fn elbow_mean() {
            let mut map = BodyPartMap::new();
            map.insert("elbow", vec![13, 14]);
            let means = aggregate(&[dev(13, 0.02), dev(14, 0.06)], &map).unwrap();
            assert_approx_eq!(means["elbow"], 0.04);
        }

        #[test]
        fn shared_joints_count_in_every_part() {
            let map = BodyPartMap::cricket().unwrap();
            let deviations = [dev(11, 0.1), dev(12, 0.3), dev(23, 0.0), dev(24, 0.0)];
            let means = aggregate(&deviations, &map).unwrap();
            assert_approx_eq!(means["shoulder"], 0.2);
            assert_approx_eq!(means["back"], 0.1);
            assert_approx_eq!(means["hip"], 0.0);
        }

        #[test]
        fn parts_without_joints_are_omitted() {
            let map = BodyPartMap::cricket().unwrap();
            let means = aggregate(&[dev(13, 0.02)], &map).unwrap();
            assert_eq!(means.len(), 1);
            assert!(!means.contains_key("foot"));
            assert_approx_eq!(means["elbow"], 0.02);
        }

        #[test]
        fn empty_input() {
            let map = BodyPartMap::cricket().unwrap();
            assert!(aggregate(&[], &map).unwrap().is_empty());
        }
    }

    mod aggregator_tests {
        use super::*;
        use crate::pose::{Frame, Landmark};

        #[test]
        fn flags_worst_first() {
            let aggregator = Aggregator::cricket().unwrap();
            let report = aggregator
                .report(&[dev(13, 0.1), dev(14, 0.1), dev(25, 0.05), dev(26, 0.05), dev(0, 0.01)])
                .unwrap();
            let flagged: Vec<_> = report.flagged.iter().map(|p| p.part.as_str()).collect();
            assert_eq!(flagged, vec!["elbow", "knee"]);
            assert!(!report.is_clean());
            assert_approx_eq!(report.parts["head"], 0.01);
        }

        #[test]
        fn threshold_is_exclusive() {
            let aggregator = Aggregator::new(BodyPartMap::cricket().unwrap(), 0.25).unwrap();
            let report = aggregator.report(&[dev(0, 0.25)]).unwrap();
            assert!(report.is_clean());
        }

        #[test]
        fn static_comparison_uses_first_frame() {
            let comparator = Comparator::mediapipe().unwrap();
            let aggregator = Aggregator::cricket().unwrap();

            let still = Frame::new(vec![Landmark::new(0.5, 0.5).unwrap(); 33]);
            let mut bent = still.landmarks().to_vec();
            bent[13] = Landmark::new(0.5, 0.6).unwrap();
            let bent = Frame::new(bent);

            let user = PoseSequence::new(vec![bent, still.clone()]);
            let ideal = PoseSequence::new(vec![still.clone(), still]);
            let report = aggregator
                .compare_static(&comparator, &user, &ideal)
                .unwrap()
                .unwrap();

            assert_approx_eq!(report.parts["elbow"], 0.05);
            assert!(!report.parts.contains_key("foot"));
            assert_eq!(report.flagged.len(), 1);
            assert_eq!(report.flagged[0].part, "elbow");
        }

        #[test]
        fn static_comparison_without_frames() {
            let comparator = Comparator::mediapipe().unwrap();
            let aggregator = Aggregator::cricket().unwrap();
            let ideal = PoseSequence::from(Frame::new(vec![Landmark::new(0.5, 0.5).unwrap(); 33]));
            assert!(aggregator
                .compare_static(&comparator, &PoseSequence::default(), &ideal)
                .unwrap()
                .is_none());
        }
    }
}
