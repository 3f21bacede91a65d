#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to construct NotNan from f32: {1}")]
    ConstructNotNan(#[source] ordered_float::FloatIsNan, f32),

    #[error("landmark must have 2 or 3 coordinates, got {0}")]
    LandmarkArity(usize),

    #[error("landmark dimensionality mismatch: {0}D vs {1}D")]
    DimensionalityMismatch(usize, usize),

    #[error("landmark dimensionality mismatch for joint {joint} in frame {frame}: user is {user}D, ideal is {ideal}D")]
    FrameDimensionalityMismatch {
        frame: usize,
        joint: usize,
        user: usize,
        ideal: usize,
    },

    #[error("frame {frame} of the {side} sequence has no landmark for joint {joint}")]
    MissingJoint {
        side: &'static str,
        frame: usize,
        joint: usize,
    },

    #[error("non-finite distance for joint {joint} in frame {frame}")]
    NonFiniteDistance { frame: usize, joint: usize },

    #[error("threshold must be finite and greater than zero, got {0}")]
    InvalidThreshold(f32),

    #[error("cannot score against an empty set of important joints")]
    EmptyImportantJoints,

    #[error("failed to convert usize value to joint kind: {0}")]
    ConvertUSizeToJointKind(usize),

    #[error("failed to convert joint variant to usize: {0:?}")]
    JointVariantToUSize(crate::pose::JointKind),

    #[error("failed to convert value to f64")]
    ConvertToF64,

    #[error("failed to parse config")]
    ParseConfig(#[source] toml::de::Error),
}
