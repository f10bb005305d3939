use thiserror::Error;

/// A ragdoll whose topology cannot be relaxed. Raised once, while building.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TopologyError {
    #[error("constraint {constraint} references joint {joint}, but only {joints} joints exist")]
    JointOutOfRange {
        constraint: usize,
        joint: usize,
        joints: usize,
    },
    #[error("constraint {constraint} connects joint {joint} to itself")]
    SelfConstraint { constraint: usize, joint: usize },
    #[error("constraint {constraint}: {field} = {value} is outside [0, 1]")]
    CoefficientOutOfRange {
        constraint: usize,
        field: &'static str,
        value: f32,
    },
    #[error("angle constraint {constraint}: min {min} exceeds max {max}")]
    EmptyAngleRange { constraint: usize, min: f32, max: f32 },
    #[error("joint {joint} has non-positive mass {mass}")]
    NonPositiveMass { joint: usize, mass: f32 },
}
