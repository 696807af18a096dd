//! Orientation decoding for vehicle attitude.
//!
//! Attitude arrives in the North-East-Down body frame. The visualization frame
//! is obtained by negating pitch and yaw before the Euler conversion and by
//! negating `y` and `z` of the translation.

use serde::Serialize;

use crate::records::Timestamp;

pub const MAP_FRAME: &str = "map";
pub const VEHICLE_FRAME: &str = "vehicle";

/// Roll, pitch and yaw in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attitude {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

/// Local position in meters, NED.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalPosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub time_boot_ms: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quaternion {
    pub const IDENTITY: Quaternion = Quaternion {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    pub fn norm(&self) -> f64 {
        (self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pose {
    pub position: Vector3,
    pub orientation: Quaternion,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameTransform {
    pub timestamp: Timestamp,
    pub parent_frame_id: String,
    pub child_frame_id: String,
    pub translation: Vector3,
    pub rotation: Quaternion,
}

/// Half-angle product of yaw, pitch and roll (intrinsic Z-Y-X).
pub fn quaternion_from_euler(roll: f64, pitch: f64, yaw: f64) -> Quaternion {
    let (sy, cy) = (yaw * 0.5).sin_cos();
    let (sp, cp) = (pitch * 0.5).sin_cos();
    let (sr, cr) = (roll * 0.5).sin_cos();

    Quaternion {
        w: cr * cp * cy + sr * sp * sy,
        x: sr * cp * cy - cr * sp * sy,
        y: cr * sp * cy + sr * cp * sy,
        z: cr * cp * sy - sr * sp * cy,
    }
}

/// Orientation of the vehicle in the visualization frame.
pub fn orientation(attitude: &Attitude) -> Quaternion {
    quaternion_from_euler(attitude.roll, -attitude.pitch, -attitude.yaw)
}

/// Vehicle pose with the attitude as orientation, anchored at the origin.
pub fn to_pose(attitude: &Attitude) -> Pose {
    Pose {
        position: Vector3::default(),
        orientation: orientation(attitude),
    }
}

/// Transform from the map frame to the vehicle frame.
pub fn to_frame_transform(attitude: &Attitude, position: &LocalPosition) -> FrameTransform {
    FrameTransform {
        timestamp: Timestamp::from_millis(position.time_boot_ms),
        parent_frame_id: MAP_FRAME.to_string(),
        child_frame_id: VEHICLE_FRAME.to_string(),
        translation: Vector3 {
            x: position.x,
            y: -position.y,
            z: -position.z,
        },
        rotation: orientation(attitude),
    }
}

/// Latest attitude and position seen on the telemetry stream.
///
/// The two arrive on independent messages at different rates, so either may
/// be missing for a while; that is not an error.
#[derive(Debug, Default)]
pub struct PoseTracker {
    attitude: Option<Attitude>,
    position: Option<LocalPosition>,
}

impl PoseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_attitude(&mut self, attitude: Attitude) {
        self.attitude = Some(attitude);
    }

    pub fn update_position(&mut self, position: LocalPosition) {
        self.position = Some(position);
    }

    /// `None` until both attitude and position have been observed.
    pub fn pose(&self) -> Option<Pose> {
        self.position?;
        self.attitude.as_ref().map(to_pose)
    }

    /// `None` until both attitude and position have been observed.
    pub fn frame_transform(&self) -> Option<FrameTransform> {
        let attitude = self.attitude.as_ref()?;
        let position = self.position.as_ref()?;
        Some(to_frame_transform(attitude, position))
    }
}
