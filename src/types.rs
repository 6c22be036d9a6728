use std::ops::{Index, IndexMut};

/// One output channel of the 6DOF pose.
///
/// Discriminants match the channel order used throughout the pipeline:
/// three translations first, then the three rotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
    Yaw = 3,
    Pitch = 4,
    Roll = 5,
}

impl Axis {
    /// All six channels in pipeline order.
    pub const ALL: [Axis; 6] = [
        Axis::X,
        Axis::Y,
        Axis::Z,
        Axis::Yaw,
        Axis::Pitch,
        Axis::Roll,
    ];

    /// Map a channel index back to an axis. Out-of-range indices (including
    /// the -1 "muted" sentinel used in axis remap config) return None.
    pub fn from_index(i: i32) -> Option<Axis> {
        match i {
            0 => Some(Axis::X),
            1 => Some(Axis::Y),
            2 => Some(Axis::Z),
            3 => Some(Axis::Yaw),
            4 => Some(Axis::Pitch),
            5 => Some(Axis::Roll),
            _ => None,
        }
    }
}

/// A 6DOF pose sample.
///
/// Translations are in whatever distance unit the source produces;
/// rotations are Tait-Bryan angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
}

impl Pose {
    /// The origin pose.
    pub const ZERO: Pose = Pose {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        yaw: 0.0,
        pitch: 0.0,
        roll: 0.0,
    };

    /// Translation channels as a vector, in channel order.
    pub fn translation(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Rotation channels (yaw, pitch, roll) in degrees.
    pub fn rotation(&self) -> [f64; 3] {
        [self.yaw, self.pitch, self.roll]
    }

    /// All six channels in pipeline order.
    pub fn to_array(self) -> [f64; 6] {
        [self.x, self.y, self.z, self.yaw, self.pitch, self.roll]
    }
}

impl From<[f64; 6]> for Pose {
    fn from(v: [f64; 6]) -> Pose {
        Pose {
            x: v[0],
            y: v[1],
            z: v[2],
            yaw: v[3],
            pitch: v[4],
            roll: v[5],
        }
    }
}

impl Index<Axis> for Pose {
    type Output = f64;

    fn index(&self, axis: Axis) -> &f64 {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
            Axis::Yaw => &self.yaw,
            Axis::Pitch => &self.pitch,
            Axis::Roll => &self.roll,
        }
    }
}

impl IndexMut<Axis> for Pose {
    fn index_mut(&mut self, axis: Axis) -> &mut f64 {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
            Axis::Z => &mut self.z,
            Axis::Yaw => &mut self.yaw,
            Axis::Pitch => &mut self.pitch,
            Axis::Roll => &mut self.roll,
        }
    }
}

/// The last committed cycle's output, readable from any thread.
///
/// `mapped` is the fully processed pose delivered to the sink; `raw` is the
/// sample it was computed from, as reported by the source (or the frozen
/// reference while zeroing is engaged).
#[derive(Debug, Clone, Copy, Default)]
pub struct Snapshot {
    pub mapped: Pose,
    pub raw: Pose,
}
