use core::ops::{Add, AddAssign, Mul, Neg, Sub};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// World-space position or direction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    pub const Y: Self = Self::new(0.0, 1.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn distance(self, other: Self) -> f32 {
        (self - other).length()
    }

    /// Distance ignoring the vertical axis.
    pub fn horizontal_distance(self, other: Self) -> f32 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        (dx * dx + dz * dz).sqrt()
    }

    /// Unit vector, or zero for (near) zero-length input.
    pub fn normalize_or_zero(self) -> Self {
        let len = self.length();
        if len <= f32::EPSILON {
            Self::ZERO
        } else {
            self * (1.0 / len)
        }
    }

    /// Same vector with `y` zeroed.
    pub fn horizontal(self) -> Self {
        Self::new(self.x, 0.0, self.z)
    }

    pub fn lerp(self, other: Self, t: f32) -> Self {
        self + (other - self) * t
    }

    /// Cell containing this point.
    pub fn floor(self) -> IVec3 {
        IVec3::new(
            self.x.floor() as i32,
            self.y.floor() as i32,
            self.z.floor() as i32,
        )
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Add for Vec3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Vec3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self::Output {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vec3 {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y, -self.z)
    }
}

/// Integer voxel cell coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IVec3 {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

const PACK_BITS: u32 = 21;
const PACK_MASK: u64 = (1 << PACK_BITS) - 1;
const PACK_BIAS: i64 = 1 << (PACK_BITS - 1);

impl IVec3 {
    pub const ZERO: Self = Self::new(0, 0, 0);

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Centre of the cell in world space.
    pub fn center(self) -> Vec3 {
        Vec3::new(
            self.x as f32 + 0.5,
            self.y as f32 + 0.5,
            self.z as f32 + 0.5,
        )
    }

    /// Minimum corner of the cell in world space.
    pub fn as_vec3(self) -> Vec3 {
        Vec3::new(self.x as f32, self.y as f32, self.z as f32)
    }

    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// Packs the coordinate into a single `u64` map key.
    ///
    /// Each axis keeps 21 bits, so coordinates in `[-2^20, 2^20)` round-trip
    /// through [`IVec3::unpack`].
    pub fn pack(self) -> u64 {
        let x = ((self.x as i64 + PACK_BIAS) as u64) & PACK_MASK;
        let y = ((self.y as i64 + PACK_BIAS) as u64) & PACK_MASK;
        let z = ((self.z as i64 + PACK_BIAS) as u64) & PACK_MASK;
        (x << (2 * PACK_BITS)) | (y << PACK_BITS) | z
    }

    pub fn unpack(key: u64) -> Self {
        let x = ((key >> (2 * PACK_BITS)) & PACK_MASK) as i64 - PACK_BIAS;
        let y = ((key >> PACK_BITS) & PACK_MASK) as i64 - PACK_BIAS;
        let z = (key & PACK_MASK) as i64 - PACK_BIAS;
        Self::new(x as i32, y as i32, z as i32)
    }
}

impl Add for IVec3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for IVec3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_roundtrips_negative_coordinates() {
        for cell in [
            IVec3::new(0, 0, 0),
            IVec3::new(-128, -32, 127),
            IVec3::new(1_000_000, -1_000_000, 5),
        ] {
            assert_eq!(IVec3::unpack(cell.pack()), cell);
        }
    }

    #[test]
    fn floor_handles_negative_values() {
        assert_eq!(Vec3::new(-0.5, 1.9, -2.0).floor(), IVec3::new(-1, 1, -2));
    }

    #[test]
    fn normalize_zero_is_zero() {
        assert_eq!(Vec3::ZERO.normalize_or_zero(), Vec3::ZERO);
    }
}
