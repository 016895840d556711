//! Quantized, bit-packed mesh vertex.
//!
//! A [`PackedVertex`] is both the GPU vertex format (8 bytes) and the key the
//! mesh builder deduplicates on.
//!
//! # Bit Layout of `packed`
//!
//! | Bits    | Content                          |
//! |---------|----------------------------------|
//! | 0..=6   | `abs(x)` magnitude               |
//! | 7       | sign of `x` (1 = negative)       |
//! | 8..=14  | `abs(y)` magnitude               |
//! | 15      | sign of `y`                      |
//! | 16..=22 | `abs(z)` magnitude               |
//! | 23      | sign of `z`                      |
//! | 24..=26 | [`FaceDirection`] discriminant   |
//! | 27..=31 | unused, zero                     |
//!
//! Positions are scaled by [`POSITION_SCALE`] and truncated toward zero before
//! packing. Only the U texture coordinate is stored; V does not take part in
//! vertex identity.

use std::hash::{Hash, Hasher};

use bytemuck::{Pod, Zeroable};

/// Scale applied to source-asset coordinates before truncation.
pub const POSITION_SCALE: f32 = 10.0;

/// Largest magnitude a quantized position component may have.
pub const MAX_QUANTIZED: i32 = 16;

const MAGNITUDE_MASK: u32 = 0x7F;
const SIGN_BIT: u32 = 0x80;
const AXIS_BITS: u32 = 8;
const DIRECTION_SHIFT: u32 = 24;
const DIRECTION_MASK: u32 = 0x7;

/// Axis-aligned face direction of a vertex normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FaceDirection {
    PosX = 0,
    NegX = 1,
    PosY = 2,
    NegY = 3,
    PosZ = 4,
    NegZ = 5,
}

impl FaceDirection {
    /// All directions in classification order.
    pub const ALL: [FaceDirection; 6] = [
        FaceDirection::PosX,
        FaceDirection::NegX,
        FaceDirection::PosY,
        FaceDirection::NegY,
        FaceDirection::PosZ,
        FaceDirection::NegZ,
    ];

    /// Classify a normal into one of the six axis directions.
    ///
    /// Components are truncated toward zero first, then tested in the order
    /// +X, -X, +Y, -Y, +Z, -Z. The first passing test wins. Returns `None`
    /// when every truncated component is zero.
    pub fn classify(normal: [f32; 3]) -> Option<Self> {
        let [x, y, z] = normal.map(|c| c as i32);
        if x > 0 {
            Some(Self::PosX)
        } else if x < 0 {
            Some(Self::NegX)
        } else if y > 0 {
            Some(Self::PosY)
        } else if y < 0 {
            Some(Self::NegY)
        } else if z > 0 {
            Some(Self::PosZ)
        } else if z < 0 {
            Some(Self::NegZ)
        } else {
            None
        }
    }

    /// Decode a 3-bit direction code.
    pub fn from_bits(bits: u32) -> Option<Self> {
        Self::ALL.get(bits as usize).copied()
    }

    /// Unit normal for this direction.
    pub fn normal(self) -> [f32; 3] {
        match self {
            Self::PosX => [1.0, 0.0, 0.0],
            Self::NegX => [-1.0, 0.0, 0.0],
            Self::PosY => [0.0, 1.0, 0.0],
            Self::NegY => [0.0, -1.0, 0.0],
            Self::PosZ => [0.0, 0.0, 1.0],
            Self::NegZ => [0.0, 0.0, -1.0],
        }
    }
}

/// Scale a source position by [`POSITION_SCALE`] and truncate it toward zero.
///
/// Components outside `[-MAX_QUANTIZED, MAX_QUANTIZED]` trip a debug
/// assertion. Release builds keep only the low 7 magnitude bits.
pub fn quantize_position(position: [f32; 3]) -> [i32; 3] {
    let quantized = position.map(|c| (c * POSITION_SCALE) as i32);
    debug_assert!(
        quantized.iter().all(|c| (-MAX_QUANTIZED..=MAX_QUANTIZED).contains(c)),
        "quantized position {quantized:?} out of range [-{MAX_QUANTIZED}, {MAX_QUANTIZED}]"
    );
    quantized
}

/// Packed mesh vertex: quantized position, face direction and texcoord U.
///
/// Equality and hashing cover exactly the packed word and the texcoord.
/// The texcoord compares bitwise, so `0.0` and `-0.0` are distinct keys.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct PackedVertex {
    /// Position and direction bits, see the module docs.
    pub packed: u32,
    /// Texture coordinate U.
    pub texcoord: f32,
}

static_assertions::assert_eq_size!(PackedVertex, [u8; 8]);

impl PackedVertex {
    /// Size of one vertex in bytes.
    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;

    /// Pack an already quantized position with a direction and texcoord.
    pub fn from_quantized(position: [i32; 3], direction: FaceDirection, texcoord: f32) -> Self {
        let mut packed = 0u32;
        for (axis, &component) in position.iter().enumerate() {
            let mut bits = component.unsigned_abs() & MAGNITUDE_MASK;
            if component < 0 {
                bits |= SIGN_BIT;
            }
            packed |= bits << (axis as u32 * AXIS_BITS);
        }
        packed |= (direction as u32 & DIRECTION_MASK) << DIRECTION_SHIFT;
        Self { packed, texcoord }
    }

    /// Quantized position decoded from the packed word.
    pub fn position(&self) -> [i32; 3] {
        std::array::from_fn(|axis| {
            let bits = (self.packed >> (axis as u32 * AXIS_BITS)) & 0xFF;
            let magnitude = (bits & MAGNITUDE_MASK) as i32;
            if bits & SIGN_BIT != 0 { -magnitude } else { magnitude }
        })
    }

    /// Face direction decoded from the packed word.
    pub fn direction(&self) -> Option<FaceDirection> {
        FaceDirection::from_bits((self.packed >> DIRECTION_SHIFT) & DIRECTION_MASK)
    }

    /// Texture coordinate U.
    pub fn texcoord(&self) -> f32 {
        self.texcoord
    }

    fn texcoord_bits(&self) -> u32 {
        self.texcoord.to_bits()
    }
}

impl PartialEq for PackedVertex {
    fn eq(&self, other: &Self) -> bool {
        self.packed == other.packed && self.texcoord_bits() == other.texcoord_bits()
    }
}

impl Eq for PackedVertex {}

impl Hash for PackedVertex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.packed.hash(state);
        self.texcoord_bits().hash(state);
    }
}

/// Build the dedup key for one face corner.
///
/// Returns `None` when the normal does not classify to an axis direction.
pub fn make_key(position: [f32; 3], texcoord_u: f32, normal: [f32; 3]) -> Option<PackedVertex> {
    let direction = FaceDirection::classify(normal)?;
    Some(PackedVertex::from_quantized(
        quantize_position(position),
        direction,
        texcoord_u,
    ))
}

#[cfg(test)]
mod tests {
    use std::collections::hash_map::DefaultHasher;

    use super::*;

    fn hash_of(v: &PackedVertex) -> u64 {
        let mut hasher = DefaultHasher::new();
        v.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_classify_order() {
        assert_eq!(FaceDirection::classify([1.0, 1.0, 1.0]), Some(FaceDirection::PosX));
        assert_eq!(FaceDirection::classify([-1.0, 1.0, 0.0]), Some(FaceDirection::NegX));
        assert_eq!(FaceDirection::classify([0.0, 1.0, -1.0]), Some(FaceDirection::PosY));
        assert_eq!(FaceDirection::classify([0.0, -1.0, 0.0]), Some(FaceDirection::NegY));
        assert_eq!(FaceDirection::classify([0.0, 0.0, 1.0]), Some(FaceDirection::PosZ));
        assert_eq!(FaceDirection::classify([0.0, 0.0, -1.0]), Some(FaceDirection::NegZ));
    }

    #[test]
    fn test_classify_truncates() {
        // Every component truncates to zero.
        assert_eq!(FaceDirection::classify([0.7, 0.7, 0.0]), None);
        assert_eq!(FaceDirection::classify([0.0, 0.0, 0.0]), None);
        assert_eq!(FaceDirection::classify([0.9, 0.0, -1.0]), Some(FaceDirection::NegZ));
    }

    #[test]
    fn test_packing_layout() {
        let v = PackedVertex::from_quantized([5, -3, 16], FaceDirection::NegY, 0.25);
        assert_eq!(v.packed & 0xFF, 5);
        assert_eq!((v.packed >> 8) & 0xFF, 0x80 | 3);
        assert_eq!((v.packed >> 16) & 0xFF, 16);
        assert_eq!(v.packed >> 24, FaceDirection::NegY as u32);
        assert_eq!(v.position(), [5, -3, 16]);
        assert_eq!(v.direction(), Some(FaceDirection::NegY));
        assert_eq!(v.texcoord(), 0.25);
    }

    #[test]
    fn test_quantize_scales_and_truncates() {
        assert_eq!(quantize_position([0.5, -0.55, 1.6]), [5, -5, 16]);
        assert_eq!(quantize_position([-1.6, 0.09, -0.09]), [-16, 0, 0]);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    #[cfg(debug_assertions)]
    fn test_quantize_out_of_range_asserts() {
        quantize_position([1.7, 0.0, 0.0]);
    }

    #[test]
    fn test_equality_covers_packed_and_texcoord() {
        let a = make_key([0.5, 0.5, 0.5], 0.25, [0.0, 1.0, 0.0]).unwrap();
        let b = make_key([0.5, 0.5, 0.5], 0.25, [0.0, 1.0, 0.0]).unwrap();
        let other_u = make_key([0.5, 0.5, 0.5], 0.5, [0.0, 1.0, 0.0]).unwrap();
        let other_dir = make_key([0.5, 0.5, 0.5], 0.25, [1.0, 0.0, 0.0]).unwrap();
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_ne!(a, other_u);
        assert_ne!(a, other_dir);
    }

    #[test]
    fn test_signed_zero_texcoords_differ() {
        let a = PackedVertex::from_quantized([0, 0, 0], FaceDirection::PosX, 0.0);
        let b = PackedVertex::from_quantized([0, 0, 0], FaceDirection::PosX, -0.0);
        assert_ne!(a, b);
    }

    #[test]
    fn test_make_key_rejects_zero_normal() {
        assert!(make_key([0.0, 0.0, 0.0], 0.0, [0.0, 0.0, 0.0]).is_none());
    }
}
