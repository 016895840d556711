//! Face-corner generators for simple block meshes.
//!
//! The output feeds [`build_mesh`](super::build_mesh) and keeps all
//! positions inside the quantizable range for `half_extent <= 1.6`.

use super::builder::FaceCorner;
use super::vertex::FaceDirection;

/// Corner order of each generated quad: two triangles `(0, 1, 2)` and `(0, 2, 3)`.
const QUAD_CORNERS: [usize; 6] = [0, 1, 2, 0, 2, 3];

/// Generate an upward-facing quad centred on the origin.
///
/// Produces 6 corners that dedup to 4 vertices.
pub fn generate_quad_corners(half_extent: f32, texcoord_u: f32) -> Vec<FaceCorner> {
    face_corners(FaceDirection::PosY, half_extent, texcoord_u).to_vec()
}

/// Generate an axis-aligned cube centred on the origin.
///
/// Produces 36 corners that dedup to 24 vertices (four per face).
pub fn generate_block_corners(half_extent: f32, texcoord_u: f32) -> Vec<FaceCorner> {
    FaceDirection::ALL
        .iter()
        .flat_map(|&direction| face_corners(direction, half_extent, texcoord_u))
        .collect()
}

fn face_corners(direction: FaceDirection, half_extent: f32, texcoord_u: f32) -> [FaceCorner; 6] {
    let h = half_extent;
    // Counter-clockwise when viewed from outside the cube.
    let quad: [[f32; 3]; 4] = match direction {
        FaceDirection::PosX => [[h, -h, h], [h, -h, -h], [h, h, -h], [h, h, h]],
        FaceDirection::NegX => [[-h, -h, -h], [-h, -h, h], [-h, h, h], [-h, h, -h]],
        FaceDirection::PosY => [[-h, h, h], [h, h, h], [h, h, -h], [-h, h, -h]],
        FaceDirection::NegY => [[-h, -h, -h], [h, -h, -h], [h, -h, h], [-h, -h, h]],
        FaceDirection::PosZ => [[-h, -h, h], [h, -h, h], [h, h, h], [-h, h, h]],
        FaceDirection::NegZ => [[h, -h, -h], [-h, -h, -h], [-h, h, -h], [h, h, -h]],
    };
    let normal = direction.normal();
    QUAD_CORNERS.map(|i| FaceCorner::new(quad[i], [texcoord_u, 0.0], normal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::build_mesh;

    #[test]
    fn test_quad_corner_count() {
        let corners = generate_quad_corners(0.5, 0.0);
        assert_eq!(corners.len(), 6);
        assert_eq!(corners[0], corners[3]);
        assert_eq!(corners[2], corners[4]);
    }

    #[test]
    fn test_block_dedups_per_face() {
        let mesh = build_mesh(&generate_block_corners(0.5, 0.25)).unwrap();
        assert_eq!(mesh.index_count(), 36);
        assert_eq!(mesh.vertex_count(), 24);
        for face in mesh.indices.chunks(6) {
            let direction = mesh.vertices[face[0] as usize].direction();
            assert!(
                face.iter()
                    .all(|&i| mesh.vertices[i as usize].direction() == direction)
            );
        }
    }
}
