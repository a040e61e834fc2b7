use cubespin_common::{FACE_COUNT, FacePalette, Rgba};
use glam::Vec3;

/// Vertices per face. Faces do not share vertices so each can carry its own colour and normal.
pub const VERTICES_PER_FACE: usize = 4;
pub const VERTEX_COUNT: usize = FACE_COUNT * VERTICES_PER_FACE;
/// Two triangles per face.
pub const INDEX_COUNT: usize = FACE_COUNT * 6;

/// Static cube geometry, ready to be uploaded once.
///
/// `positions`, `normals` and the expanded colours from [`CubeMesh::vertex_colors`]
/// share one layout: vertex `i` belongs to face `i / 4`.
#[derive(Debug, Clone, PartialEq)]
pub struct CubeMesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u16>,
    pub face_colors: [Rgba; FACE_COUNT],
}

/// Face order: front, back, top, bottom, right, left.
const FACE_NORMALS: [Vec3; FACE_COUNT] = [
    Vec3::Z,
    Vec3::NEG_Z,
    Vec3::Y,
    Vec3::NEG_Y,
    Vec3::X,
    Vec3::NEG_X,
];

/// Cube spanning `[-1, 1]` on every axis, coloured with `palette`.
pub fn cube_mesh(palette: FacePalette) -> CubeMesh {
    #[rustfmt::skip]
    let positions: Vec<[f32; 3]> = vec![
        // Front
        [-1.0, -1.0,  1.0], [ 1.0, -1.0,  1.0], [ 1.0,  1.0,  1.0], [-1.0,  1.0,  1.0],
        // Back
        [-1.0, -1.0, -1.0], [-1.0,  1.0, -1.0], [ 1.0,  1.0, -1.0], [ 1.0, -1.0, -1.0],
        // Top
        [-1.0,  1.0, -1.0], [-1.0,  1.0,  1.0], [ 1.0,  1.0,  1.0], [ 1.0,  1.0, -1.0],
        // Bottom
        [-1.0, -1.0, -1.0], [ 1.0, -1.0, -1.0], [ 1.0, -1.0,  1.0], [-1.0, -1.0,  1.0],
        // Right
        [ 1.0, -1.0, -1.0], [ 1.0,  1.0, -1.0], [ 1.0,  1.0,  1.0], [ 1.0, -1.0,  1.0],
        // Left
        [-1.0, -1.0, -1.0], [-1.0, -1.0,  1.0], [-1.0,  1.0,  1.0], [-1.0,  1.0, -1.0],
    ];

    let normals = FACE_NORMALS
        .iter()
        .flat_map(|n| std::iter::repeat_n(n.to_array(), VERTICES_PER_FACE))
        .collect();

    let indices = (0..FACE_COUNT as u16)
        .flat_map(|face| {
            let base = face * VERTICES_PER_FACE as u16;
            [base, base + 1, base + 2, base, base + 2, base + 3]
        })
        .collect();

    CubeMesh {
        positions,
        normals,
        indices,
        face_colors: palette.0,
    }
}

impl CubeMesh {
    /// Face colours expanded to one entry per vertex, matching `positions`.
    pub fn vertex_colors(&self) -> Vec<Rgba> {
        self.face_colors
            .iter()
            .flat_map(|c| std::iter::repeat_n(*c, VERTICES_PER_FACE))
            .collect()
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }
}

impl Default for CubeMesh {
    fn default() -> Self {
        cube_mesh(FacePalette::PRIMARY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mesh_sizes() {
        let mesh = CubeMesh::default();
        assert_eq!(mesh.positions.len(), VERTEX_COUNT);
        assert_eq!(mesh.normals.len(), VERTEX_COUNT);
        assert_eq!(mesh.indices.len(), INDEX_COUNT);
        assert_eq!(mesh.vertex_colors().len(), VERTEX_COUNT);
        assert_eq!(mesh.index_count(), 36);
    }

    #[test]
    fn indices_stay_within_their_face() {
        let mesh = CubeMesh::default();
        for (tri, chunk) in mesh.indices.chunks(3).enumerate() {
            let face = tri / 2;
            for &i in chunk {
                assert_eq!(i as usize / VERTICES_PER_FACE, face);
            }
        }
    }

    #[test]
    fn vertices_lie_on_their_face_plane() {
        let mesh = CubeMesh::default();
        for (i, (p, n)) in mesh.positions.iter().zip(&mesh.normals).enumerate() {
            let p = Vec3::from_array(*p);
            let n = Vec3::from_array(*n);
            assert_eq!(p.dot(n), 1.0, "vertex {i} off its face plane");
        }
    }

    #[test]
    fn triangles_wind_outward() {
        let mesh = CubeMesh::default();
        for chunk in mesh.indices.chunks(3) {
            let [a, b, c] = [chunk[0], chunk[1], chunk[2]]
                .map(|i| Vec3::from_array(mesh.positions[i as usize]));
            let n = Vec3::from_array(mesh.normals[chunk[0] as usize]);
            assert!((b - a).cross(c - a).dot(n) > 0.0);
        }
    }

    #[test]
    fn vertex_colors_follow_face_layout() {
        let mesh = cube_mesh(FacePalette::SECONDARY);
        let colors = mesh.vertex_colors();
        for (i, c) in colors.iter().enumerate() {
            assert_eq!(*c, FacePalette::SECONDARY.0[i / VERTICES_PER_FACE]);
        }
    }

    #[test]
    fn mesh_is_deterministic() {
        assert_eq!(CubeMesh::default(), cube_mesh(FacePalette::PRIMARY));
    }
}
