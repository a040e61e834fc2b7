use serde::{Deserialize, Serialize};

/// Linear RGBA colour, each channel in `0.0..=1.0`.
pub type Rgba = [f32; 4];

/// Number of faces on a cube.
pub const FACE_COUNT: usize = 6;

/// One colour per cube face, in mesh face order: front, back, top, bottom, right, left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FacePalette(pub [Rgba; FACE_COUNT]);

impl FacePalette {
    /// White, red, green, blue, yellow, purple.
    pub const PRIMARY: Self = Self([
        [1.0, 1.0, 1.0, 1.0],
        [1.0, 0.0, 0.0, 1.0],
        [0.0, 1.0, 0.0, 1.0],
        [0.0, 0.0, 1.0, 1.0],
        [1.0, 1.0, 0.0, 1.0],
        [1.0, 0.0, 1.0, 1.0],
    ]);

    /// Bright gray, cyan, magenta, yellow, blue, red.
    pub const SECONDARY: Self = Self([
        [0.8, 0.8, 0.8, 1.0],
        [0.0, 0.8, 0.8, 1.0],
        [0.8, 0.0, 0.8, 1.0],
        [0.8, 0.8, 0.0, 1.0],
        [0.0, 0.0, 0.8, 1.0],
        [0.8, 0.0, 0.0, 1.0],
    ]);

    /// Palette for the object at `index`. Alternates primary/secondary.
    pub fn for_object(index: usize) -> Self {
        if index % 2 == 0 {
            Self::PRIMARY
        } else {
            Self::SECONDARY
        }
    }

    pub fn face(&self, face: usize) -> Option<Rgba> {
        self.0.get(face).copied()
    }
}

impl Default for FacePalette {
    fn default() -> Self {
        Self::PRIMARY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palettes_alternate_by_index() {
        assert_eq!(FacePalette::for_object(0), FacePalette::PRIMARY);
        assert_eq!(FacePalette::for_object(1), FacePalette::SECONDARY);
        assert_eq!(FacePalette::for_object(2), FacePalette::PRIMARY);
    }

    #[test]
    fn palettes_are_opaque() {
        for palette in [FacePalette::PRIMARY, FacePalette::SECONDARY] {
            assert!(palette.0.iter().all(|c| c[3] == 1.0));
        }
    }

    #[test]
    fn face_lookup_out_of_range() {
        assert_eq!(FacePalette::PRIMARY.face(0), Some([1.0, 1.0, 1.0, 1.0]));
        assert_eq!(FacePalette::PRIMARY.face(FACE_COUNT), None);
    }
}
