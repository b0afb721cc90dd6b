use bytemuck::{Pod, Zeroable};

use crate::device::{Attrib, AttribType, VertexLayout};

/// Full-screen quad vertex: NDC position + texture coordinate.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct PosTexCoord0Vertex {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub u: f32,
    pub v: f32,
}

impl PosTexCoord0Vertex {
    pub fn layout() -> VertexLayout {
        VertexLayout::new()
            .add(Attrib::Position, 3, AttribType::Float)
            .add(Attrib::TexCoord0, 2, AttribType::Float)
    }
}

/// Two triangles covering the screen in NDC.
///
/// Texture coordinates follow the position (`[-1, 1] -> [0, 1]`), with V
/// flipped once here for backends whose texture origin is the top-left corner.
pub fn screen_quad(origin_bottom_left: bool) -> [PosTexCoord0Vertex; 6] {
    const CORNERS: [(f32, f32); 6] = [
        (-1.0, -1.0),
        (1.0, -1.0),
        (1.0, 1.0),
        (-1.0, -1.0),
        (1.0, 1.0),
        (-1.0, 1.0),
    ];

    CORNERS.map(|(x, y)| {
        let u = (x + 1.0) * 0.5;
        let v = (y + 1.0) * 0.5;
        PosTexCoord0Vertex {
            x,
            y,
            z: 0.0,
            u,
            v: if origin_bottom_left { v } else { 1.0 - v },
        }
    })
}
