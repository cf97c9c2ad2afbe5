use crate::gpu::{ElementFormat, InputElement};

/// Vertex struct.
///
/// Uses C-compatible memory layout (`#[repr(C)]`)
/// so it can be safely shared with GPU graphics APIs.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex
{
        pub position: [f32; 3],
}

impl Vertex
{
        /// Byte distance between consecutive vertices.
        pub const STRIDE: u32 = std::mem::size_of::<Vertex>() as u32;

        /// Input layout matching the `POSITION` signature of the triangle
        /// effect.
        pub const LAYOUT: &'static [InputElement] = &[InputElement {
                semantic: "POSITION",
                format: ElementFormat::Float32x3,
                offset: 0,
        }];
}

pub const TRIANGLE: [Vertex; 3] = [
        Vertex {
                position: [0.0, 0.5, 0.5],
        }, // Top
        Vertex {
                position: [0.5, -0.5, 0.5],
        }, // Bottom right
        Vertex {
                position: [-0.5, -0.5, 0.5],
        }, // Bottom left
];
