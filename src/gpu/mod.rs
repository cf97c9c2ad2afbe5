//! GPU driver capability.
//!
//! [`GpuDriver`] is the narrow interface the render surface drives: device
//! and swap-chain creation, render-target setup, effect/technique/pass
//! handling, input assembly and draw submission. Handles are associated
//! types owned by the caller; dropping a handle releases it.

pub mod effect;
pub mod error;
pub mod slot;
pub mod wgpu_driver;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::host::WindowHandle;

pub use error::GpuError;
pub use slot::Slot;

/// Driver types tried, in order, during device creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverType
{
        /// Hardware accelerated adapter.
        Hardware,
        /// Software rasterizer (fallback adapter).
        Reference,
}

impl DriverType
{
        pub const PREFERENCE: [DriverType; 2] = [DriverType::Hardware, DriverType::Reference];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat
{
        Rgba8Unorm,
        Bgra8Unorm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshRate
{
        pub numerator: u32,
        pub denominator: u32,
}

/// Swap chain description handed to [`GpuDriver::create_device_and_swap_chain`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapChainDesc
{
        pub buffer_count: u32,
        pub width: u32,
        pub height: u32,
        pub format: PixelFormat,
        pub refresh_rate: RefreshRate,
        pub output_window: WindowHandle,
        pub sample_count: u32,
        pub sample_quality: u32,
        pub windowed: bool,
        /// Wait for vertical blank on present.
        pub vsync: bool,
}

impl SwapChainDesc
{
        /// Single-buffered, windowed RGBA8 swap chain at 60 Hz without vsync.
        pub fn windowed(
                output_window: WindowHandle,
                width: u32,
                height: u32,
        ) -> Self
        {
                Self {
                        buffer_count: 1,
                        width,
                        height,
                        format: PixelFormat::Rgba8Unorm,
                        refresh_rate: RefreshRate {
                                numerator: 60,
                                denominator: 1,
                        },
                        output_window,
                        sample_count: 1,
                        sample_quality: 0,
                        windowed: true,
                        vsync: false,
                }
        }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport
{
        pub x: f32,
        pub y: f32,
        pub width: f32,
        pub height: f32,
        pub min_depth: f32,
        pub max_depth: f32,
}

impl Viewport
{
        /// Full-extent viewport with the default depth range.
        pub fn full(
                width: u32,
                height: u32,
        ) -> Self
        {
                Self {
                        x: 0.0,
                        y: 0.0,
                        width: width as f32,
                        height: height as f32,
                        min_depth: 0.0,
                        max_depth: 1.0,
                }
        }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementFormat
{
        Float32x2,
        Float32x3,
        Float32x4,
}

impl ElementFormat
{
        pub fn size(self) -> u32
        {
                match self
                {
                        ElementFormat::Float32x2 => 8,
                        ElementFormat::Float32x3 => 12,
                        ElementFormat::Float32x4 => 16,
                }
        }
}

/// One vertex attribute of an input layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputElement
{
        pub semantic: &'static str,
        pub format: ElementFormat,
        pub offset: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveTopology
{
        TriangleList,
}

/// Immutable vertex buffer description. The initial data is the whole
/// content; the buffer is never written again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferDesc
{
        pub byte_width: usize,
}

impl BufferDesc
{
        pub fn static_vertices(byte_width: usize) -> Self
        {
                Self {
                        byte_width,
                }
        }
}

/// Index of a technique inside an effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TechniqueId(pub usize);

/// GPU driver collaborator.
///
/// Methods that bind state mirror an immediate-mode device context: the
/// bound render target, viewport, input layout, vertex buffer, topology and
/// applied pass stay in effect until rebound or until
/// [`GpuDriver::clear_state`].
pub trait GpuDriver
{
        type Device;
        type SwapChain;
        type Texture;
        type RenderTargetView;
        type Effect;
        type InputLayout;
        type Buffer;

        fn create_device_and_swap_chain(
                &mut self,
                driver_type: DriverType,
                desc: &SwapChainDesc,
        ) -> Result<(Self::Device, Self::SwapChain), GpuError>;

        fn back_buffer(
                &mut self,
                swap_chain: &Self::SwapChain,
        ) -> Result<Self::Texture, GpuError>;

        fn create_render_target_view(
                &mut self,
                device: &Self::Device,
                texture: &Self::Texture,
        ) -> Result<Self::RenderTargetView, GpuError>;

        fn set_render_target(
                &mut self,
                device: &Self::Device,
                view: &Self::RenderTargetView,
        );

        fn set_viewport(
                &mut self,
                device: &Self::Device,
                viewport: Viewport,
        );

        fn clear_render_target(
                &mut self,
                device: &Self::Device,
                view: &Self::RenderTargetView,
                color: [f32; 4],
        );

        fn present(
                &mut self,
                device: &Self::Device,
                swap_chain: &Self::SwapChain,
                sync_interval: u32,
        ) -> Result<(), GpuError>;

        /// Loads and compiles an effect bundle. A missing file is reported as
        /// [`GpuError::ResourceNotFound`].
        fn compile_effect(
                &mut self,
                device: &Self::Device,
                path: &Path,
                profile: &str,
        ) -> Result<Self::Effect, GpuError>;

        fn find_technique(
                &mut self,
                effect: &Self::Effect,
                name: &str,
        ) -> Result<TechniqueId, GpuError>;

        fn pass_count(
                &self,
                effect: &Self::Effect,
                technique: TechniqueId,
        ) -> usize;

        fn apply_pass(
                &mut self,
                device: &Self::Device,
                effect: &Self::Effect,
                technique: TechniqueId,
                pass: usize,
        ) -> Result<(), GpuError>;

        /// Checks that `pass` can be drawn with the currently bound render
        /// target, input layout, vertex buffer and topology, without applying
        /// it. An invalid pass is reported as [`GpuError::EffectCompilation`].
        fn validate_pass(
                &mut self,
                device: &Self::Device,
                effect: &Self::Effect,
                technique: TechniqueId,
                pass: usize,
        ) -> Result<(), GpuError>;

        /// Drops everything recorded since the last present. Called when a
        /// frame is abandoned halfway.
        fn discard_frame(
                &mut self,
                device: &Self::Device,
        );

        /// Creates an input layout validated against the input signature of
        /// the technique's first pass.
        fn create_input_layout(
                &mut self,
                device: &Self::Device,
                effect: &Self::Effect,
                technique: TechniqueId,
                elements: &[InputElement],
        ) -> Result<Self::InputLayout, GpuError>;

        fn create_buffer(
                &mut self,
                device: &Self::Device,
                desc: &BufferDesc,
                initial_data: &[u8],
        ) -> Result<Self::Buffer, GpuError>;

        fn set_vertex_buffer(
                &mut self,
                device: &Self::Device,
                buffer: &Self::Buffer,
                stride: u32,
                offset: u32,
        );

        fn set_input_layout(
                &mut self,
                device: &Self::Device,
                layout: &Self::InputLayout,
        );

        fn set_primitive_topology(
                &mut self,
                device: &Self::Device,
                topology: PrimitiveTopology,
        );

        fn draw(
                &mut self,
                device: &Self::Device,
                vertex_count: u32,
                start_vertex: u32,
        );

        /// Unbinds everything bound on the device.
        fn clear_state(
                &mut self,
                device: &Self::Device,
        );
}
