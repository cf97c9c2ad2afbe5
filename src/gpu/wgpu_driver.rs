//! [`GpuDriver`] on top of `wgpu`.
//!
//! `wgpu` has no immediate-mode device context, so this driver keeps one:
//! bind calls update [`BoundState`], clears and draws are recorded as
//! [`Command`]s and the whole frame is encoded and submitted on
//! [`GpuDriver::present`]. Rendering goes to an offscreen back buffer that
//! lives as long as the swap chain; present copies it onto the surface
//! texture.

use std::cell::RefCell;
use std::collections::HashMap;
use std::ops::Range;
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use wgpu::util::{BufferInitDescriptor, DeviceExt};
use winit::window::Window;

use super::effect::{EffectBundle, PassDesc};
use super::{
        BufferDesc, DriverType, ElementFormat, GpuDriver, GpuError, InputElement, PixelFormat, PrimitiveTopology, SwapChainDesc, TechniqueId, Viewport,
};
use crate::host::WindowHandle;

/// Windows the driver may present to, shared with the host that owns them.
pub type WindowTable = Rc<RefCell<HashMap<WindowHandle, Arc<Window>>>>;

#[derive(Debug)]
pub struct WgpuDevice
{
        pub adapter: wgpu::Adapter,
        pub device: wgpu::Device,
        pub queue: wgpu::Queue,
}

#[derive(Debug)]
pub struct WgpuSwapChain
{
        pub surface: wgpu::Surface<'static>,
        pub configuration: wgpu::SurfaceConfiguration,
        back_buffer: Arc<wgpu::Texture>,
        _window: Arc<Window>,
}

#[derive(Debug)]
pub struct WgpuTexture(Arc<wgpu::Texture>);

#[derive(Debug, Clone)]
pub struct WgpuRenderTarget
{
        view: Arc<wgpu::TextureView>,
        format: wgpu::TextureFormat,
        size: (u32, u32),
}

#[derive(Debug)]
pub struct WgpuEffect
{
        id: u64,
        bundle: EffectBundle,
        module: wgpu::ShaderModule,
}

#[derive(Debug, Clone)]
pub struct WgpuInputLayout
{
        id: u64,
        attributes: Arc<[wgpu::VertexAttribute]>,
}

#[derive(Debug)]
pub struct WgpuBuffer
{
        buffer: Arc<wgpu::Buffer>,
}

#[derive(Debug, Clone)]
struct BoundVertexBuffer
{
        buffer: Arc<wgpu::Buffer>,
        stride: u32,
        offset: u32,
}

/// State bound on the emulated device context.
#[derive(Debug, Clone)]
struct BoundState
{
        target: Option<WgpuRenderTarget>,
        viewport: Option<Viewport>,
        layout: Option<WgpuInputLayout>,
        vertex_buffer: Option<BoundVertexBuffer>,
        topology: PrimitiveTopology,
        pipeline: Option<Arc<wgpu::RenderPipeline>>,
}

impl Default for BoundState
{
        fn default() -> Self
        {
                Self {
                        target: None,
                        viewport: None,
                        layout: None,
                        vertex_buffer: None,
                        topology: PrimitiveTopology::TriangleList,
                        pipeline: None,
                }
        }
}

#[derive(Debug)]
struct DrawCall
{
        view: Arc<wgpu::TextureView>,
        viewport: Option<Viewport>,
        pipeline: Arc<wgpu::RenderPipeline>,
        vertex_buffer: Option<BoundVertexBuffer>,
        vertices: Range<u32>,
}

#[derive(Debug)]
enum Command
{
        Clear
        {
                view: Arc<wgpu::TextureView>,
                color: wgpu::Color,
        },
        Draw(DrawCall),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PipelineKey
{
        effect: u64,
        technique: usize,
        pass: usize,
        layout: u64,
        stride: u32,
        topology: PrimitiveTopology,
        format: wgpu::TextureFormat,
}

#[derive(Debug)]
pub struct WgpuDriver
{
        instance: wgpu::Instance,
        windows: WindowTable,
        bound: BoundState,
        commands: Vec<Command>,
        pipelines: HashMap<PipelineKey, Arc<wgpu::RenderPipeline>>,
        next_id: u64,
}

impl WgpuDriver
{
        pub fn new(windows: WindowTable) -> Self
        {
                let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
                        backends: wgpu::Backends::PRIMARY,
                        ..Default::default()
                });

                Self {
                        instance,
                        windows,
                        bound: BoundState::default(),
                        commands: Vec::new(),
                        pipelines: HashMap::new(),
                        next_id: 1,
                }
        }

        pub fn log_all_adapters(&self)
        {
                log::info!("All Available Adapters:");

                self.instance
                        .enumerate_adapters(wgpu::Backends::PRIMARY)
                        .iter()
                        .for_each(|a| log::info!("\t{:#?}", a.get_info()));
        }

        fn next_id(&mut self) -> u64
        {
                let id = self.next_id;
                self.next_id += 1;
                id
        }

        fn window(
                &self,
                handle: WindowHandle,
        ) -> Result<Arc<Window>, GpuError>
        {
                self.windows
                        .borrow()
                        .get(&handle)
                        .cloned()
                        .ok_or_else(|| GpuError::DeviceCreation(format!("no window for {handle:?}")))
        }

        fn adapter(
                &self,
                driver_type: DriverType,
                surface: &wgpu::Surface<'static>,
        ) -> Result<wgpu::Adapter, GpuError>
        {
                let adapter = pollster::block_on(self.instance.request_adapter(
                        &wgpu::RequestAdapterOptions {
                                power_preference: wgpu::PowerPreference::HighPerformance,
                                compatible_surface: Some(surface),
                                // Reference maps onto the software fallback adapter.
                                force_fallback_adapter: driver_type == DriverType::Reference,
                        },
                ))
                .map_err(|e| GpuError::DeviceCreation(e.to_string()))?;

                let info = adapter.get_info();

                if driver_type == DriverType::Hardware && info.device_type == wgpu::DeviceType::Cpu
                {
                        return Err(GpuError::DeviceCreation(format!(
                                "`{}` is a software adapter",
                                info.name
                        )));
                }

                log::info!("Using adapter `{}` ({:?}, {:?})", info.name, info.device_type, info.backend);

                Ok(adapter)
        }

        fn device_queue(adapter: &wgpu::Adapter) -> Result<(wgpu::Device, wgpu::Queue), GpuError>
        {
                let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
                        label: Some("Paintbox Device"),
                        required_features: wgpu::Features::empty(),
                        required_limits: wgpu::Limits::downlevel_defaults()
                                .using_resolution(adapter.limits()),
                        memory_hints: Default::default(),
                        trace: wgpu::Trace::Off,
                }))
                .map_err(|e| GpuError::DeviceCreation(e.to_string()))?;

                device.on_uncaptured_error(Box::new(|error: wgpu::Error| {
                        log::error!("Uncaptured wgpu error: {error}");
                }));

                Ok((device, queue))
        }

        fn compile_bundle(
                &mut self,
                device: &WgpuDevice,
                bundle: EffectBundle,
        ) -> Result<WgpuEffect, GpuError>
        {
                let label = bundle.path.display().to_string();

                device.device.push_error_scope(wgpu::ErrorFilter::Validation);

                let module = device.device.create_shader_module(wgpu::ShaderModuleDescriptor {
                        label: Some(label.as_str()),
                        source: wgpu::ShaderSource::Wgsl(bundle.source.as_str().into()),
                });

                if let Some(error) = pollster::block_on(device.device.pop_error_scope())
                {
                        return Err(GpuError::EffectCompilation {
                                path: bundle.path.clone(),
                                reason: error.to_string(),
                        });
                }

                log::info!(
                        "Compiled effect `{}` with {} technique(s)",
                        bundle.path.display(),
                        bundle.manifest.techniques.len()
                );

                Ok(WgpuEffect {
                        id: self.next_id(),
                        bundle,
                        module,
                })
        }

        fn pipeline(
                &mut self,
                device: &WgpuDevice,
                effect: &WgpuEffect,
                technique: TechniqueId,
                pass: usize,
        ) -> Result<Arc<wgpu::RenderPipeline>, GpuError>
        {
                let desc = effect.bundle.pass(technique, pass)?;

                let target = self.bound.target.clone().ok_or_else(|| {
                        GpuError::RenderTarget(String::from("no render target bound"))
                })?;

                let layout = self.bound.layout.clone().ok_or_else(|| {
                        GpuError::InputLayout(String::from("no input layout bound"))
                })?;

                let stride = self.bound.vertex_buffer.as_ref().map_or(0, |b| b.stride);

                if stride == 0 && !layout.attributes.is_empty()
                {
                        return Err(GpuError::InputLayout(String::from("no vertex buffer bound")));
                }

                let key = PipelineKey {
                        effect: effect.id,
                        technique: technique.0,
                        pass,
                        layout: layout.id,
                        stride,
                        topology: self.bound.topology,
                        format: target.format,
                };

                if let Some(pipeline) = self.pipelines.get(&key)
                {
                        return Ok(pipeline.clone());
                }

                let pipeline = Arc::new(build_pipeline(
                        &device.device,
                        effect,
                        desc,
                        &layout,
                        stride,
                        self.bound.topology,
                        target.format,
                )?);

                self.pipelines.insert(key, pipeline.clone());

                Ok(pipeline)
        }
}

fn build_pipeline(
        device: &wgpu::Device,
        effect: &WgpuEffect,
        pass: &PassDesc,
        layout: &WgpuInputLayout,
        stride: u32,
        topology: PrimitiveTopology,
        format: wgpu::TextureFormat,
) -> Result<wgpu::RenderPipeline, GpuError>
{
        let vertex_buffers = [wgpu::VertexBufferLayout {
                array_stride: stride as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &layout.attributes[..],
        }];

        let buffers: &[wgpu::VertexBufferLayout] = if layout.attributes.is_empty()
        {
                &[]
        }
        else
        {
                &vertex_buffers
        };

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Effect Pipeline Layout"),
                bind_group_layouts: &[],
                push_constant_ranges: &[],
        });

        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(pass.name.as_str()),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                        module: &effect.module,
                        entry_point: Some(pass.vertex.as_str()),
                        buffers,
                        compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                        module: &effect.module,
                        entry_point: Some(pass.fragment.as_str()),
                        targets: &[Some(wgpu::ColorTargetState {
                                format,
                                blend: Some(wgpu::BlendState::REPLACE),
                                write_mask: wgpu::ColorWrites::ALL,
                        })],
                        compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState {
                        topology: primitive_topology(topology),
                        strip_index_format: None,
                        front_face: wgpu::FrontFace::Cw,
                        cull_mode: None,
                        polygon_mode: wgpu::PolygonMode::Fill,
                        conservative: false,
                        unclipped_depth: false,
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
        });

        match pollster::block_on(device.pop_error_scope())
        {
                Some(error) => Err(GpuError::EffectCompilation {
                        path: effect.bundle.path.clone(),
                        reason: format!("pass `{}`: {error}", pass.name),
                }),
                None => Ok(pipeline),
        }
}

impl GpuDriver for WgpuDriver
{
        type Device = WgpuDevice;
        type SwapChain = WgpuSwapChain;
        type Texture = WgpuTexture;
        type RenderTargetView = WgpuRenderTarget;
        type Effect = WgpuEffect;
        type InputLayout = WgpuInputLayout;
        type Buffer = WgpuBuffer;

        fn create_device_and_swap_chain(
                &mut self,
                driver_type: DriverType,
                desc: &SwapChainDesc,
        ) -> Result<(WgpuDevice, WgpuSwapChain), GpuError>
        {
                if desc.sample_count != 1
                {
                        return Err(GpuError::DeviceCreation(format!(
                                "{} samples per pixel requested, only 1 is supported",
                                desc.sample_count
                        )));
                }

                let window = self.window(desc.output_window)?;

                if !desc.windowed
                {
                        window.set_fullscreen(Some(winit::window::Fullscreen::Borderless(None)));
                }

                let surface = self
                        .instance
                        .create_surface(window.clone())
                        .map_err(|e| GpuError::DeviceCreation(e.to_string()))?;

                let adapter = self.adapter(driver_type, &surface)?;
                let (device, queue) = Self::device_queue(&adapter)?;

                let capabilities = surface.get_capabilities(&adapter);

                let format = pick_format(&capabilities.formats, desc.format).ok_or_else(|| {
                        GpuError::DeviceCreation(String::from("surface reports no formats"))
                })?;

                if !capabilities.usages.contains(wgpu::TextureUsages::COPY_DST)
                {
                        return Err(GpuError::DeviceCreation(String::from(
                                "surface textures cannot be copy destinations",
                        )));
                }

                let configuration = wgpu::SurfaceConfiguration {
                        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_DST,
                        format,
                        width: desc.width.max(1),
                        height: desc.height.max(1),
                        present_mode: if desc.vsync
                        {
                                wgpu::PresentMode::Fifo
                        }
                        else
                        {
                                wgpu::PresentMode::AutoNoVsync
                        },
                        desired_maximum_frame_latency: desc.buffer_count.max(1),
                        alpha_mode: capabilities
                                .alpha_modes
                                .first()
                                .copied()
                                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
                        view_formats: vec![],
                };

                surface.configure(&device, &configuration);

                log::debug!(
                        "Configured {}x{} {:?} surface, {} Hz requested",
                        configuration.width,
                        configuration.height,
                        format,
                        desc.refresh_rate.numerator / desc.refresh_rate.denominator.max(1)
                );

                let back_buffer = device.create_texture(&wgpu::TextureDescriptor {
                        label: Some("Back Buffer"),
                        size: wgpu::Extent3d {
                                width: configuration.width,
                                height: configuration.height,
                                depth_or_array_layers: 1,
                        },
                        mip_level_count: 1,
                        sample_count: 1,
                        dimension: wgpu::TextureDimension::D2,
                        format,
                        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
                        view_formats: &[],
                });

                Ok((
                        WgpuDevice {
                                adapter,
                                device,
                                queue,
                        },
                        WgpuSwapChain {
                                surface,
                                configuration,
                                back_buffer: Arc::new(back_buffer),
                                _window: window,
                        },
                ))
        }

        fn back_buffer(
                &mut self,
                swap_chain: &WgpuSwapChain,
        ) -> Result<WgpuTexture, GpuError>
        {
                Ok(WgpuTexture(swap_chain.back_buffer.clone()))
        }

        fn create_render_target_view(
                &mut self,
                _device: &WgpuDevice,
                texture: &WgpuTexture,
        ) -> Result<WgpuRenderTarget, GpuError>
        {
                let texture = &texture.0;

                if !texture.usage().contains(wgpu::TextureUsages::RENDER_ATTACHMENT)
                {
                        return Err(GpuError::RenderTarget(String::from(
                                "texture is not a render attachment",
                        )));
                }

                Ok(WgpuRenderTarget {
                        view: Arc::new(texture.create_view(&wgpu::TextureViewDescriptor::default())),
                        format: texture.format(),
                        size: (texture.width(), texture.height()),
                })
        }

        fn set_render_target(
                &mut self,
                _device: &WgpuDevice,
                view: &WgpuRenderTarget,
        )
        {
                self.bound.target = Some(view.clone());
        }

        fn set_viewport(
                &mut self,
                _device: &WgpuDevice,
                viewport: Viewport,
        )
        {
                self.bound.viewport = Some(viewport);
        }

        fn clear_render_target(
                &mut self,
                _device: &WgpuDevice,
                view: &WgpuRenderTarget,
                color: [f32; 4],
        )
        {
                self.commands.push(Command::Clear {
                        view: view.view.clone(),
                        color: clear_color(color),
                });
        }

        fn present(
                &mut self,
                device: &WgpuDevice,
                swap_chain: &WgpuSwapChain,
                sync_interval: u32,
        ) -> Result<(), GpuError>
        {
                if sync_interval > 0 && swap_chain.configuration.present_mode != wgpu::PresentMode::Fifo
                {
                        log::trace!("Sync interval {sync_interval} ignored, present mode is fixed");
                }

                let commands = std::mem::take(&mut self.commands);

                let frame = swap_chain.surface.get_current_texture().map_err(|e| match e
                {
                        wgpu::SurfaceError::Outdated => GpuError::Present(String::from("Surface outdated")),
                        e => GpuError::Present(e.to_string()),
                })?;

                let mut encoder = device.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                        label: Some("Main Render Encoder"),
                });

                for command in &commands
                {
                        encode(&mut encoder, command);
                }

                let back_buffer = &swap_chain.back_buffer;

                encoder.copy_texture_to_texture(
                        back_buffer.as_image_copy(),
                        frame.texture.as_image_copy(),
                        wgpu::Extent3d {
                                width: back_buffer.width().min(frame.texture.width()),
                                height: back_buffer.height().min(frame.texture.height()),
                                depth_or_array_layers: 1,
                        },
                );

                device.queue.submit(std::iter::once(encoder.finish()));

                frame.present();

                Ok(())
        }

        fn compile_effect(
                &mut self,
                device: &WgpuDevice,
                path: &Path,
                profile: &str,
        ) -> Result<WgpuEffect, GpuError>
        {
                let bundle = EffectBundle::load(path)?;

                bundle.check_profile(profile)?;

                self.compile_bundle(device, bundle)
        }

        fn find_technique(
                &mut self,
                effect: &WgpuEffect,
                name: &str,
        ) -> Result<TechniqueId, GpuError>
        {
                effect.bundle.find_technique(name)
        }

        fn pass_count(
                &self,
                effect: &WgpuEffect,
                technique: TechniqueId,
        ) -> usize
        {
                effect.bundle.pass_count(technique)
        }

        fn apply_pass(
                &mut self,
                device: &WgpuDevice,
                effect: &WgpuEffect,
                technique: TechniqueId,
                pass: usize,
        ) -> Result<(), GpuError>
        {
                let pipeline = self.pipeline(device, effect, technique, pass)?;

                self.bound.pipeline = Some(pipeline);

                Ok(())
        }

        fn validate_pass(
                &mut self,
                device: &WgpuDevice,
                effect: &WgpuEffect,
                technique: TechniqueId,
                pass: usize,
        ) -> Result<(), GpuError>
        {
                self.pipeline(device, effect, technique, pass).map(|_| ())
        }

        fn discard_frame(
                &mut self,
                _device: &WgpuDevice,
        )
        {
                if !self.commands.is_empty()
                {
                        log::debug!("Discarding {} recorded command(s)", self.commands.len());
                }

                self.commands.clear();
                self.bound.pipeline = None;
        }

        fn create_input_layout(
                &mut self,
                _device: &WgpuDevice,
                effect: &WgpuEffect,
                technique: TechniqueId,
                elements: &[InputElement],
        ) -> Result<WgpuInputLayout, GpuError>
        {
                let pass = effect.bundle.pass(technique, 0)?;

                let locations = pass
                        .signature_locations(elements)
                        .map_err(GpuError::InputLayout)?;

                let attributes = elements
                        .iter()
                        .zip(locations)
                        .map(|(element, shader_location)| wgpu::VertexAttribute {
                                format: vertex_format(element.format),
                                offset: element.offset as wgpu::BufferAddress,
                                shader_location,
                        })
                        .collect();

                Ok(WgpuInputLayout {
                        id: self.next_id(),
                        attributes,
                })
        }

        fn create_buffer(
                &mut self,
                device: &WgpuDevice,
                desc: &BufferDesc,
                initial_data: &[u8],
        ) -> Result<WgpuBuffer, GpuError>
        {
                if desc.byte_width == 0 || initial_data.len() != desc.byte_width
                {
                        return Err(GpuError::Buffer(format!(
                                "{} bytes of data for a {} byte buffer",
                                initial_data.len(),
                                desc.byte_width
                        )));
                }

                let buffer = device.device.create_buffer_init(&BufferInitDescriptor {
                        label: Some("Vertex Buffer"),
                        contents: initial_data,
                        usage: wgpu::BufferUsages::VERTEX,
                });

                Ok(WgpuBuffer {
                        buffer: Arc::new(buffer),
                })
        }

        fn set_vertex_buffer(
                &mut self,
                _device: &WgpuDevice,
                buffer: &WgpuBuffer,
                stride: u32,
                offset: u32,
        )
        {
                self.bound.vertex_buffer = Some(BoundVertexBuffer {
                        buffer: buffer.buffer.clone(),
                        stride,
                        offset,
                });
        }

        fn set_input_layout(
                &mut self,
                _device: &WgpuDevice,
                layout: &WgpuInputLayout,
        )
        {
                self.bound.layout = Some(layout.clone());
        }

        fn set_primitive_topology(
                &mut self,
                _device: &WgpuDevice,
                topology: PrimitiveTopology,
        )
        {
                self.bound.topology = topology;
        }

        fn draw(
                &mut self,
                _device: &WgpuDevice,
                vertex_count: u32,
                start_vertex: u32,
        )
        {
                let (Some(target), Some(pipeline)) = (&self.bound.target, &self.bound.pipeline)
                else
                {
                        log::warn!("Draw without a render target or an applied pass, skipped");
                        return;
                };

                self.commands.push(Command::Draw(DrawCall {
                        view: target.view.clone(),
                        viewport: self.bound.viewport.map(|v| clamp_viewport(v, target.size)),
                        pipeline: pipeline.clone(),
                        vertex_buffer: self.bound.vertex_buffer.clone(),
                        vertices: start_vertex..start_vertex + vertex_count,
                }));
        }

        fn clear_state(
                &mut self,
                _device: &WgpuDevice,
        )
        {
                self.bound = BoundState::default();
                self.commands.clear();
                self.pipelines.clear();
        }
}

fn encode(
        encoder: &mut wgpu::CommandEncoder,
        command: &Command,
)
{
        let (view, load) = match command
        {
                Command::Clear {
                        view,
                        color,
                } => (view, wgpu::LoadOp::Clear(*color)),
                Command::Draw(draw) => (&draw.view, wgpu::LoadOp::Load),
        };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Paintbox Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                                load,
                                store: wgpu::StoreOp::Store,
                        },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
        });

        if let Command::Draw(draw) = command
        {
                if let Some(v) = draw.viewport
                {
                        pass.set_viewport(v.x, v.y, v.width, v.height, v.min_depth, v.max_depth);
                }

                pass.set_pipeline(&draw.pipeline);

                if let Some(bound) = &draw.vertex_buffer
                {
                        pass.set_vertex_buffer(0, bound.buffer.slice(bound.offset as u64..));
                }

                pass.draw(draw.vertices.clone(), 0..1);
        }
}

/// Picks the surface format for a requested pixel format: the exact match,
/// then its channel-swapped sibling, then any non-sRGB format, then the
/// first one offered.
pub fn pick_format(
        available: &[wgpu::TextureFormat],
        requested: PixelFormat,
) -> Option<wgpu::TextureFormat>
{
        let (exact, sibling) = match requested
        {
                PixelFormat::Rgba8Unorm => (wgpu::TextureFormat::Rgba8Unorm, wgpu::TextureFormat::Bgra8Unorm),
                PixelFormat::Bgra8Unorm => (wgpu::TextureFormat::Bgra8Unorm, wgpu::TextureFormat::Rgba8Unorm),
        };

        available
                .iter()
                .find(|f| **f == exact)
                .or_else(|| available.iter().find(|f| **f == sibling))
                .or_else(|| available.iter().find(|f| !f.is_srgb()))
                .or_else(|| available.first())
                .copied()
}

pub fn vertex_format(format: ElementFormat) -> wgpu::VertexFormat
{
        match format
        {
                ElementFormat::Float32x2 => wgpu::VertexFormat::Float32x2,
                ElementFormat::Float32x3 => wgpu::VertexFormat::Float32x3,
                ElementFormat::Float32x4 => wgpu::VertexFormat::Float32x4,
        }
}

fn primitive_topology(topology: PrimitiveTopology) -> wgpu::PrimitiveTopology
{
        match topology
        {
                PrimitiveTopology::TriangleList => wgpu::PrimitiveTopology::TriangleList,
        }
}

fn clear_color([r, g, b, a]: [f32; 4]) -> wgpu::Color
{
        wgpu::Color {
                r: r as f64,
                g: g as f64,
                b: b as f64,
                a: a as f64,
        }
}

/// Keeps a viewport inside its render target, which `wgpu` validates.
fn clamp_viewport(
        viewport: Viewport,
        (width, height): (u32, u32),
) -> Viewport
{
        let x = viewport.x.clamp(0.0, width as f32);
        let y = viewport.y.clamp(0.0, height as f32);

        Viewport {
                x,
                y,
                width: viewport.width.min(width as f32 - x),
                height: viewport.height.min(height as f32 - y),
                ..viewport
        }
}
