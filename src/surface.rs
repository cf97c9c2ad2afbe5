//! Render surface.
//!
//! The instance object bound to a window. It creates its GPU device lazily
//! on the first paint, renders on every paint once the device is ready and
//! releases everything it holds, in reverse acquisition order, when the
//! window drops it.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::geometry::vertex::{TRIANGLE, Vertex};
use crate::gpu::effect::EFFECT_PROFILE;
use crate::gpu::{
        BufferDesc, DriverType, GpuDriver, GpuError, PrimitiveTopology, Slot, SwapChainDesc,
        TechniqueId, Viewport,
};
use crate::host::{Event, EventResult, Host, PaintScope, WindowHandle};
use crate::window::SurfaceWindow;

/// Clear color used when none is configured.
pub const DEFAULT_CLEAR_COLOR: [f32; 4] = [0.0, 0.125, 0.3, 1.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode
{
        /// Only clear the back buffer.
        #[default]
        Clear,
        /// Clear, then draw the static triangle with the configured effect.
        Triangle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceStatus
{
        Uninitialized,
        Initializing,
        Ready,
        InitFailed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceSettings
{
        pub mode: RenderMode,
        pub clear_color: [f32; 4],
        /// Driver types tried in order during device creation.
        pub drivers: Vec<DriverType>,
        pub effect_path: PathBuf,
        pub technique: String,
        pub vsync: bool,
}

impl Default for SurfaceSettings
{
        fn default() -> Self
        {
                Self {
                        mode: RenderMode::Clear,
                        clear_color: DEFAULT_CLEAR_COLOR,
                        drivers: DriverType::PREFERENCE.to_vec(),
                        effect_path: PathBuf::from("assets/effects/triangle.toml"),
                        technique: String::from("Render"),
                        vsync: false,
                }
        }
}

/// Everything acquired by a successful device initialization.
///
/// Fields are declared in release order, so an implicit drop releases them
/// in the same order as [`DeviceResources::release`].
struct DeviceResources<D: GpuDriver>
{
        vertex_buffer: Slot<D::Buffer>,
        input_layout: Slot<D::InputLayout>,
        effect: Slot<D::Effect>,
        render_target: Slot<D::RenderTargetView>,
        swap_chain: Slot<D::SwapChain>,
        device: Slot<D::Device>,
        technique: Option<TechniqueId>,
}

impl<D: GpuDriver> DeviceResources<D>
{
        fn empty() -> Self
        {
                Self {
                        vertex_buffer: Slot::empty("vertex buffer"),
                        input_layout: Slot::empty("input layout"),
                        effect: Slot::empty("effect"),
                        render_target: Slot::empty("render target view"),
                        swap_chain: Slot::empty("swap chain"),
                        device: Slot::empty("device"),
                        technique: None,
                }
        }

        fn release(
                mut self,
                driver: &mut D,
        )
        {
                if let Some(device) = self.device.get()
                {
                        driver.clear_state(device);
                }

                self.vertex_buffer.release();
                self.input_layout.release();
                self.effect.release();
                self.render_target.release();
                self.swap_chain.release();
                self.device.release();
                self.technique = None;
        }

        /// Acquires device, swap chain and render target and, in triangle
        /// mode, the effect pipeline inputs. Stops at the first failure and
        /// leaves whatever was acquired in `self` for the caller to release.
        fn acquire(
                &mut self,
                driver: &mut D,
                settings: &SurfaceSettings,
                handle: WindowHandle,
                (width, height): (u32, u32),
        ) -> Result<(), GpuError>
        {
                let desc = SwapChainDesc {
                        vsync: settings.vsync,
                        ..SwapChainDesc::windowed(handle, width, height)
                };

                let mut failures = Vec::new();

                for &driver_type in &settings.drivers
                {
                        match driver.create_device_and_swap_chain(driver_type, &desc)
                        {
                                Ok((device, swap_chain)) =>
                                {
                                        log::info!("Created device with the {:?} driver", driver_type);

                                        self.device.fill(device);
                                        self.swap_chain.fill(swap_chain);
                                        break;
                                }
                                Err(e) =>
                                {
                                        log::warn!("{:?} driver unavailable: {e}", driver_type);
                                        failures.push(format!("{driver_type:?}: {e}"));
                                }
                        }
                }

                let (Some(device), Some(swap_chain)) = (self.device.get(), self.swap_chain.get())
                else
                {
                        return Err(GpuError::NoDriver(failures.join("; ")));
                };

                let back_buffer = driver.back_buffer(swap_chain)?;
                let view = driver.create_render_target_view(device, &back_buffer);
                drop(back_buffer);

                let view = self.render_target.fill(view?);

                driver.set_render_target(device, view);
                driver.set_viewport(device, Viewport::full(width, height));

                if settings.mode == RenderMode::Clear
                {
                        return Ok(());
                }

                let effect = self.effect.fill(driver.compile_effect(
                        device,
                        &settings.effect_path,
                        EFFECT_PROFILE,
                )?);

                let technique = driver.find_technique(effect, &settings.technique)?;
                self.technique = Some(technique);

                let layout = self.input_layout.fill(driver.create_input_layout(
                        device,
                        effect,
                        technique,
                        Vertex::LAYOUT,
                )?);

                driver.set_input_layout(device, layout);

                let vertices: &[u8] = bytemuck::cast_slice(&TRIANGLE);

                let buffer = self.vertex_buffer.fill(driver.create_buffer(
                        device,
                        &BufferDesc::static_vertices(vertices.len()),
                        vertices,
                )?);

                driver.set_vertex_buffer(device, buffer, Vertex::STRIDE, 0);
                driver.set_primitive_topology(device, PrimitiveTopology::TriangleList);

                for pass in 0..driver.pass_count(effect, technique)
                {
                        driver.validate_pass(device, effect, technique, pass)?;
                }

                Ok(())
        }

        /// Clears, runs every pass of the technique and presents. A frame that
        /// fails halfway is discarded so nothing carries over to the next one.
        fn draw_frame(
                &self,
                driver: &mut D,
                clear_color: [f32; 4],
        ) -> Result<(), GpuError>
        {
                let (Some(device), Some(swap_chain), Some(view)) =
                        (self.device.get(), self.swap_chain.get(), self.render_target.get())
                else
                {
                        return Err(GpuError::NotReady);
                };

                driver.clear_render_target(device, view, clear_color);

                let result = self
                        .draw_passes(driver, device)
                        .and_then(|()| driver.present(device, swap_chain, 0));

                if result.is_err()
                {
                        driver.discard_frame(device);
                }

                result
        }

        fn draw_passes(
                &self,
                driver: &mut D,
                device: &D::Device,
        ) -> Result<(), GpuError>
        {
                let (Some(effect), Some(technique)) = (self.effect.get(), self.technique)
                else
                {
                        return Ok(());
                };

                for pass in 0..driver.pass_count(effect, technique)
                {
                        driver.apply_pass(device, effect, technique, pass)?;
                        driver.draw(device, TRIANGLE.len() as u32, 0);
                }

                Ok(())
        }
}

/// Window-bound owner of a GPU device and its per-frame drawing.
pub struct RenderSurface<D: GpuDriver>
{
        handle: Option<WindowHandle>,
        status: SurfaceStatus,
        resources: Option<DeviceResources<D>>,
        settings: SurfaceSettings,
        init_attempts: u32,
        frames_presented: u64,
        missing_effect_reported: bool,
        driver: D,
}

impl<D: GpuDriver> RenderSurface<D>
{
        pub fn new(
                driver: D,
                settings: SurfaceSettings,
        ) -> Self
        {
                Self {
                        handle: None,
                        status: SurfaceStatus::Uninitialized,
                        resources: None,
                        settings,
                        init_attempts: 0,
                        frames_presented: 0,
                        missing_effect_reported: false,
                        driver,
                }
        }

        pub fn status(&self) -> SurfaceStatus
        {
                self.status
        }

        pub fn is_ready(&self) -> bool
        {
                self.status == SurfaceStatus::Ready
        }

        pub fn init_attempts(&self) -> u32
        {
                self.init_attempts
        }

        pub fn frames_presented(&self) -> u64
        {
                self.frames_presented
        }

        /// Creates the device, swap chain and render target for `handle`,
        /// plus the triangle resources in triangle mode.
        ///
        /// On failure everything acquired by this attempt is released right
        /// away and the surface stays not ready; the next paint starts over.
        /// A missing effect bundle is reported once with a blocking dialog.
        pub fn initialize_device(
                &mut self,
                host: &mut dyn Host,
                handle: WindowHandle,
        ) -> Result<(), GpuError>
        {
                if self.is_ready()
                {
                        return Ok(());
                }

                self.status = SurfaceStatus::Initializing;
                self.init_attempts += 1;

                log::debug!("Initializing device for {:?} (attempt {})", handle, self.init_attempts);

                let mut pending = DeviceResources::empty();

                let result = match host.client_size(handle)
                {
                        Some(size) => pending.acquire(&mut self.driver, &self.settings, handle, size),
                        None => Err(GpuError::DeviceCreation(format!(
                                "{handle:?} has no client area"
                        ))),
                };

                match result
                {
                        Ok(()) =>
                        {
                                self.resources = Some(pending);
                                self.status = SurfaceStatus::Ready;

                                log::info!("Render surface for {:?} is ready", handle);

                                Ok(())
                        }
                        Err(error) =>
                        {
                                pending.release(&mut self.driver);
                                self.status = SurfaceStatus::InitFailed;

                                log::error!("Device initialization failed: {error}");

                                match &error
                                {
                                        GpuError::ResourceNotFound(path) if !self.missing_effect_reported =>
                                        {
                                                self.missing_effect_reported = true;

                                                host.show_message(
                                                        "Error",
                                                        &format!(
                                                                "The effect file `{}` cannot be located. \
                                                                 Please run this executable from the \
                                                                 directory that contains it.",
                                                                path.display()
                                                        ),
                                                );
                                        }
                                        _ => (),
                                }

                                Err(error)
                        }
                }
        }

        /// Draws one frame and presents it.
        pub fn render(&mut self) -> Result<(), GpuError>
        {
                if !self.is_ready()
                {
                        return Err(GpuError::NotReady);
                }

                let Some(resources) = self.resources.as_ref()
                else
                {
                        return Err(GpuError::NotReady);
                };

                resources.draw_frame(&mut self.driver, self.settings.clear_color)?;
                self.frames_presented += 1;

                Ok(())
        }

        fn paint(
                &mut self,
                host: &mut dyn Host,
                handle: WindowHandle,
        )
        {
                if !self.is_ready()
                {
                        // Failures are logged; the next paint retries.
                        self.initialize_device(host, handle).ok();
                }

                let _scope = PaintScope::begin(host, handle);

                if !self.is_ready()
                {
                        return;
                }

                if let Err(e) = self.render()
                {
                        log::error!("Unable to render {}", e);
                }
        }
}

impl<D: GpuDriver> SurfaceWindow for RenderSurface<D>
{
        fn set_handle(
                &mut self,
                handle: WindowHandle,
        )
        {
                match self.handle
                {
                        None => self.handle = Some(handle),
                        Some(bound) if bound != handle =>
                        {
                                log::warn!("Surface bound to {:?} ignored rebind to {:?}", bound, handle);
                        }
                        Some(_) => (),
                }
        }

        fn handle(&self) -> Option<WindowHandle>
        {
                self.handle
        }

        fn handle_event(
                &mut self,
                host: &mut dyn Host,
                handle: WindowHandle,
                event: Event,
        ) -> EventResult
        {
                match event
                {
                        Event::Paint =>
                        {
                                self.paint(host, handle);
                                EventResult::Handled
                        }
                        // The whole client area is repainted by the GPU.
                        Event::EraseBackground => EventResult::Handled,
                        Event::Destroy =>
                        {
                                host.post_quit(0);
                                EventResult::Handled
                        }
                        Event::Create(_) => EventResult::Handled,
                        other => host.default_handling(handle, &other),
                }
        }
}

impl<D: GpuDriver> Drop for RenderSurface<D>
{
        fn drop(&mut self)
        {
                if let Some(resources) = self.resources.take()
                {
                        log::debug!("Releasing GPU resources of {:?}", self.handle);

                        resources.release(&mut self.driver);
                }
        }
}
