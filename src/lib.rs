pub mod config;
pub mod error;
pub mod geometry;
pub mod gpu;
pub mod host;
pub mod router;
pub mod surface;
pub mod utils;
pub mod window;

#[cfg(test)]
pub(crate) mod testing;

use std::cell::RefCell;
use std::rc::Rc;

pub use crate::config::Config;
use crate::error::StartupError;
use crate::gpu::GpuDriver;
use crate::host::{Host, SharedWindow};
use crate::router::WindowRouter;
use crate::surface::RenderSurface;
use crate::window::SurfaceWindow;

/// Registers the window class, creates and shows one window backed by a
/// [`RenderSurface`] on `driver`, then runs the event loop.
///
/// # Returns
///
/// The exit code carried by the loop's termination signal.
pub fn launch<D: GpuDriver + 'static>(
        host: &mut dyn Host,
        config: &Config,
        driver: D,
) -> Result<i32, StartupError>
{
        let router = WindowRouter::new(config.window.class_name.clone());

        router.register_class(host)?;

        let surface = Rc::new(RefCell::new(RenderSurface::new(
                driver,
                config.surface_settings(),
        )));

        let shared: SharedWindow = surface.clone();

        router
                .create(host, shared, &config.window.title)
                .ok_or_else(|| StartupError::WindowCreation(config.window.class_name.clone()))?;

        surface.borrow().show(host);

        // The window's storage is now the only owner.
        drop(surface);

        Ok(WindowRouter::run(host))
}

/// Process entry: logging, config, banner, then [`launch`] on a `winit` host
/// with the `wgpu` driver.
#[cfg(not(target_arch = "wasm32"))]
pub fn run() -> i32
{
        utils::bootstrap::config_logging();

        let config = utils::bootstrap::create_config();

        utils::bootstrap::show_start_message(&config);

        let code = match start(&config)
        {
                Ok(code) => code,
                Err(e) =>
                {
                        log::error!("{e}");
                        e.exit_code()
                }
        };

        utils::exit::show_exit_message(&config, code);

        code
}

#[cfg(not(target_arch = "wasm32"))]
fn start(config: &Config) -> Result<i32, StartupError>
{
        let mut host = host::winit_host::WinitHost::new()
                .map_err(StartupError::Platform)?
                .with_window_size(config.window.width, config.window.height);

        let driver = gpu::wgpu_driver::WgpuDriver::new(host.windows());

        if log::log_enabled!(log::Level::Debug)
        {
                driver.log_all_adapters();
        }

        launch(&mut host, config, driver)
}
