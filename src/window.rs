use crate::host::{Event, EventResult, Host, WindowHandle};

/// Capability the router needs from a window-backed instance.
///
/// The router only ever talks to instances through this trait, so any
/// surface implementation can be plugged behind a registered class.
pub trait SurfaceWindow
{
        /// Binds the window handle. Binding happens once; later calls with a
        /// different handle are ignored.
        fn set_handle(
                &mut self,
                handle: WindowHandle,
        );

        fn handle(&self) -> Option<WindowHandle>;

        fn handle_event(
                &mut self,
                host: &mut dyn Host,
                handle: WindowHandle,
                event: Event,
        ) -> EventResult;

        /// Makes the bound window visible and requests its first paint.
        fn show(
                &self,
                host: &mut dyn Host,
        )
        {
                if let Some(handle) = self.handle()
                {
                        host.show_window(handle);
                }
                else
                {
                        log::warn!("show() called on an instance that has no window yet");
                }
        }
}
