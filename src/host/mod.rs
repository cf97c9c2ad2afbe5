//! Host windowing capability.
//!
//! The host owns windows, their per-window storage and the event queue.
//! Everything the core needs from the operating system goes through the
//! [`Host`] trait so the router and the render surface never touch a
//! platform API directly.

pub mod paint;
#[cfg(not(target_arch = "wasm32"))]
pub mod winit_host;

use std::cell::RefCell;
use std::rc::Rc;

use crate::window::SurfaceWindow;

pub use paint::{PaintContext, PaintScope};

/// Opaque identifier of a host-managed window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowHandle(pub u64);

/// Instance object stored in per-window storage.
pub type SharedWindow = Rc<RefCell<dyn SurfaceWindow>>;

/// The function a host calls to deliver an event to a window.
pub type EntryPoint = fn(&mut dyn Host, WindowHandle, Event) -> EventResult;

/// Creation-time context handed to the host together with a window request.
///
/// Carries the instance that is not associated with the window yet; the
/// router picks it up from the `Create` event.
#[derive(Clone, Default)]
pub struct CreateParams
{
        pub instance: Option<SharedWindow>,
}

impl CreateParams
{
        pub fn new(instance: SharedWindow) -> Self
        {
                Self {
                        instance: Some(instance),
                }
        }
}

impl std::fmt::Debug for CreateParams
{
        fn fmt(
                &self,
                f: &mut std::fmt::Formatter<'_>,
        ) -> std::fmt::Result
        {
                f.debug_struct("CreateParams")
                        .field("instance", &self.instance.is_some())
                        .finish()
        }
}

/// Tagged event delivered by the host.
#[derive(Debug, Clone)]
pub enum Event
{
        Create(CreateParams),
        Paint,
        EraseBackground,
        Close,
        Destroy,
        Other
        {
                name: &'static str,
                params: (u64, u64),
        },
}

/// Payload-free tag of an [`Event`], handy for logs and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind
{
        Create,
        Paint,
        EraseBackground,
        Close,
        Destroy,
        Other,
}

impl Event
{
        pub fn kind(&self) -> EventKind
        {
                match self
                {
                        Event::Create(_) => EventKind::Create,
                        Event::Paint => EventKind::Paint,
                        Event::EraseBackground => EventKind::EraseBackground,
                        Event::Close => EventKind::Close,
                        Event::Destroy => EventKind::Destroy,
                        Event::Other {
                                ..
                        } => EventKind::Other,
                }
        }
}

/// What an entry point reports back to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult
{
        /// Processed locally, the host must not apply its default behavior.
        Handled,
        /// The host applied its default processing.
        Defaulted,
        /// Only meaningful for `Create`: the window must not be created.
        Rejected,
}

/// A queued event addressed to one window.
#[derive(Debug, Clone)]
pub struct Message
{
        pub handle: WindowHandle,
        pub event: Event,
}

/// Result of a blocking message retrieval.
#[derive(Debug)]
pub enum Pumped
{
        Message(Message),
        Quit(i32),
}

/// Window class descriptor.
#[derive(Debug, Clone)]
pub struct ClassDescriptor
{
        pub name: String,
        pub entry: EntryPoint,
        /// Request a repaint of the whole client area after a resize.
        pub redraw_on_resize: bool,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError
{
        #[error("window class `{0}` is already registered")]
        ClassExists(String),

        #[error("invalid window class: {0}")]
        InvalidClass(String),
}

/// Host windowing capability.
///
/// Implementations must not re-enter an entry point from inside
/// [`Host::default_handling`]; follow-up events (e.g. the `Destroy` that
/// results from closing a window) are queued instead. `create_window` is
/// the only operation that delivers an event synchronously.
pub trait Host
{
        fn register_class(
                &mut self,
                class: ClassDescriptor,
        ) -> Result<(), HostError>;

        /// Creates a window of a registered class and delivers `Create`
        /// through the class entry point before returning.
        fn create_window(
                &mut self,
                class_name: &str,
                title: &str,
                params: CreateParams,
        ) -> Option<WindowHandle>;

        /// Drops the window and its per-window storage.
        fn release_window(
                &mut self,
                handle: WindowHandle,
        );

        fn entry_point(
                &self,
                handle: WindowHandle,
        ) -> Option<EntryPoint>;

        fn set_entry_point(
                &mut self,
                handle: WindowHandle,
                entry: EntryPoint,
        );

        fn user_data(
                &self,
                handle: WindowHandle,
        ) -> Option<SharedWindow>;

        fn set_user_data(
                &mut self,
                handle: WindowHandle,
                data: SharedWindow,
        );

        /// Client-area size in physical pixels.
        fn client_size(
                &self,
                handle: WindowHandle,
        ) -> Option<(u32, u32)>;

        fn begin_paint(
                &mut self,
                handle: WindowHandle,
        ) -> PaintContext;

        fn end_paint(
                &mut self,
                handle: WindowHandle,
                context: PaintContext,
        );

        fn default_handling(
                &mut self,
                handle: WindowHandle,
                event: &Event,
        ) -> EventResult;

        fn show_window(
                &mut self,
                handle: WindowHandle,
        );

        /// Blocks until a message or the termination signal is available.
        fn next_message(&mut self) -> Pumped;

        fn translate_message(
                &mut self,
                _message: &Message,
        )
        {
        }

        fn post_quit(
                &mut self,
                exit_code: i32,
        );

        /// Blocking diagnostic dialog.
        fn show_message(
                &mut self,
                title: &str,
                text: &str,
        );
}
