//! [`Host`] on top of `winit`.
//!
//! `winit` pushes events into an [`ApplicationHandler`]; the router wants to
//! pull them one at a time. [`WinitHost`] bridges the two with
//! `pump_app_events`: every pump runs a short-lived [`Collector`] that turns
//! window events into queued [`Message`]s, and [`Host::next_message`] pops
//! that queue, pumping (and blocking) only when it is empty.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::error::OsError;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowAttributes, WindowId};

use super::{
        ClassDescriptor, CreateParams, EntryPoint, Event, EventResult, Host, HostError, Message,
        PaintContext, Pumped, SharedWindow, WindowHandle,
};
use crate::gpu::wgpu_driver::WindowTable;

/// Pumps allowed for a requested window to show up.
const CREATE_PUMP_LIMIT: usize = 64;

struct WindowSlot
{
        entry: EntryPoint,
        user_data: Option<SharedWindow>,
        redraw_on_resize: bool,
}

type WindowRequest = (WindowHandle, WindowAttributes);
type CreatedWindow = (WindowHandle, Result<Window, OsError>);

/// Turns `winit` events into queued messages for one pump.
struct Collector<'a>
{
        ids: &'a HashMap<WindowId, WindowHandle>,
        slots: &'a HashMap<WindowHandle, WindowSlot>,
        windows: &'a WindowTable,
        queue: &'a mut VecDeque<Message>,
        dirty: &'a mut HashSet<WindowHandle>,
        pending: Option<WindowRequest>,
        created: Option<CreatedWindow>,
}

impl Collector<'_>
{
        fn create_pending(
                &mut self,
                event_loop: &ActiveEventLoop,
        )
        {
                if let Some((handle, attributes)) = self.pending.take()
                {
                        self.created = Some((handle, event_loop.create_window(attributes)));
                }
        }

        fn resolve(
                &self,
                id: WindowId,
        ) -> Option<WindowHandle>
        {
                self.ids.get(&id).copied().or_else(|| match &self.created
                {
                        Some((handle, Ok(window))) if window.id() == id => Some(*handle),
                        _ => None,
                })
        }

        fn push(
                &mut self,
                handle: WindowHandle,
                event: Event,
        )
        {
                self.queue.push_back(Message {
                        handle,
                        event,
                });
        }
}

impl ApplicationHandler for Collector<'_>
{
        fn resumed(
                &mut self,
                event_loop: &ActiveEventLoop,
        )
        {
                self.create_pending(event_loop);
        }

        fn about_to_wait(
                &mut self,
                event_loop: &ActiveEventLoop,
        )
        {
                self.create_pending(event_loop);
        }

        fn window_event(
                &mut self,
                _event_loop: &ActiveEventLoop,
                id: WindowId,
                event: WindowEvent,
        )
        {
                let Some(handle) = self.resolve(id)
                else
                {
                        return;
                };

                match event
                {
                        WindowEvent::RedrawRequested =>
                        {
                                if self.dirty.remove(&handle)
                                {
                                        self.push(handle, Event::EraseBackground);
                                }

                                self.push(handle, Event::Paint);
                        }
                        WindowEvent::CloseRequested => self.push(handle, Event::Close),
                        WindowEvent::Resized(size) =>
                        {
                                self.push(
                                        handle,
                                        Event::Other {
                                                name: "resized",
                                                params: (size.width as u64, size.height as u64),
                                        },
                                );

                                if self.slots.get(&handle).is_some_and(|s| s.redraw_on_resize)
                                {
                                        self.dirty.insert(handle);

                                        if let Some(window) = self.windows.borrow().get(&handle)
                                        {
                                                window.request_redraw();
                                        }
                                }
                        }
                        WindowEvent::Focused(focused) => self.push(
                                handle,
                                Event::Other {
                                        name: "focused",
                                        params: (focused as u64, 0),
                                },
                        ),
                        other => log::trace!("Ignoring {:?} for {:?}", other, handle),
                }
        }
}

/// Windowing host backed by a `winit` event loop.
pub struct WinitHost
{
        // Dropped in declaration order: instances before their windows, the
        // event loop last.
        slots: HashMap<WindowHandle, WindowSlot>,
        windows: WindowTable,
        ids: HashMap<WindowId, WindowHandle>,
        classes: HashMap<String, ClassDescriptor>,
        queue: VecDeque<Message>,
        dirty: HashSet<WindowHandle>,
        quit: Option<i32>,
        next_handle: u64,
        paint_serial: u64,
        window_size: LogicalSize<u32>,
        event_loop: EventLoop<()>,
}

impl WinitHost
{
        pub fn new() -> anyhow::Result<Self>
        {
                let event_loop = EventLoop::new().context("Failed to create the event loop")?;

                event_loop.set_control_flow(ControlFlow::Wait);

                Ok(Self {
                        slots: HashMap::new(),
                        windows: Rc::new(RefCell::new(HashMap::new())),
                        ids: HashMap::new(),
                        classes: HashMap::new(),
                        queue: VecDeque::new(),
                        dirty: HashSet::new(),
                        quit: None,
                        next_handle: 1,
                        paint_serial: 0,
                        window_size: LogicalSize::new(800, 600),
                        event_loop,
                })
        }

        /// Inner size of windows created from now on.
        pub fn with_window_size(
                mut self,
                width: u32,
                height: u32,
        ) -> Self
        {
                self.window_size = LogicalSize::new(width, height);
                self
        }

        /// Window table a GPU driver needs to create surfaces.
        pub fn windows(&self) -> WindowTable
        {
                self.windows.clone()
        }

        /// Runs one pump. Returns the window created from `pending`, or the
        /// request itself when the loop was not ready to create it yet.
        fn pump(
                &mut self,
                timeout: Option<Duration>,
                pending: Option<WindowRequest>,
        ) -> (Option<CreatedWindow>, Option<WindowRequest>)
        {
                let mut collector = Collector {
                        ids: &self.ids,
                        slots: &self.slots,
                        windows: &self.windows,
                        queue: &mut self.queue,
                        dirty: &mut self.dirty,
                        pending,
                        created: None,
                };

                if let PumpStatus::Exit(code) = self.event_loop.pump_app_events(timeout, &mut collector)
                {
                        log::info!("Event loop exited with code {code}");
                        self.quit.get_or_insert(code);
                }

                (collector.created, collector.pending)
        }

        fn spawn_window(
                &mut self,
                handle: WindowHandle,
                attributes: WindowAttributes,
        ) -> Option<Window>
        {
                let mut pending = Some((handle, attributes));

                for _ in 0..CREATE_PUMP_LIMIT
                {
                        let (created, leftover) = self.pump(Some(Duration::ZERO), pending.take());

                        match created
                        {
                                Some((_, Ok(window))) => return Some(window),
                                Some((_, Err(e))) =>
                                {
                                        log::error!("Window creation failed: {e}");
                                        return None;
                                }
                                None if self.quit.is_some() => return None,
                                None => pending = leftover,
                        }
                }

                log::error!("Window {:?} was not created after {CREATE_PUMP_LIMIT} pumps", handle);

                None
        }
}

impl Host for WinitHost
{
        fn register_class(
                &mut self,
                class: ClassDescriptor,
        ) -> Result<(), HostError>
        {
                if class.name.trim().is_empty()
                {
                        return Err(HostError::InvalidClass(String::from("empty class name")));
                }

                if self.classes.contains_key(&class.name)
                {
                        return Err(HostError::ClassExists(class.name));
                }

                self.classes.insert(class.name.clone(), class);

                Ok(())
        }

        fn create_window(
                &mut self,
                class_name: &str,
                title: &str,
                params: CreateParams,
        ) -> Option<WindowHandle>
        {
                let Some(class) = self.classes.get(class_name)
                else
                {
                        log::error!("Window class `{class_name}` is not registered");
                        return None;
                };

                let entry = class.entry;
                let redraw_on_resize = class.redraw_on_resize;

                let handle = WindowHandle(self.next_handle);
                self.next_handle += 1;

                let attributes = Window::default_attributes()
                        .with_title(title)
                        .with_inner_size(self.window_size)
                        .with_visible(false);

                let window = Arc::new(self.spawn_window(handle, attributes)?);

                self.ids.insert(window.id(), handle);
                self.windows.borrow_mut().insert(handle, window);
                self.slots.insert(
                        handle,
                        WindowSlot {
                                entry,
                                user_data: None,
                                redraw_on_resize,
                        },
                );

                if entry(self, handle, Event::Create(params)) == EventResult::Rejected
                {
                        log::warn!("Create rejected for {:?}", handle);
                        self.release_window(handle);
                        return None;
                }

                Some(handle)
        }

        fn release_window(
                &mut self,
                handle: WindowHandle,
        )
        {
                // The instance may hold surfaces on the window; drop it first.
                if let Some(mut slot) = self.slots.remove(&handle)
                {
                        drop(slot.user_data.take());
                }

                self.windows.borrow_mut().remove(&handle);
                self.ids.retain(|_, h| *h != handle);
                self.dirty.remove(&handle);
                self.queue.retain(|m| m.handle != handle);

                log::debug!("Released window {:?}", handle);
        }

        fn entry_point(
                &self,
                handle: WindowHandle,
        ) -> Option<EntryPoint>
        {
                self.slots.get(&handle).map(|s| s.entry)
        }

        fn set_entry_point(
                &mut self,
                handle: WindowHandle,
                entry: EntryPoint,
        )
        {
                if let Some(slot) = self.slots.get_mut(&handle)
                {
                        slot.entry = entry;
                }
        }

        fn user_data(
                &self,
                handle: WindowHandle,
        ) -> Option<SharedWindow>
        {
                self.slots.get(&handle)?.user_data.clone()
        }

        fn set_user_data(
                &mut self,
                handle: WindowHandle,
                data: SharedWindow,
        )
        {
                if let Some(slot) = self.slots.get_mut(&handle)
                {
                        slot.user_data = Some(data);
                }
        }

        fn client_size(
                &self,
                handle: WindowHandle,
        ) -> Option<(u32, u32)>
        {
                self.windows.borrow().get(&handle).map(|w| {
                        let size = w.inner_size();
                        (size.width, size.height)
                })
        }

        fn begin_paint(
                &mut self,
                handle: WindowHandle,
        ) -> PaintContext
        {
                if let Some(window) = self.windows.borrow().get(&handle)
                {
                        window.pre_present_notify();
                }

                self.paint_serial += 1;

                PaintContext {
                        handle,
                        serial: self.paint_serial,
                }
        }

        fn end_paint(
                &mut self,
                handle: WindowHandle,
                context: PaintContext,
        )
        {
                if context.handle != handle || context.serial != self.paint_serial
                {
                        log::warn!("Mismatched paint context {:?} for {:?}", context, handle);
                }
        }

        fn default_handling(
                &mut self,
                handle: WindowHandle,
                event: &Event,
        ) -> EventResult
        {
                match event
                {
                        Event::Close =>
                        {
                                if let Some(window) = self.windows.borrow().get(&handle)
                                {
                                        window.set_visible(false);
                                }

                                self.queue.push_back(Message {
                                        handle,
                                        event: Event::Destroy,
                                });
                        }
                        Event::EraseBackground =>
                        {
                                self.dirty.remove(&handle);
                        }
                        _ => (),
                }

                EventResult::Defaulted
        }

        fn show_window(
                &mut self,
                handle: WindowHandle,
        )
        {
                if let Some(window) = self.windows.borrow().get(&handle)
                {
                        window.set_visible(true);
                        window.request_redraw();
                }
        }

        fn next_message(&mut self) -> Pumped
        {
                loop
                {
                        if let Some(message) = self.queue.pop_front()
                        {
                                return Pumped::Message(message);
                        }

                        if let Some(code) = self.quit
                        {
                                return Pumped::Quit(code);
                        }

                        if self.slots.is_empty()
                        {
                                log::warn!("No windows left and no quit posted, leaving the loop");
                                return Pumped::Quit(0);
                        }

                        self.pump(None, None);
                }
        }

        fn post_quit(
                &mut self,
                exit_code: i32,
        )
        {
                self.quit.get_or_insert(exit_code);
        }

        fn show_message(
                &mut self,
                title: &str,
                text: &str,
        )
        {
                log::error!("{title}: {text}");

                rfd::MessageDialog::new()
                        .set_level(rfd::MessageLevel::Error)
                        .set_title(title)
                        .set_description(text)
                        .set_buttons(rfd::MessageButtons::Ok)
                        .show();
        }
}
