//! Window router.
//!
//! The host has a single way to reach application code: the entry point
//! stored for a window. [`WindowRouter::dispatch`] is installed as the class
//! entry point; when the `Create` event arrives it associates the instance
//! with the window and swaps the window's entry point to
//! [`WindowRouter::instance_dispatch`], so every later event goes straight to
//! the instance.

use crate::error::StartupError;
use crate::host::{
        ClassDescriptor, CreateParams, Event, EventKind, EventResult, Host, Message, Pumped,
        SharedWindow, WindowHandle,
};

/// One router per registered window class.
#[derive(Debug, Clone)]
pub struct WindowRouter
{
        class_name: String,
}

impl WindowRouter
{
        pub fn new(class_name: impl Into<String>) -> Self
        {
                Self {
                        class_name: class_name.into(),
                }
        }

        /// Registers the window class with [`WindowRouter::dispatch`] as its
        /// entry point.
        pub fn register_class(
                &self,
                host: &mut dyn Host,
        ) -> Result<(), StartupError>
        {
                host.register_class(ClassDescriptor {
                        name: self.class_name.clone(),
                        entry: Self::dispatch,
                        redraw_on_resize: true,
                })
                .map_err(StartupError::ClassRegistration)?;

                log::info!("Registered window class `{}`", self.class_name);

                Ok(())
        }

        /// Requests a window of this class, handing `instance` over as
        /// creation-time context.
        pub fn create(
                &self,
                host: &mut dyn Host,
                instance: SharedWindow,
                title: &str,
        ) -> Option<WindowHandle>
        {
                let handle =
                        host.create_window(&self.class_name, title, CreateParams::new(instance))?;

                log::info!("Created window {:?} (`{}`)", handle, title);

                Some(handle)
        }

        /// Class entry point.
        pub fn dispatch(
                host: &mut dyn Host,
                handle: WindowHandle,
                event: Event,
        ) -> EventResult
        {
                match event
                {
                        Event::Create(params) =>
                        {
                                let Some(instance) = params.instance.clone()
                                else
                                {
                                        log::error!("Create for {:?} carried no instance", handle);
                                        return EventResult::Rejected;
                                };

                                // Associate once; a window that already has storage keeps it.
                                if host.user_data(handle).is_none()
                                {
                                        instance.borrow_mut().set_handle(handle);
                                        host.set_user_data(handle, instance);
                                        host.set_entry_point(handle, Self::instance_dispatch);

                                        log::debug!("Entry point of {:?} retargeted to its instance", handle);
                                }

                                Self::instance_dispatch(host, handle, Event::Create(params))
                        }
                        Event::Destroy =>
                        {
                                host.post_quit(0);
                                EventResult::Handled
                        }
                        other => host.default_handling(handle, &other),
                }
        }

        /// Per-instance entry point installed after creation.
        pub fn instance_dispatch(
                host: &mut dyn Host,
                handle: WindowHandle,
                event: Event,
        ) -> EventResult
        {
                let Some(instance) = host.user_data(handle)
                else
                {
                        return host.default_handling(handle, &event);
                };

                let Ok(mut window) = instance.try_borrow_mut()
                else
                {
                        log::warn!(
                                "{:?} delivered to {:?} while its instance is busy",
                                event.kind(),
                                handle
                        );
                        return host.default_handling(handle, &event);
                };

                window.handle_event(host, handle, event)
        }

        /// Pumps host messages until the termination signal and returns its
        /// exit code.
        pub fn run(host: &mut dyn Host) -> i32
        {
                log::info!("Entering event loop");

                loop
                {
                        match host.next_message()
                        {
                                Pumped::Quit(code) =>
                                {
                                        log::info!("Event loop finished with exit code {code}");
                                        return code;
                                }
                                Pumped::Message(message) =>
                                {
                                        host.translate_message(&message);

                                        Self::deliver(host, message);
                                }
                        }
                }
        }

        fn deliver(
                host: &mut dyn Host,
                message: Message,
        )
        {
                let Message {
                        handle,
                        event,
                } = message;

                let kind = event.kind();

                match host.entry_point(handle)
                {
                        Some(entry) =>
                        {
                                entry(host, handle, event);
                        }
                        None =>
                        {
                                log::trace!("Dropping {:?} for unknown window {:?}", kind, handle);
                                return;
                        }
                }

                if kind == EventKind::Destroy
                {
                        host.release_window(handle);
                }
        }
}
