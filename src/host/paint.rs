use super::{Host, WindowHandle};

/// Token returned by [`Host::begin_paint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaintContext
{
        pub handle: WindowHandle,
        pub serial: u64,
}

/// Scoped paint context.
///
/// Acquires the host paint context on construction and hands it back when
/// dropped, so every exit path of a paint handler releases it.
pub struct PaintScope<'h>
{
        host: &'h mut dyn Host,
        context: Option<PaintContext>,
}

impl<'h> PaintScope<'h>
{
        pub fn begin(
                host: &'h mut dyn Host,
                handle: WindowHandle,
        ) -> Self
        {
                let context = host.begin_paint(handle);

                Self {
                        host,
                        context: Some(context),
                }
        }

        pub fn context(&self) -> Option<PaintContext>
        {
                self.context
        }
}

impl Drop for PaintScope<'_>
{
        fn drop(&mut self)
        {
                if let Some(context) = self.context.take()
                {
                        self.host.end_paint(context.handle, context);
                }
        }
}
