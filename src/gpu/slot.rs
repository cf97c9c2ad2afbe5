/// Owning slot for a GPU handle.
///
/// A slot is either empty or owns exactly one handle. Releasing an empty
/// slot is a no-op, which keeps teardown of partially initialized resource
/// sets safe.
pub struct Slot<T>
{
        label: &'static str,
        value: Option<T>,
}

impl<T> Slot<T>
{
        pub const fn empty(label: &'static str) -> Self
        {
                Self {
                        label,
                        value: None,
                }
        }

        /// Stores `value` and returns a reference to it. A handle already in
        /// the slot is released first.
        pub fn fill(
                &mut self,
                value: T,
        ) -> &mut T
        {
                if self.release()
                {
                        log::warn!("{} slot was refilled", self.label);
                }

                self.value.insert(value)
        }

        pub fn get(&self) -> Option<&T>
        {
                self.value.as_ref()
        }

        pub fn is_present(&self) -> bool
        {
                self.value.is_some()
        }

        /// Drops the owned handle, if any. Returns whether something was
        /// released.
        pub fn release(&mut self) -> bool
        {
                match self.value.take()
                {
                        Some(value) =>
                        {
                                log::trace!("Releasing {}", self.label);
                                drop(value);
                                true
                        }
                        None => false,
                }
        }
}

impl<T> std::fmt::Debug for Slot<T>
{
        fn fmt(
                &self,
                f: &mut std::fmt::Formatter<'_>,
        ) -> std::fmt::Result
        {
                f.debug_struct("Slot")
                        .field("label", &self.label)
                        .field("present", &self.is_present())
                        .finish()
        }
}
