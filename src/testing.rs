//! Scripted host and recording driver used by the unit tests.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::gpu::{
        BufferDesc, DriverType, GpuDriver, GpuError, InputElement, PrimitiveTopology, SwapChainDesc,
        TechniqueId, Viewport,
};
use crate::host::{
        ClassDescriptor, CreateParams, EntryPoint, Event, EventKind, EventResult, Host, HostError,
        Message, PaintContext, Pumped, SharedWindow, WindowHandle,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall
{
        RegisterClass(String),
        CreateWindow(String),
        SetUserData(WindowHandle),
        SetEntryPoint(WindowHandle),
        ShowWindow(WindowHandle),
        BeginPaint(WindowHandle),
        EndPaint(WindowHandle),
        DefaultHandling(EventKind),
        Translate(EventKind),
        PostQuit(i32),
        ShowMessage(String),
        Released(WindowHandle),
}

struct MockWindow
{
        entry: EntryPoint,
        user_data: Option<SharedWindow>,
        visible: bool,
}

/// In-memory [`Host`].
///
/// Every created window gets the scripted events queued right after its
/// `Create`. `Close` is turned into a queued `Destroy` by default handling,
/// and an empty queue without a posted quit ends the loop with `-1`.
pub struct MockHost
{
        classes: HashMap<String, ClassDescriptor>,
        windows: HashMap<WindowHandle, MockWindow>,
        queue: VecDeque<Message>,
        script: Vec<Event>,
        quit: Option<i32>,
        next_handle: u64,
        paint_serial: u64,
        pub fail_create: bool,
        pub client_size: (u32, u32),
        pub calls: Vec<HostCall>,
}

impl MockHost
{
        pub fn new() -> Self
        {
                Self {
                        classes: HashMap::new(),
                        windows: HashMap::new(),
                        queue: VecDeque::new(),
                        script: Vec::new(),
                        quit: None,
                        next_handle: 1,
                        paint_serial: 0,
                        fail_create: false,
                        client_size: (640, 480),
                        calls: Vec::new(),
                }
        }

        pub fn with_script(
                mut self,
                script: Vec<Event>,
        ) -> Self
        {
                self.script = script;
                self
        }

        pub fn count(
                &self,
                predicate: impl Fn(&HostCall) -> bool,
        ) -> usize
        {
                self.calls.iter().filter(|c| predicate(c)).count()
        }

        pub fn is_visible(
                &self,
                handle: WindowHandle,
        ) -> bool
        {
                self.windows.get(&handle).is_some_and(|w| w.visible)
        }
}

impl Host for MockHost
{
        fn register_class(
                &mut self,
                class: ClassDescriptor,
        ) -> Result<(), HostError>
        {
                self.calls.push(HostCall::RegisterClass(class.name.clone()));

                if class.name.is_empty()
                {
                        return Err(HostError::InvalidClass(String::from("empty name")));
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
                _title: &str,
                params: CreateParams,
        ) -> Option<WindowHandle>
        {
                self.calls.push(HostCall::CreateWindow(class_name.to_string()));

                if self.fail_create
                {
                        return None;
                }

                let entry = self.classes.get(class_name)?.entry;

                let handle = WindowHandle(self.next_handle);
                self.next_handle += 1;

                self.windows.insert(
                        handle,
                        MockWindow {
                                entry,
                                user_data: None,
                                visible: false,
                        },
                );

                if entry(self, handle, Event::Create(params)) == EventResult::Rejected
                {
                        self.windows.remove(&handle);
                        return None;
                }

                for event in self.script.clone()
                {
                        self.queue.push_back(Message {
                                handle,
                                event,
                        });
                }

                Some(handle)
        }

        fn release_window(
                &mut self,
                handle: WindowHandle,
        )
        {
                self.calls.push(HostCall::Released(handle));

                if let Some(mut window) = self.windows.remove(&handle)
                {
                        drop(window.user_data.take());
                }
        }

        fn entry_point(
                &self,
                handle: WindowHandle,
        ) -> Option<EntryPoint>
        {
                self.windows.get(&handle).map(|w| w.entry)
        }

        fn set_entry_point(
                &mut self,
                handle: WindowHandle,
                entry: EntryPoint,
        )
        {
                self.calls.push(HostCall::SetEntryPoint(handle));

                if let Some(window) = self.windows.get_mut(&handle)
                {
                        window.entry = entry;
                }
        }

        fn user_data(
                &self,
                handle: WindowHandle,
        ) -> Option<SharedWindow>
        {
                self.windows.get(&handle)?.user_data.clone()
        }

        fn set_user_data(
                &mut self,
                handle: WindowHandle,
                data: SharedWindow,
        )
        {
                self.calls.push(HostCall::SetUserData(handle));

                if let Some(window) = self.windows.get_mut(&handle)
                {
                        window.user_data = Some(data);
                }
        }

        fn client_size(
                &self,
                _handle: WindowHandle,
        ) -> Option<(u32, u32)>
        {
                Some(self.client_size)
        }

        fn begin_paint(
                &mut self,
                handle: WindowHandle,
        ) -> PaintContext
        {
                self.calls.push(HostCall::BeginPaint(handle));
                self.paint_serial += 1;

                PaintContext {
                        handle,
                        serial: self.paint_serial,
                }
        }

        fn end_paint(
                &mut self,
                handle: WindowHandle,
                _context: PaintContext,
        )
        {
                self.calls.push(HostCall::EndPaint(handle));
        }

        fn default_handling(
                &mut self,
                handle: WindowHandle,
                event: &Event,
        ) -> EventResult
        {
                self.calls.push(HostCall::DefaultHandling(event.kind()));

                if let Event::Close = event
                {
                        self.queue.push_back(Message {
                                handle,
                                event: Event::Destroy,
                        });
                }

                EventResult::Defaulted
        }

        fn show_window(
                &mut self,
                handle: WindowHandle,
        )
        {
                self.calls.push(HostCall::ShowWindow(handle));

                if let Some(window) = self.windows.get_mut(&handle)
                {
                        window.visible = true;
                }
        }

        fn next_message(&mut self) -> Pumped
        {
                match (self.queue.pop_front(), self.quit)
                {
                        (Some(message), _) => Pumped::Message(message),
                        (None, Some(code)) => Pumped::Quit(code),
                        (None, None) => Pumped::Quit(-1),
                }
        }

        fn translate_message(
                &mut self,
                message: &Message,
        )
        {
                self.calls.push(HostCall::Translate(message.event.kind()));
        }

        fn post_quit(
                &mut self,
                exit_code: i32,
        )
        {
                self.calls.push(HostCall::PostQuit(exit_code));
                self.quit.get_or_insert(exit_code);
        }

        fn show_message(
                &mut self,
                _title: &str,
                text: &str,
        )
        {
                self.calls.push(HostCall::ShowMessage(text.to_string()));
        }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DriverCall
{
        CreateDevice(DriverType),
        BackBuffer,
        CreateRenderTarget,
        SetRenderTarget,
        SetViewport(Viewport),
        Clear([f32; 4]),
        Present(u32),
        CompileEffect,
        FindTechnique(String),
        ApplyPass(usize),
        ValidatePass(usize),
        DiscardFrame,
        CreateInputLayout,
        CreateBuffer,
        SetVertexBuffer(u32, u32),
        SetInputLayout,
        SetTopology(PrimitiveTopology),
        Draw(u32, u32),
        ClearState,
        Release(&'static str),
}

#[derive(Default)]
struct DriverState
{
        calls: Vec<DriverCall>,
        failing_drivers: HashSet<DriverType>,
        fail_render_target: bool,
        missing_effect: bool,
        invalid_pass: bool,
        fail_apply_pass: bool,
        fail_present: bool,
        pass_count: usize,
}

/// Handle whose drop is recorded as a release.
#[derive(Debug)]
pub struct MockHandle
{
        kind: &'static str,
        state: Rc<RefCell<DriverState>>,
}

impl Drop for MockHandle
{
        fn drop(&mut self)
        {
                self.state.borrow_mut().calls.push(DriverCall::Release(self.kind));
        }
}

impl std::fmt::Debug for DriverState
{
        fn fmt(
                &self,
                f: &mut std::fmt::Formatter<'_>,
        ) -> std::fmt::Result
        {
                f.debug_struct("DriverState")
                        .field("calls", &self.calls.len())
                        .finish()
        }
}

/// Recording [`GpuDriver`]. Clones share one call log.
#[derive(Debug, Clone)]
pub struct MockDriver
{
        state: Rc<RefCell<DriverState>>,
}

impl MockDriver
{
        pub fn new() -> Self
        {
                Self {
                        state: Rc::new(RefCell::new(DriverState {
                                pass_count: 1,
                                ..DriverState::default()
                        })),
                }
        }

        pub fn fail_driver(
                &self,
                driver_type: DriverType,
        )
        {
                self.state.borrow_mut().failing_drivers.insert(driver_type);
        }

        pub fn allow_all_drivers(&self)
        {
                self.state.borrow_mut().failing_drivers.clear();
        }

        pub fn fail_render_target(&self)
        {
                self.state.borrow_mut().fail_render_target = true;
        }

        pub fn set_missing_effect(&self)
        {
                self.state.borrow_mut().missing_effect = true;
        }

        /// Every pass fails validation, as a pass naming a missing entry
        /// point would.
        pub fn set_invalid_pass(&self)
        {
                self.state.borrow_mut().invalid_pass = true;
        }

        pub fn fail_apply_pass(
                &self,
                fail: bool,
        )
        {
                self.state.borrow_mut().fail_apply_pass = fail;
        }

        pub fn fail_present(
                &self,
                fail: bool,
        )
        {
                self.state.borrow_mut().fail_present = fail;
        }

        pub fn set_pass_count(
                &self,
                count: usize,
        )
        {
                self.state.borrow_mut().pass_count = count;
        }

        pub fn calls(&self) -> Vec<DriverCall>
        {
                self.state.borrow().calls.clone()
        }

        pub fn count(
                &self,
                predicate: impl Fn(&DriverCall) -> bool,
        ) -> usize
        {
                self.state.borrow().calls.iter().filter(|c| predicate(c)).count()
        }

        /// Released handle kinds, in release order.
        pub fn releases(&self) -> Vec<&'static str>
        {
                self.state
                        .borrow()
                        .calls
                        .iter()
                        .filter_map(|c| match c
                        {
                                DriverCall::Release(kind) => Some(*kind),
                                _ => None,
                        })
                        .collect()
        }

        fn record(
                &self,
                call: DriverCall,
        )
        {
                self.state.borrow_mut().calls.push(call);
        }

        fn handle(
                &self,
                kind: &'static str,
        ) -> MockHandle
        {
                MockHandle {
                        kind,
                        state: self.state.clone(),
                }
        }
}

impl GpuDriver for MockDriver
{
        type Device = MockHandle;
        type SwapChain = MockHandle;
        type Texture = MockHandle;
        type RenderTargetView = MockHandle;
        type Effect = MockHandle;
        type InputLayout = MockHandle;
        type Buffer = MockHandle;

        fn create_device_and_swap_chain(
                &mut self,
                driver_type: DriverType,
                _desc: &SwapChainDesc,
        ) -> Result<(MockHandle, MockHandle), GpuError>
        {
                self.record(DriverCall::CreateDevice(driver_type));

                if self.state.borrow().failing_drivers.contains(&driver_type)
                {
                        return Err(GpuError::DeviceCreation(format!("{driver_type:?} unsupported")));
                }

                Ok((self.handle("device"), self.handle("swap chain")))
        }

        fn back_buffer(
                &mut self,
                _swap_chain: &MockHandle,
        ) -> Result<MockHandle, GpuError>
        {
                self.record(DriverCall::BackBuffer);
                Ok(self.handle("texture"))
        }

        fn create_render_target_view(
                &mut self,
                _device: &MockHandle,
                _texture: &MockHandle,
        ) -> Result<MockHandle, GpuError>
        {
                self.record(DriverCall::CreateRenderTarget);

                if self.state.borrow().fail_render_target
                {
                        return Err(GpuError::RenderTarget(String::from("out of memory")));
                }

                Ok(self.handle("render target view"))
        }

        fn set_render_target(
                &mut self,
                _device: &MockHandle,
                _view: &MockHandle,
        )
        {
                self.record(DriverCall::SetRenderTarget);
        }

        fn set_viewport(
                &mut self,
                _device: &MockHandle,
                viewport: Viewport,
        )
        {
                self.record(DriverCall::SetViewport(viewport));
        }

        fn clear_render_target(
                &mut self,
                _device: &MockHandle,
                _view: &MockHandle,
                color: [f32; 4],
        )
        {
                self.record(DriverCall::Clear(color));
        }

        fn present(
                &mut self,
                _device: &MockHandle,
                _swap_chain: &MockHandle,
                sync_interval: u32,
        ) -> Result<(), GpuError>
        {
                self.record(DriverCall::Present(sync_interval));

                if self.state.borrow().fail_present
                {
                        return Err(GpuError::Present(String::from("Surface outdated")));
                }

                Ok(())
        }

        fn compile_effect(
                &mut self,
                _device: &MockHandle,
                path: &Path,
                _profile: &str,
        ) -> Result<MockHandle, GpuError>
        {
                self.record(DriverCall::CompileEffect);

                if self.state.borrow().missing_effect
                {
                        return Err(GpuError::ResourceNotFound(PathBuf::from(path)));
                }

                Ok(self.handle("effect"))
        }

        fn find_technique(
                &mut self,
                _effect: &MockHandle,
                name: &str,
        ) -> Result<TechniqueId, GpuError>
        {
                self.record(DriverCall::FindTechnique(name.to_string()));

                if name != "Render"
                {
                        return Err(GpuError::TechniqueNotFound(name.to_string()));
                }

                Ok(TechniqueId(0))
        }

        fn pass_count(
                &self,
                _effect: &MockHandle,
                _technique: TechniqueId,
        ) -> usize
        {
                self.state.borrow().pass_count
        }

        fn apply_pass(
                &mut self,
                _device: &MockHandle,
                _effect: &MockHandle,
                _technique: TechniqueId,
                pass: usize,
        ) -> Result<(), GpuError>
        {
                self.record(DriverCall::ApplyPass(pass));

                if self.state.borrow().fail_apply_pass
                {
                        return Err(GpuError::PassOutOfRange {
                                pass,
                                count: 0,
                        });
                }

                Ok(())
        }

        fn validate_pass(
                &mut self,
                _device: &MockHandle,
                effect: &MockHandle,
                _technique: TechniqueId,
                pass: usize,
        ) -> Result<(), GpuError>
        {
                self.record(DriverCall::ValidatePass(pass));

                if self.state.borrow().invalid_pass
                {
                        return Err(GpuError::EffectCompilation {
                                path: PathBuf::from(effect.kind),
                                reason: format!("pass {pass}: missing entry point `fs_missing`"),
                        });
                }

                Ok(())
        }

        fn discard_frame(
                &mut self,
                _device: &MockHandle,
        )
        {
                self.record(DriverCall::DiscardFrame);
        }

        fn create_input_layout(
                &mut self,
                _device: &MockHandle,
                _effect: &MockHandle,
                _technique: TechniqueId,
                _elements: &[InputElement],
        ) -> Result<MockHandle, GpuError>
        {
                self.record(DriverCall::CreateInputLayout);
                Ok(self.handle("input layout"))
        }

        fn create_buffer(
                &mut self,
                _device: &MockHandle,
                _desc: &BufferDesc,
                _initial_data: &[u8],
        ) -> Result<MockHandle, GpuError>
        {
                self.record(DriverCall::CreateBuffer);
                Ok(self.handle("vertex buffer"))
        }

        fn set_vertex_buffer(
                &mut self,
                _device: &MockHandle,
                _buffer: &MockHandle,
                stride: u32,
                offset: u32,
        )
        {
                self.record(DriverCall::SetVertexBuffer(stride, offset));
        }

        fn set_input_layout(
                &mut self,
                _device: &MockHandle,
                _layout: &MockHandle,
        )
        {
                self.record(DriverCall::SetInputLayout);
        }

        fn set_primitive_topology(
                &mut self,
                _device: &MockHandle,
                topology: PrimitiveTopology,
        )
        {
                self.record(DriverCall::SetTopology(topology));
        }

        fn draw(
                &mut self,
                _device: &MockHandle,
                vertex_count: u32,
                start_vertex: u32,
        )
        {
                self.record(DriverCall::Draw(vertex_count, start_vertex));
        }

        fn clear_state(
                &mut self,
                _device: &MockHandle,
        )
        {
                self.record(DriverCall::ClearState);
        }
}
