//! Wayland adapter: an xdg toplevel window drawn with wgpu.

use std::ptr::NonNull;
use std::time::Duration;

use raw_window_handle::{
    DisplayHandle, HandleError, HasDisplayHandle, HasWindowHandle, RawDisplayHandle,
    RawWindowHandle, WaylandDisplayHandle, WaylandWindowHandle, WindowHandle,
};
use smithay_client_toolkit::{
    compositor::{CompositorHandler, CompositorState},
    delegate_compositor, delegate_output, delegate_pointer, delegate_registry, delegate_seat,
    delegate_xdg_shell, delegate_xdg_window,
    output::{OutputHandler, OutputState},
    registry::{ProvidesRegistryState, RegistryState},
    registry_handlers,
    seat::{
        pointer::{PointerEvent, PointerEventKind, PointerHandler},
        Capability, SeatHandler, SeatState,
    },
    shell::{
        xdg::{
            window::{Window, WindowConfigure, WindowDecorations, WindowHandler},
            XdgShell,
        },
        WaylandSurface,
    },
};
use wayland_backend::sys::client::ObjectId;
use wayland_client::{
    backend::WaylandError,
    globals::registry_queue_init,
    protocol::{wl_output, wl_pointer, wl_seat, wl_surface},
    Connection, EventQueue, Proxy, QueueHandle,
};

use super::{MouseButton, Platform, PlatformEvent};
use crate::error::PlatformError;
use crate::renderer::{Color, Frame, GpuContext, Presenter, SurfaceState};
use crate::AppConfig;

pub struct WaylandState {
    registry_state: RegistryState,
    _compositor_state: CompositorState,
    output_state: OutputState,
    seat_state: SeatState,
    _xdg_shell: XdgShell,
    window: Option<Window>,
    configured: bool,
    width: u32,
    height: u32,
    scale_factor: i32,

    pointer: Option<wl_pointer::WlPointer>,
    pointer_over_surface: bool,

    pending_events: Vec<PlatformEvent>,
}

impl WaylandState {
    fn is_our_surface(&self, surface: &wl_surface::WlSurface) -> bool {
        self.window
            .as_ref()
            .map(|w| w.wl_surface() == surface)
            .unwrap_or(false)
    }

    fn take_events(&mut self) -> Vec<PlatformEvent> {
        std::mem::take(&mut self.pending_events)
    }
}

/// Raw handles of the Wayland display and window surface, for wgpu.
struct WaylandWindowWrapper {
    display: NonNull<std::ffi::c_void>,
    surface: NonNull<std::ffi::c_void>,
}

impl WaylandWindowWrapper {
    fn new(connection: &Connection, surface: &wl_surface::WlSurface) -> Result<Self, PlatformError> {
        let display = connection.backend().display_ptr() as *mut std::ffi::c_void;
        let surface_id = surface.id();
        let surface = ObjectId::as_ptr(&surface_id) as *mut std::ffi::c_void;

        Ok(Self {
            display: NonNull::new(display)
                .ok_or_else(|| PlatformError::Surface("null wl_display".into()))?,
            surface: NonNull::new(surface)
                .ok_or_else(|| PlatformError::Surface("null wl_surface".into()))?,
        })
    }
}

impl HasDisplayHandle for WaylandWindowWrapper {
    fn display_handle(&self) -> Result<DisplayHandle<'_>, HandleError> {
        let handle = WaylandDisplayHandle::new(self.display);
        // SAFETY: the pointer comes from a live connection owned by the platform
        Ok(unsafe { DisplayHandle::borrow_raw(RawDisplayHandle::Wayland(handle)) })
    }
}

impl HasWindowHandle for WaylandWindowWrapper {
    fn window_handle(&self) -> Result<WindowHandle<'_>, HandleError> {
        let handle = WaylandWindowHandle::new(self.surface);
        // SAFETY: the surface outlives the wgpu surface created from it
        Ok(unsafe { WindowHandle::borrow_raw(RawWindowHandle::Wayland(handle)) })
    }
}

pub struct WaylandPlatform {
    // Fields drop in order: GPU objects before the window they draw into
    presenter: Option<Presenter>,
    surface: Option<SurfaceState>,
    _gpu: Option<GpuContext>,
    state: WaylandState,
    event_queue: EventQueue<WaylandState>,
    _connection: Connection,
    /// Without vsync, present does not block; pace frames ourselves
    frame_delay: Option<Duration>,
}

impl WaylandPlatform {
    fn physical_size(&self) -> (u32, u32) {
        let scale = self.state.scale_factor.max(1) as u32;
        (self.state.width * scale, self.state.height * scale)
    }

    fn handle_resize(&mut self) {
        let (width, height) = self.physical_size();
        if let Some(surface) = self.surface.as_mut() {
            if surface.width() != width || surface.height() != height {
                log::debug!("Resizing surface to {}x{}", width, height);
                surface.resize(width, height);
            }
        }
        if let Some(presenter) = self.presenter.as_mut() {
            presenter.set_scale_factor(self.state.scale_factor.max(1) as f32);
        }
    }
}

impl Platform for WaylandPlatform {
    fn create(config: &AppConfig) -> Result<Self, PlatformError> {
        let connection =
            Connection::connect_to_env().map_err(|e| PlatformError::Connect(e.to_string()))?;
        let (globals, mut event_queue) = registry_queue_init::<WaylandState>(&connection)
            .map_err(|e| PlatformError::Connect(e.to_string()))?;
        let qh = event_queue.handle();

        let compositor_state = CompositorState::bind(&globals, &qh)
            .map_err(|e| PlatformError::Protocol(format!("wl_compositor: {e}")))?;
        let xdg_shell = XdgShell::bind(&globals, &qh)
            .map_err(|e| PlatformError::Protocol(format!("xdg_wm_base: {e}")))?;

        let surface = compositor_state.create_surface(&qh);
        let window = xdg_shell.create_window(surface, WindowDecorations::RequestServer, &qh);
        window.set_title(config.title.clone());
        window.set_app_id("trellis".to_string());
        window.set_min_size(Some((config.width.min(320), config.height.min(240))));
        window.commit();

        let mut state = WaylandState {
            registry_state: RegistryState::new(&globals),
            output_state: OutputState::new(&globals, &qh),
            seat_state: SeatState::new(&globals, &qh),
            _compositor_state: compositor_state,
            _xdg_shell: xdg_shell,
            window: Some(window),
            configured: false,
            width: config.width,
            height: config.height,
            scale_factor: 1,
            pointer: None,
            pointer_over_surface: false,
            pending_events: Vec::new(),
        };

        // The first configure must arrive before anything is attached
        while !state.configured {
            event_queue
                .blocking_dispatch(&mut state)
                .map_err(|e| PlatformError::Protocol(e.to_string()))?;
        }
        log::info!("Window configured at {}x{}", state.width, state.height);

        let wrapper = match state.window.as_ref() {
            Some(window) => WaylandWindowWrapper::new(&connection, window.wl_surface())?,
            None => return Err(PlatformError::Protocol("window closed during startup".into())),
        };

        let gpu = GpuContext::new()?;
        let surface = gpu.create_surface(wrapper, state.width, state.height, config.vsync)?;
        let presenter = Presenter::new(gpu.device.clone(), gpu.queue.clone(), surface.format());

        // Events seen while configuring are replayed on the first poll
        Ok(Self {
            _connection: connection,
            event_queue,
            state,
            _gpu: Some(gpu),
            surface: Some(surface),
            presenter: Some(presenter),
            frame_delay: (!config.vsync).then_some(Duration::from_millis(16)),
        })
    }

    fn poll_events(&mut self) -> Result<Vec<PlatformEvent>, PlatformError> {
        self.event_queue
            .flush()
            .map_err(|e| PlatformError::Protocol(e.to_string()))?;

        if let Some(guard) = self.event_queue.prepare_read() {
            match guard.read() {
                Ok(_) => {}
                Err(WaylandError::Io(e)) if e.kind() == std::io::ErrorKind::WouldBlock => {}
                Err(e) => return Err(PlatformError::Protocol(e.to_string())),
            }
        }

        self.event_queue
            .dispatch_pending(&mut self.state)
            .map_err(|e| PlatformError::Protocol(e.to_string()))?;

        let events = self.state.take_events();
        if events
            .iter()
            .any(|e| matches!(e, PlatformEvent::Resized { .. }))
        {
            self.handle_resize();
        }
        Ok(events)
    }

    fn framebuffer_size(&self) -> (u32, u32) {
        (self.state.width, self.state.height)
    }

    fn present(&mut self, frame: &Frame, clear_color: Color) -> Result<(), PlatformError> {
        if let (Some(presenter), Some(surface)) = (self.presenter.as_mut(), self.surface.as_mut()) {
            presenter.render(surface, frame, clear_color)?;
        }
        if let Some(delay) = self.frame_delay {
            std::thread::sleep(delay);
        }
        Ok(())
    }

    fn shutdown(&mut self) {
        // GPU objects go before the window surface they draw into
        self.presenter = None;
        self.surface = None;
        self._gpu = None;
        if let Some(pointer) = self.state.pointer.take() {
            pointer.release();
        }
        self.state.window = None;
        if let Err(e) = self.event_queue.flush() {
            log::debug!("Flush during shutdown failed: {}", e);
        }
        log::info!("Wayland platform shut down");
    }
}

impl CompositorHandler for WaylandState {
    fn scale_factor_changed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        surface: &wl_surface::WlSurface,
        new_factor: i32,
    ) {
        if self.scale_factor != new_factor {
            log::info!("Scale factor changed to: {}", new_factor);
            self.scale_factor = new_factor;
            surface.set_buffer_scale(new_factor);
            self.pending_events.push(PlatformEvent::Resized {
                width: self.width,
                height: self.height,
            });
        }
    }

    fn transform_changed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _new_transform: wl_output::Transform,
    ) {
    }

    fn frame(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _time: u32,
    ) {
    }

    fn surface_enter(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _output: &wl_output::WlOutput,
    ) {
    }

    fn surface_leave(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _output: &wl_output::WlOutput,
    ) {
    }
}

impl OutputHandler for WaylandState {
    fn output_state(&mut self) -> &mut OutputState {
        &mut self.output_state
    }

    fn new_output(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _output: wl_output::WlOutput) {}

    fn update_output(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _output: wl_output::WlOutput,
    ) {
    }

    fn output_destroyed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _output: wl_output::WlOutput,
    ) {
    }
}

impl WindowHandler for WaylandState {
    fn request_close(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _window: &Window) {
        log::info!("Close requested by the compositor");
        self.pending_events.push(PlatformEvent::CloseRequested);
    }

    fn configure(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _window: &Window,
        configure: WindowConfigure,
        _serial: u32,
    ) {
        let width = configure.new_size.0.map(|w| w.get()).unwrap_or(self.width);
        let height = configure.new_size.1.map(|h| h.get()).unwrap_or(self.height);
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.pending_events
                .push(PlatformEvent::Resized { width, height });
        }
        self.pending_events
            .push(PlatformEvent::Focus(configure.is_activated()));
        self.configured = true;
    }
}

impl SeatHandler for WaylandState {
    fn seat_state(&mut self) -> &mut SeatState {
        &mut self.seat_state
    }

    fn new_seat(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _seat: wl_seat::WlSeat) {}

    fn new_capability(
        &mut self,
        _conn: &Connection,
        qh: &QueueHandle<Self>,
        seat: wl_seat::WlSeat,
        capability: Capability,
    ) {
        if capability == Capability::Pointer && self.pointer.is_none() {
            match self.seat_state.get_pointer(qh, &seat) {
                Ok(pointer) => {
                    log::info!("Pointer capability available, creating pointer");
                    self.pointer = Some(pointer);
                }
                Err(e) => log::warn!("Failed to get pointer: {}", e),
            }
        }
    }

    fn remove_capability(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _seat: wl_seat::WlSeat,
        capability: Capability,
    ) {
        if capability == Capability::Pointer {
            log::info!("Pointer capability removed");
            if let Some(pointer) = self.pointer.take() {
                pointer.release();
            }
        }
    }

    fn remove_seat(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _seat: wl_seat::WlSeat) {}
}

impl PointerHandler for WaylandState {
    fn pointer_frame(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _pointer: &wl_pointer::WlPointer,
        events: &[PointerEvent],
    ) {
        for event in events {
            if !self.is_our_surface(&event.surface)
                && !matches!(event.kind, PointerEventKind::Leave { .. })
            {
                continue;
            }

            let (x, y) = (event.position.0 as f32, event.position.1 as f32);
            match event.kind {
                PointerEventKind::Enter { .. } | PointerEventKind::Motion { .. } => {
                    self.pointer_over_surface = true;
                    self.pending_events.push(PlatformEvent::PointerMoved { x, y });
                }
                PointerEventKind::Leave { .. } => {
                    if self.pointer_over_surface {
                        self.pointer_over_surface = false;
                        self.pending_events.push(PlatformEvent::PointerLeft);
                    }
                }
                PointerEventKind::Press { button, .. } => {
                    if let Some(button) = wayland_button_to_mouse_button(button) {
                        self.pending_events.push(PlatformEvent::PointerButton {
                            button,
                            pressed: true,
                        });
                    }
                }
                PointerEventKind::Release { button, .. } => {
                    if let Some(button) = wayland_button_to_mouse_button(button) {
                        self.pending_events.push(PlatformEvent::PointerButton {
                            button,
                            pressed: false,
                        });
                    }
                }
                PointerEventKind::Axis { .. } => {}
            }
        }
    }
}

/// Linux input event codes (linux/input-event-codes.h)
fn wayland_button_to_mouse_button(button: u32) -> Option<MouseButton> {
    const BTN_LEFT: u32 = 0x110;
    const BTN_RIGHT: u32 = 0x111;
    const BTN_MIDDLE: u32 = 0x112;

    match button {
        BTN_LEFT => Some(MouseButton::Left),
        BTN_RIGHT => Some(MouseButton::Right),
        BTN_MIDDLE => Some(MouseButton::Middle),
        _ => None,
    }
}

impl ProvidesRegistryState for WaylandState {
    fn registry(&mut self) -> &mut RegistryState {
        &mut self.registry_state
    }

    registry_handlers![OutputState, SeatState];
}

delegate_compositor!(WaylandState);
delegate_output!(WaylandState);
delegate_seat!(WaylandState);
delegate_pointer!(WaylandState);
delegate_xdg_shell!(WaylandState);
delegate_xdg_window!(WaylandState);
delegate_registry!(WaylandState);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_codes() {
        assert_eq!(wayland_button_to_mouse_button(0x110), Some(MouseButton::Left));
        assert_eq!(wayland_button_to_mouse_button(0x111), Some(MouseButton::Right));
        assert_eq!(wayland_button_to_mouse_button(0x112), Some(MouseButton::Middle));
        assert_eq!(wayland_button_to_mouse_button(0x113), None);
    }
}
