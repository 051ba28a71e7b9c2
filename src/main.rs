use anyhow::Result;
use clap::Parser;
use glam::Vec3;
use log::{error, info, warn};
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use pointer_lock_controls::cli::Cli;
use pointer_lock_controls::core::input_adapter::WinitSurface;
use pointer_lock_controls::math::Orientation;
use pointer_lock_controls::movement::MovementState;
use pointer_lock_controls::{
    ControlsConfig, ControlsEvent, EventKind, Object3D, PointerLockControls, SharedObject,
};

// === Constants ===

const INITIAL_WINDOW_WIDTH: u32 = 800;
const INITIAL_WINDOW_HEIGHT: u32 = 600;
const EYE_HEIGHT: f32 = 1.6;
const FRAME_INTERVAL: Duration = Duration::from_millis(16);
const TITLE_UPDATE_INTERVAL: f32 = 0.25;

struct App {
    config: ControlsConfig,
    move_speed: f32,
    object: SharedObject,
    controls: Option<PointerLockControls<WinitSurface>>,
    movement: MovementState,
    last_frame_time: Instant,
    title_timer: f32,
}

impl App {
    fn new(config: ControlsConfig, move_speed: f32) -> Self {
        Self {
            config,
            move_speed,
            object: Object3D::looking(Vec3::new(0.0, EYE_HEIGHT, 5.0), Orientation::LEVEL).shared(),
            controls: None,
            movement: MovementState::default(),
            last_frame_time: Instant::now(),
            title_timer: 0.0,
        }
    }

    fn create_controls(&self, window: Arc<Window>) -> Result<PointerLockControls<WinitSurface>> {
        let surface = WinitSurface::new(window);
        let mut controls =
            PointerLockControls::with_config(Rc::clone(&self.object), surface, &self.config)?;

        controls.add_event_listener(EventKind::Lock, |_| {
            info!("Pointer locked - WASD to move, Escape to release");
        });
        controls.add_event_listener(EventKind::Unlock, |_| {
            info!("Pointer released - click to capture again");
        });
        controls.add_event_listener(EventKind::Error, |event| {
            if let ControlsEvent::Error(err) = event {
                warn!("{}", err);
            }
        });
        Ok(controls)
    }

    fn pose_title(&self, locked: bool) -> String {
        let object = self.object.borrow();
        let orientation = object.orientation();
        format!(
            "Pointer Lock Demo{} - pos ({:.2}, {:.2}, {:.2}) yaw {:.1}° pitch {:.1}°",
            if locked { " [locked]" } else { "" },
            object.position.x,
            object.position.y,
            object.position.z,
            orientation.yaw.to_degrees(),
            orientation.pitch.to_degrees(),
        )
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.controls.is_some() {
            return;
        }

        let window = match event_loop.create_window(
            Window::default_attributes()
                .with_title("Pointer Lock Demo")
                .with_inner_size(winit::dpi::LogicalSize::new(
                    INITIAL_WINDOW_WIDTH,
                    INITIAL_WINDOW_HEIGHT,
                )),
        ) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        match self.create_controls(window) {
            Ok(controls) => self.controls = Some(controls),
            Err(e) => {
                error!("Failed to initialize controls: {:#}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(controls) = self.controls.as_mut() else {
            return;
        };

        // Focus loss and Escape drop the capture before anything else sees the event
        let released = match controls.surface_mut().process_window_event(&event) {
            Some(surface_event) => {
                controls.handle_event(&surface_event);
                self.movement.clear();
                true
            }
            None => false,
        };

        match event {
            WindowEvent::CloseRequested => {
                controls.dispose();
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } if !released && !controls.is_locked() => {
                controls.dispose();
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                self.movement.process_keyboard(&event);
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } if !controls.is_locked() => {
                if let Err(e) = controls.lock() {
                    error!("Pointer lock request rejected: {}", e);
                }
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        let Some(controls) = self.controls.as_mut() else {
            return;
        };
        if let Some(surface_event) = controls.surface().process_device_event(&event) {
            controls.handle_event(&surface_event);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        let delta = now.duration_since(self.last_frame_time).as_secs_f32();
        self.last_frame_time = now;

        let Some(controls) = self.controls.as_mut() else {
            return;
        };

        let locked = controls.is_locked();
        if locked {
            self.movement.apply(controls, self.move_speed, delta);
        }

        self.title_timer += delta;
        if self.title_timer >= TITLE_UPDATE_INTERVAL {
            self.title_timer = 0.0;
            let title = self.pose_title(locked);
            if let Some(controls) = &self.controls {
                controls.surface().window().set_title(&title);
            }
        }

        event_loop.set_control_flow(ControlFlow::WaitUntil(now + FRAME_INTERVAL));
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.controls_config()?;

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config, cli.move_speed);

    info!("Pointer Lock Demo - click to capture the pointer, WASD to move, Escape to release or quit");
    event_loop.run_app(&mut app)?;

    Ok(())
}
