//! The windowed viewer: owns the application state and routes winit events.

use std::sync::Arc;

use glam::Vec2;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::camera::{CameraKind, CameraRig};
use crate::config::ViewerConfig;
use crate::error::ViewerError;
use crate::gpu::GpuContext;
use crate::input::{Input, InputAction, KeyBindings};
use crate::mesh_pass::MeshPass;
use crate::scene::Scene;

/// What the event loop should do after an [`InputAction`] was applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Response {
    /// Nothing visible changed.
    Ignore,
    /// The active camera changed; draw a new frame.
    Redraw,
    /// Leave the event loop.
    Exit,
}

/// Applies one input action to the cameras.
///
/// Drag and zoom actions only affect the overhead camera; on the ground
/// camera they are ignored.
pub fn apply_action(cameras: &mut CameraRig, action: InputAction) -> Response {
    match action {
        InputAction::Command(command) => {
            cameras.apply(command);
            Response::Redraw
        }
        InputAction::Exit => Response::Exit,
        InputAction::BeginDrag(cursor) => {
            cameras.active_mut().begin_rotate(cursor);
            Response::Ignore
        }
        InputAction::Drag(cursor) => {
            if cameras.active_mut().update_rotate(cursor) {
                Response::Redraw
            } else {
                Response::Ignore
            }
        }
        InputAction::EndDrag => {
            cameras.active_mut().end_rotate();
            Response::Ignore
        }
        InputAction::Zoom(offset) => {
            if cameras.active_kind() != CameraKind::Overhead {
                return Response::Ignore;
            }
            cameras.active_mut().zoom(offset);
            Response::Redraw
        }
    }
}

/// Opens the viewer window and runs until it is closed.
///
/// The scene is read from disk before the window opens; its meshes are
/// uploaded once the GPU is ready.
pub fn run(config: ViewerConfig) -> Result<(), ViewerError> {
    let cameras = config.camera_rig()?;
    let scene = Scene::load(&config.scene.models_dir, &config.scene.scene_file);
    let input = Input::new(KeyBindings::from_config(&config.keys), config.overhead.zoom_step);

    log::info!("controls:");
    for line in input.bindings().help_lines() {
        log::info!("{}", line);
    }
    log::info!("  Left drag:  Orbit (overhead camera)");
    log::info!("  Wheel:  Zoom (overhead camera)");
    log::info!("  Esc:  Quit");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = RoamApp::Pending {
        config,
        startup: Some(Startup {
            cameras,
            scene,
            input,
        }),
    };
    event_loop.run_app(&mut app)?;

    match app {
        RoamApp::Failed(e) => Err(e),
        _ => Ok(()),
    }
}

/// State prepared before the window exists.
struct Startup {
    cameras: CameraRig,
    scene: Scene,
    input: Input,
}

enum RoamApp {
    Pending {
        config: ViewerConfig,
        startup: Option<Startup>,
    },
    Running {
        window: Arc<Window>,
        gpu: GpuContext,
        mesh_pass: MeshPass,
        scene: Scene,
        cameras: CameraRig,
        input: Input,
    },
    Failed(ViewerError),
}

impl RoamApp {
    fn start(
        event_loop: &ActiveEventLoop,
        config: &ViewerConfig,
        startup: Startup,
    ) -> Result<Self, ViewerError> {
        let window_attrs = WindowAttributes::default()
            .with_title(&config.window.title)
            .with_inner_size(winit::dpi::LogicalSize::new(
                config.window.width,
                config.window.height,
            ));
        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let gpu = GpuContext::new(window.clone())?;
        let mesh_pass = MeshPass::new(&gpu);

        let Startup {
            mut cameras,
            mut scene,
            input,
        } = startup;
        scene.upload(&gpu, config.scene.keep_local_geometry);
        cameras.set_viewport(gpu.width(), gpu.height());
        log::info!(
            "viewer ready: {} meshes, {} vertices, {}x{}",
            scene.len(),
            scene.vertex_count(),
            gpu.width(),
            gpu.height()
        );

        Ok(RoamApp::Running {
            window,
            gpu,
            mesh_pass,
            scene,
            cameras,
            input,
        })
    }
}

impl ApplicationHandler for RoamApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let RoamApp::Pending { config, startup } = self else {
            return;
        };
        let Some(startup) = startup.take() else {
            return;
        };
        *self = match RoamApp::start(event_loop, config, startup) {
            Ok(running) => running,
            Err(e) => {
                event_loop.exit();
                RoamApp::Failed(e)
            }
        };
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let RoamApp::Running {
            window,
            gpu,
            mesh_pass,
            scene,
            cameras,
            input,
        } = self
        else {
            return;
        };

        let action = match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
                return;
            }
            WindowEvent::Resized(size) => {
                gpu.resize(size.width, size.height);
                cameras.set_viewport(gpu.width(), gpu.height());
                window.request_redraw();
                return;
            }
            WindowEvent::RedrawRequested => {
                match mesh_pass.render(gpu, cameras.active(), scene.meshes()) {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        log::warn!("surface lost, reconfiguring");
                        gpu.reconfigure();
                        window.request_redraw();
                    }
                    Err(wgpu::SurfaceError::Timeout) => {
                        log::debug!("surface timed out, skipping frame");
                    }
                    Err(e) => {
                        log::error!("failed to render frame: {}", e);
                        event_loop.exit();
                    }
                }
                return;
            }
            WindowEvent::KeyboardInput { event, .. } => input.key(&event.logical_key, event.state),
            WindowEvent::CursorMoved { position, .. } => {
                input.cursor_moved(Vec2::new(position.x as f32, position.y as f32))
            }
            WindowEvent::MouseInput { state, button, .. } => input.mouse_button(state, button),
            WindowEvent::MouseWheel { delta, .. } => input.scroll(delta),
            WindowEvent::Focused(false) => input.cancel_drag(),
            _ => None,
        };

        let Some(action) = action else {
            return;
        };
        match apply_action(cameras, action) {
            Response::Ignore => {}
            Response::Redraw => window.request_redraw(),
            Response::Exit => event_loop.exit(),
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let RoamApp::Running { scene, .. } = self {
            scene.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::ViewProjection;
    use crate::input::ViewerCommand;

    fn rig() -> CameraRig {
        ViewerConfig::default().camera_rig().unwrap()
    }

    #[test]
    fn commands_redraw_and_escape_exits() {
        let mut cameras = rig();
        let before = cameras.active().view();
        assert_eq!(
            apply_action(&mut cameras, InputAction::Command(ViewerCommand::MoveForward)),
            Response::Redraw
        );
        assert_ne!(cameras.active().view(), before);
        assert_eq!(apply_action(&mut cameras, InputAction::Exit), Response::Exit);
    }

    #[test]
    fn pointer_actions_are_ignored_by_the_ground_camera() {
        let mut cameras = rig();
        let before = cameras.active().view();

        apply_action(&mut cameras, InputAction::BeginDrag(Vec2::ZERO));
        assert_eq!(
            apply_action(&mut cameras, InputAction::Drag(Vec2::new(50.0, 30.0))),
            Response::Ignore
        );
        assert_eq!(apply_action(&mut cameras, InputAction::Zoom(0.1)), Response::Ignore);
        assert_eq!(cameras.active().view(), before);
    }

    #[test]
    fn drag_and_zoom_move_the_overhead_camera() {
        let mut cameras = rig();
        apply_action(&mut cameras, InputAction::Command(ViewerCommand::SwitchCamera));
        assert_eq!(cameras.active_kind(), CameraKind::Overhead);

        apply_action(&mut cameras, InputAction::BeginDrag(Vec2::new(100.0, 100.0)));
        assert_eq!(
            apply_action(&mut cameras, InputAction::Drag(Vec2::new(140.0, 100.0))),
            Response::Redraw
        );
        apply_action(&mut cameras, InputAction::EndDrag);
        // 0.45 degrees per pixel.
        let yaw = cameras.active().as_overhead().unwrap().yaw();
        assert!((yaw - 18.0).abs() < 1e-3);

        assert_eq!(apply_action(&mut cameras, InputAction::Zoom(-0.1)), Response::Redraw);
        let radius = cameras.active().as_overhead().unwrap().radius();
        assert!((radius - 24.9).abs() < 1e-4);
    }

    #[test]
    fn full_window_drag_orbits_all_the_way_around() {
        let mut cameras = rig();
        cameras.switch();
        let width = ViewerConfig::default().window.width as f32;

        apply_action(&mut cameras, InputAction::BeginDrag(Vec2::new(0.0, 400.0)));
        apply_action(&mut cameras, InputAction::Drag(Vec2::new(width / 2.0, 400.0)));
        let half = cameras.active().as_overhead().unwrap().yaw();
        assert!((half.abs() - 180.0).abs() < 1e-3, "half-window drag turned {half}");

        apply_action(&mut cameras, InputAction::Drag(Vec2::new(width / 4.0, 400.0)));
        let quarter = cameras.active().as_overhead().unwrap().yaw();
        assert!((quarter - 90.0).abs() < 1e-3, "quarter-window drag turned {quarter}");

        apply_action(&mut cameras, InputAction::Drag(Vec2::new(width, 400.0)));
        apply_action(&mut cameras, InputAction::EndDrag);
        let full = cameras.active().as_overhead().unwrap().yaw();
        assert!(full.abs() < 1e-3, "full-window drag should turn 360 degrees, ended at {full}");
    }
}
