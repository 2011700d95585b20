use std::sync::Arc;
use std::time::Instant;

use winit::{
    application::ApplicationHandler,
    dpi::{PhysicalPosition, PhysicalSize},
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use glam::{Vec2, Vec3};
use tracing::{error, info, warn};

mod config;
mod error;
mod math;
mod renderer;
mod scene;
mod texture;
mod ui;

use config::AppConfig;
use error::{AppError, SetupError, report};
use math::RippleSurface;
use math::uv::cursor_to_uv;
use renderer::{Camera, GpuState, SURFACE_ATTRIBUTES, SceneUniform};
use scene::{Scene, ViewMode};
use texture::{LoadResult, TextureKind, TextureLoader, TextureSet};
use ui::{FrameStats, UiActions, UiState, apply_theme, draw_help_overlay, draw_side_panel};

const WINDOW_TITLE: &str = "Ripple 3D";

#[derive(Debug, Clone, Copy)]
enum UserEvent {
    TexturesReady,
}

#[derive(Default)]
struct InputState {
    dragging: bool,
    cursor: Option<Vec2>,
    drag_delta: Vec2,
}

struct App {
    config: AppConfig,

    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    egui_state: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
    egui_ctx: egui::Context,

    camera: Camera,
    scene: Scene,
    ui_state: UiState,
    input: InputState,

    loader: TextureLoader,
    textures: TextureSet,

    stats: FrameStats,
    frame_count: u32,
    fps_timer: Instant,
    last_vsync_state: bool,

    upload_error: Option<String>,
    setup_error: Option<SetupError>,
    exit_requested: bool,
}

impl App {
    fn new(config: AppConfig, event_loop: &EventLoop<UserEvent>) -> Self {
        let proxy = event_loop.create_proxy();
        let loader = TextureLoader::new(move || {
            let _ = proxy.send_event(UserEvent::TexturesReady);
        });

        let ui_state = UiState::from_config(&config);
        let last_vsync_state = ui_state.vsync_enabled;

        Self {
            camera: Camera::with_zoom(config.view.zoom),
            scene: Scene::new(RippleSurface::from(&config.surface), SURFACE_ATTRIBUTES),
            ui_state,
            config,

            window: None,
            gpu: None,
            egui_state: None,
            egui_renderer: None,
            egui_ctx: egui::Context::default(),

            input: InputState::default(),

            loader,
            textures: TextureSet::default(),

            stats: FrameStats::default(),
            frame_count: 0,
            fps_timer: Instant::now(),
            last_vsync_state,

            upload_error: None,
            setup_error: None,
            exit_requested: false,
        }
    }

    fn init_gpu(&mut self, window: Arc<Window>) -> Result<(), SetupError> {
        let gpu = pollster::block_on(GpuState::new(window.clone(), self.ui_state.vsync_enabled))?;

        let egui_state = egui_winit::State::new(
            self.egui_ctx.clone(),
            self.egui_ctx.viewport_id(),
            &window,
            Some(window.scale_factor() as f32),
            None,
            Some(2048),
        );

        let egui_renderer =
            egui_wgpu::Renderer::new(&gpu.device, gpu.config.format, None, 1, false);

        apply_theme(&self.egui_ctx);

        let size = window.inner_size();
        self.camera.set_aspect(size.width as f32, size.height as f32);

        self.window = Some(window);
        self.gpu = Some(gpu);
        self.egui_state = Some(egui_state);
        self.egui_renderer = Some(egui_renderer);

        self.request_textures();
        Ok(())
    }

    fn request_textures(&mut self) {
        for kind in TextureKind::ALL {
            let path = self.config.textures.path(kind).to_path_buf();
            match self.loader.load(kind, path) {
                Ok(()) => self.textures.mark_loading(kind),
                Err(e) => {
                    let error = report(&e);
                    warn!("{}", error);
                    self.textures.apply(&LoadResult::Failed { kind, error });
                }
            }
        }
    }

    fn drain_textures(&mut self) {
        while let Some(result) = self.loader.try_recv_result() {
            self.textures.apply(&result);
            if let (LoadResult::Loaded(image), Some(gpu)) = (&result, &mut self.gpu) {
                gpu.upload_texture(image);
            }
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn update(&mut self) {
        self.frame_count += 1;
        let elapsed = self.fps_timer.elapsed().as_secs_f32();
        if elapsed >= 1.0 {
            self.stats.fps = self.frame_count as f32 / elapsed;
            self.frame_count = 0;
            self.fps_timer = Instant::now();
        }

        if self.input.drag_delta != Vec2::ZERO {
            self.camera.process_drag(self.input.drag_delta);
            self.input.drag_delta = Vec2::ZERO;
        }

        let Some(gpu) = &mut self.gpu else { return };

        let had_error = self.scene.error().is_some();
        match self.scene.sync(&self.ui_state.params) {
            Ok(Some(mesh)) => {
                self.upload_error = (!gpu.upload_mesh(mesh))
                    .then(|| "mesh does not fit the device buffers".to_string());
            }
            Ok(None) => {}
            Err(e) if !had_error => warn!("{}", e),
            Err(_) => {}
        }

        self.stats.vertices = gpu.mesh.vertex_count();
        self.stats.indices = gpu.mesh.index_count();
        self.stats.zoom = self.camera.zoom;
        self.stats.grid = self
            .scene
            .mesh()
            .map(|m| (m.resolution.u_steps(), m.resolution.v_steps()));
    }

    fn upload_uniforms(&self, gpu: &GpuState) {
        let params = &self.ui_state.params;

        let model = self.camera.model_matrix();
        let light_model = self.camera.model_matrix_at(self.scene.light_position(params));
        let light_view = light_model.transform_point3(Vec3::ZERO);

        let scene = SceneUniform::new(&self.camera, model, light_view, params.uv_center, params.angle_rad());
        let light = SceneUniform::new(&self.camera, light_model, light_view, params.uv_center, params.angle_rad());
        gpu.update_uniforms(&scene, &light);
    }

    fn render(&mut self) {
        let (Some(window), Some(egui_state)) = (&self.window, &mut self.egui_state) else {
            return;
        };

        let raw_input = egui_state.take_egui_input(window);

        let last_error = self
            .upload_error
            .clone()
            .or_else(|| self.scene.error().map(|e| e.to_string()))
            .or_else(|| self.loader.last_error());
        let stats = self.stats;
        let view_mode = self.ui_state.params.view_mode;

        let mut ui_actions = UiActions::default();

        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            ui_actions = draw_side_panel(ctx, &mut self.ui_state, &stats, &self.textures, &last_error);

            if self.ui_state.show_help {
                draw_help_overlay(ctx, view_mode);
            }
        });

        self.handle_ui_actions(ui_actions);

        let Some(gpu) = &self.gpu else { return };
        self.upload_uniforms(gpu);

        let Some(gpu) = &mut self.gpu else { return };
        let Some(window) = &self.window else { return };
        let Some(egui_state) = &mut self.egui_state else {
            return;
        };
        let Some(egui_renderer) = &mut self.egui_renderer else {
            return;
        };

        egui_state.handle_platform_output(window, full_output.platform_output);

        if self.ui_state.vsync_enabled != self.last_vsync_state {
            gpu.set_vsync(self.ui_state.vsync_enabled);
            self.last_vsync_state = self.ui_state.vsync_enabled;
        }

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                info!("surface lost, reconfiguring");
                gpu.resize(gpu.size);
                return;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("out of GPU memory");
                self.exit_requested = true;
                return;
            }
            Err(wgpu::SurfaceError::Timeout) => {
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, delta) in full_output.textures_delta.set {
            egui_renderer.update_texture(&gpu.device, &gpu.queue, id, &delta);
        }

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Main Encoder"),
            });

        egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );

        match view_mode {
            ViewMode::Surface => {
                gpu.render_surface(&view, &mut encoder, self.ui_state.params.show_wireframe)
            }
            ViewMode::Uv => gpu.render_uv(&view, &mut encoder),
        }

        {
            let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let mut render_pass = render_pass.forget_lifetime();
            egui_renderer.render(&mut render_pass, &paint_jobs, &screen_descriptor);
        }

        for id in full_output.textures_delta.free {
            egui_renderer.free_texture(&id);
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }

    fn handle_ui_actions(&mut self, actions: UiActions) {
        if actions.zoom_in {
            self.camera.zoom_in();
        }

        if actions.zoom_out {
            self.camera.zoom_out();
        }

        if actions.reset_view {
            self.reset_view();
        }

        if actions.reload_textures {
            self.request_textures();
        }
    }

    fn reset_view(&mut self) {
        self.camera.reset(self.config.view.zoom);
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Equal | KeyCode::NumpadAdd => self.camera.zoom_in(),
            KeyCode::Minus | KeyCode::NumpadSubtract => self.camera.zoom_out(),
            KeyCode::KeyR => self.reset_view(),
            KeyCode::KeyF => {
                self.ui_state.params.show_wireframe = !self.ui_state.params.show_wireframe
            }
            KeyCode::Tab => {
                self.ui_state.params.view_mode = match self.ui_state.params.view_mode {
                    ViewMode::Surface => ViewMode::Uv,
                    ViewMode::Uv => ViewMode::Surface,
                };
                self.input.dragging = false;
            }
            _ => {}
        }
    }

    fn viewport(&self) -> Vec2 {
        self.gpu
            .as_ref()
            .map(|gpu| Vec2::new(gpu.config.width as f32, gpu.config.height as f32))
            .unwrap_or(Vec2::ONE)
    }

    fn handle_cursor(&mut self, position: PhysicalPosition<f64>) {
        let cursor = Vec2::new(position.x as f32, position.y as f32);

        if self.input.dragging {
            if let Some(last) = self.input.cursor {
                self.input.drag_delta += cursor - last;
            }
        }
        self.input.cursor = Some(cursor);

        self.ui_state.hover_uv = self
            .ui_state
            .is_uv_view()
            .then(|| cursor_to_uv(cursor, self.viewport()));
    }

    fn handle_left_button(&mut self, pressed: bool) {
        match self.ui_state.params.view_mode {
            ViewMode::Surface => self.input.dragging = pressed,
            ViewMode::Uv => {
                if let (true, Some(cursor)) = (pressed, self.input.cursor) {
                    self.ui_state.params.uv_center = cursor_to_uv(cursor, self.viewport());
                }
            }
        }
    }

    fn fail_setup(&mut self, event_loop: &ActiveEventLoop, err: SetupError) {
        let message = report(&err);
        error!("setup failed: {}", message);
        if let Some(window) = &self.window {
            window.set_title(&format!("{} - {}", WINDOW_TITLE, message));
        }
        self.setup_error = Some(err);
        event_loop.exit();
    }
}

impl ApplicationHandler<UserEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_inner_size(PhysicalSize::new(self.config.window.width, self.config.window.height));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail_setup(event_loop, e.into()),
        };

        if let Err(e) = self.init_gpu(window.clone()) {
            self.window = Some(window);
            self.fail_setup(event_loop, e);
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: UserEvent) {
        match event {
            UserEvent::TexturesReady => self.drain_textures(),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Some(egui_state) = &mut self.egui_state {
            if let Some(window) = &self.window {
                let response = egui_state.on_window_event(window, &event);
                if response.consumed {
                    return;
                }
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                self.loader.stop();
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(size);
                    self.camera
                        .set_aspect(size.width as f32, size.height as f32);
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let (PhysicalKey::Code(key), ElementState::Pressed) = (event.physical_key, event.state) {
                    self.handle_key(key);
                }
            }

            WindowEvent::CursorMoved { position, .. } => self.handle_cursor(position),

            WindowEvent::CursorLeft { .. } => {
                self.input.cursor = None;
                self.input.dragging = false;
                self.ui_state.hover_uv = None;
            }

            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => self.handle_left_button(state == ElementState::Pressed),

            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 50.0,
                };
                self.camera.process_scroll(scroll);
            }

            WindowEvent::RedrawRequested => {
                self.update();
                self.render();
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,wgpu_core=warn,wgpu_hal=warn,naga=warn"));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

fn run() -> Result<(), AppError> {
    let config = AppConfig::load()?;

    let event_loop = EventLoop::<UserEvent>::with_user_event()
        .build()
        .map_err(SetupError::from)?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config, &event_loop);
    event_loop.run_app(&mut app).map_err(SetupError::from)?;

    match app.setup_error.take() {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

fn main() {
    init_tracing();

    if let Err(e) = run() {
        error!("{}", report(&e));
        std::process::exit(1);
    }
}
