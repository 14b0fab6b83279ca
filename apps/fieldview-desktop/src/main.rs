use anyhow::{Context as _, Result, anyhow};
use clap::Parser;
use egui::Context as EguiContext;
use fieldview_field::Preset;
use fieldview_input::{Action, Key};
use fieldview_kernel::{Viewer, ViewerConfig};
use fieldview_render_wgpu::WgpuRenderer;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "fieldview-desktop", about = "3D point-cloud viewer for scalar fields")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Point source to load (mandelbrot, square-modulus, square-real, square-imag, cubic-modulus, product)
    #[arg(long, default_value = "mandelbrot")]
    preset: Preset,

    /// Samples evaluated per tick (defaults to the preset's own value)
    #[arg(long)]
    count_per_tick: Option<usize>,

    /// Start with generation paused
    #[arg(long)]
    paused: bool,
}

/// Map a physical key to a viewer key.
fn viewer_key(code: KeyCode) -> Option<Key> {
    Some(match code {
        KeyCode::KeyW => Key::W,
        KeyCode::KeyA => Key::A,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyD => Key::D,
        KeyCode::ArrowUp => Key::Up,
        KeyCode::ArrowDown => Key::Down,
        KeyCode::ArrowLeft => Key::Left,
        KeyCode::ArrowRight => Key::Right,
        KeyCode::KeyR => Key::R,
        KeyCode::Enter | KeyCode::NumpadEnter => Key::Enter,
        KeyCode::Tab => Key::Tab,
        _ => return None,
    })
}

/// Application state.
struct AppState {
    viewer: Viewer,
    preset: Preset,
    show_overlay: bool,
    last_frame: Instant,
    // Fixed timestep
    tick_accumulator: f64,
    tick_rate: f64,
}

impl AppState {
    fn new(viewer: Viewer, preset: Preset) -> Self {
        let tick_rate = viewer.config.tick_interval.as_secs_f64();
        Self {
            viewer,
            preset,
            show_overlay: true,
            last_frame: Instant::now(),
            tick_accumulator: 0.0,
            tick_rate,
        }
    }

    fn update(&mut self, dt: f32) {
        self.tick_accumulator += dt as f64;
        while self.tick_accumulator >= self.tick_rate {
            self.tick_accumulator -= self.tick_rate;
            self.viewer.tick(self.tick_rate as f32);
        }
    }

    fn handle_key(&mut self, code: KeyCode, pressed: bool) {
        if code == KeyCode::F1 && pressed {
            self.show_overlay = !self.show_overlay;
            return;
        }
        let Some(key) = viewer_key(code) else {
            return;
        };
        if let Some(Action::NextPreset) = self.viewer.handle_key(key, pressed) {
            self.load_preset(self.preset.next());
        }
    }

    /// Route a keyboard event that the overlay may already have handled.
    /// Releases always reach the viewer so held axes cannot stick.
    fn handle_key_event(&mut self, code: KeyCode, pressed: bool, ui_consumed: bool) {
        if ui_consumed && pressed {
            return;
        }
        self.handle_key(code, pressed);
    }

    fn load_preset(&mut self, preset: Preset) {
        match preset.source() {
            Ok(source) => {
                self.viewer.change_target(source, true);
                self.viewer.set_count_per_tick(preset.count_per_tick());
                self.viewer.set_running(preset.start_running());
                self.preset = preset;
                tracing::info!(%preset, "preset loaded");
            }
            Err(e) => {
                tracing::error!("failed to build preset {preset}: {e}");
            }
        }
    }

    fn draw_ui(&mut self, ctx: &EguiContext, resident_groups: usize) {
        if !self.show_overlay {
            return;
        }

        let stats = self.viewer.stats().clone();
        let camera = *self.viewer.camera();
        let running = self.viewer.is_running();

        egui::Window::new("Field Viewer")
            .default_pos([12.0, 12.0])
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(format!("Preset: {}", self.preset));
                ui.label(format!(
                    "Points: {}  Groups: {}",
                    self.viewer.batch().point_count(),
                    self.viewer.batch().group_count()
                ));
                ui.label(format!("Remaining samples: {}", self.viewer.remaining()));
                ui.label(format!("GPU groups: {resident_groups}"));
                ui.label(if self.viewer.is_exhausted() {
                    "Generation: done".to_string()
                } else if running {
                    format!("Generation: running ({} / tick)", self.viewer.config.batch.count_per_tick)
                } else {
                    "Generation: paused".to_string()
                });
                ui.label(format!("Last step: {:.2?}", stats.step_time));
                ui.separator();
                ui.label(format!(
                    "Camera: ({:.1}, {:.1}, {:.1})",
                    camera.position.x, camera.position.y, camera.position.z
                ));
                ui.label(format!("Yaw: {:.1}  Pitch: {:.1}", camera.yaw, camera.pitch));
                ui.separator();

                ui.horizontal(|ui| {
                    let label = if running { "Pause (Enter)" } else { "Run (Enter)" };
                    if ui.button(label).clicked() {
                        self.viewer.set_running(!running);
                    }
                    if ui.button("Next preset (Tab)").clicked() {
                        self.load_preset(self.preset.next());
                    }
                });

                ui.separator();
                ui.small("WASD: Move | Arrows: Look | R: Reset camera | F1: Toggle overlay");
            });
    }
}

/// Window, surface and GPU handles created once the event loop resumes.
struct GpuContext {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl GpuContext {
    fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height.max(1) as f32
    }
}

struct GpuApp {
    state: AppState,
    gpu: Option<GpuContext>,
    egui_ctx: EguiContext,
}

impl GpuApp {
    fn new(state: AppState) -> Self {
        Self {
            state,
            gpu: None,
            egui_ctx: EguiContext::default(),
        }
    }

    fn init_gpu(&mut self, event_loop: &ActiveEventLoop) -> Result<GpuContext> {
        let attrs = Window::default_attributes()
            .with_title("Field Viewer")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("create window")?,
        );

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| anyhow!("no compatible GPU adapter"))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("fieldview_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| anyhow!("surface reports no formats"))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = WgpuRenderer::new(
            &device,
            surface_format,
            config.width,
            config.height,
            self.state.viewer.config.background,
        );

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok(GpuContext {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn redraw(&mut self) {
        let now = Instant::now();
        let dt = (now - self.state.last_frame).as_secs_f32().min(0.5);
        self.state.last_frame = now;
        self.state.update(dt);

        let Some(gpu) = &mut self.gpu else {
            return;
        };

        gpu.renderer.sync_batch(&gpu.device, self.state.viewer.batch());

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let render_view = self.state.viewer.view(gpu.aspect());
        gpu.renderer.render(
            &gpu.device,
            &gpu.queue,
            &view,
            &render_view,
            self.state.viewer.batch(),
        );

        let resident_groups = gpu.renderer.resident_groups();
        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            self.state.draw_ui(ctx, resident_groups);
        });

        gpu.egui_winit
            .handle_platform_output(&gpu.window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            gpu.egui_renderer
                .update_texture(&gpu.device, &gpu.queue, *id, image_delta);
        }
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        gpu.egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            gpu.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        gpu.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            gpu.egui_renderer.free_texture(id);
        }

        output.present();
        gpu.window.request_redraw();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match self.init_gpu(event_loop) {
            Ok(gpu) => self.gpu = Some(gpu),
            Err(e) => {
                tracing::error!("failed to initialize graphics: {e:#}");
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
        let ui_consumed = match &mut self.gpu {
            Some(gpu) => gpu.egui_winit.on_window_event(&gpu.window, &event).consumed,
            None => false,
        };
        if ui_consumed && !matches!(event, WindowEvent::KeyboardInput { .. }) {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.config.width = new_size.width.max(1);
                    gpu.config.height = new_size.height.max(1);
                    gpu.surface.configure(&gpu.device, &gpu.config);
                    gpu.renderer
                        .resize(&gpu.device, gpu.config.width, gpu.config.height);
                }
            }
            WindowEvent::Focused(false) => {
                self.state.viewer.release_keys();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                self.state
                    .handle_key_event(key, key_state == ElementState::Pressed, ui_consumed);
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!(preset = %cli.preset, "fieldview-desktop starting");

    let mut config = ViewerConfig::for_preset(cli.preset);
    if let Some(count) = cli.count_per_tick {
        config.batch.count_per_tick = count;
    }
    if cli.paused {
        config.start_running = false;
    }
    let viewer = Viewer::new(cli.preset.source()?, config);

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(AppState::new(viewer, cli.preset));
    event_loop.run_app(&mut app)?;

    Ok(())
}
