mod config;
mod core;
mod input;
mod playback;
mod session;
mod ui;

use config::{catalog_root, AppSettings, RaceCatalog, RenderConfig};
use input::FsAssetLoader;
use playback::{Frame, SystemClock, TimeSource};
use session::{LoadOutcome, LoadStatus, RaceController};
use ui::{FileDialogs, ImguiCanvas, RaceControlAction, RaceControlWindow, Renderer, TelemetryWindow};

use anyhow::{anyhow, Context as _, Result};
use imgui::{Condition, Context, FontConfig, FontSource};
use imgui_winit_support::{HiDpiMode, WinitPlatform};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use winit::event::{Event, WindowEvent};
use winit::event_loop::EventLoop;
use winit::window::WindowBuilder;

use glutin::display::GetGlDisplay;
use glutin::prelude::*;
use glutin_winit::{DisplayBuilder, GlWindow};
use glow::HasContext;
use raw_window_handle::HasRawWindowHandle;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

const DEFAULT_ASSET_ROOT: &str = "assets";

struct AppState {
    controller: RaceController,
    race_control: RaceControlWindow,
    telemetry: TelemetryWindow,
    renderer: Renderer,
    /// Frame computed by the latest tick
    frame: Option<Frame>,
    asset_root: PathBuf,
    catalog_path: Option<PathBuf>,
    show_race_control: bool,
    show_circuit: bool,
    show_telemetry: bool,
    open_catalog_pending: bool,
    status_message: Option<String>,
}

impl AppState {
    fn new(runtime: tokio::runtime::Handle, asset_root: PathBuf) -> Self {
        let mut settings = AppSettings::load();

        let mut status_message = None;
        let (catalog, asset_root) = match settings.load_catalog() {
            Ok(Some(loaded)) => loaded,
            Ok(None) => (RaceCatalog::default(), asset_root),
            Err(e) => {
                warn!("Falling back to the built-in catalog: {:#}", e);
                status_message = Some(format!("Could not load catalog: {}", e));
                (RaceCatalog::default(), asset_root)
            }
        };
        info!("Serving assets from {:?}", asset_root);

        let loader = Arc::new(FsAssetLoader::new(&asset_root, catalog.clone()));
        let controller = RaceController::new(catalog, loader, runtime);

        let mut state = Self {
            controller,
            race_control: RaceControlWindow::new(),
            telemetry: TelemetryWindow::new(),
            renderer: Renderer::new(RenderConfig::default()),
            frame: None,
            asset_root,
            catalog_path: settings.catalog_path.clone(),
            show_race_control: settings.show_race_control,
            show_circuit: settings.show_circuit,
            show_telemetry: settings.show_telemetry,
            open_catalog_pending: false,
            status_message,
        };

        let first_race = settings
            .last_race
            .filter(|id| state.controller.catalog().race(id).is_some())
            .or_else(|| state.controller.catalog().races.first().map(|r| r.id.clone()));
        if let Some(race_id) = first_race {
            state.select_race(&race_id);
        }
        state
    }

    fn save_settings(&self) {
        let settings = AppSettings {
            show_race_control: self.show_race_control,
            show_circuit: self.show_circuit,
            show_telemetry: self.show_telemetry,
            last_race: self
                .race_control
                .selected_race(self.controller.catalog())
                .map(str::to_string),
            catalog_path: self.catalog_path.clone(),
        };
        settings.save();
    }

    fn select_race(&mut self, race_id: &str) {
        self.race_control.select(self.controller.catalog(), race_id);
        self.frame = None;
        self.controller.switch_race(race_id);
    }

    fn open_catalog(&mut self, path: &Path) {
        match RaceCatalog::load(path) {
            Ok(catalog) => {
                let root = catalog_root(path);
                info!("Loaded race catalog {:?} ({} races)", path, catalog.races.len());
                let loader = Arc::new(FsAssetLoader::new(&root, catalog.clone()));
                let first_race = catalog.races.first().map(|r| r.id.clone());

                self.controller.replace_catalog(catalog, loader);
                self.asset_root = root;
                self.catalog_path = Some(path.to_path_buf());
                self.status_message = Some(format!("Opened catalog {}", path.display()));

                if let Some(race_id) = first_race {
                    self.select_race(&race_id);
                }
            }
            Err(e) => {
                error!("Failed to open catalog: {:#}", e);
                self.status_message = Some(format!("Failed to open catalog: {}", e));
            }
        }
    }

    fn process_file_dialogs(&mut self) {
        if self.open_catalog_pending {
            if let Some(path) = FileDialogs::open_catalog_file() {
                self.open_catalog(&path);
            }
            self.open_catalog_pending = false;
        }
    }

    fn apply_actions(&mut self, actions: Vec<RaceControlAction>) {
        for action in actions {
            match action {
                RaceControlAction::SwitchRace(race_id) => self.select_race(&race_id),
                RaceControlAction::Restart => self.controller.restart(),
                RaceControlAction::SetVisible { car, visible } => {
                    self.controller.set_visible(&car, visible)
                }
            }
        }
    }

    /// One animation tick
    fn update(&mut self, now: Instant) {
        match self.controller.poll_loads() {
            Some(LoadOutcome::Loaded { race_id, cars }) => {
                self.status_message = Some(format!("{}: {} cars loaded", race_id, cars));
            }
            Some(LoadOutcome::Failed { race_id, error }) => {
                self.status_message = Some(format!("{}: {}", race_id, error));
            }
            None => {}
        }

        self.frame = self.controller.tick(now);
        self.telemetry.update(self.frame.as_ref());
    }

    fn circuit_title(&self) -> String {
        let label = self
            .controller
            .session()
            .and_then(|s| self.controller.catalog().race(&s.race_id))
            .map(|r| r.label.as_str())
            .unwrap_or("Circuit");
        format!("{}###circuit", label)
    }

    fn render_circuit(&mut self, ui: &imgui::Ui) {
        let title = self.circuit_title();
        let controller = &self.controller;
        let renderer = &self.renderer;
        let frame = self.frame.as_ref();

        ui.window(title)
            .size([720.0, 560.0], Condition::FirstUseEver)
            .position([360.0, 30.0], Condition::FirstUseEver)
            .horizontal_scrollbar(true)
            .opened(&mut self.show_circuit)
            .build(|| {
                let Some(session) = controller.session() else {
                    match controller.status() {
                        LoadStatus::Loading(race) => ui.text(format!("Loading {}...", race)),
                        _ => ui.text_disabled("No race loaded"),
                    }
                    return;
                };

                let avail = ui.content_region_avail();
                let extent = renderer.canvas_extent(&session.track);
                let size = [avail[0].max(extent[0]), avail[1].max(extent[1])];

                let mut canvas = ImguiCanvas::new(ui, size);
                renderer.paint(&mut canvas, &session.track, &session.cars, frame);
                canvas.finish();
            });
    }
}

/// Asset paths in a catalog are relative to the catalog's directory
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let asset_root = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ASSET_ROOT));

    // Asset loads run here; the UI thread only polls their results
    let rt = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;

    let event_loop = EventLoop::new().map_err(|e| anyhow!("Failed to create EventLoop: {}", e))?;

    let (window, gl_config) = DisplayBuilder::new()
        .with_window_builder(Some(
            WindowBuilder::new()
                .with_title("Race Replay")
                .with_inner_size(winit::dpi::LogicalSize::new(1200.0, 800.0)),
        ))
        .build(&event_loop, glutin::config::ConfigTemplateBuilder::new(), |mut iter| {
            iter.next().expect("No GL config available")
        })
        .map_err(|e| anyhow!("Failed to create window and display: {}", e))?;

    let window = window.context("Failed to create window")?;
    let gl_display = gl_config.display();

    let context = unsafe {
        gl_display.create_context(
            &gl_config,
            &glutin::context::ContextAttributesBuilder::new().build(Some(window.raw_window_handle())),
        )
    }
    .context("Failed to create GL context")?;

    let attrs = window.build_surface_attributes(
        glutin::surface::SurfaceAttributesBuilder::<glutin::surface::WindowSurface>::new(),
    );
    let surface = unsafe { gl_display.create_window_surface(&gl_config, &attrs) }
        .context("Failed to create surface")?;
    let context = context
        .make_current(&surface)
        .context("Failed to make context current")?;

    let load_gl = || unsafe {
        glow::Context::from_loader_function(|name| {
            let name = std::ffi::CString::new(name).expect("GL symbol names contain no NUL");
            gl_display.get_proc_address(&name) as *const _
        })
    };
    let gl = load_gl();

    let mut imgui = Context::create();
    imgui.set_log_filename(None::<PathBuf>);

    let ini_path = AppSettings::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("layout.ini");
    if let Some(parent) = ini_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    imgui.set_ini_filename(Some(ini_path));
    imgui.io_mut().config_flags |= imgui::ConfigFlags::DOCKING_ENABLE;

    let hidpi_factor = window.scale_factor();
    let font_size = (14.0 * hidpi_factor) as f32;
    imgui.fonts().add_font(&[FontSource::DefaultFontData {
        config: Some(FontConfig {
            size_pixels: font_size,
            ..FontConfig::default()
        }),
    }]);
    imgui.io_mut().font_global_scale = (1.0 / hidpi_factor) as f32;

    let mut platform = WinitPlatform::init(&mut imgui);
    platform.attach_window(imgui.io_mut(), &window, HiDpiMode::Default);

    let mut renderer = imgui_glow_renderer::AutoRenderer::initialize(gl, &mut imgui)
        .map_err(|e| anyhow!("Failed to initialize renderer: {:?}", e))?;

    // Second handle onto the same GL context, used to clear the frame
    let gl_clear = load_gl();

    let mut state = AppState::new(rt.handle().clone(), asset_root);
    let clock = SystemClock;
    let mut last_frame_time = Instant::now();
    let mut last_settings_save = Instant::now();

    event_loop
        .run(move |event, window_target| {
            match event {
                Event::NewEvents(_) => {
                    let now = Instant::now();
                    imgui.io_mut().update_delta_time(now - last_frame_time);
                    last_frame_time = now;
                }
                Event::AboutToWait => {
                    state.process_file_dialogs();
                    state.update(clock.now());

                    if last_settings_save.elapsed().as_secs() >= 30 {
                        state.save_settings();
                        last_settings_save = Instant::now();
                    }

                    if let Err(e) = platform.prepare_frame(imgui.io_mut(), &window) {
                        error!("Failed to prepare frame: {}", e);
                    }
                    window.request_redraw();
                }
                Event::WindowEvent {
                    event: WindowEvent::RedrawRequested,
                    ..
                } => {
                    let ui = imgui.new_frame();

                    ui.main_menu_bar(|| {
                        ui.menu("File", || {
                            if ui.menu_item("Open Race Catalog...") {
                                state.open_catalog_pending = true;
                            }
                            ui.separator();
                            if ui.menu_item("Exit") {
                                window_target.exit();
                            }
                        });

                        ui.menu("Playback", || {
                            if ui.menu_item("Restart Lap") {
                                state.controller.restart();
                            }
                            if ui.menu_item("Stop") {
                                state.controller.cancel();
                            }
                        });

                        ui.menu("View", || {
                            ui.checkbox("Race Control", &mut state.show_race_control);
                            ui.checkbox("Circuit", &mut state.show_circuit);
                            ui.checkbox("Telemetry", &mut state.show_telemetry);
                        });
                    });

                    let window_size = window.inner_size();
                    let logical_width = window_size.width as f32 / hidpi_factor as f32;
                    let logical_height = window_size.height as f32 / hidpi_factor as f32;
                    ui.set_cursor_pos([0.0, logical_height - 25.0]);
                    ui.child_window("Status")
                        .size([logical_width, 25.0])
                        .build(|| {
                            if state.controller.is_loading() {
                                ui.text_colored([1.0, 0.8, 0.3, 1.0], "Loading race assets...");
                            } else if let Some(ref msg) = state.status_message {
                                ui.text(msg);
                            } else {
                                ui.text(format!("Assets: {}", state.asset_root.display()));
                            }
                        });

                    ui.dockspace_over_main_viewport();

                    if state.show_race_control {
                        let actions = state.race_control.render(
                            ui,
                            state.controller.catalog(),
                            state.controller.visibility(),
                            state.controller.status(),
                            state.controller.playback_state(),
                            &mut state.show_race_control,
                        );
                        state.apply_actions(actions);
                    }

                    if state.show_circuit {
                        state.render_circuit(ui);
                    }

                    if state.show_telemetry {
                        state.telemetry.render(ui, &mut state.show_telemetry);
                    }

                    platform.prepare_render(ui, &window);
                    let draw_data = imgui.render();

                    unsafe {
                        gl_clear.clear_color(0.1, 0.1, 0.1, 1.0);
                        gl_clear.clear(glow::COLOR_BUFFER_BIT);
                    }

                    if let Err(e) = renderer.render(draw_data) {
                        error!("Rendering failed: {:?}", e);
                    }
                    if let Err(e) = surface.swap_buffers(&context) {
                        error!("Failed to swap buffers: {}", e);
                    }
                }
                Event::WindowEvent {
                    event: WindowEvent::CloseRequested,
                    ..
                } => {
                    state.save_settings();
                    window_target.exit();
                }
                _ => {}
            }

            platform.handle_event(imgui.io_mut(), &window, &event);
        })
        .map_err(|e| anyhow!("Event loop error: {}", e))
}
