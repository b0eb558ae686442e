use std::num::NonZeroU32;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{DeviceEvent, DeviceId, ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use gridcast::audio::Silent;
use gridcast::camera::Camera;
use gridcast::caster::RayCaster;
use gridcast::clock::{FrameClock, FrameTick};
use gridcast::config::EngineConfig;
use gridcast::environment::Environment;
use gridcast::framebuffer::{FrameBuffer, pack_rgb};
use gridcast::grid::GridMap;
use gridcast::input::{InputState, KeyBindings};
use gridcast::player::{DamageSource, EventKind, Player, PlayerEvent};
use gridcast::render::Scene;
use gridcast::texture::Texture;

const SKY: u32 = pack_rgb(30, 30, 70);
const FLOOR: u32 = pack_rgb(40, 40, 40);
/// Q/E turn rate, in mouse units; 15 units is half a turn per second.
const KEY_TURN: f64 = 15.0;

#[derive(Parser, Debug)]
#[command(name = "gridcast", about = "Grid raycaster demo")]
struct Args {
    /// Engine configuration file (TOML).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Overrides `map.seed`.
    #[arg(long)]
    seed: Option<u64>,
}

struct App {
    config: EngineConfig,
    window: Option<Rc<Window>>,
    surface: Option<softbuffer::Surface<Rc<Window>, Rc<Window>>>,

    map: Arc<GridMap>,
    caster: RayCaster<Arc<GridMap>>,
    camera: Camera,
    player: Player,
    environment: Environment,

    input: InputState,
    bindings: KeyBindings,
    turn: f64,
    clock: FrameClock,
    audio: Silent,
    rng: ChaCha8Rng,

    // Internal low-res buffer, stretched to the window on present
    frame: FrameBuffer,

    // HUD
    frame_counter: u32,
    last_fps_print: Instant,
}

impl App {
    fn new(config: EngineConfig) -> Result<Self> {
        let mut rng = ChaCha8Rng::seed_from_u64(config.map.seed);

        let mut map = GridMap::new(config.map.width, config.map.height)
            .context("failed to allocate map")?;
        map.randomize(config.map.density, &mut rng);
        if config.map.border {
            map.fill_border(2);
        }
        let spawn = &config.player;
        let _ = map.set(spawn.x, spawn.y, 0);
        let map = Arc::new(map);

        let caster = RayCaster::builder()
            .map(Arc::clone(&map))
            .memoize(config.caching.ray_memo)
            .cache_limit(config.caching.limit)
            .build()
            .context("failed to build ray caster")?;

        let mut player = Player::new(spawn.x, spawn.y, spawn.direction);
        player.speed = spawn.speed;
        player.run_factor = spawn.run_factor;
        player.health = spawn.health;
        player.on(EventKind::Damaged, |event| {
            if let PlayerEvent::Damaged {
                source,
                amount,
                health,
            } = event
            {
                println!("player took {amount} damage from {source:?}, {health} left");
            }
        });
        player.on(EventKind::Died, |event| {
            if let PlayerEvent::Died { source } = event {
                println!("player killed by {source:?}");
            }
        });

        let environment = Environment {
            light: 0.0,
            ambient_light: config.environment.ambient_light,
            rain: config.environment.rain(),
            thunder: config.environment.thunder(),
            wall_color: pack_rgb(120, 120, 120),
            wall_textures: vec![
                Texture::brick(64, pack_rgb(150, 70, 50), pack_rgb(60, 55, 50)),
                Texture::checker(64, 4, pack_rgb(90, 90, 110), pack_rgb(60, 60, 80)),
            ],
            ground_color: FLOOR,
            ground_texture: Some(Texture::gravel(64)),
        };

        let internal_h = config.window.internal_height;
        let internal_w = internal_width(internal_h, config.window.width, config.window.height);
        let camera = Camera::new(internal_w, internal_h, config.camera_config());

        Ok(Self {
            window: None,
            surface: None,
            map,
            caster,
            camera,
            player,
            environment,
            input: InputState::default(),
            bindings: KeyBindings::default(),
            turn: 0.0,
            clock: FrameClock::new(),
            audio: Silent,
            rng,
            frame: FrameBuffer::new(internal_w, internal_h),
            frame_counter: 0,
            last_fps_print: Instant::now(),
            config,
        })
    }

    fn init_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attributes = Window::default_attributes()
            .with_title(&self.config.window.title)
            .with_inner_size(LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        let window = Rc::new(
            event_loop
                .create_window(attributes)
                .map_err(|err| anyhow!("failed to create window: {err}"))?,
        );

        let context = softbuffer::Context::new(window.clone())
            .map_err(|err| anyhow!("failed to create softbuffer context: {err}"))?;
        let surface = softbuffer::Surface::new(&context, window.clone())
            .map_err(|err| anyhow!("failed to create softbuffer surface: {err}"))?;

        let size = window.inner_size();
        self.rebuild_internal_frame(f64::from(size.width), f64::from(size.height));

        self.surface = Some(surface);
        window.request_redraw();
        self.window = Some(window);
        self.clock.reset();
        Ok(())
    }

    fn tick(&mut self) -> Result<()> {
        let seconds = match self.clock.tick(Instant::now()) {
            FrameTick::Run(seconds) => seconds,
            FrameTick::Skip(seconds) => {
                if seconds > 0.0 {
                    println!("skipped frame after {seconds:.3}s stall");
                }
                return Ok(());
            }
        };

        self.input.rotate_x += self.turn * KEY_TURN;
        self.player
            .update(&mut self.input, &*self.map, seconds, &mut self.audio);
        self.environment
            .update(seconds, &mut self.rng, &mut self.audio);
        self.camera
            .update(self.player.pose(), &mut self.caster)
            .context("failed to cast frame")?;
        Ok(())
    }

    fn draw(&mut self) {
        self.frame.clear_split(SKY, FLOOR);
        let scene = Scene {
            environment: &self.environment,
            map: &*self.map,
            pitch: self.player.direction_v,
        };
        self.camera.render(&mut self.frame, &scene, &mut self.rng);
    }

    fn present(&mut self, id: WindowId) -> Result<()> {
        let (window, surface) = match (&self.window, &mut self.surface) {
            (Some(w), Some(s)) if w.id() == id => (w, s),
            _ => return Ok(()),
        };

        let size = window.inner_size();
        let (Some(width), Some(height)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        else {
            return Ok(()); // minimized
        };
        surface
            .resize(width, height)
            .map_err(|err| anyhow!("failed to resize surface: {err}"))?;

        let mut buf = surface
            .buffer_mut()
            .map_err(|err| anyhow!("failed to map surface buffer: {err}"))?;
        self.frame
            .present_scaled(&mut buf, size.width as usize, size.height as usize);
        buf.present()
            .map_err(|err| anyhow!("failed to present frame: {err}"))?;
        Ok(())
    }

    fn rebuild_internal_frame(&mut self, dst_w: f64, dst_h: f64) {
        // Keep internal height fixed (controls pixel size look)
        let target_h = self.config.window.internal_height;
        let target_w = internal_width(target_h, dst_w, dst_h);

        self.frame.resize(target_w, target_h);
        self.camera.resize(target_w, target_h);
    }

    fn on_key(&mut self, code: KeyCode, state: ElementState) {
        let pressed = state == ElementState::Pressed;
        match code {
            KeyCode::KeyQ => self.turn = if pressed { -1.0 } else { 0.0 },
            KeyCode::KeyE => self.turn = if pressed { 1.0 } else { 0.0 },
            KeyCode::KeyK if pressed => self.player.damage(10.0, DamageSource::World),
            _ => {
                if let Some(action) = key_name(code).and_then(|name| self.bindings.action(name)) {
                    self.input.apply(action, pressed);
                }
            }
        }
    }

    fn print_fps(&mut self) {
        self.frame_counter += 1;
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_fps_print).as_secs_f32();
        if elapsed >= 1.0 {
            println!(
                "FPS: {:.1} ({} cached frames)",
                self.frame_counter as f32 / elapsed,
                self.camera.cached_frames()
            );
            self.frame_counter = 0;
            self.last_fps_print = now;
        }
    }
}

/// Internal framebuffer width for a window of `dst_w`×`dst_h`: the window's
/// aspect at `target_h` rows, even, and at least 160 columns.
fn internal_width(target_h: usize, dst_w: f64, dst_h: f64) -> usize {
    let aspect = if dst_h > 0.0 { dst_w / dst_h } else { 1.0 };
    let mut target_w = ((target_h as f64 * aspect).round() as usize).max(160);
    if target_w % 2 != 0 {
        target_w += 1;
    }
    target_w
}

fn key_name(code: KeyCode) -> Option<&'static str> {
    let name = match code {
        KeyCode::KeyW => "w",
        KeyCode::KeyA => "a",
        KeyCode::KeyS => "s",
        KeyCode::KeyD => "d",
        KeyCode::KeyX => "x",
        KeyCode::ShiftLeft | KeyCode::ShiftRight => "shift",
        _ => return None,
    };
    Some(name)
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let Err(err) = self.init_window(event_loop) {
            eprintln!("gridcast: {err:#}");
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                println!("The close button was pressed; stopping");
                event_loop.exit();
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => {
                if code == KeyCode::Escape {
                    event_loop.exit();
                    return;
                }
                self.on_key(code, state);
            }

            WindowEvent::RedrawRequested => {
                let frame = self.tick().and_then(|()| {
                    self.draw();
                    self.present(id)
                });
                if let Err(err) = frame {
                    eprintln!("gridcast: {err:#}");
                    event_loop.exit();
                    return;
                }
                self.print_fps();

                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            WindowEvent::Resized(new_size) => {
                self.rebuild_internal_frame(f64::from(new_size.width), f64::from(new_size.height));
            }
            _ => (),
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _id: DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            let sensitivity = self.config.input.mouse_sensitivity;
            self.input.apply_mouse(dx, dy, sensitivity);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            println!("loading config from {}", path.display());
            EngineConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?
        }
        None => EngineConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.map.seed = seed;
    }

    let mut app = App::new(config)?;

    let event_loop = EventLoop::new().map_err(|err| anyhow!("failed to create event loop: {err}"))?;
    // Poll: redraw continuously, a game wants every frame it can get
    event_loop.set_control_flow(ControlFlow::Poll);
    event_loop
        .run_app(&mut app)
        .map_err(|err| anyhow!("event loop failed: {err}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_width_follows_window_aspect() {
        assert_eq!(internal_width(480, 800.0, 600.0), 640);
        assert_eq!(internal_width(480, 1920.0, 1080.0), 854);
        assert_eq!(internal_width(100, 100.0, 100.0), 160);
        assert_eq!(internal_width(480, 800.0, 0.0), 480);
    }

    #[test]
    fn new_app_sizes_camera_from_the_configured_window() {
        let app = App::new(EngineConfig::default()).unwrap();
        assert_eq!(app.camera.width(), 640);
        assert_eq!(app.camera.height(), 480);
        assert_eq!(app.frame.pixels().len(), 640 * 480);
    }
}
