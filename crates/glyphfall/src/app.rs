use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use glyphfall_config::Config;
use glyphfall_core::{Canvas, HeartSettings, Surface};
use glyphfall_effects::{
    Animator, AnimatorSettings, DEFAULT_MORPH_STEP, FontFamily, RainPaint, chars,
};
use ratatui::{DefaultTerminal, Frame};
use tracing::{info, warn};

/// Event poll timeout, about one display frame.
const POLL_INTERVAL: Duration = Duration::from_millis(16);

/// Render one frame out of this many loop iterations.
const FRAME_DIVISOR: u64 = 2;

type Hook = Box<dyn FnOnce(&Animator)>;

/// Build animation settings from the user configuration.
pub fn animator_settings(config: &Config) -> AnimatorSettings {
    let morph_step = if config.morph_step.is_finite() && config.morph_step > 0.0 {
        config.morph_step
    } else {
        warn!(morph_step = config.morph_step, "morph step must be positive, using default");
        DEFAULT_MORPH_STEP
    };
    let heart = match config.heart.validate() {
        Ok(()) => config.heart,
        Err(err) => {
            warn!(%err, "invalid heart settings, using defaults");
            HeartSettings::default()
        }
    };
    let paint = match config.gradient_stops() {
        Some((from, to)) => RainPaint::Gradient(from, to),
        None => RainPaint::Solid(config.color),
    };

    AnimatorSettings {
        chars: chars::resolve(&config.chars),
        font_size: config.font_size,
        message_font: FontFamily::parse(&config.message_font),
        paint,
        background: config.background,
        messages: config.messages.clone(),
        dwell: Duration::from_millis(config.dwell_ms),
        morph_step,
        heart,
        caption: config.caption.clone(),
        images: config.images.clone(),
    }
}

/// The main application which holds the state and logic of the application.
pub struct App {
    /// Is the application running?
    running: bool,
    config: Config,
    canvas: Canvas,
    animator: Option<Animator>,
    /// Called once the animation starts.
    on_mount: Option<Hook>,
    /// Called after the animation stops.
    on_unmount: Option<Hook>,
}

impl App {
    /// Construct a new instance of [`App`].
    pub fn new(config: Config) -> Self {
        Self {
            running: false,
            canvas: Canvas::new(config.font_size / 2.0),
            config,
            animator: None,
            on_mount: None,
            on_unmount: None,
        }
    }

    pub fn on_mount(mut self, hook: impl FnOnce(&Animator) + 'static) -> Self {
        self.on_mount = Some(Box::new(hook));
        self
    }

    pub fn on_unmount(mut self, hook: impl FnOnce(&Animator) + 'static) -> Self {
        self.on_unmount = Some(Box::new(hook));
        self
    }

    /// Run the application's main loop.
    pub fn run(mut self, mut terminal: DefaultTerminal) -> color_eyre::Result<()> {
        let size = terminal.size()?;
        let (width, height) = self.canvas.logical_size_for(size.width, size.height);
        let width = self.config.width.unwrap_or(width);
        let height = self.config.height.unwrap_or(height);

        let animator = Animator::new(
            &mut self.canvas,
            animator_settings(&self.config),
            width,
            height,
        );
        animator.start();
        if let Some(hook) = self.on_mount.take() {
            hook(&animator);
        }
        self.animator = Some(animator);

        let started = Instant::now();
        let mut iteration: u64 = 0;
        self.running = true;
        while self.running {
            if iteration % FRAME_DIVISOR == 0 {
                self.tick(&mut terminal, started.elapsed())?;
            }
            iteration = iteration.wrapping_add(1);
            self.handle_crossterm_events()?;
        }

        self.unmount();
        Ok(())
    }

    /// Advance the animation and draw it.
    fn tick(&mut self, terminal: &mut DefaultTerminal, now: Duration) -> color_eyre::Result<()> {
        let Some(animator) = self.animator.as_mut() else {
            self.running = false;
            return Ok(());
        };
        if !animator.tick(&mut self.canvas, now) {
            self.running = false;
            return Ok(());
        }
        terminal.draw(|frame| self.render(frame))?;
        Ok(())
    }

    /// Renders the user interface.
    fn render(&self, frame: &mut Frame) {
        frame.render_widget(&self.canvas, frame.area());
    }

    /// Reads the crossterm events and updates the state of [`App`].
    fn handle_crossterm_events(&mut self) -> color_eyre::Result<()> {
        if event::poll(POLL_INTERVAL)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key_event(key),
                Event::Resize(cols, rows) => self.on_resize(cols, rows),
                _ => {}
            }
        }
        Ok(())
    }

    /// Handles the key events and updates the state of [`App`].
    fn on_key_event(&mut self, key: KeyEvent) {
        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c') | KeyCode::Char('C')) => self.quit(),
            (_, KeyCode::Esc | KeyCode::Char('q')) if self.config.exit_on_key => self.quit(),
            _ => {}
        }
    }

    /// Follow the terminal size when auto resize is on.
    fn on_resize(&mut self, cols: u16, rows: u16) {
        if !self.config.auto_resize {
            return;
        }
        let (width, height) = self.canvas.logical_size_for(cols, rows);
        if let Some(animator) = self.animator.as_mut() {
            animator.resize(&mut self.canvas, width, height);
        }
    }

    /// Set running to false to quit the application.
    fn quit(&mut self) {
        if let Some(animator) = &self.animator {
            animator.stop();
        }
        self.running = false;
    }

    fn unmount(&mut self) {
        let Some(animator) = self.animator.take() else {
            return;
        };
        animator.stop();
        info!(
            frames = animator.frames(),
            width = self.canvas.width(),
            height = self.canvas.height(),
            "stopped"
        );
        if let Some(hook) = self.on_unmount.take() {
            hook(&animator);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphfall_core::Rgba;

    fn press(modifiers: KeyModifiers, code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    fn mounted(config: Config) -> App {
        let mut app = App::new(config);
        let settings = animator_settings(&app.config);
        let animator = Animator::new(&mut app.canvas, settings, 280.0, 140.0);
        animator.start();
        app.animator = Some(animator);
        app.running = true;
        app
    }

    #[test]
    fn test_settings_from_config() {
        let config = Config::default();
        let settings = animator_settings(&config);
        assert_eq!(settings.font_size, 14.0);
        assert_eq!(settings.message_font, FontFamily::Proportional);
        assert_eq!(settings.chars.len(), 172);
        assert!(matches!(settings.paint, RainPaint::Gradient(_, _)));
        assert_eq!(settings.dwell, Duration::from_secs(2));
        assert_eq!(settings.messages, config.messages);
    }

    #[test]
    fn test_solid_paint_and_bad_step() {
        let config = Config {
            gradient: Vec::new(),
            color: Rgba::rgb(1, 2, 3),
            morph_step: 0.0,
            message_font: "monospace".into(),
            ..Default::default()
        };
        let settings = animator_settings(&config);
        assert_eq!(settings.paint, RainPaint::Solid(Rgba::rgb(1, 2, 3)));
        assert_eq!(settings.morph_step, DEFAULT_MORPH_STEP);
        assert_eq!(settings.message_font, FontFamily::Monospace);
    }

    #[test]
    fn test_invalid_heart_settings_fall_back() {
        let valid = Config {
            heart: HeartSettings {
                length: 500,
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(animator_settings(&valid).heart.length, 500);

        for heart in [
            HeartSettings {
                duration: 0.0,
                ..Default::default()
            },
            HeartSettings {
                duration: f32::NAN,
                ..Default::default()
            },
            HeartSettings {
                length: usize::MAX,
                ..Default::default()
            },
            HeartSettings {
                velocity: f32::INFINITY,
                ..Default::default()
            },
        ] {
            let config = Config {
                heart,
                ..Default::default()
            };
            assert_eq!(animator_settings(&config).heart, HeartSettings::default());
        }
    }

    #[test]
    fn test_canvas_scale_follows_font_size() {
        let app = App::new(Config::default());
        assert_eq!(app.canvas.scale(), 7.0);
    }

    #[test]
    fn test_exit_keys() {
        let mut app = mounted(Config::default());
        app.on_key_event(press(KeyModifiers::NONE, KeyCode::Char('x')));
        assert!(app.running);
        app.on_key_event(press(KeyModifiers::NONE, KeyCode::Char('q')));
        assert!(!app.running);
        assert!(!app.animator.as_ref().unwrap().is_running());
    }

    #[test]
    fn test_ctrl_c_ignores_exit_on_key() {
        let config = Config {
            exit_on_key: false,
            ..Default::default()
        };
        let mut app = mounted(config);
        app.on_key_event(press(KeyModifiers::NONE, KeyCode::Esc));
        assert!(app.running);
        app.on_key_event(press(KeyModifiers::CONTROL, KeyCode::Char('c')));
        assert!(!app.running);
    }

    #[test]
    fn test_resize_respects_auto_resize() {
        let mut app = mounted(Config::default());
        app.on_resize(80, 20);
        assert_eq!(app.canvas.width(), 560.0);

        let mut fixed = mounted(Config {
            auto_resize: false,
            ..Default::default()
        });
        fixed.on_resize(80, 20);
        assert_eq!(fixed.canvas.width(), 280.0);
    }

    #[test]
    fn test_unmount_runs_hook_once() {
        use std::cell::Cell;
        use std::rc::Rc;

        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        let mut app = mounted(Config::default()).on_unmount(move |animator| {
            assert!(!animator.is_running());
            seen.set(seen.get() + 1);
        });
        app.unmount();
        app.unmount();
        assert_eq!(calls.get(), 1);
        assert!(app.animator.is_none());
    }
}
