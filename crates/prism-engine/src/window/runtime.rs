use std::time::{Duration, Instant};

use anyhow::{ensure, Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App as CoreApp, AppControl, FrameCtx, SetupCtx, WindowCtx};
use crate::device::{DeviceError, Gpu, GpuInit};
use crate::time::{RedrawTimer, DEFAULT_REDRAW_INTERVAL};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    /// Fixed period between redraws.
    pub redraw_interval: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "prism".to_string(),
            initial_size: LogicalSize::new(640.0, 480.0),
            redraw_interval: DEFAULT_REDRAW_INTERVAL,
        }
    }
}

impl RuntimeConfig {
    /// Rejects settings the event loop cannot run with.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.redraw_interval.is_zero(),
            "redraw interval must be non-zero"
        );
        let LogicalSize { width, height } = self.initial_size;
        ensure!(
            width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0,
            "initial window size must be positive, got {width}x{height}"
        );
        Ok(())
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the window, runs `app` until the window closes, and returns the
    /// first setup error if there was one.
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: 'static + CoreApp,
    {
        config.validate().context("invalid runtime configuration")?;
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    timer: RedrawTimer,
    redraw_pending: bool,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState<A>
where
    A: CoreApp + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    entry: Option<WindowEntry>,
    exit_requested: bool,
    error: Option<anyhow::Error>,
}

impl<A> AppState<A>
where
    A: CoreApp + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        Self {
            config,
            gpu_init,
            app,
            entry: None,
            exit_requested: false,
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        if self.error.is_none() {
            self.error = Some(err);
        }
        self.exit_requested = true;
        event_loop.exit();
    }

    fn create_window_entry(&self, event_loop: &ActiveEventLoop) -> Result<WindowEntry> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();
        let entry = WindowEntryTryBuilder {
            timer: RedrawTimer::new(self.config.redraw_interval, Instant::now()),
            redraw_pending: false,
            window,
            gpu_builder: |w| -> Result<Gpu<'_>, DeviceError> {
                pollster::block_on(Gpu::new(w, gpu_init))
            },
        }
        .try_build()
        .context("GPU initialization failed")?;

        Ok(entry)
    }

    /// Window + GPU, then the app's own setup (shaders, program, buffers).
    fn setup(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let entry = self.create_window_entry(event_loop)?;

        let app = &mut self.app;
        entry
            .with(|fields| {
                let ctx = SetupCtx {
                    window: WindowCtx {
                        window: fields.window,
                    },
                    device: fields.gpu.device(),
                    queue: fields.gpu.queue(),
                    surface_format: fields.gpu.surface_format(),
                };
                app.on_setup(&ctx)
            })
            .context("application setup failed")?;

        log::debug!("runtime ready; redrawing every {:?}", self.config.redraw_interval);
        entry.with_window(|w| w.request_redraw());
        self.entry = Some(entry);
        Ok(())
    }

    fn redraw(&mut self) -> AppControl {
        let (app, entry) = (&mut self.app, &mut self.entry);
        let Some(entry) = entry.as_mut() else {
            return AppControl::Continue;
        };

        entry.with_mut(|fields| {
            *fields.redraw_pending = false;
            let tick = fields.timer.tick(Instant::now());

            let mut ctx = FrameCtx {
                window: WindowCtx {
                    window: fields.window,
                },
                gpu: fields.gpu,
                tick,
            };
            app.on_frame(&mut ctx)
        })
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: CoreApp + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() || self.exit_requested {
            return;
        }

        if let Err(e) = self.setup(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        let Some(entry) = self.entry.as_mut() else {
            event_loop.set_control_flow(ControlFlow::Wait);
            return;
        };

        let now = Instant::now();
        let flow = entry.with_mut(|fields| {
            if *fields.redraw_pending {
                // Already asked; the redraw event re-arms the timer.
                return ControlFlow::Wait;
            }
            if fields.timer.is_due(now) {
                *fields.redraw_pending = true;
                fields.window.request_redraw();
                return ControlFlow::Wait;
            }
            ControlFlow::WaitUntil(fields.timer.deadline())
        });
        event_loop.set_control_flow(flow);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        let (app, entry) = (&mut self.app, &mut self.entry);
        let Some(entry) = entry.as_mut() else {
            return;
        };

        if entry.with_window(|w| app.on_window_event(w, &event)) == AppControl::Exit {
            self.exit_requested = true;
            event_loop.exit();
            return;
        }

        match &event {
            WindowEvent::CloseRequested => {
                log::debug!("close requested");
                self.entry = None;
                self.exit_requested = true;
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                entry.with_gpu_mut(|gpu| gpu.resize(*new_size));
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let new_size = entry.with_window(|w| w.inner_size());
                entry.with_gpu_mut(|gpu| gpu.resize(new_size));
            }

            WindowEvent::RedrawRequested => {
                if self.redraw() == AppControl::Exit {
                    self.exit_requested = true;
                    event_loop.exit();
                }
            }

            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(RuntimeConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_redraw_interval_is_rejected() {
        let config = RuntimeConfig {
            redraw_interval: Duration::ZERO,
            ..RuntimeConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("non-zero"), "{err}");
    }

    #[test]
    fn degenerate_window_size_is_rejected() {
        for (w, h) in [(0.0, 480.0), (640.0, -1.0), (f64::NAN, 480.0)] {
            let config = RuntimeConfig {
                initial_size: LogicalSize::new(w, h),
                ..RuntimeConfig::default()
            };
            assert!(config.validate().is_err(), "{w}x{h}");
        }
    }
}
