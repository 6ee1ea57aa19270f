use glfw::{Context, Glfw, GlfwReceiver, PWindow, WindowEvent};
use log::*;

use crate::ReadOnlyString;

/// How the window and its OpenGL context are created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: ReadOnlyString,
    /// Wait for vertical blank when swapping buffers.
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            title: "shaderview".into(),
            vsync: true,
        }
    }
}

/// A GLFW window with a current OpenGL 3.3 core context.
#[derive(Debug)]
pub struct GlfwWindow {
    glfw: Glfw,
    /// The underlying GLFW window.
    pub window: PWindow,
    pub event_receiver: GlfwReceiver<(f64, WindowEvent)>,
}

impl GlfwWindow {
    pub fn new(config: &WindowConfig) -> anyhow::Result<Self> {
        let mut glfw = glfw::init(handle_glfw_error)
            .map_err(|e| anyhow::anyhow!("Failed to initialize GLFW: {}", e))?;

        glfw.window_hint(glfw::WindowHint::ContextVersion(3, 3));
        glfw.window_hint(glfw::WindowHint::OpenGlProfile(
            glfw::OpenGlProfileHint::Core,
        ));
        glfw.window_hint(glfw::WindowHint::OpenGlForwardCompat(true));

        let (mut window, event_receiver) = glfw
            .create_window(
                config.width,
                config.height,
                &config.title,
                glfw::WindowMode::Windowed,
            )
            .ok_or_else(|| anyhow::anyhow!("Failed to create GLFW window"))?;

        window.set_key_polling(true);
        window.set_framebuffer_size_polling(true);
        window.make_current();

        let interval = if config.vsync {
            glfw::SwapInterval::Sync(1)
        } else {
            glfw::SwapInterval::None
        };
        glfw.set_swap_interval(interval);
        info!(
            "Created {}x{} window `{}`",
            config.width, config.height, config.title
        );

        Ok(GlfwWindow {
            glfw,
            window,
            event_receiver,
        })
    }

    /// Loads the OpenGL functions of this window's context.
    ///
    /// The context is current on this thread from [`Self::new`] on, and `glow::Context` is
    /// `!Send`, so the returned context can only be used where it is valid.
    pub fn load_gl(&mut self) -> glow::Context {
        let window = &mut self.window;
        let gl = unsafe {
            glow::Context::from_loader_function(|name| {
                window.get_proc_address(name).map_or(std::ptr::null(), |f| f as *const _)
            })
        };
        debug!("Loaded OpenGL functions");
        gl
    }

    pub fn should_close(&self) -> bool {
        self.window.should_close()
    }

    pub fn set_should_close(&mut self, value: bool) {
        self.window.set_should_close(value);
    }

    pub fn poll_events(&mut self) {
        self.glfw.poll_events();
    }

    /// Drains the events received by the last [`Self::poll_events`].
    pub fn events(&self) -> impl Iterator<Item = WindowEvent> + '_ {
        std::iter::from_fn(|| self.event_receiver.receive().map(|(_, event)| event))
    }

    pub fn swap_buffers(&mut self) {
        self.window.swap_buffers();
    }

    /// Gets the current size of the framebuffer, in pixels.
    pub fn framebuffer_size(&self) -> (u32, u32) {
        let (width, height) = self.window.get_framebuffer_size();
        (width.max(0) as u32, height.max(0) as u32)
    }

    /// Seconds since GLFW was initialized.
    pub fn time(&self) -> f64 {
        self.glfw.get_time()
    }
}

fn handle_glfw_error(error: glfw::Error, description: String) {
    error!("GLFW error {:?}: {}", error, description);
}
