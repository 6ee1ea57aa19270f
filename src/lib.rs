use std::rc::Rc;

use anyhow::Context;
use engine::{
    graphics::ProgramBuilder,
    input::Keyboard,
    window::GlfwWindow,
};
use glfw::{Key, WindowEvent};
use glow::HasContext;
use log::{info, warn};

use crate::{config::Args, frame::FrameUniforms, quad::FullscreenQuad};

pub mod config;
pub mod frame;
pub mod quad;

/// Opens the window and draws the shader named by `args` until the window is closed.
///
/// `R` reloads the shader from disk, `Escape` closes the window.
pub fn run_viewer(args: &Args) -> anyhow::Result<()> {
    info!("Starting shaderview");
    let mut window = GlfwWindow::new(&args.window_config())?;
    let gl = Rc::new(window.load_gl());
    let quad = FullscreenQuad::new(gl.clone())?;

    let source = args.source().context("Failed to load shader sources")?;
    let mut program = ProgramBuilder::new(source)
        .bind_attribute("a_position", FullscreenQuad::POSITION_ATTRIBUTE)
        .options(args.program_options())
        .build(gl.clone())
        .context("Failed to build shader program")?;
    let mut uniforms = FrameUniforms::locate(&program);

    let mut keyboard = Keyboard::new();
    let (width, height) = window.framebuffer_size();
    unsafe { gl.viewport(0, 0, width as i32, height as i32) };
    let start = window.time();

    while !window.should_close() {
        window.poll_events();
        keyboard.update_keys();
        for event in window.events() {
            match event {
                WindowEvent::FramebufferSize(width, height) => unsafe {
                    gl.viewport(0, 0, width, height);
                },
                event => keyboard.handle_event(&event),
            }
        }

        if keyboard.is_key_pressed(Key::Escape) {
            window.set_should_close(true);
        }
        if keyboard.is_key_pressed(Key::R) {
            match program.reload() {
                Ok(()) => {
                    info!("Reloaded shader `{}`", program.label());
                    uniforms = FrameUniforms::locate(&program);
                }
                Err(err) => warn!("Reload failed, keeping the previous shader: {err}"),
            }
        }

        unsafe {
            gl.clear_color(0.05, 0.05, 0.08, 1.0);
            gl.clear(glow::COLOR_BUFFER_BIT);
        }
        if program.is_linked() {
            program.use_program();
            let time = (window.time() - start) as f32;
            uniforms.upload(&program, time, window.framebuffer_size());
            quad.draw();
        }
        window.swap_buffers();
    }

    info!("Closing shaderview");
    Ok(())
}
