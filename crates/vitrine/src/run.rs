use std::ffi::CString;
use std::num::NonZeroU32;

use anyhow::{anyhow, Context, Result};
use catalogue::{builtin_catalogue, Catalogue};
use engine::{GlowContext, Session};
use glutin::config::ConfigTemplateBuilder;
use glutin::context::{ContextApi, ContextAttributesBuilder, Version};
use glutin::display::GetGlDisplay;
use glutin::prelude::*;
use glutin::surface::{SurfaceAttributesBuilder, SwapInterval, WindowSurface};
use glutin_winit::DisplayBuilder;
use raw_window_handle::HasRawWindowHandle;
use tracing_subscriber::EnvFilter;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::WindowBuilder;

use crate::cli::RunArgs;
use crate::panel;

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn resolve_catalogue(args: &RunArgs) -> Result<Catalogue> {
    match &args.catalogue {
        Some(dir) => Catalogue::load(dir)
            .with_context(|| format!("failed to load catalogue from {}", dir.display())),
        None => Ok(builtin_catalogue()),
    }
}

fn start_index(args: &RunArgs, catalogue: &Catalogue) -> Result<usize> {
    match &args.shader {
        Some(id) => catalogue
            .index_of(id)
            .ok_or_else(|| anyhow!("catalogue has no entry '{id}' (try `vitrine list`)")),
        None => Ok(catalogue.default_index()),
    }
}

pub fn list(args: &RunArgs) -> Result<()> {
    let catalogue = resolve_catalogue(args)?;
    for entry in catalogue.entries() {
        let marker = if entry.default { "*" } else { " " };
        println!(
            "{marker} {:<12} {:<28} {} params",
            entry.id,
            entry.name,
            entry.params.len()
        );
    }
    Ok(())
}

pub fn run(args: RunArgs) -> Result<()> {
    let catalogue = resolve_catalogue(&args)?;
    let start = start_index(&args, &catalogue)?;
    let (width, height) = args.size;
    tracing::info!(entries = catalogue.len(), width, height, "starting viewer");

    let event_loop = EventLoop::new().map_err(|err| anyhow!("failed to create event loop: {err}"))?;
    let window_builder = WindowBuilder::new()
        .with_title("vitrine")
        .with_inner_size(PhysicalSize::new(width, height));

    let template = ConfigTemplateBuilder::new().with_alpha_size(8).with_depth_size(0);
    let display_builder = DisplayBuilder::new().with_window_builder(Some(window_builder));
    let (window, gl_config) = display_builder
        .build(&event_loop, template, |configs| {
            configs
                .reduce(|best, candidate| {
                    if candidate.num_samples() > best.num_samples() {
                        candidate
                    } else {
                        best
                    }
                })
                .expect("at least one GL config")
        })
        .map_err(|err| anyhow!("failed to build GL display: {err}"))?;
    let window = window.context("no window was created")?;

    let raw_window_handle = window.raw_window_handle();
    let gl_display = gl_config.display();

    let context_attributes = ContextAttributesBuilder::new()
        .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
        .build(Some(raw_window_handle));
    let not_current = unsafe { gl_display.create_context(&gl_config, &context_attributes) }
        .map_err(|err| anyhow!("failed to create GL context: {err}"))?;

    let size = window.inner_size();
    let surface_attributes = SurfaceAttributesBuilder::<WindowSurface>::new().build(
        raw_window_handle,
        NonZeroU32::new(size.width.max(1)).expect("non-zero width"),
        NonZeroU32::new(size.height.max(1)).expect("non-zero height"),
    );
    let gl_surface = unsafe { gl_display.create_window_surface(&gl_config, &surface_attributes) }
        .map_err(|err| anyhow!("failed to create window surface: {err}"))?;
    let gl_context = not_current
        .make_current(&gl_surface)
        .map_err(|err| anyhow!("failed to make GL context current: {err}"))?;
    gl_surface
        .set_swap_interval(&gl_context, SwapInterval::Wait(NonZeroU32::new(1).expect("non-zero")))
        .ok();

    let gl = unsafe {
        glow::Context::from_loader_function(|symbol| {
            let symbol = CString::new(symbol).expect("GL symbol name");
            gl_display.get_proc_address(&symbol) as *const _
        })
    };
    let graphics =
        GlowContext::new(gl).map_err(|err| anyhow!("failed to initialise GL state: {err}"))?;

    let mut session = Session::new(graphics, catalogue);
    session.set_viewport(size.width as f32, size.height as f32);
    session
        .graphics()
        .set_viewport(size.width as i32, size.height as i32);
    session.switch_to(start)?;

    let mut buffer_height = size.height as f32;
    let mut selected = 0usize;
    let mut shift_held = false;
    print_panel(&session, selected);

    event_loop
        .run(move |event, target| {
            target.set_control_flow(ControlFlow::Poll);
            match event {
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::CloseRequested => target.exit(),
                    WindowEvent::Resized(new_size) => {
                        if new_size.width > 0 && new_size.height > 0 {
                            gl_surface.resize(
                                &gl_context,
                                NonZeroU32::new(new_size.width).expect("non-zero width"),
                                NonZeroU32::new(new_size.height).expect("non-zero height"),
                            );
                            session
                                .graphics()
                                .set_viewport(new_size.width as i32, new_size.height as i32);
                            session.set_viewport(new_size.width as f32, new_size.height as f32);
                            buffer_height = new_size.height as f32;
                        }
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        // draw-buffer coordinates with Y measured from the bottom
                        session
                            .set_pointer(position.x as f32, buffer_height - position.y as f32);
                    }
                    WindowEvent::ModifiersChanged(modifiers) => {
                        shift_held = modifiers.state().shift_key();
                    }
                    WindowEvent::KeyboardInput { event, .. }
                        if event.state == ElementState::Pressed =>
                    {
                        match event.logical_key.as_ref() {
                            Key::Named(NamedKey::Escape) => target.exit(),
                            Key::Named(NamedKey::ArrowRight) | Key::Named(NamedKey::ArrowDown) => {
                                if session.advance().is_ok() {
                                    selected = 0;
                                    print_panel(&session, selected);
                                }
                            }
                            Key::Named(NamedKey::ArrowLeft) | Key::Named(NamedKey::ArrowUp) => {
                                if session.retreat().is_ok() {
                                    selected = 0;
                                    print_panel(&session, selected);
                                }
                            }
                            Key::Named(NamedKey::Tab) => {
                                let visible = visible_count(&session);
                                if visible > 0 {
                                    selected = if shift_held {
                                        (selected + visible - 1) % visible
                                    } else {
                                        (selected + 1) % visible
                                    };
                                    print_panel(&session, selected);
                                }
                            }
                            Key::Character("+") | Key::Character("=") => {
                                nudge_selected(&mut session, &mut selected, 1.0);
                            }
                            Key::Character("-") => {
                                nudge_selected(&mut session, &mut selected, -1.0);
                            }
                            Key::Character("r") | Key::Character("R") => {
                                session.reset_parameters();
                                selected = 0;
                                print_panel(&session, selected);
                            }
                            _ => {}
                        }
                    }
                    WindowEvent::RedrawRequested => {
                        session.render_frame();
                        if let Err(err) = gl_surface.swap_buffers(&gl_context) {
                            tracing::warn!(error = %err, "swap_buffers failed");
                        }
                        window.request_redraw();
                    }
                    _ => {}
                },
                Event::AboutToWait => window.request_redraw(),
                _ => {}
            }
        })
        .map_err(|err| anyhow!("event loop terminated abnormally: {err}"))
}

fn visible_count(session: &Session<GlowContext>) -> usize {
    session.panel().filter(|row| row.visible).count()
}

fn nudge_selected(session: &mut Session<GlowContext>, selected: &mut usize, direction: f64) {
    let target = session
        .panel()
        .filter(|row| row.visible)
        .nth(*selected)
        .map(|row| {
            (
                row.descriptor.uniform.clone(),
                panel::nudged(row.descriptor, row.value, direction),
            )
        });
    if let Some((uniform, value)) = target {
        session.set_parameter(&uniform, value);
        // a select change can hide rows below the cursor
        let visible = visible_count(session);
        *selected = (*selected).min(visible.saturating_sub(1));
        print_panel(session, *selected);
    }
}

fn print_panel(session: &Session<GlowContext>, selected: usize) {
    let title = session
        .active_entry()
        .map(|entry| entry.name.clone())
        .unwrap_or_else(|| "no active shader".to_string());
    println!("{}", panel::render(&title, session.panel(), selected));
}
