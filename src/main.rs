use anyhow::Result;
use pixels::{Pixels, SurfaceTexture};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use winit::dpi::LogicalSize;
use winit::event::{Event, VirtualKeyCode};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;
use winit_input_helper::WinitInputHelper;

mod config;
mod draw;
mod eval;
mod evolve;
mod physics;
mod pipes;
mod session;
mod sprite;

use config::Config;
use physics::{FLOOR_Y, WIN_H, WIN_W};
use session::{Mode, Session};
use sprite::{BIRD_H, BIRD_W, PIPE_W, Sprites};

/// 30 simulation steps per second while running
const RUN_TICK: Duration = Duration::from_millis(33);
/// Slow poll while the simulation is frozen or idle
const IDLE_TICK: Duration = Duration::from_millis(200);

fn main() -> Result<()> {
    env_logger::init();

    let config_path: PathBuf = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.json".into())
        .into();
    let cfg = Config::load(&config_path)?;
    log::debug!("config: {cfg:?}");

    let event_loop = EventLoop::new();
    let mut input = WinitInputHelper::new();

    let window = WindowBuilder::new()
        .with_title("Flappy Bird NEAT")
        .with_inner_size(LogicalSize::new(WIN_W, WIN_H))
        .with_resizable(false)
        .build(&event_loop)?;

    let mut pixels = {
        let window_size = window.inner_size();
        let surface_texture = SurfaceTexture::new(window_size.width, window_size.height, &window);
        Pixels::new(WIN_W, WIN_H, surface_texture)?
    };

    let sprites = Sprites::new();
    let mut session = Session::new(cfg);
    let mut draw_lines = false;
    let mut last_tick = Instant::now();

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Poll;

        if let Event::RedrawRequested(_) = event {
            draw_frame(pixels.frame_mut(), &session, &sprites, draw_lines);
            if pixels.render().is_err() {
                *control_flow = ControlFlow::Exit;
            }
        }

        if input.update(&event) {
            // quit must be observable at every tick boundary, in every mode
            if input.key_pressed(VirtualKeyCode::Escape)
                || input.close_requested()
                || input.destroyed()
            {
                *control_flow = ControlFlow::Exit;
                return;
            }

            if input.key_pressed(VirtualKeyCode::Space)
                || input.key_pressed(VirtualKeyCode::Return)
            {
                if let Err(err) = session.start() {
                    log::error!("failed to start run: {err:#}");
                    *control_flow = ControlFlow::Exit;
                    return;
                }
            }
            if input.key_pressed(VirtualKeyCode::P) {
                session.toggle_pause();
            }
            // debug visualization of the controller observations
            if input.key_pressed(VirtualKeyCode::Q) {
                draw_lines = !draw_lines;
            }
            // mouse stands in for the start/pause buttons
            if input.mouse_pressed(0) {
                match session.mode {
                    Mode::Menu => {
                        if let Err(err) = session.start() {
                            log::error!("failed to start run: {err:#}");
                            *control_flow = ControlFlow::Exit;
                            return;
                        }
                    }
                    Mode::Running | Mode::Paused => session.toggle_pause(),
                    Mode::Summary => {}
                }
            }

            let pace = match session.mode {
                Mode::Running => RUN_TICK,
                _ => IDLE_TICK,
            };
            if last_tick.elapsed() >= pace {
                last_tick = Instant::now();
                if let Err(err) = session.tick(&sprites) {
                    log::error!("fatal simulation error: {err:#}");
                    *control_flow = ControlFlow::Exit;
                    return;
                }
                if session.should_exit() {
                    *control_flow = ControlFlow::Exit;
                    return;
                }
            }

            window.request_redraw();
        }
    });
}

fn draw_frame(frame: &mut [u8], session: &Session, sprites: &Sprites, draw_lines: bool) {
    let background = match session.mode {
        Mode::Menu | Mode::Summary => draw::NIGHT,
        _ => draw::SKY,
    };
    draw::clear(frame, background);

    if let Some(run) = &session.run {
        for pipe in &run.pipes.pipes {
            let x = pipe.x.round() as i32;
            draw::blit_mask(frame, &sprites.pipe, x, pipe.top.round() as i32, draw::PIPE_GREEN);
            draw::blit_mask(frame, &sprites.pipe, x, pipe.gap_bottom.round() as i32, draw::PIPE_GREEN);
        }

        if draw_lines && !run.pipes.pipes.is_empty() {
            let pipe = &run.pipes.pipes[run.target_index()];
            let px = (pipe.x.round() as i32) + PIPE_W as i32 / 2;
            for slot in &run.slots {
                let bx = slot.bird.x.round() as i32 + BIRD_W as i32 / 2;
                let by = slot.bird.y.round() as i32 + BIRD_H as i32 / 2;
                draw::draw_line(frame, bx, by, px, pipe.gap_top.round() as i32, draw::LINE_RED);
                draw::draw_line(frame, bx, by, px, pipe.gap_bottom.round() as i32, draw::LINE_RED);
            }
        }

        for slot in &run.slots {
            draw::blit_mask(
                frame,
                &sprites.bird,
                slot.bird.x.round() as i32,
                slot.bird.y.round() as i32,
                draw::BIRD_YELLOW,
            );
        }
    }

    // floor: two wrapping tiles down to the window edge
    let floor_h = WIN_H - FLOOR_Y as u32;
    let floor_w = physics::FLOOR_W as u32;
    draw::fill_rect(frame, session.floor.x1.round() as i32, FLOOR_Y as i32, floor_w, floor_h, draw::FLOOR_TAN);
    draw::fill_rect(frame, session.floor.x2.round() as i32, FLOOR_Y as i32, floor_w, floor_h, draw::FLOOR_TAN);

    // HUD
    let score = session.run.as_ref().map_or(session.last_score, |run| run.score);
    let score_label = format!("SCORE: {score}");
    draw::draw_text(
        frame,
        &score_label,
        WIN_W as i32 - 10 - draw::text_width(&score_label, 2),
        10,
        2,
        draw::WHITE,
    );
    draw::draw_text(frame, &format!("GEN: {}", session.generation), 10, 10, 2, draw::WHITE);
    let alive = session.run.as_ref().map_or(0, |run| run.alive());
    draw::draw_text(frame, &format!("ALIVE: {alive}"), 10, 40, 2, draw::WHITE);

    match session.mode {
        Mode::Menu => {
            center_text(frame, "FLAPPY BIRD NEAT", 300, 3);
            center_text(frame, "CLICK OR PRESS SPACE TO START", 360, 2);
        }
        Mode::Paused => center_text(frame, "PAUSED", 380, 3),
        Mode::Summary => {
            center_text(frame, "THANKS FOR PLAYING", 320, 3);
            center_text(frame, &format!("FINAL SCORE: {}", session.last_score), 380, 2);
        }
        Mode::Running => {}
    }
}

fn center_text(frame: &mut [u8], text: &str, y: i32, scale: i32) {
    let x = (WIN_W as i32 - draw::text_width(text, scale)) / 2;
    draw::draw_text(frame, text, x, y, scale, draw::WHITE);
}
