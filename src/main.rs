//! Orb Link entry point
//!
//! The browser build wires the session to the DOM, a 2D canvas and Web Audio.
//! The native build dumps generated layouts as JSON.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::f64::consts::TAU;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, PointerEvent};

    use orb_link::audio::AudioManager;
    use orb_link::sim::{Ball, Palette, PaletteColor, Path, Session};
    use orb_link::{GameUi, Settings, SoundEffect, StatusKind, Tuning};

    /// Line width of drawn paths
    const PATH_WIDTH: f64 = 10.0;

    /// `GameUi` backed by the page
    struct DomUi {
        document: Document,
        canvas: HtmlCanvasElement,
        ctx: CanvasRenderingContext2d,
        audio: AudioManager,
        ball_radius: f64,
    }

    impl DomUi {
        fn set_text(&self, id: &str, text: &str) {
            if let Some(el) = self.document.get_element_by_id(id) {
                el.set_text_content(Some(text));
            }
        }

        fn set_hidden(&self, id: &str, hidden: bool) {
            if let Some(el) = self.document.get_element_by_id(id) {
                let _ = el.class_list().toggle_with_force("hidden", hidden);
            }
        }
    }

    impl GameUi for DomUi {
        fn set_status(&mut self, message: &str, kind: StatusKind) {
            if let Some(el) = self.document.get_element_by_id("status") {
                el.set_text_content(Some(message));
                el.set_class_name(format!("status {}", kind.css_class()).trim_end());
            }
        }

        fn set_score(&mut self, score: i64) {
            self.set_text("score", &score.to_string());
        }

        fn set_level_title(&mut self, level: u32) {
            self.set_text("title", &format!("Level {level}"));
        }

        fn set_difficulty_indicator(&mut self, num_colors: u32) {
            self.set_text("subtile", &num_colors.to_string());
        }

        fn play_sound(&mut self, effect: SoundEffect) {
            self.audio.play(effect);
        }

        fn clear_drawing(&mut self) {
            let w = self.canvas.width() as f64;
            let h = self.canvas.height() as f64;
            self.ctx.clear_rect(0.0, 0.0, w, h);
        }

        fn draw_path(&mut self, path: &Path, color: &PaletteColor) {
            let Some((first, rest)) = path.points.split_first() else {
                return;
            };
            let ctx = &self.ctx;
            ctx.set_stroke_style_str(&color.css());
            ctx.set_line_width(PATH_WIDTH);
            ctx.set_line_cap("round");
            ctx.set_line_join("round");
            ctx.begin_path();
            ctx.move_to(first.x as f64, first.y as f64);
            for p in rest {
                ctx.line_to(p.x as f64, p.y as f64);
            }
            ctx.stroke();
        }

        fn draw_ball(&mut self, ball: &Ball, color: &PaletteColor) {
            let ctx = &self.ctx;
            let radius = self.ball_radius;
            ctx.begin_path();
            let _ = ctx.arc(ball.pos.x as f64, ball.pos.y as f64, radius, 0.0, TAU);
            ctx.set_fill_style_str(&color.css());
            ctx.fill();
            if ball.connected {
                ctx.set_stroke_style_str("#ffffff");
                ctx.set_line_width(4.0);
                ctx.stroke();
            }
        }

        fn set_drawing_cursor(&mut self, drawing: bool) {
            let _ = self.canvas.class_list().toggle_with_force("drawing", drawing);
        }

        fn set_muted(&mut self, muted: bool) {
            self.audio.set_muted(muted);
            self.set_hidden("on-btn", muted);
            self.set_hidden("off-btn", !muted);
        }

        fn celebrate(&mut self, level: u32) {
            log::info!("Celebrating level {}", level);
            let _ = self.canvas.class_list().add_1("celebrate");
            let canvas = self.canvas.clone();
            let closure = Closure::once(move || {
                let _ = canvas.class_list().remove_1("celebrate");
            });
            if let Some(window) = web_sys::window() {
                let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                    closure.as_ref().unchecked_ref(),
                    2000,
                );
            }
            closure.forget();
        }
    }

    type Game = Rc<RefCell<Session<DomUi>>>;

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Orb Link starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let tuning = Tuning::default();
        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;
        canvas.set_width(tuning.board_width as u32);
        canvas.set_height(tuning.board_height as u32);

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into()?;

        let settings = Settings::load();
        let mut audio = AudioManager::new();
        audio.apply_settings(&settings);

        let ui = DomUi {
            document: document.clone(),
            canvas: canvas.clone(),
            ctx,
            audio,
            ball_radius: tuning.ball_radius as f64,
        };

        let seed = js_sys::Date::now() as u64;
        let session = Session::new(seed, tuning, Palette::default(), settings, ui)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        log::info!("Game initialized with seed: {}", seed);

        let game: Game = Rc::new(RefCell::new(session));

        setup_pointer_handlers(&canvas, game.clone());
        setup_buttons(&document, game.clone());

        request_animation_frame(game);

        log::info!("Orb Link running!");
        Ok(())
    }

    /// Pointer position in board coordinates
    fn board_point(canvas: &HtmlCanvasElement, event: &PointerEvent) -> Vec2 {
        let rect = canvas.get_bounding_client_rect();
        let sx = if rect.width() > 0.0 { canvas.width() as f64 / rect.width() } else { 1.0 };
        let sy = if rect.height() > 0.0 { canvas.height() as f64 / rect.height() } else { 1.0 };
        Vec2::new(
            ((event.client_x() as f64 - rect.left()) * sx) as f32,
            ((event.client_y() as f64 - rect.top()) * sy) as f32,
        )
    }

    fn on_pointer(
        canvas: &HtmlCanvasElement,
        game: Game,
        event_name: &str,
        handler: fn(&mut Session<DomUi>, Vec2),
    ) {
        let canvas_clone = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
            event.prevent_default();
            let point = board_point(&canvas_clone, &event);
            handler(&mut game.borrow_mut(), point);
        });
        let _ = canvas.add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_pointer_handlers(canvas: &HtmlCanvasElement, game: Game) {
        // Keep receiving move/up after the pointer leaves the canvas
        {
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let _ = canvas_clone.set_pointer_capture(event.pointer_id());
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: PointerEvent| {
                game.borrow_mut().pointer_cancel();
            });
            let _ = canvas
                .add_event_listener_with_callback("pointercancel", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        on_pointer(canvas, game.clone(), "pointerdown", |s, p| {
            // Browsers only allow audio after a user gesture
            s.ui().audio.resume();
            s.pointer_down(p);
        });
        on_pointer(canvas, game.clone(), "pointermove", |s, p| s.pointer_move(p));
        on_pointer(canvas, game, "pointerup", |s, p| s.pointer_up(p));
    }

    fn on_click(document: &Document, id: &str, game: Game, handler: fn(&mut Session<DomUi>)) {
        let Some(btn) = document.get_element_by_id(id) else {
            log::warn!("Missing button #{}", id);
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
            handler(&mut game.borrow_mut());
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_buttons(document: &Document, game: Game) {
        on_click(document, "reset-btn", game.clone(), |s| {
            if let Err(e) = s.restart_level() {
                log::error!("Restart failed: {}", e);
            }
        });
        on_click(document, "hint-btn", game.clone(), |s| s.show_hint());
        on_click(document, "on-btn", game.clone(), |s| s.toggle_mute());
        on_click(document, "off-btn", game, |s| s.toggle_mute());
    }

    fn request_animation_frame(game: Game) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Game, time: f64) {
        if let Err(e) = game.borrow_mut().update(time) {
            log::error!("Level generation failed: {}", e);
            return;
        }
        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use orb_link::Tuning;
    use orb_link::sim::{Palette, generate_level_seeded};

    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42u64);
    let levels = args.next().and_then(|s| s.parse().ok()).unwrap_or(5u32);

    log::info!("Orb Link (native): dumping {} levels with seed {}", levels, seed);
    log::info!("Run with `trunk serve` for the playable web version");

    let tuning = Tuning::default();
    let palette = Palette::default();

    let mut layouts = Vec::new();
    for level in 1..=levels {
        match generate_level_seeded(level, seed.wrapping_add(level as u64), &palette, &tuning) {
            Ok(layout) => layouts.push(layout),
            Err(e) => {
                log::error!("Level {}: {}", level, e);
                std::process::exit(1);
            }
        }
    }

    match serde_json::to_string_pretty(&layouts) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            log::error!("Failed to serialize layouts: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
