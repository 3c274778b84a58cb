//! Roadwise entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, Document, Element, HtmlButtonElement, HtmlCanvasElement};

    use roadwise::consts::*;
    use roadwise::platform::{KeyLatch, QuizView, present_quiz_events};
    use roadwise::sim::{
        DrivePhase, DriveSession, GamePhase, GameState, NpcKind, PlatformState, drive_tick,
        level_info, tick,
    };
    use roadwise::{GameConfig, Preset};

    const BACKGROUND: &str = "#1d2430";
    const PLATFORM_NEUTRAL: &str = "#8a8f98";
    const PLATFORM_CORRECT: &str = "#3fb950";
    const PLATFORM_WRONG: &str = "#f85149";
    const PLAYER: &str = "#f0c040";
    const ROAD: &str = "#3a3f47";
    const TEXT: &str = "#e6edf3";

    /// Modal built from plain DOM elements
    struct DomQuizView {
        modal: Element,
        prompt: Element,
        buttons: Vec<HtmlButtonElement>,
        close: HtmlButtonElement,
    }

    impl DomQuizView {
        fn new(document: &Document) -> Result<Self, JsValue> {
            let modal = document.create_element("div")?;
            modal.set_id("quiz-modal");
            modal.set_class_name("hidden");
            let _ = modal.set_attribute(
                "style",
                "position:absolute;top:80px;left:50%;transform:translateX(-50%);\
                 background:#0d1117;color:#e6edf3;padding:16px;border-radius:8px;\
                 font-family:sans-serif;display:none;min-width:420px",
            );

            let prompt = document.create_element("p")?;
            modal.append_child(&prompt)?;

            let mut buttons = Vec::new();
            for _ in 0..roadwise::sim::quiz::OPTIONS_PER_QUESTION {
                let button: HtmlButtonElement = document.create_element("button")?.dyn_into()?;
                let _ = button.set_attribute("style", "display:block;width:100%;margin:4px 0");
                modal.append_child(&button)?;
                buttons.push(button);
            }

            let close: HtmlButtonElement = document.create_element("button")?.dyn_into()?;
            close.set_text_content(Some("Close (Esc)"));
            let _ = close.set_attribute("style", "margin-top:8px");
            modal.append_child(&close)?;

            if let Some(body) = document.body() {
                body.append_child(&modal)?;
            }
            Ok(Self {
                modal,
                prompt,
                buttons,
                close,
            })
        }

        fn set_visible(&self, visible: bool) {
            let style = self.modal.get_attribute("style").unwrap_or_default();
            let (from, to) = if visible {
                ("display:none", "display:block")
            } else {
                ("display:block", "display:none")
            };
            let _ = self.modal.set_attribute("style", &style.replace(from, to));
            self.modal
                .set_class_name(if visible { "" } else { "hidden" });
        }
    }

    impl QuizView for DomQuizView {
        fn show_question(&mut self, prompt: &str, options: &[String]) {
            self.prompt.set_text_content(Some(prompt));
            for (i, button) in self.buttons.iter().enumerate() {
                let label = options.get(i).map(String::as_str).unwrap_or("");
                button.set_text_content(Some(&format!("{}. {}", i + 1, label)));
                button.set_disabled(false);
            }
            self.set_visible(true);
        }

        fn disable_option(&mut self, index: usize) {
            if let Some(button) = self.buttons.get(index) {
                button.set_disabled(true);
            }
        }

        fn hide_question(&mut self) {
            self.set_visible(false);
        }
    }

    enum Mode {
        Platformer(GameState),
        Driving(DriveSession),
    }

    /// Game instance holding all state
    struct Game {
        config: GameConfig,
        mode: Mode,
        keys: KeyLatch,
        accumulator: f32,
        last_time: f64,
        ctx: CanvasRenderingContext2d,
        quiz_view: DomQuizView,
    }

    impl Game {
        /// Run simulation ticks
        fn update(&mut self, dt: f32) {
            let dt = dt.min(0.1);
            self.accumulator += dt;
            let step = SIM_DT.as_secs_f32();

            let mut substeps = 0;
            while self.accumulator >= step && substeps < MAX_SUBSTEPS {
                match &mut self.mode {
                    Mode::Platformer(state) => {
                        let input = self.keys.tick_input();
                        tick(state, &input, SIM_DT);
                        let events = state.drain_events();
                        present_quiz_events(&mut self.quiz_view, state, &events);
                    }
                    Mode::Driving(session) => {
                        let input = self.keys.drive_input();
                        drive_tick(session, &input, SIM_DT);
                        for event in session.drain_events() {
                            log::debug!("{:?}", event);
                        }
                    }
                }
                self.accumulator -= step;
                substeps += 1;

                // Clear one-shot inputs after processing
                self.keys.clear_one_shots();
            }
        }

        fn start_platformer(&mut self) {
            let seed = js_sys::Date::now() as u64;
            match GameState::with_default_bank(seed, &self.config) {
                Ok(state) => {
                    self.mode = Mode::Platformer(state);
                    log::info!("Platformer started with seed: {}", seed);
                }
                Err(e) => log::error!("Could not start platformer: {}", e),
            }
            self.reset_loop();
        }

        fn start_driving(&mut self) {
            self.mode = Mode::Driving(DriveSession::new(&self.config.drive));
            self.reset_loop();
        }

        fn reset_loop(&mut self) {
            self.quiz_view.hide_question();
            self.accumulator = 0.0;
            self.keys = KeyLatch::new();
        }

        fn toggle_mode(&mut self) {
            match self.mode {
                Mode::Platformer(_) => self.start_driving(),
                Mode::Driving(_) => self.start_platformer(),
            }
        }

        fn restart(&mut self) {
            match self.mode {
                Mode::Platformer(_) => self.start_platformer(),
                Mode::Driving(_) => self.start_driving(),
            }
        }

        /// Cycle Relaxed -> Standard -> Strict and persist the choice
        fn cycle_preset(&mut self) {
            let next = match self.config.preset {
                Preset::Relaxed => Preset::Standard,
                Preset::Standard => Preset::Strict,
                Preset::Strict => Preset::Relaxed,
            };
            self.config.apply_preset(next);
            self.config.save();
            log::info!("Preset: {}", next.as_str());
            self.restart();
        }

        fn render(&self) {
            let ctx = &self.ctx;
            ctx.set_fill_style_str(BACKGROUND);
            ctx.fill_rect(0.0, 0.0, WORLD_WIDTH as f64, WORLD_HEIGHT as f64);

            match &self.mode {
                Mode::Platformer(state) => self.render_platformer(state),
                Mode::Driving(session) => self.render_driving(session),
            }
        }

        fn render_platformer(&self, state: &GameState) {
            let ctx = &self.ctx;
            let cam = state.camera_x as f64;

            for platform in &state.platforms {
                let r = &platform.rect;
                if r.right() < state.camera_x || r.left() > state.camera_x + WORLD_WIDTH {
                    continue;
                }
                ctx.set_fill_style_str(match platform.state {
                    PlatformState::Neutral => PLATFORM_NEUTRAL,
                    PlatformState::Correct => PLATFORM_CORRECT,
                    PlatformState::Wrong => PLATFORM_WRONG,
                });
                ctx.fill_rect(
                    r.pos.x as f64 - cam,
                    r.pos.y as f64,
                    r.size.x as f64,
                    r.size.y as f64,
                );
            }

            let p = &state.player;
            ctx.set_fill_style_str(PLAYER);
            ctx.fill_rect(p.pos.x as f64 - cam, p.pos.y as f64, p.size.x as f64, p.size.y as f64);

            let status = match state.phase {
                GamePhase::Paused => "  [paused]",
                _ => "",
            };
            self.hud(&format!(
                "Score: {}   Preset: {}{}",
                state.score,
                self.config.preset.as_str(),
                status
            ));
        }

        fn render_driving(&self, session: &DriveSession) {
            let ctx = &self.ctx;
            let world = &session.world;
            let cam = (world.vehicle.pos.x - 300.0)
                .clamp(0.0, (world.finish_x + 100.0 - WORLD_WIDTH).max(0.0)) as f64;

            let fill = |color: &str, r: &roadwise::sim::Rect| {
                ctx.set_fill_style_str(color);
                ctx.fill_rect(r.pos.x as f64 - cam, r.pos.y as f64, r.size.x as f64, r.size.y as f64);
            };

            ctx.set_fill_style_str(ROAD);
            ctx.fill_rect(0.0, ROAD_TOP as f64, WORLD_WIDTH as f64, (ROAD_BOTTOM - ROAD_TOP) as f64);

            if let Some(zone) = &world.stop_zone {
                fill("rgba(255,255,255,0.25)", zone);
            }
            if let Some(intersection) = &world.intersection {
                fill("rgba(120,120,160,0.35)", intersection);
            }
            if let Some(zone) = &world.conflict_zone {
                fill("rgba(240,160,40,0.3)", zone);
            }
            if let (Some(line), Some(light)) = (world.stop_line_x, &world.light) {
                ctx.set_fill_style_str(if light.is_red() { "#f85149" } else { "#3fb950" });
                ctx.fill_rect(line as f64 - cam, ROAD_TOP as f64, 4.0, (ROAD_BOTTOM - ROAD_TOP) as f64);
            }
            ctx.set_fill_style_str("#ffffff");
            ctx.fill_rect(world.finish_x as f64 - cam, ROAD_TOP as f64, 6.0, (ROAD_BOTTOM - ROAD_TOP) as f64);

            for npc in &world.npcs {
                let color = match npc.kind {
                    NpcKind::Pedestrian => "#d2a8ff",
                    NpcKind::Cyclist => "#79c0ff",
                    NpcKind::Car => "#ffa657",
                };
                fill(color, &npc.rect);
            }
            fill(PLAYER, &world.vehicle.rect());

            let info = level_info(session.level);
            let name = info.map(|l| l.name).unwrap_or("");
            let mut hud = format!(
                "Level {}: {}   Lives: {}   Score: {}   Speed: {:.1}",
                session.level,
                name,
                session.lives,
                session.score,
                world.vehicle.speed
            );
            if let Some(limit) = world.speed_limit {
                hud.push_str(&format!(" / {:.1}", limit));
            }
            if let Some(light) = &world.light {
                let seconds = light.ticks_remaining() as f64 / SIM_HZ as f64;
                let colour = if light.is_red() { "red" } else { "green" };
                hud.push_str(&format!("   Light: {} {:.1}s", colour, seconds));
            }
            self.hud(&hud);

            if let Some(info) = info {
                ctx.set_fill_style_str(TEXT);
                ctx.set_font("14px sans-serif");
                let _ = ctx.fill_text(info.description, 12.0, 46.0);
            }

            let banner = match session.phase {
                DrivePhase::Running => None,
                DrivePhase::Notice { kind, .. } => {
                    Some(format!("{} Press Enter to retry.", kind.message()))
                }
                DrivePhase::Won => Some(format!("Course complete! Score {}. Press R.", session.score)),
                DrivePhase::Lost => Some(format!("Out of lives. Score {}. Press R.", session.score)),
            };
            if let Some(text) = banner {
                ctx.set_fill_style_str(TEXT);
                ctx.set_font("22px sans-serif");
                let _ = ctx.fill_text(&text, 40.0, 140.0);
            }
        }

        fn hud(&self, text: &str) {
            self.ctx.set_fill_style_str(TEXT);
            self.ctx.set_font("16px sans-serif");
            let _ = self.ctx.fill_text(text, 12.0, 24.0);
            let _ = self.ctx.fill_text(
                "M: switch mode   R: restart   C: preset   P: pause",
                12.0,
                WORLD_HEIGHT as f64 - 12.0,
            );
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Roadwise starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");
        canvas.set_width(WORLD_WIDTH as u32);
        canvas.set_height(WORLD_HEIGHT as u32);

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .expect("no 2d context")
            .dyn_into()
            .expect("not a 2d context");

        let quiz_view = DomQuizView::new(&document).expect("Failed to build quiz modal");
        let buttons = quiz_view.buttons.clone();
        let close = quiz_view.close.clone();

        let config = GameConfig::load();
        let seed = js_sys::Date::now() as u64;
        let state = match GameState::with_default_bank(seed, &config) {
            Ok(state) => state,
            Err(e) => {
                log::error!("Question bank failed to load: {}", e);
                return;
            }
        };

        let game = Rc::new(RefCell::new(Game {
            config,
            mode: Mode::Platformer(state),
            keys: KeyLatch::new(),
            accumulator: 0.0,
            last_time: 0.0,
            ctx,
            quiz_view,
        }));
        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(game.clone());
        setup_quiz_buttons(&buttons, &close, game.clone());
        setup_auto_pause(game.clone());

        // Start game loop
        request_animation_frame(game);

        log::info!("Roadwise running!");
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Key down
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let key = event.key();
                if matches!(key.as_str(), " " | "ArrowUp" | "ArrowDown" | "ArrowLeft" | "ArrowRight") {
                    event.unchecked_ref::<web_sys::Event>().prevent_default();
                }
                let mut g = game.borrow_mut();
                if !event.repeat() {
                    match key.as_str() {
                        "m" | "M" => return g.toggle_mode(),
                        "r" | "R" => return g.restart(),
                        "c" | "C" => return g.cycle_preset(),
                        _ => {}
                    }
                }
                g.keys.key_down(&key, event.repeat());
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Key up
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                game.borrow_mut().keys.key_up(&event.key());
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_quiz_buttons(
        buttons: &[HtmlButtonElement],
        close: &HtmlButtonElement,
        game: Rc<RefCell<Game>>,
    ) {
        for (i, button) in buttons.iter().enumerate() {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                game.borrow_mut().keys.press_answer(i);
            });
            let _ = button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Close without answering
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
            game.borrow_mut().keys.press_dismiss();
        });
        let _ = close.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Window blur (click outside)
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
            let mut g = game.borrow_mut();
            g.keys.release_all();
            let running = matches!(&g.mode, Mode::Platformer(state) if state.phase != GamePhase::Paused);
            if running {
                g.keys.press_pause();
                log::info!("Auto-paused (window blur)");
            }
        });
        let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT.as_secs_f32()
            };
            g.last_time = time;

            g.update(dt);
            g.render();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Roadwise (native) starting...");
    log::info!("The playable version is the web build; running a headless demo");

    let path = std::env::args().nth(1);
    let config = roadwise::GameConfig::load_or_default(path.as_deref());

    demo::platformer(&config);
    demo::driving(&config);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Scripted runs of both modes, logging what happens
#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use roadwise::GameConfig;
    use roadwise::consts::*;
    use roadwise::sim::{
        DriveControls, DriveInput, DrivePhase, DriveSession, DriveWorld, GameEvent, GameState,
        TickInput, drive_tick, level_info, tick,
    };
    use roadwise::DriveConfig;

    /// One simulated minute of running right, jumping, and answering
    pub fn platformer(config: &GameConfig) {
        let mut state = match GameState::with_default_bank(42, config) {
            Ok(state) => state,
            Err(e) => {
                log::error!("Could not start platformer: {}", e);
                return;
            }
        };

        let mut answered = 0u32;
        for t in 0..(SIM_HZ as u64 * 60) {
            // Every third question is answered wrong on purpose
            let answer = state.quiz.as_ref().map(|open| {
                let correct = open.question.correct;
                if answered % 3 == 2 {
                    (correct + 1) % open.question.options.len()
                } else {
                    correct
                }
            });
            let input = TickInput {
                right: true,
                jump: t % 40 == 0,
                answer,
                ..Default::default()
            };
            tick(&mut state, &input, SIM_DT);

            for event in state.drain_events() {
                match event {
                    GameEvent::QuestionOpened { platform_id } => {
                        if let Some(open) = &state.quiz {
                            log::info!("Platform {}: {}", platform_id, open.question.prompt);
                        }
                    }
                    GameEvent::Answered { correct, score, .. } => {
                        answered += 1;
                        log::info!("  {} (score {})", if correct { "correct" } else { "wrong" }, score);
                    }
                    other => log::debug!("{:?}", other),
                }
            }
        }

        println!(
            "Platformer: {} answers, score {}, {} platforms live",
            answered,
            state.score,
            state.platforms.len()
        );
    }

    /// Drive the whole course with a cautious autopilot
    pub fn driving(config: &GameConfig) {
        let mut session = DriveSession::new(&config.drive);
        let limit = SIM_HZ as u64 * 60 * 10;

        for _ in 0..limit {
            if session.is_over() {
                break;
            }
            let input = match session.phase {
                DrivePhase::Notice { .. } => DriveInput {
                    acknowledge: true,
                    ..Default::default()
                },
                _ => DriveInput {
                    controls: autopilot(&session.world, &session.config),
                    acknowledge: false,
                },
            };
            drive_tick(&mut session, &input, SIM_DT);
            for event in session.drain_events() {
                log::info!("{:?}", event);
            }
        }

        let name = level_info(session.level).map(|l| l.name).unwrap_or("?");
        println!(
            "Driving: {:?} at level {} ({}), lives {}, score {}",
            session.phase, session.level, name, session.lives, session.score
        );
    }

    /// Brake for whatever needs stopping for, otherwise cruise under the limit
    fn autopilot(world: &DriveWorld, cfg: &DriveConfig) -> DriveControls {
        let v = world.vehicle.speed;
        let front = world.vehicle.front_x();
        let stopping = v * v / (2.0 * cfg.brake) + v;
        let car = world.vehicle.rect();

        let mut stop_at: Option<f32> = None;
        let mut hold = |x: f32| {
            stop_at = Some(stop_at.map_or(x, |s: f32| s.min(x)));
        };

        if let Some(zone) = world.stop_zone {
            if !world.stop_hold.satisfied(cfg.stop_hold()) && front < zone.right() {
                hold(zone.center().x + 10.0);
            }
        }
        if let (Some(line), Some(light)) = (world.stop_line_x, &world.light) {
            if light.is_red() && front < line {
                hold(line - 5.0);
            }
        }
        if let Some(zone) = world.conflict_zone {
            let busy = world
                .npcs
                .iter()
                .any(|n| n.priority && n.threatens(&zone, cfg.yield_window));
            if busy && front < zone.left() {
                hold(zone.left() - 5.0);
            }
        }
        for npc in &world.npcs {
            let ahead = npc.rect.left() > car.left() && npc.rect.left() < front + stopping + 40.0;
            let near_lane = npc.rect.bottom() > car.top() - 40.0 && npc.rect.top() < car.bottom() + 40.0;
            if ahead && near_lane {
                hold(npc.rect.left() - 10.0);
            }
        }

        let cruise = world.speed_limit.map_or(cfg.max_speed, |l| l - 0.5);
        let mut controls = DriveControls::default();
        match stop_at {
            Some(x) if front + stopping >= x => controls.brake = v > cfg.brake,
            _ => controls.accelerate = v + cfg.accel <= cruise,
        }
        controls
    }
}
