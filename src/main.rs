#[cfg(feature = "gui")]
use eframe::egui;

#[cfg(feature = "gui")]
use music_sort::{
    grid::display_row, Algorithm, AudioOutput, Config, FrameRenderer, Grid, MidiOutputDevice,
    OutputPair, PlaybackEngine, PlaybackState, Sequence, ThreadTimer,
};

#[cfg(feature = "gui")]
fn main() -> Result<(), eframe::Error> {
    env_logger::init();

    let config = Config::load();
    let grid = config.grid();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([
                (grid.width() as f32 + 80.0).max(480.0),
                grid.height() as f32 + 200.0,
            ])
            .with_title("Music Sort"),
        ..Default::default()
    };

    eframe::run_native(
        "Music Sort",
        options,
        Box::new(|_cc| Ok(Box::new(SortApp::new(config)))),
    )
}

#[cfg(not(feature = "gui"))]
fn main() {
    env_logger::init();
    if let Err(e) = headless::run(std::env::args().skip(1).collect()) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "gui"))]
mod headless {
    use std::time::Duration;

    use music_sort::{
        Algorithm, AudioOutput, Config, PlaybackEngine, PlaybackState, Result, Sequence,
        TextRenderer, ThreadTimer,
    };

    /// `music-sort [algorithm] [notes]`, e.g. `music-sort insertion gfedcba`
    pub fn run(args: Vec<String>) -> Result<()> {
        let config = Config::load();
        let algorithm = match args.first() {
            Some(name) => name.parse::<Algorithm>()?,
            None => config.algorithm,
        };
        let initial = match args.get(1) {
            Some(notes) => notes.parse::<Sequence>()?,
            None => config.initial.clone(),
        };

        let mut engine = PlaybackEngine::new(
            ThreadTimer::new(),
            TextRenderer::new(std::io::stdout()),
            AudioOutput::new(config.gain),
            config.step_interval,
        );

        let trace = algorithm.trace(&initial);
        println!("{} sort over {}: {} steps\n", algorithm, initial, trace.len());
        engine.start(trace);

        let patience = config.step_interval + Duration::from_secs(1);
        while engine.state() == PlaybackState::Playing {
            match engine.timer_mut().wait(patience) {
                Some(id) => engine.on_timer(id),
                None => {
                    log::warn!("Timed out waiting for the next step");
                    engine.stop();
                }
            }
        }
        Ok(())
    }
}

#[cfg(feature = "gui")]
struct SortApp {
    grid: Grid,
    engine: PlaybackEngine<ThreadTimer, FrameRenderer, OutputPair<AudioOutput, MidiOutputDevice>>,

    // UI state
    selected: Algorithm,
    available_midi_ports: Vec<String>,
    selected_port: Option<usize>,
}

#[cfg(feature = "gui")]
impl SortApp {
    fn new(config: Config) -> Self {
        let grid = config.grid();
        let mut engine = PlaybackEngine::new(
            ThreadTimer::new(),
            FrameRenderer::new(),
            OutputPair::new(AudioOutput::new(config.gain), MidiOutputDevice::new()),
            config.step_interval,
        );
        engine.load(config.algorithm.trace(grid.cells()));

        Self {
            grid,
            engine,
            selected: config.algorithm,
            available_midi_ports: MidiOutputDevice::available_ports(),
            selected_port: None,
        }
    }

    fn select_algorithm(&mut self, algorithm: Algorithm) {
        log::info!("Changed to {}", algorithm);
        self.engine.renderer_mut().clear();
        self.engine.switch_algorithm(algorithm.trace(self.grid.cells()));
    }

    fn displayed(&self) -> (Sequence, Option<usize>, Option<usize>) {
        if let Some(frame) = self.engine.renderer().frame() {
            return (frame.snapshot.clone(), frame.highlight_a, frame.highlight_b);
        }
        let initial = self
            .engine
            .trace()
            .map(|t| t.initial().clone())
            .unwrap_or_else(|| self.grid.cells().clone());
        (initial, None, None)
    }

    fn draw_grid(&self, ui: &mut egui::Ui) {
        let cell = self.grid.cell_size() as f32;
        let size = egui::vec2(self.grid.width() as f32, self.grid.height() as f32);
        let (response, painter) = ui.allocate_painter(size, egui::Sense::hover());
        let origin = response.rect.min;
        let line = egui::Stroke::new(1.0, egui::Color32::GRAY);

        for x in 0..=self.grid.columns() {
            let x = origin.x + x as f32 * cell;
            painter.line_segment(
                [egui::pos2(x, origin.y), egui::pos2(x, origin.y + size.y)],
                line,
            );
        }
        for y in 0..=self.grid.rows() {
            let y = origin.y + y as f32 * cell;
            painter.line_segment(
                [egui::pos2(origin.x, y), egui::pos2(origin.x + size.x, y)],
                line,
            );
        }

        let (snapshot, highlight_a, highlight_b) = self.displayed();
        for (col, note) in snapshot.iter().enumerate() {
            let row = display_row(*note);
            let min = origin + egui::vec2(col as f32 * cell, row as f32 * cell);
            let rect = egui::Rect::from_min_size(min, egui::vec2(cell, cell));
            let highlighted = highlight_a == Some(col) || highlight_b == Some(col);
            painter.rect_filled(
                rect,
                0.0,
                if highlighted {
                    egui::Color32::RED
                } else {
                    egui::Color32::BLACK
                },
            );
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                note.to_string(),
                egui::FontId::proportional(cell * 0.4),
                egui::Color32::WHITE,
            );
        }
    }
}

#[cfg(feature = "gui")]
impl eframe::App for SortApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.request_repaint();

        self.engine.poll();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Music Sort");
            ui.add_space(10.0);

            // MIDI Port Selection
            let mut selected_port_changed = None;
            ui.horizontal(|ui| {
                ui.label("MIDI Output:");
                if self.available_midi_ports.is_empty() {
                    ui.label("No MIDI ports available");
                } else {
                    egui::ComboBox::from_id_source("midi_port")
                        .selected_text(
                            self.selected_port
                                .map(|i| self.available_midi_ports[i].as_str())
                                .unwrap_or("Select port..."),
                        )
                        .show_ui(ui, |ui| {
                            for (i, port_name) in self.available_midi_ports.iter().enumerate() {
                                if ui
                                    .selectable_label(self.selected_port == Some(i), port_name)
                                    .clicked()
                                {
                                    selected_port_changed = Some(i);
                                }
                            }
                        });
                }
            });

            if let Some(port_idx) = selected_port_changed {
                match self.engine.emitter_mut().second_mut().connect(port_idx) {
                    Ok(()) => self.selected_port = Some(port_idx),
                    Err(e) => log::warn!("{}", e),
                }
            }

            ui.add_space(10.0);

            // Transport controls
            let mut chosen = self.selected;
            ui.horizontal(|ui| {
                if self.engine.is_playing() {
                    if ui.button("⏸ Pause").clicked() {
                        self.engine.pause();
                    }
                } else if ui.button("▶ Play").clicked() {
                    self.engine.play();
                }

                if ui.button("⏹ Stop").clicked() {
                    self.engine.stop();
                    self.engine.renderer_mut().clear();
                }

                ui.add_space(20.0);

                egui::ComboBox::from_label("Algorithm")
                    .selected_text(chosen.name())
                    .show_ui(ui, |ui| {
                        for algorithm in Algorithm::ALL {
                            ui.selectable_value(&mut chosen, algorithm, algorithm.name());
                        }
                    });
            });

            if chosen != self.selected {
                self.selected = chosen;
                self.select_algorithm(chosen);
            }

            ui.add_space(20.0);
            self.draw_grid(ui);

            // Info
            ui.separator();
            let total = self.engine.trace().map(|t| t.len()).unwrap_or(0);
            let status = match self.engine.state() {
                PlaybackState::Idle => "idle",
                PlaybackState::Playing => "playing",
                PlaybackState::Paused => "paused",
                PlaybackState::Finished => "sorted",
            };
            ui.label(format!(
                "Step {} of {} ({})",
                self.engine.position().min(total),
                total,
                status
            ));
            if !self.engine.emitter().second().is_connected() {
                ui.colored_label(
                    egui::Color32::YELLOW,
                    "⚠ No MIDI output connected - audio playback only",
                );
            }
        });
    }
}
