use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use eframe::egui;

use crate::app::controller::ApplicationController;
use crate::app::events::AppEvent;
use crate::cache::thumbs::load_thumbnail;
use crate::catalog::models::WallpaperEntry;
use crate::infra::error::AppError;

const CELL_PADDING: f32 = 10.0;

enum ThumbnailResult {
    Ready(egui::ColorImage),
    Failed,
}

/// A decoded thumbnail tagged with the scan generation that requested it.
struct ThumbnailMessage {
    generation: u64,
    path: PathBuf,
    result: ThumbnailResult,
}

pub struct SwitcherApp {
    controller: ApplicationController,
    textures: HashMap<PathBuf, egui::TextureHandle>,
    requested: HashSet<PathBuf>,
    generation: u64,
    thumb_tx: Sender<ThumbnailMessage>,
    thumb_rx: Receiver<ThumbnailMessage>,
}

impl SwitcherApp {
    fn new(controller: ApplicationController) -> Self {
        let (thumb_tx, thumb_rx) = mpsc::channel();
        Self {
            controller,
            textures: HashMap::new(),
            requested: HashSet::new(),
            generation: 0,
            thumb_tx,
            thumb_rx,
        }
    }

    fn request_thumbnails(&mut self, ctx: &egui::Context) {
        let pending: Vec<PathBuf> = self
            .controller
            .state()
            .entries
            .iter()
            .filter(|entry| !self.requested.contains(&entry.path))
            .map(|entry| entry.path.clone())
            .collect();
        if pending.is_empty() {
            return;
        }
        self.requested.extend(pending.iter().cloned());

        let config = self.controller.config();
        let thumbs_dir = config.thumbs_dir();
        let (width, height) = (config.thumbnail_width, config.thumbnail_height);
        let generation = self.generation;
        let sender = self.thumb_tx.clone();
        let ctx = ctx.clone();

        thread::spawn(move || {
            for path in pending {
                let result = match load_thumbnail(&path, &thumbs_dir, width, height) {
                    Ok(thumb) => ThumbnailResult::Ready(egui::ColorImage::from_rgba_unmultiplied(
                        [thumb.width as usize, thumb.height as usize],
                        &thumb.rgba,
                    )),
                    Err(error) => {
                        log::warn!("error loading thumbnail for {}: {error}", path.display());
                        ThumbnailResult::Failed
                    }
                };
                let message = ThumbnailMessage {
                    generation,
                    path,
                    result,
                };
                if sender.send(message).is_err() {
                    break;
                }
                ctx.request_repaint();
            }
        });
    }

    fn receive_thumbnails(&mut self, ctx: &egui::Context) {
        for (path, image) in self.drain_thumbnails() {
            let texture = ctx.load_texture(
                format!("thumbnail:{}", path.display()),
                image,
                egui::TextureOptions::default(),
            );
            self.textures.insert(path, texture);
        }
    }

    /// Handles failures and returns decoded images from the current generation.
    /// Messages from workers started before the last refresh are dropped.
    fn drain_thumbnails(&mut self) -> Vec<(PathBuf, egui::ColorImage)> {
        let mut ready = Vec::new();
        while let Ok(message) = self.thumb_rx.try_recv() {
            if message.generation != self.generation {
                continue;
            }
            match message.result {
                ThumbnailResult::Ready(image) => ready.push((message.path, image)),
                ThumbnailResult::Failed => {
                    self.controller.dispatch(AppEvent::ThumbnailFailed(message.path));
                }
            }
        }
        ready
    }

    fn refresh(&mut self) {
        self.controller.dispatch(AppEvent::Refresh);
        // Rescanned files may have changed on disk; drop every cached texture.
        self.generation += 1;
        self.textures.clear();
        self.requested.clear();
    }

    fn wallpaper_grid(&mut self, ui: &mut egui::Ui) {
        let config = self.controller.config();
        let columns = config.columns;
        let thumb_size = egui::vec2(
            config.thumbnail_width as f32,
            config.thumbnail_height as f32,
        );
        let entries = self.controller.state().entries.clone();
        if entries.is_empty() {
            ui.label(format!(
                "No wallpapers found in {}",
                config.wallpaper_dir.display()
            ));
            return;
        }

        let mut clicked = None;
        egui::Grid::new("wallpaper_grid")
            .spacing([CELL_PADDING, CELL_PADDING])
            .show(ui, |ui| {
                for (index, entry) in entries.iter().enumerate() {
                    let selected = self.controller.state().is_selected(entry);
                    let texture = self.textures.get(&entry.path);
                    if wallpaper_cell(ui, entry, texture, selected, thumb_size).clicked() {
                        clicked = Some(index);
                    }
                    if (index + 1) % columns == 0 {
                        ui.end_row();
                    }
                }
            });

        if let Some(index) = clicked {
            self.controller.dispatch(AppEvent::Select(index));
        }
    }
}

fn wallpaper_cell(
    ui: &mut egui::Ui,
    entry: &WallpaperEntry,
    texture: Option<&egui::TextureHandle>,
    selected: bool,
    thumb_size: egui::Vec2,
) -> egui::Response {
    let mut frame = egui::Frame::group(ui.style());
    if selected {
        frame = frame
            .fill(ui.visuals().selection.bg_fill)
            .stroke(ui.visuals().selection.stroke);
    }

    frame
        .show(ui, |ui| {
            ui.set_width(thumb_size.x + CELL_PADDING);
            ui.vertical_centered(|ui| {
                match texture {
                    Some(texture) => {
                        ui.add_sized(
                            thumb_size,
                            egui::Image::from_texture(texture).max_size(thumb_size),
                        );
                    }
                    None => {
                        ui.add_sized(thumb_size, egui::Spinner::new());
                    }
                }
                ui.add(egui::Label::new(&entry.name).truncate());
                if !entry.has_themes() {
                    ui.label(egui::RichText::new("(No themes)").weak());
                }
            });
        })
        .response
        .interact(egui::Sense::click())
        .on_hover_text(format!("{}\n{}", entry.label(), entry.path.display()))
}

impl eframe::App for SwitcherApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.controller.poll();
        self.receive_thumbnails(ctx);
        self.request_thumbnails(ctx);

        egui::TopBottomPanel::bottom("actions").show(ctx, |ui| {
            ui.add_space(4.0);
            let state = self.controller.state();
            if let Some(status) = &state.status {
                let response = ui.label(status);
                if let Some(report) = &state.last_report {
                    response.on_hover_text(report.summary().join("\n"));
                }
            }
            ui.horizontal(|ui| {
                let apply = ui.add_enabled(
                    self.controller.can_apply(),
                    egui::Button::new("Apply").min_size(egui::vec2(120.0, 0.0)),
                );
                if apply.clicked() {
                    self.controller.dispatch(AppEvent::Apply);
                }
                if ui
                    .add_enabled(!self.controller.state().applying, egui::Button::new("Refresh"))
                    .clicked()
                {
                    self.refresh();
                }
                if self.controller.state().applying {
                    ui.spinner();
                }
            });
            ui.add_space(4.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.label(egui::RichText::new("Select Wallpaper").strong());
            ui.separator();
            egui::ScrollArea::vertical()
                .min_scrolled_height(300.0)
                .auto_shrink([false, false])
                .show(ui, |ui| self.wallpaper_grid(ui));
        });

        if self.controller.state().applying {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}

pub fn launch_window(controller: ApplicationController) -> Result<(), AppError> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Wallpaper Switcher")
            .with_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Wallpaper Switcher",
        options,
        Box::new(|_cc| Ok(Box::new(SwitcherApp::new(controller)))),
    )
    .map_err(|error| AppError::Io(format!("failed to start UI: {error}")))
}
