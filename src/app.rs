use std::time::{SystemTime, UNIX_EPOCH};

use crate::dimensions::{DimensionRegistry, RenderedDimensions};
use crate::export::ExportEngine;
use crate::interaction::{InteractionController, PointerEvent, SelectionCommand};
use crate::pdf::{PdfiumSource, SnippetDocument};
use crate::selection::SelectionStore;

/// The application shell: owns the stores, the interaction controller and
/// the export engine, and translates egui input into pointer events for the
/// controller. Everything runs on the UI thread; export is synchronous and
/// gated by the engine's `is_exporting` flag.
pub struct SnipApp {
    source: Option<PdfiumSource>,
    store: SelectionStore,
    registry: DimensionRegistry,
    controller: InteractionController,
    engine: ExportEngine,
    /// Current page, 1-based.
    page: u16,
    page_count: u16,
    texture: Option<egui::TextureHandle>,
    /// (page, display width) the texture was rendered for.
    texture_key: Option<(u16, u32)>,
    status: Option<String>,
}

impl Default for SnipApp {
    fn default() -> Self {
        Self {
            source: None,
            store: SelectionStore::new(),
            registry: DimensionRegistry::new(),
            controller: InteractionController::new(),
            engine: ExportEngine::new(),
            page: 1,
            page_count: 0,
            texture: None,
            texture_key: None,
            status: None,
        }
    }
}

impl SnipApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self::default()
    }

    fn open_document(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("PDF documents", &["pdf"])
            .pick_file()
        else {
            return;
        };

        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) => {
                log::error!("failed to read {}: {err}", path.display());
                self.status = Some(format!("Failed to read {}: {err}", path.display()));
                return;
            }
        };

        match PdfiumSource::load(bytes) {
            Ok(source) => {
                // Document reset: selections and dimension samples belong to
                // the previous file.
                self.page_count = source.page_count();
                self.source = Some(source);
                self.store.clear();
                self.registry.clear();
                self.page = 1;
                self.texture = None;
                self.texture_key = None;
                let lock = self.controller.aspect_lock();
                self.controller = InteractionController::new();
                self.controller.set_aspect_lock(lock);
                self.status = Some(format!("Loaded {} page(s) from {}", self.page_count, path.display()));
            }
            Err(err) => {
                log::error!("failed to open {}: {err}", path.display());
                self.status = Some(format!("Failed to open {}: {err}", path.display()));
            }
        }
    }

    fn export(&mut self) {
        let Some(source) = &self.source else {
            self.status = Some("Load a PDF before exporting.".to_owned());
            return;
        };

        match self.engine.run(source, SnippetDocument::new(), &self.store, &self.registry) {
            Ok(bytes) => self.save_exported(bytes),
            Err(err) => {
                log::error!("export failed: {err}");
                self.status = Some(format!("Export failed: {err}"));
            }
        }
    }

    fn save_exported(&mut self, bytes: Vec<u8>) {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let Some(path) = rfd::FileDialog::new()
            .set_file_name(format!("selections_{timestamp}.pdf"))
            .add_filter("PDF documents", &["pdf"])
            .save_file()
        else {
            self.status = Some("Export cancelled.".to_owned());
            return;
        };

        match std::fs::write(&path, &bytes) {
            Ok(()) => {
                log::info!("wrote {} bytes to {}", bytes.len(), path.display());
                self.status = Some(format!("Exported to {}", path.display()));
            }
            Err(err) => {
                log::error!("failed to write {}: {err}", path.display());
                self.status = Some(format!("Failed to write {}: {err}", path.display()));
            }
        }
    }

    fn goto_page(&mut self, page: u16) {
        self.page = page;
        // Discards any in-progress rectangle; committed selections on other
        // pages keep their ids and stay untouched.
        self.controller.page_changed();
    }

    fn controls_ui(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("Open PDF…").clicked() {
                self.open_document();
            }

            let can_export =
                self.source.is_some() && !self.store.is_empty() && !self.engine.is_exporting();
            let label = if self.engine.is_exporting() { "Exporting…" } else { "Export selections" };
            if ui.add_enabled(can_export, egui::Button::new(label)).clicked() {
                self.export();
            }

            let mut lock = self.controller.aspect_lock();
            if ui.checkbox(&mut lock, "Lock to 16:9").changed() {
                self.controller.set_aspect_lock(lock);
            }
        });
    }

    fn navigation_ui(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if self.source.is_some() {
                // Navigation is disabled while interacting so a drag can
                // never span a page change.
                let idle = self.controller.is_idle();
                if ui
                    .add_enabled(self.page > 1 && idle, egui::Button::new("Previous"))
                    .clicked()
                {
                    self.goto_page(self.page - 1);
                }
                ui.label(format!("Page {} of {}", self.page, self.page_count));
                if ui
                    .add_enabled(self.page < self.page_count && idle, egui::Button::new("Next"))
                    .clicked()
                {
                    self.goto_page(self.page + 1);
                }
            }

            if let Some(status) = &self.status {
                ui.separator();
                ui.label(status);
            }
        });
    }

    fn viewer_ui(&mut self, ui: &mut egui::Ui, viewport_height: f32) {
        let Some(source) = &self.source else {
            ui.centered_and_justified(|ui| {
                ui.label("Open a PDF to start selecting regions.");
            });
            return;
        };

        let target_width = ui.available_width().floor().max(1.0) as u32;

        // Re-render the display texture when the page or the viewer width
        // changed; each render re-registers the page's dimension samples.
        if self.texture_key != Some((self.page, target_width)) {
            match source.render_for_display(self.page, target_width) {
                Ok((image, native)) => {
                    self.registry.set_native(self.page, native);
                    let size = [image.width() as usize, image.height() as usize];
                    let pixels = egui::ColorImage::from_rgba_unmultiplied(size, image.as_raw());
                    self.texture = Some(ui.ctx().load_texture(
                        format!("page-{}", self.page),
                        pixels,
                        egui::TextureOptions::LINEAR,
                    ));
                    self.texture_key = Some((self.page, target_width));
                }
                Err(err) => {
                    log::error!("display render failed: {err}");
                    ui.label(format!("Failed to render page {}: {err}", self.page));
                    return;
                }
            }
        }
        let Some(texture) = &self.texture else {
            return;
        };
        let tex_size = texture.size_vec2();

        // The page area is width-to-fit; a page shorter than the viewport is
        // centered vertically inside it, which is exactly the letterboxing
        // the coordinate mapper corrects for at export time.
        let view_height = viewport_height.max(tex_size.y);
        // Sense::drag starts on the press itself, so the anchor is the exact
        // press position rather than the point a click/drag threshold tripped.
        let (rect, response) =
            ui.allocate_exact_size(egui::vec2(tex_size.x, view_height), egui::Sense::drag());
        let displayed = RenderedDimensions::new(rect.width(), rect.height());
        self.registry.set_rendered(self.page, displayed);

        let painter = ui.painter_at(rect);
        let padding = ((rect.height() - tex_size.y) / 2.0).max(0.0);
        let image_rect =
            egui::Rect::from_min_size(egui::pos2(rect.min.x, rect.min.y + padding), tex_size);
        painter.image(
            texture.id(),
            image_rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );

        // Committed selections with their delete controls.
        let stroke = egui::Stroke::new(2.0, egui::Color32::from_rgb(220, 64, 64));
        let mut deleted = None;
        let mut over_delete = false;
        let pointer_pos = response.interact_pointer_pos();
        for sel in self.store.list(self.page) {
            let sel_rect = egui::Rect::from_min_size(
                rect.min + egui::vec2(sel.left, sel.top),
                egui::vec2(sel.width, sel.height),
            );
            painter.rect_stroke(sel_rect, 0.0, stroke);

            let delete_rect = egui::Rect::from_center_size(sel_rect.right_top(), egui::vec2(16.0, 16.0));
            if pointer_pos.is_some_and(|p| delete_rect.contains(p)) {
                over_delete = true;
            }
            let delete_response =
                ui.interact(delete_rect, ui.id().with(("delete", sel.id)), egui::Sense::click());
            painter.rect_filled(delete_rect, 2.0, egui::Color32::from_rgb(220, 64, 64));
            painter.text(
                delete_rect.center(),
                egui::Align2::CENTER_CENTER,
                "✕",
                egui::FontId::proportional(11.0),
                egui::Color32::WHITE,
            );
            if delete_response.clicked() {
                deleted = Some(sel.id);
            }
        }
        if let Some(id) = deleted {
            self.store.delete(self.page, id);
        }

        // Translate the response into pointer events for the controller. A
        // press on a delete control never starts a drawing.
        let to_page = |p: egui::Pos2| egui::pos2(p.x - rect.min.x, p.y - rect.min.y);
        let mut command = None;
        if let Some(pos) = pointer_pos {
            let pos = to_page(pos);
            if response.drag_started() {
                if !over_delete {
                    command = self
                        .controller
                        .handle(PointerEvent::Down { pos }, self.page, displayed, &self.store);
                }
            } else if response.dragged() {
                command = self
                    .controller
                    .handle(PointerEvent::Moved { pos }, self.page, displayed, &self.store);
            }
        }
        if response.drag_stopped() {
            command = self
                .controller
                .handle(PointerEvent::Up, self.page, displayed, &self.store);
        } else if !self.controller.is_idle() && !response.is_pointer_button_down_on() {
            // The pointer vanished without a release event (left the window
            // area); treat it like a release so interaction cannot get stuck.
            command = self
                .controller
                .handle(PointerEvent::Left, self.page, displayed, &self.store);
        }

        match command {
            Some(SelectionCommand::Commit { page, rect, displayed }) => {
                if let Some(id) = self.store.create(page, rect, displayed) {
                    log::debug!("committed selection {id} on page {page}");
                }
            }
            Some(SelectionCommand::Move { page, id, left, top }) => {
                self.store.move_to(page, id, left, top);
            }
            None => {}
        }

        // The in-progress rectangle, drawn last so it sits on top.
        if let Some(live) = self.controller.live_rect() {
            let live_rect = egui::Rect::from_min_size(
                rect.min + egui::vec2(live.left, live.top),
                egui::vec2(live.width, live.height),
            );
            painter.rect_filled(live_rect, 0.0, egui::Color32::from_rgba_unmultiplied(90, 140, 220, 40));
            painter.rect_stroke(live_rect, 0.0, egui::Stroke::new(1.5, egui::Color32::from_rgb(90, 140, 220)));
        }
    }
}

impl eframe::App for SnipApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            self.controls_ui(ui);
        });

        if self.source.is_some() || self.status.is_some() {
            egui::TopBottomPanel::bottom("navigation").show(ctx, |ui| {
                self.navigation_ui(ui);
            });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            // Captured outside the scroll area, where the height is still the
            // visible viewport rather than the unbounded scroll canvas.
            let viewport_height = ui.available_height();
            egui::ScrollArea::vertical()
                .auto_shrink(false)
                .show(ui, |ui| {
                    self.viewer_ui(ui, viewport_height);
                });
        });
    }
}
