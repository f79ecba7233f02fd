use std::sync::Arc;
use std::time::Duration;

use eframe::egui;

use crate::render::{self, Style};
use crate::save::SaveClient;
use crate::session::{ImageSource, Session, SessionEvent};
use crate::tool::{LabelResponse, PointerOutcome, Tool};
use crate::viewport::ZoomDirection;

const DRAW_REJECTED: &str = "Annotations cannot be drawn in this area";

pub struct AnnotateApp {
    session: Session,
    client: Arc<dyn SaveClient>,
    texture: Option<egui::TextureHandle>,
    style: Style,
    default_label: String,

    // text of the label dialog, Some while it is showing
    label_buf: Option<String>,

    notice: Option<String>,
    canvas_hovered: bool,
}

impl AnnotateApp {
    pub fn new(session: Session, client: Arc<dyn SaveClient>, default_label: String) -> Self {
        Self {
            session,
            client,
            texture: None,
            style: Style::default(),
            default_label,
            label_buf: None,
            notice: None,
            canvas_hovered: false,
        }
    }

    fn ensure_texture(&mut self, ctx: &egui::Context) {
        if self.texture.is_some() {
            return;
        }
        if let Some(img) = self.session.image() {
            let size = [img.width() as usize, img.height() as usize];
            let pixels = img.as_flat_samples();
            let color_image = egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice());
            self.texture =
                Some(ctx.load_texture("radiograph", color_image, egui::TextureOptions::LINEAR));
        }
    }

    fn handle_session_events(&mut self, ctx: &egui::Context) {
        while let Some(event) = self.session.poll() {
            match event {
                SessionEvent::ImageLoaded => {
                    self.texture = None;
                    self.notice = None;
                }
                SessionEvent::ImageFailed(_) => self.texture = None,
                SessionEvent::Saved { record, .. } => {
                    tracing::debug!(
                        file_id = %record.file_id,
                        updated_at = record.updated_at.as_deref().unwrap_or_default(),
                        "closing after save"
                    );
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
                // the session keeps the message, shown in the footer
                SessionEvent::SaveFailed(_) => {}
            }
        }
        if self.session.is_loading() || self.session.is_saving() {
            ctx.request_repaint_after(Duration::from_millis(50));
        }
    }

    fn handle_outcome(&mut self, outcome: PointerOutcome) {
        if outcome == PointerOutcome::DrawRejected {
            self.notice = Some(DRAW_REJECTED.to_string());
        }
    }

    /// Open the label dialog whenever the editor holds a shape without a label,
    /// however that shape got there.
    fn sync_label_dialog(&mut self) {
        let pending = self
            .session
            .editor()
            .is_some_and(|editor| editor.pending_label().is_some());
        match (pending, self.label_buf.is_some()) {
            (true, false) => self.label_buf = Some(self.default_label.clone()),
            (false, true) => self.label_buf = None,
            _ => {}
        }
    }

    /// Input is frozen while the label dialog is up or a save is in flight.
    fn is_modal(&self) -> bool {
        self.label_buf.is_some() || self.session.is_saving()
    }

    fn save(&mut self) {
        // a refused save leaves its message in the session
        let _ = self.session.begin_save(Arc::clone(&self.client));
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        let Some(editor) = self.session.editor_mut() else {
            ui.label("No image loaded");
            return;
        };
        ui.horizontal(|ui| {
            for tool in Tool::ALL {
                if ui.selectable_label(editor.tool() == tool, tool.label()).clicked() {
                    editor.set_tool(tool);
                }
            }
            ui.separator();
            if editor.can_delete() && ui.button("Delete Selected").clicked() {
                editor.delete_selected();
            }
            ui.separator();
            ui.label(format!("Zoom: {:.0}%", editor.viewport().scale() * 100.0));
            ui.separator();
            ui.label(format!("Tool: {}", editor.tool().label()));
        });
    }

    fn canvas(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        let Some(image) = self.session.image() else {
            ui.vertical_centered(|ui| {
                if self.session.is_loading() {
                    ui.spinner();
                    ui.label("Loading image...");
                } else {
                    ui.label("The image could not be loaded.");
                    if ui.button("Open image...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Images", &["png", "jpg", "jpeg", "bmp", "tif", "tiff"])
                            .pick_file()
                        {
                            self.session.load_image(ImageSource::Path(path));
                        }
                    }
                }
            });
            return;
        };
        let image_size = egui::vec2(image.width() as f32, image.height() as f32);

        let (response, painter) = ui.allocate_painter(image_size, egui::Sense::click_and_drag());
        let origin = response.rect.min;

        if !self.is_modal() {
            let Some(editor) = self.session.editor_mut() else {
                return;
            };
            let (pressed, released, primary_down, pos, scroll) = ctx.input(|i| {
                (
                    i.pointer.primary_pressed(),
                    i.pointer.primary_released(),
                    i.pointer.primary_down(),
                    i.pointer.latest_pos(),
                    i.raw_scroll_delta.y,
                )
            });
            let hovered = response.hovered();
            let mut outcome = PointerOutcome::None;

            if let Some(pos) = pos {
                let local = (pos - origin).to_pos2();
                if pressed && hovered {
                    outcome = editor.pointer_down(local);
                }
                if hovered || primary_down {
                    editor.pointer_move(local);
                }
                if released {
                    outcome = outcome.or(editor.pointer_up());
                }
                if hovered && scroll != 0.0 {
                    let direction = if scroll > 0.0 {
                        ZoomDirection::In
                    } else {
                        ZoomDirection::Out
                    };
                    editor.zoom(local, direction);
                }
            }
            if self.canvas_hovered && !hovered && !primary_down {
                outcome = outcome.or(editor.pointer_leave());
            }
            self.canvas_hovered = hovered;

            ctx.input(|i| {
                if i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace) {
                    editor.delete_selected();
                }
                if i.key_pressed(egui::Key::Escape) {
                    editor.cancel();
                }
            });

            self.handle_outcome(outcome);
        }

        let Some(editor) = self.session.editor() else {
            return;
        };
        let scene = render::build_scene(editor, image_size, &self.style);
        render::paint(&painter, origin, self.texture.as_ref(), &scene, &self.style);

        let cursor = match editor.tool() {
            Tool::Pan if response.is_pointer_button_down_on() => egui::CursorIcon::Grabbing,
            Tool::Pan => egui::CursorIcon::Grab,
            Tool::DrawBox | Tool::DrawPolygon => egui::CursorIcon::Crosshair,
            Tool::Select if editor.interaction().is_moving() => egui::CursorIcon::Grabbing,
            Tool::Select if editor.store().hovered().is_some() => egui::CursorIcon::Move,
            Tool::Select => egui::CursorIcon::Default,
        };
        response.on_hover_cursor(cursor);
    }

    fn label_dialog(&mut self, ctx: &egui::Context) {
        let Some(label_buf) = self.label_buf.as_mut() else {
            return;
        };
        let mut response = None;
        egui::Window::new("Class name")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                let edit = ui.text_edit_singleline(label_buf);
                edit.request_focus();
                if edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    response = Some(LabelResponse::Submit(label_buf.clone()));
                }
                ui.horizontal(|ui| {
                    if ui.button("OK").clicked() {
                        response = Some(LabelResponse::Submit(label_buf.clone()));
                    }
                    if ui.button("Cancel").clicked() {
                        response = Some(LabelResponse::Cancel);
                    }
                });
                if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                    response = Some(LabelResponse::Cancel);
                }
            });

        if let Some(response) = response {
            if let Some(editor) = self.session.editor_mut() {
                editor.resolve_label(response);
            }
            self.label_buf = None;
        }
    }
}

impl eframe::App for AnnotateApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_session_events(ctx);
        if !self.session.is_open() {
            return;
        }
        self.ensure_texture(ctx);
        self.sync_label_dialog();

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            let enabled = !self.is_modal();
            ui.add_enabled_ui(enabled, |ui| self.toolbar(ui));
        });

        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(format!("Record {}", self.session.record().file_id));
                let message = self.session.error().or(self.notice.as_deref()).map(str::to_owned);
                if let Some(message) = message {
                    ui.colored_label(egui::Color32::from_rgb(220, 80, 60), message);
                    if ui.small_button("x").clicked() {
                        self.session.clear_error();
                        self.notice = None;
                    }
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let saving = self.session.is_saving();
                    let label = if saving { "Saving..." } else { "Save annotations" };
                    let can_save = !self.is_modal() && self.session.editor().is_some();
                    if ui.add_enabled(can_save, egui::Button::new(label)).clicked() {
                        self.save();
                    }
                    if ui.button("Cancel").clicked() {
                        self.session.close();
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| self.canvas(ctx, ui));

        self.sync_label_dialog();
        self.label_dialog(ctx);
    }
}
