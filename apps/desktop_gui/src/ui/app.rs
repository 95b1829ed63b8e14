use std::fs;

use client_core::{
    controller::{LengthLevel, LOADING_LABEL},
    GenerationController, Submission,
};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use egui::TextureHandle;
use shared::domain::RequestId;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{apply_ui_event, EventEffect, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;
use crate::media::DecodedDuck;

pub const EXAMPLE_PROMPTS: [&str; 5] = [
    "a duck wearing sunglasses on a beach",
    "a cyberpunk duck with neon lights",
    "a duck in a spacesuit floating in space",
    "a duck wearing a crown sitting on a throne",
    "a duck detective with a magnifying glass",
];

const ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(200, 60, 40);
const HINT_COLOR: egui::Color32 = egui::Color32::from_rgb(120, 120, 120);
const WARNING_COLOR: egui::Color32 = egui::Color32::from_rgb(210, 150, 20);

/// Picture state for the result currently shown. Tied to the request that produced it.
enum DuckPicture {
    Empty,
    Loading(RequestId),
    Ready {
        request_id: RequestId,
        texture: TextureHandle,
        size: egui::Vec2,
        original_bytes: Vec<u8>,
    },
    Unavailable(RequestId),
}

impl DuckPicture {
    fn request_id(&self) -> Option<RequestId> {
        match self {
            DuckPicture::Empty => None,
            DuckPicture::Loading(request_id)
            | DuckPicture::Ready { request_id, .. }
            | DuckPicture::Unavailable(request_id) => Some(*request_id),
        }
    }
}

pub struct DuckGeneratorApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    controller: GenerationController,
    picture: DuckPicture,
    base_url: String,
    status: String,
}

impl DuckGeneratorApp {
    pub fn new(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>, base_url: String) -> Self {
        let mut app = Self {
            cmd_tx,
            ui_rx,
            controller: GenerationController::new(),
            picture: DuckPicture::Empty,
            status: format!("Checking the duck pond at {base_url}..."),
            base_url,
        };
        dispatch_backend_command(&app.cmd_tx, BackendCommand::CheckHealth, &mut app.controller);
        app
    }

    fn process_ui_events(&mut self, ctx: &egui::Context) {
        while let Ok(event) = self.ui_rx.try_recv() {
            let shown = self.picture.request_id();
            match apply_ui_event(&mut self.controller, shown, event, &self.base_url) {
                EventEffect::None => {}
                EventEffect::ShowPicture {
                    request_id,
                    image,
                    original_bytes,
                } => {
                    self.picture = upload_picture(ctx, request_id, image, original_bytes);
                }
                EventEffect::PictureUnavailable(request_id) => {
                    self.picture = DuckPicture::Unavailable(request_id);
                }
                EventEffect::ClearPicture => self.picture = DuckPicture::Empty,
                EventEffect::Status(status) => self.status = status,
            }
        }
    }

    fn submit(&mut self) {
        match self.controller.submit() {
            Submission::Started(pending) => {
                self.picture = DuckPicture::Loading(pending.request_id);
                dispatch_backend_command(
                    &self.cmd_tx,
                    BackendCommand::Generate {
                        request_id: pending.request_id,
                        description: pending.description,
                    },
                    &mut self.controller,
                );
                if !self.controller.is_in_flight() {
                    self.picture = DuckPicture::Empty;
                }
            }
            Submission::Rejected(_) => self.picture = DuckPicture::Empty,
            Submission::Busy => {}
        }
    }

    fn generate_another(&mut self) {
        if self.controller.generate_another() {
            self.picture = DuckPicture::Empty;
        }
    }

    fn show_prompt_form(&mut self, ui: &mut egui::Ui) {
        let can_submit = self.controller.can_submit();

        ui.label("Describe your duck:");
        let edit = egui::TextEdit::singleline(self.controller.prompt_mut())
            .hint_text("e.g., a duck wearing sunglasses on a beach")
            .desired_width(f32::INFINITY);
        let edit_resp = ui.add_enabled(can_submit, edit);

        let counter = self.controller.prompt_counter_text();
        match self.controller.prompt_length_hint().1 {
            LengthLevel::Normal => ui.colored_label(HINT_COLOR, counter),
            LengthLevel::Warning => ui.colored_label(WARNING_COLOR, counter),
            LengthLevel::Error => ui.colored_label(ERROR_COLOR, counter),
        };

        let enter_pressed =
            edit_resp.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

        let button_text = self.controller.loading_label().unwrap_or("Generate Duck");
        let clicked = ui
            .add_enabled(
                self.controller.submit_button_enabled(),
                egui::Button::new(button_text),
            )
            .clicked();

        if (clicked || enter_pressed) && self.controller.can_submit() {
            self.submit();
        }
    }

    fn show_outcome(&mut self, ui: &mut egui::Ui) {
        if self.controller.is_in_flight() {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(LOADING_LABEL);
            });
            return;
        }

        if let Some(error) = self.controller.error() {
            ui.colored_label(ERROR_COLOR, format!("🦆 {error}"));
            return;
        }

        let Some(result) = self.controller.result() else {
            return;
        };
        let message = result.message.clone();
        let is_fallback = result.is_fallback;
        let prompt_used = result.prompt_used.clone();

        match &self.picture {
            DuckPicture::Ready {
                texture,
                size,
                original_bytes,
                ..
            } => {
                ui.add(egui::Image::new(texture).fit_to_exact_size(*size));
                if ui.button("Save duck as…").clicked() {
                    save_duck(original_bytes);
                }
            }
            DuckPicture::Loading(_) => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Drying off your duck...");
                });
            }
            DuckPicture::Unavailable(_) => {
                ui.colored_label(
                    ERROR_COLOR,
                    "🦆 Quack! Your duck hatched but the picture would not show up.",
                );
            }
            DuckPicture::Empty => {}
        }

        ui.label(message);
        if is_fallback {
            ui.colored_label(HINT_COLOR, "This is a pre-made duck from the backup pond.");
        }
        if let Some(prompt_used) = prompt_used {
            ui.colored_label(HINT_COLOR, format!("Prompt used: {prompt_used}"));
        }

        if ui.button("Generate Another").clicked() {
            self.generate_another();
        }
    }

    fn show_examples(&mut self, ui: &mut egui::Ui) {
        ui.heading("Need inspiration? Try these:");
        let can_submit = self.controller.can_submit();
        for example in EXAMPLE_PROMPTS {
            if ui.add_enabled(can_submit, egui::Link::new(example)).clicked() {
                self.controller.set_prompt(example);
            }
        }
    }
}

fn upload_picture(
    ctx: &egui::Context,
    request_id: RequestId,
    image: DecodedDuck,
    original_bytes: Vec<u8>,
) -> DuckPicture {
    let color_image = egui::ColorImage::from_rgba_unmultiplied(image.size, &image.rgba);
    let texture = ctx.load_texture(
        format!("duck:{}", request_id.0),
        color_image,
        egui::TextureOptions::LINEAR,
    );
    DuckPicture::Ready {
        request_id,
        texture,
        size: egui::vec2(image.size[0] as f32, image.size[1] as f32),
        original_bytes,
    }
}

fn save_duck(bytes: &[u8]) {
    let Some(path) = rfd::FileDialog::new()
        .set_file_name("duck.png")
        .save_file()
    else {
        return;
    };
    match fs::write(&path, bytes) {
        Ok(()) => tracing::info!(path = %path.display(), "duck saved"),
        Err(err) => tracing::warn!(path = %path.display(), "failed to save duck: {err}"),
    }
}

impl eframe::App for DuckGeneratorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events(ctx);

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.colored_label(HINT_COLOR, &self.status);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.heading("🦆 Duck Generator");
                ui.label("Describe your dream duck and watch it come to life!");
                ui.add_space(12.0);

                self.show_prompt_form(ui);
                ui.add_space(12.0);
                self.show_outcome(ui);
                ui.add_space(24.0);
                self.show_examples(ui);
            });
        });

        if self.controller.is_in_flight() || matches!(self.picture, DuckPicture::Loading(_)) {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}
