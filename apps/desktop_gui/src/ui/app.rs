use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use client_core::{
    cart_view::{
        CHECKOUT_LABEL, EMPTY_BODY, EMPTY_TITLE, LOADING_CAPTION, START_SHOPPING_LABEL,
        TABLE_HEADERS,
    },
    pricing::{format_line_total, format_quantity, format_unit_price},
    CartRow, CartSnapshot, Route,
};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use egui::TextureHandle;
use shared::domain::ProductId;
use url::Url;

use crate::{
    backend_bridge::commands::BackendCommand,
    config::Settings,
    controller::{
        events::UiEvent,
        orchestration::dispatch_backend_command,
        reducer::{CartScreen, ThumbnailState},
    },
    ui::thumbnail::THUMBNAIL_EDGE,
};

const SUCCESS_COLOR: egui::Color32 = egui::Color32::from_rgb(46, 125, 50);
const ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(198, 40, 40);

pub struct CartApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    screen: CartScreen,
    textures: HashMap<ProductId, TextureHandle>,
    currency_symbol: String,
    storefront_url: Url,
    mounted: bool,
}

impl CartApp {
    pub fn new(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>, settings: &Settings) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            screen: CartScreen::new(settings.toast_duration),
            textures: HashMap::new(),
            currency_symbol: settings.currency_symbol.clone(),
            storefront_url: settings.storefront_url.clone(),
            mounted: false,
        }
    }

    fn queue(&mut self, cmd: BackendCommand) {
        dispatch_backend_command(&self.cmd_tx, cmd, &mut self.screen.status);
    }

    fn process_ui_events(&mut self) {
        let now = Instant::now();
        while let Ok(event) = self.ui_rx.try_recv() {
            for cmd in self.screen.apply(event, now) {
                self.queue(cmd);
            }
        }
        self.screen.toasts.expire(now);
        let thumbnails = &self.screen.thumbnails;
        self.textures
            .retain(|product_id, _| thumbnails.contains_key(product_id));
    }

    fn open_route(&self, ctx: &egui::Context, route: &Route) {
        match route.resolve(&self.storefront_url) {
            Ok(url) => ctx.open_url(egui::OpenUrl::new_tab(url.as_str())),
            Err(err) => tracing::warn!(path = %route.path(), "cannot resolve storefront route: {err}"),
        }
    }

    fn thumbnail_texture(&mut self, ctx: &egui::Context, product_id: &ProductId) -> Option<TextureHandle> {
        if let Some(texture) = self.textures.get(product_id) {
            return Some(texture.clone());
        }
        let ThumbnailState::Ready(image) = self.screen.thumbnails.get(product_id)? else {
            return None;
        };
        let color_image =
            egui::ColorImage::from_rgba_unmultiplied([image.width, image.height], &image.rgba);
        let texture = ctx.load_texture(
            format!("cart-thumbnail:{product_id}"),
            color_image,
            egui::TextureOptions::LINEAR,
        );
        self.textures.insert(product_id.clone(), texture.clone());
        Some(texture)
    }

    fn show_loading(ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() * 0.3);
            ui.spinner();
            ui.add_space(12.0);
            ui.label(egui::RichText::new(LOADING_CAPTION).strong().size(18.0));
        });
    }

    fn show_empty(&self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() * 0.3);
            ui.label(egui::RichText::new(EMPTY_TITLE).strong().size(18.0));
            ui.add_space(8.0);
            ui.label(EMPTY_BODY);
            ui.add_space(12.0);
            if ui.button(START_SHOPPING_LABEL).clicked() {
                self.open_route(ui.ctx(), &CartSnapshot::browse_route());
            }
        });
    }

    fn show_table(&mut self, ui: &mut egui::Ui, rows: &[CartRow]) {
        let ctx = ui.ctx().clone();
        let mut remove_requests = Vec::new();

        egui::Frame::group(ui.style()).show(ui, |ui| {
            egui::Grid::new("cart_table")
                .striped(true)
                .num_columns(TABLE_HEADERS.len())
                .spacing([24.0, 10.0])
                .show(ui, |ui| {
                    for header in TABLE_HEADERS {
                        ui.label(egui::RichText::new(header).strong());
                    }
                    ui.end_row();

                    for row in rows {
                        let edge = THUMBNAIL_EDGE as f32;
                        match self.thumbnail_texture(&ctx, &row.product_id) {
                            Some(texture) => {
                                ui.add(
                                    egui::Image::new(&texture)
                                        .fit_to_exact_size(egui::vec2(edge, edge)),
                                )
                                .on_hover_text(&row.name);
                            }
                            None => {
                                ui.add_sized([edge, edge], egui::Label::new("…"));
                            }
                        }

                        if ui.link(&row.name).clicked() {
                            self.open_route(&ctx, &row.detail_route);
                        }
                        ui.label(format_unit_price(&self.currency_symbol, row.unit_price));
                        ui.label(format_quantity(row.quantity, &row.unit));
                        ui.label(format_line_total(&self.currency_symbol, row.line_total));

                        let remove = egui::Button::new(
                            egui::RichText::new("🗑 Remove").color(ERROR_COLOR),
                        );
                        if ui
                            .add_enabled(!row.removing, remove)
                            .on_hover_text("Remove from cart")
                            .clicked()
                        {
                            remove_requests.push(row.product_id.clone());
                        }
                        ui.end_row();
                    }
                });
        });

        ui.add_space(16.0);
        if ui.button(CHECKOUT_LABEL).clicked() {
            self.open_route(&ctx, &CartSnapshot::checkout_route());
        }

        for product_id in remove_requests {
            if let Some(cmd) = self.screen.request_remove(&product_id) {
                self.queue(cmd);
            }
        }
    }

    fn show_toasts(&mut self, ctx: &egui::Context) {
        if self.screen.toasts.is_empty() {
            return;
        }
        let mut dismissed = None;
        egui::Area::new(egui::Id::new("cart_toasts"))
            .anchor(egui::Align2::RIGHT_TOP, [-16.0, 16.0])
            .show(ctx, |ui| {
                for (index, toast) in self.screen.toasts.iter().enumerate() {
                    let color = if toast.is_error() {
                        ERROR_COLOR
                    } else {
                        SUCCESS_COLOR
                    };
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        ui.horizontal(|ui| {
                            ui.colored_label(color, &toast.notice.message);
                            if ui.small_button("✕").clicked() {
                                dismissed = Some(index);
                            }
                        });
                    });
                    ui.add_space(6.0);
                }
            });
        if let Some(index) = dismissed {
            self.screen.toasts.dismiss(index);
        }
    }

    fn show_status(&self, ctx: &egui::Context) {
        let banner = self.screen.banner.as_deref();
        if banner.is_none() && self.screen.status.is_empty() {
            return;
        }
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            if let Some(banner) = banner {
                ui.colored_label(ERROR_COLOR, banner);
            }
            if !self.screen.status.is_empty() {
                ui.label(&self.screen.status);
            }
        });
    }
}

impl eframe::App for CartApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.mounted {
            self.mounted = true;
            self.queue(BackendCommand::LoadCart);
        }
        self.process_ui_events();

        self.show_status(ctx);
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Your cart");
            ui.separator();
            match self.screen.snapshot.clone() {
                CartSnapshot::Loading => Self::show_loading(ui),
                CartSnapshot::Empty => self.show_empty(ui),
                CartSnapshot::Populated(rows) => {
                    egui::ScrollArea::vertical().show(ui, |ui| self.show_table(ui, &rows));
                }
            }
        });
        self.show_toasts(ctx);

        ctx.request_repaint_after(Duration::from_millis(100));
    }
}

impl Drop for CartApp {
    fn drop(&mut self) {
        let _ = self.cmd_tx.try_send(BackendCommand::Shutdown);
    }
}
