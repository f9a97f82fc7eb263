use client_core::{Notice, Notifier};
use crossbeam_channel::Sender;

use crate::controller::events::UiEvent;

/// Forwards cart notices to the UI thread, which shows them as toasts.
pub struct ChannelNotifier {
    ui_tx: Sender<UiEvent>,
}

impl ChannelNotifier {
    pub fn new(ui_tx: Sender<UiEvent>) -> Self {
        Self { ui_tx }
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notice: Notice) {
        if let Err(err) = self.ui_tx.try_send(UiEvent::Notice(notice)) {
            tracing::warn!("dropping cart notice: {err}");
        }
    }
}
