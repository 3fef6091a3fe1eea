use std::sync::Arc;

use common::{config::Settings, network::NetworkClient};

use crate::scanner::{ScanMessage, widget::ScanForm};

#[derive(Debug)]
pub struct App {
    pub dark_mode: bool,
    form: ScanForm,
}

impl App {
    pub fn new(settings: &Settings, network: Arc<NetworkClient>) -> Self {
        Self {
            dark_mode: true,
            form: ScanForm::new(
                network,
                settings.on_transport_failure,
                settings.show_all_fields,
            ),
        }
    }

    pub fn update(&mut self, message: AppMessage) -> iced::Task<AppMessage> {
        match message {
            AppMessage::Scan(msg) => self.form.update(msg).map(AppMessage::Scan),
        }
    }

    pub fn view(&self) -> iced::Element<'_, AppMessage> {
        self.form.view().map(AppMessage::Scan)
    }
}

#[derive(Debug, Clone)]
pub enum AppMessage {
    Scan(ScanMessage),
}
