use std::sync::Arc;

use common::{
    error::ScanError,
    models::ProductDetails,
    network::NetworkClient,
    station::{ScanStation, TransportFailurePolicy},
};
use iced::{Alignment, Border, Font, Length, Theme, font::Weight, widget};
use tracing::debug;

use super::ScanMessage;

#[derive(Debug)]
pub struct ScanForm {
    station: ScanStation,
    network: Arc<NetworkClient>,
    show_all_fields: bool,
}

impl ScanForm {
    pub fn new(
        network: Arc<NetworkClient>,
        policy: TransportFailurePolicy,
        show_all_fields: bool,
    ) -> Self {
        Self {
            station: ScanStation::new(policy),
            network,
            show_all_fields,
        }
    }

    pub fn update(&mut self, message: ScanMessage) -> iced::Task<ScanMessage> {
        match message {
            ScanMessage::InputChanged(s) => {
                self.station.on_input_changed(s);
                iced::Task::none()
            }
            ScanMessage::ScanField => {
                let raw = self.station.input().to_string();
                match self.station.on_scan(&raw) {
                    Ok(Some(code)) => self.lookup(code),
                    Ok(None) => iced::Task::none(),
                    Err(e) => {
                        debug!(error = %e, "scan refused");
                        // The field held the scan itself, not typed input.
                        if matches!(e, ScanError::Duplicate(_)) {
                            self.station.on_input_changed(String::new());
                        }
                        iced::Task::none()
                    }
                }
            }
            ScanMessage::Proceed => match self.station.on_manual_submit() {
                Ok(code) => self.lookup(code),
                Err(e) => {
                    debug!(error = %e, "submission refused");
                    iced::Task::none()
                }
            },
            ScanMessage::Settled(code, outcome) => {
                if let Err(e) = self.station.settle(&code, outcome) {
                    debug!(error = %e, "lookup settled without a product");
                }
                iced::Task::none()
            }
            ScanMessage::AcknowledgeNotice => {
                self.station.acknowledge_notice();
                iced::Task::none()
            }
        }
    }

    fn lookup(&self, code: String) -> iced::Task<ScanMessage> {
        let network = self.network.clone();
        let key = code.clone();
        iced::Task::perform(
            async move { network.search_code(&key).await.map_err(|e| e.to_string()) },
            move |outcome| ScanMessage::Settled(code.clone(), outcome),
        )
    }

    pub fn view(&self) -> iced::Element<'_, ScanMessage> {
        if let Some(notice) = self.station.notice() {
            return view_notice(notice);
        }

        let label = if self.station.is_loading() {
            "Submitting..."
        } else {
            "Proceed"
        };
        let mut proceed = widget::button(
            widget::container(widget::text(label)).center_x(Length::Fill),
        )
        .width(Length::Fill);
        if self.station.can_submit() {
            proceed = proceed.on_press(ScanMessage::Proceed);
        }

        let mut content = widget::column![
            widget::container(widget::text("Scan QR Codes").size(28.0)).center_x(Length::Fill),
            widget::space::vertical().height(8.0),
            widget::text("QR Code"),
            widget::text_input("Enter or scan a QR code", self.station.input())
                .on_input(ScanMessage::InputChanged)
                .on_submit(ScanMessage::ScanField),
            proceed,
        ]
        .spacing(8.0);

        if let Some(error) = self.station.error() {
            content = content.push(error_box(error));
        }
        if let Some(details) = self.station.result() {
            content = content.push(self.view_result(details));
        }

        widget::container(widget::container(content).width(480.0))
            .center_x(Length::Fill)
            .padding(24.0)
            .into()
    }

    fn view_result(&self, details: &ProductDetails) -> iced::Element<'_, ScanMessage> {
        let mut fields = details.fields();
        if !self.show_all_fields {
            fields.truncate(3);
        }
        let rows: Vec<iced::Element<'_, ScanMessage>> = fields
            .into_iter()
            .map(|(key, value)| {
                widget::row![
                    field_label(key).width(140.0),
                    widget::text(" : "),
                    widget::text(value).width(Length::Fill),
                ]
                .align_y(Alignment::Center)
                .into()
            })
            .collect();

        widget::container(widget::column(rows).spacing(4.0))
            .style(|theme: &Theme| {
                let palette = theme.extended_palette();
                widget::container::Style {
                    text_color: Some(palette.background.weak.text),
                    background: Some(palette.background.weak.color.into()),
                    border: Border::default().rounded(8.0),
                    ..Default::default()
                }
            })
            .width(Length::Fill)
            .padding(16.0)
            .into()
    }
}

fn error_box<'a>(message: &'a str) -> iced::Element<'a, ScanMessage> {
    widget::container(widget::text(message))
        .style(|theme: &Theme| {
            let palette = theme.extended_palette();
            widget::container::Style {
                text_color: Some(palette.danger.weak.text),
                background: Some(palette.danger.weak.color.into()),
                border: Border {
                    color: palette.danger.strong.color,
                    width: 1.0,
                    radius: iced::border::Radius::from(4.0),
                },
                ..Default::default()
            }
        })
        .width(Length::Fill)
        .padding(12.0)
        .into()
}

fn view_notice<'a>(notice: &'static str) -> iced::Element<'a, ScanMessage> {
    widget::container(
        widget::column![
            widget::text(notice).size(20.0),
            widget::button("OK").on_press(ScanMessage::AcknowledgeNotice),
        ]
        .spacing(16.0)
        .align_x(Alignment::Center),
    )
    .center(Length::Fill)
    .into()
}

fn field_label<'a>(label: String) -> widget::Text<'a> {
    let mut bold = Font::DEFAULT;
    bold.weight = Weight::Bold;
    widget::text(label).font(bold).style(|theme: &Theme| {
        let palette = theme.extended_palette();
        widget::text::Style {
            color: palette.primary.strong.color.into(),
        }
    })
}
