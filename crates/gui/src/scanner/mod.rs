use common::models::LookupOutcome;

pub mod widget;

#[derive(Debug, Clone)]
pub enum ScanMessage {
    InputChanged(String),
    /// Enter in the code field. Keyboard-wedge scanners end every scan with it.
    ScanField,
    Proceed,
    Settled(String, Result<LookupOutcome, String>),
    AcknowledgeNotice,
}
