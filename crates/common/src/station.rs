//! Scan station state: what the operator typed or scanned, the last code that
//! reached the lookup service, and what the form currently shows.
//!
//! Every submission, scanned or manual, goes through [`ScanStation::begin_submit`]
//! and ends in [`ScanStation::settle`]. At most one lookup is in flight.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::{
    error::{DEFAULT_REJECTION_MESSAGE, ScanError, TRANSPORT_FAILURE_NOTICE},
    lookup::ProductLookup,
    models::{LookupOutcome, ProductDetails},
};

/// What a failed request does to the displayed result and error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportFailurePolicy {
    /// Leave result, error and input as they were.
    #[default]
    Preserve,
    /// Drop the result and show an inline error for the failed code.
    Clear,
}

impl FromStr for TransportFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "preserve" => Ok(Self::Preserve),
            "clear" => Ok(Self::Clear),
            other => Err(format!("unknown transport failure policy '{other}'")),
        }
    }
}

#[derive(Debug, Default)]
pub struct ScanStation {
    input: String,
    last_accepted: Option<String>,
    result: Option<ProductDetails>,
    error: Option<String>,
    loading: bool,
    notice: Option<&'static str>,
    policy: TransportFailurePolicy,
}

impl ScanStation {
    pub fn new(policy: TransportFailurePolicy) -> Self {
        Self {
            policy,
            ..Default::default()
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn last_accepted(&self) -> Option<&str> {
        self.last_accepted.as_deref()
    }

    pub fn result(&self) -> Option<&ProductDetails> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Blocking notice the operator has to acknowledge, if any.
    pub fn notice(&self) -> Option<&'static str> {
        self.notice
    }

    pub fn acknowledge_notice(&mut self) {
        self.notice = None;
    }

    pub fn on_input_changed(&mut self, value: impl Into<String>) {
        self.input = value.into();
    }

    /// Whether the manual "Proceed" control is enabled.
    pub fn can_submit(&self) -> bool {
        !self.input.trim().is_empty() && !self.loading
    }

    fn is_duplicate(&self, code: &str) -> bool {
        self.result.as_ref().is_some_and(|r| r.product_code == code)
            || self.last_accepted.as_deref() == Some(code)
    }

    /// Handles a decoded value from the scanner.
    ///
    /// Returns the code a lookup was started for, or `None` for a blank scan.
    pub fn on_scan(&mut self, raw: &str) -> Result<Option<String>, ScanError> {
        let code = raw.trim();
        if code.is_empty() {
            return Ok(None);
        }

        if self.is_duplicate(code) {
            let err = ScanError::Duplicate(code.to_string());
            // Never replace an error that is already on screen.
            if self.error.is_none() {
                self.error = Some(err.to_string());
            } else {
                debug!(code, "duplicate scan while an error is showing");
            }
            return Err(err);
        }

        let code = self.begin_submit(code)?;
        self.input = code.clone();
        Ok(Some(code))
    }

    pub fn on_manual_submit(&mut self) -> Result<String, ScanError> {
        let code = self.input.trim().to_string();
        self.begin_submit(&code)
    }

    /// The single submission gate. On success the station is loading and the
    /// caller owes a [`settle`](Self::settle) for the returned code.
    pub fn begin_submit(&mut self, code: &str) -> Result<String, ScanError> {
        let code = code.trim();
        if code.is_empty() {
            self.error = Some(ScanError::EmptyInput.to_string());
            return Err(ScanError::EmptyInput);
        }
        if self.loading {
            warn!(code, "lookup already in flight, submission refused");
            return Err(ScanError::Busy);
        }

        self.loading = true;
        Ok(code.to_string())
    }

    pub fn settle<E: fmt::Display>(
        &mut self,
        code: &str,
        outcome: Result<LookupOutcome, E>,
    ) -> Result<ProductDetails, ScanError> {
        self.loading = false;

        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(code, error = %e, "lookup failed");
                self.notice = Some(TRANSPORT_FAILURE_NOTICE);
                let err = ScanError::TransportFailure {
                    code: code.to_string(),
                };
                if self.policy == TransportFailurePolicy::Clear {
                    self.result = None;
                    self.error = Some(err.to_string());
                }
                return Err(err);
            }
        };

        self.last_accepted = Some(code.to_string());
        self.input.clear();

        match outcome {
            LookupOutcome::Found(details) => {
                info!(code, sku = %details.sku_unique_id, "product found");
                self.result = Some(details.clone());
                self.error = None;
                Ok(details)
            }
            LookupOutcome::Rejected(message) => {
                let message = message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_REJECTION_MESSAGE.to_string());
                info!(code, %message, "code rejected");
                let err = ScanError::Rejected {
                    code: code.to_string(),
                    message,
                };
                self.result = None;
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    pub async fn submit<L>(&mut self, lookup: &L, code: &str) -> Result<ProductDetails, ScanError>
    where
        L: ProductLookup + ?Sized,
    {
        let code = self.begin_submit(code)?;
        let outcome = lookup.search_code(&code).await;
        self.settle(&code, outcome)
    }

    pub async fn manual_submit<L>(&mut self, lookup: &L) -> Result<ProductDetails, ScanError>
    where
        L: ProductLookup + ?Sized,
    {
        let code = self.on_manual_submit()?;
        let outcome = lookup.search_code(&code).await;
        self.settle(&code, outcome)
    }

    /// Scan and, unless the scan was blank or refused, look the code up.
    pub async fn scan<L>(&mut self, lookup: &L, raw: &str) -> Result<Option<ProductDetails>, ScanError>
    where
        L: ProductLookup + ?Sized,
    {
        let Some(code) = self.on_scan(raw)? else {
            return Ok(None);
        };
        let outcome = lookup.search_code(&code).await;
        self.settle(&code, outcome).map(Some)
    }
}

#[cfg(test)]
#[path = "tests/station_tests.rs"]
mod tests;
