//! Payment ledger model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::UnknownCode;

/// Settlement status. Any status may be set directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum PaymentStatus {
    #[serde(rename = "PN")]
    Pending,
    #[serde(rename = "PD")]
    Paid,
}

/// Regular rental payment or a fine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum PaymentType {
    #[serde(rename = "PN")]
    Payment,
    #[serde(rename = "FN")]
    Fine,
}

impl PaymentStatus {
    pub fn as_code(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PN",
            PaymentStatus::Paid => "PD",
        }
    }
}

impl PaymentType {
    pub fn as_code(&self) -> &'static str {
        match self {
            PaymentType::Payment => "PN",
            PaymentType::Fine => "FN",
        }
    }
}

impl TryFrom<String> for PaymentStatus {
    type Error = UnknownCode;

    fn try_from(code: String) -> Result<Self, Self::Error> {
        match code.as_str() {
            "PN" => Ok(PaymentStatus::Pending),
            "PD" => Ok(PaymentStatus::Paid),
            _ => Err(UnknownCode {
                kind: "payment status",
                code,
            }),
        }
    }
}

impl TryFrom<String> for PaymentType {
    type Error = UnknownCode;

    fn try_from(code: String) -> Result<Self, Self::Error> {
        match code.as_str() {
            "PN" => Ok(PaymentType::Payment),
            "FN" => Ok(PaymentType::Fine),
            _ => Err(UnknownCode {
                kind: "payment type",
                code,
            }),
        }
    }
}

/// Payment record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Payment {
    pub id: i32,
    #[sqlx(try_from = "String")]
    pub status: PaymentStatus,
    #[serde(rename = "type")]
    #[sqlx(try_from = "String")]
    pub payment_type: PaymentType,
}

/// Create or replace payment request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PaymentInput {
    pub status: PaymentStatus,
    #[serde(rename = "type")]
    pub payment_type: PaymentType,
}

/// Partial update request
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdatePayment {
    pub status: Option<PaymentStatus>,
    #[serde(rename = "type")]
    pub payment_type: Option<PaymentType>,
}

impl From<PaymentInput> for UpdatePayment {
    fn from(input: PaymentInput) -> Self {
        Self {
            status: Some(input.status),
            payment_type: Some(input.payment_type),
        }
    }
}

impl UpdatePayment {
    pub fn apply_to(&self, payment: &mut Payment) {
        if let Some(status) = self.status {
            payment.status = status;
        }
        if let Some(payment_type) = self.payment_type {
            payment.payment_type = payment_type;
        }
    }
}
