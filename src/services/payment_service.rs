//! Payment collaborator and the payment confirmation flow.
//!
//! The reservation core only records the status transitions the gateway
//! reports; order creation, signature schemes and refunds live behind the
//! `PaymentGateway` trait.

use crate::models::reservation::{Reservation, ReservationStatus};
use crate::services::notification_service::{self, NotificationKind, Notifier};
use crate::store::ReservationStore;
use crate::utils::error::{AppError, AppResult};
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use rand::distributions::Alphanumeric;
use rand::Rng;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::sync::Arc;
use tracing::info;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct PaymentOrder {
    pub order_id: String,
    pub reservation_id: String,
    pub amount: Decimal,
    pub currency: String,
    pub status: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(
        &self,
        amount: Decimal,
        reservation_id: &str,
        email: &str,
    ) -> AppResult<PaymentOrder>;

    async fn verify_signature(
        &self,
        order_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> AppResult<bool>;

    async fn refund(&self, payment_id: &str, amount: Option<Decimal>) -> AppResult<String>;
}

/// Stand-in gateway for development: issues order handles locally and checks
/// HMAC-SHA256 signatures over `order_id|payment_id` with a shared secret,
/// the same scheme the hosted gateway uses.
pub struct HmacPaymentGateway {
    key_secret: String,
}

impl HmacPaymentGateway {
    pub fn new(key_secret: impl Into<String>) -> Self {
        HmacPaymentGateway {
            key_secret: key_secret.into(),
        }
    }

    pub fn from_env() -> Self {
        let key_secret =
            std::env::var("PAYMENT_KEY_SECRET").expect("PAYMENT_KEY_SECRET must be set");
        Self::new(key_secret)
    }

    /// The signature the gateway would attach to a completed payment.
    pub fn sign(&self, order_id: &str, payment_id: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.key_secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(format!("{}|{}", order_id, payment_id).as_bytes());
        mac.finalize()
            .into_bytes()
            .iter()
            .map(|byte| format!("{:02x}", byte))
            .collect()
    }
}

fn random_handle(prefix: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(14)
        .map(char::from)
        .collect();
    format!("{}_{}", prefix, suffix)
}

#[async_trait]
impl PaymentGateway for HmacPaymentGateway {
    async fn create_order(
        &self,
        amount: Decimal,
        reservation_id: &str,
        email: &str,
    ) -> AppResult<PaymentOrder> {
        if amount <= Decimal::ZERO {
            return Err(AppError::ValidationError(
                "Amount must be greater than zero".into(),
            ));
        }
        if !email.contains('@') {
            return Err(AppError::ValidationError("Invalid email format".into()));
        }

        let order = PaymentOrder {
            order_id: random_handle("order"),
            reservation_id: reservation_id.to_string(),
            amount,
            currency: "INR".to_string(),
            status: "created".to_string(),
        };
        info!(order_id = %order.order_id, %reservation_id, %amount, "payment order created");
        Ok(order)
    }

    async fn verify_signature(
        &self,
        order_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> AppResult<bool> {
        let valid = self.sign(order_id, payment_id) == signature;
        info!(%order_id, %payment_id, valid, "payment signature verified");
        Ok(valid)
    }

    async fn refund(&self, payment_id: &str, amount: Option<Decimal>) -> AppResult<String> {
        let refund_id = random_handle("rfnd");
        info!(%payment_id, ?amount, %refund_id, "refund issued");
        Ok(refund_id)
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateOrderRequest {
    pub reservation_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct VerifyPaymentRequest {
    pub reservation_id: String,
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

#[derive(Clone)]
pub struct PaymentService {
    gateway: Arc<dyn PaymentGateway>,
    store: Arc<dyn ReservationStore>,
    notifier: Arc<dyn Notifier>,
}

impl PaymentService {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        store: Arc<dyn ReservationStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        PaymentService {
            gateway,
            store,
            notifier,
        }
    }

    async fn owned_reservation(&self, reservation_id: &str, user_id: &str) -> AppResult<Reservation> {
        match self.store.find_reservation(reservation_id).await? {
            Some(reservation) if reservation.user_id == user_id => Ok(reservation),
            // identical answer for "absent" and "not yours"
            _ => Err(AppError::NotFound(
                "Reservation not found or unauthorized".into(),
            )),
        }
    }

    pub async fn create_order(
        &self,
        user_id: &str,
        email: &str,
        request: CreateOrderRequest,
    ) -> AppResult<PaymentOrder> {
        let reservation = self
            .owned_reservation(&request.reservation_id, user_id)
            .await?;
        if reservation.status != ReservationStatus::Pending {
            return Err(AppError::Conflict(
                "Reservation is not awaiting payment".into(),
            ));
        }
        self.gateway
            .create_order(reservation.total_amount, &reservation.id, email)
            .await
    }

    /// Records a gateway-reported payment: pending -> confirmed / paid, then
    /// a payment-confirmed notification outside the transition.
    pub async fn confirm(
        &self,
        user_id: &str,
        request: VerifyPaymentRequest,
    ) -> AppResult<Reservation> {
        let reservation = self
            .owned_reservation(&request.reservation_id, user_id)
            .await?;

        let valid = self
            .gateway
            .verify_signature(&request.order_id, &request.payment_id, &request.signature)
            .await?;
        if !valid {
            return Err(AppError::ValidationError("Invalid payment signature".into()));
        }

        let confirmed = self.store.confirm_reservation(&reservation.id).await?;
        notification_service::dispatch(
            Arc::clone(&self.notifier),
            confirmed.id.clone(),
            NotificationKind::PaymentConfirmed,
        );
        Ok(confirmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn signature_round_trip_verifies() {
        let gateway = HmacPaymentGateway::new("test_secret");
        let signature = gateway.sign("order_abc", "pay_123");
        assert!(gateway
            .verify_signature("order_abc", "pay_123", &signature)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn tampered_signature_is_rejected() {
        let gateway = HmacPaymentGateway::new("test_secret");
        let signature = gateway.sign("order_abc", "pay_123");
        assert!(!gateway
            .verify_signature("order_abc", "pay_999", &signature)
            .await
            .unwrap());
        assert!(!gateway
            .verify_signature("order_abc", "pay_123", "deadbeef")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn order_creation_validates_inputs() {
        let gateway = HmacPaymentGateway::new("test_secret");
        let err = gateway
            .create_order(Decimal::ZERO, "res-1", "user@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let err = gateway
            .create_order(Decimal::from(500), "res-1", "not-an-email")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let order = gateway
            .create_order(Decimal::from(500), "res-1", "user@example.com")
            .await
            .unwrap();
        assert!(order.order_id.starts_with("order_"));
        assert_eq!(order.status, "created");
    }

    #[tokio::test]
    async fn refunds_issue_a_handle() {
        let gateway = HmacPaymentGateway::new("test_secret");
        let refund_id = gateway
            .refund("pay_123", Some(Decimal::from(500)))
            .await
            .unwrap();
        assert!(refund_id.starts_with("rfnd_"));
    }
}
