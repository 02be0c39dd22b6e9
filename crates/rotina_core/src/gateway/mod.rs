//! Outbound delivery boundary.
//!
//! # Responsibility
//! - Define the contract the core uses to hand a composed reply to the
//!   messaging channel.
//!
//! # Invariants
//! - The core sends exactly one outbound text per inbound message and does
//!   not retry failed deliveries; retry policy belongs to the channel.

use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Acknowledgement returned by a sender for one accepted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// Channel-side id assigned to the outbound message.
    pub message_id: Uuid,
    pub recipient: String,
}

/// Delivery refusal reported by the channel collaborator.
#[derive(Debug)]
pub struct DeliveryError {
    pub recipient: String,
    pub reason: String,
}

impl Display for DeliveryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "delivery to `{}` failed: {}", self.recipient, self.reason)
    }
}

impl Error for DeliveryError {}

/// Transport collaborator contract for outbound messages.
pub trait MessageSender {
    fn send(&self, recipient: &str, text: &str) -> Result<DeliveryReceipt, DeliveryError>;
}

/// Sender that prints messages locally instead of reaching a real channel.
///
/// Stands in for the messaging API during local runs of the CLI probe.
pub struct ConsoleSender;

impl MessageSender for ConsoleSender {
    fn send(&self, recipient: &str, text: &str) -> Result<DeliveryReceipt, DeliveryError> {
        let message_id = Uuid::new_v4();
        info!(
            "event=message_send module=gateway status=ok mode=console recipient={recipient} message_id={message_id}"
        );
        println!("[para {recipient}] {text}");
        Ok(DeliveryReceipt {
            message_id,
            recipient: recipient.to_string(),
        })
    }
}
