//! Delivery channels for staff notifications, in dispatch priority order:
//! direct messaging API, transactional email, deep-link handoff.

pub mod deep_link;
pub mod direct;
pub mod email;

use async_trait::async_trait;

use crate::{
    error::ChannelError,
    models::{outcome::ChannelDelivery, request::NotificationRequest},
};

#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Tag used in logs.
    fn name(&self) -> &'static str;

    /// Local check only; must not touch the network.
    fn is_configured(&self) -> bool;

    /// One delivery attempt. Makes at most one outward call to the
    /// channel's backing service.
    async fn send(&self, request: &NotificationRequest) -> Result<ChannelDelivery, ChannelError>;
}
