//! The activation gate — a per-user on/off switch.
//!
//! Two states per user: Inactive (the default for unseen users) and Active.
//! Only the control tokens flip the switch; nothing expires by time. The
//! gate is consulted before any other processing and short-circuits every
//! non-control message from an inactive user.

use std::collections::HashSet;

use cascata_core::message::UserId;
use tokio::sync::RwLock;
use tracing::debug;

/// Membership set of currently active users. All operations are idempotent.
pub struct ActivationGate {
    active: RwLock<HashSet<UserId>>,
}

impl ActivationGate {
    pub fn new() -> Self {
        Self {
            active: RwLock::new(HashSet::new()),
        }
    }

    /// Whether the user's messages should reach the orchestrator.
    pub async fn is_active(&self, user: &UserId) -> bool {
        self.active.read().await.contains(user)
    }

    /// Mark the user active. A no-op if already active.
    pub async fn activate(&self, user: &UserId) {
        if self.active.write().await.insert(user.clone()) {
            debug!(user = %user, "User activated");
        }
    }

    /// Mark the user inactive. A no-op if already inactive.
    pub async fn deactivate(&self, user: &UserId) {
        if self.active.write().await.remove(user) {
            debug!(user = %user, "User deactivated");
        }
    }

    /// How many users are currently active.
    pub async fn active_count(&self) -> usize {
        self.active.read().await.len()
    }
}

impl Default for ActivationGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> UserId {
        UserId::new(id)
    }

    #[tokio::test]
    async fn unseen_users_start_inactive() {
        let gate = ActivationGate::new();
        assert!(!gate.is_active(&user("alice")).await);
    }

    #[tokio::test]
    async fn activate_then_deactivate() {
        let gate = ActivationGate::new();
        let u = user("alice");

        gate.activate(&u).await;
        assert!(gate.is_active(&u).await);

        gate.deactivate(&u).await;
        assert!(!gate.is_active(&u).await);
    }

    #[tokio::test]
    async fn activation_is_idempotent() {
        let gate = ActivationGate::new();
        let u = user("alice");

        gate.activate(&u).await;
        gate.activate(&u).await;
        assert!(gate.is_active(&u).await);
        assert_eq!(gate.active_count().await, 1);

        // One deactivation undoes any number of activations.
        gate.deactivate(&u).await;
        assert!(!gate.is_active(&u).await);
    }

    #[tokio::test]
    async fn deactivating_an_inactive_user_is_a_noop() {
        let gate = ActivationGate::new();
        let u = user("alice");

        gate.deactivate(&u).await;
        gate.deactivate(&u).await;
        assert!(!gate.is_active(&u).await);
        assert_eq!(gate.active_count().await, 0);
    }

    #[tokio::test]
    async fn users_are_independent() {
        let gate = ActivationGate::new();
        gate.activate(&user("alice")).await;

        assert!(gate.is_active(&user("alice")).await);
        assert!(!gate.is_active(&user("bob")).await);
    }
}
