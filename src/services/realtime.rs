use std::sync::Arc;

use tokio::sync::broadcast;

use crate::models::{auth::AuthenticatedUser, stats::WeeklyStats};

const CHANNEL_CAPACITY: usize = 64;

/// Admin broadcast group: sessions admitted here receive every statistics push.
///
/// Delivery is best-effort. Publishing never waits for receivers, and a session
/// that falls behind skips the messages it missed.
#[derive(Clone)]
pub struct AdminBroadcast {
    tx: broadcast::Sender<Arc<WeeklyStats>>,
}

impl Default for AdminBroadcast {
    fn default() -> Self {
        Self::new()
    }
}

impl AdminBroadcast {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Join the group. The role is checked again here even though the caller
    /// already verified the token; non-admins are refused.
    pub fn admit(&self, user: &AuthenticatedUser) -> Option<broadcast::Receiver<Arc<WeeklyStats>>> {
        if !user.is_admin() {
            tracing::warn!("refusing admin broadcast membership to {} ({})", user.user_id, user.role);
            return None;
        }
        Some(self.tx.subscribe())
    }

    /// Push fresh statistics to every admitted session. Returns how many
    /// sessions were listening; zero is not an error.
    pub fn publish(&self, stats: WeeklyStats) -> usize {
        self.tx.send(Arc::new(stats)).unwrap_or(0)
    }

    pub fn member_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::UserRole;
    use uuid::Uuid;

    fn stats() -> WeeklyStats {
        WeeklyStats { today: Default::default(), weekly: vec![] }
    }

    fn user(role: UserRole) -> AuthenticatedUser {
        AuthenticatedUser { user_id: Uuid::new_v4(), role }
    }

    #[test]
    fn test_publish_without_members_is_fine() {
        let group = AdminBroadcast::new();
        assert_eq!(group.publish(stats()), 0);
    }

    #[test]
    fn test_non_admin_is_not_admitted() {
        let group = AdminBroadcast::new();
        assert!(group.admit(&user(UserRole::User)).is_none());
        assert_eq!(group.member_count(), 0);
    }

    #[tokio::test]
    async fn test_admin_receives_published_stats() {
        let group = AdminBroadcast::new();
        let mut rx = group.admit(&user(UserRole::Admin)).unwrap();
        assert_eq!(group.publish(stats()), 1);
        let received = rx.recv().await.unwrap();
        assert_eq!(*received, stats());
    }
}
