//! Live dashboard fan-out.
//!
//! Every dashboard connection registers once and gets a bounded queue. It then
//! joins one or more groups: the group of an event, or the global monitor
//! group. Publishing for an event delivers to the union of both groups, so a
//! connection that joined both still receives one copy per publish.
//!
//! Delivery is best-effort and at-most-once. A full queue drops the update for
//! that subscriber. A closed queue is pruned from the registry. Nothing is
//! persisted or replayed; dashboards re-read full counts when they (re)join.

use std::collections::{HashMap, HashSet};
use tokio::sync::{mpsc, RwLock};
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::models::attendance::{AttendanceUpdate, GroupKey};
use crate::error::AppError;

pub type ConnectionId = Uuid;

#[derive(Default)]
struct Registry {
    connections: HashMap<ConnectionId, mpsc::Sender<AttendanceUpdate>>,
    groups: HashMap<GroupKey, HashSet<ConnectionId>>,
}

impl Registry {
    fn remove_connection(&mut self, id: &ConnectionId) -> bool {
        let existed = self.connections.remove(id).is_some();
        self.groups.retain(|_, members| {
            members.remove(id);
            !members.is_empty()
        });
        existed
    }
}

pub struct AttendanceHub {
    registry: RwLock<Registry>,
    buffer: usize,
}

impl AttendanceHub {
    pub fn new(buffer: usize) -> Self {
        Self {
            registry: RwLock::new(Registry::default()),
            buffer: buffer.max(1),
        }
    }

    /// Registers a new connection and hands back its receiving end.
    pub async fn connect(&self) -> (ConnectionId, mpsc::Receiver<AttendanceUpdate>) {
        let (tx, rx) = mpsc::channel(self.buffer);
        let id = Uuid::new_v4();
        self.registry.write().await.connections.insert(id, tx);
        debug!(connection_id = %id, "Dashboard connection registered");
        (id, rx)
    }

    /// Adds a connection to a group. Joining twice is a no-op.
    pub async fn join(&self, connection_id: ConnectionId, group: GroupKey) -> Result<(), AppError> {
        let mut registry = self.registry.write().await;
        if !registry.connections.contains_key(&connection_id) {
            return Err(AppError::NotFound("Connection not registered".into()));
        }
        info!(connection_id = %connection_id, group = %group, "Dashboard joined group");
        registry.groups.entry(group).or_default().insert(connection_id);
        Ok(())
    }

    pub async fn leave(&self, connection_id: ConnectionId, group: &GroupKey) -> bool {
        let mut registry = self.registry.write().await;
        let Some(members) = registry.groups.get_mut(group) else {
            return false;
        };
        let removed = members.remove(&connection_id);
        if members.is_empty() {
            registry.groups.remove(group);
        }
        removed
    }

    /// Connection teardown: drops the queue and every group membership.
    pub async fn disconnect(&self, connection_id: ConnectionId) {
        if self.registry.write().await.remove_connection(&connection_id) {
            debug!(connection_id = %connection_id, "Dashboard connection removed");
        }
    }

    /// Fans `update` out to the event group and the global group.
    ///
    /// Returns how many subscribers accepted the update.
    pub async fn publish(&self, event_id: &str, update: AttendanceUpdate) -> usize {
        let event_group = GroupKey::event(event_id);
        let mut delivered = 0;
        let mut closed = Vec::new();

        {
            let registry = self.registry.read().await;
            let targets: HashSet<&ConnectionId> = [&event_group, &GroupKey::Global]
                .into_iter()
                .filter_map(|key| registry.groups.get(key))
                .flatten()
                .collect();

            for id in targets {
                let Some(tx) = registry.connections.get(id) else { continue };
                match tx.try_send(update.clone()) {
                    Ok(()) => delivered += 1,
                    Err(TrySendError::Full(_)) => {
                        debug!(connection_id = %id, "Dashboard queue full, update dropped");
                    }
                    Err(TrySendError::Closed(_)) => closed.push(*id),
                }
            }
        }

        if !closed.is_empty() {
            let mut registry = self.registry.write().await;
            for id in &closed {
                registry.remove_connection(id);
            }
            debug!(pruned = closed.len(), "Pruned closed dashboard connections");
        }

        debug!(event_id = %event_id, delivered, "Attendance update published");
        delivered
    }

    pub async fn group_size(&self, group: &GroupKey) -> usize {
        self.registry.read().await.groups.get(group).map_or(0, HashSet::len)
    }

    pub async fn connection_count(&self) -> usize {
        self.registry.read().await.connections.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(event_id: &str, count: i64) -> AttendanceUpdate {
        AttendanceUpdate {
            attended_count: count,
            event_id: event_id.to_string(),
            event_name: "Gala".to_string(),
            guest_id: "g1".to_string(),
            guest_name: "Alice".to_string(),
            delta: 1,
            time_label: "Just now".to_string(),
        }
    }

    #[tokio::test]
    async fn test_publish_reaches_event_group_and_global_monitor() {
        let hub = AttendanceHub::new(8);
        let (door, mut door_rx) = hub.connect().await;
        let (monitor, mut monitor_rx) = hub.connect().await;
        let (other, mut other_rx) = hub.connect().await;

        hub.join(door, GroupKey::event("e1")).await.unwrap();
        hub.join(monitor, GroupKey::Global).await.unwrap();
        hub.join(other, GroupKey::event("e2")).await.unwrap();

        let delivered = hub.publish("e1", update("e1", 3)).await;
        assert_eq!(delivered, 2);

        assert_eq!(door_rx.try_recv().unwrap().attended_count, 3);
        assert_eq!(monitor_rx.try_recv().unwrap().event_id, "e1");
        assert!(other_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_member_of_both_groups_receives_single_copy() {
        let hub = AttendanceHub::new(8);
        let (conn, mut rx) = hub.connect().await;
        hub.join(conn, GroupKey::event("e1")).await.unwrap();
        hub.join(conn, GroupKey::Global).await.unwrap();

        assert_eq!(hub.publish("e1", update("e1", 1)).await, 1);
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_join_requires_registered_connection() {
        let hub = AttendanceHub::new(8);
        let result = hub.join(Uuid::new_v4(), GroupKey::Global).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_disconnect_removes_all_memberships() {
        let hub = AttendanceHub::new(8);
        let (conn, _rx) = hub.connect().await;
        hub.join(conn, GroupKey::event("e1")).await.unwrap();
        hub.join(conn, GroupKey::Global).await.unwrap();

        hub.disconnect(conn).await;

        assert_eq!(hub.connection_count().await, 0);
        assert_eq!(hub.group_size(&GroupKey::event("e1")).await, 0);
        assert_eq!(hub.group_size(&GroupKey::Global).await, 0);
    }

    #[tokio::test]
    async fn test_dropped_receiver_is_pruned_on_publish() {
        let hub = AttendanceHub::new(8);
        let (conn, rx) = hub.connect().await;
        hub.join(conn, GroupKey::Global).await.unwrap();
        drop(rx);

        assert_eq!(hub.publish("e1", update("e1", 1)).await, 0);
        assert_eq!(hub.connection_count().await, 0);
    }

    #[tokio::test]
    async fn test_full_queue_drops_update_without_blocking() {
        let hub = AttendanceHub::new(1);
        let (conn, mut rx) = hub.connect().await;
        hub.join(conn, GroupKey::event("e1")).await.unwrap();

        assert_eq!(hub.publish("e1", update("e1", 1)).await, 1);
        assert_eq!(hub.publish("e1", update("e1", 2)).await, 0);

        assert_eq!(rx.try_recv().unwrap().attended_count, 1);
        assert!(rx.try_recv().is_err());
        // Slow subscriber stays registered
        assert_eq!(hub.connection_count().await, 1);
    }

    #[tokio::test]
    async fn test_leave_only_affects_named_group() {
        let hub = AttendanceHub::new(8);
        let (conn, mut rx) = hub.connect().await;
        hub.join(conn, GroupKey::event("e1")).await.unwrap();
        hub.join(conn, GroupKey::Global).await.unwrap();

        assert!(hub.leave(conn, &GroupKey::event("e1")).await);
        assert!(!hub.leave(conn, &GroupKey::event("e1")).await);

        assert_eq!(hub.publish("e1", update("e1", 1)).await, 1);
        assert!(rx.try_recv().is_ok());
    }
}
