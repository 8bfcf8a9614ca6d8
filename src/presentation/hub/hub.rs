//! Hub Connection Registry
//!
//! Tracks live websocket connections and routes server frames to them.
//!
//! Every connection owns an unbounded mpsc sender; the socket's writer
//! task drains the receiving end. Routing a frame to a student is just a
//! channel send, so no socket I/O ever happens while a registry entry is
//! held. The maps are DashMaps, safe to touch from any task without an
//! outer lock.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;

use super::messages::ServerFrame;
use crate::infrastructure::metrics;

/// A registered hub connection.
pub struct HubConnection {
    pub student_id: i64,
    pub connection_id: String,
    pub sender: mpsc::UnboundedSender<ServerFrame>,
}

/// Shared connection registry for the chat hub.
pub struct ChatHub {
    /// connection id -> connection
    connections: DashMap<String, Arc<HubConnection>>,
    /// student id -> connection ids (a student may have several devices)
    student_connections: DashMap<i64, Vec<String>>,
}

impl ChatHub {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            student_connections: DashMap::new(),
        }
    }

    /// Register an authenticated connection.
    pub fn register(
        &self,
        connection_id: String,
        student_id: i64,
        sender: mpsc::UnboundedSender<ServerFrame>,
    ) {
        let connection = Arc::new(HubConnection {
            student_id,
            connection_id: connection_id.clone(),
            sender,
        });

        self.connections.insert(connection_id.clone(), connection);
        self.student_connections
            .entry(student_id)
            .or_default()
            .push(connection_id.clone());

        let count = self.connections.len() as i64;
        metrics::set_hub_connections(count, count);

        tracing::info!(student_id, connection_id = %connection_id, "Hub connection registered");
    }

    /// Remove a connection. Returns true if this was the student's last one.
    pub fn unregister(&self, connection_id: &str) -> bool {
        let mut last_for_student = false;

        if let Some((_, connection)) = self.connections.remove(connection_id) {
            if let Some(mut ids) = self.student_connections.get_mut(&connection.student_id) {
                ids.retain(|id| id != connection_id);
                last_for_student = ids.is_empty();
            }
            if last_for_student {
                self.student_connections.remove(&connection.student_id);
            }

            tracing::info!(
                student_id = connection.student_id,
                connection_id = %connection_id,
                "Hub connection unregistered"
            );
        }

        let count = self.connections.len() as i64;
        metrics::set_hub_connections(count, count);

        last_for_student
    }

    /// Send a frame to every connection of a student.
    /// Silently drops frames for offline students.
    pub fn send_to_student(&self, student_id: i64, frame: ServerFrame) {
        if let Some(connection_ids) = self.student_connections.get(&student_id) {
            for connection_id in connection_ids.value() {
                if let Some(connection) = self.connections.get(connection_id) {
                    let _ = connection.sender.send(frame.clone());
                }
            }
        }
    }

    /// Send a frame to both participants of a match.
    pub fn send_to_pair(&self, first: i64, second: i64, frame: ServerFrame) {
        self.send_to_student(first, frame.clone());
        self.send_to_student(second, frame);
    }

    pub fn is_online(&self, student_id: i64) -> bool {
        self.student_connections
            .get(&student_id)
            .map(|ids| !ids.is_empty())
            .unwrap_or(false)
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

impl Default for ChatHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> ServerFrame {
        ServerFrame::MatchClosed {
            match_id: "1".into(),
        }
    }

    #[test]
    fn test_register_and_route() {
        let hub = ChatHub::new();
        let (tx, mut rx) = mpsc::unbounded_channel();

        hub.register("conn-1".into(), 10, tx);
        assert!(hub.is_online(10));
        assert_eq!(hub.connection_count(), 1);

        hub.send_to_student(10, frame());
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn test_offline_send_is_dropped() {
        let hub = ChatHub::new();
        // No connection for student 99; must not panic
        hub.send_to_student(99, frame());
        assert!(!hub.is_online(99));
    }

    #[test]
    fn test_multi_device_fanout() {
        let hub = ChatHub::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();

        hub.register("conn-1".into(), 10, tx1);
        hub.register("conn-2".into(), 10, tx2);

        hub.send_to_student(10, frame());
        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_ok());
    }

    #[test]
    fn test_unregister_reports_last_connection() {
        let hub = ChatHub::new();
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();

        hub.register("conn-1".into(), 10, tx1);
        hub.register("conn-2".into(), 10, tx2);

        assert!(!hub.unregister("conn-1"));
        assert!(hub.unregister("conn-2"));
        assert!(!hub.is_online(10));
    }
}
