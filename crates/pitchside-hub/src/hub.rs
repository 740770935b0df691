use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use pitchside_core::types::{ConnId, RoomKey};
use pitchside_protocol::envelope::Envelope;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, warn};

/// Sending half of a connection's outbound queue. The socket task owns the
/// receiver and writes each frame to the wire in order.
pub type Outbound = mpsc::Sender<String>;

struct Subscriber {
    tx: Outbound,
    rooms: HashSet<RoomKey>,
}

/// Owns connection registration, room membership and fan-out.
///
/// Share one instance per process as `Arc<Hub>`. Membership is kept in two
/// maps (connection -> rooms, room -> connections); no method holds a guard
/// on both at once. Rooms with no members are removed, so an absent key and
/// an empty room are the same thing.
///
/// Delivery is fire-and-forget: frames are pushed with `try_send` and a full
/// or closed queue drops the frame for that connection only.
pub struct Hub {
    connections: DashMap<ConnId, Subscriber>,
    rooms: DashMap<RoomKey, HashSet<ConnId>>,
    seq: AtomicU64,
}

impl Hub {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            rooms: DashMap::new(),
            seq: AtomicU64::new(0),
        }
    }

    /// Register a connection with no room memberships.
    pub fn connect(&self, conn_id: ConnId, tx: Outbound) {
        info!(conn_id = %conn_id, "viewer connected");
        if let Some(old) = self.connections.insert(
            conn_id.clone(),
            Subscriber {
                tx,
                rooms: HashSet::new(),
            },
        ) {
            // id reuse: forget the stale registration's rooms
            warn!(conn_id = %conn_id, "connection id re-registered");
            for room in &old.rooms {
                self.drop_member(room, &conn_id);
            }
        }
    }

    /// Add `room` to the connection's memberships. Idempotent.
    ///
    /// Returns false only when the connection is not registered (already
    /// disconnected), in which case nothing changes.
    pub fn join(&self, conn_id: &ConnId, room: RoomKey) -> bool {
        let newly_joined = match self.connections.get_mut(conn_id) {
            Some(mut sub) => sub.rooms.insert(room.clone()),
            None => {
                warn!(conn_id = %conn_id, room = %room, "join from unknown connection ignored");
                return false;
            }
        };

        if newly_joined {
            self.rooms
                .entry(room.clone())
                .or_default()
                .insert(conn_id.clone());
            debug!(conn_id = %conn_id, room = %room, "joined room");
        }
        true
    }

    /// Remove `room` from the connection's memberships. Idempotent; returns
    /// whether the connection was a member.
    pub fn leave(&self, conn_id: &ConnId, room: &RoomKey) -> bool {
        let was_member = self
            .connections
            .get_mut(conn_id)
            .map(|mut sub| sub.rooms.remove(room))
            .unwrap_or(false);

        if was_member {
            self.drop_member(room, conn_id);
            debug!(conn_id = %conn_id, room = %room, "left room");
        }
        was_member
    }

    /// Forget the connection and every membership it held. Other members are
    /// not notified. Returns the number of rooms the connection was in.
    pub fn disconnect(&self, conn_id: &ConnId) -> usize {
        let Some((_, sub)) = self.connections.remove(conn_id) else {
            return 0;
        };
        for room in &sub.rooms {
            self.drop_member(room, conn_id);
        }
        info!(conn_id = %conn_id, rooms = sub.rooms.len(), "viewer disconnected");
        sub.rooms.len()
    }

    /// Deliver `envelope` to every current member of `room`.
    ///
    /// At most once per member per call. Returns how many queues accepted
    /// the frame; an absent room yields 0.
    pub fn publish(&self, room: &RoomKey, envelope: &Envelope) -> usize {
        let members: Vec<ConnId> = match self.rooms.get(room) {
            Some(set) => set.iter().cloned().collect(),
            None => {
                debug!(room = %room, event = envelope.kind().as_str(), "publish to empty room");
                return 0;
            }
        };

        let Some(frame) = self.encode(envelope) else {
            return 0;
        };

        let mut delivered = 0;
        for conn_id in &members {
            // member may have disconnected since the snapshot
            let Some(sub) = self.connections.get(conn_id) else {
                continue;
            };
            if offer(conn_id, &sub.tx, frame.clone()) {
                delivered += 1;
            }
        }

        debug!(
            room = %room,
            event = envelope.kind().as_str(),
            members = members.len(),
            delivered,
            "room publish"
        );
        delivered
    }

    /// Deliver `envelope` to every connection, ignoring room membership.
    pub fn publish_global(&self, envelope: &Envelope) -> usize {
        let Some(frame) = self.encode(envelope) else {
            return 0;
        };

        let delivered = self
            .connections
            .iter()
            .filter(|entry| offer(entry.key(), &entry.value().tx, frame.clone()))
            .count();

        debug!(event = envelope.kind().as_str(), delivered, "global publish");
        delivered
    }

    /// Route an envelope to its own room, or globally when it has none.
    pub fn dispatch(&self, envelope: &Envelope) -> usize {
        match envelope.room() {
            Some(room) => self.publish(&room, envelope),
            None => self.publish_global(envelope),
        }
    }

    /// Number of connections in `room`. Unknown rooms are empty.
    pub fn room_size(&self, room: &RoomKey) -> usize {
        self.rooms.get(room).map(|set| set.len()).unwrap_or(0)
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Every non-empty room with its member count, sorted by key for
    /// deterministic output.
    pub fn rooms(&self) -> Vec<(RoomKey, usize)> {
        let mut result: Vec<(RoomKey, usize)> = self
            .rooms
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().len()))
            .collect();
        result.sort_by(|a, b| a.0.cmp(&b.0));
        result
    }

    /// Rooms a connection currently belongs to, sorted.
    pub fn memberships(&self, conn_id: &ConnId) -> Vec<RoomKey> {
        let mut rooms: Vec<RoomKey> = self
            .connections
            .get(conn_id)
            .map(|sub| sub.rooms.iter().cloned().collect())
            .unwrap_or_default();
        rooms.sort();
        rooms
    }

    /// Next value of the per-process frame sequence shared by broadcasts and heartbeats.
    pub fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::Relaxed)
    }

    fn encode(&self, envelope: &Envelope) -> Option<String> {
        let frame = envelope.to_frame().with_seq(self.next_seq());
        match serde_json::to_string(&frame) {
            Ok(json) => Some(json),
            Err(e) => {
                warn!(event = envelope.kind().as_str(), error = %e, "envelope serialization failed");
                None
            }
        }
    }

    fn drop_member(&self, room: &RoomKey, conn_id: &ConnId) {
        if let Some(mut members) = self.rooms.get_mut(room) {
            members.remove(conn_id);
        }
        self.rooms.remove_if(room, |_, members| members.is_empty());
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new()
    }
}

/// Push one frame without waiting. Failures are dropped.
fn offer(conn_id: &ConnId, tx: &Outbound, frame: String) -> bool {
    match tx.try_send(frame) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            debug!(conn_id = %conn_id, "outbound queue full, frame dropped");
            false
        }
        Err(TrySendError::Closed(_)) => {
            debug!(conn_id = %conn_id, "outbound queue closed, frame dropped");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitchside_core::types::SubjectId;
    use serde_json::{json, Value};
    use tokio::sync::mpsc::Receiver;

    fn attach(hub: &Hub, id: &str) -> (ConnId, Receiver<String>) {
        let (tx, rx) = mpsc::channel(16);
        let conn_id = ConnId::from(id);
        hub.connect(conn_id.clone(), tx);
        (conn_id, rx)
    }

    fn drain(rx: &mut Receiver<String>) -> Vec<Value> {
        let mut frames = Vec::new();
        while let Ok(text) = rx.try_recv() {
            frames.push(serde_json::from_str(&text).expect("frame is json"));
        }
        frames
    }

    fn score(match_id: u64) -> Envelope {
        Envelope::score_update(SubjectId::from(match_id), json!({"home": 1, "away": 0}))
    }

    #[test]
    fn join_then_leave_restores_room_size() {
        let hub = Hub::new();
        let (a, _rx_a) = attach(&hub, "a");
        let (b, _rx_b) = attach(&hub, "b");
        let room = RoomKey::from("match_1");

        hub.join(&a, room.clone());
        let before = hub.room_size(&room);

        hub.join(&b, room.clone());
        assert_eq!(hub.room_size(&room), before + 1);
        hub.leave(&b, &room);
        assert_eq!(hub.room_size(&room), before);
    }

    #[test]
    fn join_is_idempotent() {
        let hub = Hub::new();
        let (a, mut rx) = attach(&hub, "a");
        let room = RoomKey::from("match_1");

        assert!(hub.join(&a, room.clone()));
        assert!(hub.join(&a, room.clone()));
        assert_eq!(hub.room_size(&room), 1);

        hub.publish(&room, &score(1));
        assert_eq!(drain(&mut rx).len(), 1);
    }

    #[test]
    fn leave_without_membership_is_a_noop() {
        let hub = Hub::new();
        let (a, _rx) = attach(&hub, "a");
        assert!(!hub.leave(&a, &RoomKey::from("match_1")));
        assert!(!hub.leave(&ConnId::from("ghost"), &RoomKey::from("match_1")));
        assert_eq!(hub.room_size(&RoomKey::from("match_1")), 0);
    }

    #[test]
    fn empty_rooms_disappear() {
        let hub = Hub::new();
        let (a, _rx) = attach(&hub, "a");
        let room = RoomKey::from("league_2");

        hub.join(&a, room.clone());
        assert_eq!(hub.rooms(), vec![(room.clone(), 1)]);
        hub.leave(&a, &room);
        assert!(hub.rooms().is_empty());
    }

    #[test]
    fn publish_to_empty_room_delivers_nothing() {
        let hub = Hub::new();
        let (_a, mut rx) = attach(&hub, "a");

        assert_eq!(hub.publish(&RoomKey::from("match_999"), &score(999)), 0);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn publish_reaches_each_member_exactly_once() {
        let hub = Hub::new();
        let (a, mut rx_a) = attach(&hub, "a");
        let (b, mut rx_b) = attach(&hub, "b");
        let (_c, mut rx_c) = attach(&hub, "c");
        let room = RoomKey::from("match_5");
        hub.join(&a, room.clone());
        hub.join(&b, room.clone());

        assert_eq!(hub.publish(&room, &score(5)), 2);

        let got_a = drain(&mut rx_a);
        let got_b = drain(&mut rx_b);
        assert_eq!(got_a.len(), 1);
        assert_eq!(got_b.len(), 1);
        assert_eq!(got_a[0]["event"], "score_update");
        assert_eq!(got_a[0]["payload"]["matchId"], 5);
        assert!(drain(&mut rx_c).is_empty(), "non-member must not receive");
    }

    #[test]
    fn disconnect_clears_every_membership() {
        let hub = Hub::new();
        let (a, _rx_a) = attach(&hub, "a");
        let (b, _rx_b) = attach(&hub, "b");
        let r1 = RoomKey::from("match_1");
        let r2 = RoomKey::from("league_1");
        for room in [&r1, &r2] {
            hub.join(&a, room.clone());
            hub.join(&b, room.clone());
        }
        let (s1, s2) = (hub.room_size(&r1), hub.room_size(&r2));

        assert_eq!(hub.disconnect(&a), 2);

        assert_eq!(hub.room_size(&r1), s1 - 1);
        assert_eq!(hub.room_size(&r2), s2 - 1);
        assert_eq!(hub.connection_count(), 1);
        assert!(hub.memberships(&a).is_empty());
        assert!(!hub.join(&a, r1.clone()), "disconnected id cannot rejoin");
    }

    #[test]
    fn global_publish_ignores_membership() {
        let hub = Hub::new();
        let (a, mut rx_a) = attach(&hub, "a");
        let (_b, mut rx_b) = attach(&hub, "b");
        hub.join(&a, RoomKey::from("match_1"));

        let news = Envelope::new_news(json!({"title": "Transfer window opens"}));
        assert_eq!(hub.dispatch(&news), 2);

        for rx in [&mut rx_a, &mut rx_b] {
            let frames = drain(rx);
            assert_eq!(frames.len(), 1);
            assert_eq!(frames[0]["event"], "new_news");
        }
    }

    #[test]
    fn closed_receiver_does_not_block_other_members() {
        let hub = Hub::new();
        let (a, rx_a) = attach(&hub, "a");
        let (b, mut rx_b) = attach(&hub, "b");
        let room = RoomKey::from("match_3");
        hub.join(&a, room.clone());
        hub.join(&b, room.clone());
        drop(rx_a);

        assert_eq!(hub.publish(&room, &score(3)), 1);
        assert_eq!(drain(&mut rx_b).len(), 1);
    }

    #[test]
    fn full_queue_drops_the_frame_for_that_connection_only() {
        let hub = Hub::new();
        let (slow_tx, mut slow_rx) = mpsc::channel(1);
        let slow = ConnId::from("slow");
        hub.connect(slow.clone(), slow_tx);
        let (fast, mut fast_rx) = attach(&hub, "fast");
        let room = RoomKey::from("match_8");
        hub.join(&slow, room.clone());
        hub.join(&fast, room.clone());

        hub.publish(&room, &score(8));
        hub.publish(&room, &score(8));

        assert_eq!(drain(&mut slow_rx).len(), 1);
        assert_eq!(drain(&mut fast_rx).len(), 2);
    }

    #[test]
    fn frames_are_sequenced_in_publish_order() {
        let hub = Hub::new();
        let (a, mut rx) = attach(&hub, "a");
        let room = RoomKey::from("match_4");
        hub.join(&a, room.clone());

        hub.publish(&room, &score(4));
        hub.publish(
            &room,
            &Envelope::match_status_change(SubjectId::from(4u64), json!("finished")),
        );

        let frames = drain(&mut rx);
        assert_eq!(frames[0]["event"], "score_update");
        assert_eq!(frames[1]["event"], "match_status_change");
        assert!(frames[0]["seq"].as_u64() < frames[1]["seq"].as_u64());
    }

    #[tokio::test]
    async fn concurrent_joins_from_many_tasks() {
        let hub = std::sync::Arc::new(Hub::new());
        let room = RoomKey::from("match_10");
        let mut receivers = Vec::new();
        let mut handles = Vec::new();

        for i in 0..32 {
            let (tx, rx) = mpsc::channel(4);
            receivers.push(rx);
            let hub = hub.clone();
            let room = room.clone();
            handles.push(tokio::spawn(async move {
                let id = ConnId::from(format!("conn-{i}").as_str());
                hub.connect(id.clone(), tx);
                hub.join(&id, room);
            }));
        }
        for handle in handles {
            handle.await.expect("join task panicked");
        }

        assert_eq!(hub.room_size(&room), 32);
        assert_eq!(hub.publish(&room, &score(10)), 32);
        for rx in receivers.iter_mut() {
            assert!(rx.recv().await.is_some());
        }
    }
}
