use crate::game::traits::PlayerId;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionRole {
    /// Known address that has not joined yet
    Pending,
    Player,
    Spectator,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub player_id: PlayerId,
    pub player_name: String,
    pub addr: SocketAddr,
    pub role: SessionRole,
    pub last_seen: Instant,
    pub last_ping: Option<Instant>,
    pub ping_count: u32,
}

/// Manages all connected sessions
pub struct SessionManager {
    /// Map from socket address to session
    sessions_by_addr: HashMap<SocketAddr, Session>,
    /// Map from player ID to socket address (for reverse lookup)
    addr_by_player_id: HashMap<PlayerId, SocketAddr>,
    /// Next player ID to assign, players and spectators share the range
    next_player_id: PlayerId,
    /// How long before a session is considered timed out
    timeout_duration: Duration,
}

impl SessionManager {
    pub fn new(timeout_seconds: u64) -> Self {
        Self {
            sessions_by_addr: HashMap::new(),
            addr_by_player_id: HashMap::new(),
            next_player_id: 1,
            timeout_duration: Duration::from_secs(timeout_seconds),
        }
    }

    /// Returns the session for `addr`, creating one with a fresh id if needed.
    /// A known address keeps its id and only has its name refreshed.
    pub fn register(&mut self, addr: SocketAddr, player_name: String) -> &mut Session {
        let next_player_id = &mut self.next_player_id;
        let addr_by_player_id = &mut self.addr_by_player_id;

        let session = self.sessions_by_addr.entry(addr).or_insert_with(|| {
            let player_id = *next_player_id;
            *next_player_id += 1;
            addr_by_player_id.insert(player_id, addr);
            tracing::info!("New session registered: id={}, addr={}", player_id, addr);

            Session {
                player_id,
                player_name: String::new(),
                addr,
                role: SessionRole::Pending,
                last_seen: Instant::now(),
                last_ping: None,
                ping_count: 0,
            }
        });

        session.last_seen = Instant::now();
        session.player_name = player_name;
        session
    }

    pub fn ping(&mut self, addr: &SocketAddr) {
        if let Some(session) = self.sessions_by_addr.get_mut(addr) {
            session.last_ping = Some(Instant::now());
            session.last_seen = Instant::now();
            session.ping_count += 1;
        }
    }

    pub fn update_last_seen(&mut self, addr: &SocketAddr) {
        if let Some(session) = self.sessions_by_addr.get_mut(addr) {
            session.last_seen = Instant::now();
        }
    }

    pub fn get_by_addr(&self, addr: &SocketAddr) -> Option<&Session> {
        self.sessions_by_addr.get(addr)
    }

    pub fn get_by_addr_mut(&mut self, addr: &SocketAddr) -> Option<&mut Session> {
        self.sessions_by_addr.get_mut(addr)
    }

    pub fn get_by_player_id(&self, player_id: PlayerId) -> Option<&Session> {
        self.addr_by_player_id
            .get(&player_id)
            .and_then(|addr| self.sessions_by_addr.get(addr))
    }

    /// Every address that should receive broadcasts.
    pub fn addrs(&self) -> Vec<SocketAddr> {
        self.sessions_by_addr.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.sessions_by_addr.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions_by_addr.is_empty()
    }

    pub fn remove(&mut self, addr: &SocketAddr) -> Option<Session> {
        let session = self.sessions_by_addr.remove(addr)?;
        self.addr_by_player_id.remove(&session.player_id);
        tracing::info!("Session closed: id={}, addr={}", session.player_id, addr);
        Some(session)
    }

    pub fn cleanup_timed_out(&mut self) -> Vec<Session> {
        let now = Instant::now();
        let timeout = self.timeout_duration;

        let timed_out_addrs: Vec<SocketAddr> = self
            .sessions_by_addr
            .iter()
            .filter(|(_, session)| now.duration_since(session.last_seen) > timeout)
            .map(|(addr, _)| *addr)
            .collect();

        let mut removed = Vec::new();
        for addr in timed_out_addrs {
            if let Some(session) = self.remove(&addr) {
                tracing::info!(
                    "Session timed out: id={}, name={}",
                    session.player_id,
                    session.player_name
                );
                removed.push(session);
            }
        }

        removed
    }
}
