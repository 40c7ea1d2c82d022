use crate::{
    gateway::GameRecord,
    session::WalletSession,
};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Player1,
    Player2,
    Spectator,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Player1 => "player 1",
            Role::Player2 => "player 2",
            Role::Spectator => "spectator",
        };
        write!(f, "{name}")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Active,
    Waiting,
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GameStatus::Active => "active",
            GameStatus::Waiting => "waiting",
        };
        write!(f, "{name}")
    }
}

/// Display facts derived from one game record and the current session.
/// Recomputed on every new record or session change; nothing is cached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameView {
    pub role: Role,
    pub is_my_turn: bool,
    pub status: GameStatus,
}

pub fn derive_view(record: &GameRecord, session: &WalletSession) -> GameView {
    let address = session.address();
    let role = match address {
        Some(addr) if *addr == record.player1 => Role::Player1,
        Some(addr) if record.player2.as_ref() == Some(addr) => Role::Player2,
        _ => Role::Spectator,
    };
    let is_my_turn = address.is_some_and(|addr| *addr == record.current_turn);
    let status = if record.is_active {
        GameStatus::Active
    } else {
        GameStatus::Waiting
    };
    GameView {
        role,
        is_my_turn,
        status,
    }
}
