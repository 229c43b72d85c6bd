use serde::{Deserialize, Serialize};

/// Identity of a connected client, issued by the auth layer.
pub type ClientKey = String;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClientRole {
    #[default]
    Player,
    /// Bots may sit in any number of matches at once.
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientProfile {
    pub client_key: ClientKey,
    pub elo: i32,
    pub win_streak: i32,
    pub loss_streak: i32,
}

impl ClientProfile {
    pub fn new(client_key: &str, elo: i32) -> Self {
        ClientProfile {
            client_key: client_key.to_string(),
            elo,
            win_streak: 0,
            loss_streak: 0,
        }
    }
}
