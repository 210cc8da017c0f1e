/// Transport state. See [`crate::player::Player::state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    Stopped,
    Playing,
    Paused,
}

impl Default for PlayState {
    fn default() -> Self {
        PlayState::Stopped
    }
}
