//! Player seats and per-seat storage.
//!
//! ## PlayerId
//!
//! A billiard match always has exactly two seats. `PlayerId(0)` is the first
//! registered player, `PlayerId(1)` the second.
//!
//! ## PlayerMap
//!
//! Fixed two-entry storage indexed by `PlayerId`.
//!
//! ## Token
//!
//! Opaque capability credential handed to a player when a match starts.
//! Submissions must present it; its value never appears in `Debug` output.

use std::fmt;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

/// Seat of a player in a two-player match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(u8);

impl PlayerId {
    pub const FIRST: PlayerId = PlayerId(0);
    pub const SECOND: PlayerId = PlayerId(1);

    /// Create a player ID from a seat index (0 or 1).
    #[must_use]
    pub const fn new(seat: u8) -> Self {
        assert!(seat < 2, "A match has exactly two seats");
        Self(seat)
    }

    /// Seat index (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The opponent's seat.
    #[must_use]
    pub const fn other(self) -> Self {
        Self(1 - self.0)
    }

    /// Both seats in order.
    pub fn both() -> impl Iterator<Item = PlayerId> {
        [Self::FIRST, Self::SECOND].into_iter()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {}", self.0 + 1)
    }
}

/// Per-seat data storage.
///
/// ```
/// use billiard_table::core::{PlayerId, PlayerMap};
///
/// let mut left: PlayerMap<u8> = PlayerMap::with_value(7);
/// left[PlayerId::SECOND] = 5;
///
/// assert_eq!(left[PlayerId::FIRST], 7);
/// assert_eq!(left[PlayerId::FIRST.other()], 5);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerMap<T> {
    data: [T; 2],
}

impl<T> PlayerMap<T> {
    /// Create from a factory receiving each seat.
    pub fn new(factory: impl Fn(PlayerId) -> T) -> Self {
        Self {
            data: [factory(PlayerId::FIRST), factory(PlayerId::SECOND)],
        }
    }

    /// Create from the two values in seat order.
    pub fn from_pair(first: T, second: T) -> Self {
        Self {
            data: [first, second],
        }
    }

    pub fn with_value(value: T) -> Self
    where
        T: Clone,
    {
        Self::new(|_| value.clone())
    }

    /// Iterate over (PlayerId, &T) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &T)> {
        PlayerId::both().zip(self.data.iter())
    }

    /// Iterate over (PlayerId, &mut T) pairs.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (PlayerId, &mut T)> {
        PlayerId::both().zip(self.data.iter_mut())
    }

    /// Seat whose entry satisfies `pred`, first seat first.
    pub fn find(&self, pred: impl Fn(&T) -> bool) -> Option<PlayerId> {
        self.iter().find(|(_, v)| pred(v)).map(|(p, _)| p)
    }
}

impl<T> Index<PlayerId> for PlayerMap<T> {
    type Output = T;

    fn index(&self, player: PlayerId) -> &Self::Output {
        &self.data[player.index()]
    }
}

impl<T> IndexMut<PlayerId> for PlayerMap<T> {
    fn index_mut(&mut self, player: PlayerId) -> &mut Self::Output {
        &mut self.data[player.index()]
    }
}

/// Capability token identifying a player for the duration of a match.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Raw value, for handing to the owning client only.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_basics() {
        assert_eq!(PlayerId::FIRST.index(), 0);
        assert_eq!(PlayerId::SECOND.index(), 1);
        assert_eq!(PlayerId::FIRST.other(), PlayerId::SECOND);
        assert_eq!(PlayerId::SECOND.other(), PlayerId::FIRST);
        assert_eq!(format!("{}", PlayerId::FIRST), "Player 1");
    }

    #[test]
    #[should_panic(expected = "exactly two seats")]
    fn test_player_id_third_seat() {
        let _ = PlayerId::new(2);
    }

    #[test]
    fn test_player_map_new() {
        let map = PlayerMap::new(|p| p.index() * 10);

        assert_eq!(map[PlayerId::FIRST], 0);
        assert_eq!(map[PlayerId::SECOND], 10);
    }

    #[test]
    fn test_player_map_mutation_and_find() {
        let mut map = PlayerMap::from_pair("a", "b");
        map[PlayerId::SECOND] = "c";

        assert_eq!(map.find(|v| *v == "c"), Some(PlayerId::SECOND));
        assert_eq!(map.find(|v| *v == "b"), None);
    }

    #[test]
    fn test_player_map_iter() {
        let map = PlayerMap::new(|p| p.index());
        let pairs: Vec<_> = map.iter().collect();

        assert_eq!(pairs, vec![(PlayerId::FIRST, &0), (PlayerId::SECOND, &1)]);
    }

    #[test]
    fn test_token_debug_is_redacted() {
        let token = Token::new("secret-value");
        assert_eq!(format!("{token:?}"), "Token(..)");
        assert_eq!(token.as_str(), "secret-value");
    }
}
