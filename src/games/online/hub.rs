//! In-process match coordinator.
//!
//! `MatchHub` pairs the first two requesters and hosts their `MatchState`.
//! Each table talks to it through its own `HubSeat`.
//!
//! ```
//! use billiard_table::core::TableConfig;
//! use billiard_table::games::online::{GameReply, GameRequest, MatchCoordinator, MatchHub};
//!
//! let hub = MatchHub::new(TableConfig::default());
//! let (a, b) = (hub.seat(), hub.seat());
//! let request = |name: &str| GameRequest { player: name.into(), team: "T".into(), opponent: None };
//!
//! assert_eq!(a.request_game(&request("Ada")).unwrap(), GameReply::Opened);
//! assert!(matches!(b.request_game(&request("Bob")).unwrap(), GameReply::Found(_)));
//! ```

use std::sync::{Arc, Mutex, MutexGuard};

use super::coordinator::{
    BreakDecision, BreakStatus, GameReply, GameRequest, MatchCoordinator, PlayDecision, PlayReply, PollStatus,
    TurnUpdate,
};
use crate::core::{BallSnapshot, GameRng, PlayerId, TableConfig, Token};
use crate::error::CoordinatorError;
use crate::rules::{MatchState, Phase, Shootout};

#[derive(Debug)]
struct Lobby {
    config: TableConfig,
    rng: GameRng,
    waiting: Option<GameRequest>,
    game: Option<MatchState>,
    aborted: bool,
    /// Bumped each time a game is opened. Seats from older games are stale.
    generation: u64,
}

impl Lobby {
    fn game(&self) -> Result<&MatchState, CoordinatorError> {
        self.game.as_ref().ok_or(CoordinatorError::Ended)
    }

    /// Drop a finished match so the tables can pair again.
    fn clear_finished(&mut self) -> Result<(), CoordinatorError> {
        match &self.game {
            Some(game) if !game.is_over() => {
                Err(CoordinatorError::Rejected("the hub already hosts a game".into()))
            }
            Some(_) => {
                log::debug!("clearing finished match");
                self.game = None;
                self.aborted = false;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

#[derive(Debug)]
struct Identity {
    seat: PlayerId,
    token: Option<Token>,
    generation: u64,
}

/// Shared match host for two tables.
#[derive(Clone, Debug)]
pub struct MatchHub {
    lobby: Arc<Mutex<Lobby>>,
}

impl MatchHub {
    #[must_use]
    pub fn new(config: TableConfig) -> Self {
        let rng = GameRng::new(config.seed);
        Self {
            lobby: Arc::new(Mutex::new(Lobby {
                config,
                rng,
                waiting: None,
                game: None,
                aborted: false,
                generation: 0,
            })),
        }
    }

    /// A fresh handle for one table.
    #[must_use]
    pub fn seat(&self) -> HubSeat {
        HubSeat {
            lobby: Arc::clone(&self.lobby),
            identity: Mutex::new(None),
        }
    }

    /// Snapshot of the hosted match.
    pub fn game(&self) -> Result<Option<MatchState>, CoordinatorError> {
        Ok(lock(&self.lobby)?.game.clone())
    }
}

/// One table's handle on a `MatchHub`. Holds the seat's capability token
/// once the game is paired.
#[derive(Debug)]
pub struct HubSeat {
    lobby: Arc<Mutex<Lobby>>,
    identity: Mutex<Option<Identity>>,
}

impl HubSeat {
    /// Seat taken in the match, once requested.
    pub fn seat(&self) -> Result<Option<PlayerId>, CoordinatorError> {
        Ok(lock(&self.identity)?.as_ref().map(|identity| identity.seat))
    }

    /// Seat and token. Fetches the token from the match on first use.
    fn credentials(&self, lobby: &Lobby) -> Result<(PlayerId, Token), CoordinatorError> {
        let mut identity = lock(&self.identity)?;
        let Some(identity) = identity.as_mut() else {
            return Err(CoordinatorError::Rejected("no game requested".into()));
        };
        if identity.generation != lobby.generation {
            return Err(CoordinatorError::Ended);
        }
        if identity.token.is_none() {
            identity.token = Some(lobby.game()?.player(identity.seat).token.clone());
        }
        match &identity.token {
            Some(token) => Ok((identity.seat, token.clone())),
            None => Err(CoordinatorError::Rejected("no game requested".into())),
        }
    }

    fn take_seat(&self, seat: PlayerId, token: Option<Token>, generation: u64) -> Result<(), CoordinatorError> {
        *lock(&self.identity)? = Some(Identity {
            seat,
            token,
            generation,
        });
        Ok(())
    }
}

impl MatchCoordinator for HubSeat {
    fn request_game(&self, request: &GameRequest) -> Result<GameReply, CoordinatorError> {
        let mut lobby = lock(&self.lobby)?;
        lobby.clear_finished()?;

        let Some(first) = lobby.waiting.take() else {
            log::info!("{} opened a game", request.player);
            lobby.waiting = Some(request.clone());
            lobby.aborted = false;
            lobby.generation += 1;
            self.take_seat(PlayerId::FIRST, None, lobby.generation)?;
            return Ok(GameReply::Opened);
        };

        let Lobby { config, rng, .. } = &mut *lobby;
        let game = MatchState::start(
            (first.player, first.team),
            (request.player.clone(), request.team.clone()),
            config,
            rng,
        );
        let token = game.player(PlayerId::SECOND).token.clone();
        let shootout = game.shootout().clone();
        lobby.game = Some(game);
        self.take_seat(PlayerId::SECOND, Some(token), lobby.generation)?;
        Ok(GameReply::Found(shootout))
    }

    fn poll_reply(&self) -> Result<PollStatus<Shootout>, CoordinatorError> {
        let lobby = lock(&self.lobby)?;
        let stale = lock(&self.identity)?
            .as_ref()
            .is_some_and(|identity| identity.generation != lobby.generation);
        if lobby.aborted || stale {
            return Ok(PollStatus::Gone);
        }
        match &lobby.game {
            Some(game) => Ok(PollStatus::Advance(game.shootout().clone())),
            None => Ok(PollStatus::Waiting),
        }
    }

    fn submit_break(&self, snapshot: &BallSnapshot) -> Result<BreakStatus, CoordinatorError> {
        let mut lobby = lock(&self.lobby)?;
        let (seat, token) = self.credentials(&lobby)?;
        let Lobby { rng, game, .. } = &mut *lobby;
        let game = game.as_mut().ok_or(CoordinatorError::Ended)?;

        game.submit_shootout(&token, snapshot, rng)?;
        Ok(match game.phase() {
            Phase::DecideBreak => BreakStatus::Pending,
            _ => BreakStatus::Decided(break_decision(game, seat)),
        })
    }

    fn poll_break(&self) -> Result<PollStatus<BreakDecision>, CoordinatorError> {
        let lobby = lock(&self.lobby)?;
        let (seat, _) = self.credentials(&lobby)?;
        let game = lobby.game()?;
        if lobby.aborted || game.is_over() {
            return Ok(PollStatus::Gone);
        }
        if game.phase() != Phase::DecideBreak {
            return Ok(PollStatus::Advance(break_decision(game, seat)));
        }
        Ok(PollStatus::Waiting)
    }

    fn submit_play(&self, snapshot: &BallSnapshot) -> Result<PlayReply, CoordinatorError> {
        let mut lobby = lock(&self.lobby)?;
        let (seat, token) = self.credentials(&lobby)?;
        let game = lobby.game.as_mut().ok_or(CoordinatorError::Ended)?;

        let verdict = game.submit_round(&token, snapshot.clone())?;
        let decision = match verdict.outcome {
            Some(outcome) if outcome.is_winner(seat) => PlayDecision::Won,
            Some(_) => PlayDecision::Lost,
            None if verdict.next_player() == seat => PlayDecision::GoOn,
            None => PlayDecision::Change,
        };
        Ok(PlayReply {
            decision,
            message: verdict.rationale,
            assignment: game.player(seat).assignment(),
        })
    }

    fn poll_turn(&self) -> Result<PollStatus<TurnUpdate>, CoordinatorError> {
        let lobby = lock(&self.lobby)?;
        let (seat, _) = self.credentials(&lobby)?;
        let game = lobby.game()?;
        let message = game
            .rounds()
            .last()
            .map(|round| round.verdict.rationale.clone())
            .unwrap_or_default();

        if let Some(outcome) = game.outcome() {
            return Ok(PollStatus::Advance(TurnUpdate::Over {
                won: outcome.is_winner(seat),
                message: game.message(),
            }));
        }
        if lobby.aborted {
            return Ok(PollStatus::Gone);
        }
        if game.active() != seat {
            return Ok(PollStatus::Waiting);
        }

        let update = match game.phase() {
            Phase::OpeningBreak => TurnUpdate::Rebreak { message },
            Phase::Play => TurnUpdate::YourTurn {
                layout: game.last_snapshot().clone(),
                placement: game.placement(),
                assignment: game.player(seat).assignment(),
                message,
            },
            Phase::DecideBreak | Phase::Over => return Ok(PollStatus::Waiting),
        };
        Ok(PollStatus::Advance(update))
    }

    fn abort(&self) -> Result<(), CoordinatorError> {
        let mut lobby = lock(&self.lobby)?;
        let Some((seat, generation)) = lock(&self.identity)?
            .as_ref()
            .map(|identity| (identity.seat, identity.generation))
        else {
            return Ok(());
        };
        if generation != lobby.generation {
            return Ok(());
        }
        lobby.aborted = true;
        lobby.waiting = None;
        if let Some(game) = lobby.game.as_mut() {
            game.forfeit(seat);
        }
        log::info!("game aborted by {seat}");
        Ok(())
    }
}

fn break_decision(game: &MatchState, seat: PlayerId) -> BreakDecision {
    if game.active() == seat {
        BreakDecision::Won
    } else {
        BreakDecision::Lost
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, CoordinatorError> {
    mutex
        .lock()
        .map_err(|_| CoordinatorError::Unreachable("match hub lock poisoned".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BallId, Position};
    use crate::error::RuleError;

    fn request(name: &str) -> GameRequest {
        GameRequest {
            player: name.into(),
            team: "Team".into(),
            opponent: None,
        }
    }

    fn near(shootout: &Shootout, offset: f64) -> BallSnapshot {
        [(BallId::Cue, Position::new(shootout.target.x + offset, shootout.target.y))]
            .into_iter()
            .collect()
    }

    fn paired() -> (MatchHub, HubSeat, HubSeat, Shootout) {
        let hub = MatchHub::new(TableConfig::default());
        let (a, b) = (hub.seat(), hub.seat());
        a.request_game(&request("Ada")).unwrap();
        let GameReply::Found(shootout) = b.request_game(&request("Bob")).unwrap() else {
            panic!("second request should pair");
        };
        (hub, a, b, shootout)
    }

    #[test]
    fn test_pairing() {
        let hub = MatchHub::new(TableConfig::default());
        let (a, b) = (hub.seat(), hub.seat());

        assert_eq!(a.request_game(&request("Ada")).unwrap(), GameReply::Opened);
        assert_eq!(a.poll_reply().unwrap(), PollStatus::Waiting);
        b.request_game(&request("Bob")).unwrap();

        assert!(matches!(a.poll_reply().unwrap(), PollStatus::Advance(_)));
        assert_eq!(a.seat().unwrap(), Some(PlayerId::FIRST));
        assert_eq!(b.seat().unwrap(), Some(PlayerId::SECOND));
        assert!(hub.seat().request_game(&request("Cy")).is_err());
    }

    #[test]
    fn test_break_decision() {
        let (_, a, b, shootout) = paired();

        assert_eq!(a.submit_break(&near(&shootout, 70.0)).unwrap(), BreakStatus::Pending);
        assert_eq!(a.poll_break().unwrap(), PollStatus::Waiting);
        assert_eq!(
            b.submit_break(&near(&shootout, 4.0)).unwrap(),
            BreakStatus::Decided(BreakDecision::Won)
        );
        assert_eq!(a.poll_break().unwrap(), PollStatus::Advance(BreakDecision::Lost));
    }

    #[test]
    fn test_turn_handover() {
        let (_, a, b, shootout) = paired();
        a.submit_break(&near(&shootout, 70.0)).unwrap();
        b.submit_break(&near(&shootout, 4.0)).unwrap();

        assert_eq!(a.poll_turn().unwrap(), PollStatus::Waiting);
        let reply = b.submit_play(&BallSnapshot::full_rack()).unwrap();
        assert_eq!(reply.decision, PlayDecision::Change);

        let PollStatus::Advance(TurnUpdate::YourTurn { layout, .. }) = a.poll_turn().unwrap() else {
            panic!("control should pass to the first seat");
        };
        assert_eq!(layout, BallSnapshot::full_rack());
    }

    #[test]
    fn test_out_of_turn_play_is_rejected() {
        let (hub, a, b, shootout) = paired();
        a.submit_break(&near(&shootout, 70.0)).unwrap();
        b.submit_break(&near(&shootout, 4.0)).unwrap();

        let err = a.submit_play(&BallSnapshot::full_rack()).unwrap_err();

        assert_eq!(err, CoordinatorError::from(RuleError::AuthMismatch));
        assert!(hub.game().unwrap().unwrap().rounds().is_empty());
    }

    #[test]
    fn test_abort_forfeits() {
        let (_, a, b, shootout) = paired();
        a.submit_break(&near(&shootout, 70.0)).unwrap();
        b.submit_break(&near(&shootout, 4.0)).unwrap();

        b.abort().unwrap();

        let PollStatus::Advance(TurnUpdate::Over { won, .. }) = a.poll_turn().unwrap() else {
            panic!("an aborted match is over");
        };
        assert!(won);
    }

    #[test]
    fn test_finished_match_makes_room_for_the_next() {
        let (hub, a, b, shootout) = paired();
        a.submit_break(&near(&shootout, 70.0)).unwrap();
        b.abort().unwrap();

        assert_eq!(a.request_game(&request("Ada")).unwrap(), GameReply::Opened);
        assert!(hub.game().unwrap().is_none());
        assert!(matches!(hub.seat().request_game(&request("Cy")).unwrap(), GameReply::Found(_)));
        assert_eq!(hub.game().unwrap().unwrap().player(PlayerId::SECOND).name, "Cy");
    }

    #[test]
    fn test_stale_seat_sees_the_end() {
        let (hub, a, b, shootout) = paired();
        a.abort().unwrap();
        assert_eq!(b.submit_break(&near(&shootout, 4.0)).unwrap_err(), CoordinatorError::Ended);

        a.request_game(&request("Ada")).unwrap();
        hub.seat().request_game(&request("Cy")).unwrap();

        assert_eq!(b.poll_turn().unwrap_err(), CoordinatorError::Ended);
        assert_eq!(b.poll_reply().unwrap(), PollStatus::Gone);
        b.abort().unwrap();
        assert!(!hub.game().unwrap().unwrap().is_over());
    }

    #[test]
    fn test_abort_while_waiting() {
        let hub = MatchHub::new(TableConfig::default());
        let a = hub.seat();
        a.request_game(&request("Ada")).unwrap();

        a.abort().unwrap();

        assert_eq!(a.poll_reply().unwrap(), PollStatus::Gone);
    }
}
