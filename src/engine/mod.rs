use std::collections::VecDeque;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::warn;

use crate::catalog::{Amount, CardCatalog, CardDef, CheerSource, ChoiceOption, ChooseDestination, ChooseSource, DeckInfo};
use crate::error::GameError;
use crate::protocol::{
    ActionKind, AvailableAction, GameAction, GameEvent, GameOverReason, PlacementInfo, ZoneName,
};

pub mod conditions;
pub mod effects;
pub mod state;
pub mod steps;

#[cfg(test)]
mod tests;

pub use state::{CardInstance, PlayerState, MAX_BACKSTAGE};

use effects::QueuedEffect;

/// 턴 페이즈. 활성 플레이어 기준으로 순환한다.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GamePhase {
    InitialPlacement,
    Reset,
    Cheer,
    Main,
    Performance,
    EndTurn,
    GameOver,
}

#[derive(Clone, Debug)]
pub struct GameOutcome {
    pub winner_id: Option<String>,
    pub loser_id: Option<String>,
    pub reason: GameOverReason,
}

/// What a paused `RestoreHp`/`DealDamage` does once its holomem is chosen.
#[derive(Clone, Debug)]
pub enum HolomemApply {
    RestoreHp { amount: Amount },
    DealDamage { amount: Amount },
}

/// 엔진이 유일하게 보유하는 "대기 중 결정" 슬롯.
///
/// Each variant carries the validation data for the expected response and
/// everything needed to resume where resolution paused. Exactly one may be
/// set at a time.
#[derive(Clone, Debug)]
pub enum PendingDecision {
    Mulligan {
        player: usize,
    },
    InitialPlacement {
        player: usize,
        debut_options: Vec<String>,
        spot_options: Vec<String>,
    },
    CheerPlacement {
        player: usize,
        cheer_ids: Vec<String>,
        options: Vec<String>,
    },
    ChooseNewCenter {
        player: usize,
        options: Vec<String>,
    },
    MainStep {
        player: usize,
        available: Vec<AvailableAction>,
    },
    PerformanceStep {
        player: usize,
        available: Vec<AvailableAction>,
    },
    EffectChoice {
        player: usize,
        options: Vec<ChoiceOption>,
    },
    EffectChooseCards {
        player: usize,
        can_choose: Vec<String>,
        seen: Vec<String>,
        min: usize,
        max: usize,
        from_zone: ChooseSource,
        destination: ChooseDestination,
    },
    EffectChooseHolomem {
        player: usize,
        /// Seat that owns the candidate holomem (may be the opponent).
        target_player: usize,
        can_choose: Vec<String>,
        min: usize,
        max: usize,
        apply: HolomemApply,
    },
    EffectOrderCards {
        player: usize,
        card_ids: Vec<String>,
    },
    EffectSendCheer {
        player: usize,
        from: CheerSource,
        from_options: Vec<String>,
        to_options: Vec<String>,
        min: usize,
        max: usize,
    },
    SwapToCenter {
        player: usize,
        can_choose: Vec<String>,
    },
}

impl PendingDecision {
    pub fn player(&self) -> usize {
        match self {
            PendingDecision::Mulligan { player }
            | PendingDecision::InitialPlacement { player, .. }
            | PendingDecision::CheerPlacement { player, .. }
            | PendingDecision::ChooseNewCenter { player, .. }
            | PendingDecision::MainStep { player, .. }
            | PendingDecision::PerformanceStep { player, .. }
            | PendingDecision::EffectChoice { player, .. }
            | PendingDecision::EffectChooseCards { player, .. }
            | PendingDecision::EffectChooseHolomem { player, .. }
            | PendingDecision::EffectOrderCards { player, .. }
            | PendingDecision::EffectSendCheer { player, .. }
            | PendingDecision::SwapToCenter { player, .. } => *player,
        }
    }

    pub fn desired_response(&self) -> ActionKind {
        match self {
            PendingDecision::Mulligan { .. } => ActionKind::Mulligan,
            PendingDecision::InitialPlacement { .. } => ActionKind::InitialPlacement,
            PendingDecision::CheerPlacement { .. } => ActionKind::PlaceCheer,
            PendingDecision::ChooseNewCenter { .. } => ActionKind::ChooseNewCenter,
            PendingDecision::MainStep { .. } => ActionKind::MainStepAction,
            PendingDecision::PerformanceStep { .. } => ActionKind::PerformanceStepAction,
            PendingDecision::EffectChoice { .. } => ActionKind::EffectResolutionMakeChoice,
            PendingDecision::EffectChooseCards { .. } => {
                ActionKind::EffectResolutionChooseCardsForEffect
            }
            PendingDecision::EffectChooseHolomem { .. } => {
                ActionKind::EffectResolutionChooseHolomemForEffect
            }
            PendingDecision::EffectOrderCards { .. } => ActionKind::EffectResolutionOrderCards,
            PendingDecision::EffectSendCheer { .. } => {
                ActionKind::EffectResolutionMoveCheerBetweenHolomems
            }
            PendingDecision::SwapToCenter { .. } => ActionKind::EffectResolutionSwapCenterWithBack,
        }
    }
}

/// 한 매치의 권위 상태. PlayerState 와 카드 인스턴스의 유일한 작성자.
pub struct GameEngine {
    pub(crate) catalog: Arc<CardCatalog>,
    pub(crate) rng: StdRng,
    pub phase: GamePhase,
    pub turn_count: u32,
    pub(crate) active: usize,
    pub(crate) players: [PlayerState; 2],
    pub(crate) pending: Option<PendingDecision>,
    pub(crate) effect_queue: VecDeque<QueuedEffect>,
    pub result: Option<GameOutcome>,

    mulligan_done: [bool; 2],
    placement_done: [bool; 2],
    main_step_announced: bool,
    performance_announced: bool,
    pub(crate) performed_this_turn: Vec<String>,
    reset_center_resolved: bool,
}

const FORCED_MULLIGAN_LIMIT: u32 = 64;

impl GameEngine {
    pub fn new(
        catalog: Arc<CardCatalog>,
        player_ids: [&str; 2],
        decks: [&DeckInfo; 2],
        seed: u64,
    ) -> Result<Self, GameError> {
        let p1 = PlayerState::build(player_ids[0], "p1", decks[0], &catalog)?;
        let p2 = PlayerState::build(player_ids[1], "p2", decks[1], &catalog)?;
        Ok(Self {
            catalog,
            rng: StdRng::seed_from_u64(seed),
            phase: GamePhase::InitialPlacement,
            turn_count: 0,
            active: 0,
            players: [p1, p2],
            pending: None,
            effect_queue: VecDeque::new(),
            result: None,
            mulligan_done: [false, false],
            placement_done: [false, false],
            main_step_announced: false,
            performance_announced: false,
            performed_this_turn: Vec::new(),
            reset_center_resolved: false,
        })
    }

    pub fn player(&self, seat: usize) -> &PlayerState {
        &self.players[seat]
    }

    pub fn active_player_id(&self) -> &str {
        &self.players[self.active].player_id
    }

    pub fn pending_decision(&self) -> Option<&PendingDecision> {
        self.pending.as_ref()
    }

    pub fn seat_of(&self, player_id: &str) -> Option<usize> {
        self.players.iter().position(|p| p.player_id == player_id)
    }

    fn pid(&self, seat: usize) -> String {
        self.players[seat].player_id.clone()
    }

    /// Deals opening hands and drives to the first decision.
    pub fn begin_match(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        events.push(GameEvent::GameStartInfo {
            first_player: self.pid(0),
            player_ids: vec![self.pid(0), self.pid(1)],
        });
        for seat in 0..2 {
            self.players[seat].shuffle_deck(&mut self.rng);
            events.push(GameEvent::ShuffleDeck {
                shuffling_player_id: self.pid(seat),
            });
            let drawn = self.players[seat].draw(state::HAND_SIZE);
            events.push(GameEvent::Draw {
                drawing_player_id: self.pid(seat),
                drawn_card_ids: drawn,
            });
        }
        self.run(&mut events);
        events
    }

    /// 응답 한 건을 처리한다. 규칙 위반은 `GameError` 이벤트로 보고될 뿐
    /// 상태를 바꾸지 않으며, 재제출이 가능하다.
    pub fn handle_action(
        &mut self,
        player_id: &str,
        action: &GameAction,
    ) -> Result<Vec<GameEvent>, GameError> {
        if self.phase == GamePhase::GameOver {
            return Err(GameError::MatchOver);
        }
        let seat = self
            .seat_of(player_id)
            .ok_or_else(|| GameError::UnknownPlayer(player_id.to_string()))?;

        let mut events = Vec::new();
        let pending = match &self.pending {
            Some(p) => p,
            None => {
                events.push(self.game_error(seat, "no_pending_decision", "No decision is pending."));
                return Ok(events);
            }
        };
        if pending.player() != seat {
            events.push(self.game_error(
                seat,
                "not_your_decision",
                "The pending decision is not addressed to you.",
            ));
            return Ok(events);
        }
        if !action.matches(pending.desired_response()) {
            events.push(self.game_error(
                seat,
                "wrong_action_type",
                "Response does not match the expected action kind.",
            ));
            return Ok(events);
        }
        if let Err(reason) = self.validate_response(pending, action) {
            events.push(self.game_error(seat, "invalid_action_data", &reason));
            return Ok(events);
        }

        let pending = self.pending.take().expect("pending checked above");
        self.apply_response(pending, action, &mut events);
        self.run(&mut events);
        Ok(events)
    }

    fn game_error(&self, seat: usize, error_id: &str, message: &str) -> GameEvent {
        GameEvent::GameError {
            error_player_id: self.pid(seat),
            error_id: error_id.to_string(),
            error_message: message.to_string(),
        }
    }

    /// Advances until a decision is pending or the match is over.
    pub(crate) fn run(&mut self, events: &mut Vec<GameEvent>) {
        loop {
            if self.pending.is_some() || self.phase == GamePhase::GameOver {
                return;
            }
            if let Some(queued) = self.effect_queue.pop_front() {
                self.resolve_effect(queued, events);
                continue;
            }
            match self.phase {
                GamePhase::InitialPlacement => self.run_initial_placement(events),
                GamePhase::Reset => self.run_reset(events),
                GamePhase::Cheer => self.run_cheer(events),
                GamePhase::Main => self.run_main(events),
                GamePhase::Performance => self.run_performance(events),
                GamePhase::EndTurn => self.run_end_turn(events),
                GamePhase::GameOver => return,
            }
        }
    }

    fn run_initial_placement(&mut self, events: &mut Vec<GameEvent>) {
        // Each seat mulligans and then places, before the other seat acts.
        for seat in [self.active, 1 - self.active] {
            if !self.mulligan_done[seat] {
                let player_id = self.pid(seat);
                self.pending = Some(PendingDecision::Mulligan { player: seat });
                events.push(GameEvent::MulliganDecision {
                    event_player_id: player_id.clone(),
                    active_player: player_id,
                    desired_response: ActionKind::Mulligan,
                });
                return;
            }
            if !self.placement_done[seat] {
                let debut_options = self.hand_debut_options(seat);
                let spot_options = self.hand_spot_options(seat);
                let player_id = self.pid(seat);
                self.pending = Some(PendingDecision::InitialPlacement {
                    player: seat,
                    debut_options: debut_options.clone(),
                    spot_options: spot_options.clone(),
                });
                events.push(GameEvent::InitialPlacementBegin {
                    event_player_id: player_id.clone(),
                    active_player: player_id,
                    desired_response: ActionKind::InitialPlacement,
                    debut_options,
                    spot_options,
                });
                return;
            }
        }

        let placement_info = (0..2)
            .map(|seat| {
                let p = &self.players[seat];
                PlacementInfo {
                    player_id: p.player_id.clone(),
                    oshi_id: p.oshi_id.clone(),
                    center_card_id: p.center.clone().unwrap_or_default(),
                    backstage_card_ids: p.backstage.clone(),
                    life: p.life,
                }
            })
            .collect();
        events.push(GameEvent::InitialPlacementReveal { placement_info });

        self.turn_count = 1;
        events.push(GameEvent::TurnStart {
            active_player: self.pid(self.active),
            turn_count: self.turn_count,
        });
        self.phase = GamePhase::Reset;
    }

    fn run_reset(&mut self, events: &mut Vec<GameEvent>) {
        let seat = self.active;
        if !self.reset_center_resolved {
            // Members resting since the previous turn activate first; the
            // returning collab member stays rested until next turn.
            let mut activated = Vec::new();
            for id in self.players[seat].holomem_in_play() {
                if let Some(instance) = self.players[seat].instance_mut(&id) {
                    if instance.resting {
                        instance.resting = false;
                        activated.push(id);
                    }
                }
            }
            if !activated.is_empty() {
                events.push(GameEvent::ResetStepActivate {
                    active_player: self.pid(seat),
                    activated_card_ids: activated,
                });
            }
            if let Some(collab_id) = self.players[seat].collab.take() {
                if let Some(instance) = self.players[seat].instance_mut(&collab_id) {
                    instance.resting = true;
                }
                self.players[seat].backstage.push(collab_id.clone());
                events.push(GameEvent::ResetStepCollab {
                    active_player: self.pid(seat),
                    rested_card_id: collab_id,
                });
            }
            self.reset_center_resolved = true;

            if self.players[seat].center.is_none() && !self.players[seat].backstage.is_empty() {
                let options = self.players[seat].backstage.clone();
                let player_id = self.pid(seat);
                self.pending = Some(PendingDecision::ChooseNewCenter {
                    player: seat,
                    options: options.clone(),
                });
                events.push(GameEvent::ResetStepChooseNewCenter {
                    event_player_id: player_id.clone(),
                    active_player: player_id,
                    desired_response: ActionKind::ChooseNewCenter,
                    center_options: options,
                });
            }
            return;
        }

        // Turn draw; an empty deck here is the deck-out loss.
        if self.players[seat].deck.is_empty() {
            let winner = self.pid(1 - seat);
            let loser = self.pid(seat);
            self.set_game_over(Some(winner), Some(loser), GameOverReason::DeckOut, events);
            return;
        }
        let drawn = self.players[seat].draw(1);
        events.push(GameEvent::Draw {
            drawing_player_id: self.pid(seat),
            drawn_card_ids: drawn,
        });
        self.reset_center_resolved = false;
        self.phase = GamePhase::Cheer;
    }

    fn run_cheer(&mut self, events: &mut Vec<GameEvent>) {
        let seat = self.active;
        if self.players[seat].cheer_deck.is_empty() {
            self.phase = GamePhase::Main;
            return;
        }
        let top = self.players[seat]
            .cheer_deck
            .last()
            .cloned()
            .expect("non-empty checked above");
        let options = self.players[seat].holomem_in_play();
        let player_id = self.pid(seat);
        self.pending = Some(PendingDecision::CheerPlacement {
            player: seat,
            cheer_ids: vec![top.clone()],
            options: options.clone(),
        });
        events.push(GameEvent::CheerStep {
            event_player_id: player_id.clone(),
            active_player: player_id,
            desired_response: ActionKind::PlaceCheer,
            cheer_to_place: vec![top],
            source: ZoneName::CheerDeck,
            options,
        });
    }

    fn run_main(&mut self, events: &mut Vec<GameEvent>) {
        let seat = self.active;
        if !self.main_step_announced {
            events.push(GameEvent::MainStepStart {
                active_player: self.pid(seat),
            });
            self.main_step_announced = true;
        }
        let available = self.main_step_actions(seat);
        let player_id = self.pid(seat);
        self.pending = Some(PendingDecision::MainStep {
            player: seat,
            available: available.clone(),
        });
        events.push(GameEvent::DecisionMainStep {
            event_player_id: player_id.clone(),
            active_player: player_id,
            desired_response: ActionKind::MainStepAction,
            available_actions: available,
        });
    }

    fn run_performance(&mut self, events: &mut Vec<GameEvent>) {
        let seat = self.active;
        if !self.performance_announced {
            events.push(GameEvent::PerformanceStepStart {
                active_player: self.pid(seat),
            });
            self.performance_announced = true;
        }
        let available = self.performance_step_actions(seat);
        let player_id = self.pid(seat);
        self.pending = Some(PendingDecision::PerformanceStep {
            player: seat,
            available: available.clone(),
        });
        events.push(GameEvent::DecisionPerformanceStep {
            event_player_id: player_id.clone(),
            active_player: player_id,
            desired_response: ActionKind::PerformanceStepAction,
            available_actions: available,
        });
    }

    fn run_end_turn(&mut self, events: &mut Vec<GameEvent>) {
        let ending = self.active;
        events.push(GameEvent::EndTurn {
            ending_player: self.pid(ending),
            next_player: self.pid(1 - ending),
        });
        self.players[ending].clear_turn_flags();
        self.performed_this_turn.clear();
        self.main_step_announced = false;
        self.performance_announced = false;
        self.active = 1 - ending;
        self.turn_count += 1;
        events.push(GameEvent::TurnStart {
            active_player: self.pid(self.active),
            turn_count: self.turn_count,
        });
        self.phase = GamePhase::Reset;
    }

    pub(crate) fn set_game_over(
        &mut self,
        winner_id: Option<String>,
        loser_id: Option<String>,
        reason: GameOverReason,
        events: &mut Vec<GameEvent>,
    ) {
        self.effect_queue.clear();
        self.pending = None;
        self.phase = GamePhase::GameOver;
        self.result = Some(GameOutcome {
            winner_id: winner_id.clone(),
            loser_id: loser_id.clone(),
            reason,
        });
        events.push(GameEvent::GameOver {
            winner_id,
            loser_id,
            reason,
        });
    }

    /// Concession / forfeit entry point used by the room layer.
    pub fn concede(&mut self, player_id: &str, reason: GameOverReason) -> Result<Vec<GameEvent>, GameError> {
        if self.phase == GamePhase::GameOver {
            return Err(GameError::MatchOver);
        }
        let seat = self
            .seat_of(player_id)
            .ok_or_else(|| GameError::UnknownPlayer(player_id.to_string()))?;
        let mut events = Vec::new();
        let winner = self.pid(1 - seat);
        let loser = self.pid(seat);
        self.set_game_over(Some(winner), Some(loser), reason, &mut events);
        Ok(events)
    }

    fn hand_debut_options(&self, seat: usize) -> Vec<String> {
        self.players[seat]
            .hand
            .iter()
            .filter(|id| {
                self.definition(seat, id)
                    .map(|def| def.is_debut_holomem())
                    .unwrap_or(false)
            })
            .cloned()
            .collect()
    }

    fn hand_spot_options(&self, seat: usize) -> Vec<String> {
        self.players[seat]
            .hand
            .iter()
            .filter(|id| {
                self.definition(seat, id)
                    .map(|def| def.is_spot_holomem())
                    .unwrap_or(false)
            })
            .cloned()
            .collect()
    }

    pub(crate) fn definition(&self, seat: usize, card_id: &str) -> Option<&CardDef> {
        let definition_id = self.players[seat].definition_id(card_id)?;
        self.catalog.get(definition_id)
    }

    // --- response validation -------------------------------------------------

    /// Structural + legality check, read-only. A failure leaves the pending
    /// decision untouched so the sender may resubmit.
    fn validate_response(&self, pending: &PendingDecision, action: &GameAction) -> Result<(), String> {
        match (pending, action) {
            (PendingDecision::Mulligan { .. }, GameAction::Mulligan { .. }) => Ok(()),

            (
                PendingDecision::InitialPlacement {
                    debut_options,
                    spot_options,
                    ..
                },
                GameAction::InitialPlacement {
                    center_holomem_card_id,
                    backstage_holomem_card_ids,
                },
            ) => {
                if !debut_options.contains(center_holomem_card_id) {
                    return Err("center must be a debut option".into());
                }
                if backstage_holomem_card_ids.len() > MAX_BACKSTAGE {
                    return Err("backstage holds at most 5 members".into());
                }
                let mut seen = vec![center_holomem_card_id.clone()];
                for id in backstage_holomem_card_ids {
                    if seen.contains(id) {
                        return Err(format!("duplicate placement of {}", id));
                    }
                    if !debut_options.contains(id) && !spot_options.contains(id) {
                        return Err(format!("{} is not placeable", id));
                    }
                    seen.push(id.clone());
                }
                Ok(())
            }

            (
                PendingDecision::CheerPlacement { cheer_ids, options, .. },
                GameAction::PlaceCheer { placements },
            ) => {
                if placements.len() != cheer_ids.len() {
                    return Err("every offered cheer must be placed".into());
                }
                for (cheer_id, target) in placements {
                    if !cheer_ids.contains(cheer_id) {
                        return Err(format!("{} is not the offered cheer", cheer_id));
                    }
                    if !options.contains(target) {
                        return Err(format!("{} is not a legal cheer target", target));
                    }
                }
                Ok(())
            }

            (
                PendingDecision::ChooseNewCenter { options, .. },
                GameAction::ChooseNewCenter { new_center_card_id },
            ) => {
                if options.contains(new_center_card_id) {
                    Ok(())
                } else {
                    Err(format!("{} is not a center option", new_center_card_id))
                }
            }

            (PendingDecision::MainStep { available, .. }, action) => {
                self.validate_main_action(available, action)
            }

            (PendingDecision::PerformanceStep { available, .. }, action) => {
                self.validate_performance_action(available, action)
            }

            (
                PendingDecision::EffectChoice { options, .. },
                GameAction::EffectResolutionMakeChoice { choice_index },
            ) => {
                if *choice_index < options.len() {
                    Ok(())
                } else {
                    Err(format!("choice index {} out of range", choice_index))
                }
            }

            (
                PendingDecision::EffectChooseCards {
                    can_choose, min, max, ..
                },
                GameAction::EffectResolutionChooseCardsForEffect { card_ids },
            )
            => Self::validate_chosen_set(card_ids, can_choose, *min, *max),

            (
                PendingDecision::EffectChooseHolomem {
                    can_choose, min, max, ..
                },
                GameAction::EffectResolutionChooseHolomemForEffect { card_ids },
            ) => Self::validate_chosen_set(card_ids, can_choose, *min, *max),

            (
                PendingDecision::EffectOrderCards { card_ids: expected, .. },
                GameAction::EffectResolutionOrderCards { card_ids },
            ) => {
                if card_ids.len() == expected.len()
                    && expected.iter().all(|id| card_ids.contains(id))
                {
                    Ok(())
                } else {
                    Err("ordering must be a permutation of the shown cards".into())
                }
            }

            (
                PendingDecision::EffectSendCheer {
                    from_options,
                    to_options,
                    min,
                    max,
                    ..
                },
                GameAction::EffectResolutionMoveCheerBetweenHolomems { placements },
            ) => {
                if placements.len() < *min || placements.len() > *max {
                    return Err("cheer count outside allowed bounds".into());
                }
                for (cheer_id, target) in placements {
                    if !from_options.contains(cheer_id) {
                        return Err(format!("{} is not a movable cheer", cheer_id));
                    }
                    if !to_options.contains(target) {
                        return Err(format!("{} is not a cheer destination", target));
                    }
                }
                Ok(())
            }

            (
                PendingDecision::SwapToCenter { can_choose, .. },
                GameAction::EffectResolutionSwapCenterWithBack { card_ids },
            ) => Self::validate_chosen_set(card_ids, can_choose, 1, 1),

            // `GameAction::matches` guarantees pairs line up; anything else
            // is a protocol bug worth failing loudly on.
            _ => Err("response does not fit the pending decision".into()),
        }
    }

    fn validate_chosen_set(
        chosen: &[String],
        can_choose: &[String],
        min: usize,
        max: usize,
    ) -> Result<(), String> {
        if chosen.len() < min || chosen.len() > max {
            return Err("selection size outside allowed bounds".into());
        }
        let mut seen: Vec<&String> = Vec::new();
        for id in chosen {
            if seen.contains(&id) {
                return Err(format!("duplicate selection of {}", id));
            }
            if !can_choose.contains(id) {
                return Err(format!("{} is not choosable", id));
            }
            seen.push(id);
        }
        Ok(())
    }

    // --- response application ------------------------------------------------

    fn apply_response(
        &mut self,
        pending: PendingDecision,
        action: &GameAction,
        events: &mut Vec<GameEvent>,
    ) {
        match (pending, action) {
            (PendingDecision::Mulligan { player }, GameAction::Mulligan { do_mulligan }) => {
                self.apply_mulligan(player, *do_mulligan, events);
            }
            (
                PendingDecision::InitialPlacement { player, .. },
                GameAction::InitialPlacement {
                    center_holomem_card_id,
                    backstage_holomem_card_ids,
                },
            ) => {
                self.apply_initial_placement(
                    player,
                    center_holomem_card_id,
                    backstage_holomem_card_ids,
                    events,
                );
            }
            (
                PendingDecision::CheerPlacement { player, .. },
                GameAction::PlaceCheer { placements },
            ) => {
                for (cheer_id, target) in placements {
                    self.attach_cheer(player, cheer_id, target, ZoneName::CheerDeck, events);
                }
                self.phase = GamePhase::Main;
            }
            (
                PendingDecision::ChooseNewCenter { player, .. },
                GameAction::ChooseNewCenter { new_center_card_id },
            ) => {
                self.players[player].remove_from_zone(new_center_card_id);
                self.players[player].center = Some(new_center_card_id.clone());
                events.push(GameEvent::MoveCard {
                    moving_player_id: self.pid(player),
                    from_zone: ZoneName::Backstage,
                    to_zone: ZoneName::Center,
                    zone_card_id: None,
                    card_id: new_center_card_id.clone(),
                });
            }
            (PendingDecision::MainStep { player, available }, action) => {
                self.apply_main_action(player, &available, action, events);
            }
            (PendingDecision::PerformanceStep { player, .. }, action) => {
                self.apply_performance_action(player, action, events);
            }
            (
                PendingDecision::EffectChoice { player, options },
                GameAction::EffectResolutionMakeChoice { choice_index },
            ) => {
                let chosen = options[*choice_index].effects.clone();
                self.queue_effects_front(player, &chosen);
            }
            (
                PendingDecision::EffectChooseCards {
                    player,
                    seen,
                    from_zone,
                    destination,
                    ..
                },
                GameAction::EffectResolutionChooseCardsForEffect { card_ids },
            ) => {
                self.apply_choose_cards(player, &seen, from_zone, destination, card_ids, events);
            }
            (
                PendingDecision::EffectChooseHolomem {
                    target_player, apply, ..
                },
                GameAction::EffectResolutionChooseHolomemForEffect { card_ids },
            ) => {
                for card_id in card_ids {
                    self.apply_holomem_effect(target_player, card_id, &apply, events);
                }
            }
            (
                PendingDecision::EffectOrderCards { player, .. },
                GameAction::EffectResolutionOrderCards { card_ids },
            ) => {
                // Ordered cards go under the deck, first listed at the very
                // bottom. The top of the deck is the vector's tail.
                for (index, card_id) in card_ids.iter().enumerate() {
                    self.players[player].remove_from_zone(card_id);
                    self.players[player].deck.insert(index, card_id.clone());
                }
            }
            (
                PendingDecision::EffectSendCheer { player, from, .. },
                GameAction::EffectResolutionMoveCheerBetweenHolomems { placements },
            ) => {
                let from_zone = match from {
                    CheerSource::Archive => ZoneName::Archive,
                    CheerSource::CheerDeck => ZoneName::CheerDeck,
                };
                for (cheer_id, target) in placements {
                    self.attach_cheer(player, cheer_id, target, from_zone, events);
                }
            }
            (
                PendingDecision::SwapToCenter { player, .. },
                GameAction::EffectResolutionSwapCenterWithBack { card_ids },
            ) => {
                self.apply_swap_to_center(player, &card_ids[0], events);
            }
            _ => {
                // validate_response admitted the pair; reaching here is a bug.
                warn!("pending decision / action pair diverged after validation");
            }
        }
    }

    fn apply_mulligan(&mut self, seat: usize, do_mulligan: bool, events: &mut Vec<GameEvent>) {
        if do_mulligan {
            self.redraw_hand(seat, events);
        }
        // Forced mulligan: a hand with no debut-stage holomem is revealed
        // and redrawn until one appears.
        let mut guard = 0u32;
        while self.hand_debut_options(seat).is_empty() {
            guard += 1;
            if guard > FORCED_MULLIGAN_LIMIT {
                warn!("forced mulligan limit reached for seat {}", seat);
                break;
            }
            events.push(GameEvent::MulliganReveal {
                active_player: self.pid(seat),
                revealed_card_ids: self.players[seat].hand.clone(),
            });
            self.redraw_hand(seat, events);
        }
        self.mulligan_done[seat] = true;
    }

    fn redraw_hand(&mut self, seat: usize, events: &mut Vec<GameEvent>) {
        let hand = std::mem::take(&mut self.players[seat].hand);
        self.players[seat].deck.extend(hand);
        self.players[seat].shuffle_deck(&mut self.rng);
        events.push(GameEvent::ShuffleDeck {
            shuffling_player_id: self.pid(seat),
        });
        let drawn = self.players[seat].draw(state::HAND_SIZE);
        events.push(GameEvent::Draw {
            drawing_player_id: self.pid(seat),
            drawn_card_ids: drawn,
        });
    }

    fn apply_initial_placement(
        &mut self,
        seat: usize,
        center: &str,
        backstage: &[String],
        events: &mut Vec<GameEvent>,
    ) {
        self.players[seat].remove_from_zone(center);
        self.players[seat].center = Some(center.to_string());
        for id in backstage {
            self.players[seat].remove_from_zone(id);
            self.players[seat].backstage.push(id.clone());
        }
        self.placement_done[seat] = true;
        events.push(GameEvent::InitialPlacementPlaced {
            active_player: self.pid(seat),
        });
    }

    pub(crate) fn attach_cheer(
        &mut self,
        seat: usize,
        cheer_id: &str,
        target: &str,
        from_zone: ZoneName,
        events: &mut Vec<GameEvent>,
    ) {
        self.players[seat].remove_from_zone(cheer_id);
        if let Some(instance) = self.players[seat].instance_mut(target) {
            instance.attached_cheer.push(cheer_id.to_string());
        }
        events.push(GameEvent::MoveCard {
            moving_player_id: self.pid(seat),
            from_zone,
            to_zone: ZoneName::Holomem,
            zone_card_id: Some(target.to_string()),
            card_id: cheer_id.to_string(),
        });
    }

    pub(crate) fn apply_swap_to_center(
        &mut self,
        seat: usize,
        new_center: &str,
        events: &mut Vec<GameEvent>,
    ) {
        let old_center = self.players[seat].center.take();
        self.players[seat].remove_from_zone(new_center);
        self.players[seat].center = Some(new_center.to_string());
        events.push(GameEvent::MoveCard {
            moving_player_id: self.pid(seat),
            from_zone: ZoneName::Backstage,
            to_zone: ZoneName::Center,
            zone_card_id: None,
            card_id: new_center.to_string(),
        });
        if let Some(old) = old_center {
            self.players[seat].backstage.push(old.clone());
            events.push(GameEvent::MoveCard {
                moving_player_id: self.pid(seat),
                from_zone: ZoneName::Center,
                to_zone: ZoneName::Backstage,
                zone_card_id: None,
                card_id: old,
            });
        }
    }
}
