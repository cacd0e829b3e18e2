use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::actions::ActionKind;

/// Zone labels used in movement events.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ZoneName {
    Hand,
    Deck,
    CheerDeck,
    Archive,
    Center,
    Collab,
    Backstage,
    /// Attached to a holomem; the event's `zone_card_id` names the holder.
    Holomem,
    Holopower,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GameOverReason {
    LifeZero,
    DeckOut,
    NoHolomem,
    Resign,
    ForfeitDisconnect,
    ForfeitIdle,
    UnrecoverableError,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PlacementInfo {
    pub player_id: String,
    pub oshi_id: String,
    pub center_card_id: String,
    pub backstage_card_ids: Vec<String>,
    pub life: u32,
}

/// Detail block for one named play requirement inside a main-step action.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PlayRequirementDetail {
    pub length: u32,
    pub content_type: String,
}

/// One legal action offered by a main/performance step decision.
///
/// Tags deliberately coincide with the matching `GameAction` tags so a
/// responder can echo `action_type` straight back.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "action_type", rename_all = "snake_case")]
pub enum AvailableAction {
    MainStepPlaceHolomem {
        card_id: String,
    },
    MainStepBloom {
        card_id: String,
        target_id: String,
    },
    MainStepCollab {
        card_id: String,
    },
    MainStepOshiSkill {
        skill_id: String,
        cost: u32,
    },
    MainStepPlaySupport {
        card_id: String,
        play_requirements: BTreeMap<String, PlayRequirementDetail>,
        cheer_on_each_mem: BTreeMap<String, Vec<String>>,
    },
    MainStepBatonPass {
        card_id: String,
        cheer_cost: u32,
    },
    MainStepBeginPerformance {},
    MainStepEndTurn {},
    PerformanceStepUseArt {
        performer_id: String,
        art_id: String,
        power: u32,
        valid_targets: Vec<String>,
    },
    PerformanceStepEndTurn {},
}

/// 매치 이벤트. append-only 로그의 단위이며, 한 번 기록되면 불변.
///
/// Decision variants carry `event_player_id` (the only authorized
/// responder) and `desired_response` (the action kind expected back).
/// Informational variants carry neither. The enum is closed: a handler
/// matching on it cannot silently miss a kind.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum GameEvent {
    // --- Informational events ---
    GameStartInfo {
        first_player: String,
        player_ids: Vec<String>,
    },
    MulliganReveal {
        active_player: String,
        revealed_card_ids: Vec<String>,
    },
    ShuffleDeck {
        shuffling_player_id: String,
    },
    Draw {
        drawing_player_id: String,
        drawn_card_ids: Vec<String>,
    },
    InitialPlacementPlaced {
        active_player: String,
    },
    InitialPlacementReveal {
        placement_info: Vec<PlacementInfo>,
    },
    TurnStart {
        active_player: String,
        turn_count: u32,
    },
    ResetStepActivate {
        active_player: String,
        activated_card_ids: Vec<String>,
    },
    ResetStepCollab {
        active_player: String,
        rested_card_id: String,
    },
    MoveCard {
        moving_player_id: String,
        from_zone: ZoneName,
        to_zone: ZoneName,
        /// Holder id when `to_zone`/`from_zone` is an attachment.
        zone_card_id: Option<String>,
        card_id: String,
    },
    MoveAttachedCard {
        owning_player_id: String,
        from_holomem_id: String,
        to_zone: ZoneName,
        attached_id: String,
    },
    Bloom {
        bloom_player_id: String,
        bloom_card_id: String,
        target_card_id: String,
    },
    Collab {
        collab_player_id: String,
        collab_card_id: String,
        holopower_generated: u32,
    },
    GenerateHolopower {
        generating_player_id: String,
        amount: u32,
        total: u32,
    },
    OshiSkillActivation {
        oshi_player_id: String,
        skill_id: String,
        holopower_spent: u32,
    },
    PlaySupportCard {
        player_id: String,
        card_id: String,
        limited: bool,
    },
    BatonPass {
        active_player: String,
        new_center_id: String,
    },
    MainStepStart {
        active_player: String,
    },
    PerformanceStepStart {
        active_player: String,
    },
    PerformArt {
        performer_player_id: String,
        performer_id: String,
        art_id: String,
        target_id: String,
        power: u32,
    },
    DamageDealt {
        target_player: String,
        target_id: String,
        damage: u32,
        special: bool,
    },
    RestoreHp {
        target_player: String,
        card_id: String,
        healed_amount: u32,
        new_damage: u32,
    },
    DownedHolomem {
        target_player: String,
        card_id: String,
        life_lost: u32,
    },
    LifeDamageDealt {
        target_player: String,
        life_lost: u32,
        life_remaining: u32,
    },
    BoostStat {
        player_id: String,
        amount: u32,
    },
    RollDie {
        rolling_player_id: String,
        result: u8,
    },
    EndTurn {
        ending_player: String,
        next_player: String,
    },
    GameError {
        error_player_id: String,
        error_id: String,
        error_message: String,
    },
    GameOver {
        winner_id: Option<String>,
        loser_id: Option<String>,
        reason: GameOverReason,
    },

    // --- Decision events ---
    MulliganDecision {
        event_player_id: String,
        active_player: String,
        desired_response: ActionKind,
    },
    InitialPlacementBegin {
        event_player_id: String,
        active_player: String,
        desired_response: ActionKind,
        debut_options: Vec<String>,
        spot_options: Vec<String>,
    },
    CheerStep {
        event_player_id: String,
        active_player: String,
        desired_response: ActionKind,
        cheer_to_place: Vec<String>,
        source: ZoneName,
        options: Vec<String>,
    },
    ResetStepChooseNewCenter {
        event_player_id: String,
        active_player: String,
        desired_response: ActionKind,
        center_options: Vec<String>,
    },
    DecisionMainStep {
        event_player_id: String,
        active_player: String,
        desired_response: ActionKind,
        available_actions: Vec<AvailableAction>,
    },
    DecisionPerformanceStep {
        event_player_id: String,
        active_player: String,
        desired_response: ActionKind,
        available_actions: Vec<AvailableAction>,
    },
    DecisionChoice {
        event_player_id: String,
        effect_player_id: String,
        desired_response: ActionKind,
        choices: Vec<String>,
        min_choice: usize,
        max_choice: usize,
    },
    DecisionChooseCards {
        event_player_id: String,
        effect_player_id: String,
        desired_response: ActionKind,
        all_card_seen: Vec<String>,
        cards_can_choose: Vec<String>,
        amount_min: usize,
        amount_max: usize,
    },
    DecisionChooseHolomemForEffect {
        event_player_id: String,
        effect_player_id: String,
        desired_response: ActionKind,
        cards_can_choose: Vec<String>,
        amount_min: usize,
        amount_max: usize,
    },
    DecisionOrderCards {
        event_player_id: String,
        effect_player_id: String,
        desired_response: ActionKind,
        card_ids: Vec<String>,
        to_zone: ZoneName,
    },
    DecisionSendCheer {
        event_player_id: String,
        effect_player_id: String,
        desired_response: ActionKind,
        amount_min: usize,
        amount_max: usize,
        from_options: Vec<String>,
        to_options: Vec<String>,
        cheer_on_each_mem: BTreeMap<String, Vec<String>>,
    },
    DecisionSwapHolomemToCenter {
        event_player_id: String,
        effect_player_id: String,
        desired_response: ActionKind,
        cards_can_choose: Vec<String>,
    },
}

impl GameEvent {
    /// The participant that must answer this event, when it is a decision.
    pub fn event_player_id(&self) -> Option<&str> {
        match self {
            GameEvent::MulliganDecision { event_player_id, .. }
            | GameEvent::InitialPlacementBegin { event_player_id, .. }
            | GameEvent::CheerStep { event_player_id, .. }
            | GameEvent::ResetStepChooseNewCenter { event_player_id, .. }
            | GameEvent::DecisionMainStep { event_player_id, .. }
            | GameEvent::DecisionPerformanceStep { event_player_id, .. }
            | GameEvent::DecisionChoice { event_player_id, .. }
            | GameEvent::DecisionChooseCards { event_player_id, .. }
            | GameEvent::DecisionChooseHolomemForEffect { event_player_id, .. }
            | GameEvent::DecisionOrderCards { event_player_id, .. }
            | GameEvent::DecisionSendCheer { event_player_id, .. }
            | GameEvent::DecisionSwapHolomemToCenter { event_player_id, .. } => {
                Some(event_player_id)
            }
            _ => None,
        }
    }

    pub fn is_decision(&self) -> bool {
        self.event_player_id().is_some()
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self, GameEvent::GameOver { .. })
    }
}
