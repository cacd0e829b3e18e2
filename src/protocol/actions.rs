use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Action kind names used as `desired_response` markers in decision events.
///
/// `MainStepAction` / `PerformanceStepAction` are aggregates: the concrete
/// response is any action whose tag appears in the decision's
/// `available_actions` list.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Mulligan,
    InitialPlacement,
    PlaceCheer,
    ChooseNewCenter,
    MainStepAction,
    PerformanceStepAction,
    EffectResolutionMakeChoice,
    EffectResolutionChooseCardsForEffect,
    EffectResolutionChooseHolomemForEffect,
    EffectResolutionOrderCards,
    EffectResolutionMoveCheerBetweenHolomems,
    EffectResolutionSwapCenterWithBack,
}

/// 참가자가 제출하는 응답. `{action_type, action_data}` 래핑으로 직렬화된다.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "action_type", content = "action_data", rename_all = "snake_case")]
pub enum GameAction {
    Mulligan {
        do_mulligan: bool,
    },
    InitialPlacement {
        center_holomem_card_id: String,
        backstage_holomem_card_ids: Vec<String>,
    },
    PlaceCheer {
        /// cheer instance id → holomem instance id
        placements: BTreeMap<String, String>,
    },
    ChooseNewCenter {
        new_center_card_id: String,
    },
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
    },
    MainStepPlaySupport {
        card_id: String,
        #[serde(default)]
        cheer_to_archive_from_play: Vec<String>,
    },
    MainStepBatonPass {
        card_id: String,
    },
    MainStepBeginPerformance {},
    MainStepEndTurn {},
    PerformanceStepUseArt {
        performer_id: String,
        art_id: String,
        target_id: String,
    },
    PerformanceStepEndTurn {},
    EffectResolutionMakeChoice {
        choice_index: usize,
    },
    EffectResolutionChooseCardsForEffect {
        card_ids: Vec<String>,
    },
    EffectResolutionChooseHolomemForEffect {
        card_ids: Vec<String>,
    },
    EffectResolutionOrderCards {
        card_ids: Vec<String>,
    },
    EffectResolutionMoveCheerBetweenHolomems {
        placements: BTreeMap<String, String>,
    },
    EffectResolutionSwapCenterWithBack {
        card_ids: Vec<String>,
    },
}

impl GameAction {
    pub fn is_main_step(&self) -> bool {
        matches!(
            self,
            GameAction::MainStepPlaceHolomem { .. }
                | GameAction::MainStepBloom { .. }
                | GameAction::MainStepCollab { .. }
                | GameAction::MainStepOshiSkill { .. }
                | GameAction::MainStepPlaySupport { .. }
                | GameAction::MainStepBatonPass { .. }
                | GameAction::MainStepBeginPerformance {}
                | GameAction::MainStepEndTurn {}
        )
    }

    pub fn is_performance_step(&self) -> bool {
        matches!(
            self,
            GameAction::PerformanceStepUseArt { .. } | GameAction::PerformanceStepEndTurn {}
        )
    }

    /// Whether this action satisfies the pending decision's
    /// `desired_response` marker.
    pub fn matches(&self, expected: ActionKind) -> bool {
        match expected {
            ActionKind::Mulligan => matches!(self, GameAction::Mulligan { .. }),
            ActionKind::InitialPlacement => matches!(self, GameAction::InitialPlacement { .. }),
            ActionKind::PlaceCheer => matches!(self, GameAction::PlaceCheer { .. }),
            ActionKind::ChooseNewCenter => matches!(self, GameAction::ChooseNewCenter { .. }),
            ActionKind::MainStepAction => self.is_main_step(),
            ActionKind::PerformanceStepAction => self.is_performance_step(),
            ActionKind::EffectResolutionMakeChoice => {
                matches!(self, GameAction::EffectResolutionMakeChoice { .. })
            }
            ActionKind::EffectResolutionChooseCardsForEffect => {
                matches!(self, GameAction::EffectResolutionChooseCardsForEffect { .. })
            }
            ActionKind::EffectResolutionChooseHolomemForEffect => {
                matches!(
                    self,
                    GameAction::EffectResolutionChooseHolomemForEffect { .. }
                )
            }
            ActionKind::EffectResolutionOrderCards => {
                matches!(self, GameAction::EffectResolutionOrderCards { .. })
            }
            ActionKind::EffectResolutionMoveCheerBetweenHolomems => {
                matches!(
                    self,
                    GameAction::EffectResolutionMoveCheerBetweenHolomems { .. }
                )
            }
            ActionKind::EffectResolutionSwapCenterWithBack => {
                matches!(self, GameAction::EffectResolutionSwapCenterWithBack { .. })
            }
        }
    }
}
