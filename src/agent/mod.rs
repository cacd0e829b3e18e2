use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::catalog::DeckInfo;
use crate::error::GameError;
use crate::protocol::{AvailableAction, GameAction, GameEvent};

pub mod deck;

pub use deck::{resolve_deck, AgentDeckConfig, BUILTIN_DECKS, DEFAULT_DECK_NAME};

/// 자동 응답자. 고정 그리디 휴리스틱으로 모든 결정 이벤트에 답하는
/// 프로토콜의 실행 가능한 레퍼런스 구현이다. 탐색이나 선읽기는 없다.
pub struct DecisionAgent {
    player_id: String,
    deck: DeckInfo,
    rng: StdRng,
}

impl DecisionAgent {
    pub fn new(player_id: &str, deck: DeckInfo, seed: u64) -> Self {
        Self {
            player_id: player_id.to_string(),
            deck,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    pub fn deck(&self) -> &DeckInfo {
        &self.deck
    }

    /// Scans a batch of events and produces the response to the decision
    /// addressed to this agent, if any. Events addressed to anyone else are
    /// ignored.
    pub fn process_events(
        &mut self,
        events: &[GameEvent],
    ) -> Result<Option<GameAction>, GameError> {
        let mut action = None;
        for event in events {
            if event.event_player_id() != Some(self.player_id.as_str()) {
                continue;
            }
            action = self.handle_decision(event)?;
        }
        Ok(action)
    }

    fn handle_decision(&mut self, event: &GameEvent) -> Result<Option<GameAction>, GameError> {
        match event {
            // Always decline the voluntary mulligan.
            GameEvent::MulliganDecision { .. } => Ok(Some(GameAction::Mulligan {
                do_mulligan: false,
            })),

            // First debut option as center, the rest plus spots fill the
            // backstage up to its cap.
            GameEvent::InitialPlacementBegin {
                debut_options,
                spot_options,
                ..
            } => {
                let center = debut_options
                    .first()
                    .ok_or_else(|| {
                        GameError::UnimplementedDecision("initial placement without debut options".into())
                    })?
                    .clone();
                let mut backstage: Vec<String> = debut_options[1..].to_vec();
                backstage.extend(spot_options.iter().cloned());
                backstage.truncate(5);
                Ok(Some(GameAction::InitialPlacement {
                    center_holomem_card_id: center,
                    backstage_holomem_card_ids: backstage,
                }))
            }

            // All offered cheer onto the first target.
            GameEvent::CheerStep {
                cheer_to_place,
                options,
                ..
            } => {
                let target = options.first().ok_or_else(|| {
                    GameError::UnimplementedDecision("cheer step without targets".into())
                })?;
                let mut placements = BTreeMap::new();
                for cheer_id in cheer_to_place {
                    placements.insert(cheer_id.clone(), target.clone());
                }
                Ok(Some(GameAction::PlaceCheer { placements }))
            }

            GameEvent::ResetStepChooseNewCenter { center_options, .. } => {
                let chosen = center_options.first().ok_or_else(|| {
                    GameError::UnimplementedDecision("no center options".into())
                })?;
                Ok(Some(GameAction::ChooseNewCenter {
                    new_center_card_id: chosen.clone(),
                }))
            }

            GameEvent::DecisionMainStep {
                available_actions, ..
            } => Ok(Some(self.pick_main_action(available_actions))),

            GameEvent::DecisionPerformanceStep {
                available_actions, ..
            } => Ok(Some(self.pick_performance_action(available_actions))),

            // Free choice: minimum index.
            GameEvent::DecisionChoice { min_choice, .. } => {
                Ok(Some(GameAction::EffectResolutionMakeChoice {
                    choice_index: *min_choice,
                }))
            }

            // Bounded multi-choose: take options up to the maximum, in the
            // presented order.
            GameEvent::DecisionChooseCards {
                cards_can_choose,
                amount_max,
                ..
            } => {
                let take = (*amount_max).min(cards_can_choose.len());
                Ok(Some(GameAction::EffectResolutionChooseCardsForEffect {
                    card_ids: cards_can_choose[..take].to_vec(),
                }))
            }

            // Random among legal, mirroring the reference responder.
            GameEvent::DecisionChooseHolomemForEffect {
                cards_can_choose,
                amount_max,
                ..
            } => {
                let mut pool = cards_can_choose.clone();
                let mut chosen = Vec::new();
                for _ in 0..*amount_max {
                    if pool.is_empty() {
                        break;
                    }
                    let index = self.rng.gen_range(0..pool.len());
                    chosen.push(pool.remove(index));
                }
                Ok(Some(GameAction::EffectResolutionChooseHolomemForEffect {
                    card_ids: chosen,
                }))
            }

            // Keep the presented order.
            GameEvent::DecisionOrderCards { card_ids, .. } => {
                Ok(Some(GameAction::EffectResolutionOrderCards {
                    card_ids: card_ids.clone(),
                }))
            }

            // Spread the minimum required cheer over targets that do not
            // already hold it.
            GameEvent::DecisionSendCheer {
                amount_min,
                from_options,
                to_options,
                cheer_on_each_mem,
                ..
            } => {
                let mut placements = BTreeMap::new();
                for cheer_id in from_options.iter().take(*amount_min) {
                    for target in to_options {
                        let already_there = cheer_on_each_mem
                            .get(target)
                            .map(|held| held.contains(cheer_id))
                            .unwrap_or(false);
                        if !already_there {
                            placements.insert(cheer_id.clone(), target.clone());
                            break;
                        }
                    }
                }
                Ok(Some(GameAction::EffectResolutionMoveCheerBetweenHolomems {
                    placements,
                }))
            }

            GameEvent::DecisionSwapHolomemToCenter {
                cards_can_choose, ..
            } => {
                let chosen = cards_can_choose.first().ok_or_else(|| {
                    GameError::UnimplementedDecision("no swap candidates".into())
                })?;
                Ok(Some(GameAction::EffectResolutionSwapCenterWithBack {
                    card_ids: vec![chosen.clone()],
                }))
            }

            // Informational events carry no response obligation. Listed
            // explicitly so a new event kind fails to compile until it is
            // classified.
            GameEvent::GameStartInfo { .. }
            | GameEvent::MulliganReveal { .. }
            | GameEvent::ShuffleDeck { .. }
            | GameEvent::Draw { .. }
            | GameEvent::InitialPlacementPlaced { .. }
            | GameEvent::InitialPlacementReveal { .. }
            | GameEvent::TurnStart { .. }
            | GameEvent::ResetStepActivate { .. }
            | GameEvent::ResetStepCollab { .. }
            | GameEvent::MoveCard { .. }
            | GameEvent::MoveAttachedCard { .. }
            | GameEvent::Bloom { .. }
            | GameEvent::Collab { .. }
            | GameEvent::GenerateHolopower { .. }
            | GameEvent::OshiSkillActivation { .. }
            | GameEvent::PlaySupportCard { .. }
            | GameEvent::BatonPass { .. }
            | GameEvent::MainStepStart { .. }
            | GameEvent::PerformanceStepStart { .. }
            | GameEvent::PerformArt { .. }
            | GameEvent::DamageDealt { .. }
            | GameEvent::RestoreHp { .. }
            | GameEvent::DownedHolomem { .. }
            | GameEvent::LifeDamageDealt { .. }
            | GameEvent::BoostStat { .. }
            | GameEvent::RollDie { .. }
            | GameEvent::EndTurn { .. }
            | GameEvent::GameError { .. }
            | GameEvent::GameOver { .. } => Ok(None),
        }
    }

    /// Fixed priority: place > bloom > collab (random among legal) > oshi
    /// skill (last listed) > support > begin performance > end turn.
    /// Baton pass is deliberately never chosen.
    fn pick_main_action(&mut self, available: &[AvailableAction]) -> GameAction {
        let places: Vec<_> = available
            .iter()
            .filter(|a| matches!(a, AvailableAction::MainStepPlaceHolomem { .. }))
            .collect();
        if let Some(AvailableAction::MainStepPlaceHolomem { card_id }) = places.first() {
            return GameAction::MainStepPlaceHolomem {
                card_id: card_id.clone(),
            };
        }

        if let Some(AvailableAction::MainStepBloom { card_id, target_id }) = available
            .iter()
            .find(|a| matches!(a, AvailableAction::MainStepBloom { .. }))
        {
            return GameAction::MainStepBloom {
                card_id: card_id.clone(),
                target_id: target_id.clone(),
            };
        }

        let collabs: Vec<&AvailableAction> = available
            .iter()
            .filter(|a| matches!(a, AvailableAction::MainStepCollab { .. }))
            .collect();
        if !collabs.is_empty() {
            let index = self.rng.gen_range(0..collabs.len());
            if let AvailableAction::MainStepCollab { card_id } = collabs[index] {
                return GameAction::MainStepCollab {
                    card_id: card_id.clone(),
                };
            }
        }

        // Last listed skill: by convention the once-per-game one.
        if let Some(AvailableAction::MainStepOshiSkill { skill_id, .. }) = available
            .iter()
            .filter(|a| matches!(a, AvailableAction::MainStepOshiSkill { .. }))
            .last()
        {
            return GameAction::MainStepOshiSkill {
                skill_id: skill_id.clone(),
            };
        }

        if let Some(AvailableAction::MainStepPlaySupport {
            card_id,
            play_requirements,
            cheer_on_each_mem,
        }) = available
            .iter()
            .find(|a| matches!(a, AvailableAction::MainStepPlaySupport { .. }))
        {
            let mut cheer_to_archive_from_play = Vec::new();
            if let Some(detail) = play_requirements.get("cheer_to_archive_from_play") {
                let all_cheer: Vec<String> = cheer_on_each_mem
                    .values()
                    .flat_map(|held| held.iter().cloned())
                    .collect();
                cheer_to_archive_from_play =
                    all_cheer.into_iter().take(detail.length as usize).collect();
            }
            return GameAction::MainStepPlaySupport {
                card_id: card_id.clone(),
                cheer_to_archive_from_play,
            };
        }

        if available
            .iter()
            .any(|a| matches!(a, AvailableAction::MainStepBeginPerformance {}))
        {
            return GameAction::MainStepBeginPerformance {};
        }

        GameAction::MainStepEndTurn {}
    }

    /// Last listed art (the strongest by list convention) against its first
    /// valid target.
    fn pick_performance_action(&mut self, available: &[AvailableAction]) -> GameAction {
        if let Some(AvailableAction::PerformanceStepUseArt {
            performer_id,
            art_id,
            valid_targets,
            ..
        }) = available
            .iter()
            .filter(|a| matches!(a, AvailableAction::PerformanceStepUseArt { .. }))
            .last()
        {
            if let Some(target_id) = valid_targets.first() {
                return GameAction::PerformanceStepUseArt {
                    performer_id: performer_id.clone(),
                    art_id: art_id.clone(),
                    target_id: target_id.clone(),
                };
            }
        }
        GameAction::PerformanceStepEndTurn {}
    }
}
