use rand::Rng;

use crate::catalog::{
    Amount, CardDef, CheerSource, ChooseSource, Effect, Limitation, TargetSpec,
};
use crate::protocol::{ActionKind, GameEvent, GameOverReason, ZoneName};

use super::conditions;
use super::{GameEngine, HolomemApply, PendingDecision};

/// 해석 대기열의 한 항목. `ArtDamage` 는 아트 이펙트가 모두 해석된 뒤의
/// 실제 타격으로, 그 사이에 쌓인 부스트를 포함해 계산된다.
#[derive(Clone, Debug)]
pub enum QueuedEffect {
    Spec {
        player: usize,
        effect: Effect,
    },
    ArtDamage {
        player: usize,
        target_id: String,
        base_power: u32,
    },
}

impl GameEngine {
    pub(crate) fn queue_effects_back(&mut self, player: usize, effects: &[Effect]) {
        for effect in effects {
            self.effect_queue.push_back(QueuedEffect::Spec {
                player,
                effect: effect.clone(),
            });
        }
    }

    /// Sub-effects of a resolved choice run before whatever was already
    /// queued behind it.
    pub(crate) fn queue_effects_front(&mut self, player: usize, effects: &[Effect]) {
        for effect in effects.iter().rev() {
            self.effect_queue.push_front(QueuedEffect::Spec {
                player,
                effect: effect.clone(),
            });
        }
    }

    /// Candidate instances for a target spec, with the owning seat.
    fn resolve_target(&self, player: usize, spec: TargetSpec) -> (usize, Vec<String>) {
        let owner = if spec.is_opponent() { 1 - player } else { player };
        let state = &self.players[owner];
        let candidates = match spec {
            TargetSpec::SelfCenter | TargetSpec::OpponentCenter => {
                state.center.iter().cloned().collect()
            }
            TargetSpec::SelfCollab => state.collab.iter().cloned().collect(),
            TargetSpec::SelfHolomem | TargetSpec::OpponentHolomem => state.holomem_in_play(),
            TargetSpec::SelfBackstage | TargetSpec::OpponentBackstage => state.backstage.clone(),
        };
        (owner, candidates)
    }

    fn limitation_matches(&self, owner: usize, card_id: &str, limitation: &Limitation) -> bool {
        let def = match self.definition(owner, card_id) {
            Some(def) => def,
            None => return false,
        };
        match limitation {
            Limitation::NameIn { limitation_names } => {
                limitation_names.iter().any(|name| name == def.name())
            }
            Limitation::ColorIn { limitation_colors } => match def {
                CardDef::Holomem { colors, .. } => {
                    colors.iter().any(|c| limitation_colors.contains(c))
                }
                CardDef::Cheer { color, .. } => limitation_colors.contains(color),
                _ => false,
            },
        }
    }

    fn filter_limitation(
        &self,
        owner: usize,
        candidates: Vec<String>,
        limitation: &Option<Limitation>,
    ) -> Vec<String> {
        match limitation {
            None => candidates,
            Some(limitation) => candidates
                .into_iter()
                .filter(|id| self.limitation_matches(owner, id, limitation))
                .collect(),
        }
    }

    pub(crate) fn resolve_effect(&mut self, queued: QueuedEffect, events: &mut Vec<GameEvent>) {
        match queued {
            QueuedEffect::ArtDamage {
                player,
                target_id,
                base_power,
            } => {
                let owner = 1 - player;
                // The target may already be gone (downed by an art effect).
                if self.players[owner].zone_of(&target_id).is_none() {
                    return;
                }
                let damage = base_power + self.players[player].power_boost;
                self.apply_damage(owner, &target_id, damage, false, events);
            }
            QueuedEffect::Spec { player, effect } => self.resolve_spec(player, effect, events),
        }
    }

    fn resolve_spec(&mut self, player: usize, effect: Effect, events: &mut Vec<GameEvent>) {
        match effect {
            Effect::DealDamage { target, amount } => {
                let (owner, candidates) = self.resolve_target(player, target);
                match candidates.len() {
                    0 => {}
                    1 => self.apply_holomem_effect(
                        owner,
                        &candidates[0],
                        &HolomemApply::DealDamage { amount },
                        events,
                    ),
                    _ => self.pend_choose_holomem(
                        player,
                        owner,
                        candidates,
                        HolomemApply::DealDamage { amount },
                        events,
                    ),
                }
            }

            Effect::RestoreHp {
                target,
                amount,
                limitation,
                multiple_targets,
            } => {
                let (owner, candidates) = self.resolve_target(player, target);
                let candidates = self.filter_limitation(owner, candidates, &limitation);
                if candidates.is_empty() {
                    return;
                }
                if multiple_targets || candidates.len() == 1 {
                    for card_id in candidates {
                        self.apply_holomem_effect(
                            owner,
                            &card_id,
                            &HolomemApply::RestoreHp { amount },
                            events,
                        );
                    }
                } else {
                    self.pend_choose_holomem(
                        player,
                        owner,
                        candidates,
                        HolomemApply::RestoreHp { amount },
                        events,
                    );
                }
            }

            Effect::Draw { amount } => {
                let drawn = self.players[player].draw(amount as usize);
                if !drawn.is_empty() {
                    events.push(GameEvent::Draw {
                        drawing_player_id: self.pid(player),
                        drawn_card_ids: drawn,
                    });
                }
            }

            Effect::GenerateHolopower { amount } => {
                self.players[player].holopower += amount;
                events.push(GameEvent::GenerateHolopower {
                    generating_player_id: self.pid(player),
                    amount,
                    total: self.players[player].holopower,
                });
            }

            Effect::BoostPower { amount, per } => {
                let multiplier = match &per {
                    Some(spec) => conditions::count(&self.players, &self.catalog, player, spec),
                    None => 1,
                };
                let boost = amount * multiplier;
                if boost == 0 {
                    return;
                }
                self.players[player].power_boost += boost;
                events.push(GameEvent::BoostStat {
                    player_id: self.pid(player),
                    amount: boost,
                });
            }

            Effect::SendCheer {
                from,
                to,
                amount_min,
                amount_max,
                limitation,
            } => {
                let from_options: Vec<String> = match from {
                    CheerSource::Archive => {
                        let archived = self.players[player].archive.clone();
                        self.filter_limitation(player, archived, &limitation)
                            .into_iter()
                            .filter(|id| {
                                self.definition(player, id)
                                    .map(|def| def.is_cheer())
                                    .unwrap_or(false)
                            })
                            .collect()
                    }
                    CheerSource::CheerDeck => {
                        let deck = &self.players[player].cheer_deck;
                        deck.iter()
                            .rev()
                            .take(amount_max as usize)
                            .cloned()
                            .collect()
                    }
                };
                let (_, to_options) = self.resolve_target(player, to);
                if from_options.is_empty() || to_options.is_empty() {
                    return;
                }
                let max = (amount_max as usize).min(from_options.len());
                let min = (amount_min as usize).min(max);
                let player_id = self.pid(player);
                self.pending = Some(PendingDecision::EffectSendCheer {
                    player,
                    from,
                    from_options: from_options.clone(),
                    to_options: to_options.clone(),
                    min,
                    max,
                });
                events.push(GameEvent::DecisionSendCheer {
                    event_player_id: player_id.clone(),
                    effect_player_id: player_id,
                    desired_response: ActionKind::EffectResolutionMoveCheerBetweenHolomems,
                    amount_min: min,
                    amount_max: max,
                    from_options,
                    to_options,
                    cheer_on_each_mem: self.players[player].cheer_on_each_mem(),
                });
            }

            Effect::ChooseCards {
                from_zone,
                destination,
                amount_min,
                amount_max,
                limitation,
                reveal_chosen: _,
            } => {
                let seen: Vec<String> = match from_zone {
                    ChooseSource::DeckTop { look_at } => self.players[player]
                        .deck
                        .iter()
                        .rev()
                        .take(look_at as usize)
                        .cloned()
                        .collect(),
                    ChooseSource::Archive => self.players[player].archive.clone(),
                    ChooseSource::Hand => self.players[player].hand.clone(),
                };
                let can_choose = self.filter_limitation(player, seen.clone(), &limitation);
                if can_choose.is_empty() {
                    return;
                }
                let max = (amount_max as usize).min(can_choose.len());
                let min = (amount_min as usize).min(max);
                let player_id = self.pid(player);
                self.pending = Some(PendingDecision::EffectChooseCards {
                    player,
                    can_choose: can_choose.clone(),
                    seen: seen.clone(),
                    min,
                    max,
                    from_zone,
                    destination,
                });
                events.push(GameEvent::DecisionChooseCards {
                    event_player_id: player_id.clone(),
                    effect_player_id: player_id,
                    desired_response: ActionKind::EffectResolutionChooseCardsForEffect,
                    all_card_seen: seen,
                    cards_can_choose: can_choose,
                    amount_min: min,
                    amount_max: max,
                });
            }

            Effect::Choice { options } => {
                let choices: Vec<String> =
                    options.iter().map(|option| option.description.clone()).collect();
                let player_id = self.pid(player);
                self.pending = Some(PendingDecision::EffectChoice {
                    player,
                    options: options.clone(),
                });
                events.push(GameEvent::DecisionChoice {
                    event_player_id: player_id.clone(),
                    effect_player_id: player_id,
                    desired_response: ActionKind::EffectResolutionMakeChoice,
                    choices,
                    min_choice: 0,
                    max_choice: options.len().saturating_sub(1),
                });
            }

            Effect::RollDie { outcomes } => {
                let result: u8 = self.rng.gen_range(1..=6);
                events.push(GameEvent::RollDie {
                    rolling_player_id: self.pid(player),
                    result,
                });
                let mut matched = Vec::new();
                for outcome in &outcomes {
                    if outcome.min <= result && result <= outcome.max {
                        matched.extend(outcome.effects.iter().cloned());
                    }
                }
                self.queue_effects_front(player, &matched);
            }

            Effect::SwitchCenterWithBack { opponent } => {
                let affected = if opponent { 1 - player } else { player };
                let can_choose = self.players[affected].backstage.clone();
                if can_choose.is_empty() {
                    return;
                }
                let player_id = self.pid(affected);
                self.pending = Some(PendingDecision::SwapToCenter {
                    player: affected,
                    can_choose: can_choose.clone(),
                });
                events.push(GameEvent::DecisionSwapHolomemToCenter {
                    event_player_id: player_id.clone(),
                    effect_player_id: player_id,
                    desired_response: ActionKind::EffectResolutionSwapCenterWithBack,
                    cards_can_choose: can_choose,
                });
            }

            Effect::Conditional {
                condition,
                effects,
                else_effects,
            } => {
                let branch = if conditions::evaluate(&self.players, &self.catalog, player, &condition)
                {
                    effects
                } else {
                    else_effects
                };
                self.queue_effects_front(player, &branch);
            }
        }
    }

    fn pend_choose_holomem(
        &mut self,
        chooser: usize,
        target_player: usize,
        candidates: Vec<String>,
        apply: HolomemApply,
        events: &mut Vec<GameEvent>,
    ) {
        let player_id = self.pid(chooser);
        self.pending = Some(PendingDecision::EffectChooseHolomem {
            player: chooser,
            target_player,
            can_choose: candidates.clone(),
            min: 1,
            max: 1,
            apply,
        });
        events.push(GameEvent::DecisionChooseHolomemForEffect {
            event_player_id: player_id.clone(),
            effect_player_id: player_id,
            desired_response: ActionKind::EffectResolutionChooseHolomemForEffect,
            cards_can_choose: candidates,
            amount_min: 1,
            amount_max: 1,
        });
    }

    pub(crate) fn apply_holomem_effect(
        &mut self,
        owner: usize,
        card_id: &str,
        apply: &HolomemApply,
        events: &mut Vec<GameEvent>,
    ) {
        match apply {
            HolomemApply::RestoreHp { amount } => {
                let damage = match self.players[owner].instance(card_id) {
                    Some(instance) => instance.damage,
                    None => return,
                };
                let healed = match amount {
                    Amount::Fixed(n) => damage.min(*n),
                    Amount::All(_) => damage,
                };
                if healed == 0 {
                    return;
                }
                let new_damage = damage - healed;
                if let Some(instance) = self.players[owner].instance_mut(card_id) {
                    instance.damage = new_damage;
                }
                events.push(GameEvent::RestoreHp {
                    target_player: self.pid(owner),
                    card_id: card_id.to_string(),
                    healed_amount: healed,
                    new_damage,
                });
            }
            HolomemApply::DealDamage { amount } => {
                let (hp, damage) = match (
                    self.definition(owner, card_id),
                    self.players[owner].instance(card_id),
                ) {
                    (Some(CardDef::Holomem { hp, .. }), Some(instance)) => (*hp, instance.damage),
                    _ => return,
                };
                let value = match amount {
                    Amount::Fixed(n) => *n,
                    Amount::All(_) => hp.saturating_sub(damage),
                };
                self.apply_damage(owner, card_id, value, true, events);
            }
        }
    }

    /// Damage application and the downed pipeline.
    pub(crate) fn apply_damage(
        &mut self,
        owner: usize,
        card_id: &str,
        amount: u32,
        special: bool,
        events: &mut Vec<GameEvent>,
    ) {
        let (hp, buzz) = match self.definition(owner, card_id) {
            Some(CardDef::Holomem { hp, buzz, .. }) => (*hp, *buzz),
            _ => return,
        };
        let new_damage = {
            let instance = match self.players[owner].instance_mut(card_id) {
                Some(instance) => instance,
                None => return,
            };
            // Displayed damage clamps at max HP.
            instance.damage = (instance.damage + amount).min(hp);
            instance.damage
        };
        events.push(GameEvent::DamageDealt {
            target_player: self.pid(owner),
            target_id: card_id.to_string(),
            damage: amount,
            special,
        });

        if new_damage < hp {
            return;
        }

        // Downed: the member and everything attached goes to the archive,
        // and its owner loses life.
        let was_center = self.players[owner].center.as_deref() == Some(card_id);
        self.players[owner].archive_holomem(card_id);
        let life_lost = if buzz { 2 } else { 1 };
        events.push(GameEvent::DownedHolomem {
            target_player: self.pid(owner),
            card_id: card_id.to_string(),
            life_lost,
        });
        self.players[owner].life = self.players[owner].life.saturating_sub(life_lost);
        let life_remaining = self.players[owner].life;
        events.push(GameEvent::LifeDamageDealt {
            target_player: self.pid(owner),
            life_lost,
            life_remaining,
        });

        if life_remaining == 0 {
            let winner = self.pid(1 - owner);
            let loser = self.pid(owner);
            self.set_game_over(Some(winner), Some(loser), GameOverReason::LifeZero, events);
            return;
        }
        if self.players[owner].holomem_in_play().is_empty() {
            let winner = self.pid(1 - owner);
            let loser = self.pid(owner);
            self.set_game_over(Some(winner), Some(loser), GameOverReason::NoHolomem, events);
            return;
        }

        if was_center && !self.players[owner].backstage.is_empty() {
            let can_choose = self.players[owner].backstage.clone();
            let player_id = self.pid(owner);
            self.pending = Some(PendingDecision::SwapToCenter {
                player: owner,
                can_choose: can_choose.clone(),
            });
            events.push(GameEvent::DecisionSwapHolomemToCenter {
                event_player_id: player_id.clone(),
                effect_player_id: player_id,
                desired_response: ActionKind::EffectResolutionSwapCenterWithBack,
                cards_can_choose: can_choose,
            });
        }
    }

    /// Resume of a `ChooseCards` pause: move the chosen cards, then hand the
    /// untaken deck cards back for bottom-ordering.
    pub(crate) fn apply_choose_cards(
        &mut self,
        player: usize,
        seen: &[String],
        from_zone: ChooseSource,
        destination: crate::catalog::ChooseDestination,
        chosen: &[String],
        events: &mut Vec<GameEvent>,
    ) {
        let from_name = match from_zone {
            ChooseSource::DeckTop { .. } => ZoneName::Deck,
            ChooseSource::Archive => ZoneName::Archive,
            ChooseSource::Hand => ZoneName::Hand,
        };
        for card_id in chosen {
            self.players[player].remove_from_zone(card_id);
            let to_zone = match destination {
                crate::catalog::ChooseDestination::Hand => {
                    self.players[player].hand.push(card_id.clone());
                    ZoneName::Hand
                }
                crate::catalog::ChooseDestination::Archive => {
                    self.players[player].archive.push(card_id.clone());
                    ZoneName::Archive
                }
            };
            events.push(GameEvent::MoveCard {
                moving_player_id: self.pid(player),
                from_zone: from_name,
                to_zone,
                zone_card_id: None,
                card_id: card_id.clone(),
            });
        }

        if let ChooseSource::DeckTop { .. } = from_zone {
            let remainder: Vec<String> = seen
                .iter()
                .filter(|id| !chosen.contains(id))
                .cloned()
                .collect();
            if !remainder.is_empty() {
                let player_id = self.pid(player);
                self.pending = Some(PendingDecision::EffectOrderCards {
                    player,
                    card_ids: remainder.clone(),
                });
                events.push(GameEvent::DecisionOrderCards {
                    event_player_id: player_id.clone(),
                    effect_player_id: player_id,
                    desired_response: ActionKind::EffectResolutionOrderCards,
                    card_ids: remainder,
                    to_zone: ZoneName::Deck,
                });
            }
        }
    }
}
