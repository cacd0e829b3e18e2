use std::collections::{BTreeMap, HashMap};

use crate::catalog::{CardDef, CheerColor, SkillTiming};
use crate::protocol::{AvailableAction, GameAction, GameEvent, PlayRequirementDetail, ZoneName};

use super::effects::QueuedEffect;
use super::state::MAX_BACKSTAGE;
use super::{GameEngine, GamePhase};

impl GameEngine {
    /// 메인 스텝에서 가능한 모든 합법 행동. 매 결정마다 다시 계산된다.
    pub(crate) fn main_step_actions(&self, seat: usize) -> Vec<AvailableAction> {
        let me = &self.players[seat];
        let mut actions = Vec::new();

        // Place a debut/spot holomem from hand. The collab slot counts
        // against the cap so the reset-step return can never overflow the
        // backstage.
        let occupied = me.backstage.len() + usize::from(me.collab.is_some());
        if occupied < MAX_BACKSTAGE {
            for card_id in &me.hand {
                if let Some(def) = self.definition(seat, card_id) {
                    if def.is_debut_holomem() || def.is_spot_holomem() {
                        actions.push(AvailableAction::MainStepPlaceHolomem {
                            card_id: card_id.clone(),
                        });
                    }
                }
            }
        }

        // Bloom onto a same-name member one stage lower.
        for card_id in &me.hand {
            let (bloom_level, name) = match self.definition(seat, card_id) {
                Some(CardDef::Holomem {
                    bloom_level, name, ..
                }) if *bloom_level >= 1 => (*bloom_level, name.clone()),
                _ => continue,
            };
            for target_id in me.holomem_in_play() {
                let target_ok = match self.definition(seat, &target_id) {
                    Some(CardDef::Holomem {
                        bloom_level: target_level,
                        name: target_name,
                        ..
                    }) => *target_level + 1 == bloom_level && *target_name == name,
                    _ => false,
                };
                if !target_ok {
                    continue;
                }
                let instance = match me.instance(&target_id) {
                    Some(i) => i,
                    None => continue,
                };
                if instance.placed_this_turn || instance.bloomed_this_turn {
                    continue;
                }
                actions.push(AvailableAction::MainStepBloom {
                    card_id: card_id.clone(),
                    target_id,
                });
            }
        }

        // Collab from the backstage.
        if me.collab.is_none() && !me.collabed_this_turn {
            for card_id in &me.backstage {
                if let Some(instance) = me.instance(card_id) {
                    if !instance.resting && !instance.placed_this_turn {
                        actions.push(AvailableAction::MainStepCollab {
                            card_id: card_id.clone(),
                        });
                    }
                }
            }
        }

        // Oshi skills, gated by holopower and once-per-turn/game usage.
        if let Some(CardDef::Oshi { skills, .. }) = self.catalog.get(&me.oshi_id) {
            for skill in skills {
                if me.holopower < skill.cost {
                    continue;
                }
                let used = match skill.timing {
                    SkillTiming::OncePerTurn => {
                        me.used_oshi_skills_this_turn.contains(&skill.skill_id)
                    }
                    SkillTiming::OncePerGame => {
                        me.used_oshi_skills_this_game.contains(&skill.skill_id)
                    }
                };
                if !used {
                    actions.push(AvailableAction::MainStepOshiSkill {
                        skill_id: skill.skill_id.clone(),
                        cost: skill.cost,
                    });
                }
            }
        }

        // Support cards from hand.
        let cheer_on_each_mem = me.cheer_on_each_mem();
        let total_cheer_in_play: usize = cheer_on_each_mem.values().map(|v| v.len()).sum();
        for card_id in &me.hand {
            let (limited, play_requirements) = match self.definition(seat, card_id) {
                Some(CardDef::Support {
                    limited,
                    play_requirements,
                    ..
                }) => (*limited, play_requirements.clone()),
                _ => continue,
            };
            if limited && me.limited_support_used {
                continue;
            }
            let requirement_total: u32 = play_requirements.iter().map(|r| r.length()).sum();
            if (requirement_total as usize) > total_cheer_in_play {
                continue;
            }
            let mut requirement_map = BTreeMap::new();
            for requirement in &play_requirements {
                requirement_map.insert(
                    requirement.name().to_string(),
                    PlayRequirementDetail {
                        length: requirement.length(),
                        content_type: "cheer".to_string(),
                    },
                );
            }
            actions.push(AvailableAction::MainStepPlaySupport {
                card_id: card_id.clone(),
                play_requirements: requirement_map,
                cheer_on_each_mem: cheer_on_each_mem.clone(),
            });
        }

        // Baton pass: archive cheer from the center, swap with a backstage
        // member. Once per turn.
        if !me.baton_pass_used {
            if let Some(center_id) = &me.center {
                let cheer_cost = match self.definition(seat, center_id) {
                    Some(CardDef::Holomem { baton_cost, .. }) => *baton_cost,
                    _ => u32::MAX,
                };
                let center_cheer = me
                    .instance(center_id)
                    .map(|i| i.attached_cheer.len())
                    .unwrap_or(0);
                if center_cheer >= cheer_cost as usize {
                    for card_id in &me.backstage {
                        actions.push(AvailableAction::MainStepBatonPass {
                            card_id: card_id.clone(),
                            cheer_cost,
                        });
                    }
                }
            }
        }

        // The first turn of the match has no performance step.
        if self.turn_count >= 2 && (me.center.is_some() || me.collab.is_some()) {
            actions.push(AvailableAction::MainStepBeginPerformance {});
        }
        actions.push(AvailableAction::MainStepEndTurn {});
        actions
    }

    pub(crate) fn performance_step_actions(&self, seat: usize) -> Vec<AvailableAction> {
        let me = &self.players[seat];
        let opponent = &self.players[1 - seat];
        let mut actions = Vec::new();

        let mut valid_targets = Vec::new();
        if let Some(id) = &opponent.center {
            valid_targets.push(id.clone());
        }
        if let Some(id) = &opponent.collab {
            valid_targets.push(id.clone());
        }

        if !valid_targets.is_empty() {
            let mut performers = Vec::new();
            if let Some(id) = &me.center {
                performers.push(id.clone());
            }
            if let Some(id) = &me.collab {
                performers.push(id.clone());
            }
            for performer_id in performers {
                if self.performed_this_turn.contains(&performer_id) {
                    continue;
                }
                let resting = me
                    .instance(&performer_id)
                    .map(|i| i.resting)
                    .unwrap_or(true);
                if resting {
                    continue;
                }
                let arts = match self.definition(seat, &performer_id) {
                    Some(CardDef::Holomem { arts, .. }) => arts.clone(),
                    _ => continue,
                };
                for art in arts {
                    if !self.cheer_covers_cost(seat, &performer_id, &art.costs) {
                        continue;
                    }
                    actions.push(AvailableAction::PerformanceStepUseArt {
                        performer_id: performer_id.clone(),
                        art_id: art.art_id.clone(),
                        power: art.power + me.power_boost,
                        valid_targets: valid_targets.clone(),
                    });
                }
            }
        }

        actions.push(AvailableAction::PerformanceStepEndTurn {});
        actions
    }

    /// Attached cheer covers the art's cost list. Specific symbols consume
    /// matching colors, `any` symbols consume whatever remains.
    pub(crate) fn cheer_covers_cost(
        &self,
        seat: usize,
        performer_id: &str,
        costs: &[CheerColor],
    ) -> bool {
        let me = &self.players[seat];
        let attached = match me.instance(performer_id) {
            Some(instance) => &instance.attached_cheer,
            None => return false,
        };
        let mut tally: HashMap<CheerColor, u32> = HashMap::new();
        let mut remaining = 0u32;
        for cheer_id in attached {
            if let Some(CardDef::Cheer { color, .. }) = self.definition(seat, cheer_id) {
                *tally.entry(*color).or_insert(0) += 1;
                remaining += 1;
            }
        }
        let mut any_needed = 0u32;
        for cost in costs {
            match cost {
                CheerColor::Any => any_needed += 1,
                color => match tally.get_mut(color) {
                    Some(count) if *count > 0 => {
                        *count -= 1;
                        remaining -= 1;
                    }
                    _ => return false,
                },
            }
        }
        remaining >= any_needed
    }

    // --- validation ----------------------------------------------------------

    pub(crate) fn validate_main_action(
        &self,
        available: &[AvailableAction],
        action: &GameAction,
    ) -> Result<(), String> {
        match action {
            GameAction::MainStepPlaceHolomem { card_id } => {
                if available.iter().any(|a| {
                    matches!(a, AvailableAction::MainStepPlaceHolomem { card_id: c } if c == card_id)
                }) {
                    Ok(())
                } else {
                    Err(format!("{} cannot be placed", card_id))
                }
            }
            GameAction::MainStepBloom { card_id, target_id } => {
                if available.iter().any(|a| {
                    matches!(a, AvailableAction::MainStepBloom { card_id: c, target_id: t }
                        if c == card_id && t == target_id)
                }) {
                    Ok(())
                } else {
                    Err(format!("{} cannot bloom onto {}", card_id, target_id))
                }
            }
            GameAction::MainStepCollab { card_id } => {
                if available.iter().any(|a| {
                    matches!(a, AvailableAction::MainStepCollab { card_id: c } if c == card_id)
                }) {
                    Ok(())
                } else {
                    Err(format!("{} cannot collab", card_id))
                }
            }
            GameAction::MainStepOshiSkill { skill_id } => {
                if available.iter().any(|a| {
                    matches!(a, AvailableAction::MainStepOshiSkill { skill_id: s, .. } if s == skill_id)
                }) {
                    Ok(())
                } else {
                    Err(format!("oshi skill {} is not available", skill_id))
                }
            }
            GameAction::MainStepPlaySupport {
                card_id,
                cheer_to_archive_from_play,
            } => {
                let entry = available.iter().find_map(|a| match a {
                    AvailableAction::MainStepPlaySupport {
                        card_id: c,
                        play_requirements,
                        ..
                    } if c == card_id => Some(play_requirements),
                    _ => None,
                });
                let requirements = entry.ok_or_else(|| format!("{} cannot be played", card_id))?;
                if let Some(detail) = requirements.get("cheer_to_archive_from_play") {
                    if cheer_to_archive_from_play.len() != detail.length as usize {
                        return Err(format!(
                            "requirement cheer_to_archive_from_play needs {} cards",
                            detail.length
                        ));
                    }
                    let seat = self
                        .seat_of_card(card_id)
                        .ok_or_else(|| "card owner not found".to_string())?;
                    let mut seen: Vec<&String> = Vec::new();
                    for cheer_id in cheer_to_archive_from_play {
                        if seen.contains(&cheer_id) {
                            return Err(format!("duplicate cheer {}", cheer_id));
                        }
                        if self.players[seat].cheer_holder(cheer_id).is_none() {
                            return Err(format!("{} is not attached cheer in play", cheer_id));
                        }
                        seen.push(cheer_id);
                    }
                } else if !cheer_to_archive_from_play.is_empty() {
                    return Err("no cheer requirement on this card".to_string());
                }
                Ok(())
            }
            GameAction::MainStepBatonPass { card_id } => {
                if available.iter().any(|a| {
                    matches!(a, AvailableAction::MainStepBatonPass { card_id: c, .. } if c == card_id)
                }) {
                    Ok(())
                } else {
                    Err(format!("{} is not a baton pass target", card_id))
                }
            }
            GameAction::MainStepBeginPerformance {} => {
                if available
                    .iter()
                    .any(|a| matches!(a, AvailableAction::MainStepBeginPerformance {}))
                {
                    Ok(())
                } else {
                    Err("performance cannot begin".to_string())
                }
            }
            GameAction::MainStepEndTurn {} => Ok(()),
            _ => Err("not a main step action".to_string()),
        }
    }

    pub(crate) fn validate_performance_action(
        &self,
        available: &[AvailableAction],
        action: &GameAction,
    ) -> Result<(), String> {
        match action {
            GameAction::PerformanceStepUseArt {
                performer_id,
                art_id,
                target_id,
            } => {
                let targets = available.iter().find_map(|a| match a {
                    AvailableAction::PerformanceStepUseArt {
                        performer_id: p,
                        art_id: art,
                        valid_targets,
                        ..
                    } if p == performer_id && art == art_id => Some(valid_targets),
                    _ => None,
                });
                match targets {
                    Some(valid_targets) if valid_targets.contains(target_id) => Ok(()),
                    Some(_) => Err(format!("{} is not a valid art target", target_id)),
                    None => Err(format!("{} cannot use art {}", performer_id, art_id)),
                }
            }
            GameAction::PerformanceStepEndTurn {} => Ok(()),
            _ => Err("not a performance step action".to_string()),
        }
    }

    fn seat_of_card(&self, card_id: &str) -> Option<usize> {
        (0..2).find(|seat| self.players[*seat].instance(card_id).is_some())
    }

    // --- application ---------------------------------------------------------

    pub(crate) fn apply_main_action(
        &mut self,
        seat: usize,
        available: &[AvailableAction],
        action: &GameAction,
        events: &mut Vec<GameEvent>,
    ) {
        match action {
            GameAction::MainStepPlaceHolomem { card_id } => {
                self.players[seat].remove_from_zone(card_id);
                self.players[seat].backstage.push(card_id.clone());
                if let Some(instance) = self.players[seat].instance_mut(card_id) {
                    instance.placed_this_turn = true;
                }
                events.push(GameEvent::MoveCard {
                    moving_player_id: self.pid(seat),
                    from_zone: ZoneName::Hand,
                    to_zone: ZoneName::Backstage,
                    zone_card_id: None,
                    card_id: card_id.clone(),
                });
            }
            GameAction::MainStepBloom { card_id, target_id } => {
                self.apply_bloom(seat, card_id, target_id, events);
            }
            GameAction::MainStepCollab { card_id } => {
                self.players[seat].remove_from_zone(card_id);
                self.players[seat].collab = Some(card_id.clone());
                self.players[seat].collabed_this_turn = true;
                self.players[seat].holopower += 1;
                events.push(GameEvent::Collab {
                    collab_player_id: self.pid(seat),
                    collab_card_id: card_id.clone(),
                    holopower_generated: 1,
                });
            }
            GameAction::MainStepOshiSkill { skill_id } => {
                self.apply_oshi_skill(seat, skill_id, events);
            }
            GameAction::MainStepPlaySupport {
                card_id,
                cheer_to_archive_from_play,
            } => {
                self.apply_play_support(seat, card_id, cheer_to_archive_from_play, events);
            }
            GameAction::MainStepBatonPass { card_id } => {
                self.apply_baton_pass(seat, available, card_id, events);
            }
            GameAction::MainStepBeginPerformance {} => {
                self.phase = GamePhase::Performance;
            }
            GameAction::MainStepEndTurn {} => {
                self.phase = GamePhase::EndTurn;
            }
            _ => {}
        }
    }

    fn apply_bloom(&mut self, seat: usize, card_id: &str, target_id: &str, events: &mut Vec<GameEvent>) {
        self.players[seat].remove_from_zone(card_id);

        // The bloomed-from card, its damage, cheer, and stack all carry over.
        let (damage, cheer, mut stacked, resting) = {
            let target = self.players[seat]
                .instance_mut(target_id)
                .expect("bloom target exists");
            (
                std::mem::take(&mut target.damage),
                std::mem::take(&mut target.attached_cheer),
                std::mem::take(&mut target.stacked),
                target.resting,
            )
        };
        stacked.push(target_id.to_string());

        let target_zone = self.players[seat].zone_of(target_id);
        match target_zone {
            Some(ZoneName::Center) => self.players[seat].center = Some(card_id.to_string()),
            Some(ZoneName::Collab) => self.players[seat].collab = Some(card_id.to_string()),
            Some(ZoneName::Backstage) => {
                let position = self.players[seat]
                    .backstage
                    .iter()
                    .position(|id| id == target_id)
                    .expect("target in backstage");
                self.players[seat].backstage[position] = card_id.to_string();
            }
            _ => return,
        }

        if let Some(instance) = self.players[seat].instance_mut(card_id) {
            instance.damage = damage;
            instance.attached_cheer = cheer;
            instance.stacked = stacked;
            instance.resting = resting;
            instance.bloomed_this_turn = true;
        }
        events.push(GameEvent::Bloom {
            bloom_player_id: self.pid(seat),
            bloom_card_id: card_id.to_string(),
            target_card_id: target_id.to_string(),
        });
    }

    fn apply_oshi_skill(&mut self, seat: usize, skill_id: &str, events: &mut Vec<GameEvent>) {
        let skill = match self.catalog.get(&self.players[seat].oshi_id) {
            Some(CardDef::Oshi { skills, .. }) => {
                match skills.iter().find(|s| s.skill_id == skill_id) {
                    Some(skill) => skill.clone(),
                    None => return,
                }
            }
            _ => return,
        };
        let me = &mut self.players[seat];
        me.holopower = me.holopower.saturating_sub(skill.cost);
        me.oshi_skill_used_this_turn = true;
        me.used_oshi_skills_this_turn.push(skill.skill_id.clone());
        if skill.timing == SkillTiming::OncePerGame {
            me.used_oshi_skills_this_game.push(skill.skill_id.clone());
        }
        events.push(GameEvent::OshiSkillActivation {
            oshi_player_id: self.pid(seat),
            skill_id: skill.skill_id.clone(),
            holopower_spent: skill.cost,
        });
        self.queue_effects_back(seat, &skill.effects);
    }

    fn apply_play_support(
        &mut self,
        seat: usize,
        card_id: &str,
        cheer_to_archive: &[String],
        events: &mut Vec<GameEvent>,
    ) {
        let (limited, effects) = match self.definition(seat, card_id) {
            Some(CardDef::Support {
                limited, effects, ..
            }) => (*limited, effects.clone()),
            _ => return,
        };

        // Pay the play requirement out of play before the card resolves.
        for cheer_id in cheer_to_archive {
            if let Some(holder) = self.players[seat].cheer_holder(cheer_id) {
                if let Some(instance) = self.players[seat].instance_mut(&holder) {
                    instance.attached_cheer.retain(|id| id != cheer_id);
                }
                self.players[seat].archive.push(cheer_id.clone());
                events.push(GameEvent::MoveAttachedCard {
                    owning_player_id: self.pid(seat),
                    from_holomem_id: holder,
                    to_zone: ZoneName::Archive,
                    attached_id: cheer_id.clone(),
                });
            }
        }

        if limited {
            self.players[seat].limited_support_used = true;
        }
        self.players[seat].remove_from_zone(card_id);
        self.players[seat].archive.push(card_id.to_string());
        events.push(GameEvent::PlaySupportCard {
            player_id: self.pid(seat),
            card_id: card_id.to_string(),
            limited,
        });
        self.queue_effects_back(seat, &effects);
    }

    fn apply_baton_pass(
        &mut self,
        seat: usize,
        available: &[AvailableAction],
        new_center: &str,
        events: &mut Vec<GameEvent>,
    ) {
        let cheer_cost = available
            .iter()
            .find_map(|a| match a {
                AvailableAction::MainStepBatonPass { card_id, cheer_cost } if card_id == new_center => {
                    Some(*cheer_cost)
                }
                _ => None,
            })
            .unwrap_or(0);
        let center_id = match self.players[seat].center.clone() {
            Some(id) => id,
            None => return,
        };

        // Cheer payment is taken oldest-attached-first.
        let to_archive: Vec<String> = self.players[seat]
            .instance(&center_id)
            .map(|i| i.attached_cheer.iter().take(cheer_cost as usize).cloned().collect())
            .unwrap_or_default();
        for cheer_id in &to_archive {
            if let Some(instance) = self.players[seat].instance_mut(&center_id) {
                instance.attached_cheer.retain(|id| id != cheer_id);
            }
            self.players[seat].archive.push(cheer_id.clone());
            events.push(GameEvent::MoveAttachedCard {
                owning_player_id: self.pid(seat),
                from_holomem_id: center_id.clone(),
                to_zone: ZoneName::Archive,
                attached_id: cheer_id.clone(),
            });
        }

        self.players[seat].baton_pass_used = true;
        self.apply_swap_to_center(seat, new_center, events);
        events.push(GameEvent::BatonPass {
            active_player: self.pid(seat),
            new_center_id: new_center.to_string(),
        });
    }

    pub(crate) fn apply_performance_action(
        &mut self,
        seat: usize,
        action: &GameAction,
        events: &mut Vec<GameEvent>,
    ) {
        match action {
            GameAction::PerformanceStepUseArt {
                performer_id,
                art_id,
                target_id,
            } => {
                let art = match self.definition(seat, performer_id) {
                    Some(CardDef::Holomem { arts, .. }) => {
                        match arts.iter().find(|a| a.art_id == *art_id) {
                            Some(art) => art.clone(),
                            None => return,
                        }
                    }
                    _ => return,
                };
                events.push(GameEvent::PerformArt {
                    performer_player_id: self.pid(seat),
                    performer_id: performer_id.clone(),
                    art_id: art_id.clone(),
                    target_id: target_id.clone(),
                    power: art.power + self.players[seat].power_boost,
                });
                self.performed_this_turn.push(performer_id.clone());
                // Art effects resolve before the damage lands, so boosts
                // they grant still count into it.
                self.queue_effects_back(seat, &art.effects);
                self.effect_queue.push_back(QueuedEffect::ArtDamage {
                    player: seat,
                    target_id: target_id.clone(),
                    base_power: art.power,
                });
            }
            GameAction::PerformanceStepEndTurn {} => {
                self.phase = GamePhase::EndTurn;
            }
            _ => {}
        }
    }
}
