use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::rngs::StdRng;

use crate::catalog::{CardCatalog, CardDef, DeckInfo};
use crate::error::GameError;
use crate::protocol::ZoneName;

pub const MAX_BACKSTAGE: usize = 5;
pub const HAND_SIZE: usize = 7;

/// 매치 안에서만 존재하는 카드 인스턴스. 엔진만 변경한다.
#[derive(Clone, Debug)]
pub struct CardInstance {
    pub card_id: String,
    pub definition_id: String,
    pub damage: u32,
    pub attached_cheer: Vec<String>,
    /// Lower-stage cards consumed by blooming, kept under this card.
    pub stacked: Vec<String>,
    pub resting: bool,
    pub placed_this_turn: bool,
    pub bloomed_this_turn: bool,
}

impl CardInstance {
    fn new(card_id: String, definition_id: String) -> Self {
        Self {
            card_id,
            definition_id,
            damage: 0,
            attached_cheer: Vec::new(),
            stacked: Vec::new(),
            resting: false,
            placed_this_turn: false,
            bloomed_this_turn: false,
        }
    }
}

/// 한 참가자의 전체 보드 상태. 존 벡터는 인스턴스 id 만 담는다.
///
/// Any instance id lives in exactly one zone vector, one attachment list,
/// or one stacked list at a time.
pub struct PlayerState {
    pub player_id: String,
    pub oshi_id: String,
    pub life: u32,
    pub holopower: u32,

    pub hand: Vec<String>,
    pub deck: Vec<String>,
    pub cheer_deck: Vec<String>,
    pub archive: Vec<String>,
    pub center: Option<String>,
    pub collab: Option<String>,
    pub backstage: Vec<String>,

    pub cards: HashMap<String, CardInstance>,

    // per-turn flags, cleared on turn end
    pub baton_pass_used: bool,
    pub limited_support_used: bool,
    pub collabed_this_turn: bool,
    pub oshi_skill_used_this_turn: bool,
    pub power_boost: u32,

    pub used_oshi_skills_this_turn: Vec<String>,
    pub used_oshi_skills_this_game: Vec<String>,
}

impl PlayerState {
    /// Mints one instance per deck entry. `prefix` keeps ids unique across
    /// both seats ("p1_0", "p2_13", ...); iteration over the BTreeMap deck
    /// keeps minting deterministic for a given deck list.
    pub fn build(
        player_id: &str,
        prefix: &str,
        deck_info: &DeckInfo,
        catalog: &CardCatalog,
    ) -> Result<Self, GameError> {
        let oshi_def = catalog.expect(&deck_info.oshi_id)?;
        let life = match oshi_def {
            CardDef::Oshi { life, .. } => *life,
            _ => return Err(GameError::InvalidDeck(format!("{} is not an oshi", deck_info.oshi_id))),
        };

        let mut cards = HashMap::new();
        let mut deck = Vec::new();
        let mut cheer_deck = Vec::new();
        let mut counter = 0usize;

        let mut mint = |counter: &mut usize| -> String {
            let instance_id = format!("{}_{}", prefix, counter);
            *counter += 1;
            instance_id
        };

        for (definition_id, count) in &deck_info.deck {
            catalog.expect(definition_id)?;
            for _ in 0..*count {
                let id = mint(&mut counter);
                cards.insert(id.clone(), CardInstance::new(id.clone(), definition_id.clone()));
                deck.push(id);
            }
        }
        for (definition_id, count) in &deck_info.cheer_deck {
            catalog.expect(definition_id)?;
            for _ in 0..*count {
                let id = mint(&mut counter);
                cards.insert(id.clone(), CardInstance::new(id.clone(), definition_id.clone()));
                cheer_deck.push(id);
            }
        }

        Ok(Self {
            player_id: player_id.to_string(),
            oshi_id: deck_info.oshi_id.clone(),
            life,
            holopower: 0,
            hand: Vec::new(),
            deck,
            cheer_deck,
            archive: Vec::new(),
            center: None,
            collab: None,
            backstage: Vec::new(),
            cards,
            baton_pass_used: false,
            limited_support_used: false,
            collabed_this_turn: false,
            oshi_skill_used_this_turn: false,
            power_boost: 0,
            used_oshi_skills_this_turn: Vec::new(),
            used_oshi_skills_this_game: Vec::new(),
        })
    }

    pub fn instance(&self, card_id: &str) -> Option<&CardInstance> {
        self.cards.get(card_id)
    }

    pub fn instance_mut(&mut self, card_id: &str) -> Option<&mut CardInstance> {
        self.cards.get_mut(card_id)
    }

    pub fn definition_id(&self, card_id: &str) -> Option<&str> {
        self.cards.get(card_id).map(|c| c.definition_id.as_str())
    }

    pub fn shuffle_deck(&mut self, rng: &mut StdRng) {
        self.deck.shuffle(rng);
    }

    pub fn draw(&mut self, count: usize) -> Vec<String> {
        let mut drawn = Vec::new();
        for _ in 0..count {
            match self.deck.pop() {
                Some(id) => {
                    self.hand.push(id.clone());
                    drawn.push(id);
                }
                None => break,
            }
        }
        drawn
    }

    /// Center, collab, then backstage; the order option lists are presented
    /// in everywhere.
    pub fn holomem_in_play(&self) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(id) = &self.center {
            out.push(id.clone());
        }
        if let Some(id) = &self.collab {
            out.push(id.clone());
        }
        out.extend(self.backstage.iter().cloned());
        out
    }

    pub fn zone_of(&self, card_id: &str) -> Option<ZoneName> {
        if self.hand.iter().any(|id| id == card_id) {
            Some(ZoneName::Hand)
        } else if self.deck.iter().any(|id| id == card_id) {
            Some(ZoneName::Deck)
        } else if self.cheer_deck.iter().any(|id| id == card_id) {
            Some(ZoneName::CheerDeck)
        } else if self.archive.iter().any(|id| id == card_id) {
            Some(ZoneName::Archive)
        } else if self.center.as_deref() == Some(card_id) {
            Some(ZoneName::Center)
        } else if self.collab.as_deref() == Some(card_id) {
            Some(ZoneName::Collab)
        } else if self.backstage.iter().any(|id| id == card_id) {
            Some(ZoneName::Backstage)
        } else {
            None
        }
    }

    /// Detaches `card_id` from whichever zone vector holds it.
    /// Attachment/stack lists are not searched; those belong to a holder.
    pub fn remove_from_zone(&mut self, card_id: &str) -> Option<ZoneName> {
        let zone = self.zone_of(card_id)?;
        match zone {
            ZoneName::Hand => self.hand.retain(|id| id != card_id),
            ZoneName::Deck => self.deck.retain(|id| id != card_id),
            ZoneName::CheerDeck => self.cheer_deck.retain(|id| id != card_id),
            ZoneName::Archive => self.archive.retain(|id| id != card_id),
            ZoneName::Center => self.center = None,
            ZoneName::Collab => self.collab = None,
            ZoneName::Backstage => self.backstage.retain(|id| id != card_id),
            ZoneName::Holomem | ZoneName::Holopower => unreachable!(),
        }
        Some(zone)
    }

    /// Which in-play holomem holds this cheer, if any.
    pub fn cheer_holder(&self, cheer_id: &str) -> Option<String> {
        for holder in self.holomem_in_play() {
            if let Some(instance) = self.cards.get(&holder) {
                if instance.attached_cheer.iter().any(|id| id == cheer_id) {
                    return Some(holder);
                }
            }
        }
        None
    }

    /// All cheer currently attached to in-play holomem, per holder.
    pub fn cheer_on_each_mem(&self) -> std::collections::BTreeMap<String, Vec<String>> {
        let mut out = std::collections::BTreeMap::new();
        for holder in self.holomem_in_play() {
            if let Some(instance) = self.cards.get(&holder) {
                out.insert(holder.clone(), instance.attached_cheer.clone());
            }
        }
        out
    }

    /// Archives an in-play holomem together with its cheer and bloom stack.
    /// Returns every id that landed in the archive.
    pub fn archive_holomem(&mut self, card_id: &str) -> Vec<String> {
        let mut moved = Vec::new();
        if self.remove_from_zone(card_id).is_none() {
            return moved;
        }
        if let Some(instance) = self.cards.get_mut(card_id) {
            let attached = std::mem::take(&mut instance.attached_cheer);
            let stacked = std::mem::take(&mut instance.stacked);
            instance.damage = 0;
            instance.resting = false;
            for id in attached.into_iter().chain(stacked) {
                self.archive.push(id.clone());
                moved.push(id);
            }
        }
        self.archive.push(card_id.to_string());
        moved.push(card_id.to_string());
        moved
    }

    pub fn clear_turn_flags(&mut self) {
        self.baton_pass_used = false;
        self.limited_support_used = false;
        self.collabed_this_turn = false;
        self.oshi_skill_used_this_turn = false;
        self.power_boost = 0;
        self.used_oshi_skills_this_turn.clear();
        for instance in self.cards.values_mut() {
            instance.placed_this_turn = false;
            instance.bloomed_this_turn = false;
        }
    }

    /// Every instance id this player owns, wherever it sits. Used by the
    /// conservation checks in tests.
    pub fn all_card_ids(&self) -> Vec<String> {
        let mut out = Vec::new();
        out.extend(self.hand.iter().cloned());
        out.extend(self.deck.iter().cloned());
        out.extend(self.cheer_deck.iter().cloned());
        out.extend(self.archive.iter().cloned());
        for holder in self.holomem_in_play() {
            if let Some(instance) = self.cards.get(&holder) {
                out.extend(instance.attached_cheer.iter().cloned());
                out.extend(instance.stacked.iter().cloned());
            }
            out.push(holder);
        }
        out
    }
}
