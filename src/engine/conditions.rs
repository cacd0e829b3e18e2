use crate::catalog::{CardCatalog, CardDef, Condition, CountSpec};

use super::state::PlayerState;

fn holomem_name(catalog: &CardCatalog, state: &PlayerState, card_id: &str) -> Option<String> {
    let definition_id = state.definition_id(card_id)?;
    catalog.get(definition_id).map(|def| def.name().to_string())
}

fn damaged_backstage_count(state: &PlayerState) -> u32 {
    state
        .backstage
        .iter()
        .filter(|id| state.instance(id).map(|c| c.damage > 0).unwrap_or(false))
        .count() as u32
}

/// `(player, condition) → bool`. New predicate kinds extend the closed
/// `Condition` enum; the call contract never changes.
pub fn evaluate(
    players: &[PlayerState; 2],
    catalog: &CardCatalog,
    player: usize,
    condition: &Condition,
) -> bool {
    let me = &players[player];
    let opponent = &players[1 - player];
    match condition {
        Condition::OshiSkillUsedThisTurn => me.oshi_skill_used_this_turn,
        Condition::CollabThisTurn => me.collabed_this_turn,
        Condition::HolopowerAtLeast { amount } => me.holopower >= *amount,
        Condition::DamagedOpponentBackstageAtLeast { count } => {
            damaged_backstage_count(opponent) >= *count
        }
        Condition::SelfHasHolomemNamed { names } => me.holomem_in_play().iter().any(|id| {
            holomem_name(catalog, me, id)
                .map(|name| names.contains(&name))
                .unwrap_or(false)
        }),
        Condition::CenterHasColor { colors } => match &me.center {
            Some(center_id) => me
                .definition_id(center_id)
                .and_then(|definition_id| catalog.get(definition_id))
                .map(|def| match def {
                    CardDef::Holomem {
                        colors: card_colors, ..
                    } => card_colors.iter().any(|c| colors.contains(c)),
                    _ => false,
                })
                .unwrap_or(false),
            None => false,
        },
    }
}

/// Auxiliary count used by `amount_per`-style scaling.
pub fn count(
    players: &[PlayerState; 2],
    catalog: &CardCatalog,
    player: usize,
    spec: &CountSpec,
) -> u32 {
    let me = &players[player];
    let opponent = &players[1 - player];
    match spec {
        CountSpec::SelfHolomemNamed { names } => me
            .holomem_in_play()
            .iter()
            .filter(|id| {
                holomem_name(catalog, me, id)
                    .map(|name| names.contains(&name))
                    .unwrap_or(false)
            })
            .count() as u32,
        CountSpec::DamagedOpponentBackstage => damaged_backstage_count(opponent),
    }
}
