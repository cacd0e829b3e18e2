use serde::{Deserialize, Serialize};

/// 카드 룰 데이터 정의.
///
/// Every rule construct here is a closed tagged enum: an unknown
/// `card_type`, `effect_type`, or `condition` string fails deserialization,
/// so malformed card data is rejected at load time and can never reach a
/// running match.

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CheerColor {
    White,
    Green,
    Red,
    Blue,
    Purple,
    Yellow,
    /// Wildcard cost symbol; satisfied by any attached cheer.
    Any,
}

/// Literal amount or the `"all"` sentinel.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(untagged)]
pub enum Amount {
    Fixed(u32),
    All(AllKeyword),
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AllKeyword {
    All,
}

impl Amount {
    pub fn fixed(&self) -> Option<u32> {
        match self {
            Amount::Fixed(n) => Some(*n),
            Amount::All(_) => None,
        }
    }
}

/// Zone/role filter selecting the candidate set of an effect.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TargetSpec {
    SelfCenter,
    SelfCollab,
    /// Any of the owner's holomem in play (center, collab, backstage).
    SelfHolomem,
    SelfBackstage,
    OpponentCenter,
    OpponentHolomem,
    OpponentBackstage,
}

impl TargetSpec {
    pub fn is_opponent(&self) -> bool {
        matches!(
            self,
            TargetSpec::OpponentCenter | TargetSpec::OpponentHolomem | TargetSpec::OpponentBackstage
        )
    }
}

/// Narrows an effect's candidate set. Serialized as a `limitation` tag plus
/// its companion field, flattened into the owning effect record.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "limitation", rename_all = "snake_case")]
pub enum Limitation {
    NameIn { limitation_names: Vec<String> },
    ColorIn { limitation_colors: Vec<CheerColor> },
}

/// Auxiliary count used to scale a numeric amount.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "count", rename_all = "snake_case")]
pub enum CountSpec {
    SelfHolomemNamed { names: Vec<String> },
    DamagedOpponentBackstage,
}

/// Boolean predicate over board or transient turn state.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "condition", rename_all = "snake_case")]
pub enum Condition {
    OshiSkillUsedThisTurn,
    CollabThisTurn,
    HolopowerAtLeast { amount: u32 },
    DamagedOpponentBackstageAtLeast { count: u32 },
    SelfHasHolomemNamed { names: Vec<String> },
    CenterHasColor { colors: Vec<CheerColor> },
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(tag = "zone", rename_all = "snake_case")]
pub enum ChooseSource {
    DeckTop { look_at: u32 },
    Archive,
    Hand,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChooseDestination {
    Hand,
    Archive,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CheerSource {
    Archive,
    CheerDeck,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ChoiceOption {
    pub description: String,
    pub effects: Vec<Effect>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct DieOutcome {
    pub min: u8,
    pub max: u8,
    pub effects: Vec<Effect>,
}

/// One resolvable effect record, keyed by `effect_type`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "effect_type", rename_all = "snake_case")]
pub enum Effect {
    DealDamage {
        target: TargetSpec,
        amount: Amount,
    },
    RestoreHp {
        target: TargetSpec,
        amount: Amount,
        #[serde(flatten)]
        limitation: Option<Limitation>,
        /// Apply to every matching candidate instead of asking for one.
        #[serde(default)]
        multiple_targets: bool,
    },
    Draw {
        amount: u32,
    },
    GenerateHolopower {
        amount: u32,
    },
    BoostPower {
        amount: u32,
        #[serde(default)]
        per: Option<CountSpec>,
    },
    SendCheer {
        from: CheerSource,
        to: TargetSpec,
        amount_min: u32,
        amount_max: u32,
        #[serde(flatten)]
        limitation: Option<Limitation>,
    },
    ChooseCards {
        from_zone: ChooseSource,
        destination: ChooseDestination,
        amount_min: u32,
        amount_max: u32,
        #[serde(flatten)]
        limitation: Option<Limitation>,
        #[serde(default)]
        reveal_chosen: bool,
    },
    Choice {
        options: Vec<ChoiceOption>,
    },
    RollDie {
        outcomes: Vec<DieOutcome>,
    },
    SwitchCenterWithBack {
        #[serde(default)]
        opponent: bool,
    },
    Conditional {
        #[serde(flatten)]
        condition: Condition,
        effects: Vec<Effect>,
        #[serde(default)]
        else_effects: Vec<Effect>,
    },
}

/// Cost the player must pay out of play before a support card resolves.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "requirement", rename_all = "snake_case")]
pub enum PlayRequirement {
    CheerToArchiveFromPlay { length: u32 },
}

impl PlayRequirement {
    /// Protocol name of the requirement, as it appears in main-step
    /// `play_requirements` maps and in action payloads.
    pub fn name(&self) -> &'static str {
        match self {
            PlayRequirement::CheerToArchiveFromPlay { .. } => "cheer_to_archive_from_play",
        }
    }

    pub fn length(&self) -> u32 {
        match self {
            PlayRequirement::CheerToArchiveFromPlay { length } => *length,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SkillTiming {
    OncePerTurn,
    OncePerGame,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct OshiSkillDef {
    pub skill_id: String,
    /// Holopower spent on activation.
    pub cost: u32,
    pub timing: SkillTiming,
    pub effects: Vec<Effect>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ArtDef {
    pub art_id: String,
    pub power: u32,
    /// Cheer symbols that must be covered by the performer's attached cheer.
    pub costs: Vec<CheerColor>,
    #[serde(default)]
    pub effects: Vec<Effect>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SupportType {
    Staff,
    Item,
    Event,
    Tool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "card_type", rename_all = "snake_case")]
pub enum CardDef {
    Oshi {
        card_id: String,
        name: String,
        life: u32,
        skills: Vec<OshiSkillDef>,
    },
    Holomem {
        card_id: String,
        name: String,
        hp: u32,
        /// 0 = debut, 1 = 1st bloom, 2 = 2nd bloom.
        bloom_level: u8,
        colors: Vec<CheerColor>,
        #[serde(default)]
        tags: Vec<String>,
        #[serde(default)]
        arts: Vec<ArtDef>,
        #[serde(default = "default_baton_cost")]
        baton_cost: u32,
        /// Buzz members are worth 2 life when downed.
        #[serde(default)]
        buzz: bool,
        /// Spot members may only ever sit on the backstage.
        #[serde(default)]
        spot: bool,
    },
    Support {
        card_id: String,
        name: String,
        support_type: SupportType,
        /// At most one limited support may be played per turn.
        #[serde(default)]
        limited: bool,
        effects: Vec<Effect>,
        #[serde(default)]
        play_requirements: Vec<PlayRequirement>,
        /// Exempt from the per-card copy limit in deck validation.
        #[serde(default)]
        unlimited_copies: bool,
    },
    Cheer {
        card_id: String,
        name: String,
        color: CheerColor,
    },
}

fn default_baton_cost() -> u32 {
    1
}

impl CardDef {
    pub fn card_id(&self) -> &str {
        match self {
            CardDef::Oshi { card_id, .. }
            | CardDef::Holomem { card_id, .. }
            | CardDef::Support { card_id, .. }
            | CardDef::Cheer { card_id, .. } => card_id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            CardDef::Oshi { name, .. }
            | CardDef::Holomem { name, .. }
            | CardDef::Support { name, .. }
            | CardDef::Cheer { name, .. } => name,
        }
    }

    pub fn is_holomem(&self) -> bool {
        matches!(self, CardDef::Holomem { .. })
    }

    pub fn is_debut_holomem(&self) -> bool {
        matches!(
            self,
            CardDef::Holomem {
                bloom_level: 0,
                spot: false,
                ..
            }
        )
    }

    pub fn is_spot_holomem(&self) -> bool {
        matches!(self, CardDef::Holomem { spot: true, .. })
    }

    pub fn is_support(&self) -> bool {
        matches!(self, CardDef::Support { .. })
    }

    pub fn is_cheer(&self) -> bool {
        matches!(self, CardDef::Cheer { .. })
    }
}
