//! Vote entity (pump/dump sentiment on a token).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sentiment expressed by a vote.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// The voter expects the price to go up.
    #[sea_orm(string_value = "pump")]
    Pump,
    /// The voter expects the price to go down.
    #[sea_orm(string_value = "dump")]
    Dump,
}

impl Direction {
    /// The opposite sentiment.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Pump => Self::Dump,
            Self::Dump => Self::Pump,
        }
    }

    /// Wire name of the direction.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pump => "pump",
            Self::Dump => "dump",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vote")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The token being voted on
    #[sea_orm(indexed)]
    pub token_id: String,

    /// The voter (None for anonymous votes)
    #[sea_orm(indexed)]
    pub voter_id: Option<String>,

    pub direction: Direction,

    /// Token price snapshot taken when the vote was cast
    pub price_at_vote: Option<f64>,

    /// Outcome label written by the external evaluation job
    pub is_correct: Option<bool>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,

    pub checked_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
