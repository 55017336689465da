use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Ordering applied to listing pages.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SortMode {
    /// Cheapest variant first
    PriceAsc,
    /// Most expensive variant first
    PriceDesc,
    /// Most recently created first
    #[default]
    Newest,
}
