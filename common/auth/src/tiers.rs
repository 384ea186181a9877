use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const TIER_EMPLOYEE: &str = "employee";
pub const TIER_MANAGER: &str = "manager";
pub const TIER_ADMIN: &str = "admin";

/// Access tier carried by users, tokens and inventory records.
///
/// Names outside the known set are preserved in `Unknown` so they can be logged and
/// round-tripped, but they rank below every known tier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Tier {
    Employee,
    Manager,
    Admin,
    Unknown(String),
}

impl Tier {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            TIER_EMPLOYEE => Tier::Employee,
            TIER_MANAGER => Tier::Manager,
            TIER_ADMIN => Tier::Admin,
            _ => Tier::Unknown(value.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Tier::Employee => TIER_EMPLOYEE,
            Tier::Manager => TIER_MANAGER,
            Tier::Admin => TIER_ADMIN,
            Tier::Unknown(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Tier::Unknown(_))
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Tier::parse(s))
    }
}

impl From<String> for Tier {
    fn from(value: String) -> Self {
        Tier::parse(&value)
    }
}

impl From<Tier> for String {
    fn from(value: Tier) -> Self {
        value.as_str().to_string()
    }
}

/// Rank table used for every "at least this tier" decision.
///
/// Built once at startup and shared behind an `Arc`. Tiers missing from the table
/// (and every `Tier::Unknown`) rank 0.
#[derive(Debug, Clone)]
pub struct TierPolicy {
    ranks: HashMap<Tier, u8>,
    floor: u8,
}

impl TierPolicy {
    /// employee = 1, manager = 2, admin = 3.
    pub fn standard() -> Self {
        Self::from_ranks([(Tier::Employee, 1), (Tier::Manager, 2), (Tier::Admin, 3)])
    }

    /// Unknown tiers and zero ranks are ignored so the fail-closed default cannot be overridden.
    pub fn from_ranks<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Tier, u8)>,
    {
        let ranks: HashMap<Tier, u8> = entries
            .into_iter()
            .filter(|(tier, rank)| tier.is_known() && *rank > 0)
            .collect();
        let floor = ranks.values().copied().min().unwrap_or(0);
        Self { ranks, floor }
    }

    pub fn rank(&self, tier: &Tier) -> u8 {
        self.ranks.get(tier).copied().unwrap_or(0)
    }

    pub fn rank_of(&self, name: &str) -> u8 {
        self.rank(&Tier::parse(name))
    }

    pub fn at_least(&self, user: &Tier, required: &Tier) -> bool {
        self.rank(user) >= self.rank(required)
    }

    /// Visibility rule for tier-gated records. An absent or unrecognised record tier
    /// requires the lowest defined tier, so rank-0 users never see anything.
    pub fn permits_item(&self, user: &Tier, item_min: Option<&Tier>) -> bool {
        let required = item_min
            .map(|tier| self.rank(tier))
            .unwrap_or(0)
            .max(self.floor)
            .max(1);
        self.rank(user) >= required
    }

    /// Known tiers ordered from least to most privileged.
    pub fn tiers(&self) -> Vec<Tier> {
        let mut tiers: Vec<(Tier, u8)> = self
            .ranks
            .iter()
            .map(|(tier, rank)| (tier.clone(), *rank))
            .collect();
        tiers.sort_by_key(|(_, rank)| *rank);
        tiers.into_iter().map(|(tier, _)| tier).collect()
    }
}

impl Default for TierPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_ranks_are_ordered() {
        let policy = TierPolicy::standard();
        assert_eq!(policy.rank(&Tier::Employee), 1);
        assert_eq!(policy.rank(&Tier::Manager), 2);
        assert_eq!(policy.rank(&Tier::Admin), 3);
        assert_eq!(
            policy.tiers(),
            vec![Tier::Employee, Tier::Manager, Tier::Admin]
        );
    }

    #[test]
    fn unknown_names_rank_zero() {
        let policy = TierPolicy::standard();
        assert_eq!(policy.rank_of("superuser"), 0);
        assert_eq!(policy.rank_of(""), 0);
        assert!(!policy.at_least(&Tier::parse("root"), &Tier::Employee));
    }

    #[test]
    fn parse_is_case_insensitive_and_keeps_raw_unknowns() {
        assert_eq!(Tier::parse(" Admin "), Tier::Admin);
        assert_eq!(Tier::parse("MANAGER"), Tier::Manager);
        assert_eq!(Tier::parse("gerente"), Tier::Unknown("gerente".into()));
        assert_eq!(Tier::parse("gerente").to_string(), "gerente");
    }

    #[test]
    fn serde_uses_plain_names() {
        let json = serde_json::to_string(&Tier::Manager).unwrap();
        assert_eq!(json, "\"manager\"");
        let back: Tier = serde_json::from_str("\"employee\"").unwrap();
        assert_eq!(back, Tier::Employee);
    }

    #[test]
    fn fixture_table_cannot_promote_unknown() {
        let policy = TierPolicy::from_ranks([
            (Tier::Employee, 5),
            (Tier::Admin, 9),
            (Tier::Unknown("root".into()), 200),
        ]);
        assert_eq!(policy.rank(&Tier::Unknown("root".into())), 0);
        assert_eq!(policy.rank(&Tier::Manager), 0);
        assert!(policy.at_least(&Tier::Admin, &Tier::Employee));
    }

    #[test]
    fn item_visibility_defaults_to_lowest_tier() {
        let policy = TierPolicy::standard();
        assert!(policy.permits_item(&Tier::Employee, None));
        assert!(policy.permits_item(&Tier::Employee, Some(&Tier::parse("legacy"))));
        assert!(!policy.permits_item(&Tier::Employee, Some(&Tier::Manager)));
        assert!(policy.permits_item(&Tier::Admin, Some(&Tier::Manager)));
        assert!(!policy.permits_item(&Tier::parse("intern"), None));
    }

    #[test]
    fn empty_table_denies_everything() {
        let policy = TierPolicy::from_ranks(std::iter::empty());
        assert!(!policy.permits_item(&Tier::Admin, None));
    }
}
