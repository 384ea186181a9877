use common_auth::{Tier, TierPolicy};
use proptest::prelude::*;

fn tier_strategy() -> impl Strategy<Value = Tier> {
    prop_oneof![
        Just(Tier::Employee),
        Just(Tier::Manager),
        Just(Tier::Admin),
        "[a-z]{1,8}".prop_map(|raw| Tier::parse(&raw)),
    ]
}

proptest! {
    #[test]
    fn at_least_is_monotonic(user in tier_strategy(), lower in tier_strategy(), higher in tier_strategy()) {
        let policy = TierPolicy::standard();
        prop_assume!(policy.rank(&lower) <= policy.rank(&higher));
        if policy.at_least(&user, &higher) {
            prop_assert!(policy.at_least(&user, &lower));
        }
    }

    #[test]
    fn item_visibility_is_monotonic_in_user_tier(low in tier_strategy(), high in tier_strategy(), item in proptest::option::of(tier_strategy())) {
        let policy = TierPolicy::standard();
        prop_assume!(policy.rank(&low) <= policy.rank(&high));
        if policy.permits_item(&low, item.as_ref()) {
            prop_assert!(policy.permits_item(&high, item.as_ref()));
        }
    }

    #[test]
    fn unknown_user_tiers_see_nothing(raw in "[a-z]{1,8}", item in proptest::option::of(tier_strategy())) {
        let user = Tier::parse(&raw);
        prop_assume!(!user.is_known());
        let policy = TierPolicy::standard();
        prop_assert!(!policy.permits_item(&user, item.as_ref()));
    }
}

#[test]
fn admin_sees_every_item() {
    let policy = TierPolicy::standard();
    for item in [None, Some(Tier::Employee), Some(Tier::Manager), Some(Tier::Admin), Some(Tier::parse("legacy"))] {
        assert!(policy.permits_item(&Tier::Admin, item.as_ref()));
    }
}
