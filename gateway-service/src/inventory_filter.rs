use common_auth::{Tier, TierPolicy};

use crate::models::InventoryItem;

/// Keeps the items `viewer` may see, preserving store order.
///
/// Returns the visible items and how many were withheld.
pub fn visible_items(
    policy: &TierPolicy,
    viewer: &Tier,
    items: Vec<InventoryItem>,
) -> (Vec<InventoryItem>, usize) {
    let total = items.len();
    let visible: Vec<InventoryItem> = items
        .into_iter()
        .filter(|item| policy.permits_item(viewer, item.min_tier().as_ref()))
        .collect();
    let hidden = total - visible.len();
    (visible, hidden)
}
