//! Degrading items from feeds that failed signature validation

use crate::models::AppcastItem;
use sparkfeed_types::SigningValidationStatus;

/// Apply the safe fallback mode to an item when its feed failed validation.
///
/// Items from `Skipped` or `Succeeded` feeds pass through untouched. Items
/// from a `Failed` feed lose their critical and informational markers,
/// their inline release notes and every link-bearing field. The enclosure
/// is left alone since its archive carries its own signature.
#[must_use]
pub fn sanitize(mut item: AppcastItem, status: SigningValidationStatus) -> AppcastItem {
    if !status.is_failed() {
        return item;
    }

    item.critical = false;
    item.informational = false;
    item.release_notes = None;
    item.release_notes_url = None;
    item.full_release_notes_url = None;
    item.info_url = None;
    item
}
