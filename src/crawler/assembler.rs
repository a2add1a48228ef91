//! Record assembler: folds per-level context into one flat record per unit

use crate::models::{same_label, BlockDetails, FlatTypeContext, UnitFields, UnitRecord};
use crate::{ScrapeError, WalkState};

/// Merges flat-type context, block details and one unit's fields
///
/// A block-detail label that reuses a flat-type or unit field name would make
/// the flattened record ambiguous, so it is rejected rather than letting one
/// side win.
pub fn assemble(
    context: &FlatTypeContext,
    details: &BlockDetails,
    unit: UnitFields,
) -> Result<UnitRecord, ScrapeError> {
    if let Some((label, _)) = details
        .iter()
        .find(|(label, _)| UnitRecord::RESERVED.iter().any(|r| same_label(label, r)))
    {
        return Err(ScrapeError::structural(
            WalkState::AtBlockDetail,
            format!(
                "block {} detail '{}' collides with a flat-type or unit field",
                details.block_id(),
                label
            ),
        ));
    }

    Ok(UnitRecord {
        town: context.town.clone(),
        flat_type: context.flat_type.clone(),
        block_id: details.block_id().to_string(),
        unit: unit.unit,
        price: unit.price,
        size: unit.size,
        details: details.clone(),
    })
}
