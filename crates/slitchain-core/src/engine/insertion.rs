use super::context::ProvidesChainCreation;
use super::error::EngineError;
use crate::core::models::ids::UnitId;
use nalgebra::Vector3;
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

/// Inserts a new unit into the bond between `existing` and `partner`.
///
/// Candidate positions are `pos(existing) + b` for every registered bond vector `b`,
/// tried in an order shuffled by `rng`. The first candidate whose offset to `partner` is
/// itself a bond vector and whose site is free is taken: the new unit is appended, the
/// old bond is removed and the chain is re-linked as `existing - new - partner`.
///
/// # Arguments
///
/// * `system` - The system being built.
/// * `existing` - One end of the bond to split.
/// * `partner` - The other end of the bond.
/// * `rng` - Source of the candidate order.
///
/// # Return
///
/// The id of the inserted unit, or `None` if no candidate position is feasible. The
/// system is unchanged in the latter case.
///
/// # Errors
///
/// Returns [`EngineError::NotBonded`] if the two units are not bonded and
/// [`EngineError::UnitNotFound`] if either of them does not exist.
pub fn add_unit_between_bonded_pair<S, R>(
    system: &mut S,
    existing: UnitId,
    partner: UnitId,
    rng: &mut R,
) -> Result<Option<UnitId>, EngineError>
where
    S: ProvidesChainCreation + ?Sized,
    R: Rng + ?Sized,
{
    let anchor = system
        .position_of(existing)
        .ok_or(EngineError::UnitNotFound(existing))?;
    let partner_position = system
        .position_of(partner)
        .ok_or(EngineError::UnitNotFound(partner))?;
    if !system.are_connected(existing, partner) {
        return Err(EngineError::NotBonded(existing, partner));
    }

    let mut candidates: Vec<Vector3<i32>> = system.bond_set().iter().copied().collect();
    candidates.shuffle(rng);

    let Some(target) = candidates.into_iter().map(|b| anchor + b).find(|target| {
        system.bond_set().contains(&(partner_position - target)) && system.is_site_free(target)
    }) else {
        return Ok(None);
    };

    let new_id = system.add_unit_at(target);
    system.disconnect(existing, partner)?;
    system.connect(existing, new_id)?;
    system.connect(new_id, partner)?;
    debug!(
        new_id,
        existing,
        partner,
        x = target.x,
        y = target.y,
        z = target.z,
        "Inserted unit between bonded pair."
    );
    Ok(Some(new_id))
}
