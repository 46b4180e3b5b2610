use super::Task;
use crate::core::models::bondset::BondVectorSet;
use crate::core::models::ids::UnitId;
use crate::core::models::lattice::Wall;
use crate::core::utils::lattice::pow2_round_up;
use crate::engine::config::ChainInSlitConfig;
use crate::engine::context::ProvidesChainCreation;
use crate::engine::error::EngineError;
use crate::engine::insertion::add_unit_between_bonded_pair;
use nalgebra::{Point3, Vector3};
use rand::Rng;
use tracing::{debug, info, warn};

const TASK_NAME: &str = "chain_in_slit";

/// Grows a single linear chain inside a slit.
///
/// The first unit sits at the origin and is always pinned. The chain is first stacked
/// straight up the Z axis toward the span height, then lengthened by repeatedly inserting
/// units into the middle bond until the target length is reached. Finally unit ids are
/// renumbered along the chain and the chain ends are pinned according to the fix mode.
///
/// Setup runs once; the chain is built exactly once. A placement failure is fatal and
/// the builder refuses to run again afterwards.
///
/// Insertion always splits a bond of the unit at `placed / 2`, so every inserted unit
/// lands next to the same few units around the middle of the stack. In roomy geometries
/// that neighborhood fills up long before the slit does, and long chains routinely fail
/// with [`EngineError::PlacementExhausted`] (a 128-unit chain in a 32-wide slit never
/// completes). Chains that fit mostly into the stacked column build reliably.
pub struct ChainInSlitCreator<R> {
    config: ChainInSlitConfig,
    rng: R,
    is_initialized: bool,
    is_executed: bool,
    is_aborted: bool,
}

impl<R: Rng> ChainInSlitCreator<R> {
    pub fn new(config: ChainInSlitConfig, rng: R) -> Self {
        Self {
            config,
            rng,
            is_initialized: false,
            is_executed: false,
            is_aborted: false,
        }
    }

    pub fn config(&self) -> &ChainInSlitConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.is_initialized
    }

    pub fn is_executed(&self) -> bool {
        self.is_executed
    }

    /// Rejects geometries the growth algorithm cannot satisfy. Must not touch the system.
    fn check_feasibility(&self) -> Result<(), EngineError> {
        self.config.validate()?;
        let ChainInSlitConfig {
            chain_length,
            slit_size,
            fix_mode,
            ..
        } = self.config;

        let reach = (chain_length as u64).saturating_mul(3);
        if fix_mode.pins_both_ends() && reach < u64::from(slit_size).saturating_sub(1) {
            return Err(EngineError::InfeasibleGeometry {
                chain_length,
                slit_size,
            });
        }
        let span_height = self.config.span_height();
        if chain_length > 1 && span_height < 4 {
            return Err(EngineError::NoRoomToStack { span_height });
        }
        Ok(())
    }

    fn setup<S>(&self, system: &mut S) -> Result<(), EngineError>
    where
        S: ProvidesChainCreation + ?Sized,
    {
        self.check_feasibility()?;

        let slit_size = self.config.slit_size;
        let box_z = u32::try_from(pow2_round_up(i64::from(slit_size))).map_err(|_| {
            EngineError::Internal(format!("box height for slit size {} overflows", slit_size))
        })?;
        let box_xy = self.config.box_xy;
        system.configure_box([box_xy, box_xy, box_z], [true, true, false]);

        if box_z != slit_size {
            let wall_z = i32::try_from(slit_size).map_err(|_| {
                EngineError::Internal(format!("slit size {} exceeds the lattice", slit_size))
            })?;
            system.add_wall(Wall::new(Point3::new(0, 0, wall_z), Vector3::new(0, 0, 1)));
            debug!(z = wall_z, "Installed slit wall.");
        }

        system.register_bond_set(&BondVectorSet::classic());
        system.synchronize();

        info!(
            box_x = box_xy,
            box_y = box_xy,
            box_z,
            fix_mode = %self.config.fix_mode,
            "Slit geometry configured."
        );
        Ok(())
    }

    fn grow<S>(&mut self, system: &mut S) -> Result<(), EngineError>
    where
        S: ProvidesChainCreation + ?Sized,
    {
        let target = self.config.chain_length;
        let pinned_ends = self.config.fix_mode.pins_both_ends();
        let span_height = i64::from(self.config.span_height());

        let first = system.add_unit_at(Point3::origin());
        system.set_movable(first, false)?;

        let stack_size = ((span_height - 2) / 2).max(0) as usize;
        let stack_size = stack_size.min(target.saturating_sub(1));
        let mut previous = first;
        for k in 1..=stack_size {
            let mut z = 2 * k as i64;
            let mut pinned = false;
            if pinned_ends && z == span_height - 2 {
                pinned = true;
            }
            if pinned_ends && z == span_height - 3 {
                z = span_height - 2;
                pinned = true;
            }
            let z = i32::try_from(z)
                .map_err(|_| EngineError::Internal(format!("stack height {} overflows", z)))?;
            let unit = system.add_unit_at(Point3::new(0, 0, z));
            system.connect(previous, unit)?;
            if pinned {
                system.set_movable(unit, false)?;
            }
            previous = unit;
        }
        debug!(stacked = stack_size + 1, "Stacked initial column.");

        while system.unit_count() < target {
            let placed = system.unit_count();
            let mono = placed / 2;
            let slot = if mono > 0 { 0 } else { 1 };
            let partner = system
                .neighbors_of(mono)
                .and_then(|neighbors| neighbors.get(slot).copied())
                .ok_or_else(|| {
                    EngineError::Internal(format!("unit {} has no bond in slot {}", mono, slot))
                })?;

            if add_unit_between_bonded_pair(system, mono, partner, &mut self.rng)?.is_none() {
                return Err(EngineError::PlacementExhausted {
                    existing: mono,
                    partner,
                    placed,
                    target,
                });
            }
        }

        self.finalize(system)
    }

    /// Renumbers the units along the chain and pins its ends.
    fn finalize<S>(&self, system: &mut S) -> Result<(), EngineError>
    where
        S: ProvidesChainCreation + ?Sized,
    {
        let order = chain_order(system)?;
        system.renumber(&order)?;
        system.synchronize();

        let count = system.unit_count();
        let last = count - 1;
        system.set_movable(0, false)?;
        if self.config.fix_mode.pins_both_ends() {
            for id in 1..last {
                system.set_movable(id, true)?;
            }
            system.set_movable(last, false)?;

            let expected_z = i64::from(self.config.span_height()) - 2;
            if let Some(end) = system.position_of(last) {
                if i64::from(end.z) != expected_z && count > 1 {
                    warn!(
                        z = end.z,
                        expected_z, "Pinned chain end is not at the span height."
                    );
                }
            }
        }

        info!(units = count, "Chain construction complete.");
        Ok(())
    }
}

/// Walks the chain from unit 0 and returns the visited ids in order.
fn chain_order<S>(system: &S) -> Result<Vec<UnitId>, EngineError>
where
    S: ProvidesChainCreation + ?Sized,
{
    let count = system.unit_count();
    let mut order = Vec::with_capacity(count);
    let mut previous: Option<UnitId> = None;
    let mut current = 0;
    loop {
        order.push(current);
        let neighbors = system
            .neighbors_of(current)
            .ok_or(EngineError::UnitNotFound(current))?;
        let mut onward = neighbors.iter().copied().filter(|&n| Some(n) != previous);
        let next = onward.next();
        if onward.next().is_some() {
            return Err(EngineError::Internal(format!(
                "unit {} branches; expected a linear chain",
                current
            )));
        }
        match next {
            Some(next) if order.len() < count => {
                previous = Some(current);
                current = next;
            }
            Some(_) => {
                return Err(EngineError::Internal(
                    "chain walk revisits a unit".to_string(),
                ));
            }
            None => break,
        }
    }
    if order.len() != count {
        return Err(EngineError::Internal(format!(
            "chain walk from unit 0 reached {} of {} units",
            order.len(),
            count
        )));
    }
    Ok(order)
}

impl<S, R> Task<S> for ChainInSlitCreator<R>
where
    S: ProvidesChainCreation + ?Sized,
    R: Rng,
{
    fn name(&self) -> &'static str {
        TASK_NAME
    }

    fn initialize(&mut self, system: &mut S) -> Result<(), EngineError> {
        if !self.is_initialized {
            info!(
                chain_length = self.config.chain_length,
                slit_size = self.config.slit_size,
                "Initializing chain-in-slit builder."
            );
            self.setup(system)?;
            self.is_initialized = true;
        }
        self.execute(system)
    }

    fn execute(&mut self, system: &mut S) -> Result<(), EngineError> {
        if self.is_aborted {
            return Err(EngineError::BuildAborted);
        }
        if !self.is_initialized {
            return Err(EngineError::NotInitialized(TASK_NAME));
        }
        if self.is_executed {
            debug!("Chain already built; nothing to do.");
            return Ok(());
        }

        if let Err(e) = self.grow(system) {
            self.is_aborted = true;
            return Err(e);
        }
        self.is_executed = true;
        Ok(())
    }

    fn cleanup(&mut self, _system: &mut S) -> Result<(), EngineError> {
        Ok(())
    }
}
