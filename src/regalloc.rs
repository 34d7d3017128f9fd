//! Linear-scan register allocation, Poletto & Sarkar style, over the live
//! ranges [`crate::liveness::compute`] produces (§4.6, secondary).

use crate::ir::{TempVersion, Type};
use crate::liveness::LiveRange;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location {
    Register(u32),
    /// Byte offset into the spill area, sized by the temp's `Type`.
    Spill(u32),
}

#[derive(Debug, Clone, Copy)]
pub struct AllocatorConfig {
    pub int_registers: u32,
    pub float_registers: u32,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        AllocatorConfig {
            int_registers: 4,
            float_registers: 4,
        }
    }
}

/// Assigns every `TempVersion` in `ranges` a register or a spill slot.
/// Integer (`Int`, `Bool`) and floating (`Real`) temps are allocated
/// independently from separate register pools (§4.6); spill offsets are
/// drawn from one shared, growing spill area sized by each temp's
/// `Type::size_bytes()`.
pub fn allocate(ranges: &[LiveRange], config: &AllocatorConfig) -> HashMap<TempVersion, Location> {
    let mut int_ranges: Vec<LiveRange> = Vec::new();
    let mut float_ranges: Vec<LiveRange> = Vec::new();
    for &r in ranges {
        match r.temp.origin.ty {
            Type::Real => float_ranges.push(r),
            Type::Int | Type::Bool => int_ranges.push(r),
        }
    }
    int_ranges.sort_by_key(|r| r.start);
    float_ranges.sort_by_key(|r| r.start);

    let mut out = HashMap::new();
    let mut spill_cursor = 0u32;
    linear_scan(&int_ranges, config.int_registers, &mut out, &mut spill_cursor);
    linear_scan(&float_ranges, config.float_registers, &mut out, &mut spill_cursor);
    out
}

struct Active {
    range: LiveRange,
    register: u32,
}

/// One pool's worth of Poletto-Sarkar linear scan: `active` is kept sorted
/// by increasing end; expiry frees registers before considering the next
/// range, and a full pool spills either the new range or whichever active
/// range ends latest, whichever end is later.
fn linear_scan(
    ranges: &[LiveRange],
    num_registers: u32,
    out: &mut HashMap<TempVersion, Location>,
    spill_cursor: &mut u32,
) {
    let mut active: Vec<Active> = Vec::new();
    let mut free: Vec<u32> = (0..num_registers).rev().collect();

    for &range in ranges {
        active.retain(|entry| {
            if entry.range.end < range.start {
                free.push(entry.register);
                false
            } else {
                true
            }
        });
        active.sort_by_key(|entry| entry.range.end);

        if let Some(register) = free.pop() {
            out.insert(range.temp, Location::Register(register));
            active.push(Active { range, register });
            continue;
        }

        let spill_current = match active.last() {
            Some(latest) => latest.range.end <= range.end,
            None => true,
        };
        if spill_current {
            out.insert(
                range.temp,
                Location::Spill(next_slot(spill_cursor, range.temp.origin.ty)),
            );
        } else {
            let evicted = active.pop().expect("pool is full, an active entry exists");
            out.insert(
                evicted.range.temp,
                Location::Spill(next_slot(spill_cursor, evicted.range.temp.origin.ty)),
            );
            out.insert(range.temp, Location::Register(evicted.register));
            active.push(Active {
                range,
                register: evicted.register,
            });
        }
    }
}

fn next_slot(cursor: &mut u32, ty: Type) -> u32 {
    let slot = *cursor;
    *cursor += ty.size_bytes();
    slot
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Temp;

    fn tv(id: u32, ty: Type) -> TempVersion {
        TempVersion {
            origin: Temp {
                id,
                ty,
                is_address: false,
            },
            version: 0,
        }
    }

    #[test]
    fn disjoint_ranges_share_one_register() {
        let ranges = vec![
            LiveRange { temp: tv(0, Type::Int), start: 0, end: 2 },
            LiveRange { temp: tv(1, Type::Int), start: 3, end: 5 },
        ];
        let assignment = allocate(&ranges, &AllocatorConfig { int_registers: 1, float_registers: 1 });
        assert_eq!(assignment[&ranges[0].temp], Location::Register(0));
        assert_eq!(assignment[&ranges[1].temp], Location::Register(0));
    }

    #[test]
    fn overlapping_ranges_beyond_capacity_spill_one() {
        let ranges = vec![
            LiveRange { temp: tv(0, Type::Int), start: 0, end: 10 },
            LiveRange { temp: tv(1, Type::Int), start: 1, end: 2 },
            LiveRange { temp: tv(2, Type::Int), start: 1, end: 9 },
        ];
        let assignment = allocate(&ranges, &AllocatorConfig { int_registers: 2, float_registers: 2 });
        let spilled = ranges
            .iter()
            .filter(|r| matches!(assignment[&r.temp], Location::Spill(_)))
            .count();
        assert_eq!(spilled, 1);
    }

    #[test]
    fn int_and_float_pools_are_independent() {
        let ranges = vec![
            LiveRange { temp: tv(0, Type::Int), start: 0, end: 5 },
            LiveRange { temp: tv(1, Type::Real), start: 0, end: 5 },
        ];
        let assignment = allocate(&ranges, &AllocatorConfig { int_registers: 1, float_registers: 1 });
        assert_eq!(assignment[&ranges[0].temp], Location::Register(0));
        assert_eq!(assignment[&ranges[1].temp], Location::Register(0));
    }
}
