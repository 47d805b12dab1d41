//! Allocator colors
//!
//! Allocators keep an explicit color when their descriptor has one. The rest
//! are assigned palette colors `C0`..`C9` not already taken, in allocator
//! name order, cycling when the palette runs out.

use allocbench_core::AllocatorDescriptor;
use std::collections::BTreeMap;

/// Size of the default palette
pub const PALETTE_SIZE: usize = 10;

/// Fill in every missing color
pub fn assign_colors(allocators: &mut BTreeMap<String, AllocatorDescriptor>) {
    let palette: Vec<String> = (0..PALETTE_SIZE).map(|i| format!("C{}", i)).collect();
    let mut available: Vec<String> = palette
        .iter()
        .filter(|c| !allocators.values().any(|a| a.color.as_ref() == Some(*c)))
        .cloned()
        .collect();
    if available.is_empty() {
        available = palette;
    }

    for (desc, color) in allocators
        .values_mut()
        .filter(|a| a.color.is_none())
        .zip(available.iter().cycle())
    {
        desc.color = Some(color.clone());
    }
}

/// Color of every allocator, explicit or assigned
pub fn allocator_colors(allocators: &BTreeMap<String, AllocatorDescriptor>) -> BTreeMap<String, String> {
    let mut allocators = allocators.clone();
    assign_colors(&mut allocators);
    allocators
        .into_iter()
        .filter_map(|(name, desc)| desc.color.map(|c| (name, c)))
        .collect()
}
