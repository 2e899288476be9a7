//! Routing rule priority allocation.

use std::collections::BTreeSet;

use rand::Rng;
use rand::seq::IteratorRandom;

use crate::document::GatewayDocument;
use crate::error::BindingError;

pub const DEFAULT_MIN_PRIORITY: u32 = 1;
pub const DEFAULT_MAX_PRIORITY: u32 = 299;

/// Picks routing rule priorities that no rule in the document uses.
///
/// The choice is random within `min..=max`, so independent reconcilers
/// working on different gateways rarely pick the same sequence. Nothing
/// protects two reconcilers writing the same document at the same time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorityAllocator {
    min: u32,
    max: u32,
}

impl Default for PriorityAllocator {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_PRIORITY,
            max: DEFAULT_MAX_PRIORITY,
        }
    }
}

impl PriorityAllocator {
    /// Creates an allocator for `min..=max`; bounds are swapped if reversed
    /// and `0` is never handed out.
    pub fn new(min: u32, max: u32) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self {
            min: min.max(1),
            max: max.max(1),
        }
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    /// Allocates a priority not used in `document` nor in `reserved`.
    ///
    /// # Errors
    ///
    /// Returns `BindingError::PriorityExhausted` if every value in range is taken.
    pub fn allocate(
        &self,
        document: &GatewayDocument,
        reserved: &BTreeSet<u32>,
    ) -> Result<u32, BindingError> {
        self.allocate_with(document, reserved, &mut rand::thread_rng())
    }

    pub fn allocate_with<R: Rng + ?Sized>(
        &self,
        document: &GatewayDocument,
        reserved: &BTreeSet<u32>,
        rng: &mut R,
    ) -> Result<u32, BindingError> {
        let occupied = document.routing_rule_priorities();
        (self.min..=self.max)
            .filter(|p| !occupied.contains(p) && !reserved.contains(p))
            .choose(rng)
            .ok_or(BindingError::PriorityExhausted {
                min: self.min,
                max: self.max,
            })
    }
}
