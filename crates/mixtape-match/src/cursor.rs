//! Browsing cursor over the candidate order.

use mixtape_core::ProfileId;
use rand_core::RngCore;

/// Redraws allowed before falling back to a direct pick among the others.
const MAX_RESAMPLES: usize = 8;

/// Position within an ordered candidate list.
///
/// Advancing picks the next candidate uniformly at random and never lands on
/// the current one twice in a row while more than one candidate exists.
#[derive(Debug, Clone, Default)]
pub struct Cursor {
  order:    Vec<ProfileId>,
  position: Option<usize>,
}

impl Cursor {
  /// A cursor placed on the first candidate, or on nothing if `order` is
  /// empty.
  pub fn new(order: Vec<ProfileId>) -> Self {
    let position = (!order.is_empty()).then_some(0);
    Self { order, position }
  }

  pub fn order(&self) -> &[ProfileId] { &self.order }

  pub fn position(&self) -> Option<usize> { self.position }

  pub fn current(&self) -> Option<ProfileId> {
    self.position.and_then(|i| self.order.get(i).copied())
  }

  /// Move to a random candidate other than the current one.
  ///
  /// With a single candidate the same profile is returned; with none,
  /// `None`.
  pub fn advance(&mut self, rng: &mut dyn RngCore) -> Option<ProfileId> {
    let len = self.order.len();
    self.position = match (len, self.position) {
      (0, _) => None,
      (1, _) => Some(0),
      (_, None) => Some(uniform(rng, len)),
      (_, Some(current)) => {
        let mut next = uniform(rng, len);
        let mut draws = 1;
        while next == current && draws < MAX_RESAMPLES {
          next = uniform(rng, len);
          draws += 1;
        }
        if next == current {
          next = (current + 1 + uniform(rng, len - 1)) % len;
        }
        Some(next)
      }
    };
    self.current()
  }
}

/// Uniform index in `0..n` without modulo bias. `n` must be non-zero.
fn uniform(rng: &mut dyn RngCore, n: usize) -> usize {
  let n = n as u64;
  // 2^64 mod n: draws below this are rejected so the rest divide evenly.
  let threshold = n.wrapping_neg() % n;
  loop {
    let x = rng.next_u64();
    if x >= threshold {
      return (x % n) as usize;
    }
  }
}
