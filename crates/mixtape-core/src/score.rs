//! Music-taste compatibility between two profiles.
//!
//! Each dimension (favourite genres, top artists) contributes an overlap
//! ratio `|a ∩ b| / max(|a|, |b|)`. Artists are compared as a set; their
//! ranking order is ignored. Names are compared after trimming, exactly.
//!
//! A dimension that is empty on one side only has overlap 0. A dimension
//! that is empty on *both* sides carries no information and is left out of
//! the weighting, so two profiles that only list genres are scored on genres
//! alone. When both dimensions are present each weighs 50 %.

use std::collections::BTreeSet;

use crate::profile::Profile;

/// Upper bound of [`score`].
pub const MAX_SCORE: u8 = 100;

/// Compatibility of `a` and `b` in `[0, 100]`.
///
/// Deterministic and commutative; never panics.
pub fn score(a: &Profile, b: &Profile) -> u8 {
  let genres = overlap(
    &normalise(a.favorite_genres.iter()),
    &normalise(b.favorite_genres.iter()),
  );
  let artists = overlap(
    &normalise(a.top_artists.iter()),
    &normalise(b.top_artists.iter()),
  );

  let parts: Vec<f64> = [genres, artists].into_iter().flatten().collect();
  if parts.is_empty() {
    return 0;
  }
  let mean = parts.iter().sum::<f64>() / parts.len() as f64;
  (mean * f64::from(MAX_SCORE)).round().clamp(0.0, f64::from(MAX_SCORE)) as u8
}

fn normalise<'a>(items: impl Iterator<Item = &'a String>) -> BTreeSet<&'a str> {
  items.map(|s| s.trim()).filter(|s| !s.is_empty()).collect()
}

/// `None` when both sides are empty, `Some(0.0)` when only one is.
fn overlap(a: &BTreeSet<&str>, b: &BTreeSet<&str>) -> Option<f64> {
  let denominator = a.len().max(b.len());
  if denominator == 0 {
    return None;
  }
  if a.is_empty() || b.is_empty() {
    return Some(0.0);
  }
  let shared = a.intersection(b).count();
  Some(shared as f64 / denominator as f64)
}

#[cfg(test)]
mod tests {
  use proptest::prelude::*;

  use super::*;

  fn user() -> Profile {
    Profile::new(1, "me").with_genres(["Pop", "Y2K"])
  }

  #[test]
  fn identical_genre_profiles_score_full_marks() {
    let a = Profile::new(2, "a").with_genres(["Pop", "Y2K"]);
    assert_eq!(score(&user(), &a), 100);
  }

  #[test]
  fn partial_genre_overlap_scores_lower() {
    let a = Profile::new(2, "a").with_genres(["Pop", "Y2K"]);
    let b = Profile::new(3, "b").with_genres(["Pop", "Rock"]);
    assert_eq!(score(&user(), &b), 50);
    assert!(score(&user(), &b) < score(&user(), &a));
  }

  #[test]
  fn self_match_is_perfect() {
    let a = Profile::new(5, "a")
      .with_genres(["Pop", "Eurodance", "Trance"])
      .with_artists(["Madonna", "Aqua", "Eiffel 65"]);
    assert_eq!(score(&a, &a), 100);
  }

  #[test]
  fn empty_profile_scores_zero() {
    let empty = Profile::new(9, "blank");
    let full = Profile::new(2, "a")
      .with_genres(["Pop"])
      .with_artists(["Moby"]);
    assert_eq!(score(&empty, &full), 0);
    assert_eq!(score(&full, &empty), 0);
    assert_eq!(score(&empty, &empty), 0);
  }

  #[test]
  fn one_sided_empty_dimension_counts_as_no_overlap() {
    let a = Profile::new(1, "a").with_genres(["Pop"]).with_artists(["Moby"]);
    let b = Profile::new(2, "b").with_genres(["Pop"]);
    assert_eq!(score(&a, &b), 50);
  }

  #[test]
  fn artist_order_is_ignored() {
    let a = Profile::new(1, "a")
      .with_genres(["Pop"])
      .with_artists(["NSYNC", "Britney Spears", "Backstreet Boys"]);
    let b = Profile::new(2, "b")
      .with_genres(["Pop"])
      .with_artists(["Backstreet Boys", "NSYNC", "Britney Spears"]);
    assert_eq!(score(&a, &b), 100);
  }

  #[test]
  fn rounding_is_to_nearest() {
    // genres 1/3, artists 0/1 → mean 1/6 → 16.67 → 17
    let a = Profile::new(1, "a")
      .with_genres(["Pop", "Rock", "Trance"])
      .with_artists(["Moby"]);
    let b = Profile::new(2, "b").with_genres(["Pop"]).with_artists(["Aqua"]);
    assert_eq!(score(&a, &b), 17);
  }

  fn arb_profile() -> impl Strategy<Value = Profile> {
    let names = prop::collection::vec("[a-d]{1,2}", 0..5);
    (names.clone(), names).prop_map(|(genres, artists)| {
      Profile::new(1, "p").with_genres(genres).with_artists(artists)
    })
  }

  proptest! {
    #[test]
    fn score_is_commutative_and_bounded(a in arb_profile(), b in arb_profile()) {
      let ab = score(&a, &b);
      prop_assert_eq!(ab, score(&b, &a));
      prop_assert!(ab <= MAX_SCORE);
    }
  }
}
