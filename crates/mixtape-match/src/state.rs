//! Synchronous state behind [`crate::MatchController`].
//!
//! Everything here runs under the controller's mutex and never awaits. The
//! async side begins a mutation with [`State::begin`], runs the network call
//! on a spawned task, and finishes with [`State::settle`] (from that task) or
//! [`State::abandon`] (when the caller's timeout fires first). Each mutation
//! carries an op id so exactly one of the two takes effect.

use std::collections::{BTreeMap, HashMap, HashSet};

use mixtape_core::{EdgeState, Error, Profile, ProfileId, score};
use rand_core::RngCore;
use tracing::debug;

use crate::cursor::Cursor;

// ─── Pending mutations ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mutation {
  Add,
  Remove,
}

/// Who started a mutation, which decides its side effects on success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Origin {
  /// Like / dislike from a browsing session: advances the cursor. Discarded
  /// if that session is gone by the time the call resolves.
  Swipe { generation: u64 },
  /// Removal from the friends list view: not tied to a browsing session.
  FriendsList,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Pending {
  op:       u64,
  mutation: Mutation,
  origin:   Origin,
}

/// What happened to a resolved mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Settled {
  Applied,
  /// The originating session is gone; nothing visible changed.
  Discarded,
  /// The caller already gave up on this op (timeout).
  Superseded,
}

// ─── Browsing session ─────────────────────────────────────────────────────────

/// One mounted discover view: candidate snapshot, cursor and liked set.
pub(crate) struct Browsing {
  pub generation: u64,
  pub candidates: Vec<Profile>,
  index:          HashMap<ProfileId, usize>,
  pub cursor:     Cursor,
  /// Liked profiles with their compatibility score at the time of the like.
  pub liked:      BTreeMap<ProfileId, u8>,
}

impl Browsing {
  fn new(generation: u64, candidates: Vec<Profile>) -> Self {
    let index = candidates.iter().enumerate().map(|(i, p)| (p.id, i)).collect();
    let cursor = Cursor::new(candidates.iter().map(|p| p.id).collect());
    Self { generation, candidates, index, cursor, liked: BTreeMap::new() }
  }

  pub fn get(&self, id: ProfileId) -> Option<&Profile> {
    self.index.get(&id).and_then(|&i| self.candidates.get(i))
  }
}

// ─── State ────────────────────────────────────────────────────────────────────

pub(crate) struct State {
  next_op:        u64,
  generation:     u64,
  pub browsing:   Option<Browsing>,
  /// The session user's own profile, used as the scoring reference.
  pub me:         Option<Profile>,
  /// Confirmed friend ids. Pending edges keep their pre-call value here.
  pub friend_ids: HashSet<ProfileId>,
  pending:        HashMap<ProfileId, Pending>,
  /// Friends list view cache; `None` until first loaded.
  pub friends:    Option<Vec<Profile>>,
  pub last_error: Option<Error>,
  /// Friend annotations may not match the server.
  pub stale:      bool,
  pub rng:        Box<dyn RngCore + Send>,
}

impl State {
  pub fn new(rng: Box<dyn RngCore + Send>) -> Self {
    Self {
      next_op: 0,
      generation: 0,
      browsing: None,
      me: None,
      friend_ids: HashSet::new(),
      pending: HashMap::new(),
      friends: None,
      last_error: None,
      stale: false,
      rng,
    }
  }

  // ── Session lifecycle ─────────────────────────────────────────────────────

  /// Start a new browsing session over `candidates`, replacing any current
  /// one. Returns its generation.
  pub fn mount(&mut self, me: Option<Profile>, candidates: Vec<Profile>) -> u64 {
    self.generation += 1;
    self.me = me;
    self.browsing = Some(Browsing::new(self.generation, candidates));
    self.generation
  }

  pub fn unmount(&mut self) { self.browsing = None; }

  fn is_live(&self, origin: Origin) -> bool {
    match origin {
      Origin::FriendsList => true,
      Origin::Swipe { generation } => {
        self.browsing.as_ref().is_some_and(|b| b.generation == generation)
      }
    }
  }

  // ── Edges ─────────────────────────────────────────────────────────────────

  pub fn edge(&self, id: ProfileId) -> EdgeState {
    match self.pending.get(&id).map(|p| p.mutation) {
      Some(Mutation::Add) => EdgeState::PendingAdd,
      Some(Mutation::Remove) => EdgeState::PendingRemove,
      None => EdgeState::from_friend(self.friend_ids.contains(&id)),
    }
  }

  pub fn is_pending(&self, id: ProfileId) -> bool { self.pending.contains_key(&id) }

  /// Replace the confirmed friend set with an authoritative listing.
  pub fn reconcile_friends(&mut self, friends: Vec<Profile>) {
    self.friend_ids = friends.iter().map(|p| p.id).collect();
    self.friends = Some(friends);
    self.stale = false;
  }

  // ── Errors ────────────────────────────────────────────────────────────────

  /// Retain `err` for display and hand it back for returning.
  pub fn fail(&mut self, err: Error) -> Error {
    self.last_error = Some(err.clone());
    err
  }

  pub fn succeed(&mut self) { self.last_error = None; }

  // ── Cursor ────────────────────────────────────────────────────────────────

  pub fn advance(&mut self) -> Option<ProfileId> {
    let browsing = self.browsing.as_mut()?;
    browsing.cursor.advance(self.rng.as_mut())
  }

  // ── Mutations ─────────────────────────────────────────────────────────────

  /// Mark `id` as pending. The caller must have checked
  /// [`State::is_pending`].
  pub fn begin(&mut self, id: ProfileId, mutation: Mutation, origin: Origin) -> u64 {
    self.next_op += 1;
    let op = self.next_op;
    self.pending.insert(id, Pending { op, mutation, origin });
    op
  }

  /// Apply the outcome of op `op` on `id`, unless it was abandoned.
  pub fn settle(&mut self, id: ProfileId, op: u64, outcome: &Result<(), Error>) -> Settled {
    let Some(pending) = self.pending.get(&id).copied().filter(|p| p.op == op) else {
      debug!(profile = %id, op, "mutation resolved after its caller gave up");
      return Settled::Superseded;
    };
    self.pending.remove(&id);

    if !self.is_live(pending.origin) {
      debug!(profile = %id, op, ok = outcome.is_ok(), "discarding resolution for a closed session");
      // The edge cache outlives browsing sessions and must follow the server.
      if outcome.is_ok() {
        self.confirm(id, pending.mutation);
      }
      return Settled::Discarded;
    }

    match outcome {
      Ok(()) => {
        self.confirm(id, pending.mutation);
        self.succeed();
        if let Origin::Swipe { .. } = pending.origin {
          if pending.mutation == Mutation::Add {
            self.record_like(id);
          }
          self.advance();
        }
      }
      Err(e) => {
        self.last_error = Some(e.clone());
      }
    }
    Settled::Applied
  }

  /// Give up on op `op` after a timeout: revert to the pre-call state.
  ///
  /// Returns `false` if the op already settled.
  pub fn abandon(&mut self, id: ProfileId, op: u64, err: &Error) -> bool {
    let Some(pending) = self.pending.get(&id).copied().filter(|p| p.op == op) else {
      return false;
    };
    self.pending.remove(&id);
    // The server may still apply the mutation.
    self.stale = true;
    if self.is_live(pending.origin) {
      self.last_error = Some(err.clone());
    }
    true
  }

  fn confirm(&mut self, id: ProfileId, mutation: Mutation) {
    match mutation {
      Mutation::Add => {
        self.friend_ids.insert(id);
        let profile = self.browsing.as_ref().and_then(|b| b.get(id)).cloned();
        if let Some(friends) = self.friends.as_mut()
          && !friends.iter().any(|f| f.id == id)
        {
          match profile {
            Some(profile) => friends.push(profile),
            // The profile left with its session; the list is now incomplete.
            None => self.stale = true,
          }
        }
      }
      Mutation::Remove => {
        self.friend_ids.remove(&id);
        if let Some(friends) = self.friends.as_mut() {
          friends.retain(|f| f.id != id);
        }
      }
    }
  }

  fn record_like(&mut self, id: ProfileId) {
    let score = self.score_of(id);
    if let Some(browsing) = self.browsing.as_mut() {
      browsing.liked.insert(id, score);
    }
  }

  /// Compatibility of a candidate with the session user; 0 when either
  /// profile is unknown.
  pub fn score_of(&self, id: ProfileId) -> u8 {
    let candidate = self.browsing.as_ref().and_then(|b| b.get(id));
    match (self.me.as_ref(), candidate) {
      (Some(me), Some(p)) => score(me, p),
      _ => 0,
    }
  }
}

#[cfg(test)]
mod tests {
  use rand_core::OsRng;

  use super::*;

  fn state_with(candidates: &[i64]) -> (State, u64) {
    let mut st = State::new(Box::new(OsRng));
    let me = Profile::new(0, "me").with_genres(["Pop"]);
    let generation = st.mount(
      Some(me),
      candidates.iter().map(|&i| Profile::new(i, format!("p{i}")).with_genres(["Pop"])).collect(),
    );
    (st, generation)
  }

  #[test]
  fn settle_applies_like_once() {
    let (mut st, generation) = state_with(&[1, 2]);
    let id = ProfileId(1);
    let op = st.begin(id, Mutation::Add, Origin::Swipe { generation });
    assert_eq!(st.edge(id), EdgeState::PendingAdd);

    assert_eq!(st.settle(id, op, &Ok(())), Settled::Applied);
    assert_eq!(st.edge(id), EdgeState::Friend);
    assert_eq!(st.browsing.as_ref().unwrap().liked.get(&id), Some(&100));
    assert_eq!(st.browsing.as_ref().unwrap().cursor.current(), Some(ProfileId(2)));

    // A second resolution of the same op is ignored.
    assert_eq!(st.settle(id, op, &Ok(())), Settled::Superseded);
  }

  #[test]
  fn abandon_reverts_and_blocks_late_settle() {
    let (mut st, generation) = state_with(&[1, 2]);
    let id = ProfileId(2);
    let op = st.begin(id, Mutation::Add, Origin::Swipe { generation });
    let err = Error::Timeout(std::time::Duration::from_secs(10));

    assert!(st.abandon(id, op, &err));
    assert_eq!(st.edge(id), EdgeState::None);
    assert!(st.stale);
    assert_eq!(st.last_error, Some(err));
    assert_eq!(st.settle(id, op, &Ok(())), Settled::Superseded);
    assert_eq!(st.edge(id), EdgeState::None);
  }

  #[test]
  fn settle_after_unmount_is_discarded() {
    let (mut st, generation) = state_with(&[1]);
    let id = ProfileId(1);
    let op = st.begin(id, Mutation::Add, Origin::Swipe { generation });
    st.unmount();

    assert_eq!(st.settle(id, op, &Ok(())), Settled::Discarded);
    assert!(!st.is_pending(id));
    // The server-confirmed edge is kept; nothing else changes.
    assert_eq!(st.edge(id), EdgeState::Friend);
    assert!(!st.stale);
    assert!(st.last_error.is_none());
  }

  #[test]
  fn settle_after_unmount_flags_unlisted_friend() {
    let (mut st, generation) = state_with(&[1]);
    st.reconcile_friends(Vec::new());
    let id = ProfileId(1);
    let op = st.begin(id, Mutation::Add, Origin::Swipe { generation });
    st.unmount();

    assert_eq!(st.settle(id, op, &Ok(())), Settled::Discarded);
    assert_eq!(st.edge(id), EdgeState::Friend);
    assert_eq!(st.friends.as_deref(), Some(&[][..]));
    assert!(st.stale);
  }

  #[test]
  fn failed_settle_after_unmount_keeps_edge() {
    let (mut st, generation) = state_with(&[1]);
    let id = ProfileId(1);
    let op = st.begin(id, Mutation::Add, Origin::Swipe { generation });
    st.unmount();

    let err = Error::Server { status: 500, message: "boom".into() };
    assert_eq!(st.settle(id, op, &Err(err)), Settled::Discarded);
    assert_eq!(st.edge(id), EdgeState::None);
    assert!(st.last_error.is_none());
  }

  #[test]
  fn settle_into_newer_session_confirms_edge_only() {
    let (mut st, generation) = state_with(&[1, 2]);
    let id = ProfileId(1);
    let op = st.begin(id, Mutation::Add, Origin::Swipe { generation });
    st.mount(None, vec![Profile::new(1, "p1"), Profile::new(2, "p2")]);

    assert_eq!(st.settle(id, op, &Ok(())), Settled::Discarded);
    assert_eq!(st.edge(id), EdgeState::Friend);
    let browsing = st.browsing.as_ref().unwrap();
    assert!(browsing.liked.is_empty());
    assert_eq!(browsing.cursor.current(), Some(ProfileId(1)));
  }

  #[test]
  fn failed_remove_keeps_friend() {
    let (mut st, generation) = state_with(&[1, 2]);
    let id = ProfileId(1);
    st.reconcile_friends(vec![Profile::new(1, "p1")]);
    let op = st.begin(id, Mutation::Remove, Origin::Swipe { generation });
    assert!(st.edge(id).is_friend());

    let err = Error::Server { status: 500, message: "boom".into() };
    assert_eq!(st.settle(id, op, &Err(err.clone())), Settled::Applied);
    assert_eq!(st.edge(id), EdgeState::Friend);
    assert_eq!(st.last_error, Some(err));
    assert_eq!(st.browsing.as_ref().unwrap().cursor.current(), Some(ProfileId(1)));
  }
}
