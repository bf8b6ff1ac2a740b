//! [`MatchController`] — the async face of the matching workflow.

use std::{
  future::Future,
  sync::{Arc, Mutex, MutexGuard, PoisonError},
  time::Duration,
};

use mixtape_core::{
  EdgeState, Error, Profile, ProfileId, Result, Session,
  service::{FriendshipService, ProfileRegistry},
};
use rand_core::{OsRng, RngCore};
use tracing::{debug, warn};

use crate::state::{Mutation, Origin, Settled, State};

/// Default per-call timeout for backend requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

// ─── Configuration ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct MatchConfig {
  /// How long any backend call may take before it is treated as failed.
  pub timeout: Duration,
}

impl Default for MatchConfig {
  fn default() -> Self { Self { timeout: DEFAULT_TIMEOUT } }
}

// ─── Candidate ────────────────────────────────────────────────────────────────

/// A profile as presented by the discover view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
  pub profile:   Profile,
  /// Cached friendship; a pending edge reports its pre-call value.
  pub is_friend: bool,
  /// Compatibility with the session user.
  pub score:     u8,
}

// ─── Controller ───────────────────────────────────────────────────────────────

/// Mediates between view actions and the authoritative friendship service.
///
/// Operations take `&self`: mutations of different profiles may be in flight
/// at once, while a second mutation of the same profile is refused with
/// [`Error::OperationInProgress`]. Friend edges only change after the server
/// confirms a mutation.
///
/// Each mutation runs on its own tokio task, so dropping the caller's future
/// does not cancel the network call; its result is still reconciled, or
/// discarded if the browsing session has been unmounted.
pub struct MatchController<R, F> {
  registry:    Arc<R>,
  friendships: Arc<F>,
  session:     Session,
  config:      MatchConfig,
  state:       Arc<Mutex<State>>,
}

impl<R, F> MatchController<R, F>
where
  R: ProfileRegistry + 'static,
  F: FriendshipService + 'static,
{
  pub fn new(
    session: Session,
    registry: Arc<R>,
    friendships: Arc<F>,
    config: MatchConfig,
  ) -> Self {
    Self {
      registry,
      friendships,
      session,
      config,
      state: Arc::new(Mutex::new(State::new(Box::new(OsRng)))),
    }
  }

  /// Replace the random source used to advance the cursor.
  pub fn with_rng(self, rng: impl RngCore + Send + 'static) -> Self {
    self.lock().rng = Box::new(rng);
    self
  }

  pub fn session(&self) -> &Session { &self.session }

  fn lock(&self) -> MutexGuard<'_, State> {
    self.state.lock().unwrap_or_else(PoisonError::into_inner)
  }

  async fn timed<T>(&self, call: impl Future<Output = Result<T>>) -> Result<T> {
    tokio::time::timeout(self.config.timeout, call)
      .await
      .unwrap_or_else(|_| Err(Error::Timeout(self.config.timeout)))
  }

  // ── Loading ───────────────────────────────────────────────────────────────

  /// Fetch all profiles except the session user's own and annotate them with
  /// the authoritative friend set, starting a fresh browsing session.
  ///
  /// A failing registry fails the whole load. A failing friend listing does
  /// not: every candidate is annotated as a non-friend, the stale flag is
  /// raised and the error is kept as [`Self::last_error`].
  pub async fn load_candidates(&self) -> Result<Vec<Candidate>> {
    let user = self.session.user_id();

    let profiles = match self.timed(self.registry.list_profiles()).await {
      Ok(p) => p,
      Err(e) => return Err(self.lock().fail(e)),
    };
    let (own, candidates): (Vec<_>, Vec<_>) =
      profiles.into_iter().partition(|p| p.id == user);

    let me = match own.into_iter().next() {
      Some(me) => Some(me),
      None => match self.timed(self.registry.get_profile(user)).await {
        Ok(me) => Some(me),
        Err(e) => {
          warn!(%user, error = %e, "own profile unavailable; scores will be 0");
          None
        }
      },
    };

    let friends = self.timed(self.friendships.list_friends(user)).await;

    let mut st = self.lock();
    match friends {
      Ok(friends) => {
        st.reconcile_friends(friends);
        st.succeed();
      }
      Err(e) => {
        warn!(%user, error = %e, "friend list unavailable; friend status may be stale");
        st.friend_ids.clear();
        st.friends = None;
        st.stale = true;
        st.last_error = Some(e);
      }
    }
    let generation = st.mount(me, candidates);
    debug!(generation, "browsing session mounted");
    Ok(candidates_of(&st))
  }

  /// Fetch the friends list, refreshing every cached edge.
  pub async fn load_friends(&self) -> Result<Vec<Profile>> {
    let user = self.session.user_id();
    match self.timed(self.friendships.list_friends(user)).await {
      Ok(friends) => {
        let mut st = self.lock();
        st.reconcile_friends(friends.clone());
        st.succeed();
        Ok(friends)
      }
      Err(e) => Err(self.lock().fail(e)),
    }
  }

  /// Re-read one edge from the server.
  pub async fn refresh_friend_status(&self, id: ProfileId) -> Result<bool> {
    self.guard(id)?;
    let user = self.session.user_id();
    match self.timed(self.friendships.friend_status(user, id)).await {
      Ok(is_friend) => {
        let mut st = self.lock();
        // A mutation started meanwhile owns the edge now.
        if !st.is_pending(id) {
          if is_friend {
            st.friend_ids.insert(id);
          } else {
            st.friend_ids.remove(&id);
          }
        }
        st.succeed();
        Ok(is_friend)
      }
      Err(e) => Err(self.lock().fail(e)),
    }
  }

  /// Fetch a single profile for the profile view.
  pub async fn view_profile(&self, id: ProfileId) -> Result<Profile> {
    match self.timed(self.registry.get_profile(id)).await {
      Ok(p) => {
        self.lock().succeed();
        Ok(p)
      }
      Err(e) => Err(self.lock().fail(e)),
    }
  }

  /// Close the browsing session. In-flight mutations still complete, but
  /// their results no longer touch the view state.
  pub fn unmount(&self) {
    self.lock().unmount();
    debug!("browsing session unmounted");
  }

  // ── Actions ───────────────────────────────────────────────────────────────

  /// Befriend `id` and advance the cursor once the server confirms.
  ///
  /// Liking a current friend is a no-op and issues no call.
  pub async fn like(&self, id: ProfileId) -> Result<()> {
    let op = {
      let mut st = self.lock();
      if st.is_pending(id) {
        return Err(st.fail(Error::OperationInProgress(id)));
      }
      if st.friend_ids.contains(&id) {
        debug!(profile = %id, "already a friend; like is a no-op");
        st.succeed();
        return Ok(());
      }
      let origin = swipe_origin(&st);
      st.begin(id, Mutation::Add, origin)
    };
    self.run(id, op, Mutation::Add).await
  }

  /// Pass on `id`, unfriending it first if it is currently a friend.
  ///
  /// A pass on a non-friend issues no call and advances immediately; an
  /// unfriend advances only once the server confirms.
  pub async fn dislike(&self, id: ProfileId) -> Result<()> {
    let op = {
      let mut st = self.lock();
      if st.is_pending(id) {
        return Err(st.fail(Error::OperationInProgress(id)));
      }
      if !st.friend_ids.contains(&id) {
        st.succeed();
        st.advance();
        return Ok(());
      }
      let origin = swipe_origin(&st);
      st.begin(id, Mutation::Remove, origin)
    };
    self.run(id, op, Mutation::Remove).await
  }

  /// Unfriend from the friends list view: on success the profile is dropped
  /// from the cached friends list without reloading it.
  pub async fn remove_friend_and_refresh(&self, id: ProfileId) -> Result<()> {
    let op = {
      let mut st = self.lock();
      if st.is_pending(id) {
        return Err(st.fail(Error::OperationInProgress(id)));
      }
      st.begin(id, Mutation::Remove, Origin::FriendsList)
    };
    self.run(id, op, Mutation::Remove).await
  }

  /// Move to a random other candidate.
  pub fn advance_cursor(&self) -> Option<ProfileId> { self.lock().advance() }

  fn guard(&self, id: ProfileId) -> Result<()> {
    let mut st = self.lock();
    if st.is_pending(id) {
      return Err(st.fail(Error::OperationInProgress(id)));
    }
    Ok(())
  }

  /// Run a begun mutation to completion on a detached task and wait for it
  /// up to the configured timeout.
  async fn run(&self, id: ProfileId, op: u64, mutation: Mutation) -> Result<()> {
    let user = self.session.user_id();
    let friendships = Arc::clone(&self.friendships);
    let state = Arc::clone(&self.state);

    let mut task = tokio::spawn(async move {
      let outcome = match mutation {
        Mutation::Add => friendships.add_friend(user, id).await,
        Mutation::Remove => friendships.remove_friend(user, id).await,
      };
      let settled = state
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .settle(id, op, &outcome);
      if settled != Settled::Applied {
        debug!(profile = %id, ?mutation, ?settled, "mutation outcome not applied");
      }
      outcome
    });

    let joined = match tokio::time::timeout(self.config.timeout, &mut task).await {
      Ok(joined) => joined,
      Err(_) => {
        let err = Error::Timeout(self.config.timeout);
        if self.lock().abandon(id, op, &err) {
          warn!(profile = %id, ?mutation, "mutation timed out; server state unknown");
          return Err(err);
        }
        // Settled between the timer firing and the abandon.
        task.await
      }
    };

    joined.unwrap_or_else(|e| {
      let err = Error::Fetch(format!("mutation task failed: {e}"));
      let mut st = self.lock();
      st.abandon(id, op, &err);
      Err(err)
    })
  }

  // ── Views ─────────────────────────────────────────────────────────────────

  /// Cached friendship; `false` for unknown profiles.
  pub fn friend_status(&self, id: ProfileId) -> bool { self.lock().edge(id).is_friend() }

  pub fn edge_state(&self, id: ProfileId) -> EdgeState { self.lock().edge(id) }

  /// Candidates of the mounted session in candidate order.
  pub fn candidates(&self) -> Vec<Candidate> { candidates_of(&self.lock()) }

  /// The candidate under the cursor.
  pub fn current(&self) -> Option<Candidate> {
    let st = self.lock();
    let id = st.browsing.as_ref()?.cursor.current()?;
    candidate_of(&st, id)
  }

  /// Candidates whose username, display name or bio contains `term`.
  pub fn search(&self, term: &str) -> Vec<Candidate> {
    let mut list = self.candidates();
    list.retain(|c| c.profile.matches(term));
    list
  }

  /// Candidates ordered by compatibility, best first, ties by id.
  pub fn ranked_matches(&self) -> Vec<Candidate> {
    let mut list = self.candidates();
    list.sort_by(|a, b| b.score.cmp(&a.score).then(a.profile.id.cmp(&b.profile.id)));
    list
  }

  /// Profiles liked in this session with their score at the time.
  pub fn liked(&self) -> Vec<(ProfileId, u8)> {
    self
      .lock()
      .browsing
      .as_ref()
      .map(|b| b.liked.iter().map(|(id, s)| (*id, *s)).collect())
      .unwrap_or_default()
  }

  /// The cached friends list, empty until loaded.
  pub fn friends(&self) -> Vec<Profile> { self.lock().friends.clone().unwrap_or_default() }

  /// The most recent error, cleared by the next successful operation.
  pub fn last_error(&self) -> Option<Error> { self.lock().last_error.clone() }

  pub fn clear_error(&self) { self.lock().succeed(); }

  /// Whether friend annotations may not match the server.
  pub fn friend_status_may_be_stale(&self) -> bool { self.lock().stale }

  pub fn is_mounted(&self) -> bool { self.lock().browsing.is_some() }
}

fn swipe_origin(st: &State) -> Origin {
  match st.browsing.as_ref() {
    Some(b) => Origin::Swipe { generation: b.generation },
    // No session: generation 0 is never live, so the outcome only settles the
    // edge's pending marker.
    None => Origin::Swipe { generation: 0 },
  }
}

fn candidate_of(st: &State, id: ProfileId) -> Option<Candidate> {
  let profile = st.browsing.as_ref()?.get(id)?.clone();
  Some(Candidate { is_friend: st.edge(id).is_friend(), score: st.score_of(id), profile })
}

fn candidates_of(st: &State) -> Vec<Candidate> {
  let Some(browsing) = st.browsing.as_ref() else {
    return Vec::new();
  };
  browsing
    .candidates
    .iter()
    .filter_map(|p| candidate_of(st, p.id))
    .collect()
}
