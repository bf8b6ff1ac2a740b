//! Integration tests for `ApiClient` against an in-process axum stub of the
//! backend, served on an ephemeral port.

use std::{
  collections::BTreeSet,
  sync::{Arc, Mutex},
  time::Duration,
};

use axum::{
  Json, Router,
  extract::{Path, State},
  http::{HeaderMap, StatusCode, header},
  response::{IntoResponse, Response},
  routing::{get, post},
};
use mixtape_core::{
  Error, NewMessage, ProfileId, Session,
  service::{FriendshipService, MessageService, ProfileRegistry},
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use crate::{ApiClient, ApiConfig};

// ─── Stub backend ─────────────────────────────────────────────────────────────

const TOKEN: &str = "tok-123";

#[derive(Default)]
struct Stub {
  friends:  BTreeSet<(i64, i64)>,
  messages: Vec<Value>,
  /// Status forced on every `/api/users` response when set.
  fail:     Option<StatusCode>,
  /// Delay applied to `/api/users` before answering.
  delay:    Option<Duration>,
}

type Shared = Arc<Mutex<Stub>>;

fn profile_json(id: i64) -> Value {
  let names = ["me", "RetroWave_Alice", "VaporBob", "Y2K_Charlie"];
  json!({
    "id": id,
    "username": names[id as usize],
    "description": if id == 1 { json!("90s music enthusiast") } else { Value::Null },
    "profile_image": if id == 1 { json!("/static/profile_images/alice.jpg") } else { Value::Null },
  })
}

fn authorised(headers: &HeaderMap) -> bool {
  headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

fn error(status: StatusCode, msg: &str) -> Response {
  (status, Json(json!({ "error": msg }))).into_response()
}

async fn list_users(State(s): State<Shared>) -> Response {
  let (fail, delay) = {
    let s = s.lock().unwrap();
    (s.fail, s.delay)
  };
  if let Some(d) = delay {
    tokio::time::sleep(d).await;
  }
  if let Some(status) = fail {
    return error(status, "database is on fire");
  }
  Json((0..4).map(profile_json).collect::<Vec<_>>()).into_response()
}

async fn get_user(Path(id): Path<i64>) -> Response {
  if (0..4).contains(&id) {
    Json(profile_json(id)).into_response()
  } else {
    error(StatusCode::NOT_FOUND, "user not found")
  }
}

async fn list_friends(State(s): State<Shared>, Path(user): Path<i64>) -> Response {
  let s = s.lock().unwrap();
  let friends: Vec<Value> = s
    .friends
    .iter()
    .filter(|(u, _)| *u == user)
    .map(|(_, f)| profile_json(*f))
    .collect();
  Json(friends).into_response()
}

async fn friend_status(
  State(s): State<Shared>,
  Path((user, friend)): Path<(i64, i64)>,
) -> Response {
  let is_friend = s.lock().unwrap().friends.contains(&(user, friend));
  Json(json!({ "is_friend": is_friend })).into_response()
}

async fn add_friend(
  State(s): State<Shared>,
  headers: HeaderMap,
  Path((user, friend)): Path<(i64, i64)>,
) -> Response {
  if !authorised(&headers) {
    return error(StatusCode::UNAUTHORIZED, "token missing");
  }
  if user == friend {
    return error(StatusCode::BAD_REQUEST, "Cannot add yourself as a friend");
  }
  if s.lock().unwrap().friends.insert((user, friend)) {
    (StatusCode::CREATED, Json(json!({ "message": "Friend added successfully" })))
      .into_response()
  } else {
    Json(json!({ "message": "Already friends" })).into_response()
  }
}

async fn remove_friend(
  State(s): State<Shared>,
  headers: HeaderMap,
  Path((user, friend)): Path<(i64, i64)>,
) -> Response {
  if !authorised(&headers) {
    return error(StatusCode::UNAUTHORIZED, "token missing");
  }
  if s.lock().unwrap().friends.remove(&(user, friend)) {
    Json(json!({ "message": "Friend removed successfully" })).into_response()
  } else {
    error(StatusCode::NOT_FOUND, "Friendship not found")
  }
}

async fn login(Json(body): Json<Value>) -> Response {
  if body["username"] == "me" && body["password"] == "hunter2" {
    Json(json!({ "token": TOKEN, "user_id": 0, "username": "me" })).into_response()
  } else {
    error(StatusCode::UNAUTHORIZED, "Invalid username or password")
  }
}

async fn list_messages(State(s): State<Shared>) -> Response {
  Json(s.lock().unwrap().messages.clone()).into_response()
}

async fn post_message(State(s): State<Shared>, Json(body): Json<Value>) -> Response {
  if body["message"].as_str().unwrap_or_default().is_empty() {
    return (
      StatusCode::BAD_REQUEST,
      Json(json!({ "status": "error", "message": "Message content is required" })),
    )
      .into_response();
  }
  let mut stored = body.clone();
  stored["timestamp"] = json!("2001-09-09T01:46:40");
  s.lock().unwrap().messages.push(stored.clone());
  Json(stored).into_response()
}

fn stub_router(state: Shared) -> Router {
  Router::new()
    .route("/api/login", post(login))
    .route("/api/users", get(list_users))
    .route("/api/users/{id}", get(get_user))
    .route("/api/users/{id}/friends", get(list_friends))
    .route(
      "/api/users/{id}/friends/{friend}",
      post(add_friend).delete(remove_friend),
    )
    .route("/api/users/{id}/friends/{friend}/status", get(friend_status))
    .route("/messages", get(list_messages).post(post_message))
    .with_state(state)
}

/// Serve the stub on an ephemeral port and return an unauthenticated client.
async fn serve() -> (ApiClient, Shared) {
  let state = Shared::default();
  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  let app = stub_router(state.clone());
  tokio::spawn(async move { axum::serve(listener, app).await });

  let client = ApiClient::new(ApiConfig {
    base_url: format!("http://{addr}/"),
    timeout:  Duration::from_secs(5),
  })
  .unwrap();
  (client, state)
}

fn session() -> Session { Session::new(0, TOKEN) }

// ─── Profiles ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_profiles_adapts_registry_shape() {
  let (client, _) = serve().await;
  let profiles = client.list_profiles().await.unwrap();
  assert_eq!(profiles.len(), 4);

  let alice = &profiles[1];
  assert_eq!(alice.id, ProfileId(1));
  assert_eq!(alice.display_name, "RetroWave_Alice");
  assert_eq!(alice.bio, "90s music enthusiast");
  assert_eq!(
    client.asset_url(alice.profile_image.as_deref().unwrap()),
    format!("{}/static/profile_images/alice.jpg", client.base())
  );
  assert_eq!(profiles[2].bio, "");
}

#[tokio::test]
async fn get_unknown_profile_is_not_found() {
  let (client, _) = serve().await;
  let err = client.get_profile(ProfileId(42)).await.unwrap_err();
  assert!(matches!(err, Error::NotFound(ref m) if m.contains("user not found")), "{err}");
}

#[tokio::test]
async fn server_failure_maps_to_server_error_with_message() {
  let (client, state) = serve().await;
  state.lock().unwrap().fail = Some(StatusCode::SERVICE_UNAVAILABLE);
  let err = client.list_profiles().await.unwrap_err();
  match err {
    Error::Server { status, message } => {
      assert_eq!(status, 503);
      assert!(message.contains("database is on fire"), "{message}");
    }
    other => panic!("expected Server, got {other:?}"),
  }
}

#[tokio::test]
async fn forbidden_maps_to_auth_error() {
  let (client, state) = serve().await;
  state.lock().unwrap().fail = Some(StatusCode::FORBIDDEN);
  let err = client.list_profiles().await.unwrap_err();
  assert!(matches!(err, Error::Auth(_)), "{err:?}");
}

#[tokio::test]
async fn slow_server_maps_to_timeout() {
  let (client, state) = serve().await;
  state.lock().unwrap().delay = Some(Duration::from_secs(2));
  let client = ApiClient::new(ApiConfig {
    base_url: client.config.base_url.clone(),
    timeout:  Duration::from_millis(200),
  })
  .unwrap();
  let err = client.list_profiles().await.unwrap_err();
  assert_eq!(err, Error::Timeout(Duration::from_millis(200)));
}

#[tokio::test]
async fn unreachable_server_maps_to_fetch_error() {
  let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
  let addr = listener.local_addr().unwrap();
  drop(listener);

  let client = ApiClient::new(ApiConfig {
    base_url: format!("http://{addr}"),
    timeout:  Duration::from_secs(2),
  })
  .unwrap();
  let err = client.list_profiles().await.unwrap_err();
  assert!(matches!(err, Error::Fetch(_)), "{err:?}");
}

// ─── Friendships ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_status_list_remove_friend() {
  let (client, _) = serve().await;
  let client = client.with_session(session());
  let me = ProfileId(0);
  let bob = ProfileId(2);

  assert!(!client.friend_status(me, bob).await.unwrap());
  client.add_friend(me, bob).await.unwrap();
  // Adding twice is accepted by the server.
  client.add_friend(me, bob).await.unwrap();
  assert!(client.friend_status(me, bob).await.unwrap());

  let friends = client.list_friends(me).await.unwrap();
  assert_eq!(friends.len(), 1);
  assert_eq!(friends[0].username, "VaporBob");

  client.remove_friend(me, bob).await.unwrap();
  assert!(!client.friend_status(me, bob).await.unwrap());
}

#[tokio::test]
async fn removing_missing_friend_is_not_found() {
  let (client, _) = serve().await;
  let client = client.with_session(session());
  let err = client.remove_friend(ProfileId(0), ProfileId(3)).await.unwrap_err();
  assert!(matches!(err, Error::NotFound(ref m) if m.contains("Friendship not found")));
}

#[tokio::test]
async fn mutation_without_token_is_auth_error() {
  let (client, state) = serve().await;
  let err = client.add_friend(ProfileId(0), ProfileId(1)).await.unwrap_err();
  assert!(matches!(err, Error::Auth(_)), "{err:?}");
  assert!(state.lock().unwrap().friends.is_empty());
}

#[tokio::test]
async fn self_friendship_is_fetch_error() {
  let (client, _) = serve().await;
  let client = client.with_session(session());
  let err = client.add_friend(ProfileId(0), ProfileId(0)).await.unwrap_err();
  assert!(matches!(err, Error::Fetch(ref m) if m.contains("400")), "{err:?}");
}

// ─── Login ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn login_returns_session() {
  let (client, _) = serve().await;
  let session = client.login("me", "hunter2").await.unwrap();
  assert_eq!(session.user_id(), ProfileId(0));
  assert_eq!(session.token(), TOKEN);
}

#[tokio::test]
async fn login_with_bad_password_is_auth_error() {
  let (client, _) = serve().await;
  let err = client.login("me", "wrong").await.unwrap_err();
  assert!(matches!(err, Error::Auth(ref m) if m.contains("Invalid username")), "{err:?}");
}

// ─── Messages ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn post_then_list_messages() {
  let (client, _) = serve().await;
  let posted = client
    .post_message(NewMessage::new("", "brb, dial-up", "/a.gif"))
    .await
    .unwrap();
  assert_eq!(posted.user, "Anonymous");
  assert_eq!(posted.timestamp.as_deref(), Some("2001-09-09T01:46:40"));

  let all = client.list_messages().await.unwrap();
  assert_eq!(all, vec![posted]);
}

#[tokio::test]
async fn empty_message_is_rejected_with_board_message() {
  let (client, _) = serve().await;
  let err = client.post_message(NewMessage::new("me", "   ", "")).await.unwrap_err();
  assert!(matches!(err, Error::Fetch(ref m) if m.contains("Message content is required")));
}
