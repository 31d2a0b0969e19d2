//! Integration tests for `SqliteStore` against an in-memory database.

use std::collections::BTreeSet;

use chrono::{Duration, Utc};
use vidcast_core::{
  AccountId, Error as CoreError,
  account::{Account, NewAccount, ProfileChanges, ProfileUpdate},
  channel,
  content::{CommentOrder, NewComment, NewVideo, Video, VideoChanges},
  engagement::{
    self, ReactionKind, ReactionTarget, SubscriptionOutcome, ToggleState,
  },
  graph,
  store::SocialStore,
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn account(s: &SqliteStore, name: &str) -> Account {
  s.create_account(NewAccount {
    username:      name.into(),
    email:         format!("{name}@example.com"),
    password_hash: "$argon2id$stub".into(),
  })
  .await
  .unwrap()
  .expect("username is free")
}

async fn video(s: &SqliteStore, owner: AccountId) -> Video {
  s.create_video(NewVideo {
    owner_id:    owner,
    title:       "clip".into(),
    description: None,
  })
  .await
  .unwrap()
}

async fn subscriber_count(s: &SqliteStore, id: AccountId) -> i64 {
  s.get_account(id).await.unwrap().unwrap().subscriber_count
}

// ─── Accounts ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_find_account() {
  let s = store().await;
  let alice = account(&s, "alice").await;
  assert_eq!(alice.subscriber_count, 0);
  assert!(!alice.private);

  let found = s.find_account_by_username("alice").await.unwrap().unwrap();
  assert_eq!(found.account_id, alice.account_id);
  assert!(s.find_account_by_username("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
  let s = store().await;
  account(&s, "alice").await;
  let again = s
    .create_account(NewAccount {
      username:      "alice".into(),
      email:         "other@example.com".into(),
      password_hash: "x".into(),
    })
    .await
    .unwrap();
  assert!(again.is_none());
}

#[tokio::test]
async fn profile_update_changes_username_and_biography() {
  let s = store().await;
  let alice = account(&s, "alice").await.account_id;

  let changes = ProfileChanges::new("alicia", Some("short films")).unwrap();
  let updated = channel::update_profile(&s, alice, changes).await.unwrap();
  assert_eq!(updated.username, "alicia");
  assert_eq!(updated.biography.as_deref(), Some("short films"));
  assert!(s.find_account_by_username("alice").await.unwrap().is_none());

  // Keeping one's own username is not a conflict.
  let changes = ProfileChanges::new("alicia", None).unwrap();
  let updated = channel::update_profile(&s, alice, changes).await.unwrap();
  assert_eq!(updated.biography, None);
}

#[tokio::test]
async fn profile_update_rejects_a_taken_username() {
  let s = store().await;
  let alice = account(&s, "alice").await.account_id;
  account(&s, "bob").await;

  let changes = ProfileChanges::new("bob", Some("bio")).unwrap();
  let outcome = s.update_profile(alice, changes.clone()).await.unwrap();
  assert!(matches!(outcome, Some(ProfileUpdate::UsernameTaken)));
  let err = channel::update_profile(&s, alice, changes).await.unwrap_err();
  assert!(matches!(err, CoreError::UsernameTaken(_)));

  let unchanged = s.get_account(alice).await.unwrap().unwrap();
  assert_eq!(unchanged.username, "alice");
  assert_eq!(unchanged.biography, None);

  let missing = s.update_profile(AccountId(99), ProfileChanges::new("x", None).unwrap());
  assert!(missing.await.unwrap().is_none());
}

#[tokio::test]
async fn presence_flag_is_persisted() {
  let s = store().await;
  let alice = account(&s, "alice").await;
  let at = Utc::now();
  s.set_presence(alice.account_id, true, at).await.unwrap();

  let fetched = s.get_account(alice.account_id).await.unwrap().unwrap();
  assert!(fetched.online);
  assert_eq!(
    fetched.last_active.unwrap().timestamp_micros(),
    at.timestamp_micros()
  );
}

// ─── Sessions ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn session_lookup_honours_expiry() {
  let s = store().await;
  let alice = account(&s, "alice").await;
  let now = Utc::now();

  s.create_session(alice.account_id, "live".into(), now + Duration::hours(1))
    .await
    .unwrap();
  s.create_session(alice.account_id, "stale".into(), now - Duration::seconds(1))
    .await
    .unwrap();

  assert_eq!(
    s.session_account("live".into(), now).await.unwrap(),
    Some(alice.account_id)
  );
  assert_eq!(s.session_account("stale".into(), now).await.unwrap(), None);

  s.delete_session("live".into()).await.unwrap();
  assert_eq!(s.session_account("live".into(), now).await.unwrap(), None);
}

// ─── Subscriptions ───────────────────────────────────────────────────────────

#[tokio::test]
async fn subscription_toggle_parity() {
  let s = store().await;
  let a = account(&s, "alice").await.account_id;
  let c = account(&s, "channel").await.account_id;

  for round in 1..=5 {
    let outcome = engagement::toggle_subscription(&s, a, c).await.unwrap();
    let odd = round % 2 == 1;
    let expected = if odd {
      SubscriptionOutcome::Subscribed
    } else {
      SubscriptionOutcome::Unsubscribed
    };
    assert_eq!(outcome, expected);
    assert_eq!(s.is_subscribed(a, c).await.unwrap(), odd);
    assert_eq!(subscriber_count(&s, c).await, i64::from(odd));
  }
}

#[tokio::test]
async fn self_subscription_is_rejected() {
  let s = store().await;
  let a = account(&s, "alice").await.account_id;
  let err = engagement::toggle_subscription(&s, a, a).await.unwrap_err();
  assert!(matches!(err, CoreError::SelfAction));
  assert_eq!(subscriber_count(&s, a).await, 0);
}

#[tokio::test]
async fn subscribing_to_missing_account_is_not_found() {
  let s = store().await;
  let a = account(&s, "alice").await.account_id;
  let err = engagement::toggle_subscription(&s, a, AccountId(999))
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::AccountNotFound(AccountId(999))));
}

#[tokio::test]
async fn private_channel_gets_a_single_pending_request() {
  let s = store().await;
  let a = account(&s, "alice").await.account_id;
  let p = account(&s, "private").await.account_id;
  s.set_private(p, true).await.unwrap();

  let first = engagement::toggle_subscription(&s, a, p).await.unwrap();
  assert_eq!(first, SubscriptionOutcome::RequestSent);
  let second = engagement::toggle_subscription(&s, a, p).await.unwrap();
  assert_eq!(second, SubscriptionOutcome::AlreadyPending);

  assert!(!s.is_subscribed(a, p).await.unwrap());
  assert_eq!(subscriber_count(&s, p).await, 0);

  let pending = s.pending_followups(p).await.unwrap();
  assert_eq!(pending.len(), 1);
  assert_eq!(pending[0].requester_id, a);
  assert_eq!(pending[0].owner_id, p);
}

#[tokio::test]
async fn unsubscribing_from_private_channel_needs_no_request() {
  let s = store().await;
  let a = account(&s, "alice").await.account_id;
  let c = account(&s, "channel").await.account_id;

  engagement::toggle_subscription(&s, a, c).await.unwrap();
  s.set_private(c, true).await.unwrap();

  let outcome = engagement::toggle_subscription(&s, a, c).await.unwrap();
  assert_eq!(outcome, SubscriptionOutcome::Unsubscribed);
  assert_eq!(subscriber_count(&s, c).await, 0);
  assert!(s.pending_followups(c).await.unwrap().is_empty());
}

// ─── Follow-up requests ──────────────────────────────────────────────────────

#[tokio::test]
async fn accepting_a_request_creates_exactly_one_edge() {
  let s = store().await;
  let a = account(&s, "alice").await.account_id;
  let p = account(&s, "private").await.account_id;
  s.set_private(p, true).await.unwrap();
  engagement::toggle_subscription(&s, a, p).await.unwrap();
  let request = s.pending_followups(p).await.unwrap().remove(0);

  let accepted = engagement::accept_followup(&s, p, request.followup_id, a)
    .await
    .unwrap();
  assert_eq!(accepted, request);

  assert!(s.get_followup(request.followup_id).await.unwrap().is_none());
  assert!(s.is_subscribed(a, p).await.unwrap());
  assert_eq!(subscriber_count(&s, p).await, 1);

  // A second accept finds nothing and changes nothing.
  let err = engagement::accept_followup(&s, p, request.followup_id, a)
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::FollowUpNotFound(_)));
  assert_eq!(subscriber_count(&s, p).await, 1);
}

#[tokio::test]
async fn only_the_owner_can_resolve_a_request() {
  let s = store().await;
  let a = account(&s, "alice").await.account_id;
  let p = account(&s, "private").await.account_id;
  let mallory = account(&s, "mallory").await.account_id;
  s.set_private(p, true).await.unwrap();
  engagement::toggle_subscription(&s, a, p).await.unwrap();
  let request = s.pending_followups(p).await.unwrap().remove(0);

  let err = engagement::accept_followup(&s, mallory, request.followup_id, a)
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::Permission(_)));
  let err = engagement::deny_followup(&s, mallory, request.followup_id)
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::Permission(_)));

  assert!(s.get_followup(request.followup_id).await.unwrap().is_some());
}

#[tokio::test]
async fn accept_rejects_mismatched_requester() {
  let s = store().await;
  let a = account(&s, "alice").await.account_id;
  let b = account(&s, "bob").await.account_id;
  let p = account(&s, "private").await.account_id;
  s.set_private(p, true).await.unwrap();
  engagement::toggle_subscription(&s, a, p).await.unwrap();
  let request = s.pending_followups(p).await.unwrap().remove(0);

  let err = engagement::accept_followup(&s, p, request.followup_id, b)
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::Invalid(_)));
  assert!(!s.is_subscribed(b, p).await.unwrap());
  assert!(!s.is_subscribed(a, p).await.unwrap());
}

#[tokio::test]
async fn denying_a_request_deletes_it() {
  let s = store().await;
  let a = account(&s, "alice").await.account_id;
  let p = account(&s, "private").await.account_id;
  s.set_private(p, true).await.unwrap();
  engagement::toggle_subscription(&s, a, p).await.unwrap();
  let request = s.pending_followups(p).await.unwrap().remove(0);

  engagement::deny_followup(&s, p, request.followup_id).await.unwrap();
  assert!(s.pending_followups(p).await.unwrap().is_empty());
  assert!(!s.is_subscribed(a, p).await.unwrap());
  assert_eq!(subscriber_count(&s, p).await, 0);

  // The requester may ask again afterwards.
  let again = engagement::toggle_subscription(&s, a, p).await.unwrap();
  assert_eq!(again, SubscriptionOutcome::RequestSent);
}

// ─── Reactions ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn like_then_dislike_moves_the_reaction() {
  let s = store().await;
  let owner = account(&s, "owner").await.account_id;
  let a = account(&s, "alice").await.account_id;
  let v = video(&s, owner).await;
  let target = ReactionTarget::Video(v.video_id);

  let liked = engagement::toggle_reaction(&s, a, target, ReactionKind::Like)
    .await
    .unwrap();
  assert_eq!(liked, ToggleState::On);
  let after_like = s.get_video(v.video_id).await.unwrap().unwrap();
  assert_eq!((after_like.likes, after_like.dislikes), (1, 0));

  let disliked = engagement::toggle_reaction(&s, a, target, ReactionKind::Dislike)
    .await
    .unwrap();
  assert_eq!(disliked, ToggleState::On);
  let after_dislike = s.get_video(v.video_id).await.unwrap().unwrap();
  assert_eq!(after_dislike.likes, after_like.likes - 1);
  assert_eq!(after_dislike.dislikes, after_like.dislikes + 1);
  assert_eq!(
    s.reaction_of(a, target).await.unwrap(),
    Some(ReactionKind::Dislike)
  );
}

#[tokio::test]
async fn reaction_toggle_alternates_on_and_off() {
  let s = store().await;
  let owner = account(&s, "owner").await.account_id;
  let a = account(&s, "alice").await.account_id;
  let v = video(&s, owner).await;
  let comment = s
    .add_comment(NewComment::new(v.video_id, owner, "first").unwrap())
    .await
    .unwrap();
  let target = ReactionTarget::Comment(comment.comment_id);

  let states = [ToggleState::On, ToggleState::Off, ToggleState::On];
  for expected in states {
    let state = engagement::toggle_reaction(&s, a, target, ReactionKind::Like)
      .await
      .unwrap();
    assert_eq!(state, expected);
    let fetched = s.get_comment(comment.comment_id).await.unwrap().unwrap();
    assert_eq!(fetched.likes, i64::from(expected.is_on()));
    assert_eq!(fetched.dislikes, 0);
  }
}

#[tokio::test]
async fn reacting_to_missing_target_is_not_found() {
  let s = store().await;
  let a = account(&s, "alice").await.account_id;
  let err = engagement::toggle_reaction(
    &s,
    a,
    ReactionTarget::Video(vidcast_core::VideoId(42)),
    ReactionKind::Like,
  )
  .await
  .unwrap_err();
  assert!(matches!(err, CoreError::VideoNotFound(_)));
}

#[tokio::test]
async fn reacting_on_private_content_requires_subscription() {
  let s = store().await;
  let owner = account(&s, "owner").await.account_id;
  let a = account(&s, "alice").await.account_id;
  let v = video(&s, owner).await;
  s.set_private(owner, true).await.unwrap();

  let err = engagement::toggle_reaction(
    &s,
    a,
    ReactionTarget::Video(v.video_id),
    ReactionKind::Like,
  )
  .await
  .unwrap_err();
  assert!(matches!(err, CoreError::Permission(_)));
  assert_eq!(s.get_video(v.video_id).await.unwrap().unwrap().likes, 0);
}

#[tokio::test]
async fn failed_toggle_leaves_no_partial_writes() {
  let s = store().await;
  let owner = account(&s, "owner").await.account_id;
  let a = account(&s, "alice").await.account_id;
  let v = video(&s, owner).await;
  let target = ReactionTarget::Video(v.video_id);
  engagement::toggle_reaction(&s, a, target, ReactionKind::Like)
    .await
    .unwrap();

  // Switching to a dislike deletes the like row and decrements `likes`
  // before the dislike counter write, which this trigger makes fail.
  s.execute_batch(
    "CREATE TRIGGER fail_dislike_counter BEFORE UPDATE OF dislikes ON videos
     BEGIN SELECT RAISE(ABORT, 'dislike counter unavailable'); END;",
  )
  .await
  .unwrap();

  let err = engagement::toggle_reaction(&s, a, target, ReactionKind::Dislike)
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::Store(_)));

  let after = s.get_video(v.video_id).await.unwrap().unwrap();
  assert_eq!((after.likes, after.dislikes), (1, 0));
  assert_eq!(s.reaction_of(a, target).await.unwrap(), Some(ReactionKind::Like));
}

#[tokio::test]
async fn concurrent_reactions_from_different_actors_both_land() {
  let s = store().await;
  let owner = account(&s, "owner").await.account_id;
  let a = account(&s, "alice").await.account_id;
  let b = account(&s, "bob").await.account_id;
  let v = video(&s, owner).await;
  let target = ReactionTarget::Video(v.video_id);

  let (ra, rb) = tokio::join!(
    engagement::toggle_reaction(&s, a, target, ReactionKind::Like),
    engagement::toggle_reaction(&s, b, target, ReactionKind::Like),
  );
  assert_eq!(ra.unwrap(), ToggleState::On);
  assert_eq!(rb.unwrap(), ToggleState::On);
  assert_eq!(s.get_video(v.video_id).await.unwrap().unwrap().likes, 2);
}

#[tokio::test]
async fn videos_of_lists_newest_first() {
  let s = store().await;
  let owner = account(&s, "owner").await.account_id;
  let other = account(&s, "other").await.account_id;
  let first = video(&s, owner).await;
  let second = video(&s, owner).await;
  video(&s, other).await;

  let ids: Vec<_> = s
    .videos_of(owner)
    .await
    .unwrap()
    .into_iter()
    .map(|v| v.video_id)
    .collect();
  assert_eq!(ids, [second.video_id, first.video_id]);
}

#[tokio::test]
async fn only_the_owner_can_edit_a_video() {
  let s = store().await;
  let owner = account(&s, "owner").await.account_id;
  let intruder = account(&s, "intruder").await.account_id;
  let v = video(&s, owner).await;
  let changes = VideoChanges::new("Director's cut", Some("longer")).unwrap();

  let err = channel::edit_video(&s, intruder, v.video_id, changes.clone())
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::Permission(_)));
  assert!(s.edit_video(v.video_id, intruder, changes.clone()).await.unwrap().is_none());
  assert_eq!(s.get_video(v.video_id).await.unwrap().unwrap().title, "clip");

  let edited = channel::edit_video(&s, owner, v.video_id, changes).await.unwrap();
  assert_eq!(edited.title, "Director's cut");
  assert_eq!(edited.description.as_deref(), Some("longer"));

  let missing = VideoChanges::new("x", None).unwrap();
  let err = channel::edit_video(&s, owner, vidcast_core::VideoId(404), missing)
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::VideoNotFound(_)));
}

#[tokio::test]
async fn private_profile_hides_videos_from_strangers() {
  let s = store().await;
  let owner = account(&s, "owner").await.account_id;
  let fan = account(&s, "fan").await.account_id;
  let stranger = account(&s, "stranger").await.account_id;
  video(&s, owner).await;
  engagement::toggle_subscription(&s, fan, owner).await.unwrap();
  s.set_private(owner, true).await.unwrap();

  let seen = channel::profile(&s, stranger, "owner").await.unwrap().unwrap();
  assert!(!seen.visible);
  assert!(seen.videos.is_empty());
  assert_eq!(seen.subscriber_count, 1);

  let seen = channel::profile(&s, fan, "owner").await.unwrap().unwrap();
  assert!(seen.visible);
  assert_eq!(seen.videos.len(), 1);

  assert!(channel::profile(&s, fan, "nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn comment_listing_carries_viewer_reaction() {
  let s = store().await;
  let owner = account(&s, "owner").await.account_id;
  let a = account(&s, "alice").await.account_id;
  let v = video(&s, owner).await;
  let first = s
    .add_comment(NewComment::new(v.video_id, owner, "first").unwrap())
    .await
    .unwrap();
  let second = s
    .add_comment(NewComment::new(v.video_id, a, "second").unwrap())
    .await
    .unwrap();
  s.toggle_reaction(a, ReactionTarget::Comment(first.comment_id), ReactionKind::Like)
    .await
    .unwrap();

  let by_likes = s
    .list_comments(v.video_id, a, CommentOrder::Likes, 0)
    .await
    .unwrap();
  assert_eq!(by_likes[0].comment.comment_id, first.comment_id);
  assert_eq!(by_likes[0].reaction, Some(ReactionKind::Like));
  assert_eq!(by_likes[0].owner_username, "owner");
  assert_eq!(by_likes[1].reaction, None);

  let recent = s
    .list_comments(v.video_id, a, CommentOrder::Recent, 0)
    .await
    .unwrap();
  assert_eq!(recent[0].comment.comment_id, second.comment_id);

  let old = s
    .list_comments(v.video_id, a, CommentOrder::Old, 1)
    .await
    .unwrap();
  assert_eq!(old.len(), 1);
  assert_eq!(old[0].comment.comment_id, second.comment_id);
}

// ─── Social graph ────────────────────────────────────────────────────────────

#[tokio::test]
async fn mutual_subscriptions_form_contacts() {
  let s = store().await;
  let one = account(&s, "one").await.account_id;
  let two = account(&s, "two").await.account_id;

  let outcome = engagement::toggle_subscription(&s, one, two).await.unwrap();
  assert_eq!(outcome, SubscriptionOutcome::Subscribed);
  assert_eq!(subscriber_count(&s, two).await, 1);
  assert!(graph::contacts_of(&s, one).await.unwrap().is_empty());

  engagement::toggle_subscription(&s, two, one).await.unwrap();
  assert_eq!(subscriber_count(&s, one).await, 1);
  assert_eq!(graph::contacts_of(&s, one).await.unwrap(), BTreeSet::from([two]));
  assert_eq!(graph::contacts_of(&s, two).await.unwrap(), BTreeSet::from([one]));
  assert!(graph::mutual_subscription(&s, one, two).await.unwrap());

  // Removing either edge breaks the contact.
  engagement::toggle_subscription(&s, two, one).await.unwrap();
  assert!(graph::contacts_of(&s, one).await.unwrap().is_empty());
  assert!(graph::contacts_of(&s, two).await.unwrap().is_empty());
  assert!(!graph::mutual_subscription(&s, one, two).await.unwrap());
}

#[tokio::test]
async fn visibility_of_private_accounts() {
  let s = store().await;
  let owner = account(&s, "owner").await.account_id;
  let fan = account(&s, "fan").await.account_id;
  let stranger = account(&s, "stranger").await.account_id;

  engagement::toggle_subscription(&s, fan, owner).await.unwrap();
  s.set_private(owner, true).await.unwrap();

  assert!(graph::is_visible(&s, owner, owner).await.unwrap());
  assert!(graph::is_visible(&s, fan, owner).await.unwrap());
  assert!(!graph::is_visible(&s, stranger, owner).await.unwrap());

  s.set_private(owner, false).await.unwrap();
  assert!(graph::is_visible(&s, stranger, owner).await.unwrap());
}

// ─── Messages ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn conversation_returns_both_directions_newest_first() {
  let s = store().await;
  let a = account(&s, "alice").await.account_id;
  let b = account(&s, "bob").await.account_id;
  let c = account(&s, "carol").await.account_id;

  s.send_message(a, b, "hi bob".into()).await.unwrap();
  s.send_message(b, a, "hi alice".into()).await.unwrap();
  s.send_message(c, a, "unrelated".into()).await.unwrap();

  let history = s.conversation(a, b, 0).await.unwrap();
  let contents: Vec<_> = history.iter().map(|m| m.content.as_str()).collect();
  assert_eq!(contents, ["hi alice", "hi bob"]);
}

// ─── Repair ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn repair_counters_is_a_no_op_on_consistent_data() {
  let s = store().await;
  let a = account(&s, "alice").await.account_id;
  let c = account(&s, "channel").await.account_id;
  let v = video(&s, c).await;
  engagement::toggle_subscription(&s, a, c).await.unwrap();
  engagement::toggle_reaction(&s, a, ReactionTarget::Video(v.video_id), ReactionKind::Dislike)
    .await
    .unwrap();

  assert_eq!(s.repair_counters().await.unwrap(), 0);
  assert_eq!(subscriber_count(&s, c).await, 1);
  assert_eq!(s.get_video(v.video_id).await.unwrap().unwrap().dislikes, 1);
}
