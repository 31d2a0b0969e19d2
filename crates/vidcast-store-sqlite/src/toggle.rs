//! Transactional state machines for reactions, subscriptions and follow-up
//! acceptance.
//!
//! Each function opens a `BEGIN IMMEDIATE` transaction, reads the current
//! edge state, applies every write (edges and counters together) and commits.
//! An early return or an error drops the transaction, which rolls it back.

use rusqlite::{Connection, OptionalExtension as _, TransactionBehavior, params};
use vidcast_core::engagement::{
  ReactionKind, ReactionTarget, SubscriptionOutcome, ToggleState,
};

use crate::encode::{
  FOLLOWUP_COLUMNS, RawFollowUp, ReactionTables, counter_column,
  encode_reaction_kind, reaction_tables,
};

// ─── Reactions ───────────────────────────────────────────────────────────────

pub fn toggle_reaction(
  conn: &mut Connection,
  actor: i64,
  target: ReactionTarget,
  kind: ReactionKind,
) -> rusqlite::Result<Option<ToggleState>> {
  let t  = reaction_tables(target);
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

  let target_exists = tx
    .query_row(
      &format!("SELECT 1 FROM {} WHERE {} = ?1", t.entities, t.id_column),
      params![t.target_id],
      |_| Ok(()),
    )
    .optional()?
    .is_some();
  if !target_exists {
    return Ok(None);
  }

  // Both kinds share one row per (account, target); reading it tells us
  // whether the requested kind, the opposite kind, or nothing is set.
  let existing: Option<String> = tx
    .query_row(
      &format!(
        "SELECT kind FROM {} WHERE account_id = ?1 AND {} = ?2",
        t.edges, t.id_column
      ),
      params![actor, t.target_id],
      |r| r.get(0),
    )
    .optional()?;

  let state = if existing.as_deref() == Some(encode_reaction_kind(kind)) {
    delete_reaction(&tx, &t, actor)?;
    adjust_counter(&tx, &t, kind, -1)?;
    ToggleState::Off
  } else {
    if existing.is_some() {
      delete_reaction(&tx, &t, actor)?;
      adjust_counter(&tx, &t, kind.opposite(), -1)?;
    }
    tx.execute(
      &format!(
        "INSERT INTO {} (account_id, {}, kind) VALUES (?1, ?2, ?3)",
        t.edges, t.id_column
      ),
      params![actor, t.target_id, encode_reaction_kind(kind)],
    )?;
    adjust_counter(&tx, &t, kind, 1)?;
    ToggleState::On
  };

  tx.commit()?;
  Ok(Some(state))
}

fn delete_reaction(
  conn: &Connection,
  t: &ReactionTables,
  actor: i64,
) -> rusqlite::Result<()> {
  conn.execute(
    &format!(
      "DELETE FROM {} WHERE account_id = ?1 AND {} = ?2",
      t.edges, t.id_column
    ),
    params![actor, t.target_id],
  )?;
  Ok(())
}

fn adjust_counter(
  conn: &Connection,
  t: &ReactionTables,
  kind: ReactionKind,
  delta: i64,
) -> rusqlite::Result<()> {
  let column = counter_column(kind);
  conn.execute(
    &format!(
      "UPDATE {} SET {column} = {column} + ?1 WHERE {} = ?2",
      t.entities, t.id_column
    ),
    params![delta, t.target_id],
  )?;
  Ok(())
}

// ─── Subscriptions ───────────────────────────────────────────────────────────

pub fn toggle_subscription(
  conn: &mut Connection,
  actor: i64,
  channel: i64,
  now: &str,
) -> rusqlite::Result<Option<SubscriptionOutcome>> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

  let private: Option<bool> = tx
    .query_row(
      "SELECT is_private FROM accounts WHERE account_id = ?1",
      params![channel],
      |r| r.get(0),
    )
    .optional()?;
  let Some(private) = private else {
    return Ok(None);
  };

  let removed = tx.execute(
    "DELETE FROM subscriptions WHERE subscriber_id = ?1 AND channel_id = ?2",
    params![actor, channel],
  )?;

  // Unsubscribing never consults the privacy flag.
  let outcome = if removed > 0 {
    adjust_subscribers(&tx, channel, -1)?;
    SubscriptionOutcome::Unsubscribed
  } else if private {
    let inserted = tx.execute(
      "INSERT INTO follow_ups (requester_id, owner_id, created_at)
       VALUES (?1, ?2, ?3)
       ON CONFLICT (requester_id, owner_id) DO NOTHING",
      params![actor, channel, now],
    )?;
    if inserted > 0 {
      SubscriptionOutcome::RequestSent
    } else {
      SubscriptionOutcome::AlreadyPending
    }
  } else {
    tx.execute(
      "INSERT INTO subscriptions (subscriber_id, channel_id, created_at)
       VALUES (?1, ?2, ?3)",
      params![actor, channel, now],
    )?;
    adjust_subscribers(&tx, channel, 1)?;
    // A request left over from when the channel was private is now moot.
    tx.execute(
      "DELETE FROM follow_ups WHERE requester_id = ?1 AND owner_id = ?2",
      params![actor, channel],
    )?;
    SubscriptionOutcome::Subscribed
  };

  tx.commit()?;
  Ok(Some(outcome))
}

fn adjust_subscribers(conn: &Connection, channel: i64, delta: i64) -> rusqlite::Result<()> {
  conn.execute(
    "UPDATE accounts SET subscriber_count = subscriber_count + ?1 WHERE account_id = ?2",
    params![delta, channel],
  )?;
  Ok(())
}

// ─── Follow-up acceptance ────────────────────────────────────────────────────

/// Delete the request, insert the edge and bump the counter. The counter
/// only moves if the edge was actually inserted.
pub fn accept_followup(
  conn: &mut Connection,
  followup_id: i64,
  owner: i64,
  now: &str,
) -> rusqlite::Result<Option<RawFollowUp>> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

  let request = tx
    .query_row(
      &format!(
        "SELECT {FOLLOWUP_COLUMNS} FROM follow_ups
         WHERE followup_id = ?1 AND owner_id = ?2"
      ),
      params![followup_id, owner],
      RawFollowUp::from_row,
    )
    .optional()?;
  let Some(request) = request else {
    return Ok(None);
  };

  tx.execute(
    "DELETE FROM follow_ups WHERE followup_id = ?1",
    params![followup_id],
  )?;
  let inserted = tx.execute(
    "INSERT INTO subscriptions (subscriber_id, channel_id, created_at)
     VALUES (?1, ?2, ?3)
     ON CONFLICT (subscriber_id, channel_id) DO NOTHING",
    params![request.requester_id, owner, now],
  )?;
  if inserted > 0 {
    adjust_subscribers(&tx, owner, 1)?;
  }

  tx.commit()?;
  Ok(Some(request))
}

// ─── Repair ──────────────────────────────────────────────────────────────────

/// Recompute all denormalised counters from the edge tables.
pub fn repair_counters(conn: &mut Connection) -> rusqlite::Result<u64> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

  let mut repaired = tx.execute(
    "UPDATE accounts
     SET subscriber_count = (
       SELECT COUNT(*) FROM subscriptions s WHERE s.channel_id = accounts.account_id
     )
     WHERE subscriber_count != (
       SELECT COUNT(*) FROM subscriptions s WHERE s.channel_id = accounts.account_id
     )",
    [],
  )?;

  for (entities, edges, id_column) in [
    ("videos", "video_reactions", "video_id"),
    ("comments", "comment_reactions", "comment_id"),
  ] {
    let count = |kind: &str| {
      format!(
        "(SELECT COUNT(*) FROM {edges} r
          WHERE r.{id_column} = {entities}.{id_column} AND r.kind = '{kind}')"
      )
    };
    let (likes, dislikes) = (count("like"), count("dislike"));
    repaired += tx.execute(
      &format!(
        "UPDATE {entities}
         SET likes = {likes}, dislikes = {dislikes}
         WHERE likes != {likes} OR dislikes != {dislikes}"
      ),
      [],
    )?;
  }

  tx.commit()?;
  Ok(repaired as u64)
}
