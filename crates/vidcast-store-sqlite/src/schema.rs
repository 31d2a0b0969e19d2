//! SQL schema for the Vidcast SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS accounts (
    account_id       INTEGER PRIMARY KEY AUTOINCREMENT,
    username         TEXT    NOT NULL UNIQUE,
    email            TEXT    NOT NULL UNIQUE,
    password_hash    TEXT    NOT NULL,
    biography        TEXT,
    subscriber_count INTEGER NOT NULL DEFAULT 0,   -- = COUNT(subscriptions.channel_id)
    is_private       INTEGER NOT NULL DEFAULT 0,
    is_online        INTEGER NOT NULL DEFAULT 0,
    last_active      TEXT,                         -- RFC 3339 UTC
    created_at       TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS sessions (
    token_hash  TEXT    PRIMARY KEY,              -- hex SHA-256 of the raw token
    account_id  INTEGER NOT NULL REFERENCES accounts(account_id) ON DELETE CASCADE,
    expires_at  TEXT    NOT NULL
);

-- Toggled, not append-only: unsubscribe deletes the row.
CREATE TABLE IF NOT EXISTS subscriptions (
    subscriber_id INTEGER NOT NULL REFERENCES accounts(account_id) ON DELETE CASCADE,
    channel_id    INTEGER NOT NULL REFERENCES accounts(account_id) ON DELETE CASCADE,
    created_at    TEXT    NOT NULL,
    PRIMARY KEY (subscriber_id, channel_id),
    CHECK (subscriber_id != channel_id)
);

-- Pending requests only; accepting or denying deletes the row.
CREATE TABLE IF NOT EXISTS follow_ups (
    followup_id  INTEGER PRIMARY KEY AUTOINCREMENT,
    requester_id INTEGER NOT NULL REFERENCES accounts(account_id) ON DELETE CASCADE,
    owner_id     INTEGER NOT NULL REFERENCES accounts(account_id) ON DELETE CASCADE,
    created_at   TEXT    NOT NULL,
    UNIQUE (requester_id, owner_id),
    CHECK  (requester_id != owner_id)
);

CREATE TABLE IF NOT EXISTS videos (
    video_id    INTEGER PRIMARY KEY AUTOINCREMENT,
    owner_id    INTEGER NOT NULL REFERENCES accounts(account_id) ON DELETE CASCADE,
    title       TEXT    NOT NULL,
    description TEXT,
    uploaded_at TEXT    NOT NULL,
    views       INTEGER NOT NULL DEFAULT 0,
    likes       INTEGER NOT NULL DEFAULT 0,
    dislikes    INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS comments (
    comment_id INTEGER PRIMARY KEY AUTOINCREMENT,
    video_id   INTEGER NOT NULL REFERENCES videos(video_id) ON DELETE CASCADE,
    owner_id   INTEGER NOT NULL REFERENCES accounts(account_id) ON DELETE CASCADE,
    content    TEXT    NOT NULL,
    created_at TEXT    NOT NULL,
    likes      INTEGER NOT NULL DEFAULT 0,
    dislikes   INTEGER NOT NULL DEFAULT 0
);

-- One row per (account, target): a like and a dislike can never coexist.
CREATE TABLE IF NOT EXISTS video_reactions (
    account_id INTEGER NOT NULL REFERENCES accounts(account_id) ON DELETE CASCADE,
    video_id   INTEGER NOT NULL REFERENCES videos(video_id) ON DELETE CASCADE,
    kind       TEXT    NOT NULL CHECK (kind IN ('like', 'dislike')),
    PRIMARY KEY (account_id, video_id)
);

CREATE TABLE IF NOT EXISTS comment_reactions (
    account_id INTEGER NOT NULL REFERENCES accounts(account_id) ON DELETE CASCADE,
    comment_id INTEGER NOT NULL REFERENCES comments(comment_id) ON DELETE CASCADE,
    kind       TEXT    NOT NULL CHECK (kind IN ('like', 'dislike')),
    PRIMARY KEY (account_id, comment_id)
);

CREATE TABLE IF NOT EXISTS private_messages (
    message_id   INTEGER PRIMARY KEY AUTOINCREMENT,
    sender_id    INTEGER NOT NULL REFERENCES accounts(account_id) ON DELETE CASCADE,
    recipient_id INTEGER NOT NULL REFERENCES accounts(account_id) ON DELETE CASCADE,
    content      TEXT    NOT NULL,
    sent_at      TEXT    NOT NULL
);

CREATE INDEX IF NOT EXISTS subscriptions_channel_idx ON subscriptions(channel_id);
CREATE INDEX IF NOT EXISTS follow_ups_owner_idx      ON follow_ups(owner_id);
CREATE INDEX IF NOT EXISTS comments_video_idx        ON comments(video_id);
CREATE INDEX IF NOT EXISTS messages_pair_idx         ON private_messages(sender_id, recipient_id);

PRAGMA user_version = 1;
";
