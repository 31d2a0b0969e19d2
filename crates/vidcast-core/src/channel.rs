//! Channel pages and owner-only edits.

use crate::{
  AccountId, Error, Result, VideoId,
  account::{Account, Profile, ProfileChanges, ProfileUpdate},
  content::{Video, VideoChanges},
  graph,
  store::SocialStore,
};

/// The channel page for `username` as `viewer` sees it.
///
/// The account header is always shown; videos are listed only when the
/// channel is visible to `viewer` (see [`graph::is_visible`]). Returns `None`
/// for an unknown username.
pub async fn profile<S>(
  store: &S,
  viewer: AccountId,
  username: &str,
) -> Result<Option<Profile>>
where
  S: SocialStore,
{
  let Some(account) = store
    .find_account_by_username(username)
    .await
    .map_err(Error::store)?
  else {
    return Ok(None);
  };

  let visible = graph::is_visible(store, viewer, account.account_id).await?;
  let videos = if visible {
    store.videos_of(account.account_id).await.map_err(Error::store)?
  } else {
    Vec::new()
  };
  Ok(Some(Profile::new(account, visible, videos)))
}

/// Change `account`'s username and biography.
pub async fn update_profile<S>(
  store: &S,
  account: AccountId,
  changes: ProfileChanges,
) -> Result<Account>
where
  S: SocialStore,
{
  let username = changes.username.clone();
  match store
    .update_profile(account, changes)
    .await
    .map_err(Error::store)?
  {
    Some(ProfileUpdate::Updated(account)) => Ok(account),
    Some(ProfileUpdate::UsernameTaken) => Err(Error::UsernameTaken(username)),
    None => Err(Error::AccountNotFound(account)),
  }
}

/// Replace the title and description of `video`. Only its owner may.
pub async fn edit_video<S>(
  store: &S,
  actor: AccountId,
  video: VideoId,
  changes: VideoChanges,
) -> Result<Video>
where
  S: SocialStore,
{
  let existing = store
    .get_video(video)
    .await
    .map_err(Error::store)?
    .ok_or(Error::VideoNotFound(video))?;
  if existing.owner_id != actor {
    return Err(Error::Permission("only the owner can edit this video".into()));
  }
  store
    .edit_video(video, actor, changes)
    .await
    .map_err(Error::store)?
    .ok_or(Error::VideoNotFound(video))
}
