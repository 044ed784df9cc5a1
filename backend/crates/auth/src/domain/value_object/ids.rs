//! Typed Entity IDs

use kernel::id::Id;

pub struct UserMarker;
pub type UserId = Id<UserMarker>;

pub struct SessionMarker;
pub type SessionId = Id<SessionMarker>;

pub struct OneTimeTokenMarker;
pub type OneTimeTokenId = Id<OneTimeTokenMarker>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_is_v4() {
        let user_id = UserId::new();
        assert_eq!(user_id.as_uuid().get_version_num(), 4);
    }

    #[test]
    fn test_from_uuid() {
        let uuid = uuid::Uuid::new_v4();
        let session_id = SessionId::from_uuid(uuid);
        assert_eq!(session_id.as_uuid(), &uuid);
    }
}
