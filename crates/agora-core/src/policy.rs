//! Role and ownership rules for shared content.

use crate::domain::{Actor, Post, Role};

/// Roles allowed on the post and comment routes.
pub const POST_ROLES: &[Role] = &[Role::Admin, Role::Moderator, Role::User];

/// Whether `actor` holds one of the `allowed` roles.
pub fn has_role(actor: &Actor, allowed: &[Role]) -> bool {
    allowed.contains(&actor.role)
}

/// Whether `actor` may update or delete `post`.
///
/// Authors may always modify their own posts; admins and moderators may
/// modify any post.
pub fn can_modify(post: &Post, actor: &Actor) -> bool {
    post.author_id == actor.id || actor.role.is_staff()
}


#[cfg(test)]
mod role_tests {
    use uuid::Uuid;

    use super::*;

    fn with_role(role: Role) -> Actor {
        Actor {
            id: Uuid::new_v4(),
            email: "actor@example.com".to_string(),
            role,
        }
    }

    #[test]
    fn staff_only_rejects_plain_users() {
        let staff = [Role::Admin, Role::Moderator];

        assert!(has_role(&with_role(Role::Admin), &staff));
        assert!(has_role(&with_role(Role::Moderator), &staff));
        assert!(!has_role(&with_role(Role::User), &staff));
    }

    #[test]
    fn post_roles_admit_everyone() {
        for role in [Role::Admin, Role::Moderator, Role::User] {
            assert!(has_role(&with_role(role), POST_ROLES));
        }
        assert!(!has_role(&with_role(Role::User), &[]));
    }
}
