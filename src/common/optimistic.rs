use crate::store::MembershipOp;

use super::types::Post;

/// Outcome of a local membership flip: the remote write direction plus the
/// state captured for rollback.
#[derive(Debug, Clone)]
pub struct MembershipToggle {
    pub op: MembershipOp,
    pub prior: Vec<String>,
}

/// Flips `member` in `set` in place, before any remote confirmation. The
/// returned toggle carries the matching remote direction and the prior state;
/// a failed write restores exactly that prior state, which is the local view
/// at initiation time, not necessarily the remote truth.
pub fn toggle_membership(set: &mut Vec<String>, member: &str) -> MembershipToggle {
    let prior = set.clone();
    let op = if set.iter().any(|existing| existing == member) {
        set.retain(|existing| existing != member);
        MembershipOp::Remove
    } else {
        set.push(member.to_string());
        MembershipOp::Add
    };
    MembershipToggle { op, prior }
}

/// Applies a rollback to whichever local post list still holds the post.
pub fn rollback_likes(posts: &mut [Post], post_id: &str, likes: &[String]) {
    if let Some(post) = posts.iter_mut().find(|post| post.id == post_id) {
        post.likes = likes.to_vec();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn odd_toggle_counts_flip_and_even_restore() {
        let mut likes = vec!["other".to_string()];
        let initial = likes.clone();

        for round in 1..=6 {
            toggle_membership(&mut likes, "me");
            let member = likes.iter().any(|uid| uid == "me");
            assert_eq!(member, round % 2 == 1);
        }
        assert_eq!(likes, initial);
    }

    #[test]
    fn toggle_never_duplicates_members() {
        let mut likes = vec!["me".to_string(), "other".to_string()];
        toggle_membership(&mut likes, "me");
        toggle_membership(&mut likes, "me");
        assert_eq!(likes.iter().filter(|uid| *uid == "me").count(), 1);
    }

    #[test]
    fn toggle_reports_direction_and_prior_state() {
        let mut likes = Vec::new();
        let toggle = toggle_membership(&mut likes, "me");
        assert_eq!(toggle.op, MembershipOp::Add);
        assert!(toggle.prior.is_empty());
        assert_eq!(likes, vec!["me".to_string()]);

        let toggle = toggle_membership(&mut likes, "me");
        assert_eq!(toggle.op, MembershipOp::Remove);
        assert_eq!(toggle.prior, vec!["me".to_string()]);
        assert!(likes.is_empty());
    }
}
