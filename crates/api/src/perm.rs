/// Checks whether any of the granted permission strings allows `action`.
pub fn is_allowed(granted: &[String], action: &str) -> bool {
    granted.iter().any(|grant| matches(grant, action))
}

/// A grant matches on exact equality, on the global wildcard `*`, or on a
/// trailing `.*` that covers every subaction of its prefix.
fn matches(grant: &str, action: &str) -> bool {
    if grant == "*" {
        return true;
    }
    match grant.strip_suffix(".*") {
        Some(prefix) => action.strip_prefix(prefix).is_some_and(|rest| rest.starts_with('.')),
        None => grant == action,
    }
}

#[cfg(test)]
mod tests {
    use super::{is_allowed, matches};

    #[test]
    fn exact_grants_match_only_themselves() {
        assert!(matches("ads.manage", "ads.manage"));
        assert!(!matches("ads.manage", "ads.create"));
        assert!(!matches("ads.manage", "ads"));
        assert!(!matches("ads.manage", "payouts.manage"));
    }

    #[test]
    fn global_wildcard_matches_everything() {
        assert!(matches("*", "ads.manage"));
        assert!(matches("*", "contributions.review"));
        assert!(matches("*", "anything.at.all"));
    }

    #[test]
    fn segment_wildcards_cover_subactions_only() {
        assert!(matches("contributions.*", "contributions.review"));
        assert!(matches("contributions.*", "contributions.review.bulk"));
        assert!(!matches("contributions.*", "contributions"));
        assert!(!matches("quiz.*", "quizzes.approve"));
    }

    #[test]
    fn any_grant_in_the_set_suffices() {
        let granted = [String::from("ads.manage"), String::from("payouts.*")];
        assert!(is_allowed(&granted, "ads.manage"));
        assert!(is_allowed(&granted, "payouts.manage"));
        assert!(!is_allowed(&granted, "contributions.review"));
        assert!(!is_allowed(&[], "ads.manage"));
    }
}
