use interclub_core::TeamId;

/// Who is calling a use case. Identity is established upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Administrator,
    Captain(TeamId),
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        matches!(self, Actor::Administrator)
    }

    /// Administrators act for every team, captains only for their own.
    pub fn may_act_for(&self, team: TeamId) -> bool {
        match self {
            Actor::Administrator => true,
            Actor::Captain(own) => *own == team,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_captain_acts_only_for_own_team() {
        let captain = Actor::Captain(TeamId(4));
        assert!(captain.may_act_for(TeamId(4)));
        assert!(!captain.may_act_for(TeamId(5)));
        assert!(!captain.is_admin());

        assert!(Actor::Administrator.may_act_for(TeamId(5)));
        assert!(Actor::Administrator.is_admin());
    }
}
