use std::cmp::Ordering;
use tourney_api::{Game, TournamentPlayer, TournamentTeam};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterSlot {
    Tournament,
    /// Tournament team; the home team on the games page.
    Team,
    AwayTeam,
}

/// A filter a collection page offers, and the key that cycles it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSpec {
    pub slot: FilterSlot,
    pub key: char,
    pub label: &'static str,
}

impl FilterSpec {
    pub const fn new(slot: FilterSlot, key: char, label: &'static str) -> Self {
        Self { slot, key, label }
    }
}

/// Active selections of a page's filter controls. `None` means "All".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Filters {
    pub tournament: Option<u64>,
    pub team: Option<u64>,
    pub away_team: Option<u64>,
}

impl Filters {
    pub fn get(&self, slot: FilterSlot) -> Option<u64> {
        match slot {
            FilterSlot::Tournament => self.tournament,
            FilterSlot::Team => self.team,
            FilterSlot::AwayTeam => self.away_team,
        }
    }

    /// Picking another tournament resets the team filters, whose options
    /// depend on it.
    pub fn set(&mut self, slot: FilterSlot, value: Option<u64>) {
        match slot {
            FilterSlot::Tournament => {
                if self.tournament != value {
                    self.tournament = value;
                    self.team = None;
                    self.away_team = None;
                }
            }
            FilterSlot::Team => self.team = value,
            FilterSlot::AwayTeam => self.away_team = value,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Step through "All" followed by every option.
pub fn cycle(current: Option<u64>, options: &[(u64, String)], forward: bool) -> Option<u64> {
    let mut slots: Vec<Option<u64>> = vec![None];
    slots.extend(options.iter().map(|(id, _)| Some(*id)));
    let position = slots.iter().position(|s| *s == current).unwrap_or(0);
    let next = if forward {
        (position + 1) % slots.len()
    } else {
        (position + slots.len() - 1) % slots.len()
    };
    slots[next]
}

fn by_name(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

pub fn tournament_teams(items: &[TournamentTeam], filters: &Filters) -> Vec<TournamentTeam> {
    let mut rows: Vec<TournamentTeam> = items
        .iter()
        .filter(|tt| filters.tournament.is_none_or(|id| tt.tournament.id == id))
        .cloned()
        .collect();
    rows.sort_by(|a, b| {
        by_name(&a.tournament.name, &b.tournament.name)
            .then_with(|| by_name(&a.team.name, &b.team.name))
    });
    rows
}

pub fn tournament_players(items: &[TournamentPlayer], filters: &Filters) -> Vec<TournamentPlayer> {
    let mut rows: Vec<TournamentPlayer> = items
        .iter()
        .filter(|tp| filters.tournament.is_none_or(|id| tp.tournament_team.tournament.id == id))
        .filter(|tp| filters.team.is_none_or(|id| tp.tournament_team.id == id))
        .cloned()
        .collect();
    rows.sort_by(|a, b| {
        by_name(&a.tournament_team.tournament.name, &b.tournament_team.tournament.name)
            .then_with(|| by_name(&a.tournament_team.team.name, &b.tournament_team.team.name))
            .then_with(|| by_name(&a.player.last_name, &b.player.last_name))
    });
    rows
}

/// Games keep server order; only filtering applies.
pub fn games(items: &[Game], filters: &Filters) -> Vec<Game> {
    items
        .iter()
        .filter(|g| filters.tournament.is_none_or(|id| g.tournament.id == id))
        .filter(|g| filters.team.is_none_or(|id| g.home_team.id == id))
        .filter(|g| filters.away_team.is_none_or(|id| g.away_team.id == id))
        .cloned()
        .collect()
}

/// Tournament-team options, limited to one tournament when it is set.
pub fn team_choices(items: &[TournamentTeam], tournament: Option<u64>) -> Vec<(u64, String)> {
    tournament_teams(items, &Filters { tournament, ..Default::default() })
        .into_iter()
        .map(|tt| (tt.id, tt.team.name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tourney_api::{Player, Team, Tournament};

    fn tournament(id: u64, name: &str) -> Tournament {
        Tournament { id, name: name.into(), year: 2024 }
    }

    fn entry(id: u64, t: &Tournament, team: &str) -> TournamentTeam {
        TournamentTeam { id, tournament: t.clone(), team: Team { id: id * 10, name: team.into() } }
    }

    fn rostered(id: u64, tt: &TournamentTeam, last: &str) -> TournamentPlayer {
        TournamentPlayer {
            id,
            tournament_team: tt.clone(),
            player: Player { id: id * 100, first_name: "A".into(), last_name: last.into() },
        }
    }

    fn game(id: u64, t: &Tournament, home: &TournamentTeam, away: &TournamentTeam) -> Game {
        Game {
            id,
            tournament: t.clone(),
            home_team: home.clone(),
            away_team: away.clone(),
            ..Default::default()
        }
    }

    #[test]
    fn tournament_teams_sort_by_tournament_then_team() {
        let spring = tournament(1, "Spring Cup");
        let autumn = tournament(2, "autumn Cup");
        let items = vec![
            entry(1, &spring, "Tigers"),
            entry(2, &autumn, "Lions"),
            entry(3, &spring, "bears"),
        ];
        let ids: Vec<u64> = tournament_teams(&items, &Filters::default()).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);

        let only_spring = Filters { tournament: Some(1), ..Default::default() };
        let ids: Vec<u64> = tournament_teams(&items, &only_spring).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn tournament_players_filter_and_sort() {
        let cup = tournament(1, "Cup");
        let other = tournament(2, "Other");
        let lions = entry(1, &cup, "Lions");
        let tigers = entry(2, &cup, "Tigers");
        let owls = entry(3, &other, "Owls");
        let items = vec![
            rostered(1, &tigers, "Zed"),
            rostered(2, &lions, "Young"),
            rostered(3, &lions, "Adams"),
            rostered(4, &owls, "Brown"),
        ];

        let in_cup = Filters { tournament: Some(1), ..Default::default() };
        let ids: Vec<u64> = tournament_players(&items, &in_cup).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);

        let lions_only = Filters { tournament: Some(1), team: Some(1), ..Default::default() };
        let ids: Vec<u64> = tournament_players(&items, &lions_only).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[test]
    fn games_filter_home_and_away_independently() {
        let cup = tournament(1, "Cup");
        let a = entry(1, &cup, "A");
        let b = entry(2, &cup, "B");
        let c = entry(3, &cup, "C");
        let items = vec![game(1, &cup, &a, &b), game(2, &cup, &b, &c), game(3, &cup, &a, &c)];

        let home_a = Filters { team: Some(1), ..Default::default() };
        assert_eq!(games(&items, &home_a).iter().map(|g| g.id).collect::<Vec<_>>(), vec![1, 3]);

        let away_c = Filters { away_team: Some(3), ..Default::default() };
        assert_eq!(games(&items, &away_c).iter().map(|g| g.id).collect::<Vec<_>>(), vec![2, 3]);

        let none = Filters { tournament: Some(9), ..Default::default() };
        assert!(games(&items, &none).is_empty());
    }

    #[test]
    fn changing_tournament_resets_team_filters() {
        let mut filters = Filters { tournament: Some(1), team: Some(3), away_team: Some(4) };
        filters.set(FilterSlot::Tournament, Some(1));
        assert_eq!(filters.team, Some(3));
        filters.set(FilterSlot::Tournament, Some(2));
        assert_eq!(filters, Filters { tournament: Some(2), team: None, away_team: None });
    }

    #[test]
    fn cycle_passes_through_all() {
        let options = vec![(4, "a".to_string()), (7, "b".to_string())];
        assert_eq!(cycle(None, &options, true), Some(4));
        assert_eq!(cycle(Some(7), &options, true), None);
        assert_eq!(cycle(None, &options, false), Some(7));
        assert_eq!(cycle(None, &[], true), None);
    }

    #[test]
    fn team_choices_are_narrowed_by_tournament() {
        let cup = tournament(1, "Cup");
        let other = tournament(2, "Other");
        let items = vec![entry(1, &cup, "Lions"), entry(2, &other, "Owls")];
        assert_eq!(team_choices(&items, Some(2)), vec![(2, "Owls".to_string())]);
        assert_eq!(team_choices(&items, None).len(), 2);
    }
}
