use crate::state::entity::EntityKind;
use std::fmt;
use std::str::FromStr;

/// A navigable location in the console.
///
/// Paths mirror the REST resources: `/teams` is the collection page and
/// `/teams/4` the detail page of team 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Collection(EntityKind),
    Detail(EntityKind, u64),
}

impl Default for Route {
    fn default() -> Self {
        Route::Collection(EntityKind::default())
    }
}

impl Route {
    pub fn kind(&self) -> EntityKind {
        match self {
            Route::Collection(kind) | Route::Detail(kind, _) => *kind,
        }
    }

    /// The collection page that owns this route.
    pub fn collection(&self) -> Route {
        Route::Collection(self.kind())
    }

    pub fn path(&self) -> String {
        match self {
            Route::Collection(kind) => format!("/{}", kind.segment()),
            Route::Detail(kind, id) => format!("/{}/{id}", kind.segment()),
        }
    }

    pub fn parse(path: &str) -> Option<Route> {
        let trimmed = path.trim().trim_matches('/');
        if trimmed.is_empty() {
            return Some(Route::default());
        }

        let mut parts = trimmed.split('/');
        let kind = EntityKind::from_segment(parts.next()?)?;
        let route = match parts.next() {
            None => Route::Collection(kind),
            Some(id) => Route::Detail(kind, id.parse().ok()?),
        };
        if parts.next().is_some() {
            return None;
        }
        Some(route)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

impl FromStr for Route {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Route::parse(s).ok_or_else(|| format!("unknown route: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_paths_round_trip() {
        for kind in EntityKind::ALL {
            let route = Route::Collection(kind);
            assert_eq!(Route::parse(&route.path()), Some(route));
        }
    }

    #[test]
    fn detail_paths_carry_the_id() {
        assert_eq!(
            Route::parse("/tournament-players/17"),
            Some(Route::Detail(EntityKind::TournamentPlayers, 17))
        );
        assert_eq!(Route::Detail(EntityKind::Games, 3).path(), "/games/3");
    }

    #[test]
    fn root_maps_to_tournaments() {
        assert_eq!(Route::parse("/"), Some(Route::Collection(EntityKind::Tournaments)));
        assert_eq!(Route::parse(""), Some(Route::Collection(EntityKind::Tournaments)));
    }

    #[test]
    fn trailing_slash_is_tolerated() {
        assert_eq!(Route::parse("/teams/"), Some(Route::Collection(EntityKind::Teams)));
    }

    #[test]
    fn unknown_or_malformed_paths_are_rejected() {
        assert_eq!(Route::parse("/scorers"), None);
        assert_eq!(Route::parse("/teams/abc"), None);
        assert_eq!(Route::parse("/teams/1/edit"), None);
        assert!("/bets".parse::<Route>().is_err());
    }

    #[test]
    fn detail_route_knows_its_collection() {
        let route = Route::Detail(EntityKind::Players, 8);
        assert_eq!(route.collection(), Route::Collection(EntityKind::Players));
        assert_eq!(route.to_string(), "/players/8");
    }
}
