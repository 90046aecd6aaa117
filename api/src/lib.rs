pub mod client;
pub mod wire;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Record traits
// ---------------------------------------------------------------------------

/// Anything carrying the numeric identifier issued by the API.
pub trait Identifiable {
    fn id(&self) -> u64;
}

/// A record type served under `/api/v2/<PATH>`.
///
/// `Draft` is the create payload: every field except `id`. The same draft,
/// with the id attached, is the body of a full-record update.
pub trait Resource: Identifiable + DeserializeOwned + Send + 'static {
    const PATH: &'static str;
    type Draft: Serialize + Send + Sync + 'static;
}

/// Reference to another record as sent in payloads: `{"id": 3}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRef {
    pub id: u64,
}

impl IdRef {
    pub fn new(id: u64) -> Self {
        Self { id }
    }
}

// ---------------------------------------------------------------------------
// Domain records, as delivered by the API (embedded references inline)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
}

impl Player {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: u64,
    pub name: String,
    pub year: i32,
}

/// "This team participates in this tournament."
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TournamentTeam {
    pub id: u64,
    pub tournament: Tournament,
    pub team: Team,
}

/// "This player is rostered for this team's participation in this tournament."
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentPlayer {
    pub id: u64,
    pub tournament_team: TournamentTeam,
    pub player: Player,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: u64,
    pub tournament: Tournament,
    pub home_team: TournamentTeam,
    pub away_team: TournamentTeam,
    #[serde(default)]
    pub home_score: u32,
    #[serde(default)]
    pub away_score: u32,
    #[serde(default)]
    pub game_date: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// Drafts (create payloads)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamDraft {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDraft {
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TournamentDraft {
    pub name: String,
    pub year: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TournamentTeamDraft {
    pub tournament: IdRef,
    pub team: IdRef,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentPlayerDraft {
    pub tournament_team: IdRef,
    pub player: IdRef,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameDraft {
    pub tournament: IdRef,
    pub home_team: IdRef,
    pub away_team: IdRef,
    pub home_score: u32,
    pub away_score: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_date: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// Resource bindings
// ---------------------------------------------------------------------------

impl Identifiable for Team {
    fn id(&self) -> u64 {
        self.id
    }
}

impl Resource for Team {
    const PATH: &'static str = "teams";
    type Draft = TeamDraft;
}

impl Identifiable for Player {
    fn id(&self) -> u64 {
        self.id
    }
}

impl Resource for Player {
    const PATH: &'static str = "players";
    type Draft = PlayerDraft;
}

impl Identifiable for Tournament {
    fn id(&self) -> u64 {
        self.id
    }
}

impl Resource for Tournament {
    const PATH: &'static str = "tournaments";
    type Draft = TournamentDraft;
}

impl Identifiable for TournamentTeam {
    fn id(&self) -> u64 {
        self.id
    }
}

impl Resource for TournamentTeam {
    const PATH: &'static str = "tournament-teams";
    type Draft = TournamentTeamDraft;
}

impl Identifiable for TournamentPlayer {
    fn id(&self) -> u64 {
        self.id
    }
}

impl Resource for TournamentPlayer {
    const PATH: &'static str = "tournament-players";
    type Draft = TournamentPlayerDraft;
}

impl Identifiable for Game {
    fn id(&self) -> u64 {
        self.id
    }
}

impl Resource for Game {
    const PATH: &'static str = "games";
    type Draft = GameDraft;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_deserializes_embedded_references() {
        let raw = r#"{
            "id": 7,
            "tournament": {"id": 1, "name": "Spring Cup", "year": 2024},
            "homeTeam": {"id": 3, "tournament": {"id": 1, "name": "Spring Cup", "year": 2024}, "team": {"id": 10, "name": "Lions"}},
            "awayTeam": {"id": 4, "tournament": {"id": 1, "name": "Spring Cup", "year": 2024}, "team": {"id": 11, "name": "Tigers"}},
            "homeScore": 2,
            "awayScore": 1,
            "gameDate": "2024-05-01"
        }"#;
        let game: Game = serde_json::from_str(raw).unwrap();
        assert_eq!(game.id(), 7);
        assert_eq!(game.home_team.team.name, "Lions");
        assert_eq!(game.away_team.team.name, "Tigers");
        assert_eq!(game.game_date, NaiveDate::from_ymd_opt(2024, 5, 1));
    }

    #[test]
    fn game_without_scores_or_date_uses_defaults() {
        let raw = r#"{
            "id": 8,
            "tournament": {"id": 1, "name": "Cup", "year": 2024},
            "homeTeam": {"id": 3, "tournament": {"id": 1, "name": "Cup", "year": 2024}, "team": {"id": 10, "name": "Lions"}},
            "awayTeam": {"id": 4, "tournament": {"id": 1, "name": "Cup", "year": 2024}, "team": {"id": 11, "name": "Tigers"}},
            "gameDate": null
        }"#;
        let game: Game = serde_json::from_str(raw).unwrap();
        assert_eq!((game.home_score, game.away_score), (0, 0));
        assert!(game.game_date.is_none());
    }

    #[test]
    fn drafts_send_references_as_id_objects() {
        let draft = TournamentPlayerDraft {
            tournament_team: IdRef::new(3),
            player: IdRef::new(9),
        };
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json, serde_json::json!({"tournamentTeam": {"id": 3}, "player": {"id": 9}}));
    }

    #[test]
    fn game_draft_omits_missing_date() {
        let draft = GameDraft {
            tournament: IdRef::new(1),
            home_team: IdRef::new(3),
            away_team: IdRef::new(4),
            home_score: 0,
            away_score: 0,
            game_date: None,
        };
        let json = serde_json::to_value(&draft).unwrap();
        assert!(json.get("gameDate").is_none());
        assert_eq!(json["homeTeam"]["id"], 3);
    }

    #[test]
    fn player_uses_camel_case_names() {
        let player: Player =
            serde_json::from_str(r#"{"id": 2, "firstName": "Ada", "lastName": "Lovelace"}"#).unwrap();
        assert_eq!(player.full_name(), "Ada Lovelace");
    }
}
