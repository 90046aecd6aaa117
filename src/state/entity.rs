use crate::state::filters::{self, FilterSlot, FilterSpec, Filters};
use crate::state::form::{FieldSpec, FormState};
use crate::state::page::{Collections, Page};
use std::fmt::Debug;
use tourney_api::{
    Game, GameDraft, IdRef, Player, PlayerDraft, Resource, Team, TeamDraft, Tournament,
    TournamentDraft, TournamentPlayer, TournamentPlayerDraft, TournamentTeam, TournamentTeamDraft,
};

/// Run `$body` with `$T` bound to the record type of `$kind`.
macro_rules! with_entity {
    ($kind:expr, $T:ident => $body:expr) => {
        match $kind {
            $crate::state::entity::EntityKind::Tournaments => {
                type $T = ::tourney_api::Tournament;
                $body
            }
            $crate::state::entity::EntityKind::Teams => {
                type $T = ::tourney_api::Team;
                $body
            }
            $crate::state::entity::EntityKind::TournamentTeams => {
                type $T = ::tourney_api::TournamentTeam;
                $body
            }
            $crate::state::entity::EntityKind::Players => {
                type $T = ::tourney_api::Player;
                $body
            }
            $crate::state::entity::EntityKind::TournamentPlayers => {
                type $T = ::tourney_api::TournamentPlayer;
                $body
            }
            $crate::state::entity::EntityKind::Games => {
                type $T = ::tourney_api::Game;
                $body
            }
        }
    };
}
pub(crate) use with_entity;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum EntityKind {
    #[default]
    Tournaments,
    Teams,
    TournamentTeams,
    Players,
    TournamentPlayers,
    Games,
}

impl EntityKind {
    /// Navigation order.
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Tournaments,
        EntityKind::Teams,
        EntityKind::TournamentTeams,
        EntityKind::Players,
        EntityKind::TournamentPlayers,
        EntityKind::Games,
    ];

    pub fn segment(self) -> &'static str {
        match self {
            EntityKind::Tournaments => Tournament::PATH,
            EntityKind::Teams => Team::PATH,
            EntityKind::TournamentTeams => TournamentTeam::PATH,
            EntityKind::Players => Player::PATH,
            EntityKind::TournamentPlayers => TournamentPlayer::PATH,
            EntityKind::Games => Game::PATH,
        }
    }

    pub fn from_segment(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.segment() == segment)
    }

    pub fn title(self) -> &'static str {
        match self {
            EntityKind::Tournaments => "Tournaments",
            EntityKind::Teams => "Teams",
            EntityKind::TournamentTeams => "Tournament Teams",
            EntityKind::Players => "Players",
            EntityKind::TournamentPlayers => "Tournament Players",
            EntityKind::Games => "Games",
        }
    }

    /// Singular noun used in prompts and messages.
    pub fn noun(self) -> &'static str {
        match self {
            EntityKind::Tournaments => "tournament",
            EntityKind::Teams => "team",
            EntityKind::TournamentTeams => "tournament team",
            EntityKind::Players => "player",
            EntityKind::TournamentPlayers => "tournament player",
            EntityKind::Games => "game",
        }
    }

    pub fn empty_text(self) -> &'static str {
        match self {
            EntityKind::Tournaments => "No tournaments found.",
            EntityKind::Teams => "No teams found.",
            EntityKind::TournamentTeams => "No teams have been added to tournaments yet.",
            EntityKind::Players => "No players found.",
            EntityKind::TournamentPlayers => "No players have been added to tournament teams yet.",
            EntityKind::Games => "No games have been added to tournament yet.",
        }
    }

    pub fn delete_prompt(self) -> &'static str {
        match self {
            EntityKind::Tournaments => "Are you sure you want to delete this tournament?",
            EntityKind::Teams => "Are you sure you want to delete this team?",
            EntityKind::TournamentTeams => {
                "Are you sure you want to remove this team from the tournament?"
            }
            EntityKind::Players => "Are you sure you want to delete this player?",
            EntityKind::TournamentPlayers => {
                "Are you sure you want to remove this tournament player from the tournament team?"
            }
            EntityKind::Games => "Are you sure you want to remove this game from the tournament?",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|k| *k == self).unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Type-erased payloads carried between the UI loop and the network worker
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum Records {
    Tournaments(Vec<Tournament>),
    Teams(Vec<Team>),
    TournamentTeams(Vec<TournamentTeam>),
    Players(Vec<Player>),
    TournamentPlayers(Vec<TournamentPlayer>),
    Games(Vec<Game>),
}

#[derive(Debug)]
pub enum Record {
    Tournament(Tournament),
    Team(Team),
    TournamentTeam(TournamentTeam),
    Player(Player),
    TournamentPlayer(TournamentPlayer),
    Game(Game),
}

#[derive(Debug, Clone)]
pub enum Draft {
    Tournament(TournamentDraft),
    Team(TeamDraft),
    TournamentTeam(TournamentTeamDraft),
    Player(PlayerDraft),
    TournamentPlayer(TournamentPlayerDraft),
    Game(GameDraft),
}

impl Draft {
    pub fn kind(&self) -> EntityKind {
        match self {
            Draft::Tournament(_) => EntityKind::Tournaments,
            Draft::Team(_) => EntityKind::Teams,
            Draft::TournamentTeam(_) => EntityKind::TournamentTeams,
            Draft::Player(_) => EntityKind::Players,
            Draft::TournamentPlayer(_) => EntityKind::TournamentPlayers,
            Draft::Game(_) => EntityKind::Games,
        }
    }
}

// ---------------------------------------------------------------------------
// Per-entity configuration
// ---------------------------------------------------------------------------

/// Everything a collection or detail page needs to know about one record type.
pub trait Entity: Resource + Clone + Debug + Sync {
    const KIND: EntityKind;
    const COLUMNS: &'static [&'static str];
    const FIELDS: &'static [FieldSpec];
    /// Collections the form and filters draw their choices from.
    const LOOKUPS: &'static [EntityKind] = &[];
    const FILTERS: &'static [FilterSpec] = &[];

    fn cells(&self) -> Vec<String>;

    /// One-line description used in choice lists.
    fn label(&self) -> String;

    /// The record a dependent choice list narrows on.
    fn parent_id(&self) -> Option<u64> {
        None
    }

    /// Edit buffers for `FIELDS`, in order.
    fn field_values(&self) -> Vec<String>;

    fn detail_rows(&self) -> Vec<(&'static str, String)>;

    /// Validate the form and build the create/update payload.
    fn draft(form: &FormState) -> Result<Self::Draft, String>;

    /// Filtered, sorted view of the collection.
    fn project(items: &[Self], _filters: &Filters) -> Vec<Self> {
        items.to_vec()
    }

    fn page(collections: &Collections) -> &Page<Self>;
    fn page_mut(collections: &mut Collections) -> &mut Page<Self>;

    fn into_records(items: Vec<Self>) -> Records;
    fn from_records(records: Records) -> Option<Vec<Self>>;
    fn into_record(self) -> Record;
    fn from_record(record: Record) -> Option<Self>;
    fn into_draft(draft: Self::Draft) -> Draft;
}

fn tournament_label(t: &Tournament) -> String {
    format!("{} {}", t.name, t.year)
}

fn required(form: &FormState, fields: &[usize], message: &str) -> Result<(), String> {
    if fields.iter().any(|f| form.text(*f).is_empty()) {
        return Err(message.to_string());
    }
    Ok(())
}

fn choices(form: &FormState, fields: &[usize], message: &str) -> Result<Vec<IdRef>, String> {
    fields
        .iter()
        .map(|f| form.choice(*f).map(IdRef::new))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| message.to_string())
}

impl Entity for Tournament {
    const KIND: EntityKind = EntityKind::Tournaments;
    const COLUMNS: &'static [&'static str] = &["Name", "Year"];
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::text("Name", "New tournament name"),
        FieldSpec::number("Year", "Year"),
    ];

    fn cells(&self) -> Vec<String> {
        vec![self.name.clone(), self.year.to_string()]
    }

    fn label(&self) -> String {
        tournament_label(self)
    }

    fn field_values(&self) -> Vec<String> {
        vec![self.name.clone(), self.year.to_string()]
    }

    fn detail_rows(&self) -> Vec<(&'static str, String)> {
        vec![("Id", self.id.to_string()), ("Name", self.name.clone()), ("Year", self.year.to_string())]
    }

    fn draft(form: &FormState) -> Result<TournamentDraft, String> {
        required(form, &[0, 1], "Tournament name and year cannot be empty.")?;
        let year = form
            .number::<i32>(1)
            .ok_or_else(|| "Year must be a whole number.".to_string())?;
        Ok(TournamentDraft { name: form.text(0).to_string(), year })
    }

    fn page(c: &Collections) -> &Page<Self> {
        &c.tournaments
    }

    fn page_mut(c: &mut Collections) -> &mut Page<Self> {
        &mut c.tournaments
    }

    fn into_records(items: Vec<Self>) -> Records {
        Records::Tournaments(items)
    }

    fn from_records(records: Records) -> Option<Vec<Self>> {
        match records {
            Records::Tournaments(items) => Some(items),
            _ => None,
        }
    }

    fn into_record(self) -> Record {
        Record::Tournament(self)
    }

    fn from_record(record: Record) -> Option<Self> {
        match record {
            Record::Tournament(item) => Some(item),
            _ => None,
        }
    }

    fn into_draft(draft: TournamentDraft) -> Draft {
        Draft::Tournament(draft)
    }
}

impl Entity for Team {
    const KIND: EntityKind = EntityKind::Teams;
    const COLUMNS: &'static [&'static str] = &["Name"];
    const FIELDS: &'static [FieldSpec] = &[FieldSpec::text("Name", "New team name")];

    fn cells(&self) -> Vec<String> {
        vec![self.name.clone()]
    }

    fn label(&self) -> String {
        self.name.clone()
    }

    fn field_values(&self) -> Vec<String> {
        vec![self.name.clone()]
    }

    fn detail_rows(&self) -> Vec<(&'static str, String)> {
        vec![("Id", self.id.to_string()), ("Name", self.name.clone())]
    }

    fn draft(form: &FormState) -> Result<TeamDraft, String> {
        required(form, &[0], "Name cannot be empty.")?;
        Ok(TeamDraft { name: form.text(0).to_string() })
    }

    fn page(c: &Collections) -> &Page<Self> {
        &c.teams
    }

    fn page_mut(c: &mut Collections) -> &mut Page<Self> {
        &mut c.teams
    }

    fn into_records(items: Vec<Self>) -> Records {
        Records::Teams(items)
    }

    fn from_records(records: Records) -> Option<Vec<Self>> {
        match records {
            Records::Teams(items) => Some(items),
            _ => None,
        }
    }

    fn into_record(self) -> Record {
        Record::Team(self)
    }

    fn from_record(record: Record) -> Option<Self> {
        match record {
            Record::Team(item) => Some(item),
            _ => None,
        }
    }

    fn into_draft(draft: TeamDraft) -> Draft {
        Draft::Team(draft)
    }
}

impl Entity for Player {
    const KIND: EntityKind = EntityKind::Players;
    const COLUMNS: &'static [&'static str] = &["First name", "Last name"];
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::text("First name", "New first name"),
        FieldSpec::text("Last name", "New last name"),
    ];

    fn cells(&self) -> Vec<String> {
        vec![self.first_name.clone(), self.last_name.clone()]
    }

    fn label(&self) -> String {
        self.full_name()
    }

    fn field_values(&self) -> Vec<String> {
        vec![self.first_name.clone(), self.last_name.clone()]
    }

    fn detail_rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Id", self.id.to_string()),
            ("First name", self.first_name.clone()),
            ("Last name", self.last_name.clone()),
        ]
    }

    fn draft(form: &FormState) -> Result<PlayerDraft, String> {
        required(form, &[0, 1], "First name and last name must not be empty.")?;
        Ok(PlayerDraft {
            first_name: form.text(0).to_string(),
            last_name: form.text(1).to_string(),
        })
    }

    fn page(c: &Collections) -> &Page<Self> {
        &c.players
    }

    fn page_mut(c: &mut Collections) -> &mut Page<Self> {
        &mut c.players
    }

    fn into_records(items: Vec<Self>) -> Records {
        Records::Players(items)
    }

    fn from_records(records: Records) -> Option<Vec<Self>> {
        match records {
            Records::Players(items) => Some(items),
            _ => None,
        }
    }

    fn into_record(self) -> Record {
        Record::Player(self)
    }

    fn from_record(record: Record) -> Option<Self> {
        match record {
            Record::Player(item) => Some(item),
            _ => None,
        }
    }

    fn into_draft(draft: PlayerDraft) -> Draft {
        Draft::Player(draft)
    }
}

impl Entity for TournamentTeam {
    const KIND: EntityKind = EntityKind::TournamentTeams;
    const COLUMNS: &'static [&'static str] = &["Tournament", "Team"];
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::choice("Tournament", "Select a tournament", EntityKind::Tournaments),
        FieldSpec::choice("Team", "Select a team", EntityKind::Teams),
    ];
    const LOOKUPS: &'static [EntityKind] = &[EntityKind::Tournaments, EntityKind::Teams];
    const FILTERS: &'static [FilterSpec] = &[FilterSpec::new(FilterSlot::Tournament, 't', "Tournament")];

    fn cells(&self) -> Vec<String> {
        vec![tournament_label(&self.tournament), self.team.name.clone()]
    }

    fn label(&self) -> String {
        format!("{} - {}", self.tournament.name, self.team.name)
    }

    fn parent_id(&self) -> Option<u64> {
        Some(self.tournament.id)
    }

    fn field_values(&self) -> Vec<String> {
        vec![self.tournament.id.to_string(), self.team.id.to_string()]
    }

    fn detail_rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Id", self.id.to_string()),
            ("Tournament", tournament_label(&self.tournament)),
            ("Team", self.team.name.clone()),
        ]
    }

    fn draft(form: &FormState) -> Result<TournamentTeamDraft, String> {
        let ids = choices(form, &[0, 1], "Please select both a tournament and a team.")?;
        Ok(TournamentTeamDraft { tournament: ids[0], team: ids[1] })
    }

    fn project(items: &[Self], filters: &Filters) -> Vec<Self> {
        filters::tournament_teams(items, filters)
    }

    fn page(c: &Collections) -> &Page<Self> {
        &c.tournament_teams
    }

    fn page_mut(c: &mut Collections) -> &mut Page<Self> {
        &mut c.tournament_teams
    }

    fn into_records(items: Vec<Self>) -> Records {
        Records::TournamentTeams(items)
    }

    fn from_records(records: Records) -> Option<Vec<Self>> {
        match records {
            Records::TournamentTeams(items) => Some(items),
            _ => None,
        }
    }

    fn into_record(self) -> Record {
        Record::TournamentTeam(self)
    }

    fn from_record(record: Record) -> Option<Self> {
        match record {
            Record::TournamentTeam(item) => Some(item),
            _ => None,
        }
    }

    fn into_draft(draft: TournamentTeamDraft) -> Draft {
        Draft::TournamentTeam(draft)
    }
}

impl Entity for TournamentPlayer {
    const KIND: EntityKind = EntityKind::TournamentPlayers;
    const COLUMNS: &'static [&'static str] = &["Tournament", "Team", "Player"];
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::choice("Tournament team", "Select a tournament team", EntityKind::TournamentTeams),
        FieldSpec::choice("Player", "Select a player", EntityKind::Players),
    ];
    const LOOKUPS: &'static [EntityKind] =
        &[EntityKind::Tournaments, EntityKind::TournamentTeams, EntityKind::Players];
    const FILTERS: &'static [FilterSpec] = &[
        FilterSpec::new(FilterSlot::Tournament, 't', "Tournament"),
        FilterSpec::new(FilterSlot::Team, 'm', "Tournament team"),
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            tournament_label(&self.tournament_team.tournament),
            self.tournament_team.team.name.clone(),
            self.player.full_name(),
        ]
    }

    fn label(&self) -> String {
        format!("{} ({})", self.player.full_name(), self.tournament_team.team.name)
    }

    fn field_values(&self) -> Vec<String> {
        vec![self.tournament_team.id.to_string(), self.player.id.to_string()]
    }

    fn detail_rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Id", self.id.to_string()),
            ("Tournament", tournament_label(&self.tournament_team.tournament)),
            ("Team", self.tournament_team.team.name.clone()),
            ("Player", self.player.full_name()),
        ]
    }

    fn draft(form: &FormState) -> Result<TournamentPlayerDraft, String> {
        let ids = choices(form, &[0, 1], "Please select both a tournament team and a player.")?;
        Ok(TournamentPlayerDraft { tournament_team: ids[0], player: ids[1] })
    }

    fn project(items: &[Self], filters: &Filters) -> Vec<Self> {
        filters::tournament_players(items, filters)
    }

    fn page(c: &Collections) -> &Page<Self> {
        &c.tournament_players
    }

    fn page_mut(c: &mut Collections) -> &mut Page<Self> {
        &mut c.tournament_players
    }

    fn into_records(items: Vec<Self>) -> Records {
        Records::TournamentPlayers(items)
    }

    fn from_records(records: Records) -> Option<Vec<Self>> {
        match records {
            Records::TournamentPlayers(items) => Some(items),
            _ => None,
        }
    }

    fn into_record(self) -> Record {
        Record::TournamentPlayer(self)
    }

    fn from_record(record: Record) -> Option<Self> {
        match record {
            Record::TournamentPlayer(item) => Some(item),
            _ => None,
        }
    }

    fn into_draft(draft: TournamentPlayerDraft) -> Draft {
        Draft::TournamentPlayer(draft)
    }
}

impl Entity for Game {
    const KIND: EntityKind = EntityKind::Games;
    const COLUMNS: &'static [&'static str] = &["Tournament", "Home team", "Away team", "Score", "Date"];
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::choice("Tournament", "Select a tournament", EntityKind::Tournaments),
        FieldSpec::choice("Home team", "Select a home team", EntityKind::TournamentTeams).narrowed_by(0),
        FieldSpec::choice("Away team", "Select an away team", EntityKind::TournamentTeams).narrowed_by(0),
        FieldSpec::number("Home score", "New home score"),
        FieldSpec::number("Away score", "New away score"),
        FieldSpec::date("Date", "YYYY-MM-DD"),
    ];
    const LOOKUPS: &'static [EntityKind] = &[EntityKind::Tournaments, EntityKind::TournamentTeams];
    const FILTERS: &'static [FilterSpec] = &[
        FilterSpec::new(FilterSlot::Tournament, 't', "Tournament"),
        FilterSpec::new(FilterSlot::Team, 'h', "Home team"),
        FilterSpec::new(FilterSlot::AwayTeam, 'a', "Away team"),
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            tournament_label(&self.tournament),
            self.home_team.team.name.clone(),
            self.away_team.team.name.clone(),
            format!("{} - {}", self.home_score, self.away_score),
            format_date(self),
        ]
    }

    fn label(&self) -> String {
        format!("{} vs {}", self.home_team.team.name, self.away_team.team.name)
    }

    fn field_values(&self) -> Vec<String> {
        vec![
            self.tournament.id.to_string(),
            self.home_team.id.to_string(),
            self.away_team.id.to_string(),
            self.home_score.to_string(),
            self.away_score.to_string(),
            self.game_date.map(|d| d.to_string()).unwrap_or_default(),
        ]
    }

    fn detail_rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Id", self.id.to_string()),
            ("Tournament", tournament_label(&self.tournament)),
            ("Home team", self.home_team.team.name.clone()),
            ("Away team", self.away_team.team.name.clone()),
            ("Home score", self.home_score.to_string()),
            ("Away score", self.away_score.to_string()),
            ("Date", format_date(self)),
        ]
    }

    fn draft(form: &FormState) -> Result<GameDraft, String> {
        let ids = choices(form, &[0, 1, 2], "Please select a tournament, home team and away team.")?;
        let score = |field: usize| -> Result<u32, String> {
            if form.text(field).is_empty() {
                return Ok(0);
            }
            form.number(field)
                .ok_or_else(|| "Scores must be whole numbers.".to_string())
        };
        let home_score = score(3)?;
        let away_score = score(4)?;
        let game_date = form
            .date(5)
            .map_err(|_| "Date must be YYYY-MM-DD.".to_string())?;
        Ok(GameDraft {
            tournament: ids[0],
            home_team: ids[1],
            away_team: ids[2],
            home_score,
            away_score,
            game_date,
        })
    }

    fn project(items: &[Self], filters: &Filters) -> Vec<Self> {
        filters::games(items, filters)
    }

    fn page(c: &Collections) -> &Page<Self> {
        &c.games
    }

    fn page_mut(c: &mut Collections) -> &mut Page<Self> {
        &mut c.games
    }

    fn into_records(items: Vec<Self>) -> Records {
        Records::Games(items)
    }

    fn from_records(records: Records) -> Option<Vec<Self>> {
        match records {
            Records::Games(items) => Some(items),
            _ => None,
        }
    }

    fn into_record(self) -> Record {
        Record::Game(self)
    }

    fn from_record(record: Record) -> Option<Self> {
        match record {
            Record::Game(item) => Some(item),
            _ => None,
        }
    }

    fn into_draft(draft: GameDraft) -> Draft {
        Draft::Game(draft)
    }
}

fn format_date(game: &Game) -> String {
    game.game_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}
