//! Screen catalogue and the role capability check.
//!
//! All role-based screen gating goes through `can_view`; screens never carry
//! their own role conditionals.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::Role;

/// Every screen the client can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Screen {
    Home,
    Login,
    Register,
    Recovery,
    Ranking,
    Knowledge,
    TraineeBoard,
    TrainerBoard,
    CoordinatorBoard,
    Quiz,
    Stats,
    Users,
    Questions,
    GlobalPhases,
}

impl Screen {
    /// Screens reachable without a session.
    pub fn is_public(self) -> bool {
        matches!(
            self,
            Screen::Home | Screen::Login | Screen::Register | Screen::Recovery
        )
    }

    /// The board screen for a track role, if the role carries one.
    pub fn board_for(track: Role) -> Option<Screen> {
        match track {
            Role::Trainee => Some(Screen::TraineeBoard),
            Role::Trainer => Some(Screen::TrainerBoard),
            Role::Coordinator => Some(Screen::CoordinatorBoard),
            Role::Admin | Role::Master => None,
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Screen::Home => "home",
            Screen::Login => "login",
            Screen::Register => "register",
            Screen::Recovery => "recovery",
            Screen::Ranking => "ranking",
            Screen::Knowledge => "knowledge base",
            Screen::TraineeBoard => "trainee board",
            Screen::TrainerBoard => "trainer board",
            Screen::CoordinatorBoard => "coordinator board",
            Screen::Quiz => "quiz",
            Screen::Stats => "stats",
            Screen::Users => "user management",
            Screen::Questions => "question management",
            Screen::GlobalPhases => "global phases",
        };
        write!(f, "{name}")
    }
}

/// Whether a role may view a screen.
///
/// Administrative screens require Admin or Master. A track board (and the
/// quiz behind it) requires at least that track's rank, so a trainer can
/// revisit the trainee track but not preview the coordinator one;
/// administrative tiers see every board. Ranking and the knowledge base are
/// open to everyone signed in.
pub fn can_view(role: Role, screen: Screen) -> bool {
    match screen {
        Screen::Home | Screen::Login | Screen::Register | Screen::Recovery => true,
        Screen::Ranking | Screen::Knowledge | Screen::Quiz => true,
        Screen::TraineeBoard => board_access(role, Role::Trainee),
        Screen::TrainerBoard => board_access(role, Role::Trainer),
        Screen::CoordinatorBoard => board_access(role, Role::Coordinator),
        Screen::Stats | Screen::Users | Screen::Questions | Screen::GlobalPhases => {
            role.is_administrative()
        }
    }
}

fn board_access(role: Role, track: Role) -> bool {
    role.is_administrative() || role.rank() >= track.rank()
}

/// The screen a user lands on after signing in.
pub fn landing_screen(role: Role) -> Screen {
    match role {
        Role::Master | Role::Admin => Screen::Stats,
        Role::Coordinator => Screen::CoordinatorBoard,
        Role::Trainer => Screen::TrainerBoard,
        Role::Trainee => Screen::TraineeBoard,
    }
}
