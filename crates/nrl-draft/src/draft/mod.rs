// Draft state: the user's selection sets and the league pick board.

pub mod league;
pub mod selection;
