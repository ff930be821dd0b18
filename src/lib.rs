//! Wave-based arena shooter.
//!
//! The crate is split into a host-independent simulation core and the
//! collaborators around it:
//!
//! * core: [`math`], [`input`], [`entities`], [`spawner`], [`collision`],
//!   [`compute`], driven once per frame through [`compute::frame`];
//! * tuning: [`config`];
//! * collaborators: [`audio`], [`storage`], [`leaderboard`], [`logging`].
//!
//! The `arena_shooter` binary hosts the game in a terminal.

pub mod audio;
pub mod collision;
pub mod compute;
pub mod config;
pub mod entities;
pub mod error;
pub mod events;
pub mod input;
pub mod leaderboard;
pub mod logging;
pub mod math;
pub mod spawner;
pub mod storage;
