use std::panic::{catch_unwind, AssertUnwindSafe};

use log::{info, warn};
use serde::Serialize;
use strum::{Display, EnumIter};

/// Milestones of a login, reported in this order.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Display, EnumIter, Serialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Progress {
    ContactIdp,
    Connected,
    LoggingIn,
    LoggedIn,
    LoadingModules,
}

/// Hands `stage` to the callback. A panicking callback is logged and otherwise ignored.
pub fn notify<F: FnMut(Progress)>(callback: &mut F, stage: Progress) {
    info!("{stage}");
    if catch_unwind(AssertUnwindSafe(|| callback(stage))).is_err() {
        warn!("Progress callback panicked at {stage}; continuing");
    }
}
