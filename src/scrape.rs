use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use log::info;

use crate::{
    auth::authenticate,
    config::{ScrapeOptions, TIMEZONE},
    credentials::Credentials,
    error::{Result, ScrapeError},
    extractor::extract,
    parser::portal,
    progress::Progress,
    reconcile::credit_stats,
    schema::{LoginResult, RESULT_VERSION},
    session::Session,
    transport::Transport,
};

/// Logs in and collects the records of every enrollment of the student.
///
/// Enrollments are processed one after another; any failure fails the whole scrape.
pub async fn fetch_all<T, F>(
    credentials: &Credentials,
    transport: T,
    options: ScrapeOptions,
    progress: F,
) -> Result<LoginResult>
where
    T: Transport,
    F: FnMut(Progress),
{
    let now = Utc::now().with_timezone(&TIMEZONE);
    fetch_all_at(credentials, transport, options, progress, now).await
}

/// [`fetch_all`] with an explicit current time, which decides the year of exam dates.
pub async fn fetch_all_at<T, F>(
    credentials: &Credentials,
    transport: T,
    options: ScrapeOptions,
    mut progress: F,
    now: DateTime<Tz>,
) -> Result<LoginResult>
where
    T: Transport,
    F: FnMut(Progress),
{
    if !credentials.is_complete() {
        return Err(ScrapeError::MissingCredential);
    }
    let mut session = Session::new(transport, options);
    let home = authenticate(&mut session, credentials, &mut progress).await?;

    let (directions, identity) = {
        let html = portal::parse_home(home.html());
        (portal::directions(&html), portal::identity(&html))
    };

    let mut credits = vec![];
    let mut blocks = vec![];
    let mut schedule = vec![];
    for enrollment in home.enrollments() {
        let records = extract(&mut session, enrollment, now).await?;
        credits.extend(records.credits);
        blocks.extend(records.blocks);
        schedule.extend(records.schedule);
    }

    let stats = credit_stats(&credits);
    info!(
        "Collected {} credits, {} blocks, {} schedule entries",
        credits.len(),
        blocks.len(),
        schedule.len()
    );
    Ok(LoginResult {
        credits,
        blocks,
        schedule,
        directions,
        stats,
        identity,
        success: true,
        version: RESULT_VERSION,
    })
}
