//! Loads every view of one enrollment and turns it into records.

use anyhow::Context;
use chrono::DateTime;
use chrono_tz::Tz;
use log::{debug, info};
use scraper::Html;
use serde::Serialize;

use crate::{
    auth::EnrollmentId,
    config::urls,
    error::{Result, ScrapeError},
    parser::{exams, grades, projects, schedule, timetable},
    reconcile::reconcile,
    schema::{Block, Credit, ScheduleEntry},
    session::Session,
    transport::{Redirect, Transport},
};

/// What one enrollment contributes to the result.
#[derive(Debug, Default)]
pub struct EnrollmentRecords {
    pub credits: Vec<Credit>,
    pub blocks: Vec<Block>,
    pub schedule: Vec<ScheduleEntry>,
}

#[derive(Debug, Serialize)]
struct EnrollmentForm<'a> {
    #[serde(rename = "immatrikulationIndex")]
    enrollment: &'a EnrollmentId,
}

#[derive(Debug, Serialize)]
struct SemesterForm<'a> {
    #[serde(rename = "immatrikulationIndex")]
    enrollment: &'a EnrollmentId,
    semkez: &'a str,
    reload: &'static str,
}

/// Makes `enrollment` the one the portal serves views for.
///
/// The choice lives in the server-side session, so it is repeated before every view.
async fn select_enrollment<T: Transport>(
    session: &mut Session<T>,
    enrollment: &EnrollmentId,
) -> Result<()> {
    session
        .post_form(
            urls::SELECT_ENROLLMENT,
            &EnrollmentForm { enrollment },
            Redirect::Follow,
        )
        .await?;
    Ok(())
}

async fn load_view<T: Transport, F: Serialize + ?Sized>(
    session: &mut Session<T>,
    enrollment: &EnrollmentId,
    url: &str,
    form: &F,
) -> Result<String> {
    select_enrollment(session, enrollment).await?;
    Ok(session.post_form(url, form, Redirect::Follow).await?.body)
}

fn parse_page<R>(
    body: &str,
    page: &str,
    parse: impl FnOnce(&Html) -> anyhow::Result<R>,
) -> Result<R> {
    parse(&Html::parse_document(body))
        .with_context(|| format!("While parsing the {page}"))
        .map_err(ScrapeError::MalformedPortalPage)
}

/// Fetches and reconciles schedule, timetables, grades, projects and exams of one enrollment.
///
/// `now` anchors the year of exam dates.
pub async fn extract<T: Transport>(
    session: &mut Session<T>,
    enrollment: &EnrollmentId,
    now: DateTime<Tz>,
) -> Result<EnrollmentRecords> {
    info!("Loading enrollment {enrollment}");
    let form = EnrollmentForm { enrollment };

    let body = load_view(
        session,
        enrollment,
        urls::SCHEDULE,
        &[("stundenplan", "Stundenplan")],
    )
    .await?;
    let schedule = parse_page(&body, "schedule", schedule::parse)?;
    debug!("{} schedule entries", schedule.len());

    let body = load_view(session, enrollment, urls::TIMETABLE, &form).await?;
    let current = parse_page(&body, "timetable", timetable::parse)?;
    debug!(
        "{} booked courses in {}; other semesters: {:?}",
        current.credits.len(),
        current.period,
        current.other_periods
    );

    let mut other_timetables = vec![];
    for semkez in &current.other_periods {
        session.pause().await;
        let semester_form = SemesterForm {
            enrollment,
            semkez,
            reload: "Semester",
        };
        let body = load_view(session, enrollment, urls::TIMETABLE, &semester_form).await?;
        let page = parse_page(&body, "timetable", timetable::parse)?;
        debug!("{} booked courses in {}", page.credits.len(), page.period);
        other_timetables.extend(page.credits);
    }

    session.pause().await;
    let body = load_view(session, enrollment, urls::GRADES, &form).await?;
    let grades::GradeOverview {
        modules,
        mut blocks,
    } = parse_page(&body, "grade overview", grades::parse)?;
    debug!("{} graded modules, {} blocks", modules.len(), blocks.len());

    session.pause().await;
    let body = load_view(session, enrollment, urls::PROJECTS, &form).await?;
    let projects = parse_page(&body, "project list", projects::parse)?;
    debug!("{} projects", projects.len());

    let body = load_view(session, enrollment, urls::EXAMS, &form).await?;
    let exams = parse_page(&body, "exam plan", |html| exams::parse(html, now))?;
    debug!("{} exams", exams.len());

    let credits = modules
        .into_iter()
        .chain(projects)
        .chain(other_timetables)
        .chain(current.credits)
        .collect();
    let credits = reconcile(credits, &mut blocks, &exams);
    info!("Enrollment {enrollment}: {} credits", credits.len());
    Ok(EnrollmentRecords {
        credits,
        blocks,
        schedule,
    })
}

#[cfg(test)]
pub mod tests {
    use chrono::TimeZone;

    use crate::{
        auth::EnrollmentId,
        config::{urls, ScrapeOptions, TIMEZONE},
        parser::{
            exams::tests::EXAMS_HTML, grades::tests::GRADES_HTML,
            projects::tests::PROJECTS_HTML, schedule::tests::SCHEDULE_HTML,
            timetable::tests::TIMETABLE_HTML,
        },
        session::Session,
        transport::mock::ScriptedTransport,
    };

    use super::extract;

    /// Replies for one enrollment whose timetable offers two other semesters.
    pub fn view_replies() -> Vec<&'static str> {
        vec![
            "",
            SCHEDULE_HTML,
            "",
            TIMETABLE_HTML,
            "",
            TIMETABLE_HTML,
            "",
            TIMETABLE_HTML,
            "",
            GRADES_HTML,
            "",
            PROJECTS_HTML,
            "",
            EXAMS_HTML,
        ]
    }

    #[tokio::test]
    async fn request_order() {
        let mut session = Session::new(
            ScriptedTransport::new(view_replies()),
            ScrapeOptions::builder().pacing_ms(0).build(),
        );
        let now = TIMEZONE.with_ymd_and_hms(2019, 12, 1, 12, 0, 0).unwrap();
        let enrollment = EnrollmentId::from("1");
        let records = extract(&mut session, &enrollment, now).await.unwrap();
        assert!(!records.credits.is_empty());
        assert!(records.credits.iter().all(|c| !c.is_orphan()));

        let transport = session.into_transport();
        assert_eq!(transport.remaining(), 0);
        let requests: Vec<_> = transport
            .requests
            .iter()
            .map(|r| (r.url.as_str(), r.body.as_deref().unwrap_or_default()))
            .collect();
        let select = (urls::SELECT_ENROLLMENT, "immatrikulationIndex=1");
        assert_eq!(
            requests,
            [
                select,
                (urls::SCHEDULE, "stundenplan=Stundenplan"),
                select,
                (urls::TIMETABLE, "immatrikulationIndex=1"),
                select,
                (
                    urls::TIMETABLE,
                    "immatrikulationIndex=1&semkez=2020S&reload=Semester"
                ),
                select,
                (
                    urls::TIMETABLE,
                    "immatrikulationIndex=1&semkez=2019S&reload=Semester"
                ),
                select,
                (urls::GRADES, "immatrikulationIndex=1"),
                select,
                (urls::PROJECTS, "immatrikulationIndex=1"),
                select,
                (urls::EXAMS, "immatrikulationIndex=1"),
            ]
        );
    }

    #[tokio::test]
    async fn malformed_grades_page() {
        let mut replies = view_replies();
        replies[9] = r#"<table class="tablelist"><tr><td nowrap>252-0027-00 V</td></tr></table>"#;
        let mut session = Session::new(
            ScriptedTransport::new(replies),
            ScrapeOptions::builder().pacing_ms(0).build(),
        );
        let now = TIMEZONE.with_ymd_and_hms(2019, 12, 1, 12, 0, 0).unwrap();
        let error = extract(&mut session, &EnrollmentId::from("0"), now)
            .await
            .unwrap_err();
        assert_eq!(error.kind(), "MALFORMED_PORTAL_PAGE");
        assert!(error.to_string().contains("grade overview"));
    }
}
