use chrono::{DateTime, Utc};
use sqlx::types::Json;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::application::{
    Application, ApplicationStatus, Communication, CommunicationType, Interview, Offer,
    TimelineEntry,
};
use crate::utils::time::not_before;

/// Entries produced by one tracker operation, to be appended by the store.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Appended {
    pub timeline: Vec<TimelineEntry>,
    pub communications: Vec<Communication>,
}

/// Fields an evaluator may set; `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationPatch {
    pub technical_skills: Option<u8>,
    pub communication: Option<u8>,
    pub cultural_fit: Option<u8>,
    pub experience: Option<u8>,
    pub overall: Option<u8>,
    pub notes: Option<String>,
    pub recommended: Option<bool>,
}

/// Status bookkeeping for applications.
///
/// Every operation works on an in-memory [`Application`] and either applies
/// completely or returns an error without touching it. Authorization is the
/// caller's job. Any status may follow any other through
/// [`LifecycleTracker::change_status`]; only the offer and withdrawal paths
/// check the current state.
pub struct LifecycleTracker;

impl LifecycleTracker {
    /// Writes `status` and logs it on the timeline.
    pub fn change_status(
        app: &mut Application,
        status: ApplicationStatus,
        actor: Uuid,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Appended {
        let entry = Self::record(app, status, Some(actor), notes, now);
        Appended {
            timeline: vec![entry],
            ..Default::default()
        }
    }

    pub fn schedule_interview(
        app: &mut Application,
        interview: Interview,
        actor: Uuid,
        now: DateTime<Utc>,
    ) -> Appended {
        app.interview = Some(Json(interview));
        Self::change_status(
            app,
            ApplicationStatus::InterviewScheduled,
            actor,
            Some("Interview scheduled".to_string()),
            now,
        )
    }

    /// Merges the supplied ratings into the existing evaluation. Status and
    /// timeline are left as they are.
    pub fn evaluate(
        app: &mut Application,
        patch: EvaluationPatch,
        actor: Uuid,
        now: DateTime<Utc>,
    ) -> Appended {
        let mut evaluation = app
            .evaluation
            .take()
            .map(|Json(e)| e)
            .unwrap_or_default();

        merge(&mut evaluation.technical_skills, patch.technical_skills);
        merge(&mut evaluation.communication, patch.communication);
        merge(&mut evaluation.cultural_fit, patch.cultural_fit);
        merge(&mut evaluation.experience, patch.experience);
        merge(&mut evaluation.overall, patch.overall);
        merge(&mut evaluation.notes, patch.notes);
        merge(&mut evaluation.recommended, patch.recommended);
        evaluation.evaluated_by = Some(actor);
        evaluation.evaluated_at = Some(now);

        app.evaluation = Some(Json(evaluation));
        Appended::default()
    }

    pub fn make_offer(
        app: &mut Application,
        mut offer: Offer,
        actor: Uuid,
        now: DateTime<Utc>,
    ) -> Appended {
        offer.accepted = false;
        offer.accepted_at = None;
        app.offer = Some(Json(offer));
        Self::change_status(
            app,
            ApplicationStatus::Offered,
            actor,
            Some("Offer extended".to_string()),
            now,
        )
    }

    pub fn accept_offer(app: &mut Application, actor: Uuid, now: DateTime<Utc>) -> Result<Appended> {
        if app.status != ApplicationStatus::Offered {
            return Err(Error::Conflict(format!(
                "Only an offered application can accept an offer (current status: {})",
                app.status
            )));
        }
        let Some(Json(offer)) = app.offer.as_mut() else {
            return Err(Error::Conflict("Application has no offer to accept".to_string()));
        };

        let stamp = not_before(app.timeline.last().map(|e| e.timestamp), now);
        offer.accepted = true;
        offer.accepted_at = Some(stamp);
        Ok(Self::change_status(
            app,
            ApplicationStatus::Hired,
            actor,
            Some("Offer accepted".to_string()),
            now,
        ))
    }

    pub fn withdraw(
        app: &mut Application,
        actor: Uuid,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Appended> {
        match app.status {
            ApplicationStatus::Hired => Err(Error::Conflict(
                "A hired application cannot be withdrawn".to_string(),
            )),
            ApplicationStatus::Withdrawn => Err(Error::Conflict(
                "Application has already been withdrawn".to_string(),
            )),
            _ => Ok(Self::change_status(
                app,
                ApplicationStatus::Withdrawn,
                actor,
                Some(reason.unwrap_or_else(|| "Withdrawn by applicant".to_string())),
                now,
            )),
        }
    }

    pub fn add_communication(
        app: &mut Application,
        sender: Uuid,
        message: String,
        kind: CommunicationType,
        now: DateTime<Utc>,
    ) -> Appended {
        let timestamp = not_before(app.communications.last().map(|c| c.timestamp), now);
        let communication = Communication {
            sender,
            message,
            kind,
            timestamp,
        };
        app.communications.push(communication.clone());
        Appended {
            communications: vec![communication],
            ..Default::default()
        }
    }

    /// The first entry of a fresh application.
    pub fn submitted(applicant: Uuid, now: DateTime<Utc>) -> TimelineEntry {
        TimelineEntry {
            action: ApplicationStatus::Applied,
            timestamp: now,
            performed_by: Some(applicant),
            notes: Some("Application submitted".to_string()),
        }
    }

    fn record(
        app: &mut Application,
        status: ApplicationStatus,
        actor: Option<Uuid>,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> TimelineEntry {
        let entry = TimelineEntry {
            action: status,
            timestamp: not_before(app.timeline.last().map(|e| e.timestamp), now),
            performed_by: actor,
            notes: notes.filter(|n| !n.trim().is_empty()),
        };
        app.status = status;
        app.timeline.push(entry.clone());
        entry
    }
}

fn merge<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}
