use crate::models::job::{Job, JobLevel, JobLocation, JobType};
use crate::models::profile::{CandidateLocation, CandidateProfile};

pub const SKILL_POINTS: u32 = 50;
pub const LOCATION_POINTS: u32 = 20;
pub const JOB_TYPE_POINTS: u32 = 15;
pub const EXPERIENCE_POINTS: u32 = 15;
pub const MAX_SCORE: u32 = 100;

/// Compatibility heuristics between postings and candidates.
///
/// Two independent formulas live here. `job_match_score` ranks listings for a
/// signed-in candidate; `submission_match_score` is frozen onto an application
/// when it is submitted. They are deliberately not reconciled.
pub struct MatchService;

impl MatchService {
    pub fn job_match_score(job: &Job, candidate: &CandidateProfile) -> i32 {
        let total = Self::skill_score(&candidate.skills, &job.requirements.skills)
            + Self::location_score(&job.location, candidate.location.as_ref())
            + Self::job_type_score(job.job_type, &candidate.preferred_job_types)
            + Self::experience_score(job.level, candidate.experience.len());
        total.min(MAX_SCORE) as i32
    }

    /// `floor(50 * matching / max(|candidate|, |job|))`, where a candidate
    /// skill matches when it and some job skill contain one another,
    /// ignoring case.
    pub fn skill_score(candidate_skills: &[String], job_skills: &[String]) -> u32 {
        let candidate = normalized(candidate_skills);
        let job = normalized(job_skills);
        if candidate.is_empty() || job.is_empty() {
            return 0;
        }

        let matching = candidate
            .iter()
            .filter(|c| job.iter().any(|j| c.contains(j.as_str()) || j.contains(c.as_str())))
            .count();
        let denominator = candidate.len().max(job.len());

        (SKILL_POINTS as usize * matching / denominator) as u32
    }

    /// Remote postings always earn the full 20. Otherwise the first of city,
    /// state, country that matches decides the points.
    pub fn location_score(job: &JobLocation, candidate: Option<&CandidateLocation>) -> u32 {
        if job.remote {
            return LOCATION_POINTS;
        }
        let Some(candidate) = candidate else {
            return 0;
        };

        let tiers = [
            (&job.city, &candidate.city, 20),
            (&job.state, &candidate.state, 15),
            (&job.country, &candidate.country, 10),
        ];
        tiers
            .into_iter()
            .find(|(job_value, candidate_value, _)| same_place(job_value, candidate_value))
            .map(|(_, _, points)| points)
            .unwrap_or(0)
    }

    pub fn job_type_score(job_type: JobType, preferred: &[JobType]) -> u32 {
        if preferred.contains(&job_type) {
            JOB_TYPE_POINTS
        } else {
            0
        }
    }

    /// Bands overlap on purpose; each level has exactly one band.
    pub fn experience_score(level: JobLevel, entries: usize) -> u32 {
        let fits = match level {
            JobLevel::Entry => entries <= 1,
            JobLevel::Junior => entries <= 3,
            JobLevel::Mid => (2..=7).contains(&entries),
            JobLevel::Senior => entries >= 5,
            JobLevel::Lead => entries >= 7,
            JobLevel::Executive => entries >= 10,
        };
        if fits {
            EXPERIENCE_POINTS
        } else {
            0
        }
    }

    /// Score stored on an application at submission time.
    pub fn submission_match_score(skills: usize, experience: usize, education: usize) -> i32 {
        let total = (skills * 10).min(50) + (experience * 5).min(30) + (education * 5).min(20);
        total.min(MAX_SCORE as usize) as i32
    }
}

fn normalized(skills: &[String]) -> Vec<String> {
    skills
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn same_place(a: &Option<String>, b: &Option<String>) -> bool {
    match (a.as_deref().map(str::trim), b.as_deref().map(str::trim)) {
        (Some(a), Some(b)) if !a.is_empty() => a.to_lowercase() == b.to_lowercase(),
        _ => false,
    }
}
