//! Saved projects
//!
//! Stored as a single JSON array in `~/.vext/projects.json`, newest first.
//! There is no format version: unknown or unreadable content loads as an
//! empty list and is overwritten by the next save.

use super::{get_global_vext_dir, read_json, with_file_lock, write_json, FileResult};
use crate::models::{AnalysisResult, LandingPage, PsychologyTrigger};
use crate::utils::generate_id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A saved analysis
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Empty until first saved
    #[serde(default)]
    pub id: String,
    pub idea_text: String,
    /// Letter grade
    pub grade: String,
    pub grade_percent: u8,
    pub landing_page: LandingPage,
    #[serde(default)]
    pub psychology: Vec<PsychologyTrigger>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Project {
    /// Snapshot a fresh analysis. Not persisted until saved.
    pub fn from_result(idea_text: &str, result: &AnalysisResult) -> Self {
        Self {
            id: String::new(),
            idea_text: idea_text.to_string(),
            grade: result.grade_letter.to_string(),
            grade_percent: result.grade,
            landing_page: result.landing_page.clone(),
            psychology: result.psychology_triggers.clone(),
            created_at: None,
            updated_at: None,
        }
    }

    /// Replace the snapshot with a refined result. The idea text is kept.
    pub fn apply_refinement(&mut self, result: &AnalysisResult) {
        self.grade = result.grade_letter.to_string();
        self.grade_percent = result.grade;
        self.landing_page = result.landing_page.clone();
        self.psychology = result.psychology_triggers.clone();
    }
}

/// Get the path to the global projects file
pub fn get_projects_file_path() -> PathBuf {
    get_projects_file_path_in(&get_global_vext_dir())
}

fn get_projects_file_path_in(base_dir: &Path) -> PathBuf {
    base_dir.join("projects.json")
}

pub fn get_all_projects() -> Vec<Project> {
    get_all_projects_in(&get_global_vext_dir())
}

/// Load all projects from a specific directory; an unreadable file yields an empty list
pub fn get_all_projects_in(base_dir: &Path) -> Vec<Project> {
    let file_path = get_projects_file_path_in(base_dir);
    if !file_path.exists() {
        return Vec::new();
    }

    match read_json::<Vec<Project>>(&file_path) {
        Ok(projects) => projects,
        Err(e) => {
            log::warn!("Failed to load projects, starting empty: {}", e);
            Vec::new()
        }
    }
}

pub fn get_project(id: &str) -> Option<Project> {
    get_project_in(&get_global_vext_dir(), id)
}

pub fn get_project_in(base_dir: &Path, id: &str) -> Option<Project> {
    get_all_projects_in(base_dir)
        .into_iter()
        .find(|p| p.id == id)
}

/// Insert or update a project and return the stored copy
pub fn save_project(project: Project) -> FileResult<Project> {
    save_project_in(&get_global_vext_dir(), project)
}

/// Upsert by id. New projects go to the top; `created_at` survives updates.
pub fn save_project_in(base_dir: &Path, project: Project) -> FileResult<Project> {
    let file_path = get_projects_file_path_in(base_dir);

    with_file_lock(&file_path, || {
        let mut projects = get_all_projects_in(base_dir);
        let now = Utc::now();

        let existing_index = if project.id.is_empty() {
            None
        } else {
            projects.iter().position(|p| p.id == project.id)
        };

        let mut to_save = project;
        if to_save.id.is_empty() {
            to_save.id = generate_id();
        }
        to_save.updated_at = Some(now);
        to_save.created_at = to_save
            .created_at
            .or_else(|| existing_index.and_then(|i| projects[i].created_at))
            .or(Some(now));

        match existing_index {
            Some(index) => projects[index] = to_save.clone(),
            None => projects.insert(0, to_save.clone()),
        }

        write_json(&file_path, &projects)?;
        log::debug!("Saved project {} ({} total)", to_save.id, projects.len());
        Ok(to_save)
    })
}

pub fn delete_project(id: &str) -> FileResult<()> {
    delete_project_in(&get_global_vext_dir(), id)
}

/// Remove a project; deleting an unknown id is a no-op
pub fn delete_project_in(base_dir: &Path, id: &str) -> FileResult<()> {
    let file_path = get_projects_file_path_in(base_dir);

    with_file_lock(&file_path, || {
        let mut projects = get_all_projects_in(base_dir);
        let before = projects.len();
        projects.retain(|p| p.id != id);

        if projects.len() == before {
            log::debug!("Project {} not found, nothing to delete", id);
            return Ok(());
        }

        write_json(&file_path, &projects)
    })
}
