//! Coursework tasks. `course_id` must name an existing course; that check
//! spans two entity lists and lives in the portal facade.

use crate::model::entity::{
    choice, closed_enum, haystack, patch_field, ClosedEnum, Entity, NewRecord,
};
use crate::model::id::{IdScheme, SequentialIds};
use crate::model::Priority;
use crate::validation::{Check, FieldRule, FormInput, RuleSet};
use serde::{Deserialize, Serialize};

const IDS: SequentialIds = SequentialIds::new("TSK");

closed_enum! {
    pub enum TaskStatus {
        Todo => "todo",
        InProgress => "in_progress",
        Done => "done",
    }
}

static FIELDS: &[FieldRule] = &[
    FieldRule {
        field: "title",
        label: "Title",
        checks: &[Check::Required, Check::MinLength(3), Check::MaxLength(120)],
    },
    FieldRule {
        field: "course_id",
        label: "Course",
        checks: &[Check::Required],
    },
    FieldRule {
        field: "due_date",
        label: "Due date",
        checks: &[Check::Required, Check::DateNotInPast],
    },
    FieldRule {
        field: "priority",
        label: "Priority",
        checks: &[Check::Required, Check::OneOf(Priority::VALUES)],
    },
    FieldRule {
        field: "notes",
        label: "Notes",
        checks: &[Check::MaxLength(500)],
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    /// ID of the course this task belongs to.
    pub course_id: String,
    pub due_date: String,
    pub priority: Priority,
    pub notes: Option<String>,
    pub owner: String,
    pub status: TaskStatus,
    pub created_at: i64,
}

impl Entity for Task {
    type Status = TaskStatus;

    const STORAGE_KEY: &'static str = "campus.tasks";
    const LABEL: &'static str = "Tasks";
    const ID_SCHEME: IdScheme = IdScheme::Sequential(IDS);

    fn rules() -> RuleSet {
        RuleSet::new(FIELDS)
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> TaskStatus {
        self.status
    }

    fn set_status(&mut self, status: TaskStatus) {
        self.status = status;
    }

    fn from_form(form: &FormInput, new: &NewRecord<'_>) -> Self {
        Self {
            id: new.id.clone(),
            title: form.text("title"),
            course_id: form.text("course_id"),
            due_date: form.text("due_date"),
            priority: choice(form, "priority"),
            notes: form.optional_text("notes"),
            owner: new.session.display_name.clone(),
            status: TaskStatus::Todo,
            created_at: new.created_at,
        }
    }

    fn apply_patch(&mut self, patch: &FormInput) {
        patch_field(patch, "title", |p| self.title = p.text("title"));
        patch_field(patch, "course_id", |p| self.course_id = p.text("course_id"));
        patch_field(patch, "due_date", |p| self.due_date = p.text("due_date"));
        patch_field(patch, "priority", |p| self.priority = choice(p, "priority"));
        patch_field(patch, "notes", |p| self.notes = p.optional_text("notes"));
    }

    fn search_text(&self) -> String {
        haystack([
            self.title.as_str(),
            self.course_id.as_str(),
            self.priority.as_str(),
            self.notes.as_deref().unwrap_or_default(),
        ])
    }
}
