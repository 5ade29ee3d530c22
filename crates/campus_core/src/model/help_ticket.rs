//! Help desk tickets.

use crate::model::entity::{
    choice, closed_enum, haystack, patch_field, ClosedEnum, DemoSeed, Entity, NewRecord,
    DEMO_DATASET_SIZE,
};
use crate::model::id::{IdScheme, SequentialIds};
use crate::model::Priority;
use crate::validation::{Check, FieldRule, FormInput, RuleSet};
use serde::{Deserialize, Serialize};

const IDS: SequentialIds = SequentialIds::new("TKT");

closed_enum! {
    pub enum TicketStatus {
        Open => "open",
        InProgress => "in_progress",
        Resolved => "resolved",
        Closed => "closed",
    }
}

closed_enum! {
    pub enum TicketCategory {
        Account => "account",
        Technical => "technical",
        Academic => "academic",
        Facilities => "facilities",
        Other => "other",
    }
}

static FIELDS: &[FieldRule] = &[
    FieldRule {
        field: "subject",
        label: "Subject",
        checks: &[Check::Required, Check::MinLength(5), Check::MaxLength(120)],
    },
    FieldRule {
        field: "description",
        label: "Description",
        checks: &[Check::Required, Check::MinLength(10), Check::MaxLength(2000)],
    },
    FieldRule {
        field: "category",
        label: "Category",
        checks: &[Check::Required, Check::OneOf(TicketCategory::VALUES)],
    },
    FieldRule {
        field: "priority",
        label: "Priority",
        checks: &[Check::Required, Check::OneOf(Priority::VALUES)],
    },
    FieldRule {
        field: "contact_email",
        label: "Contact email",
        checks: &[Check::Required, Check::Email],
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelpTicket {
    pub id: String,
    pub subject: String,
    pub description: String,
    pub category: TicketCategory,
    pub priority: Priority,
    pub contact_email: String,
    pub submitted_by: String,
    pub status: TicketStatus,
    pub created_at: i64,
}

impl Entity for HelpTicket {
    type Status = TicketStatus;

    const STORAGE_KEY: &'static str = "campus.help_tickets";
    const LABEL: &'static str = "Help Desk";
    const ID_SCHEME: IdScheme = IdScheme::Sequential(IDS);

    fn rules() -> RuleSet {
        RuleSet::new(FIELDS)
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> TicketStatus {
        self.status
    }

    fn set_status(&mut self, status: TicketStatus) {
        self.status = status;
    }

    fn from_form(form: &FormInput, new: &NewRecord<'_>) -> Self {
        Self {
            id: new.id.clone(),
            subject: form.text("subject"),
            description: form.text("description"),
            category: choice(form, "category"),
            priority: choice(form, "priority"),
            contact_email: form.text("contact_email"),
            submitted_by: new.session.display_name.clone(),
            status: TicketStatus::Open,
            created_at: new.created_at,
        }
    }

    fn apply_patch(&mut self, patch: &FormInput) {
        patch_field(patch, "subject", |p| self.subject = p.text("subject"));
        patch_field(patch, "description", |p| {
            self.description = p.text("description");
        });
        patch_field(patch, "category", |p| self.category = choice(p, "category"));
        patch_field(patch, "priority", |p| self.priority = choice(p, "priority"));
        patch_field(patch, "contact_email", |p| {
            self.contact_email = p.text("contact_email");
        });
    }

    fn search_text(&self) -> String {
        haystack([
            self.subject.as_str(),
            self.description.as_str(),
            self.category.as_str(),
        ])
    }

    fn demo_records(seed: &DemoSeed) -> Vec<Self> {
        const SUBJECTS: [(&str, TicketCategory); 5] = [
            ("Cannot log into the portal", TicketCategory::Account),
            ("Wi-Fi drops in the library", TicketCategory::Technical),
            ("Grade not showing for MA201", TicketCategory::Academic),
            ("Broken chair in room 105", TicketCategory::Facilities),
            ("Lost parking permit", TicketCategory::Other),
        ];

        (0..DEMO_DATASET_SIZE)
            .map(|i| {
                let (subject, category) = SUBJECTS[i % SUBJECTS.len()];
                Self {
                    id: IDS.format(i as u64 + 1),
                    subject: subject.to_string(),
                    description: format!("{subject}. Reported through the help desk form."),
                    category,
                    priority: Priority::ALL[(i + 1) % Priority::ALL.len()],
                    contact_email: format!("student{}@campus.edu", i + 1),
                    submitted_by: format!("Student {}", i + 1),
                    status: TicketStatus::Open,
                    created_at: seed.minutes_ago(15 * (i as i64 + 1)),
                }
            })
            .collect()
    }
}
