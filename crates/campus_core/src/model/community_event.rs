//! Community-organized events (clubs, volunteering, meetups).

use crate::model::entity::{
    closed_enum, haystack, integer, patch_field, DemoSeed, Entity, NewRecord, DEMO_DATASET_SIZE,
};
use crate::model::id::{IdScheme, SequentialIds};
use crate::validation::{Check, FieldRule, FormInput, RuleSet};
use serde::{Deserialize, Serialize};

const IDS: SequentialIds = SequentialIds::new("CEV");

closed_enum! {
    pub enum CommunityEventStatus {
        Upcoming => "upcoming",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

static FIELDS: &[FieldRule] = &[
    FieldRule {
        field: "title",
        label: "Title",
        checks: &[Check::Required, Check::MinLength(3), Check::MaxLength(100)],
    },
    FieldRule {
        field: "organizer_name",
        label: "Organizer",
        checks: &[Check::Required, Check::MinLength(2), Check::MaxLength(80)],
    },
    FieldRule {
        field: "date",
        label: "Date",
        checks: &[Check::Required, Check::DateNotInPast],
    },
    FieldRule {
        field: "location",
        label: "Location",
        checks: &[Check::Required, Check::MaxLength(120)],
    },
    FieldRule {
        field: "max_participants",
        label: "Maximum participants",
        checks: &[Check::Required, Check::Integer { min: 1, max: 5_000 }],
    },
    FieldRule {
        field: "description",
        label: "Description",
        checks: &[Check::MaxLength(1000)],
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityEvent {
    pub id: String,
    pub title: String,
    pub organizer_name: String,
    pub date: String,
    pub location: String,
    pub max_participants: u32,
    pub description: Option<String>,
    pub submitted_by: String,
    pub status: CommunityEventStatus,
    pub created_at: i64,
}

impl Entity for CommunityEvent {
    type Status = CommunityEventStatus;

    const STORAGE_KEY: &'static str = "campus.community_events";
    const LABEL: &'static str = "Community Events";
    const ID_SCHEME: IdScheme = IdScheme::Sequential(IDS);

    fn rules() -> RuleSet {
        RuleSet::new(FIELDS)
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> CommunityEventStatus {
        self.status
    }

    fn set_status(&mut self, status: CommunityEventStatus) {
        self.status = status;
    }

    fn from_form(form: &FormInput, new: &NewRecord<'_>) -> Self {
        Self {
            id: new.id.clone(),
            title: form.text("title"),
            organizer_name: form.text("organizer_name"),
            date: form.text("date"),
            location: form.text("location"),
            max_participants: integer(form, "max_participants"),
            description: form.optional_text("description"),
            submitted_by: new.session.display_name.clone(),
            status: CommunityEventStatus::Upcoming,
            created_at: new.created_at,
        }
    }

    fn apply_patch(&mut self, patch: &FormInput) {
        patch_field(patch, "title", |p| self.title = p.text("title"));
        patch_field(patch, "organizer_name", |p| {
            self.organizer_name = p.text("organizer_name");
        });
        patch_field(patch, "date", |p| self.date = p.text("date"));
        patch_field(patch, "location", |p| self.location = p.text("location"));
        patch_field(patch, "max_participants", |p| {
            self.max_participants = integer(p, "max_participants");
        });
        patch_field(patch, "description", |p| {
            self.description = p.optional_text("description");
        });
    }

    fn search_text(&self) -> String {
        haystack([
            self.title.as_str(),
            self.organizer_name.as_str(),
            self.location.as_str(),
            self.description.as_deref().unwrap_or_default(),
        ])
    }

    fn demo_records(seed: &DemoSeed) -> Vec<Self> {
        const ROWS: [(&str, &str); 5] = [
            ("Beach clean-up", "Green Campus Club"),
            ("Board game night", "Tabletop Society"),
            ("Blood donation drive", "Red Cross Chapter"),
            ("Coding dojo", "Developers Guild"),
            ("Community garden day", "Urban Farming Club"),
        ];
        const PLACES: [&str; 3] = ["Student Union", "North Lawn", "Community Center"];

        (0..DEMO_DATASET_SIZE)
            .map(|i| {
                let n = i as i64;
                let (title, organizer) = ROWS[i % ROWS.len()];
                let term = if i < ROWS.len() { "autumn" } else { "spring" };
                Self {
                    id: IDS.format(n as u64 + 1),
                    title: format!("{title} ({term})"),
                    organizer_name: organizer.to_string(),
                    date: seed.date_in(7 * (n + 1)),
                    location: PLACES[i % PLACES.len()].to_string(),
                    max_participants: 20 + 10 * i as u32,
                    description: None,
                    submitted_by: organizer.to_string(),
                    status: CommunityEventStatus::Upcoming,
                    created_at: seed.minutes_ago(120 * (n + 1)),
                }
            })
            .collect()
    }
}
