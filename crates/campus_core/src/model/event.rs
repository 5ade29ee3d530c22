//! Campus event listings.

use crate::model::entity::{
    choice, closed_enum, haystack, integer, patch_field, ClosedEnum, DemoSeed, Entity, NewRecord,
    DEMO_DATASET_SIZE,
};
use crate::model::id::{IdScheme, SequentialIds};
use crate::validation::{Check, FieldRule, FormInput, RuleSet};
use serde::{Deserialize, Serialize};

const IDS: SequentialIds = SequentialIds::new("EVT");

closed_enum! {
    /// Lifecycle of a campus event.
    pub enum EventStatus {
        Upcoming => "upcoming",
        Ongoing => "ongoing",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

closed_enum! {
    pub enum EventCategory {
        Academic => "academic",
        Cultural => "cultural",
        Sports => "sports",
        Workshop => "workshop",
        Social => "social",
    }
}

static FIELDS: &[FieldRule] = &[
    FieldRule {
        field: "title",
        label: "Title",
        checks: &[Check::Required, Check::MinLength(3), Check::MaxLength(100)],
    },
    FieldRule {
        field: "description",
        label: "Description",
        checks: &[Check::Required, Check::MaxLength(1000)],
    },
    FieldRule {
        field: "category",
        label: "Category",
        checks: &[Check::Required, Check::OneOf(EventCategory::VALUES)],
    },
    FieldRule {
        field: "location",
        label: "Location",
        checks: &[Check::Required, Check::MaxLength(120)],
    },
    FieldRule {
        field: "date",
        label: "Date",
        checks: &[Check::Required, Check::DateNotInPast],
    },
    FieldRule {
        field: "time",
        label: "Time",
        checks: &[Check::Time],
    },
    FieldRule {
        field: "capacity",
        label: "Capacity",
        checks: &[
            Check::Required,
            Check::Integer {
                min: 1,
                max: 10_000,
            },
        ],
    },
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: EventCategory,
    pub location: String,
    /// `YYYY-MM-DD`.
    pub date: String,
    /// `HH:MM`, when the event has a fixed start.
    pub time: Option<String>,
    pub capacity: u32,
    pub organizer: String,
    pub status: EventStatus,
    pub created_at: i64,
}

impl Entity for Event {
    type Status = EventStatus;

    const STORAGE_KEY: &'static str = "campus.events";
    const LABEL: &'static str = "Events";
    const ID_SCHEME: IdScheme = IdScheme::Sequential(IDS);

    fn rules() -> RuleSet {
        RuleSet::new(FIELDS)
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> EventStatus {
        self.status
    }

    fn set_status(&mut self, status: EventStatus) {
        self.status = status;
    }

    fn from_form(form: &FormInput, new: &NewRecord<'_>) -> Self {
        Self {
            id: new.id.clone(),
            title: form.text("title"),
            description: form.text("description"),
            category: choice(form, "category"),
            location: form.text("location"),
            date: form.text("date"),
            time: form.optional_text("time"),
            capacity: integer(form, "capacity"),
            organizer: new.session.display_name.clone(),
            status: EventStatus::Upcoming,
            created_at: new.created_at,
        }
    }

    fn apply_patch(&mut self, patch: &FormInput) {
        patch_field(patch, "title", |p| self.title = p.text("title"));
        patch_field(patch, "description", |p| {
            self.description = p.text("description");
        });
        patch_field(patch, "category", |p| self.category = choice(p, "category"));
        patch_field(patch, "location", |p| self.location = p.text("location"));
        patch_field(patch, "date", |p| self.date = p.text("date"));
        patch_field(patch, "time", |p| self.time = p.optional_text("time"));
        patch_field(patch, "capacity", |p| {
            self.capacity = integer(p, "capacity");
        });
    }

    fn search_text(&self) -> String {
        haystack([
            self.title.as_str(),
            self.description.as_str(),
            self.location.as_str(),
            self.category.as_str(),
        ])
    }

    fn demo_records(seed: &DemoSeed) -> Vec<Self> {
        const TITLES: [&str; 5] = [
            "Orientation Fair",
            "Robotics Workshop",
            "Spring Concert",
            "Inter-faculty Football",
            "Career Networking Night",
        ];
        const LOCATIONS: [&str; 4] = [
            "Main Hall",
            "Engineering Lab 2",
            "Open Air Theatre",
            "Sports Complex",
        ];

        (0..DEMO_DATASET_SIZE)
            .map(|i| {
                let n = i as i64;
                Self {
                    id: IDS.format(n as u64 + 1),
                    title: format!("{} #{}", TITLES[i % TITLES.len()], i / TITLES.len() + 1),
                    description: "Open to all students. Registration at the venue.".to_string(),
                    category: EventCategory::ALL[i % EventCategory::ALL.len()],
                    location: LOCATIONS[i % LOCATIONS.len()].to_string(),
                    date: seed.date_in(3 * n + 1),
                    time: Some(format!("{:02}:00", 9 + i % 9)),
                    capacity: 50 + 25 * i as u32,
                    organizer: "Student Affairs".to_string(),
                    status: EventStatus::Upcoming,
                    created_at: seed.minutes_ago(60 * (n + 1)),
                }
            })
            .collect()
    }
}
