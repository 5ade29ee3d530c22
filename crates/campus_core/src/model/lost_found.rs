//! Lost-and-found reports.
//!
//! Report dates describe when the item went missing or was picked up, so
//! unlike event dates they may lie in the past.

use crate::model::entity::{
    choice, closed_enum, haystack, patch_field, ClosedEnum, DemoSeed, Entity, NewRecord,
    DEMO_DATASET_SIZE,
};
use crate::model::id::{IdScheme, SequentialIds};
use crate::validation::{Check, FieldRule, FormInput, RuleSet};
use serde::{Deserialize, Serialize};

const IDS: SequentialIds = SequentialIds::new("LF");

closed_enum! {
    pub enum ReportStatus {
        Open => "open",
        Claimed => "claimed",
        Closed => "closed",
    }
}

closed_enum! {
    /// Whether the reporter lost or found the item.
    pub enum ReportKind {
        Lost => "lost",
        Found => "found",
    }
}

static FIELDS: &[FieldRule] = &[
    FieldRule {
        field: "kind",
        label: "Report type",
        checks: &[Check::Required, Check::OneOf(ReportKind::VALUES)],
    },
    FieldRule {
        field: "item_name",
        label: "Item name",
        checks: &[Check::Required, Check::MinLength(2), Check::MaxLength(80)],
    },
    FieldRule {
        field: "description",
        label: "Description",
        checks: &[Check::Required, Check::MinLength(10), Check::MaxLength(500)],
    },
    FieldRule {
        field: "location",
        label: "Location",
        checks: &[Check::Required, Check::MaxLength(120)],
    },
    FieldRule {
        field: "date",
        label: "Date",
        checks: &[Check::Required, Check::Date],
    },
    FieldRule {
        field: "contact_phone",
        label: "Contact phone",
        checks: &[Check::Required, Check::MinLength(9), Check::Phone],
    },
    FieldRule {
        field: "contact_email",
        label: "Contact email",
        checks: &[Check::Email],
    },
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LostFoundReport {
    pub id: String,
    pub kind: ReportKind,
    pub item_name: String,
    pub description: String,
    pub location: String,
    pub date: String,
    pub contact_phone: String,
    pub contact_email: Option<String>,
    pub reported_by: String,
    pub status: ReportStatus,
    pub created_at: i64,
}

impl Entity for LostFoundReport {
    type Status = ReportStatus;

    const STORAGE_KEY: &'static str = "campus.lost_found";
    const LABEL: &'static str = "Lost & Found";
    const ID_SCHEME: IdScheme = IdScheme::Sequential(IDS);

    fn rules() -> RuleSet {
        RuleSet::new(FIELDS)
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> ReportStatus {
        self.status
    }

    fn set_status(&mut self, status: ReportStatus) {
        self.status = status;
    }

    fn from_form(form: &FormInput, new: &NewRecord<'_>) -> Self {
        Self {
            id: new.id.clone(),
            kind: choice(form, "kind"),
            item_name: form.text("item_name"),
            description: form.text("description"),
            location: form.text("location"),
            date: form.text("date"),
            contact_phone: form.text("contact_phone"),
            contact_email: form.optional_text("contact_email"),
            reported_by: new.session.display_name.clone(),
            status: ReportStatus::Open,
            created_at: new.created_at,
        }
    }

    fn apply_patch(&mut self, patch: &FormInput) {
        patch_field(patch, "kind", |p| self.kind = choice(p, "kind"));
        patch_field(patch, "item_name", |p| self.item_name = p.text("item_name"));
        patch_field(patch, "description", |p| {
            self.description = p.text("description");
        });
        patch_field(patch, "location", |p| self.location = p.text("location"));
        patch_field(patch, "date", |p| self.date = p.text("date"));
        patch_field(patch, "contact_phone", |p| {
            self.contact_phone = p.text("contact_phone");
        });
        patch_field(patch, "contact_email", |p| {
            self.contact_email = p.optional_text("contact_email");
        });
    }

    fn search_text(&self) -> String {
        haystack([
            self.item_name.as_str(),
            self.description.as_str(),
            self.location.as_str(),
            self.kind.as_str(),
        ])
    }

    fn demo_records(seed: &DemoSeed) -> Vec<Self> {
        const ITEMS: [&str; 10] = [
            "Black umbrella",
            "Student ID card",
            "Blue water bottle",
            "Calculator",
            "Laptop charger",
            "House keys",
            "Wireless earbuds",
            "Grey hoodie",
            "Lab notebook",
            "Reading glasses",
        ];
        const PLACES: [&str; 5] = ["Library", "Cafeteria", "Lecture Hall B", "Gym", "Bus stop"];

        (0..DEMO_DATASET_SIZE)
            .map(|i| {
                let n = i as i64;
                let kind = if i % 2 == 0 {
                    ReportKind::Lost
                } else {
                    ReportKind::Found
                };
                let place = PLACES[i % PLACES.len()];
                Self {
                    id: IDS.format(n as u64 + 1),
                    kind,
                    item_name: ITEMS[i].to_string(),
                    description: format!("{} last seen near the {place}.", ITEMS[i]),
                    location: place.to_string(),
                    date: seed.date_in(-(n + 1)),
                    contact_phone: format!("+1 555 010 {:04}", 1000 + i),
                    contact_email: (i % 3 == 0).then(|| format!("reporter{}@campus.edu", i + 1)),
                    reported_by: "Campus Security".to_string(),
                    status: ReportStatus::Open,
                    created_at: seed.minutes_ago(30 * (n + 1)),
                }
            })
            .collect()
    }
}
