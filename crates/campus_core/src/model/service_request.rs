//! Facility service requests (maintenance, IT, cleaning, ...).

use crate::model::entity::{
    choice, closed_enum, haystack, patch_field, ClosedEnum, DemoSeed, Entity, NewRecord,
    DEMO_DATASET_SIZE,
};
use crate::model::id::{IdScheme, SequentialIds};
use crate::model::Priority;
use crate::validation::{Check, FieldRule, FormInput, RuleSet};
use serde::{Deserialize, Serialize};

const IDS: SequentialIds = SequentialIds::new("SRV");

closed_enum! {
    pub enum RequestStatus {
        Pending => "pending",
        InProgress => "in_progress",
        Resolved => "resolved",
        Rejected => "rejected",
    }
}

closed_enum! {
    pub enum ServiceType {
        Maintenance => "maintenance",
        ItSupport => "it_support",
        Cleaning => "cleaning",
        Security => "security",
        Other => "other",
    }
}

static FIELDS: &[FieldRule] = &[
    FieldRule {
        field: "service_type",
        label: "Service type",
        checks: &[Check::Required, Check::OneOf(ServiceType::VALUES)],
    },
    FieldRule {
        field: "location",
        label: "Location",
        checks: &[Check::Required, Check::MinLength(2), Check::MaxLength(120)],
    },
    FieldRule {
        field: "description",
        label: "Description",
        checks: &[Check::Required, Check::MinLength(10), Check::MaxLength(1000)],
    },
    FieldRule {
        field: "priority",
        label: "Priority",
        checks: &[Check::Required, Check::OneOf(Priority::VALUES)],
    },
    FieldRule {
        field: "contact_phone",
        label: "Contact phone",
        checks: &[Check::MinLength(9), Check::Phone],
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub id: String,
    pub service_type: ServiceType,
    pub location: String,
    pub description: String,
    pub priority: Priority,
    pub contact_phone: Option<String>,
    pub requested_by: String,
    pub status: RequestStatus,
    pub created_at: i64,
}

impl Entity for ServiceRequest {
    type Status = RequestStatus;

    const STORAGE_KEY: &'static str = "campus.service_requests";
    const LABEL: &'static str = "Service Requests";
    const ID_SCHEME: IdScheme = IdScheme::Sequential(IDS);

    fn rules() -> RuleSet {
        RuleSet::new(FIELDS)
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> RequestStatus {
        self.status
    }

    fn set_status(&mut self, status: RequestStatus) {
        self.status = status;
    }

    fn from_form(form: &FormInput, new: &NewRecord<'_>) -> Self {
        Self {
            id: new.id.clone(),
            service_type: choice(form, "service_type"),
            location: form.text("location"),
            description: form.text("description"),
            priority: choice(form, "priority"),
            contact_phone: form.optional_text("contact_phone"),
            requested_by: new.session.display_name.clone(),
            status: RequestStatus::Pending,
            created_at: new.created_at,
        }
    }

    fn apply_patch(&mut self, patch: &FormInput) {
        patch_field(patch, "service_type", |p| {
            self.service_type = choice(p, "service_type");
        });
        patch_field(patch, "location", |p| self.location = p.text("location"));
        patch_field(patch, "description", |p| {
            self.description = p.text("description");
        });
        patch_field(patch, "priority", |p| self.priority = choice(p, "priority"));
        patch_field(patch, "contact_phone", |p| {
            self.contact_phone = p.optional_text("contact_phone");
        });
    }

    fn search_text(&self) -> String {
        haystack([
            self.service_type.as_str(),
            self.location.as_str(),
            self.description.as_str(),
        ])
    }

    fn demo_records(seed: &DemoSeed) -> Vec<Self> {
        const ISSUES: [(ServiceType, &str, &str); 5] = [
            (ServiceType::Maintenance, "Dorm A, room 214", "Radiator is leaking onto the floor."),
            (ServiceType::ItSupport, "Computer Lab 3", "Projector cannot detect HDMI input."),
            (ServiceType::Cleaning, "Cafeteria east wing", "Spilled drinks near the entrance."),
            (ServiceType::Security, "Parking lot C", "Street light out near the exit gate."),
            (ServiceType::Other, "Library level 2", "Study room booking panel is frozen."),
        ];

        (0..DEMO_DATASET_SIZE)
            .map(|i| {
                let (service_type, location, description) = ISSUES[i % ISSUES.len()];
                Self {
                    id: IDS.format(i as u64 + 1),
                    service_type,
                    location: location.to_string(),
                    description: description.to_string(),
                    priority: Priority::ALL[i % Priority::ALL.len()],
                    contact_phone: None,
                    requested_by: format!("Resident {}", i + 1),
                    status: RequestStatus::Pending,
                    created_at: seed.minutes_ago(20 * (i as i64 + 1)),
                }
            })
            .collect()
    }
}
