//! Student roster records.

use crate::model::entity::{
    closed_enum, haystack, integer, patch_field, DemoSeed, Entity, NewRecord, DEMO_DATASET_SIZE,
};
use crate::model::id::{IdScheme, SequentialIds};
use crate::validation::{Check, FieldRule, FormInput, RuleSet};
use serde::{Deserialize, Serialize};

const IDS: SequentialIds = SequentialIds::new("STU");

closed_enum! {
    pub enum StudentStatus {
        Active => "active",
        Inactive => "inactive",
        Graduated => "graduated",
    }
}

static FIELDS: &[FieldRule] = &[
    FieldRule {
        field: "first_name",
        label: "First name",
        checks: &[Check::Required, Check::MinLength(2), Check::MaxLength(50)],
    },
    FieldRule {
        field: "last_name",
        label: "Last name",
        checks: &[Check::Required, Check::MinLength(2), Check::MaxLength(50)],
    },
    FieldRule {
        field: "email",
        label: "Email",
        checks: &[Check::Required, Check::Email],
    },
    FieldRule {
        field: "phone",
        label: "Phone",
        checks: &[Check::MinLength(9), Check::Phone],
    },
    FieldRule {
        field: "program",
        label: "Program",
        checks: &[Check::Required, Check::MinLength(2), Check::MaxLength(80)],
    },
    FieldRule {
        field: "year",
        label: "Year of study",
        checks: &[Check::Required, Check::Integer { min: 1, max: 6 }],
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub program: String,
    pub year: u8,
    pub status: StudentStatus,
    pub created_at: i64,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Entity for Student {
    type Status = StudentStatus;

    const STORAGE_KEY: &'static str = "campus.students";
    const LABEL: &'static str = "Students";
    const ID_SCHEME: IdScheme = IdScheme::Sequential(IDS);

    fn rules() -> RuleSet {
        RuleSet::new(FIELDS)
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> StudentStatus {
        self.status
    }

    fn set_status(&mut self, status: StudentStatus) {
        self.status = status;
    }

    fn from_form(form: &FormInput, new: &NewRecord<'_>) -> Self {
        Self {
            id: new.id.clone(),
            first_name: form.text("first_name"),
            last_name: form.text("last_name"),
            email: form.text("email").to_lowercase(),
            phone: form.optional_text("phone"),
            program: form.text("program"),
            year: integer(form, "year"),
            status: StudentStatus::Active,
            created_at: new.created_at,
        }
    }

    fn apply_patch(&mut self, patch: &FormInput) {
        patch_field(patch, "first_name", |p| {
            self.first_name = p.text("first_name");
        });
        patch_field(patch, "last_name", |p| self.last_name = p.text("last_name"));
        patch_field(patch, "email", |p| {
            self.email = p.text("email").to_lowercase();
        });
        patch_field(patch, "phone", |p| self.phone = p.optional_text("phone"));
        patch_field(patch, "program", |p| self.program = p.text("program"));
        patch_field(patch, "year", |p| self.year = integer(p, "year"));
    }

    fn search_text(&self) -> String {
        haystack([
            self.first_name.as_str(),
            self.last_name.as_str(),
            self.email.as_str(),
            self.program.as_str(),
        ])
    }

    fn demo_records(seed: &DemoSeed) -> Vec<Self> {
        const NAMES: [(&str, &str); 10] = [
            ("Amara", "Okafor"),
            ("Liam", "Chen"),
            ("Sofia", "Rossi"),
            ("Noah", "Schmidt"),
            ("Aisha", "Khan"),
            ("Mateo", "Garcia"),
            ("Yuki", "Tanaka"),
            ("Elena", "Petrova"),
            ("Kwame", "Mensah"),
            ("Priya", "Nair"),
        ];
        const PROGRAMS: [&str; 4] = [
            "Computer Science",
            "Mechanical Engineering",
            "Business Administration",
            "Biology",
        ];

        (0..DEMO_DATASET_SIZE)
            .map(|i| {
                let (first, last) = NAMES[i];
                Self {
                    id: IDS.format(i as u64 + 1),
                    first_name: first.to_string(),
                    last_name: last.to_string(),
                    email: format!("{}.{}@campus.edu", first, last).to_lowercase(),
                    phone: None,
                    program: PROGRAMS[i % PROGRAMS.len()].to_string(),
                    year: (i % 4) as u8 + 1,
                    status: StudentStatus::Active,
                    created_at: seed.minutes_ago(24 * 60 * (i as i64 + 1)),
                }
            })
            .collect()
    }
}
