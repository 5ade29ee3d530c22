//! Course catalogue. Tasks reference courses by ID.

use crate::model::entity::{
    closed_enum, haystack, integer, patch_field, DemoSeed, Entity, NewRecord, DEMO_DATASET_SIZE,
};
use crate::model::id::{IdScheme, SequentialIds};
use crate::validation::{Check, FieldRule, FormInput, RuleSet};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

const IDS: SequentialIds = SequentialIds::new("CRS");

static COURSE_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{2,4}[0-9]{3}$").expect("valid course code regex"));

closed_enum! {
    pub enum CourseStatus {
        Active => "active",
        Archived => "archived",
    }
}

static FIELDS: &[FieldRule] = &[
    FieldRule {
        field: "code",
        label: "Course code",
        checks: &[
            Check::Required,
            Check::Pattern {
                regex: &COURSE_CODE_RE,
                hint: "be 2-4 capital letters followed by 3 digits, e.g. CS101",
            },
        ],
    },
    FieldRule {
        field: "title",
        label: "Course title",
        checks: &[Check::Required, Check::MinLength(3), Check::MaxLength(120)],
    },
    FieldRule {
        field: "credits",
        label: "Credits",
        checks: &[Check::Required, Check::Integer { min: 1, max: 10 }],
    },
    FieldRule {
        field: "instructor",
        label: "Instructor",
        checks: &[Check::Required, Check::MinLength(2), Check::MaxLength(80)],
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub code: String,
    pub title: String,
    pub credits: u8,
    pub instructor: String,
    pub status: CourseStatus,
    pub created_at: i64,
}

impl Entity for Course {
    type Status = CourseStatus;

    const STORAGE_KEY: &'static str = "campus.courses";
    const LABEL: &'static str = "Courses";
    const ID_SCHEME: IdScheme = IdScheme::Sequential(IDS);

    fn rules() -> RuleSet {
        RuleSet::new(FIELDS)
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> CourseStatus {
        self.status
    }

    fn set_status(&mut self, status: CourseStatus) {
        self.status = status;
    }

    fn from_form(form: &FormInput, new: &NewRecord<'_>) -> Self {
        Self {
            id: new.id.clone(),
            code: form.text("code"),
            title: form.text("title"),
            credits: integer(form, "credits"),
            instructor: form.text("instructor"),
            status: CourseStatus::Active,
            created_at: new.created_at,
        }
    }

    fn apply_patch(&mut self, patch: &FormInput) {
        patch_field(patch, "code", |p| self.code = p.text("code"));
        patch_field(patch, "title", |p| self.title = p.text("title"));
        patch_field(patch, "credits", |p| self.credits = integer(p, "credits"));
        patch_field(patch, "instructor", |p| {
            self.instructor = p.text("instructor");
        });
    }

    fn search_text(&self) -> String {
        haystack([
            self.code.as_str(),
            self.title.as_str(),
            self.instructor.as_str(),
        ])
    }

    fn demo_records(seed: &DemoSeed) -> Vec<Self> {
        const ROWS: [(&str, &str, u8, &str); 10] = [
            ("CS101", "Introduction to Programming", 4, "Dr. Ada Park"),
            ("CS201", "Data Structures", 4, "Dr. Ada Park"),
            ("MA101", "Calculus I", 3, "Prof. Ivan Novak"),
            ("MA201", "Linear Algebra", 3, "Prof. Ivan Novak"),
            ("PHY110", "Physics for Engineers", 4, "Dr. Grace Obi"),
            ("CHEM101", "General Chemistry", 3, "Dr. Lena Fischer"),
            ("BUS120", "Principles of Management", 3, "Prof. Omar Haddad"),
            ("BIO150", "Cell Biology", 4, "Dr. Mei Lin"),
            ("ENG100", "Academic Writing", 2, "Ms. Clara Diaz"),
            ("HIS210", "Modern World History", 3, "Dr. Samuel Reyes"),
        ];

        (0..DEMO_DATASET_SIZE)
            .map(|i| {
                let (code, title, credits, instructor) = ROWS[i];
                Self {
                    id: IDS.format(i as u64 + 1),
                    code: code.to_string(),
                    title: title.to_string(),
                    credits,
                    instructor: instructor.to_string(),
                    status: CourseStatus::Active,
                    created_at: seed.minutes_ago(7 * 24 * 60 * (i as i64 + 1)),
                }
            })
            .collect()
    }
}
