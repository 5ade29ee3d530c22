//! Discussion forum posts.

use crate::model::entity::{
    choice, closed_enum, haystack, patch_field, ClosedEnum, DemoSeed, Entity, NewRecord,
    DEMO_DATASET_SIZE,
};
use crate::model::id::{IdScheme, SequentialIds};
use crate::validation::{Check, FieldRule, FormInput, RuleSet};
use serde::{Deserialize, Serialize};

const IDS: SequentialIds = SequentialIds::new("POST");
const MAX_TAGS: usize = 5;

closed_enum! {
    pub enum PostStatus {
        Published => "published",
        Locked => "locked",
        Archived => "archived",
    }
}

closed_enum! {
    pub enum ForumCategory {
        General => "general",
        Academics => "academics",
        Housing => "housing",
        Events => "events",
        Marketplace => "marketplace",
    }
}

static FIELDS: &[FieldRule] = &[
    FieldRule {
        field: "title",
        label: "Title",
        checks: &[Check::Required, Check::MinLength(5), Check::MaxLength(150)],
    },
    FieldRule {
        field: "body",
        label: "Post body",
        checks: &[Check::Required, Check::MinLength(10), Check::MaxLength(5000)],
    },
    FieldRule {
        field: "category",
        label: "Category",
        checks: &[Check::Required, Check::OneOf(ForumCategory::VALUES)],
    },
    FieldRule {
        field: "tags",
        label: "Tags",
        checks: &[Check::MaxLength(100)],
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForumPost {
    pub id: String,
    pub title: String,
    pub body: String,
    pub category: ForumCategory,
    /// Lowercase, deduplicated, at most five.
    pub tags: Vec<String>,
    pub author: String,
    pub likes: u32,
    pub status: PostStatus,
    pub created_at: i64,
}

impl ForumPost {
    pub fn like(&mut self) {
        self.likes = self.likes.saturating_add(1);
    }
}

/// Splits a comma-separated tag field into normalized tags.
pub fn normalize_tags(raw: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in raw.split(',') {
        let tag = tag.trim().to_lowercase();
        if tag.is_empty() || tags.contains(&tag) {
            continue;
        }
        tags.push(tag);
        if tags.len() == MAX_TAGS {
            break;
        }
    }
    tags
}

impl Entity for ForumPost {
    type Status = PostStatus;

    const STORAGE_KEY: &'static str = "campus.forum_posts";
    const LABEL: &'static str = "Forum";
    const ID_SCHEME: IdScheme = IdScheme::Sequential(IDS);

    fn rules() -> RuleSet {
        RuleSet::new(FIELDS)
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> PostStatus {
        self.status
    }

    fn set_status(&mut self, status: PostStatus) {
        self.status = status;
    }

    fn from_form(form: &FormInput, new: &NewRecord<'_>) -> Self {
        Self {
            id: new.id.clone(),
            title: form.text("title"),
            body: form.text("body"),
            category: choice(form, "category"),
            tags: normalize_tags(&form.text("tags")),
            author: new.session.display_name.clone(),
            likes: 0,
            status: PostStatus::Published,
            created_at: new.created_at,
        }
    }

    fn apply_patch(&mut self, patch: &FormInput) {
        patch_field(patch, "title", |p| self.title = p.text("title"));
        patch_field(patch, "body", |p| self.body = p.text("body"));
        patch_field(patch, "category", |p| self.category = choice(p, "category"));
        patch_field(patch, "tags", |p| {
            self.tags = normalize_tags(&p.text("tags"));
        });
    }

    fn search_text(&self) -> String {
        let tags = self.tags.join(" ");
        haystack([
            self.title.as_str(),
            self.body.as_str(),
            self.category.as_str(),
            tags.as_str(),
        ])
    }

    fn demo_records(seed: &DemoSeed) -> Vec<Self> {
        const TOPICS: [(&str, ForumCategory, &str); 10] = [
            ("Welcome to the campus forum", ForumCategory::General, "welcome"),
            ("Study group for Linear Algebra", ForumCategory::Academics, "math, study"),
            ("Looking for a roommate next term", ForumCategory::Housing, "housing"),
            ("Who is going to the spring concert?", ForumCategory::Events, "music"),
            ("Selling used lab coats", ForumCategory::Marketplace, "lab, sale"),
            ("Best quiet spots to study", ForumCategory::General, "study"),
            ("Exam timetable clash", ForumCategory::Academics, "exams"),
            ("Laundry room schedule", ForumCategory::Housing, "dorm"),
            ("Volunteers for charity run", ForumCategory::Events, "volunteer, sports"),
            ("Cheap bikes for sale?", ForumCategory::Marketplace, "bikes"),
        ];

        (0..DEMO_DATASET_SIZE)
            .map(|i| {
                let (title, category, tags) = TOPICS[i];
                Self {
                    id: IDS.format(i as u64 + 1),
                    title: title.to_string(),
                    body: format!("{title}. Reply below if you are interested."),
                    category,
                    tags: normalize_tags(tags),
                    author: format!("Student {}", i + 1),
                    likes: (i as u32 * 7) % 23,
                    status: PostStatus::Published,
                    created_at: seed.minutes_ago(90 * (i as i64 + 1)),
                }
            })
            .collect()
    }
}
