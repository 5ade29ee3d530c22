//! Student marketplace listings.

use crate::model::entity::{
    choice, closed_enum, decimal, haystack, patch_field, ClosedEnum, DemoSeed, Entity, NewRecord,
    DEMO_DATASET_SIZE,
};
use crate::model::id::{IdScheme, SequentialIds};
use crate::validation::{Check, FieldRule, FormInput, RuleSet};
use serde::{Deserialize, Serialize};

const IDS: SequentialIds = SequentialIds::new("MKT");

closed_enum! {
    pub enum ListingStatus {
        Available => "available",
        Reserved => "reserved",
        Sold => "sold",
    }
}

closed_enum! {
    pub enum ListingCategory {
        Books => "books",
        Electronics => "electronics",
        Furniture => "furniture",
        Clothing => "clothing",
        Other => "other",
    }
}

closed_enum! {
    pub enum ItemCondition {
        New => "new",
        LikeNew => "like_new",
        Good => "good",
        Fair => "fair",
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
        checks: &[Check::MaxLength(1000)],
    },
    FieldRule {
        field: "price",
        label: "Price",
        checks: &[
            Check::Required,
            Check::Decimal {
                min: Some(0.0),
                max: Some(1_000_000.0),
            },
        ],
    },
    FieldRule {
        field: "category",
        label: "Category",
        checks: &[Check::Required, Check::OneOf(ListingCategory::VALUES)],
    },
    FieldRule {
        field: "condition",
        label: "Condition",
        checks: &[Check::Required, Check::OneOf(ItemCondition::VALUES)],
    },
    FieldRule {
        field: "seller_contact",
        label: "Seller email",
        checks: &[Check::Required, Check::Email],
    },
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketplaceListing {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: ListingCategory,
    pub condition: ItemCondition,
    pub seller: String,
    pub seller_contact: String,
    pub status: ListingStatus,
    pub created_at: i64,
}

impl Entity for MarketplaceListing {
    type Status = ListingStatus;

    const STORAGE_KEY: &'static str = "campus.marketplace";
    const LABEL: &'static str = "Marketplace";
    const ID_SCHEME: IdScheme = IdScheme::Sequential(IDS);

    fn rules() -> RuleSet {
        RuleSet::new(FIELDS)
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> ListingStatus {
        self.status
    }

    fn set_status(&mut self, status: ListingStatus) {
        self.status = status;
    }

    fn from_form(form: &FormInput, new: &NewRecord<'_>) -> Self {
        Self {
            id: new.id.clone(),
            title: form.text("title"),
            description: form.optional_text("description"),
            price: decimal(form, "price"),
            category: choice(form, "category"),
            condition: choice(form, "condition"),
            seller: new.session.display_name.clone(),
            seller_contact: form.text("seller_contact"),
            status: ListingStatus::Available,
            created_at: new.created_at,
        }
    }

    fn apply_patch(&mut self, patch: &FormInput) {
        patch_field(patch, "title", |p| self.title = p.text("title"));
        patch_field(patch, "description", |p| {
            self.description = p.optional_text("description");
        });
        patch_field(patch, "price", |p| self.price = decimal(p, "price"));
        patch_field(patch, "category", |p| self.category = choice(p, "category"));
        patch_field(patch, "condition", |p| {
            self.condition = choice(p, "condition");
        });
        patch_field(patch, "seller_contact", |p| {
            self.seller_contact = p.text("seller_contact");
        });
    }

    fn search_text(&self) -> String {
        haystack([
            self.title.as_str(),
            self.description.as_deref().unwrap_or_default(),
            self.category.as_str(),
        ])
    }

    fn demo_records(seed: &DemoSeed) -> Vec<Self> {
        const ITEMS: [(&str, ListingCategory, f64); 10] = [
            ("Calculus textbook, 9th edition", ListingCategory::Books, 35.0),
            ("Desk lamp", ListingCategory::Furniture, 12.5),
            ("Graphing calculator", ListingCategory::Electronics, 60.0),
            ("Winter jacket (M)", ListingCategory::Clothing, 40.0),
            ("Mini fridge", ListingCategory::Electronics, 85.0),
            ("Office chair", ListingCategory::Furniture, 45.0),
            ("Organic chemistry notes", ListingCategory::Books, 0.0),
            ("Bike lock", ListingCategory::Other, 8.0),
            ("Mechanical keyboard", ListingCategory::Electronics, 55.0),
            ("Yoga mat", ListingCategory::Other, 10.0),
        ];

        (0..DEMO_DATASET_SIZE)
            .map(|i| {
                let (title, category, price) = ITEMS[i];
                Self {
                    id: IDS.format(i as u64 + 1),
                    title: title.to_string(),
                    description: Some("Pick up on campus, cash or transfer.".to_string()),
                    price,
                    category,
                    condition: ItemCondition::ALL[i % ItemCondition::ALL.len()],
                    seller: format!("Student {}", i + 1),
                    seller_contact: format!("seller{}@campus.edu", i + 1),
                    status: ListingStatus::Available,
                    created_at: seed.minutes_ago(45 * (i as i64 + 1)),
                }
            })
            .collect()
    }
}
