//! Cafeteria pickup orders. Orders use opaque timestamp-derived IDs and have
//! no demo dataset.

use crate::model::entity::{
    closed_enum, decimal, haystack, integer, patch_field, Entity, NewRecord,
};
use crate::model::id::{IdScheme, OpaqueIds};
use crate::validation::{Check, FieldRule, FormInput, RuleSet};
use serde::{Deserialize, Serialize};

closed_enum! {
    pub enum OrderStatus {
        Placed => "placed",
        Preparing => "preparing",
        Ready => "ready",
        Collected => "collected",
        Cancelled => "cancelled",
    }
}

static FIELDS: &[FieldRule] = &[
    FieldRule {
        field: "menu_item",
        label: "Menu item",
        checks: &[Check::Required, Check::MinLength(2), Check::MaxLength(80)],
    },
    FieldRule {
        field: "quantity",
        label: "Quantity",
        checks: &[Check::Required, Check::Integer { min: 1, max: 20 }],
    },
    FieldRule {
        field: "unit_price",
        label: "Unit price",
        checks: &[
            Check::Required,
            Check::Decimal {
                min: Some(0.0),
                max: Some(500.0),
            },
        ],
    },
    FieldRule {
        field: "pickup_time",
        label: "Pickup time",
        checks: &[Check::Required, Check::Time],
    },
    FieldRule {
        field: "notes",
        label: "Notes",
        checks: &[Check::MaxLength(200)],
    },
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CafeteriaOrder {
    pub id: String,
    pub menu_item: String,
    pub quantity: u32,
    pub unit_price: f64,
    /// `quantity * unit_price`, kept in sync on every write.
    pub total: f64,
    pub pickup_time: String,
    pub notes: Option<String>,
    pub customer: String,
    pub status: OrderStatus,
    pub created_at: i64,
}

impl CafeteriaOrder {
    fn recompute_total(&mut self) {
        self.total = f64::from(self.quantity) * self.unit_price;
    }
}

impl Entity for CafeteriaOrder {
    type Status = OrderStatus;

    const STORAGE_KEY: &'static str = "campus.cafeteria_orders";
    const LABEL: &'static str = "Cafeteria Orders";
    const ID_SCHEME: IdScheme = IdScheme::Opaque(OpaqueIds::new("ORD"));

    fn rules() -> RuleSet {
        RuleSet::new(FIELDS)
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> OrderStatus {
        self.status
    }

    fn set_status(&mut self, status: OrderStatus) {
        self.status = status;
    }

    fn from_form(form: &FormInput, new: &NewRecord<'_>) -> Self {
        let mut order = Self {
            id: new.id.clone(),
            menu_item: form.text("menu_item"),
            quantity: integer(form, "quantity"),
            unit_price: decimal(form, "unit_price"),
            total: 0.0,
            pickup_time: form.text("pickup_time"),
            notes: form.optional_text("notes"),
            customer: new.session.display_name.clone(),
            status: OrderStatus::Placed,
            created_at: new.created_at,
        };
        order.recompute_total();
        order
    }

    fn apply_patch(&mut self, patch: &FormInput) {
        patch_field(patch, "menu_item", |p| self.menu_item = p.text("menu_item"));
        patch_field(patch, "quantity", |p| {
            self.quantity = integer(p, "quantity");
        });
        patch_field(patch, "unit_price", |p| {
            self.unit_price = decimal(p, "unit_price");
        });
        patch_field(patch, "pickup_time", |p| {
            self.pickup_time = p.text("pickup_time");
        });
        patch_field(patch, "notes", |p| self.notes = p.optional_text("notes"));
        self.recompute_total();
    }

    fn search_text(&self) -> String {
        haystack([
            self.menu_item.as_str(),
            self.customer.as_str(),
            self.notes.as_deref().unwrap_or_default(),
        ])
    }
}
