//! Core types for Segunda Mana.
//!
//! Entity shapes mirror the REST backend's camelCase JSON with Mongo-style
//! `_id` keys. Fields the backend may omit carry serde defaults.

pub mod activity;
pub mod analytics;
pub mod announcement;
pub mod cart;
pub mod catalog;
pub mod collection;
pub mod email;
pub mod id;
pub mod money;
pub mod notice;
pub mod order;
pub mod people;
pub mod role;
pub mod status;

pub use activity::{ActivityDetails, ActivityLog};
pub use analytics::Analytics;
pub use announcement::{Announcement, AnnouncementDraft, MissingAnnouncementFields};
pub use cart::{CartItem, CartSnapshot};
pub use catalog::{
    CATEGORIES, CatalogForm, CatalogFormError, CatalogItem, CatalogItemInput, DEFAULT_STOCK_STATUS,
    InventoryItem, Product, SIZES, STOCK_STATUSES,
};
pub use collection::{CollectionError, CollectionRow, DailyCollection};
pub use email::{Email, EmailError};
pub use id::*;
pub use money::format_peso;
pub use notice::{Notice, NoticeLevel};
pub use order::{
    Address, DEFAULT_DONOR_NAME, Impact, ManualOrder, ManualOrderError, ManualOrderForm, Order,
    OrderItem, OrderType, PaymentMethod, ProductRef, ShippingContact, TicketVoucher,
};
pub use people::{
    AccountForm, AccountFormError, AccountUpdate, AdminProfile, Beneficiary, BeneficiaryForm,
    BeneficiaryFormError, BeneficiaryInput, LANGUAGES, NOTIFICATION_LEVELS, Staff, StaffForm,
    StaffFormError, StaffInput, TIMEZONES,
};
pub use role::Role;
pub use status::*;
