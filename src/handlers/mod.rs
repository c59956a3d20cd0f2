//! Thin route handlers: validate, then delegate to the back office. No
//! handler ever sees raw input past the validation call.

pub mod auth;
pub mod contact;
pub mod health;
pub mod invoices;
pub mod settings;
pub mod testimonials;
pub mod tracking;
pub mod users;
