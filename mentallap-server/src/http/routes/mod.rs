//! Route handlers organized by resource

pub mod admin;
pub mod analyses;
pub mod articles;
pub mod auth;
pub mod bookings;
pub mod contact;
pub mod health;
pub mod journal;
pub mod pages;
pub mod workshops;
