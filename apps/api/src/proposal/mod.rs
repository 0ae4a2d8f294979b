// Proposal pricing: turns a service selection into priced line items and a total.

pub mod handlers;
pub mod models;
pub mod normalizer;
