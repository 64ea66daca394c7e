//! Clients for the card, checkout and installment gateways of Georgian banks.

pub mod connectors;
pub mod utils;
