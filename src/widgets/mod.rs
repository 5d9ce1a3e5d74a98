pub mod help;
pub mod service_card;
pub mod status_bar;
