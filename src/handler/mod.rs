pub mod lead_handler;
