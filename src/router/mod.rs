pub mod lead_router;
