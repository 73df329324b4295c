pub mod lead_dto;
