pub mod pagination;
pub mod plan_dto;
pub mod practice_dto;
pub mod question_dto;
