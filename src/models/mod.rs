pub mod daily_plan;
pub mod practice_record;
pub mod speaking_question;
