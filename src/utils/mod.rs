pub mod company_time;
