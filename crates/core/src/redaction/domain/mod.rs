pub mod region_redactor;
