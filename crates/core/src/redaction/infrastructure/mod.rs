pub mod gaussian_region_redactor;
