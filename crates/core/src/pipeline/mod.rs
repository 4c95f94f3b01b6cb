pub mod redact_face_use_case;
pub mod redact_group_photo_use_case;
pub mod redact_photo_file_use_case;
pub mod redaction_config;
pub mod redaction_error;
