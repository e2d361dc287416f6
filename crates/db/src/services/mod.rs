//! Operations spanning more than one repository.

pub mod template_service;

pub use template_service::TemplateService;
