use portfolio_core_contact_impl::{
    compose::ContactComposeServiceImpl, dispatch::ContactDispatchServiceImpl,
    rate_limit::ContactRateLimitServiceImpl, ContactFeatureServiceImpl,
};
use portfolio_core_health_impl::HealthFeatureServiceImpl;
use portfolio_email_impl::EmailServiceImpl;
use portfolio_shared_impl::time::TimeServiceImpl;
use portfolio_templates_impl::TemplateServiceImpl;

// API
pub type RestServer = portfolio_api_rest::RestServer<HealthFeature, ContactFeature>;

// Email
pub type Email = EmailServiceImpl;

// Template
pub type Template = TemplateServiceImpl;

// Shared
pub type Time = TimeServiceImpl;

// Core
pub type HealthFeature = HealthFeatureServiceImpl<Time, Email>;

pub type ContactFeature =
    ContactFeatureServiceImpl<Time, ContactRateLimit, ContactCompose, ContactDispatch>;
pub type ContactRateLimit = ContactRateLimitServiceImpl<Time>;
pub type ContactCompose = ContactComposeServiceImpl<Template>;
pub type ContactDispatch = ContactDispatchServiceImpl<Email>;
