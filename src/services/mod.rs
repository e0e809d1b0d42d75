pub mod auth_service;
pub mod email_service;
pub mod report_service;
pub mod run_service;
pub mod user_service;

pub use auth_service::{AuthService, AuthServiceError, LoginRequest};
pub use email_service::{
    create_email_service, EmailError, EmailService, MockEmailService, OutgoingEmail,
    SendGridEmailService, SmtpEmailService,
};
pub use report_service::{ReportRecipient, ReportService, ReportServiceError};
pub use run_service::{RunService, RunServiceError};
pub use user_service::{UserService, UserServiceError};
