pub mod dashboard_handlers;
pub mod report_handlers;
pub mod run_handlers;

pub use dashboard_handlers::dashboard_handler;
pub use report_handlers::send_report_handler;
pub use run_handlers::{
    create_run_handler, delete_run_handler, delete_run_link, edit_run_page, index_redirect,
    list_runs_page, new_run_page, update_run_handler,
};
