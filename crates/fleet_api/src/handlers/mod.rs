pub mod driver;
pub mod manager;

pub use driver::handle_my_status;
pub use manager::{
    handle_assign, handle_destinations, handle_drivers_live, handle_history,
    handle_register_driver,
};
