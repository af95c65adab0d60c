pub mod code_service;
pub mod errors;
pub mod expense_service;
pub mod lookup_service;
pub mod menu_service;
pub mod menu_tree;

pub use code_service::CodeService;
pub use expense_service::ExpenseService;
pub use lookup_service::LookupService;
pub use menu_service::MenuService;
